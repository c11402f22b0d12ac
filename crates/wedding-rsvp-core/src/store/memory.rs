//! In-process record store.
//!
//! Backs the TUI's `--demo` mode and the test suites. Failures can be
//! injected per guest for writes, and globally for reads.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use super::{GuestStore, PlaylistStore, StoreResult};
use crate::api::ApiError;
use crate::models::{Guest, GuestId, GuestUpdate, NewGuest, SongSuggestion};

#[derive(Default)]
pub struct MemoryStore {
    guests: Mutex<Vec<Guest>>,
    songs: Mutex<Vec<SongSuggestion>>,
    /// Ids whose updates were accepted, in arrival order.
    update_log: Mutex<Vec<GuestId>>,
    failing_updates: Mutex<HashSet<GuestId>>,
    fail_reads: AtomicBool,
    next_id: AtomicU64,
    read_delay: Mutex<Duration>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_guests(guests: Vec<Guest>) -> Self {
        let next = guests.len() as u64 + 1;
        Self {
            guests: Mutex::new(guests),
            next_id: AtomicU64::new(next),
            ..Default::default()
        }
    }

    /// A small guest list for trying the app without a backend.
    pub fn demo() -> Self {
        let mut guests = vec![
            Guest::new("g-1", "Juan García", Some("Familia García")),
            Guest::new("g-2", "Ana García", Some("Familia García")),
            Guest::new("g-3", "Lucía García", Some("Familia García")),
            Guest::new("g-4", "Pablo Ruiz", Some("Amigos de la universidad")),
            Guest::new("g-5", "Irene Molina", Some("Amigos de la universidad")),
            Guest::new("g-6", "Marta Soler", None),
            Guest::new("g-7", "Carmen Garrido", Some("Compañeros de trabajo")),
        ];
        guests[3].attending = Some(true);
        guests[3].bus_departure = Some("Salida desde Madrid".to_string());
        guests[4].attending = Some(false);
        Self::with_guests(guests)
    }

    /// Make every later update for this guest fail with a server error.
    pub async fn fail_updates_for(&self, id: &GuestId) {
        self.failing_updates.lock().await.insert(id.clone());
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::Relaxed);
    }

    pub async fn set_read_delay(&self, delay: Duration) {
        *self.read_delay.lock().await = delay;
    }

    pub async fn guest(&self, id: &GuestId) -> Option<Guest> {
        self.guests.lock().await.iter().find(|g| &g.id == id).cloned()
    }

    pub async fn update_log(&self) -> Vec<GuestId> {
        self.update_log.lock().await.clone()
    }

    pub async fn songs(&self) -> Vec<SongSuggestion> {
        self.songs.lock().await.clone()
    }

    async fn before_read(&self) -> StoreResult<()> {
        let delay = *self.read_delay.lock().await;
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if self.fail_reads.load(Ordering::Relaxed) {
            return Err(ApiError::ServerError("injected read failure".to_string()));
        }
        Ok(())
    }

    fn sorted_by_name(mut guests: Vec<Guest>) -> Vec<Guest> {
        guests.sort_by(|a, b| a.name.cmp(&b.name));
        guests
    }
}

#[async_trait]
impl GuestStore for MemoryStore {
    fn backend_tag(&self) -> &'static str {
        "memory"
    }

    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Guest>> {
        self.before_read().await?;
        let needle = query.to_lowercase();
        let matches = self
            .guests
            .lock()
            .await
            .iter()
            .filter(|g| g.name.to_lowercase().contains(&needle))
            .cloned()
            .collect();
        Ok(Self::sorted_by_name(matches))
    }

    async fn list_by_group(&self, label: &str) -> StoreResult<Vec<Guest>> {
        self.before_read().await?;
        let members = self
            .guests
            .lock()
            .await
            .iter()
            .filter(|g| g.group_name.as_deref() == Some(label))
            .cloned()
            .collect();
        Ok(Self::sorted_by_name(members))
    }

    async fn list_all(&self) -> StoreResult<Vec<Guest>> {
        self.before_read().await?;
        let mut all = self.guests.lock().await.clone();
        // Nulls last, as the backend orders them.
        all.sort_by(|a, b| {
            (a.group_name.is_none(), &a.group_name, &a.name)
                .cmp(&(b.group_name.is_none(), &b.group_name, &b.name))
        });
        Ok(all)
    }

    async fn update_guest(&self, id: &GuestId, update: &GuestUpdate) -> StoreResult<()> {
        if self.failing_updates.lock().await.contains(id) {
            return Err(ApiError::ServerError(format!("injected update failure for {}", id)));
        }
        let mut guests = self.guests.lock().await;
        let guest = guests
            .iter_mut()
            .find(|g| &g.id == id)
            .ok_or_else(|| ApiError::NotFound(format!("guest {}", id)))?;
        guest.apply(update);
        self.update_log.lock().await.push(id.clone());
        debug!(guest_id = %id, "Memory store updated guest");
        Ok(())
    }

    async fn insert_guest(&self, guest: &NewGuest) -> StoreResult<()> {
        let id = format!("g-{}", self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut record = Guest::new(id, guest.name.clone(), Some(guest.group_name.as_str()));
        record.attending = guest.attending;
        record.bus_departure = guest.bus_departure.clone();
        record.bus_return = guest.bus_return.clone();
        record.created_at = Some(Utc::now());
        self.guests.lock().await.push(record);
        Ok(())
    }

    async fn delete_guest(&self, id: &GuestId) -> StoreResult<()> {
        let mut guests = self.guests.lock().await;
        let before = guests.len();
        guests.retain(|g| &g.id != id);
        if guests.len() == before {
            return Err(ApiError::NotFound(format!("guest {}", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl PlaylistStore for MemoryStore {
    async fn insert_song(&self, song: &SongSuggestion) -> StoreResult<()> {
        self.songs.lock().await.push(song.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_search_is_case_insensitive_and_ordered() {
        let store = MemoryStore::demo();
        let found = store.search_by_name("GARC").await.expect("search");
        let names: Vec<&str> = found.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Ana García", "Juan García", "Lucía García"]);
    }

    #[tokio::test]
    async fn test_list_all_orders_by_group_then_name() {
        let store = MemoryStore::demo();
        let all = store.list_all().await.expect("list");
        assert_eq!(all.first().map(|g| g.name.as_str()), Some("Irene Molina"));
        assert_eq!(all.last().map(|g| g.name.as_str()), Some("Marta Soler"));
    }

    #[tokio::test]
    async fn test_injected_update_failure() {
        let store = MemoryStore::demo();
        let id = GuestId::new("g-1");
        store.fail_updates_for(&id).await;
        let update = GuestUpdate {
            attending: Some(true),
            dietary_restrictions: None,
            bus_departure: None,
            bus_return: None,
            special_notes: None,
        };
        assert!(store.update_guest(&id, &update).await.is_err());
        assert!(store.update_log().await.is_empty());
    }

    #[tokio::test]
    async fn test_insert_and_delete() {
        let store = MemoryStore::new();
        store
            .insert_guest(&NewGuest::new("Rosa Vidal", "Vecinos"))
            .await
            .expect("insert");
        let all = store.list_all().await.expect("list");
        assert_eq!(all.len(), 1);
        store.delete_guest(&all[0].id).await.expect("delete");
        assert!(store.list_all().await.expect("list").is_empty());
        assert!(matches!(
            store.delete_guest(&all[0].id).await,
            Err(ApiError::NotFound(_))
        ));
    }
}
