//! Operations behind the hosts' dashboard.
//!
//! Listing, adding and removing guests. On the hosted backend these need a
//! signed-in host; the store passed in is expected to carry that session.

use thiserror::Error;
use tracing::info;

use crate::api::ApiError;
use crate::models::{Guest, GuestId, GuestStats, NewGuest};
use crate::store::GuestStore;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("Por favor completa todos los campos")]
    MissingFields,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Everything the dashboard shows, loaded in one go.
#[derive(Debug, Clone, Default)]
pub struct GuestList {
    pub guests: Vec<Guest>,
    pub stats: GuestStats,
}

impl GuestList {
    pub fn new(guests: Vec<Guest>) -> Self {
        let stats = GuestStats::from_guests(&guests);
        Self { guests, stats }
    }
}

/// All guests, ordered by group label then name.
pub async fn load_guests<S>(store: &S) -> Result<GuestList, AdminError>
where
    S: GuestStore + ?Sized,
{
    let guests = store.list_all().await?;
    Ok(GuestList::new(guests))
}

pub async fn add_guest<S>(store: &S, name: &str, group: &str) -> Result<NewGuest, AdminError>
where
    S: GuestStore + ?Sized,
{
    let (name, group) = (name.trim(), group.trim());
    if name.is_empty() || group.is_empty() {
        return Err(AdminError::MissingFields);
    }

    let guest = NewGuest::new(name, group);
    store.insert_guest(&guest).await?;
    info!(group = group, "Guest added");
    Ok(guest)
}

pub async fn delete_guest<S>(store: &S, id: &GuestId) -> Result<(), AdminError>
where
    S: GuestStore + ?Sized,
{
    store.delete_guest(id).await?;
    info!(guest_id = %id, "Guest deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    #[tokio::test]
    async fn test_add_guest_trims_and_validates() {
        let store = MemoryStore::new();
        assert!(matches!(
            add_guest(&store, "  ", "Vecinos").await,
            Err(AdminError::MissingFields)
        ));
        assert!(matches!(
            add_guest(&store, "Rosa", "").await,
            Err(AdminError::MissingFields)
        ));

        let added = add_guest(&store, "  Rosa Vidal ", " Vecinos ").await.expect("add");
        assert_eq!(added.name, "Rosa Vidal");
        assert_eq!(added.group_name, "Vecinos");
        assert_eq!(added.attending, None);

        let list = load_guests(&store).await.expect("load");
        assert_eq!(list.stats.total, 1);
        assert_eq!(list.stats.pending, 1);
        assert_eq!(list.guests[0].group_name.as_deref(), Some("Vecinos"));
    }

    #[tokio::test]
    async fn test_delete_guest() {
        let store = MemoryStore::demo();
        let before = load_guests(&store).await.expect("load").guests.len();
        delete_guest(&store, &GuestId::new("g-1")).await.expect("delete");
        let after = load_guests(&store).await.expect("load");
        assert_eq!(after.guests.len(), before - 1);
        assert!(matches!(
            delete_guest(&store, &GuestId::new("g-1")).await,
            Err(AdminError::Api(ApiError::NotFound(_)))
        ));
    }

    #[tokio::test]
    async fn test_load_failure_is_reported() {
        let store = MemoryStore::demo();
        store.set_fail_reads(true);
        assert!(matches!(load_guests(&store).await, Err(AdminError::Api(_))));
    }
}
