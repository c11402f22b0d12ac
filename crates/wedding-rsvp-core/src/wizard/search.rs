//! Guest search and grouping.
//!
//! A search matches guest names, then expands every matched guest to the
//! full membership of their group. Each request carries the session's
//! generation so a late response for an older query can be recognised
//! and dropped.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use futures::future::try_join_all;
use tracing::debug;

use crate::models::{Guest, GuestGroup, GuestId};
use crate::store::{GuestStore, StoreResult};

/// Shorter queries never reach the backend.
pub const MIN_QUERY_LEN: usize = 3;

pub fn normalize_query(input: &str) -> String {
    input.trim().to_string()
}

pub fn is_searchable(normalized: &str) -> bool {
    normalized.chars().count() >= MIN_QUERY_LEN
}

/// A search the session wants run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub generation: u64,
    pub query: String,
}

/// A finished search, ready to hand back to the session.
#[derive(Debug)]
pub struct SearchOutcome {
    pub generation: u64,
    pub result: StoreResult<Vec<GuestGroup>>,
}

enum Slot {
    /// Every stored spelling seen for one trimmed label.
    Named { label: String, spellings: Vec<String> },
    Individual(Guest),
}

/// Match names against `query` and expand matches into their groups.
///
/// Groups come back in the order their first matching guest was returned.
/// Labels that differ only in surrounding whitespace form one group; each
/// stored spelling is fetched once per call and the members are merged.
pub async fn resolve_groups<S>(store: &S, query: &str) -> StoreResult<Vec<GuestGroup>>
where
    S: GuestStore + ?Sized,
{
    let matches = store.search_by_name(query).await?;

    let mut label_slots: HashMap<String, usize> = HashMap::new();
    let mut seen_individuals: HashSet<GuestId> = HashSet::new();
    let mut slots = Vec::new();

    for guest in matches {
        match guest.group_label() {
            Some(label) => {
                let stored = guest.group_name.clone().unwrap_or_default();
                match label_slots.get(label) {
                    Some(&idx) => {
                        if let Some(Slot::Named { spellings, .. }) = slots.get_mut(idx) {
                            if !spellings.contains(&stored) {
                                spellings.push(stored);
                            }
                        }
                    }
                    None => {
                        label_slots.insert(label.to_string(), slots.len());
                        slots.push(Slot::Named {
                            label: label.to_string(),
                            spellings: vec![stored],
                        });
                    }
                }
            }
            None => {
                if seen_individuals.insert(guest.id.clone()) {
                    slots.push(Slot::Individual(guest));
                }
            }
        }
    }

    let lookups = slots
        .iter()
        .filter_map(|slot| match slot {
            Slot::Named { spellings, .. } => Some(spellings),
            Slot::Individual(_) => None,
        })
        .flatten()
        .map(|stored| store.list_by_group(stored));
    let mut memberships = try_join_all(lookups).await?.into_iter();

    let groups: Vec<GuestGroup> = slots
        .into_iter()
        .map(|slot| match slot {
            Slot::Named { label, spellings } => {
                let mut seen = HashSet::new();
                let mut guests: Vec<Guest> = memberships
                    .by_ref()
                    .take(spellings.len())
                    .flatten()
                    .filter(|g| seen.insert(g.id.clone()))
                    .collect();
                if spellings.len() > 1 {
                    guests.sort_by(|a, b| a.name.cmp(&b.name));
                }
                GuestGroup::Named { label, guests }
            }
            Slot::Individual(guest) => GuestGroup::Individual(guest),
        })
        .collect();

    debug!(
        backend = store.backend_tag(),
        query = query,
        groups = groups.len(),
        "Resolved guest groups"
    );
    Ok(groups)
}

/// Wait out the debounce window, then run the search.
///
/// The caller cancels a pending run by dropping or aborting its task; a run
/// that still completes late is rejected by generation when applied.
pub async fn run_debounced<S>(store: &S, request: SearchRequest, delay: Duration) -> SearchOutcome
where
    S: GuestStore + ?Sized,
{
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
    SearchOutcome {
        generation: request.generation,
        result: resolve_groups(store, &request.query).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn store() -> MemoryStore {
        MemoryStore::with_guests(vec![
            Guest::new("1", "Juan García", Some("Familia García")),
            Guest::new("2", "Ana García", Some("Familia García")),
            Guest::new("3", "Abuela Rosa", Some("Familia García")),
            Guest::new("4", "Marta Garcés", None),
            Guest::new("5", "Pedro López", Some("Amigos")),
        ])
    }

    #[test]
    fn test_is_searchable_counts_characters() {
        assert!(!is_searchable(""));
        assert!(!is_searchable("Ga"));
        assert!(is_searchable("Gar"));
        assert!(!is_searchable("ñá"));
        assert!(is_searchable("ñáé"));
        assert_eq!(normalize_query("  Gar "), "Gar");
    }

    #[tokio::test]
    async fn test_matches_expand_to_whole_group() {
        let groups = resolve_groups(&store(), "garc").await.expect("resolve");
        assert_eq!(groups.len(), 2);

        // "Ana García" sorts first, so her group leads.
        match &groups[0] {
            GuestGroup::Named { label, guests } => {
                assert_eq!(label, "Familia García");
                let names: Vec<&str> = guests.iter().map(|g| g.name.as_str()).collect();
                assert_eq!(names, vec!["Abuela Rosa", "Ana García", "Juan García"]);
            }
            other => panic!("expected named group, got {other:?}"),
        }
        assert!(matches!(&groups[1], GuestGroup::Individual(g) if g.name == "Marta Garcés"));
    }

    #[tokio::test]
    async fn test_label_spellings_merge_into_one_group() {
        let store = MemoryStore::with_guests(vec![
            Guest::new("1", "Juan García", Some("Familia García")),
            Guest::new("2", "Ana García", Some("Familia García ")),
        ]);

        let groups = resolve_groups(&store, "Gar").await.expect("resolve");
        assert_eq!(groups.len(), 1);
        match &groups[0] {
            GuestGroup::Named { label, guests } => {
                assert_eq!(label, "Familia García");
                let names: Vec<&str> = guests.iter().map(|g| g.name.as_str()).collect();
                assert_eq!(names, vec!["Ana García", "Juan García"]);
            }
            other => panic!("expected named group, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_no_matches() {
        let groups = resolve_groups(&store(), "zzz").await.expect("resolve");
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_read_failure_propagates() {
        let store = store();
        store.set_fail_reads(true);
        assert!(resolve_groups(&store, "garc").await.is_err());
    }

    #[tokio::test]
    async fn test_run_debounced_carries_generation() {
        let request = SearchRequest {
            generation: 7,
            query: "López".to_string(),
        };
        let outcome = run_debounced(&store(), request, Duration::from_millis(5)).await;
        assert_eq!(outcome.generation, 7);
        assert_eq!(outcome.result.expect("resolve").len(), 1);
    }
}
