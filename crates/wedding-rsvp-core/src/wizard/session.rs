use tracing::{debug, warn};

use super::draft::{DraftEdit, GuestDraft, TransportChoice};
use super::error::{SubmitError, WizardError};
use super::search::{is_searchable, normalize_query, SearchOutcome, SearchRequest};
use super::submit::{submit_updates, PlannedUpdate};
use crate::models::{BusDeparture, BusReturn, GroupKey, GuestGroup, GuestId};
use crate::store::GuestStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WizardPhase {
    #[default]
    Searching,
    Editing,
}

/// State of one guest confirmation, from search to submission.
#[derive(Debug, Default)]
pub struct WizardSession {
    query: String,
    groups: Vec<GuestGroup>,
    selected: Option<GroupKey>,
    /// Group being confirmed; fixed when the wizard starts.
    active_group: Option<GuestGroup>,
    drafts: Vec<GuestDraft>,
    step: usize,
    shared_enabled: bool,
    shared: TransportChoice,
    generation: u64,
    /// A search for the current query has been requested but not applied.
    searching: bool,
    phase: WizardPhase,
}

impl WizardSession {
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn groups(&self) -> &[GuestGroup] {
        &self.groups
    }

    pub fn selected_key(&self) -> Option<&GroupKey> {
        self.selected.as_ref()
    }

    pub fn selected_group(&self) -> Option<&GuestGroup> {
        let key = self.selected.as_ref()?;
        self.groups.iter().find(|g| &g.key() == key)
    }

    pub fn selected_index(&self) -> Option<usize> {
        let key = self.selected.as_ref()?;
        self.groups.iter().position(|g| &g.key() == key)
    }

    pub fn active_group(&self) -> Option<&GuestGroup> {
        self.active_group.as_ref()
    }

    pub fn phase(&self) -> WizardPhase {
        self.phase
    }

    pub fn drafts(&self) -> &[GuestDraft] {
        &self.drafts
    }

    pub fn step(&self) -> usize {
        self.step
    }

    pub fn step_count(&self) -> usize {
        self.drafts.len()
    }

    pub fn is_last_step(&self) -> bool {
        self.step + 1 >= self.drafts.len()
    }

    pub fn current_draft(&self) -> Option<&GuestDraft> {
        self.drafts.get(self.step)
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_searching(&self) -> bool {
        self.searching
    }

    pub fn shared_transport_enabled(&self) -> bool {
        self.shared_enabled
    }

    pub fn shared_transport(&self) -> TransportChoice {
        self.shared
    }

    // =========================================================================
    // Search
    // =========================================================================

    /// Record new search input.
    ///
    /// Any search still in flight is invalidated and the previous results
    /// and selection are cleared, so nothing can be confirmed until the
    /// results for this query land. Returns the request to run, or `None`
    /// when the query is too short.
    pub fn set_query(&mut self, input: &str) -> Option<SearchRequest> {
        self.query = input.to_string();
        self.generation += 1;
        self.groups.clear();
        self.selected = None;

        let normalized = normalize_query(input);
        self.searching = is_searchable(&normalized);
        if !self.searching {
            return None;
        }

        Some(SearchRequest {
            generation: self.generation,
            query: normalized,
        })
    }

    /// Apply a finished search. Returns false when the outcome is stale.
    pub fn apply_search(&mut self, outcome: SearchOutcome) -> bool {
        if outcome.generation != self.generation {
            debug!(
                stale = outcome.generation,
                current = self.generation,
                "Discarding stale search result"
            );
            return false;
        }

        self.searching = false;
        self.groups = match outcome.result {
            Ok(groups) => groups,
            Err(e) => {
                warn!(error = %e, query = %self.query, "Guest search failed");
                Vec::new()
            }
        };

        self.selected = match self.groups.as_slice() {
            [only] => Some(only.key()),
            _ => None,
        };
        true
    }

    pub fn select_group_at(&mut self, index: usize) -> Result<(), WizardError> {
        let key = self
            .groups
            .get(index)
            .map(GuestGroup::key)
            .ok_or(WizardError::UnknownGroup)?;
        self.selected = Some(key);
        Ok(())
    }

    // =========================================================================
    // Wizard entry and navigation
    // =========================================================================

    /// Start confirming the selected group, one step per member.
    pub fn begin_wizard(&mut self) -> Result<(), WizardError> {
        let group = self
            .selected_group()
            .cloned()
            .ok_or(WizardError::NoGroupSelected)?;
        if group.is_empty() {
            return Err(WizardError::EmptyGroup);
        }

        self.drafts = group.members().iter().map(GuestDraft::from_guest).collect();
        self.active_group = Some(group);
        self.step = 0;
        self.shared_enabled = false;
        self.shared = TransportChoice::default();
        self.phase = WizardPhase::Editing;
        debug!(guests = self.drafts.len(), "Wizard started");
        Ok(())
    }

    /// Leave the wizard without saving. Search results are kept.
    pub fn back_to_search(&mut self) {
        self.drafts.clear();
        self.active_group = None;
        self.step = 0;
        self.shared_enabled = false;
        self.shared = TransportChoice::default();
        self.phase = WizardPhase::Searching;
    }

    /// Move to the next guest. Returns false at the last one.
    pub fn advance(&mut self) -> bool {
        if self.is_last_step() {
            return false;
        }
        self.step += 1;
        true
    }

    /// Move to the previous guest. Returns false at the first one.
    pub fn retreat(&mut self) -> bool {
        if self.step == 0 {
            return false;
        }
        self.step -= 1;
        true
    }

    // =========================================================================
    // Editing
    // =========================================================================

    /// Change one field of one guest's draft.
    ///
    /// While shared transport is on, bus edits change the shared choice for
    /// everyone.
    pub fn edit(&mut self, id: &GuestId, edit: DraftEdit) -> Result<(), WizardError> {
        let index = self
            .drafts
            .iter()
            .position(|d| &d.id == id)
            .ok_or_else(|| WizardError::UnknownGuest(id.clone()))?;

        match edit {
            DraftEdit::Departure(route) if self.shared_enabled => {
                self.set_shared_departure(route);
            }
            DraftEdit::Return(route) if self.shared_enabled => {
                self.set_shared_return(route);
            }
            edit => self.drafts[index].apply(edit),
        }
        Ok(())
    }

    /// Shared transport is offered on the first step of a real group.
    pub fn shared_transport_available(&self) -> bool {
        self.phase == WizardPhase::Editing
            && self.step == 0
            && self.drafts.len() > 1
            && self
                .active_group
                .as_ref()
                .map(|g| !g.is_individual())
                .unwrap_or(false)
    }

    /// Turn shared transport on or off.
    ///
    /// Turning it on copies the current guest's bus choices to everyone.
    /// Turning it off leaves every draft with the last shared values.
    pub fn set_shared_transport(&mut self, enabled: bool) -> Result<(), WizardError> {
        if !enabled {
            self.shared_enabled = false;
            return Ok(());
        }
        if !self.shared_transport_available() {
            return Err(WizardError::SharedTransportUnavailable);
        }

        self.shared = self
            .current_draft()
            .map(GuestDraft::transport)
            .unwrap_or_default();
        self.shared_enabled = true;
        self.broadcast_shared();
        Ok(())
    }

    pub fn set_shared_departure(&mut self, route: BusDeparture) {
        self.shared.departure = route;
        if self.shared_enabled {
            self.broadcast_shared();
        }
    }

    pub fn set_shared_return(&mut self, route: BusReturn) {
        self.shared.return_trip = route;
        if self.shared_enabled {
            self.broadcast_shared();
        }
    }

    fn broadcast_shared(&mut self) {
        let shared = self.shared;
        for draft in &mut self.drafts {
            draft.set_transport(shared);
        }
    }

    // =========================================================================
    // Submission
    // =========================================================================

    pub fn validate(&self) -> Result<(), WizardError> {
        match self.drafts.iter().find(|d| d.is_missing_dietary_detail()) {
            Some(draft) => Err(WizardError::MissingDietaryDetail(draft.name.clone())),
            None => Ok(()),
        }
    }

    /// The writes a submission would make, in step order.
    pub fn submission_plan(&self) -> Result<Vec<PlannedUpdate>, WizardError> {
        if self.phase != WizardPhase::Editing || self.drafts.is_empty() {
            return Err(WizardError::NotEditing);
        }
        self.validate()?;

        Ok(self
            .drafts
            .iter()
            .map(|draft| PlannedUpdate {
                id: draft.id.clone(),
                name: draft.name.clone(),
                update: draft.to_update(),
            })
            .collect())
    }

    /// Apply the result of a submission run elsewhere.
    ///
    /// Success resets the session to an empty search. On failure the wizard
    /// stays where it was.
    pub fn finish_submission(&mut self, outcome: &Result<usize, SubmitError>) {
        if outcome.is_ok() {
            self.reset();
        }
    }

    /// Validate, write every draft in order, and reset on success.
    pub async fn submit<S>(&mut self, store: &S) -> Result<usize, SubmitError>
    where
        S: GuestStore + ?Sized,
    {
        let plan = self.submission_plan()?;
        let outcome = submit_updates(store, &plan).await;
        self.finish_submission(&outcome);
        outcome
    }

    /// Back to an empty search. Searches still in flight become stale.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiError;
    use crate::models::{DietaryChoice, Guest};
    use crate::store::MemoryStore;
    use crate::wizard::search::resolve_groups;

    fn garcia_family() -> Vec<Guest> {
        vec![
            Guest::new("1", "Juan García", Some("Familia García")),
            Guest::new("2", "Ana García", Some("Familia García")),
            Guest::new("3", "Abuela Rosa", Some("Familia García")),
        ]
    }

    fn family_group() -> GuestGroup {
        GuestGroup::Named {
            label: "Familia García".to_string(),
            guests: garcia_family(),
        }
    }

    /// Session with the García family found and the wizard started.
    fn editing_session() -> WizardSession {
        let mut session = WizardSession::new();
        let request = session.set_query("Gar").expect("query is long enough");
        session.apply_search(SearchOutcome {
            generation: request.generation,
            result: Ok(vec![family_group()]),
        });
        session.begin_wizard().expect("wizard starts");
        session
    }

    #[test]
    fn test_short_query_clears_results_and_selection() {
        let mut session = WizardSession::new();
        let request = session.set_query("Gar").expect("searchable");
        session.apply_search(SearchOutcome {
            generation: request.generation,
            result: Ok(vec![family_group()]),
        });
        assert!(session.selected_key().is_some());

        for short in ["", "G", "Ga", "  Ga  "] {
            assert_eq!(session.set_query(short), None);
            assert!(session.groups().is_empty());
            assert!(session.selected_key().is_none());
        }
    }

    #[test]
    fn test_single_group_is_auto_selected() {
        let mut session = WizardSession::new();
        let request = session.set_query("García").expect("searchable");
        assert!(session.apply_search(SearchOutcome {
            generation: request.generation,
            result: Ok(vec![family_group()]),
        }));
        assert_eq!(
            session.selected_key(),
            Some(&GroupKey::Named("Familia García".to_string()))
        );
    }

    #[test]
    fn test_multiple_groups_clear_selection() {
        let mut session = WizardSession::new();
        let first = session.set_query("García").expect("searchable");
        session.apply_search(SearchOutcome {
            generation: first.generation,
            result: Ok(vec![family_group()]),
        });

        let second = session.set_query("Gar").expect("searchable");
        session.apply_search(SearchOutcome {
            generation: second.generation,
            result: Ok(vec![
                family_group(),
                GuestGroup::Individual(Guest::new("9", "Marta Garcés", None)),
            ]),
        });
        assert_eq!(session.groups().len(), 2);
        assert!(session.selected_key().is_none());
    }

    #[test]
    fn test_new_query_drops_previous_selection() {
        let mut session = WizardSession::new();
        let first = session.set_query("García").expect("searchable");
        session.apply_search(SearchOutcome {
            generation: first.generation,
            result: Ok(vec![family_group()]),
        });
        assert!(session.selected_key().is_some());

        let second = session.set_query("Pablo").expect("searchable");
        assert!(session.is_searching());
        assert!(session.groups().is_empty());
        assert!(session.selected_key().is_none());
        assert_eq!(session.begin_wizard(), Err(WizardError::NoGroupSelected));
        assert_eq!(session.phase(), WizardPhase::Searching);

        session.apply_search(SearchOutcome {
            generation: second.generation,
            result: Ok(vec![GuestGroup::Individual(Guest::new("7", "Pablo Ruiz", None))]),
        });
        assert!(!session.is_searching());
        assert!(session.begin_wizard().is_ok());
        assert_eq!(session.current_draft().map(|d| d.name.as_str()), Some("Pablo Ruiz"));
    }

    #[test]
    fn test_stale_search_result_is_discarded() {
        let mut session = WizardSession::new();
        let old = session.set_query("Gar").expect("searchable");
        let new = session.set_query("Garcés").expect("searchable");

        assert!(!session.apply_search(SearchOutcome {
            generation: old.generation,
            result: Ok(vec![family_group()]),
        }));
        assert!(session.groups().is_empty());

        assert!(session.apply_search(SearchOutcome {
            generation: new.generation,
            result: Ok(vec![GuestGroup::Individual(Guest::new("9", "Marta Garcés", None))]),
        }));
        assert_eq!(session.groups().len(), 1);
    }

    #[test]
    fn test_shortening_query_invalidates_pending_search() {
        let mut session = WizardSession::new();
        let pending = session.set_query("Gar").expect("searchable");
        session.set_query("Ga");
        assert!(!session.apply_search(SearchOutcome {
            generation: pending.generation,
            result: Ok(vec![family_group()]),
        }));
        assert!(session.groups().is_empty());
    }

    #[test]
    fn test_failed_search_reads_as_no_matches() {
        let mut session = WizardSession::new();
        let request = session.set_query("Gar").expect("searchable");
        assert!(session.apply_search(SearchOutcome {
            generation: request.generation,
            result: Err(ApiError::ServerError("down".to_string())),
        }));
        assert!(session.groups().is_empty());
        assert!(session.selected_key().is_none());
    }

    #[test]
    fn test_begin_requires_selection() {
        let mut session = WizardSession::new();
        assert_eq!(session.begin_wizard(), Err(WizardError::NoGroupSelected));
        assert_eq!(session.phase(), WizardPhase::Searching);
    }

    #[test]
    fn test_begin_rejects_empty_group() {
        let mut session = WizardSession::new();
        let request = session.set_query("Vecinos").expect("searchable");
        session.apply_search(SearchOutcome {
            generation: request.generation,
            result: Ok(vec![GuestGroup::Named {
                label: "Vecinos".to_string(),
                guests: Vec::new(),
            }]),
        });
        assert_eq!(session.begin_wizard(), Err(WizardError::EmptyGroup));
    }

    #[test]
    fn test_begin_seeds_drafts() {
        let session = editing_session();
        assert_eq!(session.phase(), WizardPhase::Editing);
        assert_eq!(session.step(), 0);
        assert_eq!(session.step_count(), 3);
        assert!(session.drafts().iter().all(|d| d.attending));
        assert_eq!(session.current_draft().map(|d| d.name.as_str()), Some("Juan García"));
    }

    #[test]
    fn test_step_index_stays_in_range() {
        let mut session = editing_session();
        assert!(!session.retreat());
        assert_eq!(session.step(), 0);

        // Deterministic pseudo-random walk.
        let mut seed: u32 = 17;
        for _ in 0..200 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            if seed % 3 == 0 {
                session.retreat();
            } else {
                session.advance();
            }
            assert!(session.step() < session.step_count());
        }

        while session.advance() {}
        assert_eq!(session.step(), 2);
        assert!(!session.advance());
        assert_eq!(session.step(), 2);
    }

    #[test]
    fn test_navigation_does_not_touch_drafts() {
        let mut session = editing_session();
        let before = session.drafts().to_vec();
        session.advance();
        session.advance();
        session.retreat();
        assert_eq!(session.drafts(), before.as_slice());
    }

    #[test]
    fn test_edit_targets_one_guest() {
        let mut session = editing_session();
        let ana = GuestId::new("2");
        session
            .edit(&ana, DraftEdit::Dietary(DietaryChoice::Vegan))
            .expect("edit");
        session
            .edit(&ana, DraftEdit::Attending(false))
            .expect("edit");

        let drafts = session.drafts();
        assert_eq!(drafts[1].dietary, DietaryChoice::Vegan);
        assert!(!drafts[1].attending);
        assert_eq!(drafts[0].dietary, DietaryChoice::None);
        assert!(drafts[0].attending);

        assert_eq!(
            session.edit(&GuestId::new("nope"), DraftEdit::Attending(true)),
            Err(WizardError::UnknownGuest(GuestId::new("nope")))
        );
    }

    #[test]
    fn test_enabling_shared_transport_broadcasts_current_guest() {
        let mut session = editing_session();
        let juan = GuestId::new("1");
        session
            .edit(&juan, DraftEdit::Departure(BusDeparture::FromMadrid))
            .expect("edit");
        session
            .edit(&GuestId::new("3"), DraftEdit::Return(BusReturn::ToMostoles))
            .expect("edit");

        assert!(session.shared_transport_available());
        session.set_shared_transport(true).expect("enable");

        for draft in session.drafts() {
            assert_eq!(draft.departure, BusDeparture::FromMadrid);
            assert_eq!(draft.return_trip, BusReturn::None);
        }
    }

    #[test]
    fn test_shared_changes_rebroadcast_and_disable_keeps_values() {
        let mut session = editing_session();
        session.set_shared_transport(true).expect("enable");
        session.set_shared_return(BusReturn::ToMadrid);
        assert!(session
            .drafts()
            .iter()
            .all(|d| d.return_trip == BusReturn::ToMadrid));

        // A per-guest bus edit while shared goes to everyone.
        session
            .edit(&GuestId::new("2"), DraftEdit::Departure(BusDeparture::FromMostoles))
            .expect("edit");
        assert!(session
            .drafts()
            .iter()
            .all(|d| d.departure == BusDeparture::FromMostoles));

        session.set_shared_transport(false).expect("disable");
        session
            .edit(&GuestId::new("2"), DraftEdit::Departure(BusDeparture::None))
            .expect("edit");
        let drafts = session.drafts();
        assert_eq!(drafts[0].departure, BusDeparture::FromMostoles);
        assert_eq!(drafts[1].departure, BusDeparture::None);
        assert_eq!(drafts[2].return_trip, BusReturn::ToMadrid);
    }

    #[test]
    fn test_shared_transport_only_on_first_step_of_named_group() {
        let mut session = editing_session();
        session.advance();
        assert!(!session.shared_transport_available());
        assert_eq!(
            session.set_shared_transport(true),
            Err(WizardError::SharedTransportUnavailable)
        );

        let mut single = WizardSession::new();
        let request = single.set_query("Marta").expect("searchable");
        single.apply_search(SearchOutcome {
            generation: request.generation,
            result: Ok(vec![GuestGroup::Individual(Guest::new("9", "Marta Soler", None))]),
        });
        single.begin_wizard().expect("start");
        assert!(!single.shared_transport_available());
    }

    #[test]
    fn test_submission_plan_requires_dietary_detail() {
        let mut session = editing_session();
        session
            .edit(&GuestId::new("3"), DraftEdit::Dietary(DietaryChoice::Other))
            .expect("edit");
        assert_eq!(
            session.submission_plan(),
            Err(WizardError::MissingDietaryDetail("Abuela Rosa".to_string()))
        );
    }

    #[test]
    fn test_submission_plan_outside_wizard() {
        assert_eq!(
            WizardSession::new().submission_plan(),
            Err(WizardError::NotEditing)
        );
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_wizard_open() {
        let store = MemoryStore::with_guests(garcia_family());
        store.fail_updates_for(&GuestId::new("2")).await;

        let mut session = editing_session();
        session.advance();
        session.advance();

        let err = session.submit(&store).await.expect_err("second write fails");
        match &err {
            SubmitError::Persist { failed, .. } => assert_eq!(failed, &GuestId::new("2")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert_eq!(err.committed(), &[GuestId::new("1")]);
        assert_eq!(store.update_log().await, vec![GuestId::new("1")]);

        let juan = store.guest(&GuestId::new("1")).await.expect("exists");
        assert_eq!(juan.attending, Some(true));
        let rosa = store.guest(&GuestId::new("3")).await.expect("exists");
        assert_eq!(rosa.attending, None);

        assert_eq!(session.phase(), WizardPhase::Editing);
        assert_eq!(session.step(), 2);
        assert_eq!(session.step_count(), 3);
    }

    #[tokio::test]
    async fn test_successful_submit_resets_session() {
        let store = MemoryStore::with_guests(garcia_family());
        let mut session = WizardSession::new();
        let request = session.set_query("Gar").expect("searchable");
        let groups = resolve_groups(&store, &request.query).await;
        session.apply_search(SearchOutcome {
            generation: request.generation,
            result: groups,
        });
        session.begin_wizard().expect("start");
        let generation = session.generation();

        assert_eq!(session.submit(&store).await.expect("submit"), 3);
        assert_eq!(session.phase(), WizardPhase::Searching);
        assert_eq!(session.query(), "");
        assert!(session.groups().is_empty());
        assert!(session.drafts().is_empty());
        assert_eq!(session.step(), 0);
        assert!(session.generation() > generation);
        assert_eq!(store.update_log().await.len(), 3);
    }
}
