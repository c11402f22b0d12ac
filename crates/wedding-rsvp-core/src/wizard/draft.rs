use tracing::warn;

use crate::models::{BusDeparture, BusReturn, DietaryChoice, Guest, GuestId, GuestUpdate};

/// Bus choices that can be shared by a whole group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransportChoice {
    pub departure: BusDeparture,
    pub return_trip: BusReturn,
}

/// A single-field change to one draft.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftEdit {
    Attending(bool),
    Dietary(DietaryChoice),
    DietaryOther(String),
    Departure(BusDeparture),
    Return(BusReturn),
    Notes(String),
}

/// The wizard's working copy of one guest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuestDraft {
    pub id: GuestId,
    pub name: String,
    pub attending: bool,
    pub dietary: DietaryChoice,
    /// Free text used when `dietary` is `Other`.
    pub dietary_other: String,
    pub departure: BusDeparture,
    pub return_trip: BusReturn,
    pub notes: String,
    /// Stored departure text that names no known route. Written back
    /// unchanged until the departure is edited.
    pub kept_departure: Option<String>,
    /// Same as `kept_departure`, for the return trip.
    pub kept_return: Option<String>,
}

/// Stored route text that did not parse to a known route.
fn unrecognized_route(stored: Option<&str>, known: Option<&str>) -> Option<String> {
    let text = stored.map(str::trim).filter(|t| !t.is_empty() && *t != "none")?;
    match known {
        Some(_) => None,
        None => Some(text.to_string()),
    }
}

impl GuestDraft {
    /// Seed a draft from the stored record. Unanswered attendance starts checked.
    pub fn from_guest(guest: &Guest) -> Self {
        let dietary = guest.dietary();
        let dietary_other = match dietary {
            DietaryChoice::Other => guest.dietary_restrictions.clone().unwrap_or_default(),
            _ => String::new(),
        };

        let departure = guest.departure();
        let return_trip = guest.return_trip();
        let kept_departure = unrecognized_route(guest.bus_departure.as_deref(), departure.route());
        let kept_return = unrecognized_route(guest.bus_return.as_deref(), return_trip.route());
        if kept_departure.is_some() || kept_return.is_some() {
            warn!(
                guest = %guest.id,
                departure = ?kept_departure,
                return_trip = ?kept_return,
                "Stored bus route not recognized; keeping it as is"
            );
        }

        Self {
            id: guest.id.clone(),
            name: guest.name.clone(),
            attending: guest.attending.unwrap_or(true),
            dietary,
            dietary_other,
            departure,
            return_trip,
            notes: guest.special_notes.clone().unwrap_or_default(),
            kept_departure,
            kept_return,
        }
    }

    pub fn transport(&self) -> TransportChoice {
        TransportChoice {
            departure: self.departure,
            return_trip: self.return_trip,
        }
    }

    pub fn set_transport(&mut self, transport: TransportChoice) {
        self.departure = transport.departure;
        self.return_trip = transport.return_trip;
        self.kept_departure = None;
        self.kept_return = None;
    }

    pub fn departure_label(&self) -> &str {
        self.kept_departure
            .as_deref()
            .unwrap_or_else(|| self.departure.label())
    }

    pub fn return_label(&self) -> &str {
        self.kept_return
            .as_deref()
            .unwrap_or_else(|| self.return_trip.label())
    }

    pub fn apply(&mut self, edit: DraftEdit) {
        match edit {
            DraftEdit::Attending(value) => self.attending = value,
            DraftEdit::Dietary(choice) => self.dietary = choice,
            DraftEdit::DietaryOther(text) => self.dietary_other = text,
            DraftEdit::Departure(route) => {
                self.departure = route;
                self.kept_departure = None;
            }
            DraftEdit::Return(route) => {
                self.return_trip = route;
                self.kept_return = None;
            }
            DraftEdit::Notes(text) => self.notes = text,
        }
    }

    /// An attending guest who picked "other" must say what it is.
    pub fn is_missing_dietary_detail(&self) -> bool {
        self.attending
            && self.dietary == DietaryChoice::Other
            && self.dietary_other.trim().is_empty()
    }

    /// The stored form of this draft. Fields hidden while not attending are
    /// sent as null.
    pub fn to_update(&self) -> GuestUpdate {
        let notes = Some(self.notes.trim())
            .filter(|n| !n.is_empty())
            .map(str::to_string);

        if !self.attending {
            return GuestUpdate {
                attending: Some(false),
                dietary_restrictions: None,
                bus_departure: None,
                bus_return: None,
                special_notes: notes,
            };
        }

        let dietary_restrictions = match self.dietary {
            DietaryChoice::None => None,
            DietaryChoice::Other => Some(self.dietary_other.trim())
                .filter(|t| !t.is_empty())
                .map(str::to_string),
            choice => Some(choice.label().to_string()),
        };

        GuestUpdate {
            attending: Some(true),
            dietary_restrictions,
            bus_departure: self
                .departure
                .route()
                .map(str::to_string)
                .or_else(|| self.kept_departure.clone()),
            bus_return: self
                .return_trip
                .route()
                .map(str::to_string)
                .or_else(|| self.kept_return.clone()),
            special_notes: notes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_attendance_defaults_to_attending() {
        let guest = Guest::new("1", "Juan García", Some("Familia García"));
        let draft = GuestDraft::from_guest(&guest);
        assert!(draft.attending);
        assert_eq!(draft.dietary, DietaryChoice::None);
        assert_eq!(draft.transport(), TransportChoice::default());
    }

    #[test]
    fn test_declined_guest_stays_declined() {
        let mut guest = Guest::new("1", "Juan García", None);
        guest.attending = Some(false);
        assert!(!GuestDraft::from_guest(&guest).attending);
    }

    #[test]
    fn test_stored_override_text_is_reloaded() {
        let mut guest = Guest::new("1", "Ana García", None);
        guest.dietary_restrictions = Some("Intolerancia a frutos secos".to_string());
        let draft = GuestDraft::from_guest(&guest);
        assert_eq!(draft.dietary, DietaryChoice::Other);
        assert_eq!(draft.dietary_other, "Intolerancia a frutos secos");
    }

    #[test]
    fn test_other_persists_override_text() {
        let mut draft = GuestDraft::from_guest(&Guest::new("1", "Ana García", None));
        draft.apply(DraftEdit::Dietary(DietaryChoice::Other));
        draft.apply(DraftEdit::DietaryOther("Intolerancia a frutos secos".to_string()));
        assert_eq!(
            draft.to_update().dietary_restrictions.as_deref(),
            Some("Intolerancia a frutos secos")
        );
    }

    #[test]
    fn test_none_and_sentinels_persist_as_absent() {
        let mut draft = GuestDraft::from_guest(&Guest::new("1", "Ana García", None));
        draft.apply(DraftEdit::Notes("   ".to_string()));
        let update = draft.to_update();
        assert_eq!(update.attending, Some(true));
        assert_eq!(update.dietary_restrictions, None);
        assert_eq!(update.bus_departure, None);
        assert_eq!(update.bus_return, None);
        assert_eq!(update.special_notes, None);
    }

    #[test]
    fn test_named_category_persists_label() {
        let mut draft = GuestDraft::from_guest(&Guest::new("1", "Ana García", None));
        draft.apply(DraftEdit::Dietary(DietaryChoice::GlutenFree));
        draft.apply(DraftEdit::Departure(BusDeparture::FromMostoles));
        let update = draft.to_update();
        assert_eq!(update.dietary_restrictions.as_deref(), Some("Sin gluten"));
        assert_eq!(update.bus_departure.as_deref(), Some("Salida desde Móstoles"));
    }

    #[test]
    fn test_declining_keeps_fields_in_draft_but_not_in_update() {
        let mut draft = GuestDraft::from_guest(&Guest::new("1", "Ana García", None));
        draft.apply(DraftEdit::Dietary(DietaryChoice::Vegan));
        draft.apply(DraftEdit::Departure(BusDeparture::FromMadrid));
        draft.apply(DraftEdit::Notes("Llegamos tarde".to_string()));
        draft.apply(DraftEdit::Attending(false));

        assert_eq!(draft.dietary, DietaryChoice::Vegan);
        assert_eq!(draft.departure, BusDeparture::FromMadrid);

        let update = draft.to_update();
        assert_eq!(update.attending, Some(false));
        assert_eq!(update.dietary_restrictions, None);
        assert_eq!(update.bus_departure, None);
        assert_eq!(update.special_notes.as_deref(), Some("Llegamos tarde"));
    }

    #[test]
    fn test_unrecognized_route_survives_unrelated_edits() {
        let mut guest = Guest::new("1", "Ana García", None);
        guest.attending = Some(true);
        guest.bus_departure = Some("Salida desde Alcorcón".to_string());
        guest.bus_return = Some("Vuelta a Madrid".to_string());

        let mut draft = GuestDraft::from_guest(&guest);
        assert_eq!(draft.departure, BusDeparture::None);
        assert_eq!(draft.departure_label(), "Salida desde Alcorcón");
        assert_eq!(draft.kept_return, None);

        draft.apply(DraftEdit::Notes("Llevo silla de bebé".to_string()));
        let update = draft.to_update();
        assert_eq!(update.bus_departure.as_deref(), Some("Salida desde Alcorcón"));
        assert_eq!(update.bus_return.as_deref(), Some("Vuelta a Madrid"));
    }

    #[test]
    fn test_editing_route_replaces_unrecognized_text() {
        let mut guest = Guest::new("1", "Ana García", None);
        guest.bus_departure = Some("Salida desde Alcorcón".to_string());

        let mut draft = GuestDraft::from_guest(&guest);
        draft.apply(DraftEdit::Departure(BusDeparture::None));
        assert_eq!(draft.to_update().bus_departure, None);

        let mut draft = GuestDraft::from_guest(&guest);
        draft.apply(DraftEdit::Departure(BusDeparture::FromMadrid));
        assert_eq!(
            draft.to_update().bus_departure.as_deref(),
            Some("Salida desde Madrid")
        );
    }

    #[test]
    fn test_missing_dietary_detail() {
        let mut draft = GuestDraft::from_guest(&Guest::new("1", "Ana García", None));
        draft.apply(DraftEdit::Dietary(DietaryChoice::Other));
        assert!(draft.is_missing_dietary_detail());
        draft.apply(DraftEdit::Attending(false));
        assert!(!draft.is_missing_dietary_detail());
    }
}
