use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel some clients store instead of a null route.
const NONE_SENTINEL: &str = "none";

/// Opaque guest identity as issued by the backend.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GuestId(pub String);

impl GuestId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GuestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attendance tri-state. Stored as a nullable boolean.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Attendance {
    #[default]
    Unknown,
    Attending,
    NotAttending,
}

impl Attendance {
    pub fn from_option(value: Option<bool>) -> Self {
        match value {
            Some(true) => Attendance::Attending,
            Some(false) => Attendance::NotAttending,
            None => Attendance::Unknown,
        }
    }
}

impl fmt::Display for Attendance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attendance::Attending => write!(f, "Confirmado"),
            Attendance::NotAttending => write!(f, "No asiste"),
            Attendance::Unknown => write!(f, "Pendiente"),
        }
    }
}

/// A guest record as stored by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Guest {
    pub id: GuestId,
    pub name: String,
    #[serde(default)]
    pub group_name: Option<String>,
    #[serde(default)]
    pub attending: Option<bool>,
    #[serde(default)]
    pub dietary_restrictions: Option<String>,
    #[serde(default)]
    pub bus_departure: Option<String>,
    #[serde(default)]
    pub bus_return: Option<String>,
    #[serde(default)]
    pub special_notes: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Guest {
    /// Minimal guest with no answers recorded yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>, group_name: Option<&str>) -> Self {
        Self {
            id: GuestId::new(id),
            name: name.into(),
            group_name: group_name.map(str::to_string),
            attending: None,
            dietary_restrictions: None,
            bus_departure: None,
            bus_return: None,
            special_notes: None,
            created_at: None,
        }
    }

    pub fn attendance(&self) -> Attendance {
        Attendance::from_option(self.attending)
    }

    /// Group label, with blank labels treated as absent.
    pub fn group_label(&self) -> Option<&str> {
        self.group_name
            .as_deref()
            .map(str::trim)
            .filter(|label| !label.is_empty())
    }

    pub fn departure(&self) -> BusDeparture {
        BusDeparture::from_stored(self.bus_departure.as_deref())
    }

    pub fn return_trip(&self) -> BusReturn {
        BusReturn::from_stored(self.bus_return.as_deref())
    }

    pub fn dietary(&self) -> DietaryChoice {
        DietaryChoice::from_stored(self.dietary_restrictions.as_deref())
    }

    /// Apply an update locally, mirroring what the backend does on PATCH.
    pub fn apply(&mut self, update: &GuestUpdate) {
        self.attending = update.attending;
        self.dietary_restrictions = update.dietary_restrictions.clone();
        self.bus_departure = update.bus_departure.clone();
        self.bus_return = update.bus_return.clone();
        self.special_notes = update.special_notes.clone();
    }
}

/// Dietary restriction category selected in the wizard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DietaryChoice {
    #[default]
    None,
    Vegetarian,
    Vegan,
    GlutenFree,
    Other,
}

impl DietaryChoice {
    pub const ALL: [DietaryChoice; 5] = [
        DietaryChoice::None,
        DietaryChoice::Vegetarian,
        DietaryChoice::Vegan,
        DietaryChoice::GlutenFree,
        DietaryChoice::Other,
    ];

    pub fn label(self) -> &'static str {
        match self {
            DietaryChoice::None => "Ninguna",
            DietaryChoice::Vegetarian => "Vegetariano",
            DietaryChoice::Vegan => "Vegano",
            DietaryChoice::GlutenFree => "Sin gluten",
            DietaryChoice::Other => "Otras alergias",
        }
    }

    /// Map a stored value back to a category. Unknown text is an override.
    pub fn from_stored(value: Option<&str>) -> Self {
        let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
            return DietaryChoice::None;
        };
        if value.eq_ignore_ascii_case(NONE_SENTINEL) {
            return DietaryChoice::None;
        }
        Self::ALL
            .into_iter()
            .filter(|c| *c != DietaryChoice::Other)
            .find(|c| c.label().eq_ignore_ascii_case(value))
            .unwrap_or(DietaryChoice::Other)
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        let idx = Self::ALL.iter().position(|c| *c == self).unwrap_or(0);
        Self::ALL[(idx + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Outbound bus route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusDeparture {
    #[default]
    None,
    FromMadrid,
    FromMostoles,
}

impl BusDeparture {
    pub const ALL: [BusDeparture; 3] = [
        BusDeparture::None,
        BusDeparture::FromMadrid,
        BusDeparture::FromMostoles,
    ];

    pub fn route(self) -> Option<&'static str> {
        match self {
            BusDeparture::None => None,
            BusDeparture::FromMadrid => Some("Salida desde Madrid"),
            BusDeparture::FromMostoles => Some("Salida desde Móstoles"),
        }
    }

    pub fn label(self) -> &'static str {
        self.route().unwrap_or("No necesito autobús")
    }

    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(v) => Self::ALL
                .into_iter()
                .find(|d| d.route() == Some(v))
                .unwrap_or(BusDeparture::None),
            None => BusDeparture::None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|d| *d == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Return bus route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BusReturn {
    #[default]
    None,
    ToMadrid,
    ToMostoles,
}

impl BusReturn {
    pub const ALL: [BusReturn; 3] = [BusReturn::None, BusReturn::ToMadrid, BusReturn::ToMostoles];

    pub fn route(self) -> Option<&'static str> {
        match self {
            BusReturn::None => None,
            BusReturn::ToMadrid => Some("Vuelta a Madrid"),
            BusReturn::ToMostoles => Some("Vuelta a Móstoles"),
        }
    }

    pub fn label(self) -> &'static str {
        self.route().unwrap_or("No necesito autobús")
    }

    pub fn from_stored(value: Option<&str>) -> Self {
        match value {
            Some(v) => Self::ALL
                .into_iter()
                .find(|r| r.route() == Some(v))
                .unwrap_or(BusReturn::None),
            None => BusReturn::None,
        }
    }

    pub fn next(self) -> Self {
        let idx = Self::ALL.iter().position(|r| *r == self).unwrap_or(0);
        Self::ALL[(idx + 1) % Self::ALL.len()]
    }
}

/// Fields written by the wizard for one guest. `None` is sent as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestUpdate {
    pub attending: Option<bool>,
    pub dietary_restrictions: Option<String>,
    pub bus_departure: Option<String>,
    pub bus_return: Option<String>,
    pub special_notes: Option<String>,
}

/// Body for creating a guest from the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewGuest {
    pub name: String,
    pub group_name: String,
    pub attending: Option<bool>,
    pub bus_departure: Option<String>,
    pub bus_return: Option<String>,
}

impl NewGuest {
    pub fn new(name: impl Into<String>, group_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            group_name: group_name.into(),
            attending: None,
            bus_departure: None,
            bus_return: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attendance_from_nullable_bool() {
        assert_eq!(Attendance::from_option(None), Attendance::Unknown);
        assert_eq!(Attendance::from_option(Some(true)), Attendance::Attending);
        assert_eq!(Attendance::from_option(Some(false)), Attendance::NotAttending);
    }

    #[test]
    fn test_dietary_from_stored() {
        assert_eq!(DietaryChoice::from_stored(None), DietaryChoice::None);
        assert_eq!(DietaryChoice::from_stored(Some("  ")), DietaryChoice::None);
        assert_eq!(DietaryChoice::from_stored(Some("none")), DietaryChoice::None);
        assert_eq!(DietaryChoice::from_stored(Some("Vegano")), DietaryChoice::Vegan);
        assert_eq!(DietaryChoice::from_stored(Some("sin gluten")), DietaryChoice::GlutenFree);
        assert_eq!(
            DietaryChoice::from_stored(Some("Intolerancia a frutos secos")),
            DietaryChoice::Other
        );
    }

    #[test]
    fn test_dietary_cycle_wraps() {
        assert_eq!(DietaryChoice::Other.next(), DietaryChoice::None);
        assert_eq!(DietaryChoice::None.prev(), DietaryChoice::Other);
    }

    #[test]
    fn test_bus_routes_treat_sentinel_as_none() {
        assert_eq!(BusDeparture::from_stored(Some("none")), BusDeparture::None);
        assert_eq!(
            BusDeparture::from_stored(Some("Salida desde Madrid")),
            BusDeparture::FromMadrid
        );
        assert_eq!(BusReturn::from_stored(Some("Vuelta a Móstoles")), BusReturn::ToMostoles);
        assert_eq!(BusReturn::None.route(), None);
        assert_eq!(BusReturn::ToMostoles.next(), BusReturn::None);
    }

    #[test]
    fn test_group_label_ignores_blank() {
        let mut guest = Guest::new("1", "Ana", Some("   "));
        assert_eq!(guest.group_label(), None);
        guest.group_name = Some("Familia García".to_string());
        assert_eq!(guest.group_label(), Some("Familia García"));
    }

    #[test]
    fn test_parse_backend_row() {
        let json = r#"{"id":"5b1c","name":"Juan García","group_name":"Familia García","attending":null,"bus_departure":"none","bus_return":null,"created_at":"2025-11-02T10:00:00+00:00"}"#;
        let guest: Guest = serde_json::from_str(json).expect("Failed to parse guest row");
        assert_eq!(guest.id.as_str(), "5b1c");
        assert_eq!(guest.attendance(), Attendance::Unknown);
        assert_eq!(guest.departure(), BusDeparture::None);
        assert!(guest.special_notes.is_none());
        assert!(guest.created_at.is_some());
    }
}
