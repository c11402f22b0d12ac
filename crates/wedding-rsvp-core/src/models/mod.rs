//! Data models for the wedding guest list.
//!
//! - `Guest` and its field types (`Attendance`, `DietaryChoice`, bus routes)
//! - `GuestGroup`: guests confirmed together, derived from group labels
//! - `GuestStats`, `StatusFilter`: dashboard aggregates
//! - `SongSuggestion`: playlist entries

pub mod group;
pub mod guest;
pub mod song;
pub mod stats;

pub use group::{group_by_label, GroupKey, GuestGroup};
pub use guest::{
    Attendance, BusDeparture, BusReturn, DietaryChoice, Guest, GuestId, GuestUpdate, NewGuest,
};
pub use song::SongSuggestion;
pub use stats::{filter_guests, BusUsage, GuestStats, StatusFilter};
