pub mod dashboard;
pub mod playlist;
pub mod rsvp;
