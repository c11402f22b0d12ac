//! Core library for a single-event wedding RSVP.
//!
//! - `wizard`: the guest confirmation state machine
//! - `store`: the record-store traits and an in-memory implementation
//! - `api`: the hosted backend client
//! - `admin`, `playlist`: the hosts' dashboard and song suggestions
//! - `auth`, `config`: host sign-in and application settings

pub mod admin;
pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod playlist;
pub mod store;
pub mod wizard;

pub use api::{ApiError, SupabaseClient};
pub use config::Config;
pub use store::{GuestStore, MemoryStore, PlaylistStore};
pub use wizard::{WizardError, WizardPhase, WizardSession};
