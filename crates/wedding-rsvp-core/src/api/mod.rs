//! REST client for the hosted backend.
//!
//! This module provides `SupabaseClient`, which talks to the backend's
//! PostgREST data API (`/rest/v1`) and its password-grant auth endpoint
//! (`/auth/v1`). Requests carry the project's anon key; host-only
//! operations additionally carry the signed-in host's access token.

pub mod client;
pub mod error;

pub use client::SupabaseClient;
pub use error::ApiError;
