//! The record-store seam.
//!
//! Everything the wizard, dashboard and playlist need from the backend is
//! expressed through these traits, so the same logic runs against the
//! hosted backend (`SupabaseClient`) or the in-process `MemoryStore`.

pub mod memory;

use async_trait::async_trait;

use crate::api::ApiError;
use crate::models::{Guest, GuestId, GuestUpdate, NewGuest, SongSuggestion};

pub use memory::MemoryStore;

pub type StoreResult<T> = std::result::Result<T, ApiError>;

#[async_trait]
pub trait GuestStore: Send + Sync {
    /// Short name used in logs.
    fn backend_tag(&self) -> &'static str;

    /// Guests whose name contains `query`, case-insensitively, ordered by name.
    async fn search_by_name(&self, query: &str) -> StoreResult<Vec<Guest>>;

    /// Guests with exactly this group label, ordered by name.
    async fn list_by_group(&self, label: &str) -> StoreResult<Vec<Guest>>;

    /// Every guest, ordered by group label then name.
    async fn list_all(&self) -> StoreResult<Vec<Guest>>;

    async fn update_guest(&self, id: &GuestId, update: &GuestUpdate) -> StoreResult<()>;

    async fn insert_guest(&self, guest: &NewGuest) -> StoreResult<()>;

    async fn delete_guest(&self, id: &GuestId) -> StoreResult<()>;
}

#[async_trait]
pub trait PlaylistStore: Send + Sync {
    async fn insert_song(&self, song: &SongSuggestion) -> StoreResult<()>;
}
