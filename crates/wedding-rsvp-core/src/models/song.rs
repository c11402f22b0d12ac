use serde::{Deserialize, Serialize};

/// A song suggested by a guest for the party playlist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongSuggestion {
    pub song_name: String,
    pub artist: String,
}
