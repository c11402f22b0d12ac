//! Song suggestions for the party playlist.

use thiserror::Error;
use tracing::info;

use crate::api::ApiError;
use crate::models::SongSuggestion;
use crate::store::PlaylistStore;

#[derive(Error, Debug)]
pub enum PlaylistError {
    #[error("Por favor completa tanto el nombre de la canción como el artista")]
    MissingFields,

    #[error(transparent)]
    Api(#[from] ApiError),
}

pub async fn suggest_song<S>(store: &S, song: &str, artist: &str) -> Result<SongSuggestion, PlaylistError>
where
    S: PlaylistStore + ?Sized,
{
    let (song, artist) = (song.trim(), artist.trim());
    if song.is_empty() || artist.is_empty() {
        return Err(PlaylistError::MissingFields);
    }

    let suggestion = SongSuggestion {
        song_name: song.to_string(),
        artist: artist.to_string(),
    };
    store.insert_song(&suggestion).await?;
    info!("Song suggested");
    Ok(suggestion)
}
