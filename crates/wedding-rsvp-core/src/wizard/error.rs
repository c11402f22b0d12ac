use thiserror::Error;

use crate::api::ApiError;
use crate::models::GuestId;

/// Problems caught locally, before any request is sent.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WizardError {
    #[error("Selecciona un grupo para continuar")]
    NoGroupSelected,

    #[error("El grupo seleccionado no tiene invitados")]
    EmptyGroup,

    #[error("Grupo no encontrado en los resultados")]
    UnknownGroup,

    #[error("Invitado desconocido: {0}")]
    UnknownGuest(GuestId),

    #[error("El transporte compartido no está disponible en este paso")]
    SharedTransportUnavailable,

    #[error("Indica la restricción alimentaria de {0}")]
    MissingDietaryDetail(String),

    #[error("No hay ninguna confirmación en curso")]
    NotEditing,
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Invalid(#[from] WizardError),

    /// A write failed part-way. Guests in `committed` were already saved.
    #[error("No se pudo guardar la confirmación de {failed_name}: {source}")]
    Persist {
        committed: Vec<GuestId>,
        failed: GuestId,
        failed_name: String,
        #[source]
        source: ApiError,
    },
}

impl SubmitError {
    /// Guests written before the failure.
    pub fn committed(&self) -> &[GuestId] {
        match self {
            SubmitError::Invalid(_) => &[],
            SubmitError::Persist { committed, .. } => committed,
        }
    }
}
