use tracing::{error, info};

use super::error::SubmitError;
use crate::models::{GuestId, GuestUpdate};
use crate::store::GuestStore;

/// One guest's write, in the order the wizard showed them.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedUpdate {
    pub id: GuestId,
    pub name: String,
    pub update: GuestUpdate,
}

/// Write each update in order, stopping at the first failure.
///
/// Writes are awaited one at a time so the stored order always matches
/// step order. Updates already written before a failure stay written; the
/// error lists them.
pub async fn submit_updates<S>(store: &S, plan: &[PlannedUpdate]) -> Result<usize, SubmitError>
where
    S: GuestStore + ?Sized,
{
    let mut committed = Vec::with_capacity(plan.len());

    for planned in plan {
        if let Err(e) = store.update_guest(&planned.id, &planned.update).await {
            error!(
                guest_id = %planned.id,
                committed = committed.len(),
                remaining = plan.len() - committed.len(),
                error = %e,
                "Confirmation write failed"
            );
            return Err(SubmitError::Persist {
                committed,
                failed: planned.id.clone(),
                failed_name: planned.name.clone(),
                source: e,
            });
        }
        committed.push(planned.id.clone());
    }

    info!(count = committed.len(), "Confirmation saved");
    Ok(committed.len())
}
