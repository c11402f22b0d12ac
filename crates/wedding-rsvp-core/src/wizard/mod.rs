//! The RSVP wizard.
//!
//! `WizardSession` is the whole client-side state of one confirmation:
//! search, group choice, per-guest drafts, step position and the shared
//! bus configuration. Backend work is split out (`resolve_groups`,
//! `submit_updates`) so a front end can run it off its event loop and hand
//! the result back.
//!
//! ```text
//! Searching --(>=3 chars, match)--> group selected --(begin)--> Editing(0)
//! Editing(n) --advance--> Editing(n+1)      Editing(n) --retreat--> Editing(n-1)
//! Editing(last) --submit ok--> Searching    Editing --submit err--> Editing
//! ```

pub mod draft;
pub mod error;
pub mod search;
pub mod session;
pub mod submit;

pub use draft::{DraftEdit, GuestDraft, TransportChoice};
pub use error::{SubmitError, WizardError};
pub use search::{
    is_searchable, normalize_query, resolve_groups, run_debounced, SearchOutcome, SearchRequest,
    MIN_QUERY_LEN,
};
pub use session::{WizardPhase, WizardSession};
pub use submit::{submit_updates, PlannedUpdate};
