// Wizard error taxonomy
//
// Every variant carries a message that is safe to show in the UI.
// Internal details (status codes, raw transport errors) belong in logs only.

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum WizardError {
    /// Required fields are missing or malformed. Local, no I/O performed;
    /// the user stays on the current step and no state is lost.
    #[error("{0}")]
    Validation(String),

    /// A category list or listing record could not be fetched.
    #[error("{0}")]
    Fetch(String),

    /// Create/update of a listing failed. Wizard state is preserved and the
    /// submission may be retried.
    #[error("{0}")]
    Submission(String),

    /// Malformed embedded JSON in a stored record. Callers recover with a
    /// default value; this variant is surfaced in logs, never to the user.
    #[error("could not decode stored {field}: {detail}")]
    Parse { field: &'static str, detail: String },
}

impl WizardError {
    /// True when the error should keep the user on the current step
    /// (as opposed to aborting the session or degrading a fetch).
    pub fn is_validation(&self) -> bool {
        matches!(self, WizardError::Validation(_))
    }
}
