use thiserror::Error;

/// Failure of a backend call that has no typed answer. Definitive payment or
/// invoice failures are reported inside the response values instead.
#[derive(Debug, Error)]
pub enum LightningError {
    #[error("unsupported operation: {operation}")]
    Unsupported { operation: &'static str },
    #[error("status lookup failed for {checking_id}: {reason}")]
    LookupFailed { checking_id: String, reason: String },
}

impl LightningError {
    pub fn unsupported(operation: &'static str) -> Self {
        LightningError::Unsupported { operation }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, LightningError::Unsupported { .. })
    }
}
