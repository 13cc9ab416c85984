use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Backend-specific invoice options. Keys a backend does not recognize are ignored.
pub type InvoiceOptions = HashMap<String, serde_json::Value>;

/// Outcome that may be undetermined. Serialized as `true`, `false` or `null`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "Option<bool>", into = "Option<bool>")]
pub enum Tristate {
    Yes,
    No,
    #[default]
    Unknown,
}

impl Tristate {
    pub fn is_yes(self) -> bool {
        self == Tristate::Yes
    }

    pub fn is_no(self) -> bool {
        self == Tristate::No
    }

    pub fn is_unknown(self) -> bool {
        self == Tristate::Unknown
    }
}

impl From<Option<bool>> for Tristate {
    fn from(value: Option<bool>) -> Self {
        match value {
            Some(true) => Tristate::Yes,
            Some(false) => Tristate::No,
            None => Tristate::Unknown,
        }
    }
}

impl From<bool> for Tristate {
    fn from(value: bool) -> Self {
        Tristate::from(Some(value))
    }
}

impl From<Tristate> for Option<bool> {
    fn from(value: Tristate) -> Self {
        match value {
            Tristate::Yes => Some(true),
            Tristate::No => Some(false),
            Tristate::Unknown => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub error_message: Option<String>,
    pub balance_msat: i64,
}

impl StatusResponse {
    pub fn ok(balance_msat: i64) -> Self {
        StatusResponse {
            error_message: None,
            balance_msat,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        StatusResponse {
            error_message: Some(message.into()),
            balance_msat: 0,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error_message.is_none()
    }
}

/// Result of asking a backend for a new invoice.
///
/// A created invoice always carries both its checking id and its encoded
/// payment request; a failed one always carries a reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum InvoiceResponse {
    Created {
        checking_id: String,
        payment_request: String,
    },
    Failed {
        error_message: String,
    },
}

impl InvoiceResponse {
    pub fn created(checking_id: impl Into<String>, payment_request: impl Into<String>) -> Self {
        InvoiceResponse::Created {
            checking_id: checking_id.into(),
            payment_request: payment_request.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        InvoiceResponse::Failed {
            error_message: message.into(),
        }
    }

    pub fn ok(&self) -> bool {
        matches!(self, InvoiceResponse::Created { .. })
    }

    pub fn checking_id(&self) -> Option<&str> {
        match self {
            InvoiceResponse::Created { checking_id, .. } => Some(checking_id),
            InvoiceResponse::Failed { .. } => None,
        }
    }

    pub fn payment_request(&self) -> Option<&str> {
        match self {
            InvoiceResponse::Created {
                payment_request, ..
            } => Some(payment_request),
            InvoiceResponse::Failed { .. } => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            InvoiceResponse::Created { .. } => None,
            InvoiceResponse::Failed { error_message } => Some(error_message),
        }
    }
}

/// Result of a payment attempt. `ok == Unknown` means the payment may still
/// have been forwarded and must not be treated as a failure.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentResponse {
    pub ok: Tristate,
    pub checking_id: Option<String>,
    pub fee_msat: Option<i64>,
    pub preimage: Option<String>,
    pub error_message: Option<String>,
}

impl PaymentResponse {
    pub fn success(
        checking_id: impl Into<String>,
        fee_msat: i64,
        preimage: impl Into<String>,
    ) -> Self {
        PaymentResponse {
            ok: Tristate::Yes,
            checking_id: Some(checking_id.into()),
            fee_msat: Some(fee_msat),
            preimage: Some(preimage.into()),
            error_message: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        PaymentResponse {
            ok: Tristate::No,
            error_message: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn unknown(checking_id: Option<String>, message: Option<String>) -> Self {
        PaymentResponse {
            ok: Tristate::Unknown,
            checking_id,
            error_message: message,
            ..Default::default()
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentStatus {
    pub paid: Tristate,
    pub fee_msat: Option<i64>,
    pub preimage: Option<String>,
}

impl PaymentStatus {
    pub fn settled(fee_msat: Option<i64>, preimage: Option<String>) -> Self {
        PaymentStatus {
            paid: Tristate::Yes,
            fee_msat,
            preimage,
        }
    }

    pub fn failed() -> Self {
        PaymentStatus {
            paid: Tristate::No,
            ..Default::default()
        }
    }

    pub fn pending() -> Self {
        PaymentStatus::default()
    }

    /// True unless the payment is confirmed. Unknown counts as pending.
    pub fn is_pending(&self) -> bool {
        !self.paid.is_yes()
    }

    /// True only for a confirmed failure.
    pub fn is_failed(&self) -> bool {
        self.paid.is_no()
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.paid {
            Tristate::Yes => write!(f, "settled"),
            Tristate::No => write!(f, "failed"),
            Tristate::Unknown => write!(f, "still pending"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub alias: String,
    pub backend: String,
    pub balance_msat: i64,
    pub num_invoices: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_and_failed_predicates() {
        let settled = PaymentStatus::settled(Some(0), None);
        assert!(!settled.is_pending());
        assert!(!settled.is_failed());

        let failed = PaymentStatus::failed();
        assert!(failed.is_pending());
        assert!(failed.is_failed());

        let unknown = PaymentStatus::pending();
        assert!(unknown.is_pending());
        assert!(!unknown.is_failed());
    }

    #[test]
    fn test_payment_status_display() {
        assert_eq!(PaymentStatus::settled(None, None).to_string(), "settled");
        assert_eq!(PaymentStatus::failed().to_string(), "failed");
        assert_eq!(PaymentStatus::pending().to_string(), "still pending");
    }

    #[test]
    fn test_tristate_json_is_nullable_bool() {
        assert_eq!(serde_json::to_string(&Tristate::Yes).unwrap(), "true");
        assert_eq!(serde_json::to_string(&Tristate::No).unwrap(), "false");
        assert_eq!(serde_json::to_string(&Tristate::Unknown).unwrap(), "null");

        let parsed: PaymentStatus =
            serde_json::from_str(r#"{"paid":null,"fee_msat":null,"preimage":null}"#).unwrap();
        assert!(parsed.paid.is_unknown());
    }

    #[test]
    fn test_status_response_error() {
        let status = StatusResponse::error("node offline");
        assert!(!status.is_ok());
        assert_eq!(status.error_message.as_deref(), Some("node offline"));
        assert!(StatusResponse::ok(42).is_ok());
    }

    #[test]
    fn test_invoice_response_accessors() {
        let created = InvoiceResponse::created("hash", "lnbc1");
        assert!(created.ok());
        assert_eq!(created.checking_id(), Some("hash"));
        assert_eq!(created.payment_request(), Some("lnbc1"));
        assert_eq!(created.error_message(), None);

        let failed = InvoiceResponse::failed("no route");
        assert!(!failed.ok());
        assert_eq!(failed.checking_id(), None);
        assert_eq!(failed.error_message(), Some("no route"));
    }

    #[test]
    fn test_unknown_payment_is_not_a_failure() {
        let response = PaymentResponse::unknown(Some("hash".to_string()), None);
        assert!(!response.ok.is_no());
        assert!(response.ok.is_unknown());
    }
}
