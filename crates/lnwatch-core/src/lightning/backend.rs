use crate::lightning::error::LightningError;
use crate::lightning::types::{
    InvoiceOptions, InvoiceResponse, NodeInfo, PaymentResponse, PaymentStatus, StatusResponse,
};

/// Contract every payment backend implements.
///
/// Definitive outcomes (a refused invoice, a failed payment) travel inside the
/// returned value. `Err` is reserved for faults that have no typed answer, most
/// notably [`LightningError::Unsupported`].
#[async_trait::async_trait]
pub trait LightningBackend: Send + Sync + 'static {
    fn backend_name(&self) -> &'static str;

    async fn status(&self) -> Result<StatusResponse, LightningError>;

    async fn create_invoice(
        &self,
        amount_msat: u64,
        memo: Option<&str>,
        description_hash: Option<&[u8]>,
        unhashed_description: Option<&[u8]>,
        extra_options: &InvoiceOptions,
    ) -> Result<InvoiceResponse, LightningError>;

    async fn pay_invoice(
        &self,
        payment_request: &str,
        fee_limit_msat: u64,
    ) -> Result<PaymentResponse, LightningError>;

    async fn get_invoice_status(&self, checking_id: &str)
        -> Result<PaymentStatus, LightningError>;

    async fn get_payment_status(&self, checking_id: &str)
        -> Result<PaymentStatus, LightningError>;

    async fn cleanup(&self) {}

    /// Node-management operations, when this backend is backed by a node that
    /// can be operated directly.
    fn node(&self) -> Option<&dyn NodeManagement> {
        None
    }
}

#[async_trait::async_trait]
pub trait NodeManagement: Send + Sync {
    async fn info(&self) -> Result<NodeInfo, LightningError>;
}
