use lnwatch_core::lightning::{
    InvoiceOptions, InvoiceResponse, LightningBackend, LightningError, PaymentResponse,
    PaymentStatus, StatusResponse,
};
use tracing::warn;

/// Placeholder used until a real backend is configured. It holds no funds and
/// supports no payment operation.
#[derive(Clone, Debug, Default)]
pub struct VoidWallet;

impl VoidWallet {
    pub fn new() -> Self {
        VoidWallet
    }
}

#[async_trait::async_trait]
impl LightningBackend for VoidWallet {
    fn backend_name(&self) -> &'static str {
        "void"
    }

    async fn status(&self) -> Result<StatusResponse, LightningError> {
        warn!(
            "void backend does nothing, configure an actual backend to send or receive payments"
        );
        Ok(StatusResponse::ok(0))
    }

    async fn create_invoice(
        &self,
        _amount_msat: u64,
        _memo: Option<&str>,
        _description_hash: Option<&[u8]>,
        _unhashed_description: Option<&[u8]>,
        _extra_options: &InvoiceOptions,
    ) -> Result<InvoiceResponse, LightningError> {
        Err(LightningError::unsupported("create_invoice"))
    }

    async fn pay_invoice(
        &self,
        _payment_request: &str,
        _fee_limit_msat: u64,
    ) -> Result<PaymentResponse, LightningError> {
        Err(LightningError::unsupported("pay_invoice"))
    }

    async fn get_invoice_status(
        &self,
        _checking_id: &str,
    ) -> Result<PaymentStatus, LightningError> {
        Err(LightningError::unsupported("get_invoice_status"))
    }

    async fn get_payment_status(
        &self,
        _checking_id: &str,
    ) -> Result<PaymentStatus, LightningError> {
        Err(LightningError::unsupported("get_payment_status"))
    }
}
