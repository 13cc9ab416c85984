use crate::lightning::backend::LightningBackend;
use crate::lightning::error::LightningError;
use crate::lightning::pending::PendingInvoices;
use crate::lightning::settlement::{InvoiceMonitor, MonitorConfig, MonitorHandle, PaidInvoices};
use crate::lightning::types::{
    InvoiceOptions, InvoiceResponse, PaymentResponse, PaymentStatus, StatusResponse,
};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// One configured backend together with the invoices it still has to settle.
#[derive(Clone)]
pub struct Wallet {
    backend: Arc<dyn LightningBackend>,
    pending: PendingInvoices,
    monitor: Arc<Mutex<Option<MonitorHandle>>>,
}

impl Wallet {
    pub fn new(backend: Arc<dyn LightningBackend>) -> Self {
        Wallet {
            backend,
            pending: PendingInvoices::new(),
            monitor: Arc::new(Mutex::new(None)),
        }
    }

    pub fn backend(&self) -> &Arc<dyn LightningBackend> {
        &self.backend
    }

    pub fn pending_invoices(&self) -> &PendingInvoices {
        &self.pending
    }

    pub async fn status(&self) -> Result<StatusResponse, LightningError> {
        self.backend.status().await
    }

    /// Creates an invoice and, when the backend accepted it, registers its
    /// checking id for settlement monitoring.
    pub async fn create_invoice(
        &self,
        amount_msat: u64,
        memo: Option<&str>,
        description_hash: Option<&[u8]>,
        unhashed_description: Option<&[u8]>,
        extra_options: &InvoiceOptions,
    ) -> Result<InvoiceResponse, LightningError> {
        let response = self
            .backend
            .create_invoice(
                amount_msat,
                memo,
                description_hash,
                unhashed_description,
                extra_options,
            )
            .await?;

        match &response {
            InvoiceResponse::Created { checking_id, .. } => {
                self.pending.register(checking_id.as_str()).await;
            }
            InvoiceResponse::Failed { error_message } => {
                warn!(
                    "{} backend refused invoice of {amount_msat} msat: {error_message}",
                    self.backend.backend_name()
                );
            }
        }

        Ok(response)
    }

    pub async fn pay_invoice(
        &self,
        payment_request: &str,
        fee_limit_msat: u64,
    ) -> Result<PaymentResponse, LightningError> {
        self.backend
            .pay_invoice(payment_request, fee_limit_msat)
            .await
    }

    pub async fn get_invoice_status(
        &self,
        checking_id: &str,
    ) -> Result<PaymentStatus, LightningError> {
        self.backend.get_invoice_status(checking_id).await
    }

    pub async fn get_payment_status(
        &self,
        checking_id: &str,
    ) -> Result<PaymentStatus, LightningError> {
        self.backend.get_payment_status(checking_id).await
    }

    /// Starts the settlement monitor. The returned stream is the only
    /// consumer. Calling this again stops the previous monitor and waits for
    /// it to finish before the new one starts, so one id is never looked up
    /// by two monitors at once.
    pub async fn paid_invoices_stream(&self, config: MonitorConfig) -> PaidInvoices {
        let mut guard = self.monitor.lock().await;
        if let Some(previous) = guard.take() {
            previous.shutdown();
            previous.join().await;
        }
        let monitor = InvoiceMonitor::new(self.backend.clone(), self.pending.clone(), config);
        let (stream, handle) = monitor.spawn();
        *guard = Some(handle);
        stream
    }

    /// Stops the monitor, if any, and releases backend resources.
    pub async fn cleanup(&self) {
        let handle = self.monitor.lock().await.take();
        if let Some(handle) = handle {
            handle.shutdown();
            handle.join().await;
        }
        self.backend.cleanup().await;
        info!("{} backend cleaned up", self.backend.backend_name());
    }
}
