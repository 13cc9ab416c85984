use lnwatch_core::lightning::{
    InvoiceOptions, InvoiceResponse, LightningBackend, LightningError, NodeInfo, NodeManagement,
    PaymentResponse, PaymentStatus, StatusResponse,
};
use rand::{thread_rng, RngCore};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::info;

const PAYMENT_REQUEST_PREFIX: &str = "lnfake";
const AMOUNT_SEPARATOR: &str = "n1";

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FakeConfig {
    pub default_expiry_secs: u64,
    pub alias: String,
    /// Balance reported before any payment. Internal payments credit and
    /// debit the same wallet, so they leave it unchanged.
    pub starting_balance_msat: i64,
}

impl Default for FakeConfig {
    fn default() -> Self {
        FakeConfig {
            default_expiry_secs: 3600,
            alias: "fakenode".to_string(),
            starting_balance_msat: 0,
        }
    }
}

struct FakeInvoice {
    amount_msat: u64,
    preimage: String,
    description_hash: String,
    expires_at: Instant,
    paid: bool,
}

struct FakePayment {
    amount_msat: u64,
    preimage: String,
}

struct FakeBook {
    invoices: HashMap<String, FakeInvoice>,
    payments: HashMap<String, FakePayment>,
    starting_msat: i64,
    received_msat: u64,
    sent_msat: u64,
}

impl FakeBook {
    fn new(starting_msat: i64) -> Self {
        FakeBook {
            invoices: HashMap::new(),
            payments: HashMap::new(),
            starting_msat,
            received_msat: 0,
            sent_msat: 0,
        }
    }

    fn balance_msat(&self) -> i64 {
        self.starting_msat + self.received_msat as i64 - self.sent_msat as i64
    }
}

/// In-memory backend. It can only pay invoices it issued itself, which is
/// enough to drive the settlement flow end to end without a node.
pub struct FakeWallet {
    config: FakeConfig,
    book: Arc<Mutex<FakeBook>>,
    node: FakeNode,
}

impl FakeWallet {
    pub fn new(config: FakeConfig) -> Self {
        let book = Arc::new(Mutex::new(FakeBook::new(config.starting_balance_msat)));
        let mut node_id = [0u8; 32];
        thread_rng().fill_bytes(&mut node_id);
        let node = FakeNode {
            id: format!("02{}", hex::encode(node_id)),
            alias: config.alias.clone(),
            book: book.clone(),
        };
        FakeWallet { config, book, node }
    }

    pub async fn description_hash(&self, checking_id: &str) -> Option<String> {
        let book = self.book.lock().await;
        book.invoices
            .get(checking_id)
            .map(|invoice| invoice.description_hash.clone())
    }

    fn encode_payment_request(amount_msat: u64, payment_hash: &str) -> String {
        format!("{PAYMENT_REQUEST_PREFIX}{amount_msat}{AMOUNT_SEPARATOR}{payment_hash}")
    }

    fn decode_payment_request(payment_request: &str) -> Option<(u64, String)> {
        let rest = payment_request.strip_prefix(PAYMENT_REQUEST_PREFIX)?;
        let (amount, payment_hash) = rest.split_once(AMOUNT_SEPARATOR)?;
        let amount_msat = amount.parse::<u64>().ok()?;
        let decoded = hex::decode(payment_hash).ok()?;
        if decoded.len() != 32 {
            return None;
        }
        Some((amount_msat, payment_hash.to_string()))
    }

    fn expiry_from(&self, extra_options: &InvoiceOptions) -> Duration {
        let secs = extra_options
            .get("expiry")
            .and_then(|value| value.as_u64())
            .unwrap_or(self.config.default_expiry_secs);
        Duration::from_secs(secs)
    }
}

#[async_trait::async_trait]
impl LightningBackend for FakeWallet {
    fn backend_name(&self) -> &'static str {
        "fake"
    }

    async fn status(&self) -> Result<StatusResponse, LightningError> {
        let book = self.book.lock().await;
        Ok(StatusResponse::ok(book.balance_msat()))
    }

    async fn create_invoice(
        &self,
        amount_msat: u64,
        memo: Option<&str>,
        description_hash: Option<&[u8]>,
        unhashed_description: Option<&[u8]>,
        extra_options: &InvoiceOptions,
    ) -> Result<InvoiceResponse, LightningError> {
        if amount_msat == 0 {
            return Ok(InvoiceResponse::failed("amount must be greater than zero"));
        }

        let description_hash = match (description_hash, unhashed_description) {
            (Some(hash), _) if hash.len() != 32 => {
                return Ok(InvoiceResponse::failed("description hash must be 32 bytes"));
            }
            (Some(hash), _) => hex::encode(hash),
            (None, Some(description)) => hex::encode(Sha256::digest(description)),
            (None, None) => hex::encode(Sha256::digest(memo.unwrap_or_default().as_bytes())),
        };

        let mut preimage = [0u8; 32];
        thread_rng().fill_bytes(&mut preimage);
        let payment_hash = hex::encode(Sha256::digest(preimage));
        let payment_request = Self::encode_payment_request(amount_msat, &payment_hash);

        let invoice = FakeInvoice {
            amount_msat,
            preimage: hex::encode(preimage),
            description_hash,
            expires_at: Instant::now() + self.expiry_from(extra_options),
            paid: false,
        };

        let mut book = self.book.lock().await;
        book.invoices.insert(payment_hash.clone(), invoice);
        info!("fake invoice {payment_hash} created for {amount_msat} msat");

        Ok(InvoiceResponse::created(payment_hash, payment_request))
    }

    async fn pay_invoice(
        &self,
        payment_request: &str,
        _fee_limit_msat: u64,
    ) -> Result<PaymentResponse, LightningError> {
        let Some((amount_msat, payment_hash)) = Self::decode_payment_request(payment_request)
        else {
            return Ok(PaymentResponse::failure("invalid payment request"));
        };

        let mut book = self.book.lock().await;
        let now = Instant::now();
        let preimage = match book.invoices.get_mut(&payment_hash) {
            None => return Ok(PaymentResponse::failure("Only internal invoices can be used!")),
            Some(invoice) if invoice.paid => {
                return Ok(PaymentResponse::failure("invoice already paid"));
            }
            Some(invoice) if now >= invoice.expires_at => {
                return Ok(PaymentResponse::failure("invoice expired"));
            }
            Some(invoice) if invoice.amount_msat != amount_msat => {
                return Ok(PaymentResponse::failure("amount does not match invoice"));
            }
            Some(invoice) => {
                invoice.paid = true;
                invoice.preimage.clone()
            }
        };

        book.sent_msat += amount_msat;
        book.received_msat += amount_msat;
        book.payments.insert(
            payment_hash.clone(),
            FakePayment {
                amount_msat,
                preimage: preimage.clone(),
            },
        );
        info!("fake invoice {payment_hash} paid internally");

        Ok(PaymentResponse::success(payment_hash, 0, preimage))
    }

    async fn get_invoice_status(
        &self,
        checking_id: &str,
    ) -> Result<PaymentStatus, LightningError> {
        let book = self.book.lock().await;
        let status = match book.invoices.get(checking_id) {
            Some(invoice) if invoice.paid => {
                PaymentStatus::settled(Some(0), Some(invoice.preimage.clone()))
            }
            Some(invoice) if Instant::now() >= invoice.expires_at => PaymentStatus::failed(),
            _ => PaymentStatus::pending(),
        };
        Ok(status)
    }

    async fn get_payment_status(
        &self,
        checking_id: &str,
    ) -> Result<PaymentStatus, LightningError> {
        let book = self.book.lock().await;
        let status = match book.payments.get(checking_id) {
            Some(payment) => PaymentStatus::settled(Some(0), Some(payment.preimage.clone())),
            None => PaymentStatus::pending(),
        };
        Ok(status)
    }

    fn node(&self) -> Option<&dyn NodeManagement> {
        Some(&self.node)
    }
}

pub struct FakeNode {
    id: String,
    alias: String,
    book: Arc<Mutex<FakeBook>>,
}

#[async_trait::async_trait]
impl NodeManagement for FakeNode {
    async fn info(&self) -> Result<NodeInfo, LightningError> {
        let book = self.book.lock().await;
        Ok(NodeInfo {
            id: self.id.clone(),
            alias: self.alias.clone(),
            backend: "fake".to_string(),
            balance_msat: book.balance_msat(),
            num_invoices: book.invoices.len(),
        })
    }
}
