#![allow(dead_code)]

use lnwatch_core::lightning::{
    InvoiceOptions, InvoiceResponse, LightningBackend, LightningError, PaymentResponse,
    PaymentStatus, PendingInvoices, StatusResponse,
};
use std::collections::{HashMap, VecDeque};
use std::io;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// In-memory sink for `tracing_subscriber::fmt` output.
#[derive(Clone, Default)]
pub struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

impl CapturedLogs {
    /// Installs a fmt subscriber writing into the returned sink for the
    /// current thread until the guard is dropped.
    pub fn install() -> (Self, tracing::subscriber::DefaultGuard) {
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        let guard = tracing::subscriber::set_default(subscriber);
        (logs, guard)
    }

    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }
}

impl io::Write for CapturedLogs {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
pub enum Lookup {
    Paid,
    Failed,
    Unknown,
    Error,
}

/// Backend whose invoice lookups follow a per-id script. The last scripted
/// answer repeats once the script runs out; unscripted ids stay unknown.
#[derive(Default)]
pub struct ScriptedBackend {
    scripts: Mutex<HashMap<String, VecDeque<Lookup>>>,
    lookups: Mutex<Vec<String>>,
    register_on_lookup: Mutex<Option<(String, String, PendingInvoices)>>,
    lookup_delay: Mutex<Option<Duration>>,
    completed_lookups: AtomicUsize,
    created: AtomicUsize,
    cleaned_up: AtomicBool,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, checking_id: &str, answers: &[Lookup]) {
        self.scripts
            .lock()
            .unwrap()
            .insert(checking_id.to_string(), answers.iter().copied().collect());
    }

    /// Registers `new_id` into `pending` while `trigger_id` is being looked up.
    pub fn register_during_lookup(&self, trigger_id: &str, new_id: &str, pending: PendingInvoices) {
        *self.register_on_lookup.lock().unwrap() =
            Some((trigger_id.to_string(), new_id.to_string(), pending));
    }

    pub fn delay_lookups(&self, delay: Duration) {
        *self.lookup_delay.lock().unwrap() = Some(delay);
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    pub fn lookup_count(&self, checking_id: &str) -> usize {
        self.lookups
            .lock()
            .unwrap()
            .iter()
            .filter(|id| *id == checking_id)
            .count()
    }

    pub fn completed_lookups(&self) -> usize {
        self.completed_lookups.load(Ordering::SeqCst)
    }

    pub fn was_cleaned_up(&self) -> bool {
        self.cleaned_up.load(Ordering::SeqCst)
    }

    fn next_answer(&self, checking_id: &str) -> Lookup {
        let mut scripts = self.scripts.lock().unwrap();
        match scripts.get_mut(checking_id) {
            Some(queue) if queue.len() > 1 => queue.pop_front().unwrap_or(Lookup::Unknown),
            Some(queue) => queue.front().copied().unwrap_or(Lookup::Unknown),
            None => Lookup::Unknown,
        }
    }
}

#[async_trait::async_trait]
impl LightningBackend for ScriptedBackend {
    fn backend_name(&self) -> &'static str {
        "scripted"
    }

    async fn status(&self) -> Result<StatusResponse, LightningError> {
        Ok(StatusResponse::ok(0))
    }

    async fn create_invoice(
        &self,
        amount_msat: u64,
        _memo: Option<&str>,
        _description_hash: Option<&[u8]>,
        _unhashed_description: Option<&[u8]>,
        _extra_options: &InvoiceOptions,
    ) -> Result<InvoiceResponse, LightningError> {
        if amount_msat == 0 {
            return Ok(InvoiceResponse::failed("amount must be positive"));
        }
        let n = self.created.fetch_add(1, Ordering::SeqCst);
        Ok(InvoiceResponse::created(
            format!("inv-{n}"),
            format!("lnscripted{amount_msat}"),
        ))
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
        checking_id: &str,
    ) -> Result<PaymentStatus, LightningError> {
        self.lookups.lock().unwrap().push(checking_id.to_string());

        let trigger = self.register_on_lookup.lock().unwrap().clone();
        if let Some((trigger_id, new_id, pending)) = trigger {
            if trigger_id == checking_id {
                pending.register(new_id).await;
            }
        }

        let delay = *self.lookup_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let answer = self.next_answer(checking_id);
        self.completed_lookups.fetch_add(1, Ordering::SeqCst);
        match answer {
            Lookup::Paid => Ok(PaymentStatus::settled(Some(0), None)),
            Lookup::Failed => Ok(PaymentStatus::failed()),
            Lookup::Unknown => Ok(PaymentStatus::pending()),
            Lookup::Error => Err(LightningError::LookupFailed {
                checking_id: checking_id.to_string(),
                reason: "connection reset".to_string(),
            }),
        }
    }

    async fn get_payment_status(
        &self,
        _checking_id: &str,
    ) -> Result<PaymentStatus, LightningError> {
        Err(LightningError::unsupported("get_payment_status"))
    }

    async fn cleanup(&self) {
        self.cleaned_up.store(true, Ordering::SeqCst);
    }
}
