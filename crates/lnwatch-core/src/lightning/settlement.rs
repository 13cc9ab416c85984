use crate::lightning::backend::LightningBackend;
use crate::lightning::pending::PendingInvoices;
use crate::lightning::types::Tristate;
use crate::metrics::{
    INVOICE_LOOKUPS_TOTAL, PENDING_INVOICES_COUNT, POLL_PASSES_TOTAL, POLL_PASS_DURATION_SECONDS,
    SETTLED_INVOICES_TOTAL,
};
use futures::Stream;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{error, info};

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Clone, Copy, Debug)]
pub struct MonitorConfig {
    pub poll_interval: Duration,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig {
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PassSummary {
    pub checked: usize,
    pub settled: usize,
    pub failed: usize,
    pub pending: usize,
    pub errors: usize,
}

#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum MonitorStopped {
    #[error("settlement consumer dropped")]
    ConsumerDropped,
    #[error("shutdown requested")]
    ShutdownRequested,
}

/// Polls every pending invoice of one backend and reports the settled ones.
///
/// Each pass works on a snapshot of the pending set taken when the pass
/// starts, so ids registered mid-pass are first looked up on the next pass.
/// Lookups run one at a time in snapshot order.
pub struct InvoiceMonitor {
    backend: Arc<dyn LightningBackend>,
    pending: PendingInvoices,
    config: MonitorConfig,
    shutdown_tx: Arc<watch::Sender<bool>>,
    shutdown_rx: watch::Receiver<bool>,
}

impl InvoiceMonitor {
    pub fn new(
        backend: Arc<dyn LightningBackend>,
        pending: PendingInvoices,
        config: MonitorConfig,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        InvoiceMonitor {
            backend,
            pending,
            config,
            shutdown_tx: Arc::new(shutdown_tx),
            shutdown_rx,
        }
    }

    /// Runs a single pass. A settled id leaves the pending set only once a
    /// slot in `sender` is reserved for it, and is handed over right after.
    pub async fn poll_once(
        &self,
        sender: &mpsc::Sender<String>,
    ) -> Result<PassSummary, MonitorStopped> {
        let backend_name = self.backend.backend_name();
        let started = Instant::now();
        let mut shutdown = self.shutdown_rx.clone();
        let mut summary = PassSummary::default();

        let snapshot = self.pending.snapshot().await;

        for checking_id in snapshot {
            if *shutdown.borrow() {
                return Err(MonitorStopped::ShutdownRequested);
            }

            summary.checked += 1;
            let status = match self.backend.get_invoice_status(&checking_id).await {
                Ok(status) => status,
                Err(e) => {
                    error!("could not get status of invoice {checking_id}: {e}");
                    INVOICE_LOOKUPS_TOTAL
                        .with_label_values(&[backend_name, "error"])
                        .inc();
                    summary.errors += 1;
                    continue;
                }
            };

            match status.paid {
                Tristate::Yes => {
                    INVOICE_LOOKUPS_TOTAL
                        .with_label_values(&[backend_name, "settled"])
                        .inc();
                    let permit = tokio::select! {
                        biased;
                        permit = sender.reserve() => match permit {
                            Ok(permit) => permit,
                            Err(_) => return Err(MonitorStopped::ConsumerDropped),
                        },
                        _ = shutdown.changed() => {
                            return Err(MonitorStopped::ShutdownRequested);
                        }
                    };
                    self.pending.remove(&checking_id).await;
                    permit.send(checking_id);
                    SETTLED_INVOICES_TOTAL
                        .with_label_values(&[backend_name])
                        .inc();
                    summary.settled += 1;
                }
                Tristate::No => {
                    INVOICE_LOOKUPS_TOTAL
                        .with_label_values(&[backend_name, "failed"])
                        .inc();
                    self.pending.remove(&checking_id).await;
                    summary.failed += 1;
                }
                Tristate::Unknown => {
                    INVOICE_LOOKUPS_TOTAL
                        .with_label_values(&[backend_name, "pending"])
                        .inc();
                    summary.pending += 1;
                }
            }
        }

        POLL_PASSES_TOTAL.with_label_values(&[backend_name]).inc();
        POLL_PASS_DURATION_SECONDS
            .with_label_values(&[backend_name])
            .observe(started.elapsed().as_secs_f64());
        PENDING_INVOICES_COUNT
            .with_label_values(&[backend_name])
            .set(self.pending.len().await as f64);

        Ok(summary)
    }

    /// Starts polling in a background task. The stream yields one settled
    /// checking id per settlement and never ends on its own.
    pub fn spawn(self) -> (PaidInvoices, MonitorHandle) {
        let (sender, receiver) = mpsc::channel(1);
        let shutdown = self.shutdown_tx.clone();
        let task = tokio::spawn(async move {
            self.run(sender).await;
        });
        (
            PaidInvoices {
                inner: ReceiverStream::new(receiver),
            },
            MonitorHandle { shutdown, task },
        )
    }

    async fn run(self, sender: mpsc::Sender<String>) {
        let backend_name = self.backend.backend_name();
        info!("settlement monitor started for {backend_name} backend");
        let mut shutdown = self.shutdown_rx.clone();

        loop {
            if let Err(reason) = self.poll_once(&sender).await {
                info!("settlement monitor for {backend_name} stopped: {reason}");
                return;
            }

            tokio::select! {
                _ = tokio::time::sleep(self.config.poll_interval) => {}
                _ = sender.closed() => {
                    let reason = MonitorStopped::ConsumerDropped;
                    info!("settlement monitor for {backend_name} stopped: {reason}");
                    return;
                }
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        let reason = MonitorStopped::ShutdownRequested;
                        info!("settlement monitor for {backend_name} stopped: {reason}");
                        return;
                    }
                }
            }
        }
    }
}

pub struct MonitorHandle {
    shutdown: Arc<watch::Sender<bool>>,
    task: JoinHandle<()>,
}

impl MonitorHandle {
    /// Asks the monitor to stop. A lookup already in flight is allowed to finish.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    pub async fn join(self) {
        if let Err(e) = self.task.await {
            error!("settlement monitor task failed: {e}");
        }
    }
}

/// Settled checking ids in the order the monitor discovered them.
///
/// An id sitting in the stream's one-slot buffer has already left the
/// pending set. Dropping the stream without receiving it loses that
/// settlement; it is not reported again.
pub struct PaidInvoices {
    inner: ReceiverStream<String>,
}

impl PaidInvoices {
    pub async fn recv(&mut self) -> Option<String> {
        self.inner.as_mut().recv().await
    }
}

impl Stream for PaidInvoices {
    type Item = String;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<String>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}
