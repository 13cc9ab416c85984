pub mod backend;
pub mod error;
pub mod pending;
pub mod settlement;
pub mod types;
pub mod wallet;

pub use backend::{LightningBackend, NodeManagement};
pub use error::LightningError;
pub use pending::PendingInvoices;
pub use settlement::{InvoiceMonitor, MonitorConfig, MonitorHandle, PaidInvoices, PassSummary};
pub use types::{
    InvoiceOptions, InvoiceResponse, NodeInfo, PaymentResponse, PaymentStatus, StatusResponse,
    Tristate,
};
pub use wallet::Wallet;
