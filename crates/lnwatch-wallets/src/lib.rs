pub mod config;
pub mod fake;
pub mod void;

pub use config::BackendConfig;
pub use fake::{FakeConfig, FakeWallet};
pub use void::VoidWallet;
