#![deny(warnings)]

pub mod lightning;
pub mod metrics;
