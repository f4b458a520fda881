//! Port traits decoupling the domain from concrete adapters.

pub mod config_port;
pub mod trade_port;
pub mod report_port;
