//! Gateway implementations available to the binary.

pub mod http;
pub mod simulated;

pub use http::HttpGateway;
pub use simulated::SimulatedGateway;

use anyhow::{Context, Result};
use operant_core::HardwareGateway;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;

pub fn connect(config: &AppConfig, simulate: bool) -> Result<Arc<dyn HardwareGateway>> {
    if simulate {
        info!(seed = ?config.simulation.seed, "using simulated apparatus");
        return Ok(Arc::new(SimulatedGateway::new(&config.simulation)));
    }
    let gateway = HttpGateway::new(&config.gateway_url, config.request_timeout())
        .context("building HTTP client")?;
    info!(url = %gateway.base_url(), "using hardware gateway");
    Ok(Arc::new(gateway))
}
