pub mod busy;
pub mod config;
pub mod controller;
pub mod download;
pub mod error;
pub mod form;
pub mod labels;
pub mod registry;
pub mod response;
pub mod transport;
pub mod ui;

use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;

pub use config::Config;
pub use controller::{SubmissionController, SubmitView};
pub use registry::{registry, EndpointRegistry};

/// Main application state
pub struct AppState {
    pub config: Arc<RwLock<Config>>,
    pub registry: &'static EndpointRegistry,
    pub runtime: tokio::runtime::Handle,
}

impl AppState {
    pub fn new(runtime: tokio::runtime::Handle) -> Result<Self> {
        let config = Config::load_or_default()?;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            registry: registry(),
            runtime,
        })
    }
}
