use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use serde::Serialize;

use crate::config::ServerConfig;
use crate::error::{Result, SentinelError};
use crate::service::ServiceContext;

/// Service lifecycle. Moves from `Initializing` to `Ready` exactly once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Lifecycle {
    Initializing,
    Ready,
}

impl Lifecycle {
    pub fn as_str(self) -> &'static str {
        match self {
            Lifecycle::Initializing => "initializing",
            Lifecycle::Ready => "ready",
        }
    }
}

/// State shared by handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    context: Arc<OnceLock<Arc<ServiceContext>>>,
    pub server: Arc<ServerConfig>,
    pub resource_paths: Arc<Vec<PathBuf>>,
}

impl AppState {
    #[must_use]
    pub fn new(server: ServerConfig, resource_paths: Vec<PathBuf>) -> Self {
        AppState {
            context: Arc::new(OnceLock::new()),
            server: Arc::new(server),
            resource_paths: Arc::new(resource_paths),
        }
    }

    /// Install the service context, moving the lifecycle to `Ready`.
    pub fn install(&self, context: ServiceContext) -> Result<()> {
        self.context
            .set(Arc::new(context))
            .map_err(|_| SentinelError::other("service context is already installed"))?;
        tracing::info!("service is ready");
        Ok(())
    }

    pub fn context(&self) -> Option<&Arc<ServiceContext>> {
        self.context.get()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.context.get().is_some() {
            Lifecycle::Ready
        } else {
            Lifecycle::Initializing
        }
    }

    pub fn request_timeout(&self) -> Duration {
        self.server.request_timeout()
    }
}
