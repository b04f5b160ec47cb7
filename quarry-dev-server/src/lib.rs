mod dev_loop;
mod watch;

pub use dev_loop::{DevLoop, RunningDevLoop};
pub use watch::{Change, ChangeDetector};

use anyhow::Result;
use axum::Router;
use std::{future::Future, net::SocketAddr, path::PathBuf};
use tower_http::services::ServeDir;
use tracing::info;

/// A static file server over the build output. No other routes.
pub struct StaticServer {
    listener: tokio::net::TcpListener,
    root: PathBuf,
}

impl StaticServer {
    /// Bind to `host:port`. Port 0 picks a free port.
    pub async fn bind(host: &str, port: u16, root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();

        // Ensure root directory exists
        if !root.exists() {
            return Err(anyhow::anyhow!(
                "Root directory does not exist: {}",
                root.display()
            ));
        }

        let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
        let listener = tokio::net::TcpListener::bind(addr).await?;

        Ok(Self { listener, root })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve until `shutdown` resolves.
    pub async fn serve<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = Router::new().fallback_service(ServeDir::new(&self.root));

        info!(addr = %self.local_addr()?, root = %self.root.display(), "serving");
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        Ok(())
    }
}
