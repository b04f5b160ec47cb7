//! Build once, then serve the output while polling templates for changes.
//!
//! Exactly two tasks run after start-up: the file server (reads the output
//! tree) and the watch task (the only writer). Pages are swapped in by
//! rename, so the server never needs to coordinate with a rebuild.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Result, anyhow};
use quarry_core::assets::AssetPipeline;
use quarry_core::config::Config;
use quarry_core::{Page, RebuildError, TemplateSources, build_site, rebuild};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

use crate::StaticServer;
use crate::watch::ChangeDetector;

pub struct DevLoop {
    config: Config,
    pages: Vec<Page>,
}

/// Handle to a started dev loop. Dropping it stops both tasks.
pub struct RunningDevLoop {
    addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    server: JoinHandle<Result<()>>,
    watcher: JoinHandle<Result<()>>,
}

impl DevLoop {
    pub fn new(config: Config, pages: Vec<Page>) -> Self {
        Self { config, pages }
    }

    /// Run the first build, bind the server, then start serving and watching.
    ///
    /// Nothing is served until the first build has produced the output tree.
    pub async fn start(self) -> Result<RunningDevLoop> {
        let config = Arc::new(self.config);
        let pages = Arc::new(self.pages);

        let watermark = SystemTime::now();
        initial_build(config.clone(), pages.clone()).await?;

        let server = StaticServer::bind(&config.dev.host, config.dev.port, &config.build.output).await?;
        let addr = server.local_addr()?;

        if config.dev.open {
            if let Err(e) = open::that(format!("http://{}", addr)) {
                warn!("Failed to open browser: {}", e);
            }
        }

        let (shutdown, stop) = watch::channel(false);
        let server = tokio::spawn(server.serve(stopped(stop.clone())));

        let mut extra = Vec::new();
        if let Some(pipeline) = AssetPipeline::from_config(&config.assets, &config.build.output) {
            extra.push(pipeline.input().to_path_buf());
        }
        let detector = ChangeDetector::new(TemplateSources::new(&config.build.templates), extra);
        let watcher = tokio::spawn(watch_sources(config, pages, detector, watermark, stop));

        Ok(RunningDevLoop {
            addr,
            shutdown,
            server,
            watcher,
        })
    }
}

impl RunningDevLoop {
    pub fn local_addr(&self) -> SocketAddr {
        self.addr
    }

    /// Keep serving until `signal` resolves or either task stops.
    ///
    /// Returns the error that ended the loop, if any.
    pub async fn run_until<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        let RunningDevLoop {
            shutdown,
            mut server,
            mut watcher,
            ..
        } = self;

        tokio::select! {
            _ = signal => {
                info!("shutting down");
                let _ = shutdown.send(true);
                server.await??;
                watcher.await??;
                Ok(())
            }
            result = &mut server => {
                let _ = shutdown.send(true);
                let _ = watcher.await;
                result??;
                Err(anyhow!("dev server stopped unexpectedly"))
            }
            result = &mut watcher => {
                let _ = shutdown.send(true);
                let _ = server.await;
                result?
            }
        }
    }

    pub async fn shutdown(self) -> Result<()> {
        self.run_until(std::future::ready(())).await
    }
}

async fn stopped(mut stop: watch::Receiver<bool>) {
    // An error means the sender is gone, which also means stop
    let _ = stop.changed().await;
}

/// The asset step may fail here without stopping the loop; the page build may not.
async fn initial_build(config: Arc<Config>, pages: Arc<Vec<Page>>) -> Result<()> {
    tokio::task::spawn_blocking(move || {
        if let Some(pipeline) = AssetPipeline::from_config(&config.assets, &config.build.output) {
            if let Err(e) = pipeline.run() {
                warn!("{:#}", anyhow::Error::new(e));
            }
        }
        build_site(&config, &pages)
    })
    .await??;

    Ok(())
}

/// Owns the watermark. A rebuild is awaited before the next tick is taken,
/// so rebuilds never overlap and each decision sees the latest watermark.
async fn watch_sources(
    config: Arc<Config>,
    pages: Arc<Vec<Page>>,
    mut detector: ChangeDetector,
    mut watermark: SystemTime,
    mut stop: watch::Receiver<bool>,
) -> Result<()> {
    let interval = Duration::from_millis(config.dev.poll_interval_ms.max(1));
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        templates = %config.build.templates.display(),
        interval_ms = interval.as_millis() as u64,
        "watching template sources"
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {}
            _ = stop.changed() => return Ok(()),
        }

        let Some(change) = detector.poll(watermark) else {
            continue;
        };
        info!(%change, "change detected, rebuilding");

        let started = SystemTime::now();
        let (job_config, job_pages) = (config.clone(), pages.clone());
        let result = tokio::task::spawn_blocking(move || rebuild(&job_config, &job_pages)).await?;

        match result {
            Ok(report) => {
                watermark = started;
                detector.commit();
                info!(
                    pages = report.len(),
                    elapsed_ms = report.elapsed.as_millis() as u64,
                    "rebuilt"
                );
            }
            Err(RebuildError::Assets(e)) => {
                warn!("{:#}; still serving the previous build", anyhow::Error::new(e));
            }
            Err(e) => return Err(e.into()),
        }
    }
}
