//! Entry point for application binaries.

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::app::{App, AppHost};
use crate::config::{Config, Mode};
use crate::error::Result;
use crate::export::Exporter;
use crate::transport::LiveServer;

/// Run `app` as the environment says: serve it live or write a static build.
///
/// ```rust,ignore
/// fn main() -> trellis_core::Result<()> {
///     trellis_core::run(Counter::new())
/// }
/// ```
pub fn run<A: App>(app: A) -> Result<()> {
    init_tracing();
    run_with(app, &Config::from_env()?)
}

/// Like [`run`] with an explicit configuration. Does not install a subscriber.
pub fn run_with<A: App>(app: A, config: &Config) -> Result<()> {
    match config.mode {
        Mode::Build => {
            let report = Exporter::new(&config.output).export(&mut AppHost::new(app))?;
            info!(files = report.files.len(), bytes = report.bytes, "build finished");
            Ok(())
        }
        Mode::Dev => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(LiveServer::new(app).serve(config))?;
            Ok(())
        }
    }
}

/// Install a `fmt` subscriber filtered by `RUST_LOG` (default `info`).
///
/// Does nothing when a global subscriber is already set.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
