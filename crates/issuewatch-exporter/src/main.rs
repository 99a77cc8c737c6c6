//! issuewatch exporter binary.
//!
//! Config comes from the YAML file named by `ISSUEWATCH_CONFIG`, or from the
//! environment. Exit status 1 on bad config or bind failure, 0 after a
//! graceful shutdown.

use std::process::ExitCode;

use issuewatch_exporter::scheduler::error_chain;
use issuewatch_exporter::{config, obs, server};

#[tokio::main]
async fn main() -> ExitCode {
    obs::logging::init();

    let cfg = match std::env::var(config::CONFIG_PATH_ENV) {
        Ok(path) => config::load_from_file(&path),
        Err(_) => config::from_env(),
    };
    let cfg = match cfg {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), error = %e, "invalid configuration");
            return ExitCode::from(1);
        }
    };

    match server::run(cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(kind = e.kind().as_str(), error = %error_chain(&e), "exporter failed");
            ExitCode::from(1)
        }
    }
}
