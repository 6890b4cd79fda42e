use crate::config::AppConfig;
use crate::pipeline::TrendPipeline;
use crate::rates::RateCache;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod config;
mod db;
mod domain;
mod errors;
mod pipeline;
mod rates;
mod report;
mod retry;
mod snapshot;

#[cfg(test)]
mod tests;

const DEFAULT_CONFIG_PATH: &str = "config/default";

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();
    let start = Instant::now();

    // 1. Configuration (file path may be given as the only argument)
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("configuration failed: {e}");
            std::process::exit(2);
        }
    };

    // 2. Collaborators
    let pipeline = match cfg
        .rates
        .cache_ttl()
        .and_then(|ttl| TrendPipeline::from_config(&cfg, Arc::new(RateCache::new(ttl))))
    {
        Ok(p) => p,
        Err(e) => {
            error!("startup failed: {e}");
            std::process::exit(2);
        }
    };

    // 3. Run and emit
    let result = pipeline
        .run()
        .and_then(|report| report::write_report(&report, &cfg.report));

    if let Err(e) = result {
        error!("trend run failed: {e}");
        std::process::exit(1);
    }

    info!(elapsed = ?start.elapsed(), "done");
}
