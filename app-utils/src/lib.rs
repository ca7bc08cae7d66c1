use std::io;

use anyhow::Result;
use csc_api::creds::Creds;
use csc_api::types::Reviewer;
use dotenvy::dotenv;
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::format;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, registry, EnvFilter};

/// Everything a run needs from the environment. Loaded before any request is made.
#[derive(Debug, Clone)]
pub struct Settings {
    pub creds: Creds,
    pub reviewer: Reviewer,
}

impl Settings {
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenv() {
            debug!(path = %path.display(), "loaded .env");
        }

        let creds = Creds::from_env()?;
        let reviewer = Reviewer::from_env()?;

        Ok(Self { creds, reviewer })
    }
}

/// Logs go to stderr so stdout carries only the reports.
pub fn init_tracing() {
    registry()
        .with(
            fmt::layer()
                .event_format(format().pretty())
                .with_writer(io::stderr),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .init();
}
