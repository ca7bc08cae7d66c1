use anyhow::{Context, Result};
use app_utils::{init_tracing, Settings};
use clap::{command, Arg};
use csc_api::assignment::AssignmentId;
use csc_api::client::client;
use csc_api::error::Error;
use review_reports::{collect_records, render};
use tracing::{debug, error};

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let result = run().await;
    if let Err(err) = &result {
        match err.downcast_ref::<Error>() {
            Some(cause) => error!(kind = cause.kind(), %cause, "run aborted"),
            None => error!(%err, "run aborted"),
        }
    }
    result
}

async fn run() -> Result<()> {
    let matches = command!()
        .disable_help_flag(true)
        .disable_version_flag(true)
        .arg(Arg::new("assignment").required(true))
        .get_matches();
    let assignment_id = matches
        .get_one::<String>("assignment")
        .context("missing assignment id")?
        .to_owned();

    let Settings { creds, reviewer } = Settings::from_env()?;
    debug!(%reviewer, "initialized");

    let csc = client(&creds)?;
    let assignment = csc.assignment(AssignmentId::new(assignment_id));

    let records = collect_records(&assignment).await?;
    let title = assignment.title().await?;

    print!("{}", render(title, &records, &reviewer));

    Ok(())
}
