use anyhow::Result;
use csc_api::assignment::Assignment;
use csc_api::services::page_service::PageService;
use csc_api::submission::SubmissionRecord;
use csc_api::types::Reviewer;
use futures::{stream, StreamExt, TryStreamExt};
use tracing::{debug, info};

use crate::report::{Report, SEPARATOR};

pub mod classify;
pub mod report;

/// Submission pages requested concurrently while collecting records.
const SUBMISSION_BUFFER: usize = 8;

/// Fetches and parses every submission linked from the assignment, keeping the listing order. Any
/// failure aborts the whole collection.
pub async fn collect_records<Service: PageService>(
    assignment: &Assignment<'_, Service>,
) -> Result<Vec<SubmissionRecord>> {
    let submissions = assignment.submissions().await?;
    info!(
        assignment = %assignment.id(),
        submissions = submissions.len(),
        "collecting submissions"
    );

    stream::iter(&submissions)
        .map(|submission| submission.record())
        .buffered(SUBMISSION_BUFFER)
        .map_ok(SubmissionRecord::clone)
        .try_collect()
        .await
}

/// The full output of a run: the assignment title, then every report each followed by
/// [`SEPARATOR`], one per line.
pub fn render(title: &str, records: &[SubmissionRecord], me: &Reviewer) -> String {
    let mut output = format!("{title}\n");
    for report in Report::ALL {
        debug!(%report, "generating report");
        output.push_str(&report.generate(records, me));
        output.push('\n');
        output.push_str(SEPARATOR);
        output.push('\n');
    }
    output
}
