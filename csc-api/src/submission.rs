use std::fmt;

use anyhow::{Context, Result};
use scraper::{ElementRef, Html};
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::client::Client;
use crate::error::Error;
use crate::selectors;
use crate::services::page_service::{PageRequest, PageService};
use crate::types::Comment;
use crate::util::{joined_text, text};

selectors! {
    // `<h2>{author} <small>{title}</small></h2>`
    SUBMISSION_HEADING = "#student-submission-comments.container div.row div.col-xs-12.h2-and-buttons h2",
    SUBMISSION_TITLE = "div#student-submission-comments.container div.row div.col-xs-12.h2-and-buttons h2 small",
    COMMENT = "div.csc-well.assignment-comment",
    COMMENT_AUTHOR = "h5.assignment",
    COMMENT_POSTED_AT = "div.metainfo-holder span.metainfo.pull-right",
    SCORE_INPUT = "input#id_score.input-grade.numberinput.form-control",
}

/// A single student's submission, fetched and parsed the first time anything is asked of it.
pub struct Submission<'a, Service> {
    client: &'a Client<Service>,
    permalink: Url,
    record: OnceCell<SubmissionRecord>,
}

impl<'a, Service: PageService> Submission<'a, Service> {
    pub fn new(client: &'a Client<Service>, permalink: Url) -> Self {
        Self {
            client,
            permalink,
            record: OnceCell::new(),
        }
    }

    pub fn permalink(&self) -> &Url {
        &self.permalink
    }

    pub async fn record(&self) -> Result<&SubmissionRecord> {
        self.record
            .get_or_try_init(|| async {
                let text = self
                    .client
                    .fetch(PageRequest::new(self.permalink.clone()))
                    .await
                    .with_context(|| format!("could not get submission {}", self.permalink))?;
                SubmissionRecord::parse(self.permalink.clone(), &Html::parse_document(&text))
            })
            .await
    }

    pub async fn author(&self) -> Result<&str> {
        Ok(self.record().await?.author())
    }

    pub async fn title(&self) -> Result<&str> {
        Ok(self.record().await?.title())
    }

    pub async fn comments(&self) -> Result<&[Comment]> {
        Ok(self.record().await?.comments())
    }

    pub async fn score(&self) -> Result<i32> {
        Ok(self.record().await?.score())
    }
}

/// Everything the reports need to know about one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRecord {
    author: String,
    title: String,
    comments: Vec<Comment>,
    score: i32,
    permalink: Url,
}

impl SubmissionRecord {
    pub fn new(
        author: String,
        title: String,
        comments: Vec<Comment>,
        score: i32,
        permalink: Url,
    ) -> Self {
        Self {
            author,
            title,
            comments,
            score,
            permalink,
        }
    }

    pub fn parse(permalink: Url, page: &Html) -> Result<Self> {
        let title = page
            .select(&SUBMISSION_TITLE)
            .next()
            .map(text)
            .ok_or_else(|| Error::parse(&permalink, "missing submission title"))?;

        let heading = page
            .select(&SUBMISSION_HEADING)
            .next()
            .map(text)
            .ok_or_else(|| Error::parse(&permalink, "missing submission heading"))?;

        // The title is the heading's trailing element; the author may itself contain the title
        let author = match heading.rsplit_once(title.as_str()) {
            Some((before, after)) => format!("{before}{after}").trim().to_owned(),
            None => {
                return Err(Error::parse(
                    &permalink,
                    format!("heading \"{heading}\" does not contain title \"{title}\""),
                )
                .into())
            }
        };

        let comments = page.select(&COMMENT).map(parse_comment).collect();
        let score = parse_score(page);

        let record = Self::new(author, title, comments, score, permalink);
        debug!(
            permalink = %record.permalink,
            author = %record.author,
            comments = record.comments.len(),
            score = record.score,
            "parsed submission page"
        );
        Ok(record)
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Discussion thread, oldest first.
    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn last_comment(&self) -> Option<&Comment> {
        self.comments.last()
    }

    /// Zero when ungraded. Negative grades are kept as the platform shows them.
    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn permalink(&self) -> &Url {
        &self.permalink
    }
}

impl fmt::Display for SubmissionRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let last_posted_at = self.last_comment().map_or("-", Comment::posted_at);
        write!(
            f,
            "{} [{last_posted_at}] [score:{}]: {}",
            self.author, self.score, self.permalink
        )
    }
}

fn parse_comment(block: ElementRef) -> Comment {
    let author = joined_text(block.select(&COMMENT_AUTHOR));
    let posted_at = joined_text(block.select(&COMMENT_POSTED_AT));
    Comment::new(author, posted_at)
}

fn parse_score(page: &Html) -> i32 {
    page.select(&SCORE_INPUT)
        .next()
        .and_then(|input| input.value().attr("value"))
        .and_then(|value| value.trim().parse().ok())
        .unwrap_or(0)
}
