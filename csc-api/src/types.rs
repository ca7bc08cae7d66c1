//! Small value types shared between the scraper and the reports built on top of it.

use std::env;
use std::fmt;

use crate::error::Error;

pub const REVIEWER_VAR: &str = "CSC_ME";

/// Display name of the person running the tool, compared literally against comment authors.
#[derive(Debug, Clone, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct Reviewer {
    name: String,
}

impl Reviewer {
    pub fn from_env() -> Result<Self, Error> {
        let name = env::var(REVIEWER_VAR).map_err(|source| Error::MissingVar {
            name: REVIEWER_VAR,
            source,
        })?;
        Ok(Self::new(name))
    }

    pub fn new(name: String) -> Self {
        Self { name }
    }

    pub fn as_str(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Reviewer {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.name.fmt(f)
    }
}

impl From<&str> for Reviewer {
    fn from(name: &str) -> Self {
        Self::new(name.to_owned())
    }
}

/// One entry of a submission's discussion thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    author: String,
    posted_at: String,
}

impl Comment {
    pub fn new(author: String, posted_at: String) -> Self {
        Self { author, posted_at }
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    /// Timestamp exactly as the platform displays it.
    pub fn posted_at(&self) -> &str {
        &self.posted_at
    }

    pub fn is_by(&self, reviewer: &Reviewer) -> bool {
        self.author == reviewer.as_str()
    }
}
