use std::fmt;

use anyhow::{Context, Result};
use scraper::Html;
use tokio::sync::OnceCell;
use tracing::debug;
use url::Url;

use crate::client::Client;
use crate::error::Error;
use crate::selectors;
use crate::services::page_service::{PageRequest, PageService};
use crate::submission::Submission;
use crate::util::{csc_url, submissions_url_prefix, text, ASSIGNMENTS_PATH};

selectors! {
    // Course/assignment picker at the top of the teaching page
    SELECTED_OPTION = "option[selected]",
    A = "a",
}

/// An assignment listing, fetched and parsed the first time anything is asked of it.
pub struct Assignment<'a, Service> {
    client: &'a Client<Service>,
    id: AssignmentId,
    page: OnceCell<AssignmentPage>,
}

impl<'a, Service: PageService> Assignment<'a, Service> {
    pub fn new(client: &'a Client<Service>, id: AssignmentId) -> Self {
        Self {
            client,
            id,
            page: OnceCell::new(),
        }
    }

    pub fn id(&self) -> &AssignmentId {
        &self.id
    }

    pub async fn title(&self) -> Result<&str> {
        Ok(&self.page().await?.title)
    }

    /// Submissions in the order the assignment page links them, duplicates included.
    pub async fn submissions(&self) -> Result<Vec<Submission<'a, Service>>> {
        let submissions = self
            .page()
            .await?
            .submission_urls
            .iter()
            .cloned()
            .map(|url| Submission::new(self.client, url))
            .collect();
        Ok(submissions)
    }

    async fn page(&self) -> Result<&AssignmentPage> {
        self.page
            .get_or_try_init(|| async {
                let request = PageRequest::with_params(
                    &csc_url(ASSIGNMENTS_PATH),
                    [("assignment", self.id.as_str())],
                )?;
                let url = request.url().clone();
                let text = self
                    .client
                    .fetch(request)
                    .await
                    .with_context(|| format!("could not get assignment {}", self.id))?;
                AssignmentPage::parse(&url, &Html::parse_document(&text))
            })
            .await
    }
}

/// What an assignment listing says about itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentPage {
    title: String,
    submission_urls: Vec<Url>,
}

impl AssignmentPage {
    pub fn parse(url: &Url, page: &Html) -> Result<Self> {
        let title = page
            .select(&SELECTED_OPTION)
            .next()
            .map(text)
            .ok_or_else(|| Error::parse(url, "no selected option in the assignment picker"))?;

        let prefix = submissions_url_prefix();
        let submission_urls = page
            .select(&A)
            .filter_map(|a| a.value().attr("href"))
            .filter(|href| href.starts_with(&prefix))
            .map(|href| {
                Url::parse(href)
                    .map_err(|err| Error::parse(url, format!("bad submission link `{href}`: {err}")))
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(%url, %title, submissions = submission_urls.len(), "parsed assignment page");
        Ok(Self {
            title,
            submission_urls,
        })
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn submission_urls(&self) -> &[Url] {
        &self.submission_urls
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssignmentId {
    id: String,
}

impl AssignmentId {
    pub fn new(id: String) -> Self {
        Self { id }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for AssignmentId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.id.fmt(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::tests::FakeSite;

    const ASSIGNMENT_URL: &str = "https://my.compscicenter.ru/teaching/assignments?assignment=42";

    const LISTING: &str = r#"
        <html><body>
          <nav><a href="https://my.compscicenter.ru/teaching/">Teaching</a></nav>
          <select name="assignment">
            <option value="41">Graphs: homework 1</option>
            <option value="42" selected>
                Graphs:   homework 2
            </option>
          </select>
          <table>
            <tr><td><a href="https://my.compscicenter.ru/teaching/assignments/submissions/7/">Ann</a></td></tr>
            <tr><td><a href="/teaching/assignments/submissions/8/">relative</a></td></tr>
            <tr><td><a href="https://my.compscicenter.ru/teaching/assignments/submissions/9/">Bob</a></td></tr>
            <tr><td><a href="https://my.compscicenter.ru/teaching/assignments/submissions/7/">Ann again</a></td></tr>
            <tr><td><a href="https://my.compscicenter.ru/static/style.css">asset</a></td></tr>
            <tr><td><a>no href</a></td></tr>
          </table>
        </body></html>
    "#;

    fn url() -> Url {
        Url::parse(ASSIGNMENT_URL).unwrap()
    }

    #[test]
    fn title_is_selected_option() {
        let page = AssignmentPage::parse(&url(), &Html::parse_document(LISTING)).unwrap();
        assert_eq!(page.title(), "Graphs: homework 2");
    }

    #[test]
    fn keeps_only_absolute_submission_links_in_order() {
        let page = AssignmentPage::parse(&url(), &Html::parse_document(LISTING)).unwrap();
        let urls: Vec<_> = page.submission_urls().iter().map(Url::as_str).collect();
        assert_eq!(
            urls,
            [
                "https://my.compscicenter.ru/teaching/assignments/submissions/7/",
                "https://my.compscicenter.ru/teaching/assignments/submissions/9/",
                "https://my.compscicenter.ru/teaching/assignments/submissions/7/",
            ]
        );
    }

    #[test]
    fn missing_selected_option_is_parse_error() {
        let html = Html::parse_document(
            r#"<select><option value="1">Only</option></select>
               <a href="https://my.compscicenter.ru/teaching/assignments/submissions/1/">x</a>"#,
        );
        let err = AssignmentPage::parse(&url(), &html).unwrap_err();
        assert!(err.downcast_ref::<Error>().is_some_and(Error::is_parse));
    }

    #[test]
    fn page_without_submissions_is_empty() {
        let html = Html::parse_document(r#"<select><option selected>Empty</option></select>"#);
        let page = AssignmentPage::parse(&url(), &html).unwrap();
        assert!(page.submission_urls().is_empty());
    }

    #[tokio::test]
    async fn listing_is_fetched_by_id_once() {
        let site = FakeSite::new([(ASSIGNMENT_URL, LISTING)]);
        let client = Client::new(site.service());
        let assignment = client.assignment(AssignmentId::new("42".to_owned()));

        assert_eq!(assignment.title().await.unwrap(), "Graphs: homework 2");
        assert_eq!(assignment.submissions().await.unwrap().len(), 3);
        assert_eq!(assignment.submissions().await.unwrap().len(), 3);
        assert_eq!(site.requests(), 1);
    }

    #[tokio::test]
    async fn unknown_assignment_fails_with_network_error() {
        let site = FakeSite::default();
        let client = Client::new(site.service());
        let assignment = client.assignment(AssignmentId::new("404".to_owned()));

        let err = assignment.title().await.unwrap_err();
        assert!(err.downcast_ref::<Error>().is_some_and(Error::is_network));
    }
}
