use std::collections::HashMap;
use std::sync::Arc;

use anyhow::Result;
use tokio::sync::{Mutex, OnceCell};
use tower::ServiceExt;
use tracing::debug;
use url::Url;

use crate::assignment::{Assignment, AssignmentId};
use crate::creds::Creds;
use crate::services::page_service::{self, PageRequest, PageService};

/// Connection to the platform. Every page is requested from the transport at most once for the
/// lifetime of the client, even when it is asked for concurrently.
#[derive(Debug)]
pub struct Client<Service> {
    service: Service,
    pages: PageCache,
}

pub fn client(creds: &Creds) -> Result<Client<impl PageService>> {
    let service = page_service::service(creds)?;
    Ok(Client::new(service))
}

impl<Service: PageService> Client<Service> {
    pub fn new(service: Service) -> Self {
        Self {
            service,
            pages: PageCache::default(),
        }
    }

    pub fn assignment(&self, id: AssignmentId) -> Assignment<'_, Service> {
        Assignment::new(self, id)
    }

    pub async fn fetch(&self, request: PageRequest) -> Result<String> {
        let cell = self.pages.cell(request.url()).await;
        if cell.initialized() {
            debug!(url = %request.url(), "page cache hit");
        }

        let page = cell
            .get_or_try_init(|| self.service.clone().oneshot(request))
            .await?;

        Ok(page.clone())
    }
}

/// Single-assignment cell per page, so a second caller waits on the first caller's request
/// instead of issuing its own.
#[derive(Debug, Default)]
struct PageCache {
    cells: Mutex<HashMap<Url, Arc<OnceCell<String>>>>,
}

impl PageCache {
    async fn cell(&self, url: &Url) -> Arc<OnceCell<String>> {
        self.cells
            .lock()
            .await
            .entry(url.clone())
            .or_default()
            .clone()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use anyhow::anyhow;
    use futures::future::try_join;

    use super::*;
    use crate::error::Error;

    /// In-memory pages keyed by URL, counting how many requests reach the transport.
    #[derive(Debug, Clone, Default)]
    pub(crate) struct FakeSite {
        pages: Arc<HashMap<String, String>>,
        requests: Arc<AtomicUsize>,
    }

    impl FakeSite {
        pub(crate) fn new<'a>(pages: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
            let pages = pages
                .into_iter()
                .map(|(url, page)| (url.to_owned(), page.to_owned()))
                .collect();
            Self {
                pages: Arc::new(pages),
                requests: Arc::default(),
            }
        }

        pub(crate) fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        pub(crate) fn service(&self) -> impl PageService {
            let site = self.clone();
            tower::service_fn(move |request: PageRequest| {
                let site = site.clone();
                async move {
                    site.requests.fetch_add(1, Ordering::SeqCst);
                    tokio::task::yield_now().await;
                    let url = request.url();
                    site.pages.get(url.as_str()).cloned().ok_or_else(|| {
                        anyhow::Error::from(Error::Status {
                            url: url.clone(),
                            status: reqwest::StatusCode::NOT_FOUND,
                        })
                    })
                }
            })
        }
    }

    fn request(url: &str) -> PageRequest {
        PageRequest::new(Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn repeated_fetch_hits_transport_once() {
        let site = FakeSite::new([("https://example.com/a", "page a")]);
        let client = Client::new(site.service());

        let first = client.fetch(request("https://example.com/a")).await.unwrap();
        let second = client.fetch(request("https://example.com/a")).await.unwrap();

        assert_eq!(first, "page a");
        assert_eq!(second, "page a");
        assert_eq!(site.requests(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_fetch_hits_transport_once() {
        let site = FakeSite::new([("https://example.com/a", "page a")]);
        let client = Client::new(site.service());

        let (first, second) = try_join(
            client.fetch(request("https://example.com/a")),
            client.fetch(request("https://example.com/a")),
        )
        .await
        .unwrap();

        assert_eq!(first, second);
        assert_eq!(site.requests(), 1);
    }

    #[tokio::test]
    async fn distinct_pages_are_fetched_separately() {
        let site = FakeSite::new([
            ("https://example.com/a", "page a"),
            ("https://example.com/b", "page b"),
        ]);
        let client = Client::new(site.service());

        client.fetch(request("https://example.com/a")).await.unwrap();
        let b = client.fetch(request("https://example.com/b")).await.unwrap();

        assert_eq!(b, "page b");
        assert_eq!(site.requests(), 2);
    }

    #[tokio::test]
    async fn transport_failure_propagates() {
        let site = FakeSite::default();
        let client = Client::new(site.service());

        let err = client
            .fetch(request("https://example.com/missing"))
            .await
            .unwrap_err();

        assert!(err.downcast_ref::<Error>().is_some_and(Error::is_network));
    }

    #[tokio::test]
    async fn failed_fetch_is_retried_by_next_caller() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = attempts.clone();
        let failing = tower::service_fn(move |_: PageRequest| {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err::<String, _>(anyhow!("connection reset"))
            }
        });
        let client = Client::new(failing);

        assert!(client.fetch(request("https://example.com/a")).await.is_err());
        assert!(client.fetch(request("https://example.com/a")).await.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
