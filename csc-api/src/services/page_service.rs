use anyhow::Result;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::redirect::Policy;
use reqwest::Client as HttpClient;
use tower::{Service, ServiceBuilder};
use tracing::info;
use url::Url;

use crate::creds::Creds;
use crate::error::Error;
use crate::util::{BASE_DOMAIN, SESSION_COOKIE};

/// Upper bound on page requests in flight at once.
pub const MAX_IN_FLIGHT: usize = 4;

/// Transport for platform pages. Responsible for attaching the session and executing requests, but
/// not for caching or for understanding what the pages contain.
pub fn service(creds: &Creds) -> Result<impl PageService> {
    let http_client = http_client(creds)?;

    Ok(ServiceBuilder::new()
        .concurrency_limit(MAX_IN_FLIGHT)
        .service_fn(move |request: PageRequest| {
            let http_client = http_client.clone();
            async move { fetch(&http_client, request).await }
        }))
}

pub trait PageService:
    Service<PageRequest, Response = String, Error = anyhow::Error> + Clone
{
}
impl<T: Service<PageRequest, Response = String, Error = anyhow::Error> + Clone> PageService for T {}

/// A page identified by its full URL, query parameters included.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageRequest {
    url: Url,
}

impl PageRequest {
    pub fn new(url: Url) -> Self {
        Self { url }
    }

    pub fn with_params<'a>(
        base: &str,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<Self> {
        let url = Url::parse_with_params(base, params)?;
        Ok(Self { url })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[tracing::instrument(level = "debug", skip(http_client, request), fields(url = %request.url))]
async fn fetch(http_client: &HttpClient, request: PageRequest) -> Result<String> {
    let PageRequest { url } = request;
    info!(%url, "fetching page");

    let request_error = |source| Error::Request {
        url: url.clone(),
        source,
    };

    let response = http_client
        .get(url.clone())
        .header(header::ACCEPT, "text/html")
        .send()
        .await
        .map_err(request_error)?;

    let status = response.status();
    if !status.is_success() {
        return Err(Error::Status {
            url: url.clone(),
            status,
        }
        .into());
    }

    let text = response.text().await.map_err(request_error)?;
    Ok(text)
}

fn http_client(creds: &Creds) -> Result<HttpClient> {
    // Redirects on the platform itself mean the session was rejected, so they surface as a status
    let redirect_policy = Policy::custom(|attempt| {
        if attempt.url().domain() == Some(BASE_DOMAIN) {
            Policy::none().redirect(attempt)
        } else {
            Policy::default().redirect(attempt)
        }
    });

    let mut cookie = HeaderValue::from_str(&format!("{SESSION_COOKIE}={}", creds.session_id()))
        .map_err(|_| Error::InvalidSession)?;
    cookie.set_sensitive(true);

    let mut headers = HeaderMap::new();
    headers.insert(header::COOKIE, cookie);

    let client = HttpClient::builder()
        .default_headers(headers)
        .redirect(redirect_policy)
        .build()?;

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_query_params() {
        let request = PageRequest::with_params(
            "https://my.compscicenter.ru/teaching/assignments",
            [("assignment", "1234")],
        )
        .unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://my.compscicenter.ru/teaching/assignments?assignment=1234"
        );
    }

    #[test]
    fn requests_differing_in_params_are_distinct() {
        let base = "https://my.compscicenter.ru/teaching/assignments";
        let first = PageRequest::with_params(base, [("assignment", "1")]).unwrap();
        let second = PageRequest::with_params(base, [("assignment", "2")]).unwrap();
        let again = PageRequest::with_params(base, [("assignment", "1")]).unwrap();
        assert_ne!(first, second);
        assert_eq!(first, again);
    }

    #[test]
    fn session_with_newline_is_rejected() {
        let creds = Creds::new("bad\nvalue".to_owned());
        let err = http_client(&creds).unwrap_err();
        assert!(err.downcast_ref::<Error>().is_some_and(Error::is_config));
    }
}
