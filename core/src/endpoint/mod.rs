//! Generic REST driver shared by every concrete endpoint.
//!
//! # Design
//! [`Endpoint`] pairs a borrowed client with a factory, the function that
//! turns one decoded JSON object into a resource. The driver owns everything
//! else: URL building, parameter encoding, the HTTP round trip, status
//! checks and JSON decoding. Concrete endpoints ([`ImportEndpoint`],
//! [`TicketEndpoint`]) only choose paths, shape parameters and pick a factory.
//!
//! Every failure, whatever its origin, leaves the driver as an `ApiError`.
//!
//! # Pagination
//! [`Endpoint::rest_get_pages`] fetches pages one after the other, in
//! ascending order, and returns only once every page has been decoded. A
//! failing page aborts the whole call and nothing fetched so far is returned.
//! Pages must not be fetched concurrently: result order follows request order
//! and an error must stop all further requests.

mod import;
mod ticket;

pub use import::ImportEndpoint;
pub use ticket::TicketEndpoint;

use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use crate::cast::{self, CastError};
use crate::client::ClubCollectClient;
use crate::error::{ApiError, ErrorCause};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::params::Params;

/// Path segment appended to a list path to ask for its page count.
pub const PAGE_INFO_SEGMENT: &str = "page_info";

/// Query parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "page";

/// Page count of a list endpoint, as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    pub total_pages: u32,
}

/// REST driver building resources through `factory`.
pub struct Endpoint<'c, F> {
    client: &'c ClubCollectClient,
    factory: F,
}

impl<'c, F> Endpoint<'c, F> {
    pub fn new(client: &'c ClubCollectClient, factory: F) -> Self {
        Self { client, factory }
    }

    pub fn client(&self) -> &'c ClubCollectClient {
        self.client
    }

    /// Issue a DELETE. Any 2xx status succeeds and the body is ignored.
    pub fn rest_delete(&self, path: &[&str], query: &Params) -> Result<(), ApiError> {
        self.send(HttpMethod::Delete, path, query, None)?;
        Ok(())
    }

    /// Ask the service how many pages the list at `path` has.
    pub fn rest_get_page_info(&self, path: &[&str], query: &Params) -> Result<PageInfo, ApiError> {
        let mut segments = path.to_vec();
        segments.push(PAGE_INFO_SEGMENT);
        let response = self.send(HttpMethod::Get, &segments, query, None)?;
        let value = decode(&response)?;
        let object = value
            .as_object()
            .ok_or_else(|| ApiError::decode(format!("expected a page info object, found {value}")))?;

        let read_failure = |cause: CastError| ApiError::new("Failed to read page info", vec![cause.into()]);
        let total = cast::man_int("total_pages", object.get("total_pages")).map_err(read_failure)?;
        let total_pages = u32::try_from(total).map_err(|_| {
            read_failure(CastError::Format {
                field: "total_pages".to_string(),
                expected: "page count",
                value: total.to_string(),
            })
        })?;
        Ok(PageInfo { total_pages })
    }

    fn url(&self, path: &[&str], query: &Params) -> Result<Url, ApiError> {
        let mut url = self.client.base_url().clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::config(format!("base URL {} cannot carry a path", self.client.base_url()))
            })?
            .pop_if_empty()
            .extend(path);
        let pairs = query.query_pairs();
        if !pairs.is_empty() {
            url.query_pairs_mut().extend_pairs(pairs);
        }
        Ok(url)
    }

    /// Perform one round trip and reject non-2xx answers.
    fn send(
        &self,
        method: HttpMethod,
        path: &[&str],
        query: &Params,
        body: Option<&Params>,
    ) -> Result<HttpResponse, ApiError> {
        let url = self.url(path, query)?;
        // The query string carries the API key and stays out of the logs.
        let logged_path = url.path().to_string();

        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        let body = body.map(|params| {
            headers.push(("content-type".to_string(), "application/json".to_string()));
            Value::Object(params.to_json_object()).to_string()
        });
        let request = HttpRequest {
            method,
            url: url.into(),
            headers,
            body,
        };

        debug!(%method, path = %logged_path, "sending request");
        let response = self.client.transport().execute(&request).map_err(|err| {
            warn!(%method, path = %logged_path, error = %err, "request failed");
            ApiError::new(format!("{method} {logged_path} failed"), vec![err.into()])
        })?;
        debug!(%method, path = %logged_path, status = response.status, "received response");

        if !response.is_success() {
            warn!(%method, path = %logged_path, status = response.status, "unexpected status");
            return Err(ApiError::new(
                format!("{method} {logged_path} returned HTTP {}", response.status),
                vec![ErrorCause::HttpStatus {
                    status: response.status,
                    body: response.body,
                }],
            ));
        }
        Ok(response)
    }
}

impl<'c, F, R> Endpoint<'c, F>
where
    F: Fn(&'c ClubCollectClient, &Value) -> Result<R, ApiError>,
{
    /// GET one resource.
    pub fn rest_get(&self, path: &[&str], query: &Params) -> Result<R, ApiError> {
        let response = self.send(HttpMethod::Get, path, query, None)?;
        self.build_one(&response)
    }

    /// POST `body` as JSON and build the resource from the answer.
    pub fn rest_post(&self, path: &[&str], query: &Params, body: &Params) -> Result<R, ApiError> {
        let response = self.send(HttpMethod::Post, path, query, Some(body))?;
        self.build_one(&response)
    }

    /// PUT, optionally with a JSON body, and build the resource from the answer.
    pub fn rest_put(
        &self,
        path: &[&str],
        query: &Params,
        body: Option<&Params>,
    ) -> Result<R, ApiError> {
        let response = self.send(HttpMethod::Put, path, query, body)?;
        self.build_one(&response)
    }

    /// Fetch pages `from..=to` of the list at `path` and flatten their items.
    ///
    /// `from` defaults to the first page. When `to` is `None` the page count
    /// is asked first with [`Endpoint::rest_get_page_info`]; an explicit `to`
    /// skips that call. `plural` names the list in diagnostics and is the key
    /// holding the items when the service wraps a page in an object.
    pub fn rest_get_pages(
        &self,
        plural: &str,
        from: Option<u32>,
        to: Option<u32>,
        path: &[&str],
        query: &Params,
    ) -> Result<Vec<R>, ApiError> {
        let start = from.unwrap_or(1);
        if start == 0 {
            return Err(range_error(plural, start, to));
        }
        let to = match to {
            Some(to) => to,
            None => {
                let total_pages = self.rest_get_page_info(path, query)?.total_pages;
                // An explicit start still has to lie inside the list.
                if total_pages == 0 && from.is_none() {
                    debug!(plural, "list is empty");
                    return Ok(Vec::new());
                }
                total_pages
            }
        };
        if start > to {
            return Err(range_error(plural, start, Some(to)));
        }

        let mut resources = Vec::new();
        for page in start..=to {
            let mut page_query = query.clone();
            page_query.insert(PAGE_PARAM, page);
            let response = self.send(HttpMethod::Get, path, &page_query, None)?;
            let items = page_items(plural, decode(&response)?)?;
            debug!(plural, page, count = items.len(), "fetched page");
            for item in &items {
                resources.push(self.build(item)?);
            }
        }
        Ok(resources)
    }

    fn build_one(&self, response: &HttpResponse) -> Result<R, ApiError> {
        self.build(&decode(response)?)
    }

    fn build(&self, value: &Value) -> Result<R, ApiError> {
        if !value.is_object() {
            return Err(ApiError::decode(format!("expected a JSON object, found {value}")));
        }
        (self.factory)(self.client, value)
    }
}

fn decode(response: &HttpResponse) -> Result<Value, ApiError> {
    serde_json::from_str(&response.body)
        .map_err(|e| ApiError::decode(format!("response is not valid JSON: {e}")))
}

/// Items of one list page: a bare array, or an object holding the array
/// under the list's plural name.
fn page_items(plural: &str, value: Value) -> Result<Vec<Value>, ApiError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut object) => match object.remove(plural) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(ApiError::decode(format!("page object has no `{plural}` array"))),
        },
        other => Err(ApiError::decode(format!("expected a page of {plural}, found {other}"))),
    }
}

fn range_error(plural: &str, from: u32, to: Option<u32>) -> ApiError {
    let cause = ErrorCause::Range { from, to };
    ApiError::new(format!("Invalid page range for {plural}"), vec![cause])
}
