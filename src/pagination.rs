//! Draining paginated collection endpoints.

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

use crate::transport::{Response, Transport, TransportError};

pub const TOTAL_PAGES_HEADER: &str = "x-total-pages";
pub const PAGE_HEADER: &str = "x-page";
pub const TOTAL_HEADER: &str = "x-total";

#[derive(Debug, Error)]
pub enum PaginationError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error("response lacks pagination header {0}")]
    MissingHeader(&'static str),

    #[error("pagination header {name} is not an integer: {value:?}")]
    InvalidHeader { name: &'static str, value: String },

    #[error("unexpected page body from {url}: {source}")]
    Decode {
        url: String,
        source: serde_json::Error,
    },
}

/// Page metadata GitLab attaches to collection responses. Pages are 1-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PageInfo {
    total_pages: u32,
    current_page: u32,
    total_elements: u64,
}

impl PageInfo {
    fn from_response(response: &Response) -> Result<Self, PaginationError> {
        Ok(Self {
            total_pages: header_number(response, TOTAL_PAGES_HEADER)?,
            current_page: header_number(response, PAGE_HEADER)?,
            total_elements: header_number(response, TOTAL_HEADER)?,
        })
    }
}

fn header_number<N: std::str::FromStr>(
    response: &Response,
    name: &'static str,
) -> Result<N, PaginationError> {
    let raw = response
        .header(name)
        .ok_or(PaginationError::MissingHeader(name))?;
    raw.trim()
        .parse()
        .map_err(|_| PaginationError::InvalidHeader {
            name,
            value: raw.to_string(),
        })
}

fn page_url(base_query: &str, page: u32) -> String {
    let separator = if base_query.contains('?') { '&' } else { '?' };
    format!("{base_query}{separator}page={page}")
}

fn decode_page<T: DeserializeOwned>(url: &str, body: Value) -> Result<Vec<T>, PaginationError> {
    serde_json::from_value(body).map_err(|source| PaginationError::Decode {
        url: url.to_string(),
        source,
    })
}

/// Fetch every page of `base_query` and concatenate the elements in page order.
///
/// The first response decides how many pages follow. Pages are requested one
/// after another; any failed request aborts the whole fetch.
pub fn fetch_all<T: DeserializeOwned>(
    transport: &dyn Transport,
    base_query: &str,
) -> Result<Vec<T>, PaginationError> {
    let first = transport.get(base_query)?;
    let info = PageInfo::from_response(&first)?;
    let mut accumulated: Vec<T> = decode_page(base_query, first.body)?;

    for page in info.current_page + 1..=info.total_pages {
        let url = page_url(base_query, page);
        tracing::debug!(page, total_pages = info.total_pages, "fetching page");
        let response = transport.get(&url)?;
        accumulated.extend(decode_page::<T>(&url, response.body)?);
    }

    if accumulated.len() as u64 != info.total_elements {
        tracing::warn!(
            expected = info.total_elements,
            received = accumulated.len(),
            "collection changed while it was being fetched"
        );
    }

    Ok(accumulated)
}
