use std::error::Error as StdError;
use std::fmt;

mod dom;
mod events;
mod html;
mod net;
mod page;
mod query;
mod selector;
mod toggler;

#[cfg(test)]
mod tests;

pub use events::Event;
pub use net::{MockResponse, PendingJson, PendingText, RequestOptions};
pub use page::Page;
pub use query::Selection;
pub use toggler::TogglerOptions;

use dom::*;
use events::*;
use html::*;
use net::*;
use page::*;
use query::*;
use selector::*;
use toggler::*;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    HtmlParse(String),
    UnsupportedSelector(String),
    NoMatch(String),
    InvalidUrl(String),
    FetchFailed {
        url: String,
        detail: String,
    },
    HttpStatus {
        url: String,
        status: u16,
    },
    JsonDecode {
        url: String,
        detail: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::NoMatch(selector) => write!(f, "no element matched selector: {selector}"),
            Self::InvalidUrl(url) => write!(f, "invalid url: {url}"),
            Self::FetchFailed { url, detail } => write!(f, "fetch failed for {url}: {detail}"),
            Self::HttpStatus { url, status } => write!(f, "http status {status} for {url}"),
            Self::JsonDecode { url, detail } => {
                write!(f, "json decode error for {url}: {detail}")
            }
        }
    }
}

impl StdError for Error {}
