use super::*;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use url::Url;

/// Options forwarded with a fetch: method (GET when unset), headers, body.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub method: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    pub fn method(name: &str) -> Self {
        Self {
            method: Some(name.to_string()),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

/// Canned response served by a registered route.
#[derive(Debug, Clone)]
pub struct MockResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl MockResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self::with_status(200, body)
    }

    pub fn with_status(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }
}

#[derive(Debug, Clone)]
enum RouteOutcome {
    Respond(MockResponse),
    Fail(String),
}

#[derive(Debug, Clone)]
struct Route {
    method: String,
    url: String,
    outcome: RouteOutcome,
}

#[derive(Debug, Clone)]
pub(crate) struct FetchDone {
    pub(crate) status: u16,
    pub(crate) ok: bool,
    pub(crate) url: String,
    pub(crate) body_text: String,
    pub(crate) error: Option<String>,
}

#[derive(Debug, Clone)]
struct QueuedRequest {
    method: String,
    url: String,
    // Enqueue-time URL failure, surfaced at settle time so the fetch call
    // itself never fails.
    resolve_error: Option<String>,
}

#[derive(Debug, Clone)]
enum FetchEntry {
    Pending(QueuedRequest),
    Done(FetchDone),
}

#[derive(Debug, Default)]
pub(crate) struct FetchRegistry {
    next_id: u64,
    routes: Vec<Route>,
    entries: HashMap<u64, FetchEntry>,
    pending_order: Vec<u64>,
}

impl FetchRegistry {
    fn allocate_id(&mut self) -> u64 {
        self.next_id = self.next_id.wrapping_add(1).max(1);
        self.next_id
    }

    // Settles queued requests in FIFO order. Returns one summary line per
    // settled request for the trace log.
    fn settle_all(&mut self) -> Vec<String> {
        let pending = std::mem::take(&mut self.pending_order);
        let mut summaries = Vec::with_capacity(pending.len());
        for id in pending {
            let Some(FetchEntry::Pending(request)) = self.entries.get(&id).cloned() else {
                continue;
            };
            let done = self.settle(request);
            summaries.push(match &done.error {
                Some(detail) => format!("[fetch] {} -> failed: {detail}", done.url),
                None => format!("[fetch] {} -> {}", done.url, done.status),
            });
            self.entries.insert(id, FetchEntry::Done(done));
        }
        summaries
    }

    fn settle(&self, request: QueuedRequest) -> FetchDone {
        if let Some(detail) = request.resolve_error {
            return FetchDone {
                status: 0,
                ok: false,
                url: request.url,
                body_text: String::new(),
                error: Some(detail),
            };
        }

        // Latest matching route wins, so tests can override earlier stubs.
        let route = self
            .routes
            .iter()
            .rev()
            .find(|route| route.method == request.method && route.url == request.url);

        match route.map(|route| &route.outcome) {
            Some(RouteOutcome::Respond(response)) => FetchDone {
                status: response.status,
                ok: (200..300).contains(&response.status),
                url: request.url,
                body_text: response.body.clone(),
                error: None,
            },
            Some(RouteOutcome::Fail(detail)) => FetchDone {
                status: 0,
                ok: false,
                url: request.url,
                body_text: String::new(),
                error: Some(detail.clone()),
            },
            None => FetchDone {
                status: 0,
                ok: false,
                url: request.url.clone(),
                body_text: String::new(),
                error: Some(format!("no route for {} {}", request.method, request.url)),
            },
        }
    }
}

impl Page {
    /// Registers a canned response for requests to `url` with the given
    /// method. Relative URLs resolve against the page base.
    pub fn route(&self, method: &str, url: &str, response: MockResponse) -> Result<()> {
        let resolved = self.resolve_url(url)?;
        self.with_state_mut(|state| {
            state.fetches.routes.push(Route {
                method: method.to_ascii_uppercase(),
                url: resolved,
                outcome: RouteOutcome::Respond(response),
            });
        });
        Ok(())
    }

    /// Registers a simulated transport failure for requests to `url`.
    pub fn route_error(&self, method: &str, url: &str, detail: &str) -> Result<()> {
        let resolved = self.resolve_url(url)?;
        self.with_state_mut(|state| {
            state.fetches.routes.push(Route {
                method: method.to_ascii_uppercase(),
                url: resolved,
                outcome: RouteOutcome::Fail(detail.to_string()),
            });
        });
        Ok(())
    }

    /// Enqueues a request whose response body decodes as JSON. The request
    /// stays pending until the event loop runs; failures surface from
    /// [`PendingJson::resolve`], never here.
    pub fn fetch_json(&self, url: &str, options: &RequestOptions) -> PendingJson {
        PendingJson {
            inner: self.enqueue_fetch(url, options),
        }
    }

    /// Enqueues a request whose response body is returned as plain text.
    pub fn fetch_text(&self, url: &str, options: &RequestOptions) -> PendingText {
        PendingText {
            inner: self.enqueue_fetch(url, options),
        }
    }

    /// Runs the event loop: every queued request settles, in order, against
    /// the registered routes.
    pub fn flush(&self) -> Result<()> {
        let summaries = self.with_state_mut(|state| state.fetches.settle_all());
        self.with_state_mut(|state| {
            if state.trace {
                for summary in summaries {
                    state.trace_line(summary);
                }
            }
        });
        Ok(())
    }

    fn enqueue_fetch(&self, url: &str, options: &RequestOptions) -> PendingFetch {
        let method = options
            .method
            .clone()
            .unwrap_or_else(|| "GET".to_string())
            .to_ascii_uppercase();
        let (resolved, resolve_error) = match self.resolve_url(url) {
            Ok(resolved) => (resolved, None),
            Err(err) => (url.to_string(), Some(err.to_string())),
        };
        let id = self.with_state_mut(|state| {
            let id = state.fetches.allocate_id();
            state.fetches.entries.insert(
                id,
                FetchEntry::Pending(QueuedRequest {
                    method,
                    url: resolved,
                    resolve_error,
                }),
            );
            state.fetches.pending_order.push(id);
            id
        });
        PendingFetch {
            page: self.clone(),
            id,
        }
    }

    fn resolve_url(&self, url: &str) -> Result<String> {
        let base = self.with_state(|state| state.base_url.clone());
        let base = Url::parse(&base).map_err(|_| Error::InvalidUrl(base.clone()))?;
        base.join(url)
            .map(|resolved| resolved.to_string())
            .map_err(|_| Error::InvalidUrl(url.to_string()))
    }
}

struct PendingFetch {
    page: Page,
    id: u64,
}

impl PendingFetch {
    fn take_outcome(self) -> Result<FetchDone> {
        self.page.flush()?;
        let entry = self
            .page
            .with_state_mut(|state| state.fetches.entries.remove(&self.id));
        match entry {
            Some(FetchEntry::Done(done)) => Ok(done),
            Some(FetchEntry::Pending(request)) => Err(Error::FetchFailed {
                url: request.url,
                detail: "request did not settle".into(),
            }),
            None => Err(Error::FetchFailed {
                url: String::new(),
                detail: "request outcome already taken".into(),
            }),
        }
    }
}

/// In-flight request created by `fetch_json`.
pub struct PendingJson {
    inner: PendingFetch,
}

impl PendingJson {
    /// Drives the event loop until the response arrives, then decodes the
    /// body as JSON. Transport failures, non-2xx statuses, and undecodable
    /// bodies all surface here as errors.
    pub fn resolve(self) -> Result<JsonValue> {
        let done = self.inner.take_outcome()?;
        if let Some(detail) = done.error {
            return Err(Error::FetchFailed {
                url: done.url,
                detail,
            });
        }
        if !done.ok {
            return Err(Error::HttpStatus {
                url: done.url,
                status: done.status,
            });
        }
        serde_json::from_str(&done.body_text).map_err(|err| Error::JsonDecode {
            url: done.url,
            detail: err.to_string(),
        })
    }
}

/// In-flight request created by `fetch_text`.
pub struct PendingText {
    inner: PendingFetch,
}

impl PendingText {
    /// Drives the event loop until the response arrives and returns the
    /// body text. Transport failures and non-2xx statuses surface here.
    pub fn resolve(self) -> Result<String> {
        let done = self.inner.take_outcome()?;
        if let Some(detail) = done.error {
            return Err(Error::FetchFailed {
                url: done.url,
                detail,
            });
        }
        if !done.ok {
            return Err(Error::HttpStatus {
                url: done.url,
                status: done.status,
            });
        }
        Ok(done.body_text)
    }
}
