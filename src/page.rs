use super::*;
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub(crate) const DEFAULT_BASE_URL: &str = "https://page.local/";

/// Handle to an in-memory page: the document tree, its event listeners, and
/// the mock network. Clones are cheap and share the same page.
#[derive(Clone)]
pub struct Page {
    state: Rc<RefCell<PageState>>,
}

pub(crate) struct PageState {
    pub(crate) dom: Dom,
    pub(crate) listeners: ListenerStore,
    pub(crate) fetches: FetchRegistry,
    ready_queue: Vec<Rc<dyn Fn(&Page)>>,
    loaded: bool,
    pub(crate) base_url: String,
    pub(crate) trace: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl PageState {
    fn new() -> Self {
        Self {
            dom: Dom::new(),
            listeners: ListenerStore::default(),
            fetches: FetchRegistry::default(),
            ready_queue: Vec::new(),
            loaded: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            trace: false,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        }
    }

    pub(crate) fn trace_line(&mut self, line: String) {
        if self.trace_to_stderr {
            eprintln!("{line}");
        }
        self.trace_logs.push(line);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }
}

impl Page {
    /// A blank page. Nothing is loaded yet; callbacks registered with
    /// [`Page::ready`] wait for [`Page::load_html`].
    pub fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(PageState::new())),
        }
    }

    pub fn from_html(html: &str) -> Result<Self> {
        let page = Self::new();
        page.load_html(html)?;
        Ok(page)
    }

    /// Parses the markup, replaces the document, and runs any queued ready
    /// callbacks. Listeners and mock routes registered earlier survive a
    /// reload only by accident of node indices; register them from a ready
    /// callback instead.
    pub fn load_html(&self, html: &str) -> Result<()> {
        let dom = parse_document(html)?;
        let callbacks = self.with_state_mut(|state| {
            state.dom = dom;
            state.loaded = true;
            std::mem::take(&mut state.ready_queue)
        });
        for callback in callbacks {
            callback(self);
        }
        Ok(())
    }

    /// Runs the callback once the page has loaded: immediately when it
    /// already has, otherwise queued until [`Page::load_html`].
    pub fn ready(&self, callback: impl Fn(&Page) + 'static) {
        let callback: Rc<dyn Fn(&Page)> = Rc::new(callback);
        let run_now = self.with_state_mut(|state| {
            if state.loaded {
                true
            } else {
                state.ready_queue.push(Rc::clone(&callback));
                false
            }
        });
        if run_now {
            callback(self);
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.with_state(|state| state.loaded)
    }

    /// Resolves the selector against the current document and returns a
    /// selection over every match. Zero matches is not an error; unsupported
    /// selector syntax is.
    pub fn select(&self, selector: &str) -> Result<Selection> {
        let nodes = self.with_state(|state| state.dom.query_selector_all(selector))?;
        Ok(Selection::bind(self.clone(), selector.to_string(), nodes))
    }

    /// Dispatches a `click` event to the first element matching the
    /// selector.
    pub fn click(&self, selector: &str) -> Result<Event> {
        self.dispatch(selector, "click")
    }

    /// Dispatches an event of the given type to the first element matching
    /// the selector, running capture, target, and bubble phases.
    pub fn dispatch(&self, selector: &str, event_type: &str) -> Result<Event> {
        let target = self.select_one(selector)?;
        Ok(self.dispatch_to_node(target, event_type))
    }

    /// Base used to resolve relative request and route URLs.
    pub fn set_base_url(&self, url: &str) -> Result<()> {
        let parsed = url::Url::parse(url).map_err(|_| Error::InvalidUrl(url.to_string()))?;
        self.with_state_mut(|state| state.base_url = parsed.to_string());
        Ok(())
    }

    pub fn enable_trace(&self, enabled: bool) {
        self.with_state_mut(|state| state.trace = enabled);
    }

    pub fn set_trace_stderr(&self, enabled: bool) {
        self.with_state_mut(|state| state.trace_to_stderr = enabled);
    }

    /// Caps the trace buffer; values below 1 are clamped to 1.
    pub fn set_trace_log_limit(&self, max_entries: usize) {
        self.with_state_mut(|state| {
            state.trace_log_limit = max_entries.max(1);
            while state.trace_logs.len() > state.trace_log_limit {
                state.trace_logs.remove(0);
            }
        });
    }

    pub fn take_trace_logs(&self) -> Vec<String> {
        self.with_state_mut(|state| std::mem::take(&mut state.trace_logs))
    }

    /// Serialized subtree of the first element matching the selector.
    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let target = self.select_one(selector)?;
        Ok(self.with_state(|state| state.dom.dump_node(target)))
    }

    /// Serialized markup of the whole document.
    pub fn document_html(&self) -> String {
        self.with_state(|state| {
            let root = state.dom.root;
            state.dom.dump_node(root)
        })
    }

    pub(crate) fn select_one(&self, selector: &str) -> Result<NodeId> {
        self.with_state(|state| state.dom.query_first(selector))?
            .ok_or_else(|| Error::NoMatch(selector.to_string()))
    }

    pub(crate) fn wrap_node(&self, node: NodeId) -> Result<Selection> {
        let selector = self.with_state(|state| unique_selector(&state.dom, node));
        self.select(&selector)
    }

    pub(crate) fn with_state<R>(&self, f: impl FnOnce(&PageState) -> R) -> R {
        f(&self.state.borrow())
    }

    pub(crate) fn with_state_mut<R>(&self, f: impl FnOnce(&mut PageState) -> R) -> R {
        f(&mut self.state.borrow_mut())
    }

    pub(crate) fn downgrade(&self) -> WeakPage {
        WeakPage {
            state: Rc::downgrade(&self.state),
        }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

// Weak handle for closures the page itself keeps alive, so stored listeners
// do not keep the page state from dropping.
#[derive(Clone)]
pub(crate) struct WeakPage {
    state: Weak<RefCell<PageState>>,
}

impl WeakPage {
    pub(crate) fn upgrade(&self) -> Option<Page> {
        self.state.upgrade().map(|state| Page { state })
    }
}
