use super::*;
use std::rc::Rc;

/// Facade over the elements matched by a selector. The node list is
/// snapshotted at construction and never re-queried afterwards ([`each`]
/// excepted), so a selection goes stale when the document mutates
/// structurally underneath it.
///
/// Reads target the first matched element and fail with [`Error::NoMatch`]
/// when nothing matched; writes target every matched element, no-op on an
/// empty selection, and return the selection for chaining.
///
/// [`each`]: Selection::each
#[derive(Clone)]
pub struct Selection {
    pub(crate) page: Page,
    selector: String,
    nodes: Vec<NodeId>,
}

impl Selection {
    pub(crate) fn bind(page: Page, selector: String, nodes: Vec<NodeId>) -> Self {
        Self {
            page,
            selector,
            nodes,
        }
    }

    pub(crate) fn empty(page: Page, selector: String) -> Self {
        Self {
            page,
            selector,
            nodes: Vec::new(),
        }
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn exists(&self) -> bool {
        !self.nodes.is_empty()
    }

    fn head(&self) -> Result<NodeId> {
        self.nodes
            .first()
            .copied()
            .ok_or_else(|| Error::NoMatch(self.selector.clone()))
    }

    // Content.

    pub fn html(&self) -> Result<String> {
        let node = self.head()?;
        Ok(self.page.with_state(|state| state.dom.inner_html(node)))
    }

    /// Replaces the content of every matched element with the parsed
    /// fragment and returns the first element's serialized content. This is
    /// the one write that answers with content instead of the selection.
    pub fn set_html(&self, html: &str) -> Result<String> {
        self.page.with_state_mut(|state| {
            for &node in &self.nodes {
                state.dom.set_inner_html(node, html)?;
            }
            Ok(())
        })?;
        self.html()
    }

    // Attributes and dataset entries.

    pub fn attr(&self, name: &str) -> Result<Option<String>> {
        let node = self.head()?;
        Ok(self.page.with_state(|state| state.dom.attribute(node, name)))
    }

    pub fn set_attr(&self, name: &str, value: &str) -> &Self {
        self.page.with_state_mut(|state| {
            for &node in &self.nodes {
                state.dom.set_attribute(node, name, value);
            }
        });
        self
    }

    pub fn data(&self, key: &str) -> Result<Option<String>> {
        let node = self.head()?;
        Ok(self
            .page
            .with_state(|state| state.dom.data_value(node, key)))
    }

    pub fn set_data(&self, key: &str, value: &str) -> &Self {
        self.page.with_state_mut(|state| {
            for &node in &self.nodes {
                state.dom.set_data_value(node, key, value);
            }
        });
        self
    }

    // Inline style and visibility. There is no layout or stylesheet cascade
    // in this runtime, so reads resolve from the inline style attribute:
    // the computed and inline readings coincide here by construction.

    pub fn css(&self, property: &str) -> Result<Option<String>> {
        let node = self.head()?;
        Ok(self
            .page
            .with_state(|state| state.dom.style_property(node, property)))
    }

    pub fn set_css(&self, property: &str, value: &str) -> &Self {
        self.page.with_state_mut(|state| {
            for &node in &self.nodes {
                state.dom.set_style_property(node, property, value);
            }
        });
        self
    }

    pub fn is_visible(&self) -> Result<bool> {
        let node = self.head()?;
        Ok(self.page.with_state(|state| state.dom.is_visible(node)))
    }

    /// Sets `display: none`. A prior non-`block` display value is not
    /// remembered; [`Selection::show`] always restores `block`.
    pub fn hide(&self) -> &Self {
        self.set_css("display", "none")
    }

    pub fn show(&self) -> &Self {
        self.set_css("display", "block")
    }

    /// Hides when the first matched element is visible, shows otherwise.
    pub fn toggle(&self) -> Result<&Self> {
        if self.is_visible()? {
            self.hide();
        } else {
            self.show();
        }
        Ok(self)
    }

    // Classes.

    /// True when ANY matched element carries the class.
    pub fn has_class(&self, class_name: &str) -> bool {
        self.page.with_state(|state| {
            self.nodes
                .iter()
                .any(|node| state.dom.has_class(*node, class_name))
        })
    }

    pub fn add_class(&self, class_name: &str) -> &Self {
        self.page.with_state_mut(|state| {
            for &node in &self.nodes {
                state.dom.add_class(node, class_name);
            }
        });
        self
    }

    pub fn remove_class(&self, class_name: &str) -> &Self {
        self.page.with_state_mut(|state| {
            for &node in &self.nodes {
                state.dom.remove_class(node, class_name);
            }
        });
        self
    }

    /// Toggles the class independently on each matched element, so a mixed
    /// selection ends up inverted element by element.
    pub fn toggle_class(&self, class_name: &str) -> &Self {
        self.page.with_state_mut(|state| {
            for &node in &self.nodes {
                state.dom.toggle_class(node, class_name);
            }
        });
        self
    }

    // Events.

    /// Registers a bubble-phase listener on every matched element.
    pub fn when(&self, event_type: &str, callback: impl Fn(&mut Event) + 'static) -> &Self {
        self.register_listener(event_type, callback, false)
    }

    /// Registers a capture-phase listener on every matched element.
    pub fn when_capture(&self, event_type: &str, callback: impl Fn(&mut Event) + 'static) -> &Self {
        self.register_listener(event_type, callback, true)
    }

    fn register_listener(
        &self,
        event_type: &str,
        callback: impl Fn(&mut Event) + 'static,
        capture: bool,
    ) -> &Self {
        let callback: ListenerCallback = Rc::new(callback);
        self.page.with_state_mut(|state| {
            for &node in &self.nodes {
                state.listeners.add(
                    node,
                    event_type.to_string(),
                    Listener {
                        capture,
                        callback: Rc::clone(&callback),
                    },
                );
            }
        });
        self
    }

    /// Dispatches an event of the given type to every matched element.
    pub fn dispatch(&self, event_type: &str) -> &Self {
        for &node in &self.nodes {
            self.page.dispatch_to_node(node, event_type);
        }
        self
    }

    // Iteration and scoping.

    /// Re-queries the original selector fresh and invokes the callback once
    /// per match, in document order, each time with a brand-new
    /// single-element selection scoped by its positional selector path. The
    /// iteration list is snapshotted before the first call; mutations made
    /// by the callback affect later iterations only through re-derivation
    /// of the positional path.
    pub fn each(&self, mut callback: impl FnMut(Selection)) -> Result<&Self> {
        let fresh = self
            .page
            .with_state(|state| state.dom.query_selector_all(&self.selector))?;
        for node in fresh {
            let wrapped = self.page.wrap_node(node)?;
            callback(wrapped);
        }
        Ok(self)
    }

    pub fn first(&self) -> Result<Selection> {
        self.page.wrap_node(self.head()?)
    }

    pub fn last(&self) -> Result<Selection> {
        let node = self
            .nodes
            .last()
            .copied()
            .ok_or_else(|| Error::NoMatch(self.selector.clone()))?;
        self.page.wrap_node(node)
    }

    /// Without a selector: the immediate parent of every matched element.
    /// With one: the nearest ancestor of each matched element matching it.
    /// Contributions are joined into one comma selector list and re-resolved
    /// as a single new selection; elements with no contribution are skipped,
    /// and no contributions at all yield an empty selection.
    pub fn parent(&self, selector: Option<&str>) -> Result<Selection> {
        let parts = self.page.with_state(|state| {
            let mut parts = Vec::new();
            for &node in &self.nodes {
                let candidate = match selector {
                    None => Ok(state.dom.parent_element(node)),
                    Some(sel) => state.dom.matching_ancestor(node, sel),
                }?;
                if let Some(found) = candidate {
                    parts.push(unique_selector(&state.dom, found));
                }
            }
            Ok::<_, Error>(parts)
        })?;
        self.combine(parts)
    }

    /// Without a selector: the immediate element children of every matched
    /// element. With one: the first descendant of each matched element
    /// (document-order tree walk) matching it.
    pub fn child(&self, selector: Option<&str>) -> Result<Selection> {
        let parts = self.page.with_state(|state| {
            let mut parts = Vec::new();
            for &node in &self.nodes {
                match selector {
                    None => {
                        for child in state.dom.element_children(node) {
                            parts.push(unique_selector(&state.dom, child));
                        }
                    }
                    Some(sel) => {
                        if let Some(found) = state.dom.first_matching_descendant(node, sel)? {
                            parts.push(unique_selector(&state.dom, found));
                        }
                    }
                }
            }
            Ok::<_, Error>(parts)
        })?;
        self.combine(parts)
    }

    fn combine(&self, parts: Vec<String>) -> Result<Selection> {
        if parts.is_empty() {
            return Ok(Selection::empty(self.page.clone(), String::new()));
        }
        self.page.select(&parts.join(", "))
    }

    // Network helpers, scoped to the selection's page.

    pub fn fetch_json(&self, url: &str, options: &RequestOptions) -> PendingJson {
        self.page.fetch_json(url, options)
    }

    pub fn fetch_text(&self, url: &str, options: &RequestOptions) -> PendingText {
        self.page.fetch_text(url, options)
    }
}
