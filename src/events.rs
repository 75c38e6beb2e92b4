use super::*;
use std::collections::HashMap;
use std::rc::Rc;

pub(crate) type ListenerCallback = Rc<dyn Fn(&mut Event)>;

#[derive(Clone)]
pub(crate) struct Listener {
    pub(crate) capture: bool,
    pub(crate) callback: ListenerCallback,
}

#[derive(Default)]
pub(crate) struct ListenerStore {
    map: HashMap<NodeId, HashMap<String, Vec<Listener>>>,
}

impl ListenerStore {
    pub(crate) fn add(&mut self, node_id: NodeId, event: String, listener: Listener) {
        self.map
            .entry(node_id)
            .or_default()
            .entry(event)
            .or_default()
            .push(listener);
    }

    pub(crate) fn get(&self, node_id: NodeId, event: &str, capture: bool) -> Vec<Listener> {
        self.map
            .get(&node_id)
            .and_then(|events| events.get(event))
            .map(|listeners| {
                listeners
                    .iter()
                    .filter(|listener| listener.capture == capture)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A dispatched event, handed to listeners registered with
/// [`Selection::when`] and [`Selection::when_capture`].
pub struct Event {
    page: Page,
    event_type: String,
    target: NodeId,
    current_target: NodeId,
    default_prevented: bool,
    propagation_stopped: bool,
    immediate_propagation_stopped: bool,
}

impl Event {
    fn new(page: Page, event_type: &str, target: NodeId) -> Self {
        Self {
            page,
            event_type: event_type.to_string(),
            target,
            current_target: target,
            default_prevented: false,
            propagation_stopped: false,
            immediate_propagation_stopped: false,
        }
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    /// The element the event was dispatched to, as a fresh single-element
    /// selection scoped by its positional selector path.
    pub fn target(&self) -> Result<Selection> {
        self.page.wrap_node(self.target)
    }

    /// The element whose listener is currently running.
    pub fn current_target(&self) -> Result<Selection> {
        self.page.wrap_node(self.current_target)
    }

    pub fn prevent_default(&mut self) {
        self.default_prevented = true;
    }

    pub fn default_prevented(&self) -> bool {
        self.default_prevented
    }

    pub fn stop_propagation(&mut self) {
        self.propagation_stopped = true;
    }

    pub fn stop_immediate_propagation(&mut self) {
        self.propagation_stopped = true;
        self.immediate_propagation_stopped = true;
    }

    pub(crate) fn set_current_target(&mut self, node: NodeId) {
        self.current_target = node;
    }
}

impl Page {
    pub(crate) fn dispatch_to_node(&self, target: NodeId, event_type: &str) -> Event {
        let path = self.with_state(|state| state.dom.ancestor_path(target));
        let mut event = Event::new(self.clone(), event_type, target);

        if path.is_empty() {
            self.trace_event_done(&event, "empty_path");
            return event;
        }

        // Capture phase.
        if path.len() >= 2 {
            for node in &path[..path.len() - 1] {
                event.set_current_target(*node);
                self.invoke_listeners(*node, &mut event, true);
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return event;
                }
            }
        }

        // Target phase: capture listeners first, then bubble listeners.
        event.set_current_target(target);
        self.invoke_listeners(target, &mut event, true);
        if event.propagation_stopped {
            self.trace_event_done(&event, "propagation_stopped");
            return event;
        }
        self.invoke_listeners(target, &mut event, false);
        if event.propagation_stopped {
            self.trace_event_done(&event, "propagation_stopped");
            return event;
        }

        // Bubble phase.
        if path.len() >= 2 {
            for node in path[..path.len() - 1].iter().rev() {
                event.set_current_target(*node);
                self.invoke_listeners(*node, &mut event, false);
                if event.propagation_stopped {
                    self.trace_event_done(&event, "propagation_stopped");
                    return event;
                }
            }
        }

        self.trace_event_done(&event, "completed");
        event
    }

    fn invoke_listeners(&self, node_id: NodeId, event: &mut Event, capture: bool) {
        let listeners =
            self.with_state(|state| state.listeners.get(node_id, &event.event_type, capture));
        for listener in listeners {
            self.trace_listener(event, capture);
            (listener.callback)(event);
            if event.immediate_propagation_stopped {
                return;
            }
        }
    }

    fn trace_listener(&self, event: &Event, capture: bool) {
        self.with_state_mut(|state| {
            if !state.trace {
                return;
            }
            let phase = if capture { "capture" } else { "bubble" };
            let target_label = state.dom.node_label(event.target);
            let current_label = state.dom.node_label(event.current_target);
            state.trace_line(format!(
                "[event] {} target={} current={} phase={} default_prevented={}",
                event.event_type, target_label, current_label, phase, event.default_prevented
            ));
        });
    }

    fn trace_event_done(&self, event: &Event, outcome: &str) {
        self.with_state_mut(|state| {
            if !state.trace {
                return;
            }
            let target_label = state.dom.node_label(event.target);
            state.trace_line(format!(
                "[event] {} target={} done={}",
                event.event_type, target_label, outcome
            ));
        });
    }
}
