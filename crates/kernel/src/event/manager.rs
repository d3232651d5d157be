//! Event manager - indexes listeners by event name and dispatches in order.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::{Map, Value};
use tracing::{debug, error};

/// Priority given to bindings that do not ask for one.
pub const DEFAULT_EVENT_PRIORITY: i32 = 10;

/// An event name a listener implements, with its priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventBinding {
    /// Event name (e.g. "Model.beforeSave").
    pub event: String,
    /// Ordering (lower = earlier).
    pub priority: i32,
}

impl EventBinding {
    /// Binding at the default priority.
    pub fn new(event: &str) -> Self {
        Self::with_priority(event, DEFAULT_EVENT_PRIORITY)
    }

    /// Binding at an explicit priority.
    pub fn with_priority(event: &str, priority: i32) -> Self {
        Self {
            event: event.to_string(),
            priority,
        }
    }
}

/// An event in flight.
///
/// `subject` is the object the event is about; `data` carries named
/// parameters that listeners may rewrite.
pub struct Event<'a, S> {
    name: &'a str,
    /// The object the event concerns.
    pub subject: &'a mut S,
    /// Named parameters.
    pub data: Map<String, Value>,
    stopped: bool,
    result: Option<Value>,
}

impl<'a, S> Event<'a, S> {
    /// Event name.
    pub fn name(&self) -> &str {
        self.name
    }

    /// Prevent later listeners from running.
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    /// Record a result for the dispatcher.
    pub fn set_result(&mut self, result: Value) {
        self.result = Some(result);
    }

    /// String parameter by name.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// What a dispatch left behind once every listener ran.
#[derive(Debug, Clone, Default)]
pub struct DispatchOutcome {
    /// Parameters after listeners rewrote them.
    pub data: Map<String, Value>,
    /// Whether propagation was stopped.
    pub stopped: bool,
    /// Result set by a listener, if any.
    pub result: Option<Value>,
}

impl DispatchOutcome {
    /// String parameter by name.
    pub fn data_str(&self, key: &str) -> Option<&str> {
        self.data.get(key).and_then(Value::as_str)
    }
}

/// Something that reacts to events about subjects of type `S`.
pub trait EventListener<S>: Send + Sync {
    /// Name for logging.
    fn name(&self) -> &str;

    /// Events this listener handles.
    fn implemented_events(&self) -> Vec<EventBinding>;

    /// Handle one event. Errors are logged and the next listener runs.
    fn handle(&self, event: &mut Event<'_, S>) -> anyhow::Result<()>;
}

struct Registered<S> {
    listener: Arc<dyn EventListener<S>>,
    priority: i32,
    seq: usize,
}

/// Listener index for subjects of type `S`.
pub struct EventManager<S> {
    listeners: HashMap<String, Vec<Registered<S>>>,
    seq: usize,
}

impl<S> EventManager<S> {
    /// Empty manager.
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            seq: 0,
        }
    }

    /// Attach a listener to every event it implements.
    ///
    /// Listeners with equal priority run in attach order.
    pub fn on(&mut self, listener: Arc<dyn EventListener<S>>) {
        for binding in listener.implemented_events() {
            self.seq += 1;
            let list = self.listeners.entry(binding.event).or_default();
            list.push(Registered {
                listener: Arc::clone(&listener),
                priority: binding.priority,
                seq: self.seq,
            });
            list.sort_by_key(|r| (r.priority, r.seq));
        }
    }

    /// Detach every binding of the listener with the given name.
    pub fn off(&mut self, listener_name: &str) {
        for list in self.listeners.values_mut() {
            list.retain(|r| r.listener.name() != listener_name);
        }
    }

    /// Number of listeners bound to `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners.get(event).map(Vec::len).unwrap_or(0)
    }

    /// Run every listener for `name` in priority order.
    pub fn dispatch(&self, name: &str, subject: &mut S, data: Map<String, Value>) -> DispatchOutcome {
        let Some(listeners) = self.listeners.get(name) else {
            return DispatchOutcome {
                data,
                ..DispatchOutcome::default()
            };
        };

        let mut event = Event {
            name,
            subject,
            data,
            stopped: false,
            result: None,
        };

        for registered in listeners {
            if let Err(e) = registered.listener.handle(&mut event) {
                error!(
                    listener = %registered.listener.name(),
                    event = %name,
                    error = %e,
                    "event listener failed"
                );
            }
            if event.stopped {
                debug!(
                    listener = %registered.listener.name(),
                    event = %name,
                    "event propagation stopped"
                );
                break;
            }
        }

        DispatchOutcome {
            data: event.data,
            stopped: event.stopped,
            result: event.result,
        }
    }
}

impl<S> Default for EventManager<S> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Append {
        name: &'static str,
        priority: i32,
        stop: bool,
    }

    impl EventListener<Vec<String>> for Append {
        fn name(&self) -> &str {
            self.name
        }

        fn implemented_events(&self) -> Vec<EventBinding> {
            vec![EventBinding::with_priority("Test.event", self.priority)]
        }

        fn handle(&self, event: &mut Event<'_, Vec<String>>) -> anyhow::Result<()> {
            event.subject.push(self.name.to_string());
            if self.stop {
                event.stop_propagation();
                event.set_result(json!(false));
            }
            Ok(())
        }
    }

    struct Failing;

    impl EventListener<Vec<String>> for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn implemented_events(&self) -> Vec<EventBinding> {
            vec![EventBinding::new("Test.event")]
        }

        fn handle(&self, _event: &mut Event<'_, Vec<String>>) -> anyhow::Result<()> {
            anyhow::bail!("boom")
        }
    }

    fn append(name: &'static str, priority: i32, stop: bool) -> Arc<dyn EventListener<Vec<String>>> {
        Arc::new(Append {
            name,
            priority,
            stop,
        })
    }

    #[test]
    fn listeners_run_in_priority_order() {
        let mut manager = EventManager::new();
        manager.on(append("late", 20, false));
        manager.on(append("early", 1, false));
        manager.on(append("middle", 10, false));

        let mut seen = Vec::new();
        let outcome = manager.dispatch("Test.event", &mut seen, Map::new());

        assert_eq!(seen, vec!["early", "middle", "late"]);
        assert!(!outcome.stopped);
    }

    #[test]
    fn stop_propagation_skips_later_listeners() {
        let mut manager = EventManager::new();
        manager.on(append("first", 1, true));
        manager.on(append("second", 2, false));

        let mut seen = Vec::new();
        let outcome = manager.dispatch("Test.event", &mut seen, Map::new());

        assert_eq!(seen, vec!["first"]);
        assert!(outcome.stopped);
        assert_eq!(outcome.result, Some(json!(false)));
    }

    #[test]
    fn failing_listener_does_not_block_others() {
        let mut manager = EventManager::new();
        manager.on(Arc::new(Failing));
        manager.on(append("after", 20, false));

        let mut seen = Vec::new();
        manager.dispatch("Test.event", &mut seen, Map::new());
        assert_eq!(seen, vec!["after"]);
    }

    #[test]
    fn unknown_event_returns_data_untouched() {
        let manager: EventManager<Vec<String>> = EventManager::new();
        let mut data = Map::new();
        data.insert("content".to_string(), json!("hello"));

        let mut seen = Vec::new();
        let outcome = manager.dispatch("Nobody.listens", &mut seen, data);
        assert_eq!(outcome.data_str("content"), Some("hello"));
        assert!(seen.is_empty());
    }

    #[test]
    fn off_detaches_listener() {
        let mut manager = EventManager::new();
        manager.on(append("gone", 1, false));
        assert_eq!(manager.listener_count("Test.event"), 1);

        manager.off("gone");
        assert_eq!(manager.listener_count("Test.event"), 0);
    }
}
