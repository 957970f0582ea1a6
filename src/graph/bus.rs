//! Synchronous event bus
//!
//! Handlers are kept per [`EventKind`] in subscription order. Dispatch is a
//! plain loop over a snapshot of the handler list taken when emission starts,
//! so handlers may subscribe, unsubscribe or mutate the graph while running.

use super::event::{EventKind, GraphEvent};
use super::store::{GraphError, GraphResult};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

/// Return type of event handlers
pub type HandlerResult = anyhow::Result<()>;

/// Event handler
///
/// Receives the emitting context mutably, which allows re-entrant mutation.
pub type Handler<C> = Arc<dyn Fn(&mut C, &GraphEvent) -> HandlerResult + Send + Sync>;

/// Identifies one subscription, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandlerId(u64);

impl HandlerId {
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for HandlerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HandlerId({})", self.0)
    }
}

/// Subscription table
pub struct EventBus<C> {
    listeners: HashMap<EventKind, Vec<(HandlerId, Handler<C>)>>,
    next_id: u64,
}

impl<C> EventBus<C> {
    pub fn new() -> Self {
        EventBus {
            listeners: HashMap::new(),
            next_id: 1,
        }
    }

    /// Subscribe `handler` to `kind`
    pub fn on<F>(&mut self, kind: EventKind, handler: F) -> HandlerId
    where
        F: Fn(&mut C, &GraphEvent) -> HandlerResult + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id);
        self.next_id += 1;
        self.listeners
            .entry(kind)
            .or_default()
            .push((id, Arc::new(handler)));
        id
    }

    /// Unsubscribe; returns false if `id` was not subscribed to `kind`
    pub fn off(&mut self, kind: EventKind, id: HandlerId) -> bool {
        let Some(handlers) = self.listeners.get_mut(&kind) else {
            return false;
        };
        let before = handlers.len();
        handlers.retain(|(handler_id, _)| *handler_id != id);
        handlers.len() != before
    }

    /// Drop every handler of `kind`, or of every kind when `None`
    pub fn remove_all_listeners(&mut self, kind: Option<EventKind>) {
        match kind {
            Some(kind) => {
                self.listeners.remove(&kind);
            }
            None => self.listeners.clear(),
        }
    }

    pub fn listener_count(&self, kind: EventKind) -> usize {
        self.listeners.get(&kind).map_or(0, |handlers| handlers.len())
    }

    /// Snapshot of the handlers currently subscribed to `kind`, in order
    pub fn listeners(&self, kind: EventKind) -> Vec<Handler<C>> {
        self.listeners
            .get(&kind)
            .map(|handlers| handlers.iter().map(|(_, handler)| Arc::clone(handler)).collect())
            .unwrap_or_default()
    }
}

impl<C> Default for EventBus<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> fmt::Debug for EventBus<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let counts: HashMap<EventKind, usize> = self
            .listeners
            .iter()
            .map(|(kind, handlers)| (*kind, handlers.len()))
            .collect();
        f.debug_struct("EventBus")
            .field("listeners", &counts)
            .field("next_id", &self.next_id)
            .finish()
    }
}

/// Invoke `listeners` in order with the same event
///
/// Fail-fast: the first handler error stops the loop and is returned.
pub fn dispatch<C>(listeners: &[Handler<C>], ctx: &mut C, event: &GraphEvent) -> GraphResult<()> {
    for (position, handler) in listeners.iter().enumerate() {
        if let Err(err) = handler(ctx, event) {
            warn!(
                event = %event.kind(),
                key = ?event.key(),
                position,
                skipped = listeners.len() - position - 1,
                "event handler failed: {:#}",
                err
            );
            return Err(GraphError::Handler {
                event: event.kind(),
                key: event.key().map(str::to_string),
                reason: format!("{:#}", err),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    /// Minimal context recording which handler ran
    #[derive(Default)]
    struct Trace(Vec<&'static str>);

    fn emit(bus: &EventBus<Trace>, trace: &mut Trace, event: &GraphEvent) -> GraphResult<()> {
        let listeners = bus.listeners(event.kind());
        dispatch(&listeners, trace, event)
    }

    #[test]
    fn test_handlers_run_in_subscription_order() {
        let mut bus = EventBus::new();
        bus.on(EventKind::Cleared, |trace: &mut Trace, _| {
            trace.0.push("first");
            Ok(())
        });
        bus.on(EventKind::Cleared, |trace: &mut Trace, _| {
            trace.0.push("second");
            Ok(())
        });

        let mut trace = Trace::default();
        emit(&bus, &mut trace, &GraphEvent::Cleared).unwrap();
        assert_eq!(trace.0, vec!["first", "second"]);
    }

    #[test]
    fn test_only_matching_kind_runs() {
        let mut bus = EventBus::new();
        bus.on(EventKind::NodeAdded, |trace: &mut Trace, _| {
            trace.0.push("node");
            Ok(())
        });

        let mut trace = Trace::default();
        emit(&bus, &mut trace, &GraphEvent::Cleared).unwrap();
        assert!(trace.0.is_empty());
    }

    #[test]
    fn test_off() {
        let mut bus = EventBus::new();
        let id = bus.on(EventKind::Cleared, |trace: &mut Trace, _| {
            trace.0.push("gone");
            Ok(())
        });
        assert_eq!(bus.listener_count(EventKind::Cleared), 1);

        assert!(!bus.off(EventKind::NodeAdded, id));
        assert!(bus.off(EventKind::Cleared, id));
        assert!(!bus.off(EventKind::Cleared, id));

        let mut trace = Trace::default();
        emit(&bus, &mut trace, &GraphEvent::Cleared).unwrap();
        assert!(trace.0.is_empty());
    }

    #[test]
    fn test_failing_handler_stops_dispatch() {
        let mut bus = EventBus::new();
        bus.on(EventKind::Cleared, |trace: &mut Trace, _| {
            trace.0.push("before");
            Ok(())
        });
        bus.on(EventKind::Cleared, |_: &mut Trace, _| bail!("subscriber exploded"));
        bus.on(EventKind::Cleared, |trace: &mut Trace, _| {
            trace.0.push("after");
            Ok(())
        });

        let mut trace = Trace::default();
        let err = emit(&bus, &mut trace, &GraphEvent::Cleared).unwrap_err();
        assert_eq!(
            err,
            GraphError::Handler {
                event: EventKind::Cleared,
                key: None,
                reason: "subscriber exploded".to_string()
            }
        );
        assert_eq!(trace.0, vec!["before"]);
    }

    #[test]
    fn test_remove_all_listeners() {
        let mut bus: EventBus<Trace> = EventBus::new();
        bus.on(EventKind::Cleared, |_, _| Ok(()));
        bus.on(EventKind::NodeAdded, |_, _| Ok(()));
        bus.on(EventKind::NodeAdded, |_, _| Ok(()));

        bus.remove_all_listeners(Some(EventKind::NodeAdded));
        assert_eq!(bus.listener_count(EventKind::NodeAdded), 0);
        assert_eq!(bus.listener_count(EventKind::Cleared), 1);

        bus.remove_all_listeners(None);
        assert_eq!(bus.listener_count(EventKind::Cleared), 0);
    }

    #[test]
    fn test_handler_ids_are_unique() {
        let mut bus: EventBus<Trace> = EventBus::new();
        let a = bus.on(EventKind::Cleared, |_, _| Ok(()));
        let b = bus.on(EventKind::Cleared, |_, _| Ok(()));
        assert_ne!(a, b);
        assert!(a < b);
    }
}
