use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::object::Timestamp;

/// Handle to a registered listener, used to remove it
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

pub(crate) type Callback = Arc<dyn Fn(Timestamp) + Send + Sync>;

/// Listeners grouped by event name, in registration order
///
/// Every registration gets its own id, registering the same callback twice
/// results in two listeners.
#[derive(Default)]
pub(crate) struct Listeners {
    next_id: u64,
    events: HashMap<String, Vec<(ListenerId, Callback)>>,
}

impl Listeners {
    /// Add a listener for the event
    ///
    /// Returns the listener id and true if this is the first listener for
    /// the event.
    pub fn add(&mut self, event: &str, callback: Callback) -> (ListenerId, bool) {
        let id = ListenerId(self.next_id);
        self.next_id += 1;

        let listeners = self.events.entry(event.to_string()).or_default();
        listeners.push((id, callback));

        (id, listeners.len() == 1)
    }

    /// Remove a listener for the event
    ///
    /// Returns the number of listeners left for the event, or `None` if the
    /// listener was not registered.
    pub fn remove(&mut self, event: &str, id: ListenerId) -> Option<usize> {
        let listeners = self.events.get_mut(event)?;
        let pos = listeners.iter().position(|(lid, _)| *lid == id)?;
        listeners.remove(pos);

        let left = listeners.len();
        if left == 0 {
            self.events.remove(event);
        }
        Some(left)
    }

    pub fn contains(&self, event: &str, id: ListenerId) -> bool {
        self.events
            .get(event)
            .is_some_and(|listeners| listeners.iter().any(|(lid, _)| *lid == id))
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.get(event).map_or(0, Vec::len)
    }

    /// Return the listeners for the event, in registration order
    pub fn get(&self, event: &str) -> Vec<(ListenerId, Callback)> {
        self.events.get(event).cloned().unwrap_or_default()
    }
}
