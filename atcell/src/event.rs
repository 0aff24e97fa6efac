//! Typed event stream and the global event-handler registry.
//!
//! Grounded on `lwcell_evt.c` (`lwcell_evt_register`/`lwcell_evt_unregister`
//! keep a singly-linked list under the core lock; accessor functions pull
//! fields back out of a tagged union). Here the tagged union is just
//! `Event`, and accessors are ordinary field access/pattern matching.
//!
//! The registry never calls a handler while holding its internal lock: see
//! [`EventRegistry::dispatch`], which resolves the "callback re-entrancy"
//! design note by snapshotting the handler list, dropping the lock, then
//! invoking each handler in turn.

use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::command::network::types::NetworkRegistrationState;
use crate::command::sim::types::SimState;
use crate::error::AtError;
use crate::pbuf::Pbuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnHandle {
    pub slot: usize,
    pub validation_id: u32,
}

#[derive(Debug, Clone)]
pub struct OperatorInfo {
    pub name: String,
    pub numeric: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorScanEntry {
    pub status: u8,
    pub long_name: String,
    pub short_name: String,
    pub numeric: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallState {
    Idle,
    Ringing,
    Active,
}

/// One item delivered to every registered global handler, or (for
/// connection events) to the owning connection's per-connection callback.
#[derive(Debug, Clone)]
pub enum Event {
    DeviceIdentified { manufacturer: String, model: String, revision: String, serial: String },
    SimStateChanged(SimState),
    NetworkRegistrationChanged(NetworkRegistrationState),
    SignalStrength { rssi: i32, ber: u8 },
    OperatorCurrent(OperatorInfo),
    OperatorScanResult(Vec<OperatorScanEntry>),
    NetworkAttached { ip: Ipv4Addr },
    NetworkDetached,
    SmsRecv { storage: String, index: u32 },
    SmsSend { result: AtError, pos: Option<u32> },
    CallStateChanged(CallState),
    IncomingCall { number: String },
    PhonebookChanged,
    UssdResult { text: String },
    ConnActive(ConnHandle),
    ConnRecv { conn: ConnHandle, pbuf: Pbuf },
    ConnSend { conn: ConnHandle, sent: usize, result: AtError },
    ConnClose { conn: ConnHandle, forced: bool },
    ConnError { conn: ConnHandle },
    ConnPoll(ConnHandle),
    KeepAlive,
}

pub type HandlerId = u64;
type HandlerFn = dyn Fn(&Event) + Send + Sync;

/// Thread-safe list of global event handlers.
pub struct EventRegistry {
    handlers: Mutex<Vec<(HandlerId, Arc<HandlerFn>)>>,
    next_id: AtomicU64,
}

impl Default for EventRegistry {
    fn default() -> Self {
        Self { handlers: Mutex::new(Vec::new()), next_id: AtomicU64::new(1) }
    }
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, handler: impl Fn(&Event) + Send + Sync + 'static) -> HandlerId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.handlers
            .lock()
            .expect("event registry lock poisoned")
            .push((id, Arc::new(handler)));
        id
    }

    pub fn unregister(&self, id: HandlerId) {
        self.handlers
            .lock()
            .expect("event registry lock poisoned")
            .retain(|(existing, _)| *existing != id);
    }

    /// Fires `event` to every registered handler. Handlers are snapshotted
    /// out from under the lock first, so a handler that calls back into the
    /// engine (e.g. to register another handler, or issue a new request)
    /// never deadlocks against this registry's own lock.
    pub fn dispatch(&self, event: &Event) {
        let snapshot: Vec<Arc<HandlerFn>> = {
            let handlers = self.handlers.lock().expect("event registry lock poisoned");
            handlers.iter().map(|(_, f)| f.clone()).collect()
        };
        for handler in snapshot {
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn dispatch_reaches_all_registered_handlers() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c1 = count.clone();
        let c2 = count.clone();
        registry.register(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        registry.register(move |_| {
            c2.fetch_add(1, Ordering::SeqCst);
        });
        registry.dispatch(&Event::KeepAlive);
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn unregister_stops_future_dispatch() {
        let registry = EventRegistry::new();
        let count = Arc::new(AtomicUsize::new(0));
        let c1 = count.clone();
        let id = registry.register(move |_| {
            c1.fetch_add(1, Ordering::SeqCst);
        });
        registry.unregister(id);
        registry.dispatch(&Event::KeepAlive);
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn handler_can_register_another_handler_without_deadlock() {
        let registry = Arc::new(EventRegistry::new());
        let inner = registry.clone();
        registry.register(move |_| {
            inner.register(|_| {});
        });
        registry.dispatch(&Event::KeepAlive);
    }
}
