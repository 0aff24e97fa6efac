//! Connection slot table.
//!
//! Grounded on `lwcell_conn.c`'s fixed `LWCELL_CFG_MAX_CONNS`-sized array of
//! `lwcell_conn_t` plus a monotonic `val_id` stamped into every handle to
//! detect a stale reference to a slot the modem has since recycled (spec
//! invariant: a `ConnHandle` from a closed connection must never alias a
//! newly opened one sharing its slot).

use std::net::Ipv4Addr;
use std::sync::Mutex;

use crate::error::AtError;
use crate::event::ConnHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnState {
    Closed,
    Connecting,
    Active,
    Closing,
}

#[derive(Debug, Clone)]
pub struct Connection {
    pub state: ConnState,
    pub validation_id: u32,
    pub remote: Option<(Ipv4Addr, u16)>,
    pub udp: bool,
    /// Bytes queued by `conn_write` but not yet handed to `+CIPSEND`. Flushed
    /// once it reaches `Config::max_conn_data_len` or the caller asks for an
    /// explicit flush, grounded on `lwcell_conn.c`'s `lwcell_conn_write`.
    pub write_buf: Vec<u8>,
    /// Running count of payload bytes delivered to the application via
    /// `+RECEIVE` framing, mirroring `lwcell_conn_t.total_recved`.
    pub total_recved: usize,
}

impl Default for Connection {
    fn default() -> Self {
        Self {
            state: ConnState::Closed,
            validation_id: 0,
            remote: None,
            udp: false,
            write_buf: Vec::new(),
            total_recved: 0,
        }
    }
}

/// Fixed-size slot table, sized by [`crate::config::Config::max_conns`].
pub struct ConnectionManager {
    slots: Mutex<Vec<Connection>>,
    next_validation_id: Mutex<u32>,
}

impl ConnectionManager {
    pub fn new(max_conns: usize) -> Self {
        Self {
            slots: Mutex::new(vec![Connection::default(); max_conns]),
            next_validation_id: Mutex::new(1),
        }
    }

    /// Reserves the first closed slot for a new connection attempt, stamping
    /// in the target this attempt is dialing. The slot stays `Connecting`
    /// until the `<id>, CONNECT OK` URC lands and [`Self::mark_active`]
    /// flips it, matching how the modem itself answers `+CIPSTART` with a
    /// synchronous `OK` well before the connection is actually up.
    pub fn allocate(&self, remote: (Ipv4Addr, u16), udp: bool) -> Result<ConnHandle, AtError> {
        let mut slots = self.slots.lock().expect("connection table lock poisoned");
        let slot = slots
            .iter()
            .position(|c| c.state == ConnState::Closed)
            .ok_or(AtError::ErrMem)?;
        let mut next_id = self.next_validation_id.lock().expect("validation id lock poisoned");
        let validation_id = *next_id;
        *next_id += 1;
        slots[slot] = Connection {
            state: ConnState::Connecting,
            validation_id,
            remote: Some(remote),
            udp,
            ..Connection::default()
        };
        Ok(ConnHandle { slot, validation_id })
    }

    /// Flips a `Connecting` slot to `Active` once the `<id>, CONNECT OK` URC
    /// confirms the socket is actually up. The remote address was already
    /// stamped in by [`Self::allocate`].
    pub fn mark_active(&self, handle: ConnHandle) {
        let mut slots = self.slots.lock().expect("connection table lock poisoned");
        if let Some(conn) = self.live_mut(&mut slots, handle) {
            conn.state = ConnState::Active;
        }
    }

    pub fn mark_closed(&self, handle: ConnHandle) {
        let mut slots = self.slots.lock().expect("connection table lock poisoned");
        if let Some(conn) = self.live_mut(&mut slots, handle) {
            *conn = Connection::default();
        }
    }

    pub fn is_live(&self, handle: ConnHandle) -> bool {
        let slots = self.slots.lock().expect("connection table lock poisoned");
        slots
            .get(handle.slot)
            .map(|c| c.validation_id == handle.validation_id && c.state != ConnState::Closed)
            .unwrap_or(false)
    }

    pub fn handle_for_slot(&self, slot: usize) -> Option<ConnHandle> {
        let slots = self.slots.lock().expect("connection table lock poisoned");
        slots.get(slot).filter(|c| c.state != ConnState::Closed).map(|c| ConnHandle {
            slot,
            validation_id: c.validation_id,
        })
    }

    pub fn active_handles(&self) -> Vec<ConnHandle> {
        let slots = self.slots.lock().expect("connection table lock poisoned");
        slots
            .iter()
            .enumerate()
            .filter(|(_, c)| c.state == ConnState::Active)
            .map(|(slot, c)| ConnHandle { slot, validation_id: c.validation_id })
            .collect()
    }

    fn live_mut<'a>(
        &self,
        slots: &'a mut [Connection],
        handle: ConnHandle,
    ) -> Option<&'a mut Connection> {
        slots
            .get_mut(handle.slot)
            .filter(|c| c.validation_id == handle.validation_id && c.state != ConnState::Closed)
    }

    fn live<'a>(&self, slots: &'a [Connection], handle: ConnHandle) -> Option<&'a Connection> {
        slots
            .get(handle.slot)
            .filter(|c| c.validation_id == handle.validation_id && c.state != ConnState::Closed)
    }

    /// Remote address/port this connection was dialed to, for stamping onto
    /// a delivered `Pbuf`'s source.
    pub fn remote_of(&self, handle: ConnHandle) -> Option<(Ipv4Addr, u16)> {
        let slots = self.slots.lock().expect("connection table lock poisoned");
        self.live(&slots, handle).and_then(|c| c.remote)
    }

    /// Appends as much of `data` as fits below `max_len` into the slot's
    /// coalesce buffer, returning how many bytes were consumed.
    pub fn buffer_append(&self, handle: ConnHandle, data: &[u8], max_len: usize) -> Result<usize, AtError> {
        let mut slots = self.slots.lock().expect("connection table lock poisoned");
        let conn = self.live_mut(&mut slots, handle).ok_or(AtError::ErrClosed)?;
        let room = max_len.saturating_sub(conn.write_buf.len());
        let take = data.len().min(room);
        conn.write_buf.extend_from_slice(&data[..take]);
        Ok(take)
    }

    pub fn buffer_len(&self, handle: ConnHandle) -> usize {
        let slots = self.slots.lock().expect("connection table lock poisoned");
        self.live(&slots, handle).map(|c| c.write_buf.len()).unwrap_or(0)
    }

    /// Drains and returns the slot's coalesce buffer.
    pub fn take_buffer(&self, handle: ConnHandle) -> Vec<u8> {
        let mut slots = self.slots.lock().expect("connection table lock poisoned");
        match self.live_mut(&mut slots, handle) {
            Some(conn) => std::mem::take(&mut conn.write_buf),
            None => Vec::new(),
        }
    }

    pub fn add_recved(&self, handle: ConnHandle, len: usize) {
        let mut slots = self.slots.lock().expect("connection table lock poisoned");
        if let Some(conn) = self.live_mut(&mut slots, handle) {
            conn.total_recved += len;
        }
    }

    pub fn total_recved(&self, handle: ConnHandle) -> usize {
        let slots = self.slots.lock().expect("connection table lock poisoned");
        self.live(&slots, handle).map(|c| c.total_recved).unwrap_or(0)
    }

    /// Closes every non-closed slot regardless of state, returning the
    /// handles that were live before the reset. Used by
    /// `Engine::device_set_present(false)` to drop all connections at once.
    pub fn reset_all(&self) -> Vec<ConnHandle> {
        let mut slots = self.slots.lock().expect("connection table lock poisoned");
        let mut handles = Vec::new();
        for (slot, conn) in slots.iter_mut().enumerate() {
            if conn.state != ConnState::Closed {
                handles.push(ConnHandle { slot, validation_id: conn.validation_id });
            }
            *conn = Connection::default();
        }
        handles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn allocate_fails_when_all_slots_busy() {
        let mgr = ConnectionManager::new(1);
        mgr.allocate(("127.0.0.1".parse().unwrap(), 80), false).unwrap();
        assert_eq!(mgr.allocate(("127.0.0.1".parse().unwrap(), 81), false), Err(AtError::ErrMem));
    }

    #[test]
    fn stale_handle_is_not_live_after_recycle() {
        let mgr = ConnectionManager::new(1);
        let first = mgr.allocate(("127.0.0.1".parse().unwrap(), 80), false).unwrap();
        mgr.mark_active(first);
        mgr.mark_closed(first);
        let second = mgr.allocate(("127.0.0.1".parse().unwrap(), 80), false).unwrap();
        assert_eq!(second.slot, first.slot);
        assert_ne!(second.validation_id, first.validation_id);
        assert!(!mgr.is_live(first));
        assert!(mgr.is_live(second));
    }

    #[test]
    fn active_handles_lists_only_active_slots() {
        let mgr = ConnectionManager::new(2);
        let a = mgr.allocate(("10.0.0.1".parse().unwrap(), 1883), false).unwrap();
        mgr.mark_active(a);
        let _b = mgr.allocate(("10.0.0.2".parse().unwrap(), 1883), false).unwrap();
        assert_eq!(mgr.active_handles(), vec![a]);
    }

    #[test]
    fn buffer_append_stops_at_max_len() {
        let mgr = ConnectionManager::new(1);
        let a = mgr.allocate(("10.0.0.1".parse().unwrap(), 1883), false).unwrap();
        assert_eq!(mgr.buffer_append(a, b"abcde", 3).unwrap(), 3);
        assert_eq!(mgr.buffer_len(a), 3);
        assert_eq!(mgr.buffer_append(a, b"de", 3).unwrap(), 0);
        assert_eq!(mgr.take_buffer(a), b"abc");
        assert_eq!(mgr.buffer_len(a), 0);
    }

    #[test]
    fn reset_all_recycles_every_non_closed_slot() {
        let mgr = ConnectionManager::new(2);
        let a = mgr.allocate(("10.0.0.1".parse().unwrap(), 1883), false).unwrap();
        mgr.mark_active(a);
        let b = mgr.allocate(("10.0.0.2".parse().unwrap(), 1883), false).unwrap();
        let closed = mgr.reset_all();
        assert_eq!(closed.len(), 2);
        assert!(closed.contains(&a));
        assert!(closed.contains(&b));
        assert!(!mgr.is_live(a));
        assert!(!mgr.is_live(b));
    }
}
