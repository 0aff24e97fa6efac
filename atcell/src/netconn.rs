//! Sequential convenience wrapper over the connection manager.
//!
//! Grounded on `original_source/lwcell/src/api/lwcell_netconn.c`: that file
//! sits on top of `lwcell_conn.c` exactly the way this module sits on top of
//! [`crate::connection::ConnectionManager`] and [`crate::engine::Engine`] —
//! it owns no engine state of its own and turns the callback-driven
//! connection API into a blocking `receive` call by funnelling a single
//! connection's `ConnRecv`/`ConnClose` events into a small bounded queue.

use std::sync::Arc;
use std::time::Duration;

use crate::engine::Engine;
use crate::error::AtError;
use crate::event::{ConnHandle, Event, HandlerId};
use crate::os::Mbox;
use crate::pbuf::Pbuf;

enum NetconnMsg {
    Data(Pbuf),
    Closed,
}

/// One TCP/UDP connection accessed through a blocking `receive`/`write` API
/// instead of event callbacks. Holds its own event-handler registration for
/// as long as it's alive; dropping it unregisters that handler.
pub struct Netconn {
    engine: Arc<Engine>,
    conn: ConnHandle,
    handler_id: HandlerId,
    queue: Arc<Mbox<NetconnMsg>>,
}

impl Netconn {
    /// Opens a connection and wraps it. Mirrors `lwcell_netconn_connect`.
    pub fn connect(engine: Arc<Engine>, host: &str, port: u16, udp: bool) -> Result<Self, AtError> {
        let conn = engine.conn_start(host, port, udp)?;
        let queue = Arc::new(Mbox::new(32));
        let sender = queue.sender();
        let handler_id = engine.register_event_handler(move |event| match event {
            Event::ConnRecv { conn: c, pbuf } if *c == conn => {
                let _ = sender.try_post(NetconnMsg::Data(pbuf.clone()));
            }
            Event::ConnClose { conn: c, .. } if *c == conn => {
                let _ = sender.try_post(NetconnMsg::Closed);
            }
            _ => {}
        });
        Ok(Self { engine, conn, handler_id, queue })
    }

    pub fn write(&self, data: Vec<u8>) -> Result<(), AtError> {
        self.engine.conn_send(self.conn, data)
    }

    /// Blocks until the next chunk of data arrives, the peer closes the
    /// connection (`Ok(None)`), or `timeout` elapses (`Err(ErrTimeout)`).
    /// Mirrors `lwcell_netconn_receive`.
    pub fn receive(&self, timeout: Duration) -> Result<Option<Pbuf>, AtError> {
        match self.queue.recv_timeout(timeout) {
            Some(NetconnMsg::Data(pbuf)) => Ok(Some(pbuf)),
            Some(NetconnMsg::Closed) => Ok(None),
            None => Err(AtError::ErrTimeout),
        }
    }

    pub fn close(&self) -> Result<(), AtError> {
        self.engine.conn_close(self.conn)
    }

    pub fn remote(&self) -> ConnHandle {
        self.conn
    }
}

impl Drop for Netconn {
    fn drop(&mut self) {
        self.engine.unregister_event_handler(self.handler_id);
    }
}
