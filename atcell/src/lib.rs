//! # atcell
//!
//! A host-side AT-command runtime for SIM800/900-class 2G and
//! SIM7000/7020-class NB-IoT modems. Two cooperating threads (producer,
//! processor) turn typed application requests into serialized AT exchanges
//! and incoming modem bytes into typed events, behind a blocking request API
//! and a connection manager for TCP/UDP sockets over `+CIP*`.

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod command;
pub mod config;
pub mod connection;
pub mod dialect;
pub mod engine;
pub mod error;
pub mod event;
pub mod link;
pub mod netconn;
pub mod os;
pub mod parser;
pub mod pbuf;
mod processor;
mod producer;
pub mod request;
pub mod script;
pub mod timeout;

pub use config::Config;
pub use engine::Engine;
pub use error::{AtError, Error};
pub use event::{ConnHandle, Event, EventRegistry, HandlerId};
pub use request::{RequestKind, RequestOutcome};

pub mod prelude {
    pub use crate::command;
    pub use crate::config::Config;
    pub use crate::dialect::{Sim7000, Sim800};
    pub use crate::script::Dialect;
    pub use crate::engine::Engine;
    pub use crate::error::{AtError, Error};
    pub use crate::event::{CallState, ConnHandle, Event, EventRegistry, HandlerId};
    pub use crate::link::Link;
    pub use crate::netconn::Netconn;
    pub use crate::request::{RequestKind, RequestOutcome};
}
