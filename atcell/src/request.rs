//! A queued unit of work and its completion handshake.
//!
//! Grounded on `lwcell_types.h`'s `lwcell_msg_t`: a tagged union of "what to
//! do" plus a single result slot the issuing thread blocks on. Here the
//! tagged union is [`RequestKind`] and the result slot is [`Completion`].

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};

use crate::error::AtError;
use crate::event::ConnHandle;
use crate::os::Semaphore;

/// Every operation the engine's public API can enqueue. One command group in
/// `dialect` exists per variant (or per closely related family of variants).
#[derive(Debug, Clone)]
pub enum RequestKind {
    /// Issued once by `Engine::init` right after the threads come up:
    /// switches `+CME ERROR` reporting to verbose and turns on the
    /// unsolicited `+CREG`/`+CGREG` registration URCs the engine relies on
    /// to track network state.
    ConfigureReporting,
    Reset,
    SetFunctionality { minimum: bool },
    EnterPin { pin: String },
    EnterPuk { puk: String, new_pin: String },
    ChangePin { old_pin: String, new_pin: String },
    RemovePin { pin: String },
    DeviceInfo,
    NetworkAttach { apn: String, user: String, pass: String },
    NetworkDetach,
    NetworkStatus,
    SignalStrength,
    OperatorGet,
    OperatorSet { numeric: String },
    OperatorScan,
    SmsEnable,
    SmsDisable,
    SmsSend { number: String, body: String },
    SmsRead { index: u32 },
    SmsList { status: String },
    SmsDelete { index: u32 },
    SmsDeleteAll,
    SmsSetPreferredStorage { storage: String },
    CallEnable,
    CallDisable,
    CallStart { number: String },
    CallAnswer,
    CallHangup,
    PhonebookEnable,
    PhonebookDisable,
    PhonebookAdd { number: String, name: String },
    PhonebookEdit { index: u32, number: String, name: String },
    PhonebookDelete { index: u32 },
    PhonebookRead { index1: u32, index2: Option<u32> },
    PhonebookList,
    PhonebookSearch { prefix: String },
    Ussd { code: String },
    ConnStart { host: String, port: u16, udp: bool },
    ConnSend { conn: ConnHandle, data: Vec<u8> },
    ConnClose { conn: ConnHandle },
    ConnStatus { conn: ConnHandle },
}

/// Outcome of a finished request, written once into its [`Completion`] slot.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestOutcome {
    Ack,
    ConnHandle(ConnHandle),
    SignalStrength { rssi: i32, ber: u8 },
    DeviceInfo { manufacturer: String, model: String, revision: String, serial: String },
    Ip(Ipv4Addr),
    SmsSent { pos: u32 },
    SmsEntries(Vec<crate::command::sms::responses::SmsEntry>),
    PhonebookEntries(Vec<crate::command::phonebook::types::PhonebookEntry>),
    OperatorScanResults(Vec<crate::event::OperatorScanEntry>),
    Text(String),
}

struct CompletionSlot {
    result: Mutex<Option<Result<RequestOutcome, AtError>>>,
    signal: Semaphore,
}

/// Shared between the issuing thread and the producer: the producer stores
/// the result and signals, the issuer waits on the signal then takes the
/// result.
#[derive(Clone)]
pub struct Completion(Arc<CompletionSlot>);

impl Default for Completion {
    fn default() -> Self {
        Self(Arc::new(CompletionSlot { result: Mutex::new(None), signal: Semaphore::new(0) }))
    }
}

impl Completion {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn resolve(&self, result: Result<RequestOutcome, AtError>) {
        *self.0.result.lock().expect("completion lock poisoned") = Some(result);
        self.0.signal.signal();
    }

    /// Blocks until resolved or `timeout` elapses. A timeout without a
    /// resolution yields `AtError::ErrTimeout`.
    pub fn wait(&self, timeout: std::time::Duration) -> Result<RequestOutcome, AtError> {
        if !self.0.signal.wait_timeout(timeout) {
            return Err(AtError::ErrTimeout);
        }
        self.0.result.lock().expect("completion lock poisoned").take().unwrap_or(Err(AtError::Err))
    }
}

/// Invoked by the producer once a request's `Completion` resolves, letting
/// `Engine::call_async` observe the outcome without blocking on it.
pub type Callback = Arc<dyn Fn(Result<RequestOutcome, AtError>) + Send + Sync>;

/// A request plus its completion handle, as handed from an application
/// thread to the producer's mailbox. `callback`, when set, is invoked by the
/// producer alongside resolving `completion` — the non-blocking counterpart
/// to an issuer waiting on `completion` itself.
pub struct Request {
    pub kind: RequestKind,
    pub completion: Completion,
    pub callback: Option<Callback>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn wait_times_out_when_never_resolved() {
        let completion = Completion::new();
        assert_eq!(completion.wait(Duration::from_millis(10)), Err(AtError::ErrTimeout));
    }

    #[test]
    fn wait_returns_resolved_outcome() {
        let completion = Completion::new();
        let c2 = completion.clone();
        thread::spawn(move || c2.resolve(Ok(RequestOutcome::Ack)));
        let result = completion.wait(Duration::from_secs(2));
        assert!(matches!(result, Ok(RequestOutcome::Ack)));
    }
}
