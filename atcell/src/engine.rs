//! Top-level lifecycle and public API façade.
//!
//! Grounded on `lwcell.c`'s `lwcell_init`/`lwcell_deinit` plus the thin
//! `lwcell_*` wrapper functions that each build a message, enqueue it, and
//! block on its semaphore — here that's [`Engine::call`]/[`Engine::post`]
//! and the methods built on top of them.

use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use crate::command::network::types::NetworkRegistrationState;
use crate::command::sim::types::SimState;
use crate::config::{default_timeout, Config};
use crate::connection::ConnectionManager;
use crate::script::Dialect;
use crate::error::{AtError, Error};
use crate::event::{ConnHandle, Event, EventRegistry, HandlerId};
use crate::link::Link;
use crate::processor::{Processor, StepSync};
use crate::producer::Producer;
use crate::request::{Callback, Completion, Request, RequestKind, RequestOutcome};

thread_local! {
    static ON_PROCESSOR_THREAD: std::cell::Cell<bool> = std::cell::Cell::new(false);
    static ON_PRODUCER_THREAD: std::cell::Cell<bool> = std::cell::Cell::new(false);
}

/// Status flags and cached network state, all behind one lock per the
/// "single core lock" design (see module doc on [`crate::event::EventRegistry::dispatch`]
/// for the no-callback-under-lock discipline this struct's users follow).
#[derive(Debug, Clone, Default)]
struct CoreState {
    initialized: bool,
    dev_present: bool,
    sms_ready: bool,
    call_ready: bool,
    phonebook_ready: bool,
    attached: bool,
    sim_state: Option<SimState>,
    registration: Option<NetworkRegistrationState>,
    ip: Option<Ipv4Addr>,
}

/// Owns the producer/processor threads and exposes the request API.
/// One process-wide instance is expected, created by [`Engine::init`] and
/// torn down by [`Engine::deinit`].
pub struct Engine {
    config: Config,
    core: Mutex<CoreState>,
    events: Arc<EventRegistry>,
    conns: Arc<ConnectionManager>,
    request_tx: crate::os::MboxSender<Request>,
    input_tx: crate::os::MboxSender<Vec<u8>>,
    link: Arc<dyn Link>,
    producer_thread: Option<thread::JoinHandle<()>>,
    processor_thread: Option<thread::JoinHandle<()>>,
}

impl Engine {
    /// Spawns the producer and processor threads and returns a ready engine.
    /// Honors `config.reset_on_init` by driving the link's reset line before
    /// the processor has anything to misinterpret as a response.
    pub fn init(config: Config, link: Arc<dyn Link>, dialect: Box<dyn Dialect>) -> Result<Self, Error> {
        if config.reset_on_init {
            link.reset(true);
            thread::sleep(Duration::from_millis(100));
            link.reset(false);
        }

        let events = Arc::new(EventRegistry::new());
        let conns = Arc::new(ConnectionManager::new(config.max_conns));
        let step_sync = StepSync::new();

        let processor = Arc::new(Processor::new(events.clone(), conns.clone(), step_sync.clone()));
        let input_tx = processor.input_sender();

        let producer = Arc::new(Producer::new(
            link.clone(),
            dialect,
            step_sync,
            events.clone(),
            conns.clone(),
            config.keep_alive_timeout,
            config.conn_poll_interval,
        ));
        let request_tx = producer.request_sender();

        let processor_for_thread = processor.clone();
        let processor_thread = thread::Builder::new()
            .name("atcell-processor".into())
            .spawn(move || {
                ON_PROCESSOR_THREAD.with(|f| f.set(true));
                processor_for_thread.run();
            })
            .map_err(|_| Error::Mem)?;

        let producer_for_thread = producer.clone();
        let processor_for_flag = processor.clone();
        let producer_thread = thread::Builder::new()
            .name("atcell-producer".into())
            .spawn(move || {
                ON_PRODUCER_THREAD.with(|f| f.set(true));
                producer_for_thread.run(move |expect| processor_for_flag.expect_line(expect));
            })
            .map_err(|_| Error::Mem)?;

        // Fire-and-forget: this is bring-up configuration, not something
        // callers should have to wait on before the engine is usable.
        let _ = request_tx.try_post(Request {
            kind: RequestKind::ConfigureReporting,
            completion: Completion::new(),
            callback: None,
        });

        let mut core = CoreState::default();
        core.initialized = true;
        core.dev_present = true;

        Ok(Self {
            config,
            core: Mutex::new(core),
            events,
            conns,
            request_tx,
            input_tx,
            link,
            producer_thread: Some(producer_thread),
            processor_thread: Some(processor_thread),
        })
    }

    /// Tears the engine down: drops both mailbox senders, which unblocks the
    /// producer/processor `recv` calls so their threads exit, then joins them.
    pub fn deinit(mut self) {
        let mut core = self.core.lock().expect("core lock poisoned");
        core.initialized = false;
        drop(core);
        // Dropping `self.request_tx`/`self.input_tx` happens implicitly when
        // `self` is dropped at the end of this call; join the threads first
        // so we don't race the drop against their last `recv`.
        if let Some(handle) = self.producer_thread.take() {
            let _ = handle.join();
        }
        if let Some(handle) = self.processor_thread.take() {
            let _ = handle.join();
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn register_event_handler(&self, handler: impl Fn(&Event) + Send + Sync + 'static) -> HandlerId {
        self.events.register(handler)
    }

    pub fn unregister_event_handler(&self, id: HandlerId) {
        self.events.unregister(id)
    }

    /// Feeds bytes received from the link adapter into the processor. This
    /// is the "push" half of the input-process/input-push duality in §4.3;
    /// `process_input` is the other half, kept as a distinct entry point so
    /// a caller using `Config::input_use_process` has a method name that
    /// matches its mental model even though both ultimately hand bytes to
    /// the same processor mailbox.
    pub fn push_input(&self, bytes: &[u8]) -> Result<(), Error> {
        self.input_tx.try_post(bytes.to_vec()).map_err(|_| Error::Mem)
    }

    /// Synchronous variant of [`Engine::push_input`] for adapters that drive
    /// the engine from their own read loop rather than being driven by one.
    pub fn process_input(&self, bytes: &[u8]) -> Result<(), Error> {
        self.push_input(bytes)
    }

    pub fn connections(&self) -> &ConnectionManager {
        &self.conns
    }

    /// The link adapter this engine was built with, for callers that need to
    /// drive the reset line directly (e.g. a CLI demo's `--reset` flag).
    pub fn link(&self) -> &Arc<dyn Link> {
        &self.link
    }

    /// True on the processor thread (where URCs are classified) or the
    /// producer thread (which also runs completion callbacks): a blocking
    /// `call` from either would deadlock against the very thread it would
    /// have to wait on.
    fn on_processor_thread(&self) -> bool {
        ON_PROCESSOR_THREAD.with(|f| f.get()) || ON_PRODUCER_THREAD.with(|f| f.get())
    }

    /// Rejects a request before it is ever enqueued: `ErrNoDevice` once
    /// [`Self::device_set_present`] has cleared the present flag, or
    /// `ErrNotEnabled` for an SMS/call/phonebook operation issued before its
    /// matching `*_enable` call, mirroring `lwcell.c`'s `CHECK_ENABLED`.
    fn gate(&self, kind: &RequestKind) -> Result<(), AtError> {
        use RequestKind::*;
        let core = self.core.lock().expect("core lock poisoned");
        if !core.dev_present {
            return Err(AtError::ErrNoDevice);
        }
        let ready = match kind {
            SmsSend { .. } | SmsRead { .. } | SmsList { .. } | SmsDelete { .. } | SmsDeleteAll
            | SmsSetPreferredStorage { .. } => core.sms_ready,
            CallStart { .. } | CallAnswer | CallHangup => core.call_ready,
            PhonebookAdd { .. }
            | PhonebookEdit { .. }
            | PhonebookDelete { .. }
            | PhonebookRead { .. }
            | PhonebookList
            | PhonebookSearch { .. } => core.phonebook_ready,
            _ => true,
        };
        if !ready {
            return Err(AtError::ErrNotEnabled);
        }
        Ok(())
    }

    /// Gates and enqueues `kind`, returning the completion the caller can
    /// either wait on (`call`) or discard (`post`/`call_async`).
    fn enqueue(&self, kind: RequestKind, callback: Option<Callback>) -> Result<Completion, AtError> {
        self.gate(&kind)?;
        let completion = Completion::new();
        self.request_tx
            .try_post(Request { kind, completion: completion.clone(), callback })
            .map_err(|_| AtError::ErrMem)?;
        Ok(completion)
    }

    /// Enqueues `kind` and blocks on its completion, honoring the per-kind
    /// timeout from [`crate::config::default_timeout`]. Fails immediately
    /// with `ErrBlocking` if called from inside an event callback running on
    /// the processor or producer thread (§4.1).
    fn call(&self, kind: RequestKind) -> Result<RequestOutcome, AtError> {
        if self.on_processor_thread() {
            return Err(AtError::ErrBlocking);
        }
        let timeout = default_timeout(&kind);
        let completion = self.enqueue(kind, None)?;
        completion.wait(timeout)
    }

    /// Enqueues `kind` without blocking; the caller observes its result only
    /// through whatever event the command group fires on completion.
    fn post(&self, kind: RequestKind) -> Result<(), Error> {
        self.enqueue(kind, None).map(|_| ()).map_err(|_| Error::Mem)
    }

    /// Non-blocking dual of [`Self::call`]: enqueues `kind` and returns
    /// immediately, invoking `callback` with the request's result once the
    /// producer thread finishes its command group. Matches §4.1's
    /// `(evt_fn, evt_arg, blocking)` triple — here spelled as a distinct
    /// entry point taking the callback directly rather than a `blocking`
    /// flag shared with `call`, since the two return different shapes
    /// (`Result<RequestOutcome, AtError>` now vs. later).
    ///
    /// Runs on the producer thread; callbacks must not themselves block on
    /// another `call` (they'll get `ErrBlocking`; see `on_processor_thread`).
    pub fn call_async(
        &self,
        kind: RequestKind,
        callback: impl Fn(Result<RequestOutcome, AtError>) + Send + Sync + 'static,
    ) -> Result<(), AtError> {
        self.enqueue(kind, Some(Arc::new(callback))).map(|_| ())
    }

    /// Cancels the effect of a missing/removed modem: gates out every future
    /// call with `ErrNoDevice`, clears cached status, and drops every
    /// connection slot (firing a forced `ConnClose` for each), mirroring
    /// `lwcell_device_set_present`. Requests already dequeued by the
    /// producer and mid-exchange are not interrupted — there is no
    /// preemption channel into an in-flight step wait, the same limitation
    /// the mailbox-based original has once a message has left its queue.
    pub fn device_set_present(&self, present: bool) {
        let mut core = self.core.lock().expect("core lock poisoned");
        core.dev_present = present;
        if present {
            return;
        }
        core.sms_ready = false;
        core.call_ready = false;
        core.phonebook_ready = false;
        core.attached = false;
        core.sim_state = None;
        core.registration = None;
        core.ip = None;
        drop(core);
        for handle in self.conns.reset_all() {
            self.events.dispatch(&Event::ConnClose { conn: handle, forced: true });
        }
    }

    pub fn reset(&self) -> Result<(), AtError> {
        self.call(RequestKind::Reset).map(|_| ())
    }

    pub fn set_functionality(&self, minimum: bool) -> Result<(), AtError> {
        self.call(RequestKind::SetFunctionality { minimum }).map(|_| ())
    }

    pub fn enter_pin(&self, pin: &str) -> Result<(), AtError> {
        self.call(RequestKind::EnterPin { pin: pin.to_string() })?;
        self.mark_sim_ready();
        Ok(())
    }

    pub fn enter_puk(&self, puk: &str, new_pin: &str) -> Result<(), AtError> {
        self.call(RequestKind::EnterPuk { puk: puk.to_string(), new_pin: new_pin.to_string() })?;
        self.mark_sim_ready();
        Ok(())
    }

    fn mark_sim_ready(&self) {
        self.core.lock().expect("core lock poisoned").sim_state = Some(SimState::Ready);
        self.events.dispatch(&Event::SimStateChanged(SimState::Ready));
    }

    pub fn change_pin(&self, old_pin: &str, new_pin: &str) -> Result<(), AtError> {
        self.call(RequestKind::ChangePin { old_pin: old_pin.to_string(), new_pin: new_pin.to_string() }).map(|_| ())
    }

    pub fn remove_pin(&self, pin: &str) -> Result<(), AtError> {
        self.call(RequestKind::RemovePin { pin: pin.to_string() }).map(|_| ())
    }

    pub fn device_info(&self) -> Result<(String, String, String, String), AtError> {
        match self.call(RequestKind::DeviceInfo)? {
            RequestOutcome::DeviceInfo { manufacturer, model, revision, serial } => {
                Ok((manufacturer, model, revision, serial))
            }
            _ => Err(AtError::Err),
        }
    }

    pub fn network_attach(&self, apn: &str, user: &str, pass: &str) -> Result<Ipv4Addr, AtError> {
        let outcome = self.call(RequestKind::NetworkAttach {
            apn: apn.to_string(),
            user: user.to_string(),
            pass: pass.to_string(),
        })?;
        match outcome {
            RequestOutcome::Ip(ip) => {
                self.core.lock().expect("core lock poisoned").attached = true;
                Ok(ip)
            }
            _ => Err(AtError::Err),
        }
    }

    pub fn network_detach(&self) -> Result<(), AtError> {
        self.call(RequestKind::NetworkDetach)?;
        self.core.lock().expect("core lock poisoned").attached = false;
        Ok(())
    }

    pub fn network_status(&self) -> Result<String, AtError> {
        match self.call(RequestKind::NetworkStatus)? {
            RequestOutcome::Text(t) => Ok(t),
            _ => Err(AtError::Err),
        }
    }

    pub fn signal_strength(&self) -> Result<(i32, u8), AtError> {
        match self.call(RequestKind::SignalStrength)? {
            RequestOutcome::SignalStrength { rssi, ber } => Ok((rssi, ber)),
            _ => Err(AtError::Err),
        }
    }

    pub fn operator_get(&self) -> Result<String, AtError> {
        match self.call(RequestKind::OperatorGet)? {
            RequestOutcome::Text(t) => Ok(t),
            _ => Err(AtError::Err),
        }
    }

    pub fn operator_set(&self, numeric: &str) -> Result<(), AtError> {
        self.call(RequestKind::OperatorSet { numeric: numeric.to_string() }).map(|_| ())
    }

    pub fn operator_scan(&self) -> Result<Vec<crate::event::OperatorScanEntry>, AtError> {
        match self.call(RequestKind::OperatorScan)? {
            RequestOutcome::OperatorScanResults(entries) => Ok(entries),
            _ => Err(AtError::Err),
        }
    }

    pub fn sms_enable(&self) -> Result<(), AtError> {
        self.call(RequestKind::SmsEnable)?;
        self.core.lock().expect("core lock poisoned").sms_ready = true;
        Ok(())
    }

    pub fn sms_disable(&self) -> Result<(), AtError> {
        self.call(RequestKind::SmsDisable)?;
        self.core.lock().expect("core lock poisoned").sms_ready = false;
        Ok(())
    }

    /// Rejects an empty number/body or a body over the 160-character
    /// text-mode limit with `ErrParam` before the request is ever enqueued,
    /// matching `lwcell_sms.c`'s `LWCELL_ASSERT(text != NULL && text[0] > 0
    /// && strlen(text) <= 160)`.
    pub fn sms_send(&self, number: &str, body: &str) -> Result<u32, AtError> {
        if number.is_empty() || body.is_empty() || body.len() > 160 {
            return Err(AtError::ErrParam);
        }
        match self.call(RequestKind::SmsSend { number: number.to_string(), body: body.to_string() })? {
            RequestOutcome::SmsSent { pos } => Ok(pos),
            _ => Err(AtError::Err),
        }
    }

    pub fn sms_read(&self, index: u32) -> Result<Vec<crate::command::sms::responses::SmsEntry>, AtError> {
        match self.call(RequestKind::SmsRead { index })? {
            RequestOutcome::SmsEntries(entries) => Ok(entries),
            _ => Err(AtError::Err),
        }
    }

    pub fn sms_list(&self, status: &str) -> Result<Vec<crate::command::sms::responses::SmsEntry>, AtError> {
        match self.call(RequestKind::SmsList { status: status.to_string() })? {
            RequestOutcome::SmsEntries(entries) => Ok(entries),
            _ => Err(AtError::Err),
        }
    }

    pub fn sms_delete(&self, index: u32) -> Result<(), AtError> {
        self.call(RequestKind::SmsDelete { index }).map(|_| ())
    }

    pub fn sms_delete_all(&self) -> Result<(), AtError> {
        self.call(RequestKind::SmsDeleteAll).map(|_| ())
    }

    pub fn sms_set_preferred_storage(&self, storage: &str) -> Result<(), AtError> {
        self.call(RequestKind::SmsSetPreferredStorage { storage: storage.to_string() }).map(|_| ())
    }

    pub fn call_enable(&self) -> Result<(), AtError> {
        self.call(RequestKind::CallEnable)?;
        self.core.lock().expect("core lock poisoned").call_ready = true;
        Ok(())
    }

    pub fn call_disable(&self) -> Result<(), AtError> {
        self.call(RequestKind::CallDisable)?;
        self.core.lock().expect("core lock poisoned").call_ready = false;
        Ok(())
    }

    pub fn call_start(&self, number: &str) -> Result<(), AtError> {
        self.call(RequestKind::CallStart { number: number.to_string() }).map(|_| ())
    }

    pub fn call_answer(&self) -> Result<(), AtError> {
        self.call(RequestKind::CallAnswer).map(|_| ())
    }

    pub fn call_hangup(&self) -> Result<(), AtError> {
        self.call(RequestKind::CallHangup).map(|_| ())
    }

    pub fn phonebook_enable(&self) -> Result<(), AtError> {
        self.call(RequestKind::PhonebookEnable)?;
        self.core.lock().expect("core lock poisoned").phonebook_ready = true;
        Ok(())
    }

    pub fn phonebook_disable(&self) -> Result<(), AtError> {
        self.call(RequestKind::PhonebookDisable)?;
        self.core.lock().expect("core lock poisoned").phonebook_ready = false;
        Ok(())
    }

    pub fn phonebook_add(&self, number: &str, name: &str) -> Result<(), AtError> {
        self.call(RequestKind::PhonebookAdd { number: number.to_string(), name: name.to_string() })?;
        self.events.dispatch(&Event::PhonebookChanged);
        Ok(())
    }

    pub fn phonebook_edit(&self, index: u32, number: &str, name: &str) -> Result<(), AtError> {
        self.call(RequestKind::PhonebookEdit { index, number: number.to_string(), name: name.to_string() })?;
        self.events.dispatch(&Event::PhonebookChanged);
        Ok(())
    }

    pub fn phonebook_delete(&self, index: u32) -> Result<(), AtError> {
        self.call(RequestKind::PhonebookDelete { index })?;
        self.events.dispatch(&Event::PhonebookChanged);
        Ok(())
    }

    pub fn phonebook_read(
        &self,
        index1: u32,
        index2: Option<u32>,
    ) -> Result<Vec<crate::command::phonebook::types::PhonebookEntry>, AtError> {
        match self.call(RequestKind::PhonebookRead { index1, index2 })? {
            RequestOutcome::PhonebookEntries(entries) => Ok(entries),
            _ => Err(AtError::Err),
        }
    }

    pub fn phonebook_list(&self) -> Result<Vec<crate::command::phonebook::types::PhonebookEntry>, AtError> {
        match self.call(RequestKind::PhonebookList)? {
            RequestOutcome::PhonebookEntries(entries) => Ok(entries),
            _ => Err(AtError::Err),
        }
    }

    pub fn phonebook_search(
        &self,
        prefix: &str,
    ) -> Result<Vec<crate::command::phonebook::types::PhonebookEntry>, AtError> {
        match self.call(RequestKind::PhonebookSearch { prefix: prefix.to_string() })? {
            RequestOutcome::PhonebookEntries(entries) => Ok(entries),
            _ => Err(AtError::Err),
        }
    }

    pub fn ussd(&self, code: &str) -> Result<(), AtError> {
        self.call(RequestKind::Ussd { code: code.to_string() }).map(|_| ())
    }

    pub fn conn_start(&self, host: &str, port: u16, udp: bool) -> Result<ConnHandle, AtError> {
        match self.call(RequestKind::ConnStart { host: host.to_string(), port, udp })? {
            RequestOutcome::ConnHandle(handle) => Ok(handle),
            _ => Err(AtError::Err),
        }
    }

    /// Rejects an empty write with `ErrParam` before enqueue, matching the
    /// `btw == 0` assertion `lwcell_conn.c`'s `lwcell_conn_send` makes.
    pub fn conn_send(&self, conn: ConnHandle, data: Vec<u8>) -> Result<(), AtError> {
        if data.is_empty() {
            return Err(AtError::ErrParam);
        }
        if !self.conns.is_live(conn) {
            return Err(AtError::ErrClosed);
        }
        let sent = data.len();
        let result = self.call(RequestKind::ConnSend { conn, data });
        match &result {
            Ok(_) => self.events.dispatch(&Event::ConnSend { conn, sent, result: AtError::Ok }),
            Err(e) => {
                self.events.dispatch(&Event::ConnSend { conn, sent: 0, result: *e });
                self.events.dispatch(&Event::ConnError { conn });
            }
        }
        result.map(|_| ())
    }

    /// Fire-and-forget variant of `conn_send`; mirrors `conn_write`'s
    /// non-blocking submission in §4.4.
    pub fn conn_send_async(&self, conn: ConnHandle, data: Vec<u8>) -> Result<(), Error> {
        if data.is_empty() {
            return Err(Error::Param("empty write"));
        }
        if !self.conns.is_live(conn) {
            return Err(Error::Param("connection not live"));
        }
        self.send_conn_chunk(conn, data).map_err(|_| Error::Mem)
    }

    /// Copies `data` into the connection's coalesce buffer, flushing it as a
    /// single `+CIPSEND` whenever it fills to `Config::max_conn_data_len` or
    /// `flush` is set, and sending anything still too large to buffer as
    /// direct full-size chunks. Grounded on `lwcell_conn.c`'s
    /// `lwcell_conn_write`. Non-blocking: flushes are dispatched through
    /// [`Self::call_async`], and their outcome (`Event::ConnSend` /
    /// `Event::ConnError`) arrives asynchronously.
    pub fn conn_write(&self, conn: ConnHandle, data: &[u8], flush: bool) -> Result<(), AtError> {
        if !self.conns.is_live(conn) {
            return Err(AtError::ErrClosed);
        }
        let max_len = self.config.max_conn_data_len.max(1);
        let mut rest = data;

        let consumed = self.conns.buffer_append(conn, rest, max_len)?;
        rest = &rest[consumed..];
        if self.conns.buffer_len(conn) >= max_len {
            self.flush_conn_buffer(conn)?;
        }

        while rest.len() >= max_len {
            let (chunk, remainder) = rest.split_at(max_len);
            self.send_conn_chunk(conn, chunk.to_vec()).map_err(|_| AtError::ErrMem)?;
            rest = remainder;
        }

        if !rest.is_empty() {
            self.conns.buffer_append(conn, rest, max_len)?;
        }

        if flush {
            self.flush_conn_buffer(conn)?;
        }
        Ok(())
    }

    /// Drains and sends whatever is currently in the connection's coalesce
    /// buffer. A no-op (no AT traffic) when the buffer is empty.
    fn flush_conn_buffer(&self, conn: ConnHandle) -> Result<(), AtError> {
        let pending = self.conns.take_buffer(conn);
        if pending.is_empty() {
            return Ok(());
        }
        self.send_conn_chunk(conn, pending).map_err(|_| AtError::ErrMem)
    }

    /// Issues one non-blocking `+CIPSEND` and reports its outcome through
    /// `Event::ConnSend`/`Event::ConnError`, shared by `conn_write`'s flush
    /// path and `conn_send_async`.
    fn send_conn_chunk(&self, conn: ConnHandle, data: Vec<u8>) -> Result<(), AtError> {
        let sent = data.len();
        let events = self.events.clone();
        self.call_async(RequestKind::ConnSend { conn, data }, move |result| match result {
            Ok(_) => events.dispatch(&Event::ConnSend { conn, sent, result: AtError::Ok }),
            Err(e) => {
                events.dispatch(&Event::ConnSend { conn, sent: 0, result: e });
                events.dispatch(&Event::ConnError { conn });
            }
        })
    }

    /// Acknowledges that the application has consumed `_len` bytes of a
    /// previously delivered `ConnRecv` payload. The dialect this engine
    /// targets has no flow-control command to pair with this yet, so it is
    /// a deliberate no-op — reserved for a future windowed-receive mode,
    /// mirroring `lwcell_conn_recved`'s own currently-empty body.
    pub fn conn_recved(&self, conn: ConnHandle, _len: usize) -> Result<(), AtError> {
        if !self.conns.is_live(conn) {
            return Err(AtError::ErrClosed);
        }
        Ok(())
    }

    pub fn conn_close(&self, conn: ConnHandle) -> Result<(), AtError> {
        self.call(RequestKind::ConnClose { conn }).map(|_| ())
    }

    pub fn conn_status(&self, conn: ConnHandle) -> Result<String, AtError> {
        match self.call(RequestKind::ConnStatus { conn })? {
            RequestOutcome::Text(t) => Ok(t),
            _ => Err(AtError::Err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::Sim800;
    use crate::link::MockLink;

    #[test]
    fn init_marks_device_present() {
        let link: Arc<dyn Link> = Arc::new(MockLink::new());
        let engine = Engine::init(Config::default(), link, Box::new(Sim800)).unwrap();
        assert!(engine.core.lock().unwrap().dev_present);
        engine.deinit();
    }

    #[test]
    fn sms_enable_times_out_without_a_modem_attached() {
        let link: Arc<dyn Link> = Arc::new(MockLink::new());
        let mut config = Config::default();
        config.max_conns = 1;
        let engine = Engine::init(config, link, Box::new(Sim800)).unwrap();
        // Nothing answers "AT+CMGF=1" in this test, so the completion must
        // time out rather than hang forever.
        let result = engine.sms_enable();
        assert_eq!(result, Err(AtError::ErrTimeout));
        engine.deinit();
    }

    #[test]
    fn gated_operation_rejects_before_its_enable_call() {
        let link: Arc<dyn Link> = Arc::new(MockLink::new());
        let engine = Engine::init(Config::default(), link, Box::new(Sim800)).unwrap();
        assert_eq!(engine.sms_delete_all(), Err(AtError::ErrNotEnabled));
        engine.deinit();
    }

    #[test]
    fn device_set_present_false_rejects_future_calls_with_err_no_device() {
        let link: Arc<dyn Link> = Arc::new(MockLink::new());
        let engine = Engine::init(Config::default(), link, Box::new(Sim800)).unwrap();
        engine.device_set_present(false);
        assert_eq!(engine.sms_enable(), Err(AtError::ErrNoDevice));
        engine.deinit();
    }
}
