//! The producer thread: drains the request mailbox, expands each request
//! into a [`crate::script::Step`] sequence, and drives it against the
//! [`crate::link::Link`], synchronizing with the processor thread over a
//! [`crate::processor::StepSync`] for every step's outcome.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::Arc;
use std::time::Duration;

use crate::config::default_timeout;
use crate::connection::ConnectionManager;
use crate::error::AtError;
use crate::event::{ConnHandle, Event, EventRegistry};
use crate::link::Link;
use crate::os::{Mbox, MboxRecv};
use crate::processor::{StepResult, StepSync};
use crate::request::{Request, RequestOutcome};
use crate::script::{self, Dialect, Expect};
use crate::timeout::{TimeoutId, TimeoutWheel};

/// What a fired deadline in the producer's [`TimeoutWheel`] was for. Every
/// deadline is one of these two kinds; see `Producer::run`.
#[derive(Clone, Copy)]
enum Timer {
    KeepAlive,
    ConnPoll(ConnHandle),
}

pub struct Producer {
    requests: Mbox<Request>,
    link: Arc<dyn Link>,
    dialect: Box<dyn Dialect>,
    step_sync: StepSync,
    events: Arc<EventRegistry>,
    conns: Arc<ConnectionManager>,
    keep_alive_timeout: Duration,
    conn_poll_interval: Duration,
}

impl Producer {
    pub fn new(
        link: Arc<dyn Link>,
        dialect: Box<dyn Dialect>,
        step_sync: StepSync,
        events: Arc<EventRegistry>,
        conns: Arc<ConnectionManager>,
        keep_alive_timeout: Duration,
        conn_poll_interval: Duration,
    ) -> Self {
        Self {
            requests: Mbox::new(32),
            link,
            dialect,
            step_sync,
            events,
            conns,
            keep_alive_timeout,
            conn_poll_interval,
        }
    }

    pub fn request_sender(&self) -> crate::os::MboxSender<Request> {
        self.requests.sender()
    }

    /// Drains the request mailbox, but never blocks longer than the next
    /// pending deadline in the timeout wheel: a recurring `KeepAlive` timer
    /// plus one `ConnPoll` timer per currently active connection, matching
    /// the wheel-bounded-wait design the processor's own line scanner
    /// doesn't need (it always has bytes to wait on) but the producer does
    /// (it has nothing to do between requests except notice these).
    pub fn run(&self, awaiting_line: impl Fn(bool)) {
        let mut wheel = TimeoutWheel::new();
        let mut timers: HashMap<TimeoutId, Timer> = HashMap::new();
        timers.insert(wheel.schedule(self.keep_alive_timeout), Timer::KeepAlive);

        loop {
            let wait = wheel.next_wait().unwrap_or(self.keep_alive_timeout);
            match self.requests.recv_bounded(wait) {
                MboxRecv::Message(request) => {
                    let outcome = self.run_one(&request, &awaiting_line);
                    if let Some(cb) = &request.callback {
                        cb(outcome.clone());
                    }
                    request.completion.resolve(outcome);
                }
                MboxRecv::Disconnected => return,
                MboxRecv::Timeout => {
                    for id in wheel.pop_expired() {
                        match timers.remove(&id) {
                            Some(Timer::KeepAlive) => {
                                self.events.dispatch(&Event::KeepAlive);
                                timers.insert(wheel.schedule(self.keep_alive_timeout), Timer::KeepAlive);
                            }
                            Some(Timer::ConnPoll(handle)) if self.conns.is_live(handle) => {
                                self.events.dispatch(&Event::ConnPoll(handle));
                                timers.insert(wheel.schedule(self.conn_poll_interval), Timer::ConnPoll(handle));
                            }
                            Some(Timer::ConnPoll(_)) | None => {}
                        }
                    }
                    for handle in self.conns.active_handles() {
                        let already_polling =
                            timers.values().any(|t| matches!(t, Timer::ConnPoll(h) if *h == handle));
                        if !already_polling {
                            timers.insert(wheel.schedule(self.conn_poll_interval), Timer::ConnPoll(handle));
                        }
                    }
                }
            }
        }
    }

    fn run_one(
        &self,
        request: &Request,
        awaiting_line: &impl Fn(bool),
    ) -> Result<RequestOutcome, AtError> {
        use crate::request::RequestKind::*;

        let new_conn_id = match &request.kind {
            ConnStart { host, port, udp } => {
                let ip = host.parse().unwrap_or(Ipv4Addr::UNSPECIFIED);
                match self.conns.allocate((ip, *port), *udp) {
                    Ok(handle) => handle.slot as u8,
                    Err(e) => return Err(e),
                }
            }
            _ => 0,
        };

        let steps = script::build_steps(&request.kind, self.dialect.as_ref(), new_conn_id);
        let timeout = default_timeout(&request.kind);
        let mut lines = Vec::new();

        for step in &steps {
            self.link.send(&step.bytes);
            match &step.expect {
                Expect::Ok => {
                    awaiting_line(false);
                    match self.step_sync.wait(timeout) {
                        Some(StepResult::Ok) => {}
                        Some(StepResult::Error(e)) => return Err(e),
                        _ => return Err(AtError::ErrTimeout),
                    }
                }
                Expect::Line => {
                    awaiting_line(true);
                    match self.step_sync.wait(timeout) {
                        Some(StepResult::Line(line)) => lines.push(line),
                        Some(StepResult::Error(e)) => return Err(e),
                        _ => return Err(AtError::ErrTimeout),
                    }
                    awaiting_line(false);
                    match self.step_sync.wait(timeout) {
                        Some(StepResult::Ok) => {}
                        Some(StepResult::Error(e)) => return Err(e),
                        _ => return Err(AtError::ErrTimeout),
                    }
                }
                Expect::DataPrompt(payload) => {
                    match self.step_sync.wait(timeout) {
                        Some(StepResult::Prompt) => {}
                        Some(StepResult::Error(e)) => return Err(e),
                        _ => return Err(AtError::ErrTimeout),
                    }
                    self.link.send(payload);
                    awaiting_line(true);
                    match self.step_sync.wait(timeout) {
                        Some(StepResult::Line(line)) => lines.push(line),
                        Some(StepResult::Ok) => {}
                        Some(StepResult::Error(e)) => return Err(e),
                        _ => return Err(AtError::ErrTimeout),
                    }
                    awaiting_line(false);
                }
            }
        }

        self.assemble_outcome(&request.kind, lines, new_conn_id)
    }

    fn assemble_outcome(
        &self,
        kind: &crate::request::RequestKind,
        lines: Vec<String>,
        new_conn_id: u8,
    ) -> Result<RequestOutcome, AtError> {
        use crate::request::RequestKind::*;

        match kind {
            DeviceInfo => {
                let manufacturer = lines.first().cloned().unwrap_or_default();
                let model = lines.get(1).cloned().unwrap_or_default();
                let revision = lines.get(2).cloned().unwrap_or_default();
                let serial = lines.get(3).cloned().unwrap_or_default();
                self.events.dispatch(&Event::DeviceIdentified {
                    manufacturer: manufacturer.clone(),
                    model: model.clone(),
                    revision: revision.clone(),
                    serial: serial.clone(),
                });
                Ok(RequestOutcome::DeviceInfo { manufacturer, model, revision, serial })
            }
            SignalStrength => {
                let line = lines.first().cloned().unwrap_or_default();
                let rest = line.strip_prefix("+CSQ:").unwrap_or(&line);
                let parsed = crate::command::parse_fields::<
                    crate::command::mobile_equipment::responses::SignalQuality,
                >(rest.trim().as_bytes());
                match parsed {
                    Ok(sq) => {
                        self.events.dispatch(&Event::SignalStrength { rssi: sq.rssi, ber: sq.ber });
                        Ok(RequestOutcome::SignalStrength { rssi: sq.rssi, ber: sq.ber })
                    }
                    Err(_) => Err(AtError::Err),
                }
            }
            NetworkAttach { .. } => {
                let ip_line = lines.first().cloned().unwrap_or_default();
                let ip: Ipv4Addr = ip_line.trim().parse().unwrap_or(Ipv4Addr::UNSPECIFIED);
                self.events.dispatch(&Event::NetworkAttached { ip });
                Ok(RequestOutcome::Ip(ip))
            }
            SmsSend { .. } => {
                let line = lines.first().cloned().unwrap_or_default();
                let rest = line.strip_prefix("+CMGS:").unwrap_or(&line).trim();
                let pos = rest.parse().unwrap_or(0);
                self.events.dispatch(&Event::SmsSend { result: AtError::Ok, pos: Some(pos) });
                Ok(RequestOutcome::SmsSent { pos })
            }
            ConnStart { .. } => {
                // `+CIPSTART`'s synchronous `OK` only means the modem accepted the
                // command; the socket isn't actually up until the `<id>, CONNECT OK`
                // URC arrives and `try_dispatch_urc` calls `mark_active`.
                let handle = self
                    .conns
                    .handle_for_slot(new_conn_id as usize)
                    .ok_or(AtError::Err)?;
                Ok(RequestOutcome::ConnHandle(handle))
            }
            SmsRead { index } => {
                let line = lines.first().cloned().unwrap_or_default();
                Ok(RequestOutcome::SmsEntries(Self::parse_sms_entry(&line, Some(*index)).into_iter().collect()))
            }
            SmsList { .. } => {
                Ok(RequestOutcome::SmsEntries(lines.iter().filter_map(|l| Self::parse_sms_entry(l, None)).collect()))
            }
            PhonebookRead { .. } | PhonebookList | PhonebookSearch { .. } => Ok(RequestOutcome::PhonebookEntries(
                lines.iter().filter_map(|l| Self::parse_phonebook_entry(l)).collect(),
            )),
            OperatorScan => {
                let line = lines.first().cloned().unwrap_or_default();
                let entries = Self::parse_operator_scan(&line);
                self.events.dispatch(&Event::OperatorScanResult(entries.clone()));
                Ok(RequestOutcome::OperatorScanResults(entries))
            }
            OperatorGet | NetworkStatus | ConnStatus { .. } => Ok(RequestOutcome::Text(lines.join("\n"))),
            _ => Ok(RequestOutcome::Ack),
        }
    }

    /// Parses a `+CMGL: <index>,<stat>,<oa>,,<scts>` or `+CMGR: <stat>,<oa>,,<scts>`
    /// header line. `+CMGR` carries no index of its own, so the caller passes
    /// the one from the request that asked for it. Text-mode responses
    /// carry the message body on a second line that the line scanner
    /// currently doesn't capture alongside the header, so `body` is left
    /// empty here.
    fn parse_sms_entry(text: &str, request_index: Option<u32>) -> Option<crate::command::sms::responses::SmsEntry> {
        use crate::parser::{parse_quoted_string, parse_u32};

        let (index, rest) = if let Some(rest) = text.strip_prefix("+CMGL:") {
            parse_u32(rest.trim_start())
        } else {
            (request_index?, text.strip_prefix("+CMGR:")?.trim_start())
        };
        let (status, rest) = parse_quoted_string(rest);
        let (sender, rest) = parse_quoted_string(rest);
        let (_alpha, rest) = parse_quoted_string(rest);
        let (timestamp, _rest) = parse_quoted_string(rest);
        Some(crate::command::sms::responses::SmsEntry {
            index,
            status: status.to_string(),
            sender: sender.to_string(),
            timestamp: timestamp.to_string(),
            body: String::new(),
        })
    }

    /// Parses a `+COPS: (<stat>,"<long>","<short>","<numeric>")(...)...`
    /// scan result line into one entry per parenthesized tuple.
    fn parse_operator_scan(text: &str) -> Vec<crate::event::OperatorScanEntry> {
        use crate::parser::{parse_i32, parse_quoted_string};

        let rest = text.strip_prefix("+COPS:").unwrap_or(text).trim();
        rest.split('(')
            .filter_map(|group| {
                let body = group.trim_end_matches(')').trim_end_matches(',');
                if body.is_empty() {
                    return None;
                }
                let (status, rest) = parse_i32(body);
                let (long_name, rest) = parse_quoted_string(rest);
                let (short_name, rest) = parse_quoted_string(rest);
                let (numeric, _rest) = parse_quoted_string(rest);
                Some(crate::event::OperatorScanEntry {
                    status: status.max(0) as u8,
                    long_name: long_name.to_string(),
                    short_name: short_name.to_string(),
                    numeric: numeric.to_string(),
                })
            })
            .collect()
    }

    /// Parses a `+CPBR: <index>,"<number>",<type>,"<text>"` line.
    fn parse_phonebook_entry(text: &str) -> Option<crate::command::phonebook::types::PhonebookEntry> {
        use crate::parser::{parse_i32, parse_quoted_string, parse_u32};

        let rest = text.strip_prefix("+CPBR:").or_else(|| text.strip_prefix("+CPBF:"))?;
        let (index, rest) = parse_u32(rest.trim_start());
        let (number, rest) = parse_quoted_string(rest);
        let (_kind, rest) = parse_i32(rest);
        let (name, _rest) = parse_quoted_string(rest);
        Some(crate::command::phonebook::types::PhonebookEntry {
            index,
            number: number.to_string(),
            name: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connection::ConnectionManager;
    use crate::dialect::Sim800;
    use crate::link::MockLink;
    use crate::request::RequestKind;
    use std::sync::Arc;
    use std::thread;

    fn spawn_producer() -> (Producer, Arc<MockLink>, StepSync) {
        let link = Arc::new(MockLink::new());
        let step_sync = StepSync::new();
        let events = Arc::new(EventRegistry::new());
        let conns = Arc::new(ConnectionManager::new(2));
        let producer = Producer::new(
            link.clone(),
            Box::new(Sim800),
            step_sync.clone(),
            events,
            conns,
            Duration::from_secs(60),
            Duration::from_secs(60),
        );
        (producer, link, step_sync)
    }

    #[test]
    fn signal_strength_round_trip() {
        let (producer, link, step_sync) = spawn_producer();
        let request = Request {
            kind: RequestKind::SignalStrength,
            completion: crate::request::Completion::new(),
            callback: None,
        };
        let completion = request.completion.clone();

        thread::scope(|scope| {
            scope.spawn(|| {
                step_sync.wait(Duration::from_secs(1));
                step_sync.post(StepResult::Line("+CSQ: 18,99".to_string()));
                step_sync.wait(Duration::from_secs(1));
                step_sync.post(StepResult::Ok);
            });
            let outcome = producer.run_one(&request, &|_| {});
            completion.resolve(outcome);
        });

        assert_eq!(link.take_written(), b"AT+CSQ\r\n");
        match completion.wait(Duration::from_millis(10)) {
            Ok(RequestOutcome::SignalStrength { rssi, ber }) => {
                assert_eq!(rssi, 18);
                assert_eq!(ber, 99);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
