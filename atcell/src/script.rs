//! The command-group vocabulary: a [`Step`] is one AT line and what the line
//! scanner should expect back before advancing. A [`RequestKind`] expands
//! into a `Vec<Step>` — the "command group" the spec describes as a request
//! scripting multiple AT sub-commands, grounded on `lwcell.c`'s per-command
//! `CMD_IS_CUR`/`cmd_def` chaining.

use crate::request::RequestKind;

#[derive(Debug, Clone, PartialEq)]
pub enum Expect {
    /// A bare `OK`/`ERROR` terminates the step; nothing is captured.
    Ok,
    /// The modem answers with a `>` data prompt; the step's payload bytes
    /// (plus a trailing Ctrl-Z) are then sent before `OK` terminates it.
    /// Used by `+CMGS` and `+CIPSEND`.
    DataPrompt(Vec<u8>),
    /// A single informational line is captured verbatim before `OK`.
    Line,
}

#[derive(Debug, Clone)]
pub struct Step {
    pub bytes: Vec<u8>,
    pub expect: Expect,
}

impl Step {
    pub fn ok(bytes: Vec<u8>) -> Self {
        Self { bytes, expect: Expect::Ok }
    }

    pub fn line(bytes: Vec<u8>) -> Self {
        Self { bytes, expect: Expect::Line }
    }

    pub fn data_prompt(bytes: Vec<u8>, payload: Vec<u8>) -> Self {
        Self { bytes, expect: Expect::DataPrompt(payload) }
    }
}

/// What a dialect needs to specialize: the §6 network-attach script differs
/// between SIM800 (`CIICR`/`CIFSR`) and SIM7000 (`CGDCONT`/`CNACT`), per
/// `gsm_device_sim800.c` versus the SIM7000-series AT command manual.
pub trait Dialect: Send + Sync {
    fn name(&self) -> &'static str;

    fn network_attach_steps(&self, apn: &str, user: &str, pass: &str) -> Vec<Step>;

    fn network_detach_steps(&self) -> Vec<Step> {
        vec![Step::ok(format!("AT{}=0\r\n", crate::command::conn::CGATT).into_bytes())]
    }
}

/// Every `RequestKind` that doesn't need dialect-specific handling expands
/// to the same script regardless of which `Dialect` is active. `new_conn_id`
/// is only consulted for `ConnStart`, which has no `ConnHandle` of its own
/// yet — the caller allocates a connection slot first and passes its index
/// down so the `+CIPSTART` line names the right id.
pub fn build_steps(kind: &RequestKind, dialect: &dyn Dialect, new_conn_id: u8) -> Vec<Step> {
    use crate::command::{self, format_bare, format_query, format_set};
    use RequestKind::*;

    match kind {
        ConfigureReporting => vec![
            Step::ok(format_set(&command::system_features::ConfigureCMEErrorReports {
                typ: command::system_features::types::CMEErrorReports::Verbose,
            })),
            Step::ok(format_set(&command::system_features::ConfigureNetworkRegistrationReports {
                typ: command::system_features::types::RegistrationReports::Enabled,
            })),
            Step::ok(format_set(&command::system_features::ConfigurePacketRegistrationReports {
                typ: command::system_features::types::RegistrationReports::Enabled,
            })),
        ],
        Reset => vec![Step::ok(format_bare(command::device::RESET))],
        SetFunctionality { minimum } => {
            let args = command::mobile_equipment::SetFunctionality {
                fun: if *minimum {
                    command::mobile_equipment::types::FunctionalMode::Minimum
                } else {
                    command::mobile_equipment::types::FunctionalMode::Full
                },
                rst: command::types::Nullable::None,
            };
            vec![Step::ok(format_set(&args))]
        }
        EnterPin { pin } => {
            let args = command::sim::EnterPin { pin: heapless::String::try_from(pin.as_str()).unwrap_or_default() };
            vec![Step::ok(format_set(&args))]
        }
        EnterPuk { puk, new_pin } => {
            let args = command::sim::EnterPuk {
                puk: heapless::String::try_from(puk.as_str()).unwrap_or_default(),
                new_pin: heapless::String::try_from(new_pin.as_str()).unwrap_or_default(),
            };
            vec![Step::ok(format_set(&args))]
        }
        ChangePin { old_pin, new_pin } => {
            let cmd = command::sim::ChangePin::new(
                heapless::String::try_from(old_pin.as_str()).unwrap_or_default(),
                heapless::String::try_from(new_pin.as_str()).unwrap_or_default(),
            );
            vec![Step::ok(format_set(&cmd))]
        }
        RemovePin { pin } => {
            let cmd = command::sim::RemovePin::new(heapless::String::try_from(pin.as_str()).unwrap_or_default());
            vec![Step::ok(format_set(&cmd))]
        }
        DeviceInfo => vec![
            Step::line(format_bare(command::device::GET_MANUFACTURER)),
            Step::line(format_bare(command::device::GET_MODEL)),
            Step::line(format_bare(command::device::GET_REVISION)),
            Step::line(format_bare(command::device::GET_SERIAL)),
        ],
        NetworkAttach { apn, user, pass } => dialect.network_attach_steps(apn, user, pass),
        NetworkDetach => dialect.network_detach_steps(),
        NetworkStatus => vec![Step::line(format_query(command::network::NETWORK_STATUS))],
        SignalStrength => vec![Step::line(format_bare(command::mobile_equipment::GET_SIGNAL_QUALITY))],
        OperatorGet => vec![Step::line(format_query(command::network::OPERATOR))],
        OperatorSet { numeric } => {
            let args = command::network::OperatorSet {
                mode: command::network::types::NetworkSelectionMode::Manual,
                format: command::types::Nullable::Some(command::network::types::OperatorNameFormat::Numeric),
                oper: heapless::String::try_from(numeric.as_str())
                    .map(command::types::Nullable::Some)
                    .unwrap_or(command::types::Nullable::None),
            };
            vec![Step::ok(format_set(&args))]
        }
        OperatorScan => vec![Step::line(format!("AT{}\r\n", command::network::OPERATOR_SCAN).into_bytes())],
        SmsEnable => vec![Step::ok(format_set(&command::sms::SetTextMode::default()))],
        SmsDisable => vec![],
        SmsSend { number, body } => {
            let args = command::sms::Send { number: heapless::String::try_from(number.as_str()).unwrap_or_default() };
            vec![Step::data_prompt(format_set(&args), {
                let mut b = body.clone().into_bytes();
                b.push(0x1A);
                b
            })]
        }
        SmsRead { index } => {
            let args = command::sms::Read { index: *index };
            vec![Step::line(format_set(&args))]
        }
        SmsList { status } => {
            let args = command::sms::List { stat: heapless::String::try_from(status.as_str()).unwrap_or_default() };
            vec![Step::line(format_set(&args))]
        }
        SmsDelete { index } => {
            let args = command::sms::Delete { index: *index, delflag: None };
            vec![Step::ok(format_set(&args))]
        }
        SmsDeleteAll => {
            let delflag = command::sms::types::DeleteAllFilter::All;
            let args =
                command::sms::DeleteAll { delflag: heapless::String::try_from(delflag.as_str()).unwrap() };
            vec![Step::ok(format_set(&args))]
        }
        SmsSetPreferredStorage { storage } => {
            let args = command::sms::SetPreferredStorage {
                mem1: heapless::String::try_from(storage.as_str()).unwrap_or_default(),
                mem2: None,
                mem3: None,
            };
            vec![Step::ok(format_set(&args))]
        }
        CallEnable => {
            let args = command::call::EnableUnsolicitedCallStatus { n: command::types::Bool::True };
            vec![Step::ok(format_set(&args))]
        }
        CallDisable => vec![],
        CallStart { number } => vec![Step::ok(command::call::dial(number))],
        CallAnswer => vec![Step::ok(format_bare(command::call::ANSWER))],
        CallHangup => vec![Step::ok(format_bare(command::call::HANGUP))],
        PhonebookEnable => {
            let args = command::phonebook::SelectStorage { storage: heapless::String::try_from("SM").unwrap() };
            vec![Step::ok(format_set(&args))]
        }
        PhonebookDisable => vec![],
        PhonebookAdd { number, name } => {
            let args = command::phonebook::Write {
                index: None,
                number: heapless::String::try_from(number.as_str()).unwrap_or_default(),
                kind: 129,
                text: heapless::String::try_from(name.as_str()).unwrap_or_default(),
            };
            vec![Step::ok(format_set(&args))]
        }
        PhonebookEdit { index, number, name } => {
            let args = command::phonebook::Write {
                index: Some(*index),
                number: heapless::String::try_from(number.as_str()).unwrap_or_default(),
                kind: 129,
                text: heapless::String::try_from(name.as_str()).unwrap_or_default(),
            };
            vec![Step::ok(format_set(&args))]
        }
        PhonebookDelete { index } => {
            let args = command::phonebook::Delete { index: *index };
            vec![Step::ok(format_set(&args))]
        }
        PhonebookRead { index1, index2 } => {
            let args = command::phonebook::ReadRange { index1: *index1, index2: *index2 };
            vec![Step::line(format_set(&args))]
        }
        PhonebookList => {
            let args = command::phonebook::ReadRange { index1: 1, index2: Some(255) };
            vec![Step::line(format_set(&args))]
        }
        PhonebookSearch { prefix } => {
            let args = command::phonebook::Find { text: heapless::String::try_from(prefix.as_str()).unwrap_or_default() };
            vec![Step::line(format_set(&args))]
        }
        Ussd { code } => {
            let args = command::ussd::Run::new(heapless::String::try_from(code.as_str()).unwrap_or_default());
            vec![Step::ok(format_set(&args))]
        }
        ConnStart { host, port, udp } => {
            let kind = if *udp { command::conn::types::ConnKind::Udp } else { command::conn::types::ConnKind::Tcp };
            let args = command::conn::Start {
                id: new_conn_id,
                kind: heapless::String::try_from(kind.as_str()).unwrap(),
                host: heapless::String::try_from(host.as_str()).unwrap_or_default(),
                port: *port,
            };
            vec![Step::ok(format_set(&args))]
        }
        ConnSend { conn, data } => {
            let args = command::conn::Send { id: conn.slot as u8, len: data.len() };
            vec![Step::data_prompt(format_set(&args), data.clone())]
        }
        ConnClose { conn } => {
            vec![Step::ok(format!("AT{}={}\r\n", command::conn::CIPCLOSE, conn.slot).into_bytes())]
        }
        ConnStatus { .. } => vec![Step::line(format_bare(command::conn::CIPSTATUS))],
    }
}
