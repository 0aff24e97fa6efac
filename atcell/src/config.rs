//! Compile-time-free configuration.
//!
//! The original C library expressed every one of these as a preprocessor
//! define (`LWCELL_CFG_CONN_POLL_INTERVAL`, `LWCELL_CFG_MAX_CONNS`, ...). In
//! Rust there is no reason these need to be anything but ordinary data, so
//! they live on [`Config`] and are threaded through [`crate::Engine::init`]
//! instead.

use std::time::Duration;

use crate::request::RequestKind;

/// Per-connection poll period (§6, default 500 ms).
pub const DEFAULT_CONN_POLL_INTERVAL: Duration = Duration::from_millis(500);
/// Keep-alive event period (§6, no default given upstream; matches the
/// connection poll cadence since both exist to let the app flush buffers).
pub const DEFAULT_KEEP_ALIVE_TIMEOUT: Duration = Duration::from_millis(5_000);
/// Per-`CIPSEND` cap and per-connection coalesce buffer size (§6).
pub const DEFAULT_MAX_CONN_DATA_LEN: usize = 1460;
/// Connection slot count (§6).
pub const DEFAULT_MAX_CONNS: usize = 5;
/// Raw ring buffer size used in push mode.
pub const DEFAULT_RCV_BUFF_SIZE: usize = 1024;

/// Engine-wide configuration, built once and handed to [`crate::Engine::init`].
#[derive(Debug, Clone)]
pub struct Config {
    pub max_conns: usize,
    pub max_conn_data_len: usize,
    pub input_use_process: bool,
    pub at_echo: bool,
    pub rcv_buff_size: usize,
    pub conn_poll_interval: Duration,
    pub keep_alive_timeout: Duration,
    pub reset_on_init: bool,
    pub network_enabled: bool,
    pub conn_enabled: bool,
    pub sms_enabled: bool,
    pub call_enabled: bool,
    pub phonebook_enabled: bool,
    pub ussd_enabled: bool,
    pub netconn_enabled: bool,
    pub mqtt_enabled: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_conns: DEFAULT_MAX_CONNS,
            max_conn_data_len: DEFAULT_MAX_CONN_DATA_LEN,
            input_use_process: false,
            at_echo: true,
            rcv_buff_size: DEFAULT_RCV_BUFF_SIZE,
            conn_poll_interval: DEFAULT_CONN_POLL_INTERVAL,
            keep_alive_timeout: DEFAULT_KEEP_ALIVE_TIMEOUT,
            reset_on_init: false,
            network_enabled: cfg!(feature = "network"),
            conn_enabled: cfg!(feature = "conn"),
            sms_enabled: cfg!(feature = "sms"),
            call_enabled: cfg!(feature = "call"),
            phonebook_enabled: cfg!(feature = "phonebook"),
            ussd_enabled: cfg!(feature = "ussd"),
            netconn_enabled: cfg!(feature = "netconn"),
            mqtt_enabled: cfg!(feature = "mqtt"),
        }
    }
}

/// Per-request-kind total timeout defaults (§6).
///
/// Returns the upper bound of the range given in the spec for request
/// kinds with a range (e.g. SIM PIN/PUK is "10,000-30,000"; PUK entry,
/// which may trigger a second internal attempt, gets the upper bound).
pub fn default_timeout(kind: &RequestKind) -> Duration {
    use RequestKind::*;
    let ms: u64 = match kind {
        ConfigureReporting => 10_000,
        Reset => 60_000,
        SetFunctionality { .. } => 10_000,
        EnterPin { .. } => 10_000,
        EnterPuk { .. } => 30_000,
        ChangePin { .. } => 10_000,
        RemovePin { .. } => 10_000,
        DeviceInfo { .. } => 10_000,
        NetworkAttach { .. } => 200_000,
        NetworkDetach => 60_000,
        NetworkStatus => 60_000,
        SignalStrength => 120_000,
        OperatorGet => 2_000,
        OperatorSet { .. } => 2_000,
        OperatorScan => 120_000,
        SmsEnable | SmsDisable => 10_000,
        SmsSend { .. } => 60_000,
        SmsRead { .. } => 60_000,
        SmsList { .. } => 60_000,
        SmsDelete { .. } | SmsDeleteAll { .. } => 1_000,
        SmsSetPreferredStorage { .. } => 5_000,
        CallEnable | CallDisable => 60_000,
        CallStart { .. } | CallAnswer | CallHangup => 10_000,
        PhonebookEnable | PhonebookDisable => 5_000,
        PhonebookAdd { .. }
        | PhonebookEdit { .. }
        | PhonebookDelete { .. }
        | PhonebookRead { .. }
        | PhonebookList { .. }
        | PhonebookSearch { .. } => 10_000,
        Ussd { .. } => 10_000,
        ConnStart { .. } => 60_000,
        ConnSend { .. } => 60_000,
        ConnClose { .. } => 1_000,
        ConnStatus { .. } => 10_000,
    };
    Duration::from_millis(ms)
}
