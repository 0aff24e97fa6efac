/// Unsolicited socket-lifecycle lines. These don't carry a `+` prefix
/// (`CONNECT OK`, `CLOSED`, `+RECEIVE`) so they're matched as whole-line
/// patterns by the line classifier rather than deserialized field lists —
/// see `processor::classify_line`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnEvent {
    ConnectOk(u8),
    ConnectFail(u8),
    Closed(u8),
    DataPending { id: u8, len: usize },
}
