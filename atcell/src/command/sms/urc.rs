use heapless::String;
use serde::Deserialize;

/// Unsolicited `+CMTI: "<mem>",<index>` — a new message has landed in
/// storage.
#[derive(Debug, Clone, Deserialize)]
pub struct IncomingStored {
    pub mem: String<2>,
    pub index: u32,
}
