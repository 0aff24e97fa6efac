use heapless::String;
use serde::Deserialize;

/// Unsolicited `+CLIP: "<number>",<type>` caller-ID notification, sent just
/// before the `RING`/`+CRING` pair on an incoming call.
#[derive(Debug, Clone, Deserialize)]
pub struct CallerId {
    pub number: String<20>,
    pub kind: u8,
}
