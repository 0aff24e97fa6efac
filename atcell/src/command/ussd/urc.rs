use heapless::String;
use serde::Deserialize;

/// Unsolicited `+CUSD: <n>,"<str>",<dcs>` carrying the network's USSD reply.
#[derive(Debug, Clone, Deserialize)]
pub struct Result {
    pub n: u8,
    pub text: String<182>,
    pub dcs: Option<u8>,
}
