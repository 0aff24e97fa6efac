//! Device identification (`AT+GMI`/`+GMM`/`+GMR`/`+GSN`) and reset (`ATZ`).
//!
//! These all return a single bare text line rather than a `+PREFIX: ...`
//! field list, so unlike most of this crate's commands they have no
//! serde-backed argument or response struct: the engine sends the literal
//! line and the line scanner hands the raw text straight to whoever issued
//! the request (see `engine::device_info`).

pub const GET_MANUFACTURER: &str = "+GMI";
pub const GET_MODEL: &str = "+GMM";
pub const GET_REVISION: &str = "+GMR";
pub const GET_SERIAL: &str = "+GSN";
pub const RESET: &str = "Z";
