/// One entry returned by `+CMGR`/`+CMGL` in text mode:
/// `+CMGL: <index>,<stat>,<oa>,,<scts>` followed by the body on the next
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmsEntry {
    pub index: u32,
    pub status: String,
    pub sender: String,
    pub timestamp: String,
    pub body: String,
}
