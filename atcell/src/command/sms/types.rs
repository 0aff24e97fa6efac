/// The delete-all selector accepted by `+CMGDA`, as text keywords rather
/// than numeric flags (this is one of the few SIM800/SIM7000 commands that
/// takes a string literal instead of an index).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteAllFilter {
    ReadOnly,
    All,
}

impl DeleteAllFilter {
    pub fn as_str(self) -> &'static str {
        match self {
            DeleteAllFilter::ReadOnly => "DEL READ",
            DeleteAllFilter::All => "DEL ALL",
        }
    }
}
