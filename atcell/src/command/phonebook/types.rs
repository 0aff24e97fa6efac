/// A resolved phonebook entry, assembled from a `+CPBR`/`+CPBF` response
/// line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhonebookEntry {
    pub index: u32,
    pub number: String,
    pub name: String,
}
