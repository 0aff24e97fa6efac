//! Phonebook storage, grounded on `lwcell_phonebook.c`'s `CPBS`/`CPBW`/
//! `CPBR`/`CPBF`.

use heapless::String;
use serde::Serialize;

use super::AtCommand;

pub mod types;

/// `AT+CPBS="<storage>"`. Selects the active phonebook storage.
#[derive(Clone, Serialize)]
pub struct SelectStorage {
    pub storage: String<2>,
}

impl AtCommand for SelectStorage {
    const PREFIX: &'static str = "+CPBS";
}

/// `AT+CPBW=[<index>],"<number>",<type>,"<text>"`. A `None` index lets the
/// modem pick the first free slot.
#[derive(Clone, Serialize)]
pub struct Write {
    pub index: Option<u32>,
    pub number: String<20>,
    pub kind: u8,
    pub text: String<20>,
}

impl AtCommand for Write {
    const PREFIX: &'static str = "+CPBW";
}

/// `AT+CPBW=<index>`. A write with every field but the index omitted deletes
/// that entry — mirrors `lwcell_pb_delete`.
#[derive(Clone, Serialize)]
pub struct Delete {
    pub index: u32,
}

impl AtCommand for Delete {
    const PREFIX: &'static str = "+CPBW";
}

/// `AT+CPBR=<index1>[,<index2>]`.
#[derive(Clone, Serialize)]
pub struct ReadRange {
    pub index1: u32,
    pub index2: Option<u32>,
}

impl AtCommand for ReadRange {
    const PREFIX: &'static str = "+CPBR";
}

/// `AT+CPBF="<text>"`. Finds entries whose name starts with `text`.
#[derive(Clone, Serialize)]
pub struct Find {
    pub text: String<20>,
}

impl AtCommand for Find {
    const PREFIX: &'static str = "+CPBF";
}
