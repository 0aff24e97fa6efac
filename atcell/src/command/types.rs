use atat::{AtatLen, atat_derive::AtatEnum};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Custom boolean: the dialect encodes booleans as the digits `0`/`1`, which
/// doesn't match any of atat's built-in primitive encodings.
#[derive(Clone, Debug, PartialEq, AtatEnum, Default)]
#[at_enum(u8)]
pub enum Bool {
    #[default]
    False = 0,
    True = 1,
}

impl Bool {
    pub fn as_bool(&self) -> bool {
        matches!(self, Bool::True)
    }
}

impl From<bool> for Bool {
    fn from(b: bool) -> Self {
        if b { Bool::True } else { Bool::False }
    }
}

impl From<Bool> for bool {
    fn from(b: Bool) -> Self {
        b == Bool::True
    }
}

/// A field that is present (`Some`) or entirely omitted from the argument
/// list on the wire (`None`), as opposed to `Option<T>` which atat still
/// serializes as an empty slot between the surrounding commas. Used for
/// commands such as `+COPS=` where a trailing field can be dropped outright
/// rather than left blank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Nullable<T: AtatLen> {
    None,
    Some(T),
}

impl<T: AtatLen> Default for Nullable<T> {
    fn default() -> Self {
        Nullable::None
    }
}

impl<T: AtatLen> AtatLen for Nullable<T> {
    const LEN: usize = T::LEN;
}

impl<'de, T> Deserialize<'de> for Nullable<T>
where
    T: AtatLen + Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match T::deserialize(deserializer) {
            Ok(v) => Ok(Nullable::Some(v)),
            Err(_) => Ok(Nullable::None),
        }
    }
}

impl<T> Serialize for Nullable<T>
where
    T: AtatLen + Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Nullable::None => serializer.serialize_bytes(&[]),
            Nullable::Some(t) => t.serialize(serializer),
        }
    }
}

impl<T: AtatLen> Nullable<T> {
    pub fn from_option(opt: Option<T>) -> Self {
        match opt {
            Some(v) => Nullable::Some(v),
            None => Nullable::None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Nullable::Some(v) => Some(v),
            Nullable::None => None,
        }
    }

    pub fn as_option(&self) -> Option<&T> {
        match self {
            Nullable::Some(v) => Some(v),
            Nullable::None => None,
        }
    }
}

impl<T: AtatLen> From<Option<T>> for Nullable<T> {
    fn from(opt: Option<T>) -> Self {
        Nullable::from_option(opt)
    }
}

impl<T: AtatLen> From<Nullable<T>> for Option<T> {
    fn from(n: Nullable<T>) -> Self {
        n.into_option()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atat::serde_at::{SerializeOptions, ser::to_slice};

    #[test]
    fn ser_nullable() {
        #[derive(Clone, PartialEq, Serialize)]
        pub struct WithOption {
            a: u8,
            b: Nullable<u8>,
            c: Nullable<i32>,
            d: u8,
        }

        let value = WithOption { a: 0, b: Nullable::Some(2), c: Nullable::None, d: 4 };

        let mut buf = [0u8; 32];
        let written = to_slice(&value, "+CMD", &mut buf, SerializeOptions::default()).unwrap();

        assert_eq!(&buf[..written], b"AT+CMD=0,2,,4\r\n");
    }

    #[test]
    fn de_nullable() {
        #[derive(Debug, PartialEq, Deserialize)]
        pub struct WithOption {
            a: u8,
            b: Nullable<u8>,
            c: Nullable<i32>,
            d: Nullable<heapless::String<12>>,
            e: u8,
        }

        let input = b"0,1,,\"foo\",2";

        let got = atat::serde_at::from_slice::<WithOption>(input).ok();
        assert_eq!(
            got,
            Some(WithOption {
                a: 0,
                b: Nullable::Some(1),
                c: Nullable::None,
                d: Nullable::Some(heapless::String::try_from("foo").unwrap()),
                e: 2
            })
        );
    }

    #[test]
    fn bool_round_trips_through_primitive() {
        assert_eq!(Bool::from(true), Bool::True);
        assert!(!bool::from(Bool::False));
    }
}
