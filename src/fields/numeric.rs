//! Single-integer fields: Max-Forwards, Expires, Content-Length

use std::fmt;

use crate::codec::Codec;
use crate::error::CodecResult;
use crate::headers::HeaderName;
use crate::parsing::{parse_unsigned, strip_field_name};
use crate::profile::Profile;

/// Generate a newtype field whose payload is one unsigned integer.
/// Values that do not fit `$ty` fail with `NumericOverflow`.
macro_rules! numeric_field {
    ($(#[$meta:meta])* $name:ident, $header:expr, $subfield:literal, $ty:ty) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
        pub struct $name(pub $ty);

        impl $name {
            pub fn new(value: $ty) -> Self {
                $name(value)
            }

            pub fn value(&self) -> $ty {
                self.0
            }
        }

        impl From<$ty> for $name {
            fn from(value: $ty) -> Self {
                $name(value)
            }
        }

        impl Codec for $name {
            fn decode_with(raw: &str, _profile: &Profile) -> CodecResult<Self> {
                let payload = strip_field_name(raw, $header)?;
                parse_unsigned::<$ty>($header.as_str(), $subfield, payload).map($name)
            }

            fn validate_with(&self, _profile: &Profile) -> CodecResult<()> {
                Ok(())
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}: {}", $header, self.0)
            }
        }
    };
}

numeric_field!(
    /// Remaining hop budget
    MaxForwards,
    HeaderName::MaxForwards,
    "hops",
    u8
);

numeric_field!(
    /// Registration or subscription lifetime in seconds
    Expires,
    HeaderName::Expires,
    "delta-seconds",
    u32
);

numeric_field!(
    /// Body length in bytes
    ContentLength,
    HeaderName::ContentLength,
    "length",
    u32
);

impl MaxForwards {
    /// Decrement before forwarding; `None` once the budget is spent.
    pub fn decremented(&self) -> Option<Self> {
        self.0.checked_sub(1).map(MaxForwards)
    }
}

impl Expires {
    /// An Expires of zero on REGISTER is an unregistration.
    pub fn is_unregister(&self) -> bool {
        self.0 == 0
    }
}

impl ContentLength {
    /// Byte count of `body`, failing once it no longer fits the field.
    pub fn of(body: &[u8]) -> Option<Self> {
        u32::try_from(body.len()).ok().map(ContentLength)
    }
}
