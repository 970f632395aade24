//! Header field codecs
//!
//! One type per recognised field. Every type implements [`Codec`] over a
//! whole `Name: payload` line (long or compact name, any case) and renders
//! the canonical long name on output.
//!
//! [`Codec`]: crate::codec::Codec

mod address;
mod auth;
mod call_id;
mod contact;
mod cseq;
mod numeric;
mod route;
mod text;
mod via;

pub use address::{FromHeader, ToHeader};
pub use auth::{AuthParam, Authorization, WwwAuthenticate};
pub use call_id::CallId;
pub use contact::Contact;
pub use cseq::CSeq;
pub use numeric::{ContentLength, Expires, MaxForwards};
pub use route::{Route, RouteEntry};
pub use text::{ContentType, UserAgent};
pub use via::{Rport, Via};
