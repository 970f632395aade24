//! Route: `["display name"] <uri>[;params], <uri>[;params], ...`

use std::fmt;

use super::address::{validate_display, validate_uri, NameAddr};
use crate::codec::Codec;
use crate::error::{CodecError, CodecResult};
use crate::headers::HeaderName;
use crate::parsing::{split_outside, strip_field_name};
use crate::profile::Profile;
use crate::types::Params;
use crate::uri::Uri;

const FIELD: &str = "Route";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub uri: Uri,
    pub params: Params,
}

impl RouteEntry {
    pub fn new(uri: Uri) -> Self {
        RouteEntry {
            uri,
            params: Params::new(),
        }
    }

    /// Loose routing flag
    pub fn is_loose(&self) -> bool {
        self.uri.params.contains("lr") || self.params.contains("lr")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Route {
    pub display_name: Option<String>,
    pub entries: Vec<RouteEntry>,
}

impl Route {
    pub fn new(entries: impl IntoIterator<Item = RouteEntry>) -> Self {
        Route {
            display_name: None,
            entries: entries.into_iter().collect(),
        }
    }

    pub fn uris(&self) -> impl Iterator<Item = &Uri> {
        self.entries.iter().map(|e| &e.uri)
    }

    /// Next hop: the first entry
    pub fn first(&self) -> Option<&RouteEntry> {
        self.entries.first()
    }
}

impl Codec for Route {
    fn decode_with(raw: &str, profile: &Profile) -> CodecResult<Self> {
        let payload = strip_field_name(raw, HeaderName::Route)?;
        let mut route = Route::default();

        for (i, item) in split_outside(payload, ',').into_iter().enumerate() {
            let addr = NameAddr::decode(FIELD, item, profile)?;
            if i == 0 {
                route.display_name = addr.display_name;
            }
            let uri = addr.uri.ok_or_else(|| CodecError::missing(FIELD, "uri"))?;
            route.entries.push(RouteEntry {
                uri,
                params: addr.params,
            });
        }

        Ok(route)
    }

    fn validate_with(&self, profile: &Profile) -> CodecResult<()> {
        validate_display(FIELD, self.display_name.as_deref())?;
        if self.entries.is_empty() {
            return Err(CodecError::missing(FIELD, "uri"));
        }
        for entry in &self.entries {
            validate_uri(FIELD, Some(&entry.uri), profile)?;
            entry.params.validate(FIELD)?;
        }
        Ok(())
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", HeaderName::Route)?;
        if let Some(name) = self.display_name.as_deref().filter(|n| !n.trim().is_empty()) {
            write!(f, "\"{}\" ", name)?;
        }
        for (i, entry) in self.entries.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "<{}>{}", entry.uri, entry.params)?;
        }
        Ok(())
    }
}
