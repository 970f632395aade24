//! Codec configuration
//!
//! A [`Profile`] carries every table the codecs consult: accepted URI
//! schemes, the device identifier shape, the method vocabulary, the status
//! category tables and the parser limits. It is built once and shared by
//! reference; nothing in it changes after construction.

use std::sync::LazyLock;

use strum::IntoEnumIterator;

use crate::limits::{ParserLimits, DEVICE_ID_LENGTH, REALM_PREFIX_LENGTH};
use crate::status::StatusTables;
use crate::types::{Method, Scheme};

static GLOBAL: LazyLock<Profile> = LazyLock::new(Profile::gb28181);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    schemes: Vec<Scheme>,
    id_length: usize,
    realm_prefix_length: usize,
    methods: Vec<Method>,
    status: StatusTables,
    limits: ParserLimits,
}

impl Profile {
    /// GB28181 defaults: `sip` only, 20-digit identifiers whose first 10
    /// digits are the realm, every method and the RFC 3261 status tables.
    pub fn gb28181() -> Self {
        Self {
            schemes: vec![Scheme::SIP],
            id_length: DEVICE_ID_LENGTH,
            realm_prefix_length: REALM_PREFIX_LENGTH,
            methods: Method::iter().collect(),
            status: StatusTables::rfc3261(),
            limits: ParserLimits::default(),
        }
    }

    /// Process-wide default profile, built on first use.
    pub fn global() -> &'static Profile {
        &GLOBAL
    }

    pub fn with_schemes(mut self, schemes: impl IntoIterator<Item = Scheme>) -> Self {
        self.schemes = schemes.into_iter().collect();
        self
    }

    /// Identifier length and realm prefix length. The prefix is clamped to
    /// the identifier length.
    pub fn with_identifier(mut self, id_length: usize, realm_prefix_length: usize) -> Self {
        self.id_length = id_length;
        self.realm_prefix_length = realm_prefix_length.min(id_length);
        self
    }

    pub fn with_methods(mut self, methods: impl IntoIterator<Item = Method>) -> Self {
        self.methods = methods.into_iter().collect();
        self
    }

    pub fn with_status_tables(mut self, status: StatusTables) -> Self {
        self.status = status;
        self
    }

    pub fn with_limits(mut self, limits: ParserLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn schemes(&self) -> &[Scheme] {
        &self.schemes
    }

    pub fn allows_scheme(&self, scheme: Scheme) -> bool {
        self.schemes.contains(&scheme)
    }

    pub fn id_length(&self) -> usize {
        self.id_length
    }

    pub fn realm_prefix_length(&self) -> usize {
        self.realm_prefix_length
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn allows_method(&self, method: Method) -> bool {
        self.methods.contains(&method)
    }

    pub fn status(&self) -> &StatusTables {
        &self.status
    }

    pub fn limits(&self) -> &ParserLimits {
        &self.limits
    }

    /// Comma-separated scheme list for diagnostics
    pub(crate) fn scheme_list(&self) -> String {
        join(self.schemes.iter())
    }

    pub(crate) fn method_list(&self) -> String {
        join(self.methods.iter())
    }
}

impl Default for Profile {
    fn default() -> Self {
        Self::gb28181()
    }
}

fn join<T: std::fmt::Display>(items: impl Iterator<Item = T>) -> String {
    items.map(|i| i.to_string()).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gb28181_defaults() {
        let profile = Profile::gb28181();
        assert!(profile.allows_scheme(Scheme::SIP));
        assert!(!profile.allows_scheme(Scheme::SIPS));
        assert_eq!(profile.id_length(), 20);
        assert_eq!(profile.realm_prefix_length(), 10);
        assert_eq!(profile.methods().len(), 14);
        assert_eq!(profile.limits(), &ParserLimits::default());
        assert_eq!(Profile::global(), &profile);
    }

    #[test]
    fn test_builders() {
        let profile = Profile::default()
            .with_schemes([Scheme::SIP, Scheme::SIPS])
            .with_identifier(8, 12)
            .with_methods([Method::REGISTER, Method::MESSAGE]);

        assert!(profile.allows_scheme(Scheme::SIPS));
        assert_eq!(profile.realm_prefix_length(), 8);
        assert!(!profile.allows_method(Method::INVITE));
        assert_eq!(profile.method_list(), "REGISTER, MESSAGE");
        assert_eq!(profile.scheme_list(), "sip, sips");
    }
}
