//! Status-code category tables
//!
//! Six ordered tables (1xx through 6xx) map a status code to the reason
//! phrase expected on the wire. A Status-Line is valid when its code is a key
//! of one table and its reason phrase contains that entry's phrase, compared
//! ASCII case-insensitively.

use std::collections::BTreeMap;

use strum_macros::{Display, EnumIter};

use crate::error::{CodecError, CodecResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum StatusClass {
    Informational,
    Success,
    Redirection,
    ClientError,
    ServerError,
    GlobalFailure,
}

impl StatusClass {
    /// Class implied by the hundreds digit, if any
    pub fn of(code: u16) -> Option<Self> {
        match code / 100 {
            1 => Some(StatusClass::Informational),
            2 => Some(StatusClass::Success),
            3 => Some(StatusClass::Redirection),
            4 => Some(StatusClass::ClientError),
            5 => Some(StatusClass::ServerError),
            6 => Some(StatusClass::GlobalFailure),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTable {
    class: StatusClass,
    entries: BTreeMap<u16, String>,
}

impl StatusTable {
    fn new(class: StatusClass, entries: &[(u16, &str)]) -> Self {
        Self {
            class,
            entries: entries
                .iter()
                .map(|(code, phrase)| (*code, phrase.to_string()))
                .collect(),
        }
    }

    pub fn class(&self) -> StatusClass {
        self.class
    }

    pub fn get(&self, code: u16) -> Option<&str> {
        self.entries.get(&code).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (u16, &str)> {
        self.entries.iter().map(|(code, phrase)| (*code, phrase.as_str()))
    }
}

/// The six category tables, searched in class order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusTables {
    tables: Vec<StatusTable>,
}

impl StatusTables {
    /// RFC 3261 section 21 plus the extension codes GB28181 peers emit
    pub fn rfc3261() -> Self {
        let tables = vec![
            StatusTable::new(
                StatusClass::Informational,
                &[
                    (100, "Trying"),
                    (180, "Ringing"),
                    (181, "Call Is Being Forwarded"),
                    (182, "Queued"),
                    (183, "Session Progress"),
                ],
            ),
            StatusTable::new(StatusClass::Success, &[(200, "OK"), (202, "Accepted")]),
            StatusTable::new(
                StatusClass::Redirection,
                &[
                    (300, "Multiple Choices"),
                    (301, "Moved Permanently"),
                    (302, "Moved Temporarily"),
                    (305, "Use Proxy"),
                    (380, "Alternative Service"),
                ],
            ),
            StatusTable::new(
                StatusClass::ClientError,
                &[
                    (400, "Bad Request"),
                    (401, "Unauthorized"),
                    (402, "Payment Required"),
                    (403, "Forbidden"),
                    (404, "Not Found"),
                    (405, "Method Not Allowed"),
                    (406, "Not Acceptable"),
                    (407, "Proxy Authentication Required"),
                    (408, "Request Timeout"),
                    (410, "Gone"),
                    (413, "Request Entity Too Large"),
                    (414, "Request-URI Too Long"),
                    (415, "Unsupported Media Type"),
                    (416, "Unsupported URI Scheme"),
                    (420, "Bad Extension"),
                    (421, "Extension Required"),
                    (423, "Interval Too Brief"),
                    (480, "Temporarily Unavailable"),
                    (481, "Call/Transaction Does Not Exist"),
                    (482, "Loop Detected"),
                    (483, "Too Many Hops"),
                    (484, "Address Incomplete"),
                    (485, "Ambiguous"),
                    (486, "Busy Here"),
                    (487, "Request Terminated"),
                    (488, "Not Acceptable Here"),
                    (489, "Bad Event"),
                    (491, "Request Pending"),
                    (493, "Undecipherable"),
                ],
            ),
            StatusTable::new(
                StatusClass::ServerError,
                &[
                    (500, "Server Internal Error"),
                    (501, "Not Implemented"),
                    (502, "Bad Gateway"),
                    (503, "Service Unavailable"),
                    (504, "Server Time-out"),
                    (505, "Version Not Supported"),
                    (513, "Message Too Large"),
                ],
            ),
            StatusTable::new(
                StatusClass::GlobalFailure,
                &[
                    (600, "Busy Everywhere"),
                    (603, "Decline"),
                    (604, "Does Not Exist Anywhere"),
                    (606, "Not Acceptable"),
                ],
            ),
        ];
        Self { tables }
    }

    /// Add or replace an entry. The code is removed from every other table so
    /// it stays a key of exactly one.
    pub fn with_entry(mut self, class: StatusClass, code: u16, phrase: impl Into<String>) -> Self {
        let phrase = phrase.into();
        for table in &mut self.tables {
            if table.class == class {
                table.entries.insert(code, phrase.clone());
            } else {
                table.entries.remove(&code);
            }
        }
        self
    }

    pub fn table(&self, class: StatusClass) -> Option<&StatusTable> {
        self.tables.iter().find(|t| t.class == class)
    }

    pub fn iter(&self) -> impl Iterator<Item = &StatusTable> {
        self.tables.iter()
    }

    /// First table containing `code`, with its expected phrase
    pub fn lookup(&self, code: u16) -> Option<(StatusClass, &str)> {
        self.tables
            .iter()
            .find_map(|t| t.get(code).map(|phrase| (t.class, phrase)))
    }

    pub fn reason_phrase(&self, code: u16) -> Option<&str> {
        self.lookup(code).map(|(_, phrase)| phrase)
    }

    /// Number of tables holding `code`; 1 for every accepted code.
    pub fn occurrences(&self, code: u16) -> usize {
        self.tables.iter().filter(|t| t.get(code).is_some()).count()
    }

    /// Check a code/reason pair against the tables.
    pub fn check(&self, field: &'static str, code: u16, reason: &str) -> CodecResult<StatusClass> {
        let (class, expected) = self
            .lookup(code)
            .ok_or_else(|| CodecError::lookup_miss(field, code))?;
        if !reason
            .to_ascii_lowercase()
            .contains(&expected.to_ascii_lowercase())
        {
            return Err(CodecError::pattern(field, "reason-phrase", reason, expected));
        }
        Ok(class)
    }
}

impl Default for StatusTables {
    fn default() -> Self {
        Self::rfc3261()
    }
}
