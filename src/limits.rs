//! Parser limits and profile constants
//!
//! These limits keep parsing bounded on hostile input while leaving room for
//! every message shape GB28181 devices actually send.

/// Maximum SIP message size we'll accept (64KB - 1)
pub const MAX_MESSAGE_SIZE: usize = 65535;

/// Maximum number of header lines in a single message
pub const MAX_HEADERS: usize = 256;

/// Maximum length of a single header line (after unfolding)
pub const MAX_HEADER_LINE_LENGTH: usize = 8192;

/// Maximum body size; MANSCDP XML bodies are small
pub const MAX_BODY_SIZE: usize = 60000;

/// Maximum CSeq number value
pub const MAX_CSEQ: u32 = 2_147_483_647; // 2^31 - 1

/// Length of a GB28181 device/platform identifier
pub const DEVICE_ID_LENGTH: usize = 20;

/// Leading identifier digits that form the SIP domain (realm)
pub const REALM_PREFIX_LENGTH: usize = 10;

/// Limits applied while framing a whole message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParserLimits {
    pub max_message_size: usize,
    pub max_headers: usize,
    pub max_header_line_length: usize,
    pub max_body_size: usize,
}

impl Default for ParserLimits {
    fn default() -> Self {
        Self {
            max_message_size: MAX_MESSAGE_SIZE,
            max_headers: MAX_HEADERS,
            max_header_line_length: MAX_HEADER_LINE_LENGTH,
            max_body_size: MAX_BODY_SIZE,
        }
    }
}
