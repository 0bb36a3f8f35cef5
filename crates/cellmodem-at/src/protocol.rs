//! AT line protocol: command encoding, line framing and classification.
//!
//! Requests are ASCII lines terminated by a carriage return. Replies are
//! lines terminated by `\r\n`; a reply ends when a line matches one of the
//! closed set of [`ResultCode`]s exactly. There is no other framing, so this
//! module only has to find line boundaries and tell blank lines, result codes
//! and text apart.
//!
//! # Command format
//!
//! ```text
//! AT<command>\r
//! ```
//!
//! # Reply format
//!
//! ```text
//! <echo>\r\r\n
//! \r\n<info line>\r\n
//! \r\nOK\r\n
//! ```

use bytes::{BufMut, BytesMut};

use cellmodem_core::types::ResultCode;

/// Terminator appended to every command line.
pub const COMMAND_TERMINATOR: u8 = b'\r';

/// Byte that ends every reply line.
pub const LINE_FEED: u8 = b'\n';

/// Ctrl-Z, ends an SMS body in text mode.
pub const CTRL_Z: u8 = 0x1A;

/// Result of attempting to take one line from a receive buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecodeResult {
    /// A complete line was found.
    Line {
        /// Line text with trailing `\r`/`\n` removed.
        text: String,
        /// Number of bytes consumed from the input buffer.
        consumed: usize,
    },

    /// The buffer does not yet contain a line feed.
    Incomplete,
}

/// What a terminator-stripped line means to the response parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    /// Nothing but line terminators. Never data.
    Blank,
    /// A terminal result code.
    Result(ResultCode),
    /// Anything else: echo, information or a URC.
    Text,
}

/// Encode a command line into raw bytes ready for transmission.
///
/// # Example
///
/// ```
/// use cellmodem_at::protocol::encode_command;
///
/// assert_eq!(encode_command("AT+CSQ"), b"AT+CSQ\r");
/// ```
pub fn encode_command(cmd: &str) -> Vec<u8> {
    let mut buf = BytesMut::with_capacity(cmd.len() + 1);
    buf.put_slice(cmd.as_bytes());
    buf.put_u8(COMMAND_TERMINATOR);
    buf.to_vec()
}

/// Decode one `\n`-terminated line from the front of `buf`.
///
/// Non-UTF-8 bytes are replaced rather than rejected; modems occasionally
/// emit line noise around power-up and it must not stall the parser.
pub fn decode_line(buf: &[u8]) -> DecodeResult {
    match buf.iter().position(|&b| b == LINE_FEED) {
        Some(pos) => DecodeResult::Line {
            text: normalize_line(&buf[..pos]),
            consumed: pos + 1,
        },
        None => DecodeResult::Incomplete,
    }
}

/// Convert raw line bytes to text with trailing terminators removed.
pub fn normalize_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_end_matches(['\r', '\n'])
        .to_string()
}

/// Classify a terminator-stripped line.
pub fn classify_line(line: &str) -> LineKind {
    if line.is_empty() {
        LineKind::Blank
    } else if let Some(code) = ResultCode::parse(line) {
        LineKind::Result(code)
    } else {
        LineKind::Text
    }
}

/// Strip surrounding double quotes from a field, if present.
pub fn unquote(field: &str) -> &str {
    let field = field.trim();
    field
        .strip_prefix('"')
        .and_then(|f| f.strip_suffix('"'))
        .unwrap_or(field)
}

/// Text after the `<keyword>:` prefix of an information line, trimmed.
///
/// Returns the whole line trimmed if it has no colon.
pub fn after_keyword(line: &str) -> &str {
    match line.split_once(':') {
        Some((_, rest)) => rest.trim(),
        None => line.trim(),
    }
}

/// Comma-separated field `index` of `text`, unquoted.
pub fn field(text: &str, index: usize) -> Option<&str> {
    text.split(',').nth(index).map(unquote)
}
