//! # Subnegotiation Decoding
//!
//! Each Telnet option with a subnegotiation payload (TTYPE, NEW-ENVIRON, NAWS,
//! STATUS) gets its own module here. Every module splits its work into a pure
//! `parse_*` function (easy to unit test without a live session) and an
//! integration entry point that applies the parsed result to a `ClientSession`
//! — updating `env`, enqueuing reply bytes, or firing `on_naws`.
//!
//! `decode_subnegotiation` is the single dispatch point, called by the FSM once
//! an unescaped `IAC SE` closes out an `IAC SB ... IAC SE` block.

pub mod naws;
pub mod new_environ;
pub mod status;
pub mod ttype;

use crate::protocol::TelnetOption;
use crate::session::ClientSession;

/// Command bytes that prefix most subnegotiation payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubNegotiationCommand {
    Is = 0,
    Send = 1,
}

/// Errors from parsing a subnegotiation payload. These are never fatal to the
/// connection — callers log them and leave the session open, per the "malformed
/// subnegotiation" error kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionError {
    InvalidData(String),
    UnsupportedCommand(u8),
}

impl std::fmt::Display for OptionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OptionError::InvalidData(msg) => write!(f, "invalid option data: {}", msg),
            OptionError::UnsupportedCommand(cmd) => write!(f, "unsupported command: {}", cmd),
        }
    }
}

impl std::error::Error for OptionError {}

/// Decode one accumulated `sbBuf` after an unescaped `IAC SE`.
///
/// Dispatch is on `sbBuf[0]`. An empty buffer or a lone NUL is logged and
/// dropped without dispatching further.
pub fn decode_subnegotiation(session: &mut ClientSession, buf: &[u8]) {
    if buf.is_empty() || (buf.len() == 1 && buf[0] == 0) {
        eprintln!("! telnet: empty or lone-NUL subnegotiation, dropping");
        return;
    }

    let tag = buf[0];
    let rest = &buf[1..];
    match TelnetOption::from_byte(tag) {
        Some(TelnetOption::TERMINAL_TYPE) => ttype::apply(session, rest),
        Some(TelnetOption::NEW_ENVIRON) => new_environ::apply(session, rest),
        Some(TelnetOption::NAWS) => naws::apply(session, rest),
        Some(TelnetOption::STATUS) => status::apply(session, rest),
        _ => eprintln!("! telnet: unsupported subnegotiation for option {}", tag),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subnegotiation_commands() {
        assert_eq!(SubNegotiationCommand::Is as u8, 0);
        assert_eq!(SubNegotiationCommand::Send as u8, 1);
    }

    #[test]
    fn test_option_error_display() {
        let error = OptionError::InvalidData("test".to_string());
        assert_eq!(error.to_string(), "invalid option data: test");
    }
}
