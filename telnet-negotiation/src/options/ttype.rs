//! # Terminal Type Option Decoding (RFC 1091)
//!
//! After `DO TTYPE` settles we send `IAC SB TTYPE SEND IAC SE`; the peer
//! answers with `IAC SB TTYPE IS <name> IAC SE`. The name is lowercased and
//! stored unconditionally in `env["TERM"]` — unlike NEW-ENVIRON's `TERM`
//! handling, a TTYPE response always overwrites, since it's the more specific
//! and more recent of the two sources.

use super::OptionError;
use crate::session::ClientSession;

const IS: u8 = 0;

/// Parse a `TTYPE IS <name>` payload (tag byte already stripped), returning the
/// lowercased terminal name.
pub fn parse(data: &[u8]) -> Result<String, OptionError> {
    if data.is_empty() || data[0] != IS {
        return Err(OptionError::UnsupportedCommand(
            data.first().copied().unwrap_or(0),
        ));
    }
    let name = String::from_utf8_lossy(&data[1..]).to_lowercase();
    Ok(name)
}

pub fn apply(session: &mut ClientSession, data: &[u8]) {
    match parse(data) {
        Ok(name) => {
            session.env.insert("TERM".to_string(), name);
        }
        Err(err) => eprintln!("! telnet: TTYPE {}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lowercases() {
        let mut payload = vec![IS];
        payload.extend_from_slice(b"XTERM");
        assert_eq!(parse(&payload).unwrap(), "xterm");
    }

    #[test]
    fn test_parse_rejects_non_is() {
        assert!(parse(&[1, b'x']).is_err());
        assert!(parse(&[]).is_err());
    }
}
