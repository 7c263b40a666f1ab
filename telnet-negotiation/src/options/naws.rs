//! # NAWS Option Decoding (RFC 1073)
//!
//! Negotiate About Window Size. Once `WILL`/`DO NAWS` has settled, the peer
//! sends `IAC SB NAWS <width-hi> <width-lo> <height-hi> <height-lo> IAC SE`
//! whenever its window size changes (including once, immediately after
//! negotiation completes).

use super::OptionError;
use crate::session::ClientSession;

/// Parsed window dimensions, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowSize {
    pub columns: u16,
    pub rows: u16,
}

/// Parse a NAWS payload: exactly 4 bytes, big-endian `columns` then `rows`.
pub fn parse(data: &[u8]) -> Result<WindowSize, OptionError> {
    if data.len() != 4 {
        return Err(OptionError::InvalidData(format!(
            "NAWS payload must be exactly 4 bytes, got {}",
            data.len()
        )));
    }
    let columns = ((data[0] as u16) << 8) | (data[1] as u16);
    let rows = ((data[2] as u16) << 8) | (data[3] as u16);
    Ok(WindowSize { columns, rows })
}

/// Apply a NAWS payload to a session: update `env["COLUMNS"]`/`env["LINES"]`
/// and fire `on_naws` only if the reported size actually changed.
pub fn apply(session: &mut ClientSession, data: &[u8]) {
    let size = match parse(data) {
        Ok(size) => size,
        Err(err) => {
            eprintln!("! telnet: {}", err);
            return;
        }
    };

    let columns = size.columns.to_string();
    let rows = size.rows.to_string();

    let changed = session.env.get("COLUMNS") != Some(&columns)
        || session.env.get("LINES") != Some(&rows);

    if changed {
        session.env.insert("COLUMNS".to_string(), columns);
        session.env.insert("LINES".to_string(), rows);
        session.fire_on_naws();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_80x24() {
        let size = parse(&[0x00, 0x50, 0x00, 0x18]).unwrap();
        assert_eq!(size.columns, 80);
        assert_eq!(size.rows, 24);
    }

    #[test]
    fn test_parse_rejects_wrong_length() {
        assert!(parse(&[0x00, 0x50, 0x00]).is_err());
        assert!(parse(&[0x00, 0x50, 0x00, 0x18, 0x01]).is_err());
    }

    #[test]
    fn test_parse_large_dimensions() {
        // 0xFFFF x 0xFFFF
        let size = parse(&[0xFF, 0xFF, 0xFF, 0xFF]).unwrap();
        assert_eq!(size.columns, 65535);
        assert_eq!(size.rows, 65535);
    }
}
