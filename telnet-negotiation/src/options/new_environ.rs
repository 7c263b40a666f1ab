//! # NEW-ENVIRON Option Decoding (RFC 1571)
//!
//! The trickiest subnegotiation payload in this core. After `DO NEW_ENVIRON`
//! settles we ask for a fixed list of variable names; the peer answers with
//! `IAC SB NEW_ENVIRON IS <records> IAC SE`, where `<records>` is a sequence of
//! type-tagged entries:
//!
//! - a `VAR` (0x00) or `USERVAR` (0x03) byte starts a record and doubles as the
//!   delimiter between records,
//! - the record's name runs until either a `SOH` (0x01) — introducing a value —
//!   or the next type byte,
//! - a record with no `SOH` is a name with no value: the host had no value to
//!   report for it, and the name should be deleted from `env`.
//!
//! Split on delimiter positions first, then parse each slice — a single-pass
//! recursive-descent parser is the wrong shape for this format.

use super::OptionError;
use crate::session::ClientSession;

const IS: u8 = 0;
pub(crate) const SEND: u8 = 1;
pub(crate) const VAR: u8 = 0;
const USERVAR: u8 = 3;
const VALUE: u8 = 1;

/// Names that are never deleted by a name-only NEW-ENVIRON record, regardless
/// of what the peer reports.
const PROTECTED_NAMES: [&str; 3] = ["LINES", "COLUMNS", "TERM"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Record {
    /// A name-only record: the peer has nothing to report for this variable.
    Delete(String),
    Set(String, String),
}

/// Parse a `NEW_ENVIRON IS <records>` payload (tag byte already stripped).
pub fn parse(data: &[u8]) -> Result<Vec<Record>, OptionError> {
    if data.is_empty() || data[0] != IS {
        return Err(OptionError::UnsupportedCommand(
            data.first().copied().unwrap_or(0),
        ));
    }
    let payload = &data[1..];

    let delimiters: Vec<usize> = payload
        .iter()
        .enumerate()
        .filter(|(_, &b)| b == VAR || b == USERVAR)
        .map(|(i, _)| i)
        .collect();

    let mut records = Vec::with_capacity(delimiters.len());
    for (idx, &start) in delimiters.iter().enumerate() {
        let end = delimiters.get(idx + 1).copied().unwrap_or(payload.len());
        let body = &payload[start + 1..end];

        match body.iter().position(|&b| b == VALUE) {
            Some(soh) => {
                let name = String::from_utf8_lossy(&body[..soh]).to_string();
                let value = String::from_utf8_lossy(&body[soh + 1..]).to_string();
                records.push(Record::Set(name, value));
            }
            None => {
                let name = String::from_utf8_lossy(body).to_string();
                records.push(Record::Delete(name));
            }
        }
    }
    Ok(records)
}

pub fn apply(session: &mut ClientSession, data: &[u8]) {
    let records = match parse(data) {
        Ok(records) => records,
        Err(err) => {
            eprintln!("! telnet: NEW_ENVIRON {}", err);
            return;
        }
    };

    for record in records {
        match record {
            Record::Delete(name) => {
                if !PROTECTED_NAMES.contains(&name.as_str()) {
                    session.env.remove(&name);
                }
            }
            Record::Set(name, value) => {
                let value = if name == "TERM" {
                    value.to_lowercase()
                } else {
                    value
                };
                match session.env.get(&name) {
                    None => {
                        session.env.insert(name, value);
                    }
                    Some(existing) if existing == "unknown" => {
                        session.env.insert(name, value);
                    }
                    Some(existing) if *existing == value => {
                        // idempotent, nothing to do
                    }
                    Some(_) => {
                        eprintln!(
                            "! telnet: NEW_ENVIRON conflict for {}, keeping existing value",
                            name
                        );
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var_record(name: &str, value: &str) -> Vec<u8> {
        let mut bytes = vec![VAR];
        bytes.extend_from_slice(name.as_bytes());
        bytes.push(VALUE);
        bytes.extend_from_slice(value.as_bytes());
        bytes
    }

    #[test]
    fn test_parse_single_set_record() {
        let mut payload = vec![IS];
        payload.extend(var_record("USER", "guest"));
        let records = parse(&payload).unwrap();
        assert_eq!(records, vec![Record::Set("USER".to_string(), "guest".to_string())]);
    }

    #[test]
    fn test_parse_multiple_records_mixed_type_bytes() {
        let mut payload = vec![IS];
        payload.extend(var_record("USER", "guest"));
        payload.push(USERVAR);
        payload.extend_from_slice(b"CUSTOM");
        payload.push(VALUE);
        payload.extend_from_slice(b"value");
        let records = parse(&payload).unwrap();
        assert_eq!(
            records,
            vec![
                Record::Set("USER".to_string(), "guest".to_string()),
                Record::Set("CUSTOM".to_string(), "value".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_name_only_record_is_delete() {
        let mut payload = vec![IS, VAR];
        payload.extend_from_slice(b"SHELL");
        let records = parse(&payload).unwrap();
        assert_eq!(records, vec![Record::Delete("SHELL".to_string())]);
    }

    #[test]
    fn test_parse_rejects_non_is() {
        assert!(parse(&[SEND, VAR]).is_err());
    }
}
