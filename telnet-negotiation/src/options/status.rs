//! # STATUS Option Decoding (RFC 859)
//!
//! `IAC SB STATUS SEND IAC SE` asks us to report every option state we track.
//! We answer with `IAC SB STATUS IS <reports> IAC SE`, reporting `DO opt` for
//! options we consider on and `DONT opt` for options we consider off, first
//! from our own (`local`) point of view and then from the peer's (`remote`).
//!
//! The options reported are exactly {ECHO, SGA, LINEMODE, TTYPE, NAWS,
//! NEW_ENVIRON} — this core never negotiates others, so nothing else has
//! meaningful status to report.

use super::OptionError;
use crate::negotiation::State;
use crate::protocol::{TelnetCommand, TelnetOption, IAC};
use crate::session::ClientSession;

const SEND: u8 = 1;
const IS: u8 = 0;

const REPORTED_OPTIONS: [TelnetOption; 6] = [
    TelnetOption::ECHO,
    TelnetOption::SUPPRESS_GO_AHEAD,
    TelnetOption::LINEMODE,
    TelnetOption::TERMINAL_TYPE,
    TelnetOption::NAWS,
    TelnetOption::NEW_ENVIRON,
];

pub fn apply(session: &mut ClientSession, data: &[u8]) {
    match data.first() {
        Some(&SEND) => send_status(session),
        Some(&other) => eprintln!("! telnet: STATUS {}", OptionError::UnsupportedCommand(other)),
        None => eprintln!("! telnet: STATUS subnegotiation with no command byte"),
    }
}

/// Build and enqueue an `IAC SB STATUS IS ... IAC SE` report on `send_buf`.
pub fn send_status(session: &mut ClientSession) {
    let mut out = vec![IAC, TelnetCommand::SB.to_byte(), TelnetOption::STATUS.to_byte(), IS];

    for &opt in &REPORTED_OPTIONS {
        match session.options.check_local(opt.to_byte()) {
            State::True => out.extend_from_slice(&[IAC, TelnetCommand::DO.to_byte(), opt.to_byte()]),
            State::False => out.extend_from_slice(&[IAC, TelnetCommand::DONT.to_byte(), opt.to_byte()]),
            State::Unknown => {}
        }
    }
    for &opt in &REPORTED_OPTIONS {
        match session.options.check_remote(opt.to_byte()) {
            State::True => out.extend_from_slice(&[IAC, TelnetCommand::DO.to_byte(), opt.to_byte()]),
            State::False => out.extend_from_slice(&[IAC, TelnetCommand::DONT.to_byte(), opt.to_byte()]),
            State::Unknown => {}
        }
    }

    out.extend_from_slice(&[IAC, TelnetCommand::SE.to_byte()]);
    session.send_buf.extend(out);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::ClientSession;
    use std::net::{TcpListener, TcpStream};

    fn test_session() -> ClientSession {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let stream = TcpStream::connect(addr).unwrap();
        let (accepted, _) = listener.accept().unwrap();
        drop(stream);
        ClientSession::new(accepted).unwrap()
    }

    #[test]
    fn test_send_status_reports_do_and_dont() {
        let mut session = test_session();
        session.options.note_local(TelnetOption::ECHO.to_byte(), State::True);
        session
            .options
            .note_local(TelnetOption::SUPPRESS_GO_AHEAD.to_byte(), State::False);

        send_status(&mut session);

        let bytes: Vec<u8> = session.send_buf.drain(..).collect();
        assert_eq!(bytes[0], IAC);
        assert_eq!(bytes[1], TelnetCommand::SB.to_byte());
        assert_eq!(bytes[2], TelnetOption::STATUS.to_byte());
        assert_eq!(bytes[3], IS);
        assert!(bytes.ends_with(&[IAC, TelnetCommand::SE.to_byte()]));
        // DO ECHO present
        assert!(bytes.windows(3).any(|w| w == [IAC, TelnetCommand::DO.to_byte(), TelnetOption::ECHO.to_byte()]));
        // DONT SGA present
        assert!(bytes.windows(3).any(|w| w == [IAC, TelnetCommand::DONT.to_byte(), TelnetOption::SUPPRESS_GO_AHEAD.to_byte()]));
    }
}
