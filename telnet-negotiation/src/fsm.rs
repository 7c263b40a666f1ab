//! # Option Negotiation FSM
//!
//! Reacts to incoming `DO`/`DONT`/`WILL`/`WONT` commands: the policy is
//! strictly defensive — answer every request, never re-acknowledge an option
//! already in the requested state, and refuse anything we don't implement.
//!
//! `note_reply(opt, false)` is invoked on entry for every DO/DONT, since any
//! request we had pending for that option is considered settled once the peer
//! takes a position on it (even if it's a position we didn't ask for).

use crate::error::{ProtocolError, ProtocolResult};
use crate::negotiation::State;
use crate::options;
use crate::protocol::{TelnetCommand, TelnetOption, IAC};
use crate::session::ClientSession;

fn send_negotiation(session: &mut ClientSession, command: TelnetCommand, opt: u8) {
    session.send_buf.extend([IAC, command.to_byte(), opt]);
}

fn send_subnegotiation(session: &mut ClientSession, opt: u8, data: &[u8]) {
    session.send_buf.extend([IAC, TelnetCommand::SB.to_byte(), opt]);
    session.send_buf.extend(data.iter().copied());
    session.send_buf.extend([IAC, TelnetCommand::SE.to_byte()]);
}

/// Environment variable names requested via NEW-ENVIRON once the peer offers it.
const NEW_ENVIRON_REQUEST_NAMES: [&str; 20] = [
    "USER",
    "TERM",
    "SHELL",
    "COLUMNS",
    "LINES",
    "LC_CTYPE",
    "XTERM_LOCALE",
    "DISPLAY",
    "SSH_CLIENT",
    "SSH_CONNECTION",
    "SSH_TTY",
    "HOME",
    "HOSTNAME",
    "PWD",
    "MAIL",
    "LANG",
    "UID",
    "USER_ID",
    "EDITOR",
    "LOGNAME",
];

pub fn handle_do(session: &mut ClientSession, opt: u8) {
    session.options.note_reply(opt, false);

    match TelnetOption::from_byte(opt) {
        Some(TelnetOption::ECHO) => {
            if !session.options.check_local(opt).is_true() {
                session.options.note_local(opt, State::True);
                send_negotiation(session, TelnetCommand::WILL, opt);
            }
        }
        Some(TelnetOption::SUPPRESS_GO_AHEAD) => {
            if !session.options.check_local(opt).is_true() {
                session.options.note_local(opt, State::True);
                send_negotiation(session, TelnetCommand::WILL, opt);
                // Critical for disabling linemode on some clients.
                send_negotiation(session, TelnetCommand::DO, opt);
            }
        }
        Some(TelnetOption::LINEMODE) => {
            if !session.options.check_local(opt).is_false() {
                session.options.note_local(opt, State::False);
                send_negotiation(session, TelnetCommand::WONT, opt);
            }
        }
        Some(TelnetOption::ENCRYPT) => {
            session.options.note_local(opt, State::False);
            send_negotiation(session, TelnetCommand::WONT, opt);
        }
        Some(TelnetOption::STATUS) => {
            session.options.note_local(opt, State::True);
            send_negotiation(session, TelnetCommand::WILL, opt);
            options::status::send_status(session);
        }
        _ => {
            session.options.note_local(opt, State::False);
            send_negotiation(session, TelnetCommand::WONT, opt);
        }
    }
}

pub fn handle_dont(session: &mut ClientSession, opt: u8) {
    session.options.note_reply(opt, false);

    match TelnetOption::from_byte(opt) {
        Some(TelnetOption::BINARY) | Some(TelnetOption::ECHO) | Some(TelnetOption::SUPPRESS_GO_AHEAD) => {
            if !session.options.check_local(opt).is_false() {
                session.options.note_local(opt, State::False);
                send_negotiation(session, TelnetCommand::WONT, opt);
            }
        }
        Some(TelnetOption::LINEMODE) => {
            if !session.options.check_remote(opt).is_false() {
                session.options.note_remote(opt, State::False);
                send_negotiation(session, TelnetCommand::WONT, opt);
            }
        }
        _ => {
            eprintln!("! telnet: DONT for unrecognized option {}", opt);
        }
    }
}

pub fn handle_will(session: &mut ClientSession, opt: u8) -> ProtocolResult<()> {
    session.options.note_reply(opt, false);

    match TelnetOption::from_byte(opt) {
        Some(TelnetOption::ECHO) => {
            return Err(ProtocolError::ConnectionClosed(
                "Refuse WILL ECHO by client".to_string(),
            ));
        }
        Some(TelnetOption::NAWS) => {
            if !session.options.check_remote(opt).is_true() {
                session.options.note_remote(opt, State::True);
                session.options.note_local(opt, State::True);
                send_negotiation(session, TelnetCommand::DO, opt);
            }
        }
        Some(TelnetOption::STATUS) => {
            if !session.options.check_remote(opt).is_true() {
                session.options.note_remote(opt, State::True);
                send_subnegotiation(session, opt, &[1]); // SEND
            }
        }
        Some(TelnetOption::ENCRYPT) | Some(TelnetOption::LINEMODE) => {
            send_negotiation(session, TelnetCommand::DONT, opt);
        }
        Some(TelnetOption::SUPPRESS_GO_AHEAD) => {
            if !session.options.check_remote(opt).is_true() {
                session.options.note_remote(opt, State::True);
                session.options.note_local(opt, State::True);
                send_negotiation(session, TelnetCommand::WILL, opt);
            }
        }
        Some(TelnetOption::NEW_ENVIRON) => {
            let remote = session.options.check_remote(opt);
            if remote.is_false() || matches!(remote, State::Unknown) {
                session.options.note_remote(opt, State::True);
                session.options.note_local(opt, State::True);
                send_negotiation(session, TelnetCommand::DO, opt);

                let mut payload = vec![1u8]; // SEND command for NEW_ENVIRON SB
                for name in NEW_ENVIRON_REQUEST_NAMES {
                    payload.push(0); // VAR type byte precedes each requested name
                    payload.extend_from_slice(name.as_bytes());
                }
                send_subnegotiation(session, opt, &payload);
            }
        }
        Some(TelnetOption::TERMINAL_TYPE) => {
            let remote = session.options.check_remote(opt);
            if remote.is_false() || matches!(remote, State::Unknown) {
                session.options.note_remote(opt, State::True);
                send_negotiation(session, TelnetCommand::DO, opt);
                send_subnegotiation(session, opt, &[1]); // SEND
            }
        }
        _ => {
            eprintln!("! telnet: WILL for unrecognized option {}", opt);
        }
    }
    Ok(())
}

pub fn handle_wont(session: &mut ClientSession, opt: u8) {
    session.options.note_reply(opt, false);

    match TelnetOption::from_byte(opt) {
        Some(TelnetOption::ECHO) | Some(TelnetOption::SUPPRESS_GO_AHEAD) | Some(TelnetOption::TERMINAL_TYPE) => {
            let remote = session.options.check_remote(opt);
            if remote.is_true() || matches!(remote, State::Unknown) {
                session.options.note_remote(opt, State::False);
                send_negotiation(session, TelnetCommand::DONT, opt);
            }
        }
        _ => {
            eprintln!("! telnet: WONT for unrecognized option {}", opt);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::IAC;
    use std::net::{TcpListener, TcpStream};

    fn test_session() -> ClientSession {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        drop(client);
        ClientSession::new(server).unwrap()
    }

    #[test]
    fn test_do_linemode_refuses() {
        let mut session = test_session();
        handle_do(&mut session, TelnetOption::LINEMODE.to_byte());
        assert_eq!(
            session.options.check_local(TelnetOption::LINEMODE.to_byte()),
            State::False
        );
        let bytes: Vec<u8> = session.send_buf.drain(..).collect();
        assert_eq!(
            bytes,
            vec![IAC, TelnetCommand::WONT.to_byte(), TelnetOption::LINEMODE.to_byte()]
        );
    }

    #[test]
    fn test_will_echo_closes_connection() {
        let mut session = test_session();
        let result = handle_will(&mut session, TelnetOption::ECHO.to_byte());
        assert!(matches!(result, Err(ProtocolError::ConnectionClosed(_))));
    }

    #[test]
    fn test_will_naws_is_idempotent() {
        let mut session = test_session();
        handle_will(&mut session, TelnetOption::NAWS.to_byte()).unwrap();
        let first: Vec<u8> = session.send_buf.drain(..).collect();
        assert_eq!(
            first,
            vec![IAC, TelnetCommand::DO.to_byte(), TelnetOption::NAWS.to_byte()]
        );

        // Second WILL NAWS with remote already true: no further reply.
        handle_will(&mut session, TelnetOption::NAWS.to_byte()).unwrap();
        assert!(session.send_buf.is_empty());
    }

    #[test]
    fn test_do_echo_sends_will_echo() {
        let mut session = test_session();
        handle_do(&mut session, TelnetOption::ECHO.to_byte());
        let bytes: Vec<u8> = session.send_buf.drain(..).collect();
        assert_eq!(
            bytes,
            vec![IAC, TelnetCommand::WILL.to_byte(), TelnetOption::ECHO.to_byte()]
        );
    }
}
