//! # Per-Connection Session State
//!
//! `ClientSession` is the single owner of everything one connection needs: its
//! socket, its send/recv buffers, the incremental IAC parser's flags, the
//! option table, and the environment map the host reads terminal state from.
//! It is never shared across threads — see `server.rs` for how the
//! thread-per-connection worker loop enforces that.

use std::collections::{HashMap, VecDeque};
use std::io::{Read, Write};
use std::net::{SocketAddr, TcpStream};
use std::time::{Duration, Instant};

use crate::error::{ProtocolError, ProtocolResult};
use crate::fsm;
use crate::negotiation::{OptionTable, State};
use crate::options;
use crate::protocol::{TelnetCommand, TelnetOption, IAC};
use crate::{RECV_BLOCK_HINT, SB_MAXLEN};

/// A Telnet command byte currently awaiting its option byte (`IAC CMD` seen,
/// `OPT` not yet).
pub type PendingCommand = Option<TelnetCommand>;

pub struct ClientSession {
    socket: TcpStream,
    peer_addr: SocketAddr,

    active: bool,

    pub(crate) send_buf: VecDeque<u8>,
    recv_buf: VecDeque<u8>,
    sb_buf: Vec<u8>,

    got_iac: bool,
    got_sb: bool,
    got_cmd: PendingCommand,

    pub env: HashMap<String, String>,
    pub options: OptionTable,

    connect_time: Instant,
    last_input_time: Instant,
    bytes_received: u64,

    /// Number of times `on_naws` should fire; incremented synchronously while
    /// decoding NAWS subnegotiations, drained by the owning worker loop after
    /// each chunk so the callback never runs re-entrantly inside the parser.
    pending_naws_fires: u32,
}

impl ClientSession {
    pub fn new(socket: TcpStream) -> ProtocolResult<Self> {
        let peer_addr = socket.peer_addr()?;
        socket.set_nodelay(true).ok();
        let now = Instant::now();

        let mut env = HashMap::new();
        env.insert("TERM".to_string(), "unknown".to_string());

        Ok(ClientSession {
            socket,
            peer_addr,
            active: true,
            send_buf: VecDeque::new(),
            recv_buf: VecDeque::new(),
            sb_buf: Vec::new(),
            got_iac: false,
            got_sb: false,
            got_cmd: None,
            env,
            options: OptionTable::new(),
            connect_time: now,
            last_input_time: now,
            bytes_received: 0,
            pending_naws_fires: 0,
        })
    }

    // ---- 4.5 public contract -------------------------------------------

    /// Return and drain the receive buffer.
    pub fn get_input(&mut self) -> Vec<u8> {
        self.recv_buf.drain(..).collect()
    }

    /// Append raw bytes to the send buffer. The caller is responsible for
    /// having escaped any IAC octets itself.
    pub fn send_str(&mut self, bytes: &[u8]) {
        self.send_buf.extend(bytes);
    }

    /// Encode `text` as UTF-8, doubling every 0xFF byte, and append to the send
    /// buffer.
    pub fn send_unicode(&mut self, text: &str) {
        for byte in text.as_bytes() {
            self.send_buf.push_back(*byte);
            if *byte == IAC {
                self.send_buf.push_back(IAC);
            }
        }
    }

    pub fn send_ready(&self) -> bool {
        !self.send_buf.is_empty()
    }

    pub fn input_ready(&self) -> bool {
        !self.recv_buf.is_empty()
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn addr_port(&self) -> String {
        self.peer_addr.to_string()
    }

    pub fn idle(&self) -> Duration {
        self.last_input_time.elapsed()
    }

    pub fn duration(&self) -> Duration {
        self.connect_time.elapsed()
    }

    fn request(&mut self, command: TelnetCommand, opt: TelnetOption) {
        self.send_buf
            .extend([IAC, command.to_byte(), opt.to_byte()]);
        self.options.note_reply(opt.to_byte(), true);
    }

    pub fn request_do_naws(&mut self) {
        self.request(TelnetCommand::DO, TelnetOption::NAWS);
    }

    pub fn request_do_env(&mut self) {
        self.request(TelnetCommand::DO, TelnetOption::NEW_ENVIRON);
    }

    pub fn request_will_echo(&mut self) {
        self.request(TelnetCommand::WILL, TelnetOption::ECHO);
    }

    pub fn request_wont_echo(&mut self) {
        self.request(TelnetCommand::WONT, TelnetOption::ECHO);
    }

    pub fn request_will_sga(&mut self) {
        self.request(TelnetCommand::WILL, TelnetOption::SUPPRESS_GO_AHEAD);
    }

    pub fn request_do_sga(&mut self) {
        self.request(TelnetCommand::DO, TelnetOption::SUPPRESS_GO_AHEAD);
    }

    pub fn request_ttype(&mut self) {
        self.request(TelnetCommand::DO, TelnetOption::TERMINAL_TYPE);
    }

    // ---- internal plumbing used by server.rs / options / fsm -----------

    pub(crate) fn fire_on_naws(&mut self) {
        self.pending_naws_fires += 1;
    }

    /// Drain the count of pending `on_naws` fires accumulated since the last
    /// call, so the caller can invoke the host callback that many times
    /// outside of any borrow on the session's parser state.
    pub(crate) fn take_naws_fires(&mut self) -> u32 {
        std::mem::take(&mut self.pending_naws_fires)
    }

    /// Set the blocking-read timeout used by `receive_once`, so the owning
    /// worker thread periodically re-checks `active` even with no traffic.
    pub(crate) fn set_read_timeout(&self, timeout: Option<Duration>) -> ProtocolResult<()> {
        self.socket.set_read_timeout(timeout)?;
        Ok(())
    }

    pub(crate) fn note_input(&mut self, n: usize) {
        self.last_input_time = Instant::now();
        self.bytes_received += n as u64;
    }

    pub fn bytes_received(&self) -> u64 {
        self.bytes_received
    }

    /// Attempt one `send` of the entire send buffer, retaining any unsent
    /// tail. If the buffer fully drains, `recv_buf` is empty, and local SGA is
    /// not affirmatively on, append and send a trailing `IAC GA`.
    pub(crate) fn drain_send_buf(&mut self) -> ProtocolResult<()> {
        if !self.send_ready() {
            return Ok(());
        }

        let pending: Vec<u8> = self.send_buf.iter().copied().collect();
        let sent = self.socket.write(&pending)?;
        self.send_buf = self.send_buf.split_off(sent.min(self.send_buf.len()));

        if sent == pending.len()
            && self.recv_buf.is_empty()
            && !self
                .options
                .check_local(TelnetOption::SUPPRESS_GO_AHEAD.to_byte())
                .is_true()
        {
            let ga = [IAC, TelnetCommand::GA.to_byte()];
            self.socket.write_all(&ga)?;
        }
        self.socket.flush()?;
        Ok(())
    }

    /// Read up to `RECV_BLOCK_HINT` bytes and feed each through the IAC parser
    /// in order. A zero-length read or socket error fails with
    /// `ConnectionClosed`; the caller deactivates the session in response.
    pub(crate) fn receive_once(&mut self) -> ProtocolResult<()> {
        let mut buf = [0u8; RECV_BLOCK_HINT];
        let n = match self.socket.read(&mut buf) {
            Ok(0) => {
                return Err(ProtocolError::ConnectionClosed(
                    "Requested by client".to_string(),
                ));
            }
            Ok(n) => n,
            Err(err) if matches!(err.kind(), std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut) => {
                return Ok(());
            }
            Err(err) => {
                return Err(ProtocolError::ConnectionClosed(format!(
                    "socket errno {}",
                    err
                )));
            }
        };

        self.note_input(n);
        for &byte in &buf[..n] {
            self.feed_byte(byte)?;
        }
        Ok(())
    }

    /// Feed one byte through the incremental IAC parser (spec Section 4.2).
    fn feed_byte(&mut self, byte: u8) -> ProtocolResult<()> {
        if !self.got_iac {
            if byte == IAC {
                self.got_iac = true;
            } else if self.got_sb {
                self.sb_buf.push(byte);
                if self.sb_buf.len() >= SB_MAXLEN {
                    return Err(ProtocolError::ConnectionClosed(
                        "sub-negotiation buffer filled".to_string(),
                    ));
                }
            } else {
                self.recv_buf.push_back(byte);
            }
            return Ok(());
        }

        // got_iac == true
        if byte == IAC && self.got_sb {
            // Escaped 0xFF inside a subnegotiation: one IAC byte of payload,
            // stay in subnegotiation mode.
            self.sb_buf.push(IAC);
            self.got_iac = false;
            return Ok(());
        }

        if let Some(cmd) = self.got_cmd {
            let opt = byte;
            match cmd {
                TelnetCommand::DO => fsm::handle_do(self, opt),
                TelnetCommand::DONT => fsm::handle_dont(self, opt),
                TelnetCommand::WILL => fsm::handle_will(self, opt)?,
                TelnetCommand::WONT => fsm::handle_wont(self, opt),
                _ => unreachable!("got_cmd only ever holds DO/DONT/WILL/WONT"),
            }
            self.got_iac = false;
            self.got_cmd = None;
            return Ok(());
        }

        match TelnetCommand::from_byte(byte) {
            Some(cmd @ (TelnetCommand::DO | TelnetCommand::DONT | TelnetCommand::WILL | TelnetCommand::WONT)) => {
                self.got_cmd = Some(cmd);
                return Ok(());
            }
            Some(TelnetCommand::SB) => {
                self.got_sb = true;
                self.sb_buf.clear();
            }
            Some(TelnetCommand::SE) => {
                self.got_sb = false;
                let payload = std::mem::take(&mut self.sb_buf);
                options::decode_subnegotiation(self, &payload);
            }
            Some(TelnetCommand::IP) => {
                self.deactivate();
            }
            Some(TelnetCommand::AO) => {
                self.recv_buf.clear();
            }
            Some(TelnetCommand::AYT) => {
                self.send_buf.push_back(0x08);
            }
            Some(TelnetCommand::EC) => {
                self.recv_buf.push_back(0x08);
            }
            Some(TelnetCommand::EL)
            | Some(TelnetCommand::DM)
            | Some(TelnetCommand::BRK)
            | Some(TelnetCommand::GA)
            | Some(TelnetCommand::NOP) => {
                // no-op, logged at debug granularity only
            }
            None => {
                eprintln!("! telnet: invalid command byte {}", byte);
            }
        }

        self.got_iac = false;
        self.got_cmd = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;

    fn session_pair() -> (ClientSession, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).unwrap();
        let (server, _) = listener.accept().unwrap();
        (ClientSession::new(server).unwrap(), client)
    }

    #[test]
    fn test_default_env_has_term_unknown() {
        let (session, _client) = session_pair();
        assert_eq!(session.env.get("TERM"), Some(&"unknown".to_string()));
    }

    #[test]
    fn test_plain_bytes_go_to_recv_buf() {
        let (mut session, _client) = session_pair();
        for &b in b"hello" {
            session.feed_byte(b).unwrap();
        }
        assert_eq!(session.get_input(), b"hello".to_vec());
    }

    #[test]
    fn test_escaped_iac_in_plain_data() {
        // "A" IAC IAC "B" -> recv_buf contains 41 FF 42
        let (mut session, _client) = session_pair();
        for &b in &[0x41u8, 0xFFu8, 0xFFu8, 0x42u8] {
            session.feed_byte(b).unwrap();
        }
        assert_eq!(session.get_input(), vec![0x41, 0xFF, 0x42]);
    }

    #[test]
    fn test_ip_deactivates_session() {
        let (mut session, _client) = session_pair();
        session.feed_byte(IAC).unwrap();
        session.feed_byte(TelnetCommand::IP.to_byte()).unwrap();
        assert!(!session.is_active());
    }

    #[test]
    fn test_ao_discards_recv_buf() {
        let (mut session, _client) = session_pair();
        session.feed_byte(b'x').unwrap();
        session.feed_byte(IAC).unwrap();
        session.feed_byte(TelnetCommand::AO.to_byte()).unwrap();
        assert!(session.get_input().is_empty());
    }

    #[test]
    fn test_sb_overflow_fails() {
        let (mut session, _client) = session_pair();
        session.feed_byte(IAC).unwrap();
        session.feed_byte(TelnetCommand::SB.to_byte()).unwrap();
        for _ in 0..SB_MAXLEN {
            if session.feed_byte(0x41).is_err() {
                return;
            }
        }
        panic!("expected sub-negotiation overflow to fail");
    }

    #[test]
    fn test_escaped_iac_inside_subnegotiation_stays_in_sb_mode() {
        let (mut session, _client) = session_pair();
        session.feed_byte(IAC).unwrap();
        session.feed_byte(TelnetCommand::SB.to_byte()).unwrap();
        session.feed_byte(TelnetOption::NAWS.to_byte()).unwrap();
        // escaped IAC inside SB: IAC IAC should append one IAC to sb_buf,
        // not exit subnegotiation mode or leak into recv_buf.
        session.feed_byte(IAC).unwrap();
        session.feed_byte(IAC).unwrap();
        assert!(session.get_input().is_empty());
        assert!(session.got_sb);
    }
}
