//! # Telnet Negotiation Library
//!
//! Core Telnet option negotiation for character-at-a-time interactive
//! sessions: IAC command parsing, the tri-state option ledger, the
//! defensive negotiation policy, and the subnegotiation decoders for
//! TTYPE, NAWS, NEW-ENVIRON, and STATUS.
//!
//! Conforms to the relevant RFCs as used by this core: 854 (base), 855
//! (options), 856 (binary, refused on request), 857 (ECHO), 858 (SGA),
//! 859 (STATUS), 1073 (NAWS), 1091 (TTYPE), 1143 (the Q-method this core
//! deliberately simplifies away from — see `negotiation`), 1184
//! (LINEMODE, refused), 1571/1572 (NEW-ENVIRON), and 2946 (ENCRYPT,
//! refused).
//!
//! ## Architecture
//!
//! - [`protocol`]: IAC/command/option byte constants and enums.
//! - [`negotiation`]: the tri-state `OptionTable`.
//! - [`fsm`]: the policy layer reacting to DO/DONT/WILL/WONT.
//! - [`options`]: subnegotiation decoders (`naws`, `ttype`, `new_environ`, `status`).
//! - [`session`]: `ClientSession`, the per-connection owner of buffers, parser
//!   state, and the option table. The byte-level IAC lexer lives here as
//!   `ClientSession::feed_byte`, folded directly into the type it mutates
//!   rather than kept as a free-standing parser.
//! - [`server`]: the accept loop and per-connection worker threads.
//! - [`error`]: `ProtocolError`, the single error type connection-level
//!   operations return.

pub mod error;
pub mod fsm;
pub mod negotiation;
pub mod options;
pub mod protocol;
pub mod server;
pub mod session;

use std::time::Duration;

/// Maximum concurrent connections the accept loop admits.
pub const MAX_CONNECTIONS: usize = 1000;

/// Listening backlog requested at bind time.
pub const LISTEN_BACKLOG: i32 = 5;

/// Per-chunk read-timeout granularity: how often a worker thread with no
/// traffic wakes up to recheck whether its session is still active.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Bound on one `recv` call's read size.
pub const RECV_BLOCK_HINT: usize = 64;

/// Hard cap on the accumulated subnegotiation payload (`sb_buf`). Exceeding
/// it fails the connection with `ProtocolError::ConnectionClosed`.
pub const SB_MAXLEN: usize = 65534;

pub use error::{ProtocolError, ProtocolResult};
pub use server::{Callbacks, Server};
pub use session::ClientSession;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_match_spec() {
        assert_eq!(MAX_CONNECTIONS, 1000);
        assert_eq!(LISTEN_BACKLOG, 5);
        assert_eq!(RECV_BLOCK_HINT, 64);
        assert_eq!(SB_MAXLEN, 65534);
        assert_eq!(POLL_INTERVAL, Duration::from_millis(10));
    }
}
