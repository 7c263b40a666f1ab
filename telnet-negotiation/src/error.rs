//! Error types for the telnet negotiation core.

use std::fmt;

/// Errors raised while driving a single connection.
///
/// `ConnectionClosed` is the single terminal kind described for the receive/send
/// paths: a clean peer close, a socket error, an incompatible `WILL ECHO`, or a
/// subnegotiation buffer overflow all collapse to it. Callers recover by
/// deactivating the session and letting the owning worker thread reap it; this
/// error is never expected to propagate past that thread.
#[derive(Debug)]
pub enum ProtocolError {
    /// The connection is to be torn down; the string names the reason.
    ConnectionClosed(String),
    /// An I/O error that is not a normal disconnect.
    Io(std::io::Error),
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProtocolError::ConnectionClosed(reason) => {
                write!(f, "connection closed: {}", reason)
            }
            ProtocolError::Io(err) => write!(f, "I/O error: {}", err),
        }
    }
}

impl std::error::Error for ProtocolError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProtocolError::Io(err) => Some(err),
            ProtocolError::ConnectionClosed(_) => None,
        }
    }
}

impl From<std::io::Error> for ProtocolError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;

        match err.kind() {
            ErrorKind::UnexpectedEof | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
                ProtocolError::ConnectionClosed("Requested by client".to_string())
            }
            ErrorKind::WouldBlock | ErrorKind::TimedOut => {
                // Callers treat a read timeout as "no data this tick", not a failure;
                // this conversion only fires on paths that genuinely mean to fail.
                ProtocolError::Io(err)
            }
            _ => ProtocolError::Io(err),
        }
    }
}

/// Result type alias for connection-level operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;
