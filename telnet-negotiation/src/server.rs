//! # Multiplexer
//!
//! Splits into an accept loop (one thread, owns the listening socket) and a
//! per-connection drive loop (one thread per session, owns that session
//! exclusively for its lifetime). See the module-level docs on `session` for
//! why a session's state never crosses a thread boundary.

use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::error::ProtocolResult;
use crate::session::ClientSession;
use crate::{LISTEN_BACKLOG, MAX_CONNECTIONS, POLL_INTERVAL};

/// The host's sole coupling to the core. Implementations must not block for
/// long or re-enter the multiplexer (no `accept()`, no waiting on other
/// connections) since they run synchronously on the owning session's thread
/// (or, for `on_connect`, the accept-loop thread).
pub trait Callbacks: Send + Sync + 'static {
    fn on_connect(&self, session: &mut ClientSession);
    fn on_disconnect(&self, session: &ClientSession);
    fn on_naws(&self, session: &ClientSession);
}

/// A bound listening socket plus the connection-count admission gate.
pub struct Server {
    listener: TcpListener,
    bind_addr: String,
    max_connections: usize,
    live_connections: Arc<AtomicUsize>,
}

impl Server {
    /// Bind `bind_addr` (`host:port`). `listen_backlog` is accepted for
    /// parity with the configured value described in Section 10.2, but the
    /// standard library's `TcpListener::bind` does not expose backlog
    /// control; the OS default backlog is used regardless of this value, and
    /// it is only logged.
    pub fn bind(bind_addr: &str, max_connections: usize, listen_backlog: i32) -> ProtocolResult<Self> {
        let listener = TcpListener::bind(bind_addr)?;
        eprintln!(
            "> telnet: listening on {} (max_connections={}, listen_backlog={})",
            bind_addr, max_connections, listen_backlog
        );
        Ok(Server {
            listener,
            bind_addr: bind_addr.to_string(),
            max_connections,
            live_connections: Arc::new(AtomicUsize::new(0)),
        })
    }

    pub fn bind_addr(&self) -> &str {
        &self.bind_addr
    }

    /// The socket address actually bound, useful when `bind_addr` used port 0.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.listener.local_addr()
    }

    /// Run the accept loop forever, spawning one worker thread per admitted
    /// connection. Never returns under normal operation; accept errors are
    /// logged and the loop continues.
    pub fn serve(&self, callbacks: Arc<dyn Callbacks>) -> ! {
        loop {
            match self.listener.accept() {
                Ok((stream, _peer)) => {
                    let current = self.live_connections.load(Ordering::SeqCst);
                    if current >= self.max_connections {
                        eprintln!(
                            "! telnet: connection limit reached ({}/{}), rejecting",
                            current, self.max_connections
                        );
                        drop(stream);
                        continue;
                    }

                    let mut session = match ClientSession::new(stream) {
                        Ok(session) => session,
                        Err(err) => {
                            eprintln!("! telnet: failed to initialize session: {}", err);
                            continue;
                        }
                    };

                    self.live_connections.fetch_add(1, Ordering::SeqCst);
                    callbacks.on_connect(&mut session);

                    let live_connections = Arc::clone(&self.live_connections);
                    let callbacks = Arc::clone(&callbacks);
                    thread::spawn(move || {
                        drive_session(session, callbacks.as_ref());
                        live_connections.fetch_sub(1, Ordering::SeqCst);
                    });
                }
                Err(err) => {
                    eprintln!("! telnet: error accepting connection: {}", err);
                }
            }
        }
    }
}

/// The per-connection drive loop: reap check, receive, send. Runs until the
/// session is deactivated, either by the peer, the FSM, or an I/O failure.
fn drive_session(mut session: ClientSession, callbacks: &dyn Callbacks) {
    if let Err(err) = session.set_read_timeout(Some(POLL_INTERVAL)) {
        eprintln!("x telnet: failed to set read timeout: {}", err);
    }

    loop {
        if !session.is_active() {
            break;
        }

        if let Err(err) = session.receive_once() {
            eprintln!("! telnet: {} ({})", err, session.addr_port());
            session.deactivate();
            continue;
        }

        let fires = session.take_naws_fires();
        for _ in 0..fires {
            callbacks.on_naws(&session);
        }

        if let Err(err) = session.drain_send_buf() {
            eprintln!("! telnet: send failed for {}: {}", session.addr_port(), err);
            session.deactivate();
        }
    }

    callbacks.on_disconnect(&session);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpStream;
    use std::sync::Mutex;

    struct RecordingCallbacks {
        connects: Mutex<u32>,
        disconnects: Mutex<u32>,
    }

    impl Callbacks for RecordingCallbacks {
        fn on_connect(&self, session: &mut ClientSession) {
            *self.connects.lock().unwrap() += 1;
            session.send_str(b"hello");
        }
        fn on_disconnect(&self, _session: &ClientSession) {
            *self.disconnects.lock().unwrap() += 1;
        }
        fn on_naws(&self, _session: &ClientSession) {}
    }

    #[test]
    fn test_bind_reports_local_addr() {
        let server = Server::bind("127.0.0.1:0", 10, 5).unwrap();
        assert!(!server.bind_addr().is_empty());
    }

    #[test]
    fn test_serve_greets_and_tracks_connection() {
        let server = Server::bind("127.0.0.1:0", 10, 5).unwrap();
        let addr = server.listener.local_addr().unwrap();
        let callbacks = Arc::new(RecordingCallbacks {
            connects: Mutex::new(0),
            disconnects: Mutex::new(0),
        });
        let cb = Arc::clone(&callbacks);

        thread::spawn(move || {
            server.serve(cb);
        });

        let mut client = TcpStream::connect(addr).unwrap();
        let mut buf = [0u8; 5];
        client.read_exact(&mut buf).unwrap();
        assert_eq!(&buf, b"hello");
        drop(client);

        thread::sleep(Duration::from_millis(100));
        assert_eq!(*callbacks.connects.lock().unwrap(), 1);
    }
}
