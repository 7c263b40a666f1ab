mod config;
mod errors;

use config::TelnetConfig;

use telnet_negotiation::server::{Callbacks, Server};
use telnet_negotiation::session::ClientSession;

use std::sync::Arc;

/// Wires the three host-facing hooks to `println!`/`eprintln!` logging and
/// kicks off the usual opening negotiation on connect. Session lifecycle
/// beyond these three callbacks (menus, login, paging) is out of scope for
/// this core; a real BBS host would layer that on top of `get_input`/
/// `send_str` from inside its own read loop.
struct DemoHost;

impl Callbacks for DemoHost {
    fn on_connect(&self, session: &mut ClientSession) {
        println!("> connect: {}", session.addr_port());
        session.request_do_naws();
        session.request_will_sga();
        session.request_will_echo();
        session.request_do_env();
        session.request_ttype();
    }

    fn on_disconnect(&self, session: &ClientSession) {
        println!(
            "> disconnect: {} (duration={:?}, bytes_received={})",
            session.addr_port(),
            session.duration(),
            session.bytes_received()
        );
    }

    fn on_naws(&self, session: &ClientSession) {
        println!(
            "> resize: {} -> {}x{}",
            session.addr_port(),
            session.env.get("COLUMNS").map(String::as_str).unwrap_or("?"),
            session.env.get("LINES").map(String::as_str).unwrap_or("?"),
        );
    }
}

fn load_config() -> TelnetConfig {
    match TelnetConfig::load_from_file("telnet.conf") {
        Ok(config) => {
            println!("> configuration loaded from telnet.conf");
            config
        }
        Err(e) => {
            eprintln!("! config error: {}. Using defaults.", e);
            TelnetConfig::default()
        }
    }
}

fn main() -> std::io::Result<()> {
    let config = load_config();

    let bind_addr = format!("{}:{}", config.server.bind_address, config.server.port);
    println!("> moonbase telnet front end starting on {}", bind_addr);
    println!(
        "> max_connections={}, listen_backlog={}",
        config.server.max_connections, config.server.listen_backlog
    );

    let server = Server::bind(
        &bind_addr,
        config.server.max_connections,
        config.server.listen_backlog,
    )
    .map_err(|e| {
        eprintln!("x failed to bind {}: {}", bind_addr, e);
        std::io::Error::other(e)
    })?;

    println!(
        "> listening; connect with: telnet {} {}",
        config.server.bind_address, config.server.port
    );
    server.serve(Arc::new(DemoHost))
}
