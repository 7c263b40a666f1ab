//! Moonbase telnet front end — library surface.
//!
//! The actual Telnet protocol core (IAC parsing, option negotiation,
//! subnegotiation decoding, the accept loop) lives in the
//! `telnet-negotiation` crate. This crate is the thin demo host: startup
//! configuration and the config-file error type, exercised directly by
//! the integration test suite.

pub mod config;
pub mod errors;
