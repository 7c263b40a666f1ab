//! # Telnet Protocol Constants and Types
//!
//! This module implements the core Telnet protocol as defined in:
//! - **RFC 854**: Telnet Protocol Specification
//! - **RFC 855**: Telnet Option Specifications
//!
//! ## Key Concepts from RFC 854:
//!
//! ### IAC (Interpret As Command) - Byte 255
//! The IAC byte (255/0xFF) signals that the following bytes should be interpreted
//! as Telnet commands rather than data. Any data byte with value 255 must be
//! escaped as IAC IAC (255 255).
//!
//! ### Command Structure
//! Telnet commands follow the pattern: `IAC <command> [option]`
//! - For negotiation: `IAC WILL/WONT/DO/DONT <option>`
//! - For actions: `IAC <command>` (like IAC IP for Interrupt Process)
//!
//! ### Sub-option Structure (RFC 855)
//! Sub-options use: `IAC SB <option> <parameters...> IAC SE`

/// IAC - Interpret As Command (RFC 854, Section 4)
///
/// Any data byte with value 255 must be escaped as two consecutive IAC bytes
/// (255 255) to distinguish it from command sequences.
pub const IAC: u8 = 255;

/// Telnet Commands (RFC 854, Section 4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum TelnetCommand {
    /// End of subnegotiation parameters (RFC 855)
    SE = 240,
    /// No Operation - can be used as keepalive
    NOP = 241,
    /// Data Mark - indicates position of Synch event in data stream
    DM = 242,
    /// Break - indicates Break or Attention signal
    BRK = 243,
    /// Interrupt Process
    IP = 244,
    /// Abort Output
    AO = 245,
    /// Are You There
    AYT = 246,
    /// Erase Character
    EC = 247,
    /// Erase Line
    EL = 248,
    /// Go Ahead - legacy turn-taking marker
    GA = 249,
    /// Subnegotiation Begin (RFC 855)
    SB = 250,
    /// WILL - sender wants to enable option
    WILL = 251,
    /// WON'T - sender wants to disable option or refuses to enable
    WONT = 252,
    /// DO - sender wants receiver to enable option
    DO = 253,
    /// DON'T - sender wants receiver to disable option or refuses request
    DONT = 254,
}

impl TelnetCommand {
    /// Convert a byte to a TelnetCommand if it represents a valid command
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            240 => Some(TelnetCommand::SE),
            241 => Some(TelnetCommand::NOP),
            242 => Some(TelnetCommand::DM),
            243 => Some(TelnetCommand::BRK),
            244 => Some(TelnetCommand::IP),
            245 => Some(TelnetCommand::AO),
            246 => Some(TelnetCommand::AYT),
            247 => Some(TelnetCommand::EC),
            248 => Some(TelnetCommand::EL),
            249 => Some(TelnetCommand::GA),
            250 => Some(TelnetCommand::SB),
            251 => Some(TelnetCommand::WILL),
            252 => Some(TelnetCommand::WONT),
            253 => Some(TelnetCommand::DO),
            254 => Some(TelnetCommand::DONT),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }

    /// True for WILL, WONT, DO, DONT.
    pub fn is_negotiation_command(self) -> bool {
        matches!(
            self,
            TelnetCommand::WILL | TelnetCommand::WONT | TelnetCommand::DO | TelnetCommand::DONT
        )
    }
}

/// Standard Telnet options this server negotiates or recognizes by name.
///
/// Option codes outside this set are still tracked (see `negotiation::OptionTable`,
/// which is keyed on the raw byte), but have no dedicated variant here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
#[allow(non_camel_case_types)]
pub enum TelnetOption {
    /// Binary Transmission (RFC 856)
    BINARY = 0,
    /// Echo (RFC 857)
    ECHO = 1,
    /// Suppress Go Ahead (RFC 858)
    SUPPRESS_GO_AHEAD = 3,
    /// Status (RFC 859)
    STATUS = 5,
    /// Terminal Type (RFC 1091)
    TERMINAL_TYPE = 24,
    /// Negotiate About Window Size (RFC 1073)
    NAWS = 31,
    /// Linemode (RFC 1184)
    LINEMODE = 34,
    /// Encryption (RFC 2946)
    ENCRYPT = 38,
    /// New Environment (RFC 1571)
    NEW_ENVIRON = 39,
}

impl TelnetOption {
    /// Convert a byte to a TelnetOption if it maps to one of our named options.
    ///
    /// Unnamed option codes are not an error: callers that need to track an
    /// arbitrary option code go through `negotiation::OptionTable` directly
    /// rather than through this enum.
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(TelnetOption::BINARY),
            1 => Some(TelnetOption::ECHO),
            3 => Some(TelnetOption::SUPPRESS_GO_AHEAD),
            5 => Some(TelnetOption::STATUS),
            24 => Some(TelnetOption::TERMINAL_TYPE),
            31 => Some(TelnetOption::NAWS),
            34 => Some(TelnetOption::LINEMODE),
            38 => Some(TelnetOption::ENCRYPT),
            39 => Some(TelnetOption::NEW_ENVIRON),
            _ => None,
        }
    }

    pub fn to_byte(self) -> u8 {
        self as u8
    }
}
