//! # Option Negotiation State
//!
//! Tracks, per Telnet option code, whether *we* (`local`) and the peer
//! (`remote`) have the option active, plus whether we are still waiting on a
//! reply to a request we sent (`reply_pending`).
//!
//! ## Why tri-state, not boolean
//!
//! `Unknown` is a distinct value from `False`: the FSM in `fsm.rs` only
//! suppresses a redundant reply when the option's state *definitively* already
//! matches the incoming request (see `handle_do`/`handle_will` and friends). A
//! boolean can't represent "we have never discussed this option" versus "we
//! discussed it and settled on off", and those two cases drive different
//! replies in a few corners of the protocol (e.g. `TTYPE`/`NEW_ENVIRON` only
//! request once, when the state is still `Unknown` or `False`, never when it's
//! already `True`).
//!
//! This deliberately stops short of the RFC 1143 Q-method (`No`/`Yes`/
//! `WantNo{queue}`/`WantYes{queue}`): nothing in this core ever needs to queue a
//! second, superseding request behind one already in flight, since every option
//! here is requested at most once per direction in response to a single peer
//! event.

use std::collections::HashMap;

/// Tri-state value of one side (local or remote) of an option.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Unknown,
    True,
    False,
}

impl State {
    pub fn is_true(self) -> bool {
        matches!(self, State::True)
    }

    pub fn is_false(self) -> bool {
        matches!(self, State::False)
    }
}

/// The `(local, remote, reply_pending)` triple tracked for one option code.
#[derive(Debug, Clone, Copy)]
struct OptionEntry {
    local: State,
    remote: State,
    reply_pending: bool,
}

impl Default for OptionEntry {
    fn default() -> Self {
        OptionEntry {
            local: State::Unknown,
            remote: State::Unknown,
            reply_pending: false,
        }
    }
}

/// Per-connection ledger of option states, keyed by the raw option byte.
///
/// Keyed on `u8` rather than `TelnetOption` so that option codes with no named
/// meaning (anything `TelnetOption::from_byte` returns `None` for) still get a
/// correctly materialized tri-state entry; the FSM's "unknown option" branches
/// depend on that.
#[derive(Debug, Clone, Default)]
pub struct OptionTable {
    entries: HashMap<u8, OptionEntry>,
}

impl OptionTable {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, opt: u8) -> &mut OptionEntry {
        self.entries.entry(opt).or_insert_with(OptionEntry::default)
    }

    pub fn check_local(&mut self, opt: u8) -> State {
        self.entry(opt).local
    }

    pub fn note_local(&mut self, opt: u8, state: State) {
        self.entry(opt).local = state;
    }

    pub fn check_remote(&mut self, opt: u8) -> State {
        self.entry(opt).remote
    }

    pub fn note_remote(&mut self, opt: u8, state: State) {
        self.entry(opt).remote = state;
    }

    pub fn check_reply(&mut self, opt: u8) -> bool {
        self.entry(opt).reply_pending
    }

    pub fn note_reply(&mut self, opt: u8, pending: bool) {
        self.entry(opt).reply_pending = pending;
    }
}
