//! Session manager hook interface
//!
//! The host calls one method per lifecycle or packet event. Every method has a
//! pass-through default so a module only implements the events it cares about.

use jid::{BareJid, Jid};

use crate::stanza::Stanza;

/// An established client session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    jid: Jid,
}

impl Session {
    pub fn new(jid: Jid) -> Self {
        Self { jid }
    }

    /// Full JID bound to the session
    pub fn jid(&self) -> &Jid {
        &self.jid
    }

    /// Bare JID of the session's user
    pub fn user(&self) -> BareJid {
        self.jid.to_bare()
    }
}

/// Outcome of a non-packet hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModResult {
    /// Continue with the next module
    Pass,
    /// Stop processing this event
    Handled,
}

/// Outcome of a packet hook.
///
/// `Pass` hands the stanza back for the next module; `Handled` means the
/// module took ownership and the stanza goes no further.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PacketResult {
    Pass(Stanza),
    Handled,
}

impl PacketResult {
    pub fn is_handled(&self) -> bool {
        matches!(self, PacketResult::Handled)
    }

    pub fn into_stanza(self) -> Option<Stanza> {
        match self {
            PacketResult::Pass(stanza) => Some(stanza),
            PacketResult::Handled => None,
        }
    }
}

pub trait SmModule: Send + Sync {
    fn name(&self) -> &str;

    /// A user account is being removed.
    fn user_delete(&self, _jid: &Jid) {}

    fn sess_start(&self, _sess: &Session) -> ModResult {
        ModResult::Pass
    }

    fn sess_end(&self, _sess: &Session) {}

    /// Packet sent by the client owning `sess`.
    fn in_sess(&self, _sess: &Session, stanza: Stanza) -> PacketResult {
        PacketResult::Pass(stanza)
    }

    /// Packet addressed to the session manager from anywhere.
    fn pkt_sm(&self, stanza: Stanza) -> PacketResult {
        PacketResult::Pass(stanza)
    }
}
