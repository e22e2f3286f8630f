//! Host-side module chain
//!
//! Modules are registered once at startup and receive each event in
//! registration order.

use std::sync::Arc;

use jid::Jid;
use tracing::{debug, info, warn};

use crate::module::{ModResult, PacketResult, Session, SmModule};
use crate::stanza::Stanza;

#[derive(Default)]
pub struct ModuleChain {
    modules: Vec<Arc<dyn SmModule>>,
}

impl ModuleChain {
    pub fn new() -> Self {
        Self { modules: Vec::new() }
    }

    /// Add a module to the end of the chain.
    ///
    /// Returns `false` and leaves the chain untouched if a module with the
    /// same name is already registered.
    pub fn register(&mut self, module: Arc<dyn SmModule>) -> bool {
        if self.modules.iter().any(|m| m.name() == module.name()) {
            warn!("Module '{}' already registered, ignoring", module.name());
            return false;
        }
        info!("Registered module '{}'", module.name());
        self.modules.push(module);
        true
    }

    pub fn names(&self) -> Vec<&str> {
        self.modules.iter().map(|m| m.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Every module sees the deletion.
    pub fn user_delete(&self, jid: &Jid) {
        for module in &self.modules {
            module.user_delete(jid);
        }
    }

    pub fn sess_start(&self, sess: &Session) -> ModResult {
        for module in &self.modules {
            if module.sess_start(sess) == ModResult::Handled {
                debug!("Session start for {} handled by '{}'", sess.jid(), module.name());
                return ModResult::Handled;
            }
        }
        ModResult::Pass
    }

    /// Every module sees the session end.
    pub fn sess_end(&self, sess: &Session) {
        for module in &self.modules {
            module.sess_end(sess);
        }
    }

    pub fn in_sess(&self, sess: &Session, stanza: Stanza) -> PacketResult {
        let mut stanza = stanza;
        for module in &self.modules {
            match module.in_sess(sess, stanza) {
                PacketResult::Pass(s) => stanza = s,
                PacketResult::Handled => {
                    debug!("In-session packet from {} handled by '{}'", sess.jid(), module.name());
                    return PacketResult::Handled;
                }
            }
        }
        PacketResult::Pass(stanza)
    }

    pub fn pkt_sm(&self, stanza: Stanza) -> PacketResult {
        let mut stanza = stanza;
        for module in &self.modules {
            match module.pkt_sm(stanza) {
                PacketResult::Pass(s) => stanza = s,
                PacketResult::Handled => {
                    debug!("Packet handled by '{}'", module.name());
                    return PacketResult::Handled;
                }
            }
        }
        PacketResult::Pass(stanza)
    }
}
