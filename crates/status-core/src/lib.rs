//! # Status-Core
//!
//! Presence status tracking for an XMPP session manager.
//!
//! This crate provides:
//! - A per-user status record (`status`, `show`, last login, last logout)
//!   kept in the host's object store
//! - Session start/end tracking
//! - Recording of broadcast presence sent by local sessions
//! - Answers to subscriptions, probes and presence addressed to a configured
//!   virtual resource, on behalf of the user
//!
//! ## Architecture
//!
//! The host owns storage, routing and stanza delivery. It registers a
//! [`StatusModule`] in its [`ModuleChain`] at startup and forwards lifecycle
//! and packet events through the [`SmModule`] hooks. Records are read and
//! written through [`RecordStore`]; replies leave through a [`PacketSink`].

pub mod clock;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod extract;
pub mod logging;
pub mod module;
pub mod record;
pub mod sink;
pub mod stanza;
pub mod status;
pub mod store;

use std::sync::Arc;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::StatusConfig;
pub use dispatch::ModuleChain;
pub use error::{Result, StatusError, StoreError};
pub use extract::extract_show;
pub use module::{ModResult, PacketResult, Session, SmModule};
pub use record::{Availability, StatusRecord};
pub use sink::PacketSink;
pub use stanza::{Payload, Stanza, StanzaType};
pub use status::StatusModule;
pub use store::{MemoryRecordStore, RecordStore, StatusRecords};

/// Build the status module and register it with the host's chain.
pub fn init<S, P>(chain: &mut ModuleChain, config: Arc<StatusConfig>, store: S, sink: P) -> Arc<StatusModule<S, P>>
where
    S: RecordStore + 'static,
    P: PacketSink + 'static,
{
    let module = Arc::new(StatusModule::new(config, store, sink));
    chain.register(module.clone());
    module
}
