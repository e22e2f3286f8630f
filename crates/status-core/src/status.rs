//! Status tracking module
//!
//! Records session starts and ends, stores the `show` of broadcast presence,
//! and answers subscriptions and probes sent to the configured resource.
//!
//! Every update is a read-modify-write against the record store with no
//! locking across the two steps. Two events for the same user handled by
//! different processes sharing a store can interleave, and the last write
//! wins.

use std::sync::Arc;

use jid::{BareJid, Jid};
use tracing::{debug, info, trace, warn};

use crate::clock::{Clock, SystemClock};
use crate::config::StatusConfig;
use crate::error::Result;
use crate::extract::extract_show;
use crate::module::{ModResult, PacketResult, Session, SmModule};
use crate::record::{Availability, StatusRecord};
use crate::sink::PacketSink;
use crate::stanza::{Stanza, StanzaType};
use crate::store::{RecordStore, StatusRecords};

pub const MODULE_NAME: &str = "status";

pub struct StatusModule<S, P, C = SystemClock> {
    config: Arc<StatusConfig>,
    records: StatusRecords<S>,
    sink: P,
    clock: C,
}

impl<S: RecordStore, P: PacketSink> StatusModule<S, P, SystemClock> {
    pub fn new(config: Arc<StatusConfig>, store: S, sink: P) -> Self {
        Self::with_clock(config, store, sink, SystemClock)
    }
}

impl<S: RecordStore, P: PacketSink, C: Clock> StatusModule<S, P, C> {
    pub fn with_clock(config: Arc<StatusConfig>, store: S, sink: P, clock: C) -> Self {
        match config.resource() {
            Some(resource) => info!("Status module answering for resource '{}'", resource),
            None => info!("No status resource configured, external presence handling disabled"),
        }
        Self {
            config,
            records: StatusRecords::new(store),
            sink,
            clock,
        }
    }

    pub fn records(&self) -> &StatusRecords<S> {
        &self.records
    }

    pub fn resource(&self) -> Option<&str> {
        self.config.resource()
    }

    /// Mark `user` online, keeping the previous logout time.
    pub fn session_started(&self, user: &BareJid) -> Result<StatusRecord> {
        let last_logout = self.records.get_or_default(user)?.last_logout;
        let record = StatusRecord::new(Availability::Online, "", self.clock.now(), last_logout);
        self.records.replace(user, &record)?;
        debug!("Session started for {}, last logout {}", user, last_logout);
        Ok(record)
    }

    /// Mark `user` offline, keeping the previous login time.
    pub fn session_ended(&self, user: &BareJid) -> Result<StatusRecord> {
        let last_login = self.records.get_or_default(user)?.last_login;
        let record = StatusRecord::new(Availability::Offline, "", last_login, self.clock.now());
        self.records.replace(user, &record)?;
        debug!("Session ended for {}, last login {}", user, last_login);
        Ok(record)
    }

    pub fn delete_user(&self, user: &BareJid) -> Result<()> {
        debug!("Deleting status record of {}", user);
        self.records.delete(user)
    }

    /// Record presence sent by `user` from an active session.
    ///
    /// Only broadcast presence (no `to`) is written; directed presence is
    /// read past and `None` is returned.
    pub fn ingest_presence(&self, user: &BareJid, stanza: &Stanza) -> Result<Option<StatusRecord>> {
        if !stanza.kind().is_presence() {
            return Ok(None);
        }

        let prior = self.records.get_or_default(user)?;

        if stanza.to().is_some() {
            trace!("Directed presence from {}, not recording", user);
            return Ok(None);
        }

        self.store_presence(user, stanza, prior.last_login, prior.last_logout)
            .map(Some)
    }

    /// Whether `stanza` is presence or subscription traffic for the
    /// configured resource.
    pub fn is_for_resource(&self, stanza: &Stanza) -> bool {
        let kind = stanza.kind();
        if !(kind.is_presence() || kind.is_subscription()) {
            return false;
        }
        match (self.config.resource(), stanza.to_resource()) {
            (Some(resource), Some(to_resource)) => resource == to_resource,
            _ => false,
        }
    }

    /// Answer a stanza arriving for the configured resource.
    ///
    /// Anything outside the resource gate is handed back untouched.
    pub fn handle_resource_packet(&self, stanza: Stanza) -> Result<PacketResult> {
        trace!(
            "Packet from {:?}, type {}, to {:?}, resource {:?}",
            stanza.from().map(|j| j.to_string()),
            stanza.kind(),
            stanza.to().map(|j| j.to_string()),
            self.config.resource()
        );

        if !self.is_for_resource(&stanza) {
            return Ok(PacketResult::Pass(stanza));
        }

        let (Some(from), Some(to)) = (stanza.from().cloned(), stanza.to().cloned()) else {
            debug!("Dropping {} to status resource with no sender", stanza.kind());
            return Ok(PacketResult::Handled);
        };
        let requester = Jid::from(from.to_bare());

        match stanza.kind() {
            StanzaType::Subscribe => {
                debug!("Subscription request from {}", from);

                self.sink.route(Stanza::create(
                    StanzaType::Subscribed,
                    Some(requester.clone()),
                    Some(Jid::from(to.to_bare())),
                ));
                self.sink.route(Stanza::create(
                    StanzaType::Available,
                    Some(requester),
                    Some(to),
                ));
                self.sink.route(stanza.tofrom());
            }
            StanzaType::Unsubscribe => {
                debug!("Unsubscribe request from {}", from);

                let mut ack = stanza;
                ack.set_kind(StanzaType::Unsubscribed);
                self.sink.route(ack.tofrom());
            }
            StanzaType::Probe => {
                debug!("Presence probe from {}", from);

                self.sink.route(Stanza::create(
                    StanzaType::Available,
                    Some(requester),
                    Some(to),
                ));
            }
            StanzaType::Available | StanzaType::Unavailable => {
                debug!("Storing presence from {}", from);

                self.store_presence(&from.to_bare(), &stanza, 0, 0)?;
            }
            other => {
                debug!("Dropping {} from {}", other, from);
            }
        }

        Ok(PacketResult::Handled)
    }

    fn store_presence(
        &self,
        user: &BareJid,
        stanza: &Stanza,
        last_login: i64,
        last_logout: i64,
    ) -> Result<StatusRecord> {
        let record = StatusRecord::new(Availability::Online, extract_show(stanza), last_login, last_logout);
        self.records.replace(user, &record)?;
        Ok(record)
    }
}

impl<S: RecordStore, P: PacketSink, C: Clock> SmModule for StatusModule<S, P, C> {
    fn name(&self) -> &str {
        MODULE_NAME
    }

    fn user_delete(&self, jid: &Jid) {
        if let Err(e) = self.delete_user(&jid.to_bare()) {
            warn!("Failed to delete status of {}: {}", jid, e);
        }
    }

    fn sess_start(&self, sess: &Session) -> ModResult {
        if let Err(e) = self.session_started(&sess.user()) {
            warn!("Failed to record session start for {}: {}", sess.jid(), e);
        }
        ModResult::Pass
    }

    fn sess_end(&self, sess: &Session) {
        if let Err(e) = self.session_ended(&sess.user()) {
            warn!("Failed to record session end for {}: {}", sess.jid(), e);
        }
    }

    fn in_sess(&self, sess: &Session, stanza: Stanza) -> PacketResult {
        if let Err(e) = self.ingest_presence(&sess.user(), &stanza) {
            warn!("Failed to record presence of {}: {}", sess.jid(), e);
        }
        PacketResult::Pass(stanza)
    }

    fn pkt_sm(&self, stanza: Stanza) -> PacketResult {
        // Errors only occur after the stanza has been claimed.
        self.handle_resource_packet(stanza).unwrap_or_else(|e| {
            warn!("Failed to store remote presence: {}", e);
            PacketResult::Handled
        })
    }
}
