//! Outbound stanza emission

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::warn;

use crate::stanza::Stanza;

/// Hands newly built stanzas to the router. Delivery is not acknowledged.
pub trait PacketSink: Send + Sync {
    fn route(&self, stanza: Stanza);
}

impl PacketSink for mpsc::UnboundedSender<Stanza> {
    fn route(&self, stanza: Stanza) {
        if let Err(mpsc::error::SendError(stanza)) = self.send(stanza) {
            warn!("Router channel closed, dropping outbound {}", stanza.kind());
        }
    }
}

impl<T: PacketSink + ?Sized> PacketSink for Arc<T> {
    fn route(&self, stanza: Stanza) {
        (**self).route(stanza)
    }
}

/// Channel whose receiving half feeds the router.
pub fn outbound_channel() -> (mpsc::UnboundedSender<Stanza>, mpsc::UnboundedReceiver<Stanza>) {
    mpsc::unbounded_channel()
}
