//! Derive the `show` value recorded for a presence stanza

use crate::record::{MAX_SHOW_LEN, UNAVAILABLE};
use crate::stanza::{Stanza, StanzaType};

/// Unavailable presence always yields [`UNAVAILABLE`]. Otherwise the text of
/// the first `<show/>` child is kept if it is 1 to [`MAX_SHOW_LEN`]
/// characters long; anything else collapses to the empty string.
pub fn extract_show(stanza: &Stanza) -> String {
    if stanza.kind() == StanzaType::Unavailable {
        return UNAVAILABLE.to_string();
    }

    match stanza.payload("show") {
        Some(show) => {
            let len = show.text.chars().count();
            if len == 0 || len > MAX_SHOW_LEN {
                String::new()
            } else {
                show.text.clone()
            }
        }
        None => String::new(),
    }
}
