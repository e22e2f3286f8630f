//! Stanza model consumed and produced by the status module
//!
//! Only the parts of a stanza the module looks at are modelled: the element
//! kind and its `type` attribute, the addressing, an optional id, and the
//! flat list of child elements. Deeper nesting is not preserved.

use std::fmt;
use std::io::Cursor;

use jid::Jid;
use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{Result, StatusError};

/// Element kind and `type` attribute of a stanza
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StanzaType {
    /// `<presence/>` with no type
    Available,
    Unavailable,
    Probe,
    Invisible,
    Subscribe,
    Subscribed,
    Unsubscribe,
    Unsubscribed,
    /// `<presence type="error"/>`
    Error,
    Message,
    Iq,
}

impl StanzaType {
    /// Name of the top-level element.
    pub fn element(&self) -> &'static str {
        match self {
            StanzaType::Message => "message",
            StanzaType::Iq => "iq",
            _ => "presence",
        }
    }

    /// Value of the `type` attribute, `None` for plain availability.
    pub fn type_attr(&self) -> Option<&'static str> {
        match self {
            StanzaType::Available | StanzaType::Message | StanzaType::Iq => None,
            StanzaType::Unavailable => Some("unavailable"),
            StanzaType::Probe => Some("probe"),
            StanzaType::Invisible => Some("invisible"),
            StanzaType::Subscribe => Some("subscribe"),
            StanzaType::Subscribed => Some("subscribed"),
            StanzaType::Unsubscribe => Some("unsubscribe"),
            StanzaType::Unsubscribed => Some("unsubscribed"),
            StanzaType::Error => Some("error"),
        }
    }

    /// Availability announcements, probes and presence errors.
    pub fn is_presence(&self) -> bool {
        matches!(
            self,
            StanzaType::Available
                | StanzaType::Unavailable
                | StanzaType::Probe
                | StanzaType::Invisible
                | StanzaType::Error
        )
    }

    /// Subscription control.
    pub fn is_subscription(&self) -> bool {
        matches!(
            self,
            StanzaType::Subscribe | StanzaType::Subscribed | StanzaType::Unsubscribe | StanzaType::Unsubscribed
        )
    }

    fn from_presence_type(attr: Option<&str>) -> Result<Self> {
        Ok(match attr {
            None | Some("") | Some("available") => StanzaType::Available,
            Some("unavailable") => StanzaType::Unavailable,
            Some("probe") => StanzaType::Probe,
            Some("invisible") => StanzaType::Invisible,
            Some("subscribe") => StanzaType::Subscribe,
            Some("subscribed") => StanzaType::Subscribed,
            Some("unsubscribe") => StanzaType::Unsubscribe,
            Some("unsubscribed") => StanzaType::Unsubscribed,
            Some("error") => StanzaType::Error,
            Some(other) => {
                return Err(StatusError::Stanza(format!("unknown presence type '{}'", other)))
            }
        })
    }
}

impl fmt::Display for StanzaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.type_attr() {
            Some(attr) => write!(f, "{}/{}", self.element(), attr),
            None => f.write_str(self.element()),
        }
    }
}

/// A direct child element with its character data
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    pub name: String,
    pub text: String,
}

impl Payload {
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stanza {
    kind: StanzaType,
    from: Option<Jid>,
    to: Option<Jid>,
    id: Option<String>,
    payloads: Vec<Payload>,
}

impl Stanza {
    /// Build a fresh stanza with no payloads.
    pub fn create(kind: StanzaType, to: Option<Jid>, from: Option<Jid>) -> Self {
        Self {
            kind,
            from,
            to,
            id: None,
            payloads: Vec::new(),
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_payload(mut self, name: impl Into<String>, text: impl Into<String>) -> Self {
        self.payloads.push(Payload::new(name, text));
        self
    }

    pub fn kind(&self) -> StanzaType {
        self.kind
    }

    /// Rewrite the `type` attribute in place.
    pub fn set_kind(&mut self, kind: StanzaType) {
        self.kind = kind;
    }

    pub fn from(&self) -> Option<&Jid> {
        self.from.as_ref()
    }

    pub fn to(&self) -> Option<&Jid> {
        self.to.as_ref()
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn payloads(&self) -> &[Payload] {
        &self.payloads
    }

    /// First child element with the given local name.
    pub fn payload(&self, name: &str) -> Option<&Payload> {
        self.payloads.iter().find(|p| p.name == name)
    }

    /// Resource part of the destination address.
    pub fn to_resource(&self) -> Option<&str> {
        self.to.as_ref().and_then(|to| to.resource()).map(|r| r.as_str())
    }

    /// Swap `to` and `from`, keeping everything else.
    pub fn tofrom(mut self) -> Self {
        std::mem::swap(&mut self.to, &mut self.from);
        self
    }

    /// Parse a single top-level stanza element.
    pub fn from_xml(xml: &str) -> Result<Self> {
        // No trimming: child character data is kept verbatim.
        let mut reader = Reader::from_str(xml);

        let mut stanza: Option<Stanza> = None;
        let mut current: Option<Payload> = None;
        let mut depth = 0usize;

        loop {
            let event = reader
                .read_event()
                .map_err(|e| StatusError::Stanza(e.to_string()))?;
            match event {
                Event::Start(ref e) => {
                    depth += 1;
                    match depth {
                        1 => stanza = Some(Self::from_root(e)?),
                        2 => current = Some(Payload::new(local_name(e), String::new())),
                        _ => {}
                    }
                }
                Event::Empty(ref e) => match depth {
                    0 => return Self::from_root(e),
                    1 => {
                        if let Some(stanza) = stanza.as_mut() {
                            stanza.payloads.push(Payload::new(local_name(e), String::new()));
                        }
                    }
                    _ => {}
                },
                Event::Text(ref e) if depth == 2 => {
                    let text = e.unescape().map_err(|err| StatusError::Stanza(err.to_string()))?;
                    if let Some(payload) = current.as_mut() {
                        payload.text.push_str(&text);
                    }
                }
                Event::CData(ref e) if depth == 2 => {
                    let raw: &[u8] = e;
                    if let Some(payload) = current.as_mut() {
                        payload.text.push_str(&String::from_utf8_lossy(raw));
                    }
                }
                Event::End(_) => {
                    if depth == 2 {
                        if let (Some(stanza), Some(payload)) = (stanza.as_mut(), current.take()) {
                            stanza.payloads.push(payload);
                        }
                    }
                    depth = depth.saturating_sub(1);
                    if depth == 0 {
                        break;
                    }
                }
                Event::Eof => break,
                _ => {}
            }
        }

        stanza.ok_or_else(|| StatusError::Stanza("no stanza element found".to_string()))
    }

    fn from_root(e: &BytesStart<'_>) -> Result<Self> {
        let mut type_attr = None;
        let mut from = None;
        let mut to = None;
        let mut id = None;

        for attr in e.attributes() {
            let attr = attr.map_err(|err| StatusError::Stanza(err.to_string()))?;
            let value = attr
                .unescape_value()
                .map_err(|err| StatusError::Stanza(err.to_string()))?
                .into_owned();
            match attr.key.as_ref() {
                b"type" => type_attr = Some(value),
                b"from" => from = Some(parse_jid(&value)?),
                b"to" => to = Some(parse_jid(&value)?),
                b"id" => id = Some(value),
                _ => {}
            }
        }

        let kind = match e.local_name().as_ref() {
            b"presence" => StanzaType::from_presence_type(type_attr.as_deref())?,
            b"message" => StanzaType::Message,
            b"iq" => StanzaType::Iq,
            other => {
                return Err(StatusError::Stanza(format!(
                    "unexpected element <{}>",
                    String::from_utf8_lossy(other)
                )))
            }
        };

        Ok(Self {
            kind,
            from,
            to,
            id,
            payloads: Vec::new(),
        })
    }

    /// Serialize to a single XML element.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));

        let mut root = BytesStart::new(self.kind.element());
        if let Some(from) = &self.from {
            root.push_attribute(("from", from.to_string().as_str()));
        }
        if let Some(to) = &self.to {
            root.push_attribute(("to", to.to_string().as_str()));
        }
        if let Some(type_attr) = self.kind.type_attr() {
            root.push_attribute(("type", type_attr));
        }
        if let Some(id) = &self.id {
            root.push_attribute(("id", id.as_str()));
        }

        if self.payloads.is_empty() {
            writer
                .write_event(Event::Empty(root))
                .map_err(|e| StatusError::Stanza(e.to_string()))?;
        } else {
            let end = root.to_end().into_owned();
            writer
                .write_event(Event::Start(root))
                .map_err(|e| StatusError::Stanza(e.to_string()))?;
            for payload in &self.payloads {
                let child = BytesStart::new(payload.name.as_str());
                if payload.text.is_empty() {
                    writer
                        .write_event(Event::Empty(child))
                        .map_err(|e| StatusError::Stanza(e.to_string()))?;
                    continue;
                }
                let child_end = child.to_end().into_owned();
                writer
                    .write_event(Event::Start(child))
                    .map_err(|e| StatusError::Stanza(e.to_string()))?;
                writer
                    .write_event(Event::Text(BytesText::new(&payload.text)))
                    .map_err(|e| StatusError::Stanza(e.to_string()))?;
                writer
                    .write_event(Event::End(child_end))
                    .map_err(|e| StatusError::Stanza(e.to_string()))?;
            }
            writer
                .write_event(Event::End(end))
                .map_err(|e| StatusError::Stanza(e.to_string()))?;
        }

        let xml = writer.into_inner().into_inner();
        String::from_utf8(xml).map_err(|e| StatusError::Stanza(e.to_string()))
    }
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).into_owned()
}

fn parse_jid(value: &str) -> Result<Jid> {
    Jid::new(value).map_err(|e| StatusError::Stanza(format!("invalid JID '{}': {}", value, e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn jid(s: &str) -> Jid {
        Jid::new(s).unwrap()
    }

    #[test]
    fn test_parse_presence_with_show() {
        let stanza = Stanza::from_xml(
            r#"<presence from="alice@example.com/laptop" id="p1"><show>away</show><status>lunch</status></presence>"#,
        )
        .unwrap();

        assert_eq!(stanza.kind(), StanzaType::Available);
        assert_eq!(stanza.from(), Some(&jid("alice@example.com/laptop")));
        assert_eq!(stanza.to(), None);
        assert_eq!(stanza.id(), Some("p1"));
        assert_eq!(stanza.payload("show").map(|p| p.text.as_str()), Some("away"));
        assert_eq!(stanza.payloads().len(), 2);
    }

    #[test]
    fn test_parse_typed_and_self_closing() {
        let stanza = Stanza::from_xml(
            r#"<presence type="subscribe" from="bob@remote.org" to="alice@example.com/status"/>"#,
        )
        .unwrap();
        assert_eq!(stanza.kind(), StanzaType::Subscribe);
        assert_eq!(stanza.to_resource(), Some("status"));
        assert!(stanza.kind().is_subscription());
        assert!(!stanza.kind().is_presence());
    }

    #[test]
    fn test_parse_empty_child() {
        let stanza = Stanza::from_xml(r#"<presence><show/></presence>"#).unwrap();
        assert_eq!(stanza.payload("show"), Some(&Payload::new("show", "")));
    }

    #[test]
    fn test_child_text_kept_verbatim() {
        let stanza = Stanza::from_xml(
            "<presence>\n  <show>   nineteen-characters   </show>\n  <status>   </status>\n</presence>",
        )
        .unwrap();
        assert_eq!(stanza.payloads().len(), 2);
        assert_eq!(stanza.payload("show").unwrap().text, "   nineteen-characters   ");
        assert_eq!(stanza.payload("status").unwrap().text, "   ");
    }

    #[test]
    fn test_cdata_child_text() {
        let stanza = Stanza::from_xml("<presence><show><![CDATA[away]]></show></presence>").unwrap();
        assert_eq!(stanza.payload("show").unwrap().text, "away");
    }

    #[test]
    fn test_error_presence_is_presence_family() {
        let stanza = Stanza::from_xml(r#"<presence type="error"/>"#).unwrap();
        assert_eq!(stanza.kind(), StanzaType::Error);
        assert!(stanza.kind().is_presence());
        assert!(!stanza.kind().is_subscription());
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        assert!(Stanza::from_xml(r#"<presence type="dance"/>"#).is_err());
        assert!(Stanza::from_xml(r#"<stream/>"#).is_err());
        assert!(Stanza::from_xml("").is_err());
    }

    #[test]
    fn test_message_and_iq_are_not_presence() {
        let message = Stanza::from_xml(r#"<message to="a@b"><body>hi</body></message>"#).unwrap();
        assert_eq!(message.kind(), StanzaType::Message);
        assert!(!message.kind().is_presence());
        assert!(!message.kind().is_subscription());

        let iq = Stanza::from_xml(r#"<iq type="get" id="1"/>"#).unwrap();
        assert_eq!(iq.kind(), StanzaType::Iq);
    }

    #[test]
    fn test_tofrom_swaps_addresses() {
        let stanza = Stanza::create(
            StanzaType::Subscribe,
            Some(jid("alice@example.com/status")),
            Some(jid("bob@remote.org")),
        )
        .with_payload("status", "let me in");

        let swapped = stanza.clone().tofrom();
        assert_eq!(swapped.to(), stanza.from());
        assert_eq!(swapped.from(), stanza.to());
        assert_eq!(swapped.kind(), StanzaType::Subscribe);
        assert_eq!(swapped.payloads(), stanza.payloads());
    }

    #[test]
    fn test_serialize_escapes_and_parses_back() {
        let stanza = Stanza::create(StanzaType::Unsubscribed, Some(jid("bob@remote.org")), None)
            .with_id("u1")
            .with_payload("status", "a < b & c");

        let xml = stanza.to_xml().unwrap();
        assert!(xml.starts_with("<presence"));
        assert!(xml.contains(r#"type="unsubscribed""#));
        assert!(xml.contains("a &lt; b &amp; c"));
        assert_eq!(Stanza::from_xml(&xml).unwrap(), stanza);
    }

    #[test]
    fn test_available_has_no_type_attribute() {
        let xml = Stanza::create(StanzaType::Available, Some(jid("bob@remote.org")), None)
            .to_xml()
            .unwrap();
        assert_eq!(xml, r#"<presence to="bob@remote.org"/>"#);
    }
}
