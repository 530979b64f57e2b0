use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::{
    error::{ParseError, Result},
    object::ObjectExpr,
};

/// Field separator of both textual forms.
pub const FIELD_SEPARATOR: &str = "::";

/// Recipient token that fans a message out to every matching agent.
pub const BROADCAST_RECIPIENT: &str = "broadcast";

// ── Recipient ───────────────────────────────────────────────────────────────

/// Where a message is addressed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Recipient {
    /// The single agent registered under this identifier.
    Agent(String),
    /// Every registered agent whose role filter matches the message role.
    Broadcast,
}

impl Recipient {
    /// The textual token used in the directed form.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Agent(id) => id,
            Self::Broadcast => BROADCAST_RECIPIENT,
        }
    }

    #[must_use]
    pub fn is_broadcast(&self) -> bool {
        matches!(self, Self::Broadcast)
    }
}

impl From<String> for Recipient {
    fn from(value: String) -> Self {
        if value == BROADCAST_RECIPIENT {
            Self::Broadcast
        } else {
            Self::Agent(value)
        }
    }
}

impl From<&str> for Recipient {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Recipient> for String {
    fn from(value: Recipient) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── Payload ─────────────────────────────────────────────────────────────────

/// Message payload: free text (directed form) or a structured object
/// expression (compact form).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Payload {
    Text(String),
    Object(ObjectExpr),
}

impl Payload {
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// The structured attributes, when the payload is an object.
    #[must_use]
    pub fn as_object(&self) -> Option<&ObjectExpr> {
        match self {
            Self::Object(obj) => Some(obj),
            Self::Text(_) => None,
        }
    }
}

impl From<String> for Payload {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Payload {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<ObjectExpr> for Payload {
    fn from(value: ObjectExpr) -> Self {
        Self::Object(value)
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Object(obj) => obj.fmt(f),
        }
    }
}

// ── AinxMessage ─────────────────────────────────────────────────────────────

/// A parsed AINX message. Immutable once created; [`AinxMessage::reply`]
/// and the constructors produce new values instead of mutating.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AinxMessage {
    pub sender: String,
    pub recipient: Recipient,
    pub role: String,
    pub intent: String,
    pub payload: Payload,
}

impl AinxMessage {
    /// Build a directed message, validating that every identifier is
    /// non-empty after trimming.
    pub fn directed(
        sender: impl Into<String>,
        recipient: Recipient,
        role: impl Into<String>,
        intent: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Result<Self> {
        let recipient = match recipient {
            Recipient::Agent(id) => Recipient::Agent(identifier(&id, "recipient")?),
            Recipient::Broadcast => Recipient::Broadcast,
        };
        Ok(Self {
            sender: identifier(&sender.into(), "sender")?,
            recipient,
            role: identifier(&role.into(), "role")?,
            intent: identifier(&intent.into(), "intent")?,
            payload: payload.into(),
        })
    }

    /// Build a compact-form message. The role tag identifies the
    /// producing agent, so the envelope is implied: `sender = role`,
    /// `recipient = broadcast`.
    pub fn compact(
        role: impl Into<String>,
        intent: impl Into<String>,
        object: ObjectExpr,
    ) -> Result<Self> {
        let role = identifier(&role.into(), "role")?;
        Ok(Self {
            sender: role.clone(),
            recipient: Recipient::Broadcast,
            role,
            intent: identifier(&intent.into(), "intent")?,
            payload: Payload::Object(object),
        })
    }

    /// Build a reply addressed back at this message's sender.
    pub fn reply(
        &self,
        sender: impl Into<String>,
        role: impl Into<String>,
        intent: impl Into<String>,
        payload: impl Into<Payload>,
    ) -> Result<Self> {
        Self::directed(
            sender,
            Recipient::Agent(self.sender.clone()),
            role,
            intent,
            payload,
        )
    }

    /// Parse either textual form.
    ///
    /// Splits on `::`. Three fields select the compact form, five or
    /// more the directed form (fields past the fourth are rejoined, so
    /// content may contain the separator). Anything else is a
    /// [`ParseError::MissingField`].
    pub fn parse(raw: &str) -> Result<Self> {
        let parts: Vec<&str> = raw.trim().split(FIELD_SEPARATOR).collect();
        match parts.len() {
            3 => Self::parse_compact(parts[0], parts[1], parts[2]),
            5.. => Self::parse_directed(&parts),
            found => Err(ParseError::missing_field(found)),
        }
    }

    fn parse_compact(role: &str, intent: &str, object: &str) -> Result<Self> {
        let role = identifier(role, "role")?;
        let intent = identifier(intent, "intent")?;
        let object = ObjectExpr::parse(object)?;
        Ok(Self {
            sender: role.clone(),
            recipient: Recipient::Broadcast,
            role,
            intent,
            payload: Payload::Object(object),
        })
    }

    fn parse_directed(parts: &[&str]) -> Result<Self> {
        let sender = identifier(parts[0], "sender")?;
        let recipient = Recipient::from(identifier(parts[1], "recipient")?);
        let role = identifier(parts[2], "role")?;
        let intent = identifier(parts[3], "intent")?;
        let content = parts[4..].join(FIELD_SEPARATOR).trim().to_string();
        Ok(Self {
            sender,
            recipient,
            role,
            intent,
            payload: Payload::Text(content),
        })
    }

    /// Canonical textual form; alias for `to_string()`.
    #[must_use]
    pub fn serialize(&self) -> String {
        self.to_string()
    }

    /// A message canonically prints compact when its payload is an
    /// object and its envelope is the one the compact form implies.
    fn is_compact(&self) -> bool {
        self.payload.is_object()
            && self.recipient == Recipient::Broadcast
            && self.sender == self.role
    }
}

impl fmt::Display for AinxMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_compact() {
            write!(f, "{}::{}::{}", self.role, self.intent, self.payload)
        } else {
            write!(
                f,
                "{}::{}::{}::{}::{}",
                self.sender, self.recipient, self.role, self.intent, self.payload
            )
        }
    }
}

impl FromStr for AinxMessage {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn identifier(value: &str, field: &'static str) -> Result<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ParseError::empty_identifier(field));
    }
    Ok(value.to_string())
}
