//! AINX message grammar: parsing and canonical serialization.
//!
//! Two textual forms share one in-memory type:
//! - Directed: `sender::recipient::role::intent::content`
//! - Compact:  `ROLE::INTENT::OBJECT[.key=value...]`
//!
//! Parsing validates; serialization (`Display`) is the exact inverse up
//! to per-field whitespace trimming. Messages are immutable values —
//! transformations such as [`AinxMessage::reply`] produce new ones.

pub mod error;
pub mod message;
pub mod object;

pub use {
    error::{ParseError, Result},
    message::{AinxMessage, BROADCAST_RECIPIENT, FIELD_SEPARATOR, Payload, Recipient},
    object::ObjectExpr,
};
