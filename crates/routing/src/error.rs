use thiserror::Error;

/// Crate-wide result type for router operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Typed router errors. Per-delivery handle failures are not here —
/// they are collected inside [`crate::DispatchResult`] instead of
/// aborting the dispatch call.
#[derive(Debug, Error)]
pub enum Error {
    /// The identifier is already bound and overwrite is not allowed.
    #[error("identifier already registered: {id}")]
    DuplicateRegistration { id: String },

    /// The identifier is not bound (strict unregister only).
    #[error("identifier not registered: {id}")]
    NotRegistered { id: String },

    /// A directed message names a recipient with no registration.
    #[error("no agent registered for recipient: {recipient}")]
    UnknownRecipient { recipient: String },
}

impl Error {
    #[must_use]
    pub fn duplicate_registration(id: impl Into<String>) -> Self {
        Self::DuplicateRegistration { id: id.into() }
    }

    #[must_use]
    pub fn not_registered(id: impl Into<String>) -> Self {
        Self::NotRegistered { id: id.into() }
    }

    #[must_use]
    pub fn unknown_recipient(recipient: impl Into<String>) -> Self {
        Self::UnknownRecipient {
            recipient: recipient.into(),
        }
    }
}
