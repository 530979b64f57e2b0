use std::sync::Arc;

use {
    ainx_protocol::{AinxMessage, Recipient},
    futures::future::join_all,
    thiserror::Error,
    tokio::sync::RwLock,
    tracing::{debug, warn},
};

use crate::{
    agent::AgentHandle,
    error::{Error as RouterError, Result},
};

/// Router options, all off by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct RouterConfig {
    /// Allow `register` to silently replace an existing binding.
    pub allow_overwrite: bool,
    /// Make `unregister` of an unknown identifier an error instead of
    /// a no-op.
    pub strict_unregister: bool,
}

/// One registry binding: identifier, broadcast role filter, handle.
struct Registration {
    id: String,
    roles: Vec<String>,
    handle: Arc<dyn AgentHandle>,
}

impl Registration {
    /// Empty filter matches every role.
    fn accepts_role(&self, role: &str) -> bool {
        self.roles.is_empty() || self.roles.iter().any(|r| r == role)
    }
}

/// Maps identifiers to agent handles and dispatches parsed messages.
///
/// The registry is the only mutable state in the core. It lives behind
/// a `RwLock`: dispatch snapshots matched handles under the read lock
/// and invokes them after releasing it, so register/unregister are
/// serialized against in-flight dispatches without blocking on agent
/// work. Vec order is the broadcast delivery-order contract.
pub struct Router {
    config: RouterConfig,
    registry: RwLock<Vec<Registration>>,
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

impl Router {
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(RouterConfig::default())
    }

    #[must_use]
    pub fn with_config(config: RouterConfig) -> Self {
        Self {
            config,
            registry: RwLock::new(Vec::new()),
        }
    }

    /// Bind an identifier to a handle with no broadcast role filter.
    pub async fn register(&self, id: impl Into<String>, handle: Arc<dyn AgentHandle>) -> Result<()> {
        self.register_with_roles(id, Vec::new(), handle).await
    }

    /// Bind an identifier to a handle. `roles` filters which broadcast
    /// messages reach it; empty matches all. Re-binding an existing
    /// identifier fails unless [`RouterConfig::allow_overwrite`] is
    /// set, in which case the new handle takes over the original
    /// registry slot so delivery order stays stable.
    pub async fn register_with_roles(
        &self,
        id: impl Into<String>,
        roles: Vec<String>,
        handle: Arc<dyn AgentHandle>,
    ) -> Result<()> {
        let id = id.into();
        let mut registry = self.registry.write().await;

        if let Some(slot) = registry.iter_mut().find(|r| r.id == id) {
            if !self.config.allow_overwrite {
                return Err(RouterError::duplicate_registration(id));
            }
            debug!(id = %id, agent = handle.name(), "replacing registration");
            slot.roles = roles;
            slot.handle = handle;
            return Ok(());
        }

        debug!(id = %id, agent = handle.name(), "registering agent");
        registry.push(Registration { id, roles, handle });
        Ok(())
    }

    /// Remove a binding. Unknown identifiers are ignored unless
    /// [`RouterConfig::strict_unregister`] is set.
    pub async fn unregister(&self, id: &str) -> Result<()> {
        let mut registry = self.registry.write().await;
        match registry.iter().position(|r| r.id == id) {
            Some(index) => {
                registry.remove(index);
                debug!(id, "unregistered agent");
                Ok(())
            },
            None if self.config.strict_unregister => Err(RouterError::not_registered(id)),
            None => {
                debug!(id, "unregister of unknown identifier ignored");
                Ok(())
            },
        }
    }

    /// Deliver a message to its matched registrations and collect every
    /// outcome.
    ///
    /// Directed messages go to the single matching binding
    /// ([`RouterError::UnknownRecipient`] when absent). Broadcast
    /// messages go to every binding whose role filter matches, skipping
    /// the one registered under the sender's identifier; zero matches
    /// is an empty result, not an error.
    ///
    /// Handles run concurrently, but deliveries are collected in
    /// registration order and the call returns only once every handle
    /// has completed or failed. A handle failure is captured as that
    /// recipient's [`DeliveryError`] and never aborts its siblings.
    pub async fn dispatch(&self, message: &AinxMessage) -> Result<DispatchResult> {
        let matched: Vec<(String, Arc<dyn AgentHandle>)> = {
            let registry = self.registry.read().await;
            match &message.recipient {
                Recipient::Agent(id) => {
                    let registration = registry
                        .iter()
                        .find(|r| r.id == *id)
                        .ok_or_else(|| RouterError::unknown_recipient(id))?;
                    vec![(registration.id.clone(), Arc::clone(&registration.handle))]
                },
                Recipient::Broadcast => registry
                    .iter()
                    .filter(|r| r.id != message.sender && r.accepts_role(&message.role))
                    .map(|r| (r.id.clone(), Arc::clone(&r.handle)))
                    .collect(),
            }
        };

        debug!(
            recipient = %message.recipient,
            intent = %message.intent,
            matched = matched.len(),
            "dispatching message"
        );

        let deliveries = join_all(matched.into_iter().map(|(recipient, handle)| async move {
            match handle.receive(message).await {
                Ok(reply) => Delivery {
                    recipient,
                    outcome: Ok(reply),
                },
                Err(source) => {
                    warn!(recipient = %recipient, error = %source, "agent receive failed");
                    let error = DeliveryError {
                        recipient: recipient.clone(),
                        source,
                    };
                    Delivery {
                        recipient,
                        outcome: Err(error),
                    }
                },
            }
        }))
        .await;

        Ok(DispatchResult { deliveries })
    }

    /// Identifiers currently bound, in registration order.
    pub async fn registered_ids(&self) -> Vec<String> {
        self.registry
            .read()
            .await
            .iter()
            .map(|r| r.id.clone())
            .collect()
    }

    pub async fn len(&self) -> usize {
        self.registry.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.registry.read().await.is_empty()
    }
}

// ── Dispatch outcomes ───────────────────────────────────────────────────────

/// A handle raised an error while receiving; wraps whatever it raised.
#[derive(Debug, Error)]
#[error("delivery to {recipient} failed: {source}")]
pub struct DeliveryError {
    pub recipient: String,
    #[source]
    pub source: anyhow::Error,
}

/// One recipient's outcome within a dispatch.
#[derive(Debug)]
pub struct Delivery {
    pub recipient: String,
    pub outcome: std::result::Result<Option<AinxMessage>, DeliveryError>,
}

/// Per-recipient outcomes of one dispatch call, in registration order.
#[derive(Debug)]
pub struct DispatchResult {
    pub deliveries: Vec<Delivery>,
}

impl DispatchResult {
    /// Replies from handles that answered, in delivery order.
    pub fn replies(&self) -> impl Iterator<Item = &AinxMessage> {
        self.deliveries
            .iter()
            .filter_map(|d| d.outcome.as_ref().ok().and_then(Option::as_ref))
    }

    /// Per-recipient failures, in delivery order.
    pub fn failures(&self) -> impl Iterator<Item = &DeliveryError> {
        self.deliveries.iter().filter_map(|d| d.outcome.as_ref().err())
    }

    #[must_use]
    pub fn is_fully_delivered(&self) -> bool {
        self.deliveries.iter().all(|d| d.outcome.is_ok())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.deliveries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deliveries.is_empty()
    }
}
