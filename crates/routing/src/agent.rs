use {ainx_protocol::AinxMessage, async_trait::async_trait};

/// Capability contract every routable agent exposes. The router never
/// inspects an agent beyond this trait; agents hold no references to
/// each other, only to the router.
#[async_trait]
pub trait AgentHandle: Send + Sync {
    /// Stable instance name, used as the sender of replies and in logs.
    fn name(&self) -> &str;

    /// Handle one message. `Ok(None)` means "no reply". Errors are
    /// collected per recipient by the router, not raised to the
    /// dispatching caller.
    async fn receive(&self, message: &AinxMessage) -> anyhow::Result<Option<AinxMessage>>;
}
