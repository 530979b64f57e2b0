use {
    ainx_protocol::AinxMessage,
    ainx_routing::AgentHandle,
    async_trait::async_trait,
    tracing::debug,
};

/// Intents that never get an answer.
fn suppressed(intent: &str) -> bool {
    intent.eq_ignore_ascii_case("ack") || intent.eq_ignore_ascii_case("response")
}

// ── Researcher ──────────────────────────────────────────────────────────────

/// Simulates a knowledge lookup over the message content.
pub struct ResearcherAgent {
    name: String,
}

impl ResearcherAgent {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for ResearcherAgent {
    fn default() -> Self {
        Self::new("researcher")
    }
}

#[async_trait]
impl AgentHandle for ResearcherAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&self, message: &AinxMessage) -> anyhow::Result<Option<AinxMessage>> {
        debug!(agent = %self.name, intent = %message.intent, "researcher received");
        if suppressed(&message.intent) {
            return Ok(None);
        }
        let reply = message.reply(
            &self.name,
            "RESEARCHER",
            "response",
            format!("Found info about '{}'", message.payload),
        )?;
        Ok(Some(reply))
    }
}

// ── Planner ─────────────────────────────────────────────────────────────────

/// Turns the message content into a (pretend) plan.
pub struct PlannerAgent {
    name: String,
}

impl PlannerAgent {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for PlannerAgent {
    fn default() -> Self {
        Self::new("planner")
    }
}

#[async_trait]
impl AgentHandle for PlannerAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&self, message: &AinxMessage) -> anyhow::Result<Option<AinxMessage>> {
        debug!(agent = %self.name, intent = %message.intent, "planner received");
        if suppressed(&message.intent) {
            return Ok(None);
        }
        let reply = message.reply(
            &self.name,
            "PLANNER",
            "response",
            format!("Created a step-by-step plan for '{}'", message.payload),
        )?;
        Ok(Some(reply))
    }
}

// ── Critic ──────────────────────────────────────────────────────────────────

/// Critiques whatever it is sent.
pub struct CriticAgent {
    name: String,
}

impl CriticAgent {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for CriticAgent {
    fn default() -> Self {
        Self::new("critic")
    }
}

#[async_trait]
impl AgentHandle for CriticAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&self, message: &AinxMessage) -> anyhow::Result<Option<AinxMessage>> {
        debug!(agent = %self.name, intent = %message.intent, "critic received");
        if suppressed(&message.intent) {
            return Ok(None);
        }
        let reply = message.reply(
            &self.name,
            "CRITIC",
            "response",
            format!(
                "Critique of '{}': looks solid, but consider edge cases.",
                message.payload
            ),
        )?;
        Ok(Some(reply))
    }
}

// ── Echo ────────────────────────────────────────────────────────────────────

/// Acknowledges every message, echoing intent and content back. The
/// reply keeps the incoming role tag so the sender can tell which
/// conversation the ack belongs to.
pub struct EchoAgent {
    name: String,
}

impl EchoAgent {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for EchoAgent {
    fn default() -> Self {
        Self::new("echo")
    }
}

#[async_trait]
impl AgentHandle for EchoAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn receive(&self, message: &AinxMessage) -> anyhow::Result<Option<AinxMessage>> {
        debug!(agent = %self.name, intent = %message.intent, "echo received");
        if suppressed(&message.intent) {
            return Ok(None);
        }
        let reply = message.reply(
            &self.name,
            &message.role,
            "ack",
            format!(
                "{} received intent: {} with content: {}",
                self.name, message.intent, message.payload
            ),
        )?;
        Ok(Some(reply))
    }
}

#[cfg(test)]
mod tests {
    use {super::*, ainx_protocol::Recipient};

    fn query() -> AinxMessage {
        AinxMessage::parse("human::ANALYST::ANALYST::QUERY::What is AINX?").unwrap()
    }

    #[tokio::test]
    async fn researcher_reports_a_lookup() {
        let agent = ResearcherAgent::default();
        let reply = agent.receive(&query()).await.unwrap().unwrap();
        assert_eq!(reply.sender, "researcher");
        assert_eq!(reply.recipient, Recipient::Agent("human".to_string()));
        assert_eq!(reply.role, "RESEARCHER");
        assert_eq!(reply.intent, "response");
        assert_eq!(
            reply.payload.to_string(),
            "Found info about 'What is AINX?'"
        );
    }

    #[tokio::test]
    async fn planner_reports_a_plan() {
        let agent = PlannerAgent::default();
        let reply = agent.receive(&query()).await.unwrap().unwrap();
        assert_eq!(reply.role, "PLANNER");
        assert_eq!(
            reply.payload.to_string(),
            "Created a step-by-step plan for 'What is AINX?'"
        );
    }

    #[tokio::test]
    async fn critic_reports_a_critique() {
        let agent = CriticAgent::default();
        let reply = agent.receive(&query()).await.unwrap().unwrap();
        assert_eq!(reply.role, "CRITIC");
        assert_eq!(
            reply.payload.to_string(),
            "Critique of 'What is AINX?': looks solid, but consider edge cases."
        );
    }

    #[tokio::test]
    async fn echo_acknowledges_with_incoming_role() {
        let agent = EchoAgent::new("echo-1");
        let reply = agent.receive(&query()).await.unwrap().unwrap();
        assert_eq!(reply.role, "ANALYST");
        assert_eq!(reply.intent, "ack");
        assert_eq!(
            reply.payload.to_string(),
            "echo-1 received intent: QUERY with content: What is AINX?"
        );
    }

    #[tokio::test]
    async fn ack_and_response_intents_are_never_answered() {
        let ack = AinxMessage::parse("a::b::R::ack::done").unwrap();
        let response = AinxMessage::parse("a::b::R::RESPONSE::data").unwrap();
        for agent in [
            Box::new(ResearcherAgent::default()) as Box<dyn AgentHandle>,
            Box::new(PlannerAgent::default()),
            Box::new(CriticAgent::default()),
            Box::new(EchoAgent::default()),
        ] {
            assert!(agent.receive(&ack).await.unwrap().is_none());
            assert!(agent.receive(&response).await.unwrap().is_none());
        }
    }

    #[tokio::test]
    async fn object_payload_renders_in_reply_text() {
        let msg = AinxMessage::parse("ANALYST::QUERY::SALES.region=EMEA").unwrap();
        let agent = ResearcherAgent::default();
        let reply = agent.receive(&msg).await.unwrap().unwrap();
        assert_eq!(
            reply.payload.to_string(),
            "Found info about 'SALES.region=EMEA'"
        );
    }
}
