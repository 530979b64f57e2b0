use serde::{Deserialize, Serialize};

/// Root config schema. Every section is optional in the file; missing
/// values fall back to the defaults below.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AinxConfig {
    pub router: RouterSettings,
    pub bus: BusSettings,
    pub agents: Vec<AgentEntry>,
    pub log: LogSettings,
}

impl Default for AinxConfig {
    fn default() -> Self {
        Self {
            router: RouterSettings::default(),
            bus: BusSettings::default(),
            agents: default_agents(),
            log: LogSettings::default(),
        }
    }
}

/// Router behavior toggles.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterSettings {
    /// Let a second `register` under an existing identifier replace it.
    pub allow_overwrite: bool,
    /// Make unregistering an unknown identifier an error.
    pub strict_unregister: bool,
}

/// Message bus bounds.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct BusSettings {
    pub max_queue: usize,
    pub history_limit: usize,
}

impl Default for BusSettings {
    fn default() -> Self {
        Self {
            max_queue: 1000,
            history_limit: 10_000,
        }
    }
}

/// One agent to register at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEntry {
    /// Identifier the agent is registered under (the routing key).
    pub id: String,
    pub kind: AgentKind,
    /// Broadcast role filter; empty matches every role.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Built-in personality selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKind {
    Researcher,
    Planner,
    Critic,
    Echo,
}

/// Logging defaults; CLI flags override these.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogSettings {
    pub level: String,
    pub json: bool,
}

impl Default for LogSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// The personality lineup registered when no `[[agents]]` section is
/// present.
fn default_agents() -> Vec<AgentEntry> {
    vec![
        AgentEntry {
            id: "ANALYST".to_string(),
            kind: AgentKind::Researcher,
            roles: Vec::new(),
        },
        AgentEntry {
            id: "PLANNER".to_string(),
            kind: AgentKind::Planner,
            roles: Vec::new(),
        },
        AgentEntry {
            id: "CRITIC".to_string(),
            kind: AgentKind::Critic,
            roles: Vec::new(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_include_personality_lineup() {
        let cfg = AinxConfig::default();
        assert_eq!(cfg.agents.len(), 3);
        assert_eq!(cfg.agents[0].id, "ANALYST");
        assert_eq!(cfg.agents[0].kind, AgentKind::Researcher);
        assert!(!cfg.router.allow_overwrite);
        assert_eq!(cfg.bus.max_queue, 1000);
        assert_eq!(cfg.log.level, "info");
    }

    #[test]
    fn explicit_agents_replace_the_default_lineup() {
        let cfg: AinxConfig = toml::from_str(
            r#"
            [[agents]]
            id = "ECHO"
            kind = "echo"
            roles = ["USER"]
            "#,
        )
        .unwrap();
        assert_eq!(cfg.agents.len(), 1);
        assert_eq!(cfg.agents[0].kind, AgentKind::Echo);
        assert_eq!(cfg.agents[0].roles, vec!["USER"]);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let cfg: AinxConfig = toml::from_str("[router]\nallow_overwrite = true\n").unwrap();
        assert!(cfg.router.allow_overwrite);
        assert!(!cfg.router.strict_unregister);
        assert_eq!(cfg.bus.history_limit, 10_000);
        assert_eq!(cfg.agents.len(), 3);
    }
}
