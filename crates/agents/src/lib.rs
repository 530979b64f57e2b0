//! Built-in agent personalities.
//!
//! Each agent implements [`ainx_routing::AgentHandle`] and is otherwise
//! opaque to the router. All reply in directed form addressed back at
//! the message sender, and none answers an `ack` or `response` intent,
//! which keeps two agents from ping-ponging acknowledgments forever.

pub mod builtin;

pub use builtin::{CriticAgent, EchoAgent, PlannerAgent, ResearcherAgent};
