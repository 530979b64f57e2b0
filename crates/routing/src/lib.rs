//! Route parsed AINX messages to registered agents.
//!
//! Dispatch rules (in order):
//! 1. Directed recipient — exact identifier match, error when absent
//! 2. Broadcast recipient — every registration whose role filter
//!    matches the message role, skipping the sender's own registration
//!
//! Within one dispatch, deliveries are collected in registration order
//! and a failing handle never aborts its siblings.

pub mod agent;
pub mod error;
pub mod router;

pub use {
    agent::AgentHandle,
    error::{Error, Result},
    router::{Delivery, DeliveryError, DispatchResult, Router, RouterConfig},
};
