//! Queue-based in-process message bus.
//!
//! Complements the router's immediate dispatch with a pull model:
//! `send` stamps and enqueues, agents `drain` their queue (or
//! `subscribe` for push notifications). Queues and history are bounded,
//! delivery counters are atomic, and a stopped bus refuses traffic.

pub mod bus;
pub mod error;

pub use {
    bus::{BusConfig, BusStats, MessageBus, QueuedMessage},
    error::{Error, Result},
};
