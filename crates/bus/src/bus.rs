use std::{
    collections::{HashMap, VecDeque},
    sync::atomic::{AtomicBool, AtomicU64, Ordering},
};

use {
    ainx_protocol::{AinxMessage, Recipient},
    serde::Serialize,
    tokio::sync::{Mutex, mpsc},
    tracing::{debug, info, warn},
    uuid::Uuid,
};

use crate::error::{Error, Result};

/// Capacity of each subscriber's notification channel. A subscriber
/// that falls further behind than this loses notifications (the
/// messages stay in its queue).
const SUBSCRIBER_CAPACITY: usize = 32;

/// Bus bounds, matching the original protocol's defaults.
#[derive(Debug, Clone, Copy)]
pub struct BusConfig {
    /// Per-agent queue bound; the oldest entry is dropped on overflow.
    pub max_queue: usize,
    /// History ring bound.
    pub history_limit: usize,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            max_queue: 1000,
            history_limit: 10_000,
        }
    }
}

/// A message stamped by the bus on its way in.
#[derive(Debug, Clone, Serialize)]
pub struct QueuedMessage {
    pub id: Uuid,
    pub received_at_ms: u64,
    pub message: AinxMessage,
}

/// Point-in-time delivery counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BusStats {
    pub messages_sent: u64,
    pub messages_delivered: u64,
    pub failed_deliveries: u64,
    pub attached_agents: usize,
    pub queued: usize,
}

#[derive(Default)]
struct BusState {
    queues: HashMap<String, VecDeque<QueuedMessage>>,
    subscribers: HashMap<String, Vec<mpsc::Sender<QueuedMessage>>>,
    history: VecDeque<QueuedMessage>,
}

/// In-process message bus: bounded per-agent queues, bounded history,
/// push subscriptions. Broadcast sends reach every attached queue
/// except the sender's own.
pub struct MessageBus {
    config: BusConfig,
    running: AtomicBool,
    sent: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    state: Mutex<BusState>,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new(BusConfig::default())
    }
}

impl MessageBus {
    #[must_use]
    pub fn new(config: BusConfig) -> Self {
        Self {
            config,
            running: AtomicBool::new(false),
            sent: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            state: Mutex::new(BusState::default()),
        }
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
        info!("message bus started");
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
        info!("message bus stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Create an empty queue for an agent so broadcasts reach it before
    /// it has received any direct message.
    pub async fn attach(&self, agent_id: &str) {
        let mut state = self.state.lock().await;
        state.queues.entry(agent_id.to_string()).or_default();
        debug!(agent = agent_id, "attached to bus");
    }

    /// Stamp a message with an id and timestamp, record it in history,
    /// and route it: direct sends to the recipient's queue (created on
    /// demand), broadcasts to every attached queue except the sender's.
    pub async fn send(&self, message: AinxMessage) -> Result<QueuedMessage> {
        if !self.is_running() {
            return Err(Error::NotRunning);
        }

        let queued = QueuedMessage {
            id: Uuid::new_v4(),
            received_at_ms: now_ms(),
            message,
        };
        debug!(
            id = %queued.id,
            sender = %queued.message.sender,
            recipient = %queued.message.recipient,
            intent = %queued.message.intent,
            "bus send"
        );

        let mut state = self.state.lock().await;
        state.history.push_back(queued.clone());
        while state.history.len() > self.config.history_limit {
            state.history.pop_front();
        }

        match queued.message.recipient.clone() {
            Recipient::Agent(id) => self.enqueue(&mut state, id, queued.clone()),
            Recipient::Broadcast => {
                let targets: Vec<String> = state
                    .queues
                    .keys()
                    .filter(|id| **id != queued.message.sender)
                    .cloned()
                    .collect();
                for target in targets {
                    self.enqueue(&mut state, target, queued.clone());
                }
            },
        }

        self.sent.fetch_add(1, Ordering::Relaxed);
        Ok(queued)
    }

    fn enqueue(&self, state: &mut BusState, agent_id: String, message: QueuedMessage) {
        // Push notifications first; a full or closed subscriber never
        // blocks the send path.
        if let Some(subscribers) = state.subscribers.get_mut(&agent_id) {
            subscribers.retain(|tx| match tx.try_send(message.clone()) {
                Ok(()) => true,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    warn!(agent = %agent_id, "subscriber channel full, notification dropped");
                    self.failed.fetch_add(1, Ordering::Relaxed);
                    true
                },
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    debug!(agent = %agent_id, "subscriber gone, removing");
                    false
                },
            });
        }

        let queue = state.queues.entry(agent_id).or_default();
        if queue.len() >= self.config.max_queue {
            queue.pop_front();
            self.failed.fetch_add(1, Ordering::Relaxed);
        }
        queue.push_back(message);
        self.delivered.fetch_add(1, Ordering::Relaxed);
    }

    /// Remove and return everything queued for an agent.
    pub async fn drain(&self, agent_id: &str) -> Vec<QueuedMessage> {
        let mut state = self.state.lock().await;
        state
            .queues
            .get_mut(agent_id)
            .map(|queue| queue.drain(..).collect())
            .unwrap_or_default()
    }

    /// Copy everything queued for an agent without removing it.
    pub async fn peek(&self, agent_id: &str) -> Vec<QueuedMessage> {
        let state = self.state.lock().await;
        state
            .queues
            .get(agent_id)
            .map(|queue| queue.iter().cloned().collect())
            .unwrap_or_default()
    }

    pub async fn queue_len(&self, agent_id: &str) -> usize {
        let state = self.state.lock().await;
        state.queues.get(agent_id).map_or(0, VecDeque::len)
    }

    /// Drop everything queued for an agent.
    pub async fn clear(&self, agent_id: &str) {
        let mut state = self.state.lock().await;
        if let Some(queue) = state.queues.get_mut(agent_id) {
            queue.clear();
        }
        debug!(agent = agent_id, "cleared queue");
    }

    /// Subscribe to push notifications for an agent. Also attaches the
    /// agent's queue. The receiver observes every message enqueued for
    /// the agent while it keeps up.
    pub async fn subscribe(&self, agent_id: &str) -> mpsc::Receiver<QueuedMessage> {
        let (tx, rx) = mpsc::channel(SUBSCRIBER_CAPACITY);
        let mut state = self.state.lock().await;
        state.queues.entry(agent_id.to_string()).or_default();
        state
            .subscribers
            .entry(agent_id.to_string())
            .or_default()
            .push(tx);
        debug!(agent = agent_id, "subscribed");
        rx
    }

    /// The most recent `limit` messages seen by the bus, oldest first.
    pub async fn history(&self, limit: usize) -> Vec<QueuedMessage> {
        let state = self.state.lock().await;
        let skip = state.history.len().saturating_sub(limit);
        state.history.iter().skip(skip).cloned().collect()
    }

    pub async fn stats(&self) -> BusStats {
        let state = self.state.lock().await;
        BusStats {
            messages_sent: self.sent.load(Ordering::Relaxed),
            messages_delivered: self.delivered.load(Ordering::Relaxed),
            failed_deliveries: self.failed.load(Ordering::Relaxed),
            attached_agents: state.queues.len(),
            queued: state.queues.values().map(VecDeque::len).sum(),
        }
    }
}

fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(config: BusConfig) -> MessageBus {
        let bus = MessageBus::new(config);
        bus.start();
        bus
    }

    fn directed(to: &str, content: &str) -> AinxMessage {
        AinxMessage::parse(&format!("human::{to}::USER::QUERY::{content}")).unwrap()
    }

    #[tokio::test]
    async fn send_on_stopped_bus_fails() {
        let bus = MessageBus::default();
        let err = bus.send(directed("a", "hi")).await.unwrap_err();
        assert!(matches!(err, Error::NotRunning));

        bus.start();
        bus.send(directed("a", "hi")).await.unwrap();
        bus.stop();
        assert!(bus.send(directed("a", "hi")).await.is_err());
    }

    #[tokio::test]
    async fn direct_send_queues_for_recipient_and_drain_empties() {
        let bus = started(BusConfig::default());
        bus.send(directed("researcher", "first")).await.unwrap();
        bus.send(directed("researcher", "second")).await.unwrap();

        assert_eq!(bus.queue_len("researcher").await, 2);
        let drained = bus.drain("researcher").await;
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message.payload.to_string(), "first");
        assert_eq!(drained[1].message.payload.to_string(), "second");
        assert_eq!(bus.queue_len("researcher").await, 0);
    }

    #[tokio::test]
    async fn peek_does_not_remove() {
        let bus = started(BusConfig::default());
        bus.send(directed("a", "x")).await.unwrap();
        assert_eq!(bus.peek("a").await.len(), 1);
        assert_eq!(bus.queue_len("a").await, 1);
    }

    #[tokio::test]
    async fn broadcast_reaches_attached_queues_except_sender() {
        let bus = started(BusConfig::default());
        bus.attach("human").await;
        bus.attach("researcher").await;
        bus.attach("planner").await;

        let msg = AinxMessage::parse("human::broadcast::USER::notice::all hands").unwrap();
        bus.send(msg).await.unwrap();

        assert_eq!(bus.queue_len("human").await, 0);
        assert_eq!(bus.queue_len("researcher").await, 1);
        assert_eq!(bus.queue_len("planner").await, 1);
    }

    #[tokio::test]
    async fn overflow_drops_oldest_and_counts_it() {
        let bus = started(BusConfig {
            max_queue: 2,
            ..BusConfig::default()
        });
        bus.send(directed("a", "one")).await.unwrap();
        bus.send(directed("a", "two")).await.unwrap();
        bus.send(directed("a", "three")).await.unwrap();

        let drained = bus.drain("a").await;
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].message.payload.to_string(), "two");
        assert_eq!(drained[1].message.payload.to_string(), "three");
        assert_eq!(bus.stats().await.failed_deliveries, 1);
    }

    #[tokio::test]
    async fn subscriber_receives_push_notification() {
        let bus = started(BusConfig::default());
        let mut rx = bus.subscribe("researcher").await;

        bus.send(directed("researcher", "ping")).await.unwrap();
        let notified = rx.recv().await.unwrap();
        assert_eq!(notified.message.payload.to_string(), "ping");
        // The message is still queued for pull consumers.
        assert_eq!(bus.queue_len("researcher").await, 1);
    }

    #[tokio::test]
    async fn dropped_subscriber_is_pruned_without_failing_send() {
        let bus = started(BusConfig::default());
        let rx = bus.subscribe("a").await;
        drop(rx);

        bus.send(directed("a", "still works")).await.unwrap();
        assert_eq!(bus.queue_len("a").await, 1);
    }

    #[tokio::test]
    async fn history_is_bounded_and_most_recent() {
        let bus = started(BusConfig {
            history_limit: 3,
            ..BusConfig::default()
        });
        for i in 0..5 {
            bus.send(directed("a", &format!("m{i}"))).await.unwrap();
        }
        let history = bus.history(10).await;
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].message.payload.to_string(), "m2");
        assert_eq!(history[2].message.payload.to_string(), "m4");

        let last_two = bus.history(2).await;
        assert_eq!(last_two[0].message.payload.to_string(), "m3");
    }

    #[tokio::test]
    async fn stats_reflect_traffic() {
        let bus = started(BusConfig::default());
        bus.attach("x").await;
        bus.attach("y").await;
        bus.send(directed("x", "direct")).await.unwrap();
        bus.send(AinxMessage::parse("human::broadcast::USER::notice::hi").unwrap())
            .await
            .unwrap();

        let stats = bus.stats().await;
        assert_eq!(stats.messages_sent, 2);
        assert_eq!(stats.messages_delivered, 3); // 1 direct + 2 broadcast copies
        assert_eq!(stats.failed_deliveries, 0);
        assert_eq!(stats.attached_agents, 2);
        assert_eq!(stats.queued, 3);
    }
}
