//! In-process topic for inbound payloads
//!
//! A `Topic` bridges an mpsc queue into a tokio broadcast channel through a
//! dispatcher task. Publishers reserve space against a byte budget before
//! enqueueing, so a slow or stalled consumer surfaces as `BufferFull`
//! backpressure at the transport edge instead of unbounded memory growth.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use thiserror::Error;
use tokio::sync::{broadcast, mpsc};

use super::constants::{DEFAULT_TOPIC_BUFFER_BYTES, DEFAULT_TOPIC_CHANNEL_CAPACITY};

/// Trait for messages that can be published to topics
pub trait TopicMessage: Clone + Send + 'static {
    /// Estimate message size in bytes for backpressure
    fn size_bytes(&self) -> usize;
}

/// Error type for topic operations
#[derive(Debug, Error)]
pub enum TopicError {
    /// Channel or dispatcher closed
    #[error("channel closed")]
    ChannelClosed,
    /// Byte budget exhausted (backpressure)
    #[error("buffer full")]
    BufferFull,
    /// Receiver lagged behind
    #[error("receiver lagged by {0} messages")]
    Lagged(u64),
}

impl From<broadcast::error::RecvError> for TopicError {
    fn from(err: broadcast::error::RecvError) -> Self {
        match err {
            broadcast::error::RecvError::Closed => TopicError::ChannelClosed,
            broadcast::error::RecvError::Lagged(n) => TopicError::Lagged(n),
        }
    }
}

/// Topic configuration
#[derive(Clone)]
pub struct TopicConfig {
    pub buffer_bytes: usize,
    pub channel_capacity: usize,
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            buffer_bytes: DEFAULT_TOPIC_BUFFER_BYTES,
            channel_capacity: DEFAULT_TOPIC_CHANNEL_CAPACITY,
        }
    }
}

/// Publisher handle - clone and share across producers
#[derive(Clone)]
pub struct Publisher<T: TopicMessage> {
    tx: mpsc::Sender<T>,
    buffer_bytes: Arc<AtomicUsize>,
    max_bytes: usize,
}

impl<T: TopicMessage> Publisher<T> {
    /// Publish message (returns error if buffer full)
    pub fn publish(&self, msg: T) -> Result<(), TopicError> {
        let msg_size = msg.size_bytes();

        // Atomic CAS to reserve buffer space
        loop {
            let current = self.buffer_bytes.load(Ordering::Relaxed);
            if current + msg_size > self.max_bytes {
                return Err(TopicError::BufferFull);
            }
            if self
                .buffer_bytes
                .compare_exchange(
                    current,
                    current + msg_size,
                    Ordering::SeqCst,
                    Ordering::Relaxed,
                )
                .is_ok()
            {
                break;
            }
        }

        self.tx.try_send(msg).map_err(|e| {
            self.buffer_bytes.fetch_sub(msg_size, Ordering::SeqCst);
            match e {
                mpsc::error::TrySendError::Full(_) => TopicError::BufferFull,
                mpsc::error::TrySendError::Closed(_) => TopicError::ChannelClosed,
            }
        })
    }
}

/// Subscriber handle
pub struct Subscriber<T: TopicMessage> {
    rx: broadcast::Receiver<T>,
}

impl<T: TopicMessage> Subscriber<T> {
    pub async fn recv(&mut self) -> Result<T, TopicError> {
        self.rx.recv().await.map_err(|e| e.into())
    }
}

/// A single in-process topic
///
/// The dispatcher task runs until every `Publisher` (including the one held
/// by the topic itself) is dropped.
pub struct Topic<T: TopicMessage> {
    broadcast_tx: broadcast::Sender<T>,
    publisher: Publisher<T>,
}

impl<T: TopicMessage> Topic<T> {
    pub fn new(name: &str, config: TopicConfig) -> Self {
        let (tx, mut rx) = mpsc::channel::<T>(config.channel_capacity);
        let (broadcast_tx, _) = broadcast::channel(config.channel_capacity);
        let buffer_bytes = Arc::new(AtomicUsize::new(0));

        let publisher = Publisher {
            tx,
            buffer_bytes: Arc::clone(&buffer_bytes),
            max_bytes: config.buffer_bytes,
        };

        let dispatch_tx = broadcast_tx.clone();
        let name = name.to_string();
        tokio::spawn(async move {
            while let Some(msg) = rx.recv().await {
                buffer_bytes.fetch_sub(msg.size_bytes(), Ordering::SeqCst);
                // Send errors mean no active subscribers
                let _ = dispatch_tx.send(msg);
            }
            tracing::debug!(topic = %name, "Topic dispatcher stopped");
        });

        Self {
            broadcast_tx,
            publisher,
        }
    }

    pub fn publisher(&self) -> Publisher<T> {
        self.publisher.clone()
    }

    pub fn subscribe(&self) -> Subscriber<T> {
        Subscriber {
            rx: self.broadcast_tx.subscribe(),
        }
    }
}
