use crate::error::EventBusError;
use fxhash::FxHashMap;
use parking_lot::RwLock;
use std::any::{Any, TypeId};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tracing::trace;

/// A safe default for channel buffers.
/// 128 is usually enough for domain events in a vertical slice.
const DEFAULT_CAPACITY: usize = 128;
const MIN_CAPACITY: usize = 1;

/// Supported channel kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelKind {
    /// Broadcast (fan-out) semantics.
    Broadcast { capacity: usize },
    /// MPSC (queue) semantics with a single consumer.
    Queue { capacity: usize },
}

/// Marker trait for types that can be sent across the [`EventBus`].
///
/// Any type that is `Send + Sync + 'static` automatically implements this trait.
pub trait Event: Any + Send + Sync + 'static {}
impl<T: Any + Send + Sync + 'static> Event for T {}

struct BroadcastChannel<T> {
    sender: broadcast::Sender<Arc<T>>,
}

struct QueueChannel<T> {
    sender: mpsc::Sender<Arc<T>>,
    receiver: Option<mpsc::Receiver<Arc<T>>>,
}

struct ChannelState {
    kind: ChannelKind,
    slot: Box<dyn Any + Send + Sync>,
}

/// A type-safe, thread-safe event bus.
///
/// Channels are indexed by the [`TypeId`] of the event. Broadcast channels
/// fan events out to every subscriber; queue channels feed a single worker.
#[derive(Debug, Clone, Default)]
pub struct EventBus {
    channels: Arc<RwLock<FxHashMap<TypeId, ChannelState>>>,
}

impl EventBus {
    /// Creates a new, empty `EventBus`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes to an event of type `T` using broadcast with default capacity.
    ///
    /// # Errors
    /// Returns [`EventBusError::KindMismatch`] if a queue channel was
    /// already registered for `T`.
    pub fn subscribe<T: Event>(&self) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        self.subscribe_with_capacity::<T>(DEFAULT_CAPACITY)
    }

    /// Subscribes to an event of type `T` with a specific broadcast buffer capacity.
    ///
    /// # Errors
    /// Returns [`EventBusError::KindMismatch`] if a queue channel was
    /// already registered for `T`, or [`EventBusError::InvalidCapacity`]
    /// if `capacity` is zero.
    pub fn subscribe_with_capacity<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<broadcast::Receiver<Arc<T>>, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        let mut channels = self.channels.write();

        let state = channels.entry(TypeId::of::<T>()).or_insert_with(|| {
            let (sender, _) = broadcast::channel::<Arc<T>>(capacity);
            ChannelState {
                kind: ChannelKind::Broadcast { capacity },
                slot: Box::new(BroadcastChannel { sender }),
            }
        });

        let channel = state
            .slot
            .downcast_ref::<BroadcastChannel<T>>()
            .ok_or_else(|| kind_mismatch::<T>(state.kind))?;

        Ok(channel.sender.subscribe())
    }

    /// Subscribes to a bounded queue channel (single-consumer semantics).
    ///
    /// The receiver can be taken exactly once; workers own it for the
    /// lifetime of the process.
    ///
    /// # Errors
    /// Returns [`EventBusError::KindMismatch`] if a broadcast channel was
    /// already registered for `T`, [`EventBusError::ReceiverTaken`] if the
    /// receiver was already handed out, or
    /// [`EventBusError::InvalidCapacity`] if `capacity` is zero.
    pub fn subscribe_queue<T: Event>(
        &self,
        capacity: usize,
    ) -> Result<mpsc::Receiver<Arc<T>>, EventBusError> {
        let capacity = validate_capacity(capacity)?;
        let mut channels = self.channels.write();

        let state = channels.entry(TypeId::of::<T>()).or_insert_with(|| {
            let (sender, receiver) = mpsc::channel::<Arc<T>>(capacity);
            ChannelState {
                kind: ChannelKind::Queue { capacity },
                slot: Box::new(QueueChannel { sender, receiver: Some(receiver) }),
            }
        });

        let registered = state.kind;
        let channel = state
            .slot
            .downcast_mut::<QueueChannel<T>>()
            .ok_or_else(|| kind_mismatch::<T>(registered))?;

        channel.receiver.take().ok_or_else(|| EventBusError::ReceiverTaken {
            message: std::any::type_name::<T>().into(),
            context: Some("Queue receiver can only be taken once".into()),
        })
    }

    /// Publishes an event via its registered channel.
    ///
    /// Broadcast publishing is lossy when no subscriber exists; queue
    /// publishing uses `try_send` and surfaces a full queue as an error.
    ///
    /// Returns the number of receivers that observed the event.
    ///
    /// # Errors
    /// Returns [`EventBusError::KindMismatch`] on channel type conflicts
    /// and [`EventBusError::Internal`] when a queue is full or closed.
    pub fn publish<T: Event>(&self, event: T) -> Result<usize, EventBusError> {
        self.publish_arc(Arc::new(event))
    }

    /// Publishes a shared event instance without re-wrapping.
    ///
    /// # Errors
    /// See [`EventBus::publish`].
    pub fn publish_arc<T: Event>(&self, event: Arc<T>) -> Result<usize, EventBusError> {
        let channels = self.channels.read();

        let Some(state) = channels.get(&TypeId::of::<T>()) else {
            trace!(event = std::any::type_name::<T>(), "No channel registered, event dropped");
            return Ok(0);
        };

        if let Some(channel) = state.slot.downcast_ref::<BroadcastChannel<T>>() {
            // A broadcast with zero receivers is not an error.
            return Ok(channel.sender.send(event).unwrap_or(0));
        }

        if let Some(channel) = state.slot.downcast_ref::<QueueChannel<T>>() {
            channel.sender.try_send(event).map_err(|e| EventBusError::Internal {
                message: e.to_string().into(),
                context: Some("Queue publish failed".into()),
            })?;
            return Ok(1);
        }

        Err(EventBusError::TypeMismatch {
            message: std::any::type_name::<T>().into(),
            context: Some("Unexpected event type".into()),
        })
    }

    /// Number of registered channels, for diagnostics.
    #[must_use]
    pub fn channel_count(&self) -> usize {
        self.channels.read().len()
    }
}

impl std::fmt::Debug for ChannelState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelState").field("kind", &self.kind).finish_non_exhaustive()
    }
}

fn kind_mismatch<T>(kind: ChannelKind) -> EventBusError {
    EventBusError::KindMismatch {
        message: std::any::type_name::<T>().into(),
        context: Some(format!("Registered as {kind:?}").into()),
    }
}

fn validate_capacity(capacity: usize) -> Result<usize, EventBusError> {
    if capacity < MIN_CAPACITY {
        return Err(EventBusError::InvalidCapacity {
            message: format!("Capacity must be at least {MIN_CAPACITY}").into(),
            context: None,
        });
    }
    Ok(capacity)
}
