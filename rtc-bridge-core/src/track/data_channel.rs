use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;

use crate::boundary::callback_gate::{GateTransition, SubscriberGate};
use crate::boundary::native_handle::NativeHandle;
use crate::boundary::token_registry::{self, WrapperToken};
use crate::models::channel::{BufferingLevel, DataChannelState};
use crate::models::config::BridgeConfiguration;
use crate::models::error::BridgeError;
use crate::traits::channel_events::{DataChannelEvents, MessageListener};
use crate::traits::media_engine::{ForeignHandle, MediaEngine};

/// Host-side wrapper around a native data channel.
///
/// Tracks the connection lifecycle (monotonic `Connecting → Open → Closing
/// → Closed`), enforces send preconditions, and relays the engine's
/// buffering notifications so the application can throttle before the send
/// buffer fills.
///
/// `send` never blocks: a successful call only hands the payload to the
/// engine's send buffer for asynchronous drain.
pub struct DataChannel {
    engine: Arc<dyn MediaEngine>,
    handle: NativeHandle,
    token: Mutex<Option<WrapperToken>>,
    label: String,
    state: Mutex<DataChannelState>,
    /// Last backlog value reported by the engine; becomes `previous` in the
    /// next buffering notification.
    buffered: Mutex<u64>,
    limit: u64,
    events: Mutex<Option<Arc<dyn DataChannelEvents>>>,
    listeners: Mutex<Vec<(u64, MessageListener)>>,
    next_listener_id: AtomicU64,
    message_gate: SubscriberGate,
}

impl DataChannel {
    /// Wrap a native channel and register lifecycle callbacks.
    ///
    /// The message callback is not registered here; it is installed lazily
    /// by the first `add_message_listener` and removed with the last.
    pub fn attach(
        engine: Arc<dyn MediaEngine>,
        channel: ForeignHandle,
        label: impl Into<String>,
        config: &BridgeConfiguration,
    ) -> Result<Arc<Self>, BridgeError> {
        config.validate().map_err(BridgeError::ConfigurationFailed)?;

        let dc = Arc::new(Self {
            engine: Arc::clone(&engine),
            handle: NativeHandle::new(Arc::clone(&engine), channel),
            token: Mutex::new(None),
            label: label.into(),
            state: Mutex::new(DataChannelState::Connecting),
            buffered: Mutex::new(0),
            limit: config.send_buffer_limit,
            events: Mutex::new(None),
            listeners: Mutex::new(Vec::new()),
            next_listener_id: AtomicU64::new(1),
            message_gate: SubscriberGate::new(),
        });

        let token = token_registry::global().register(Arc::clone(&dc));
        *dc.token.lock() = Some(token);
        engine.set_channel_state_sink(channel, token, Self::on_native_state);
        engine.set_channel_buffering_sink(channel, token, Self::on_native_buffering);
        Ok(dc)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Most recent state transition; updated before its notification fires.
    pub fn state(&self) -> DataChannelState {
        *self.state.lock()
    }

    /// Current unsent-byte backlog.
    pub fn buffered_amount(&self) -> u64 {
        match self.handle.get() {
            Ok(channel) => self.engine.channel_buffered_amount(channel),
            Err(_) => 0,
        }
    }

    pub fn send_buffer_limit(&self) -> u64 {
        self.limit
    }

    /// Replace the event delegate for state and buffering notifications.
    pub fn set_events(&self, events: Arc<dyn DataChannelEvents>) {
        *self.events.lock() = Some(events);
    }

    /// Enqueue a payload into the engine's send buffer.
    ///
    /// Fails with `ChannelNotOpen` unless the channel is `Open` — without
    /// touching the engine — and with `SendBufferFull` when the payload
    /// would push the backlog past the configured limit.
    pub fn send(&self, payload: &[u8]) -> Result<(), BridgeError> {
        if !self.state.lock().is_open() {
            return Err(BridgeError::ChannelNotOpen);
        }
        let channel = self.handle.get()?;

        let backlog = self.engine.channel_buffered_amount(channel);
        if backlog.saturating_add(payload.len() as u64) > self.limit {
            return Err(BridgeError::SendBufferFull);
        }
        self.engine.channel_send(channel, payload)
    }

    /// Subscribe to incoming messages.
    ///
    /// The engine-side message callback is registered when the listener
    /// count goes 0 → 1.
    pub fn add_message_listener(&self, listener: MessageListener) -> Result<u64, BridgeError> {
        let channel = self.handle.get()?;
        let token = (*self.token.lock()).ok_or(BridgeError::ResourceClosed)?;

        let id = self.next_listener_id.fetch_add(1, Ordering::Relaxed);
        let mut listeners = self.listeners.lock();
        listeners.push((id, listener));
        if self.message_gate.subscribe() == GateTransition::Activated {
            self.engine.set_channel_message_sink(channel, token, Self::on_native_message);
        }
        Ok(id)
    }

    /// Drop a message subscription; unregisters the engine callback when
    /// the count goes 1 → 0. Unknown ids are ignored.
    pub fn remove_message_listener(&self, id: u64) {
        let mut listeners = self.listeners.lock();
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        if listeners.len() == before {
            return;
        }
        if self.message_gate.unsubscribe() == GateTransition::Deactivated {
            if let Ok(channel) = self.handle.get() {
                self.engine.clear_channel_message_sink(channel);
            }
        }
    }

    /// Ask the engine to close the channel and tear down the wrapper.
    ///
    /// Teardown order: engine callbacks cleared, token revoked, then the
    /// native reference released. Idempotent.
    pub fn close(&self) {
        let Some(token) = self.token.lock().take() else {
            return;
        };
        if let Ok(channel) = self.handle.get() {
            self.engine.clear_channel_sinks(channel);
            self.engine.channel_close(channel);
        }
        token_registry::global().unregister(token);
        self.handle.release();

        let mut state = self.state.lock();
        if !state.is_terminal() {
            *state = DataChannelState::Closed;
        }
    }

    pub fn is_closed(&self) -> bool {
        self.handle.is_closed()
    }

    // --- Engine-facing trampolines ---

    fn on_native_state(token: WrapperToken, state: DataChannelState) {
        match token_registry::global().resolve::<DataChannel>(token) {
            Ok(dc) => dc.apply_state(state),
            Err(_) => log::trace!("state event for stale channel token {}", token.raw()),
        }
    }

    fn on_native_buffering(token: WrapperToken, current: u64) {
        match token_registry::global().resolve::<DataChannel>(token) {
            Ok(dc) => dc.apply_buffering(current),
            Err(_) => log::trace!("buffering event for stale channel token {}", token.raw()),
        }
    }

    fn on_native_message(token: WrapperToken, payload: &[u8]) {
        match token_registry::global().resolve::<DataChannel>(token) {
            Ok(dc) => dc.deliver_message(payload),
            Err(_) => log::trace!("message for stale channel token {}", token.raw()),
        }
    }

    fn apply_state(&self, next: DataChannelState) {
        {
            let mut state = self.state.lock();
            if !state.can_transition_to(next) {
                log::warn!(
                    "data channel '{}': ignoring out-of-order transition {:?} -> {:?}",
                    self.label,
                    *state,
                    next
                );
                return;
            }
            *state = next;
        }
        // Notified with no lock held; `state()` already reflects the
        // transition when the handler runs, and the handler may call back
        // into this channel.
        let events = self.events.lock().clone();
        if let Some(events) = events {
            events.on_state_changed(next);
        }
    }

    fn apply_buffering(&self, current: u64) {
        let previous = std::mem::replace(&mut *self.buffered.lock(), current);
        let events = self.events.lock().clone();
        if let Some(events) = events {
            events.on_buffering_changed(BufferingLevel {
                previous,
                current,
                limit: self.limit,
            });
        }
    }

    fn deliver_message(&self, payload: &[u8]) {
        let listeners: Vec<MessageListener> = self
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener(payload);
        }
    }
}
