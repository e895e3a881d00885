//! Lock-free connection state and counters
//!
//! Both types are shared between a connection's handles and the task
//! driving the transport, so every access is a single atomic operation.

use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Lifecycle of a persistent connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ConnectionState {
    /// Handshake in progress
    Connecting = 0,
    /// Handshake accepted, messages flow both ways
    Open = 1,
    /// Close requested, waiting for the transport to finish
    Closing = 2,
    /// Transport finished
    Closed = 3,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => ConnectionState::Connecting,
            1 => ConnectionState::Open,
            2 => ConnectionState::Closing,
            _ => ConnectionState::Closed,
        }
    }
}

/// Atomic wrapper around [`ConnectionState`]
#[derive(Debug)]
pub struct AtomicConnectionState {
    inner: AtomicU8,
}

impl AtomicConnectionState {
    pub fn new(state: ConnectionState) -> Self {
        Self {
            inner: AtomicU8::new(state as u8),
        }
    }

    #[inline]
    pub fn get(&self) -> ConnectionState {
        ConnectionState::from_u8(self.inner.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, state: ConnectionState) {
        self.inner.store(state as u8, Ordering::Release);
    }

    /// Move from `from` to `to`, failing if the current state is not `from`
    pub fn transition(&self, from: ConnectionState, to: ConnectionState) -> bool {
        self.inner
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Move to `Closing` from `Connecting` or `Open`
    ///
    /// Returns `false` when a close is already under way or finished.
    pub fn begin_closing(&self) -> bool {
        self.inner
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                if current >= ConnectionState::Closing as u8 {
                    None
                } else {
                    Some(ConnectionState::Closing as u8)
                }
            })
            .is_ok()
    }

    #[inline]
    pub fn is_connecting(&self) -> bool {
        self.get() == ConnectionState::Connecting
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.get() == ConnectionState::Open
    }

    #[inline]
    pub fn is_closing(&self) -> bool {
        self.get() == ConnectionState::Closing
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.get() == ConnectionState::Closed
    }
}

/// Message counters for one connection
#[derive(Debug, Default)]
pub struct AtomicMetrics {
    messages_sent: AtomicU64,
    messages_received: AtomicU64,
}

impl AtomicMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment_sent(&self) {
        self.messages_sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn increment_received(&self) {
        self.messages_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn messages_sent(&self) -> u64 {
        self.messages_sent.load(Ordering::Relaxed)
    }

    pub fn messages_received(&self) -> u64 {
        self.messages_received.load(Ordering::Relaxed)
    }
}
