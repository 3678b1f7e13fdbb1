//! # Session Aggregator
//!
//! Bookkeeping over committed jumps: a bounded most-recent-first list for
//! display, the full chronological session list, and running counters.
//! Mutated only when the event builder emits; read by presentation;
//! cleared explicitly on session reset.

use std::collections::VecDeque;

use crate::event::JumpEvent;

/// Session-level jump aggregate.
///
/// # Examples
///
/// ```
/// use airtime::session::SessionAggregator;
///
/// let session = SessionAggregator::new(20);
/// assert_eq!(session.jump_count(), 0);
/// assert!(session.recent().is_empty());
/// ```
#[derive(Debug)]
pub struct SessionAggregator {
    /// Newest first, bounded; oldest evicted past capacity.
    recent: VecDeque<JumpEvent>,
    recent_capacity: usize,
    /// Strict chronological append, unbounded for the session.
    all: Vec<JumpEvent>,
    /// Largest absolute yaw seen this session (degrees).
    max_abs_rotation_deg: f64,
}

impl SessionAggregator {
    /// Creates an empty aggregator with the given recent-list capacity.
    #[must_use]
    pub fn new(recent_capacity: usize) -> Self {
        Self {
            recent: VecDeque::with_capacity(recent_capacity.max(1)),
            recent_capacity: recent_capacity.max(1),
            all: Vec::new(),
            max_abs_rotation_deg: 0.0,
        }
    }

    /// Records one committed jump. Events arrive in commit order, which
    /// is timestamp order.
    pub fn record(&mut self, event: JumpEvent) {
        if self.recent.len() == self.recent_capacity {
            self.recent.pop_back();
        }
        self.recent.push_front(event.clone());

        let rotation = event.yaw_degrees.abs();
        if rotation > self.max_abs_rotation_deg {
            self.max_abs_rotation_deg = rotation;
        }

        self.all.push(event);
    }

    /// Jumps newest-first, at most the configured capacity.
    #[must_use]
    pub fn recent(&self) -> &VecDeque<JumpEvent> {
        &self.recent
    }

    /// Every jump this session, chronological.
    #[must_use]
    pub fn all(&self) -> &[JumpEvent] {
        &self.all
    }

    /// Total committed jumps this session.
    #[must_use]
    pub fn jump_count(&self) -> usize {
        self.all.len()
    }

    /// Largest absolute rotation committed this session (degrees).
    #[must_use]
    pub fn max_rotation_degrees(&self) -> f64 {
        self.max_abs_rotation_deg
    }

    /// The most recently committed jump, if any.
    #[must_use]
    pub fn last_jump(&self) -> Option<&JumpEvent> {
        self.recent.front()
    }

    /// Clears all session state.
    pub fn clear(&mut self) {
        self.recent.clear();
        self.all.clear();
        self.max_abs_rotation_deg = 0.0;
    }
}
