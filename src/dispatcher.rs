//! Frame dispatch state machine.
//!
//! Tracks whether dispatch is active, which frame token was processed last,
//! and the single in-flight detection slot. Results that complete after a
//! stop (or after a restart) belong to an old epoch and are discarded.

use crate::sources::{FrameToken, SourceKind};

/// Dispatcher activity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Idle,
    Active(SourceKind),
}

/// Claim on the in-flight slot for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a ticket must be completed to free the in-flight slot"]
pub struct Ticket {
    token: FrameToken,
    epoch: u64,
}

impl Ticket {
    #[must_use]
    pub fn token(&self) -> FrameToken {
        self.token
    }
}

/// Answer to a request to process a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Process the frame, then complete the ticket
    Admit(Ticket),
    /// Dispatcher is idle
    Inactive,
    /// A detection is already in flight
    Busy,
    /// Same token as the last processed frame
    Duplicate,
}

/// Idle/Active state machine with token dedupe and a single in-flight slot
#[derive(Debug, Clone)]
pub struct FrameDispatcher {
    state: DispatchState,
    epoch: u64,
    last_token: Option<FrameToken>,
    in_flight: Option<Ticket>,
}

impl FrameDispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: DispatchState::Idle,
            epoch: 0,
            last_token: None,
            in_flight: None,
        }
    }

    #[must_use]
    pub fn state(&self) -> DispatchState {
        self.state
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self.state, DispatchState::Active(_))
    }

    /// Kind of the active source, if any
    #[must_use]
    pub fn source_kind(&self) -> Option<SourceKind> {
        match self.state {
            DispatchState::Active(kind) => Some(kind),
            DispatchState::Idle => None,
        }
    }

    #[must_use]
    pub fn last_token(&self) -> Option<FrameToken> {
        self.last_token
    }

    #[must_use]
    pub fn in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Enter `Active` for a new source session
    pub fn start(&mut self, kind: SourceKind) {
        self.epoch += 1;
        self.last_token = None;
        self.state = DispatchState::Active(kind);
    }

    /// Return to `Idle`; a pending detection will be discarded on completion
    pub fn stop(&mut self) {
        self.state = DispatchState::Idle;
    }

    /// Ask to process the frame identified by `token`
    pub fn begin(&mut self, token: FrameToken) -> Admission {
        if !self.is_active() {
            return Admission::Inactive;
        }
        if self.in_flight.is_some() {
            return Admission::Busy;
        }
        if self.last_token == Some(token) {
            return Admission::Duplicate;
        }

        self.last_token = Some(token);
        let ticket = Ticket {
            token,
            epoch: self.epoch,
        };
        self.in_flight = Some(ticket);
        Admission::Admit(ticket)
    }

    /// Release the slot held by `ticket`
    ///
    /// Returns `true` when the result may be applied: the dispatcher is still
    /// active in the same session that issued the ticket.
    pub fn complete(&mut self, ticket: Ticket) -> bool {
        if self.in_flight == Some(ticket) {
            self.in_flight = None;
        }
        self.is_active() && ticket.epoch == self.epoch
    }

    /// Back to idle with no token history
    ///
    /// A detection still in flight keeps the slot until it completes; its
    /// result belongs to the old epoch and is discarded.
    pub fn reset(&mut self) {
        self.state = DispatchState::Idle;
        self.epoch += 1;
        self.last_token = None;
    }
}

impl Default for FrameDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admit(d: &mut FrameDispatcher, n: u64) -> Ticket {
        match d.begin(FrameToken::sequence(n)) {
            Admission::Admit(t) => t,
            other => panic!("Expected admission, got {other:?}"),
        }
    }

    #[test]
    fn test_idle_rejects() {
        let mut d = FrameDispatcher::new();
        assert_eq!(d.begin(FrameToken::sequence(1)), Admission::Inactive);
    }

    #[test]
    fn test_dedupe_and_single_slot() {
        let mut d = FrameDispatcher::new();
        d.start(SourceKind::Video);

        let t1 = admit(&mut d, 1);
        assert_eq!(d.begin(FrameToken::sequence(2)), Admission::Busy);
        assert!(d.complete(t1));

        assert_eq!(d.begin(FrameToken::sequence(1)), Admission::Duplicate);
        let t2 = admit(&mut d, 2);
        assert_eq!(t2.token(), FrameToken::sequence(2));
        assert!(d.complete(t2));
        assert!(!d.in_flight());
    }

    #[test]
    fn test_late_result_after_stop_discarded() {
        let mut d = FrameDispatcher::new();
        d.start(SourceKind::Camera);
        let t = admit(&mut d, 1);
        d.stop();
        assert!(!d.complete(t));
        assert!(!d.in_flight());
    }

    #[test]
    fn test_late_result_after_restart_discarded() {
        let mut d = FrameDispatcher::new();
        d.start(SourceKind::Camera);
        let stale = admit(&mut d, 1);
        d.stop();
        d.start(SourceKind::Video);
        // The old detection still occupies the slot until it resolves
        assert_eq!(d.begin(FrameToken::sequence(5)), Admission::Busy);
        assert!(!d.complete(stale));
        let fresh = admit(&mut d, 5);
        assert!(d.complete(fresh));
    }

    #[test]
    fn test_reset_keeps_in_flight_slot() {
        let mut d = FrameDispatcher::new();
        d.start(SourceKind::Camera);
        let stale = admit(&mut d, 1);
        d.reset();
        assert!(d.in_flight());
        assert_eq!(d.last_token(), None);

        d.start(SourceKind::Camera);
        assert_eq!(d.begin(FrameToken::sequence(2)), Admission::Busy);
        assert!(!d.complete(stale));
        assert!(!d.in_flight());
        let fresh = admit(&mut d, 2);
        assert!(d.complete(fresh));
    }

    #[test]
    fn test_restart_forgets_last_token() {
        let mut d = FrameDispatcher::new();
        d.start(SourceKind::Video);
        let t = admit(&mut d, 3);
        assert!(d.complete(t));
        d.start(SourceKind::Video);
        let again = admit(&mut d, 3);
        assert!(d.complete(again));
    }
}
