//! Lifecycle of a single fetch.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchPhase {
    Idle,
    Requesting,
    AwaitingResponse,
    Reading,
    Decoding,
    ResolvingEncoding,
    Aborting,
    Done,
    Failed,
}

impl FetchPhase {
    pub fn is_terminal(self) -> bool {
        matches!(self, FetchPhase::Done | FetchPhase::Failed)
    }

    /// Whether `self -> next` is a legal step.
    pub fn can_transition_to(self, next: FetchPhase) -> bool {
        use FetchPhase::*;
        matches!(
            (self, next),
            (Idle, Requesting)
                | (Requesting, AwaitingResponse)
                | (AwaitingResponse, Reading)
                | (Reading, Decoding)
                | (Decoding, ResolvingEncoding)
                | (ResolvingEncoding, Done)
                | (Requesting, Aborting)
                | (AwaitingResponse, Aborting)
                | (Aborting, Failed)
                | (Reading, Failed)
                | (Decoding, Failed)
        )
    }
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchPhase::Idle => "idle",
            FetchPhase::Requesting => "requesting",
            FetchPhase::AwaitingResponse => "awaiting-response",
            FetchPhase::Reading => "reading",
            FetchPhase::Decoding => "decoding",
            FetchPhase::ResolvingEncoding => "resolving-encoding",
            FetchPhase::Aborting => "aborting",
            FetchPhase::Done => "done",
            FetchPhase::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Phase tracker for one fetch; logs every step at trace level.
#[derive(Debug)]
pub(crate) struct PhaseTracker {
    url: String,
    phase: FetchPhase,
}

impl PhaseTracker {
    pub(crate) fn new(url: &str) -> Self {
        Self {
            url: url.to_string(),
            phase: FetchPhase::Idle,
        }
    }

    pub(crate) fn current(&self) -> FetchPhase {
        self.phase
    }

    pub(crate) fn advance(&mut self, next: FetchPhase) {
        debug_assert!(
            self.phase.can_transition_to(next),
            "illegal fetch transition {} -> {}",
            self.phase,
            next
        );
        tracing::trace!(url = %self.url, from = %self.phase, to = %next, "fetch phase");
        self.phase = next;
    }

    /// Move to `Failed`, passing through `Aborting` when the transfer is
    /// still in flight.
    pub(crate) fn fail(&mut self) {
        if matches!(self.phase, FetchPhase::Requesting | FetchPhase::AwaitingResponse) {
            self.advance(FetchPhase::Aborting);
        }
        self.advance(FetchPhase::Failed);
    }
}
