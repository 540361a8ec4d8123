//! Single-flight bookkeeping for list fetches.
//!
//! A controller asks the guard before starting a fetch. While one is in
//! flight, further triggers collapse into a single re-run flag; when the
//! fetch completes the controller re-runs once with whatever the query is
//! by then. The guard also owns the controller's lifetime token: after
//! teardown every completion is discarded and in-flight requests are aborted.

use std::future::Future;

use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// No fetch in flight; the caller must start one now.
    Start,
    /// A fetch is in flight; a re-run has been queued.
    Coalesced,
    /// The controller is torn down; nothing may start.
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Apply the result. If `rerun`, start one more fetch with the latest query.
    Apply { rerun: bool },
    /// Torn down while in flight; drop the result.
    Discard,
}

#[derive(Debug)]
pub struct FetchGuard {
    lifetime: CancellationToken,
    in_flight: bool,
    rerun: bool,
}

impl FetchGuard {
    pub fn new(lifetime: CancellationToken) -> Self {
        Self {
            lifetime,
            in_flight: false,
            rerun: false,
        }
    }

    pub fn lifetime(&self) -> &CancellationToken {
        &self.lifetime
    }

    pub fn is_alive(&self) -> bool {
        !self.lifetime.is_cancelled()
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn admit(&mut self) -> Admission {
        if !self.is_alive() {
            return Admission::Closed;
        }
        if self.in_flight {
            self.rerun = true;
            return Admission::Coalesced;
        }
        self.in_flight = true;
        Admission::Start
    }

    /// Release the in-flight slot after a fetch settles.
    pub fn complete(&mut self) -> Completion {
        self.in_flight = false;
        let rerun = std::mem::take(&mut self.rerun);
        if !self.is_alive() {
            return Completion::Discard;
        }
        Completion::Apply { rerun }
    }

    /// Drive `fut` until it finishes or the lifetime ends, whichever is first.
    pub fn abortable<F>(&self, fut: F) -> impl Future<Output = Option<F::Output>> + use<F>
    where
        F: Future,
    {
        let lifetime = self.lifetime.clone();
        async move {
            tokio::select! {
                biased;
                _ = lifetime.cancelled() => None,
                out = fut => Some(out),
            }
        }
    }
}
