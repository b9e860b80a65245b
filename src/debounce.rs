use std::time::Duration;

/// Quiet period after the last keystroke before a search is issued.
pub const SEARCH_QUIET_PERIOD: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceTicket(u64);

/// A cancellable timer keyed by tickets: scheduling again supersedes the
/// pending ticket, and only the newest ticket fires.
#[derive(Debug, Clone)]
pub struct Debouncer {
    quiet_period: Duration,
    latest: u64,
    pending: bool,
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(SEARCH_QUIET_PERIOD)
    }
}

impl Debouncer {
    pub fn new(quiet_period: Duration) -> Self {
        Self {
            quiet_period,
            latest: 0,
            pending: false,
        }
    }

    pub fn quiet_period(&self) -> Duration {
        self.quiet_period
    }

    #[cfg(test)]
    pub fn is_pending(&self) -> bool {
        self.pending
    }

    pub fn schedule(&mut self) -> DebounceTicket {
        self.latest += 1;
        self.pending = true;
        DebounceTicket(self.latest)
    }

    pub fn cancel(&mut self) {
        self.pending = false;
    }

    /// Consumes the pending timer if `ticket` is still the newest one.
    pub fn fire(&mut self, ticket: DebounceTicket) -> bool {
        if !self.pending || ticket.0 != self.latest {
            return false;
        }
        self.pending = false;
        true
    }
}

pub async fn wait(ticket: DebounceTicket, quiet_period: Duration) -> DebounceTicket {
    tokio::time::sleep(quiet_period).await;
    ticket
}
