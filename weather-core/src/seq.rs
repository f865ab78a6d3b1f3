/// Identifies one issued request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

/// Hands out increasing tickets; only the latest one is current.
#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    latest: u64,
}

impl RequestTracker {
    pub fn issue(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }

    /// Make every outstanding ticket stale without issuing a new request.
    pub fn invalidate(&mut self) {
        self.latest += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_latest_ticket_is_current() {
        let mut tracker = RequestTracker::default();
        let a = tracker.issue();
        let b = tracker.issue();

        assert!(!tracker.is_current(a));
        assert!(tracker.is_current(b));
        assert!(a < b);

        tracker.invalidate();
        assert!(!tracker.is_current(b));
    }
}
