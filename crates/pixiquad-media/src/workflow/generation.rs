//! Monotonic generation counters for rejecting stale completions.

/// Identifies the upload and the request an async job belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    upload: u64,
    request: u64,
}

/// Outcome of handing a job result back to a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[must_use = "a stale completion means the result was discarded"]
pub enum Completion {
    /// The result was current and is now visible.
    Applied,
    /// The job was superseded; its result was dropped.
    Stale,
}

/// Counter pair owned by a session.
///
/// `upload` advances on every file selection (and teardown). `request`
/// advances on every user action that starts async work, including
/// uploads, so a request ticket from before an upload can never match.
#[derive(Debug, Default, Clone)]
pub(crate) struct Generations {
    upload: u64,
    request: u64,
}

impl Generations {
    pub(crate) const fn next_upload(&mut self) -> Ticket {
        self.upload += 1;
        self.request += 1;
        self.current()
    }

    pub(crate) const fn next_request(&mut self) -> Ticket {
        self.request += 1;
        self.current()
    }

    pub(crate) const fn current(&self) -> Ticket {
        Ticket {
            upload: self.upload,
            request: self.request,
        }
    }

    /// The ticket belongs to the live upload (requests may have moved on).
    pub(crate) const fn is_current_upload(&self, ticket: Ticket) -> bool {
        ticket.upload == self.upload
    }

    /// The ticket belongs to the live upload and the latest request.
    pub(crate) const fn is_current_request(&self, ticket: Ticket) -> bool {
        ticket.upload == self.upload && ticket.request == self.request
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_invalidates_older_requests() {
        let mut generations = Generations::default();
        let first_upload = generations.next_upload();
        let request = generations.next_request();
        assert!(generations.is_current_request(request));
        assert!(generations.is_current_upload(first_upload));
        assert!(!generations.is_current_request(first_upload));

        generations.next_upload();
        assert!(!generations.is_current_request(request));
        assert!(!generations.is_current_upload(first_upload));
    }

    #[test]
    fn tickets_never_repeat() {
        let mut generations = Generations::default();
        let mut seen = std::collections::HashSet::new();
        for i in 0..50 {
            let ticket = if i % 3 == 0 {
                generations.next_upload()
            } else {
                generations.next_request()
            };
            assert!(seen.insert(ticket), "duplicate ticket {ticket:?}");
        }
    }
}
