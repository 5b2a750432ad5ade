/// Why an attempt counted as a failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Response received with status >= 400
    Status(u16),
    /// No response within the per-request timeout
    Timeout,
    /// Connection refused, DNS or TLS handshake failure
    Connect,
    /// Read/write failure after the connection was up
    Io,
    /// Malformed response, redirect loop, undecodable body
    Protocol,
    /// Attempt task panicked or was cancelled before resolving
    Aborted,
}

/// Terminal result of exactly one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure(FailureKind),
}

impl Outcome {
    /// Status codes below 400 are successes, everything else a rejection.
    pub fn from_status(status: u16) -> Self {
        if status < 400 {
            Outcome::Success
        } else {
            Outcome::Failure(FailureKind::Status(status))
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            Outcome::Success => None,
            Outcome::Failure(kind) => Some(*kind),
        }
    }
}
