use crate::fetcher::FetchError;
use std::time::Duration;

/// How a single GET ended.
#[derive(Debug)]
pub enum Outcome {
    /// The server answered; 4xx and 5xx land here too.
    Response {
        status: u16,
        content_length: Option<u64>,
    },
    /// No HTTP response: DNS, connect, TLS, timeout or cancellation.
    Failed(FetchError),
}

/// One per claimed URL, produced by a worker and consumed by the collator.
#[derive(Debug)]
pub struct FetchResult {
    /// Exactly as read from the input line (after trimming).
    pub url: String,
    pub outcome: Outcome,
    /// Wall-clock time of the GET including body drain.
    pub duration: Duration,
}

impl FetchResult {
    pub fn response(url: String, status: u16, content_length: Option<u64>, duration: Duration) -> Self {
        Self {
            url,
            outcome: Outcome::Response {
                status,
                content_length,
            },
            duration,
        }
    }

    pub fn failed(url: String, error: FetchError, duration: Duration) -> Self {
        Self {
            url,
            outcome: Outcome::Failed(error),
            duration,
        }
    }

    /// HTTP status, with 0 reserved for transport failures.
    pub fn status_code(&self) -> u16 {
        match self.outcome {
            Outcome::Response { status, .. } => status,
            Outcome::Failed(_) => 0,
        }
    }

    /// Reported length; transport failures count as zero bytes.
    pub fn content_length(&self) -> Option<u64> {
        match self.outcome {
            Outcome::Response { content_length, .. } => content_length,
            Outcome::Failed(_) => Some(0),
        }
    }

    pub fn error(&self) -> Option<&FetchError> {
        match &self.outcome {
            Outcome::Failed(e) => Some(e),
            Outcome::Response { .. } => None,
        }
    }

    pub fn class(&self) -> Class {
        Class::of(self.status_code())
    }
}

/// Statistics bucket of a result. Every result falls in exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Success,
    ClientError,
    ServerError,
    Transport,
    OutOfRange,
}

impl Class {
    pub fn of(status: u16) -> Self {
        match status {
            0 => Class::Transport,
            100..=399 => Class::Success,
            400..=499 => Class::ClientError,
            500..=599 => Class::ServerError,
            _ => Class::OutOfRange,
        }
    }

    pub fn is_error(self) -> bool {
        self != Class::Success
    }
}
