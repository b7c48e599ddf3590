/// Per-URL crawl state definitions
///
/// Every URL moves through `Unclaimed → InFlight → {Indexed | Deferred}`. A
/// deferred URL may still become `Indexed` during the retry pass.
use std::fmt;

/// Represents where a URL is in the crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UrlState {
    /// Never seen, or seen only as an off-domain reference
    Unclaimed,

    /// Claimed by a scheduled unit of work whose fetch has not finished
    InFlight,

    /// Fetched successfully and recorded in the sitemap
    Indexed,

    /// Fetch failed (or was skipped by the circuit breaker); waiting for retry
    Deferred,
}

impl UrlState {
    /// Returns true if no other unit may claim this URL
    pub fn is_claimed(&self) -> bool {
        !matches!(self, Self::Unclaimed)
    }

    /// Returns true if moving from `self` to `next` is a legal transition
    pub fn can_transition_to(&self, next: UrlState) -> bool {
        matches!(
            (self, next),
            (Self::Unclaimed, Self::InFlight)
                | (Self::InFlight, Self::Indexed)
                | (Self::InFlight, Self::Deferred)
                | (Self::Deferred, Self::Indexed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unclaimed => "unclaimed",
            Self::InFlight => "in_flight",
            Self::Indexed => "indexed",
            Self::Deferred => "deferred",
        }
    }
}

impl fmt::Display for UrlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
