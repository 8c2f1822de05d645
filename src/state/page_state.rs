/// Page state definitions for tracking traversal progress
///
/// A page is created `Pending` when first enqueued and becomes terminal once
/// a fetch has been attempted, whether or not it succeeded.
use std::fmt;

/// Represents the current state of a page during traversal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageState {
    /// Page is queued and waiting to be fetched
    Pending,

    /// Page was fetched and its links were expanded
    Fetched,

    /// Page fetch failed; it will not be expanded or retried
    Failed,
}

impl PageState {
    /// Returns true once a fetch has been attempted
    pub fn is_visited(&self) -> bool {
        !matches!(self, Self::Pending)
    }

    /// Returns true if this represents a successful fetch
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Fetched)
    }

    /// Checks if a transition from this state to another is valid
    ///
    /// Only `Pending` may move, and only to a visited state.
    pub fn can_transition_to(&self, next: PageState) -> bool {
        matches!(self, Self::Pending) && next.is_visited()
    }
}

impl fmt::Display for PageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Fetched => "fetched",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}
