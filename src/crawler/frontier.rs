//! Traversal frontier
//!
//! The frontier owns every URL seen during one traversal: a state per URL
//! (membership test, insert-only) plus a FIFO queue of pages still to fetch.
//! A URL enters the queue at most once over the frontier's lifetime.

use crate::state::PageState;
use std::collections::{HashMap, VecDeque};
use url::Url;

/// Breadth-first frontier for a single traversal
#[derive(Debug)]
pub struct Frontier {
    /// Every URL ever enqueued and its current state
    states: HashMap<Url, PageState>,

    /// URLs waiting to be fetched, oldest first
    queue: VecDeque<Url>,
}

impl Frontier {
    /// Creates a frontier holding only the seed
    pub fn new(seed: Url) -> Self {
        let mut frontier = Self {
            states: HashMap::new(),
            queue: VecDeque::new(),
        };
        frontier.enqueue(seed);
        frontier
    }

    /// Adds a URL unless it is already pending or visited
    ///
    /// Returns true if the URL was newly enqueued.
    pub fn enqueue(&mut self, url: Url) -> bool {
        if self.states.contains_key(&url) {
            return false;
        }
        self.states.insert(url.clone(), PageState::Pending);
        self.queue.push_back(url);
        true
    }

    /// Removes and returns the oldest pending URL
    pub fn next_pending(&mut self) -> Option<Url> {
        self.queue.pop_front()
    }

    /// Records the outcome of a fetch attempt
    ///
    /// Transitions out of a terminal state are ignored.
    pub fn mark(&mut self, url: &Url, state: PageState) {
        if let Some(current) = self.states.get_mut(url) {
            if current.can_transition_to(state) {
                *current = state;
            } else {
                tracing::trace!("Ignoring transition {} -> {} for {}", current, state, url);
            }
        }
    }

    /// Returns the state of a URL, if it was ever enqueued
    pub fn state_of(&self, url: &Url) -> Option<PageState> {
        self.states.get(url).copied()
    }

    /// Number of URLs waiting to be fetched
    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }

    /// Returns whether no URL is waiting
    pub fn is_exhausted(&self) -> bool {
        self.queue.is_empty()
    }

    /// Number of URLs ever enqueued
    pub fn known_len(&self) -> usize {
        self.states.len()
    }
}
