//! State tracking for pages visited during traversal

mod page_state;

pub use page_state::PageState;
