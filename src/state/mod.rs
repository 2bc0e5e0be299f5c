//! State module for tracking per-book progress
//!
//! # Components
//!
//! - `BookState`: Tracks where a single catalog entry is in the
//!   fetch → parse → download → record pipeline

mod book_state;

// Re-export main types
pub use book_state::BookState;
