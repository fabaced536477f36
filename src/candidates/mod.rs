//! Candidate values shown when a column's filter popup opens.

pub mod builder;

pub use builder::{Candidates, build_candidates, build_items};
