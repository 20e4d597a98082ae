//! State module for classifying crawl jobs
//!
//! Every job taken from the queue ends in exactly one `JobState`, which the
//! statistics layer counts.

mod job_state;

pub use job_state::JobState;
