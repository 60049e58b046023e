//! Core data structures for loop-behavior analysis

pub mod event_data;

/// IO Traits
pub mod io;

pub mod process_models;

pub use event_data::case_centric::CaseLog;
pub use process_models::case_centric::dfg::DirectlyFollowsGraph;
