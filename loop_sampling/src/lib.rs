#![warn(
    clippy::doc_markdown,
    missing_debug_implementations,
    rust_2018_idioms,
    missing_docs
)]

#![doc = include_str!("../README.md")]

pub mod analysis;
pub mod core;
pub mod pipeline;

#[doc(inline)]
pub use crate::core::event_data::case_centric::{
    ActivityLabel, ActivitySequence, ActivitySet, CaseId, CaseLog, CaseLogBuilder,
};

#[doc(inline)]
pub use crate::core::event_data::case_centric::io::{ImportOptions, LogImportError, LogSource};

#[doc(inline)]
pub use crate::core::io::Importable;

#[doc(inline)]
pub use crate::core::process_models::case_centric::dfg::DirectlyFollowsGraph;

#[doc(inline)]
pub use crate::analysis::case_centric::loop_activities::{
    detect_loop_activities, LoopActivitySet,
};

#[doc(inline)]
pub use crate::analysis::case_centric::follow_relations::{count_follow_relations, FollowCounts};

#[doc(inline)]
pub use crate::core::event_data::case_centric::utils::stratified_sampling::{
    determine_sample_ratio, stratified_layering, stratified_sampling,
};

#[doc(inline)]
pub use pipeline::{
    analyze_loop_behavior, full_pipeline, LoopAnalysis, PipelineConfig, PipelineError,
};

#[doc(hidden)]
pub mod test_utils {
    use std::path::PathBuf;

    /// Directory containing the event log fixtures used in tests
    pub fn get_test_data_path() -> PathBuf {
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("test_data")
    }
}
