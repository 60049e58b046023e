//! Process Models
//!
//! Models derived from case logs
pub mod case_centric;
