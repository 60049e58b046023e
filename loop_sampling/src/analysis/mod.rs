//! Process Analysis
//!
//! This module contains techniques related to the analysis of loop behavior in case logs.

pub mod case_centric;
