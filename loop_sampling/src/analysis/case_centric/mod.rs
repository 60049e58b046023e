//! Analysis of case-centric activity logs

/// Detection of loop activities
pub mod loop_activities;

/// Predecessor and successor relations of loop activities
pub mod relations;

/// Direct and indirect follow relations between two activity groups
pub mod follow_relations;
