//! Case identifier and column name constants
/// Prefix of surrogate identifiers assigned to cases without a recorded case identifier
///
/// Only used with [`UnknownCasePolicy::Surrogate`](super::UnknownCasePolicy::Surrogate).
/// The `n`-th unidentified case (counting from 0) is stored as `__UNKNOWN_CASE_<n>`.
pub const UNKNOWN_CASE_PREFIX: &str = "__UNKNOWN_CASE_";
/// Column holding the case identifier in CSV event tables
pub const CSV_CASE_ID_COLUMN: &str = "case_id";
/// Column holding the activity label in CSV event tables
pub const CSV_ACTIVITY_COLUMN: &str = "activity";
