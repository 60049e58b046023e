//! Event Data
//!
//! Case-centric activity logs and adjacent utilities
pub mod case_centric;

#[doc(inline)]
pub use case_centric::CaseLog;
