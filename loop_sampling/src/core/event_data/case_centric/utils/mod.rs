//! Utilities working on whole [`CaseLog`](super::CaseLog)s
pub mod stratified_sampling;
