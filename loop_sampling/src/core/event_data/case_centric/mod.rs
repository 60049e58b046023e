//! Case-centric Event Data
//!
//! Each case of a [`CaseLog`] is reduced to the ordered sequence of its activity labels.
pub mod constants;
#[doc(hidden)]
pub(crate) mod case_log_struct;
pub mod io;
pub mod macros;
pub mod utils;
#[doc(inline)]
pub use case_log_struct::*;
