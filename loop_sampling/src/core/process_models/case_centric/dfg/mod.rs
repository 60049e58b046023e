//! Directly-follows graphs

/// [`DirectlyFollowsGraph`] struct
pub mod dfg_struct;
#[cfg(feature = "graphviz-export")]
/// Export [`DirectlyFollowsGraph`] to images (SVG, PNG, ...)
///
/// __Requires the `graphviz-export` feature to be enabled__
///
/// Also requires an active graphviz installation in the PATH.
/// See also <https://github.com/besok/graphviz-rust?tab=readme-ov-file#caveats> and <https://graphviz.org/download/>
pub mod image_export;

#[doc(inline)]
pub use dfg_struct::{DfgImageFormat, DfgRenderConfig, DirectlyFollowsGraph};
