//! Library side of the `ttest` command-line tool.

pub mod logging;
pub mod plan;
pub mod summary;
