//! Library components of the rowkey CLI: logging setup, output path
//! defaults and summary rendering.

pub mod logging;
pub mod paths;
pub mod summary;
