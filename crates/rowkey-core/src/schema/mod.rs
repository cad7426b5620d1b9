//! Schema detection for loosely structured delimited files.

mod dialect;
mod resolver;
mod role;

pub use dialect::{
    DEFAULT_CANDIDATES, DEFAULT_SAMPLE_SIZE, Dialect, LineTerminator, Sample, detect, sniff,
};
pub use resolver::{ResolvedSchema, SchemaResolver};
pub use role::{Role, classify_header, normalize_header};
