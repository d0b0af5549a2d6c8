//! Status document acquisition and navigation
//!
//! A status document is the JSON snapshot FoundationDB produces for `status json`. This
//! module obtains the raw bytes ([`StatusSource`]), parses them ([`StatusDocument`]), and
//! provides total path resolution into the parsed tree ([`resolve`], [`resolve_at`]).
//!
//! Resolution never fails loudly: a missing or mis-shaped field yields a [`PathMiss`]
//! describing where the document diverged, which callers treat as "no value" rather than
//! as an error.

mod document;
mod path;
mod source;

pub use document::StatusDocument;
pub use path::{MissReason, Path, PathMiss, Segment, resolve, resolve_at};
pub use source::{ClusterFile, StatusSource, copy_cluster_file};
