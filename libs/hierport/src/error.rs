//! Hierarchical reference error types.

use arcstr::ArcStr;

/// A result type whose error is a hierarchical reference [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// An error encountered while constructing a [`HierPortInst`](crate::HierPortInst).
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// The hierarchical name has an empty segment or a leading or trailing separator.
    #[error("malformed hierarchical name `{0}`")]
    MalformedHierName(ArcStr),
    /// The port instance is not part of the netlist.
    #[error("port instance {0} does not belong to netlist `{1}`")]
    UnknownPortInst(String, ArcStr),
}
