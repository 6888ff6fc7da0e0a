//! Netlist error types.

use arcstr::ArcStr;

use crate::{CellInstId, NetId, PortInstId};

/// A result type whose error is a netlist [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// An error encountered while building a netlist.
#[derive(thiserror::Error, Debug, Clone, Eq, PartialEq)]
pub enum Error {
    /// A port name could not be parsed.
    #[error("invalid port name `{0}`")]
    InvalidPortName(ArcStr),
    /// A bus range does not start or end at bit 0.
    #[error("bus `{name}` must have 0 as one of its range bounds")]
    UnsupportedBusRange {
        /// The full port name.
        name: ArcStr,
    },
    /// A port with the same bus name already exists on the cell.
    #[error("cell `{cell}` already has a port named `{port}`")]
    DuplicatePort {
        /// The name of the cell.
        cell: ArcStr,
        /// The bus name of the port.
        port: ArcStr,
    },
    /// No port with the given name exists on the cell.
    #[error("cell `{cell}` has no port named `{port}`")]
    UnknownPort {
        /// The name of the cell.
        cell: ArcStr,
        /// The requested port name.
        port: ArcStr,
    },
    /// A member index exceeds the width of its port.
    #[error("index {index} is out of bounds for port `{port}` of width {width}")]
    IndexOutOfBounds {
        /// The name of the port.
        port: ArcStr,
        /// The requested member index.
        index: usize,
        /// The width of the port.
        width: usize,
    },
    /// The port does not belong to the cell type of the instance.
    #[error("port `{port}` does not belong to the cell type of instance {inst}")]
    PortNotOnInstance {
        /// The name of the port.
        port: ArcStr,
        /// The instance.
        inst: CellInstId,
    },
    /// A port instance and a net live in different cells.
    #[error("port instance {port_inst} cannot connect to net {net} in a different cell")]
    ScopeMismatch {
        /// The port instance.
        port_inst: PortInstId,
        /// The net.
        net: NetId,
    },
    /// The top instance has no parent cell, so it cannot be connected to a net.
    #[error("port instance {0} is on the top instance and cannot be connected to a net")]
    TopInstanceConnection(PortInstId),
}
