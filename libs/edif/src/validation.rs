//! Netlist validation.
//!
//! The builder API on [`Netlist`] rejects most malformed connections up
//! front, but netlists can also be deserialized or edited piecemeal. This
//! module checks the structural invariants that naming and hierarchy
//! traversal rely on.

use std::collections::HashMap;
use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use tracing::{span, Level};

use crate::{CellId, CellInstId, NetId, Netlist, PortId, PortInstId};

/// The severity of a validation issue.
#[derive(Copy, Clone, Debug, Default, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    /// A warning.
    #[default]
    Warning,
    /// An error.
    Error,
}

/// An issue identified during validation of a netlist.
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct ValidatorIssue {
    cause: Cause,
    severity: Severity,
}

/// The cause of a [`ValidatorIssue`].
#[derive(Clone, Debug, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub enum Cause {
    /// The netlist has no designated top instance.
    MissingTop,
    /// Two instances in the same cell have the same name.
    DuplicateInstanceNames {
        inst_name: ArcStr,
        cell_id: CellId,
        cell_name: ArcStr,
    },
    /// Two nets in the same cell have the same name.
    DuplicateNetNames {
        net_name: ArcStr,
        cell_id: CellId,
        cell_name: ArcStr,
    },
    /// A port instance addresses a bit outside its port.
    IndexOutOfBounds {
        port_inst: PortInstId,
        port_name: ArcStr,
        index: usize,
        width: usize,
    },
    /// A port instance is attached to a net in a different cell.
    ScopeMismatch {
        port_inst: PortInstId,
        net: NetId,
        net_name: ArcStr,
    },
    /// A net lists a port instance that is not attached to it.
    DanglingConnection { port_inst: PortInstId, net: NetId },
    /// A cell instantiates itself, directly or through other cells.
    RecursiveHierarchy { cell_id: CellId, cell_name: ArcStr },
    /// A cell instance ID is referenced but not present in the netlist.
    UnknownCellInst { inst: CellInstId },
    /// A net ID is referenced but not present in the netlist.
    UnknownNet { net: NetId },
    /// A port instance refers to a port that is not present in the netlist.
    UnknownPort { port_inst: PortInstId, port: PortId },
}

/// The issues found by [`Netlist::validate`].
#[derive(Clone, Debug, Default)]
pub struct Issues {
    issues: Vec<ValidatorIssue>,
    num_errors: usize,
}

impl ValidatorIssue {
    /// Creates a new validator issue and logs it immediately.
    ///
    /// The log level will be selected according to the given severity.
    pub(crate) fn new_and_log(cause: Cause, severity: Severity) -> Self {
        let result = Self { cause, severity };
        match severity {
            Severity::Warning => tracing::event!(Level::WARN, issue = ?result.cause, "{}", result),
            Severity::Error => tracing::event!(Level::ERROR, issue = ?result.cause, "{}", result),
        }
        result
    }

    /// Gets the underlying cause of this issue.
    #[inline]
    pub fn cause(&self) -> &Cause {
        &self.cause
    }

    /// The severity of this issue.
    #[inline]
    pub fn severity(&self) -> Severity {
        self.severity
    }
}

impl Issues {
    fn add(&mut self, cause: Cause, severity: Severity) {
        if severity == Severity::Error {
            self.num_errors += 1;
        }
        self.issues.push(ValidatorIssue::new_and_log(cause, severity));
    }

    /// Iterates over all issues.
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &ValidatorIssue> {
        self.issues.iter()
    }

    /// The number of issues.
    #[inline]
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Returns `true` if no issues were found.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Returns `true` if any issue is an error.
    #[inline]
    pub fn has_error(&self) -> bool {
        self.num_errors > 0
    }
}

impl Display for ValidatorIssue {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.cause)
    }
}

impl Display for Cause {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingTop => write!(f, "no top instance: the netlist has no designated top cell"),
            Self::DuplicateInstanceNames { inst_name, cell_name, .. } => write!(
                f,
                "duplicate instance names: found two or more instances named `{}` in cell `{}`",
                inst_name, cell_name
            ),
            Self::DuplicateNetNames { net_name, cell_name, .. } => write!(
                f,
                "duplicate net names: found two or more nets named `{}` in cell `{}`",
                net_name, cell_name
            ),
            Self::IndexOutOfBounds { port_inst, port_name, index, width } => write!(
                f,
                "index out of bounds: port instance {} addresses index {} of port `{}` with width {}",
                port_inst, index, port_name, width
            ),
            Self::ScopeMismatch { port_inst, net_name, .. } => write!(
                f,
                "scope mismatch: port instance {} is attached to net `{}` in a different cell",
                port_inst, net_name
            ),
            Self::DanglingConnection { port_inst, net } => write!(
                f,
                "dangling connection: net {} lists port instance {}, which is not attached to it",
                net, port_inst
            ),
            Self::RecursiveHierarchy { cell_name, .. } => write!(
                f,
                "recursive hierarchy: cell `{}` instantiates itself",
                cell_name
            ),
            Self::UnknownCellInst { inst } => {
                write!(f, "unknown cell instance: no cell instance with ID {}", inst)
            }
            Self::UnknownNet { net } => write!(f, "unknown net: no net with ID {}", net),
            Self::UnknownPort { port_inst, port } => write!(
                f,
                "unknown port: port instance {} refers to missing port {}",
                port_inst, port
            ),
        }
    }
}

#[derive(Copy, Clone, Eq, PartialEq)]
enum Visit {
    Active,
    Done,
}

impl Netlist {
    /// Checks whether or not this netlist is well formed.
    ///
    /// Never panics, even if IDs stored in the netlist are dangling.
    pub fn validate(&self) -> Issues {
        let _guard = span!(Level::INFO, "validating netlist", netlist = %self.name).entered();
        let mut issues = Issues::default();

        match self.top {
            None => issues.add(Cause::MissingTop, Severity::Warning),
            Some(inst) if self.try_cell_inst(inst).is_none() => {
                issues.add(Cause::UnknownCellInst { inst }, Severity::Error)
            }
            Some(_) => {}
        }

        for (cell_id, cell) in self.cells.iter() {
            let mut inst_names: HashMap<&ArcStr, usize> = HashMap::new();
            for &inst in cell.insts.iter() {
                match self.try_cell_inst(inst) {
                    Some(inst) => *inst_names.entry(&inst.name).or_default() += 1,
                    None => issues.add(Cause::UnknownCellInst { inst }, Severity::Error),
                }
            }
            for (name, count) in inst_names {
                if count > 1 {
                    issues.add(
                        Cause::DuplicateInstanceNames {
                            inst_name: name.clone(),
                            cell_id: *cell_id,
                            cell_name: cell.name.clone(),
                        },
                        Severity::Error,
                    );
                }
            }

            let mut net_names: HashMap<&ArcStr, usize> = HashMap::new();
            for &net in cell.nets.iter() {
                match self.try_net(net) {
                    Some(net) => *net_names.entry(&net.name).or_default() += 1,
                    None => issues.add(Cause::UnknownNet { net }, Severity::Error),
                }
            }
            for (name, count) in net_names {
                if count > 1 {
                    issues.add(
                        Cause::DuplicateNetNames {
                            net_name: name.clone(),
                            cell_id: *cell_id,
                            cell_name: cell.name.clone(),
                        },
                        Severity::Error,
                    );
                }
            }
        }

        let mut visits = HashMap::new();
        let mut recursive = Vec::new();
        for cell_id in self.cells.keys() {
            if !visits.contains_key(cell_id) {
                self.find_recursion(*cell_id, &mut visits, &mut recursive);
            }
        }
        for cell_id in recursive {
            issues.add(
                Cause::RecursiveHierarchy {
                    cell_id,
                    cell_name: self.cells[&cell_id].name.clone(),
                },
                Severity::Error,
            );
        }

        for (id, port_inst) in self.port_insts.iter() {
            let Some(port) = self.try_port(port_inst.port) else {
                issues.add(
                    Cause::UnknownPort {
                        port_inst: *id,
                        port: port_inst.port,
                    },
                    Severity::Error,
                );
                continue;
            };
            if port_inst.index >= port.width {
                issues.add(
                    Cause::IndexOutOfBounds {
                        port_inst: *id,
                        port_name: port.name.clone(),
                        index: port_inst.index,
                        width: port.width,
                    },
                    Severity::Error,
                );
            }

            let scope = match port_inst.cell_inst {
                Some(inst) => match self.try_cell_inst(inst) {
                    Some(inst) => inst.parent,
                    None => {
                        issues.add(Cause::UnknownCellInst { inst }, Severity::Error);
                        continue;
                    }
                },
                None => Some(port.cell),
            };
            if let Some(net_id) = port_inst.net {
                let Some(net) = self.try_net(net_id) else {
                    issues.add(Cause::UnknownNet { net: net_id }, Severity::Error);
                    continue;
                };
                if scope != Some(net.parent) {
                    issues.add(
                        Cause::ScopeMismatch {
                            port_inst: *id,
                            net: net_id,
                            net_name: net.name.clone(),
                        },
                        Severity::Error,
                    );
                }
            }
        }

        for (net_id, net) in self.nets.iter() {
            for &port_inst in net.port_insts.iter() {
                if self.try_port_inst(port_inst).and_then(|p| p.net) != Some(*net_id) {
                    issues.add(
                        Cause::DanglingConnection {
                            port_inst,
                            net: *net_id,
                        },
                        Severity::Error,
                    );
                }
            }
        }

        issues
    }

    /// Depth-first search over the instantiation graph starting at `cell`.
    ///
    /// Pushes each cell reached again while it is still on the search path.
    fn find_recursion(
        &self,
        cell: CellId,
        visits: &mut HashMap<CellId, Visit>,
        recursive: &mut Vec<CellId>,
    ) {
        visits.insert(cell, Visit::Active);
        let mut children = IndexSet::new();
        for &inst in self.cells[&cell].insts.iter() {
            if let Some(inst) = self.try_cell_inst(inst) {
                if self.cells.contains_key(&inst.cell_type) {
                    children.insert(inst.cell_type);
                }
            }
        }
        for child in children {
            match visits.get(&child) {
                Some(Visit::Active) => {
                    if !recursive.contains(&child) {
                        recursive.push(child);
                    }
                }
                Some(Visit::Done) => {}
                None => self.find_recursion(child, visits, recursive),
            }
        }
        visits.insert(cell, Visit::Done);
    }
}
