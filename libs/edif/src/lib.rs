//! Logical netlist graph for EDIF-style designs.
//!
//! A [`Netlist`] owns libraries of cells. Each cell declares ports and
//! may contain instances of other cells connected by nets. Connection
//! points are [`PortInst`]s: one per bit of a port, either on an
//! instance (outward facing) or on the cell's own boundary (inward facing).
//!
//! All objects live in arenas on the netlist and are addressed by typed
//! [`Id`]s. Accessors that take an ID panic if the ID does not belong to
//! the netlist; each has a non-panicking `try_` counterpart.
//!
//! Buses are declared with a range, e.g. `data[7:0]`. Member indices of a
//! bus are stored in declaration order (left to right), so the physical bit
//! position of a member depends on the bus's [`BitOrder`].
#![warn(missing_docs)]

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod error;
pub mod id;
mod port;
pub mod validation;

#[cfg(test)]
pub(crate) mod tests;

pub use error::{Error, Result};
pub use id::Id;
pub use port::{BitOrder, Direction, Port};

/// Separates an instance name from a port name in qualified port instance
/// names, and instance names from each other in hierarchical names.
pub const HIER_SEP: &str = "/";

/// An opaque library identifier.
pub type LibraryId = Id<Library>;
/// An opaque cell identifier.
pub type CellId = Id<Cell>;
/// An opaque port identifier.
pub type PortId = Id<Port>;
/// An opaque cell instance identifier.
pub type CellInstId = Id<CellInst>;
/// An opaque net identifier.
pub type NetId = Id<Net>;
/// An opaque port instance identifier.
pub type PortInstId = Id<PortInst>;

/// A named collection of cells.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Library {
    name: ArcStr,
    cells: Vec<CellId>,
}

/// A cell definition.
///
/// A cell with no instances is a leaf: a primitive or a black box.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    name: ArcStr,
    library: LibraryId,
    /// Ports keyed by bus name.
    ports: IndexMap<ArcStr, PortId>,
    insts: Vec<CellInstId>,
    nets: Vec<NetId>,
    /// Inward-facing port instances of this cell's own ports.
    port_insts: Vec<PortInstId>,
}

/// An instantiation of a cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CellInst {
    name: ArcStr,
    cell_type: CellId,
    /// The cell containing this instance.
    ///
    /// [`None`] only for the netlist's top instance.
    parent: Option<CellId>,
    port_insts: Vec<PortInstId>,
}

/// A net connecting port instances within a single cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Net {
    name: ArcStr,
    parent: CellId,
    port_insts: Vec<PortInstId>,
}

/// A single bit of a port, either on an instance or on a cell boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortInst {
    port: PortId,
    index: usize,
    cell_inst: Option<CellInstId>,
    net: Option<NetId>,
}

/// A logical netlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Netlist {
    name: ArcStr,

    library_id: LibraryId,
    cell_id: CellId,
    port_id: PortId,
    cell_inst_id: CellInstId,
    net_id: NetId,
    port_inst_id: PortInstId,

    libraries: IndexMap<LibraryId, Library>,
    cells: IndexMap<CellId, Cell>,
    ports: IndexMap<PortId, Port>,
    cell_insts: IndexMap<CellInstId, CellInst>,
    nets: IndexMap<NetId, Net>,
    port_insts: IndexMap<PortInstId, PortInst>,

    /// The designated top instance, if there is one.
    top: Option<CellInstId>,
}

#[track_caller]
fn missing<T>(kind: &str, id: impl std::fmt::Display, netlist: &ArcStr) -> T {
    tracing::error!("no {} with ID {} in netlist `{}`", kind, id, netlist);
    panic!("no {} with ID {} in netlist `{}`", kind, id, netlist);
}

impl Netlist {
    /// Creates a new, empty netlist.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// The name of the netlist.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Adds an empty library.
    pub fn add_library(&mut self, name: impl Into<ArcStr>) -> LibraryId {
        let id = self.library_id.alloc();
        self.libraries.insert(
            id,
            Library {
                name: name.into(),
                cells: Vec::new(),
            },
        );
        id
    }

    /// Adds an empty cell to the given library.
    ///
    /// # Panics
    ///
    /// Panics if the library does not exist.
    pub fn add_cell(&mut self, library: LibraryId, name: impl Into<ArcStr>) -> CellId {
        let id = self.cell_id.alloc();
        self.library_mut(library).cells.push(id);
        self.cells.insert(
            id,
            Cell {
                name: name.into(),
                library,
                ports: IndexMap::new(),
                insts: Vec::new(),
                nets: Vec::new(),
                port_insts: Vec::new(),
            },
        );
        id
    }

    /// Declares a port on a cell.
    ///
    /// The name is parsed for a bus range; see [`Port`].
    pub fn add_port(&mut self, cell: CellId, name: &str, direction: Direction) -> Result<PortId> {
        let port = Port::parse(cell, name, direction)?;
        let cell_ref = self.cell(cell);
        if cell_ref.ports.contains_key(&port.bus_name) {
            return Err(Error::DuplicatePort {
                cell: cell_ref.name.clone(),
                port: port.bus_name,
            });
        }
        let id = self.port_id.alloc();
        self.cell_mut(cell).ports.insert(port.bus_name.clone(), id);
        self.ports.insert(id, port);
        Ok(id)
    }

    /// Instantiates `cell_type` inside `parent`.
    pub fn add_cell_inst(
        &mut self,
        parent: CellId,
        name: impl Into<ArcStr>,
        cell_type: CellId,
    ) -> CellInstId {
        // Validate the cell type before mutating anything.
        self.cell(cell_type);
        let id = self.cell_inst_id.alloc();
        self.cell_mut(parent).insts.push(id);
        self.cell_insts.insert(
            id,
            CellInst {
                name: name.into(),
                cell_type,
                parent: Some(parent),
                port_insts: Vec::new(),
            },
        );
        id
    }

    /// Creates the top instance of the given cell and designates it as the
    /// netlist's top.
    ///
    /// The instance is named after the cell. Any previous top instance is
    /// left in place but is no longer designated.
    pub fn set_top_cell(&mut self, cell: CellId) -> CellInstId {
        let name = self.cell(cell).name.clone();
        let id = self.cell_inst_id.alloc();
        self.cell_insts.insert(
            id,
            CellInst {
                name,
                cell_type: cell,
                parent: None,
                port_insts: Vec::new(),
            },
        );
        self.top = Some(id);
        id
    }

    /// Adds an empty net to a cell.
    pub fn add_net(&mut self, parent: CellId, name: impl Into<ArcStr>) -> NetId {
        let id = self.net_id.alloc();
        self.cell_mut(parent).nets.push(id);
        self.nets.insert(
            id,
            Net {
                name: name.into(),
                parent,
                port_insts: Vec::new(),
            },
        );
        id
    }

    /// Creates an unconnected port instance for bit `index` of `port`.
    ///
    /// If `cell_inst` is [`None`], the port instance is the inward-facing
    /// side of the port on its own cell.
    pub fn add_port_inst(
        &mut self,
        cell_inst: Option<CellInstId>,
        port: PortId,
        index: usize,
    ) -> Result<PortInstId> {
        let port_ref = self.port(port);
        if index >= port_ref.width {
            return Err(Error::IndexOutOfBounds {
                port: port_ref.name.clone(),
                index,
                width: port_ref.width,
            });
        }
        if let Some(inst) = cell_inst {
            if self.cell_inst(inst).cell_type != port_ref.cell {
                return Err(Error::PortNotOnInstance {
                    port: port_ref.name.clone(),
                    inst,
                });
            }
        }
        let owner = port_ref.cell;

        let id = self.port_inst_id.alloc();
        match cell_inst {
            Some(inst) => self.cell_inst_mut(inst).port_insts.push(id),
            None => self.cell_mut(owner).port_insts.push(id),
        }
        self.port_insts.insert(
            id,
            PortInst {
                port,
                index,
                cell_inst,
                net: None,
            },
        );
        Ok(id)
    }

    /// Attaches a port instance to a net, detaching it from any previous net.
    pub fn connect(&mut self, net: NetId, port_inst: PortInstId) -> Result<()> {
        let scope = match self.port_inst(port_inst).cell_inst {
            Some(inst) => self
                .cell_inst(inst)
                .parent
                .ok_or(Error::TopInstanceConnection(port_inst))?,
            None => self.port(self.port_inst(port_inst).port).cell,
        };
        if self.net(net).parent != scope {
            return Err(Error::ScopeMismatch { port_inst, net });
        }

        if let Some(old) = self.port_inst(port_inst).net {
            self.net_mut(old).port_insts.retain(|&p| p != port_inst);
        }
        self.net_mut(net).port_insts.push(port_inst);
        self.port_inst_mut(port_inst).net = Some(net);
        Ok(())
    }

    /// Creates a port instance on `inst` for the named port and attaches it to `net`.
    ///
    /// `port` is the bus name of the port on the instance's cell type.
    pub fn connect_inst(
        &mut self,
        net: NetId,
        inst: CellInstId,
        port: &str,
        index: usize,
    ) -> Result<PortInstId> {
        let cell_type = self.cell_inst(inst).cell_type;
        let port = self.require_port(cell_type, port)?;
        let port_inst = self.add_port_inst(Some(inst), port, index)?;
        self.connect(net, port_inst)?;
        Ok(port_inst)
    }

    /// Creates an inward-facing port instance for the named port of the
    /// net's cell and attaches it to `net`.
    pub fn connect_boundary(&mut self, net: NetId, port: &str, index: usize) -> Result<PortInstId> {
        let cell = self.net(net).parent;
        let port = self.require_port(cell, port)?;
        let port_inst = self.add_port_inst(None, port, index)?;
        self.connect(net, port_inst)?;
        Ok(port_inst)
    }

    fn require_port(&self, cell: CellId, port: &str) -> Result<PortId> {
        self.port_named(cell, port).ok_or_else(|| Error::UnknownPort {
            cell: self.cell(cell).name.clone(),
            port: port.into(),
        })
    }

    /// The designated top instance, if there is one.
    #[inline]
    pub fn top_cell_inst(&self) -> Option<CellInstId> {
        self.top
    }

    /// The cell type of the top instance, if there is one.
    #[inline]
    pub fn top_cell(&self) -> Option<CellId> {
        self.top.map(|inst| self.cell_inst(inst).cell_type)
    }

    /// Gets the library with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no library has the given ID.
    pub fn library(&self, id: LibraryId) -> &Library {
        self.try_library(id)
            .unwrap_or_else(|| missing("library", id, &self.name))
    }

    /// Gets the library with the given ID.
    #[inline]
    pub fn try_library(&self, id: LibraryId) -> Option<&Library> {
        self.libraries.get(&id)
    }

    fn library_mut(&mut self, id: LibraryId) -> &mut Library {
        let netlist = self.name.clone();
        match self.libraries.get_mut(&id) {
            Some(library) => library,
            None => missing("library", id, &netlist),
        }
    }

    /// Gets the cell with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no cell has the given ID.
    /// For a non-panicking alternative, see [`try_cell`](Netlist::try_cell).
    pub fn cell(&self, id: CellId) -> &Cell {
        self.try_cell(id)
            .unwrap_or_else(|| missing("cell", id, &self.name))
    }

    /// Gets the cell with the given ID.
    #[inline]
    pub fn try_cell(&self, id: CellId) -> Option<&Cell> {
        self.cells.get(&id)
    }

    fn cell_mut(&mut self, id: CellId) -> &mut Cell {
        let netlist = self.name.clone();
        match self.cells.get_mut(&id) {
            Some(cell) => cell,
            None => missing("cell", id, &netlist),
        }
    }

    /// Gets the first cell with the given name in any library.
    pub fn cell_named(&self, name: &str) -> Option<CellId> {
        self.cells
            .iter()
            .find(|(_, cell)| cell.name == name)
            .map(|(id, _)| *id)
    }

    /// Gets the port with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no port has the given ID.
    pub fn port(&self, id: PortId) -> &Port {
        self.try_port(id)
            .unwrap_or_else(|| missing("port", id, &self.name))
    }

    /// Gets the port with the given ID.
    #[inline]
    pub fn try_port(&self, id: PortId) -> Option<&Port> {
        self.ports.get(&id)
    }

    /// Gets a port of a cell by its bus name.
    pub fn port_named(&self, cell: CellId, name: &str) -> Option<PortId> {
        self.cell(cell).ports.get(name).copied()
    }

    /// Gets the cell instance with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no cell instance has the given ID.
    pub fn cell_inst(&self, id: CellInstId) -> &CellInst {
        self.try_cell_inst(id)
            .unwrap_or_else(|| missing("cell instance", id, &self.name))
    }

    /// Gets the cell instance with the given ID.
    #[inline]
    pub fn try_cell_inst(&self, id: CellInstId) -> Option<&CellInst> {
        self.cell_insts.get(&id)
    }

    fn cell_inst_mut(&mut self, id: CellInstId) -> &mut CellInst {
        let netlist = self.name.clone();
        match self.cell_insts.get_mut(&id) {
            Some(inst) => inst,
            None => missing("cell instance", id, &netlist),
        }
    }

    /// Gets an instance inside `parent` by name.
    pub fn cell_inst_named(&self, parent: CellId, name: &str) -> Option<CellInstId> {
        self.cell(parent)
            .insts
            .iter()
            .copied()
            .find(|&inst| self.cell_inst(inst).name == name)
    }

    /// Gets the net with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no net has the given ID.
    pub fn net(&self, id: NetId) -> &Net {
        self.try_net(id)
            .unwrap_or_else(|| missing("net", id, &self.name))
    }

    /// Gets the net with the given ID.
    #[inline]
    pub fn try_net(&self, id: NetId) -> Option<&Net> {
        self.nets.get(&id)
    }

    fn net_mut(&mut self, id: NetId) -> &mut Net {
        let netlist = self.name.clone();
        match self.nets.get_mut(&id) {
            Some(net) => net,
            None => missing("net", id, &netlist),
        }
    }

    /// Gets a net inside `parent` by name.
    pub fn net_named(&self, parent: CellId, name: &str) -> Option<NetId> {
        self.cell(parent)
            .nets
            .iter()
            .copied()
            .find(|&net| self.net(net).name == name)
    }

    /// Gets the port instance with the given ID.
    ///
    /// # Panics
    ///
    /// Panics if no port instance has the given ID.
    pub fn port_inst(&self, id: PortInstId) -> &PortInst {
        self.try_port_inst(id)
            .unwrap_or_else(|| missing("port instance", id, &self.name))
    }

    /// Gets the port instance with the given ID.
    #[inline]
    pub fn try_port_inst(&self, id: PortInstId) -> Option<&PortInst> {
        self.port_insts.get(&id)
    }

    fn port_inst_mut(&mut self, id: PortInstId) -> &mut PortInst {
        let netlist = self.name.clone();
        match self.port_insts.get_mut(&id) {
            Some(port_inst) => port_inst,
            None => missing("port instance", id, &netlist),
        }
    }

    /// The local name of a port instance, e.g. `D` or `data[5]`.
    pub fn port_inst_name(&self, id: PortInstId) -> ArcStr {
        let port_inst = self.port_inst(id);
        self.port(port_inst.port).member_name(port_inst.index)
    }

    /// The port instance name qualified by its instance, e.g. `u1/D`.
    ///
    /// Inward-facing port instances have no instance and are named by
    /// [`port_inst_name`](Netlist::port_inst_name) alone.
    pub fn port_inst_full_name(&self, id: PortInstId) -> ArcStr {
        let name = self.port_inst_name(id);
        match self.port_inst(id).cell_inst {
            Some(inst) => arcstr::format!("{}{}{}", self.cell_inst(inst).name, HIER_SEP, name),
            None => name,
        }
    }

    /// Iterates over the libraries in insertion order.
    pub fn libraries(&self) -> impl Iterator<Item = (LibraryId, &Library)> {
        self.libraries.iter().map(|(id, lib)| (*id, lib))
    }

    /// Iterates over all cells in insertion order.
    pub fn cells(&self) -> impl Iterator<Item = (CellId, &Cell)> {
        self.cells.iter().map(|(id, cell)| (*id, cell))
    }

    /// Iterates over all port instances in insertion order.
    pub fn port_insts(&self) -> impl Iterator<Item = (PortInstId, &PortInst)> {
        self.port_insts.iter().map(|(id, p)| (*id, p))
    }
}

impl Library {
    /// The name of the library.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The cells in this library, in insertion order.
    #[inline]
    pub fn cells(&self) -> &[CellId] {
        &self.cells
    }
}

impl Cell {
    /// The name of the cell.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The library containing this cell.
    #[inline]
    pub fn library(&self) -> LibraryId {
        self.library
    }

    /// Iterates over the ports of this cell in declaration order.
    pub fn ports(&self) -> impl Iterator<Item = PortId> + '_ {
        self.ports.values().copied()
    }

    /// The instances inside this cell.
    #[inline]
    pub fn cell_insts(&self) -> &[CellInstId] {
        &self.insts
    }

    /// The nets inside this cell.
    #[inline]
    pub fn nets(&self) -> &[NetId] {
        &self.nets
    }

    /// The inward-facing port instances of this cell's ports.
    #[inline]
    pub fn port_insts(&self) -> &[PortInstId] {
        &self.port_insts
    }

    /// Returns `true` if this cell contains no instances.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.insts.is_empty()
    }
}

impl CellInst {
    /// The name of this instance.
    ///
    /// This is not necessarily the name of the cell type.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The cell this is an instance of.
    #[inline]
    pub fn cell_type(&self) -> CellId {
        self.cell_type
    }

    /// The cell containing this instance.
    ///
    /// [`None`] for a top instance.
    #[inline]
    pub fn parent(&self) -> Option<CellId> {
        self.parent
    }

    /// The outward-facing port instances on this instance.
    #[inline]
    pub fn port_insts(&self) -> &[PortInstId] {
        &self.port_insts
    }
}

impl Net {
    /// The local name of this net.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The cell containing this net.
    #[inline]
    pub fn parent(&self) -> CellId {
        self.parent
    }

    /// The port instances attached to this net.
    #[inline]
    pub fn port_insts(&self) -> &[PortInstId] {
        &self.port_insts
    }
}

impl PortInst {
    /// The port this is a member of.
    #[inline]
    pub fn port(&self) -> PortId {
        self.port
    }

    /// The stored member index within the port.
    ///
    /// Always 0 for scalar ports.
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// The instance this port instance is on.
    ///
    /// [`None`] for the inward-facing side of a cell's own port.
    #[inline]
    pub fn cell_inst(&self) -> Option<CellInstId> {
        self.cell_inst
    }

    /// The net attached to this port instance, if any.
    #[inline]
    pub fn net(&self) -> Option<NetId> {
        self.net
    }
}
