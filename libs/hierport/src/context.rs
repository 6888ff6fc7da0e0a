//! Read-only views of the graphs a [`HierPortInst`](crate::HierPortInst) names into.
//!
//! A hierarchical reference only ever needs a handful of queries from the
//! logical netlist and from the physical design. These traits expose exactly
//! those queries, so the reference cannot reach the graphs' mutation APIs.

use std::fmt::Debug;
use std::hash::Hash;

use arcstr::ArcStr;
use edif::{BitOrder, CellId, CellInstId, Direction, NetId, Netlist, PortInstId};

/// The logical netlist queries used by hierarchical references.
///
/// Handles are cheap, copyable identifiers that are only meaningful
/// together with the context that issued them.
pub trait NetlistContext {
    /// A port instance handle.
    type PortInst: Copy + Eq + Hash + Debug;
    /// A cell instance handle.
    type CellInst: Copy + Eq + Debug;
    /// A cell definition handle.
    type Cell: Copy + Eq + Debug;
    /// A net handle.
    type Net: Copy + Eq + Debug;

    /// The name of the netlist, for diagnostics.
    fn netlist_name(&self) -> &str;

    /// Returns `true` if the port instance belongs to this netlist.
    fn contains_port_inst(&self, port_inst: Self::PortInst) -> bool;

    /// The instance owning a port instance.
    ///
    /// [`None`] for the inward-facing side of a cell's own port.
    fn cell_inst(&self, port_inst: Self::PortInst) -> Option<Self::CellInst>;

    /// The name of a cell instance.
    fn cell_inst_name(&self, inst: Self::CellInst) -> &str;

    /// The cell a cell instance instantiates.
    fn cell_type(&self, inst: Self::CellInst) -> Self::Cell;

    /// The netlist's designated top instance.
    fn top_cell_inst(&self) -> Option<Self::CellInst>;

    /// The declared direction of the port behind a port instance.
    fn direction(&self, port_inst: Self::PortInst) -> Direction;

    /// The width of the port behind a port instance.
    fn width(&self, port_inst: Self::PortInst) -> usize;

    /// Returns `true` if the port behind a port instance was declared as a bus.
    fn is_bus(&self, port_inst: Self::PortInst) -> bool;

    /// The bus name of the port behind a port instance.
    fn bus_name(&self, port_inst: Self::PortInst) -> &str;

    /// The declared bit order of the port behind a port instance.
    fn bit_order(&self, port_inst: Self::PortInst) -> BitOrder;

    /// The stored member index of a port instance within its port.
    fn member_index(&self, port_inst: Self::PortInst) -> usize;

    /// The local name of a port instance, used as the logical pin name.
    fn port_inst_name(&self, port_inst: Self::PortInst) -> ArcStr;

    /// The port instance name qualified by its owning instance, if any.
    fn port_inst_full_name(&self, port_inst: Self::PortInst) -> ArcStr;

    /// The net attached to a port instance.
    fn net(&self, port_inst: Self::PortInst) -> Option<Self::Net>;

    /// The local name of a net.
    fn net_name(&self, net: Self::Net) -> &str;
}

/// The physical design queries used to resolve routed pins.
pub trait PhysicalContext {
    /// A placed cell.
    type Cell;
    /// A physical pin.
    type SitePin;

    /// The cell placed under a full hierarchical instance name.
    fn cell_at(&self, full_hier_name: &str) -> Option<&Self::Cell>;

    /// The routed physical pin bound to a logical pin of `cell`.
    fn site_pin<'a>(&'a self, cell: &Self::Cell, logical_pin: &str) -> Option<&'a Self::SitePin>;

    /// Every routed physical pin bound to a logical pin of `cell`.
    fn all_site_pins<'a>(&'a self, cell: &Self::Cell, logical_pin: &str) -> Vec<&'a Self::SitePin>;
}

impl NetlistContext for Netlist {
    type PortInst = PortInstId;
    type CellInst = CellInstId;
    type Cell = CellId;
    type Net = NetId;

    fn netlist_name(&self) -> &str {
        self.name()
    }

    fn contains_port_inst(&self, port_inst: PortInstId) -> bool {
        self.try_port_inst(port_inst).is_some()
    }

    fn cell_inst(&self, port_inst: PortInstId) -> Option<CellInstId> {
        self.port_inst(port_inst).cell_inst()
    }

    fn cell_inst_name(&self, inst: CellInstId) -> &str {
        Netlist::cell_inst(self, inst).name()
    }

    fn cell_type(&self, inst: CellInstId) -> CellId {
        Netlist::cell_inst(self, inst).cell_type()
    }

    fn top_cell_inst(&self) -> Option<CellInstId> {
        Netlist::top_cell_inst(self)
    }

    fn direction(&self, port_inst: PortInstId) -> Direction {
        self.port(self.port_inst(port_inst).port()).direction()
    }

    fn width(&self, port_inst: PortInstId) -> usize {
        self.port(self.port_inst(port_inst).port()).width()
    }

    fn is_bus(&self, port_inst: PortInstId) -> bool {
        self.port(self.port_inst(port_inst).port()).is_bus()
    }

    fn bus_name(&self, port_inst: PortInstId) -> &str {
        self.port(self.port_inst(port_inst).port()).bus_name()
    }

    fn bit_order(&self, port_inst: PortInstId) -> BitOrder {
        self.port(self.port_inst(port_inst).port()).bit_order()
    }

    fn member_index(&self, port_inst: PortInstId) -> usize {
        self.port_inst(port_inst).index()
    }

    fn port_inst_name(&self, port_inst: PortInstId) -> ArcStr {
        Netlist::port_inst_name(self, port_inst)
    }

    fn port_inst_full_name(&self, port_inst: PortInstId) -> ArcStr {
        Netlist::port_inst_full_name(self, port_inst)
    }

    fn net(&self, port_inst: PortInstId) -> Option<NetId> {
        self.port_inst(port_inst).net()
    }

    fn net_name(&self, net: NetId) -> &str {
        Netlist::net(self, net).name()
    }
}

impl PhysicalContext for design::Design {
    type Cell = design::Cell;
    type SitePin = design::SitePinInst;

    fn cell_at(&self, full_hier_name: &str) -> Option<&design::Cell> {
        self.cell(full_hier_name)
    }

    fn site_pin<'a>(
        &'a self,
        cell: &design::Cell,
        logical_pin: &str,
    ) -> Option<&'a design::SitePinInst> {
        self.site_pin_from_logical_pin(cell, logical_pin)
    }

    fn all_site_pins<'a>(
        &'a self,
        cell: &design::Cell,
        logical_pin: &str,
    ) -> Vec<&'a design::SitePinInst> {
        self.all_site_pins_from_logical_pin(cell, logical_pin)
    }
}
