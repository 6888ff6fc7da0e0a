//! Hierarchical port references.
//!
//! A [`HierPortInst`] names a single port instance anywhere in an instance
//! hierarchy without materializing the flattened hierarchy. It pairs the
//! hierarchical name of the scope it was found in with a handle to a port
//! instance in that scope's cell, and derives every other name on demand:
//!
//! * [`full_hier_name`](HierPortInst::full_hier_name): the instance owning the port,
//!   which is also the name its placed cell carries in a physical design;
//! * [`hier_net_name`](HierPortInst::hier_net_name): the attached net;
//! * [`transformed_net_name`](HierPortInst::transformed_net_name): a flat scalar signal
//!   name with bus bits spelled out by physical position.
//!
//! The reference borrows the netlist it names into and never mutates it.
//! Equality is structural within one netlist: the same hierarchical name and
//! port instance handle in two different netlists are different references.
//!
//! ```
//! use edif::{Direction, Netlist};
//! use hierport::HierPortInst;
//!
//! let mut netlist = Netlist::new("demo");
//! let lib = netlist.add_library("work");
//! let inv = netlist.add_cell(lib, "INV");
//! netlist.add_port(inv, "O", Direction::Output).unwrap();
//! let top = netlist.add_cell(lib, "top");
//! let u1 = netlist.add_cell_inst(top, "u1", inv);
//! let net = netlist.add_net(top, "n1");
//! let pin = netlist.connect_inst(net, u1, "O", 0).unwrap();
//! netlist.set_top_cell(top);
//!
//! let port = HierPortInst::new(&netlist, "core/sub", pin);
//! assert_eq!(port.full_hier_name(), "core/sub/u1");
//! assert_eq!(port.hier_net_name().unwrap(), "core/sub/n1");
//! assert_eq!(port.to_string(), "core/sub/u1/O");
//! assert!(port.is_output());
//! ```
#![warn(missing_docs)]

use std::fmt::{Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

use arcstr::ArcStr;
use edif::{Direction, Netlist};

pub mod context;
pub mod error;
pub mod traverse;


pub use context::{NetlistContext, PhysicalContext};
pub use error::{Error, Result};

/// Separates instance names in hierarchical instance and net names.
///
/// Placed cells in a physical design are named with this separator. It is the
/// same separator the netlist uses to qualify port instance names.
pub const EDIF_HIER_SEP: &str = edif::HIER_SEP;

/// Separates the hierarchical prefix from the local name in display names
/// and transformed net names.
///
/// Not interchangeable with [`EDIF_HIER_SEP`], even though both are currently `/`.
pub const DISPLAY_SEP: &str = "/";

/// A port instance located in an instance hierarchy.
pub struct HierPortInst<'a, C: NetlistContext = Netlist> {
    /// The hierarchical name of the scope containing the port's owning instance.
    hier_name: ArcStr,
    netlist: &'a C,
    port_inst: C::PortInst,
}

fn join(prefix: &str, sep: &str, name: &str) -> ArcStr {
    if prefix.is_empty() {
        name.into()
    } else {
        arcstr::format!("{}{}{}", prefix, sep, name)
    }
}

/// Returns `true` if `name` is empty or a `EDIF_HIER_SEP`-joined list of non-empty segments.
fn is_well_formed(name: &str) -> bool {
    name.is_empty() || name.split(EDIF_HIER_SEP).all(|segment| !segment.is_empty())
}

impl<'a, C: NetlistContext> HierPortInst<'a, C> {
    /// Creates a reference to `port_inst` as seen from the scope `hier_name`.
    ///
    /// The name is stored verbatim. Use [`HierPortInst::try_new`] to check it.
    pub fn new(netlist: &'a C, hier_name: impl Into<ArcStr>, port_inst: C::PortInst) -> Self {
        Self {
            hier_name: hier_name.into(),
            netlist,
            port_inst,
        }
    }

    /// Creates a reference after checking that the hierarchical name is well
    /// formed and that the port instance belongs to the netlist.
    pub fn try_new(
        netlist: &'a C,
        hier_name: impl Into<ArcStr>,
        port_inst: C::PortInst,
    ) -> Result<Self> {
        let hier_name = hier_name.into();
        if !is_well_formed(&hier_name) {
            return Err(Error::MalformedHierName(hier_name));
        }
        if !netlist.contains_port_inst(port_inst) {
            return Err(Error::UnknownPortInst(
                format!("{:?}", port_inst),
                netlist.netlist_name().into(),
            ));
        }
        Ok(Self::new(netlist, hier_name, port_inst))
    }

    /// The hierarchical name of the scope containing the port's owning instance.
    #[inline]
    pub fn hier_name(&self) -> &ArcStr {
        &self.hier_name
    }

    /// Replaces the hierarchical name, e.g. when re-rooting the reference.
    #[inline]
    pub fn set_hier_name(&mut self, hier_name: impl Into<ArcStr>) {
        self.hier_name = hier_name.into();
    }

    /// The referenced port instance.
    #[inline]
    pub fn port_inst(&self) -> C::PortInst {
        self.port_inst
    }

    /// Replaces the referenced port instance.
    #[inline]
    pub fn set_port_inst(&mut self, port_inst: C::PortInst) {
        self.port_inst = port_inst;
    }

    /// The netlist this reference names into.
    #[inline]
    pub fn netlist(&self) -> &'a C {
        self.netlist
    }

    /// The net attached to the port instance, if any.
    pub fn net(&self) -> Option<C::Net> {
        self.netlist.net(self.port_inst)
    }

    /// The cell type of the port's owning instance.
    ///
    /// [`None`] for the inward-facing side of a cell's own port.
    pub fn cell_type(&self) -> Option<C::Cell> {
        self.netlist
            .cell_inst(self.port_inst)
            .map(|inst| self.netlist.cell_type(inst))
    }

    /// The full hierarchical name of the instance owning this port.
    ///
    /// * A port with no owning instance lives at the current scope, so the
    ///   hierarchical name is returned unchanged.
    /// * At the root scope, the top instance is named by the empty string and
    ///   any other instance by its bare name.
    /// * Otherwise the owning instance's name is appended to the hierarchical name.
    pub fn full_hier_name(&self) -> ArcStr {
        let Some(inst) = self.netlist.cell_inst(self.port_inst) else {
            return self.hier_name.clone();
        };
        if self.hier_name.is_empty() && self.netlist.top_cell_inst() == Some(inst) {
            return ArcStr::new();
        }
        join(
            &self.hier_name,
            EDIF_HIER_SEP,
            self.netlist.cell_inst_name(inst),
        )
    }

    /// The hierarchical name of the attached net.
    ///
    /// [`None`] if the port instance is not attached to a net.
    pub fn hier_net_name(&self) -> Option<ArcStr> {
        let net = self.net()?;
        Some(join(
            &self.hier_name,
            EDIF_HIER_SEP,
            self.netlist.net_name(net),
        ))
    }

    /// This port rendered as a flat scalar signal name.
    ///
    /// Scalar ports use the port instance's full name. Bus members, including
    /// the single member of a one-bit range such as `d[0:0]`, are named by
    /// their bus name followed by their physical bit position, so member 2 of
    /// a descending 8-bit bus `data[7:0]` becomes `data5`.
    pub fn transformed_net_name(&self) -> ArcStr {
        let port_name = if self.netlist.is_bus(self.port_inst) {
            let width = self.netlist.width(self.port_inst);
            let bit = self
                .netlist
                .bit_order(self.port_inst)
                .physical_index(width, self.netlist.member_index(self.port_inst));
            let bus_bit = arcstr::format!("{}{}", self.netlist.bus_name(self.port_inst), bit);
            match self.netlist.cell_inst(self.port_inst) {
                Some(inst) => arcstr::format!(
                    "{}{}{}",
                    self.netlist.cell_inst_name(inst),
                    EDIF_HIER_SEP,
                    bus_bit
                ),
                None => bus_bit,
            }
        } else {
            self.netlist.port_inst_full_name(self.port_inst)
        };
        join(&self.hier_name, DISPLAY_SEP, &port_name)
    }

    /// The declared direction of the port.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.netlist.direction(self.port_inst)
    }

    /// Returns `true` if the port is an output.
    ///
    /// Bidirectional ports are neither inputs nor outputs; see [`HierPortInst::is_inout`].
    #[inline]
    pub fn is_output(&self) -> bool {
        self.direction() == Direction::Output
    }

    /// Returns `true` if the port is an input.
    #[inline]
    pub fn is_input(&self) -> bool {
        self.direction() == Direction::Input
    }

    /// Returns `true` if the port is bidirectional.
    #[inline]
    pub fn is_inout(&self) -> bool {
        self.direction() == Direction::InOut
    }

    /// The routed physical pin this port is bound to.
    ///
    /// [`None`] if no cell is placed at [`full_hier_name`](HierPortInst::full_hier_name)
    /// or if the pin is not routed.
    pub fn routed_site_pin<'d, D: PhysicalContext>(&self, design: &'d D) -> Option<&'d D::SitePin> {
        let cell = self.placed_cell(design)?;
        let pin = self.netlist.port_inst_name(self.port_inst);
        let site_pin = design.site_pin(cell, &pin);
        if site_pin.is_none() {
            tracing::debug!(port = %self, pin = %pin, "logical pin is not routed to a site pin");
        }
        site_pin
    }

    /// Every routed physical pin this port fans out to.
    ///
    /// [`None`] if no cell is placed at [`full_hier_name`](HierPortInst::full_hier_name),
    /// so that an unplaced port can be told apart from a placed port with no
    /// routed pins.
    pub fn all_routed_site_pins<'d, D: PhysicalContext>(
        &self,
        design: &'d D,
    ) -> Option<Vec<&'d D::SitePin>> {
        let cell = self.placed_cell(design)?;
        let pin = self.netlist.port_inst_name(self.port_inst);
        Some(design.all_site_pins(cell, &pin))
    }

    fn placed_cell<'d, D: PhysicalContext>(&self, design: &'d D) -> Option<&'d D::Cell> {
        let name = self.full_hier_name();
        let cell = design.cell_at(&name);
        if cell.is_none() {
            tracing::debug!(port = %self, cell = %name, "no cell is placed for port");
        }
        cell
    }
}

impl<C: NetlistContext> Clone for HierPortInst<'_, C> {
    fn clone(&self) -> Self {
        Self {
            hier_name: self.hier_name.clone(),
            netlist: self.netlist,
            port_inst: self.port_inst,
        }
    }
}

impl<C: NetlistContext> PartialEq for HierPortInst<'_, C> {
    fn eq(&self, other: &Self) -> bool {
        self.hier_name == other.hier_name
            && std::ptr::eq(self.netlist, other.netlist)
            && self.port_inst == other.port_inst
    }
}

impl<C: NetlistContext> Eq for HierPortInst<'_, C> {}

impl<C: NetlistContext> Hash for HierPortInst<'_, C> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hier_name.hash(state);
        self.port_inst.hash(state);
    }
}

impl<C: NetlistContext> Debug for HierPortInst<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HierPortInst")
            .field("hier_name", &self.hier_name)
            .field("netlist", &self.netlist.netlist_name())
            .field("port_inst", &self.port_inst)
            .finish()
    }
}

/// A human-readable name for debugging.
///
/// Not interchangeable with [`HierPortInst::full_hier_name`] or
/// [`HierPortInst::transformed_net_name`].
impl<C: NetlistContext> Display for HierPortInst<'_, C> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = self.netlist.port_inst_full_name(self.port_inst);
        if self.hier_name.is_empty() {
            write!(f, "{}", name)
        } else {
            write!(f, "{}{}{}", self.hier_name, DISPLAY_SEP, name)
        }
    }
}
