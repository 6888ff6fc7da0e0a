//! Physical design database.
//!
//! A [`Design`] records where the leaf cells of a logical netlist are
//! placed and which site pins each of their logical pins is routed to.
//! Cells are keyed by their full hierarchical instance name, e.g.
//! `u_core/u_reg/ff0`, which must match the naming used by the logical side.
//!
//! A logical pin may be bound to several site pins (for example a flop
//! output that leaves its site through both a dedicated and a multiplexed
//! pin). Only bound site pins that carry a net are considered routed.
//!
//! Designs can be loaded from TOML:
//!
//! ```
//! use design::Design;
//!
//! let design = Design::from_toml_str(r#"
//!     name = "blinky"
//!
//!     [sites.SLICE_X0Y0.pins.AQ]
//!     direction = "output"
//!     net = "led"
//!
//!     [cells."u_blink/ff0"]
//!     site = "SLICE_X0Y0"
//!     bel = "AFF"
//!     pins = { Q = ["AQ"] }
//! "#).unwrap();
//!
//! let cell = design.cell("u_blink/ff0").unwrap();
//! let pin = design.site_pin_from_logical_pin(cell, "Q").unwrap();
//! assert_eq!(pin.name(), "AQ");
//! assert_eq!(pin.net().map(|n| n.as_str()), Some("led"));
//! ```
#![warn(missing_docs)]

use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

pub mod error;


pub use error::{Error, Result};

/// The direction of a site pin.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PinDirection {
    /// Enters the site.
    Input,
    /// Leaves the site.
    Output,
}

/// A placed and routed design.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Design {
    name: ArcStr,
    #[serde(default)]
    sites: IndexMap<ArcStr, Site>,
    #[serde(default)]
    cells: IndexMap<ArcStr, Cell>,
}

/// A site and its pins.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Site {
    #[serde(skip)]
    name: ArcStr,
    #[serde(default)]
    pins: IndexMap<ArcStr, SitePinInst>,
}

/// A pin on a site, possibly routed to a physical net.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct SitePinInst {
    #[serde(skip)]
    site: ArcStr,
    #[serde(skip)]
    name: ArcStr,
    direction: PinDirection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    net: Option<ArcStr>,
}

/// A leaf cell placed on a BEL of a site.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    #[serde(skip)]
    name: ArcStr,
    site: ArcStr,
    bel: ArcStr,
    /// Logical pin name to the names of the site pins it is bound to.
    #[serde(default)]
    pins: IndexMap<ArcStr, Vec<ArcStr>>,
}

impl Design {
    /// Creates an empty design.
    pub fn new(name: impl Into<ArcStr>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Loads a design from a TOML document.
    ///
    /// Site and pin names are taken from their table keys. Every cell must be
    /// placed on a declared site and bind only to pins of that site.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut design: Design = toml::from_str(s)?;
        for (name, site) in design.sites.iter_mut() {
            site.name = name.clone();
            for (pin_name, pin) in site.pins.iter_mut() {
                pin.site = name.clone();
                pin.name = pin_name.clone();
            }
        }
        for (name, cell) in design.cells.iter_mut() {
            cell.name = name.clone();
        }
        design.check_bindings()?;
        tracing::debug!(
            design = %design.name,
            sites = design.sites.len(),
            cells = design.cells.len(),
            "loaded design"
        );
        Ok(design)
    }

    fn check_bindings(&self) -> Result<()> {
        for cell in self.cells.values() {
            let site = self.sites.get(&cell.site).ok_or_else(|| Error::UnknownSite {
                cell: cell.name.clone(),
                site: cell.site.clone(),
            })?;
            for pin in cell.pins.values().flatten() {
                if !site.pins.contains_key(pin) {
                    return Err(Error::UnknownSitePin {
                        cell: cell.name.clone(),
                        site: cell.site.clone(),
                        pin: pin.clone(),
                    });
                }
            }
        }
        Ok(())
    }

    /// The name of the design.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Declares a pin on a site, creating the site if needed.
    ///
    /// The pin starts out unrouted. An existing pin with the same name is replaced.
    pub fn add_site_pin(
        &mut self,
        site: impl Into<ArcStr>,
        pin: impl Into<ArcStr>,
        direction: PinDirection,
    ) -> &mut SitePinInst {
        let site = site.into();
        let pin = pin.into();
        let entry = self.sites.entry(site.clone()).or_insert_with(|| Site {
            name: site.clone(),
            pins: IndexMap::new(),
        });
        entry.pins.insert(
            pin.clone(),
            SitePinInst {
                site,
                name: pin.clone(),
                direction,
                net: None,
            },
        );
        &mut entry.pins[&pin]
    }

    /// Places a cell under its full hierarchical name.
    pub fn place_cell(
        &mut self,
        name: impl Into<ArcStr>,
        site: impl Into<ArcStr>,
        bel: impl Into<ArcStr>,
    ) -> Result<&mut Cell> {
        let name = name.into();
        let site = site.into();
        if self.cells.contains_key(&name) {
            return Err(Error::DuplicateCell(name));
        }
        if !self.sites.contains_key(&site) {
            return Err(Error::UnknownSite { cell: name, site });
        }
        let cell = Cell {
            name: name.clone(),
            site,
            bel: bel.into(),
            pins: IndexMap::new(),
        };
        Ok(self.cells.entry(name).or_insert(cell))
    }

    /// Binds a logical pin of a placed cell to a pin of the cell's site.
    ///
    /// A logical pin may be bound to several site pins.
    pub fn bind_pin(&mut self, cell: &str, logical_pin: &str, site_pin: &str) -> Result<()> {
        let cell = self
            .cells
            .get_mut(cell)
            .ok_or_else(|| Error::UnknownCell(cell.into()))?;
        let known = self
            .sites
            .get(&cell.site)
            .is_some_and(|site| site.pins.contains_key(site_pin));
        if !known {
            return Err(Error::UnknownSitePin {
                cell: cell.name.clone(),
                site: cell.site.clone(),
                pin: site_pin.into(),
            });
        }
        cell.pins
            .entry(logical_pin.into())
            .or_default()
            .push(site_pin.into());
        Ok(())
    }

    /// Gets the cell placed under the given full hierarchical name.
    #[inline]
    pub fn cell(&self, name: &str) -> Option<&Cell> {
        self.cells.get(name)
    }

    /// Iterates over placed cells in placement order.
    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.cells.values()
    }

    /// Gets a site by name.
    #[inline]
    pub fn site(&self, name: &str) -> Option<&Site> {
        self.sites.get(name)
    }

    /// Gets a site pin by site and pin name.
    pub fn site_pin(&self, site: &str, pin: &str) -> Option<&SitePinInst> {
        self.sites.get(site)?.pins.get(pin)
    }

    /// Gets a mutable site pin by site and pin name.
    pub fn site_pin_mut(&mut self, site: &str, pin: &str) -> Option<&mut SitePinInst> {
        self.sites.get_mut(site)?.pins.get_mut(pin)
    }

    /// The first routed site pin bound to a logical pin of `cell`.
    pub fn site_pin_from_logical_pin<'a>(
        &'a self,
        cell: &Cell,
        logical_pin: &str,
    ) -> Option<&'a SitePinInst> {
        let site = self.sites.get(&cell.site)?;
        cell.bound_site_pins(logical_pin)
            .iter()
            .filter_map(|pin| site.pins.get(pin))
            .find(|pin| pin.is_routed())
    }

    /// Every routed site pin bound to a logical pin of `cell`.
    ///
    /// Empty if the pin is unbound or none of its site pins are routed.
    pub fn all_site_pins_from_logical_pin<'a>(
        &'a self,
        cell: &Cell,
        logical_pin: &str,
    ) -> Vec<&'a SitePinInst> {
        let Some(site) = self.sites.get(&cell.site) else {
            return Vec::new();
        };
        cell.bound_site_pins(logical_pin)
            .iter()
            .filter_map(|pin| site.pins.get(pin))
            .filter(|pin| pin.is_routed())
            .collect()
    }
}

impl Site {
    /// The name of the site.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// Iterates over the pins of this site.
    pub fn pins(&self) -> impl Iterator<Item = &SitePinInst> {
        self.pins.values()
    }
}

impl SitePinInst {
    /// The site this pin belongs to.
    #[inline]
    pub fn site(&self) -> &ArcStr {
        &self.site
    }

    /// The name of this pin on its site.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The direction of this pin.
    #[inline]
    pub fn direction(&self) -> PinDirection {
        self.direction
    }

    /// Returns `true` if this pin leaves its site.
    #[inline]
    pub fn is_output(&self) -> bool {
        self.direction == PinDirection::Output
    }

    /// The physical net routed to this pin, if any.
    #[inline]
    pub fn net(&self) -> Option<&ArcStr> {
        self.net.as_ref()
    }

    /// Returns `true` if a net is routed to this pin.
    #[inline]
    pub fn is_routed(&self) -> bool {
        self.net.is_some()
    }

    /// Routes a net to this pin, or unroutes it with [`None`].
    pub fn set_net(&mut self, net: Option<ArcStr>) {
        self.net = net;
    }
}

impl Display for SitePinInst {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.site, self.name)
    }
}

impl Cell {
    /// The full hierarchical name of this cell.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The site this cell is placed on.
    #[inline]
    pub fn site(&self) -> &ArcStr {
        &self.site
    }

    /// The BEL within the site.
    #[inline]
    pub fn bel(&self) -> &ArcStr {
        &self.bel
    }

    /// The site pin names bound to a logical pin.
    pub fn bound_site_pins(&self, logical_pin: &str) -> &[ArcStr] {
        self.pins
            .get(logical_pin)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }
}
