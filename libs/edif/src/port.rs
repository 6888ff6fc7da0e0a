//! Port definitions and bus naming.

use std::fmt::{Display, Formatter};

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::CellId;

/// Port directions.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Input.
    Input,
    /// Output.
    Output,
    /// Bidirectional.
    #[default]
    InOut,
}

impl Direction {
    /// Returns the flipped direction.
    ///
    /// [`Direction::InOut`] is unchanged by flipping.
    ///
    /// # Examples
    ///
    /// ```
    /// use edif::Direction;
    /// assert_eq!(Direction::Input.flip(), Direction::Output);
    /// assert_eq!(Direction::InOut.flip(), Direction::InOut);
    /// ```
    #[inline]
    pub fn flip(&self) -> Self {
        match *self {
            Self::Input => Self::Output,
            Self::Output => Self::Input,
            Self::InOut => Self::InOut,
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match *self {
            Self::Input => write!(f, "input"),
            Self::Output => write!(f, "output"),
            Self::InOut => write!(f, "inout"),
        }
    }
}

/// The declared bit order of a bus.
///
/// Member indices are stored left to right as written in the declaration,
/// so member 0 of `data[7:0]` is bit 7 and member 0 of `data[0:7]` is bit 0.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BitOrder {
    /// Least significant bit first, e.g. `data[0:7]`.
    Ascending,
    /// Most significant bit first, e.g. `data[7:0]`.
    #[default]
    Descending,
}

impl BitOrder {
    /// Maps a stored member index to the physical bit position.
    ///
    /// # Examples
    ///
    /// ```
    /// use edif::BitOrder;
    /// assert_eq!(BitOrder::Ascending.physical_index(8, 2), 2);
    /// assert_eq!(BitOrder::Descending.physical_index(8, 2), 5);
    /// ```
    #[inline]
    pub const fn physical_index(&self, width: usize, index: usize) -> usize {
        match *self {
            Self::Ascending => index,
            Self::Descending => width - 1 - index,
        }
    }
}

/// A port declared on a cell.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub(crate) name: ArcStr,
    pub(crate) bus_name: ArcStr,
    pub(crate) direction: Direction,
    pub(crate) width: usize,
    /// Set if the port was declared with a range, even a one-bit one.
    #[serde(default)]
    pub(crate) ranged: bool,
    pub(crate) order: BitOrder,
    pub(crate) cell: CellId,
}

impl Port {
    /// Creates a port by parsing its declared name.
    ///
    /// Scalar ports are plain identifiers. Buses are written `name[msb:lsb]`
    /// or `name[lsb:msb]`, and one of the bounds must be 0.
    pub(crate) fn parse(cell: CellId, name: &str, direction: Direction) -> Result<Self> {
        let invalid = || Error::InvalidPortName(name.into());
        let Some(open) = name.find('[') else {
            if name.is_empty() || name.contains(']') {
                return Err(invalid());
            }
            return Ok(Self {
                name: name.into(),
                bus_name: name.into(),
                direction,
                width: 1,
                ranged: false,
                order: BitOrder::default(),
                cell,
            });
        };

        let bus_name = &name[..open];
        let range = name[open + 1..].strip_suffix(']').ok_or_else(invalid)?;
        let (left, right) = range.split_once(':').ok_or_else(invalid)?;
        let left: usize = left.trim().parse().map_err(|_| invalid())?;
        let right: usize = right.trim().parse().map_err(|_| invalid())?;
        if bus_name.is_empty() {
            return Err(invalid());
        }
        if left.min(right) != 0 {
            return Err(Error::UnsupportedBusRange { name: name.into() });
        }

        Ok(Self {
            name: name.into(),
            bus_name: bus_name.into(),
            direction,
            width: left.abs_diff(right) + 1,
            ranged: true,
            order: if left < right {
                BitOrder::Ascending
            } else {
                BitOrder::Descending
            },
            cell,
        })
    }

    /// The declared name, including any bus range.
    #[inline]
    pub fn name(&self) -> &ArcStr {
        &self.name
    }

    /// The name without the bus range.
    ///
    /// Equal to [`Port::name`] for scalar ports.
    #[inline]
    pub fn bus_name(&self) -> &ArcStr {
        &self.bus_name
    }

    /// The direction of this port.
    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The number of bits in this port.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Returns `true` if this port was declared with a bus range.
    ///
    /// A one-bit range such as `d[0:0]` is still a bus.
    #[inline]
    pub fn is_bus(&self) -> bool {
        self.ranged
    }

    /// The declared bit order.
    #[inline]
    pub fn bit_order(&self) -> BitOrder {
        self.order
    }

    /// The cell on which this port is declared.
    #[inline]
    pub fn cell(&self) -> CellId {
        self.cell
    }

    /// The name of a single member of this port.
    ///
    /// Scalar ports are named by their port name. Bus members are named by
    /// their physical bit position, e.g. member 2 of `data[7:0]` is `data[5]`.
    pub fn member_name(&self, index: usize) -> ArcStr {
        if self.is_bus() {
            arcstr::format!(
                "{}[{}]",
                self.bus_name,
                self.order.physical_index(self.width, index)
            )
        } else {
            self.name.clone()
        }
    }
}
