//! Physical design error types.

use arcstr::ArcStr;

/// A result type whose error is a design [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// An error encountered while building or loading a design.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The input could not be decoded as a design.
    #[error("could not parse design as TOML")]
    Toml(#[from] toml::de::Error),
    /// A cell is already placed under the given name.
    #[error("a cell named `{0}` is already placed")]
    DuplicateCell(ArcStr),
    /// No cell is placed under the given name.
    #[error("no cell named `{0}` is placed")]
    UnknownCell(ArcStr),
    /// A cell refers to a site that does not exist.
    #[error("cell `{cell}` is placed on unknown site `{site}`")]
    UnknownSite {
        /// The cell name.
        cell: ArcStr,
        /// The missing site.
        site: ArcStr,
    },
    /// A logical pin is bound to a site pin that does not exist.
    #[error("cell `{cell}` binds a pin to unknown site pin `{site}/{pin}`")]
    UnknownSitePin {
        /// The cell name.
        cell: ArcStr,
        /// The cell's site.
        site: ArcStr,
        /// The missing site pin.
        pin: ArcStr,
    },
}
