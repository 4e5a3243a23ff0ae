use std::fmt;

use thiserror::Error;

/// Which size a [`GridError::InvalidDimension`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dimension {
    Width,
    Height,
    CellSize,
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dimension::Width => "width",
            Dimension::Height => "height",
            Dimension::CellSize => "cell size",
        })
    }
}

/// Errors raised by grid construction and structural edits.
///
/// Coordinates outside a grid are never an error: reads return the empty
/// marker and writes are dropped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GridError {
    /// A width, height or cell size of zero.
    #[error("Invalid grid {0}: must be positive")]
    InvalidDimension(Dimension),

    #[error("Unknown layer kind '{0}'")]
    InvalidLayerKind(String),
}

pub type Result<T> = std::result::Result<T, GridError>;

pub(crate) fn check_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 {
        return Err(GridError::InvalidDimension(Dimension::Width));
    }
    if height == 0 {
        return Err(GridError::InvalidDimension(Dimension::Height));
    }
    Ok(())
}

pub(crate) fn check_cell_size(cell_size: u32) -> Result<()> {
    if cell_size == 0 {
        return Err(GridError::InvalidDimension(Dimension::CellSize));
    }
    Ok(())
}
