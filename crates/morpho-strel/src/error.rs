/// An error type for building and aligning structuring elements.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum StrelError {
    /// The mask has an even extent along some dimension and thus no center.
    #[error("Invalid mask shape {0:?}: every extent must be odd")]
    InvalidShape(Vec<usize>),

    /// The structuring element rank cannot be broadcast to the array rank.
    #[error("Dimension mismatch: structuring element of rank {0} cannot align with rank {1}")]
    DimensionMismatch(usize, usize),

    /// An active dimension is out of range for the structuring element rank.
    #[error("Dimension {0} is out of bounds for rank {1}")]
    InvalidDimension(usize, usize),
}
