use morpho_strel::StrelError;
use thiserror::Error;

use crate::ops::MorphOp;
use crate::parallel::ParallelError;

/// An error type for morphological operations.
#[derive(Error, Debug, PartialEq)]
pub enum MorphologyError {
    /// The element type is not a totally ordered scalar (e.g. a colour pixel).
    #[error("Unsupported element type with {0} channels, morphology needs an ordered scalar")]
    UnsupportedElementType(usize),

    /// Two arrays that must share a shape do not.
    #[error("Shape mismatch: {0:?} != {1:?}")]
    ShapeMismatch(Vec<usize>, Vec<usize>),

    /// The operation is not valid in this context.
    #[error("Unsupported operation {0:?}")]
    UnsupportedOperation(MorphOp),

    /// The operation requires a structuring element closed under negation.
    #[error("The structuring element must be symmetric")]
    AsymmetricStrel,

    /// Structuring element error.
    #[error(transparent)]
    Strel(#[from] StrelError),

    /// Parallel execution error.
    #[error(transparent)]
    Parallel(#[from] ParallelError),
}
