#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for morphological operations.
pub mod error;

/// The extreme filter engine.
pub mod filter;

/// morphological gradients and laplacian.
pub mod gradient;

/// erosion, dilation and the operators built from them.
pub mod ops;

/// parallel execution utilities.
pub mod parallel;

/// Element types the operators accept.
pub mod pixel;

/// Morphological reconstruction and geodesic operators.
pub mod reconstruct;

pub use crate::error::MorphologyError;
pub use crate::gradient::GradientMode;
pub use crate::ops::MorphOp;
pub use crate::parallel::ExecutionStrategy;
pub use crate::pixel::{Pixel, Promote};
pub use crate::reconstruct::ReconstructConfig;
