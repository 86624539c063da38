#![deny(missing_docs)]
#![doc = env!("CARGO_PKG_DESCRIPTION")]

/// Error types for structuring elements.
pub mod error;

/// Structuring elements given by explicit offsets.
pub mod mask;

/// Separable (box and diamond) structuring elements.
pub mod separable;

/// The structuring element model.
pub mod strel;

pub use crate::error::StrelError;
pub use crate::mask::MaskStrel;
pub use crate::separable::SeparableStrel;
pub use crate::strel::StructuringElement;
