#![doc = include_str!(concat!("../", env!("CARGO_PKG_README")))]

#[doc(inline)]
pub use morpho_strel as strel;

#[doc(inline)]
pub use morpho_imgproc as imgproc;
