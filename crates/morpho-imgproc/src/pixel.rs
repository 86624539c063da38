use std::fmt::Debug;

/// Element types morphological operators can work on.
///
/// Morphology needs a total order on the pixel values. Multi-channel types may implement
/// this trait so they can be stored in the same arrays, but they report more than one
/// channel and every operator rejects them before computing anything.
pub trait Pixel: Copy + PartialOrd + Debug + Send + Sync + 'static {
    /// The number of channels of one pixel; only `1` is accepted by the operators.
    const CHANNELS: usize = 1;

    /// The infimum (minimum) of two pixels.
    fn inf(self, other: Self) -> Self;

    /// The supremum (maximum) of two pixels.
    fn sup(self, other: Self) -> Self;

    /// The smallest representable value.
    fn min_value() -> Self;

    /// The largest representable value.
    fn max_value() -> Self;

    /// An order-reversing involution on the value range.
    ///
    /// `MAX - x` for unsigned integers and booleans, bitwise not for signed integers and
    /// negation for floats.
    fn complement(self) -> Self;
}

/// Promotion to a signed type for operators whose results may be negative.
pub trait Promote: Pixel {
    /// The signed type the difference of two pixels is computed in.
    type Signed: num_traits::Signed + Copy + PartialOrd + Debug + Send + Sync + 'static;

    /// Convert the pixel to the signed type, losslessly.
    fn to_signed(self) -> Self::Signed;
}

macro_rules! impl_int_pixel {
    ($($t:ty => $s:ty),*) => {$(
        impl Pixel for $t {
            fn inf(self, other: Self) -> Self {
                Ord::min(self, other)
            }

            fn sup(self, other: Self) -> Self {
                Ord::max(self, other)
            }

            fn min_value() -> Self {
                <$t as num_traits::Bounded>::min_value()
            }

            fn max_value() -> Self {
                <$t as num_traits::Bounded>::max_value()
            }

            fn complement(self) -> Self {
                !self
            }
        }

        impl Promote for $t {
            type Signed = $s;

            fn to_signed(self) -> $s {
                <$s>::from(self)
            }
        }
    )*};
}

impl_int_pixel!(
    u8 => i16, u16 => i32, u32 => i64, u64 => i128,
    i8 => i16, i16 => i32, i32 => i64, i64 => i128
);

macro_rules! impl_float_pixel {
    ($($t:ty),*) => {$(
        impl Pixel for $t {
            fn inf(self, other: Self) -> Self {
                self.min(other)
            }

            fn sup(self, other: Self) -> Self {
                self.max(other)
            }

            fn min_value() -> Self {
                <$t>::MIN
            }

            fn max_value() -> Self {
                <$t>::MAX
            }

            fn complement(self) -> Self {
                -self
            }
        }

        impl Promote for $t {
            type Signed = $t;

            fn to_signed(self) -> $t {
                self
            }
        }
    )*};
}

impl_float_pixel!(f32, f64);

impl Pixel for bool {
    fn inf(self, other: Self) -> Self {
        self & other
    }

    fn sup(self, other: Self) -> Self {
        self | other
    }

    fn min_value() -> Self {
        false
    }

    fn max_value() -> Self {
        true
    }

    fn complement(self) -> Self {
        !self
    }
}

impl Promote for bool {
    type Signed = i8;

    fn to_signed(self) -> i8 {
        i8::from(self)
    }
}

/// A three channel colour pixel.
///
/// Colours carry no total order, so morphological operators reject arrays of this type
/// with [`crate::MorphologyError::UnsupportedElementType`].
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd)]
pub struct Rgb<T> {
    /// The red channel.
    pub r: T,
    /// The green channel.
    pub g: T,
    /// The blue channel.
    pub b: T,
}

impl<T: Pixel> Pixel for Rgb<T> {
    const CHANNELS: usize = 3;

    fn inf(self, other: Self) -> Self {
        Self {
            r: self.r.inf(other.r),
            g: self.g.inf(other.g),
            b: self.b.inf(other.b),
        }
    }

    fn sup(self, other: Self) -> Self {
        Self {
            r: self.r.sup(other.r),
            g: self.g.sup(other.g),
            b: self.b.sup(other.b),
        }
    }

    fn min_value() -> Self {
        let v = T::min_value();
        Self { r: v, g: v, b: v }
    }

    fn max_value() -> Self {
        let v = T::max_value();
        Self { r: v, g: v, b: v }
    }

    fn complement(self) -> Self {
        Self {
            r: self.r.complement(),
            g: self.g.complement(),
            b: self.b.complement(),
        }
    }
}
