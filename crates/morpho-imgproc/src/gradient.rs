use ndarray::{Array, ArrayBase, Data, DataMut, Dimension};

use morpho_strel::StructuringElement;

use crate::error::MorphologyError;
use crate::filter::{check_pixel, check_shape, extreme_filter_with};
use crate::parallel::{iter_pixel_pairs_with, iter_pixels_with, ExecutionStrategy};
use crate::pixel::Promote;

/// Which pair of images a morphological gradient subtracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GradientMode {
    /// `dilate(A) - erode(A)`, symmetric around the edge.
    #[default]
    Beucher,
    /// `dilate(A) - A`, the outer half of the edge.
    External,
    /// `A - erode(A)`, the inner half of the edge.
    Internal,
}

/// Fail unless `se`, aligned to `ndim` dimensions, is closed under negation.
fn check_symmetric(se: &StructuringElement, ndim: usize) -> Result<(), MorphologyError> {
    if !se.align(ndim)?.is_symmetric() {
        return Err(MorphologyError::AsymmetricStrel);
    }
    Ok(())
}

/// Compute a morphological gradient into `dst`, using `scratch` for the filtered images.
///
/// # Arguments
///
/// * `src` - The source array.
/// * `dst` - The signed destination array.
/// * `scratch` - A buffer of the source element type and shape.
/// * `se` - The structuring element.
/// * `mode` - The gradient flavour.
/// * `strategy` - How the filter and difference passes are scheduled.
///
/// # Errors
///
/// [`GradientMode::Beucher`] requires a symmetric element and fails with
/// [`MorphologyError::AsymmetricStrel`] otherwise.
pub fn gradient_with<T, S1, S2, S3, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    scratch: &mut ArrayBase<S3, D>,
    se: &StructuringElement,
    mode: GradientMode,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError>
where
    T: Promote,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T::Signed>,
    S3: DataMut<Elem = T>,
    D: Dimension,
{
    check_pixel::<T>()?;
    check_shape(src.shape(), dst.shape())?;
    check_shape(src.shape(), scratch.shape())?;

    match mode {
        GradientMode::Beucher => {
            check_symmetric(se, src.ndim())?;
            extreme_filter_with(T::sup, src, scratch, se, strategy)?;
            iter_pixels_with(scratch.view(), dst.view_mut(), strategy, |d, &s| {
                *d = s.to_signed()
            })?;
            extreme_filter_with(T::inf, src, scratch, se, strategy)?;
            iter_pixels_with(scratch.view(), dst.view_mut(), strategy, |d, &s| {
                *d = *d - s.to_signed()
            })?;
        }
        GradientMode::External => {
            extreme_filter_with(T::sup, src, scratch, se, strategy)?;
            iter_pixel_pairs_with(
                src.view(),
                scratch.view(),
                dst.view_mut(),
                strategy,
                |d, &a, &s| *d = s.to_signed() - a.to_signed(),
            )?;
        }
        GradientMode::Internal => {
            extreme_filter_with(T::inf, src, scratch, se, strategy)?;
            iter_pixel_pairs_with(
                src.view(),
                scratch.view(),
                dst.view_mut(),
                strategy,
                |d, &a, &s| *d = a.to_signed() - s.to_signed(),
            )?;
        }
    }
    Ok(())
}

/// Compute a morphological gradient into `dst` on the default strategy.
pub fn gradient_into<T, S1, S2, S3, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    scratch: &mut ArrayBase<S3, D>,
    se: &StructuringElement,
    mode: GradientMode,
) -> Result<(), MorphologyError>
where
    T: Promote,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T::Signed>,
    S3: DataMut<Elem = T>,
    D: Dimension,
{
    gradient_with(src, dst, scratch, se, mode, ExecutionStrategy::default())
}

/// Compute a morphological gradient.
///
/// The result uses the signed companion type of the input, so `u8` images give `i16`
/// gradients. Every mode is non-negative for any structuring element containing the origin.
///
/// # Example
///
/// ```rust
/// use morpho_imgproc::gradient::{gradient, GradientMode};
/// use morpho_strel::StructuringElement;
/// use ndarray::arr1;
///
/// let a = arr1(&[0u8, 0, 10, 10, 10]);
/// let se = StructuringElement::unit_box(1);
/// let g = gradient(&a, &se, GradientMode::Beucher).unwrap();
/// assert_eq!(g, arr1(&[0i16, 10, 10, 0, 0]));
/// ```
pub fn gradient<T, S, D>(
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
    mode: GradientMode,
) -> Result<Array<T::Signed, D>, MorphologyError>
where
    T: Promote,
    S: Data<Elem = T>,
    D: Dimension,
{
    check_pixel::<T>()?;
    let mut dst = src.mapv(Promote::to_signed);
    let mut scratch = src.to_owned();
    gradient_into(src, &mut dst, &mut scratch, se, mode)?;
    Ok(dst)
}

/// Compute the morphological laplacian into `dst`, scheduled by `strategy`.
///
/// The structuring element must be symmetric.
pub fn laplacian_with<T, S1, S2, S3, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    scratch: &mut ArrayBase<S3, D>,
    se: &StructuringElement,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError>
where
    T: Promote,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T::Signed>,
    S3: DataMut<Elem = T>,
    D: Dimension,
{
    check_pixel::<T>()?;
    check_shape(src.shape(), dst.shape())?;
    check_shape(src.shape(), scratch.shape())?;
    check_symmetric(se, src.ndim())?;

    extreme_filter_with(T::sup, src, scratch, se, strategy)?;
    iter_pixel_pairs_with(
        src.view(),
        scratch.view(),
        dst.view_mut(),
        strategy,
        |d, &a, &s| *d = s.to_signed() - a.to_signed(),
    )?;

    extreme_filter_with(T::inf, src, scratch, se, strategy)?;
    iter_pixel_pairs_with(
        src.view(),
        scratch.view(),
        dst.view_mut(),
        strategy,
        |d, &a, &s| *d = *d - (a.to_signed() - s.to_signed()),
    )?;
    Ok(())
}

/// Compute the morphological laplacian into `dst`: `(dilate(A) - A) - (A - erode(A))`.
///
/// The structuring element must be symmetric.
pub fn laplacian_into<T, S1, S2, S3, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    scratch: &mut ArrayBase<S3, D>,
    se: &StructuringElement,
) -> Result<(), MorphologyError>
where
    T: Promote,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T::Signed>,
    S3: DataMut<Elem = T>,
    D: Dimension,
{
    laplacian_with(src, dst, scratch, se, ExecutionStrategy::default())
}

/// Compute the morphological laplacian, the difference of the external and internal
/// gradients.
///
/// Positive values lie on the dark side of an edge, negative values on the bright side.
pub fn laplacian<T, S, D>(
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T::Signed, D>, MorphologyError>
where
    T: Promote,
    S: Data<Elem = T>,
    D: Dimension,
{
    check_pixel::<T>()?;
    let mut dst = src.mapv(Promote::to_signed);
    let mut scratch = src.to_owned();
    laplacian_into(src, &mut dst, &mut scratch, se)?;
    Ok(dst)
}
