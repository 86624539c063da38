use ndarray::{Array, ArrayBase, Data, DataMut, Dimension};

use morpho_strel::StructuringElement;

use crate::error::MorphologyError;
use crate::filter::{
    check_pixel, check_shape, extreme_filter_inplace, extreme_filter_into, extreme_filter_with,
};
use crate::gradient::GradientMode;
use crate::parallel::{iter_pixel_pairs_with, ExecutionStrategy};
use crate::pixel::{Pixel, Promote};

/// Named morphological operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MorphOp {
    /// Extreme filter with the infimum.
    Erode,
    /// Extreme filter with the supremum.
    Dilate,
    /// Erosion followed by dilation.
    Opening,
    /// Dilation followed by erosion.
    Closing,
    /// The input minus its opening.
    TopHat,
    /// The closing minus the input.
    BottomHat,
    /// A morphological gradient.
    Gradient(GradientMode),
    /// The morphological laplacian.
    Laplacian,
}

/// Erode `src` into `dst`: every pixel becomes the minimum over its neighborhood.
///
/// # Arguments
///
/// * `src` - The source array.
/// * `dst` - The destination array (will be overwritten).
/// * `se` - The structuring element.
///
/// # Returns
///
/// Ok(()) on success, or [`MorphologyError`] if the inputs are invalid.
pub fn erode_into<T, S1, S2, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    se: &StructuringElement,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T>,
    D: Dimension,
{
    extreme_filter_into(T::inf, src, dst, se)
}

/// Dilate `src` into `dst`: every pixel becomes the maximum over its neighborhood.
///
/// # Arguments
///
/// * `src` - The source array.
/// * `dst` - The destination array (will be overwritten).
/// * `se` - The structuring element.
///
/// # Returns
///
/// Ok(()) on success, or [`MorphologyError`] if the inputs are invalid.
pub fn dilate_into<T, S1, S2, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    se: &StructuringElement,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T>,
    D: Dimension,
{
    extreme_filter_into(T::sup, src, dst, se)
}

/// Opening into `dst`, using `scratch` for the intermediate erosion, scheduled by `strategy`.
///
/// Removes bright structures smaller than the structuring element.
///
/// # Arguments
///
/// * `src` - The source array.
/// * `dst` - The destination array (will be overwritten).
/// * `scratch` - A buffer of the source shape (will be overwritten).
/// * `se` - The structuring element.
/// * `strategy` - How every pass is scheduled.
pub fn opening_with<T, S1, S2, S3, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    scratch: &mut ArrayBase<S3, D>,
    se: &StructuringElement,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T>,
    S3: DataMut<Elem = T>,
    D: Dimension,
{
    check_shape(src.shape(), dst.shape())?;
    check_shape(src.shape(), scratch.shape())?;
    extreme_filter_with(T::inf, src, scratch, se, strategy)?;
    extreme_filter_with(T::sup, scratch, dst, se, strategy)
}

/// Opening into `dst`, using `scratch` for the intermediate erosion.
pub fn opening_into<T, S1, S2, S3, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    scratch: &mut ArrayBase<S3, D>,
    se: &StructuringElement,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T>,
    S3: DataMut<Elem = T>,
    D: Dimension,
{
    opening_with(src, dst, scratch, se, ExecutionStrategy::default())
}

/// Closing into `dst`, using `scratch` for the intermediate dilation, scheduled by `strategy`.
///
/// Fills dark structures smaller than the structuring element.
pub fn closing_with<T, S1, S2, S3, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    scratch: &mut ArrayBase<S3, D>,
    se: &StructuringElement,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T>,
    S3: DataMut<Elem = T>,
    D: Dimension,
{
    check_shape(src.shape(), dst.shape())?;
    check_shape(src.shape(), scratch.shape())?;
    extreme_filter_with(T::sup, src, scratch, se, strategy)?;
    extreme_filter_with(T::inf, scratch, dst, se, strategy)
}

/// Closing into `dst`, using `scratch` for the intermediate dilation.
pub fn closing_into<T, S1, S2, S3, D>(
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    scratch: &mut ArrayBase<S3, D>,
    se: &StructuringElement,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T>,
    S3: DataMut<Elem = T>,
    D: Dimension,
{
    closing_with(src, dst, scratch, se, ExecutionStrategy::default())
}

/// Top-hat into `dst`, scheduled by `strategy`. `scratch` ends up holding the opening.
pub fn tophat_with<T, S1, S2, S3, D>(
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
    check_shape(src.shape(), dst.shape())?;
    check_shape(src.shape(), scratch.shape())?;
    extreme_filter_with(T::inf, src, scratch, se, strategy)?;
    let eroded = scratch.to_owned();
    extreme_filter_with(T::sup, &eroded, scratch, se, strategy)?;
    iter_pixel_pairs_with(
        src.view(),
        scratch.view(),
        dst.view_mut(),
        strategy,
        |d, &a, &opened| *d = a.to_signed() - opened.to_signed(),
    )?;
    Ok(())
}

/// Top-hat into `dst`: `src - opening(src)` in the promoted signed type.
pub fn tophat_into<T, S1, S2, S3, D>(
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
    tophat_with(src, dst, scratch, se, ExecutionStrategy::default())
}

/// Bottom-hat into `dst`, scheduled by `strategy`. `scratch` ends up holding the closing.
pub fn bottomhat_with<T, S1, S2, S3, D>(
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
    check_shape(src.shape(), dst.shape())?;
    check_shape(src.shape(), scratch.shape())?;
    extreme_filter_with(T::sup, src, scratch, se, strategy)?;
    let dilated = scratch.to_owned();
    extreme_filter_with(T::inf, &dilated, scratch, se, strategy)?;
    iter_pixel_pairs_with(
        src.view(),
        scratch.view(),
        dst.view_mut(),
        strategy,
        |d, &a, &closed| *d = closed.to_signed() - a.to_signed(),
    )?;
    Ok(())
}

/// Bottom-hat into `dst`: `closing(src) - src` in the promoted signed type.
pub fn bottomhat_into<T, S1, S2, S3, D>(
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
    bottomhat_with(src, dst, scratch, se, ExecutionStrategy::default())
}

/// Erode an array with a structuring element.
///
/// # Example
///
/// ```rust
/// use morpho_imgproc::ops::erode;
/// use morpho_strel::StructuringElement;
/// use ndarray::arr2;
///
/// let a = arr2(&[[255u8, 255, 255], [255, 0, 255], [255, 255, 255]]);
/// let eroded = erode(&a, &StructuringElement::unit_box(2)).unwrap();
/// assert!(eroded.iter().all(|&v| v == 0));
/// ```
pub fn erode<T, S, D>(
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
{
    let mut dst = src.to_owned();
    erode_into(src, &mut dst, se)?;
    Ok(dst)
}

/// Dilate an array with a structuring element.
pub fn dilate<T, S, D>(
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
{
    let mut dst = src.to_owned();
    dilate_into(src, &mut dst, se)?;
    Ok(dst)
}

/// Opening: `dilate(erode(src, se), se)`.
pub fn opening<T, S, D>(
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
{
    let mut dst = erode(src, se)?;
    extreme_filter_inplace(T::sup, &mut dst, se)?;
    Ok(dst)
}

/// Closing: `erode(dilate(src, se), se)`.
pub fn closing<T, S, D>(
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
{
    let mut dst = dilate(src, se)?;
    extreme_filter_inplace(T::inf, &mut dst, se)?;
    Ok(dst)
}

/// Top-hat: the bright details removed by the opening, `src - opening(src, se)`.
pub fn tophat<T, S, D>(
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
    tophat_into(src, &mut dst, &mut scratch, se)?;
    Ok(dst)
}

/// Bottom-hat: the dark details filled by the closing, `closing(src, se) - src`.
pub fn bottomhat<T, S, D>(
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
    bottomhat_into(src, &mut dst, &mut scratch, se)?;
    Ok(dst)
}

/// Apply one of the operators that keep the element type.
///
/// # Errors
///
/// Returns [`MorphologyError::UnsupportedOperation`] for operators whose result is signed
/// (top-hat, bottom-hat, gradients and laplacian); use their dedicated functions.
pub fn morph<T, S, D>(
    op: MorphOp,
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
{
    match op {
        MorphOp::Erode => erode(src, se),
        MorphOp::Dilate => dilate(src, se),
        MorphOp::Opening => opening(src, se),
        MorphOp::Closing => closing(src, se),
        other => Err(MorphologyError::UnsupportedOperation(other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parallel::ParallelError;
    use crate::pixel::Rgb;
    use ndarray::{arr1, arr2, Array2};

    #[test]
    fn test_erode_dilate() -> Result<(), MorphologyError> {
        let a = arr2(&[[5u8, 3, 7], [6, 2, 8], [9, 4, 1]]);
        let se = StructuringElement::unit_box(2);
        assert_eq!(erode(&a, &se)?, arr2(&[[2, 2, 2], [2, 1, 1], [2, 1, 1]]));
        assert_eq!(dilate(&a, &se)?, arr2(&[[6, 8, 8], [9, 9, 8], [9, 9, 8]]));
        Ok(())
    }

    #[test]
    fn test_opening_removes_spike() -> Result<(), MorphologyError> {
        let a = arr1(&[1u8, 1, 9, 1, 1, 5, 5, 5, 1]);
        let se = StructuringElement::unit_box(1);
        assert_eq!(opening(&a, &se)?, arr1(&[1, 1, 1, 1, 1, 5, 5, 5, 1]));
        assert_eq!(tophat(&a, &se)?, arr1(&[0i16, 0, 8, 0, 0, 0, 0, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_closing_fills_pit() -> Result<(), MorphologyError> {
        let a = arr1(&[7i32, 7, 0, 7, 7, 2, 2, 2, 7]);
        let se = StructuringElement::unit_box(1);
        assert_eq!(closing(&a, &se)?, arr1(&[7, 7, 7, 7, 7, 2, 2, 2, 7]));
        assert_eq!(bottomhat(&a, &se)?, arr1(&[0i64, 0, 7, 0, 0, 0, 0, 0, 0]));
        Ok(())
    }

    #[test]
    fn test_into_variants_match() -> Result<(), MorphologyError> {
        let a = Array2::from_shape_fn((5, 6), |(i, j)| ((i * 31 + j * 17) % 23) as u16);
        let se = StructuringElement::unit_diamond(2);
        let mut dst = Array2::<u16>::zeros((5, 6));
        let mut scratch = Array2::<u16>::zeros((5, 6));
        opening_into(&a, &mut dst, &mut scratch, &se)?;
        assert_eq!(dst, opening(&a, &se)?);
        closing_into(&a, &mut dst, &mut scratch, &se)?;
        assert_eq!(dst, closing(&a, &se)?);
        Ok(())
    }

    #[test]
    fn test_strategies_agree() -> Result<(), MorphologyError> {
        let a = Array2::from_shape_fn((7, 9), |(i, j)| ((i * 43 + j * 19) % 29) as u8 * 8);
        let ring = arr2(&[[true, false, true], [false, true, false], [true, false, true]]);
        for se in [
            StructuringElement::unit_diamond(2),
            StructuringElement::from_mask(&ring)?,
        ] {
            let top = tophat(&a, &se)?;
            let bottom = bottomhat(&a, &se)?;
            let opened = opening(&a, &se)?;
            for strategy in [ExecutionStrategy::Serial, ExecutionStrategy::Fixed(2)] {
                let mut dst = Array2::<i16>::zeros((7, 9));
                let mut scratch = Array2::<u8>::zeros((7, 9));
                tophat_with(&a, &mut dst, &mut scratch, &se, strategy)?;
                assert_eq!(dst, top);
                assert_eq!(scratch, opened);
                bottomhat_with(&a, &mut dst, &mut scratch, &se, strategy)?;
                assert_eq!(dst, bottom);

                let mut out = Array2::<u8>::zeros((7, 9));
                opening_with(&a, &mut out, &mut scratch, &se, strategy)?;
                assert_eq!(out, opened);
            }
        }

        let mut dst = Array2::<i16>::zeros((7, 9));
        let mut scratch = Array2::<u8>::zeros((7, 9));
        let se = StructuringElement::unit_box(2);
        assert_eq!(
            tophat_with(&a, &mut dst, &mut scratch, &se, ExecutionStrategy::Fixed(0)),
            Err(MorphologyError::Parallel(ParallelError::InvalidThreadCount(0)))
        );
        Ok(())
    }

    #[test]
    fn test_into_scratch_mismatch() {
        let a = Array2::<u8>::zeros((3, 3));
        let mut dst = Array2::<u8>::ones((3, 3));
        let mut scratch = Array2::<u8>::zeros((3, 4));
        let res = opening_into(&a, &mut dst, &mut scratch, &StructuringElement::unit_box(2));
        assert_eq!(res, Err(MorphologyError::ShapeMismatch(vec![3, 3], vec![3, 4])));
        assert!(dst.iter().all(|&v| v == 1));
    }

    #[test]
    fn test_morph_dispatch() -> Result<(), MorphologyError> {
        let a = arr1(&[5u8, 9, 7, 6, 8]);
        let se = StructuringElement::unit_box(1);
        assert_eq!(morph(MorphOp::Dilate, &a, &se)?, dilate(&a, &se)?);
        assert_eq!(morph(MorphOp::Closing, &a, &se)?, closing(&a, &se)?);
        assert_eq!(
            morph(MorphOp::Laplacian, &a, &se),
            Err(MorphologyError::UnsupportedOperation(MorphOp::Laplacian))
        );
        Ok(())
    }

    #[test]
    fn test_erode_rejects_colour() {
        let a = Array2::<Rgb<u8>>::default((2, 2));
        assert_eq!(
            erode(&a, &StructuringElement::unit_box(2)),
            Err(MorphologyError::UnsupportedElementType(3))
        );
    }
}
