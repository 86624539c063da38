use ndarray::{Array, ArrayBase, ArrayView, ArrayViewMut, Data, DataMut, Dimension};

use morpho_strel::StructuringElement;

use crate::error::MorphologyError;
use crate::parallel::ExecutionStrategy;
use crate::pixel::Pixel;

mod generic;
mod separable;

/// Reject element types without a total order.
pub(crate) fn check_pixel<T: Pixel>() -> Result<(), MorphologyError> {
    if T::CHANNELS != 1 {
        return Err(MorphologyError::UnsupportedElementType(T::CHANNELS));
    }
    Ok(())
}

/// Reject arrays that do not share a shape.
pub(crate) fn check_shape(a: &[usize], b: &[usize]) -> Result<(), MorphologyError> {
    if a != b {
        return Err(MorphologyError::ShapeMismatch(a.to_vec(), b.to_vec()));
    }
    Ok(())
}

/// Apply the extreme filter with `f` over `se`, writing into a caller-provided buffer.
///
/// Every pixel `p` of `dst` receives the fold of `f` over `src[p]` and the values
/// `src[p + o]` for all offsets `o` of the structuring element that land inside the array.
/// Out-of-domain neighbors are excluded from the fold; there is no implicit padding.
///
/// The fold order is part of the result when `f` is not commutative or associative:
///
/// * Box and diamond elements are scanned one dimension at a time. Along a dimension a
///   boundary pixel gets `f(curr, neighbor)` and an interior pixel `f(f(prev, curr), next)`.
///   Half-widths above 1 repeat the radius-1 scan, which equals the literal stencil for
///   associative idempotent functions such as `min` and `max`.
/// * Masks and products fold the neighbors in the enumeration order of
///   [`StructuringElement::offsets`], starting from `src[p]`.
/// * Chains apply their parts one after the other.
///
/// # Arguments
///
/// * `f` - The pure binary reduction, e.g. `u8::max`.
/// * `src` - The input array.
/// * `dst` - The output array, with the same shape as `src`.
/// * `se` - The structuring element, broadcast to the rank of `src`.
/// * `strategy` - How the rows of every pass are scheduled.
///
/// # Errors
///
/// Fails before writing anything if the element type is not a scalar, if the shapes differ
/// or if the structuring element cannot be aligned with the array.
pub fn extreme_filter_with<T, S1, S2, D, F>(
    f: F,
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    se: &StructuringElement,
    strategy: ExecutionStrategy,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T>,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    check_pixel::<T>()?;
    check_shape(src.shape(), dst.shape())?;
    let se = se.align(src.ndim())?;

    let src = src.view();
    let dst = dst.view_mut();
    let parallel = strategy.is_parallel();
    strategy.run(|| apply(&f, src, dst, &se, parallel))?;

    Ok(())
}

/// Apply the extreme filter into `dst` with the default [`ExecutionStrategy`].
///
/// See [`extreme_filter_with`] for the semantics.
pub fn extreme_filter_into<T, S1, S2, D, F>(
    f: F,
    src: &ArrayBase<S1, D>,
    dst: &mut ArrayBase<S2, D>,
    se: &StructuringElement,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: DataMut<Elem = T>,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    extreme_filter_with(f, src, dst, se, ExecutionStrategy::default())
}

/// Apply the extreme filter and return a freshly allocated result.
///
/// # Example
///
/// ```rust
/// use morpho_imgproc::filter::extreme_filter;
/// use morpho_strel::StructuringElement;
/// use ndarray::arr1;
///
/// let a = arr1(&[5u8, 9, 7, 6, 8]);
/// let se = StructuringElement::unit_box(1);
/// assert_eq!(extreme_filter(u8::max, &a, &se).unwrap(), arr1(&[9, 9, 9, 8, 8]));
/// assert_eq!(extreme_filter(u8::min, &a, &se).unwrap(), arr1(&[5, 5, 6, 6, 6]));
/// ```
pub fn extreme_filter<T, S, D, F>(
    f: F,
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    let mut dst = src.to_owned();
    extreme_filter_into(f, src, &mut dst, se)?;
    Ok(dst)
}

/// Apply the extreme filter to `array` itself.
///
/// The input is copied to a temporary first, so every pixel still sees unmodified
/// neighbors.
pub fn extreme_filter_inplace<T, S, D, F>(
    f: F,
    array: &mut ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<(), MorphologyError>
where
    T: Pixel,
    S: DataMut<Elem = T>,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    check_pixel::<T>()?;
    let src = array.to_owned();
    extreme_filter_into(f, &src, array, se)
}

/// Single dispatch point between the separable and the generic algorithm.
///
/// `se` must already be aligned with the rank of `src`.
fn apply<T, D, F>(
    f: &F,
    src: ArrayView<T, D>,
    mut dst: ArrayViewMut<T, D>,
    se: &StructuringElement,
    parallel: bool,
) where
    T: Pixel,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    match se {
        StructuringElement::Box(s) => {
            log::debug!("extreme filter: box path, radii {:?}", s.radii());
            separable::box_filter(f, src, dst, s, parallel);
        }
        StructuringElement::Diamond(s) if s.is_uniform() => {
            log::debug!("extreme filter: diamond path, radii {:?}", s.radii());
            separable::diamond_filter(f, src, dst, s, parallel);
        }
        StructuringElement::Diamond(_)
        | StructuringElement::Mask(_)
        | StructuringElement::Product(_) => {
            let offsets = se.offsets();
            log::debug!("extreme filter: generic path, {} offsets", offsets.len());
            generic::offset_filter(f, src, dst, &offsets, parallel);
        }
        StructuringElement::Chain(parts) => {
            log::debug!("extreme filter: chain of {} elements", parts.len());
            let Some((last, rest)) = parts.split_last() else {
                dst.assign(&src);
                return;
            };
            let mut current = src.to_owned();
            for part in rest {
                let mut next = current.clone();
                apply(f, current.view(), next.view_mut(), part, parallel);
                current = next;
            }
            apply(f, current.view(), dst, last, parallel);
        }
    }
}
