use ndarray::{Array, ArrayBase, Axis, Data, Dimension, Slice};

use morpho_strel::StructuringElement;

use crate::error::MorphologyError;
use crate::filter::{check_pixel, check_shape, extreme_filter_with};
use crate::ops::{dilate, erode, MorphOp};
use crate::parallel::{par_iter_pixels, ExecutionStrategy};
use crate::pixel::Pixel;

/// Settings of the reconstruction loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReconstructConfig {
    /// Upper bound on the number of propagation steps.
    ///
    /// `None` uses the number of elements of the marker. Geodesic propagation with a
    /// unit neighborhood converges in at most that many steps, so the bound only stops
    /// inputs that never settle, such as floating point arrays holding NaN. The last
    /// iterate is returned when the bound is hit.
    pub max_iterations: Option<usize>,
    /// How the filter pass of every step is scheduled.
    pub strategy: ExecutionStrategy,
}

/// Morphological reconstruction with an explicit [`ReconstructConfig`].
///
/// The output starts as `combine(mask, marker)` and is then replaced by
/// `combine(op(output, se), mask)` until it stops changing. `combine` is the minimum for
/// [`MorphOp::Dilate`] and the maximum for [`MorphOp::Erode`].
///
/// # Arguments
///
/// * `op` - Either [`MorphOp::Dilate`] or [`MorphOp::Erode`].
/// * `marker` - The array that is propagated.
/// * `mask` - The array that bounds the propagation, with the same shape as `marker`.
/// * `se` - The connectivity, the unit box when `None`. Half-widths above 1 are cut back
///   to 1 with a warning, since they do not change the fixed point.
/// * `config` - Iteration bound and execution strategy.
///
/// # Errors
///
/// * [`MorphologyError::UnsupportedOperation`] for any other operator.
/// * [`MorphologyError::ShapeMismatch`] if `marker` and `mask` differ in shape.
pub fn reconstruct_with<T, S1, S2, D>(
    op: MorphOp,
    marker: &ArrayBase<S1, D>,
    mask: &ArrayBase<S2, D>,
    se: Option<&StructuringElement>,
    config: &ReconstructConfig,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    let (filter, combine): (fn(T, T) -> T, fn(T, T) -> T) = match op {
        MorphOp::Dilate => (T::sup, T::inf),
        MorphOp::Erode => (T::inf, T::sup),
        other => return Err(MorphologyError::UnsupportedOperation(other)),
    };
    check_pixel::<T>()?;
    check_shape(marker.shape(), mask.shape())?;

    let ndim = marker.ndim();
    let se = match se {
        Some(se) => se.align(ndim)?,
        None => StructuringElement::unit_box(ndim),
    };
    let (se, truncated) = se.truncate_unit();
    if truncated {
        log::warn!(
            "reconstruction only uses the unit neighborhood, structuring element cut to {:?}",
            se.size()
        );
    }

    let cap = config.max_iterations.unwrap_or(marker.len()).max(1);
    let parallel = config.strategy.is_parallel();
    let inner = if parallel {
        ExecutionStrategy::ParallelRows
    } else {
        ExecutionStrategy::Serial
    };
    let marker = marker.view();
    let mask = mask.view();

    config.strategy.run(|| {
        let mut out = mask.to_owned();
        par_iter_pixels(marker.view(), out.view_mut(), parallel, |o, &m| *o = combine(*o, m));
        let mut next = out.clone();

        for i in 0..cap {
            extreme_filter_with(filter, &out, &mut next, &se, inner)?;
            par_iter_pixels(mask.view(), next.view_mut(), parallel, |o, &k| *o = combine(*o, k));
            if next == out {
                log::debug!("reconstruction converged after {} iterations", i + 1);
                return Ok(out);
            }
            std::mem::swap(&mut out, &mut next);
        }

        log::warn!("reconstruction stopped after {cap} iterations without converging");
        Ok(out)
    })?
}

/// Morphological reconstruction with the default [`ReconstructConfig`].
///
/// # Example
///
/// ```rust
/// use morpho_imgproc::ops::MorphOp;
/// use morpho_imgproc::reconstruct::reconstruct;
/// use ndarray::arr1;
///
/// let marker = arr1(&[0u8, 0, 0, 3, 0]);
/// let mask = arr1(&[0u8, 0, 6, 5, 6]);
/// let out = reconstruct(MorphOp::Dilate, &marker, &mask, None).unwrap();
/// assert_eq!(out, arr1(&[0, 0, 3, 3, 3]));
/// ```
pub fn reconstruct<T, S1, S2, D>(
    op: MorphOp,
    marker: &ArrayBase<S1, D>,
    mask: &ArrayBase<S2, D>,
    se: Option<&StructuringElement>,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    reconstruct_with(op, marker, mask, se, &ReconstructConfig::default())
}

/// Reconstruction by dilation: grow `marker` below `mask`.
pub fn underbuild<T, S1, S2, D>(
    marker: &ArrayBase<S1, D>,
    mask: &ArrayBase<S2, D>,
    se: Option<&StructuringElement>,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    reconstruct(MorphOp::Dilate, marker, mask, se)
}

/// Reconstruction by erosion: shrink `marker` above `mask`.
pub fn overbuild<T, S1, S2, D>(
    marker: &ArrayBase<S1, D>,
    mask: &ArrayBase<S2, D>,
    se: Option<&StructuringElement>,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S1: Data<Elem = T>,
    S2: Data<Elem = T>,
    D: Dimension,
{
    reconstruct(MorphOp::Erode, marker, mask, se)
}

/// Opening by reconstruction: erode with `se`, then rebuild the survivors under `src`.
///
/// Bright structures that the erosion removes completely disappear, every other structure
/// keeps its exact shape.
pub fn opening_by_reconstruction<T, S, D>(
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
{
    let marker = erode(src, se)?;
    underbuild(&marker, src, None)
}

/// Closing by reconstruction: dilate with `se`, then rebuild above `src`.
pub fn closing_by_reconstruction<T, S, D>(
    src: &ArrayBase<S, D>,
    se: &StructuringElement,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
{
    let marker = dilate(src, se)?;
    overbuild(&marker, src, None)
}

/// Fill the regional minima of `src` that are not connected to the array border.
///
/// The marker equals `src` on the border and the maximum value inside; reconstruction by
/// erosion then lowers it until it rests on `src`. For binary images this fills the holes
/// of every object.
///
/// # Arguments
///
/// * `src` - The input array.
/// * `se` - The connectivity, the unit box when `None`.
pub fn fill_holes<T, S, D>(
    src: &ArrayBase<S, D>,
    se: Option<&StructuringElement>,
) -> Result<Array<T, D>, MorphologyError>
where
    T: Pixel,
    S: Data<Elem = T>,
    D: Dimension,
{
    let mut marker = Array::from_elem(src.raw_dim(), T::max_value());
    for (axis, &len) in src.shape().iter().enumerate() {
        if len == 0 {
            continue;
        }
        for edge in [0, len - 1] {
            let slice = Slice::from(edge..edge + 1);
            marker
                .slice_axis_mut(Axis(axis), slice)
                .assign(&src.slice_axis(Axis(axis), slice));
        }
    }
    overbuild(&marker, src, se)
}
