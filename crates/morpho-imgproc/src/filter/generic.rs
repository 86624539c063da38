use ndarray::{ArrayView, ArrayViewD, ArrayViewMut, Axis, Dimension};
use rayon::prelude::*;

use crate::pixel::Pixel;

/// Fold the in-domain neighbors of the pixel at `idx`, reusing `neighbor` as the index buffer.
fn fold_at<T, F>(
    f: &F,
    src: &ArrayViewD<T>,
    idx: &[usize],
    offsets: &[Vec<isize>],
    neighbor: &mut [usize],
) -> T
where
    T: Pixel,
    F: Fn(T, T) -> T,
{
    let mut acc = src[idx];
    'offsets: for o in offsets {
        for ((n, &i), &v) in neighbor.iter_mut().zip(idx.iter()).zip(o.iter()) {
            match i.checked_add_signed(v) {
                Some(q) => *n = q,
                None => continue 'offsets,
            }
        }
        if let Some(&value) = src.get(&*neighbor) {
            acc = f(acc, value);
        }
    }
    acc
}

/// Fold every in-domain neighbor given by `offsets` into each pixel of `src`.
///
/// The fold starts from the pixel itself and follows the order of `offsets`. Neighbors
/// outside the array are skipped, there is no padding value.
pub(crate) fn offset_filter<T, D, F>(
    f: &F,
    src: ArrayView<T, D>,
    dst: ArrayViewMut<T, D>,
    offsets: &[Vec<isize>],
    parallel: bool,
) where
    T: Pixel,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    let src = src.into_dyn();
    let mut dst = dst.into_dyn();
    let ndim = src.ndim();

    if !parallel || ndim == 0 {
        let mut neighbor = vec![0usize; ndim];
        for (idx, out) in dst.indexed_iter_mut() {
            *out = fold_at(f, &src, idx.slice(), offsets, &mut neighbor);
        }
        return;
    }

    // one slab of the outermost axis per task, the slab index goes back in front
    dst.axis_iter_mut(Axis(0))
        .into_par_iter()
        .enumerate()
        .for_each_init(
            || (vec![0usize; ndim], vec![0usize; ndim]),
            |(idx, neighbor), (i0, mut slab)| {
                idx[0] = i0;
                for (rest, out) in slab.indexed_iter_mut() {
                    idx[1..].copy_from_slice(rest.slice());
                    *out = fold_at(f, &src, idx, offsets, neighbor);
                }
            },
        );
}
