use ndarray::{Array, ArrayView, ArrayView1, ArrayViewMut, ArrayViewMut1, Axis, Dimension};

use morpho_strel::SeparableStrel;

use crate::parallel::par_iter_lanes;
use crate::pixel::Pixel;

/// Fold the radius-1 neighbors of `nb` into `acc`, one lane at a time.
///
/// `acc` holds the running value of every pixel. Boundary pixels fold their single
/// neighbor as `f(acc, neighbor)`, interior pixels as `f(f(prev, acc), next)`.
fn fold_lane<T, F>(f: &F, nb: ArrayView1<T>, mut acc: ArrayViewMut1<T>)
where
    T: Copy,
    F: Fn(T, T) -> T,
{
    let n = nb.len();
    if n < 2 {
        return;
    }
    acc[0] = f(acc[0], nb[1]);
    for i in 1..n - 1 {
        acc[i] = f(f(nb[i - 1], acc[i]), nb[i + 1]);
    }
    acc[n - 1] = f(acc[n - 1], nb[n - 2]);
}

/// Fold the neighbors of `src` along `axis` into `dst`, which holds the running values.
fn fold_axis<T, D, F>(f: &F, src: ArrayView<T, D>, dst: ArrayViewMut<T, D>, axis: usize, parallel: bool)
where
    T: Pixel,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    par_iter_lanes(src, dst, Axis(axis), parallel, |nb, acc| fold_lane(f, nb, acc));
}

/// Run `passes` one after the other, each reading the result of the previous one.
///
/// Every pass receives an untouched input view and an output view that already holds a copy
/// of the input.
fn run_passes<T, D, P>(
    src: ArrayView<T, D>,
    mut dst: ArrayViewMut<T, D>,
    passes: usize,
    pass: P,
) where
    T: Pixel,
    D: Dimension,
    P: Fn(usize, ArrayView<T, D>, ArrayViewMut<T, D>),
{
    if passes == 0 {
        dst.assign(&src);
        return;
    }
    if passes == 1 {
        dst.assign(&src);
        pass(0, src, dst);
        return;
    }

    // ping-pong between two buffers so no pass reads values it already wrote
    let mut current: Array<T, D> = src.to_owned();
    let mut next = current.clone();
    for i in 0..passes - 1 {
        next.assign(&current);
        pass(i, current.view(), next.view_mut());
        std::mem::swap(&mut current, &mut next);
    }
    dst.assign(&current);
    pass(passes - 1, current.view(), dst);
}

/// Box filter: one radius-1 scan per unit of half-width, dimension by dimension.
///
/// A half-width `r > 1` along a dimension is realized as `r` repeated radius-1 scans. This
/// equals the literal `2r + 1` stencil when `f` is associative and idempotent (as `min` and
/// `max` are); for other functions the repeated scan is the defined behavior.
pub(crate) fn box_filter<T, D, F>(
    f: &F,
    src: ArrayView<T, D>,
    dst: ArrayViewMut<T, D>,
    se: &SeparableStrel,
    parallel: bool,
) where
    T: Pixel,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    let axes: Vec<usize> = se
        .active_dims()
        .into_iter()
        .flat_map(|d| std::iter::repeat(d).take(se.radius(d)))
        .collect();

    run_passes(src, dst, axes.len(), |i, src, dst| {
        fold_axis(f, src, dst, axes[i], parallel)
    });
}

/// Diamond filter: `r` repeated scans of the unit cross over the active dimensions.
///
/// Every cross scan folds each active dimension into the running value while reading the
/// neighbors from the unmodified input of that scan. The element must be uniform.
pub(crate) fn diamond_filter<T, D, F>(
    f: &F,
    src: ArrayView<T, D>,
    dst: ArrayViewMut<T, D>,
    se: &SeparableStrel,
    parallel: bool,
) where
    T: Pixel,
    D: Dimension,
    F: Fn(T, T) -> T + Sync + Send,
{
    let dims = se.active_dims();
    run_passes(src, dst, se.max_radius(), |_, src, mut dst| {
        for &d in &dims {
            fold_axis(f, src.view(), dst.view_mut(), d, parallel);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2, Array1};

    fn max(a: i32, b: i32) -> i32 {
        a.max(b)
    }

    #[test]
    fn test_fold_lane_order() {
        // non-commutative fold: f(f(prev, curr), next) differs from f(f(curr, prev), next)
        let f = |x: i64, y: i64| 2 * x + y;
        let src = arr1(&[1i64, 2, 3]);
        let mut dst = src.clone();
        fold_lane(&f, src.view(), dst.view_mut());
        assert_eq!(dst, arr1(&[4, 11, 8]));
    }

    #[test]
    fn test_fold_lane_worked_example() {
        let src = arr1(&[5, 9, 7, 6, 8]);
        let mut dst = src.clone();
        fold_lane(&max, src.view(), dst.view_mut());
        assert_eq!(dst, arr1(&[9, 9, 9, 8, 8]));

        let mut dst = src.clone();
        fold_lane(&|a: i32, b: i32| a.min(b), src.view(), dst.view_mut());
        assert_eq!(dst, arr1(&[5, 5, 6, 6, 6]));
    }

    #[test]
    fn test_fold_lane_short() {
        let src = arr1(&[4]);
        let mut dst = src.clone();
        fold_lane(&max, src.view(), dst.view_mut());
        assert_eq!(dst, arr1(&[4]));

        let src = Array1::<i32>::zeros(0);
        let mut dst = src.clone();
        fold_lane(&max, src.view(), dst.view_mut());
        assert_eq!(dst.len(), 0);
    }

    #[test]
    fn test_box_filter_radius_two() {
        let src = arr1(&[0, 0, 0, 0, 7, 0, 0, 0, 0]);
        let mut dst = src.clone();
        let se = SeparableStrel::uniform(&[0], 2);
        box_filter(&max, src.view(), dst.view_mut(), &se, false);
        assert_eq!(dst, arr1(&[0, 0, 7, 7, 7, 7, 7, 0, 0]));
    }

    #[test]
    fn test_box_filter_single_dim() {
        let src = arr2(&[[0, 0, 0], [0, 5, 0], [0, 0, 0]]);
        let mut dst = src.clone();
        let se = SeparableStrel::uniform(&[1], 1);
        box_filter(&max, src.view(), dst.view_mut(), &se, true);
        assert_eq!(dst, arr2(&[[0, 0, 0], [5, 5, 5], [0, 0, 0]]));
    }

    #[test]
    fn test_diamond_filter_cross() {
        let src = arr2(&[
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 1, 0, 0],
            [0, 0, 0, 0, 0],
            [0, 0, 0, 0, 0],
        ]);
        let mut dst = src.clone();
        let se = SeparableStrel::uniform(&[0, 1], 2);
        diamond_filter(&max, src.view(), dst.view_mut(), &se, true);
        let expected = arr2(&[
            [0, 0, 1, 0, 0],
            [0, 1, 1, 1, 0],
            [1, 1, 1, 1, 1],
            [0, 1, 1, 1, 0],
            [0, 0, 1, 0, 0],
        ]);
        assert_eq!(dst, expected);
    }
}
