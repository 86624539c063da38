use ndarray::{ArrayView, ArrayViewMut, Axis, Dimension, Zip};
use thiserror::Error;

/// Errors that can occur during parallel execution.
#[derive(Error, Debug, PartialEq)]
pub enum ParallelError {
    /// The thread pool failed to build.
    #[error("failed to build thread pool: {0}")]
    BuildError(String),

    /// The requested thread count is invalid.
    #[error("thread count must be > 0, got {0}")]
    InvalidThreadCount(usize),
}

/// Controls how a filter pass is scheduled.
///
/// Within one pass every row (all indices fixed but the scanned one) or every pixel is
/// independent, so the work is split across workers without locking. Passes themselves
/// always run one after the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStrategy {
    /// Split the lanes or pixels of every pass over the global Rayon pool.
    #[default]
    ParallelRows,

    /// Run every pass on the calling thread. Small arrays are often faster this way.
    Serial,

    /// Run inside a dedicated pool of `n` threads, built anew for each call.
    Fixed(usize),
}

impl ExecutionStrategy {
    /// Whether rows are distributed over worker threads.
    pub fn is_parallel(&self) -> bool {
        !matches!(self, ExecutionStrategy::Serial)
    }

    /// Run `op` under this strategy, inside a dedicated pool for [`ExecutionStrategy::Fixed`].
    pub fn run<R, F>(&self, op: F) -> Result<R, ParallelError>
    where
        F: FnOnce() -> R + Send,
        R: Send,
    {
        match *self {
            ExecutionStrategy::Serial | ExecutionStrategy::ParallelRows => Ok(op()),
            ExecutionStrategy::Fixed(n) => {
                if n == 0 {
                    return Err(ParallelError::InvalidThreadCount(n));
                }
                let pool = rayon::ThreadPoolBuilder::new()
                    .num_threads(n)
                    .build()
                    .map_err(|e| ParallelError::BuildError(e.to_string()))?;
                Ok(pool.install(op))
            }
        }
    }
}

/// Visit every 1-D lane along `axis` of `dst` together with the matching lane of `src`.
pub(crate) fn par_iter_lanes<T, D, F>(
    src: ArrayView<T, D>,
    mut dst: ArrayViewMut<T, D>,
    axis: Axis,
    parallel: bool,
    f: F,
) where
    T: Send + Sync,
    D: Dimension,
    F: Fn(ArrayView<T, ndarray::Ix1>, ArrayViewMut<T, ndarray::Ix1>) + Send + Sync,
{
    let zip = Zip::from(dst.lanes_mut(axis)).and(src.lanes(axis));
    if parallel {
        zip.par_for_each(|out, inp| f(inp, out));
    } else {
        zip.for_each(|out, inp| f(inp, out));
    }
}

/// Apply `f` to every pixel of `dst` together with the matching pixel of `src`.
pub(crate) fn par_iter_pixels<T, U, D, F>(
    src: ArrayView<T, D>,
    dst: ArrayViewMut<U, D>,
    parallel: bool,
    f: F,
) where
    T: Send + Sync,
    U: Send + Sync,
    D: Dimension,
    F: Fn(&mut U, &T) + Send + Sync,
{
    let zip = Zip::from(dst).and(src);
    if parallel {
        zip.par_for_each(|out, inp| f(out, inp));
    } else {
        zip.for_each(|out, inp| f(out, inp));
    }
}

/// Apply `f` to every pixel of `dst` together with the matching pixels of `a` and `b`.
pub(crate) fn par_iter_pixel_pairs<T, U, D, F>(
    a: ArrayView<T, D>,
    b: ArrayView<T, D>,
    dst: ArrayViewMut<U, D>,
    parallel: bool,
    f: F,
) where
    T: Send + Sync,
    U: Send + Sync,
    D: Dimension,
    F: Fn(&mut U, &T, &T) + Send + Sync,
{
    let zip = Zip::from(dst).and(a).and(b);
    if parallel {
        zip.par_for_each(|out, x, y| f(out, x, y));
    } else {
        zip.for_each(|out, x, y| f(out, x, y));
    }
}

/// [`par_iter_pixels`] scheduled by `strategy`.
pub(crate) fn iter_pixels_with<T, U, D, F>(
    src: ArrayView<T, D>,
    dst: ArrayViewMut<U, D>,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send + Sync,
    U: Send + Sync,
    D: Dimension,
    F: Fn(&mut U, &T) + Send + Sync,
{
    let parallel = strategy.is_parallel();
    strategy.run(move || par_iter_pixels(src, dst, parallel, f))
}

/// [`par_iter_pixel_pairs`] scheduled by `strategy`.
pub(crate) fn iter_pixel_pairs_with<T, U, D, F>(
    a: ArrayView<T, D>,
    b: ArrayView<T, D>,
    dst: ArrayViewMut<U, D>,
    strategy: ExecutionStrategy,
    f: F,
) -> Result<(), ParallelError>
where
    T: Send + Sync,
    U: Send + Sync,
    D: Dimension,
    F: Fn(&mut U, &T, &T) + Send + Sync,
{
    let parallel = strategy.is_parallel();
    strategy.run(move || par_iter_pixel_pairs(a, b, dst, parallel, f))
}
