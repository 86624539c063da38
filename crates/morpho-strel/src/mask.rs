use std::collections::HashSet;

use ndarray::{ArrayBase, ArrayD, Data, Dimension, IntoDimension, IxDyn};

use crate::error::StrelError;

/// A structuring element given by an explicit list of offsets around the center.
///
/// The offsets never contain the zero offset and keep the order they were enumerated in,
/// which is the fold order used by the generic filter path.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MaskStrel {
    shape: Vec<usize>,
    offsets: Vec<Vec<isize>>,
}

impl MaskStrel {
    /// Build the element from a boolean mask whose center is the origin.
    ///
    /// Offsets are enumerated in the logical (row-major) order of the mask. An all-false mask
    /// yields the identity element.
    ///
    /// # Errors
    ///
    /// Returns [`StrelError::InvalidShape`] if any extent of the mask is even.
    pub fn from_mask<S, D>(mask: &ArrayBase<S, D>) -> Result<Self, StrelError>
    where
        S: Data<Elem = bool>,
        D: Dimension,
    {
        let shape = mask.shape().to_vec();
        if shape.iter().any(|&n| n % 2 == 0) {
            return Err(StrelError::InvalidShape(shape));
        }

        let center: Vec<isize> = shape.iter().map(|&n| (n / 2) as isize).collect();
        let offsets = mask
            .indexed_iter()
            .filter(|(_, &on)| on)
            .map(|(idx, _)| {
                idx.into_dimension()
                    .slice()
                    .iter()
                    .zip(center.iter())
                    .map(|(&i, &c)| i as isize - c)
                    .collect::<Vec<_>>()
            })
            .filter(|o| o.iter().any(|&v| v != 0))
            .collect();

        Ok(Self { shape, offsets })
    }

    /// Build the element from a list of offsets of the given rank.
    ///
    /// Zero offsets and repeated offsets are dropped, the first occurrence wins. Offsets
    /// shorter than `rank` are padded with zeros.
    ///
    /// # Errors
    ///
    /// Returns [`StrelError::DimensionMismatch`] if an offset reaches along a dimension
    /// past `rank`.
    pub fn from_offsets<I>(rank: usize, offsets: I) -> Result<Self, StrelError>
    where
        I: IntoIterator<Item = Vec<isize>>,
    {
        let offsets: Vec<Vec<isize>> = offsets.into_iter().collect();
        if let Some(o) = offsets
            .iter()
            .find(|o| o.iter().skip(rank).any(|&v| v != 0))
        {
            return Err(StrelError::DimensionMismatch(o.len(), rank));
        }
        Ok(Self::collect(rank, offsets))
    }

    /// Same as [`MaskStrel::from_offsets`] for offsets already known to fit in `rank`.
    pub(crate) fn collect<I>(rank: usize, offsets: I) -> Self
    where
        I: IntoIterator<Item = Vec<isize>>,
    {
        let mut seen = HashSet::new();
        let mut shape = vec![1; rank];
        let mut kept = Vec::new();
        for mut o in offsets {
            o.resize(rank, 0);
            if o.iter().all(|&v| v == 0) || !seen.insert(o.clone()) {
                continue;
            }
            for (extent, &v) in shape.iter_mut().zip(o.iter()) {
                *extent = (*extent).max(2 * v.unsigned_abs() + 1);
            }
            kept.push(o);
        }
        Self {
            shape,
            offsets: kept,
        }
    }

    /// The number of dimensions of the mask.
    pub fn rank(&self) -> usize {
        self.shape.len()
    }

    /// The extent of the mask along every dimension.
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }

    /// The half-width of the mask along `dim`.
    pub fn radius(&self, dim: usize) -> usize {
        self.shape.get(dim).map(|&n| n / 2).unwrap_or(0)
    }

    /// The neighbor offsets, in fold order.
    pub fn offsets(&self) -> &[Vec<isize>] {
        &self.offsets
    }

    /// Whether the mask selects no neighbor at all.
    pub fn is_identity(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Broadcast to `ndim` dimensions, padding or dropping trailing singleton dimensions.
    pub fn aligned(&self, ndim: usize) -> Result<Self, StrelError> {
        if self.shape.iter().skip(ndim).any(|&n| n > 1)
            || self.offsets.iter().any(|o| o.iter().skip(ndim).any(|&v| v != 0))
        {
            return Err(StrelError::DimensionMismatch(self.rank(), ndim));
        }
        let mut shape = self.shape.clone();
        shape.resize(ndim, 1);
        let offsets = self
            .offsets
            .iter()
            .map(|o| {
                let mut o = o.clone();
                o.resize(ndim, 0);
                o
            })
            .collect();
        Ok(Self { shape, offsets })
    }

    /// Densify into a boolean mask with the center set.
    pub fn to_mask(&self) -> ArrayD<bool> {
        dense_mask(&self.shape, &self.offsets)
    }
}

/// Render offsets into a centered boolean array of the given odd `shape`.
pub(crate) fn dense_mask(shape: &[usize], offsets: &[Vec<isize>]) -> ArrayD<bool> {
    let mut mask = ArrayD::from_elem(IxDyn(shape), false);
    let center: Vec<usize> = shape.iter().map(|&n| n / 2).collect();
    if let Some(c) = mask.get_mut(center.as_slice()) {
        *c = true;
    }
    for o in offsets {
        let idx: Vec<usize> = center
            .iter()
            .zip(o.iter())
            .map(|(&c, &v)| c.wrapping_add_signed(v))
            .collect();
        if let Some(v) = mask.get_mut(idx.as_slice()) {
            *v = true;
        }
    }
    mask
}
