use std::collections::HashSet;

use ndarray::{ArrayBase, ArrayD, Data, Dimension};

use crate::error::StrelError;
use crate::mask::{dense_mask, MaskStrel};
use crate::separable::SeparableStrel;

/// A structuring element: the neighborhood reduced around every pixel.
///
/// Separable shapes ([`StructuringElement::Box`], [`StructuringElement::Diamond`]) are
/// filtered one dimension at a time, everything else goes through the generic offset scan.
///
/// # Example
///
/// ```rust
/// use morpho_strel::StructuringElement;
///
/// // 3x3 box over both dimensions of an image
/// let se = StructuringElement::new_box(&[1, 1], &[0, 1]).unwrap();
/// assert_eq!(se.rank(), 2);
/// assert_eq!(se.size(), vec![3, 3]);
/// assert!(se.is_symmetric());
/// assert!(se.is_separable());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum StructuringElement {
    /// The Cartesian product of the intervals `[-r_d, r_d]`.
    Box(SeparableStrel),

    /// The box restricted to the L1 ball `Σ|o_d| ≤ max(r_d)`.
    Diamond(SeparableStrel),

    /// An arbitrary set of offsets given by a boolean mask.
    Mask(MaskStrel),

    /// Sequential application: filter with the first element, then with the next.
    Chain(Vec<StructuringElement>),

    /// Simultaneous application over the Minkowski sum of the offsets.
    Product(Vec<StructuringElement>),
}

impl StructuringElement {
    /// A box with half-width `half_widths[d]` along every dimension of `active_dims`.
    pub fn new_box(half_widths: &[usize], active_dims: &[usize]) -> Result<Self, StrelError> {
        Ok(Self::Box(SeparableStrel::new(half_widths, active_dims)?))
    }

    /// A diamond (L1 ball) with half-widths `half_widths` along `active_dims`.
    pub fn new_diamond(half_widths: &[usize], active_dims: &[usize]) -> Result<Self, StrelError> {
        Ok(Self::Diamond(SeparableStrel::new(half_widths, active_dims)?))
    }

    /// A box of the given half-width over exactly the dimensions in `dims`.
    ///
    /// The rank is broadcast to the array it is applied to.
    pub fn from_dims(dims: &[usize], radius: usize) -> Self {
        Self::Box(SeparableStrel::uniform(dims, radius))
    }

    /// The `3^N` box over all `ndim` dimensions.
    pub fn unit_box(ndim: usize) -> Self {
        Self::Box(SeparableStrel::uniform(&(0..ndim).collect::<Vec<_>>(), 1))
    }

    /// The `N`-dimensional cross: the center and its `2N` face neighbors.
    pub fn unit_diamond(ndim: usize) -> Self {
        Self::Diamond(SeparableStrel::uniform(&(0..ndim).collect::<Vec<_>>(), 1))
    }

    /// A generic element from a centered boolean mask.
    ///
    /// # Errors
    ///
    /// Returns [`StrelError::InvalidShape`] if any extent of the mask is even.
    pub fn from_mask<S, D>(mask: &ArrayBase<S, D>) -> Result<Self, StrelError>
    where
        S: Data<Elem = bool>,
        D: Dimension,
    {
        Ok(Self::Mask(MaskStrel::from_mask(mask)?))
    }

    /// A generic element from explicit offsets of the given rank.
    ///
    /// # Errors
    ///
    /// Returns [`StrelError::DimensionMismatch`] if an offset has a non-zero component past
    /// `rank`.
    pub fn from_offsets<I>(rank: usize, offsets: I) -> Result<Self, StrelError>
    where
        I: IntoIterator<Item = Vec<isize>>,
    {
        Ok(Self::Mask(MaskStrel::from_offsets(rank, offsets)?))
    }

    /// Apply `first`, then `second`.
    pub fn chain(first: Self, second: Self) -> Self {
        let mut parts = Vec::new();
        for se in [first, second] {
            match se {
                Self::Chain(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        Self::Chain(parts)
    }

    /// Combine `first` and `second` as if their offsets were added.
    pub fn product(first: Self, second: Self) -> Self {
        let mut parts = Vec::new();
        for se in [first, second] {
            match se {
                Self::Product(inner) => parts.extend(inner),
                other => parts.push(other),
            }
        }
        Self::Product(parts)
    }

    /// The number of dimensions the element is defined over.
    pub fn rank(&self) -> usize {
        match self {
            Self::Box(s) | Self::Diamond(s) => s.rank(),
            Self::Mask(m) => m.rank(),
            Self::Chain(parts) | Self::Product(parts) => {
                parts.iter().map(Self::rank).max().unwrap_or(0)
            }
        }
    }

    /// The half-width of the effective neighborhood along `dim`.
    pub fn radius(&self, dim: usize) -> usize {
        match self {
            Self::Box(s) | Self::Diamond(s) => s.radius(dim),
            Self::Mask(m) => m.radius(dim),
            Self::Chain(parts) | Self::Product(parts) => parts.iter().map(|p| p.radius(dim)).sum(),
        }
    }

    /// The extent `2r + 1` of the effective neighborhood along every dimension.
    pub fn size(&self) -> Vec<usize> {
        (0..self.rank()).map(|d| 2 * self.radius(d) + 1).collect()
    }

    /// The effective neighborhood as offsets, without the zero offset and without repeats.
    ///
    /// Composite elements are expanded as Minkowski sums. The order is deterministic.
    pub fn offsets(&self) -> Vec<Vec<isize>> {
        match self {
            Self::Box(s) => s.box_offsets(),
            Self::Diamond(s) => s.diamond_offsets(),
            Self::Mask(m) => m.offsets().to_vec(),
            Self::Chain(parts) | Self::Product(parts) => {
                let rank = self.rank();
                let mut acc: Vec<Vec<isize>> = vec![vec![0; rank]];
                for part in parts {
                    let mut next = vec![vec![0; rank]];
                    next.extend(part.offsets().into_iter().map(|mut o| {
                        o.resize(rank, 0);
                        o
                    }));
                    acc = minkowski_sum(&acc, &next);
                }
                acc.retain(|o| o.iter().any(|&v| v != 0));
                acc
            }
        }
    }

    /// Whether the neighborhood is closed under negation.
    pub fn is_symmetric(&self) -> bool {
        match self {
            Self::Box(_) | Self::Diamond(_) => true,
            _ => {
                let offsets = self.offsets();
                let set: HashSet<&Vec<isize>> = offsets.iter().collect();
                offsets
                    .iter()
                    .all(|o| set.contains(&o.iter().map(|v| -v).collect::<Vec<_>>()))
            }
        }
    }

    /// Whether the element can be filtered one dimension at a time.
    pub fn is_separable(&self) -> bool {
        match self {
            Self::Box(_) | Self::Diamond(_) => true,
            Self::Chain(parts) => parts.iter().all(Self::is_separable),
            Self::Mask(_) | Self::Product(_) => false,
        }
    }

    /// The effective neighborhood as a dense centered boolean mask.
    pub fn to_mask(&self) -> ArrayD<bool> {
        dense_mask(&self.size(), &self.offsets())
    }

    /// The element mirrored through its center.
    pub fn reflect(&self) -> Self {
        match self {
            Self::Box(_) | Self::Diamond(_) => self.clone(),
            _ => Self::Mask(MaskStrel::collect(
                self.rank(),
                self.offsets()
                    .into_iter()
                    .map(|o| o.into_iter().map(|v| -v).collect()),
            )),
        }
    }

    /// Broadcast the element to `ndim` dimensions.
    ///
    /// Missing trailing dimensions are treated as singleton (radius 0); surplus trailing
    /// dimensions may be dropped only if the element does not extend along them.
    ///
    /// # Errors
    ///
    /// Returns [`StrelError::DimensionMismatch`] if the element extends along a dimension
    /// the target does not have.
    pub fn align(&self, ndim: usize) -> Result<Self, StrelError> {
        let aligned = match self {
            Self::Box(s) => Self::Box(s.aligned(ndim)?),
            Self::Diamond(s) => Self::Diamond(s.aligned(ndim)?),
            Self::Mask(m) => Self::Mask(m.aligned(ndim)?),
            Self::Chain(parts) => Self::Chain(
                parts
                    .iter()
                    .map(|p| p.align(ndim))
                    .collect::<Result<_, _>>()
                    .map_err(|_| StrelError::DimensionMismatch(self.rank(), ndim))?,
            ),
            Self::Product(parts) => Self::Product(
                parts
                    .iter()
                    .map(|p| p.align(ndim))
                    .collect::<Result<_, _>>()
                    .map_err(|_| StrelError::DimensionMismatch(self.rank(), ndim))?,
            ),
        };
        Ok(aligned)
    }

    /// Restrict the element to half-width 1 along every dimension.
    ///
    /// Box and diamond shapes keep their kind with radii clamped to 1. Masks and composite
    /// elements keep only the offsets of their effective neighborhood that lie within the
    /// central `3^N` block. Returns the restricted element and whether anything was cut.
    ///
    /// Only the offsets decide whether a mask is cut, not its declared extent.
    pub fn truncate_unit(&self) -> (Self, bool) {
        let truncated = match self {
            Self::Box(s) | Self::Diamond(s) if s.max_radius() <= 1 => return (self.clone(), false),
            Self::Box(s) => Self::Box(s.clamped(1)),
            Self::Diamond(s) => Self::Diamond(s.clamped(1)),
            _ => {
                let offsets = self.offsets();
                if offsets.iter().all(|o| o.iter().all(|v| v.abs() <= 1)) {
                    return (self.clone(), false);
                }
                Self::Mask(MaskStrel::collect(
                    self.rank(),
                    offsets
                        .into_iter()
                        .filter(|o| o.iter().all(|v| v.abs() <= 1)),
                ))
            }
        };
        (truncated, true)
    }
}

fn minkowski_sum(a: &[Vec<isize>], b: &[Vec<isize>]) -> Vec<Vec<isize>> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for x in a {
        for y in b {
            let s: Vec<isize> = x.iter().zip(y.iter()).map(|(u, v)| u + v).collect();
            if seen.insert(s.clone()) {
                out.push(s);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{arr1, arr2};

    #[test]
    fn test_box_queries() -> Result<(), StrelError> {
        let se = StructuringElement::new_box(&[2, 1, 5], &[0, 1])?;
        assert_eq!(se.rank(), 3);
        assert_eq!(se.radius(0), 2);
        assert_eq!(se.radius(2), 0);
        assert_eq!(se.size(), vec![5, 3, 1]);
        assert_eq!(se.offsets().len(), 14);
        Ok(())
    }

    #[test]
    fn test_diamond_mask() -> Result<(), StrelError> {
        let se = StructuringElement::new_diamond(&[1, 1], &[0, 1])?;
        let expected = arr2(&[
            [false, true, false],
            [true, true, true],
            [false, true, false],
        ]);
        assert_eq!(se.to_mask(), expected.into_dyn());
        Ok(())
    }

    #[test]
    fn test_symmetry() -> Result<(), StrelError> {
        let sym = StructuringElement::from_mask(&arr1(&[true, true, true]))?;
        assert!(sym.is_symmetric());

        let asym = StructuringElement::from_mask(&arr1(&[true, true, false]))?;
        assert!(!asym.is_symmetric());
        assert!(!asym.is_separable());
        assert_eq!(asym.reflect().offsets(), vec![vec![1]]);

        let chained = StructuringElement::chain(asym.clone(), asym.reflect());
        assert!(chained.is_symmetric());
        assert!(!StructuringElement::chain(asym.clone(), asym).is_symmetric());
        Ok(())
    }

    #[test]
    fn test_chain_flattens() {
        let a = StructuringElement::from_dims(&[0], 1);
        let b = StructuringElement::from_dims(&[1], 1);
        let c = StructuringElement::unit_diamond(2);
        let chained = StructuringElement::chain(StructuringElement::chain(a, b), c);
        match &chained {
            StructuringElement::Chain(parts) => assert_eq!(parts.len(), 3),
            other => panic!("expected a chain, got {other:?}"),
        }
        assert!(chained.is_separable());
        assert_eq!(chained.rank(), 2);
        assert_eq!(chained.size(), vec![5, 5]);
    }

    #[test]
    fn test_product_offsets() {
        // two 1-D unit boxes add up to an interval of radius 2
        let a = StructuringElement::from_dims(&[0], 1);
        let se = StructuringElement::product(a.clone(), a);
        let mut offsets = se.offsets();
        offsets.sort();
        assert_eq!(offsets, vec![vec![-2], vec![-1], vec![1], vec![2]]);
        assert!(!se.is_separable());
        assert_eq!(se.radius(0), 2);
    }

    #[test]
    fn test_product_of_lines_is_box() {
        let rows = StructuringElement::from_dims(&[0], 1);
        let cols = StructuringElement::from_dims(&[1], 1);
        let se = StructuringElement::product(rows, cols);
        assert_eq!(se.offsets().len(), 8);
        assert_eq!(se.to_mask(), StructuringElement::unit_box(2).to_mask());
    }

    #[test]
    fn test_align_dims_shorthand() -> Result<(), StrelError> {
        let se = StructuringElement::from_dims(&[1], 1).align(3)?;
        assert_eq!(se, StructuringElement::new_box(&[0, 1, 0], &[1])?);

        let too_big = StructuringElement::unit_box(3);
        assert_eq!(too_big.align(2), Err(StrelError::DimensionMismatch(3, 2)));

        let chain = StructuringElement::chain(too_big.clone(), too_big);
        assert_eq!(chain.align(1), Err(StrelError::DimensionMismatch(3, 1)));
        Ok(())
    }

    #[test]
    fn test_truncate_unit() -> Result<(), StrelError> {
        let (se, cut) = StructuringElement::new_box(&[3, 1], &[0, 1])?.truncate_unit();
        assert!(cut);
        assert_eq!(se, StructuringElement::unit_box(2));

        let (se, cut) = StructuringElement::unit_diamond(2).truncate_unit();
        assert!(!cut);
        assert_eq!(se, StructuringElement::unit_diamond(2));

        let mask = StructuringElement::from_mask(&arr1(&[true, false, true, true, true]))?;
        let (se, cut) = mask.truncate_unit();
        assert!(cut);
        assert_eq!(se.offsets(), vec![vec![1]]);
        Ok(())
    }

    #[test]
    fn test_truncate_unit_wide_mask_within_unit() -> Result<(), StrelError> {
        // declared extent 5, but every offset is within one step
        let mask = StructuringElement::from_mask(&arr1(&[false, true, false, true, false]))?;
        assert_eq!(mask.radius(0), 2);
        let (se, cut) = mask.truncate_unit();
        assert!(!cut);
        assert_eq!(se.offsets(), vec![vec![-1], vec![1]]);

        let chain = StructuringElement::chain(mask.clone(), mask);
        let (se, cut) = chain.truncate_unit();
        assert!(cut);
        assert_eq!(se.offsets(), vec![vec![-1], vec![1]]);
        Ok(())
    }

    #[test]
    fn test_from_offsets_rank() -> Result<(), StrelError> {
        assert_eq!(
            StructuringElement::from_offsets(1, vec![vec![0, 1]]),
            Err(StrelError::DimensionMismatch(2, 1))
        );
        let se = StructuringElement::from_offsets(3, vec![vec![0, 1]])?;
        assert_eq!(se.rank(), 3);
        assert_eq!(se.offsets(), vec![vec![0, 1, 0]]);
        Ok(())
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_serde() -> Result<(), Box<dyn std::error::Error>> {
        let se = StructuringElement::chain(
            StructuringElement::unit_box(2),
            StructuringElement::from_offsets(2, vec![vec![0, 2]])?,
        );
        let json = serde_json::to_string(&se)?;
        let back: StructuringElement = serde_json::from_str(&json)?;
        assert_eq!(back, se);
        Ok(())
    }
}
