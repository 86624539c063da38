use crate::error::StrelError;

/// Per-dimension half-widths of a separable structuring element.
///
/// A dimension with half-width `0` is inactive: the neighborhood does not extend along it.
/// The rank of the element is the number of stored half-widths.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SeparableStrel {
    radii: Vec<usize>,
}

impl SeparableStrel {
    /// Create a separable element from per-dimension half-widths and the active dimensions.
    ///
    /// # Arguments
    ///
    /// * `half_widths` - The half-width `r_d` for every dimension; its length is the rank.
    /// * `active_dims` - The dimensions the neighborhood extends along. Others get radius 0.
    ///
    /// # Errors
    ///
    /// Returns [`StrelError::InvalidDimension`] if an active dimension is not below the rank.
    pub fn new(half_widths: &[usize], active_dims: &[usize]) -> Result<Self, StrelError> {
        let rank = half_widths.len();
        let mut radii = vec![0; rank];
        for &d in active_dims {
            if d >= rank {
                return Err(StrelError::InvalidDimension(d, rank));
            }
            radii[d] = half_widths[d];
        }
        Ok(Self { radii })
    }

    /// Create a separable element with the same half-width along each dimension in `dims`.
    ///
    /// The rank is the smallest one that contains every dimension in `dims`.
    pub fn uniform(dims: &[usize], radius: usize) -> Self {
        let rank = dims.iter().map(|&d| d + 1).max().unwrap_or(0);
        let mut radii = vec![0; rank];
        for &d in dims {
            radii[d] = radius;
        }
        Self { radii }
    }

    /// The number of dimensions the element is defined over.
    pub fn rank(&self) -> usize {
        self.radii.len()
    }

    /// The half-width along `dim`; dimensions beyond the rank have radius 0.
    pub fn radius(&self, dim: usize) -> usize {
        self.radii.get(dim).copied().unwrap_or(0)
    }

    /// All half-widths, one per dimension.
    pub fn radii(&self) -> &[usize] {
        &self.radii
    }

    /// The largest half-width over all dimensions.
    pub fn max_radius(&self) -> usize {
        self.radii.iter().copied().max().unwrap_or(0)
    }

    /// The dimensions with a non-zero half-width, in ascending order.
    pub fn active_dims(&self) -> Vec<usize> {
        self.radii
            .iter()
            .enumerate()
            .filter(|(_, &r)| r > 0)
            .map(|(d, _)| d)
            .collect()
    }

    /// Whether every active dimension shares the same half-width.
    pub fn is_uniform(&self) -> bool {
        let mut active = self.radii.iter().filter(|&&r| r > 0);
        match active.next() {
            Some(first) => active.all(|r| r == first),
            None => true,
        }
    }

    /// Enumerate the neighborhood of the box `Π [-r_d, r_d]` in row-major order, without
    /// the zero offset.
    pub fn box_offsets(&self) -> Vec<Vec<isize>> {
        self.enumerate(|_| true)
    }

    /// Enumerate the box neighborhood restricted to `Σ|o_d| ≤ max(r_d)`, in row-major
    /// order, without the zero offset.
    pub fn diamond_offsets(&self) -> Vec<Vec<isize>> {
        let limit = self.max_radius();
        self.enumerate(|o| o.iter().map(|v| v.unsigned_abs()).sum::<usize>() <= limit)
    }

    /// Clamp every half-width to at most `max`.
    pub fn clamped(&self, max: usize) -> Self {
        Self {
            radii: self.radii.iter().map(|&r| r.min(max)).collect(),
        }
    }

    /// Broadcast to `ndim` dimensions: pad with inactive dimensions or drop trailing
    /// inactive ones.
    pub fn aligned(&self, ndim: usize) -> Result<Self, StrelError> {
        if self.radii.iter().skip(ndim).any(|&r| r > 0) {
            return Err(StrelError::DimensionMismatch(self.rank(), ndim));
        }
        let mut radii = self.radii.clone();
        radii.resize(ndim, 0);
        Ok(Self { radii })
    }

    fn enumerate(&self, keep: impl Fn(&[isize]) -> bool) -> Vec<Vec<isize>> {
        let rank = self.rank();
        let mut offsets = Vec::new();
        let mut current: Vec<isize> = self.radii.iter().map(|&r| -(r as isize)).collect();
        if rank == 0 {
            return offsets;
        }

        // odometer over the box, last dimension fastest
        loop {
            if current.iter().any(|&v| v != 0) && keep(&current) {
                offsets.push(current.clone());
            }
            let mut d = rank;
            loop {
                if d == 0 {
                    return offsets;
                }
                d -= 1;
                if current[d] < self.radii[d] as isize {
                    current[d] += 1;
                    break;
                }
                current[d] = -(self.radii[d] as isize);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_inactive_dims() -> Result<(), StrelError> {
        let se = SeparableStrel::new(&[2, 3, 1], &[0, 2])?;
        assert_eq!(se.radii(), &[2, 0, 1]);
        assert_eq!(se.active_dims(), vec![0, 2]);
        assert_eq!(se.radius(7), 0);
        Ok(())
    }

    #[test]
    fn test_new_invalid_dim() {
        let se = SeparableStrel::new(&[1, 1], &[2]);
        assert_eq!(se, Err(StrelError::InvalidDimension(2, 2)));
    }

    #[test]
    fn test_uniform() {
        let se = SeparableStrel::uniform(&[1], 2);
        assert_eq!(se.radii(), &[0, 2]);
        assert!(se.is_uniform());
        assert!(!SeparableStrel::uniform(&[], 1).radii().iter().any(|&r| r > 0));
    }

    #[test]
    fn test_box_offsets_order() {
        let se = SeparableStrel::uniform(&[0, 1], 1);
        let offsets = se.box_offsets();
        assert_eq!(offsets.len(), 8);
        assert_eq!(offsets[0], vec![-1, -1]);
        assert_eq!(offsets[1], vec![-1, 0]);
        assert_eq!(offsets[3], vec![0, -1]);
        assert_eq!(offsets[4], vec![0, 1]);
        assert_eq!(offsets[7], vec![1, 1]);
    }

    #[test]
    fn test_diamond_offsets() {
        let se = SeparableStrel::uniform(&[0, 1], 2);
        let offsets = se.diamond_offsets();
        // 13 pixels in an L1 ball of radius 2, minus the center
        assert_eq!(offsets.len(), 12);
        assert!(offsets.contains(&vec![-2, 0]));
        assert!(offsets.contains(&vec![1, 1]));
        assert!(!offsets.contains(&vec![2, 1]));
    }

    #[test]
    fn test_aligned() -> Result<(), StrelError> {
        let se = SeparableStrel::uniform(&[0], 1);
        assert_eq!(se.aligned(3)?.radii(), &[1, 0, 0]);

        let se = SeparableStrel::new(&[1, 0, 0], &[0])?;
        assert_eq!(se.aligned(1)?.radii(), &[1]);

        let se = SeparableStrel::uniform(&[2], 1);
        assert_eq!(se.aligned(2), Err(StrelError::DimensionMismatch(3, 2)));
        Ok(())
    }
}
