use std::fmt;

// Shape: N-dimensional shape representation
//
// Frame data only ever needs three shapes:
//   - Matrix:      [dim, frames]           one decoded file
//   - Unit batch:  [1, dim, frames]        one sample
//   - Batch:       [batch, dim, frames]    stacked samples
//
// The shape determines the element count (product of all dims) and the
// row-major strides used to address elements of a contiguous buffer.

/// N-dimensional shape of a tensor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Create a new shape from a vector of dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions.
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements (product of all dimensions).
    ///
    /// Unlike a scalar shape, a shape with a zero-sized dimension holds no
    /// elements: an empty utterance decodes to `[dim, 0]`.
    pub fn elem_count(&self) -> usize {
        self.0.iter().product::<usize>()
    }

    /// Compute the contiguous (row-major / C-order) strides for this shape.
    ///
    /// For shape [2, 3, 4], strides are [12, 4, 1].
    pub fn stride_contiguous(&self) -> Vec<usize> {
        let mut strides = vec![0usize; self.rank()];
        if self.rank() > 0 {
            strides[self.rank() - 1] = 1;
            for i in (0..self.rank() - 1).rev() {
                strides[i] = strides[i + 1] * self.0[i + 1];
            }
        }
        strides
    }

    /// Size of a specific dimension.
    pub fn dim(&self, d: usize) -> crate::Result<usize> {
        self.0.get(d).copied().ok_or(crate::Error::DimOutOfRange {
            dim: d,
            rank: self.rank(),
        })
    }

    /// A new shape with a dimension of size `size` inserted at position `d`.
    pub fn insert(&self, d: usize, size: usize) -> crate::Result<Shape> {
        if d > self.rank() {
            return Err(crate::Error::DimOutOfRange {
                dim: d,
                rank: self.rank(),
            });
        }
        let mut dims = self.0.clone();
        dims.insert(d, size);
        Ok(Shape(dims))
    }

    /// The dimensions after the leading one (`[b, d, t]` → `[d, t]`).
    pub fn trailing(&self) -> &[usize] {
        self.0.get(1..).unwrap_or(&[])
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

// These let you write: Shape::from((60, 10)) instead of Shape::new(vec![60, 10])

impl From<(usize, usize)> for Shape {
    fn from((d0, d1): (usize, usize)) -> Self {
        Shape(vec![d0, d1])
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((d0, d1, d2): (usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_shape() {
        let s = Shape::from((60, 10));
        assert_eq!(s.rank(), 2);
        assert_eq!(s.elem_count(), 600);
        assert_eq!(s.stride_contiguous(), vec![10, 1]);
    }

    #[test]
    fn test_3d_strides() {
        let s = Shape::from((2, 3, 4));
        assert_eq!(s.stride_contiguous(), vec![12, 4, 1]);
        assert_eq!(s.elem_count(), 24);
    }

    #[test]
    fn test_empty_utterance_has_no_elements() {
        let s = Shape::from((60, 0));
        assert_eq!(s.elem_count(), 0);
    }

    #[test]
    fn test_insert_leading() {
        let s = Shape::from((60, 10)).insert(0, 1).unwrap();
        assert_eq!(s.dims(), &[1, 60, 10]);
        assert_eq!(s.trailing(), &[60, 10]);
    }

    #[test]
    fn test_insert_out_of_range() {
        let err = Shape::from((60, 10)).insert(3, 1).unwrap_err();
        assert!(matches!(err, crate::Error::DimOutOfRange { dim: 3, rank: 2 }));
    }

    #[test]
    fn test_dim_lookup() {
        let s = Shape::from((1, 60, 10));
        assert_eq!(s.dim(2).unwrap(), 10);
        assert!(s.dim(3).is_err());
    }

    #[test]
    fn test_display() {
        let s = Shape::from((1, 60, 10));
        assert_eq!(format!("{}", s), "[1, 60, 10]");
    }
}
