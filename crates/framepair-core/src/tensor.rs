use crate::error::{Error, Result};
use crate::shape::Shape;

// Tensor: dense, contiguous f32 storage plus a shape
//
// Decoded feature files are small (one utterance each) and are consumed
// read-only, so the tensor owns a flat row-major buffer and every shape
// operation that moves data produces a fresh contiguous tensor:
//
//   reshape   : same buffer, new shape (element counts must agree)
//   t         : 2-D transpose, copies into the transposed order
//   unsqueeze : same buffer, size-1 dimension inserted
//   cat       : concatenate along dim 0 (batch assembly)

/// A dense row-major `f32` tensor.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Vec<f32>,
    shape: Shape,
}

impl Tensor {
    /// Create a tensor from a flat buffer laid out row-major for `shape`.
    pub fn from_vec(data: Vec<f32>, shape: impl Into<Shape>) -> Result<Self> {
        let shape = shape.into();
        let expected = shape.elem_count();
        if data.len() != expected {
            return Err(Error::ElementCountMismatch {
                shape,
                expected,
                got: data.len(),
            });
        }
        Ok(Self { data, shape })
    }

    /// A zero-filled tensor.
    pub fn zeros(shape: impl Into<Shape>) -> Self {
        let shape = shape.into();
        Self {
            data: vec![0.0; shape.elem_count()],
            shape,
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    pub fn dims(&self) -> &[usize] {
        self.shape.dims()
    }

    pub fn rank(&self) -> usize {
        self.shape.rank()
    }

    pub fn elem_count(&self) -> usize {
        self.data.len()
    }

    /// The row-major element buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Read one element by multi-dimensional index.
    pub fn get(&self, index: &[usize]) -> Result<f32> {
        if index.len() != self.rank() {
            return Err(Error::RankMismatch {
                expected: self.rank(),
                got: index.len(),
            });
        }
        let mut offset = 0;
        for ((&i, &size), stride) in index
            .iter()
            .zip(self.dims())
            .zip(self.shape.stride_contiguous())
        {
            if i >= size {
                return Err(Error::IndexOutOfRange {
                    index: i,
                    len: size,
                });
            }
            offset += i * stride;
        }
        Ok(self.data[offset])
    }

    /// Reshape to a new shape. The new shape must have the same total elements.
    pub fn reshape(self, new_shape: impl Into<Shape>) -> Result<Self> {
        let new_shape = new_shape.into();
        let src = self.elem_count();
        let dst = new_shape.elem_count();
        if src != dst {
            return Err(Error::ReshapeElementMismatch {
                src,
                dst,
                dst_shape: new_shape,
            });
        }
        Ok(Self {
            data: self.data,
            shape: new_shape,
        })
    }

    /// Transpose a 2D matrix: `[rows, cols]` → `[cols, rows]`.
    pub fn t(&self) -> Result<Self> {
        if self.rank() != 2 {
            return Err(Error::RankMismatch {
                expected: 2,
                got: self.rank(),
            });
        }
        let (rows, cols) = (self.dims()[0], self.dims()[1]);
        let mut out = Vec::with_capacity(self.data.len());
        for c in 0..cols {
            out.extend((0..rows).map(|r| self.data[r * cols + c]));
        }
        Ok(Self {
            data: out,
            shape: Shape::from((cols, rows)),
        })
    }

    /// Add a dimension of size 1 at the given position.
    /// unsqueeze(0) on [60, 10] → [1, 60, 10]
    pub fn unsqueeze(self, dim: usize) -> Result<Self> {
        let shape = self.shape.insert(dim, 1)?;
        Ok(Self {
            data: self.data,
            shape,
        })
    }

    /// Concatenate tensors along dimension 0.
    ///
    /// Every tensor must share the trailing dimensions of the first one;
    /// unit-batch samples `[1, d, t]` concatenate into `[n, d, t]`.
    pub fn cat(tensors: &[Tensor]) -> Result<Self> {
        let first = match tensors.first() {
            Some(t) => t,
            None => return Err(Error::msg("cat: empty tensor list")),
        };
        if first.rank() == 0 {
            return Err(Error::DimOutOfRange { dim: 0, rank: 0 });
        }

        let trailing = first.shape.trailing();
        let mut leading = 0;
        for t in tensors {
            if t.rank() != first.rank() || t.shape.trailing() != trailing {
                let mut expected = vec![t.dims().first().copied().unwrap_or(0)];
                expected.extend_from_slice(trailing);
                return Err(Error::ShapeMismatch {
                    expected: Shape::new(expected),
                    got: t.shape.clone(),
                });
            }
            leading += t.dims()[0];
        }

        let mut data = Vec::with_capacity(tensors.iter().map(Tensor::elem_count).sum());
        for t in tensors {
            data.extend_from_slice(&t.data);
        }
        let mut dims = vec![leading];
        dims.extend_from_slice(trailing);
        Ok(Self {
            data,
            shape: Shape::new(dims),
        })
    }
}
