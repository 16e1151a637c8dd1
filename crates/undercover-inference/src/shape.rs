use derive_more::Deref;
use std::fmt::{Display, Formatter};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("Tensor shape has no dimensions")]
    Empty,
    #[error("Tensor dimension {index} must be positive, got {value}")]
    NonPositiveDimension { index: usize, value: i64 },
}

/// Ordered, positive dimension sizes of one input or output tensor slot, as declared by a model.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Deref)]
pub struct TensorShape(Vec<usize>);

impl TensorShape {
    pub fn new(dims: impl Into<Vec<usize>>) -> Result<Self, ShapeError> {
        let dims = dims.into();
        if dims.is_empty() {
            return Err(ShapeError::Empty);
        }
        if let Some(index) = dims.iter().position(|&d| d == 0) {
            return Err(ShapeError::NonPositiveDimension { index, value: 0 });
        }
        Ok(Self(dims))
    }

    /// Build a shape from signed sizes, as most runtimes report them (`-1` marks a dynamic
    /// dimension, which is rejected here).
    pub fn from_signed(dims: &[i64]) -> Result<Self, ShapeError> {
        let mut out = Vec::with_capacity(dims.len());
        for (index, &value) in dims.iter().enumerate() {
            match usize::try_from(value) {
                Ok(d) if d > 0 => out.push(d),
                _ => return Err(ShapeError::NonPositiveDimension { index, value }),
            }
        }
        Self::new(out)
    }

    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Size of the innermost dimension.
    pub fn last_dim(&self) -> usize {
        // Shapes are never empty.
        self.0.last().copied().unwrap_or(1)
    }

    /// Product of all dimensions, or `None` if it does not fit in 64 bits.
    pub fn element_count(&self) -> Option<u64> {
        self.0.iter().try_fold(1u64, |acc, &d| {
            let d = u64::try_from(d).ok()?;
            acc.checked_mul(d)
        })
    }

    /// Byte length of a dense buffer holding this shape, or `None` on overflow.
    pub fn byte_len(&self, element_width: usize) -> Option<u64> {
        let width = u64::try_from(element_width).ok()?;
        self.element_count()?.checked_mul(width)
    }
}

impl TryFrom<Vec<usize>> for TensorShape {
    type Error = ShapeError;

    fn try_from(dims: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(dims)
    }
}

impl TryFrom<&[i32]> for TensorShape {
    type Error = ShapeError;

    fn try_from(dims: &[i32]) -> Result<Self, Self::Error> {
        let dims: Vec<i64> = dims.iter().map(|&d| i64::from(d)).collect();
        Self::from_signed(&dims)
    }
}

impl Display for TensorShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(vec![1], 1)]
    #[case(vec![4], 4)]
    #[case(vec![1, 64, 50257], 64 * 50257)]
    fn counts_elements(#[case] dims: Vec<usize>, #[case] expected: u64) {
        let shape = TensorShape::new(dims).unwrap();
        assert_eq!(shape.element_count(), Some(expected));
        assert_eq!(shape.byte_len(4), Some(expected * 4));
    }

    #[test]
    fn element_count_overflow_is_none() {
        let shape = TensorShape::new(vec![usize::MAX, usize::MAX]).unwrap();
        assert_eq!(shape.element_count(), None);
        assert_eq!(shape.byte_len(4), None);
    }

    #[test]
    fn byte_len_overflow_is_none() {
        let shape = TensorShape::new(vec![1usize << 62]).unwrap();
        assert!(shape.element_count().is_some());
        assert_eq!(shape.byte_len(4), None);
    }

    #[test]
    fn rejects_empty_and_zero_dimensions() {
        assert_eq!(TensorShape::new(Vec::<usize>::new()), Err(ShapeError::Empty));
        assert_eq!(
            TensorShape::new(vec![1, 0, 3]),
            Err(ShapeError::NonPositiveDimension { index: 1, value: 0 })
        );
    }

    #[test]
    fn rejects_dynamic_signed_dimensions() {
        assert_eq!(
            TensorShape::from_signed(&[1, -1]),
            Err(ShapeError::NonPositiveDimension {
                index: 1,
                value: -1
            })
        );
        let shape = TensorShape::try_from(&[1i32, 4][..]).unwrap();
        assert_eq!(shape.dims(), &[1, 4]);
    }

    #[test]
    fn displays_as_dimension_list() {
        let shape = TensorShape::new(vec![1, 4]).unwrap();
        assert_eq!(shape.to_string(), "[1, 4]");
        assert_eq!(shape.rank(), 2);
        assert_eq!(shape.last_dim(), 4);
    }
}
