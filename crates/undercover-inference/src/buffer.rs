//! Input and output tensor buffers.
//!
//! Both sides use 4-byte elements in native byte order: 32-bit signed token ids going in,
//! 32-bit floats coming out. Buffers are built per call and never shared between calls.
use crate::InferenceError;
use crate::shape::TensorShape;
use derive_more::Deref;

/// Width in bytes of every tensor element exchanged with the runtime.
pub const ELEMENT_WIDTH: usize = 4;

/// Input tensor contents: token ids encoded as native-endian `i32`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputEncoding {
    tokens: Vec<i32>,
    bytes: Vec<u8>,
}

impl InputEncoding {
    pub fn from_tokens(tokens: impl Into<Vec<i32>>) -> Self {
        let tokens = tokens.into();
        let bytes = tokens.iter().flat_map(|t| t.to_ne_bytes()).collect();
        Self { tokens, bytes }
    }

    pub fn single_token(token: i32) -> Self {
        Self::from_tokens(vec![token])
    }

    pub fn tokens(&self) -> &[i32] {
        &self.tokens
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Check that this encoding fills the declared input tensor exactly.
    pub fn check_against(&self, shape: &TensorShape) -> Result<(), InferenceError> {
        let expected = shape.element_count();
        let actual = u64::try_from(self.tokens.len()).ok();
        if expected.is_some() && expected == actual {
            Ok(())
        } else {
            Err(InferenceError::ShapeMismatch(format!(
                "input tensor {shape} expects {} elements but the encoding holds {}",
                expected.map_or_else(|| "an overflowing number of".to_string(), |e| e.to_string()),
                self.tokens.len()
            )))
        }
    }
}

/// Raw output tensor bytes, sized exactly for the output shape.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputBuffer {
    shape: TensorShape,
    bytes: Vec<u8>,
}

impl OutputBuffer {
    /// Compute the byte length for `shape` without allocating.
    ///
    /// Fails when the product of the dimensions overflows 64 bits, exceeds `max_bytes`, or does
    /// not fit in the address space.
    pub fn required_len(shape: &TensorShape, max_bytes: u64) -> Result<usize, InferenceError> {
        let len = shape.byte_len(ELEMENT_WIDTH).ok_or_else(|| {
            InferenceError::ShapeMismatch(format!(
                "output tensor {shape} overflows 64-bit byte arithmetic"
            ))
        })?;
        if len > max_bytes {
            return Err(InferenceError::ShapeMismatch(format!(
                "output tensor {shape} needs {len} bytes, above the {max_bytes} byte limit"
            )));
        }
        usize::try_from(len).map_err(|_| {
            InferenceError::ShapeMismatch(format!(
                "output tensor {shape} needs {len} bytes, which is not addressable"
            ))
        })
    }

    /// Allocate a zeroed buffer for `shape`.
    pub fn allocate(shape: &TensorShape, max_bytes: u64) -> Result<Self, InferenceError> {
        let len = Self::required_len(shape, max_bytes)?;
        Ok(Self {
            shape: shape.clone(),
            bytes: vec![0u8; len],
        })
    }

    /// Wrap bytes received from elsewhere; length is checked on [`OutputBuffer::decode`].
    pub fn from_bytes(shape: TensorShape, bytes: Vec<u8>) -> Self {
        Self { shape, bytes }
    }

    pub fn shape(&self) -> &TensorShape {
        &self.shape
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn as_mut_bytes(&mut self) -> &mut [u8] {
        &mut self.bytes
    }

    /// Decode into one float per output slot, failing closed on any length mismatch.
    pub fn decode(&self) -> Result<OutputValues, InferenceError> {
        let expected = self
            .shape
            .byte_len(ELEMENT_WIDTH)
            .and_then(|len| usize::try_from(len).ok());
        if expected != Some(self.bytes.len()) {
            return Err(InferenceError::ShapeMismatch(format!(
                "output buffer holds {} bytes but tensor {} requires {}",
                self.bytes.len(),
                self.shape,
                expected.map_or_else(|| "an overflowing count".to_string(), |e| e.to_string())
            )));
        }
        let values = self
            .bytes
            .chunks_exact(ELEMENT_WIDTH)
            .map(|chunk| f32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();
        Ok(OutputValues(values))
    }
}

/// Output tensor values in slot order.
#[derive(Debug, Clone, PartialEq, Deref)]
pub struct OutputValues(Vec<f32>);

impl OutputValues {
    pub fn into_inner(self) -> Vec<f32> {
        self.0
    }
}

impl From<Vec<f32>> for OutputValues {
    fn from(values: Vec<f32>) -> Self {
        Self(values)
    }
}

/// Encode floats the way a runtime writes them into an output buffer.
pub fn encode_f32(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shape(dims: &[usize]) -> TensorShape {
        TensorShape::new(dims.to_vec()).unwrap()
    }

    #[test]
    fn single_token_is_four_native_endian_bytes() {
        let input = InputEncoding::single_token(1);
        assert_eq!(input.as_bytes(), &1i32.to_ne_bytes());
        assert_eq!(input.tokens(), &[1]);
    }

    #[test]
    fn input_must_fill_the_declared_shape() {
        let input = InputEncoding::single_token(1);
        assert!(input.check_against(&shape(&[1])).is_ok());
        assert!(input.check_against(&shape(&[1, 1])).is_ok());
        let err = input.check_against(&shape(&[1, 64])).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch(_)));
    }

    #[test]
    fn output_is_sized_from_the_shape() {
        let buffer = OutputBuffer::allocate(&shape(&[4]), 1024).unwrap();
        assert_eq!(buffer.len(), 16);
        assert!(buffer.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn output_above_limit_is_refused() {
        let err = OutputBuffer::allocate(&shape(&[1, 64, 50257]), 1024).unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch(_)));
    }

    #[test]
    fn overflowing_output_is_refused() {
        let err = OutputBuffer::required_len(&shape(&[usize::MAX, 2]), u64::MAX).unwrap_err();
        assert!(err.to_string().contains("overflows"));
    }

    #[test]
    fn decodes_floats_in_slot_order() {
        let values = [0.1f32, 0.2, 0.3, 0.4];
        let buffer = OutputBuffer::from_bytes(shape(&[4]), encode_f32(&values));
        assert_eq!(&*buffer.decode().unwrap(), &values);
    }

    #[test]
    fn decode_fails_closed_on_short_buffer() {
        let buffer = OutputBuffer::from_bytes(shape(&[4]), encode_f32(&[0.1, 0.2, 0.3]));
        let err = buffer.decode().unwrap_err();
        assert!(matches!(err, InferenceError::ShapeMismatch(_)));
    }
}
