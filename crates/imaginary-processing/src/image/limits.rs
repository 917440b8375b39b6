//! Size limits on images produced by pipeline operations.
//!
//! Validation caps the dimensions a caller asks for, but a derived side (aspect-preserving
//! resize, `outside` scaling, arbitrary rotation) can still be arbitrarily large. Every
//! primitive that allocates a new buffer checks its size here first.

use imaginary_core::validation::MAX_DIMENSION;

use crate::error::CodecError;

/// Largest width or height an operation may produce.
pub const MAX_OUTPUT_DIMENSION: u32 = MAX_DIMENSION;

/// Largest pixel count an operation may produce (0x3FFF * 0x3FFF, as libvips-based servers use).
pub const MAX_OUTPUT_PIXELS: u64 = 268_402_689;

pub fn check_output_size(width: u32, height: u32) -> Result<(), CodecError> {
    let pixels = u64::from(width) * u64::from(height);
    if width > MAX_OUTPUT_DIMENSION || height > MAX_OUTPUT_DIMENSION || pixels > MAX_OUTPUT_PIXELS
    {
        tracing::warn!(width, height, "Rejected oversized operation output");
        return Err(CodecError::TooLarge { width, height });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limits() {
        assert!(check_output_size(16_384, 16_383).is_ok());
        assert!(check_output_size(16_385, 1).is_err());
        assert!(check_output_size(1, u32::MAX).is_err());
        assert!(check_output_size(16_384, 16_384).is_err());
    }
}
