//! Float to 16-bit quantization.

/// Scale factor from a unit-magnitude float to i16.
pub const FULL_SCALE: f64 = 32767.0;

/// A quantized component and whether it had to be clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quantized {
    /// The 16-bit value.
    pub value: i16,
    /// True if the scaled input fell outside `[-32768, 32767]` (or was NaN).
    pub clamped: bool,
}

/// Quantizes one component: `round(value * 32767)` clipped to the i16 range.
#[inline]
pub fn quantize(value: f64) -> Quantized {
    let scaled = (value * FULL_SCALE).round();

    if scaled > i16::MAX as f64 {
        Quantized {
            value: i16::MAX,
            clamped: true,
        }
    } else if scaled < i16::MIN as f64 {
        Quantized {
            value: i16::MIN,
            clamped: true,
        }
    } else if scaled.is_nan() {
        Quantized {
            value: 0,
            clamped: true,
        }
    } else {
        Quantized {
            value: scaled as i16,
            clamped: false,
        }
    }
}

/// Converts a quantized value back to the unit range.
pub fn dequantize(value: i16) -> f64 {
    value as f64 / FULL_SCALE
}

/// Largest magnitude an amplitude fraction can produce after quantization.
pub fn peak_for_amplitude(amplitude_fraction: f64) -> i16 {
    quantize(amplitude_fraction).value
}
