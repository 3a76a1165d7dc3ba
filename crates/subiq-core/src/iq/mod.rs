//! Sample encoder for `.c16` I/Q streams.
//!
//! Components are quantized with `round(x * 32767)` and clipped to the i16
//! range. Clipping is silent in the stream but counted in the
//! [`EncodeReport`]. The same samples always encode to the same bytes.

mod quantize;
mod writer;


pub use quantize::{dequantize, peak_for_amplitude, quantize, Quantized, FULL_SCALE};
pub use writer::{
    decode_pairs, encode, read_pairs, EncodeReport, IqRange, IqWriter, BYTES_PER_SAMPLE,
};
