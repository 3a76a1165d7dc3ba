//! Interleaved little-endian I/Q stream writer.

use std::io::{self, Write};

use byteorder::{ByteOrder, LittleEndian, ReadBytesExt};
use serde::Serialize;

use crate::error::EncodeWarning;
use crate::synth::ComplexSample;

use super::quantize::quantize;

/// Bytes per complex sample on the wire (I and Q, 2 bytes each).
pub const BYTES_PER_SAMPLE: usize = 4;

/// Summary of an encoded stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodeReport {
    /// Complex samples written.
    pub samples: u64,
    /// I or Q components that were clamped.
    pub clamped: u64,
    /// BLAKE3 hash of the written bytes.
    pub iq_hash: String,
    /// Extremes of the quantized components (`None` for an empty stream).
    pub range: Option<IqRange>,
}

/// Smallest and largest quantized I and Q values of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IqRange {
    pub min_i: i16,
    pub max_i: i16,
    pub min_q: i16,
    pub max_q: i16,
}

impl IqRange {
    fn of(i: i16, q: i16) -> Self {
        Self {
            min_i: i,
            max_i: i,
            min_q: q,
            max_q: q,
        }
    }

    fn include(&mut self, i: i16, q: i16) {
        self.min_i = self.min_i.min(i);
        self.max_i = self.max_i.max(i);
        self.min_q = self.min_q.min(q);
        self.max_q = self.max_q.max(q);
    }
}

impl EncodeReport {
    /// Size of the stream in bytes.
    pub fn bytes(&self) -> u64 {
        self.samples * BYTES_PER_SAMPLE as u64
    }

    /// Clamping warning, if any component was clamped.
    pub fn warning(&self) -> Option<EncodeWarning> {
        (self.clamped > 0).then_some(EncodeWarning::Clamped {
            count: self.clamped,
        })
    }
}

/// Streams complex samples as `.c16`: I then Q per tick, i16 little-endian,
/// no header and no padding.
pub struct IqWriter<W: Write> {
    writer: W,
    hasher: blake3::Hasher,
    samples: u64,
    clamped: u64,
    range: Option<IqRange>,
}

impl<W: Write> IqWriter<W> {
    /// Wraps a writer. Callers writing to files should pass a `BufWriter`.
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            hasher: blake3::Hasher::new(),
            samples: 0,
            clamped: 0,
            range: None,
        }
    }

    /// Quantizes and writes one sample.
    pub fn write_sample(&mut self, sample: ComplexSample) -> io::Result<()> {
        let i = quantize(sample.i);
        let q = quantize(sample.q);

        let mut frame = [0u8; BYTES_PER_SAMPLE];
        LittleEndian::write_i16(&mut frame[0..2], i.value);
        LittleEndian::write_i16(&mut frame[2..4], q.value);

        self.writer.write_all(&frame)?;
        self.hasher.update(&frame);

        self.samples += 1;
        self.clamped += i.clamped as u64 + q.clamped as u64;
        match self.range.as_mut() {
            Some(range) => range.include(i.value, q.value),
            None => self.range = Some(IqRange::of(i.value, q.value)),
        }
        Ok(())
    }

    /// Writes every sample of an iterator.
    pub fn write_samples<I>(&mut self, samples: I) -> io::Result<()>
    where
        I: IntoIterator<Item = ComplexSample>,
    {
        for sample in samples {
            self.write_sample(sample)?;
        }
        Ok(())
    }

    /// Samples written so far.
    pub fn samples_written(&self) -> u64 {
        self.samples
    }

    /// Flushes the writer and returns it together with the stream report.
    pub fn finish(mut self) -> io::Result<(W, EncodeReport)> {
        self.writer.flush()?;
        let report = EncodeReport {
            samples: self.samples,
            clamped: self.clamped,
            iq_hash: self.hasher.finalize().to_hex().to_string(),
            range: self.range,
        };
        Ok((self.writer, report))
    }
}

/// Encodes samples to an in-memory `.c16` buffer.
pub fn encode<I>(samples: I) -> (Vec<u8>, EncodeReport)
where
    I: IntoIterator<Item = ComplexSample>,
{
    let mut writer = IqWriter::new(Vec::new());
    writer
        .write_samples(samples)
        .expect("writing to Vec should not fail");
    writer.finish().expect("flushing a Vec should not fail")
}

/// Decodes a `.c16` buffer into `(I, Q)` pairs.
///
/// A trailing partial sample is ignored.
pub fn decode_pairs(bytes: &[u8]) -> Vec<(i16, i16)> {
    bytes
        .chunks_exact(BYTES_PER_SAMPLE)
        .map(|frame| {
            (
                LittleEndian::read_i16(&frame[0..2]),
                LittleEndian::read_i16(&frame[2..4]),
            )
        })
        .collect()
}

/// Reads `(I, Q)` pairs from a reader until end of input.
///
/// Returns the pairs and the number of trailing bytes that did not form a
/// complete sample.
pub fn read_pairs<R: io::Read>(mut reader: R) -> io::Result<(Vec<(i16, i16)>, usize)> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let trailing = bytes.len() % BYTES_PER_SAMPLE;
    let mut cursor = io::Cursor::new(&bytes[..bytes.len() - trailing]);
    let mut pairs = Vec::with_capacity(bytes.len() / BYTES_PER_SAMPLE);
    while (cursor.position() as usize) < cursor.get_ref().len() {
        let i = cursor.read_i16::<LittleEndian>()?;
        let q = cursor.read_i16::<LittleEndian>()?;
        pairs.push((i, q));
    }
    Ok((pairs, trailing))
}
