//! Byte-stable WAV encoding of rendered buffers.
//!
//! Output is a bare 44-byte RIFF/WAVE header followed by 16-bit little-endian
//! PCM. No timestamps or optional chunks are written, so equal buffers always
//! encode to equal files.

use std::io::{self, Write};
use std::path::Path;

use crate::buffer::RenderedBuffer;
use crate::error::SynthResult;

/// Size of the header in bytes.
pub const HEADER_LEN: usize = 44;

const BITS_PER_SAMPLE: u16 = 16;
const FORMAT_PCM: u16 = 1;

/// Header fields derived from a buffer's layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavHeader {
    pub channels: u16,
    pub sample_rate: u32,
    /// Length of the PCM payload in bytes.
    pub data_len: u32,
}

impl WavHeader {
    /// Header describing `buffer`.
    pub fn for_buffer(buffer: &RenderedBuffer) -> Self {
        Self {
            channels: buffer.channels(),
            sample_rate: buffer.sample_rate(),
            data_len: (buffer.samples().len() * 2) as u32,
        }
    }

    /// Bytes per sample frame.
    pub fn block_align(&self) -> u16 {
        self.channels * (BITS_PER_SAMPLE / 8)
    }

    pub fn byte_rate(&self) -> u32 {
        self.sample_rate * self.block_align() as u32
    }

    /// The 44 header bytes.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        let fields: [&[u8]; 13] = [
            b"RIFF",
            &(36 + self.data_len).to_le_bytes(),
            b"WAVE",
            b"fmt ",
            &16u32.to_le_bytes(),
            &FORMAT_PCM.to_le_bytes(),
            &self.channels.to_le_bytes(),
            &self.sample_rate.to_le_bytes(),
            &self.byte_rate().to_le_bytes(),
            &self.block_align().to_le_bytes(),
            &BITS_PER_SAMPLE.to_le_bytes(),
            b"data",
            &self.data_len.to_le_bytes(),
        ];

        let mut pos = 0;
        for field in fields {
            out[pos..pos + field.len()].copy_from_slice(field);
            pos += field.len();
        }
        out
    }
}

/// Streams `buffer` as a WAV file into `writer`.
pub fn write_wav<W: Write>(writer: &mut W, buffer: &RenderedBuffer) -> io::Result<()> {
    writer.write_all(&WavHeader::for_buffer(buffer).to_bytes())?;
    writer.write_all(&i16_to_pcm(buffer.samples()))
}

/// Encodes `buffer` as WAV bytes in memory.
pub fn encode(buffer: &RenderedBuffer) -> Vec<u8> {
    let header = WavHeader::for_buffer(buffer);
    let mut out = Vec::with_capacity(HEADER_LEN + header.data_len as usize);
    out.extend_from_slice(&header.to_bytes());
    out.extend(buffer.samples().iter().flat_map(|s| s.to_le_bytes()));
    out
}

/// Writes a rendered buffer to a WAV file on disk.
pub fn write_wav_file(path: &Path, buffer: &RenderedBuffer) -> SynthResult<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_wav(&mut file, buffer)?;
    file.flush()?;
    Ok(())
}

/// Little-endian bytes of interleaved 16-bit samples.
pub fn i16_to_pcm(samples: &[i16]) -> Vec<u8> {
    samples.iter().flat_map(|s| s.to_le_bytes()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn u32_at(bytes: &[u8], at: usize) -> u32 {
        u32::from_le_bytes([bytes[at], bytes[at + 1], bytes[at + 2], bytes[at + 3]])
    }

    fn u16_at(bytes: &[u8], at: usize) -> u16 {
        u16::from_le_bytes([bytes[at], bytes[at + 1]])
    }

    #[test]
    fn test_header_fields() {
        // two stereo frames = 8 data bytes
        let buffer = RenderedBuffer::from_mono(&[0, 0]);
        let wav = encode(&buffer);

        assert_eq!(wav.len(), HEADER_LEN + 8);
        assert_eq!(&wav[0..4], b"RIFF");
        assert_eq!(u32_at(&wav, 4), 44);
        assert_eq!(&wav[8..12], b"WAVE");
        assert_eq!(&wav[12..16], b"fmt ");
        assert_eq!(u16_at(&wav, 20), 1);
        assert_eq!(u16_at(&wav, 22), 2);
        assert_eq!(u32_at(&wav, 24), 44_100);
        assert_eq!(u32_at(&wav, 28), 176_400);
        assert_eq!(u16_at(&wav, 32), 4);
        assert_eq!(u16_at(&wav, 34), 16);
        assert_eq!(&wav[36..40], b"data");
        assert_eq!(u32_at(&wav, 40), 8);
    }

    #[test]
    fn test_streamed_matches_encoded() {
        let buffer = RenderedBuffer::from_mono(&[7, -7, 300]);
        let mut streamed = Vec::new();
        write_wav(&mut streamed, &buffer).unwrap();
        assert_eq!(streamed, encode(&buffer));
    }

    #[test]
    fn test_i16_to_pcm() {
        assert_eq!(i16_to_pcm(&[1, -1]), vec![0x01, 0x00, 0xff, 0xff]);
    }

    #[test]
    fn test_write_wav_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.wav");
        let buffer = RenderedBuffer::from_mono(&[100, -100, 0]);

        write_wav_file(&path, &buffer).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes, encode(&buffer));
    }
}
