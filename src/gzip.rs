//! gzip envelope parsing (RFC 1952) and the per-block dispatch loop that
//! drives the DEFLATE decoder (RFC 1951 §3.2.3).

use std::io::Write;

use log::{debug, trace, warn};

use crate::bitstream::BitReader;
use crate::block::decode_block;
use crate::constants::{fixed_litlen_lengths, BTYPE_DYNAMIC, BTYPE_FIXED, BTYPE_RESERVED, BTYPE_STORED};
use crate::errors::{GzipDecodeError, GzipErrorKind};
use crate::header::decode_dynamic_header;
use crate::huffman::Codebook;
use crate::window::SlidingWindow;

const GZIP_MAGIC: [u8; 2] = [0x1F, 0x8B];
const DEFLATE_METHOD: u8 = 8;

mod flag
{
    pub const FHCRC: u8 = 0x02;
    pub const FEXTRA: u8 = 0x04;
    pub const FNAME: u8 = 0x08;
    pub const FCOMMENT: u8 = 0x10;
}

/// Decodes one gzip member held entirely in memory.
///
/// Mirrors the shape of a single-shot, in-memory decoder: the whole
/// member is addressed by a borrowed slice for the duration of the
/// decode, and output is pushed to a caller-supplied sink as it is
/// produced rather than accumulated internally.
pub struct GzipDecoder<'a>
{
    data: &'a [u8]
}

impl<'a> GzipDecoder<'a>
{
    pub fn new(data: &'a [u8]) -> GzipDecoder<'a>
    {
        GzipDecoder { data }
    }

    /// Parse the gzip header, then decode every DEFLATE block in the
    /// member, writing decompressed bytes to `sink`. The gzip trailer
    /// (CRC32 + ISIZE) is read past but not verified.
    pub fn decode_into<W: Write>(&mut self, sink: &mut W) -> Result<(), GzipDecodeError>
    {
        let body_start = self.parse_header()?;

        let mut bits = BitReader::new(&self.data[body_start..]);
        let mut window = SlidingWindow::new();

        let fixed_litlen_book = Codebook::build(&fixed_litlen_lengths(), false)?;

        loop
        {
            let is_final = bits.read_bits(1)? == 1;
            let block_type = bits.read_bits(2)?;

            trace!("block: bfinal={is_final} btype={block_type}");

            match block_type
            {
                BTYPE_STORED => decode_stored_block(&mut bits, &mut window, sink)?,
                BTYPE_FIXED => decode_block(&mut bits, &fixed_litlen_book, None, &mut window, sink)?,
                BTYPE_DYNAMIC =>
                {
                    let codebooks = decode_dynamic_header(&mut bits)?;
                    decode_block(
                        &mut bits,
                        &codebooks.litlen,
                        Some(&codebooks.distance),
                        &mut window,
                        sink
                    )?;
                }
                BTYPE_RESERVED => return Err(GzipErrorKind::ReservedBlockType.into()),
                _ => unreachable!("btype is read as exactly 2 bits")
            }

            if is_final
            {
                break;
            }
        }

        Ok(())
    }

    /// Parse the 10-byte fixed header plus any optional fields gated by
    /// the flags byte, returning the byte offset the DEFLATE bitstream
    /// starts at.
    fn parse_header(&self) -> Result<usize, GzipDecodeError>
    {
        if self.data.len() < 10
        {
            return Err(GzipErrorKind::InputTruncated.into());
        }
        if self.data[0..2] != GZIP_MAGIC
        {
            return Err(GzipErrorKind::NotGzip.into());
        }

        let method = self.data[2];
        if method != DEFLATE_METHOD
        {
            return Err(GzipErrorKind::UnsupportedMethod(method).into());
        }

        let flags = self.data[3];
        let mut pos = 10_usize;

        if flags & flag::FEXTRA != 0
        {
            let xlen = read_u16_le(self.data, pos)? as usize;
            pos += 2;
            warn!("gzip header carries an FEXTRA field of {xlen} bytes, skipping it");
            pos = advance(self.data, pos, xlen)?;
        }
        if flags & flag::FNAME != 0
        {
            pos = skip_cstring(self.data, pos)?;
        }
        if flags & flag::FCOMMENT != 0
        {
            pos = skip_cstring(self.data, pos)?;
        }
        if flags & flag::FHCRC != 0
        {
            pos = advance(self.data, pos, 2)?;
        }

        debug!("gzip header parsed, deflate stream starts at byte {pos}");

        Ok(pos)
    }
}

fn decode_stored_block<W: Write>(
    bits: &mut BitReader, window: &mut SlidingWindow, sink: &mut W
) -> Result<(), GzipDecodeError>
{
    bits.align_to_byte();

    let len_bytes = bits.read_aligned_bytes(2)?;
    let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]);

    let nlen_bytes = bits.read_aligned_bytes(2)?;
    let nlen = u16::from_le_bytes([nlen_bytes[0], nlen_bytes[1]]);

    if nlen != !len
    {
        return Err(GzipErrorKind::BadStoredBlockLength.into());
    }

    let literal_bytes = bits.read_aligned_bytes(usize::from(len))?;

    for &byte in literal_bytes
    {
        window.push(byte);
    }

    sink.write_all(literal_bytes)
        .map_err(|_| GzipDecodeError::from(GzipErrorKind::Generic("output sink failed")))
}

fn read_u16_le(data: &[u8], pos: usize) -> Result<u16, GzipDecodeError>
{
    let bytes = data
        .get(pos..pos + 2)
        .ok_or_else(|| GzipDecodeError::from(GzipErrorKind::InputTruncated))?;

    Ok(u16::from_le_bytes([bytes[0], bytes[1]]))
}

fn advance(data: &[u8], pos: usize, n: usize) -> Result<usize, GzipDecodeError>
{
    let next = pos.checked_add(n).filter(|&p| p <= data.len());
    next.ok_or_else(|| GzipDecodeError::from(GzipErrorKind::InputTruncated))
}

fn skip_cstring(data: &[u8], pos: usize) -> Result<usize, GzipDecodeError>
{
    let rest = data
        .get(pos..)
        .ok_or_else(|| GzipDecodeError::from(GzipErrorKind::InputTruncated))?;

    let nul = rest
        .iter()
        .position(|&b| b == 0)
        .ok_or_else(|| GzipDecodeError::from(GzipErrorKind::InputTruncated))?;

    Ok(pos + nul + 1)
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn rejects_non_gzip_signature()
    {
        let data = [0_u8; 20];
        let decoder = GzipDecoder::new(&data);
        assert!(decoder.parse_header().is_err());
    }

    #[test]
    fn rejects_unsupported_compression_method()
    {
        let mut data = vec![0_u8; 20];
        data[0] = GZIP_MAGIC[0];
        data[1] = GZIP_MAGIC[1];
        data[2] = 0; // not method 8

        let decoder = GzipDecoder::new(&data);
        assert!(decoder.parse_header().is_err());
    }

    #[test]
    fn minimal_header_with_no_optional_fields_parses_to_offset_ten()
    {
        let mut data = vec![0_u8; 10];
        data[0] = GZIP_MAGIC[0];
        data[1] = GZIP_MAGIC[1];
        data[2] = DEFLATE_METHOD;

        let decoder = GzipDecoder::new(&data);
        assert_eq!(decoder.parse_header().unwrap(), 10);
    }

    #[test]
    fn fname_field_is_skipped_past_its_nul_terminator()
    {
        let mut data = vec![0_u8; 10];
        data[0] = GZIP_MAGIC[0];
        data[1] = GZIP_MAGIC[1];
        data[2] = DEFLATE_METHOD;
        data[3] = flag::FNAME;
        data.extend_from_slice(b"hello.txt\0");
        data.extend_from_slice(&[0xAA, 0xBB]); // stand-in deflate bytes

        let decoder = GzipDecoder::new(&data);
        assert_eq!(decoder.parse_header().unwrap(), 10 + 10);
    }

    #[test]
    fn truncated_header_is_rejected()
    {
        let data = [0x1F, 0x8B, 8, 0, 0];
        let decoder = GzipDecoder::new(&data);
        assert!(decoder.parse_header().is_err());
    }
}
