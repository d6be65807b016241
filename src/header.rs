//! Dynamic Huffman header decoding (RFC 1951 §3.2.7).
//!
//! Called once per dynamic (BTYPE=10) block, after BFINAL/BTYPE have
//! already been consumed. Builds the code-length codebook, uses it to
//! decode a combined length vector, then splits that vector into the
//! literal/length and distance codebooks for the block.

use crate::bitstream::BitReader;
use crate::constants::{NUM_PRECODE_SYMS, PRECODE_LENS_PERMUTATION};
use crate::errors::{GzipDecodeError, GzipErrorKind};
use crate::huffman::Codebook;

pub struct DynamicCodebooks
{
    pub litlen:   Codebook,
    pub distance: Codebook
}

pub fn decode_dynamic_header(bits: &mut BitReader) -> Result<DynamicCodebooks, GzipDecodeError>
{
    let hlit = bits.read_bits(5)? as usize;
    let hdist = bits.read_bits(5)? as usize;
    let hclen = bits.read_bits(4)? as usize;

    let num_litlen_syms = hlit + 257;
    let num_distance_syms = hdist + 1;
    let num_precode_lens = hclen + 4;

    let mut precode_lengths = [0_u8; NUM_PRECODE_SYMS];

    for &position in PRECODE_LENS_PERMUTATION.iter().take(num_precode_lens)
    {
        precode_lengths[usize::from(position)] = bits.read_bits(3)? as u8;
    }

    let precode_book = Codebook::build(&precode_lengths, false)?;

    let total_lens = num_litlen_syms + num_distance_syms;
    let lens = decode_combined_lengths(bits, &precode_book, total_lens)?;

    let (litlen_lengths, distance_lengths) = lens.split_at(num_litlen_syms);

    let litlen = Codebook::build(litlen_lengths, false)?;
    let distance = Codebook::build(distance_lengths, true)?;

    Ok(DynamicCodebooks { litlen, distance })
}

/// Decode `total_lens` code-length-alphabet symbols into a combined
/// literal/length + distance length vector (RFC 1951 §3.2.7 step 2).
///
/// Symbols 0..15 are explicit lengths; 16 repeats the previous entry,
/// 17 and 18 emit runs of zero. A run may overshoot `total_lens` by a
/// few entries (16/17/18's repeat counts aren't known until their extra
/// bits are read); the overshoot is truncated away afterward, matching
/// how a conforming encoder never actually relies on it but a decoder
/// must tolerate the lookahead.
fn decode_combined_lengths(
    bits: &mut BitReader, precode_book: &Codebook, total_lens: usize
) -> Result<Vec<u8>, GzipDecodeError>
{
    let mut lens: Vec<u8> = Vec::with_capacity(total_lens);

    while lens.len() < total_lens
    {
        let symbol = precode_book.decode(bits)?;

        match symbol
        {
            0..=15 => lens.push(symbol as u8),
            16 =>
            {
                let &previous = lens
                    .last()
                    .ok_or_else(|| GzipDecodeError::from(GzipErrorKind::BadRepeat))?;
                let repeat = 3 + bits.read_bits(2)?;

                lens.extend(std::iter::repeat(previous).take(repeat as usize));
            }
            17 =>
            {
                let repeat = 3 + bits.read_bits(3)?;
                lens.extend(std::iter::repeat(0).take(repeat as usize));
            }
            18 =>
            {
                let repeat = 11 + bits.read_bits(7)?;
                lens.extend(std::iter::repeat(0).take(repeat as usize));
            }
            _ => return Err(GzipErrorKind::Generic("code-length symbol out of range").into())
        }
    }

    lens.truncate(total_lens);

    Ok(lens)
}
