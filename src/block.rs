//! The literal/length + LZ77 back-reference decode loop shared by fixed
//! and dynamic blocks (RFC 1951 §3.2.5).

use std::io::Write;

use crate::bitstream::BitReader;
use crate::constants::{DISTANCE_BASE, LENGTH_BASE};
use crate::errors::{GzipDecodeError, GzipErrorKind};
use crate::huffman::Codebook;
use crate::window::SlidingWindow;

const END_OF_BLOCK: u16 = 256;

/// Decode one block's worth of literals and matches, writing decoded
/// bytes to `sink` as they're produced. `distance_book` is `None` for a
/// fixed-codebook block, whose distance codes are five raw bits rather
/// than a Huffman-coded symbol.
pub fn decode_block<W: Write>(
    bits: &mut BitReader, litlen_book: &Codebook, distance_book: Option<&Codebook>,
    window: &mut SlidingWindow, sink: &mut W
) -> Result<(), GzipDecodeError>
{
    loop
    {
        let symbol = litlen_book.decode(bits)?;

        if symbol < 256
        {
            let byte = symbol as u8;
            window.push(byte);
            write_all(sink, &[byte])?;
        }
        else if symbol == END_OF_BLOCK
        {
            return Ok(());
        }
        else if symbol <= 285
        {
            let length = decode_length(symbol, bits)?;

            let distance_code = match distance_book
            {
                Some(book) => book.decode(bits)?,
                None => bits.read_bits(5)? as u16
            };

            if distance_code > 29
            {
                return Err(GzipErrorKind::BadDistance.into());
            }

            let distance = decode_distance(distance_code, bits)?;

            let copied = window.copy_back(length, distance)?;
            write_all(sink, &copied)?;
        }
        else
        {
            return Err(GzipErrorKind::BadSymbol.into());
        }
    }
}

fn write_all<W: Write>(sink: &mut W, bytes: &[u8]) -> Result<(), GzipDecodeError>
{
    sink.write_all(bytes)
        .map_err(|_| GzipErrorKind::Generic("output sink failed").into())
}

/// Length symbols 257..285 (RFC 1951 §3.2.5 table).
fn decode_length(symbol: u16, bits: &mut BitReader) -> Result<usize, GzipDecodeError>
{
    match symbol
    {
        257..=264 => Ok(usize::from(symbol) - 254),
        265..=284 =>
        {
            let extra_bits = (u32::from(symbol) - 261) / 4;
            let base = usize::from(LENGTH_BASE[usize::from(symbol) - 265]);
            Ok(base + bits.read_bits(extra_bits)? as usize)
        }
        285 => Ok(258),
        _ => unreachable!("caller only dispatches length symbols 257..=285")
    }
}

/// Distance codes 0..29 (RFC 1951 §3.2.5 table).
fn decode_distance(dc: u16, bits: &mut BitReader) -> Result<usize, GzipDecodeError>
{
    let distance = match dc
    {
        0..=3 => usize::from(dc),
        4..=29 =>
        {
            let extra_bits = (u32::from(dc) - 2) / 2;
            let base = usize::from(DISTANCE_BASE[usize::from(dc) - 4]);
            base + bits.read_bits(extra_bits)? as usize
        }
        _ => unreachable!("caller rejects distance codes > 29 first")
    };

    Ok(distance + 1)
}
