//! A small, pure Rust gzip/DEFLATE decompressor.
//!
//! ```no_run
//! let compressed = std::fs::read("archive.gz").unwrap();
//! let decompressed = zune_gzip::gunzip_to_vec(&compressed).unwrap();
//! ```

pub use crate::errors::{GzipDecodeError, GzipErrorKind};
pub use crate::gzip::GzipDecoder;

mod bitstream;
mod block;
mod constants;
pub mod errors;
mod gzip;
mod header;
mod huffman;
mod window;

/// Decompress one gzip member, writing output to `sink` as it is produced.
pub fn gunzip<W: std::io::Write>(input: &[u8], sink: &mut W) -> Result<(), GzipDecodeError>
{
    GzipDecoder::new(input).decode_into(sink)
}

/// Decompress one gzip member into a freshly allocated `Vec<u8>`.
///
/// On failure, the returned error's `partial_output` holds whatever bytes
/// were decoded before the failure occurred.
pub fn gunzip_to_vec(input: &[u8]) -> Result<Vec<u8>, GzipDecodeError>
{
    let mut out = Vec::new();

    match gunzip(input, &mut out)
    {
        Ok(()) => Ok(out),
        Err(err) => Err(GzipDecodeError::new(err.kind, out))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn rejects_input_too_short_to_hold_a_header()
    {
        let result = gunzip_to_vec(&[0x1F, 0x8B]);
        assert!(result.is_err());
    }
}
