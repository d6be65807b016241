use std::fmt::{Debug, Formatter};

/// The reason a gzip/DEFLATE decode failed.
///
/// Naming mirrors the taxonomy a malformed-input decoder needs: one
/// variant per place the bitstream can stop making sense, plus a couple
/// of generic escape hatches for messages that don't deserve their own
/// variant.
pub enum GzipErrorKind
{
    /// The first two bytes were not 0x1F 0x8B.
    NotGzip,
    /// The gzip header's compression method byte was not 8 (DEFLATE).
    UnsupportedMethod(u8),
    /// BTYPE was 0b11, which RFC 1951 reserves and never assigns a meaning.
    ReservedBlockType,
    /// A stored (BTYPE=00) block's NLEN field was not the one's complement
    /// of LEN.
    BadStoredBlockLength,
    /// The byte input ended before a read that needed more bytes.
    InputTruncated,
    /// A Huffman walk consumed a bit and landed on a child that doesn't
    /// exist, i.e. the bits read so far are not a valid codeword.
    BadCode,
    /// A code-length symbol 16 ("repeat previous") appeared as the first
    /// symbol of a code-length sequence, so there was no previous entry
    /// to repeat.
    BadRepeat,
    /// A literal/length symbol greater than 285 was decoded.
    BadSymbol,
    /// A distance code greater than 29 was decoded, or a back-reference
    /// distance reached further back than any byte the window has seen.
    BadDistance,
    /// A code-length table is over- or under-complete.
    MalformedCodebook(&'static str),
    /// Anything that doesn't deserve its own variant.
    Generic(&'static str),
    GenericStr(String)
}

impl Debug for GzipErrorKind
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        match self
        {
            Self::NotGzip => write!(f, "not a gzip stream (bad magic bytes)"),
            Self::UnsupportedMethod(m) =>
            {
                write!(f, "unsupported compression method {m}, only 8 (deflate) is known")
            }
            Self::ReservedBlockType => write!(f, "block type 0b11 is reserved"),
            Self::BadStoredBlockLength => write!(f, "stored block LEN/NLEN mismatch"),
            Self::InputTruncated => write!(f, "input truncated before decode completed"),
            Self::BadCode => write!(f, "huffman walk hit a missing edge"),
            Self::BadRepeat => write!(f, "code-length repeat symbol with no previous entry"),
            Self::BadSymbol => write!(f, "literal/length symbol out of range"),
            Self::BadDistance => write!(f, "distance code invalid or reaches before window start"),
            Self::MalformedCodebook(reason) => write!(f, "malformed huffman codebook: {reason}"),
            Self::Generic(reason) => write!(f, "{reason}"),
            Self::GenericStr(reason) => write!(f, "{reason}")
        }
    }
}

/// Error returned when a decode fails.
///
/// `partial_output` holds whatever bytes the caller's sink had already
/// received at the point of failure, when the API in question is able to
/// observe that (see [`crate::gunzip_to_vec`]). Output already written
/// through a caller-supplied sink is the caller's own copy and is never
/// retracted; `partial_output` is just a convenience echo for APIs that
/// own the buffer themselves.
pub struct GzipDecodeError
{
    pub kind:           GzipErrorKind,
    pub partial_output: Vec<u8>
}

impl GzipDecodeError
{
    pub fn new(kind: GzipErrorKind, partial_output: Vec<u8>) -> GzipDecodeError
    {
        GzipDecodeError { kind, partial_output }
    }

    pub fn new_with_error(kind: GzipErrorKind) -> GzipDecodeError
    {
        GzipDecodeError::new(kind, Vec::new())
    }
}

impl Debug for GzipDecodeError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{:?}", self.kind)
    }
}

impl From<GzipErrorKind> for GzipDecodeError
{
    fn from(kind: GzipErrorKind) -> Self
    {
        GzipDecodeError::new_with_error(kind)
    }
}

impl std::fmt::Display for GzipDecodeError
{
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result
    {
        write!(f, "{:?}", self.kind)
    }
}
