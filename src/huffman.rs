//! Canonical Huffman codebook construction and decoding.
//!
//! A codebook is a binary trie stored as a flat arena: each node holds
//! indices of its two children instead of pointers, so the whole
//! structure is a couple of owned `Vec`s dropped together when the
//! codebook goes out of scope (see the "Ownership of codebooks" design
//! note: arenas are the natural replacement for the pointer nodes the
//! reference implementation uses).

use crate::bitstream::BitReader;
use crate::errors::{GzipDecodeError, GzipErrorKind};

const MAX_BITS: usize = 15;

#[derive(Clone, Copy)]
struct Node
{
    zero:   Option<u32>,
    one:    Option<u32>,
    symbol: Option<u16>
}

impl Node
{
    const EMPTY: Node = Node { zero: None, one: None, symbol: None };
}

/// A canonical Huffman decoding structure for one alphabet.
pub struct Codebook
{
    nodes: Vec<Node>
}

impl Codebook
{
    /// Build a codebook from a per-symbol code-length vector, following
    /// the canonical-code construction of RFC 1951 §3.2.2:
    ///
    /// 1. count codewords per length
    /// 2. derive the first codeword of each length from the previous
    ///    length's first codeword and count
    /// 3. assign consecutive codewords, in ascending symbol order, to
    ///    symbols sharing a length
    ///
    /// `allow_empty` controls whether a length vector with no nonzero
    /// entries is accepted (true for the distance alphabet, which may
    /// legitimately be unused in a block with no matches; false for the
    /// literal/length and code-length alphabets, which must always be
    /// able to decode at least an end-of-block or repeat symbol).
    pub fn build(lengths: &[u8], allow_empty: bool) -> Result<Codebook, GzipDecodeError>
    {
        let mut bl_count = [0_u32; MAX_BITS + 1];

        for &len in lengths
        {
            if usize::from(len) > MAX_BITS
            {
                return Err(GzipErrorKind::MalformedCodebook("codeword length exceeds 15 bits").into());
            }
            bl_count[usize::from(len)] += 1;
        }

        let num_used: u32 = bl_count[1..].iter().sum();

        if num_used == 0
        {
            return if allow_empty
            {
                Ok(Codebook { nodes: vec![Node::EMPTY] })
            }
            else
            {
                Err(GzipErrorKind::MalformedCodebook("codebook has no codewords").into())
            };
        }

        // RFC 1951 explicitly tolerates a single used symbol even though
        // that leaves half the codespace unreachable; assign it codeword
        // "0" of length 1 and skip the completeness check below, since a
        // real completeness check would (correctly) reject it.
        if num_used == 1
        {
            let symbol = lengths
                .iter()
                .position(|&len| len != 0)
                .expect("num_used == 1 implies exactly one nonzero length") as u16;

            let mut book = Codebook { nodes: vec![Node::EMPTY] };
            book.insert(0, 1, symbol)?;
            return Ok(book);
        }

        // Completeness check: a length-`len` codeword uses `1/2^len` of
        // the codespace; the lengths are valid only if they use exactly
        // all of it.
        let max_len = bl_count.iter().rposition(|&c| c > 0).unwrap_or(0);
        let mut codespace_used = 0_u32;

        for len in 1..=max_len
        {
            codespace_used = (codespace_used << 1) + bl_count[len];
        }

        if codespace_used > (1 << max_len)
        {
            return Err(GzipErrorKind::MalformedCodebook("codewords overflow the codespace").into());
        }
        if codespace_used < (1 << max_len)
        {
            return Err(GzipErrorKind::MalformedCodebook("codewords don't fill the codespace").into());
        }

        // next_code[1] = 0; next_code[len] = (next_code[len-1] + bl_count[len-1]) << 1
        let mut next_code = [0_u32; MAX_BITS + 2];
        for len in 1..=MAX_BITS
        {
            next_code[len + 1] = (next_code[len] + bl_count[len]) << 1;
        }

        let mut book = Codebook { nodes: vec![Node::EMPTY] };

        for (symbol, &len) in lengths.iter().enumerate()
        {
            if len == 0
            {
                continue;
            }

            let len = usize::from(len);
            let code = next_code[len];
            next_code[len] += 1;

            book.insert(code, len, symbol as u16)?;
        }

        Ok(book)
    }

    /// Insert one (code, length, symbol) triple. `code`'s bits are
    /// transmitted MSB first: bit `length - 1` is the root-edge decision.
    fn insert(&mut self, code: u32, length: usize, symbol: u16) -> Result<(), GzipDecodeError>
    {
        let mut node_idx = 0_u32;

        for i in (0..length).rev()
        {
            let bit = (code >> i) & 1;

            let child = if bit == 1
            {
                &mut self.nodes[node_idx as usize].one
            }
            else
            {
                &mut self.nodes[node_idx as usize].zero
            };

            node_idx = match *child
            {
                Some(idx) => idx,
                None =>
                {
                    let idx = self.nodes.len() as u32;
                    self.nodes.push(Node::EMPTY);
                    *child = Some(idx);
                    idx
                }
            };
        }

        if self.nodes[node_idx as usize].symbol.is_some()
        {
            return Err(GzipErrorKind::MalformedCodebook("duplicate codeword assigned").into());
        }

        self.nodes[node_idx as usize].symbol = Some(symbol);

        Ok(())
    }

    /// Decode one symbol, consuming one bit per trie edge until a leaf
    /// is reached.
    pub fn decode(&self, bits: &mut BitReader) -> Result<u16, GzipDecodeError>
    {
        let mut node_idx = 0_u32;

        loop
        {
            let node = self.nodes[node_idx as usize];

            if let Some(symbol) = node.symbol
            {
                return Ok(symbol);
            }

            let bit = bits.next_bit()?;

            let next = if bit == 1 { node.one } else { node.zero };

            node_idx = next.ok_or_else(|| GzipDecodeError::from(GzipErrorKind::BadCode))?;
        }
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    /// Build a codeword MSB-first from its bits, for use as test input
    /// to a `BitReader` (which itself reads LSB-first per byte — we
    /// build a tiny byte-packer here matching the canonical code's bit
    /// order convention: bit `length-1` is read first).
    fn pack_msb_first(codes: &[(u32, usize)]) -> Vec<u8>
    {
        let mut bits = Vec::new();
        for &(code, len) in codes
        {
            for i in (0..len).rev()
            {
                bits.push(((code >> i) & 1) as u8);
            }
        }

        let mut bytes = vec![0_u8; (bits.len() + 7) / 8];
        for (i, bit) in bits.iter().enumerate()
        {
            bytes[i / 8] |= bit << (i % 8);
        }
        bytes
    }

    #[test]
    fn empty_codebook_is_empty_or_rejected()
    {
        let lens = [0_u8; 8];
        assert!(Codebook::build(&lens, false).is_err());
        assert!(Codebook::build(&lens, true).is_ok());
    }

    #[test]
    fn empty_codebook_decode_fails()
    {
        let lens = [0_u8; 8];
        let book = Codebook::build(&lens, true).unwrap();
        let data = [0_u8; 4];
        let mut bits = BitReader::new(&data);
        assert!(book.decode(&mut bits).is_err());
    }

    #[test]
    fn canonical_codes_match_worked_example()
    {
        // RFC 1951 §3.2.2 worked example: symbols A-H with lengths
        // 3,3,3,3,3,2,4,4 -> codes 010,011,100,101,110,00,1110,1111
        let lens = [3_u8, 3, 3, 3, 3, 2, 4, 4];
        let book = Codebook::build(&lens, false).unwrap();

        let expected_codes: [(u32, usize); 8] = [
            (0b010, 3),
            (0b011, 3),
            (0b100, 3),
            (0b101, 3),
            (0b110, 3),
            (0b00, 2),
            (0b1110, 4),
            (0b1111, 4)
        ];

        for (symbol, &code) in expected_codes.iter().enumerate()
        {
            let packed = pack_msb_first(&[code]);
            let mut bits = BitReader::new(&packed);
            assert_eq!(book.decode(&mut bits).unwrap(), symbol as u16);
        }
    }

    #[test]
    fn round_trips_a_sequence_of_symbols()
    {
        let lens = [3_u8, 3, 3, 3, 3, 2, 4, 4];
        let book = Codebook::build(&lens, false).unwrap();

        let codes = [(0b00, 2), (0b1111, 4), (0b010, 3), (0b1110, 4), (0b00, 2)];
        let symbols_expected = [5_u16, 7, 0, 6, 5];

        let packed = pack_msb_first(&codes);
        let mut bits = BitReader::new(&packed);

        for expected in symbols_expected
        {
            assert_eq!(book.decode(&mut bits).unwrap(), expected);
        }
    }

    #[test]
    fn single_symbol_codebook_decodes_its_one_symbol()
    {
        let mut lens = [0_u8; 30];
        lens[5] = 1;

        let book = Codebook::build(&lens, true).unwrap();
        let packed = pack_msb_first(&[(0, 1)]);
        let mut bits = BitReader::new(&packed);

        assert_eq!(book.decode(&mut bits).unwrap(), 5);
    }

    #[test]
    fn incomplete_multi_symbol_code_is_rejected()
    {
        // two symbols of length 2 only use half the codespace for a
        // length-2 code (needs 4 codewords total) - incomplete.
        let lens = [2_u8, 2, 0, 0];
        assert!(Codebook::build(&lens, false).is_err());
    }

    #[test]
    fn overfull_code_is_rejected()
    {
        // five symbols of length 2 cannot fit in a 2-bit codespace (max 4).
        let lens = [2_u8, 2, 2, 2, 2];
        assert!(Codebook::build(&lens, false).is_err());
    }
}
