//! Pre-Authentication Encoding (PAE)
//!
//! PAE frames a list of byte strings into a single buffer so that no two
//! distinct lists share an encoding. Both the issuer and the verifier sign or
//! check `PAE([header, payload, footer, implicit_assertion])`, never the raw
//! concatenation of those fields.

/// Encode a 64-bit unsigned integer as little-endian bytes
///
/// # Example
/// ```
/// use paseto_v4::pae::le64_encode;
///
/// let encoded = le64_encode(42);
/// assert_eq!(encoded, [42, 0, 0, 0, 0, 0, 0, 0]);
/// ```
pub fn le64_encode(n: u64) -> [u8; 8] {
    n.to_le_bytes()
}

/// Pre-Authentication Encoding
///
/// `PAE(pieces) = le64(pieces.len()) || le64(pieces[0].len()) || pieces[0] || ...`
///
/// The explicit lengths stop bytes from being shifted between neighbouring
/// pieces: `["ab", "cd"]` and `["a", "bcd"]` encode differently.
///
/// # Example
/// ```
/// use paseto_v4::pae::pae_encode;
///
/// let result = pae_encode(&[b"hello", b"world"]);
/// assert_eq!(result.len(), 8 + (8 + 5) + (8 + 5));
/// ```
pub fn pae_encode(pieces: &[&[u8]]) -> Vec<u8> {
    let total_size = 8 + pieces.iter().map(|piece| 8 + piece.len()).sum::<usize>();
    let mut result = Vec::with_capacity(total_size);

    result.extend_from_slice(&le64_encode(pieces.len() as u64));

    for piece in pieces {
        result.extend_from_slice(&le64_encode(piece.len() as u64));
        result.extend_from_slice(piece);
    }

    result
}

/// The message signed for a v4.public token:
/// `PAE([header, payload, footer, implicit_assertion])`
///
/// An absent footer or assertion is passed as an empty slice; it still
/// occupies its position in the list.
pub fn pae_encode_public_token(
    header: &[u8],
    payload: &[u8],
    footer: &[u8],
    implicit_assertion: &[u8],
) -> Vec<u8> {
    pae_encode(&[header, payload, footer, implicit_assertion])
}
