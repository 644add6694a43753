//! 16 bit additive checksum used for frames and track data.
//!
//! The sum wraps at 16 bits, there is no end-around carry.

/// Sum of all bytes modulo 2^16
pub fn checksum(dat: &[u8]) -> u16 {
    dat.iter().fold(0u16,|acc,b| acc.wrapping_add(*b as u16))
}

/// Append the little endian checksum of `buf` to `buf`.
pub fn append_checksum(buf: &mut Vec<u8>) {
    let sum = checksum(buf);
    buf.extend_from_slice(&sum.to_le_bytes());
}

/// Split a block into payload and its trailing little endian checksum word.
/// Returns `None` if the block cannot even hold the checksum.
pub fn split_checksum(block: &[u8]) -> Option<(&[u8],u16)> {
    if block.len() < 2 {
        return None;
    }
    let (payload,tail) = block.split_at(block.len()-2);
    Some((payload,u16::from_le_bytes([tail[0],tail[1]])))
}
