use byteorder::{BigEndian, ByteOrder};

/// Internet checksum (RFC 1071) over an even-length buffer.
///
/// Words are summed big-endian and the result is meant to be stored
/// big-endian; the one's-complement sum is byte-order independent, so the
/// bytes on the wire match a native-order computation.
pub fn checksum(data: &[u8]) -> u16 {
    assert!(data.len() % 2 == 0, "checksum requires an even-length buffer");

    let mut sum: u32 = data
        .chunks_exact(2)
        .map(|word| u32::from(BigEndian::read_u16(word)))
        .sum();

    sum = (sum >> 16) + (sum & 0xffff);
    sum += sum >> 16;
    !(sum as u16)
}
