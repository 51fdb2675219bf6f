use byteorder::{
    ByteOrder,
    NetworkEndian,
};

/// Sums a buffer as 16 bit network order words with end around carry.
///
/// An odd trailing byte is padded with a zero byte on the right.
pub fn ones_complement_sum(buffer: &[u8]) -> u16 {
    let mut acc = buffer
        .chunks(2)
        .map(|word| match word.len() {
            2 => NetworkEndian::read_u16(word) as u32,
            _ => (word[0] as u32) << 8,
        })
        .fold(0 as u32, |acc, word| acc + word);

    while acc > 0xFFFF {
        acc = (acc & 0xFFFF) + (acc >> 16);
    }

    acc as u16
}

/// Calculates the Internet Checksum from [RFC1071](https://tools.ietf.org/html/rfc1071).
///
/// The checksum field should be zeroed before calling this. Running it over a
/// buffer which already contains a valid checksum yields 0.
///
/// See [IPv4 header checksum](https://en.wikipedia.org/wiki/IPv4_header_checksum) for an example.
pub fn internet_checksum(buffer: &[u8]) -> u16 {
    !ones_complement_sum(buffer)
}
