use std::mem;

const WORD: usize = mem::size_of::<usize>();

/// Alignment every block header is placed at.
pub const HEADER_ALIGN: usize = mem::align_of::<usize>();

/// Bytes a block header occupies in the region: one machine word for the
/// payload length and one flag byte, padded to a whole number of words.
pub const HEADER_SIZE: usize = crate::align!(WORD + 1);

/// Metadata written in front of every payload by the tagged and recycling
/// strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockHeader {
  /// Payload bytes governed by this header, including any alignment slack.
  pub size: usize,
  pub is_free: bool,
}

impl BlockHeader {
  pub fn new(
    size: usize,
    is_free: bool,
  ) -> Self {
    Self { size, is_free }
  }

  /// Decodes a header from the start of `bytes`.
  pub(crate) fn decode(bytes: &[u8]) -> Option<Self> {
    let bytes = bytes.get(..HEADER_SIZE)?;
    let (size, flags) = bytes.split_at(WORD);

    Some(Self {
      size: usize::from_ne_bytes(size.try_into().ok()?),
      is_free: flags[0] != 0,
    })
  }

  /// Encodes the header into the start of `bytes`, zeroing the padding.
  pub(crate) fn encode(
    &self,
    bytes: &mut [u8],
  ) -> Option<()> {
    let bytes = bytes.get_mut(..HEADER_SIZE)?;
    let (size, flags) = bytes.split_at_mut(WORD);

    size.copy_from_slice(&self.size.to_ne_bytes());
    flags.fill(0);
    flags[0] = u8::from(self.is_free);

    Some(())
  }

  /// Flips only the free flag of an encoded header.
  pub(crate) fn set_free(
    bytes: &mut [u8],
    is_free: bool,
  ) -> Option<()> {
    *bytes.get_mut(WORD)? = u8::from(is_free);
    Some(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_header_layout() {
    assert_eq!(HEADER_SIZE, 2 * WORD);
    assert_eq!(HEADER_SIZE % HEADER_ALIGN, 0);
  }

  #[test]
  fn test_encode_decode() {
    let mut bytes = [0xAAu8; HEADER_SIZE + 4];

    BlockHeader::new(1234, false).encode(&mut bytes).unwrap();

    assert_eq!(BlockHeader::decode(&bytes), Some(BlockHeader::new(1234, false)));
    assert!(bytes[WORD + 1..HEADER_SIZE].iter().all(|&b| b == 0));
    assert_eq!(bytes[HEADER_SIZE..], [0xAA; 4]);
  }

  #[test]
  fn test_set_free_keeps_size() {
    let mut bytes = [0u8; HEADER_SIZE];
    BlockHeader::new(8, false).encode(&mut bytes).unwrap();

    BlockHeader::set_free(&mut bytes, true).unwrap();

    assert_eq!(BlockHeader::decode(&bytes), Some(BlockHeader::new(8, true)));
  }

  #[test]
  fn test_short_buffer() {
    let mut bytes = [0u8; HEADER_SIZE - 1];

    assert_eq!(BlockHeader::decode(&bytes), None);
    assert_eq!(BlockHeader::new(1, true).encode(&mut bytes), None);
  }
}
