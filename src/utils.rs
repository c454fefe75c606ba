//! Byte Conversion Utilities
//!
//! Conversions from variable-length little-endian item payloads (0 to 4 bytes) into fixed-width
//! integers. Empty payloads convert to zero.
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
pub fn u16_from_bytes(bytes: &[u8]) -> u16 {
  //payloads longer than the target width truncate to the low bytes
  let take = bytes.len().min(2);
  let mut le_bytes = [0u8; 2];
  le_bytes[..take].copy_from_slice(&bytes[..take]);
  u16::from_le_bytes(le_bytes)
}

pub fn u32_from_bytes(bytes: &[u8]) -> u32 {
  let mut le_bytes = [0u8; 4];
  le_bytes[..bytes.len()].copy_from_slice(bytes);
  u32::from_le_bytes(le_bytes)
}

pub fn i32_from_bytes(bytes: &[u8]) -> i32 {
  let mut le_bytes = [0u8; 4];
  match bytes.last() {
    None => return 0,
    Some(msb) => {
      if msb & 0x80 != 0 {
        //negative: sign-extend into the unset upper bytes.
        le_bytes.fill(0xff);
      }
    }
  }
  le_bytes[..bytes.len()].copy_from_slice(bytes);
  i32::from_le_bytes(le_bytes)
}

#[cfg(test)]
mod tests {
  use super::{i32_from_bytes, u16_from_bytes, u32_from_bytes};

  #[test]
  fn conversions_should_zero_extend_and_sign_extend() {
    assert_eq!(u16_from_bytes(&[]), 0);
    assert_eq!(u16_from_bytes(&[0x7f]), 0x7f);
    assert_eq!(u16_from_bytes(&[0x34, 0x12]), 0x1234);
    assert_eq!(u16_from_bytes(&[0x34, 0x12, 0x00, 0x00]), 0x1234);

    assert_eq!(u32_from_bytes(&[0xff]), 255);
    assert_eq!(u32_from_bytes(&[0xfe, 0xff, 0x00, 0x00]), 65534);

    assert_eq!(i32_from_bytes(&[]), 0);
    assert_eq!(i32_from_bytes(&[0x81]), -127);
    assert_eq!(i32_from_bytes(&[0xff, 0xff]), -1);
    assert_eq!(i32_from_bytes(&[0xf0, 0xd8]), -10000);
    assert_eq!(i32_from_bytes(&[0x7f]), 127);
  }
}
