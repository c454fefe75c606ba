//! Report Descriptor Item Tokenization
//!
//! Tokenizes a report descriptor byte slice into typed item structures as described in HID spec
//! 1.1 sections 6.2.2.1 through 6.2.2.3. Items are the exchange format between the binary
//! tokenizer, the human-descriptor compiler and the descriptor builder: both front ends produce
//! the same `Item` sequence for equivalent input.
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::error::HidError;
use crate::utils::{i32_from_bytes, u32_from_bytes};
use alloc::vec::Vec;

/// Item kind encoded in bits 2-3 of a short item header. See HID spec 1.1 section 6.2.2.2.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
  Main,
  Global,
  Local,
}

/// Tag of a short descriptor item. Tag values are only meaningful together with the item kind;
/// this enum flattens the (kind, tag) pairs of HID spec 1.1 sections 6.2.2.4 through 6.2.2.8.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemTag {
  // main items
  Input,
  Output,
  Feature,
  Collection,
  EndCollection,
  // global items
  UsagePage,
  LogicalMinimum,
  LogicalMaximum,
  PhysicalMinimum,
  PhysicalMaximum,
  UnitExponent,
  Unit,
  ReportSize,
  ReportId,
  ReportCount,
  Push,
  Pop,
  // local items
  Usage,
  UsageMinimum,
  UsageMaximum,
  DesignatorIndex,
  DesignatorMinimum,
  DesignatorMaximum,
  StringIndex,
  StringMinimum,
  StringMaximum,
  Delimiter,
}

impl ItemTag {
  /// Resolves a (kind bits, tag nibble) header pair. Returns `None` for reserved combinations.
  pub fn from_parts(kind: u8, tag: u8) -> Option<ItemTag> {
    use ItemTag::*;
    let resolved = match (kind, tag) {
      (0, 0x8) => Input,
      (0, 0x9) => Output,
      (0, 0xa) => Collection,
      (0, 0xb) => Feature,
      (0, 0xc) => EndCollection,
      (1, 0x0) => UsagePage,
      (1, 0x1) => LogicalMinimum,
      (1, 0x2) => LogicalMaximum,
      (1, 0x3) => PhysicalMinimum,
      (1, 0x4) => PhysicalMaximum,
      (1, 0x5) => UnitExponent,
      (1, 0x6) => Unit,
      (1, 0x7) => ReportSize,
      (1, 0x8) => ReportId,
      (1, 0x9) => ReportCount,
      (1, 0xa) => Push,
      (1, 0xb) => Pop,
      (2, 0x0) => Usage,
      (2, 0x1) => UsageMinimum,
      (2, 0x2) => UsageMaximum,
      (2, 0x3) => DesignatorIndex,
      (2, 0x4) => DesignatorMinimum,
      (2, 0x5) => DesignatorMaximum,
      (2, 0x7) => StringIndex,
      (2, 0x8) => StringMinimum,
      (2, 0x9) => StringMaximum,
      (2, 0xa) => Delimiter,
      _ => return None,
    };
    Some(resolved)
  }

  pub fn kind(&self) -> ItemKind {
    use ItemTag::*;
    match self {
      Input | Output | Feature | Collection | EndCollection => ItemKind::Main,
      UsagePage | LogicalMinimum | LogicalMaximum | PhysicalMinimum | PhysicalMaximum | UnitExponent | Unit
      | ReportSize | ReportId | ReportCount | Push | Pop => ItemKind::Global,
      _ => ItemKind::Local,
    }
  }

  /// The tag nibble (bits 4-7 of the item header).
  pub fn tag_nibble(&self) -> u8 {
    use ItemTag::*;
    match self {
      Input => 0x8,
      Output => 0x9,
      Collection => 0xa,
      Feature => 0xb,
      EndCollection => 0xc,
      UsagePage | Usage => 0x0,
      LogicalMinimum | UsageMinimum => 0x1,
      LogicalMaximum | UsageMaximum => 0x2,
      PhysicalMinimum | DesignatorIndex => 0x3,
      PhysicalMaximum | DesignatorMinimum => 0x4,
      UnitExponent | DesignatorMaximum => 0x5,
      Unit => 0x6,
      ReportSize | StringIndex => 0x7,
      ReportId | StringMinimum => 0x8,
      ReportCount | StringMaximum => 0x9,
      Push | Delimiter => 0xa,
      Pop => 0xb,
    }
  }
}

/// One short descriptor item with its raw little-endian payload (0, 1, 2 or 4 bytes).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
  pub tag: ItemTag,
  pub data: Vec<u8>,
}

impl Item {
  pub fn new(tag: ItemTag, data: Vec<u8>) -> Self {
    Item { tag, data }
  }

  /// Payload zero-extended to 32 bits.
  pub fn value_u32(&self) -> u32 {
    u32_from_bytes(&self.data)
  }

  /// Payload sign-extended to 32 bits.
  pub fn value_i32(&self) -> i32 {
    i32_from_bytes(&self.data)
  }

  /// Renders the item back to its wire bytes: header byte followed by the payload.
  pub fn encode(&self) -> Vec<u8> {
    let size_class: u8 = match self.data.len() {
      0 => 0,
      1 => 1,
      2 => 2,
      _ => 3, //4-byte payload
    };
    let kind_bits: u8 = match self.tag.kind() {
      ItemKind::Main => 0,
      ItemKind::Global => 1,
      ItemKind::Local => 2,
    };
    let header = (self.tag.tag_nibble() << 4) | (kind_bits << 2) | size_class;
    let mut bytes = Vec::with_capacity(1 + self.data.len());
    bytes.push(header);
    bytes.extend_from_slice(&self.data);
    bytes
  }
}

/// Iterator over a descriptor byte slice yielding one [`Item`] per short item. Yields an error
/// and stops on truncated items, reserved headers and the long-item escape (0xFE).
pub struct ItemTokenizer<'a> {
  descriptor: &'a [u8],
  position: usize,
}

impl<'a> ItemTokenizer<'a> {
  pub fn new(descriptor: &'a [u8]) -> Self {
    ItemTokenizer { descriptor, position: 0 }
  }

  fn fail(&mut self, offset: usize, reason: &'static str) -> Option<Result<Item, HidError>> {
    //fuse the iterator so a failed parse yields exactly one error.
    self.position = self.descriptor.len();
    Some(Err(HidError::MalformedDescriptor { offset, reason }))
  }
}

impl<'a> Iterator for ItemTokenizer<'a> {
  type Item = Result<Item, HidError>;
  fn next(&mut self) -> Option<Self::Item> {
    let offset = self.position;
    let header = *self.descriptor.get(self.position)?;
    self.position += 1;

    if header == 0xFE {
      return self.fail(offset, "long items are not supported");
    }

    let size = match header & 0x3 {
      //short item size of 4 bytes is encoded as "3"
      3 => 4,
      size => size as usize,
    };

    let tag = match ItemTag::from_parts((header & 0xC) >> 2, (header & 0xF0) >> 4) {
      Some(tag) => tag,
      None => return self.fail(offset, "reserved item tag"),
    };

    let data = match self.descriptor.get(self.position..self.position + size) {
      Some(data) => data,
      None => return self.fail(offset, "item payload overruns descriptor"),
    };
    self.position += size;

    Some(Ok(Item { tag, data: data.to_vec() }))
  }
}

/// Tokenizes a full descriptor into an item list.
pub fn tokenize(descriptor: &[u8]) -> Result<Vec<Item>, HidError> {
  ItemTokenizer::new(descriptor).collect()
}

/// Parses a string of whitespace-separated hex byte pairs ("05 01 09 04 ...") into raw bytes.
/// Commas between pairs are tolerated.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, HidError> {
  let mut bytes = Vec::new();
  for (index, token) in text.split_whitespace().enumerate() {
    let token = token.trim_matches(',');
    if token.is_empty() {
      continue;
    }
    let token = token.strip_prefix("0x").unwrap_or(token);
    if token.len() > 2 {
      return Err(HidError::MalformedDescriptor { offset: index, reason: "hex token longer than one byte" });
    }
    match u8::from_str_radix(token, 16) {
      Ok(byte) => bytes.push(byte),
      Err(_) => return Err(HidError::MalformedDescriptor { offset: index, reason: "invalid hex byte" }),
    }
  }
  Ok(bytes)
}
