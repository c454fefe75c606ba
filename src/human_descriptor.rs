//! Human-Readable Descriptor Compilation
//!
//! Compiles the mnemonic descriptor syntax (a whitespace-separated stream of `Name (argument)`
//! entries plus the bare `End Collection`/`Push`/`Pop`, with or without line breaks) into the
//! same item sequence the binary tokenizer produces for the equivalent bytes. Arguments are
//! numbers or names resolved through the usage tables;
//! usage names are interpreted against the usage page currently in effect. Numeric payloads are
//! emitted with the minimal size class, signed tags in two's complement.
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::error::HidError;
use crate::item_tokenizer::{Item, ItemTag};
use crate::usage_tables;
use alloc::string::ToString;
use alloc::vec;
use alloc::vec::Vec;

static ENTRY_NAMES: &[(&str, ItemTag)] = &[
  ("Input", ItemTag::Input),
  ("Output", ItemTag::Output),
  ("Feature", ItemTag::Feature),
  ("Collection", ItemTag::Collection),
  ("End Collection", ItemTag::EndCollection),
  ("Usage Page", ItemTag::UsagePage),
  ("Logical Minimum", ItemTag::LogicalMinimum),
  ("Logical Maximum", ItemTag::LogicalMaximum),
  ("Physical Minimum", ItemTag::PhysicalMinimum),
  ("Physical Maximum", ItemTag::PhysicalMaximum),
  ("Unit Exponent", ItemTag::UnitExponent),
  ("Unit", ItemTag::Unit),
  ("Report Size", ItemTag::ReportSize),
  ("Report ID", ItemTag::ReportId),
  ("Report Count", ItemTag::ReportCount),
  ("Push", ItemTag::Push),
  ("Pop", ItemTag::Pop),
  ("Usage", ItemTag::Usage),
  ("Usage Minimum", ItemTag::UsageMinimum),
  ("Usage Maximum", ItemTag::UsageMaximum),
];

/// Entries that carry no argument and so appear without parentheses.
static BARE_ENTRIES: &[(&str, ItemTag)] =
  &[("End Collection", ItemTag::EndCollection), ("Push", ItemTag::Push), ("Pop", ItemTag::Pop)];

fn entry_tag(name: &str) -> Option<ItemTag> {
  ENTRY_NAMES.iter().find(|(candidate, _)| candidate.eq_ignore_ascii_case(name)).map(|(_, tag)| *tag)
}

/// Minimal little-endian encoding of an unsigned payload. Zero still takes one byte, matching how
/// real descriptors are written.
fn encode_unsigned(value: u32) -> Vec<u8> {
  if value <= 0xFF {
    vec![value as u8]
  } else if value <= 0xFFFF {
    (value as u16).to_le_bytes().to_vec()
  } else {
    value.to_le_bytes().to_vec()
  }
}

/// Minimal little-endian two's-complement encoding of a signed payload.
fn encode_signed(value: i32) -> Vec<u8> {
  if (-128..=127).contains(&value) {
    vec![value as i8 as u8]
  } else if (-32768..=32767).contains(&value) {
    (value as i16).to_le_bytes().to_vec()
  } else {
    value.to_le_bytes().to_vec()
  }
}

fn parse_number(text: &str) -> Option<i64> {
  let text = text.trim();
  if let Some(hex) = text.strip_prefix("0x").or_else(|| text.strip_prefix("0X")) {
    return i64::from_str_radix(hex, 16).ok();
  }
  if let Some(hex) = text.strip_prefix("-0x") {
    return i64::from_str_radix(hex, 16).ok().map(|value| -value);
  }
  text.parse().ok()
}

/// Compiles mnemonic descriptor text into an item stream.
pub fn compile_human(text: &str) -> Result<Vec<Item>, HidError> {
  let mut items = Vec::new();
  let mut current_page: u16 = 0;

  for (line_number, line) in text.lines().enumerate() {
    //strip hid-recorder style indentation dots and comments
    let mut rest = line.trim().trim_start_matches('.').trim_start();
    if rest.starts_with('#') {
      continue;
    }

    while !rest.is_empty() {
      if rest.starts_with('#') {
        break;
      }
      if let Some((after, tag)) = BARE_ENTRIES.iter().find_map(|(keyword, tag)| {
        let after = rest.strip_prefix(keyword)?;
        if after.is_empty() || after.starts_with(char::is_whitespace) {
          Some((after, *tag))
        } else {
          None
        }
      }) {
        items.push(Item::new(tag, Vec::new()));
        rest = after.trim_start();
        continue;
      }

      let (name, tail) = rest
        .split_once('(')
        .ok_or(HidError::MalformedDescriptor { offset: line_number, reason: "missing item argument" })?;
      let (argument, tail) = tail
        .split_once(')')
        .ok_or(HidError::MalformedDescriptor { offset: line_number, reason: "missing closing parenthesis" })?;

      let name = name.trim();
      let tag = match entry_tag(name) {
        Some(tag) => tag,
        None => return Err(HidError::UnknownUsageName(name.to_string())),
      };
      let data = match tag {
        ItemTag::EndCollection | ItemTag::Push | ItemTag::Pop => Vec::new(),
        _ => compile_argument(tag, argument.trim(), &mut current_page)?,
      };
      items.push(Item::new(tag, data));
      rest = tail.trim_start();
    }
  }
  Ok(items)
}

/// Compiles mnemonic descriptor text straight to wire bytes.
pub fn compile_human_bytes(text: &str) -> Result<Vec<u8>, HidError> {
  Ok(compile_human(text)?.iter().flat_map(Item::encode).collect())
}

fn compile_argument(tag: ItemTag, argument: &str, current_page: &mut u16) -> Result<Vec<u8>, HidError> {
  let number = parse_number(argument);
  let bytes = match tag {
    ItemTag::UsagePage => {
      let page = match number {
        Some(number) => number as u16,
        None => usage_tables::page_id(argument).ok_or_else(|| HidError::UnknownUsageName(argument.to_string()))?,
      };
      *current_page = page;
      encode_unsigned(page as u32)
    }
    ItemTag::Usage | ItemTag::UsageMinimum | ItemTag::UsageMaximum => {
      let usage = match number {
        Some(number) => number as u32,
        None => usage_tables::usage_id(*current_page, argument)
          .ok_or_else(|| HidError::UnknownUsageName(argument.to_string()))? as u32,
      };
      encode_unsigned(usage)
    }
    ItemTag::Collection => {
      let kind = match number {
        Some(number) => number as u8,
        None => usage_tables::collection_kind_id(argument)
          .ok_or_else(|| HidError::UnknownUsageName(argument.to_string()))?,
      };
      encode_unsigned(kind as u32)
    }
    ItemTag::Input | ItemTag::Output | ItemTag::Feature => {
      let bits = match number {
        Some(number) => number as u32,
        None => {
          let mut bits = 0;
          for token in argument.split(',') {
            bits |= usage_tables::main_flag_bits(token.trim())
              .ok_or_else(|| HidError::UnknownUsageName(token.trim().to_string()))?;
          }
          bits
        }
      };
      encode_unsigned(bits)
    }
    ItemTag::Unit => {
      let code = match number {
        Some(number) => number as u32,
        None => {
          usage_tables::unit_code(argument).ok_or_else(|| HidError::UnknownUsageName(argument.to_string()))?
        }
      };
      encode_unsigned(code)
    }
    ItemTag::UnitExponent => {
      let exponent = number.ok_or_else(|| HidError::UnknownUsageName(argument.to_string()))?;
      //4-bit two's-complement nibble in a one-byte payload
      vec![(exponent as i32 & 0xf) as u8]
    }
    ItemTag::LogicalMinimum | ItemTag::LogicalMaximum | ItemTag::PhysicalMinimum | ItemTag::PhysicalMaximum => {
      let value = number.ok_or_else(|| HidError::UnknownUsageName(argument.to_string()))?;
      encode_signed(value as i32)
    }
    _ => {
      let value = number.ok_or_else(|| HidError::UnknownUsageName(argument.to_string()))?;
      encode_unsigned(value as u32)
    }
  };
  Ok(bytes)
}

#[cfg(test)]
mod tests {
  use super::{compile_human, compile_human_bytes};
  use crate::descriptor_parser::tests::GAMEPAD_DESCRIPTOR;
  use crate::descriptor_parser::ReportDescriptor;
  use crate::error::HidError;
  use crate::item_tokenizer::{tokenize, Item, ItemTag};
  use alloc::string::ToString;
  use alloc::vec;

  static GAMEPAD_HUMAN: &str = "
    Usage Page (Generic Desktop)
    Usage (Joystick)
    Collection (Application)
    .Usage (Pointer)
    .Collection (Physical)
    ..Report ID (1)
    ..Usage (X)
    ..Logical Minimum (0)
    ..Logical Maximum (255)
    ..Physical Minimum (0)
    ..Physical Maximum (255)
    ..Report Size (8)
    ..Report Count (1)
    ..Input (Data,Var,Abs)
    ..Usage (Y)
    ..Input (Data,Var,Abs)
    ..Usage Page (Simulation Controls)
    ..Usage (Rudder)
    ..Input (Data,Var,Abs)
    ..Usage (Throttle)
    ..Input (Data,Var,Abs)
    ..Usage Page (Button)
    ..Usage Minimum (1)
    ..Usage Maximum (12)
    ..Logical Maximum (1)
    ..Physical Maximum (1)
    ..Report Size (1)
    ..Report Count (12)
    ..Input (Data,Var,Abs)
    ..Report Count (1)
    ..Report Size (0)
    ..Input (Cnst,Var,Abs)
    ..Usage Page (Generic Desktop)
    ..Usage (Hat switch)
    ..Logical Maximum (7)
    ..Physical Maximum (315)
    ..Unit Exponent (0)
    ..Unit (Degrees^4,EngRotation)
    ..Report Size (4)
    ..Input (Data,Var,Abs,Null)
    ..Unit (None)
    .End Collection
    .Usage Page (Physical Input Device)
    .Usage (0x92)
    .Collection (Logical)
    ..Report ID (2)
    ..Usage (0xa0)
    ..Usage (0x9f)
    ..Logical Maximum (1)
    ..Physical Maximum (0)
    ..Report Size (1)
    ..Report Count (2)
    ..Input (Data,Var,Abs)
    ..Report Size (6)
    ..Report Count (1)
    ..Input (Cnst,Var,Abs)
    ..Usage (0x22)
    ..Report Size (7)
    ..Logical Maximum (127)
    ..Input (Data,Var,Abs)
    ..Usage (0x94)
    ..Report Size (1)
    ..Logical Maximum (1)
    ..Input (Data,Var,Abs)
    .End Collection
    End Collection
  ";

  #[test]
  fn mnemonic_text_should_compile_to_descriptor_bytes() {
    let bytes = compile_human_bytes(GAMEPAD_HUMAN).unwrap();
    assert_eq!(bytes, GAMEPAD_DESCRIPTOR);
  }

  #[test]
  fn mnemonic_items_should_match_tokenized_items() {
    let compiled = compile_human(GAMEPAD_HUMAN).unwrap();
    let tokenized = tokenize(GAMEPAD_DESCRIPTOR).unwrap();
    assert_eq!(compiled, tokenized);
  }

  #[test]
  fn mnemonic_descriptor_should_parse_like_binary() {
    let from_human = ReportDescriptor::from_human(GAMEPAD_HUMAN).unwrap();
    let from_binary = ReportDescriptor::parse(GAMEPAD_DESCRIPTOR).unwrap();
    assert_eq!(from_human, from_binary);
  }

  #[test]
  fn entries_should_flow_across_one_line() {
    let stream = compile_human(
      "Usage Page (Generic Desktop) Usage (Joystick) Collection (Application) Push Pop End Collection",
    )
    .unwrap();
    let lines =
      compile_human("Usage Page (Generic Desktop)\nUsage (Joystick)\nCollection (Application)\nPush\nPop\nEnd Collection")
        .unwrap();
    assert_eq!(stream, lines);
    assert_eq!(stream.len(), 6);
  }

  #[test]
  fn numeric_and_named_arguments_should_agree() {
    let named = compile_human("Usage Page (Generic Desktop)\nUsage (Hat switch)\nCollection (Application)\nEnd Collection").unwrap();
    let numeric = compile_human("Usage Page (0x01)\nUsage (0x39)\nCollection (1)\nEnd Collection").unwrap();
    assert_eq!(named, numeric);
  }

  #[test]
  fn signed_payloads_should_use_minimal_twos_complement() {
    let items = compile_human("Logical Minimum (-127)\nLogical Maximum (255)\nLogical Maximum (65534)").unwrap();
    assert_eq!(
      items,
      vec![
        Item::new(ItemTag::LogicalMinimum, vec![0x81]),
        Item::new(ItemTag::LogicalMaximum, vec![0xff, 0x00]),
        Item::new(ItemTag::LogicalMaximum, vec![0xfe, 0xff, 0x00, 0x00]),
      ]
    );
  }

  #[test]
  fn unit_exponent_should_encode_as_nibble() {
    let items = compile_human("Unit Exponent (-2)").unwrap();
    assert_eq!(items, vec![Item::new(ItemTag::UnitExponent, vec![0x0e])]);
  }

  #[test]
  fn unknown_names_should_error() {
    assert_eq!(
      compile_human("Usage Page (Imaginary Page)"),
      Err(HidError::UnknownUsageName("Imaginary Page".to_string()))
    );
    assert_eq!(
      compile_human("Usage Page (Generic Desktop)\nUsage (Frobnicator)"),
      Err(HidError::UnknownUsageName("Frobnicator".to_string()))
    );
    assert_eq!(compile_human("Wiggle (1)"), Err(HidError::UnknownUsageName("Wiggle".to_string())));
    assert_eq!(
      compile_human("Usage (X"),
      Err(HidError::MalformedDescriptor { offset: 0, reason: "missing closing parenthesis" })
    );
  }
}
