//! Usage Name Tables
//!
//! Compile-time tables mapping usage pages, usage ids, collection types, main item flags and
//! units to the names used by the mnemonic descriptor syntax and the report formatter. Covers the
//! pages that commonly appear in device descriptors; anything else falls back to a hex rendering
//! when formatting, and name resolution fails with a typed error.
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::data_types::{MainFlags, Usage};
use alloc::format;
use alloc::string::String;

struct PageEntry {
  id: u16,
  name: &'static str,
  usages: &'static [(u16, &'static str)],
}

static GENERIC_DESKTOP_USAGES: &[(u16, &'static str)] = &[
  (0x01, "Pointer"),
  (0x02, "Mouse"),
  (0x04, "Joystick"),
  (0x05, "Game Pad"),
  (0x06, "Keyboard"),
  (0x07, "Keypad"),
  (0x08, "Multi-axis Controller"),
  (0x30, "X"),
  (0x31, "Y"),
  (0x32, "Z"),
  (0x33, "Rx"),
  (0x34, "Ry"),
  (0x35, "Rz"),
  (0x36, "Slider"),
  (0x37, "Dial"),
  (0x38, "Wheel"),
  (0x39, "Hat switch"),
  (0x3c, "Motion Wakeup"),
  (0x3d, "Start"),
  (0x3e, "Select"),
  (0x48, "Resolution Multiplier"),
  (0x80, "System Control"),
  (0x81, "System Power Down"),
  (0x82, "System Sleep"),
  (0x83, "System Wake Up"),
];

static SIMULATION_USAGES: &[(u16, &'static str)] = &[
  (0x01, "Flight Simulation Device"),
  (0xb0, "Aileron"),
  (0xb8, "Elevator"),
  (0xba, "Rudder"),
  (0xbb, "Throttle"),
  (0xc4, "Accelerator"),
  (0xc5, "Brake"),
  (0xc8, "Steering"),
];

static KEYBOARD_USAGES: &[(u16, &'static str)] = &[
  (0x00, "No Event"),
  (0x01, "ErrorRollOver"),
  (0xe0, "Keyboard LeftControl"),
  (0xe1, "Keyboard LeftShift"),
  (0xe2, "Keyboard LeftAlt"),
  (0xe3, "Keyboard Left GUI"),
  (0xe4, "Keyboard RightControl"),
  (0xe5, "Keyboard RightShift"),
  (0xe6, "Keyboard RightAlt"),
  (0xe7, "Keyboard Right GUI"),
];

static LED_USAGES: &[(u16, &'static str)] = &[
  (0x01, "Num Lock"),
  (0x02, "Caps Lock"),
  (0x03, "Scroll Lock"),
  (0x04, "Compose"),
  (0x05, "Kana"),
  (0x4b, "Generic Indicator"),
];

static ORDINAL_USAGES: &[(u16, &'static str)] = &[];

static TELEPHONY_USAGES: &[(u16, &'static str)] =
  &[(0x01, "Phone"), (0x20, "Hook Switch"), (0x2f, "Phone Mute")];

static CONSUMER_USAGES: &[(u16, &'static str)] = &[
  (0x0001, "Consumer Control"),
  (0x00b5, "Scan Next Track"),
  (0x00b6, "Scan Previous Track"),
  (0x00b7, "Stop"),
  (0x00cd, "Play/Pause"),
  (0x00e2, "Mute"),
  (0x00e9, "Volume Up"),
  (0x00ea, "Volume Down"),
  (0x0238, "AC Pan"),
];

static DIGITIZERS_USAGES: &[(u16, &'static str)] = &[
  (0x01, "Digitizer"),
  (0x02, "Pen"),
  (0x04, "Touch Screen"),
  (0x05, "Touch Pad"),
  (0x20, "Stylus"),
  (0x22, "Finger"),
  (0x30, "Tip Pressure"),
  (0x32, "In Range"),
  (0x33, "Touch"),
  (0x3c, "Invert"),
  (0x42, "Tip Switch"),
  (0x44, "Barrel Switch"),
  (0x45, "Eraser"),
  (0x47, "Confidence"),
  (0x51, "Contact Id"),
  (0x54, "Contact Count"),
  (0x55, "Contact Max"),
];

static PID_USAGES: &[(u16, &'static str)] = &[(0x01, "Physical Input Device")];

static PAGES: &[PageEntry] = &[
  PageEntry { id: 0x01, name: "Generic Desktop", usages: GENERIC_DESKTOP_USAGES },
  PageEntry { id: 0x02, name: "Simulation Controls", usages: SIMULATION_USAGES },
  PageEntry { id: 0x07, name: "Keyboard", usages: KEYBOARD_USAGES },
  PageEntry { id: 0x08, name: "LEDs", usages: LED_USAGES },
  PageEntry { id: 0x09, name: "Button", usages: &[] },
  PageEntry { id: 0x0a, name: "Ordinal", usages: ORDINAL_USAGES },
  PageEntry { id: 0x0b, name: "Telephony", usages: TELEPHONY_USAGES },
  PageEntry { id: 0x0c, name: "Consumer", usages: CONSUMER_USAGES },
  PageEntry { id: 0x0d, name: "Digitizers", usages: DIGITIZERS_USAGES },
  PageEntry { id: 0x0f, name: "Physical Input Device", usages: PID_USAGES },
];

fn page_entry(id: u16) -> Option<&'static PageEntry> {
  PAGES.iter().find(|page| page.id == id)
}

/// Resolves a usage page name to its id. `Vendor Defined Page N` resolves to `0xFF00 + N - 1`.
pub fn page_id(name: &str) -> Option<u16> {
  if let Some(page) = PAGES.iter().find(|page| page.name.eq_ignore_ascii_case(name)) {
    return Some(page.id);
  }
  let n: u16 = name.strip_prefix("Vendor Defined Page ")?.parse().ok()?;
  0xFF00u16.checked_add(n.checked_sub(1)?)
}

/// Resolves a usage page id to its name, synthesizing names for vendor pages.
pub fn page_name(id: u16) -> String {
  if let Some(page) = page_entry(id) {
    return String::from(page.name);
  }
  if id >= 0xFF00 {
    return format!("Vendor Defined Page {}", id - 0xFF00 + 1);
  }
  format!("0x{id:04x}")
}

/// Resolves a usage name against a page. `Button N` and `Vendor Usage 0xNN` are synthesized.
pub fn usage_id(page: u16, name: &str) -> Option<u16> {
  if page == 0x09 {
    if let Some(n) = name.strip_prefix("Button ") {
      return n.parse().ok();
    }
  }
  if page >= 0xFF00 {
    if let Some(n) = name.strip_prefix("Vendor Usage ") {
      let n = n.strip_prefix("0x")?;
      return u16::from_str_radix(n, 16).ok();
    }
  }
  let entry = page_entry(page)?;
  entry.usages.iter().find(|(_, candidate)| candidate.eq_ignore_ascii_case(name)).map(|(id, _)| *id)
}

/// Resolves a full usage to its name, falling back to a hex rendering.
pub fn usage_name(usage: Usage) -> String {
  let page = usage.page();
  let id = usage.id();
  if page == 0x09 {
    return format!("Button {id}");
  }
  if page >= 0xFF00 {
    return format!("Vendor Usage 0x{id:02x}");
  }
  if let Some(entry) = page_entry(page) {
    if let Some((_, name)) = entry.usages.iter().find(|(candidate, _)| *candidate == id) {
      return String::from(*name);
    }
  }
  format!("0x{id:04x}")
}

static COLLECTION_KINDS: &[(u8, &'static str)] = &[
  (0x00, "Physical"),
  (0x01, "Application"),
  (0x02, "Logical"),
  (0x03, "Report"),
  (0x04, "Named Array"),
  (0x05, "Usage Switch"),
  (0x06, "Usage Modifier"),
];

pub fn collection_kind_id(name: &str) -> Option<u8> {
  COLLECTION_KINDS.iter().find(|(_, candidate)| candidate.eq_ignore_ascii_case(name)).map(|(id, _)| *id)
}

pub fn collection_kind_name(id: u8) -> String {
  match COLLECTION_KINDS.iter().find(|(candidate, _)| *candidate == id) {
    Some((_, name)) => String::from(*name),
    None => format!("0x{id:02x}"),
  }
}

/// Flag names as they appear in main item mnemonics, e.g. `Input (Data,Var,Abs)`. `Data`, `Arr`
/// and `Abs` name cleared bits and contribute nothing.
static MAIN_FLAG_NAMES: &[(&str, u32)] = &[
  ("Data", 0),
  ("Cnst", 1 << 0),
  ("Const", 1 << 0),
  ("Arr", 0),
  ("Var", 1 << 1),
  ("Abs", 0),
  ("Rel", 1 << 2),
  ("Wrap", 1 << 3),
  ("NonLin", 1 << 4),
  ("NoPref", 1 << 5),
  ("Null", 1 << 6),
  ("Vol", 1 << 7),
  ("Buff", 1 << 8),
];

/// Resolves one comma-list token of a main item argument to its flag bits.
pub fn main_flag_bits(name: &str) -> Option<u32> {
  MAIN_FLAG_NAMES.iter().find(|(candidate, _)| candidate.eq_ignore_ascii_case(name)).map(|(_, bits)| *bits)
}

/// Renders main item flags the way descriptors are usually annotated: `Data,Var,Abs` plus any
/// uncommon flags that are set.
pub fn main_flags_name(flags: MainFlags) -> String {
  let mut name = String::new();
  name.push_str(if flags.constant { "Cnst" } else { "Data" });
  name.push_str(if flags.variable { ",Var" } else { ",Arr" });
  name.push_str(if flags.relative { ",Rel" } else { ",Abs" });
  for (set, flag) in [
    (flags.wrap, ",Wrap"),
    (flags.nonlinear, ",NonLin"),
    (flags.no_preferred, ",NoPref"),
    (flags.null_state, ",Null"),
    (flags.volatile, ",Vol"),
    (flags.buffered_bytes, ",Buff"),
  ] {
    if set {
      name.push_str(flag);
    }
  }
  name
}

/// Unit tokens and the nibble they occupy in the packed unit encoding. The system nibble carries
/// the measurement system; the others carry the exponent of that dimension (1 unless an explicit
/// `^N` suffix is given).
static UNIT_TOKENS: &[(&str, u32, u32)] = &[
  // (name, nibble shift, nibble value)
  ("SILinear", 0, 1),
  ("SIRotation", 0, 2),
  ("EngLinear", 0, 3),
  ("EngRotation", 0, 4),
  ("Centimeter", 4, 1),
  ("Radians", 4, 1),
  ("Inch", 4, 1),
  ("Degrees", 4, 1),
  ("Gram", 8, 1),
  ("Slug", 8, 1),
  ("Seconds", 12, 1),
  ("Kelvin", 16, 1),
  ("Fahrenheit", 16, 1),
  ("Ampere", 20, 1),
  ("Candela", 24, 1),
];

/// Resolves a comma-separated unit mnemonic (e.g. `Inch,EngLinear` or `None`) to the packed unit
/// code. A `^N` suffix on a dimension token sets that nibble's exponent (two's complement, so
/// `Seconds^-1` is legal).
pub fn unit_code(name: &str) -> Option<u32> {
  if name.eq_ignore_ascii_case("None") {
    return Some(0);
  }
  let mut code = 0u32;
  for token in name.split(',') {
    let token = token.trim();
    let (token, exponent) = match token.split_once('^') {
      Some((base, exp)) => (base, exp.parse::<i32>().ok()?),
      None => (token, 1),
    };
    let (_, shift, value) =
      UNIT_TOKENS.iter().find(|(candidate, _, _)| candidate.eq_ignore_ascii_case(token))?;
    let nibble = if *shift == 0 { *value } else { (value * ((exponent as u32) & 0xf)) & 0xf };
    code |= nibble << shift;
  }
  Some(code)
}

/// Renders a packed unit code back to its mnemonic, hex on unknown combinations.
pub fn unit_name(code: u32) -> String {
  if code == 0 {
    return String::from("None");
  }
  let system = code & 0xf;
  let mut name = String::new();
  for shift in [4u32, 8, 12, 16, 20, 24] {
    let nibble = (code >> shift) & 0xf;
    if nibble == 0 {
      continue;
    }
    let token = UNIT_TOKENS.iter().find(|(_, s, _)| *s == shift).and_then(|_| {
      UNIT_TOKENS.iter().find(|(name, s, _)| {
        *s == shift
          && match (shift, system) {
            (4, 1) => *name == "Centimeter",
            (4, 2) => *name == "Radians",
            (4, 3) => *name == "Inch",
            (4, 4) => *name == "Degrees",
            (8, 1 | 2) => *name == "Gram",
            (8, 3 | 4) => *name == "Slug",
            (16, 1 | 2) => *name == "Kelvin",
            (16, 3 | 4) => *name == "Fahrenheit",
            _ => true,
          }
      })
    });
    let Some((token, _, _)) = token else {
      return format!("0x{code:08x}");
    };
    if !name.is_empty() {
      name.push(',');
    }
    name.push_str(token);
    //nibble exponents above 7 are negative in two's complement.
    let exponent = ((nibble as i32) << 28) >> 28;
    if exponent != 1 {
      name.push_str(&format!("^{exponent}"));
    }
  }
  let system_token = match system {
    1 => "SILinear",
    2 => "SIRotation",
    3 => "EngLinear",
    4 => "EngRotation",
    _ => return format!("0x{code:08x}"),
  };
  if !name.is_empty() {
    name.push(',');
  }
  name.push_str(system_token);
  name
}

#[cfg(test)]
mod tests {
  use super::{
    collection_kind_id, collection_kind_name, main_flag_bits, main_flags_name, page_id, page_name, unit_code,
    unit_name, usage_id, usage_name,
  };
  use crate::data_types::{MainFlags, Usage};

  #[test]
  fn page_lookups_should_resolve_both_directions() {
    assert_eq!(page_id("Generic Desktop"), Some(0x01));
    assert_eq!(page_id("Simulation Controls"), Some(0x02));
    assert_eq!(page_id("Vendor Defined Page 1"), Some(0xFF00));
    assert_eq!(page_id("Not A Page"), None);

    assert_eq!(page_name(0x01), "Generic Desktop");
    assert_eq!(page_name(0xFF00), "Vendor Defined Page 1");
    assert_eq!(page_name(0x1234), "0x1234");
  }

  #[test]
  fn usage_lookups_should_resolve_both_directions() {
    assert_eq!(usage_id(0x01, "Hat switch"), Some(0x39));
    assert_eq!(usage_id(0x02, "Rudder"), Some(0xba));
    assert_eq!(usage_id(0x09, "Button 12"), Some(12));
    assert_eq!(usage_id(0xFF00, "Vendor Usage 0x01"), Some(1));
    assert_eq!(usage_id(0x01, "Not A Usage"), None);

    assert_eq!(usage_name(Usage::from(0x0001_0030)), "X");
    assert_eq!(usage_name(Usage::from(0x0009_0003)), "Button 3");
    assert_eq!(usage_name(Usage::from(0xFF00_0002)), "Vendor Usage 0x02");
    assert_eq!(usage_name(Usage::from(0x0001_00ff)), "0x00ff");
  }

  #[test]
  fn collection_kinds_should_resolve_both_directions() {
    assert_eq!(collection_kind_id("Application"), Some(0x01));
    assert_eq!(collection_kind_id("Physical"), Some(0x00));
    assert_eq!(collection_kind_name(0x02), "Logical");
    assert_eq!(collection_kind_name(0x80), "0x80");
  }

  #[test]
  fn main_flags_should_format_and_parse() {
    assert_eq!(main_flag_bits("Data"), Some(0));
    assert_eq!(main_flag_bits("Cnst"), Some(1));
    assert_eq!(main_flag_bits("Null"), Some(64));
    assert_eq!(main_flag_bits("Bogus"), None);

    assert_eq!(main_flags_name(MainFlags::from([0x02u8].as_slice())), "Data,Var,Abs");
    assert_eq!(main_flags_name(MainFlags::from([0x42u8].as_slice())), "Data,Var,Abs,Null");
    assert_eq!(main_flags_name(MainFlags::from([0x01u8].as_slice())), "Cnst,Arr,Abs");
  }

  #[test]
  fn units_should_resolve_both_directions() {
    assert_eq!(unit_code("None"), Some(0));
    assert_eq!(unit_code("Inch,EngLinear"), Some(0x13));
    assert_eq!(unit_code("Degrees,EngRotation"), Some(0x14));
    assert_eq!(unit_code("Seconds,SILinear"), Some(0x1001));
    assert_eq!(unit_code("Furlongs"), None);

    assert_eq!(unit_name(0), "None");
    assert_eq!(unit_name(0x13), "Inch,EngLinear");
    assert_eq!(unit_name(0x14), "Degrees,EngRotation");
    assert_eq!(unit_name(0x1001), "Seconds,SILinear");
  }
}
