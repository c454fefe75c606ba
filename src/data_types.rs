//! Descriptor Data Types
//!
//! Newtype wrappers for the values carried by report descriptor items. Conversions from raw item
//! payloads live here so the builder and the codec never touch byte slices directly.
//!
//! Refer to the USB Device Class Definition for Human Interface Devices (HID) Version 1.11
//! <https://www.usb.org/sites/default/files/hid1_11.pdf>
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::utils::{i32_from_bytes, u16_from_bytes, u32_from_bytes};
use core::ops::RangeInclusive;

/// Usage page global item data type.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct UsagePage(u16);
impl From<&[u8]> for UsagePage {
  fn from(bytes: &[u8]) -> Self {
    UsagePage(u16_from_bytes(bytes))
  }
}
impl From<u16> for UsagePage {
  fn from(val: u16) -> Self {
    UsagePage(val)
  }
}
impl From<UsagePage> for u16 {
  fn from(val: UsagePage) -> Self {
    val.0
  }
}

/// Full 32-bit usage: usage page in the upper 16 bits, usage id in the lower 16 bits. A bare
/// usage id (page bits zero) is promoted to a full usage with [`Usage::from_page_and_id`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Usage(u32);
impl Usage {
  /// Combines the current usage page with a usage id, unless the id already carries a page.
  pub fn from_page_and_id(page: Option<UsagePage>, id: Usage) -> Self {
    let mut usage = id.0;
    if let Some(page) = page {
      if usage & 0xFFFF_0000 == 0 {
        usage |= (u16::from(page) as u32) << 16;
      }
    }
    Usage(usage)
  }

  pub fn page(&self) -> u16 {
    (self.0 >> 16) as u16
  }

  pub fn id(&self) -> u16 {
    (self.0 & 0xFFFF) as u16
  }
}
impl From<&[u8]> for Usage {
  fn from(bytes: &[u8]) -> Self {
    Usage(u32_from_bytes(bytes))
  }
}
impl From<u32> for Usage {
  fn from(val: u32) -> Self {
    Usage(val)
  }
}
impl From<Usage> for u32 {
  fn from(val: Usage) -> Self {
    val.0
  }
}

/// Inclusive range of usages, computed from Usage Minimum/Usage Maximum local items.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageRange(RangeInclusive<u32>);
impl UsageRange {
  pub fn start(&self) -> u32 {
    *self.0.start()
  }
  pub fn end(&self) -> u32 {
    *self.0.end()
  }
  pub fn range(&self) -> RangeInclusive<u32> {
    self.0.clone()
  }
  pub fn contains(&self, usage: Usage) -> bool {
    self.0.contains(&u32::from(usage))
  }
}
impl From<RangeInclusive<u32>> for UsageRange {
  fn from(val: RangeInclusive<u32>) -> Self {
    UsageRange(val)
  }
}
impl From<UsageRange> for RangeInclusive<u32> {
  fn from(val: UsageRange) -> Self {
    val.0
  }
}

/// Logical minimum global item data type. A negative logical minimum marks the field as signed
/// (HID 1.1 section 6.2.2.7).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogicalMinimum(i32);
impl From<&[u8]> for LogicalMinimum {
  fn from(bytes: &[u8]) -> Self {
    LogicalMinimum(i32_from_bytes(bytes))
  }
}
impl From<i32> for LogicalMinimum {
  fn from(val: i32) -> Self {
    LogicalMinimum(val)
  }
}
impl From<LogicalMinimum> for i32 {
  fn from(val: LogicalMinimum) -> Self {
    val.0
  }
}
impl From<LogicalMinimum> for u32 {
  fn from(val: LogicalMinimum) -> Self {
    val.0 as u32
  }
}

/// Logical maximum global item data type. Interpreted as unsigned when the logical minimum of the
/// same field is non-negative.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LogicalMaximum(i32);
impl From<&[u8]> for LogicalMaximum {
  fn from(bytes: &[u8]) -> Self {
    LogicalMaximum(i32_from_bytes(bytes))
  }
}
impl From<i32> for LogicalMaximum {
  fn from(val: i32) -> Self {
    LogicalMaximum(val)
  }
}
impl From<LogicalMaximum> for i32 {
  fn from(val: LogicalMaximum) -> Self {
    val.0
  }
}
impl From<LogicalMaximum> for u32 {
  fn from(val: LogicalMaximum) -> Self {
    val.0 as u32
  }
}

/// Physical minimum global item data type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalMinimum(i32);
impl From<&[u8]> for PhysicalMinimum {
  fn from(bytes: &[u8]) -> Self {
    PhysicalMinimum(i32_from_bytes(bytes))
  }
}
impl From<i32> for PhysicalMinimum {
  fn from(val: i32) -> Self {
    PhysicalMinimum(val)
  }
}
impl From<PhysicalMinimum> for i32 {
  fn from(val: PhysicalMinimum) -> Self {
    val.0
  }
}

/// Physical maximum global item data type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PhysicalMaximum(i32);
impl From<&[u8]> for PhysicalMaximum {
  fn from(bytes: &[u8]) -> Self {
    PhysicalMaximum(i32_from_bytes(bytes))
  }
}
impl From<i32> for PhysicalMaximum {
  fn from(val: i32) -> Self {
    PhysicalMaximum(val)
  }
}
impl From<PhysicalMaximum> for i32 {
  fn from(val: PhysicalMaximum) -> Self {
    val.0
  }
}

/// Unit global item data type, kept in its packed nibble encoding.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Unit(u32);
impl From<&[u8]> for Unit {
  fn from(bytes: &[u8]) -> Self {
    Unit(u32_from_bytes(bytes))
  }
}
impl From<u32> for Unit {
  fn from(val: u32) -> Self {
    Unit(val)
  }
}
impl From<Unit> for u32 {
  fn from(val: Unit) -> Self {
    val.0
  }
}

/// Unit exponent global item data type, stored decoded: the low 4 bits of the payload are a
/// two's-complement nibble, so `0x0e` decodes to -2.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnitExponent(i32);
impl UnitExponent {
  /// The 4-bit two's-complement wire encoding of this exponent.
  pub fn nibble(&self) -> u8 {
    (self.0 & 0xf) as u8
  }
}
impl From<&[u8]> for UnitExponent {
  fn from(bytes: &[u8]) -> Self {
    let nibble = (u32_from_bytes(bytes) & 0xf) as i32;
    UnitExponent((nibble << 28) >> 28)
  }
}
impl From<i32> for UnitExponent {
  fn from(val: i32) -> Self {
    UnitExponent(val)
  }
}
impl From<UnitExponent> for i32 {
  fn from(val: UnitExponent) -> Self {
    val.0
  }
}

/// Report size global item data type (bits per value).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportSize(u32);
impl From<&[u8]> for ReportSize {
  fn from(bytes: &[u8]) -> Self {
    ReportSize(u32_from_bytes(bytes))
  }
}
impl From<u32> for ReportSize {
  fn from(val: u32) -> Self {
    ReportSize(val)
  }
}
impl From<ReportSize> for u32 {
  fn from(val: ReportSize) -> Self {
    val.0
  }
}

/// Report count global item data type (number of repeated values).
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReportCount(u32);
impl From<&[u8]> for ReportCount {
  fn from(bytes: &[u8]) -> Self {
    ReportCount(u32_from_bytes(bytes))
  }
}
impl From<u32> for ReportCount {
  fn from(val: u32) -> Self {
    ReportCount(val)
  }
}
impl From<ReportCount> for u32 {
  fn from(val: ReportCount) -> Self {
    val.0
  }
}

/// Report id global item data type. Id 0 means the device uses unnumbered reports; the id byte is
/// then never present on the wire.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportId(u8);
impl ReportId {
  pub const UNNUMBERED: ReportId = ReportId(0);

  pub fn is_numbered(&self) -> bool {
    self.0 != 0
  }
}
impl From<u8> for ReportId {
  fn from(val: u8) -> Self {
    ReportId(val)
  }
}
impl From<ReportId> for u8 {
  fn from(val: ReportId) -> Self {
    val.0
  }
}

/// Decoded flag bits of an Input/Output/Feature main item payload.
#[derive(Default, Debug, Clone, Copy, PartialEq, Eq)]
pub struct MainFlags {
  pub constant: bool,
  pub variable: bool,
  pub relative: bool,
  pub wrap: bool,
  pub nonlinear: bool,
  pub no_preferred: bool,
  pub null_state: bool,
  pub volatile: bool,
  pub buffered_bytes: bool,
}

impl MainFlags {
  /// Packs the flags back into the main item payload bit positions.
  pub fn to_bits(&self) -> u32 {
    let mut bits = 0;
    for (set, bit) in [
      (self.constant, 0),
      (self.variable, 1),
      (self.relative, 2),
      (self.wrap, 3),
      (self.nonlinear, 4),
      (self.no_preferred, 5),
      (self.null_state, 6),
      (self.volatile, 7),
      (self.buffered_bytes, 8),
    ] {
      if set {
        bits |= 1 << bit;
      }
    }
    bits
  }
}

impl From<&[u8]> for MainFlags {
  fn from(bytes: &[u8]) -> Self {
    let bits = u32_from_bytes(bytes);
    MainFlags {
      constant: bits & (1 << 0) != 0,
      variable: bits & (1 << 1) != 0,
      relative: bits & (1 << 2) != 0,
      wrap: bits & (1 << 3) != 0,
      nonlinear: bits & (1 << 4) != 0,
      no_preferred: bits & (1 << 5) != 0,
      null_state: bits & (1 << 6) != 0,
      volatile: bits & (1 << 7) != 0,
      buffered_bytes: bits & (1 << 8) != 0,
    }
  }
}
