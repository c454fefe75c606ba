//! Report Descriptor Parsing
//!
//! Builds the structured descriptor model (collection tree plus input/output/feature reports with
//! bit-exact field layout) from a tokenized item stream. One pass over the items drives a state
//! machine holding the global item state (with its push/pop stack), the local item state (cleared
//! after every main item) and the stack of open collections, per HID spec 1.1 section 6.2.2.
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::data_types::{
  LogicalMaximum, LogicalMinimum, MainFlags, PhysicalMaximum, PhysicalMinimum, ReportCount, ReportId, ReportSize,
  Unit, UnitExponent, Usage, UsagePage, UsageRange,
};
use crate::error::HidError;
use crate::human_descriptor::compile_human;
use crate::item_tokenizer::{parse_hex, tokenize, Item, ItemTag};
use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::ops::Range;

/// Direction of a report: device-to-host, host-to-device, or bidirectional configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ReportKind {
  Input,
  Output,
  Feature,
}

/// Collection type byte of a Collection main item. Values above the defined range are
/// vendor-defined (HID spec 1.1 section 6.2.2.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
  Physical,
  Application,
  Logical,
  Report,
  NamedArray,
  UsageSwitch,
  UsageModifier,
  Vendor(u8),
}

impl From<u8> for CollectionKind {
  fn from(byte: u8) -> Self {
    match byte {
      0x00 => CollectionKind::Physical,
      0x01 => CollectionKind::Application,
      0x02 => CollectionKind::Logical,
      0x03 => CollectionKind::Report,
      0x04 => CollectionKind::NamedArray,
      0x05 => CollectionKind::UsageSwitch,
      0x06 => CollectionKind::UsageModifier,
      byte => CollectionKind::Vendor(byte),
    }
  }
}

impl From<CollectionKind> for u8 {
  fn from(kind: CollectionKind) -> Self {
    match kind {
      CollectionKind::Physical => 0x00,
      CollectionKind::Application => 0x01,
      CollectionKind::Logical => 0x02,
      CollectionKind::Report => 0x03,
      CollectionKind::NamedArray => 0x04,
      CollectionKind::UsageSwitch => 0x05,
      CollectionKind::UsageModifier => 0x06,
      CollectionKind::Vendor(byte) => byte,
    }
  }
}

/// Node of the collection tree. `reports` lists, in declaration order, the keys of the reports
/// that had fields declared directly inside this collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
  pub usage_page: UsagePage,
  pub usage: Usage,
  pub kind: CollectionKind,
  pub collections: Vec<Collection>,
  pub reports: Vec<(ReportKind, ReportId)>,
}

/// A single variable data value at a fixed bit position within the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableField {
  pub bits: Range<u32>,
  pub usage: Usage,
  pub logical_minimum: LogicalMinimum,
  pub logical_maximum: LogicalMaximum,
  pub physical_minimum: PhysicalMinimum,
  pub physical_maximum: PhysicalMaximum,
  pub unit: Unit,
  pub unit_exponent: UnitExponent,
  pub flags: MainFlags,
}

/// One slot of an array item: the value selects a usage from `usage_list`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayField {
  pub bits: Range<u32>,
  pub usage_list: Vec<UsageRange>,
  pub logical_minimum: LogicalMinimum,
  pub logical_maximum: LogicalMaximum,
  pub flags: MainFlags,
}

/// Constant bits with no usage, present only to pad the report layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaddingField {
  pub bits: Range<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Field {
  Variable(VariableField),
  Array(ArrayField),
  Padding(PaddingField),
}

impl Field {
  pub fn bits(&self) -> &Range<u32> {
    match self {
      Field::Variable(field) => &field.bits,
      Field::Array(field) => &field.bits,
      Field::Padding(field) => &field.bits,
    }
  }

  pub fn width(&self) -> u32 {
    let bits = self.bits();
    bits.end - bits.start
  }

  /// Whether this field carries a value when packing/unpacking (padding does not).
  pub fn carries_value(&self) -> bool {
    !matches!(self, Field::Padding(_))
  }
}

/// One report: fields laid out contiguously at bit granularity in declaration order.
/// `application` is the usage of the nearest enclosing Application collection at the time the
/// report's first field was declared.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
  pub report_id: ReportId,
  pub kind: ReportKind,
  pub application: Usage,
  pub size_in_bits: u32,
  pub fields: Vec<Field>,
}

impl Report {
  /// Payload size excluding the report id byte.
  pub fn size_in_bytes(&self) -> usize {
    self.size_in_bits.div_ceil(8) as usize
  }
}

/// Fully parsed report descriptor: the collection tree and the reports it declares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDescriptor {
  pub collections: Vec<Collection>,
  pub input_reports: Vec<Report>,
  pub output_reports: Vec<Report>,
  pub feature_reports: Vec<Report>,
}

impl ReportDescriptor {
  /// Parses a raw binary report descriptor.
  pub fn parse(descriptor: &[u8]) -> Result<Self, HidError> {
    Self::from_items(&tokenize(descriptor)?)
  }

  /// Builds the descriptor from an already tokenized item stream.
  pub fn from_items(items: &[Item]) -> Result<Self, HidError> {
    let mut builder = DescriptorBuilder::default();
    for (index, item) in items.iter().enumerate() {
      builder.process(index, item)?;
    }
    builder.finish()
  }

  /// Parses a descriptor given as whitespace-separated hex byte pairs.
  pub fn from_hex(text: &str) -> Result<Self, HidError> {
    Self::parse(&parse_hex(text)?)
  }

  /// Parses a human-readable descriptor: mnemonic entries like `Usage Page (Generic Desktop)`,
  /// or hex byte pairs (detected by the absence of parenthesized arguments).
  pub fn from_human(text: &str) -> Result<Self, HidError> {
    if text.contains('(') {
      Self::from_items(&compile_human(text)?)
    } else {
      Self::from_hex(text)
    }
  }

  pub fn reports(&self, kind: ReportKind) -> &[Report] {
    match kind {
      ReportKind::Input => &self.input_reports,
      ReportKind::Output => &self.output_reports,
      ReportKind::Feature => &self.feature_reports,
    }
  }

  pub fn input_report(&self, id: u8) -> Result<&Report, HidError> {
    self.report(ReportKind::Input, id)
  }

  pub fn output_report(&self, id: u8) -> Result<&Report, HidError> {
    self.report(ReportKind::Output, id)
  }

  pub fn feature_report(&self, id: u8) -> Result<&Report, HidError> {
    self.report(ReportKind::Feature, id)
  }

  pub fn report(&self, kind: ReportKind, id: u8) -> Result<&Report, HidError> {
    self.reports(kind).iter().find(|report| u8::from(report.report_id) == id).ok_or(HidError::UnknownReportId(id))
  }

  /// Whether any report carries a numbered id. Unnumbered devices never prefix report buffers
  /// with an id byte.
  pub fn uses_report_ids(&self) -> bool {
    [&self.input_reports, &self.output_reports, &self.feature_reports]
      .into_iter()
      .flatten()
      .any(|report| report.report_id.is_numbered())
  }

  /// The first report of the given kind declared under an Application collection with the given
  /// usage.
  pub fn application_report(&self, kind: ReportKind, application: Usage) -> Option<&Report> {
    self.reports(kind).iter().find(|report| report.application == application)
  }
}

/// Global item state, saved and restored whole by Push/Pop (HID spec 1.1 section 6.2.2.7).
#[derive(Debug, Default, Clone)]
struct GlobalState {
  usage_page: Option<UsagePage>,
  logical_minimum: LogicalMinimum,
  logical_maximum: LogicalMaximum,
  physical_minimum: PhysicalMinimum,
  physical_maximum: PhysicalMaximum,
  unit: Unit,
  unit_exponent: UnitExponent,
  report_size: ReportSize,
  report_count: ReportCount,
  report_id: ReportId,
}

/// Local item state, cleared after every main item (HID spec 1.1 section 6.2.2.8).
#[derive(Debug, Default)]
struct LocalState {
  usages: Vec<UsageRange>,
  usage_minimum: Option<Usage>,
  usage_maximum: Option<Usage>,
}

/// Walks pending usage ranges one usage at a time, repeating the final usage once the ranges are
/// exhausted (a report count larger than the usage count assigns the last usage to the rest).
struct UsageCursor<'a> {
  ranges: &'a [UsageRange],
  range_index: usize,
  offset: u32,
}

impl<'a> UsageCursor<'a> {
  fn new(ranges: &'a [UsageRange]) -> Self {
    UsageCursor { ranges, range_index: 0, offset: 0 }
  }

  fn next_or_last(&mut self) -> Usage {
    while let Some(range) = self.ranges.get(self.range_index) {
      let candidate = range.start() + self.offset;
      if candidate <= range.end() {
        self.offset += 1;
        return Usage::from(candidate);
      }
      self.range_index += 1;
      self.offset = 0;
    }
    match self.ranges.last() {
      Some(range) => Usage::from(range.end()),
      None => Usage::default(),
    }
  }
}

#[derive(Default)]
struct DescriptorBuilder {
  global: GlobalState,
  global_stack: Vec<GlobalState>,
  local: LocalState,
  open_collections: Vec<Collection>,
  root_collections: Vec<Collection>,
  input: BTreeMap<u8, Report>,
  output: BTreeMap<u8, Report>,
  feature: BTreeMap<u8, Report>,
}

impl DescriptorBuilder {
  fn process(&mut self, index: usize, item: &Item) -> Result<(), HidError> {
    match item.tag {
      // main items
      ItemTag::Input => self.add_fields(ReportKind::Input, item, index)?,
      ItemTag::Output => self.add_fields(ReportKind::Output, item, index)?,
      ItemTag::Feature => self.add_fields(ReportKind::Feature, item, index)?,
      ItemTag::Collection => {
        let usage = self.local.usages.first().map(|range| Usage::from(range.start())).unwrap_or_default();
        self.open_collections.push(Collection {
          usage_page: self.global.usage_page.unwrap_or_default(),
          usage,
          kind: CollectionKind::from(item.data.first().copied().unwrap_or(0)),
          collections: Vec::new(),
          reports: Vec::new(),
        });
        self.local = LocalState::default();
      }
      ItemTag::EndCollection => {
        let closed = self.open_collections.pop().ok_or(HidError::UnbalancedCollection)?;
        match self.open_collections.last_mut() {
          Some(parent) => parent.collections.push(closed),
          None => self.root_collections.push(closed),
        }
        self.local = LocalState::default();
      }
      // global items
      ItemTag::UsagePage => self.global.usage_page = Some(UsagePage::from(item.data.as_slice())),
      ItemTag::LogicalMinimum => self.global.logical_minimum = LogicalMinimum::from(item.data.as_slice()),
      ItemTag::LogicalMaximum => self.global.logical_maximum = LogicalMaximum::from(item.data.as_slice()),
      ItemTag::PhysicalMinimum => self.global.physical_minimum = PhysicalMinimum::from(item.data.as_slice()),
      ItemTag::PhysicalMaximum => self.global.physical_maximum = PhysicalMaximum::from(item.data.as_slice()),
      ItemTag::UnitExponent => self.global.unit_exponent = UnitExponent::from(item.data.as_slice()),
      ItemTag::Unit => self.global.unit = Unit::from(item.data.as_slice()),
      ItemTag::ReportSize => self.global.report_size = ReportSize::from(item.data.as_slice()),
      ItemTag::ReportId => self.global.report_id = ReportId::from(item.data.first().copied().unwrap_or(0)),
      ItemTag::ReportCount => self.global.report_count = ReportCount::from(item.data.as_slice()),
      ItemTag::Push => self.global_stack.push(self.global.clone()),
      ItemTag::Pop => {
        self.global = self
          .global_stack
          .pop()
          .ok_or(HidError::MalformedDescriptor { offset: index, reason: "pop without matching push" })?;
      }
      // local items
      ItemTag::Usage => {
        let usage = Usage::from_page_and_id(self.global.usage_page, Usage::from(item.value_u32()));
        self.local.usages.push(UsageRange::from(u32::from(usage)..=u32::from(usage)));
      }
      ItemTag::UsageMinimum => {
        self.local.usage_minimum =
          Some(Usage::from_page_and_id(self.global.usage_page, Usage::from(item.value_u32())));
        self.close_usage_range();
      }
      ItemTag::UsageMaximum => {
        self.local.usage_maximum =
          Some(Usage::from_page_and_id(self.global.usage_page, Usage::from(item.value_u32())));
        self.close_usage_range();
      }
      ItemTag::Delimiter => {
        return Err(HidError::MalformedDescriptor { offset: index, reason: "delimiter items are not supported" });
      }
      // designator and string locals are structurally valid but carry nothing this model keeps
      ItemTag::DesignatorIndex
      | ItemTag::DesignatorMinimum
      | ItemTag::DesignatorMaximum
      | ItemTag::StringIndex
      | ItemTag::StringMinimum
      | ItemTag::StringMaximum => {}
    }
    Ok(())
  }

  fn close_usage_range(&mut self) {
    if let (Some(min), Some(max)) = (self.local.usage_minimum, self.local.usage_maximum) {
      self.local.usages.push(UsageRange::from(u32::from(min)..=u32::from(max)));
      self.local.usage_minimum = None;
      self.local.usage_maximum = None;
    }
  }

  fn add_fields(&mut self, kind: ReportKind, item: &Item, index: usize) -> Result<(), HidError> {
    let flags = MainFlags::from(item.data.as_slice());
    let size = u32::from(self.global.report_size);
    let count = u32::from(self.global.report_count);
    let report_id = self.global.report_id;

    let application = self
      .open_collections
      .iter()
      .rev()
      .find(|collection| collection.kind == CollectionKind::Application)
      .map(|collection| collection.usage)
      .unwrap_or_default();

    if let Some(open) = self.open_collections.last_mut() {
      if !open.reports.contains(&(kind, report_id)) {
        open.reports.push((kind, report_id));
      }
    }

    let reports = match kind {
      ReportKind::Input => &mut self.input,
      ReportKind::Output => &mut self.output,
      ReportKind::Feature => &mut self.feature,
    };
    let report = reports
      .entry(u8::from(report_id))
      .or_insert_with(|| Report { report_id, kind, application, size_in_bits: 0, fields: Vec::new() });

    let offset = report.size_in_bits;
    if offset as u64 + size as u64 * count as u64 > u32::MAX as u64 {
      return Err(HidError::MalformedDescriptor { offset: index, reason: "report size overflow" });
    }
    if self.local.usages.is_empty() {
      //constant filler, including legal zero-width fields
      report.fields.push(Field::Padding(PaddingField { bits: offset..offset + size * count }));
    } else if flags.variable {
      let mut usages = UsageCursor::new(&self.local.usages);
      for n in 0..count {
        report.fields.push(Field::Variable(VariableField {
          bits: (offset + n * size)..(offset + (n + 1) * size),
          usage: usages.next_or_last(),
          logical_minimum: self.global.logical_minimum,
          logical_maximum: self.global.logical_maximum,
          physical_minimum: self.global.physical_minimum,
          physical_maximum: self.global.physical_maximum,
          unit: self.global.unit,
          unit_exponent: self.global.unit_exponent,
          flags,
        }));
      }
    } else {
      for n in 0..count {
        report.fields.push(Field::Array(ArrayField {
          bits: (offset + n * size)..(offset + (n + 1) * size),
          usage_list: self.local.usages.clone(),
          logical_minimum: self.global.logical_minimum,
          logical_maximum: self.global.logical_maximum,
          flags,
        }));
      }
    }
    report.size_in_bits = offset + size * count;

    self.local = LocalState::default();
    Ok(())
  }

  fn finish(self) -> Result<ReportDescriptor, HidError> {
    if !self.open_collections.is_empty() {
      return Err(HidError::UnterminatedCollection);
    }
    Ok(ReportDescriptor {
      collections: self.root_collections,
      input_reports: self.input.into_values().collect(),
      output_reports: self.output.into_values().collect(),
      feature_reports: self.feature.into_values().collect(),
    })
  }
}

#[cfg(test)]
pub(crate) mod tests {
  use super::{CollectionKind, Field, ReportDescriptor, ReportKind};
  use crate::data_types::{ReportId, Usage};
  use crate::error::HidError;

  /// Saitek Magic Bus gamepad, joystick application collection.
  pub(crate) static GAMEPAD_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x04, // Usage (Joystick)
    0xa1, 0x01, // Collection (Application)
    0x09, 0x01, //  Usage (Pointer)
    0xa1, 0x00, //  Collection (Physical)
    0x85, 0x01, //   Report ID (1)
    0x09, 0x30, //   Usage (X)
    0x15, 0x00, //   Logical Minimum (0)
    0x26, 0xff, 0x00, //   Logical Maximum (255)
    0x35, 0x00, //   Physical Minimum (0)
    0x46, 0xff, 0x00, //   Physical Maximum (255)
    0x75, 0x08, //   Report Size (8)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x09, 0x31, //   Usage (Y)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x05, 0x02, //   Usage Page (Simulation Controls)
    0x09, 0xba, //   Usage (Rudder)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x09, 0xbb, //   Usage (Throttle)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x05, 0x09, //   Usage Page (Button)
    0x19, 0x01, //   Usage Minimum (1)
    0x29, 0x0c, //   Usage Maximum (12)
    0x25, 0x01, //   Logical Maximum (1)
    0x45, 0x01, //   Physical Maximum (1)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x0c, //   Report Count (12)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x95, 0x01, //   Report Count (1)
    0x75, 0x00, //   Report Size (0)
    0x81, 0x03, //   Input (Cnst,Var,Abs)
    0x05, 0x01, //   Usage Page (Generic Desktop)
    0x09, 0x39, //   Usage (Hat switch)
    0x25, 0x07, //   Logical Maximum (7)
    0x46, 0x3b, 0x01, //   Physical Maximum (315)
    0x55, 0x00, //   Unit Exponent (0)
    0x65, 0x44, //   Unit (Degrees^4,EngRotation)
    0x75, 0x04, //   Report Size (4)
    0x81, 0x42, //   Input (Data,Var,Abs,Null)
    0x65, 0x00, //   Unit (None)
    0xc0, //  End Collection
    0x05, 0x0f, //  Usage Page (Physical Input Device)
    0x09, 0x92, //  Usage (0x92)
    0xa1, 0x02, //  Collection (Logical)
    0x85, 0x02, //   Report ID (2)
    0x09, 0xa0, //   Usage (0xa0)
    0x09, 0x9f, //   Usage (0x9f)
    0x25, 0x01, //   Logical Maximum (1)
    0x45, 0x00, //   Physical Maximum (0)
    0x75, 0x01, //   Report Size (1)
    0x95, 0x02, //   Report Count (2)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x75, 0x06, //   Report Size (6)
    0x95, 0x01, //   Report Count (1)
    0x81, 0x03, //   Input (Cnst,Var,Abs)
    0x09, 0x22, //   Usage (0x22)
    0x75, 0x07, //   Report Size (7)
    0x25, 0x7f, //   Logical Maximum (127)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0x09, 0x94, //   Usage (0x94)
    0x75, 0x01, //   Report Size (1)
    0x25, 0x01, //   Logical Maximum (1)
    0x81, 0x02, //   Input (Data,Var,Abs)
    0xc0, //  End Collection
    0xc0, // End Collection
  ];

  /// Standard boot protocol keyboard, unnumbered reports.
  pub(crate) static KEYBOARD_DESCRIPTOR: &[u8] = &[
    0x05, 0x01, // Usage Page (Generic Desktop)
    0x09, 0x06, // Usage (Keyboard)
    0xa1, 0x01, // Collection (Application)
    0x05, 0x07, //  Usage Page (Keyboard)
    0x19, 0xe0, //  Usage Minimum (224)
    0x29, 0xe7, //  Usage Maximum (231)
    0x15, 0x00, //  Logical Minimum (0)
    0x25, 0x01, //  Logical Maximum (1)
    0x75, 0x01, //  Report Size (1)
    0x95, 0x08, //  Report Count (8)
    0x81, 0x02, //  Input (Data,Var,Abs)
    0x95, 0x01, //  Report Count (1)
    0x75, 0x08, //  Report Size (8)
    0x81, 0x01, //  Input (Cnst,Arr,Abs)
    0x95, 0x05, //  Report Count (5)
    0x75, 0x01, //  Report Size (1)
    0x05, 0x08, //  Usage Page (LEDs)
    0x19, 0x01, //  Usage Minimum (1)
    0x29, 0x05, //  Usage Maximum (5)
    0x91, 0x02, //  Output (Data,Var,Abs)
    0x95, 0x01, //  Report Count (1)
    0x75, 0x03, //  Report Size (3)
    0x91, 0x01, //  Output (Cnst,Arr,Abs)
    0x95, 0x06, //  Report Count (6)
    0x75, 0x08, //  Report Size (8)
    0x15, 0x00, //  Logical Minimum (0)
    0x25, 0x65, //  Logical Maximum (101)
    0x05, 0x07, //  Usage Page (Keyboard)
    0x19, 0x00, //  Usage Minimum (0)
    0x29, 0x65, //  Usage Maximum (101)
    0x81, 0x00, //  Input (Data,Arr,Abs)
    0xc0, // End Collection
  ];

  #[test]
  fn gamepad_descriptor_should_build_collection_tree() {
    let descriptor = ReportDescriptor::parse(GAMEPAD_DESCRIPTOR).unwrap();

    assert_eq!(descriptor.collections.len(), 1);
    let application = &descriptor.collections[0];
    assert_eq!(application.kind, CollectionKind::Application);
    assert_eq!(application.usage, Usage::from(0x0001_0004)); //Joystick
    assert_eq!(application.collections.len(), 2);
    assert!(application.reports.is_empty());

    let physical = &application.collections[0];
    assert_eq!(physical.kind, CollectionKind::Physical);
    assert_eq!(physical.usage, Usage::from(0x0001_0001)); //Pointer
    assert_eq!(physical.reports, [(ReportKind::Input, ReportId::from(1))]);

    let logical = &application.collections[1];
    assert_eq!(logical.kind, CollectionKind::Logical);
    assert_eq!(logical.usage, Usage::from(0x000f_0092));
    assert_eq!(logical.reports, [(ReportKind::Input, ReportId::from(2))]);
  }

  #[test]
  fn gamepad_descriptor_should_lay_out_report_fields() {
    let descriptor = ReportDescriptor::parse(GAMEPAD_DESCRIPTOR).unwrap();
    assert_eq!(descriptor.input_reports.len(), 2);
    assert!(descriptor.uses_report_ids());

    let report = descriptor.input_report(1).unwrap();
    assert_eq!(report.application, Usage::from(0x0001_0004));
    assert_eq!(report.size_in_bits, 48);
    assert_eq!(report.size_in_bytes(), 6);
    assert_eq!(report.fields.len(), 18); //4 axes + 12 buttons + padding + hat

    let expected_axes =
      [(0u32, 0x0001_0030u32), (8, 0x0001_0031), (16, 0x0002_00ba), (24, 0x0002_00bb)];
    for (index, (offset, usage)) in expected_axes.into_iter().enumerate() {
      let Field::Variable(field) = &report.fields[index] else { panic!("axis should be a variable field") };
      assert_eq!(field.bits, offset..offset + 8);
      assert_eq!(field.usage, Usage::from(usage));
      assert_eq!(i32::from(field.logical_minimum), 0);
      assert_eq!(i32::from(field.logical_maximum), 255);
    }

    for button in 0..12u32 {
      let Field::Variable(field) = &report.fields[4 + button as usize] else {
        panic!("button should be a variable field")
      };
      assert_eq!(field.bits, 32 + button..33 + button);
      assert_eq!(field.usage, Usage::from(0x0009_0001 + button));
      assert_eq!(i32::from(field.logical_maximum), 1);
    }

    let Field::Padding(padding) = &report.fields[16] else { panic!("expected zero-width padding") };
    assert_eq!(padding.bits, 44..44);

    let Field::Variable(hat) = &report.fields[17] else { panic!("hat should be a variable field") };
    assert_eq!(hat.bits, 44..48);
    assert_eq!(hat.usage, Usage::from(0x0001_0039));
    assert_eq!(i32::from(hat.logical_maximum), 7);
    assert_eq!(i32::from(hat.physical_maximum), 315);
    assert_eq!(u32::from(hat.unit), 0x44);
    assert!(hat.flags.null_state && hat.flags.variable);

    let vendor = descriptor.input_report(2).unwrap();
    assert_eq!(vendor.size_in_bits, 16);
    assert_eq!(vendor.fields.len(), 5);
    let Field::Variable(field) = &vendor.fields[0] else { panic!() };
    assert_eq!((field.bits.clone(), field.usage), (0..1, Usage::from(0x000f_00a0)));
    let Field::Variable(field) = &vendor.fields[1] else { panic!() };
    assert_eq!((field.bits.clone(), field.usage), (1..2, Usage::from(0x000f_009f)));
    let Field::Padding(field) = &vendor.fields[2] else { panic!() };
    assert_eq!(field.bits, 2..8);
    let Field::Variable(field) = &vendor.fields[3] else { panic!() };
    assert_eq!((field.bits.clone(), field.usage), (8..15, Usage::from(0x000f_0022)));
    let Field::Variable(field) = &vendor.fields[4] else { panic!() };
    assert_eq!(field.bits, 15..16);

    assert_eq!(descriptor.input_report(3), Err(HidError::UnknownReportId(3)));
  }

  #[test]
  fn keyboard_descriptor_should_build_unnumbered_reports() {
    let descriptor = ReportDescriptor::parse(KEYBOARD_DESCRIPTOR).unwrap();
    assert!(!descriptor.uses_report_ids());

    let input = descriptor.input_report(0).unwrap();
    assert_eq!(input.size_in_bits, 64);
    assert_eq!(input.application, Usage::from(0x0001_0006));
    assert_eq!(input.fields.len(), 15); //8 modifiers + reserved byte + 6 key slots

    let Field::Variable(first_modifier) = &input.fields[0] else { panic!() };
    assert_eq!(first_modifier.usage, Usage::from(0x0007_00e0));
    let Field::Variable(last_modifier) = &input.fields[7] else { panic!() };
    assert_eq!(last_modifier.usage, Usage::from(0x0007_00e7));
    let Field::Padding(reserved) = &input.fields[8] else { panic!() };
    assert_eq!(reserved.bits, 8..16);
    for slot in 0..6u32 {
      let Field::Array(key) = &input.fields[9 + slot as usize] else { panic!("key slot should be an array field") };
      assert_eq!(key.bits, 16 + slot * 8..24 + slot * 8);
      assert_eq!(key.usage_list.len(), 1);
      assert_eq!(key.usage_list[0].range(), 0x0007_0000..=0x0007_0065);
      assert_eq!(i32::from(key.logical_maximum), 101);
    }

    let output = descriptor.output_report(0).unwrap();
    assert_eq!(output.size_in_bits, 8);
    assert_eq!(output.fields.len(), 6);
    let Field::Variable(num_lock) = &output.fields[0] else { panic!() };
    assert_eq!(num_lock.usage, Usage::from(0x0008_0001));
    let Field::Padding(filler) = &output.fields[5] else { panic!() };
    assert_eq!(filler.bits, 5..8);

    assert_eq!(descriptor.application_report(ReportKind::Input, Usage::from(0x0001_0006)).map(|r| r.size_in_bits), Some(64));
  }

  #[test]
  fn push_pop_should_save_and_restore_global_state() {
    let descriptor = ReportDescriptor::parse(&[
      0x05, 0x01, // Usage Page (Generic Desktop)
      0x09, 0x02, // Usage (Mouse)
      0xa1, 0x01, // Collection (Application)
      0x09, 0x30, //  Usage (X)
      0x15, 0x00, //  Logical Minimum (0)
      0x25, 0x7f, //  Logical Maximum (127)
      0x75, 0x08, //  Report Size (8)
      0x95, 0x01, //  Report Count (1)
      0xa4, //  Push
      0x26, 0xff, 0x00, //  Logical Maximum (255)
      0x81, 0x02, //  Input (Data,Var,Abs)
      0xb4, //  Pop
      0x09, 0x31, //  Usage (Y)
      0x81, 0x02, //  Input (Data,Var,Abs)
      0xc0, // End Collection
    ])
    .unwrap();

    let report = descriptor.input_report(0).unwrap();
    let Field::Variable(x) = &report.fields[0] else { panic!() };
    assert_eq!(i32::from(x.logical_maximum), 255);
    let Field::Variable(y) = &report.fields[1] else { panic!() };
    assert_eq!(i32::from(y.logical_maximum), 127);
  }

  #[test]
  fn structural_errors_should_be_reported() {
    assert_eq!(ReportDescriptor::parse(&[0xc0]), Err(HidError::UnbalancedCollection));
    assert_eq!(
      ReportDescriptor::parse(&[0x05, 0x01, 0x09, 0x04, 0xa1, 0x01]),
      Err(HidError::UnterminatedCollection)
    );
    assert_eq!(
      ReportDescriptor::parse(&[0xb4]),
      Err(HidError::MalformedDescriptor { offset: 0, reason: "pop without matching push" })
    );
    assert_eq!(
      ReportDescriptor::parse(&[0x05, 0x01, 0xa9, 0x01]),
      Err(HidError::MalformedDescriptor { offset: 1, reason: "delimiter items are not supported" })
    );
  }

  #[test]
  fn parsing_should_be_idempotent() {
    let first = ReportDescriptor::parse(GAMEPAD_DESCRIPTOR).unwrap();
    let second = ReportDescriptor::parse(GAMEPAD_DESCRIPTOR).unwrap();
    assert_eq!(first, second);
  }

  #[test]
  fn hex_and_binary_parses_should_agree() {
    use alloc::vec::Vec;
    let hex = GAMEPAD_DESCRIPTOR.iter().map(|byte| alloc::format!("{byte:02x}")).collect::<Vec<_>>().join(" ");
    let from_hex = ReportDescriptor::from_hex(&hex).unwrap();
    let from_human = ReportDescriptor::from_human(&hex).unwrap();
    assert_eq!(from_hex, ReportDescriptor::parse(GAMEPAD_DESCRIPTOR).unwrap());
    assert_eq!(from_human, from_hex);
  }
}
