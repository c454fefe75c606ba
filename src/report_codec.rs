//! Report Packing and Unpacking
//!
//! Converts between field value assignments and wire report buffers using the bit-exact layout
//! the descriptor builder produced. Values are placed LSB-first at their field's bit range,
//! little-endian across byte boundaries, in two's complement at field width when the field's
//! logical minimum is negative. Numbered reports carry their id as a leading byte; unnumbered
//! reports (id 0) never do.
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use crate::data_types::{ReportId, Usage};
use crate::descriptor_parser::{Field, Report, ReportDescriptor, ReportKind};
use crate::error::HidError;
use crate::usage_tables;
use alloc::format;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

fn write_bits(buffer: &mut [u8], bits: &Range<u32>, value: u64) {
  for (n, bit_index) in bits.clone().enumerate() {
    let byte = (bit_index / 8) as usize;
    let shift = bit_index % 8;
    //fields wider than the value carry zeros in their upper bits
    let bit_set = n < 64 && (value >> n) & 1 != 0;
    if bit_set {
      buffer[byte] |= 1 << shift;
    } else {
      buffer[byte] &= !(1 << shift);
    }
  }
}

fn read_bits(buffer: &[u8], bits: &Range<u32>) -> u64 {
  let mut value = 0u64;
  for (n, bit_index) in bits.clone().enumerate() {
    if n >= 64 {
      break;
    }
    let byte = (bit_index / 8) as usize;
    let shift = bit_index % 8;
    if (buffer[byte] >> shift) & 1 != 0 {
      value |= 1 << n;
    }
  }
  value
}

fn sign_extend(value: u64, width: u32) -> i64 {
  if width == 0 || width >= 64 {
    return value as i64;
  }
  let shift = 64 - width;
  ((value << shift) as i64) >> shift
}

fn width_mask(width: u32) -> u64 {
  if width >= 64 {
    u64::MAX
  } else {
    (1u64 << width) - 1
  }
}

fn field_logical_range(field: &Field) -> Option<(i64, i64)> {
  match field {
    Field::Variable(field) => Some((i32::from(field.logical_minimum) as i64, i32::from(field.logical_maximum) as i64)),
    Field::Array(field) => Some((i32::from(field.logical_minimum) as i64, i32::from(field.logical_maximum) as i64)),
    Field::Padding(_) => None,
  }
}

fn field_accepts_null_values(field: &Field) -> bool {
  match field {
    Field::Variable(field) => field.flags.null_state,
    Field::Array(field) => field.flags.null_state,
    Field::Padding(_) => false,
  }
}

/// Whether `value` is representable in the field's bit range given its signedness.
fn value_fits_width(value: i64, width: u32, signed: bool) -> bool {
  if signed {
    let half = width_mask(width.saturating_sub(1)) as i64;
    value >= -half - 1 && value <= half
  } else {
    value >= 0 && (value as u64) <= width_mask(width)
  }
}

/// Ordered value assignment for [`Report::pack`]. Values address variable fields by usage or any
/// value-carrying field (arrays included) by index among the report's value-carrying fields.
#[derive(Debug, Default, Clone)]
pub struct ReportValues {
  by_usage: Vec<(Usage, i64)>,
  by_index: Vec<(usize, i64)>,
}

impl ReportValues {
  pub fn new() -> Self {
    ReportValues::default()
  }

  pub fn set(&mut self, usage: impl Into<Usage>, value: i64) -> &mut Self {
    self.by_usage.push((usage.into(), value));
    self
  }

  pub fn set_page_and_id(&mut self, page: u16, id: u16, value: i64) -> &mut Self {
    self.set(((page as u32) << 16) | id as u32, value)
  }

  pub fn set_index(&mut self, field_index: usize, value: i64) -> &mut Self {
    self.by_index.push((field_index, value));
    self
  }
}

/// One decoded field value. `usage` is the variable field's usage, or the usage an in-range array
/// value selects; out-of-range array values decode with no usage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedEntry {
  pub field_index: usize,
  pub usage: Option<Usage>,
  pub value: i64,
}

/// Ordered decoded view of one report buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedReport {
  pub report_id: ReportId,
  entries: Vec<DecodedEntry>,
}

impl DecodedReport {
  pub fn entries(&self) -> &[DecodedEntry] {
    &self.entries
  }

  /// The first decoded value carrying the given usage.
  pub fn value(&self, usage: impl Into<Usage>) -> Option<i64> {
    let usage = usage.into();
    self.entries.iter().find(|entry| entry.usage == Some(usage)).map(|entry| entry.value)
  }
}

impl Report {
  /// Indices of the fields that carry values (everything but padding), in layout order.
  fn value_field_indices(&self) -> Vec<usize> {
    self.fields.iter().enumerate().filter(|(_, field)| field.carries_value()).map(|(index, _)| index).collect()
  }

  /// The usage of the first variable field whose table name matches, case-insensitively.
  pub fn usage_by_name(&self, name: &str) -> Option<Usage> {
    self.fields.iter().find_map(|field| match field {
      Field::Variable(field) if usage_tables::usage_name(field.usage).eq_ignore_ascii_case(name) => {
        Some(field.usage)
      }
      _ => None,
    })
  }

  fn write_field(&self, payload: &mut [u8], field: &Field, value: i64) -> Result<(), HidError> {
    let bits = field.bits();
    let width = field.width();
    let (min, max) = field_logical_range(field).unwrap_or((0, 0));
    let signed = min < 0;
    if value < min || value > max {
      //fields with a null state accept any value their bit range can hold
      let null_ok = field_accepts_null_values(field) && value_fits_width(value, width, signed);
      if !null_ok {
        let usage = match field {
          Field::Variable(field) => u32::from(field.usage),
          _ => 0,
        };
        return Err(HidError::ValueOutOfRange { usage, value, min, max });
      }
    }
    write_bits(payload, bits, (value as u64) & width_mask(width));
    Ok(())
  }

  /// Packs a value assignment into a wire buffer. Unset fields stay zero; numbered reports are
  /// prefixed with their id byte.
  pub fn pack(&self, values: &ReportValues) -> Result<Vec<u8>, HidError> {
    let mut payload = vec![0u8; self.size_in_bytes()];
    let value_fields = self.value_field_indices();

    for (usage, value) in &values.by_usage {
      let field = self
        .fields
        .iter()
        .find(|field| matches!(field, Field::Variable(variable) if variable.usage == *usage))
        .ok_or_else(|| HidError::UnknownUsageName(usage_tables::usage_name(*usage)))?;
      self.write_field(&mut payload, field, *value)?;
    }
    for (index, value) in &values.by_index {
      let field_index = *value_fields
        .get(*index)
        .ok_or(HidError::FieldCountMismatch { expected: value_fields.len(), found: *index + 1 })?;
      self.write_field(&mut payload, &self.fields[field_index], *value)?;
    }

    Ok(self.frame(payload))
  }

  /// Packs one value per value-carrying field, in layout order.
  pub fn pack_exact(&self, values: &[i64]) -> Result<Vec<u8>, HidError> {
    let value_fields = self.value_field_indices();
    if values.len() != value_fields.len() {
      return Err(HidError::FieldCountMismatch { expected: value_fields.len(), found: values.len() });
    }
    let mut payload = vec![0u8; self.size_in_bytes()];
    for (field_index, value) in value_fields.into_iter().zip(values) {
      self.write_field(&mut payload, &self.fields[field_index], *value)?;
    }
    Ok(self.frame(payload))
  }

  fn frame(&self, payload: Vec<u8>) -> Vec<u8> {
    if self.report_id.is_numbered() {
      let mut framed = Vec::with_capacity(payload.len() + 1);
      framed.push(u8::from(self.report_id));
      framed.extend_from_slice(&payload);
      framed
    } else {
      payload
    }
  }

  fn payload_of<'a>(&self, buffer: &'a [u8]) -> Result<&'a [u8], HidError> {
    let payload = if self.report_id.is_numbered() {
      let (id, payload) = buffer
        .split_first()
        .ok_or(HidError::MalformedDescriptor { offset: 0, reason: "report buffer too short" })?;
      if *id != u8::from(self.report_id) {
        return Err(HidError::UnknownReportId(*id));
      }
      payload
    } else {
      buffer
    };
    if payload.len() != self.size_in_bytes() {
      return Err(HidError::MalformedDescriptor { offset: buffer.len(), reason: "report buffer length mismatch" });
    }
    Ok(payload)
  }

  /// Unpacks a wire buffer into the values of every value-carrying field.
  pub fn unpack(&self, buffer: &[u8]) -> Result<DecodedReport, HidError> {
    let payload = self.payload_of(buffer)?;
    let mut entries = Vec::new();
    for (field_index, field) in self.fields.iter().enumerate() {
      let (min, _) = match field_logical_range(field) {
        Some(range) => range,
        None => continue,
      };
      let raw = read_bits(payload, field.bits());
      let value = if min < 0 { sign_extend(raw, field.width()) } else { raw as i64 };
      let usage = match field {
        Field::Variable(variable) => Some(variable.usage),
        Field::Array(array) => array_usage(array, value),
        Field::Padding(_) => None,
      };
      entries.push(DecodedEntry { field_index, usage, value });
    }
    Ok(DecodedReport { report_id: self.report_id, entries })
  }

  /// Renders a wire buffer as one line per field for debugging.
  pub fn format_report(&self, buffer: &[u8]) -> Result<String, HidError> {
    let decoded = self.unpack(buffer)?;
    let mut out = format!(
      "Report {} ({:?}, {} bits)\n",
      u8::from(self.report_id),
      self.kind,
      self.size_in_bits
    );
    let mut entries = decoded.entries().iter().peekable();
    for (field_index, field) in self.fields.iter().enumerate() {
      match field {
        Field::Padding(padding) => {
          out.push_str(&format!("  padding ({} bits)\n", padding.bits.end - padding.bits.start));
        }
        _ => {
          if let Some(entry) = entries.next_if(|entry| entry.field_index == field_index) {
            let name = match entry.usage {
              Some(usage) => usage_tables::usage_name(usage),
              None => String::from("(no usage)"),
            };
            out.push_str(&format!("  {name}: {}\n", entry.value));
          }
        }
      }
    }
    Ok(out)
  }
}

/// Resolves an in-range array value to the usage it selects by walking the field's usage ranges.
fn array_usage(array: &crate::descriptor_parser::ArrayField, value: i64) -> Option<Usage> {
  let mut offset = value - i32::from(array.logical_minimum) as i64;
  if offset < 0 {
    return None;
  }
  for range in &array.usage_list {
    let span = (range.end() - range.start()) as i64 + 1;
    if offset < span {
      return Some(Usage::from(range.start() + offset as u32));
    }
    offset -= span;
  }
  None
}

impl ReportDescriptor {
  /// Routes a wire buffer to the right input report by its leading id byte (or to the unnumbered
  /// report when the device declares no ids) and unpacks it.
  pub fn decode_input(&self, buffer: &[u8]) -> Result<DecodedReport, HidError> {
    self.decode(ReportKind::Input, buffer)
  }

  pub fn decode_output(&self, buffer: &[u8]) -> Result<DecodedReport, HidError> {
    self.decode(ReportKind::Output, buffer)
  }

  pub fn decode_feature(&self, buffer: &[u8]) -> Result<DecodedReport, HidError> {
    self.decode(ReportKind::Feature, buffer)
  }

  fn decode(&self, kind: ReportKind, buffer: &[u8]) -> Result<DecodedReport, HidError> {
    let id = if self.uses_report_ids() {
      *buffer.first().ok_or(HidError::MalformedDescriptor { offset: 0, reason: "report buffer too short" })?
    } else {
      0
    };
    self.report(kind, id)?.unpack(buffer)
  }
}
