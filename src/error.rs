//! Error Types
//!
//! Defines the single error enum shared by the tokenizer, the descriptor builder, the
//! human-descriptor compiler and the report codec. All variants are final: a failed parse or pack
//! means the caller supplied bad input, there is nothing to retry.
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use alloc::string::String;
use thiserror::Error;

/// Errors produced while parsing descriptors or packing/unpacking reports.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HidError {
  /// Truncated or invalid item encoding. `offset` is a byte offset when the input was a raw
  /// descriptor, an item ordinal when the input was an already-tokenized item stream, and a
  /// buffer length when a report buffer is shorter than the report it is decoded against.
  #[error("malformed descriptor at offset {offset}: {reason}")]
  MalformedDescriptor { offset: usize, reason: &'static str },

  /// An `End Collection` item appeared with no open collection.
  #[error("end collection without a matching collection")]
  UnbalancedCollection,

  /// The descriptor ended with one or more collections still open.
  #[error("descriptor ended with an open collection")]
  UnterminatedCollection,

  /// The human-descriptor compiler could not resolve a usage/page/flag name.
  #[error("unknown usage name: {0:?}")]
  UnknownUsageName(String),

  /// The codec was asked for a report id that the descriptor does not define.
  #[error("no report with id {0}")]
  UnknownReportId(u8),

  /// A value supplied to `pack` lies outside the field's logical range.
  #[error("value {value} for usage {usage:#010x} outside logical range {min}..={max}")]
  ValueOutOfRange { usage: u32, value: i64, min: i64, max: i64 },

  /// The number of supplied values does not match the report's value-carrying field count.
  #[error("expected {expected} report values, found {found}")]
  FieldCountMismatch { expected: usize, found: usize },
}
