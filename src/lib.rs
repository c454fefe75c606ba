//! HID Report Descriptor Codec
//!
//! This crate parses HID report descriptors into a structured model (collection tree plus
//! input/output/feature reports with bit-exact field layout) and packs/unpacks wire report
//! buffers against that model. Descriptors can be given as raw bytes, hex pairs, or the
//! human-readable mnemonic syntax; all three front ends produce the same model.
//!
//! Refer to the USB Device Class Definition for Human Interface Devices (HID) Version 1.11
//! <https://www.usb.org/sites/default/files/hid1_11.pdf>
//!
//! ## Example
//! ```
//! # use hidcodec::{parse_report_descriptor, Field, ReportValues};
//!
//!   let BOOT_KEYBOARD_REPORT_DESCRIPTOR: &[u8] = &[
//!     0x05, 0x01, // Usage Page (Generic Desktop)
//!     0x09, 0x06, // Usage (Keyboard)
//!     0xa1, 0x01, // Collection (Application)
//!     0x05, 0x07, //  Usage Page (Keyboard)
//!     0x19, 0xe0, //  Usage Minimum (224)
//!     0x29, 0xe7, //  Usage Maximum (231)
//!     0x15, 0x00, //  Logical Minimum (0)
//!     0x25, 0x01, //  Logical Maximum (1)
//!     0x75, 0x01, //  Report Size (1)
//!     0x95, 0x08, //  Report Count (8)
//!     0x81, 0x02, //  Input (Data,Var,Abs)     modifier bits
//!     0x95, 0x01, //  Report Count (1)
//!     0x75, 0x08, //  Report Size (8)
//!     0x81, 0x01, //  Input (Cnst,Arr,Abs)     reserved byte
//!     0x95, 0x06, //  Report Count (6)
//!     0x15, 0x00, //  Logical Minimum (0)
//!     0x25, 0x65, //  Logical Maximum (101)
//!     0x19, 0x00, //  Usage Minimum (0)
//!     0x29, 0x65, //  Usage Maximum (101)
//!     0x81, 0x00, //  Input (Data,Arr,Abs)     key code slots
//!     0xc0, // End Collection
//!   ];
//!
//!   let descriptor = parse_report_descriptor(BOOT_KEYBOARD_REPORT_DESCRIPTOR).unwrap();
//!
//!   // a single unnumbered input report: 8 modifier bits, a reserved byte, 6 key slots.
//!   assert_eq!(descriptor.input_reports.len(), 1);
//!   assert!(!descriptor.uses_report_ids());
//!   let report = descriptor.input_report(0).unwrap();
//!   assert_eq!(report.size_in_bits, 64);
//!
//!   // field 4 is right control: Usage Page 7, Usage 0xE4, occupying bit 4.
//!   let Field::Variable(ref field) = report.fields[4] else { panic!("unexpected field type") };
//!   assert_eq!(u32::from(field.usage), 0x0007_00e4);
//!   assert_eq!(field.bits, 4..5);
//!
//!   // press left shift and the 'a' key, then decode the resulting buffer.
//!   let mut values = ReportValues::new();
//!   values.set(0x0007_00e1u32, 1).set_index(8, 0x04);
//!   let buffer = report.pack(&values).unwrap();
//!   assert_eq!(buffer, [0x02, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00]);
//!
//!   let decoded = report.unpack(&buffer).unwrap();
//!   assert_eq!(decoded.value(0x0007_00e1u32), Some(1));
//! ```
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!

#![cfg_attr(not(any(test, feature = "std")), no_std)]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod data_types;
pub mod descriptor_parser;
mod error;
pub mod human_descriptor;
pub mod item_tokenizer;
pub mod report_codec;
pub mod usage_tables;
mod utils;

pub use data_types::{MainFlags, ReportId, Usage, UsagePage, UsageRange};
pub use descriptor_parser::{
  ArrayField, Collection, CollectionKind, Field, PaddingField, Report, ReportDescriptor, ReportKind, VariableField,
};
pub use error::HidError;
pub use human_descriptor::{compile_human, compile_human_bytes};
pub use item_tokenizer::{parse_hex, tokenize, Item, ItemKind, ItemTag, ItemTokenizer};
pub use report_codec::{DecodedEntry, DecodedReport, ReportValues};

/// Parses a raw binary report descriptor. Shorthand for [`ReportDescriptor::parse`].
pub fn parse_report_descriptor(descriptor: &[u8]) -> Result<ReportDescriptor, HidError> {
  ReportDescriptor::parse(descriptor)
}
