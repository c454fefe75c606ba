//! HID Report Descriptor Dump Utility
//!
//! Command line utility that parses a report descriptor and prints every report with resolved
//! usage names. Input may be a raw binary descriptor, hex byte pairs, or the human-readable
//! mnemonic syntax; the format is detected from the file contents unless given explicitly.
//!
//! # Usage
//!
//! `hidcodec --path ./samples/boot_keyboard.bin`
//!
//! or
//!
//! `cargo run --features cli -- --path ./samples/gamepad.hex --report-type input`
//!
//! ## License
//!
//! SPDX-License-Identifier: BSD-2-Clause-Patent
//!
use std::fs;

use clap::{Parser, ValueEnum};
use hidcodec::{usage_tables, Field, ReportDescriptor, ReportKind};

#[derive(Parser, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ReportType {
  Input,
  Output,
  Feature,
}

impl From<ReportType> for ReportKind {
  fn from(report_type: ReportType) -> Self {
    match report_type {
      ReportType::Input => ReportKind::Input,
      ReportType::Output => ReportKind::Output,
      ReportType::Feature => ReportKind::Feature,
    }
  }
}

#[derive(Parser, Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
  /// Detect from the file contents.
  Auto,
  /// Raw binary descriptor.
  Bin,
  /// Whitespace-separated hex byte pairs.
  Hex,
  /// Mnemonic text, one item per line.
  Text,
}

/// Arguments
#[derive(Parser, Debug)]
struct Arguments {
  /// The path of the descriptor file.
  #[arg(short, long)]
  path: std::path::PathBuf,

  /// Input format of the descriptor file (detected from the contents when omitted).
  #[arg(short, long, value_enum)]
  format: Option<Format>,

  /// Type of report to list.
  #[arg(short, long)]
  report_type: Option<ReportType>,

  /// Id of report to list.
  #[arg(short = 'i', long)]
  report_id: Option<u8>,
}

fn parse_file(path: &std::path::Path, format: Format) -> ReportDescriptor {
  let parsed = match format {
    Format::Bin => {
      let raw = fs::read(path).expect("Failed to read descriptor file");
      ReportDescriptor::parse(&raw)
    }
    Format::Hex => {
      let text = fs::read_to_string(path).expect("Failed to read descriptor file");
      ReportDescriptor::from_hex(&text)
    }
    Format::Text => {
      let text = fs::read_to_string(path).expect("Failed to read descriptor file");
      ReportDescriptor::from_human(&text)
    }
    Format::Auto => {
      let raw = fs::read(path).expect("Failed to read descriptor file");
      match std::str::from_utf8(&raw) {
        Ok(text) => ReportDescriptor::from_human(text),
        Err(_) => ReportDescriptor::parse(&raw),
      }
    }
  };
  parsed.expect("Failed to parse descriptor")
}

fn main() {
  let args = Arguments::parse();
  let descriptor = parse_file(&args.path, args.format.unwrap_or(Format::Auto));

  let mut reports: Vec<_> = std::iter::repeat(ReportType::Input).zip(&descriptor.input_reports).collect();
  reports.extend(std::iter::repeat(ReportType::Output).zip(&descriptor.output_reports));
  reports.extend(std::iter::repeat(ReportType::Feature).zip(&descriptor.feature_reports));

  let filtered_reports = reports.iter().filter(|(report_type, report)| {
    if let Some(requested_type) = args.report_type {
      if requested_type != *report_type {
        return false;
      }
    }
    if let Some(requested_id) = args.report_id {
      if u8::from(report.report_id) != requested_id {
        return false;
      }
    }
    true
  });

  for (report_type, report) in filtered_reports {
    println!(
      "{report_type:?} report {} ({} bits, application: {})",
      u8::from(report.report_id),
      report.size_in_bits,
      usage_tables::usage_name(report.application),
    );
    for field in &report.fields {
      let bits = field.bits();
      if bits.len() == 1 {
        print!("\tbit:  {:?}\t", bits.start);
      } else {
        print!("\tbits: {:?}..{:?}\t", bits.start, bits.end);
      }
      match field {
        Field::Variable(v) => {
          println!(
            "{} / {}",
            usage_tables::page_name(v.usage.page()),
            usage_tables::usage_name(v.usage),
          );
        }
        Field::Array(a) => {
          let usages: Vec<String> = a
            .usage_list
            .iter()
            .map(|range| format!("0x{:08x}..=0x{:08x}", range.start(), range.end()))
            .collect();
          println!("array, usages: {}", usages.join(", "));
        }
        Field::Padding(_) => {
          println!("padding");
        }
      }
    }
  }
}
