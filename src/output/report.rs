#![forbid(unsafe_code)]

//! Check report formatters (human and JSON)
//!
//! The human formatter colors its output through `termcolor`; the JSON
//! formatter prints a single `{ valid, errors, values }` object.

use crate::output::extract::{ErrorReport, ROOT_KEY, ValueReport, collect_errors, collect_values};
use crate::result::GroupResult;
use serde::Serialize;
use serde_json::Value;
use std::io;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Summary of one run: overall validity plus both projections
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub valid: bool,
    pub errors: ErrorReport,
    pub values: ValueReport,
}

impl Report {
    pub fn from_result(result: &GroupResult) -> Self {
        Self {
            valid: result.valid,
            errors: collect_errors(result, ROOT_KEY),
            values: collect_values(result),
        }
    }
}

/// Human-readable formatter for check reports
pub struct HumanFormatter {
    color: ColorChoice,
}

impl HumanFormatter {
    pub fn new(color: ColorChoice) -> Self {
        Self { color }
    }

    /// Write the report to any color-capable writer
    pub fn write<W: WriteColor>(&self, out: &mut W, report: &Report) -> io::Result<()> {
        if report.valid {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            write!(out, "✓")?;
            out.reset()?;
            writeln!(out, " all fields valid")?;
        } else {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Red)).set_bold(true))?;
            write!(out, "✗")?;
            out.reset()?;
            writeln!(out, " {} failing entr{}", report.errors.len(), plural_y(report.errors.len()))?;
            writeln!(out)?;

            for (name, errors) in &report.errors {
                out.set_color(ColorSpec::new().set_bold(true))?;
                writeln!(out, "  {}", name)?;
                out.reset()?;
                for (rule, options) in errors {
                    out.set_color(ColorSpec::new().set_fg(Some(Color::Red)))?;
                    write!(out, "    {}", rule)?;
                    out.reset()?;
                    if options.is_empty() {
                        writeln!(out)?;
                    } else {
                        writeln!(out, " {}", Value::Array(options.clone()))?;
                    }
                }
            }
        }

        if !report.values.is_empty() {
            writeln!(out)?;
            writeln!(out, "Values:")?;
            for (name, value) in &report.values {
                match value {
                    Some(value) => writeln!(out, "  {} = {}", name, value)?,
                    None => {
                        write!(out, "  {} = ", name)?;
                        out.set_color(ColorSpec::new().set_dimmed(true))?;
                        write!(out, "(absent)")?;
                        out.reset()?;
                        writeln!(out)?;
                    }
                }
            }
        }

        Ok(())
    }

    /// Write the report to stdout
    pub fn write_to_stdout(&self, report: &Report) -> io::Result<()> {
        let mut stdout = StandardStream::stdout(self.color);
        self.write(&mut stdout, report)
    }
}

impl Default for HumanFormatter {
    fn default() -> Self {
        Self::new(ColorChoice::Auto)
    }
}

fn plural_y(count: usize) -> &'static str {
    if count == 1 { "y" } else { "ies" }
}

/// JSON formatter for check reports
pub struct JsonFormatter;

impl JsonFormatter {
    pub fn new() -> Self {
        JsonFormatter
    }

    pub fn format(&self, report: &Report) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(report)
    }

    /// Write the formatted output to stdout
    pub fn write_to_stdout(&self, report: &Report) -> Result<(), serde_json::Error> {
        println!("{}", self.format(report)?);
        Ok(())
    }
}

impl Default for JsonFormatter {
    fn default() -> Self {
        Self::new()
    }
}
