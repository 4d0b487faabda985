//! Plain-text field export.
//!
//! Only the header is written:
//!
//! ```text
//! # SymmetryField Export
//! # nx=<nx> ny=<ny> nz=<nz>
//! # time=<t>
//! ```
//!
//! The time is printed in `%g` style with six significant digits, so
//! accumulated rounding in t does not leak into the header.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use log::debug;

use crate::error::FieldResult;
use crate::field::SymmetryField;

/// Significant digits of the header time.
const TIME_PRECISION: i32 = 6;

/// `%g`-style formatting with `TIME_PRECISION` significant digits: trailing
/// zeros dropped, exponent form when the decimal exponent is below −4 or at
/// least the precision.
fn format_general(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }

    // Rounding to the target precision fixes the exponent (9.9999995 → 1e1).
    let sci = format!("{:.*e}", (TIME_PRECISION - 1) as usize, value);
    let (mantissa, exponent) = match sci.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (sci.as_str(), 0),
    };

    if exponent < -4 || exponent >= TIME_PRECISION {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exponent.abs())
    } else {
        let decimals = (TIME_PRECISION - 1 - exponent) as usize;
        trim_fraction(&format!("{:.*}", decimals, value)).to_string()
    }
}

fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

impl SymmetryField {
    /// Write the export header to any sink.
    pub fn write_header<W: Write>(&self, out: &mut W) -> FieldResult<()> {
        writeln!(out, "# SymmetryField Export")?;
        writeln!(out, "# nx={} ny={} nz={}", self.dims.nx, self.dims.ny, self.dims.nz)?;
        writeln!(out, "# time={}", format_general(self.current_time))?;
        Ok(())
    }

    /// Create or truncate `path` and write the export header to it.
    pub fn export_to_file<P: AsRef<Path>>(&self, path: P) -> FieldResult<()> {
        let path = path.as_ref();
        let mut out = BufWriter::new(File::create(path)?);
        self.write_header(&mut out)?;
        out.flush()?;
        debug!("exported field header to {}", path.display());
        Ok(())
    }
}
