//! Reading and writing points, coefficients and tables.
//!
//! # Formats
//!
//! Both points and coefficients come in a plain text form and a JSON form; the JSON form is
//! selected when the file name ends in `.json` (see [`Format::from_path`]).
//!
//! **Points** (text): whitespace or newline separated `x y` pairs. `#` starts a comment that
//! runs to the end of the line. At least [`MIN_POINTS`] pairs are required.
//! ```text
//! # x   y
//! 0.0   0.0
//! 1.0   1.0
//! 2.0   4.0
//! 3.0   9.0
//! ```
//! **Points** (JSON): an array of `[x, y]` pairs.
//!
//! **Coefficients** (text): the basis size, the domain, then one coefficient per line.
//! Values are written in shortest round-trip exponent form, so reading a file back restores
//! every coefficient bit for bit.
//! ```text
//! 4
//! 0e0 3e0
//! 3e0
//! 4.5e0
//! 1.5e0
//! 0e0
//! ```
//! Files without the domain line (exactly `base` values after the header) are accepted and
//! evaluated over the canonical domain `[-1, 1]`.
//!
//! **Coefficients** (JSON): `{"domain": [x_min, x_max], "coefficients": [...]}`.
//!
//! **Tables**: one `x y` line per sample, ready for gnuplot and friends.
//!
//! # Atomic writes
//! Every `write_*` function writes to a temporary sibling of the destination and renames it
//! into place only once the whole document has been written, so a failed run never leaves a
//! truncated file behind.
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

use crate::{
    error::{Error, Result},
    fit::MIN_POINTS,
    Polynomial,
};

/// On-disk representation, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    /// Whitespace separated text
    #[default]
    Text,

    /// JSON
    Json,
}
impl Format {
    /// `Json` for paths ending in `.json` (any case), `Text` otherwise.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Text,
        }
    }
}

/// Splits text into `(line number, token)` pairs, skipping `#` comments.
fn tokens(text: &str) -> impl Iterator<Item = (usize, &str)> {
    text.lines().enumerate().flat_map(|(i, line)| {
        let content = line.split('#').next().unwrap_or_default();
        content.split_whitespace().map(move |token| (i + 1, token))
    })
}

fn parse_value(what: &'static str, line: usize, token: &str) -> Result<f64> {
    let value: f64 = token
        .parse()
        .map_err(|_| Error::malformed(what, line, format!("`{token}` is not a number")))?;

    if value.is_finite() {
        Ok(value)
    } else {
        Err(Error::malformed(what, line, format!("`{token}` is not finite")))
    }
}

/// Parses text points.
///
/// # Errors
/// Returns [`Error::Malformed`] if a token is not a finite number, the last `x` has no `y`, or
/// there are fewer than [`MIN_POINTS`] pairs.
///
/// # Example
/// ```
/// # use legfit::codec::parse_points;
/// let points = parse_points("0 0\n1 1 # comment\n2 4\n3 9").unwrap();
/// assert_eq!(points[2], (2.0, 4.0));
/// ```
pub fn parse_points(text: &str) -> Result<Vec<(f64, f64)>> {
    const WHAT: &str = "points";

    let mut points = Vec::new();
    let mut pending: Option<f64> = None;
    let mut last_line = 0;
    for (line, token) in tokens(text) {
        let value = parse_value(WHAT, line, token)?;
        last_line = line;
        match pending.take() {
            Some(x) => points.push((x, value)),
            None => pending = Some(value),
        }
    }

    if pending.is_some() {
        return Err(Error::malformed(WHAT, last_line, "x-value without a matching y-value"));
    }

    check_point_count(points)
}

/// Parses JSON points: an array of `[x, y]` pairs.
///
/// # Errors
/// Returns [`Error::Json`] for invalid JSON, and [`Error::Malformed`] for non-finite values or
/// fewer than [`MIN_POINTS`] pairs.
pub fn parse_points_json(text: &str) -> Result<Vec<(f64, f64)>> {
    let points: Vec<(f64, f64)> = serde_json::from_str(text)?;
    if let Some(i) = points
        .iter()
        .position(|(x, y)| !x.is_finite() || !y.is_finite())
    {
        return Err(Error::malformed(
            "points",
            0,
            format!("point {} is not finite", i + 1),
        ));
    }

    check_point_count(points)
}

fn check_point_count(points: Vec<(f64, f64)>) -> Result<Vec<(f64, f64)>> {
    if points.len() < MIN_POINTS {
        return Err(Error::malformed(
            "points",
            0,
            format!(
                "found {} points, at least {MIN_POINTS} are required",
                points.len()
            ),
        ));
    }

    Ok(points)
}

/// Parses text coefficients.
///
/// # Errors
/// - [`Error::Malformed`] if the header is not a non-negative integer, a value is not a finite
///   number, or the number of values does not match the header.
/// - [`Error::InvalidBase`] if the header is zero.
/// - [`Error::DegenerateDomain`] if the stored domain has no width.
pub fn parse_coefficients(text: &str) -> Result<Polynomial> {
    const WHAT: &str = "coefficients";

    let mut tokens = tokens(text);
    let Some((line, header)) = tokens.next() else {
        return Err(Error::malformed(WHAT, 0, "file is empty"));
    };

    let base: usize = header.parse().map_err(|_| {
        Error::malformed(
            WHAT,
            line,
            format!("basis size `{header}` is not a non-negative integer"),
        )
    })?;
    if base == 0 {
        return Err(Error::InvalidBase(0));
    }

    let values = tokens
        .map(|(line, token)| parse_value(WHAT, line, token))
        .collect::<Result<Vec<_>>>()?;

    if values.len() == base {
        Polynomial::canonical(values)
    } else if values.len().checked_sub(2) == Some(base) {
        let domain = (values[0], values[1]);
        Polynomial::new(domain, values[2..].to_vec())
    } else {
        Err(Error::malformed(
            WHAT,
            0,
            format!(
                "expected {base} coefficients, optionally after x_min x_max, found {} values",
                values.len()
            ),
        ))
    }
}

/// Writes coefficients in the text format.
///
/// # Errors
/// Returns any error from the underlying writer.
pub fn encode_coefficients(poly: &Polynomial, sink: &mut impl Write) -> io::Result<()> {
    let (x_min, x_max) = poly.domain();
    writeln!(sink, "{}", poly.base())?;
    writeln!(sink, "{x_min:e} {x_max:e}")?;
    for c in poly.coefficients() {
        writeln!(sink, "{c:e}")?;
    }
    Ok(())
}

/// Writes a table of `(x, y)` pairs, one `x y` line each.
///
/// # Errors
/// Returns any error from the underlying writer.
pub fn encode_table(table: &[(f64, f64)], sink: &mut impl Write) -> io::Result<()> {
    for (x, y) in table {
        writeln!(sink, "{x} {y}")?;
    }
    Ok(())
}

fn read_file(what: &'static str, action: &'static str, path: &Path) -> Result<String> {
    let bytes = fs::read(path).map_err(|e| Error::io(action, path, e))?;
    String::from_utf8(bytes).map_err(|e| {
        let offset = e.utf8_error().valid_up_to();
        Error::malformed(what, 0, format!("not valid UTF-8 (byte {offset})"))
    })
}

/// Reads a point set from a file, in the format implied by its extension.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be read, [`Error::Malformed`] if it is not UTF-8,
/// otherwise see [`parse_points`] and [`parse_points_json`].
pub fn read_points(path: &Path) -> Result<Vec<(f64, f64)>> {
    let text = read_file("points", "read points file", path)?;
    let points = match Format::from_path(path) {
        Format::Text => parse_points(&text)?,
        Format::Json => parse_points_json(&text)?,
    };

    log::info!("read {} points from {}", points.len(), path.display());
    Ok(points)
}

/// Reads a coefficient model from a file, in the format implied by its extension.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be read, [`Error::Malformed`] if it is not UTF-8,
/// otherwise see [`parse_coefficients`].
pub fn read_coefficients(path: &Path) -> Result<Polynomial> {
    let text = read_file("coefficients", "read coefficients file", path)?;
    let poly = match Format::from_path(path) {
        Format::Text => parse_coefficients(&text)?,
        Format::Json => serde_json::from_str(&text)?,
    };

    log::info!("read {} coefficients from {}", poly.base(), path.display());
    Ok(poly)
}

/// Writes a coefficient model to a file, in the format implied by its extension.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be written.
pub fn write_coefficients(path: &Path, poly: &Polynomial) -> Result<()> {
    write_atomic(path, "write coefficients file", |sink| match Format::from_path(path) {
        Format::Text => encode_coefficients(poly, sink),
        Format::Json => {
            serde_json::to_writer_pretty(&mut *sink, poly)?;
            writeln!(sink)
        }
    })?;

    log::info!("wrote {} coefficients to {}", poly.base(), path.display());
    Ok(())
}

/// Writes a table of `(x, y)` pairs to a file.
///
/// # Errors
/// Returns [`Error::Io`] if the file cannot be written.
pub fn write_table(path: &Path, table: &[(f64, f64)]) -> Result<()> {
    write_atomic(path, "write table file", |sink| encode_table(table, sink))?;

    log::info!("wrote {} table rows to {}", table.len(), path.display());
    Ok(())
}

fn temporary_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}

/// Runs `write` against a temporary file, then renames it over `path`.
fn write_atomic(
    path: &Path,
    action: &'static str,
    write: impl FnOnce(&mut BufWriter<File>) -> io::Result<()>,
) -> Result<()> {
    let tmp = temporary_sibling(path);
    let file = File::create(&tmp).map_err(|e| Error::io(action, path, e))?;

    let mut sink = BufWriter::new(file);
    let result = write(&mut sink)
        .and_then(|()| sink.flush())
        .and_then(|()| sink.get_ref().sync_all())
        .and_then(|()| fs::rename(&tmp, path));

    if let Err(e) = result {
        // Best effort; the write error is what matters
        let _ = fs::remove_file(&tmp);
        return Err(Error::io(action, path, e));
    }

    Ok(())
}
