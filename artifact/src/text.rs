//! Whitespace-delimited text tables.
//!
//! One row per line, values separated by a single space, `\n` line endings.
//! Integers are written without decimals and floats with 16 fixed decimals
//! so that an f32 reloads to the identical value.

use std::fmt::Display;
use std::io::{self, Write};
use std::path::Path;
use std::str::FromStr;

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};

use crate::ArtifactError;

/// Writes a vector as a single column.
pub fn write_column<W: Write>(w: &mut W, values: ArrayView1<'_, i64>) -> io::Result<()> {
    for v in values {
        writeln!(w, "{v}")?;
    }
    Ok(())
}

/// Writes an integer matrix, one row per line.
pub fn write_int_rows<W: Write>(w: &mut W, rows: ArrayView2<'_, i64>) -> io::Result<()> {
    write_rows(w, rows, |w, v| write!(w, "{v}"))
}

/// Writes a float matrix with 16 fixed decimals per value.
pub fn write_float_rows<W: Write>(w: &mut W, rows: ArrayView2<'_, f32>) -> io::Result<()> {
    write_rows(w, rows, |w, v| write!(w, "{v:.16}"))
}

fn write_rows<W, T, F>(w: &mut W, rows: ArrayView2<'_, T>, mut cell: F) -> io::Result<()>
where
    W: Write,
    F: FnMut(&mut W, &T) -> io::Result<()>,
{
    for row in rows.rows() {
        for (i, v) in row.iter().enumerate() {
            if i > 0 {
                w.write_all(b" ")?;
            }
            cell(w, v)?;
        }
        w.write_all(b"\n")?;
    }
    Ok(())
}

/// Parses a single-column table.
pub fn parse_column<T>(path: &Path, text: &str) -> Result<Array1<T>, ArtifactError>
where
    T: FromStr,
    T::Err: Display,
{
    let rows = parse_table::<T>(path, text)?;
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.into_iter().enumerate() {
        if row.len() != 1 {
            return Err(parse_err(path, i + 1, format!("expected 1 value, got {}", row.len())));
        }
        out.extend(row);
    }
    Ok(Array1::from(out))
}

/// Parses a rectangular table. An empty input yields a 0 x 0 matrix.
pub fn parse_matrix<T>(path: &Path, text: &str) -> Result<Array2<T>, ArtifactError>
where
    T: FromStr,
    T::Err: Display,
{
    let rows = parse_table::<T>(path, text)?;
    let cols = rows.first().map(Vec::len).unwrap_or(0);
    let mut flat = Vec::with_capacity(rows.len() * cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != cols {
            return Err(parse_err(
                path,
                i + 1,
                format!("expected {cols} values, got {}", row.len()),
            ));
        }
    }
    let n = rows.len();
    for row in rows {
        flat.extend(row);
    }
    Array2::from_shape_vec((n, cols), flat).map_err(|e| parse_err(path, 0, e.to_string()))
}

fn parse_table<T>(path: &Path, text: &str) -> Result<Vec<Vec<T>>, ArtifactError>
where
    T: FromStr,
    T::Err: Display,
{
    text.lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            line.split_whitespace()
                .map(|tok| {
                    tok.parse::<T>()
                        .map_err(|e| parse_err(path, i + 1, format!("{tok:?}: {e}")))
                })
                .collect::<Result<Vec<T>, _>>()
        })
        .collect()
}

fn parse_err(path: &Path, line: usize, reason: String) -> ArtifactError {
    ArtifactError::Parse {
        path: path.to_path_buf(),
        line,
        reason,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn render<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn integers_have_no_decimals() {
        let s = render(|w| write_int_rows(w, array![[0i64, 1], [1, 0]].view()));
        assert_eq!(s, "0 1\n1 0\n");
        let s = render(|w| write_column(w, array![3i64, 17, 0].view()));
        assert_eq!(s, "3\n17\n0\n");
    }

    #[test]
    fn floats_have_sixteen_decimals() {
        let s = render(|w| write_float_rows(w, array![[0.5f32, -1.0]].view()));
        assert_eq!(s, "0.5000000000000000 -1.0000000000000000\n");
    }

    #[test]
    fn float_text_reloads_within_tolerance() {
        let m = array![[0.1f32, -3.25e-3, 1234.5678], [f32::MIN_POSITIVE, 7.0, -0.0]];
        let s = render(|w| write_float_rows(w, m.view()));
        let back: Array2<f32> = parse_matrix(Path::new("m.txt"), &s).unwrap();
        assert_eq!(back.dim(), m.dim());
        for (a, b) in m.iter().zip(back.iter()) {
            assert!((*a as f64 - *b as f64).abs() <= 1e-12, "{a} vs {b}");
        }
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_matrix::<i64>(Path::new("x.txt"), "1 2\n3\n").unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { line: 2, .. }));
    }

    #[test]
    fn bad_token_reports_line() {
        let err = parse_column::<i64>(Path::new("x.txt"), "1\n2\nabc\n").unwrap_err();
        assert!(matches!(err, ArtifactError::Parse { line: 3, .. }));
    }

    #[test]
    fn empty_table() {
        let m: Array2<i64> = parse_matrix(Path::new("e.txt"), "").unwrap();
        assert_eq!(m.dim(), (0, 0));
        let v: Array1<i64> = parse_column(Path::new("e.txt"), "").unwrap();
        assert!(v.is_empty());
    }
}
