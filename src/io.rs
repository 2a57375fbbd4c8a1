//! Writers for sweep results.
//!
//! - `bands`: one row per k-point, `k_dist kx ky kz E_1 .. E_N`, the layout
//!   of a BAND.dat file.
//! - `full`: per k-point blocks with eigenvalues, eigenvectors and, for slab
//!   models, the weight of every state on each layer.
//! - `json`: the records as a JSON array.
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use ndarray::{ArrayBase, Data, Ix1};

use crate::error::Result;
use crate::kpoints::k_distance;
use crate::mnk12::layer_weights;
use crate::sweep::SweepRecord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Bands,
    Full,
    Json,
}

/// Fixed-width number with a leading space reserved for the sign, so
/// positive and negative columns line up.
fn push_number(out: &mut String, x: f64) {
    if x >= 0.0 {
        out.push_str("     ");
    } else {
        out.push_str("    ");
    }
    let _ = write!(out, "{:.6}", x);
}

fn push_row<S: Data<Elem = f64>>(out: &mut String, row: &ArrayBase<S, Ix1>) {
    for x in row.iter() {
        push_number(out, *x);
    }
    out.push('\n');
}

pub fn format_bands(records: &[SweepRecord]) -> String {
    let ks: Vec<_> = records.iter().map(|r| r.k).collect();
    let dist = k_distance(&ks);
    let mut out = String::new();
    for (record, d) in records.iter().zip(dist.iter()) {
        push_number(&mut out, *d);
        push_number(&mut out, record.k.kx);
        push_number(&mut out, record.k.ky);
        push_number(&mut out, record.k.kz);
        push_row(&mut out, &record.result.eigenvalues);
    }
    out
}

/// `layer_dim` splits eigenvectors into per-layer weights when given.
pub fn format_full(records: &[SweepRecord], layer_dim: Option<usize>) -> String {
    let mut out = String::new();
    for record in records {
        let _ = writeln!(out, "# k-point {} {}", record.index, record.k);
        out.push_str("eigenvalues\n");
        push_row(&mut out, &record.result.eigenvalues);
        out.push_str("eigenvectors\n");
        for v in record.result.eigenvectors.outer_iter() {
            for c in v.iter() {
                push_number(&mut out, c.re);
                push_number(&mut out, c.im);
            }
            out.push('\n');
        }
        if let Some(layer_dim) = layer_dim {
            out.push_str("layer weights\n");
            for v in record.result.eigenvectors.outer_iter() {
                push_row(&mut out, &layer_weights(&v, layer_dim));
            }
        }
        out.push('\n');
    }
    out
}

pub fn format_json(records: &[SweepRecord]) -> Result<String> {
    Ok(serde_json::to_string_pretty(records)?)
}

pub fn write_records<P: AsRef<Path>>(
    path: P,
    records: &[SweepRecord],
    format: OutputFormat,
    layer_dim: Option<usize>,
) -> Result<()> {
    let text = match format {
        OutputFormat::Bands => format_bands(records),
        OutputFormat::Full => format_full(records, layer_dim),
        OutputFormat::Json => format_json(records)?,
    };
    let mut file = BufWriter::new(File::create(path)?);
    file.write_all(text.as_bytes())?;
    file.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kpoints::ReciprocalVector;
    use crate::sweep::sweep;

    fn records(model: &str) -> Vec<SweepRecord> {
        sweep(
            model,
            &[
                ReciprocalVector::GAMMA,
                ReciprocalVector::new(0.03, 0.0, 0.0),
                ReciprocalVector::new(0.03, 0.04, 0.0),
            ],
        )
        .unwrap()
    }

    #[test]
    fn bands_rows_carry_distance_k_and_energies() {
        let text = format_bands(&records("4band"));
        let rows: Vec<Vec<f64>> = text
            .lines()
            .map(|l| l.split_whitespace().map(|x| x.parse().unwrap()).collect())
            .collect();
        assert_eq!(rows.len(), 3);
        for row in &rows {
            assert_eq!(row.len(), 4 + 4);
        }
        assert_eq!(rows[0][0], 0.0);
        assert_eq!(rows[1][0], 0.03);
        assert_eq!(rows[2][0], 0.07);
        assert_eq!(rows[2][2], 0.04);
        assert!(rows[1][4] <= rows[1][7]);
    }

    #[test]
    fn sign_padding_aligns_columns() {
        let mut s = String::new();
        push_number(&mut s, 1.5);
        push_number(&mut s, -1.5);
        assert_eq!(s, "     1.500000    -1.500000");
    }

    #[test]
    fn full_output_has_layer_weights_for_slabs() {
        let recs = records("mnk12");
        let text = format_full(&recs, Some(4));
        assert_eq!(text.matches("# k-point").count(), 3);
        assert_eq!(text.matches("layer weights").count(), 3);
        assert!(!format_full(&recs, None).contains("layer weights"));
    }

    #[test]
    fn json_is_an_array_of_records() {
        let text = format_json(&records("4band")).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let array = value.as_array().unwrap();
        assert_eq!(array.len(), 3);
        assert_eq!(array[1]["index"], 1);
        assert!(array[0].get("eigenvalues").is_some());
    }
}
