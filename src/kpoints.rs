//! k-point input: the [`ReciprocalVector`] type, the KPOINTS readers and the
//! path helpers used when writing band files.
use std::fmt;
use std::fs;
use std::path::Path;

use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::error::{KpError, Result};

/// A point $(k_x,k_y,k_z)$ in reciprocal space.
///
/// Units are whatever the selected model expects: 1/Å for the 4-band and
/// 8-band models, $2\pi/a$ for mnk12.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReciprocalVector {
    pub kx: f64,
    pub ky: f64,
    pub kz: f64,
}

impl ReciprocalVector {
    pub const GAMMA: ReciprocalVector = ReciprocalVector {
        kx: 0.0,
        ky: 0.0,
        kz: 0.0,
    };

    pub const fn new(kx: f64, ky: f64, kz: f64) -> Self {
        Self { kx, ky, kz }
    }

    #[inline(always)]
    pub fn is_finite(&self) -> bool {
        self.kx.is_finite() && self.ky.is_finite() && self.kz.is_finite()
    }

    /// $k_\parallel^2=k_x^2+k_y^2$
    #[inline(always)]
    pub fn k_par2(&self) -> f64 {
        self.kx * self.kx + self.ky * self.ky
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self::new(self.kx * factor, self.ky * factor, self.kz * factor)
    }

    pub fn distance(&self, other: &ReciprocalVector) -> f64 {
        let dx = self.kx - other.kx;
        let dy = self.ky - other.ky;
        let dz = self.kz - other.kz;
        (dx * dx + dy * dy + dz * dz).sqrt()
    }

    /// Point at fraction `t` of the way from `self` to `other`.
    fn lerp(&self, other: &ReciprocalVector, t: f64) -> Self {
        Self::new(
            self.kx + t * (other.kx - self.kx),
            self.ky + t * (other.ky - self.ky),
            self.kz + t * (other.kz - self.kz),
        )
    }
}

impl From<[f64; 3]> for ReciprocalVector {
    fn from(k: [f64; 3]) -> Self {
        Self::new(k[0], k[1], k[2])
    }
}

impl fmt::Display for ReciprocalVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.kx, self.ky, self.kz)
    }
}

/// Checks that every k-point is finite, reporting the first offender by index.
pub fn validate(kpoints: &[ReciprocalVector]) -> Result<()> {
    match kpoints.iter().position(|k| !k.is_finite()) {
        Some(index) => Err(KpError::InvalidKPoint {
            index,
            k: kpoints[index],
        }),
        None => Ok(()),
    }
}

/// `nk` evenly spaced points from `start` to `stop`, both ends included.
pub fn k_line(start: ReciprocalVector, stop: ReciprocalVector, nk: usize) -> Vec<ReciprocalVector> {
    match nk {
        0 => Vec::new(),
        1 => vec![start],
        _ => (0..nk)
            .map(|i| start.lerp(&stop, (i as f64) / ((nk - 1) as f64)))
            .collect(),
    }
}

/// Cumulative distance along the k-point sequence, the abscissa of a band plot.
pub fn k_distance(kpoints: &[ReciprocalVector]) -> Array1<f64> {
    let mut k_dist = Array1::<f64>::zeros(kpoints.len());
    for n in 1..kpoints.len() {
        k_dist[[n]] = k_dist[[n - 1]] + kpoints[n].distance(&kpoints[n - 1]);
    }
    k_dist
}

/// Reads a k-point file, picking the line-mode or plain-list reader from the
/// file header.
pub fn read_kpoints<P: AsRef<Path>>(path: P) -> Result<Vec<ReciprocalVector>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path)?;
    parse_kpoints(&text, &path.display().to_string())
}

pub fn parse_kpoints(text: &str, file: &str) -> Result<Vec<ReciprocalVector>> {
    let is_line_mode = text
        .lines()
        .nth(2)
        .map(|l| l.trim_start().starts_with(['l', 'L']))
        .unwrap_or(false);
    if is_line_mode {
        parse_line_mode(text, file)
    } else {
        parse_plain_list(text, file)
    }
}

/// VASP line-mode KPOINTS.
///
/// Line 2 holds the number of points per segment, lines 3-4 are the mode and
/// coordinate headers, and from line 5 on every segment is a start line, a
/// stop line and one separator line.
pub fn parse_line_mode(text: &str, file: &str) -> Result<Vec<ReciprocalVector>> {
    let lines: Vec<&str> = text.lines().collect();
    let parse_err = |line: usize, message: String| KpError::FileParse {
        file: file.to_string(),
        message: format!("line {}: {}", line + 1, message),
    };
    let nk: usize = lines
        .get(1)
        .ok_or_else(|| parse_err(1, "missing the number of points per segment".into()))?
        .split_whitespace()
        .next()
        .ok_or_else(|| parse_err(1, "missing the number of points per segment".into()))?
        .parse()
        .map_err(|e| parse_err(1, format!("bad number of points per segment: {}", e)))?;

    let mut kpoints = Vec::new();
    let mut n = 4;
    while n < lines.len() {
        if lines[n].trim().is_empty() {
            n += 1;
            continue;
        }
        let start = parse_triple(lines[n]).map_err(|m| parse_err(n, m))?;
        let stop_line = lines
            .get(n + 1)
            .ok_or_else(|| parse_err(n + 1, "segment has no end point".into()))?;
        let stop = parse_triple(stop_line).map_err(|m| parse_err(n + 1, m))?;
        kpoints.extend(k_line(start, stop, nk));
        n += 3;
    }
    if kpoints.is_empty() {
        return Err(KpError::FileParse {
            file: file.to_string(),
            message: "no k-point segments found".into(),
        });
    }
    Ok(kpoints)
}

/// One `kx ky kz` triple per line; blank lines and `#`/`!` comments are skipped.
pub fn parse_plain_list(text: &str, file: &str) -> Result<Vec<ReciprocalVector>> {
    let mut kpoints = Vec::new();
    for (n, line) in text.lines().enumerate() {
        let body = line.split(['#', '!']).next().unwrap_or("").trim();
        if body.is_empty() {
            continue;
        }
        let k = parse_triple(body).map_err(|message| KpError::FileParse {
            file: file.to_string(),
            message: format!("line {}: {}", n + 1, message),
        })?;
        kpoints.push(k);
    }
    Ok(kpoints)
}

/// The first three numbers on a line; anything after them (labels) is ignored.
fn parse_triple(line: &str) -> std::result::Result<ReciprocalVector, String> {
    let mut k = [0.0; 3];
    let mut fields = line.split_whitespace();
    for (i, slot) in k.iter_mut().enumerate() {
        let field = fields
            .next()
            .ok_or_else(|| format!("expected 3 components, found {}", i))?;
        *slot = field
            .parse::<f64>()
            .map_err(|e| format!("bad component '{}': {}", field, e))?;
    }
    Ok(ReciprocalVector::from(k))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LINE_MODE: &str = "\
k-points along high symmetry lines
 3
Line-mode
reciprocal
  0.0 0.0 0.0   ! G
  0.5 0.0 0.0   ! M

  0.5 0.0 0.0   ! M
  0.5 0.5 0.0   ! K
";

    #[test]
    fn line_mode_includes_both_ends() {
        let kpoints = parse_kpoints(LINE_MODE, "KPOINTS").unwrap();
        assert_eq!(kpoints.len(), 6);
        assert_eq!(kpoints[0], ReciprocalVector::GAMMA);
        assert_eq!(kpoints[1], ReciprocalVector::new(0.25, 0.0, 0.0));
        assert_eq!(kpoints[2], ReciprocalVector::new(0.5, 0.0, 0.0));
        assert_eq!(kpoints[5], ReciprocalVector::new(0.5, 0.5, 0.0));
    }

    #[test]
    fn plain_list_skips_comments() {
        let text = "# kx ky kz\n0.1 0.2 0.3\n\n  -0.1 0 1e-2 ! label\n";
        let kpoints = parse_kpoints(text, "list").unwrap();
        assert_eq!(
            kpoints,
            vec![
                ReciprocalVector::new(0.1, 0.2, 0.3),
                ReciprocalVector::new(-0.1, 0.0, 0.01)
            ]
        );
    }

    #[test]
    fn short_line_is_a_parse_error() {
        let err = parse_kpoints("0.1 0.2\n", "list").unwrap_err();
        match err {
            KpError::FileParse { message, .. } => assert!(message.contains("line 1")),
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn validate_reports_first_bad_index() {
        let kpoints = vec![
            ReciprocalVector::GAMMA,
            ReciprocalVector::new(0.0, f64::INFINITY, 0.0),
            ReciprocalVector::new(f64::NAN, 0.0, 0.0),
        ];
        match validate(&kpoints) {
            Err(KpError::InvalidKPoint { index, .. }) => assert_eq!(index, 1),
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn k_distance_accumulates() {
        let kpoints = k_line(ReciprocalVector::GAMMA, ReciprocalVector::new(0.3, 0.4, 0.0), 3);
        let dist = k_distance(&kpoints);
        assert!((dist[[1]] - 0.25).abs() < 1e-12);
        assert!((dist[[2]] - 0.5).abs() < 1e-12);
    }
}
