use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Distance strategy used to rank index entries.
///
/// Smaller is always closer.
/// - `L2` is the *squared* Euclidean distance. The square root is skipped
///   since it does not change the ordering; reported distances are squared.
/// - `Cosine` is `1 - cos(a, b)`, in `[0, 2]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Metric {
    #[default]
    L2,
    Cosine,
}

impl Metric {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::L2 => "l2",
            Self::Cosine => "cosine",
        }
    }

    /// Whether this metric needs per-vector norms (and therefore rejects zero vectors)
    #[must_use]
    pub const fn uses_norms(self) -> bool {
        matches!(self, Self::Cosine)
    }

    /// Distance between `a` and `b` given their precomputed L2 norms.
    ///
    /// Norms are ignored for `L2`; for `Cosine` both must be non-zero.
    #[must_use]
    pub fn distance(
        self,
        a: ArrayView1<f32>,
        a_norm: f32,
        b: ArrayView1<f32>,
        b_norm: f32,
    ) -> f32 {
        match self {
            Self::L2 => squared_l2(a, b),
            Self::Cosine => 1.0 - a.dot(&b) / (a_norm * b_norm),
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Metric {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "l2" | "euclidean" => Ok(Self::L2),
            "cosine" | "cos" => Ok(Self::Cosine),
            other => Err(format!(
                "Unsupported metric '{other}' (expected 'l2' or 'cosine')"
            )),
        }
    }
}

#[must_use]
pub fn l2_norm(v: ArrayView1<f32>) -> f32 {
    v.dot(&v).sqrt()
}

fn squared_l2(a: ArrayView1<f32>, b: ArrayView1<f32>) -> f32 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| {
            let d = x - y;
            d * d
        })
        .sum()
}
