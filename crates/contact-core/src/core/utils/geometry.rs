use nalgebra::Point3;

/// Distance (in Angstroms) at which the contact weight drops to one half.
pub const DISTANCE_WEIGHT_CENTER: f64 = 4.0;
/// Steepness of the logistic contact weight.
pub const DISTANCE_WEIGHT_SLOPE: f64 = 5.0;

/// Scores a heavy-atom contact distance with a fixed logistic kernel.
///
/// The weight is close to one for atoms packed tighter than
/// [`DISTANCE_WEIGHT_CENTER`] and decays towards zero beyond it. The kernel does not
/// depend on the contact cutoff used during detection.
///
/// # Arguments
///
/// * `distance` - The interatomic distance in Angstroms.
///
/// # Return
///
/// The contact weight in the open interval `(0, 1)`.
#[inline]
pub fn distance_weight(distance: f64) -> f64 {
    1.0 / (1.0 + (DISTANCE_WEIGHT_SLOPE * (distance - DISTANCE_WEIGHT_CENTER)).exp())
}

/// Dense row-major distance matrix between two position sets of a single frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl DistanceMatrix {
    /// Computes all pairwise Euclidean distances between `rows` and `cols`.
    pub fn compute(rows: &[Point3<f64>], cols: &[Point3<f64>]) -> Self {
        let mut data = Vec::with_capacity(rows.len() * cols.len());
        for a in rows {
            data.extend(cols.iter().map(|b| (a - b).norm()));
        }
        Self {
            rows: rows.len(),
            cols: cols.len(),
            data,
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[row * self.cols + col]
    }

    /// Iterates over all `(row, col, distance)` entries with `distance <= cutoff`,
    /// in row-major order.
    pub fn pairs_within(&self, cutoff: f64) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        self.data
            .iter()
            .enumerate()
            .filter(move |(_, d)| **d <= cutoff)
            .map(|(flat, d)| (flat / self.cols, flat % self.cols, *d))
    }
}

/// Returns the angle (in degrees) at `vertex` spanned by the points `a` and `b`.
///
/// The cosine is clamped to `[-1, 1]` before `acos` to absorb rounding noise. A
/// degenerate (zero-length) arm yields `NaN`, which never satisfies an angle cutoff.
pub fn angle_at(vertex: &Point3<f64>, a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    let v1 = a - vertex;
    let v2 = b - vertex;
    let cosine = v1.dot(&v2) / (v1.norm() * v2.norm());
    cosine.clamp(-1.0, 1.0).acos().to_degrees()
}
