//! Best-fit planes for loop surfaces.
//!
//! A plane is fitted to a point set by principal component analysis of the
//! 3×3 covariance matrix: the smallest-eigenvalue axis is the normal, the
//! dominant axis spans the in-plane chart together with `normal × e1`.
//! Eigenvectors come from power iteration with deflation; eigenvalues are
//! Rayleigh quotients, exactly as much machinery as a symmetric 3×3 needs.

use super::core::Vec3;

const POWER_ITERATIONS: usize = 20;

/// An oriented plane with an orthonormal in-plane chart.
///
/// When `valid` is false the fit was degenerate (fewer than three usable
/// points, or all points collinear) and the plane must not be used for
/// projection or distance queries.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct Plane {
    /// Chart origin (the centroid of the fitted points).
    pub c: Vec3,
    /// First in-plane basis vector (dominant principal direction).
    pub e1: Vec3,
    /// Second in-plane basis vector, `normal × e1`.
    pub e2: Vec3,
    /// Unit normal (smallest principal direction).
    pub normal: Vec3,
    pub valid: bool,
}

impl Plane {
    /// A placeholder plane for degenerate fits.
    #[must_use]
    pub const fn invalid() -> Self {
        Self {
            c: Vec3::ZERO,
            e1: Vec3::ZERO,
            e2: Vec3::ZERO,
            normal: Vec3::ZERO,
            valid: false,
        }
    }

    /// Project a 3D point into the `(e1, e2)` chart.
    #[must_use]
    pub fn project(&self, p: Vec3) -> [f64; 2] {
        let d = p - self.c;
        [d.dot(self.e1), d.dot(self.e2)]
    }

    /// Map chart coordinates back to 3D.
    #[must_use]
    pub fn unproject(&self, uv: [f64; 2]) -> Vec3 {
        self.c + self.e1 * uv[0] + self.e2 * uv[1]
    }

    /// Signed distance of a point to the plane, along the normal.
    #[must_use]
    pub fn signed_distance(&self, p: Vec3) -> f64 {
        (p - self.c).dot(self.normal)
    }
}

/// Fit a plane through `points` by PCA of the covariance matrix.
///
/// Returns an invalid plane when fewer than three points are given, when the
/// points coincide, or when they are collinear: the middle eigenvalue of the
/// (unnormalised) covariance is compared against `eps_collinear` as an
/// absolute threshold.
#[must_use]
pub fn fit_plane(points: &[Vec3], eps_collinear: f64) -> Plane {
    if points.len() < 3 {
        return Plane::invalid();
    }

    let n = points.len() as f64;
    let centroid = points.iter().fold(Vec3::ZERO, |acc, p| acc + *p) / n;

    let mut cov = [[0.0_f64; 3]; 3];
    for p in points {
        let d = *p - centroid;
        cov[0][0] += d.x * d.x;
        cov[0][1] += d.x * d.y;
        cov[0][2] += d.x * d.z;
        cov[1][1] += d.y * d.y;
        cov[1][2] += d.y * d.z;
        cov[2][2] += d.z * d.z;
    }
    cov[1][0] = cov[0][1];
    cov[2][0] = cov[0][2];
    cov[2][1] = cov[1][2];

    let Some(dominant) = dominant_eigenvector(&cov) else {
        // All points coincide with the centroid.
        return Plane::invalid();
    };
    let Some(second) = deflated_eigenvector(&cov, dominant) else {
        return Plane::invalid();
    };
    let Some(third) = dominant.cross(second).normalized() else {
        return Plane::invalid();
    };

    // Rank the axes by their Rayleigh quotients; the normal carries the
    // smallest variance, the first chart axis the largest.
    let mut axes = [
        (rayleigh_quotient(&cov, dominant), dominant),
        (rayleigh_quotient(&cov, second), second),
        (rayleigh_quotient(&cov, third), third),
    ];
    axes.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let middle = axes[1].0;
    if middle <= eps_collinear {
        // Collinear: only one principal direction carries variance.
        return Plane::invalid();
    }

    let normal = axes[0].1;
    let Some(e1) = orthogonalized(axes[2].1, normal) else {
        return Plane::invalid();
    };
    let e2 = normal.cross(e1);

    Plane {
        c: centroid,
        e1,
        e2,
        normal,
        valid: true,
    }
}

fn mat_mul(cov: &[[f64; 3]; 3], v: Vec3) -> Vec3 {
    Vec3::new(
        cov[0][0] * v.x + cov[0][1] * v.y + cov[0][2] * v.z,
        cov[1][0] * v.x + cov[1][1] * v.y + cov[1][2] * v.z,
        cov[2][0] * v.x + cov[2][1] * v.y + cov[2][2] * v.z,
    )
}

/// Power iteration for the dominant eigenvector, trying each coordinate axis
/// as a seed so a seed orthogonal to the dominant direction cannot stall.
fn dominant_eigenvector(cov: &[[f64; 3]; 3]) -> Option<Vec3> {
    let seeds = [
        Vec3::new(1.0, 0.0, 0.0),
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::new(0.0, 0.0, 1.0),
    ];
    let mut best: Option<(f64, Vec3)> = None;
    for seed in seeds {
        let mut v = seed;
        for _ in 0..POWER_ITERATIONS {
            match mat_mul(cov, v).normalized() {
                Some(next) => v = next,
                None => break,
            }
        }
        let value = rayleigh_quotient(cov, v);
        if value.is_finite() && best.is_none_or(|(b, _)| value > b) {
            best = Some((value, v));
        }
    }
    best.and_then(|(value, v)| (value > 0.0).then_some(v))
}

/// Power iteration confined to the subspace orthogonal to `dominant`.
fn deflated_eigenvector(cov: &[[f64; 3]; 3], dominant: Vec3) -> Option<Vec3> {
    let seed = if dominant.x.abs() < 0.9 {
        Vec3::new(1.0, 0.0, 0.0)
    } else {
        Vec3::new(0.0, 1.0, 0.0)
    };
    let mut v = orthogonalized(seed, dominant)?;
    for _ in 0..POWER_ITERATIONS {
        let next = mat_mul(cov, v);
        match orthogonalized(next, dominant) {
            Some(w) => v = w,
            // The remaining subspace carries no variance; keep the current
            // direction, it is still a legitimate orthonormal axis.
            None => break,
        }
    }
    Some(v)
}

/// Remove the `axis` component from `v` and normalise.
fn orthogonalized(v: Vec3, axis: Vec3) -> Option<Vec3> {
    (v - axis * v.dot(axis)).normalized()
}

/// Rayleigh quotient `vᵀ C v / vᵀ v`, the eigenvalue estimate for `v`.
fn rayleigh_quotient(cov: &[[f64; 3]; 3], v: Vec3) -> f64 {
    v.dot(mat_mul(cov, v)) / v.length_squared().max(1e-300)
}
