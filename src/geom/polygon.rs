//! Projected loop polygons and 2D containment tests.

/// A loop polygon in a plane's `(e1, e2)` chart.
///
/// `valid` means the vertex list describes a simple polygon: at least three
/// vertices and no two non-adjacent edges intersecting. Invalid polygons are
/// kept for introspection but disable the point-in-polygon test.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Polygon2D {
    pub vertices: Vec<[f64; 2]>,
    pub valid: bool,
}

impl Polygon2D {
    #[must_use]
    pub fn new(vertices: Vec<[f64; 2]>) -> Self {
        let valid = vertices.len() >= 3 && is_simple(&vertices);
        Self { vertices, valid }
    }

    /// An empty, invalid polygon for degenerate surfaces.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            valid: false,
        }
    }

    /// Arithmetic mean of the vertices (the fan apex for triangulation).
    #[must_use]
    pub fn centroid(&self) -> [f64; 2] {
        let n = self.vertices.len();
        if n == 0 {
            return [0.0, 0.0];
        }
        let (sx, sy) = self
            .vertices
            .iter()
            .fold((0.0, 0.0), |(sx, sy), v| (sx + v[0], sy + v[1]));
        [sx / n as f64, sy / n as f64]
    }

    /// Even-odd containment test with an absolute edge-inclusion tolerance:
    /// a point within `eps` of any edge counts as inside.
    #[must_use]
    pub fn contains(&self, p: [f64; 2], eps: f64) -> bool {
        let n = self.vertices.len();
        if n < 3 {
            return false;
        }

        for k in 0..n {
            let a = self.vertices[k];
            let b = self.vertices[(k + 1) % n];
            if point_segment_distance(p, a, b) <= eps {
                return true;
            }
        }

        // Ray cast towards +x; the half-open comparison on y makes vertices
        // on the ray count exactly once.
        let mut inside = false;
        for k in 0..n {
            let a = self.vertices[k];
            let b = self.vertices[(k + 1) % n];
            if (a[1] > p[1]) != (b[1] > p[1]) {
                let x = a[0] + (p[1] - a[1]) / (b[1] - a[1]) * (b[0] - a[0]);
                if p[0] < x {
                    inside = !inside;
                }
            }
        }
        inside
    }
}

/// True when no two non-adjacent edges of the closed ring intersect.
fn is_simple(vertices: &[[f64; 2]]) -> bool {
    let n = vertices.len();
    for a in 0..n {
        for b in (a + 1)..n {
            // Skip the edge itself and the two ring-adjacent edges.
            if b == a || (b + 1) % n == a || (a + 1) % n == b {
                continue;
            }
            let (p1, p2) = (vertices[a], vertices[(a + 1) % n]);
            let (q1, q2) = (vertices[b], vertices[(b + 1) % n]);
            if segments_intersect(p1, p2, q1, q2) {
                return false;
            }
        }
    }
    true
}

fn orientation(a: [f64; 2], b: [f64; 2], c: [f64; 2]) -> f64 {
    (b[0] - a[0]) * (c[1] - a[1]) - (b[1] - a[1]) * (c[0] - a[0])
}

fn on_segment(a: [f64; 2], b: [f64; 2], p: [f64; 2]) -> bool {
    p[0] >= a[0].min(b[0])
        && p[0] <= a[0].max(b[0])
        && p[1] >= a[1].min(b[1])
        && p[1] <= a[1].max(b[1])
}

/// Closed-segment intersection test, collinear overlaps included.
fn segments_intersect(p1: [f64; 2], p2: [f64; 2], q1: [f64; 2], q2: [f64; 2]) -> bool {
    let o1 = orientation(p1, p2, q1);
    let o2 = orientation(p1, p2, q2);
    let o3 = orientation(q1, q2, p1);
    let o4 = orientation(q1, q2, p2);

    if ((o1 > 0.0 && o2 < 0.0) || (o1 < 0.0 && o2 > 0.0))
        && ((o3 > 0.0 && o4 < 0.0) || (o3 < 0.0 && o4 > 0.0))
    {
        return true;
    }

    (o1 == 0.0 && on_segment(p1, p2, q1))
        || (o2 == 0.0 && on_segment(p1, p2, q2))
        || (o3 == 0.0 && on_segment(q1, q2, p1))
        || (o4 == 0.0 && on_segment(q1, q2, p2))
}

fn point_segment_distance(p: [f64; 2], a: [f64; 2], b: [f64; 2]) -> f64 {
    let ab = [b[0] - a[0], b[1] - a[1]];
    let ap = [p[0] - a[0], p[1] - a[1]];
    let len2 = ab[0] * ab[0] + ab[1] * ab[1];
    let t = if len2 > 0.0 {
        ((ap[0] * ab[0] + ap[1] * ab[1]) / len2).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let dx = ap[0] - ab[0] * t;
    let dy = ap[1] - ab[1] * t;
    dx.hypot(dy)
}
