//! Spanning surfaces for loops.
//!
//! Each loop gets one surface: a best-fit plane through the C4' atoms of its
//! cycle residues, the cycle projected into the plane chart as a polygon,
//! and in triangulated mode a fan of triangles from the polygon centroid.
//! Degenerate geometry never fails the build; it only marks the plane or
//! polygon invalid so the evaluator skips what it cannot trust.

use log::debug;

use crate::coords::ResidueCoord;
use crate::geom::{Plane, Polygon2D, Triangle, Vec3, fit_plane};
use crate::structure::{Loop, StructureError};

/// How a loop's spanning surface is represented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum SurfaceMode {
    /// A single best-fit plane with a polygon containment test.
    BestFitPlane,
    /// A centroid fan of triangles over the polygon edges.
    Triangulated,
}

impl TryFrom<i32> for SurfaceMode {
    type Error = StructureError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::BestFitPlane),
            1 => Ok(Self::Triangulated),
            _ => Err(StructureError::InvalidParameter {
                name: "surface_mode",
                value: i64::from(value),
            }),
        }
    }
}

/// The spanning surface of one loop.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Surface {
    pub loop_id: u32,
    pub mode: SurfaceMode,
    pub plane: Plane,
    /// Cycle residues projected into the plane chart, cycle order.
    pub polygon: Polygon2D,
    /// Centroid fan over the polygon edges; empty in best-fit-plane mode.
    pub triangles: Vec<Triangle>,
    /// All residues on the loop's cycle (independent of missing atoms);
    /// segments touching these residues are not tested against this surface.
    pub members: Vec<u32>,
}

impl Surface {
    /// True when a residue belongs to the surface's loop cycle.
    #[must_use]
    pub fn is_member(&self, res_index: u32) -> bool {
        self.members.binary_search(&res_index).is_ok()
    }
}

/// Build one surface per loop.
///
/// `coords` must be ordered with `res_index` strictly increasing from 1.
/// Residues whose C4' is missing (NaN) are dropped from the geometric cycle;
/// if fewer than three remain, or the remainder is collinear within
/// `eps_collinear`, the surface is kept with an invalid plane and produces
/// no hits.
#[must_use]
pub fn build_surfaces(
    coords: &[ResidueCoord],
    loops: &[Loop],
    mode: SurfaceMode,
    eps_collinear: f64,
) -> Vec<Surface> {
    loops
        .iter()
        .map(|l| build_surface(coords, l, mode, eps_collinear))
        .collect()
}

fn build_surface(
    coords: &[ResidueCoord],
    l: &Loop,
    mode: SurfaceMode,
    eps_collinear: f64,
) -> Surface {
    let members = l.cycle_residues();

    // Cycle order equals ascending residue order; keep only residues with a
    // usable C4' position.
    let mut cycle_points: Vec<Vec3> = Vec::with_capacity(members.len());
    for &r in &members {
        let c4 = coords
            .get(r as usize - 1)
            .map_or(Vec3::NAN, |rc| rc.c4);
        if c4.is_finite() {
            cycle_points.push(c4);
        } else {
            debug!("loop {}: residue {r} dropped, no C4' coordinate", l.id);
        }
    }

    let plane = fit_plane(&cycle_points, eps_collinear);
    if !plane.valid {
        debug!("loop {}: degenerate cycle, surface disabled", l.id);
        return Surface {
            loop_id: l.id,
            mode,
            plane: Plane::invalid(),
            polygon: Polygon2D::empty(),
            triangles: Vec::new(),
            members,
        };
    }

    let polygon = Polygon2D::new(cycle_points.iter().map(|p| plane.project(*p)).collect());

    // The fan is built even when the polygon self-intersects; triangulated
    // mode can still pierce individual triangles.
    let triangles = match mode {
        SurfaceMode::BestFitPlane => Vec::new(),
        SurfaceMode::Triangulated => centroid_fan(&plane, &polygon, eps_collinear),
    };

    Surface {
        loop_id: l.id,
        mode,
        plane,
        polygon,
        triangles,
        members,
    }
}

/// Fan triangulation from the polygon centroid over the ordered edges,
/// lifted back onto the plane in 3D. Slivers below the area threshold are
/// dropped.
fn centroid_fan(plane: &Plane, polygon: &Polygon2D, eps_collinear: f64) -> Vec<Triangle> {
    let n = polygon.vertices.len();
    if n < 3 {
        return Vec::new();
    }
    let apex = plane.unproject(polygon.centroid());
    let mut triangles = Vec::with_capacity(n);
    for k in 0..n {
        let a = plane.unproject(polygon.vertices[k]);
        let b = plane.unproject(polygon.vertices[(k + 1) % n]);
        let tri = Triangle::new(apex, a, b);
        if tri.area() > eps_collinear {
            triangles.push(tri);
        }
    }
    triangles
}
