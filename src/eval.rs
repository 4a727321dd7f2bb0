//! Entanglement evaluation: backbone segments against loop surfaces.

use log::debug;

use crate::coords::{AtomKind, ResidueCoord};
use crate::geom::{Vec3, segment_plane_crossing, segment_triangle_intersection};
use crate::structure::StructureError;
use crate::surface::{Surface, SurfaceMode};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Which backbone atoms form the polyline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PolylineMode {
    /// C4' per residue; segments join residue `k` to `k + 1`.
    C4Only,
    /// Alternating `P(1), C4'(1), P(2), C4'(2), …`.
    PhosphateC4,
}

impl TryFrom<i32> for PolylineMode {
    type Error = StructureError;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::C4Only),
            1 => Ok(Self::PhosphateC4),
            _ => Err(StructureError::InvalidParameter {
                name: "polyline_mode",
                value: i64::from(value),
            }),
        }
    }
}

/// One piercing of a loop surface by a backbone segment.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Hit {
    pub loop_id: u32,
    pub res_a: u32,
    pub atom_a: AtomKind,
    pub res_b: u32,
    pub atom_b: AtomKind,
    /// Intersection point, on both the segment and the surface.
    pub point: Vec3,
}

/// The entanglement count and its witnesses.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct EntanglementResult {
    /// Total number of hits.
    pub k: usize,
    /// Hits in canonical order: surfaces by ascending `loop_id`, segments
    /// in polyline order.
    pub hits: Vec<Hit>,
}

#[derive(Debug, Clone, Copy)]
struct PolyVertex {
    res: u32,
    atom: AtomKind,
    pos: Vec3,
}

/// Count surface piercings by non-loop backbone segments.
///
/// Surfaces with an invalid plane are skipped, as are segments with a NaN
/// endpoint or with an endpoint residue on the surface's own cycle. At most
/// one hit is emitted per (surface, segment) pair.
#[must_use]
pub fn evaluate_entanglement(
    coords: &[ResidueCoord],
    surfaces: &[Surface],
    polyline_mode: PolylineMode,
    eps_plane: f64,
    eps_polygon: f64,
) -> EntanglementResult {
    let vertices = polyline(coords, polyline_mode);

    let mut ordered: Vec<&Surface> = surfaces.iter().collect();
    ordered.sort_by_key(|s| s.loop_id);

    #[cfg(feature = "parallel")]
    let per_surface: Vec<Vec<Hit>> = ordered
        .par_iter()
        .map(|s| surface_hits(s, &vertices, eps_plane, eps_polygon))
        .collect();
    #[cfg(not(feature = "parallel"))]
    let per_surface: Vec<Vec<Hit>> = ordered
        .iter()
        .map(|s| surface_hits(s, &vertices, eps_plane, eps_polygon))
        .collect();

    let hits: Vec<Hit> = per_surface.into_iter().flatten().collect();
    debug!("entanglement: {} hit(s) over {} surface(s)", hits.len(), surfaces.len());

    EntanglementResult {
        k: hits.len(),
        hits,
    }
}

fn polyline(coords: &[ResidueCoord], mode: PolylineMode) -> Vec<PolyVertex> {
    let mut vertices = Vec::with_capacity(match mode {
        PolylineMode::C4Only => coords.len(),
        PolylineMode::PhosphateC4 => coords.len() * 2,
    });
    for rc in coords {
        if mode == PolylineMode::PhosphateC4 {
            vertices.push(PolyVertex {
                res: rc.res_index,
                atom: AtomKind::P,
                pos: rc.p,
            });
        }
        vertices.push(PolyVertex {
            res: rc.res_index,
            atom: AtomKind::C4,
            pos: rc.c4,
        });
    }
    vertices
}

fn surface_hits(
    surface: &Surface,
    vertices: &[PolyVertex],
    eps_plane: f64,
    eps_polygon: f64,
) -> Vec<Hit> {
    if !surface.plane.valid {
        return Vec::new();
    }
    // The polygon containment test is the only containment test in
    // best-fit-plane mode; without a simple polygon that surface is mute.
    if surface.mode == SurfaceMode::BestFitPlane && !surface.polygon.valid {
        return Vec::new();
    }

    let mut hits = Vec::new();
    for window in vertices.windows(2) {
        let (a, b) = (window[0], window[1]);
        if !a.pos.is_finite() || !b.pos.is_finite() {
            continue;
        }
        if surface.is_member(a.res) || surface.is_member(b.res) {
            continue;
        }
        if let Some(point) = segment_surface_hit(surface, a.pos, b.pos, eps_plane, eps_polygon) {
            hits.push(Hit {
                loop_id: surface.loop_id,
                res_a: a.res,
                atom_a: a.atom,
                res_b: b.res,
                atom_b: b.atom,
                point,
            });
        }
    }
    hits
}

fn segment_surface_hit(
    surface: &Surface,
    a: Vec3,
    b: Vec3,
    eps_plane: f64,
    eps_polygon: f64,
) -> Option<Vec3> {
    match surface.mode {
        SurfaceMode::Triangulated => surface
            .triangles
            .iter()
            .find_map(|tri| segment_triangle_intersection(a, b, tri, eps_plane, eps_polygon)),
        SurfaceMode::BestFitPlane => {
            let point = segment_plane_crossing(a, b, &surface.plane, eps_plane)?;
            let uv = surface.plane.project(point);
            surface.polygon.contains(uv, eps_polygon).then_some(point)
        }
    }
}
