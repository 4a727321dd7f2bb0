#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

//! Detects and localises topological entanglement ("pseudoknot-like
//! threadings") in RNA 3D structures.
//!
//! Given per-residue backbone coordinates and a base-pair list, the engine
//! extracts the non-crossing main layer of pairs, decomposes it into loops,
//! spans every loop with a surface in 3D and counts the backbone segments
//! piercing those surfaces. The total piercing count `K` is the
//! entanglement number; each piercing is reported with its segment, loop
//! and intersection point.

pub mod coords;
pub mod eval;
pub mod geom;
pub mod parse;
pub mod structure;
pub mod surface;

use log::debug;

pub use coords::{AtomKind, ResidueCoord};
pub use eval::{EntanglementResult, Hit, PolylineMode, evaluate_entanglement};
pub use geom::{Plane, Polygon2D, Triangle, Vec3};
pub use parse::ParseError;
pub use structure::{BasePair, Loop, LoopKind, StructureError, build_loops, main_layer};
pub use surface::{Surface, SurfaceMode, build_surfaces};

/// Knobs for one evaluation run. `Default` carries the standard settings:
/// triangulated surfaces, the P/C4' polyline, main-layer reduction and the
/// documented epsilon envelope.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EvalParams {
    pub surface_mode: SurfaceMode,
    pub polyline_mode: PolylineMode,
    /// Reduce the input pair list to its non-crossing main layer first.
    pub main_layer_only: bool,
    /// Plane-side and parallelism tolerance (absolute).
    pub eps_plane: f64,
    /// Polygon / barycentric inclusion tolerance (absolute).
    pub eps_polygon: f64,
    /// Collinearity and sliver-triangle threshold (absolute).
    pub eps_collinear: f64,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            surface_mode: SurfaceMode::Triangulated,
            polyline_mode: PolylineMode::PhosphateC4,
            main_layer_only: true,
            eps_plane: 1e-2,
            eps_polygon: 1e-2,
            eps_collinear: 1e-6,
        }
    }
}

/// Everything one evaluation produces: the result plus the loops and
/// surfaces that led to it, for overlays and debugging.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct Detection {
    pub result: EntanglementResult,
    pub loops: Vec<Loop>,
    pub surfaces: Vec<Surface>,
}

/// Run the full pipeline: main layer → loops → surfaces → evaluation.
///
/// `coords` must be ordered with `res_index` strictly increasing from 1;
/// pair indices refer to the same 1-based numbering.
///
/// # Errors
///
/// Structural failures only ([`StructureError`]); geometric degeneracies
/// and missing atoms reduce the considered loops and segments instead.
pub fn detect_entanglement(
    coords: &[ResidueCoord],
    pairs: &[BasePair],
    params: &EvalParams,
) -> Result<Detection, StructureError> {
    let n = coords.len() as u32;
    debug!("input: {n} residue(s), {} pair(s)", pairs.len());

    let reduced;
    let layer: &[BasePair] = if params.main_layer_only {
        reduced = main_layer(pairs, n)?;
        debug!("main layer: {} pair(s)", reduced.len());
        &reduced
    } else {
        pairs
    };

    let loops = build_loops(layer, n, false)?;
    debug!("loops: {}", loops.len());

    let surfaces = build_surfaces(coords, &loops, params.surface_mode, params.eps_collinear);
    let usable = surfaces.iter().filter(|s| s.plane.valid).count();
    debug!("surfaces: {} ({usable} with a valid plane)", surfaces.len());

    let result = evaluate_entanglement(
        coords,
        &surfaces,
        params.polyline_mode,
        params.eps_plane,
        params.eps_polygon,
    );

    Ok(Detection {
        result,
        loops,
        surfaces,
    })
}
