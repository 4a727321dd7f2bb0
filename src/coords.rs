//! Per-residue backbone coordinates delivered by the input layer.

use crate::geom::Vec3;

/// Backbone atoms the engine knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum AtomKind {
    /// Phosphate.
    P,
    /// C4' sugar carbon.
    C4,
}

impl std::fmt::Display for AtomKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::P => f.write_str("P"),
            Self::C4 => f.write_str("C4'"),
        }
    }
}

/// One residue's backbone atom slots.
///
/// `res_index` is the residue's 1-based position along the loaded sequence,
/// not a raw structure-file residue number. Either slot may be NaN to mark
/// a missing atom.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ResidueCoord {
    pub res_index: u32,
    pub p: Vec3,
    pub c4: Vec3,
}

impl ResidueCoord {
    #[must_use]
    pub const fn new(res_index: u32, p: Vec3, c4: Vec3) -> Self {
        Self { res_index, p, c4 }
    }

    /// A residue with only its C4' slot filled.
    #[must_use]
    pub const fn c4_only(res_index: u32, c4: Vec3) -> Self {
        Self {
            res_index,
            p: Vec3::NAN,
            c4,
        }
    }

    #[must_use]
    pub const fn atom(&self, kind: AtomKind) -> Vec3 {
        match kind {
            AtomKind::P => self.p,
            AtomKind::C4 => self.c4,
        }
    }
}
