//! Data-module shapes.
//!
//! Each entry maps one dark cell to geometry inside that cell. Thick styles cover most of the
//! cell so neighbours fuse into solid runs; thin styles leave a visible gap so adjacent modules
//! stay distinguishable at small render sizes.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use super::geometry::{Point, Primitive};

/// Id used when a lookup misses.
pub const DEFAULT_MODULE_SHAPE: &str = "square";

/// One dark cell handed to a module rule.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModuleCell {
    pub center: Point,
    pub size: f64,
    pub col: usize,
    pub row: usize,
    /// Seed for the jittered style; every other style ignores it.
    pub seed: u64,
}

type ModuleRule = fn(&ModuleCell) -> Vec<Primitive>;

/// A registry entry: a stable id plus its geometric rule.
pub struct ModuleShape {
    pub id: &'static str,
    rule: ModuleRule,
}

impl ModuleShape {
    pub fn render(&self, cell: &ModuleCell) -> Vec<Primitive> {
        (self.rule)(cell)
    }
}

impl std::fmt::Debug for ModuleShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModuleShape").field("id", &self.id).finish()
    }
}

static MODULE_SHAPES: &[ModuleShape] = &[
    ModuleShape { id: "square", rule: |c| vec![Primitive::square(c.center, c.size)] },
    ModuleShape { id: "rounded", rule: |c| vec![Primitive::rounded_square(c.center, c.size, 0.3)] },
    ModuleShape { id: "dots", rule: |c| vec![Primitive::circle(c.center, c.size * 0.9)] },
    ModuleShape {
        id: "classy",
        rule: |c| vec![Primitive::rounded(c.center, c.size, c.size, [c.size * 0.5, 0.0, c.size * 0.5, 0.0])],
    },
    ModuleShape {
        id: "classy-rounded",
        rule: |c| {
            let (big, small) = (c.size * 0.5, c.size * 0.15);
            vec![Primitive::rounded(c.center, c.size, c.size, [big, small, big, small])]
        },
    },
    ModuleShape { id: "extra-rounded", rule: |c| vec![Primitive::circle(c.center, c.size)] },
    ModuleShape { id: "extra-rounded-small", rule: |c| vec![Primitive::circle(c.center, c.size * 0.65)] },
    ModuleShape { id: "cross", rule: |c| vec![Primitive::cross(c.center, c.size, c.size * 0.4)] },
    ModuleShape {
        id: "cross-rounded",
        rule: |c| {
            let (len, arm) = (c.size, c.size * 0.4);
            vec![
                Primitive::rounded(c.center, len, arm, [arm / 2.0; 4]),
                Primitive::rounded(c.center, arm, len, [arm / 2.0; 4]),
            ]
        },
    },
    ModuleShape { id: "diamond", rule: |c| vec![Primitive::diamond(c.center, c.size)] },
    ModuleShape {
        id: "diamond-hole",
        rule: |c| {
            vec![Primitive::ring(Primitive::diamond(c.center, c.size), Primitive::diamond(c.center, c.size * 0.4))]
        },
    },
    ModuleShape { id: "heart", rule: |c| vec![Primitive::heart(c.center, c.size * 0.95)] },
    ModuleShape {
        id: "bar-horizontal",
        rule: |c| {
            let h = c.size * 0.7;
            vec![Primitive::rounded(c.center, c.size, h, [h * 0.3; 4])]
        },
    },
    ModuleShape {
        id: "bar-vertical",
        rule: |c| {
            let w = c.size * 0.7;
            vec![Primitive::rounded(c.center, w, c.size, [w * 0.3; 4])]
        },
    },
    ModuleShape {
        id: "ribbon",
        rule: |c| {
            let h = c.size * 0.3;
            let gap = c.size * 0.2;
            vec![
                Primitive::rounded(c.center.offset(0.0, -(h + gap) / 2.0), c.size, h, [h * 0.5; 4]),
                Primitive::rounded(c.center.offset(0.0, (h + gap) / 2.0), c.size, h, [h * 0.5; 4]),
            ]
        },
    },
    ModuleShape { id: "shake", rule: shake },
    ModuleShape { id: "star-4", rule: |c| vec![Primitive::star(c.center, c.size, 4, 0.45)] },
    ModuleShape { id: "star-5", rule: |c| vec![Primitive::star(c.center, c.size, 5, 0.5)] },
    ModuleShape {
        id: "x",
        rule: |c| vec![Primitive::cross(c.center, c.size, c.size * 0.3).rotated(c.center, 45.0)],
    },
    ModuleShape {
        id: "x-rounded",
        rule: |c| {
            let (len, arm) = (c.size * 1.1, c.size * 0.3);
            vec![
                Primitive::rounded(c.center, len, arm, [arm / 2.0; 4]).rotated(c.center, 45.0),
                Primitive::rounded(c.center, len, arm, [arm / 2.0; 4]).rotated(c.center, -45.0),
            ]
        },
    },
];

/// Square shrunk to 80% and nudged by up to a tenth of the cell.
///
/// The offset is a pure function of `(seed, col, row)`, so a fixed seed renders identically
/// every time.
fn shake(c: &ModuleCell) -> Vec<Primitive> {
    let cell_key = ((c.row as u64) << 32) ^ (c.col as u64);
    let mut rng = ChaCha8Rng::seed_from_u64(c.seed ^ cell_key.wrapping_mul(0x9E37_79B9_7F4A_7C15));
    let max = c.size * 0.1;
    let dx = rng.gen_range(-max..=max);
    let dy = rng.gen_range(-max..=max);
    vec![Primitive::square(c.center.offset(dx, dy), c.size * 0.8)]
}

/// Looks up a module shape, falling back to [`DEFAULT_MODULE_SHAPE`].
pub fn module_shape(id: &str) -> &'static ModuleShape {
    let wanted = id.trim();
    MODULE_SHAPES
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(wanted))
        .unwrap_or(&MODULE_SHAPES[0])
}

/// All registered module shape ids, default first.
pub fn module_shape_ids() -> impl Iterator<Item = &'static str> {
    MODULE_SHAPES.iter().map(|s| s.id)
}
