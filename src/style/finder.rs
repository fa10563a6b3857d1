//! Finder-pattern shapes.
//!
//! A finder block is drawn as two independent parts: a hollow square whose ring is exactly one
//! seventh of the block edge, and a center dot exactly three sevenths of the block edge. These
//! are the standard finder proportions, so every decorative variant stays scannable.

use super::geometry::{Point, Primitive};

/// Id used when a finder-square lookup misses.
pub const DEFAULT_FINDER_SQUARE: &str = "default";
/// Id used when a finder-dot lookup misses.
pub const DEFAULT_FINDER_DOT: &str = "square";

/// Ring thickness as a fraction of the block edge.
pub const RING_RATIO: f64 = 1.0 / 7.0;
/// Dot edge as a fraction of the block edge.
pub const DOT_RATIO: f64 = 3.0 / 7.0;

/// Thickness of the optional inner decorative ring, as a fraction of the block edge.
const INNER_RING_RATIO: f64 = 1.0 / 28.0;

/// Outline family shared by the outer edge and the cut-out of a finder square.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Outline {
    Square,
    /// All corners rounded by a fraction of the current edge.
    Rounded(f64),
    Circle,
    Diamond,
    /// Per-corner rounding fractions: top-left, top-right, bottom-right, bottom-left.
    Corners([f64; 4]),
}

impl Outline {
    fn at(self, c: Point, size: f64) -> Primitive {
        match self {
            Outline::Square => Primitive::square(c, size),
            Outline::Rounded(ratio) => Primitive::rounded_square(c, size, ratio),
            Outline::Circle => Primitive::circle(c, size),
            Outline::Diamond => Primitive::diamond(c, size),
            Outline::Corners(ratios) => Primitive::rounded(c, size, size, ratios.map(|r| r * size)),
        }
    }

    fn ring(self, c: Point, size: f64, thickness: f64) -> Primitive {
        Primitive::ring(self.at(c, size), self.at(c, size - 2.0 * thickness))
    }
}

/// A finder-square registry entry.
#[derive(Debug)]
pub struct FinderSquare {
    pub id: &'static str,
    outline: Outline,
    /// Edge of the extra inset ring as a fraction of the block, for double-border variants.
    inner_ring: Option<f64>,
}

impl FinderSquare {
    /// Geometry for a block of edge `block` centered on `center`.
    pub fn render(&self, center: Point, block: f64) -> Vec<Primitive> {
        let mut prims = vec![self.outline.ring(center, block, block * RING_RATIO)];
        if let Some(ratio) = self.inner_ring {
            prims.push(self.outline.ring(center, block * ratio, block * INNER_RING_RATIO));
        }
        prims
    }

    pub fn is_double(&self) -> bool {
        self.inner_ring.is_some()
    }
}

const LEAF: [f64; 4] = [0.35, 0.0, 0.35, 0.0];
const LEAF_MIRRORED: [f64; 4] = [0.0, 0.35, 0.0, 0.35];

static FINDER_SQUARES: &[FinderSquare] = &[
    FinderSquare { id: "default", outline: Outline::Square, inner_ring: None },
    FinderSquare { id: "square", outline: Outline::Square, inner_ring: None },
    FinderSquare { id: "dot", outline: Outline::Circle, inner_ring: None },
    FinderSquare { id: "extra-rounded", outline: Outline::Rounded(0.3), inner_ring: None },
    FinderSquare { id: "diamond", outline: Outline::Diamond, inner_ring: None },
    FinderSquare { id: "shape1", outline: Outline::Rounded(0.15), inner_ring: None },
    FinderSquare { id: "shape2", outline: Outline::Corners(LEAF), inner_ring: None },
    FinderSquare { id: "shape3", outline: Outline::Corners(LEAF_MIRRORED), inner_ring: None },
    FinderSquare { id: "shape4", outline: Outline::Square, inner_ring: Some(0.6) },
    FinderSquare { id: "shape5", outline: Outline::Rounded(0.2), inner_ring: Some(0.62) },
    FinderSquare { id: "shape6", outline: Outline::Circle, inner_ring: Some(0.58) },
    FinderSquare { id: "shape7", outline: Outline::Corners([0.0, 0.35, 0.35, 0.35]), inner_ring: None },
    FinderSquare { id: "shape8", outline: Outline::Rounded(0.45), inner_ring: None },
    FinderSquare { id: "shape9", outline: Outline::Rounded(0.3), inner_ring: Some(0.6) },
    FinderSquare { id: "shape10", outline: Outline::Corners(LEAF), inner_ring: Some(0.62) },
    FinderSquare { id: "shape11", outline: Outline::Corners([0.35, 0.0, 0.35, 0.35]), inner_ring: None },
    FinderSquare { id: "shape12", outline: Outline::Corners([0.35, 0.35, 0.35, 0.0]), inner_ring: Some(0.55) },
];

/// Looks up a finder-square shape, falling back to [`DEFAULT_FINDER_SQUARE`].
pub fn finder_square(id: &str) -> &'static FinderSquare {
    let wanted = id.trim();
    FINDER_SQUARES
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(wanted))
        .unwrap_or(&FINDER_SQUARES[0])
}

pub fn finder_square_ids() -> impl Iterator<Item = &'static str> {
    FINDER_SQUARES.iter().map(|s| s.id)
}

type DotRule = fn(Point, f64) -> Vec<Primitive>;

/// A finder-dot registry entry. Rules receive the dot edge, already 3/7 of the block.
pub struct FinderDot {
    pub id: &'static str,
    rule: DotRule,
}

impl FinderDot {
    /// Geometry for the dot of a block of edge `block` centered on `center`.
    pub fn render(&self, center: Point, block: f64) -> Vec<Primitive> {
        (self.rule)(center, block * DOT_RATIO)
    }
}

impl std::fmt::Debug for FinderDot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderDot").field("id", &self.id).finish()
    }
}

static FINDER_DOTS: &[FinderDot] = &[
    FinderDot { id: "square", rule: |c, s| vec![Primitive::square(c, s)] },
    FinderDot { id: "dot", rule: |c, s| vec![Primitive::circle(c, s)] },
    FinderDot { id: "rounded-square", rule: |c, s| vec![Primitive::rounded_square(c, s, 0.25)] },
    FinderDot { id: "extra-rounded", rule: |c, s| vec![Primitive::rounded_square(c, s, 0.4)] },
    FinderDot { id: "cross", rule: |c, s| vec![Primitive::cross(c, s, s * 0.4)] },
    FinderDot {
        id: "cross-rounded",
        rule: |c, s| {
            let arm = s * 0.4;
            vec![
                Primitive::rounded(c, s, arm, [arm / 2.0; 4]),
                Primitive::rounded(c, arm, s, [arm / 2.0; 4]),
            ]
        },
    },
    FinderDot { id: "diamond", rule: |c, s| vec![Primitive::diamond(c, s)] },
    FinderDot {
        id: "ringed-dot",
        rule: |c, s| {
            vec![
                Primitive::ring(Primitive::circle(c, s), Primitive::circle(c, s * 0.8)),
                Primitive::circle(c, s * 0.55),
            ]
        },
    },
    FinderDot {
        id: "ringed-dot-thin",
        rule: |c, s| {
            vec![
                Primitive::ring(Primitive::circle(c, s), Primitive::circle(c, s * 0.9)),
                Primitive::circle(c, s * 0.65),
            ]
        },
    },
    FinderDot { id: "heart", rule: |c, s| vec![Primitive::heart(c, s)] },
    FinderDot {
        id: "outlined-square",
        rule: |c, s| {
            vec![
                Primitive::ring(Primitive::square(c, s), Primitive::square(c, s * 0.8)),
                Primitive::square(c, s * 0.55),
            ]
        },
    },
    FinderDot {
        id: "outlined-rounded-square",
        rule: |c, s| {
            vec![
                Primitive::ring(Primitive::rounded_square(c, s, 0.25), Primitive::rounded_square(c, s * 0.8, 0.25)),
                Primitive::rounded_square(c, s * 0.55, 0.25),
            ]
        },
    },
    FinderDot { id: "star", rule: |c, s| vec![Primitive::star(c, s, 5, 0.5)] },
    FinderDot { id: "sun", rule: sun },
    FinderDot { id: "x", rule: |c, s| vec![Primitive::cross(c, s * 1.05, s * 0.35).rotated(c, 45.0)] },
    FinderDot {
        id: "x-rounded",
        rule: |c, s| {
            let (len, arm) = (s * 1.2, s * 0.35);
            vec![
                Primitive::rounded(c, len, arm, [arm / 2.0; 4]).rotated(c, 45.0),
                Primitive::rounded(c, len, arm, [arm / 2.0; 4]).rotated(c, -45.0),
            ]
        },
    },
    FinderDot { id: "leaf", rule: |c, s| vec![Primitive::rounded(c, s, s, LEAF.map(|r| r * s))] },
];

/// Filled disk with eight radial rays reaching the edge of the dot box.
fn sun(c: Point, s: f64) -> Vec<Primitive> {
    let half = s / 2.0;
    let ray_width = s * 0.12;
    let mut prims = vec![Primitive::circle(c, s * 0.55)];
    for i in 0..8 {
        let tip = c.offset(0.0, -half);
        let base_l = c.offset(-ray_width / 2.0, -half * 0.6);
        let base_r = c.offset(ray_width / 2.0, -half * 0.6);
        let angle = 45.0 * f64::from(i);
        prims.push(Primitive::Polygon(
            [tip, base_r, base_l].iter().map(|p| p.rotate_around(c, angle)).collect(),
        ));
    }
    prims
}

/// Looks up a finder-dot shape, falling back to [`DEFAULT_FINDER_DOT`].
pub fn finder_dot(id: &str) -> &'static FinderDot {
    let wanted = id.trim();
    FINDER_DOTS
        .iter()
        .find(|s| s.id.eq_ignore_ascii_case(wanted))
        .unwrap_or(&FINDER_DOTS[0])
}

pub fn finder_dot_ids() -> impl Iterator<Item = &'static str> {
    FINDER_DOTS.iter().map(|s| s.id)
}

#[cfg(test)]
mod tests {
    use super::super::geometry::Bounds;
    use super::*;

    const BLOCK: f64 = 70.0;
    const CENTER: Point = Point::new(35.0, 35.0);

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_every_square_ring_is_one_seventh() {
        for id in finder_square_ids() {
            let prims = finder_square(id).render(CENTER, BLOCK);
            let Primitive::Ring { outer, inner } = &prims[0] else {
                panic!("{id}: first primitive must be the outer ring");
            };
            let (o, i) = (outer.bounds(), inner.bounds());
            assert!(close(o.width(), BLOCK), "{id}: outer edge {}", o.width());
            assert!(close((o.width() - i.width()) / 2.0, BLOCK / 7.0), "{id}: ring thickness");
            assert!(close((o.height() - i.height()) / 2.0, BLOCK / 7.0), "{id}: ring thickness");
        }
    }

    #[test]
    fn test_double_border_ring_sits_between_hole_and_dot() {
        let doubles: Vec<_> = finder_square_ids().filter(|id| finder_square(id).is_double()).collect();
        assert!(!doubles.is_empty());
        for id in doubles {
            let prims = finder_square(id).render(CENTER, BLOCK);
            assert_eq!(prims.len(), 2);
            let Primitive::Ring { outer, inner } = &prims[1] else {
                panic!("{id}: inset ring expected");
            };
            let edge = outer.bounds().width() / BLOCK;
            assert!((0.55..=0.65).contains(&edge), "{id}: inset ring at {edge}");
            assert!(inner.bounds().width() > BLOCK * DOT_RATIO, "{id}: inset ring hits the dot");
        }
    }

    #[test]
    fn test_every_dot_fits_three_sevenths() {
        let dot = BLOCK * DOT_RATIO;
        for id in finder_dot_ids() {
            let b = Bounds::enclosing(finder_dot(id).render(CENTER, BLOCK).iter().map(Primitive::bounds)).unwrap();
            assert!(b.width() <= dot + 1e-6 && b.height() <= dot + 1e-6, "{id} overflows the dot box");
            assert!(close(b.center().x, 35.0), "{id} is not centered");
        }
        for id in ["square", "dot", "diamond", "sun", "ringed-dot", "outlined-square", "heart"] {
            let b = Bounds::enclosing(finder_dot(id).render(CENTER, BLOCK).iter().map(Primitive::bounds)).unwrap();
            assert!(close(b.width(), dot), "{id}: width {}", b.width());
            assert!(close(b.height(), dot), "{id}: height {}", b.height());
        }
    }

    #[test]
    fn test_x_dots_stay_inside_the_dot_box() {
        let dot = BLOCK * DOT_RATIO;
        let extent = |id: &str| {
            Bounds::enclosing(finder_dot(id).render(CENTER, BLOCK).iter().map(Primitive::bounds)).unwrap()
        };
        // Straight cross: tip corners sit at (length + arm) / 2 along each diagonal.
        let x = extent("x");
        assert!(close(x.width(), (1.05 + 0.35) / 2f64.sqrt() * dot), "x: width {}", x.width());
        assert!(x.width() <= dot);
        // Capsules: straight segment tilted 45 degrees, plus the cap radius.
        let rounded = extent("x-rounded");
        let half = (0.6 - 0.175) / 2f64.sqrt() + 0.175;
        assert!(close(rounded.width(), 2.0 * half * dot), "x-rounded: width {}", rounded.width());
        assert!(close(rounded.height(), rounded.width()));
        assert!(rounded.width() <= dot);
    }

    #[test]
    fn test_lookups_fall_back() {
        assert_eq!(finder_square("shape99").id, DEFAULT_FINDER_SQUARE);
        assert_eq!(finder_dot("").id, DEFAULT_FINDER_DOT);
        assert_eq!(finder_dot("SUN").id, "sun");
        assert_eq!(finder_square_ids().count(), 17);
        assert_eq!(finder_dot_ids().count(), 17);
    }
}
