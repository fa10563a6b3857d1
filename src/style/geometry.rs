//! Vector primitives produced by style rules.
//!
//! Every rule in the registry is a pure function returning a list of [`Primitive`]s sized to a
//! box of edge `size` around a center point. The renderer assigns paint; primitives carry
//! geometry only.

use crate::svg::{fmt_num, Element};

/// A point in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Rotates around `center` by `degrees`, clockwise in screen space.
    pub fn rotate_around(self, center: Point, degrees: f64) -> Self {
        let (sin, cos) = degrees.to_radians().sin_cos();
        let (dx, dy) = (self.x - center.x, self.y - center.y);
        Self::new(center.x + dx * cos - dy * sin, center.y + dx * sin + dy * cos)
    }
}

/// Axis-aligned bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Bounds {
    fn of_points(points: impl IntoIterator<Item = Point>) -> Self {
        let mut b = Bounds {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        };
        for p in points {
            b.min_x = b.min_x.min(p.x);
            b.min_y = b.min_y.min(p.y);
            b.max_x = b.max_x.max(p.x);
            b.max_y = b.max_y.max(p.y);
        }
        b
    }

    fn union(self, other: Bounds) -> Self {
        Bounds {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    fn corners(&self) -> [Point; 4] {
        [
            Point::new(self.min_x, self.min_y),
            Point::new(self.max_x, self.min_y),
            Point::new(self.max_x, self.max_y),
            Point::new(self.min_x, self.max_y),
        ]
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point {
        Point::new((self.min_x + self.max_x) / 2.0, (self.min_y + self.max_y) / 2.0)
    }

    /// Union of several bounds; `None` for an empty list.
    pub fn enclosing(all: impl IntoIterator<Item = Bounds>) -> Option<Bounds> {
        all.into_iter().reduce(Bounds::union)
    }
}

/// A single path segment.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PathCmd {
    MoveTo(Point),
    LineTo(Point),
    /// Two control points and an end point.
    CubicTo(Point, Point, Point),
    Close,
}

/// Geometry emitted by a style rule.
#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    /// Rectangle with per-corner radii: top-left, top-right, bottom-right, bottom-left.
    Rect { x: f64, y: f64, width: f64, height: f64, radii: [f64; 4] },
    Circle { cx: f64, cy: f64, r: f64 },
    Polygon(Vec<Point>),
    Path(Vec<PathCmd>),
    /// `outer` with `inner` cut out, rendered with the even-odd fill rule.
    Ring { outer: Box<Primitive>, inner: Box<Primitive> },
    /// `shape` rotated by `degrees` around `center`.
    Rotated { shape: Box<Primitive>, center: Point, degrees: f64 },
}

impl Primitive {
    /// Square of edge `size` centered on `c`.
    pub fn square(c: Point, size: f64) -> Self {
        Self::rounded(c, size, size, [0.0; 4])
    }

    /// Rectangle centered on `c` with per-corner radii.
    pub fn rounded(c: Point, width: f64, height: f64, radii: [f64; 4]) -> Self {
        let limit = (width.min(height) / 2.0).max(0.0);
        Primitive::Rect {
            x: c.x - width / 2.0,
            y: c.y - height / 2.0,
            width,
            height,
            radii: radii.map(|r| r.clamp(0.0, limit)),
        }
    }

    /// Square with all corners rounded by `ratio` of its edge.
    pub fn rounded_square(c: Point, size: f64, ratio: f64) -> Self {
        Self::rounded(c, size, size, [ratio * size; 4])
    }

    /// Circle inscribed in a box of edge `size`.
    pub fn circle(c: Point, size: f64) -> Self {
        Primitive::Circle { cx: c.x, cy: c.y, r: size / 2.0 }
    }

    /// Diamond (square rotated 45°) touching the four sides of a box of edge `size`.
    pub fn diamond(c: Point, size: f64) -> Self {
        let h = size / 2.0;
        Primitive::Polygon(vec![c.offset(0.0, -h), c.offset(h, 0.0), c.offset(0.0, h), c.offset(-h, 0.0)])
    }

    /// Plus sign with arms of thickness `arm` spanning a box of edge `size`.
    pub fn cross(c: Point, size: f64, arm: f64) -> Self {
        let (h, a) = (size / 2.0, arm / 2.0);
        Primitive::Polygon(vec![
            c.offset(-a, -h),
            c.offset(a, -h),
            c.offset(a, -a),
            c.offset(h, -a),
            c.offset(h, a),
            c.offset(a, a),
            c.offset(a, h),
            c.offset(-a, h),
            c.offset(-a, a),
            c.offset(-h, a),
            c.offset(-h, -a),
            c.offset(-a, -a),
        ])
    }

    /// Star with `points` tips on a circle of diameter `size`; the first tip points up.
    pub fn star(c: Point, size: f64, points: usize, inner_ratio: f64) -> Self {
        let outer = size / 2.0;
        let inner = outer * inner_ratio;
        let step = 180.0 / points as f64;
        let vertices = (0..points * 2)
            .map(|i| {
                let radius = if i % 2 == 0 { outer } else { inner };
                c.offset(0.0, -radius).rotate_around(c, step * i as f64)
            })
            .collect();
        Primitive::Polygon(vertices)
    }

    /// Heart filling a box of edge `size`.
    pub fn heart(c: Point, size: f64) -> Self {
        let (x0, y0) = (c.x - size / 2.0, c.y - size / 2.0);
        let p = |fx: f64, fy: f64| Point::new(x0 + fx * size, y0 + fy * size);
        Primitive::Path(vec![
            PathCmd::MoveTo(p(0.5, 0.25)),
            PathCmd::CubicTo(p(0.5, 0.0), p(0.0, 0.0), p(0.0, 0.3)),
            PathCmd::CubicTo(p(0.0, 0.6), p(0.35, 0.8), p(0.5, 1.0)),
            PathCmd::CubicTo(p(0.65, 0.8), p(1.0, 0.6), p(1.0, 0.3)),
            PathCmd::CubicTo(p(1.0, 0.0), p(0.5, 0.0), p(0.5, 0.25)),
            PathCmd::Close,
        ])
    }

    /// Hollow version of `outer`, cut by `inner`.
    pub fn ring(outer: Primitive, inner: Primitive) -> Self {
        Primitive::Ring { outer: Box::new(outer), inner: Box::new(inner) }
    }

    pub fn rotated(self, center: Point, degrees: f64) -> Self {
        Primitive::Rotated { shape: Box::new(self), center, degrees }
    }

    /// Bounding box. Curves are bounded by their control points, which is conservative.
    pub fn bounds(&self) -> Bounds {
        match self {
            Primitive::Rect { x, y, width, height, .. } => Bounds {
                min_x: *x,
                min_y: *y,
                max_x: x + width,
                max_y: y + height,
            },
            Primitive::Circle { cx, cy, r } => Bounds {
                min_x: cx - r,
                min_y: cy - r,
                max_x: cx + r,
                max_y: cy + r,
            },
            Primitive::Polygon(points) => Bounds::of_points(points.iter().copied()),
            Primitive::Path(cmds) => Bounds::of_points(cmds.iter().flat_map(|cmd| match *cmd {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) => vec![p],
                PathCmd::CubicTo(a, b, p) => vec![a, b, p],
                PathCmd::Close => Vec::new(),
            })),
            Primitive::Ring { outer, .. } => outer.bounds(),
            Primitive::Rotated { shape, center, degrees } => shape.rotated_bounds(*center, *degrees),
        }
    }

    /// Bounding box of this primitive after rotation by `degrees` around `center`.
    ///
    /// Exact for polygons, circles and uniformly rounded rectangles. Rectangles with mixed
    /// corner radii are measured with their smallest radius.
    fn rotated_bounds(&self, center: Point, degrees: f64) -> Bounds {
        let turn = |p: Point| p.rotate_around(center, degrees);
        match self {
            Primitive::Rect { x, y, width, height, radii } => {
                let r = radii.iter().copied().fold(f64::INFINITY, f64::min).max(0.0);
                let (sin, cos) = degrees.to_radians().sin_cos();
                let (hw, hh) = (width / 2.0 - r, height / 2.0 - r);
                let ex = hw * cos.abs() + hh * sin.abs() + r;
                let ey = hw * sin.abs() + hh * cos.abs() + r;
                let c = turn(Point::new(x + width / 2.0, y + height / 2.0));
                Bounds { min_x: c.x - ex, min_y: c.y - ey, max_x: c.x + ex, max_y: c.y + ey }
            }
            Primitive::Circle { cx, cy, r } => {
                let c = turn(Point::new(*cx, *cy));
                Bounds { min_x: c.x - r, min_y: c.y - r, max_x: c.x + r, max_y: c.y + r }
            }
            Primitive::Polygon(points) => Bounds::of_points(points.iter().copied().map(turn)),
            Primitive::Path(cmds) => Bounds::of_points(cmds.iter().flat_map(|cmd| match *cmd {
                PathCmd::MoveTo(p) | PathCmd::LineTo(p) => vec![turn(p)],
                PathCmd::CubicTo(a, b, p) => vec![turn(a), turn(b), turn(p)],
                PathCmd::Close => Vec::new(),
            })),
            Primitive::Ring { outer, .. } => outer.rotated_bounds(center, degrees),
            Primitive::Rotated { .. } => Bounds::of_points(self.bounds().corners().into_iter().map(turn)),
        }
    }

    /// SVG path data describing this primitive's outline.
    pub fn path_data(&self) -> String {
        match self {
            Primitive::Rect { x, y, width, height, radii } => rect_path(*x, *y, *width, *height, *radii),
            Primitive::Circle { cx, cy, r } => format!(
                "M{},{}a{r},{r} 0 1,0 {d},0a{r},{r} 0 1,0 -{d},0Z",
                fmt_num(cx - r),
                fmt_num(*cy),
                r = fmt_num(*r),
                d = fmt_num(r * 2.0),
            ),
            Primitive::Polygon(points) => {
                let mut d = String::new();
                for (i, p) in points.iter().enumerate() {
                    d.push(if i == 0 { 'M' } else { 'L' });
                    push_point(&mut d, *p);
                }
                d.push('Z');
                d
            }
            Primitive::Path(cmds) => {
                let mut d = String::new();
                for cmd in cmds {
                    match *cmd {
                        PathCmd::MoveTo(p) => {
                            d.push('M');
                            push_point(&mut d, p);
                        }
                        PathCmd::LineTo(p) => {
                            d.push('L');
                            push_point(&mut d, p);
                        }
                        PathCmd::CubicTo(a, b, p) => {
                            d.push('C');
                            push_point(&mut d, a);
                            d.push(' ');
                            push_point(&mut d, b);
                            d.push(' ');
                            push_point(&mut d, p);
                        }
                        PathCmd::Close => d.push('Z'),
                    }
                }
                d
            }
            Primitive::Ring { outer, inner } => format!("{}{}", outer.path_data(), inner.path_data()),
            Primitive::Rotated { shape, center, degrees } => match shape.as_ref() {
                Primitive::Polygon(points) => Primitive::Polygon(
                    points.iter().map(|p| p.rotate_around(*center, *degrees)).collect(),
                )
                .path_data(),
                // Rounded shapes keep their arcs; rotation is applied as a transform instead.
                other => other.path_data(),
            },
        }
    }

    /// Converts to an SVG element filled with `fill`.
    pub fn to_element(&self, fill: &str) -> Element {
        match self {
            Primitive::Rect { x, y, width, height, radii } if radii.iter().all(|r| *r == radii[0]) => {
                let mut el = Element::new("rect").num("x", *x).num("y", *y).num("width", *width).num("height", *height);
                if radii[0] > 0.0 {
                    el = el.num("rx", radii[0]);
                }
                el.attr("fill", fill)
            }
            Primitive::Circle { cx, cy, r } => {
                Element::new("circle").num("cx", *cx).num("cy", *cy).num("r", *r).attr("fill", fill)
            }
            Primitive::Ring { .. } => Element::new("path")
                .attr("d", self.path_data())
                .attr("fill", fill)
                .attr("fill-rule", "evenodd"),
            Primitive::Rotated { shape, center, degrees } if !matches!(shape.as_ref(), Primitive::Polygon(_)) => {
                shape.to_element(fill).attr(
                    "transform",
                    format!("rotate({} {} {})", fmt_num(*degrees), fmt_num(center.x), fmt_num(center.y)),
                )
            }
            _ => Element::new("path").attr("d", self.path_data()).attr("fill", fill),
        }
    }
}

fn push_point(d: &mut String, p: Point) {
    d.push_str(&fmt_num(p.x));
    d.push(',');
    d.push_str(&fmt_num(p.y));
}

fn rect_path(x: f64, y: f64, w: f64, h: f64, [tl, tr, br, bl]: [f64; 4]) -> String {
    let n = fmt_num;
    let mut d = format!("M{},{}", n(x + tl), n(y));
    d.push_str(&format!("H{}", n(x + w - tr)));
    if tr > 0.0 {
        d.push_str(&format!("A{r},{r} 0 0,1 {},{}", n(x + w), n(y + tr), r = n(tr)));
    }
    d.push_str(&format!("V{}", n(y + h - br)));
    if br > 0.0 {
        d.push_str(&format!("A{r},{r} 0 0,1 {},{}", n(x + w - br), n(y + h), r = n(br)));
    }
    d.push_str(&format!("H{}", n(x + bl)));
    if bl > 0.0 {
        d.push_str(&format!("A{r},{r} 0 0,1 {},{}", n(x), n(y + h - bl), r = n(bl)));
    }
    d.push_str(&format!("V{}", n(y + tl)));
    if tl > 0.0 {
        d.push_str(&format!("A{r},{r} 0 0,1 {},{}", n(x + tl), n(y), r = n(tl)));
    }
    d.push('Z');
    d
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: Point = Point::new(10.0, 10.0);

    fn assert_close(a: f64, b: f64) {
        assert!((a - b).abs() < 1e-9, "{a} != {b}");
    }

    #[test]
    fn test_shapes_fill_their_box() {
        for shape in [
            Primitive::square(C, 4.0),
            Primitive::circle(C, 4.0),
            Primitive::diamond(C, 4.0),
            Primitive::cross(C, 4.0, 1.0),
            Primitive::heart(C, 4.0),
            Primitive::rounded_square(C, 4.0, 0.3),
        ] {
            let b = shape.bounds();
            assert_close(b.width(), 4.0);
            assert_close(b.height(), 4.0);
            assert_close(b.center().x, 10.0);
        }
    }

    #[test]
    fn test_star_tip_points_up() {
        let Primitive::Polygon(points) = Primitive::star(C, 4.0, 5, 0.5) else {
            panic!("star is a polygon");
        };
        assert_eq!(points.len(), 10);
        assert_close(points[0].x, 10.0);
        assert_close(points[0].y, 8.0);
    }

    #[test]
    fn test_rotated_bounds_grow() {
        let rotated = Primitive::square(C, 2.0).rotated(C, 45.0);
        assert_close(rotated.bounds().width(), 2.0 * 2f64.sqrt());
    }

    #[test]
    fn test_rotated_polygon_bounds_follow_vertices() {
        // A 45 degree cross reaches (h + a) / sqrt(2) from its center, not h * sqrt(2).
        let rotated = Primitive::cross(C, 4.0, 1.0).rotated(C, 45.0);
        assert_close(rotated.bounds().width(), 2.0 * 2.5 / 2f64.sqrt());
        assert_close(rotated.bounds().center().x, 10.0);
    }

    #[test]
    fn test_rotated_pill_bounds_are_exact() {
        // Capsule 6 x 2 at 45 degrees: straight segment 4 tilted, plus the cap radius.
        let pill = Primitive::rounded(C, 6.0, 2.0, [1.0; 4]).rotated(C, 45.0);
        let b = pill.bounds();
        assert_close(b.width(), 2.0 * (2.0 / 2f64.sqrt() + 1.0));
        assert_close(b.height(), b.width());
        let off_center = Primitive::circle(Point::new(12.0, 10.0), 2.0).rotated(C, 90.0).bounds();
        assert_close(off_center.center().x, 10.0);
        assert_close(off_center.center().y, 12.0);
    }

    #[test]
    fn test_ring_serializes_evenodd() {
        let ring = Primitive::ring(Primitive::square(C, 7.0), Primitive::square(C, 5.0));
        let el = ring.to_element("#000");
        assert_eq!(el.name(), "path");
        assert_eq!(el.get_attr("fill-rule"), Some("evenodd"));
        assert_eq!(el.get_attr("d").map(|d| d.matches('M').count()), Some(2));
    }

    #[test]
    fn test_uniform_rect_is_rect_element() {
        let el = Primitive::rounded_square(C, 4.0, 0.25).to_element("red");
        assert_eq!(el.name(), "rect");
        assert_eq!(el.get_attr("rx"), Some("1"));
        let leaf = Primitive::rounded(C, 4.0, 4.0, [1.0, 0.0, 1.0, 0.0]).to_element("red");
        assert_eq!(leaf.name(), "path");
    }
}
