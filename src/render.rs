//! Vector renderer.
//!
//! Places decorated geometry for a module matrix on a square canvas:
//!
//! 1. `cell = (canvas - 2 * margin) / matrix_size`.
//! 2. Every dark module outside the three finder blocks gets the module-shape rule at its
//!    center.
//! 3. Each finder block gets the finder-square rule, then the finder-dot rule on top.
//! 4. With a logo, a safe zone is cleared in the middle and the logo drawn clipped inside it.
//!
//! Rendering is a pure function of its inputs, so identical inputs give byte-identical output.

use tracing::debug;

use crate::design::{Color, DesignSpec};
use crate::logo::Logo;
use crate::matrix::{ModuleMatrix, FINDER_SIZE};
use crate::style::{finder_dot, finder_square, module_shape, Bounds, ModuleCell, Point, Primitive};
use crate::svg::{Element, SvgDocument};

/// Logo safe zone edge as a fraction of the canvas.
pub const LOGO_ZONE_RATIO: f64 = 0.35;
/// Logo image edge as a fraction of the canvas.
pub const LOGO_IMAGE_RATIO: f64 = 0.28;

const GRADIENT_ID: &str = "module-gradient";
const LOGO_CLIP_ID: &str = "logo-clip";

/// Canvas geometry, in document units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Canvas {
    pub size: f64,
    pub margin: f64,
}

impl Canvas {
    pub fn new(size: f64, margin: f64) -> Self {
        Self { size, margin }
    }

    pub fn cell_size(&self, matrix_size: usize) -> f64 {
        (self.size - 2.0 * self.margin) / matrix_size as f64
    }

    fn center(&self) -> Point {
        Point::new(self.size / 2.0, self.size / 2.0)
    }
}

/// Geometry for one finder block.
#[derive(Clone, Debug, PartialEq)]
pub struct FinderGeometry {
    pub block: Bounds,
    pub square: Vec<Primitive>,
    pub dot: Vec<Primitive>,
}

/// Unpainted layout of a symbol.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    pub canvas: Canvas,
    pub cell_size: f64,
    pub modules: Vec<Primitive>,
    pub finders: Vec<FinderGeometry>,
    /// Area cleared for the logo, if any.
    pub logo_zone: Option<Bounds>,
}

/// Computes geometry for `matrix` under `design`, before paint is applied.
pub fn layout(matrix: &ModuleMatrix, design: &DesignSpec, canvas: Canvas, with_logo: bool) -> Scene {
    let cell = canvas.cell_size(matrix.size());
    let origin = canvas.margin;
    let logo_zone = with_logo.then(|| square_bounds(canvas.center(), canvas.size * LOGO_ZONE_RATIO));

    let shape = module_shape(&design.dots_type);
    let mut modules = Vec::new();
    for (x, y) in matrix.data_modules() {
        let min = Point::new(origin + x as f64 * cell, origin + y as f64 * cell);
        if let Some(zone) = &logo_zone {
            if overlaps(zone, min, cell) {
                continue;
            }
        }
        let module = ModuleCell {
            center: min.offset(cell / 2.0, cell / 2.0),
            size: cell,
            col: x,
            row: y,
            seed: design.shake_seed,
        };
        modules.extend(shape.render(&module));
    }

    let square = finder_square(&design.corners_square_type);
    let dot = finder_dot(&design.corners_dot_type);
    let block = cell * FINDER_SIZE as f64;
    let finders = matrix
        .finder_origins()
        .iter()
        .map(|&(fx, fy)| {
            let center = Point::new(origin + fx as f64 * cell + block / 2.0, origin + fy as f64 * cell + block / 2.0);
            FinderGeometry {
                block: square_bounds(center, block),
                square: square.render(center, block),
                dot: dot.render(center, block),
            }
        })
        .collect();

    Scene { canvas, cell_size: cell, modules, finders, logo_zone }
}

/// Renders a complete, self-contained vector document for the symbol.
///
/// # Arguments
///
/// * `matrix` - The encoded module matrix.
/// * `design` - Style ids, colors and gradient settings.
/// * `logo` - An already-loaded logo, if the design has one.
/// * `canvas` - Document size and quiet margin.
pub fn render_svg(matrix: &ModuleMatrix, design: &DesignSpec, logo: Option<&Logo>, canvas: Canvas) -> SvgDocument {
    let scene = layout(matrix, design, canvas, logo.is_some());
    debug!(
        matrix = matrix.size(),
        modules = scene.modules.len(),
        dots_type = %design.dots_type,
        "symbol laid out"
    );
    paint(&scene, design, logo)
}

fn paint(scene: &Scene, design: &DesignSpec, logo: Option<&Logo>) -> SvgDocument {
    let size = scene.canvas.size;
    let mut doc = SvgDocument::new(size, size);

    let gradient = design.gradient_stop();
    let mut defs = Element::new("defs");
    if let Some(second) = gradient {
        defs.push(linear_gradient(size, design.dots_color, second));
    }
    if let (Some(_), Some(zone)) = (logo, scene.logo_zone) {
        let image = square_bounds(zone.center(), size * LOGO_IMAGE_RATIO);
        defs.push(Element::new("clipPath").attr("id", LOGO_CLIP_ID).child(rect_element(&image)));
    }
    if !defs.children().is_empty() {
        doc.push(defs);
    }

    if let Some(bg) = design.background() {
        doc.push(
            Element::new("rect")
                .attr("id", "background")
                .num("width", size)
                .num("height", size)
                .attr("fill", bg.to_hex()),
        );
    }

    let module_fill = match gradient {
        Some(_) => format!("url(#{GRADIENT_ID})"),
        None => design.dots_color.to_hex(),
    };
    let mut modules = Element::new("g").attr("id", "modules");
    modules.extend(scene.modules.iter().map(|p| p.to_element(&module_fill)));
    doc.push(modules);

    let square_fill = design.corners_square_color.to_hex();
    let dot_fill = design.corners_dot_color.to_hex();
    let mut finders = Element::new("g").attr("id", "finders");
    for finder in &scene.finders {
        finders.extend(finder.square.iter().map(|p| p.to_element(&square_fill)));
        finders.extend(finder.dot.iter().map(|p| p.to_element(&dot_fill)));
    }
    doc.push(finders);

    if let (Some(logo), Some(zone)) = (logo, scene.logo_zone) {
        doc.push(logo_layer(logo, zone, size, design.background()));
    }
    doc
}

fn linear_gradient(size: f64, from: Color, to: Color) -> Element {
    // Fixed top-left to bottom-right diagonal across the whole canvas.
    Element::new("linearGradient")
        .attr("id", GRADIENT_ID)
        .attr("gradientUnits", "userSpaceOnUse")
        .num("x1", 0.0)
        .num("y1", 0.0)
        .num("x2", size)
        .num("y2", size)
        .child(Element::new("stop").attr("offset", "0").attr("stop-color", from.to_hex()))
        .child(Element::new("stop").attr("offset", "1").attr("stop-color", to.to_hex()))
}

fn logo_layer(logo: &Logo, zone: Bounds, size: f64, background: Option<Color>) -> Element {
    let mut layer = Element::new("g").attr("id", "logo");
    if let Some(bg) = background {
        layer.push(rect_element(&zone).attr("fill", bg.to_hex()));
    }
    let image = square_bounds(zone.center(), size * LOGO_IMAGE_RATIO);
    layer.push(
        Element::new("image")
            .num("x", image.min_x)
            .num("y", image.min_y)
            .num("width", image.width())
            .num("height", image.height())
            .attr("preserveAspectRatio", "xMidYMid meet")
            .attr("clip-path", format!("url(#{LOGO_CLIP_ID})"))
            .attr("xlink:href", logo.data_uri()),
    );
    layer
}

fn rect_element(b: &Bounds) -> Element {
    Element::new("rect").num("x", b.min_x).num("y", b.min_y).num("width", b.width()).num("height", b.height())
}

fn square_bounds(center: Point, size: f64) -> Bounds {
    let half = size / 2.0;
    Bounds {
        min_x: center.x - half,
        min_y: center.y - half,
        max_x: center.x + half,
        max_y: center.y + half,
    }
}

fn overlaps(zone: &Bounds, min: Point, cell: f64) -> bool {
    min.x < zone.max_x && min.x + cell > zone.min_x && min.y < zone.max_y && min.y + cell > zone.min_y
}
