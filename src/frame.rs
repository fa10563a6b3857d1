//! Frame compositor.
//!
//! Wraps a rendered symbol document in a decorative frame. The inner document is nested as a
//! child `<svg>` at its native size and only ever padded, so the data matrix is never scaled or
//! touched. Preview and raster export both call [`compose`]; there is no second code path.

use tracing::debug;

use crate::design::{Color, DesignSpec};
use crate::style::{frame_kind, BorderStyle, FrameKind, FrameTemplate};
use crate::svg::{fmt_num, Element, SvgDocument};

/// Longest frame text rendered, in characters.
pub const MAX_FRAME_TEXT: usize = 30;
/// Smallest accepted frame font size.
pub const MIN_FONT_SIZE: f64 = 10.0;
/// Largest accepted frame font size.
pub const MAX_FONT_SIZE: f64 = 36.0;
/// Banner height of the media-player frame, independent of font size.
pub const MEDIA_BANNER_HEIGHT: f64 = 56.0;

const STROKE: f64 = 4.0;
const PADDING: f64 = 12.0;
const FONT_FAMILY: &str = "sans-serif";
// Rough advance width of an average glyph, as a fraction of the font size.
const GLYPH_WIDTH: f64 = 0.6;

/// Returns the document wrapped in the frame selected by `design.frame_id`.
///
/// # Arguments
///
/// * `inner` - The rendered symbol document.
/// * `design` - Supplies the frame id, text, colors and font size.
///
/// # Returns
///
/// `inner` unchanged for negative ids, otherwise a larger document containing it.
pub fn compose(inner: SvgDocument, design: &DesignSpec) -> SvgDocument {
    match frame_kind(design.frame_id) {
        FrameKind::None => inner,
        FrameKind::MediaPlayer => media_player(inner, design),
        FrameKind::Template(template) => templated(inner, design, template),
    }
}

/// Trims and truncates frame text to [`MAX_FRAME_TEXT`] characters.
pub fn frame_text(raw: &str) -> String {
    raw.trim().chars().take(MAX_FRAME_TEXT).collect()
}

/// Clamps a requested font size into the readable range. Non-finite input gets the minimum.
pub fn clamp_font_size(requested: f64) -> f64 {
    if requested.is_finite() {
        requested.clamp(MIN_FONT_SIZE, MAX_FONT_SIZE)
    } else {
        MIN_FONT_SIZE
    }
}

/// Banner height for a clamped font size.
pub fn banner_height(font_size: f64) -> f64 {
    (font_size * 2.2).round()
}

fn templated(inner: SvgDocument, design: &DesignSpec, template: &FrameTemplate) -> SvgDocument {
    let font = clamp_font_size(design.frame_font_size);
    let text = frame_text(&design.frame_text);
    let banner = banner_height(font);
    let inset = STROKE + PADDING;

    let top = if template.banner.has_top() { banner } else { 0.0 };
    let bottom = if template.banner.has_bottom() { banner } else { 0.0 };
    let (inner_w, inner_h) = (inner.width(), inner.height());
    let width = inner_w + 2.0 * inset;
    let height = inner_h + 2.0 * inset + top + bottom;

    let radius = template.corners.radius().min(width / 2.0).min(height / 2.0);
    let frame_color = design.frame_color.to_hex();
    let mut doc = SvgDocument::new(width, height);

    let fill = design.background().map_or_else(|| "none".to_string(), Color::to_hex);
    doc.push(border(template.border, width, height, radius, &frame_color, &fill));

    let banner_width = width - 2.0 * STROKE;
    if top > 0.0 {
        doc.push(banner_group("frame-banner-top", STROKE, STROKE, banner_width, top, &text, font, design));
    }
    if bottom > 0.0 {
        let y = height - STROKE - bottom;
        doc.push(banner_group("frame-banner-bottom", STROKE, y, banner_width, bottom, &text, font, design));
    }

    doc.push(inner.into_nested(inset, inset + top));
    debug!(frame = template.id, width, height, "frame composed");
    doc
}

fn border(style: BorderStyle, width: f64, height: f64, radius: f64, color: &str, fill: &str) -> Element {
    let outline = |inset: f64, stroke: f64| {
        Element::new("rect")
            .num("x", inset)
            .num("y", inset)
            .num("width", width - 2.0 * inset)
            .num("height", height - 2.0 * inset)
            .num("rx", (radius - inset).max(0.0))
            .attr("stroke", color)
            .num("stroke-width", stroke)
    };
    let mut group = Element::new("g").attr("id", "frame-border");
    match style {
        BorderStyle::Solid => group.push(outline(STROKE / 2.0, STROKE).attr("fill", fill)),
        BorderStyle::Dashed => group.push(
            outline(STROKE / 2.0, STROKE)
                .attr("fill", fill)
                .attr("stroke-dasharray", format!("{} {}", fmt_num(STROKE * 3.0), fmt_num(STROKE * 1.5))),
        ),
        BorderStyle::Dotted => group.push(
            outline(STROKE / 2.0, STROKE)
                .attr("fill", fill)
                .attr("stroke-linecap", "round")
                .attr("stroke-dasharray", format!("0 {}", fmt_num(STROKE * 2.0))),
        ),
        BorderStyle::Double => {
            let thin = STROKE / 3.0;
            group.push(outline(thin / 2.0, thin).attr("fill", fill));
            group.push(outline(STROKE - thin / 2.0, thin).attr("fill", "none"));
        }
    }
    group
}

#[allow(clippy::too_many_arguments)]
fn banner_group(
    id: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    text: &str,
    font: f64,
    design: &DesignSpec,
) -> Element {
    let font = fit_font(text, font, width - 2.0 * PADDING);
    let caption =
        label(text, x + width / 2.0, y + height / 2.0, font, design.frame_text_color).attr("text-anchor", "middle");
    Element::new("g")
        .attr("id", id)
        .child(
            Element::new("rect")
                .num("x", x)
                .num("y", y)
                .num("width", width)
                .num("height", height)
                .attr("fill", design.frame_color.to_hex()),
        )
        .child(caption)
}

/// Shrinks the font until the estimated run fits `available`, never below [`MIN_FONT_SIZE`].
fn fit_font(text: &str, font: f64, available: f64) -> f64 {
    let chars = text.chars().count().max(1) as f64;
    let fitting = available / (chars * GLYPH_WIDTH);
    font.min(fitting).max(MIN_FONT_SIZE)
}

fn label(text: &str, x: f64, y: f64, font: f64, color: Color) -> Element {
    Element::new("text")
        .num("x", x)
        .num("y", y)
        .attr("font-family", FONT_FAMILY)
        .num("font-size", font)
        .attr("font-weight", "bold")
        .attr("dominant-baseline", "central")
        .attr("fill", color.to_hex())
        .text(text)
}

fn media_player(inner: SvgDocument, design: &DesignSpec) -> SvgDocument {
    let (inner_w, inner_h) = (inner.width(), inner.height());
    let width = inner_w + 2.0 * PADDING;
    let height = inner_h + 2.0 * PADDING + MEDIA_BANNER_HEIGHT;
    let text_color = design.frame_text_color.to_hex();
    let mut doc = SvgDocument::new(width, height);

    doc.push(
        Element::new("rect")
            .attr("id", "frame-body")
            .num("width", width)
            .num("height", height)
            .num("rx", 12.0)
            .attr("fill", design.frame_color.to_hex()),
    );
    if let Some(bg) = design.background() {
        doc.push(
            Element::new("rect")
                .num("x", PADDING)
                .num("y", PADDING)
                .num("width", inner_w)
                .num("height", inner_h)
                .attr("fill", bg.to_hex()),
        );
    }
    doc.push(inner.into_nested(PADDING, PADDING));

    let top = inner_h + 2.0 * PADDING;
    let mid = top + MEDIA_BANNER_HEIGHT / 2.0 - 6.0;
    let glyph = 16.0;
    let play_x = PADDING + 4.0;
    let play = format!(
        "M{} {}L{} {}L{} {}Z",
        fmt_num(play_x),
        fmt_num(mid - glyph / 2.0),
        fmt_num(play_x + glyph * 0.87),
        fmt_num(mid),
        fmt_num(play_x),
        fmt_num(mid + glyph / 2.0),
    );
    let text_x = play_x + glyph + 10.0;
    let text = frame_text(&design.frame_text);
    let line_y = top + MEDIA_BANNER_HEIGHT - 12.0;
    let progress_end = PADDING + (width - 2.0 * PADDING) * 0.35;

    let banner = Element::new("g")
        .attr("id", "frame-banner-bottom")
        .child(Element::new("path").attr("d", play).attr("fill", &text_color))
        .child(label(&text, text_x, mid, fit_font(&text, 16.0, width - text_x - PADDING), design.frame_text_color))
        .child(
            Element::new("line")
                .num("x1", PADDING)
                .num("y1", line_y)
                .num("x2", width - PADDING)
                .num("y2", line_y)
                .attr("stroke", &text_color)
                .attr("stroke-opacity", "0.35")
                .num("stroke-width", 3.0)
                .attr("stroke-linecap", "round"),
        )
        .child(
            Element::new("line")
                .num("x1", PADDING)
                .num("y1", line_y)
                .num("x2", progress_end)
                .num("y2", line_y)
                .attr("stroke", &text_color)
                .num("stroke-width", 3.0)
                .attr("stroke-linecap", "round"),
        );
    doc.push(banner);
    debug!(width, height, "media-player frame composed");
    doc
}
