//! Frame templates.
//!
//! Id `0` is the media-player frame, ids `1..=30` are general templates and any negative id
//! means no frame. Ids above the table fall back to template `1`.

/// Where text banners sit relative to the symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BannerPlacement {
    None,
    Top,
    Bottom,
    Both,
}

impl BannerPlacement {
    pub fn has_top(self) -> bool {
        matches!(self, BannerPlacement::Top | BannerPlacement::Both)
    }

    pub fn has_bottom(self) -> bool {
        matches!(self, BannerPlacement::Bottom | BannerPlacement::Both)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BorderStyle {
    Solid,
    Dashed,
    Dotted,
    Double,
}

/// Corner rounding applied to the outer border.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CornerClass {
    Sharp,
    Soft,
    Round,
    Pill,
}

impl CornerClass {
    /// Corner radius in document units.
    pub fn radius(self) -> f64 {
        match self {
            CornerClass::Sharp => 0.0,
            CornerClass::Soft => 6.0,
            CornerClass::Round => 16.0,
            CornerClass::Pill => 28.0,
        }
    }
}

/// A general frame template.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameTemplate {
    pub id: i32,
    pub banner: BannerPlacement,
    pub border: BorderStyle,
    pub corners: CornerClass,
}

/// Result of a frame lookup.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    None,
    MediaPlayer,
    Template(&'static FrameTemplate),
}

/// Id reserved for the media-player frame.
pub const MEDIA_PLAYER_FRAME: i32 = 0;
/// Template used when an id is above the table.
pub const DEFAULT_FRAME: i32 = 1;

macro_rules! frames {
    ($(($id:literal, $banner:ident, $border:ident, $corners:ident)),* $(,)?) => {
        &[$(FrameTemplate {
            id: $id,
            banner: BannerPlacement::$banner,
            border: BorderStyle::$border,
            corners: CornerClass::$corners,
        }),*]
    };
}

static FRAME_TEMPLATES: &[FrameTemplate] = frames![
    (1, Bottom, Solid, Sharp),
    (2, Bottom, Solid, Soft),
    (3, Bottom, Solid, Round),
    (4, Top, Solid, Sharp),
    (5, Top, Solid, Round),
    (6, Both, Solid, Soft),
    (7, None, Solid, Sharp),
    (8, None, Solid, Round),
    (9, Bottom, Dashed, Sharp),
    (10, Bottom, Dashed, Round),
    (11, Top, Dashed, Soft),
    (12, Both, Dashed, Sharp),
    (13, None, Dashed, Round),
    (14, Bottom, Dotted, Soft),
    (15, Top, Dotted, Round),
    (16, Both, Dotted, Pill),
    (17, None, Dotted, Sharp),
    (18, Bottom, Double, Sharp),
    (19, Bottom, Double, Round),
    (20, Top, Double, Soft),
    (21, Both, Double, Round),
    (22, None, Double, Pill),
    (23, Bottom, Solid, Pill),
    (24, Top, Solid, Pill),
    (25, Both, Solid, Round),
    (26, Bottom, Dashed, Pill),
    (27, Top, Double, Sharp),
    (28, Both, Dotted, Soft),
    (29, None, Solid, Soft),
    (30, Bottom, Dotted, Round),
];

/// Resolves a frame id.
pub fn frame_kind(id: i32) -> FrameKind {
    match id {
        i32::MIN..=-1 => FrameKind::None,
        MEDIA_PLAYER_FRAME => FrameKind::MediaPlayer,
        _ => FrameKind::Template(
            FRAME_TEMPLATES
                .iter()
                .find(|t| t.id == id)
                .unwrap_or(&FRAME_TEMPLATES[(DEFAULT_FRAME - 1) as usize]),
        ),
    }
}

/// Number of general templates, excluding the media player.
pub fn template_count() -> usize {
    FRAME_TEMPLATES.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_is_dense() {
        assert_eq!(template_count(), 30);
        for (i, t) in FRAME_TEMPLATES.iter().enumerate() {
            assert_eq!(t.id as usize, i + 1);
        }
    }

    #[test]
    fn test_frame_kind_ranges() {
        assert_eq!(frame_kind(-1), FrameKind::None);
        assert_eq!(frame_kind(-40), FrameKind::None);
        assert_eq!(frame_kind(0), FrameKind::MediaPlayer);
        match frame_kind(16) {
            FrameKind::Template(t) => {
                assert_eq!(t.banner, BannerPlacement::Both);
                assert_eq!(t.border, BorderStyle::Dotted);
            }
            other => panic!("unexpected {other:?}"),
        }
        match frame_kind(31) {
            FrameKind::Template(t) => assert_eq!(t.id, DEFAULT_FRAME),
            other => panic!("unexpected {other:?}"),
        }
    }
}
