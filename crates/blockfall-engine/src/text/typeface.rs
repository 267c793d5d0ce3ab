use std::collections::HashMap;

use serde::Deserialize;

use crate::coords::Vec2;

/// Error returned by [`ParsedFont::from_typeface_json`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TypefaceError {
    #[error("typeface json: {0}")]
    Json(String),

    #[error("glyph {glyph:?}: bad outline near token {token}: {detail}")]
    Outline { glyph: char, token: usize, detail: &'static str },

    #[error("glyph key {0:?} is not a single character")]
    GlyphKey(String),

    #[error("resolution must be positive, got {0}")]
    Resolution(f32),
}

/// One outline command, in font units.
#[derive(Debug, Copy, Clone, PartialEq)]
pub enum PathCommand {
    MoveTo(Vec2),
    LineTo(Vec2),
    QuadTo { ctrl: Vec2, to: Vec2 },
    CubicTo { ctrl1: Vec2, ctrl2: Vec2, to: Vec2 },
}

/// A glyph outline plus its horizontal advance, in font units.
#[derive(Debug, Clone, PartialEq)]
pub struct Glyph {
    pub advance: f32,
    pub x_min: f32,
    pub x_max: f32,
    pub outline: Vec<PathCommand>,
}

#[derive(Debug, Deserialize)]
struct RawGlyph {
    ha: f32,
    #[serde(default)]
    x_min: f32,
    #[serde(default)]
    x_max: f32,
    #[serde(default)]
    o: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawBoundingBox {
    y_min: f32,
    y_max: f32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTypeface {
    glyphs: HashMap<String, RawGlyph>,
    #[serde(default)]
    family_name: String,
    resolution: f32,
    bounding_box: RawBoundingBox,
    #[serde(default)]
    underline_thickness: f32,
}

/// Typeface-format font: per-character outlines plus vertical metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedFont {
    pub family_name: String,
    /// Font units per em.
    pub resolution: f32,
    pub y_min: f32,
    pub y_max: f32,
    pub underline_thickness: f32,
    glyphs: HashMap<char, Glyph>,
}

/// Flattened closed outline produced by [`ParsedFont::layout`], in scene units.
pub type Contour = Vec<Vec2>;

impl ParsedFont {
    /// Parses a typeface JSON document.
    pub fn from_typeface_json(src: &str) -> Result<Self, TypefaceError> {
        let raw: RawTypeface = serde_json::from_str(src).map_err(|e| TypefaceError::Json(e.to_string()))?;
        if !(raw.resolution > 0.0) {
            return Err(TypefaceError::Resolution(raw.resolution));
        }

        let mut glyphs = HashMap::with_capacity(raw.glyphs.len());
        for (key, g) in raw.glyphs {
            let mut chars = key.chars();
            let (Some(ch), None) = (chars.next(), chars.next()) else {
                return Err(TypefaceError::GlyphKey(key));
            };
            let outline = parse_outline(ch, &g.o)?;
            glyphs.insert(ch, Glyph { advance: g.ha, x_min: g.x_min, x_max: g.x_max, outline });
        }

        Ok(Self {
            family_name: raw.family_name,
            resolution: raw.resolution,
            y_min: raw.bounding_box.y_min,
            y_max: raw.bounding_box.y_max,
            underline_thickness: raw.underline_thickness,
            glyphs,
        })
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Distance between baselines at `size`.
    pub fn line_height(&self, size: f32) -> f32 {
        (self.y_max - self.y_min + self.underline_thickness) * (size / self.resolution)
    }

    /// Lays out `text` at `size` and flattens every glyph outline into closed
    /// contours. Curves are split into `curve_segments` straight pieces.
    ///
    /// `\n` starts a new line below the previous one. Characters without a glyph
    /// fall back to `?`; if that is missing too they are skipped.
    pub fn layout(&self, text: &str, size: f32, curve_segments: u32) -> Vec<Contour> {
        let scale = size / self.resolution;
        let line_height = self.line_height(size);
        let segments = curve_segments.max(1);

        let mut contours = Vec::new();
        let mut pen = Vec2::zero();

        for ch in text.chars() {
            if ch == '\n' {
                pen = Vec2::new(0.0, pen.y - line_height);
                continue;
            }

            let Some(glyph) = self.glyph(ch).or_else(|| self.glyph('?')) else {
                log::warn!("font `{}` has no glyph for {ch:?} and no `?` fallback", self.family_name);
                continue;
            };
            if !self.glyphs.contains_key(&ch) {
                log::warn!("font `{}` has no glyph for {ch:?}, using `?`", self.family_name);
            }

            flatten_outline(&glyph.outline, pen, scale, segments, &mut contours);
            pen.x += glyph.advance * scale;
        }

        contours
    }
}

fn parse_outline(glyph: char, src: &str) -> Result<Vec<PathCommand>, TypefaceError> {
    let tokens: Vec<&str> = src.split_whitespace().collect();
    let mut out = Vec::new();
    let mut i = 0;

    let point = |at: usize| -> Result<Vec2, TypefaceError> {
        let coord = |k: usize| -> Result<f32, TypefaceError> {
            tokens
                .get(k)
                .ok_or(TypefaceError::Outline { glyph, token: k, detail: "truncated command" })?
                .parse::<f32>()
                .map_err(|_| TypefaceError::Outline { glyph, token: k, detail: "expected a number" })
        };
        Ok(Vec2::new(coord(at)?, coord(at + 1)?))
    };

    while i < tokens.len() {
        let cmd = tokens[i];
        i += 1;
        match cmd {
            "m" => {
                out.push(PathCommand::MoveTo(point(i)?));
                i += 2;
            }
            "l" => {
                out.push(PathCommand::LineTo(point(i)?));
                i += 2;
            }
            // End point first, then control point.
            "q" => {
                let to = point(i)?;
                let ctrl = point(i + 2)?;
                out.push(PathCommand::QuadTo { ctrl, to });
                i += 4;
            }
            "b" => {
                let to = point(i)?;
                let ctrl1 = point(i + 2)?;
                let ctrl2 = point(i + 4)?;
                out.push(PathCommand::CubicTo { ctrl1, ctrl2, to });
                i += 6;
            }
            "z" => {}
            _ => {
                return Err(TypefaceError::Outline { glyph, token: i - 1, detail: "unknown command" });
            }
        }
    }

    Ok(out)
}

fn flatten_outline(
    outline: &[PathCommand],
    offset: Vec2,
    scale: f32,
    segments: u32,
    contours: &mut Vec<Contour>,
) {
    let place = |p: Vec2| p * scale + offset;
    let mut current: Contour = Vec::new();
    let mut last = offset;

    for cmd in outline {
        match *cmd {
            PathCommand::MoveTo(p) => {
                finish_contour(&mut current, contours);
                last = place(p);
                current.push(last);
            }
            PathCommand::LineTo(p) => {
                last = place(p);
                current.push(last);
            }
            PathCommand::QuadTo { ctrl, to } => {
                let (c, to) = (place(ctrl), place(to));
                for s in 1..=segments {
                    let t = s as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push(last * (u * u) + c * (2.0 * u * t) + to * (t * t));
                }
                last = to;
            }
            PathCommand::CubicTo { ctrl1, ctrl2, to } => {
                let (c1, c2, to) = (place(ctrl1), place(ctrl2), place(to));
                for s in 1..=segments {
                    let t = s as f32 / segments as f32;
                    let u = 1.0 - t;
                    current.push(
                        last * (u * u * u) + c1 * (3.0 * u * u * t) + c2 * (3.0 * u * t * t) + to * (t * t * t),
                    );
                }
                last = to;
            }
        }
    }
    finish_contour(&mut current, contours);
}

const MERGE_EPSILON: f32 = 1e-6;

/// Drops repeated points and the closing duplicate, then keeps the contour if it
/// still encloses something.
fn finish_contour(current: &mut Contour, contours: &mut Vec<Contour>) {
    let mut pts: Contour = Vec::with_capacity(current.len());
    for &p in current.iter() {
        if pts.last().is_none_or(|&q: &Vec2| !same_point(p, q)) {
            pts.push(p);
        }
    }
    while pts.len() > 1 && same_point(pts[0], pts[pts.len() - 1]) {
        pts.pop();
    }
    current.clear();
    if pts.len() >= 3 {
        contours.push(pts);
    }
}

#[inline]
fn same_point(a: Vec2, b: Vec2) -> bool {
    (a.x - b.x).abs() <= MERGE_EPSILON && (a.y - b.y).abs() <= MERGE_EPSILON
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Two glyphs: `I` is a 100×700 bar, `O` a 500×700 ring; `?` is a small square.
    pub(crate) const BLOCK_FONT: &str = r#"{
        "familyName": "Block",
        "resolution": 1000,
        "boundingBox": { "xMin": 0, "xMax": 1000, "yMin": -100, "yMax": 800 },
        "underlineThickness": 100,
        "glyphs": {
            "I": { "ha": 300, "x_min": 100, "x_max": 200, "o": "m 100 0 l 200 0 l 200 700 l 100 700 z" },
            "O": { "ha": 700, "x_min": 0, "x_max": 500,
                   "o": "m 0 0 l 500 0 l 500 700 l 0 700 l 0 0 m 100 100 l 100 600 l 400 600 l 400 100 z" },
            "?": { "ha": 400, "o": "m 0 0 l 300 0 l 300 300 l 0 300" },
            " ": { "ha": 500 }
        }
    }"#;

    fn font() -> ParsedFont {
        ParsedFont::from_typeface_json(BLOCK_FONT).unwrap()
    }

    // ── parsing ───────────────────────────────────────────────────────────

    #[test]
    fn parses_metrics_and_glyphs() {
        let f = font();
        assert_eq!(f.family_name, "Block");
        assert_eq!(f.glyph_count(), 4);
        assert_eq!(f.glyph('I').unwrap().advance, 300.0);
        assert!(f.glyph(' ').unwrap().outline.is_empty());
        assert_eq!(f.line_height(1.0), 1.0);
    }

    #[test]
    fn quadratic_lists_end_point_first() {
        let cmds = parse_outline('x', "m 0 0 q 10 0 5 5").unwrap();
        assert_eq!(
            cmds[1],
            PathCommand::QuadTo { ctrl: Vec2::new(5.0, 5.0), to: Vec2::new(10.0, 0.0) }
        );
    }

    #[test]
    fn truncated_outline_is_rejected() {
        let err = parse_outline('x', "m 0 0 l 10").unwrap_err();
        assert!(matches!(err, TypefaceError::Outline { glyph: 'x', detail: "truncated command", .. }));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(parse_outline('x', "m 0 0 k 1 1").is_err());
    }

    #[test]
    fn bad_documents_are_rejected() {
        assert!(matches!(ParsedFont::from_typeface_json("{"), Err(TypefaceError::Json(_))));
        let zero_res = BLOCK_FONT.replace("\"resolution\": 1000", "\"resolution\": 0");
        assert!(matches!(ParsedFont::from_typeface_json(&zero_res), Err(TypefaceError::Resolution(_))));
        let long_key = BLOCK_FONT.replace("\"?\":", "\"??\":");
        assert!(matches!(ParsedFont::from_typeface_json(&long_key), Err(TypefaceError::GlyphKey(_))));
    }

    // ── layout ────────────────────────────────────────────────────────────

    #[test]
    fn layout_advances_and_scales() {
        let contours = font().layout("II", 1.0, 12);
        assert_eq!(contours.len(), 2);
        assert!((contours[0][0].x - 0.1).abs() < 1e-6);
        // second bar starts one advance (0.3) to the right
        assert!((contours[1][0].x - 0.4).abs() < 1e-6);
    }

    #[test]
    fn closing_point_is_dropped() {
        let contours = font().layout("O", 1.0, 12);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[0].len(), 4);
        assert_eq!(contours[1].len(), 4);
    }

    #[test]
    fn newline_moves_down_one_line() {
        let contours = font().layout("I\nI", 2.0, 12);
        assert_eq!(contours.len(), 2);
        assert_eq!(contours[1][0].x, contours[0][0].x);
        assert!((contours[0][0].y - contours[1][0].y - 2.0).abs() < 1e-6);
    }

    #[test]
    fn missing_glyph_uses_question_mark() {
        let contours = font().layout("Z", 1.0, 12);
        assert_eq!(contours.len(), 1);
        assert_eq!(contours[0].len(), 4);
    }

    #[test]
    fn curves_are_flattened() {
        let src = BLOCK_FONT.replace(
            "\"?\": { \"ha\": 400, \"o\": \"m 0 0 l 300 0 l 300 300 l 0 300\" }",
            "\"?\": { \"ha\": 400, \"o\": \"m 0 0 l 300 0 q 0 0 300 300\" }",
        );
        let f = ParsedFont::from_typeface_json(&src).unwrap();
        let contours = f.layout("?", 1.0, 8);
        // start + line end + 8 curve points, last one closes onto the start
        assert_eq!(contours[0].len(), 9);
    }
}
