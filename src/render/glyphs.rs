//! Built-in 5x7 bitmap font.
//!
//! Text is rasterised into pixel offsets relative to an anchor point so the
//! same code serves plotters' axis text (through [`GlyphBackend`]) and the
//! free-angle category labels drawn by the chart routines.
//!
//! [`GlyphBackend`]: super::backend::GlyphBackend

use std::borrow::Cow;
use std::fmt::Write;

use plotters_backend::text_anchor::{HPos, VPos};

pub const GLYPH_WIDTH: i32 = 5;
pub const GLYPH_HEIGHT: i32 = 7;
/// Horizontal advance per character, including one column of spacing.
const ADVANCE: i32 = GLYPH_WIDTH + 1;

/// Pixel scale for a plotters font size.
pub fn scale_for(size: f64) -> i32 {
    ((size / 8.0).round() as i32).max(1)
}

/// Text as the font draws it: characters outside printable ASCII are shown
/// as their code point in hex, e.g. `<6771>`.
pub fn display_form(text: &str) -> Cow<'_, str> {
    if text.chars().all(|c| c == ' ' || c.is_ascii_graphic()) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if c == ' ' || c.is_ascii_graphic() {
            out.push(c);
        } else {
            let _ = write!(out, "<{:X}>", u32::from(c));
        }
    }
    Cow::Owned(out)
}

/// Unrotated `(width, height)` of `text` at `scale`.
pub fn text_size(text: &str, scale: i32) -> (u32, u32) {
    let chars = display_form(text).chars().count() as i32;
    let width = if chars == 0 { 0 } else { (ADVANCE * chars - 1) * scale };
    (width as u32, (GLYPH_HEIGHT * scale) as u32)
}

/// Pixels lit by `text`, as offsets from the anchor point.
///
/// `angle` is in degrees, counter-clockwise on screen; the text is rotated
/// about its anchor. Each destination pixel is sampled back into glyph space
/// so rotated text has no holes.
pub fn rasterize(text: &str, scale: i32, angle: f64, h: HPos, v: VPos) -> Vec<(i32, i32)> {
    let glyphs: Vec<[u8; 7]> = display_form(text).chars().map(glyph).collect();
    let (w, ht) = text_size(text, scale);
    let (w, ht) = (f64::from(w), f64::from(ht));
    if w == 0.0 {
        return Vec::new();
    }

    let ax = match h {
        HPos::Left => 0.0,
        HPos::Center => (w / 2.0).floor(),
        HPos::Right => w,
    };
    let ay = match v {
        VPos::Top => 0.0,
        VPos::Center => (ht / 2.0).floor(),
        VPos::Bottom => ht,
    };

    let (sin, cos) = angle.to_radians().sin_cos();
    // text-box -> screen: x' = x cos + y sin, y' = -x sin + y cos
    let to_screen = |x: f64, y: f64| (x * cos + y * sin, -x * sin + y * cos);

    let corners = [(-ax, -ay), (w - ax, -ay), (-ax, ht - ay), (w - ax, ht - ay)];
    let (mut min_x, mut min_y) = (f64::INFINITY, f64::INFINITY);
    let (mut max_x, mut max_y) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for (cx, cy) in corners {
        let (sx, sy) = to_screen(cx, cy);
        min_x = min_x.min(sx);
        min_y = min_y.min(sy);
        max_x = max_x.max(sx);
        max_y = max_y.max(sy);
    }

    let mut pixels = Vec::new();
    for py in min_y.floor() as i32..max_y.ceil() as i32 {
        for px in min_x.floor() as i32..max_x.ceil() as i32 {
            let (sx, sy) = (f64::from(px) + 0.5, f64::from(py) + 0.5);
            // screen -> text-box (inverse rotation)
            let tx = sx * cos - sy * sin + ax;
            let ty = sx * sin + sy * cos + ay;
            if tx < 0.0 || ty < 0.0 || tx >= w || ty >= ht {
                continue;
            }
            let gx = tx as i32 / scale;
            let gy = ty as i32 / scale;
            let (index, col) = (gx / ADVANCE, gx % ADVANCE);
            if col >= GLYPH_WIDTH {
                continue;
            }
            let lit = glyphs
                .get(index as usize)
                .is_some_and(|rows| rows[gy as usize] & (1 << (GLYPH_WIDTH - 1 - col)) != 0);
            if lit {
                pixels.push((px, py));
            }
        }
    }
    pixels
}

/// Shorten `text` with a trailing ".." so it is at most `max_width` pixels
/// wide at `scale`.
pub fn ellipsize(text: &str, scale: i32, max_width: u32) -> String {
    if text_size(text, scale).0 <= max_width {
        return text.to_string();
    }
    let mut chars: Vec<char> = text.chars().collect();
    while !chars.is_empty() {
        chars.pop();
        let candidate: String = chars.iter().chain(['.', '.'].iter()).collect();
        if text_size(&candidate, scale).0 <= max_width {
            return candidate;
        }
    }
    "..".to_string()
}

/// Row bitmaps (high bit = leftmost column); anything unknown renders as '?'.
fn glyph(ch: char) -> [u8; 7] {
    match ch {
        'a' => [0, 0, 0b01110, 0b00001, 0b01111, 0b10001, 0b01111],
        'b' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b11110],
        'c' => [0, 0, 0b01110, 0b10000, 0b10000, 0b10001, 0b01110],
        'd' => [0b00001, 0b00001, 0b01101, 0b10011, 0b10001, 0b10001, 0b01111],
        'e' => [0, 0, 0b01110, 0b10001, 0b11111, 0b10000, 0b01110],
        'f' => [0b00110, 0b01001, 0b01000, 0b11100, 0b01000, 0b01000, 0b01000],
        'g' => [0, 0b01111, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'h' => [0b10000, 0b10000, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'i' => [0b00100, 0, 0b01100, 0b00100, 0b00100, 0b00100, 0b01110],
        'j' => [0b00010, 0, 0b00110, 0b00010, 0b00010, 0b10010, 0b01100],
        'k' => [0b10000, 0b10000, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010],
        'l' => [0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'm' => [0, 0, 0b11010, 0b10101, 0b10101, 0b10001, 0b10001],
        'n' => [0, 0, 0b10110, 0b11001, 0b10001, 0b10001, 0b10001],
        'o' => [0, 0, 0b01110, 0b10001, 0b10001, 0b10001, 0b01110],
        'p' => [0, 0, 0b11110, 0b10001, 0b11110, 0b10000, 0b10000],
        'q' => [0, 0, 0b01101, 0b10011, 0b01111, 0b00001, 0b00001],
        'r' => [0, 0, 0b10110, 0b11001, 0b10000, 0b10000, 0b10000],
        's' => [0, 0, 0b01110, 0b10000, 0b01110, 0b00001, 0b11110],
        't' => [0b01000, 0b01000, 0b11100, 0b01000, 0b01000, 0b01001, 0b00110],
        'u' => [0, 0, 0b10001, 0b10001, 0b10001, 0b10011, 0b01101],
        'v' => [0, 0, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'w' => [0, 0, 0b10001, 0b10001, 0b10101, 0b10101, 0b01010],
        'x' => [0, 0, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001],
        'y' => [0, 0, 0b10001, 0b10001, 0b01111, 0b00001, 0b01110],
        'z' => [0, 0, 0b11111, 0b00010, 0b00100, 0b01000, 0b11111],
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11111, 0b00010, 0b00100, 0b00010, 0b00001, 0b10001, 0b01110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ' ' => [0; 7],
        '.' => [0, 0, 0, 0, 0, 0b01100, 0b01100],
        ',' => [0, 0, 0, 0, 0b01100, 0b00100, 0b01000],
        ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
        ';' => [0, 0b01100, 0b01100, 0, 0b01100, 0b00100, 0b01000],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        '+' => [0, 0b00100, 0b00100, 0b11111, 0b00100, 0b00100, 0],
        '_' => [0, 0, 0, 0, 0, 0, 0b11111],
        '=' => [0, 0, 0b11111, 0, 0b11111, 0, 0],
        '(' => [0b00010, 0b00100, 0b01000, 0b01000, 0b01000, 0b00100, 0b00010],
        ')' => [0b01000, 0b00100, 0b00010, 0b00010, 0b00010, 0b00100, 0b01000],
        '[' => [0b01110, 0b01000, 0b01000, 0b01000, 0b01000, 0b01000, 0b01110],
        ']' => [0b01110, 0b00010, 0b00010, 0b00010, 0b00010, 0b00010, 0b01110],
        '<' => [0b00010, 0b00100, 0b01000, 0b10000, 0b01000, 0b00100, 0b00010],
        '>' => [0b01000, 0b00100, 0b00010, 0b00001, 0b00010, 0b00100, 0b01000],
        '/' => [0, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0],
        '|' => [0b00100; 7],
        '%' => [0b11000, 0b11001, 0b00010, 0b00100, 0b01000, 0b10011, 0b00011],
        '#' => [0b01010, 0b01010, 0b11111, 0b01010, 0b11111, 0b01010, 0b01010],
        '&' => [0b01100, 0b10010, 0b10100, 0b01000, 0b10101, 0b10010, 0b01101],
        '*' => [0, 0b00100, 0b10101, 0b01110, 0b10101, 0b00100, 0],
        '$' => [0b00100, 0b01111, 0b10100, 0b01110, 0b00101, 0b11110, 0b00100],
        '@' => [0b01110, 0b10001, 0b00001, 0b01101, 0b10101, 0b10101, 0b01110],
        '!' => [0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0, 0b00100],
        '\'' => [0b01100, 0b00100, 0b01000, 0, 0, 0, 0],
        '"' => [0b01010, 0b01010, 0b01010, 0, 0, 0, 0],
        '~' => [0, 0, 0b01000, 0b10101, 0b00010, 0, 0],
        '{' => [0b00010, 0b00100, 0b00100, 0b01000, 0b00100, 0b00100, 0b00010],
        '}' => [0b01000, 0b00100, 0b00100, 0b00010, 0b00100, 0b00100, 0b01000],
        '\\' => [0, 0b10000, 0b01000, 0b00100, 0b00010, 0b00001, 0],
        '^' => [0b00100, 0b01010, 0b10001, 0, 0, 0, 0],
        '`' => [0b01000, 0b00100, 0b00010, 0, 0, 0, 0],
        _ => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0, 0b00100],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_scales_with_length() {
        assert_eq!(text_size("", 2), (0, 14));
        assert_eq!(text_size("A", 1), (5, 7));
        assert_eq!(text_size("AB", 2), (22, 14));
    }

    #[test]
    fn unrotated_text_stays_inside_its_box() {
        let pixels = rasterize("I", 1, 0.0, HPos::Left, VPos::Top);
        assert!(!pixels.is_empty());
        assert!(pixels.iter().all(|&(x, y)| (0..5).contains(&x) && (0..7).contains(&y)));
        // the 'I' stem sits in the middle column
        assert!(pixels.contains(&(2, 3)));
    }

    #[test]
    fn right_anchored_rotated_text_extends_down_left() {
        let pixels = rasterize("LABEL", 2, 45.0, HPos::Right, VPos::Top);
        assert!(!pixels.is_empty());
        // only the glyph height (14 px at 45 degrees) reaches right of the anchor
        assert!(pixels.iter().all(|&(x, _)| x < 11));
        assert!(pixels.iter().any(|&(x, y)| x < -20 && y > 20));
    }

    #[test]
    fn letter_case_is_visible() {
        let lower = rasterize("a", 1, 0.0, HPos::Left, VPos::Top);
        let upper = rasterize("A", 1, 0.0, HPos::Left, VPos::Top);
        assert!(!lower.is_empty());
        assert_ne!(lower, upper);
        assert_ne!(
            rasterize("yes", 1, 0.0, HPos::Left, VPos::Top),
            rasterize("YES", 1, 0.0, HPos::Left, VPos::Top)
        );
    }

    #[test]
    fn non_ascii_text_shows_code_points() {
        assert_eq!(display_form("plain text"), "plain text");
        assert_eq!(display_form("東京"), "<6771><4EAC>");
        assert_eq!(display_form("café"), "caf<E9>");
        assert_eq!(text_size("東", 1), text_size("<6771>", 1));
        assert_ne!(
            rasterize("東京", 1, 0.0, HPos::Left, VPos::Top),
            rasterize("大阪", 1, 0.0, HPos::Left, VPos::Top)
        );
    }

    #[test]
    fn ellipsize_respects_width() {
        assert_eq!(ellipsize("short", 1, 100), "short");
        let cut = ellipsize("a very long category label", 1, 60);
        assert!(cut.ends_with(".."));
        assert!(text_size(&cut, 1).0 <= 60);
    }
}
