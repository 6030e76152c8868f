use palette::{IntoColor, Lab, Mix, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Chart palette
// ---------------------------------------------------------------------------

pub const HISTOGRAM_FILL: RGBColor = RGBColor(135, 206, 235); // skyblue
pub const SCATTER_MARKER: RGBColor = RGBColor(255, 127, 80); // coral
pub const BAR_FILL: RGBColor = RGBColor(144, 238, 144); // lightgreen
pub const UNDEFINED_CELL: RGBColor = RGBColor(230, 230, 230);
pub const GRID: RGBColor = RGBColor(225, 225, 225);

// ---------------------------------------------------------------------------
// Diverging colour map for correlation values
// ---------------------------------------------------------------------------

const COOL: (u8, u8, u8) = (59, 76, 192);
const NEUTRAL: (u8, u8, u8) = (221, 221, 221);
const WARM: (u8, u8, u8) = (180, 4, 38);

fn to_lab((r, g, b): (u8, u8, u8)) -> Lab {
    let rgb: Srgb = Srgb::new(r, g, b).into_format();
    rgb.into_color()
}

/// Blue-grey-red colour for `value` in [-1, 1], interpolated in CIE Lab so
/// equal steps look equally far apart. Values outside the range are clamped.
pub fn coolwarm(value: f64) -> RGBColor {
    let t = value.clamp(-1.0, 1.0) as f32;
    let lab = if t < 0.0 {
        to_lab(NEUTRAL).mix(to_lab(COOL), -t)
    } else {
        to_lab(NEUTRAL).mix(to_lab(WARM), t)
    };
    let rgb: Srgb = lab.into_color();
    RGBColor(
        (rgb.red.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0).round() as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0).round() as u8,
    )
}

/// Black or white, whichever reads better on `background`.
pub fn text_on(background: RGBColor) -> RGBColor {
    let RGBColor(r, g, b) = background;
    let luma = 0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b);
    if luma < 140.0 {
        RGBColor(255, 255, 255)
    } else {
        RGBColor(0, 0, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: RGBColor, b: (u8, u8, u8)) -> bool {
        let d = |x: u8, y: u8| (i16::from(x) - i16::from(y)).abs() <= 2;
        d(a.0, b.0) && d(a.1, b.1) && d(a.2, b.2)
    }

    #[test]
    fn endpoints_hit_the_anchor_colours() {
        assert!(close(coolwarm(-1.0), COOL));
        assert!(close(coolwarm(0.0), NEUTRAL));
        assert!(close(coolwarm(1.0), WARM));
        assert!(close(coolwarm(7.0), WARM));
    }

    #[test]
    fn annotation_colour_contrasts() {
        assert_eq!(text_on(RGBColor(180, 4, 38)), RGBColor(255, 255, 255));
        assert_eq!(text_on(RGBColor(221, 221, 221)), RGBColor(0, 0, 0));
    }
}
