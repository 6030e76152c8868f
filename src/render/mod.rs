/// Rasterisation of a [`ChartSpec`] into an encoded PNG.
///
/// ```text
///   ChartSpec ──► draw (plotters) ──► GlyphBackend<BitMapBackend> ──► RGB buffer
///                                                                       │
///                                               image (PNG) ◄───────────┘
///                                                   │
///                                                   ▼
///                                             base64 string
/// ```
///
/// Every render owns its canvas, so concurrent renders never share
/// drawing state.
pub mod backend;
mod draw;
pub mod glyphs;

use std::any::Any;
use std::error::Error as StdError;
use std::io::Cursor;
use std::panic::{self, AssertUnwindSafe};

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbImage};
use log::{debug, info};
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::chart::ChartSpec;
use crate::error::RenderError;
use backend::GlyphBackend;

/// Canvas size: 10x6 units at 100 dots per unit.
pub const WIDTH: u32 = 1000;
pub const HEIGHT: u32 = 600;

/// A finished chart image.
#[derive(Debug, Clone)]
pub struct RenderedImage {
    pub width: u32,
    pub height: u32,
    /// PNG file bytes.
    pub png: Vec<u8>,
}

impl RenderedImage {
    /// Standard base64 (with padding) of the PNG bytes.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.png)
    }
}

impl<E: StdError + Send + Sync> From<DrawingAreaErrorKind<E>> for RenderError {
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        RenderError::Drawing(err.to_string())
    }
}

/// Draw `spec` on a fresh white canvas and encode it as PNG.
///
/// A panic inside the plotting stack is caught and reported as
/// [`RenderError::Panicked`] instead of unwinding into the caller.
pub fn render(spec: &ChartSpec) -> Result<RenderedImage, RenderError> {
    let mut buffer = vec![0u8; (WIDTH * HEIGHT * 3) as usize];

    panic::catch_unwind(AssertUnwindSafe(|| {
        let backend = GlyphBackend::new(BitMapBackend::with_buffer(&mut buffer, (WIDTH, HEIGHT)));
        let root = backend.into_drawing_area();
        draw::draw_chart(&root, spec)
    }))
    .map_err(|payload| RenderError::Panicked(panic_message(payload.as_ref())))??;

    let png = encode_png(buffer)?;
    info!(
        "Rendered {} chart '{}' ({} bytes)",
        spec.kind,
        spec.title,
        png.len()
    );
    Ok(RenderedImage {
        width: WIDTH,
        height: HEIGHT,
        png,
    })
}

fn encode_png(rgb: Vec<u8>) -> Result<Vec<u8>, RenderError> {
    let image = RgbImage::from_raw(WIDTH, HEIGHT, rgb)
        .ok_or_else(|| RenderError::Encoding("pixel buffer has the wrong size".to_string()))?;
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, ImageFormat::Png)
        .map_err(|e| RenderError::Encoding(e.to_string()))?;
    debug!("Encoded {}x{} PNG", WIDTH, HEIGHT);
    Ok(png.into_inner())
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "renderer panicked".to_string()
    }
}
