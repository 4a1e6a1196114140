//! Renderer draw protocol.
//!
//! A renderer paints into a [`Surface`]. The `clip` rectangle is in surface coordinates (`None`
//! means the whole surface) and surface pixel `(sx, sy)` shows renderer coordinate
//! `(sx + x, sy + y)`. Renderers are shared through [`RendererRef`]; composites hold counted
//! references to their children.

pub(crate) mod background;
pub(crate) mod checker;
pub(crate) mod hswitch;

use crate::foundation::core::PixelRect;
use crate::foundation::error::{PigmentError, PigmentResult};
use crate::surface::Surface;
use std::fmt;
use std::sync::Arc;

/// Shared, reference-counted renderer handle.
pub type RendererRef = Arc<dyn Renderer>;

/// Something that can paint into a surface region.
///
/// Configuration setters take `&self`; implementations keep their state behind a lock and
/// snapshot it at the start of `draw`.
pub trait Renderer: Send + Sync + fmt::Debug {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Paint `clip` of `surface`, with the surface origin at renderer coordinate `(x, y)`.
    ///
    /// On error, pixels already written stay written.
    fn draw(
        &self,
        surface: &Surface,
        clip: Option<PixelRect>,
        x: i32,
        y: i32,
    ) -> PigmentResult<()>;
}

/// Validate `clip` against `surface` and return the area to paint.
///
/// The result may be empty, which callers treat as a successful no-op.
pub fn resolve_clip(surface: &Surface, clip: Option<PixelRect>) -> PigmentResult<PixelRect> {
    let full = PixelRect::from_size(surface.width(), surface.height());
    let Some(clip) = clip else {
        return Ok(full);
    };
    if clip.is_empty() {
        return Ok(PixelRect::new(clip.x, clip.y, 0, 0));
    }
    if !full.contains_rect(clip) {
        return Err(PigmentError::invalid_argument(format!(
            "clip {clip:?} exceeds {}x{} surface",
            surface.width(),
            surface.height()
        )));
    }
    Ok(clip)
}

/// Drive a span generator over the resolved clip.
///
/// `fill` receives the renderer coordinate of the first pixel and a row to fill with canonical
/// premultiplied words.
pub(crate) fn draw_spans(
    surface: &Surface,
    clip: Option<PixelRect>,
    x: i32,
    y: i32,
    mut fill: impl FnMut(i32, i32, &mut [u32]),
) -> PigmentResult<()> {
    let area = resolve_clip(surface, clip)?;
    if area.is_empty() {
        return Ok(());
    }

    let mut lock = surface.lock()?;
    let mut row = vec![0u32; area.w as usize];
    for sy in area.y..area.y + area.h as i32 {
        fill(area.x + x, sy + y, &mut row);
        lock.write_span(area.x as u32, sy as u32, &row)?;
    }
    Ok(())
}

pub use background::Background;
pub use checker::Checker;
pub use hswitch::{HSwitch, SwitchEdge, SwitchMode};

#[cfg(test)]
#[path = "../../tests/unit/renderer/renderer.rs"]
mod tests;
