use crate::foundation::core::{Color, PixelRect};
use crate::foundation::error::PigmentResult;
use crate::renderer::{Renderer, draw_spans};
use crate::surface::Surface;
use std::sync::{PoisonError, RwLock};

/// Fills every pixel it is asked to draw with one colour.
#[derive(Debug)]
pub struct Background {
    color: RwLock<Color>,
}

impl Background {
    /// Create a background renderer.
    pub fn new(color: Color) -> Self {
        Self {
            color: RwLock::new(color),
        }
    }

    /// Current colour.
    pub fn color(&self) -> Color {
        *self.color.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Replace the colour.
    pub fn set_color(&self, color: Color) {
        *self.color.write().unwrap_or_else(PoisonError::into_inner) = color;
    }
}

impl Renderer for Background {
    fn name(&self) -> &'static str {
        "background"
    }

    fn draw(
        &self,
        surface: &Surface,
        clip: Option<PixelRect>,
        x: i32,
        y: i32,
    ) -> PigmentResult<()> {
        let argb = self.color().to_argb_premul();
        draw_spans(surface, clip, x, y, |_, _, row| row.fill(argb))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/renderer/background.rs"]
mod tests;
