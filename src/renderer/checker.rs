use crate::foundation::core::{Color, PixelRect};
use crate::foundation::error::{PigmentError, PigmentResult};
use crate::renderer::{Renderer, draw_spans};
use crate::surface::Surface;
use std::sync::{PoisonError, RwLock};

#[derive(Clone, Copy, Debug)]
struct CheckerState {
    even: Color,
    odd: Color,
    cell_w: u32,
    cell_h: u32,
}

/// Two-colour checkerboard anchored at the renderer origin.
///
/// The cell containing `(0, 0)` uses the `even` colour.
#[derive(Debug)]
pub struct Checker {
    state: RwLock<CheckerState>,
}

impl Checker {
    /// Create a checkerboard with `cell_w x cell_h` cells.
    pub fn new(even: Color, odd: Color, cell_w: u32, cell_h: u32) -> Self {
        Self {
            state: RwLock::new(CheckerState {
                even,
                odd,
                cell_w,
                cell_h,
            }),
        }
    }

    fn snapshot(&self) -> CheckerState {
        *self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, f: impl FnOnce(&mut CheckerState)) {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner));
    }

    /// Set the colour of cells whose index sum is even.
    pub fn set_even_color(&self, color: Color) {
        self.update(|s| s.even = color);
    }

    /// Set the colour of cells whose index sum is odd.
    pub fn set_odd_color(&self, color: Color) {
        self.update(|s| s.odd = color);
    }

    /// Set the cell size.
    pub fn set_cell_size(&self, cell_w: u32, cell_h: u32) {
        self.update(|s| {
            s.cell_w = cell_w;
            s.cell_h = cell_h;
        });
    }

    /// Canonical word at renderer coordinate `(x, y)`.
    pub fn sample(&self, x: i32, y: i32) -> u32 {
        let s = self.snapshot();
        pick(&s, s.even.to_argb_premul(), s.odd.to_argb_premul(), x, y)
    }
}

fn pick(s: &CheckerState, even: u32, odd: u32, x: i32, y: i32) -> u32 {
    let cx = i64::from(x).div_euclid(i64::from(s.cell_w.max(1)));
    let cy = i64::from(y).div_euclid(i64::from(s.cell_h.max(1)));
    if (cx + cy).rem_euclid(2) == 0 {
        even
    } else {
        odd
    }
}

impl Renderer for Checker {
    fn name(&self) -> &'static str {
        "checker"
    }

    fn draw(
        &self,
        surface: &Surface,
        clip: Option<PixelRect>,
        x: i32,
        y: i32,
    ) -> PigmentResult<()> {
        let s = self.snapshot();
        if s.cell_w == 0 || s.cell_h == 0 {
            return Err(PigmentError::invalid_argument(
                "checker cell size must be non-zero",
            ));
        }
        let (even, odd) = (s.even.to_argb_premul(), s.odd.to_argb_premul());
        draw_spans(surface, clip, x, y, |rx, ry, row| {
            for (i, px) in row.iter_mut().enumerate() {
                *px = pick(&s, even, odd, rx + i as i32, ry);
            }
        })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/renderer/checker.rs"]
mod tests;
