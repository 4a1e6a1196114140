use crate::foundation::core::PixelRect;
use crate::foundation::error::{PigmentError, PigmentResult};
use crate::foundation::math;
use crate::pool::{HeapPool, Pool};
use crate::renderer::{Renderer, RendererRef, resolve_clip};
use crate::surface::{Surface, SurfaceFormat};
use std::sync::{Arc, PoisonError, RwLock};

/// How children move as the boundary advances.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SwitchMode {
    /// Children stay put; the boundary uncovers `right` over `left`.
    #[default]
    Wipe,
    /// Children travel with the boundary; `right` pushes `left` out to the left.
    Slide,
}

/// Treatment of the boundary column.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SwitchEdge {
    /// Every pixel comes from exactly one child.
    #[default]
    Hard,
    /// Linear crossfade over a band of `width` columns centred on the boundary.
    Feather {
        /// Band width in pixels. Zero behaves like `Hard`.
        width: u32,
    },
}

#[derive(Clone, Debug)]
struct HSwitchState {
    width: u32,
    height: u32,
    left: Option<RendererRef>,
    right: Option<RendererRef>,
    step: f64,
    mode: SwitchMode,
    edge: SwitchEdge,
}

/// Horizontal switch between two child renderers over a `width x height` cell.
///
/// `step` moves the boundary from the right edge (`0`, all `left`) to the left edge (`1`, all
/// `right`).
#[derive(Debug)]
pub struct HSwitch {
    state: RwLock<HSwitchState>,
}

impl Default for HSwitch {
    fn default() -> Self {
        Self::new(0, 0)
    }
}

impl HSwitch {
    /// Create a switch with no children and `step = 0`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            state: RwLock::new(HSwitchState {
                width,
                height,
                left: None,
                right: None,
                step: 0.0,
                mode: SwitchMode::default(),
                edge: SwitchEdge::default(),
            }),
        }
    }

    fn snapshot(&self) -> HSwitchState {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn update<R>(&self, f: impl FnOnce(&mut HSwitchState) -> R) -> R {
        f(&mut self.state.write().unwrap_or_else(PoisonError::into_inner))
    }

    /// Cell width.
    pub fn width(&self) -> u32 {
        self.snapshot().width
    }

    /// Set the cell width.
    pub fn set_width(&self, width: u32) {
        self.update(|s| s.width = width);
    }

    /// Cell height.
    pub fn height(&self) -> u32 {
        self.snapshot().height
    }

    /// Set the cell height.
    pub fn set_height(&self, height: u32) {
        self.update(|s| s.height = height);
    }

    /// Current left child.
    pub fn left(&self) -> Option<RendererRef> {
        self.snapshot().left
    }

    /// Replace the left child. The previous child loses the switch's reference.
    pub fn set_left(&self, child: Option<RendererRef>) {
        let old = self.update(|s| std::mem::replace(&mut s.left, child));
        drop(old);
    }

    /// Current right child.
    pub fn right(&self) -> Option<RendererRef> {
        self.snapshot().right
    }

    /// Replace the right child. The previous child loses the switch's reference.
    pub fn set_right(&self, child: Option<RendererRef>) {
        let old = self.update(|s| std::mem::replace(&mut s.right, child));
        drop(old);
    }

    /// Transition progress as last set, unclamped.
    pub fn step(&self) -> f64 {
        self.snapshot().step
    }

    /// Set the transition progress. Values outside `[0, 1]` are clamped at draw time.
    pub fn set_step(&self, step: f64) {
        self.update(|s| s.step = step);
    }

    /// Current mode.
    pub fn mode(&self) -> SwitchMode {
        self.snapshot().mode
    }

    /// Set how children move with the boundary.
    pub fn set_mode(&self, mode: SwitchMode) {
        self.update(|s| s.mode = mode);
    }

    /// Current edge treatment.
    pub fn edge(&self) -> SwitchEdge {
        self.snapshot().edge
    }

    /// Set the edge treatment.
    pub fn set_edge(&self, edge: SwitchEdge) {
        self.update(|s| s.edge = edge);
    }

    /// Column where `right` starts for the current width and step.
    pub fn boundary(&self) -> u32 {
        let s = self.snapshot();
        boundary(s.width, s.step)
    }
}

/// `width - floor(clamp(step) * width)`; NaN counts as `0`.
fn boundary(width: u32, step: f64) -> u32 {
    let step = if step.is_nan() { 0.0 } else { step.clamp(0.0, 1.0) };
    let taken = (step * f64::from(width)).floor() as u32;
    width - taken.min(width)
}

impl Renderer for HSwitch {
    fn name(&self) -> &'static str {
        "hswitch"
    }

    #[tracing::instrument(skip(self, surface), fields(w = surface.width(), h = surface.height()))]
    fn draw(
        &self,
        surface: &Surface,
        clip: Option<PixelRect>,
        x: i32,
        y: i32,
    ) -> PigmentResult<()> {
        let s = self.snapshot();
        if s.width == 0 || s.height == 0 {
            return Err(PigmentError::invalid_argument(format!(
                "hswitch cell must be non-empty, got {}x{}",
                s.width, s.height
            )));
        }
        let (Some(left), Some(right)) = (s.left.as_ref(), s.right.as_ref()) else {
            return Err(PigmentError::invalid_argument(
                "hswitch needs both children before drawing",
            ));
        };

        let cell = PixelRect::new(x.saturating_neg(), y.saturating_neg(), s.width, s.height);
        let area = resolve_clip(surface, clip)?.intersect(cell);
        if area.is_empty() {
            return Ok(());
        }

        let b = boundary(s.width, s.step);
        let (left_dx, right_dx) = match s.mode {
            SwitchMode::Wipe => (0, 0),
            SwitchMode::Slide => ((s.width - b) as i32, -(b as i32)),
        };
        tracing::trace!(boundary = b, mode = ?s.mode, edge = ?s.edge, "hswitch split");

        let band = match s.edge {
            SwitchEdge::Feather { width } if width > 0 && b > 0 && b < s.width => {
                let start = i64::from(b) - i64::from(width / 2);
                Some((start, width))
            }
            _ => None,
        };

        // Columns in cell space owned outright by each child.
        let (left_end, right_start) = match band {
            Some((start, fw)) => {
                let end = start + i64::from(fw);
                (
                    start.clamp(0, i64::from(s.width)) as u32,
                    end.clamp(0, i64::from(s.width)) as u32,
                )
            }
            None => (b, b),
        };

        let left_region = PixelRect::new(cell.x, cell.y, left_end, s.height).intersect(area);
        if !left_region.is_empty() {
            left.draw(surface, Some(left_region), x.saturating_add(left_dx), y)?;
        }
        let right_region = PixelRect::new(
            cell.x.saturating_add(right_start as i32),
            cell.y,
            s.width - right_start,
            s.height,
        )
        .intersect(area);
        if !right_region.is_empty() {
            right.draw(surface, Some(right_region), x.saturating_add(right_dx), y)?;
        }

        if let Some((start, fw)) = band {
            let band_rect = PixelRect::new(
                cell.x.saturating_add(left_end as i32),
                cell.y,
                right_start - left_end,
                s.height,
            )
            .intersect(area);
            if !band_rect.is_empty() {
                let t_origin = i64::from(cell.x) + start;
                feather(
                    surface,
                    band_rect,
                    (left.as_ref(), x.saturating_add(left_dx)),
                    (right.as_ref(), x.saturating_add(right_dx)),
                    y,
                    |sx| (((i64::from(sx) - t_origin) as f32) + 0.5) / fw as f32,
                )?;
            }
        }
        Ok(())
    }
}

/// Render both children over `band` into scratch surfaces and crossfade them into `surface`.
fn feather(
    surface: &Surface,
    band: PixelRect,
    left: (&dyn Renderer, i32),
    right: (&dyn Renderer, i32),
    y: i32,
    t_at: impl Fn(i32) -> f32,
) -> PigmentResult<()> {
    let pool: Arc<dyn Pool> = surface
        .buffer()
        .pool()
        .unwrap_or_else(|| Arc::new(HeapPool::default()));
    let scratch_l = Surface::new(SurfaceFormat::Argb8888, band.w, band.h, &pool)?;
    let scratch_r = Surface::new(SurfaceFormat::Argb8888, band.w, band.h, &pool)?;
    left.0.draw(&scratch_l, None, band.x.saturating_add(left.1), band.y.saturating_add(y))?;
    right.0.draw(&scratch_r, None, band.x.saturating_add(right.1), band.y.saturating_add(y))?;

    let mut lock_l = scratch_l.lock()?;
    let mut lock_r = scratch_r.lock()?;
    let mut out = surface.lock()?;
    let w = band.w as usize;
    let (mut row_l, mut row_r) = (vec![0u32; w], vec![0u32; w]);
    for row in 0..band.h {
        lock_l.read_span(0, row, &mut row_l)?;
        lock_r.read_span(0, row, &mut row_r)?;
        for (i, (l, r)) in row_l.iter_mut().zip(&row_r).enumerate() {
            *l = math::crossfade(*l, *r, t_at(band.x + i as i32));
        }
        out.write_span(band.x as u32, (band.y + row as i32) as u32, &row_l)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/renderer/hswitch.rs"]
mod tests;
