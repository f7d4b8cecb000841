use crate::layout::HierarchyLayout;

// Zoom is tracked in tenths so repeated steps never drift off the grid.
const MIN_TENTHS: u8 = 5;
const MAX_TENTHS: u8 = 15;
const DEFAULT_TENTHS: u8 = 10;

/// Presentation scale in `[0.5, 1.5]`, moved in steps of `0.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Zoom {
    tenths: u8,
}

impl Default for Zoom {
    fn default() -> Self {
        Self {
            tenths: DEFAULT_TENTHS,
        }
    }
}

impl Zoom {
    pub const MIN: f32 = 0.5;
    pub const MAX: f32 = 1.5;
    pub const STEP: f32 = 0.1;

    /// Nearest step to `scale`, clamped into range.
    pub fn from_scale(scale: f32) -> Self {
        if scale.is_nan() {
            return Self::default();
        }
        let tenths = (scale * 10.0)
            .round()
            .clamp(f32::from(MIN_TENTHS), f32::from(MAX_TENTHS));
        Self {
            tenths: tenths as u8,
        }
    }

    pub fn scale(self) -> f32 {
        f32::from(self.tenths) / 10.0
    }

    /// Returns false when already at the upper bound.
    pub fn zoom_in(&mut self) -> bool {
        if self.tenths >= MAX_TENTHS {
            return false;
        }
        self.tenths += 1;
        true
    }

    /// Returns false when already at the lower bound.
    pub fn zoom_out(&mut self) -> bool {
        if self.tenths <= MIN_TENTHS {
            return false;
        }
        self.tenths -= 1;
        true
    }

    pub fn reset(&mut self) {
        self.tenths = DEFAULT_TENTHS;
    }

    pub fn apply(self, point: (f32, f32)) -> (f32, f32) {
        (point.0 * self.scale(), point.1 * self.scale())
    }

    /// On-screen size of the scrollable surface.
    pub fn viewport(self, layout: &HierarchyLayout) -> (f32, f32) {
        self.apply((layout.width, layout.height))
    }
}
