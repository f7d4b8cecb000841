use serde::Serialize;

/// Cubic Bézier segment used for parent/child connectors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CubicPath {
    pub start: (f32, f32),
    pub control1: (f32, f32),
    pub control2: (f32, f32),
    pub end: (f32, f32),
}

impl CubicPath {
    /// Vertical S-curve: both control points sit on the midpoint row, above
    /// the start and end respectively, so the curve leaves and enters vertically.
    pub fn s_curve(start: (f32, f32), end: (f32, f32)) -> Self {
        let mid_y = (start.1 + end.1) / 2.0;
        Self {
            start,
            control1: (start.0, mid_y),
            control2: (end.0, mid_y),
            end,
        }
    }

    pub fn point_at(&self, t: f32) -> (f32, f32) {
        let u = 1.0 - t;
        let a = u * u * u;
        let b = 3.0 * u * u * t;
        let c = 3.0 * u * t * t;
        let d = t * t * t;
        (
            a * self.start.0 + b * self.control1.0 + c * self.control2.0 + d * self.end.0,
            a * self.start.1 + b * self.control1.1 + c * self.control2.1 + d * self.end.1,
        )
    }

    pub fn to_svg_path(&self) -> String {
        format!(
            "M {:.2} {:.2} C {:.2} {:.2}, {:.2} {:.2}, {:.2} {:.2}",
            self.start.0,
            self.start.1,
            self.control1.0,
            self.control1.1,
            self.control2.0,
            self.control2.1,
            self.end.0,
            self.end.1
        )
    }
}
