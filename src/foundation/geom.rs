use kurbo::{Point, Rect};

use crate::foundation::error::{CardError, CardResult};

/// Axis-aligned rectangle as written in template documents (origin + size).
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RectGeom {
    /// Left edge in canvas pixels.
    pub x: f64,
    /// Top edge in canvas pixels.
    pub y: f64,
    /// Width in pixels.
    pub width: f64,
    /// Height in pixels.
    pub height: f64,
}

impl RectGeom {
    /// Convert to a kurbo rect with absolute corners.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    /// Top-left corner as a point.
    pub fn origin(self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Center of the rectangle.
    pub fn center(self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Validate that all components are finite and the size is non-negative.
    pub fn validate(self, what: &str) -> CardResult<()> {
        for (name, v) in [
            ("x", self.x),
            ("y", self.y),
            ("width", self.width),
            ("height", self.height),
        ] {
            if !v.is_finite() {
                return Err(CardError::validation(format!(
                    "{what} {name} must be finite"
                )));
            }
        }
        if self.width < 0.0 || self.height < 0.0 {
            return Err(CardError::validation(format!(
                "{what} width/height must be >= 0"
            )));
        }
        Ok(())
    }
}

/// Line segment endpoints as written in template documents.
#[derive(Clone, Copy, Debug, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineGeom {
    /// Start x coordinate.
    pub start_x: f64,
    /// Start y coordinate.
    pub start_y: f64,
    /// End x coordinate.
    pub end_x: f64,
    /// End y coordinate.
    pub end_y: f64,
}

impl LineGeom {
    /// Start endpoint as a point.
    pub fn start(self) -> Point {
        Point::new(self.start_x, self.start_y)
    }

    /// End endpoint as a point.
    pub fn end(self) -> Point {
        Point::new(self.end_x, self.end_y)
    }

    /// Shift both endpoints vertically. Used for per-row decorations.
    pub fn shifted_y(self, dy: f64) -> Self {
        Self {
            start_y: self.start_y + dy,
            end_y: self.end_y + dy,
            ..self
        }
    }

    /// Validate that all components are finite.
    pub fn validate(self, what: &str) -> CardResult<()> {
        for (name, v) in [
            ("startX", self.start_x),
            ("startY", self.start_y),
            ("endX", self.end_x),
            ("endY", self.end_y),
        ] {
            if !v.is_finite() {
                return Err(CardError::validation(format!(
                    "{what} {name} must be finite"
                )));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/geom.rs"]
mod tests;
