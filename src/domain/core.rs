//! Core domain types and operations
//!
//! Pure geometry in canvas pixel coordinates. Nothing here knows about
//! surfaces, schedulers or the platform layer.

/// Point in canvas pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    /// Creates a new point
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in canvas pixel coordinates
///
/// `x`/`y` is the top-left corner. Containment is inclusive on every edge,
/// which is what the collision checks rely on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    /// Creates a new rectangle
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Creates a rectangle centered on `center`
    pub fn centered(center: Point, w: f32, h: f32) -> Self {
        Self::new(center.x - w / 2.0, center.y - h / 2.0, w, h)
    }

    /// Returns the left edge coordinate
    pub fn left(&self) -> f32 {
        self.x
    }

    /// Returns the top edge coordinate
    pub fn top(&self) -> f32 {
        self.y
    }

    /// Returns the right edge coordinate
    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    /// Returns the bottom edge coordinate
    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    /// Returns true if the point lies inside or on the border
    pub fn contains_point(&self, px: f32, py: f32) -> bool {
        px >= self.left() && px <= self.right() && py >= self.top() && py <= self.bottom()
    }

    /// Returns true if `px` coincides with the left or right edge
    pub fn on_vertical_edge(&self, px: f32) -> bool {
        px == self.left() || px == self.right()
    }

    /// Returns true if `py` coincides with the top or bottom edge
    pub fn on_horizontal_edge(&self, py: f32) -> bool {
        py == self.top() || py == self.bottom()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_basic_properties() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);
        assert_eq!(rect.left(), 10.0);
        assert_eq!(rect.top(), 20.0);
        assert_eq!(rect.right(), 110.0);
        assert_eq!(rect.bottom(), 70.0);
    }

    #[test]
    fn centered_rect() {
        let rect = Rect::centered(Point::new(400.0, 100.0), 100.0, 50.0);
        assert_eq!(rect, Rect::new(350.0, 75.0, 100.0, 50.0));
    }

    #[test]
    fn containment_is_inclusive() {
        let rect = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(rect.contains_point(15.0, 15.0));
        assert!(rect.contains_point(10.0, 10.0)); // Top-left corner
        assert!(rect.contains_point(30.0, 30.0)); // Bottom-right corner
        assert!(!rect.contains_point(30.5, 30.0));
        assert!(!rect.contains_point(5.0, 5.0));
    }

    #[test]
    fn edge_detection() {
        let rect = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(rect.on_vertical_edge(0.0));
        assert!(rect.on_vertical_edge(10.0));
        assert!(!rect.on_vertical_edge(5.0));
        assert!(rect.on_horizontal_edge(10.0));
        assert!(!rect.on_horizontal_edge(9.0));
    }
}
