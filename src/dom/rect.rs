//! Layout rectangles
//!
//! Element boxes are stored in document coordinates. The viewport turns them
//! into client coordinates by subtracting the scroll offset, the same way
//! `getBoundingClientRect` relates to `offsetTop`.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in CSS pixels
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn top(&self) -> f64 {
        self.y
    }

    pub fn left(&self) -> f64 {
        self.x
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }

    /// Shift the box by the given offset
    pub fn translate(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.x + dx, self.y + dy, self.width, self.height)
    }

    /// Overlap of two boxes, `None` when they are disjoint.
    ///
    /// Edge-adjacent boxes produce a zero-area overlap rather than `None`,
    /// matching how intersection observers treat touching edges.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            return None;
        }
        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Whether `other` lies entirely inside this box (edges inclusive)
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.top() >= self.top()
            && other.left() >= self.left()
            && other.bottom() <= self.bottom()
            && other.right() <= self.right()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intersection_overlap() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 80.0, 100.0, 100.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i, Rect::new(50.0, 80.0, 50.0, 20.0));
        assert_eq!(i.area(), 1000.0);
    }

    #[test]
    fn test_intersection_touching_edges() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(0.0, 100.0, 100.0, 50.0);
        let i = a.intersection(&b).unwrap();
        assert_eq!(i.area(), 0.0);
    }

    #[test]
    fn test_intersection_disjoint() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(0.0, 101.0, 100.0, 50.0);
        assert!(a.intersection(&b).is_none());
    }

    #[test]
    fn test_contains_rect() {
        let outer = Rect::new(0.0, 0.0, 800.0, 600.0);
        assert!(outer.contains_rect(&Rect::new(0.0, 0.0, 800.0, 600.0)));
        assert!(!outer.contains_rect(&Rect::new(-1.0, 10.0, 50.0, 50.0)));
        assert!(!outer.contains_rect(&Rect::new(10.0, 580.0, 50.0, 50.0)));
    }
}
