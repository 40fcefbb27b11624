//! Flyout Dock Layout
//!
//! Platform-agnostic logic for a popup window that docks itself next to a
//! notification-area (tray) icon, the way native OS flyout panels do.
//!
//! This crate implements:
//! - Screen geometry in device pixels and logical (device-independent) units
//! - The docking position calculator
//! - Border treatment selection (composited glass vs. classic solid border)
//! - Native message interception decisions
//! - The window visibility state machine and its event dispatcher
//!
//! Everything that touches the OS goes through the [`PopupShell`] and
//! [`NotifyIcon`] traits, which the platform crate implements.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod chrome;
pub mod content;
pub mod controller;
pub mod dispatch;
pub mod dock;
pub mod intercept;
pub mod preferences;

#[cfg(test)]
mod testing;

pub use chrome::{BorderStyle, BorderTone, Chrome};
pub use content::{ContentButton, ContentLayout};
pub use controller::{
    CompositorState, MouseButton, NotifyIcon, PopupEvent, PopupShell, WindowState,
    WindowVisibilityController,
};
pub use dispatch::{Dispatcher, MessageSink};
pub use dock::{compute_dock_position, DisplayInfo, DockPlacement, DockRequest};
pub use intercept::{intercept, Interception, NativeMessage};
pub use preferences::{PreferenceCategory, PreferenceSubscription};

/// Errors that can occur during layout operations.
#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("DPI scale {0} is not a positive finite number")]
    InvalidScale(f64),

    #[error("Work area {0:?} is empty")]
    EmptyWorkArea(Rect),
}

/// A point in screen coordinates (device pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    /// Create a new point.
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// A rectangle in screen coordinates (device pixels).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Create a new rectangle.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// Create a rectangle from its left/top/right/bottom edges.
    pub fn from_edges(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    /// Check if this rectangle intersects with another.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && self.x + self.width > other.x
            && self.y < other.y + other.height
            && self.y + self.height > other.y
    }

    /// Check if a point lies inside this rectangle (right/bottom edges exclusive).
    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x && point.x < self.right() && point.y >= self.y && point.y < self.bottom()
    }

    /// Check if another rectangle lies entirely inside this one.
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Whether the rectangle has no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }

    /// Get the right edge x-coordinate.
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Get the bottom edge y-coordinate.
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Center point (rounded towards the top-left).
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2, self.y + self.height / 2)
    }
}

/// A size in device-independent units (1.0 = one pixel at 96 DPI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogicalSize {
    pub width: f64,
    pub height: f64,
}

impl LogicalSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Convert a logical length to device pixels for the given DPI scale.
pub fn to_device(logical: f64, scale: f64) -> i32 {
    (logical * scale).round() as i32
}

/// The screen edge a taskbar (and so the notification area) is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ScreenEdge {
    Left,
    Top,
    Right,
    #[default]
    Bottom,
}

impl ScreenEdge {
    /// Infer the taskbar edge from a monitor's bounds and work area.
    ///
    /// The side where the work area is inset the most wins. When the work
    /// area covers the whole monitor (auto-hide taskbar), falls back to the
    /// monitor edge nearest `anchor`, and to `Bottom` without an anchor.
    pub fn infer(bounds: Rect, work_area: Rect, anchor: Option<Point>) -> Self {
        let insets = [
            (ScreenEdge::Bottom, bounds.bottom() - work_area.bottom()),
            (ScreenEdge::Top, work_area.y - bounds.y),
            (ScreenEdge::Left, work_area.x - bounds.x),
            (ScreenEdge::Right, bounds.right() - work_area.right()),
        ];

        let (edge, inset) = insets
            .iter()
            .copied()
            .fold((ScreenEdge::Bottom, 0), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            });

        if inset > 0 {
            return edge;
        }

        let Some(anchor) = anchor else {
            return ScreenEdge::Bottom;
        };

        let distances = [
            (ScreenEdge::Bottom, bounds.bottom() - anchor.y),
            (ScreenEdge::Top, anchor.y - bounds.y),
            (ScreenEdge::Left, anchor.x - bounds.x),
            (ScreenEdge::Right, bounds.right() - anchor.x),
        ];

        distances
            .iter()
            .copied()
            .min_by_key(|&(_, distance)| distance)
            .map_or(ScreenEdge::Bottom, |(edge, _)| edge)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCREEN: Rect = Rect {
        x: 0,
        y: 0,
        width: 1920,
        height: 1080,
    };

    #[test]
    fn test_rect_intersects() {
        let r1 = Rect::new(0, 0, 100, 100);
        let r2 = Rect::new(50, 50, 100, 100);
        let r3 = Rect::new(200, 200, 50, 50);

        assert!(r1.intersects(&r2));
        assert!(r2.intersects(&r1));
        assert!(!r1.intersects(&r3));
        assert!(!r3.intersects(&r1));
    }

    #[test]
    fn test_rect_contains_point_edges() {
        let r = Rect::from_edges(1850, 1040, 1870, 1060);
        assert!(r.contains(Point::new(1850, 1040)));
        assert!(r.contains(Point::new(1869, 1059)));
        assert!(!r.contains(Point::new(1870, 1050)));
        assert!(!r.contains(Point::new(1860, 1060)));
    }

    #[test]
    fn test_rect_contains_rect() {
        assert!(SCREEN.contains_rect(&Rect::new(1620, 680, 300, 400)));
        assert!(!SCREEN.contains_rect(&Rect::new(1621, 680, 300, 400)));
    }

    #[test]
    fn test_to_device_rounding() {
        assert_eq!(to_device(300.0, 1.0), 300);
        assert_eq!(to_device(300.0, 1.25), 375);
        assert_eq!(to_device(1.0, 1.5), 2);
        assert_eq!(to_device(1.0, 1.25), 1);
    }

    #[test]
    fn test_infer_edge_from_work_area() {
        assert_eq!(
            ScreenEdge::infer(SCREEN, Rect::new(0, 0, 1920, 1040), None),
            ScreenEdge::Bottom
        );
        assert_eq!(
            ScreenEdge::infer(SCREEN, Rect::new(0, 40, 1920, 1040), None),
            ScreenEdge::Top
        );
        assert_eq!(
            ScreenEdge::infer(SCREEN, Rect::new(62, 0, 1858, 1080), None),
            ScreenEdge::Left
        );
        assert_eq!(
            ScreenEdge::infer(SCREEN, Rect::new(0, 0, 1858, 1080), None),
            ScreenEdge::Right
        );
    }

    #[test]
    fn test_infer_edge_auto_hide_uses_anchor() {
        // Work area equals bounds when the taskbar auto-hides
        assert_eq!(
            ScreenEdge::infer(SCREEN, SCREEN, Some(Point::new(1900, 500))),
            ScreenEdge::Right
        );
        assert_eq!(
            ScreenEdge::infer(SCREEN, SCREEN, Some(Point::new(900, 3))),
            ScreenEdge::Top
        );
        assert_eq!(ScreenEdge::infer(SCREEN, SCREEN, None), ScreenEdge::Bottom);
    }

    #[test]
    fn test_infer_edge_secondary_monitor_offsets() {
        let bounds = Rect::new(-1280, 0, 1280, 1024);
        let work = Rect::new(-1280, 0, 1280, 984);
        assert_eq!(ScreenEdge::infer(bounds, work, None), ScreenEdge::Bottom);
    }
}
