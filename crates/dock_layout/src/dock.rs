//! Docking position calculator.
//!
//! Given the notify icon's screen rectangle, the popup's logical size and the
//! monitor's DPI scale, computes where the popup should open so that it sits
//! next to the icon, opens away from the taskbar edge and stays inside the
//! monitor's work area.

use crate::{to_device, LayoutError, LogicalSize, Point, Rect, ScreenEdge};
use serde::{Deserialize, Serialize};

/// The monitor a popup is being docked on.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayInfo {
    /// Full monitor rectangle (device pixels).
    pub bounds: Rect,
    /// Monitor rectangle minus taskbars and other app bars.
    pub work_area: Rect,
    /// Edge the taskbar is attached to, if the platform could tell.
    pub taskbar: Option<ScreenEdge>,
    /// DPI scale of this monitor (1.0 = 96 DPI).
    pub scale: f64,
}

/// Inputs for a docking computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DockRequest {
    /// Notify icon rectangle, `None` when the icon cannot be located.
    pub icon: Option<Rect>,
    /// Current cursor position (device pixels).
    pub cursor: Point,
    /// Popup size in logical units.
    pub window: LogicalSize,
    /// Target monitor; its scale converts the logical size and gap.
    pub display: DisplayInfo,
    pub pinned: bool,
    /// Distance kept from the taskbar and the work area edges (logical units).
    pub gap: f64,
}

/// Computed on-screen placement for the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DockPlacement {
    /// Top-left corner in device pixels.
    pub origin: Point,
    /// Width in device pixels.
    pub width: i32,
    /// Height in device pixels.
    pub height: i32,
    /// Taskbar edge the placement was computed against.
    pub edge: ScreenEdge,
}

impl DockPlacement {
    /// The placement as a rectangle.
    pub fn rect(&self) -> Rect {
        Rect::new(self.origin.x, self.origin.y, self.width, self.height)
    }
}

/// Compute the docking position of the popup.
///
/// The icon rectangle is the anchor. When the icon cannot be located the
/// cursor stands in for it, unless the popup is pinned: a pinned popup is
/// refreshed while the cursor is elsewhere, so it goes to the work area
/// corner on the taskbar side instead. A popup larger than the work area is
/// shrunk to fit it.
pub fn compute_dock_position(request: &DockRequest) -> Result<DockPlacement, LayoutError> {
    let scale = request.display.scale;
    if !scale.is_finite() || scale <= 0.0 {
        return Err(LayoutError::InvalidScale(scale));
    }

    let work = request.display.work_area;
    if work.is_empty() {
        return Err(LayoutError::EmptyWorkArea(work));
    }

    let gap = to_device(request.gap.max(0.0), scale);
    let width = fit_length(to_device(request.window.width, scale).max(1), work.width, gap);
    let height = fit_length(to_device(request.window.height, scale).max(1), work.height, gap);

    let anchor = match (request.icon, request.pinned) {
        (Some(icon), _) => Some(icon),
        (None, false) => Some(Rect::new(request.cursor.x, request.cursor.y, 1, 1)),
        (None, true) => None,
    };

    let edge = request.display.taskbar.unwrap_or_else(|| {
        ScreenEdge::infer(request.display.bounds, work, anchor.map(|a| a.center()))
    });

    let (x, y) = match anchor {
        Some(anchor) => beside_anchor(anchor, edge, work, width, height, gap),
        None => taskbar_corner(edge, work, width, height, gap),
    };

    let origin = Point::new(
        clamp_axis(x, work.x, work.right(), width, gap),
        clamp_axis(y, work.y, work.bottom(), height, gap),
    );

    Ok(DockPlacement {
        origin,
        width,
        height,
        edge,
    })
}

/// Place the popup on the far side of the anchor from the taskbar edge.
fn beside_anchor(
    anchor: Rect,
    edge: ScreenEdge,
    work: Rect,
    width: i32,
    height: i32,
    gap: i32,
) -> (i32, i32) {
    let center = anchor.center();
    match edge {
        ScreenEdge::Bottom => (
            center.x - width / 2,
            work.bottom().min(anchor.y) - height - gap,
        ),
        ScreenEdge::Top => (center.x - width / 2, work.y.max(anchor.bottom()) + gap),
        ScreenEdge::Left => (work.x.max(anchor.right()) + gap, center.y - height / 2),
        ScreenEdge::Right => (
            work.right().min(anchor.x) - width - gap,
            center.y - height / 2,
        ),
    }
}

/// Corner of the work area nearest the notification area for each edge.
fn taskbar_corner(edge: ScreenEdge, work: Rect, width: i32, height: i32, gap: i32) -> (i32, i32) {
    let right = work.right() - width - gap;
    let bottom = work.bottom() - height - gap;
    match edge {
        ScreenEdge::Bottom | ScreenEdge::Right => (right, bottom),
        ScreenEdge::Top => (right, work.y + gap),
        ScreenEdge::Left => (work.x + gap, bottom),
    }
}

/// Shrink `length` to the available extent, keeping `gap` on both sides
/// when there is room for it. Lengths that already fit are left alone.
fn fit_length(length: i32, available: i32, gap: i32) -> i32 {
    if length <= available {
        length
    } else if available > 2 * gap {
        available - 2 * gap
    } else {
        available
    }
}

/// Clamp one axis of the origin so `[value, value + length)` stays in
/// `[start, end)`, keeping `gap` from both ends when there is room for it.
fn clamp_axis(value: i32, start: i32, end: i32, length: i32, gap: i32) -> i32 {
    let min = start + gap;
    let max = end - length - gap;
    if min <= max {
        return value.clamp(min, max);
    }

    // No room for the gap; fall back to the bare work area
    let max = end - length;
    if max < start {
        start
    } else {
        value.clamp(start, max)
    }
}
