//! Flyout Platform Win32
//!
//! Windows implementation of the popup's platform seam.
//!
//! This crate handles:
//! - The popup window class and its window procedure
//! - Installing and removing the native message interceptor
//! - DWM frame extension and composition queries
//! - Monitor, work area, taskbar edge and cursor queries
//! - Per-monitor DPI awareness
//!
//! Message decoding and the other pure helpers below build on every host so
//! they can be unit tested; the Win32 calls themselves are `cfg(windows)`.

use flyout_dock_layout::{NativeMessage, Point, Rect, ScreenEdge};
use thiserror::Error;

#[cfg(windows)]
mod popup;
#[cfg(windows)]
mod system;

#[cfg(windows)]
pub use popup::{PopupWindow, Win32Shell};
#[cfg(windows)]
pub use system::{
    compositor_enabled, cursor_position, display_near, notification_area_active,
    set_dpi_awareness,
};

/// Errors that can occur during Win32 operations.
#[derive(Debug, Error)]
pub enum Win32Error {
    #[error("Failed to register window class: {0}")]
    ClassRegistrationFailed(String),

    #[error("Failed to create popup window: {0}")]
    WindowCreationFailed(String),

    #[error("DWM call failed: {0}")]
    DwmFailed(String),
}

/// Raw window message identifiers the popup decodes.
pub mod messages {
    pub const WM_SIZE: u32 = 0x0005;
    pub const WM_SETCURSOR: u32 = 0x0020;
    pub const WM_NCHITTEST: u32 = 0x0084;
    pub const WM_DWMCOMPOSITIONCHANGED: u32 = 0x031E;

    /// Hit-test code for the client area.
    pub const HTCLIENT: u32 = 1;
}

/// Taskbar edges as reported by `ABM_GETTASKBARPOS`.
pub mod appbar {
    pub const ABE_LEFT: u32 = 0;
    pub const ABE_TOP: u32 = 1;
    pub const ABE_RIGHT: u32 = 2;
    pub const ABE_BOTTOM: u32 = 3;
}

/// Window classes that make up the notification area.
const NOTIFICATION_AREA_CLASSES: [&str; 3] = [
    "Shell_TrayWnd",
    "Shell_SecondaryTrayWnd",
    "NotifyIconOverflowWindow",
];

pub fn loword(value: usize) -> u32 {
    (value & 0xFFFF) as u32
}

pub fn hiword(value: usize) -> u32 {
    ((value >> 16) & 0xFFFF) as u32
}

/// Screen point packed into an `lParam`, with sign extension so that
/// coordinates on monitors left of or above the primary stay negative.
pub fn point_from_lparam(lparam: isize) -> Point {
    let x = (lparam & 0xFFFF) as u16 as i16 as i32;
    let y = ((lparam >> 16) & 0xFFFF) as u16 as i16 as i32;
    Point::new(x, y)
}

/// Reduce a raw window message to the categories the interceptor decides on.
pub fn decode_message(message: u32, lparam: isize) -> NativeMessage {
    match message {
        messages::WM_NCHITTEST => NativeMessage::HitTest,
        messages::WM_SETCURSOR => NativeMessage::SetCursor {
            mouse_message: hiword(lparam as usize),
        },
        messages::WM_DWMCOMPOSITIONCHANGED => NativeMessage::CompositionChanged,
        messages::WM_SIZE => NativeMessage::SizeChanged,
        other => NativeMessage::Other(other),
    }
}

/// Whether the cursor that produced a cursor-set message is over the
/// client area, from the hit-test code in the low word of `lParam`.
pub fn setcursor_over_client(lparam: isize) -> bool {
    loword(lparam as usize) == messages::HTCLIENT
}

/// Whether `point` lies in the logical client area: the window rectangle
/// minus the chrome inset on every side.
pub fn over_logical_client(window: Rect, inset: i32, point: Point) -> bool {
    Rect::new(
        window.x + inset,
        window.y + inset,
        window.width - 2 * inset,
        window.height - 2 * inset,
    )
    .contains(point)
}

/// DPI scale factor for a DPI value (96 DPI = 1.0).
pub fn scale_from_dpi(dpi: u32) -> f64 {
    if dpi == 0 {
        1.0
    } else {
        f64::from(dpi) / 96.0
    }
}

/// Map an `ABE_*` appbar edge to a screen edge.
pub fn taskbar_edge(abe: u32) -> Option<ScreenEdge> {
    match abe {
        appbar::ABE_LEFT => Some(ScreenEdge::Left),
        appbar::ABE_TOP => Some(ScreenEdge::Top),
        appbar::ABE_RIGHT => Some(ScreenEdge::Right),
        appbar::ABE_BOTTOM => Some(ScreenEdge::Bottom),
        _ => None,
    }
}

/// Whether a window class belongs to the taskbar's notification area.
pub fn is_notification_area_class(class_name: &str) -> bool {
    NOTIFICATION_AREA_CLASSES.contains(&class_name)
}
