//! Process-wide Win32 queries: DPI awareness, cursor, monitors, the taskbar
//! and the desktop compositor.

use crate::{is_notification_area_class, scale_from_dpi, taskbar_edge};
use flyout_dock_layout::{DisplayInfo, Point, Rect};
use tracing::{debug, warn};
use windows::Win32::Foundation::{POINT, RECT};
use windows::Win32::Graphics::Dwm::DwmIsCompositionEnabled;
use windows::Win32::Graphics::Gdi::{
    GetMonitorInfoW, MonitorFromPoint, HMONITOR, MONITORINFO, MONITOR_DEFAULTTONEAREST,
};
use windows::Win32::UI::HiDpi::{
    GetDpiForMonitor, SetProcessDpiAwarenessContext, DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2,
    MDT_EFFECTIVE_DPI,
};
use windows::Win32::UI::Shell::{SHAppBarMessage, ABM_GETTASKBARPOS, APPBARDATA};
use windows::Win32::UI::WindowsAndMessaging::{GetClassNameW, GetCursorPos, GetForegroundWindow};

pub(crate) fn rect_from_win32(rect: RECT) -> Rect {
    Rect::from_edges(rect.left, rect.top, rect.right, rect.bottom)
}

/// Opt the process into per-monitor DPI awareness (v2).
///
/// Must run before any window is created. Returns `false` when the call
/// fails, which is expected if awareness was already set by a manifest.
pub fn set_dpi_awareness() -> bool {
    unsafe { SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2).is_ok() }
}

/// Cursor position in screen pixels.
pub fn cursor_position() -> Point {
    let mut point = POINT::default();
    if let Err(e) = unsafe { GetCursorPos(&mut point) } {
        warn!("GetCursorPos failed: {}", e);
    }
    Point::new(point.x, point.y)
}

/// Whether desktop composition is on. Always true from Windows 8 onwards.
pub fn compositor_enabled() -> bool {
    match unsafe { DwmIsCompositionEnabled() } {
        Ok(enabled) => enabled.as_bool(),
        Err(e) => {
            warn!("DwmIsCompositionEnabled failed: {}", e);
            false
        }
    }
}

/// Whether the foreground window is part of the notification area.
pub fn notification_area_active() -> bool {
    let foreground = unsafe { GetForegroundWindow() };
    if foreground.is_invalid() {
        return false;
    }

    let mut buffer = [0u16; 64];
    let len = unsafe { GetClassNameW(foreground, &mut buffer) };
    if len <= 0 {
        return false;
    }
    let class_name = String::from_utf16_lossy(&buffer[..len as usize]);
    is_notification_area_class(&class_name)
}

/// The monitor nearest `point`, with its work area and taskbar edge.
///
/// The taskbar edge is only reported when the primary taskbar lies on this
/// monitor; otherwise the docking calculator infers it from the work area.
pub fn display_near(point: Point) -> Option<DisplayInfo> {
    let monitor = unsafe {
        MonitorFromPoint(
            POINT {
                x: point.x,
                y: point.y,
            },
            MONITOR_DEFAULTTONEAREST,
        )
    };

    let mut info = MONITORINFO {
        cbSize: std::mem::size_of::<MONITORINFO>() as u32,
        ..Default::default()
    };
    if !unsafe { GetMonitorInfoW(monitor, &mut info) }.as_bool() {
        warn!("GetMonitorInfoW failed for monitor near ({}, {})", point.x, point.y);
        return None;
    }

    let bounds = rect_from_win32(info.rcMonitor);
    let work_area = rect_from_win32(info.rcWork);

    let taskbar = primary_taskbar().and_then(|(edge, rect)| {
        bounds.intersects(&rect).then_some(edge)
    });
    let scale = monitor_scale(monitor);
    debug!(?bounds, ?work_area, ?taskbar, scale, "Display lookup");

    Some(DisplayInfo {
        bounds,
        work_area,
        taskbar,
        scale,
    })
}

/// Effective DPI scale of a monitor, 1.0 when it cannot be read.
fn monitor_scale(monitor: HMONITOR) -> f64 {
    let (mut dpi_x, mut dpi_y) = (0u32, 0u32);
    match unsafe { GetDpiForMonitor(monitor, MDT_EFFECTIVE_DPI, &mut dpi_x, &mut dpi_y) } {
        Ok(()) => scale_from_dpi(dpi_x),
        Err(e) => {
            warn!("GetDpiForMonitor failed: {}", e);
            1.0
        }
    }
}

/// Edge and rectangle of the primary taskbar.
fn primary_taskbar() -> Option<(flyout_dock_layout::ScreenEdge, Rect)> {
    let mut data = APPBARDATA {
        cbSize: std::mem::size_of::<APPBARDATA>() as u32,
        ..Default::default()
    };
    if unsafe { SHAppBarMessage(ABM_GETTASKBARPOS, &mut data) } == 0 {
        return None;
    }
    taskbar_edge(data.uEdge).map(|edge| (edge, rect_from_win32(data.rc)))
}
