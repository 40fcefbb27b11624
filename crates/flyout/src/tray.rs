//! Notification-area icon for flyout.
//!
//! Provides the notify icon the popup docks against, with a context menu:
//! - Pin / Unpin (label follows the pinned flag)
//! - Exit
//!
//! Left clicks toggle the popup; the context menu only opens on right click.

#![cfg_attr(not(windows), allow(dead_code))]

use flyout_dock_layout::PopupEvent;
use thiserror::Error;

#[cfg(windows)]
use flyout_dock_layout::{MouseButton, NotifyIcon, Rect};
#[cfg(windows)]
use tracing::{debug, info, warn};
#[cfg(windows)]
use tray_icon::{
    menu::{Menu, MenuEvent, MenuItem, PredefinedMenuItem},
    MouseButtonState, TrayIcon, TrayIconBuilder, TrayIconEvent,
};

/// Menu item IDs for the tray context menu.
mod menu_ids {
    pub const PIN: &str = "pin";
    pub const EXIT: &str = "exit";
}

const ICON_SIZE: usize = 32;

/// Label of the pin menu item for the given pinned state.
pub fn pin_label(pinned: bool) -> &'static str {
    if pinned {
        "Unpin"
    } else {
        "Pin"
    }
}

/// Popup event for a context menu item.
pub fn menu_event_for(id: &str) -> Option<PopupEvent> {
    match id {
        menu_ids::PIN => Some(PopupEvent::TogglePin),
        menu_ids::EXIT => Some(PopupEvent::Exit),
        _ => None,
    }
}

/// Manages the notify icon and its context menu.
#[cfg(windows)]
pub struct TrayManager {
    tray: TrayIcon,
    pin_item: MenuItem,
}

#[cfg(windows)]
impl TrayManager {
    /// Create the notify icon with its context menu.
    pub fn new(tooltip: &str, pinned: bool) -> Result<Self, TrayError> {
        let menu = Menu::new();

        let pin_item = MenuItem::with_id(menu_ids::PIN, pin_label(pinned), true, None);
        menu.append(&pin_item).map_err(|e| TrayError::Menu(e.to_string()))?;

        menu.append(&PredefinedMenuItem::separator())
            .map_err(|e| TrayError::Menu(e.to_string()))?;

        let exit = MenuItem::with_id(menu_ids::EXIT, "Exit", true, None);
        menu.append(&exit).map_err(|e| TrayError::Menu(e.to_string()))?;

        let icon = create_default_icon()?;

        let tray = TrayIconBuilder::new()
            .with_menu(Box::new(menu))
            .with_menu_on_left_click(false)
            .with_tooltip(tooltip)
            .with_icon(icon)
            .build()
            .map_err(|e| TrayError::Build(e.to_string()))?;

        info!("Notify icon created");

        Ok(Self { tray, pin_item })
    }

    /// Drain pending icon and menu events, translated to popup events.
    ///
    /// The icon's hidden window runs on this thread, so its events are
    /// queued while messages are dispatched and drained here afterwards.
    pub fn poll_events() -> Vec<PopupEvent> {
        let mut events = Vec::new();

        while let Ok(event) = TrayIconEvent::receiver().try_recv() {
            if let Some(popup_event) = icon_event_for(&event) {
                events.push(popup_event);
            }
        }

        while let Ok(event) = MenuEvent::receiver().try_recv() {
            match menu_event_for(event.id.0.as_str()) {
                Some(popup_event) => events.push(popup_event),
                None => debug!("Unknown menu item clicked: {}", event.id.0),
            }
        }

        events
    }
}

#[cfg(windows)]
fn icon_event_for(event: &TrayIconEvent) -> Option<PopupEvent> {
    match event {
        TrayIconEvent::Click {
            button,
            button_state: MouseButtonState::Up,
            ..
        }
        | TrayIconEvent::DoubleClick { button, .. } => {
            Some(PopupEvent::IconClicked(mouse_button(*button)))
        }
        _ => None,
    }
}

#[cfg(windows)]
fn mouse_button(button: tray_icon::MouseButton) -> MouseButton {
    match button {
        tray_icon::MouseButton::Left => MouseButton::Left,
        tray_icon::MouseButton::Right => MouseButton::Right,
        tray_icon::MouseButton::Middle => MouseButton::Middle,
    }
}

#[cfg(windows)]
impl NotifyIcon for TrayManager {
    fn rect(&self) -> Option<Rect> {
        self.tray.rect().map(|rect| {
            Rect::new(
                rect.position.x.round() as i32,
                rect.position.y.round() as i32,
                rect.size.width as i32,
                rect.size.height as i32,
            )
        })
    }

    fn set_pinned(&mut self, pinned: bool) {
        self.pin_item.set_text(pin_label(pinned));
    }

    fn dispose(self) {
        if let Err(e) = self.tray.set_visible(false) {
            warn!("Failed to hide notify icon: {}", e);
        }
    }
}

/// RGBA pixels of the default icon: a rounded panel with a title strip,
/// echoing the popup itself.
fn icon_rgba() -> Vec<u8> {
    let mut rgba = vec![0u8; ICON_SIZE * ICON_SIZE * 4];

    let panel = [66u8, 133, 244];
    let strip = [232u8, 240, 254];
    let inset = 3;
    let radius = 5.0f32;

    for y in 0..ICON_SIZE {
        for x in 0..ICON_SIZE {
            if x < inset || y < inset || x >= ICON_SIZE - inset || y >= ICON_SIZE - inset {
                continue;
            }

            // Distance past the rounded corner, 0 inside the panel
            let cx = (x as f32).clamp(inset as f32 + radius, (ICON_SIZE - inset) as f32 - radius - 1.0);
            let cy = (y as f32).clamp(inset as f32 + radius, (ICON_SIZE - inset) as f32 - radius - 1.0);
            let overshoot = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt() - radius;
            if overshoot > 1.0 {
                continue;
            }

            let idx = (y * ICON_SIZE + x) * 4;
            let color = if y < inset + 8 { strip } else { panel };
            rgba[idx..idx + 3].copy_from_slice(&color);
            rgba[idx + 3] = if overshoot > 0.0 {
                ((1.0 - overshoot) * 255.0) as u8
            } else {
                255
            };
        }
    }

    rgba
}

#[cfg(windows)]
fn create_default_icon() -> Result<tray_icon::Icon, TrayError> {
    tray_icon::Icon::from_rgba(icon_rgba(), ICON_SIZE as u32, ICON_SIZE as u32)
        .map_err(|e| TrayError::Icon(e.to_string()))
}

/// Errors that can occur during tray operations.
#[derive(Debug, Error)]
pub enum TrayError {
    #[error("Failed to create menu: {0}")]
    Menu(String),

    #[error("Failed to build tray icon: {0}")]
    Build(String),

    #[error("Failed to create icon: {0}")]
    Icon(String),
}
