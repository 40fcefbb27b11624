//! Window visibility controller.
//!
//! Owns the popup's visibility state machine, the notify icon, and the
//! desktop preference listener. All OS access goes through [`PopupShell`]
//! and [`NotifyIcon`], so the state machine runs unchanged against the Win32
//! implementation and against test fakes.
//!
//! # States
//!
//! - `Hidden -> Visible`: a left click on the notify icon that is not the
//!   same click that just hid the popup, or pinning.
//! - `Visible -> Hidden`: losing activation while unpinned, or unpinning.
//!
//! The preference listener is attached exactly while the popup is visible
//! and is released on every path that hides or closes it.

use crate::chrome::{BorderStyle, Chrome};
use crate::dock::{compute_dock_position, DisplayInfo, DockPlacement, DockRequest};
use crate::intercept::{intercept, Interception, NativeMessage};
use crate::preferences::{PreferenceCategory, PreferenceSubscription};
use crate::{LogicalSize, Point, Rect};
use tracing::{debug, info, warn};

/// Snapshot of the desktop compositor for the popup window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompositorState {
    /// Whether desktop composition (glass) is enabled.
    pub enabled: bool,
    /// DPI scale of the monitor the popup window is on now (1.0 = 96 DPI).
    pub scale: f64,
}

impl Default for CompositorState {
    fn default() -> Self {
        Self {
            enabled: true,
            scale: 1.0,
        }
    }
}

/// Mouse button reported by a notify icon click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Events the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PopupEvent {
    /// The native window exists; position it before it is first shown.
    Loaded,
    /// The notify icon was clicked or double-clicked.
    IconClicked(MouseButton),
    /// The "Pin"/"Unpin" context menu item was chosen.
    TogglePin,
    /// The in-window "Pin" button was clicked.
    PinButton,
    /// "Exit" was chosen from the context menu or the window.
    Exit,
    /// The popup became the active window.
    Activated,
    /// The popup lost activation.
    Deactivated,
    /// A user preference changed.
    PreferenceChanged(PreferenceCategory),
    /// Recompute position and chrome if open, without activating.
    Refresh,
    /// The native window is being destroyed.
    Closing,
}

/// Platform services the controller needs from the popup window.
pub trait PopupShell {
    /// Compositor enablement and the popup window's current DPI scale.
    fn compositor(&self) -> CompositorState;

    /// Whether the popup is the active window.
    fn is_active(&self) -> bool;

    /// Cursor position in device pixels.
    fn cursor_position(&self) -> Point;

    /// Whether the notification area (taskbar) is the foreground window.
    fn notification_area_active(&self) -> bool;

    /// The monitor nearest `point`.
    fn display_near(&self, point: Point) -> Option<DisplayInfo>;

    /// Move and size the popup.
    fn place(&mut self, placement: &DockPlacement);

    /// Apply a border treatment.
    fn apply_chrome(&mut self, chrome: &Chrome);

    /// Show the popup and make it the active window.
    fn show_and_activate(&mut self);

    fn hide(&mut self);

    /// Give the popup keyboard focus.
    fn focus(&mut self);

    fn attach_preference_listener(&mut self) -> PreferenceSubscription;

    fn detach_preference_listener(&mut self, subscription: PreferenceSubscription);

    /// Remove the window procedure interceptor.
    fn uninstall_interceptor(&mut self);

    /// Ask the application to shut down.
    fn request_exit(&mut self);
}

/// The notification-area icon.
pub trait NotifyIcon {
    /// Screen rectangle of the icon, `None` when it cannot be located.
    fn rect(&self) -> Option<Rect>;

    /// Reflect the pinned flag in the context menu.
    fn set_pinned(&mut self, pinned: bool);

    /// Remove the icon from the notification area and release it.
    fn dispose(self)
    where
        Self: Sized;
}

/// Visibility state of the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowState {
    /// Keeps the popup open when it loses activation.
    pub pinned: bool,
    pub visible: bool,
    /// Cursor position recorded when the popup was hidden by a click on the
    /// notify icon. `Some` doubles as the "hidden by icon click" flag.
    pub hide_click: Option<Point>,
}

impl WindowState {
    /// Whether the last hide was caused by clicking the notify icon.
    pub fn mouse_hide_flag(&self) -> bool {
        self.hide_click.is_some()
    }

    pub fn last_hide_position(&self) -> Option<Point> {
        self.hide_click
    }
}

/// Drives the popup's visibility, position and chrome.
pub struct WindowVisibilityController<S, I> {
    shell: S,
    icon: Option<I>,
    state: WindowState,
    loaded: bool,
    window: LogicalSize,
    gap: f64,
    preferences: Option<PreferenceSubscription>,
}

impl<S: PopupShell, I: NotifyIcon> WindowVisibilityController<S, I> {
    /// Create a controller for a popup of logical size `window`, kept `gap`
    /// logical units away from the taskbar.
    pub fn new(shell: S, icon: I, window: LogicalSize, gap: f64) -> Self {
        Self {
            shell,
            icon: Some(icon),
            state: WindowState::default(),
            loaded: false,
            window,
            gap,
            preferences: None,
        }
    }

    pub fn state(&self) -> &WindowState {
        &self.state
    }

    pub fn is_visible(&self) -> bool {
        self.state.visible
    }

    pub fn is_pinned(&self) -> bool {
        self.state.pinned
    }

    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn has_preference_listener(&self) -> bool {
        self.preferences.is_some()
    }

    pub fn shell(&self) -> &S {
        &self.shell
    }

    pub fn shell_mut(&mut self) -> &mut S {
        &mut self.shell
    }

    pub fn icon(&self) -> Option<&I> {
        self.icon.as_ref()
    }

    /// React to one event.
    pub fn handle(&mut self, event: PopupEvent) {
        debug!(?event, state = ?self.state, "Popup event");
        match event {
            PopupEvent::Loaded => self.on_loaded(),
            PopupEvent::IconClicked(button) => self.on_icon_clicked(button),
            PopupEvent::TogglePin => self.set_pin(!self.state.pinned),
            PopupEvent::PinButton => self.set_pin(true),
            PopupEvent::Exit => {
                info!("Exit requested");
                self.shell.request_exit();
            }
            PopupEvent::Activated => self.on_activated(),
            PopupEvent::Deactivated => self.on_deactivated(),
            PopupEvent::PreferenceChanged(category) => self.on_preference_changed(category),
            PopupEvent::Refresh => self.update_window_display_if_open(false),
            PopupEvent::Closing => self.on_closing(),
        }
    }

    /// Run a native message through the interceptor and apply its side effects.
    pub fn on_native_message(&mut self, message: NativeMessage, over_client: bool) -> Interception {
        let interception = intercept(message, self.loaded && self.state.visible, over_client);
        match interception {
            Interception::SwallowAndFocus => self.shell.focus(),
            Interception::Refresh => self.update_window_display_if_open(false),
            Interception::Swallow | Interception::PassThrough => {}
        }
        interception
    }

    /// Recompute position and chrome, only while the popup is visible.
    pub fn update_window_display_if_open(&mut self, activate: bool) {
        if self.state.visible {
            self.update_window_display(activate);
        }
    }

    /// Recompute position and chrome; show and activate when `activate`.
    pub fn update_window_display(&mut self, activate: bool) {
        if !self.loaded {
            return;
        }

        if activate || self.state.visible {
            self.attach_listener();
        }

        let compositor = self.shell.compositor();
        let icon = self.icon.as_ref().and_then(|icon| icon.rect());
        let cursor = self.shell.cursor_position();
        let anchor = icon.map_or(cursor, |rect| rect.center());

        // The popup takes the scale of the monitor it is moving to
        let mut scale = compositor.scale;
        match self.shell.display_near(anchor) {
            Some(display) => {
                scale = display.scale;
                let request = DockRequest {
                    icon,
                    cursor,
                    window: self.window,
                    display,
                    pinned: self.state.pinned,
                    gap: self.gap,
                };
                match compute_dock_position(&request) {
                    Ok(placement) => {
                        debug!(?placement, "Docking popup");
                        self.shell.place(&placement);
                    }
                    Err(e) => warn!("Failed to compute popup position: {}", e),
                }
            }
            None => warn!("No monitor found near ({}, {})", anchor.x, anchor.y),
        }

        let style = BorderStyle::select(compositor.enabled, self.shell.is_active());
        self.shell.apply_chrome(&style.chrome(scale));

        if activate {
            self.shell.show_and_activate();
            self.state.visible = true;
        }
    }

    /// Set the pinned flag; pinning shows the popup, unpinning hides it.
    pub fn set_pin(&mut self, pinned: bool) {
        self.state.pinned = pinned;
        if let Some(icon) = self.icon.as_mut() {
            icon.set_pinned(pinned);
        }

        if pinned {
            self.update_window_display(true);
        } else {
            self.hide_window();
        }
    }

    fn on_loaded(&mut self) {
        self.loaded = true;
        self.update_window_display(false);
    }

    fn on_icon_clicked(&mut self, button: MouseButton) {
        if !self.loaded {
            debug!("Ignoring notify icon click before the popup is loaded");
            return;
        }

        let cursor = self.shell.cursor_position();
        let same_click = self.state.hide_click == Some(cursor);

        if button == MouseButton::Left && !same_click {
            self.update_window_display(true);
        } else {
            self.state.hide_click = None;
        }
    }

    fn on_activated(&mut self) {
        let compositor = self.shell.compositor();
        if !compositor.enabled {
            self.shell
                .apply_chrome(&BorderStyle::Classic.chrome(compositor.scale));
        }
    }

    fn on_deactivated(&mut self) {
        if self.state.visible && !self.state.pinned {
            self.hide_window();
        }

        let compositor = self.shell.compositor();
        if !compositor.enabled {
            self.shell
                .apply_chrome(&BorderStyle::ClassicInactive.chrome(compositor.scale));
        }
    }

    fn on_preference_changed(&mut self, category: PreferenceCategory) {
        if self.preferences.is_some() && category == PreferenceCategory::Desktop {
            self.update_window_display_if_open(false);
        }
    }

    fn on_closing(&mut self) {
        if let Some(icon) = self.icon.take() {
            icon.dispose();
            info!("Notify icon removed");
        }

        if self.loaded {
            self.shell.uninstall_interceptor();
        }

        self.release_listener();
        self.loaded = false;
        self.state.visible = false;
    }

    fn hide_window(&mut self) {
        // A hide while the cursor sits on the icon and the notification area
        // has focus is the first half of a click on the icon; remember where
        // so that the click itself does not reopen the popup.
        let cursor = self.shell.cursor_position();
        let over_icon = self
            .icon
            .as_ref()
            .and_then(|icon| icon.rect())
            .is_some_and(|rect| rect.contains(cursor));

        self.state.hide_click =
            (over_icon && self.shell.notification_area_active()).then_some(cursor);

        self.release_listener();
        self.shell.hide();
        self.state.visible = false;
    }

    fn attach_listener(&mut self) {
        if self.preferences.is_none() {
            self.preferences = Some(self.shell.attach_preference_listener());
        }
    }

    fn release_listener(&mut self) {
        if let Some(subscription) = self.preferences.take() {
            self.shell.detach_preference_listener(subscription);
        }
    }
}
