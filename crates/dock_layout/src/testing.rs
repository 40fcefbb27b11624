//! Recording fakes for the platform seams, shared by the unit tests.

use crate::chrome::{BorderStyle, Chrome};
use crate::controller::{CompositorState, NotifyIcon, PopupShell};
use crate::dock::{DisplayInfo, DockPlacement};
use crate::preferences::PreferenceSubscription;
use crate::{Point, Rect, ScreenEdge};
use std::cell::RefCell;
use std::rc::Rc;

/// A point inside [`icon_rect`].
pub const ICON_POINT: Point = Point { x: 1860, y: 1050 };

pub fn icon_rect() -> Rect {
    Rect::from_edges(1850, 1040, 1870, 1060)
}

pub fn bottom_taskbar_display() -> DisplayInfo {
    DisplayInfo {
        bounds: Rect::new(0, 0, 1920, 1080),
        work_area: Rect::new(0, 0, 1920, 1040),
        taskbar: Some(ScreenEdge::Bottom),
        scale: 1.0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCall {
    Place(DockPlacement),
    Chrome(Chrome),
    ShowAndActivate,
    Hide,
    Focus,
    Attach,
    Detach,
    UninstallInterceptor,
    RequestExit,
}

#[derive(Debug)]
pub struct FakeShell {
    pub compositor: CompositorState,
    pub active: bool,
    pub cursor: Point,
    pub tray_active: bool,
    pub display: Option<DisplayInfo>,
    pub calls: Vec<ShellCall>,
    /// Listeners currently attached.
    pub attached: u32,
    next_subscription: u64,
}

impl Default for FakeShell {
    fn default() -> Self {
        Self {
            compositor: CompositorState::default(),
            active: false,
            cursor: Point::new(400, 300),
            tray_active: false,
            display: Some(bottom_taskbar_display()),
            calls: Vec::new(),
            attached: 0,
            next_subscription: 1,
        }
    }
}

impl FakeShell {
    pub fn last_placement(&self) -> Option<DockPlacement> {
        self.calls.iter().rev().find_map(|call| match call {
            ShellCall::Place(placement) => Some(*placement),
            _ => None,
        })
    }

    pub fn last_style(&self) -> Option<BorderStyle> {
        self.calls.iter().rev().find_map(|call| match call {
            ShellCall::Chrome(chrome) => Some(chrome.style),
            _ => None,
        })
    }

    pub fn count(&self, wanted: &ShellCall) -> usize {
        self.calls.iter().filter(|call| *call == wanted).count()
    }
}

impl PopupShell for FakeShell {
    fn compositor(&self) -> CompositorState {
        self.compositor
    }

    fn is_active(&self) -> bool {
        self.active
    }

    fn cursor_position(&self) -> Point {
        self.cursor
    }

    fn notification_area_active(&self) -> bool {
        self.tray_active
    }

    fn display_near(&self, _point: Point) -> Option<DisplayInfo> {
        self.display
    }

    fn place(&mut self, placement: &DockPlacement) {
        self.calls.push(ShellCall::Place(*placement));
    }

    fn apply_chrome(&mut self, chrome: &Chrome) {
        self.calls.push(ShellCall::Chrome(*chrome));
    }

    fn show_and_activate(&mut self) {
        self.calls.push(ShellCall::ShowAndActivate);
    }

    fn hide(&mut self) {
        self.calls.push(ShellCall::Hide);
    }

    fn focus(&mut self) {
        self.calls.push(ShellCall::Focus);
    }

    fn attach_preference_listener(&mut self) -> PreferenceSubscription {
        assert_eq!(self.attached, 0, "preference listener attached twice");
        self.attached += 1;
        self.calls.push(ShellCall::Attach);
        let id = self.next_subscription;
        self.next_subscription += 1;
        PreferenceSubscription::new(id)
    }

    fn detach_preference_listener(&mut self, _subscription: PreferenceSubscription) {
        assert_eq!(self.attached, 1, "detaching a listener that is not attached");
        self.attached -= 1;
        self.calls.push(ShellCall::Detach);
    }

    fn uninstall_interceptor(&mut self) {
        self.calls.push(ShellCall::UninstallInterceptor);
    }

    fn request_exit(&mut self) {
        self.calls.push(ShellCall::RequestExit);
    }
}

#[derive(Debug, Default)]
pub struct IconLog {
    pub pinned: Option<bool>,
    pub disposed: u32,
}

#[derive(Debug)]
pub struct FakeIcon {
    pub rect: Option<Rect>,
    pub log: Rc<RefCell<IconLog>>,
}

impl FakeIcon {
    pub fn new(rect: Option<Rect>) -> Self {
        Self {
            rect,
            log: Rc::default(),
        }
    }
}

impl NotifyIcon for FakeIcon {
    fn rect(&self) -> Option<Rect> {
        self.rect
    }

    fn set_pinned(&mut self, pinned: bool) {
        self.log.borrow_mut().pinned = Some(pinned);
    }

    fn dispose(self) {
        self.log.borrow_mut().disposed += 1;
    }
}
