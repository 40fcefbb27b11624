//! The popup window and its [`PopupShell`] implementation.
//!
//! # Architecture
//!
//! The popup lives on the UI thread and is driven by its window procedure.
//! Per-window state ([`WindowData`]) is reference counted: one reference is
//! parked in `GWLP_USERDATA` for the window procedure and released on
//! `WM_NCDESTROY`, the other is held by [`Win32Shell`].
//!
//! The interceptor is a weak reference to a [`MessageSink`]. Every message
//! the popup cares about is turned into a [`PopupEvent`] or run through
//! [`MessageSink::intercept`]; the sink decides, the window procedure applies.

use crate::system::{self, rect_from_win32};
use crate::{
    decode_message, loword, over_logical_client, point_from_lparam, scale_from_dpi,
    setcursor_over_client, Win32Error,
};
use flyout_dock_layout::{
    BorderTone, Chrome, CompositorState, ContentButton, ContentLayout, DisplayInfo, DockPlacement,
    MessageSink, Point, PopupEvent, PopupShell, PreferenceCategory, PreferenceSubscription, Rect,
};
use std::cell::{Cell, RefCell};
use std::ffi::c_void;
use std::rc::{Rc, Weak};
use tracing::{debug, error, info, warn};
use windows::core::{w, HSTRING};
use windows::Win32::Foundation::{GetLastError, HWND, LPARAM, LRESULT, RECT, WPARAM};
use windows::Win32::Graphics::Dwm::DwmExtendFrameIntoClientArea;
use windows::Win32::Graphics::Gdi::{
    BeginPaint, DrawTextW, EndPaint, FillRect, FrameRect, GetStockObject, GetSysColor,
    GetSysColorBrush, InvalidateRect, SetBkMode, SetTextColor, BLACK_BRUSH, COLOR_ACTIVECAPTION,
    COLOR_BTNFACE, COLOR_BTNSHADOW, COLOR_INACTIVECAPTION, COLOR_WINDOW, COLOR_WINDOWTEXT,
    DT_CENTER, DT_LEFT, DT_SINGLELINE, DT_VCENTER, HBRUSH, PAINTSTRUCT, TRANSPARENT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::Controls::MARGINS;
use windows::Win32::UI::HiDpi::GetDpiForWindow;
use windows::Win32::UI::Input::KeyboardAndMouse::{GetActiveWindow, SetFocus};
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, GetClientRect, GetWindowLongPtrW,
    GetWindowRect, IsWindow, LoadCursorW, PostQuitMessage, RegisterClassW, SetForegroundWindow,
    SetWindowLongPtrW, SetWindowPos, ShowWindow, CREATESTRUCTW, GWLP_USERDATA, HWND_TOPMOST,
    IDC_ARROW, SWP_NOACTIVATE, SW_HIDE, SW_SHOW, WA_INACTIVE, WM_ACTIVATE, WM_CLOSE, WM_DESTROY,
    WM_DPICHANGED, WM_DWMCOMPOSITIONCHANGED, WM_ERASEBKGND, WM_LBUTTONUP, WM_NCCALCSIZE,
    WM_NCCREATE, WM_NCDESTROY, WM_NCHITTEST, WM_PAINT, WM_SETCURSOR, WM_SETTINGCHANGE, WM_SIZE,
    WNDCLASSW, WS_CLIPCHILDREN, WS_EX_TOOLWINDOW, WS_EX_TOPMOST, WS_POPUP, WS_THICKFRAME,
};

const CLASS_NAME: windows::core::PCWSTR = w!("FlyoutPopupWindow");

/// State shared between the window procedure and [`Win32Shell`].
struct WindowData {
    title: String,
    sink: RefCell<Option<Weak<dyn MessageSink>>>,
    chrome: Cell<Chrome>,
    /// Forward `WM_SETTINGCHANGE` while a preference subscription is held.
    listening: Cell<bool>,
}

impl WindowData {
    fn sink(&self) -> Option<Rc<dyn MessageSink>> {
        self.sink.borrow().as_ref().and_then(Weak::upgrade)
    }

    fn post(&self, event: PopupEvent) {
        if let Some(sink) = self.sink() {
            sink.post(event);
        }
    }
}

/// The popup's native window. Destroyed on drop.
pub struct PopupWindow {
    hwnd: HWND,
    data: Rc<WindowData>,
}

impl PopupWindow {
    /// Register the window class and create the hidden popup.
    pub fn create(title: &str) -> Result<Self, Win32Error> {
        let instance = unsafe { GetModuleHandleW(None) }
            .map_err(|e| Win32Error::ClassRegistrationFailed(e.to_string()))?;

        let class = WNDCLASSW {
            lpfnWndProc: Some(popup_window_proc),
            hInstance: instance.into(),
            lpszClassName: CLASS_NAME,
            hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
            ..Default::default()
        };
        if unsafe { RegisterClassW(&class) } == 0 {
            let code = unsafe { GetLastError() };
            return Err(Win32Error::ClassRegistrationFailed(format!("{:?}", code)));
        }

        let data = Rc::new(WindowData {
            title: title.to_string(),
            sink: RefCell::new(None),
            chrome: Cell::new(Chrome::default()),
            listening: Cell::new(false),
        });

        let raw = Rc::into_raw(data.clone());
        let created = unsafe {
            CreateWindowExW(
                WS_EX_TOOLWINDOW | WS_EX_TOPMOST,
                CLASS_NAME,
                &HSTRING::from(title),
                WS_POPUP | WS_THICKFRAME | WS_CLIPCHILDREN,
                0,
                0,
                1,
                1,
                None,
                None,
                Some(instance.into()),
                Some(raw as *const c_void),
            )
        };

        match created {
            Ok(hwnd) => {
                info!("Popup window created");
                Ok(Self { hwnd, data })
            }
            Err(e) => {
                // WM_NCDESTROY releases the parked reference only if the
                // window got as far as WM_NCCREATE
                if Rc::strong_count(&data) > 1 {
                    unsafe { drop(Rc::from_raw(raw)) };
                }
                Err(Win32Error::WindowCreationFailed(e.to_string()))
            }
        }
    }

    /// Route this window's messages to `sink`.
    pub fn install_interceptor(&self, sink: Weak<dyn MessageSink>) {
        *self.data.sink.borrow_mut() = Some(sink);
        debug!("Interceptor installed");
    }

    /// A [`PopupShell`] driving this window.
    pub fn shell(&self) -> Win32Shell {
        Win32Shell {
            hwnd: self.hwnd,
            data: self.data.clone(),
            placed: None,
            next_subscription: 1,
            subscription: None,
        }
    }
}

impl Drop for PopupWindow {
    fn drop(&mut self) {
        unsafe {
            if IsWindow(Some(self.hwnd)).as_bool() {
                if let Err(e) = DestroyWindow(self.hwnd) {
                    warn!("DestroyWindow failed: {}", e);
                }
            }
        }
        debug!("Popup window destroyed");
    }
}

/// Win32 implementation of [`PopupShell`].
pub struct Win32Shell {
    hwnd: HWND,
    data: Rc<WindowData>,
    /// Last placement applied, so unchanged placements skip `SetWindowPos`.
    placed: Option<DockPlacement>,
    next_subscription: u64,
    subscription: Option<u64>,
}

impl PopupShell for Win32Shell {
    fn compositor(&self) -> CompositorState {
        CompositorState {
            enabled: system::compositor_enabled(),
            scale: scale_from_dpi(unsafe { GetDpiForWindow(self.hwnd) }),
        }
    }

    fn is_active(&self) -> bool {
        unsafe { GetActiveWindow() } == self.hwnd
    }

    fn cursor_position(&self) -> Point {
        system::cursor_position()
    }

    fn notification_area_active(&self) -> bool {
        system::notification_area_active()
    }

    fn display_near(&self, point: Point) -> Option<DisplayInfo> {
        system::display_near(point)
    }

    fn place(&mut self, placement: &DockPlacement) {
        if self.placed == Some(*placement) {
            return;
        }
        self.placed = Some(*placement);

        let result = unsafe {
            SetWindowPos(
                self.hwnd,
                Some(HWND_TOPMOST),
                placement.origin.x,
                placement.origin.y,
                placement.width,
                placement.height,
                SWP_NOACTIVATE,
            )
        };
        if let Err(e) = result {
            warn!("SetWindowPos failed: {}", e);
        }
    }

    fn apply_chrome(&mut self, chrome: &Chrome) {
        self.data.chrome.set(*chrome);

        if system::compositor_enabled() {
            let extension = chrome.frame_extension;
            let margins = MARGINS {
                cxLeftWidth: extension,
                cxRightWidth: extension,
                cyTopHeight: extension,
                cyBottomHeight: extension,
            };
            if let Err(e) = unsafe { DwmExtendFrameIntoClientArea(self.hwnd, &margins) } {
                warn!("{}", Win32Error::DwmFailed(e.to_string()));
            }
        }

        unsafe {
            let _ = InvalidateRect(Some(self.hwnd), None, true);
        }
    }

    fn show_and_activate(&mut self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_SHOW);
            if !SetForegroundWindow(self.hwnd).as_bool() {
                debug!("SetForegroundWindow refused");
            }
        }
    }

    fn hide(&mut self) {
        unsafe {
            let _ = ShowWindow(self.hwnd, SW_HIDE);
        }
    }

    fn focus(&mut self) {
        if let Err(e) = unsafe { SetFocus(Some(self.hwnd)) } {
            warn!("SetFocus failed: {}", e);
        }
    }

    fn attach_preference_listener(&mut self) -> PreferenceSubscription {
        let id = self.next_subscription;
        self.next_subscription += 1;
        self.subscription = Some(id);
        self.data.listening.set(true);
        debug!(id, "Preference listener attached");
        PreferenceSubscription::new(id)
    }

    fn detach_preference_listener(&mut self, subscription: PreferenceSubscription) {
        if self.subscription != Some(subscription.id()) {
            warn!(id = subscription.id(), "Detaching an unknown preference subscription");
            return;
        }
        self.subscription = None;
        self.data.listening.set(false);
        debug!(id = subscription.id(), "Preference listener detached");
    }

    fn uninstall_interceptor(&mut self) {
        *self.data.sink.borrow_mut() = None;
        debug!("Interceptor removed");
    }

    fn request_exit(&mut self) {
        unsafe { PostQuitMessage(0) };
    }
}

/// Window procedure for the popup.
///
/// Wrapped with catch_unwind to prevent panics from crossing the FFI boundary.
unsafe extern "system" fn popup_window_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    if msg == WM_NCCREATE {
        let create = unsafe { &*(lparam.0 as *const CREATESTRUCTW) };
        unsafe { SetWindowLongPtrW(hwnd, GWLP_USERDATA, create.lpCreateParams as isize) };
    }

    let data = unsafe { GetWindowLongPtrW(hwnd, GWLP_USERDATA) } as *const WindowData;
    if data.is_null() {
        return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) };
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        handle_message(hwnd, unsafe { &*data }, msg, wparam, lparam)
    }));

    let lresult = match result {
        Ok(lresult) => lresult,
        Err(e) => {
            error!("Panic in popup_window_proc: {:?}", e);
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
    };

    if msg == WM_NCDESTROY {
        unsafe {
            SetWindowLongPtrW(hwnd, GWLP_USERDATA, 0);
            drop(Rc::from_raw(data));
        }
    }
    lresult
}

fn handle_message(
    hwnd: HWND,
    data: &WindowData,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        // Client area covers the whole window; the frame style only keeps
        // DWM drawing the glass edge
        WM_NCCALCSIZE if wparam.0 != 0 => LRESULT(0),
        WM_NCHITTEST => {
            let over_client = over_logical_client(
                window_rect(hwnd),
                data.chrome.get().content_inset,
                point_from_lparam(lparam.0),
            );
            intercepted(hwnd, data, msg, wparam, lparam, over_client)
        }
        WM_SETCURSOR => {
            intercepted(hwnd, data, msg, wparam, lparam, setcursor_over_client(lparam.0))
        }
        WM_DWMCOMPOSITIONCHANGED | WM_SIZE => intercepted(hwnd, data, msg, wparam, lparam, true),
        WM_ACTIVATE => {
            let event = if loword(wparam.0) == WA_INACTIVE {
                PopupEvent::Deactivated
            } else {
                PopupEvent::Activated
            };
            data.post(event);
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
        // Size and chrome are recomputed for the new monitor instead of
        // taking the suggested rectangle
        WM_DPICHANGED => {
            data.post(PopupEvent::Refresh);
            LRESULT(0)
        }
        WM_SETTINGCHANGE => {
            if data.listening.get() {
                let category = PreferenceCategory::from_setting(wparam.0 as u32);
                data.post(PopupEvent::PreferenceChanged(category));
            }
            unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
        }
        WM_LBUTTONUP => {
            let client = client_rect(hwnd);
            let layout = ContentLayout::new(
                client.width,
                client.height,
                window_scale(hwnd),
                data.chrome.get().content_inset,
            );
            match layout.button_at(point_from_lparam(lparam.0)) {
                Some(ContentButton::Pin) => data.post(PopupEvent::PinButton),
                Some(ContentButton::Exit) => data.post(PopupEvent::Exit),
                None => {}
            }
            LRESULT(0)
        }
        WM_PAINT => {
            paint(hwnd, data);
            LRESULT(0)
        }
        WM_ERASEBKGND => LRESULT(1),
        WM_CLOSE => {
            data.post(PopupEvent::Exit);
            LRESULT(0)
        }
        WM_DESTROY => {
            data.post(PopupEvent::Closing);
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

/// Run a message through the sink and apply the verdict.
fn intercepted(
    hwnd: HWND,
    data: &WindowData,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
    over_client: bool,
) -> LRESULT {
    let interception = match data.sink() {
        Some(sink) => sink.intercept(decode_message(msg, lparam.0), over_client),
        None => return unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    };

    if interception.is_handled() {
        // HTNOWHERE for hit-tests; TRUE halts further cursor processing
        LRESULT(if msg == WM_SETCURSOR { 1 } else { 0 })
    } else {
        unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) }
    }
}

fn window_rect(hwnd: HWND) -> Rect {
    let mut rect = RECT::default();
    if let Err(e) = unsafe { GetWindowRect(hwnd, &mut rect) } {
        warn!("GetWindowRect failed: {}", e);
    }
    rect_from_win32(rect)
}

fn client_rect(hwnd: HWND) -> Rect {
    let mut rect = RECT::default();
    if let Err(e) = unsafe { GetClientRect(hwnd, &mut rect) } {
        warn!("GetClientRect failed: {}", e);
    }
    rect_from_win32(rect)
}

fn window_scale(hwnd: HWND) -> f64 {
    scale_from_dpi(unsafe { GetDpiForWindow(hwnd) })
}

fn to_win32(rect: Rect) -> RECT {
    RECT {
        left: rect.x,
        top: rect.y,
        right: rect.right(),
        bottom: rect.bottom(),
    }
}

fn draw_text(hdc: windows::Win32::Graphics::Gdi::HDC, text: &str, rect: Rect, centered: bool) {
    let mut wide: Vec<u16> = text.encode_utf16().collect();
    let mut bounds = to_win32(rect);
    let align = if centered { DT_CENTER } else { DT_LEFT };
    unsafe {
        DrawTextW(hdc, &mut wide, &mut bounds, align | DT_SINGLELINE | DT_VCENTER);
    }
}

/// Paint the background, border, title and buttons for the current chrome.
fn paint(hwnd: HWND, data: &WindowData) {
    let chrome = data.chrome.get();
    let client = client_rect(hwnd);
    let layout = ContentLayout::new(
        client.width,
        client.height,
        window_scale(hwnd),
        chrome.content_inset,
    );

    let mut ps = PAINTSTRUCT::default();
    let hdc = unsafe { BeginPaint(hwnd, &mut ps) };

    unsafe {
        let window_brush = GetSysColorBrush(COLOR_WINDOW);
        if chrome.transparent_background {
            // Black is rendered as glass inside the extended frame
            let black = HBRUSH(GetStockObject(BLACK_BRUSH).0);
            FillRect(hdc, &to_win32(client), black);
            FillRect(hdc, &to_win32(layout.body), window_brush);
        } else {
            FillRect(hdc, &to_win32(client), window_brush);
        }

        if let Some(tone) = chrome.tone {
            let border = match tone {
                BorderTone::Active => GetSysColorBrush(COLOR_ACTIVECAPTION),
                BorderTone::Inactive => GetSysColorBrush(COLOR_INACTIVECAPTION),
            };
            let mut edge = client;
            for _ in 0..chrome.border_thickness {
                FrameRect(hdc, &to_win32(edge), border);
                edge = Rect::new(edge.x + 1, edge.y + 1, edge.width - 2, edge.height - 2);
            }
        }

        SetBkMode(hdc, TRANSPARENT);
        SetTextColor(hdc, windows::Win32::Foundation::COLORREF(GetSysColor(COLOR_WINDOWTEXT)));
        draw_text(hdc, &data.title, layout.title, false);

        for (button, rect) in [
            (ContentButton::Pin, layout.pin),
            (ContentButton::Exit, layout.exit),
        ] {
            FillRect(hdc, &to_win32(rect), GetSysColorBrush(COLOR_BTNFACE));
            FrameRect(hdc, &to_win32(rect), GetSysColorBrush(COLOR_BTNSHADOW));
            draw_text(hdc, button.label(), rect, true);
        }

        let _ = EndPaint(hwnd, &ps);
    }
}
