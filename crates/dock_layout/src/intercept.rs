//! Native message interception decisions.
//!
//! The popup hooks its window procedure to keep the extended glass margin
//! from acting as a resize border, and to recompute its display when the
//! compositor is toggled or the window is resized. This module decides what
//! to do with each message; the platform crate decodes and applies it.

/// Mouse-button-down message identifiers as carried in the high word of a
/// cursor-set message's `lParam`.
pub mod mouse {
    pub const LBUTTONDOWN: u32 = 0x0201;
    pub const RBUTTONDOWN: u32 = 0x0204;
    pub const MBUTTONDOWN: u32 = 0x0207;
    pub const XBUTTONDOWN: u32 = 0x020B;

    /// Whether `message` is any mouse-button-down message.
    pub fn is_button_down(message: u32) -> bool {
        matches!(message, LBUTTONDOWN | RBUTTONDOWN | MBUTTONDOWN | XBUTTONDOWN)
    }
}

/// A window message, reduced to the categories the popup cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeMessage {
    /// Non-client hit-test.
    HitTest,
    /// Cursor-set, carrying the mouse message that triggered it.
    SetCursor { mouse_message: u32 },
    /// Desktop composition was enabled or disabled.
    CompositionChanged,
    /// The window's size changed.
    SizeChanged,
    /// Anything else, by raw identifier.
    Other(u32),
}

/// What the window procedure should do with a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interception {
    /// Let the default processing run.
    PassThrough,
    /// Mark the message handled and return zero.
    Swallow,
    /// Mark the message handled and give the popup input focus.
    SwallowAndFocus,
    /// Recompute the popup display without activating it, then pass through.
    Refresh,
}

impl Interception {
    /// Whether default processing must be skipped.
    pub fn is_handled(&self) -> bool {
        matches!(self, Interception::Swallow | Interception::SwallowAndFocus)
    }
}

/// Decide how to treat `message`.
///
/// Nothing is intercepted unless the popup is loaded and visible.
/// `over_client` reports whether the cursor is over the logical client area
/// (inside the glass margin).
pub fn intercept(message: NativeMessage, loaded_and_visible: bool, over_client: bool) -> Interception {
    if !loaded_and_visible {
        return Interception::PassThrough;
    }

    match message {
        NativeMessage::HitTest if !over_client => Interception::Swallow,
        NativeMessage::SetCursor { mouse_message }
            if !over_client && mouse::is_button_down(mouse_message) =>
        {
            Interception::SwallowAndFocus
        }
        NativeMessage::CompositionChanged | NativeMessage::SizeChanged => Interception::Refresh,
        _ => Interception::PassThrough,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_window_passes_everything() {
        for message in [
            NativeMessage::HitTest,
            NativeMessage::SetCursor {
                mouse_message: mouse::LBUTTONDOWN,
            },
            NativeMessage::CompositionChanged,
            NativeMessage::SizeChanged,
        ] {
            assert_eq!(intercept(message, false, false), Interception::PassThrough);
        }
    }

    #[test]
    fn test_hit_test_outside_client_swallowed() {
        assert_eq!(
            intercept(NativeMessage::HitTest, true, false),
            Interception::Swallow
        );
        assert_eq!(
            intercept(NativeMessage::HitTest, true, true),
            Interception::PassThrough
        );
    }

    #[test]
    fn test_set_cursor_only_on_button_down_outside_client() {
        for button in [
            mouse::LBUTTONDOWN,
            mouse::RBUTTONDOWN,
            mouse::MBUTTONDOWN,
            mouse::XBUTTONDOWN,
        ] {
            let message = NativeMessage::SetCursor {
                mouse_message: button,
            };
            assert_eq!(intercept(message, true, false), Interception::SwallowAndFocus);
            assert_eq!(intercept(message, true, true), Interception::PassThrough);
        }

        // Mouse move over the border keeps the default cursor handling
        let hover = NativeMessage::SetCursor {
            mouse_message: 0x0200,
        };
        assert_eq!(intercept(hover, true, false), Interception::PassThrough);
    }

    #[test]
    fn test_composition_and_size_refresh() {
        assert_eq!(
            intercept(NativeMessage::CompositionChanged, true, true),
            Interception::Refresh
        );
        assert_eq!(
            intercept(NativeMessage::SizeChanged, true, false),
            Interception::Refresh
        );
        assert!(!Interception::Refresh.is_handled());
    }

    #[test]
    fn test_other_messages_pass_through() {
        assert_eq!(
            intercept(NativeMessage::Other(0x000F), true, false),
            Interception::PassThrough
        );
    }
}
