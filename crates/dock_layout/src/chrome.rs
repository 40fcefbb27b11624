//! Border treatment selection.
//!
//! With desktop composition enabled the popup extends the compositor's glass
//! frame one unit into the client area. Without composition it draws a solid
//! one pixel border whose tone follows the window's activation state.

use crate::to_device;
use serde::{Deserialize, Serialize};

/// Width of the glass frame extension, in logical units.
const GLASS_EXTENSION: f64 = 1.0;

/// Solid border thickness in device pixels, independent of DPI.
const CLASSIC_BORDER: i32 = 1;

/// One of the three border treatments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderStyle {
    /// Compositor glass extended into the client area.
    Glass,
    /// Solid border, window active.
    Classic,
    /// Solid border, window inactive.
    ClassicInactive,
}

/// Colour family of a solid border.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BorderTone {
    Active,
    Inactive,
}

/// Concrete chrome parameters for one border treatment at one DPI scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chrome {
    pub style: BorderStyle,
    /// Pixels of compositor frame extended into each side of the client area.
    pub frame_extension: i32,
    /// Solid border thickness in device pixels.
    pub border_thickness: i32,
    /// Inset of the content from the client edge, in device pixels.
    pub content_inset: i32,
    /// Whether the client background must be transparent to the compositor.
    pub transparent_background: bool,
    /// Tone of the solid border, if any.
    pub tone: Option<BorderTone>,
}

impl BorderStyle {
    /// Pick the treatment for the current compositor and activation state.
    pub fn select(compositor_enabled: bool, active: bool) -> Self {
        match (compositor_enabled, active) {
            (true, _) => BorderStyle::Glass,
            (false, true) => BorderStyle::Classic,
            (false, false) => BorderStyle::ClassicInactive,
        }
    }

    /// Resolve the treatment into concrete chrome at `scale`.
    pub fn chrome(self, scale: f64) -> Chrome {
        match self {
            BorderStyle::Glass => {
                let extension = to_device(GLASS_EXTENSION, scale).max(1);
                Chrome {
                    style: self,
                    frame_extension: extension,
                    border_thickness: 0,
                    content_inset: extension,
                    transparent_background: true,
                    tone: None,
                }
            }
            BorderStyle::Classic | BorderStyle::ClassicInactive => Chrome {
                style: self,
                frame_extension: 0,
                border_thickness: CLASSIC_BORDER,
                content_inset: CLASSIC_BORDER,
                transparent_background: false,
                tone: Some(if self == BorderStyle::Classic {
                    BorderTone::Active
                } else {
                    BorderTone::Inactive
                }),
            },
        }
    }
}

impl Default for Chrome {
    fn default() -> Self {
        BorderStyle::ClassicInactive.chrome(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_glass_ignores_activation() {
        assert_eq!(BorderStyle::select(true, true), BorderStyle::Glass);
        assert_eq!(BorderStyle::select(true, false), BorderStyle::Glass);
    }

    #[test]
    fn test_select_classic_follows_activation() {
        assert_eq!(BorderStyle::select(false, true), BorderStyle::Classic);
        assert_eq!(BorderStyle::select(false, false), BorderStyle::ClassicInactive);
    }

    #[test]
    fn test_glass_chrome() {
        let chrome = BorderStyle::Glass.chrome(1.0);
        assert_eq!(chrome.frame_extension, 1);
        assert_eq!(chrome.border_thickness, 0);
        assert_eq!(chrome.content_inset, 1);
        assert!(chrome.transparent_background);
        assert_eq!(chrome.tone, None);

        assert_eq!(BorderStyle::Glass.chrome(2.0).frame_extension, 2);
        assert_eq!(BorderStyle::Glass.chrome(1.25).frame_extension, 1);
    }

    #[test]
    fn test_classic_chrome_is_one_pixel_at_any_scale() {
        for scale in [1.0, 1.25, 1.5, 2.0] {
            let chrome = BorderStyle::Classic.chrome(scale);
            assert_eq!(chrome.border_thickness, 1);
            assert_eq!(chrome.frame_extension, 0);
            assert!(!chrome.transparent_background);
            assert_eq!(chrome.tone, Some(BorderTone::Active));
        }
        assert_eq!(
            BorderStyle::ClassicInactive.chrome(1.5).tone,
            Some(BorderTone::Inactive)
        );
    }
}
