//! Desktop preference change notifications.
//!
//! The popup listens for desktop preference changes (taskbar moves, work area
//! changes) only while it is visible. The listener is an explicit token owned
//! by the controller. Auto-hide taskbar toggles are not reported through this
//! channel and therefore do not trigger a refresh.

/// `SPI_SETDESKWALLPAPER`
const SPI_SETDESKWALLPAPER: u32 = 0x0014;
/// `SPI_SETDESKPATTERN`
const SPI_SETDESKPATTERN: u32 = 0x0015;
/// `SPI_SETDRAGFULLWINDOWS`
const SPI_SETDRAGFULLWINDOWS: u32 = 0x0025;
/// `SPI_SETWORKAREA`
const SPI_SETWORKAREA: u32 = 0x002F;
/// `SPI_SETFONTSMOOTHING`
const SPI_SETFONTSMOOTHING: u32 = 0x004B;

/// Category of a user preference change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreferenceCategory {
    /// Desktop settings, including taskbar and work area geometry.
    Desktop,
    /// Any other category.
    Other,
}

impl PreferenceCategory {
    /// Categorise a settings-change notification by its `SPI_*` code.
    pub fn from_setting(spi: u32) -> Self {
        match spi {
            SPI_SETWORKAREA
            | SPI_SETDESKWALLPAPER
            | SPI_SETDESKPATTERN
            | SPI_SETDRAGFULLWINDOWS
            | SPI_SETFONTSMOOTHING => PreferenceCategory::Desktop,
            _ => PreferenceCategory::Other,
        }
    }
}

/// Proof that a preference listener is attached.
///
/// Obtained from `PopupShell::attach_preference_listener` and handed back to
/// `PopupShell::detach_preference_listener`. It cannot be cloned, so a
/// listener cannot be attached twice through the same owner.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a dropped subscription can no longer be detached"]
pub struct PreferenceSubscription {
    id: u64,
}

impl PreferenceSubscription {
    /// Create a subscription token. Platform implementations call this.
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_work_area_change_is_desktop() {
        assert_eq!(
            PreferenceCategory::from_setting(SPI_SETWORKAREA),
            PreferenceCategory::Desktop
        );
        assert_eq!(
            PreferenceCategory::from_setting(SPI_SETDESKWALLPAPER),
            PreferenceCategory::Desktop
        );
    }

    #[test]
    fn test_unrelated_setting_is_other() {
        // SPI_SETMOUSESPEED
        assert_eq!(PreferenceCategory::from_setting(0x0071), PreferenceCategory::Other);
        // Broadcast without an SPI code
        assert_eq!(PreferenceCategory::from_setting(0), PreferenceCategory::Other);
    }
}
