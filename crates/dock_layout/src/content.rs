//! Layout of the popup's own content: a title line and the "Pin" and "Exit"
//! buttons along the bottom edge. All rectangles are in client coordinates.

use crate::{to_device, Point, Rect};

const PADDING: f64 = 12.0;
const BUTTON_WIDTH: f64 = 72.0;
const BUTTON_HEIGHT: f64 = 24.0;

/// A clickable button inside the popup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentButton {
    /// Pins the popup open.
    Pin,
    /// Exits the application.
    Exit,
}

impl ContentButton {
    pub fn label(&self) -> &'static str {
        match self {
            ContentButton::Pin => "Pin",
            ContentButton::Exit => "Exit",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContentLayout {
    /// Client area minus the chrome inset.
    pub body: Rect,
    pub title: Rect,
    pub pin: Rect,
    pub exit: Rect,
}

impl ContentLayout {
    pub fn new(client_width: i32, client_height: i32, scale: f64, inset: i32) -> Self {
        let body = Rect::new(
            inset,
            inset,
            (client_width - 2 * inset).max(0),
            (client_height - 2 * inset).max(0),
        );

        let padding = to_device(PADDING, scale);
        let button_width = to_device(BUTTON_WIDTH, scale);
        let button_height = to_device(BUTTON_HEIGHT, scale);

        let button_y = body.bottom() - padding - button_height;
        let exit = Rect::new(
            body.right() - padding - button_width,
            button_y,
            button_width,
            button_height,
        );
        let pin = Rect::new(exit.x - padding - button_width, button_y, button_width, button_height);
        let title = Rect::new(
            body.x + padding,
            body.y + padding,
            (body.width - 2 * padding).max(0),
            button_height,
        );

        Self {
            body,
            title,
            pin,
            exit,
        }
    }

    /// The button under `point`, if any.
    pub fn button_at(&self, point: Point) -> Option<ContentButton> {
        if self.pin.contains(point) {
            Some(ContentButton::Pin)
        } else if self.exit.contains(point) {
            Some(ContentButton::Exit)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buttons_along_bottom_right() {
        let layout = ContentLayout::new(300, 400, 1.0, 1);
        assert_eq!(layout.exit, Rect::new(299 - 12 - 72, 399 - 12 - 24, 72, 24));
        assert_eq!(layout.pin.right() + 12, layout.exit.x);
        assert_eq!(layout.pin.y, layout.exit.y);
        assert!(layout.body.contains_rect(&layout.pin));
        assert!(layout.body.contains_rect(&layout.exit));
    }

    #[test]
    fn test_button_at() {
        let layout = ContentLayout::new(300, 400, 1.0, 0);
        assert_eq!(layout.button_at(layout.pin.center()), Some(ContentButton::Pin));
        assert_eq!(layout.button_at(layout.exit.center()), Some(ContentButton::Exit));
        assert_eq!(layout.button_at(Point::new(5, 5)), None);
    }

    #[test]
    fn test_scaled_layout() {
        let layout = ContentLayout::new(600, 800, 2.0, 2);
        assert_eq!(layout.exit.width, 144);
        assert_eq!(layout.exit.height, 48);
        assert_eq!(layout.title.y, 2 + 24);
    }

    #[test]
    fn test_labels() {
        assert_eq!(ContentButton::Pin.label(), "Pin");
        assert_eq!(ContentButton::Exit.label(), "Exit");
    }
}
