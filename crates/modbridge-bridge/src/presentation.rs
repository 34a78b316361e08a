//! Presentation surface and composite button options
//!
//! The bridge never draws anything itself. A [`Presenter`] supplied by the
//! host draws buttons, separators and tooltips onto an opaque surface and
//! reports hover/click state. A button's draw call returns a
//! [`RenderRequest`] describing what should follow it this frame.

use crate::menu::{Callback, TextProvider};
use serde::Serialize;
use std::any::Any;
use std::fmt;

/// Draw position on the host surface
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Pointer state of a button after it was drawn
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ButtonFrame {
    /// Pointer is over the left (label) text
    pub left_hovered: bool,
    /// Pointer is over the right (button) text
    pub right_hovered: bool,
    /// The right text was clicked this frame
    pub clicked: bool,
}

/// Tooltip to show after the menu has drawn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Tooltip {
    /// Plain hover text
    Hover(String),
    /// A titled tooltip
    Titled { title: String, body: String },
}

/// A click on a button option
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ButtonClick {
    /// Field id of the button
    pub field_id: String,
}

/// What a drawn button asks for this frame
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderRequest {
    pub tooltip: Option<Tooltip>,
    pub click: Option<ButtonClick>,
}

/// Host presentation layer
pub trait Presenter: Send + Sync {
    /// Draw a two-part button and report its pointer state
    fn draw_button(&self, surface: &dyn Any, at: Point, left: &str, right: &str) -> ButtonFrame;

    /// Draw a horizontal separator
    fn draw_separator(&self, surface: &dyn Any, at: Point);

    /// Draw a tooltip over everything else
    fn draw_tooltip(&self, surface: &dyn Any, tooltip: &Tooltip);

    /// Height of `text` in the button font
    fn text_height(&self, text: &str) -> f32;
}

/// Registration parameters for a button option
///
/// Each text is a translation key name: `left` resolves `.Title`, `right`
/// resolves `.Button`, `description` resolves `.Description` and `hover`
/// resolves `.Hover`. Keys that are not given default to `left`.
#[derive(Clone, Default)]
pub struct ButtonSpec {
    pub left: String,
    pub right: Option<String>,
    pub description: Option<String>,
    pub hover: Option<String>,
    pub render_left: bool,
    pub render_right: bool,
    /// Defaults to the resolved left text
    pub field_id: Option<String>,
    pub after_reset: Option<Callback>,
}

impl ButtonSpec {
    pub fn new(left: impl Into<String>) -> Self {
        Self {
            left: left.into(),
            ..Self::default()
        }
    }

    pub fn right(mut self, key: impl Into<String>) -> Self {
        self.right = Some(key.into());
        self
    }

    pub fn description(mut self, key: impl Into<String>) -> Self {
        self.description = Some(key.into());
        self
    }

    pub fn hover(mut self, key: impl Into<String>) -> Self {
        self.hover = Some(key.into());
        self
    }

    /// Show the titled tooltip when the label is hovered
    pub fn render_left(mut self, render: bool) -> Self {
        self.render_left = render;
        self
    }

    /// Show the hover tooltip when the button text is hovered
    pub fn render_right(mut self, render: bool) -> Self {
        self.render_right = render;
        self
    }

    pub fn field_id(mut self, id: impl Into<String>) -> Self {
        self.field_id = Some(id.into());
        self
    }

    /// Run `callback` after the menu resets this mod's options
    pub fn after_reset<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.after_reset = Some(std::sync::Arc::new(callback));
        self
    }
}

impl fmt::Debug for ButtonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonSpec")
            .field("left", &self.left)
            .field("right", &self.right)
            .field("field_id", &self.field_id)
            .finish()
    }
}

/// A composite option of a label (left) and a clickable text (right)
pub struct ButtonOption {
    pub(crate) left: TextProvider,
    pub(crate) right: TextProvider,
    pub(crate) description: TextProvider,
    pub(crate) hover: TextProvider,
    pub(crate) render_left: bool,
    pub(crate) render_right: bool,
    pub(crate) field_id: String,
}

impl ButtonOption {
    /// Field id reported in clicks
    pub fn field_id(&self) -> &str {
        &self.field_id
    }

    /// Draw through `presenter` and decide the tooltip and click
    ///
    /// Hovering the right text shows the hover text when `render_right` is
    /// set; hovering the left text shows the label and description when
    /// `render_left` is set.
    pub fn draw(&self, presenter: &dyn Presenter, surface: &dyn Any, at: Point) -> RenderRequest {
        let left = (self.left)();
        let frame = presenter.draw_button(surface, at, &left, &(self.right)());

        let tooltip = if self.render_right && frame.right_hovered {
            Some(Tooltip::Hover((self.hover)()))
        } else if self.render_left && frame.left_hovered {
            Some(Tooltip::Titled {
                title: left,
                body: (self.description)(),
            })
        } else {
            None
        };

        RenderRequest {
            tooltip,
            click: frame.clicked.then(|| ButtonClick {
                field_id: self.field_id.clone(),
            }),
        }
    }

    /// Row height: the height of the right text
    pub fn height(&self, presenter: &dyn Presenter) -> f32 {
        presenter.text_height(&(self.right)())
    }
}

impl fmt::Debug for ButtonOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ButtonOption")
            .field("field_id", &self.field_id)
            .field("render_left", &self.render_left)
            .field("render_right", &self.render_right)
            .finish()
    }
}
