//! Canvas-size negotiator.
//!
//! Tracks the size selector, the two custom-dimension inputs, and the pixel
//! size the canvas is currently rendered at. A descriptor is always applied
//! here before any widget is placed, so clamping during drag has the right
//! bounds.

#[cfg(test)]
#[path = "canvas_size_test.rs"]
mod canvas_size_test;

use tracing::debug;

use crate::snapshot::{CanvasSize, PixelSize, parse_leading_int};

/// Options offered by the size selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeOption {
    #[default]
    A4,
    A3,
    Custom,
}

#[derive(Debug, Clone)]
pub struct CanvasSizeNegotiator {
    selected: SizeOption,
    custom_width: String,
    custom_height: String,
    custom_inputs_visible: bool,
    rendered: PixelSize,
}

impl CanvasSizeNegotiator {
    /// Negotiator showing the default preset.
    #[must_use]
    pub fn new() -> Self {
        let mut negotiator = Self {
            selected: SizeOption::A4,
            custom_width: String::new(),
            custom_height: String::new(),
            custom_inputs_visible: false,
            rendered: CanvasSize::default().pixel_size(),
        };
        negotiator.apply(CanvasSize::default());
        negotiator
    }

    /// Apply a descriptor: resize the canvas and sync the selector and inputs.
    pub fn apply(&mut self, size: CanvasSize) -> PixelSize {
        self.rendered = size.pixel_size();
        match size {
            CanvasSize::A4 => {
                self.selected = SizeOption::A4;
                self.custom_inputs_visible = false;
            }
            CanvasSize::A3 => {
                self.selected = SizeOption::A3;
                self.custom_inputs_visible = false;
            }
            CanvasSize::Custom { width, height } => {
                self.selected = SizeOption::Custom;
                self.custom_inputs_visible = true;
                self.custom_width = width.to_string();
                self.custom_height = height.to_string();
            }
        }
        debug!(width = self.rendered.width, height = self.rendered.height, "canvas size applied");
        self.rendered
    }

    /// Descriptor for the current selection. Custom dimensions come from the
    /// inputs; a zero or unparseable input falls back to the rendered size.
    #[must_use]
    pub fn read(&self) -> CanvasSize {
        match self.selected {
            SizeOption::A4 => CanvasSize::A4,
            SizeOption::A3 => CanvasSize::A3,
            SizeOption::Custom => CanvasSize::Custom {
                width: positive(&self.custom_width).unwrap_or(self.rendered.width),
                height: positive(&self.custom_height).unwrap_or(self.rendered.height),
            },
        }
    }

    /// Handle a selector change. Presets apply immediately and return the
    /// applied descriptor; `Custom` only reveals the inputs.
    pub fn select(&mut self, option: SizeOption) -> Option<CanvasSize> {
        match option {
            SizeOption::A4 => {
                self.apply(CanvasSize::A4);
                Some(CanvasSize::A4)
            }
            SizeOption::A3 => {
                self.apply(CanvasSize::A3);
                Some(CanvasSize::A3)
            }
            SizeOption::Custom => {
                self.selected = SizeOption::Custom;
                self.custom_inputs_visible = true;
                None
            }
        }
    }

    pub fn set_custom_inputs(&mut self, width: impl Into<String>, height: impl Into<String>) {
        self.custom_width = width.into();
        self.custom_height = height.into();
    }

    /// Apply the custom inputs when both parse to positive integers.
    pub fn apply_custom_inputs(&mut self) -> Option<CanvasSize> {
        let width = positive(&self.custom_width)?;
        let height = positive(&self.custom_height)?;
        let size = CanvasSize::Custom { width, height };
        self.apply(size);
        Some(size)
    }

    #[must_use]
    pub fn selected(&self) -> SizeOption {
        self.selected
    }

    #[must_use]
    pub fn rendered(&self) -> PixelSize {
        self.rendered
    }

    #[must_use]
    pub fn custom_inputs_visible(&self) -> bool {
        self.custom_inputs_visible
    }

    #[must_use]
    pub fn custom_inputs(&self) -> (&str, &str) {
        (&self.custom_width, &self.custom_height)
    }
}

impl Default for CanvasSizeNegotiator {
    fn default() -> Self {
        Self::new()
    }
}

fn positive(raw: &str) -> Option<u32> {
    parse_leading_int(raw).filter(|v| *v > 0)
}
