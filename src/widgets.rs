use eframe::egui::{self, Slider, Ui};

use crate::settings::{MAX_ARROW_SCALE, MIN_ARROW_SCALE};

/// Outcome of an editing widget for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Edit<T> {
    Unchanged,
    Updated(T),
}

impl<T> Edit<T> {
    pub fn from_response(response: &egui::Response, value: T) -> Self {
        if response.changed() {
            Edit::Updated(value)
        } else {
            Edit::Unchanged
        }
    }

    pub fn apply_to(self, target: &mut T) -> bool {
        match self {
            Edit::Updated(value) => {
                *target = value;
                true
            }
            Edit::Unchanged => false,
        }
    }
}

/// RGBA color button; all four channels come back together.
pub fn color_edit(ui: &mut Ui, color: [f32; 4]) -> Edit<[f32; 4]> {
    let mut rgba = color;
    let response = ui.color_edit_button_rgba_unmultiplied(&mut rgba);
    Edit::from_response(&response, rgba)
}

pub fn scale_slider(ui: &mut Ui, scale: f32) -> Edit<f32> {
    let mut value = scale;
    let response = ui.add(
        Slider::new(&mut value, MIN_ARROW_SCALE..=MAX_ARROW_SCALE)
            .fixed_decimals(2)
            .text("scale"),
    );
    Edit::from_response(&response, value)
}
