//! Selection glue for UI controls that drive shader animation speed.

mod selection;

pub use selection::{
    DEFAULT_SPEED_PROPERTY, SelectionEvent, SelectionSpeedControl, UiSelection, register_ui_events,
};
