//! Live dashboard and its headless stand-in.

mod headless;
pub mod model;
pub mod render;

pub use headless::setup_headless_output;
pub use model::UiState;
pub use render::setup_render_ui;

#[cfg(test)]
mod tests;
