mod dashboard;
mod frame;
mod lifecycle;
mod theme;

pub use dashboard::{Ui, UiActions};
pub use frame::draw_frame;
pub use lifecycle::setup_render_ui;
