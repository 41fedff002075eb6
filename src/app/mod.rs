mod runner;
mod settings;

pub use runner::{RunReport, run_load};
pub use settings::{DisplayMode, RunSettings};
