//! Ratatui front-end: the invoice editor, the print preview and the modal
//! forms layered over them.

mod app;
mod forms;
mod helpers;
mod screens;
mod terminal;

pub use app::App;
pub use terminal::run_app;
