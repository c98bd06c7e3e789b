pub mod list;
pub mod refresh;
pub mod setup;
pub mod summary;
pub mod ui;
