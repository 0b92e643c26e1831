pub mod alerts;
pub mod dispatcher;
pub mod overlay;
pub mod time_window;

pub use dispatcher::{CoreConfig, Dispatcher};
