//! HTTP request handlers.

mod health;
mod report;
mod root;

pub use health::health;
pub use report::get_report;
pub use root::root;
