//! CLI command implementations.

mod analyze;
mod config;
mod describe;
mod doctor;
mod reply;
mod search;
mod summarize;
mod video;

pub use analyze::run_analyze;
pub use config::run_config;
pub use describe::run_describe;
pub use doctor::run_doctor;
pub use reply::run_reply;
pub use search::run_search;
pub use summarize::run_summarize;
pub use video::run_video;
