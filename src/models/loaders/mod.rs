pub mod json_loader;
pub mod toml_loader;

pub use json_loader::{load_input, parse_input};
pub use toml_loader::{load_job_plan, parse_job_plan};
