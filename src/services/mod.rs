pub mod model_cache;
pub mod output_writer;

pub use model_cache::{LoadedModels, ModelCache};
pub use output_writer::OutputWriter;
