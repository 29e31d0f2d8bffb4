pub mod classifier;
pub mod http_backend;

pub use classifier::{ModelLoader, Prediction, TextClassifier};
pub use http_backend::{HttpClassifier, HttpModelLoader};
