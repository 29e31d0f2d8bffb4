pub mod collection;
pub mod kind;
pub mod loaders;
pub mod plan;
pub mod record;

pub use collection::{Collection, Collections};
pub use kind::{LoadOptions, ModelKind, Slot};
pub use loaders::{load_input, load_job_plan};
pub use plan::{CollectionPlan, JobPlan, JobSpec};
pub use record::TextRecord;
