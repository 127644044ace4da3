pub mod collector;
pub mod model;

pub use collector::{clean_snippet, CollectionPlan, CollectionReport, SourceCollector};
pub use model::{NewsQuality, SourceCitation, SourceItem};
