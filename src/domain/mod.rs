pub mod bulletin;
pub mod script;
pub mod sources;
pub mod voice;
