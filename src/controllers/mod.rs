pub mod audio;
pub mod bulletin;
pub mod health;
pub mod job;
pub mod metrics;
pub mod voice;
