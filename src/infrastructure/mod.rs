pub mod cache;
pub mod config;
pub mod http;
pub mod jobs;
pub mod repositories;
pub mod storage;
