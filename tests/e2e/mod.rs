// End-to-end tests for the Newscast Backend API
//
// Each test spawns the full router on an ephemeral port, wired to stub
// source, language model and speech repositories and a temporary audio
// directory. No network access is needed and tests run in parallel.

mod helpers;
mod test_download;
mod test_generate;
mod test_health;
mod test_jobs;
mod test_metrics;
mod test_voices;
