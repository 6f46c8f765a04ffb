pub mod config;
pub mod pipeline;
pub mod report;
pub mod truth_json;
