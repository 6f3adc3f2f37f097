pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod export;
pub mod github;
pub mod model;
pub mod prompt;
pub mod pulse;
pub mod report;
pub mod scorecard;
pub mod util;
