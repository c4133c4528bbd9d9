mod classifier;
mod client_browser_data;
mod config;
mod database;
mod db;
mod dispatch;
mod engine;
mod error;
mod heuristics;
mod literal;
mod mobile_detect;
mod rules;
mod types;
mod version;

pub use classifier::{BrowserClassifier, ANY_BOT_KEY, BOT_KEY, MOBILE_KEY};
pub use client_browser_data::ClientBrowserData;
pub use config::ClassifierConfig;
pub use database::RuleDatabase;
pub use dispatch::Method;
pub use engine::{DetectionEngine, EngineCatalog};
pub use error::{Error, Result};
pub use heuristics::{BotHeuristics, BotMatcher};
pub use mobile_detect::{MobileDetect, CLOUDFRONT_USER_AGENT};
pub use types::*;
pub use version::prepare_version_no;
