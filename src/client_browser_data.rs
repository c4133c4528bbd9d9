use std::sync::Arc;

use crate::classifier::BrowserClassifier;
use crate::config::ClassifierConfig;
use crate::database::RuleDatabase;
use crate::error::Result;
use crate::heuristics::BotMatcher;
use crate::mobile_detect::MobileDetect;
use crate::types::{DetectionContext, HttpHeaders};

/// Shared entry point: one compiled rule database and bot heuristics,
/// handing out a fresh classifier per request.
///
/// ```ignore
/// let detector = ClientBrowserData::new()?;
/// let client = detector.for_user_agent("Mozilla/5.0 (iPhone; ...)");
/// assert!(client.is_mobile());
/// ```
#[derive(Clone)]
pub struct ClientBrowserData {
    database: Arc<RuleDatabase>,
    matcher: Arc<BotMatcher>,
    empty_user_agent_is_bot: bool,
}

impl ClientBrowserData {
    /// Embedded rules with the default heuristics.
    pub fn new() -> Result<Self> {
        Self::from_config(&ClassifierConfig::default())
    }

    pub fn from_config(config: &ClassifierConfig) -> Result<Self> {
        let database = config.load_database()?;
        Self::with_database(Arc::new(database), config)
    }

    /// Reuse an already loaded database.
    pub fn with_database(database: Arc<RuleDatabase>, config: &ClassifierConfig) -> Result<Self> {
        Ok(Self {
            database,
            matcher: Arc::new(config.heuristics.compile()?),
            empty_user_agent_is_bot: config.empty_user_agent_is_bot,
        })
    }

    pub fn database(&self) -> &Arc<RuleDatabase> {
        &self.database
    }

    pub fn for_request(&self, context: DetectionContext) -> BrowserClassifier<MobileDetect> {
        let engine = MobileDetect::new(self.database.clone(), context);
        BrowserClassifier::new(engine, self.matcher.clone())
            .empty_user_agent_is_bot(self.empty_user_agent_is_bot)
    }

    pub fn for_headers(&self, headers: HttpHeaders) -> BrowserClassifier<MobileDetect> {
        self.for_request(DetectionContext::from_request_headers(headers))
    }

    pub fn for_user_agent(&self, user_agent: &str) -> BrowserClassifier<MobileDetect> {
        self.for_request(DetectionContext::from_user_agent(user_agent))
    }
}
