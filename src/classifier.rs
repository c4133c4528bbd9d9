use std::sync::Arc;

use indexmap::IndexMap;

use crate::engine::DetectionEngine;
use crate::error::Result;
use crate::heuristics::BotMatcher;
use crate::types::{
    DetectionType, HttpHeaders, MobileGrade, MobileHeaderRule, RuleMap, Version, VersionType,
};

/// Key `is` answers with `is_bot`.
pub const BOT_KEY: &str = "Bot";
/// Key `is` answers with `is_mobile`.
pub const MOBILE_KEY: &str = "Mobile";
/// Key `is` answers with `is_any_bot`.
pub const ANY_BOT_KEY: &str = "AnyBot";

/// Bot and mobile classification layered over a detection engine.
///
/// The three derived predicates combine engine signatures with the
/// substring heuristics in `BotMatcher`. Everything else forwards to the
/// engine unchanged.
pub struct BrowserClassifier<E: DetectionEngine> {
    engine: E,
    matcher: Arc<BotMatcher>,
    empty_user_agent_is_bot: bool,
}

impl<E: DetectionEngine> BrowserClassifier<E> {
    pub fn new(engine: E, matcher: Arc<BotMatcher>) -> Self {
        Self {
            engine,
            matcher,
            empty_user_agent_is_bot: true,
        }
    }

    /// Whether a request without a user-agent counts as a bot. On by
    /// default.
    pub fn empty_user_agent_is_bot(mut self, enabled: bool) -> Self {
        self.empty_user_agent_is_bot = enabled;
        self
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn catalog(&self) -> &E::Catalog {
        self.engine.catalog()
    }

    fn agent(&self) -> &str {
        self.engine.user_agent().unwrap_or("")
    }

    fn missing_agent(&self) -> bool {
        self.empty_user_agent_is_bot && self.agent().is_empty()
    }

    fn mobile_bot(&self) -> bool {
        self.engine.is(self.matcher.mobile_bot_signature())
    }

    fn generic_bot(&self) -> bool {
        self.engine.is(self.matcher.generic_bot_signature())
    }

    /// A mobile device, or a crawler presenting as one.
    pub fn is_mobile(&self) -> bool {
        let mobile = self.mobile_bot() || self.engine.is_mobile();
        tracing::trace!(mobile, "classified mobile");
        mobile
    }

    /// A crawler. Hits on the generic `bot`/`spider` substrings are ignored
    /// for crawlers the engine already knows as mobile bots.
    pub fn is_bot(&self) -> bool {
        let ua = self.agent();
        let bot = self.missing_agent()
            || self.generic_bot()
            || self.matcher.matches_always_bot(ua)
            || (self.matcher.matches_bot(ua) && !self.mobile_bot());
        tracing::trace!(bot, "classified bot");
        bot
    }

    /// Any crawler, mobile or not.
    pub fn is_any_bot(&self) -> bool {
        let any_bot = self.missing_agent()
            || self.matcher.matches_any_bot(self.agent())
            || self.mobile_bot()
            || self.generic_bot();
        tracing::trace!(any_bot, "classified any bot");
        any_bot
    }

    /// Named check. `Bot`, `Mobile` and `AnyBot` map to the derived
    /// predicates; any other key is an engine signature, and unknown keys
    /// are `false`.
    pub fn is(&self, key: &str) -> bool {
        match key {
            BOT_KEY => self.is_bot(),
            MOBILE_KEY => self.is_mobile(),
            ANY_BOT_KEY => self.is_any_bot(),
            _ => self.engine.is(key),
        }
    }

    // -----------------------------------------------------------------------
    // Engine pass-through
    // -----------------------------------------------------------------------

    pub fn http_headers(&self) -> &HttpHeaders {
        self.engine.http_headers()
    }

    pub fn http_header(&self, name: &str) -> Option<&str> {
        self.engine.http_header(name)
    }

    pub fn mobile_headers(&self) -> &IndexMap<String, MobileHeaderRule> {
        self.engine.mobile_headers()
    }

    pub fn ua_http_headers(&self) -> &[String] {
        self.engine.ua_http_headers()
    }

    pub fn set_cf_headers(&mut self, headers: Option<&HttpHeaders>) -> bool {
        self.engine.set_cf_headers(headers)
    }

    pub fn cf_headers(&self) -> &HttpHeaders {
        self.engine.cf_headers()
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.engine.user_agent()
    }

    pub fn set_detection_type(&self, detection_type: Option<DetectionType>) -> DetectionType {
        self.engine.set_detection_type(detection_type)
    }

    pub fn matching_regex(&self) -> Option<String> {
        self.engine.matching_regex()
    }

    pub fn matches_array(&self) -> Option<Vec<String>> {
        self.engine.matches_array()
    }

    pub fn mobile_detection_rules_extended(&self) -> &RuleMap {
        self.engine.mobile_detection_rules_extended()
    }

    pub fn rules(&self) -> &RuleMap {
        self.engine.rules()
    }

    pub fn check_http_headers_for_mobile(&self) -> bool {
        self.engine.check_http_headers_for_mobile()
    }

    pub fn is_tablet(&self) -> bool {
        self.engine.is_tablet()
    }

    pub fn match_regex(&self, regex: &str) -> Result<bool> {
        self.engine.match_regex(regex)
    }

    pub fn prepare_version_no(&self, ver: &str) -> f64 {
        self.engine.prepare_version_no(ver)
    }

    pub fn version(&self, property: &str, version_type: VersionType) -> Option<Version> {
        self.engine.version(property, version_type)
    }

    pub fn mobile_grade(&self) -> Result<MobileGrade> {
        self.engine.mobile_grade()
    }
}
