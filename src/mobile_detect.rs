use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;

use super::database::RuleDatabase;
use super::engine::{DetectionEngine, EngineCatalog};
use super::error::Result;
use super::rules::{capture_all, compile_rule, RuleGroup};
use super::types::*;
use super::version::{prepare_user_agent, prepare_version_no, VER};

/// User-agent reported for requests that reach us only through CloudFront
/// viewer headers.
pub const CLOUDFRONT_USER_AGENT: &str = "Amazon CloudFront";

const CLOUDFRONT_PREFIX: &str = "HTTP_CLOUDFRONT_";

#[derive(Debug, Default)]
struct LastMatch {
    regex: Option<String>,
    captures: Option<Vec<String>>,
}

/// Rule-table engine bound to one request.
pub struct MobileDetect {
    database: Arc<RuleDatabase>,
    http_headers: HttpHeaders,
    cf_headers: HttpHeaders,
    user_agent: Option<String>,
    detection_type: Cell<DetectionType>,
    /// Lower-cased signature key → result of `is`.
    cache: RefCell<HashMap<String, bool>>,
    last_match: RefCell<LastMatch>,
}

impl MobileDetect {
    pub fn new(database: Arc<RuleDatabase>, context: DetectionContext) -> Self {
        let mut detect = Self {
            database,
            http_headers: context.headers().clone(),
            cf_headers: HttpHeaders::new(),
            user_agent: None,
            detection_type: Cell::new(DetectionType::Mobile),
            cache: RefCell::new(HashMap::new()),
            last_match: RefCell::new(LastMatch::default()),
        };
        detect.set_cf_headers(None);
        detect.user_agent = detect.resolve_user_agent(context.user_agent());
        detect
    }

    /// Explicit user-agent if non-empty, else the concatenated alternate UA
    /// headers, else the CloudFront marker when CloudFront headers exist.
    fn resolve_user_agent(&self, explicit: Option<&str>) -> Option<String> {
        if let Some(ua) = explicit.filter(|ua| !ua.is_empty()) {
            return Some(prepare_user_agent(ua));
        }

        let joined = self
            .database
            .ua_http_headers()
            .iter()
            .filter_map(|name| self.http_headers.get(name))
            .filter(|v| !v.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if !joined.is_empty() {
            return Some(prepare_user_agent(&joined));
        }

        if !self.cf_headers.is_empty() {
            return Some(CLOUDFRONT_USER_AGENT.to_string());
        }
        None
    }

    fn ua(&self) -> &str {
        self.user_agent.as_deref().unwrap_or("")
    }

    fn cloudfront_viewer(&self, header: &str) -> bool {
        self.user_agent.as_deref() == Some(CLOUDFRONT_USER_AGENT)
            && self.cf_headers.get(header) == Some("true")
    }

    fn record(&self, regex: Option<&str>, captures: Vec<String>) {
        let mut last = self.last_match.borrow_mut();
        if let Some(regex) = regex {
            last.regex = Some(regex.to_string());
        }
        last.captures = Some(captures);
    }

    /// Scan the current rule set, recording the winning rule.
    fn match_detection_rules(&self, filter: impl Fn(RuleGroup) -> bool) -> bool {
        match self.database.table().first_match(self.ua(), filter) {
            Some(m) => {
                tracing::trace!(rule = %m.entry.key, "detection rule matched");
                self.record(Some(m.entry.pattern.as_str()), m.captures);
                true
            }
            None => {
                self.record(None, Vec::new());
                false
            }
        }
    }

    fn version_f64(&self, property: &str) -> f64 {
        self.version(property, VersionType::Float)
            .map(|v| v.as_f64())
            .unwrap_or(0.0)
    }
}

impl DetectionEngine for MobileDetect {
    type Catalog = RuleDatabase;

    fn catalog(&self) -> &RuleDatabase {
        &self.database
    }

    fn http_headers(&self) -> &HttpHeaders {
        &self.http_headers
    }

    fn http_header(&self, name: &str) -> Option<&str> {
        self.http_headers.get(name)
    }

    fn mobile_headers(&self) -> &IndexMap<String, MobileHeaderRule> {
        self.database.mobile_headers()
    }

    fn ua_http_headers(&self) -> &[String] {
        self.database.ua_http_headers()
    }

    fn set_cf_headers(&mut self, headers: Option<&HttpHeaders>) -> bool {
        let source = headers.unwrap_or(&self.http_headers);
        let captured: HttpHeaders = source
            .iter()
            .filter(|(k, _)| k.to_ascii_uppercase().starts_with(CLOUDFRONT_PREFIX))
            .map(|(k, v)| (k.to_ascii_uppercase(), v.to_string()))
            .collect();
        let found = !captured.is_empty();
        self.cf_headers = captured;
        found
    }

    fn cf_headers(&self) -> &HttpHeaders {
        &self.cf_headers
    }

    fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }

    fn set_detection_type(&self, detection_type: Option<DetectionType>) -> DetectionType {
        let detection_type = detection_type.unwrap_or_default();
        self.detection_type.set(detection_type);
        detection_type
    }

    fn matching_regex(&self) -> Option<String> {
        self.last_match.borrow().regex.clone()
    }

    fn matches_array(&self) -> Option<Vec<String>> {
        self.last_match.borrow().captures.clone()
    }

    fn mobile_detection_rules_extended(&self) -> &RuleMap {
        self.database.mobile_detection_rules_extended()
    }

    fn rules(&self) -> &RuleMap {
        match self.detection_type.get() {
            DetectionType::Mobile => self.database.mobile_detection_rules(),
            DetectionType::Extended => self.database.mobile_detection_rules_extended(),
        }
    }

    fn check_http_headers_for_mobile(&self) -> bool {
        for (name, rule) in self.database.mobile_headers() {
            let Some(value) = self.http_headers.get(name) else {
                continue;
            };
            return match &rule.matches {
                Some(needles) => needles.iter().any(|n| value.contains(n.as_str())),
                None => true,
            };
        }
        false
    }

    fn is_mobile(&self) -> bool {
        if self.cloudfront_viewer("HTTP_CLOUDFRONT_IS_MOBILE_VIEWER") {
            return true;
        }
        self.set_detection_type(Some(DetectionType::Mobile));
        self.check_http_headers_for_mobile()
            || self.match_detection_rules(RuleGroup::is_mobile_rule)
    }

    fn is_tablet(&self) -> bool {
        if self.cloudfront_viewer("HTTP_CLOUDFRONT_IS_TABLET_VIEWER") {
            return true;
        }
        self.set_detection_type(Some(DetectionType::Mobile));
        self.match_detection_rules(|g| g == RuleGroup::Tablet)
    }

    fn is(&self, key: &str) -> bool {
        self.set_detection_type(Some(DetectionType::Extended));
        let key = key.to_lowercase();
        if let Some(&hit) = self.cache.borrow().get(&key) {
            return hit;
        }

        let hit = match self.database.table().get(&key) {
            Some(entry) => match capture_all(&entry.regex, self.ua()) {
                Some(captures) => {
                    self.record(Some(entry.pattern.as_str()), captures);
                    true
                }
                None => {
                    self.record(None, Vec::new());
                    false
                }
            },
            None => false,
        };
        self.cache.borrow_mut().insert(key, hit);
        hit
    }

    fn match_regex(&self, regex: &str) -> Result<bool> {
        let compiled = compile_rule(regex)?;
        Ok(match capture_all(&compiled, self.ua()) {
            Some(captures) => {
                self.record(Some(regex), captures);
                true
            }
            None => {
                self.record(None, Vec::new());
                false
            }
        })
    }

    fn prepare_version_no(&self, ver: &str) -> f64 {
        prepare_version_no(ver)
    }

    fn version(&self, property: &str, version_type: VersionType) -> Option<Version> {
        let patterns = self.database.properties().get(property)?;
        let ua = self.ua();
        for pattern in patterns {
            let regex = match compile_rule(&pattern.replace("[VER]", VER)) {
                Ok(regex) => regex,
                Err(err) => {
                    tracing::warn!(property, pattern = %pattern, error = %err, "skipping invalid version pattern");
                    continue;
                }
            };
            let Ok(Some(caps)) = regex.captures(ua) else {
                continue;
            };
            if let Some(ver) = caps.get(1).map(|m| m.as_str()).filter(|v| !v.is_empty()) {
                return Some(match version_type {
                    VersionType::Text => Version::Text(ver.to_string()),
                    VersionType::Float => Version::Float(prepare_version_no(ver)),
                });
            }
        }
        None
    }

    fn mobile_grade(&self) -> Result<MobileGrade> {
        let is_mobile = self.is_mobile();
        let ios = self.is("iOS");
        let android_os = self.is("AndroidOS");
        let android = self.version_f64("Android");

        let grade_a = ios && self.version_f64("iPad") >= 4.3
            || ios && self.version_f64("iPhone") >= 4.3
            || ios && self.version_f64("iPod") >= 4.3
            || (android > 2.1 && self.is("Webkit"))
            || self.version_f64("Windows Phone OS") >= 7.5
            || self.is("BlackBerry") && self.version_f64("BlackBerry") >= 6.0
            || self.match_regex("Playbook.*Tablet")?
            || (self.version_f64("webOS") >= 4.0 && self.match_regex("Palm|Pre|Pixi")?)
            || self.match_regex("hp.*TouchPad")?
            || (self.is("Firefox") && self.version_f64("Firefox") >= 18.0)
            || (self.is("Chrome") && android_os && android >= 4.0)
            || (self.is("Skyfire")
                && self.version_f64("Skyfire") >= 4.1
                && android_os
                && android >= 2.3)
            || (self.is("Opera") && self.version_f64("Opera Mobi") >= 11.5 && android_os)
            || self.is("MeeGoOS")
            || self.is("Tizen")
            || self.is("Dolfin") && self.version_f64("Bada") >= 2.0
            || ((self.is("UC Browser") || self.is("Dolfin")) && android >= 2.3)
            || (self.match_regex("Kindle Fire")?
                || self.is("Kindle") && self.version_f64("Kindle") >= 3.0)
            || android_os && self.is("NookTablet")
            || self.version_f64("Chrome") >= 11.0 && !is_mobile
            || self.version_f64("Safari") >= 5.0 && !is_mobile
            || self.version_f64("Firefox") >= 4.0 && !is_mobile
            || self.version_f64("MSIE") >= 7.0 && !is_mobile
            || self.version_f64("Opera") >= 10.0 && !is_mobile;
        if grade_a {
            return Ok(MobileGrade::A);
        }

        let blackberry = self.version_f64("BlackBerry");
        let opera_mini = self.version_f64("Opera Mini");
        let grade_b = ios && self.version_f64("iPad") < 4.3
            || ios && self.version_f64("iPhone") < 4.3
            || ios && self.version_f64("iPod") < 4.3
            || self.is("Blackberry") && blackberry >= 5.0 && blackberry < 6.0
            || (opera_mini >= 5.0 && opera_mini <= 7.0 && (android >= 2.3 || ios))
            || self.match_regex("NokiaN8|NokiaC7|N97.*Series60|Symbian/3")?
            || self.version_f64("Opera Mobi") >= 11.0 && self.is("SymbianOS");
        if grade_b {
            return Ok(MobileGrade::B);
        }

        Ok(MobileGrade::C)
    }
}
