//! The reviewed surface of a detection engine.
//!
//! `DetectionEngine` lists every per-request operation the classifier
//! forwards; `EngineCatalog` lists the static metadata of the rule database
//! behind it. Nothing outside these two traits is reachable through
//! `BrowserClassifier`.

use indexmap::IndexMap;

use crate::error::Result;
use crate::types::{
    DetectionType, HttpHeaders, MobileGrade, MobileHeaderRule, PropertyMap, RuleMap, Version,
    VersionType,
};

/// Class-level metadata of a rule database.
pub trait EngineCatalog {
    fn script_version(&self) -> &str;
    fn phone_devices(&self) -> &RuleMap;
    fn tablet_devices(&self) -> &RuleMap;
    /// Browser signatures, under their historical name.
    fn user_agents(&self) -> &RuleMap {
        self.browsers()
    }
    fn browsers(&self) -> &RuleMap;
    fn utilities(&self) -> &RuleMap;
    /// Phones, tablets, operating systems and browsers merged.
    fn mobile_detection_rules(&self) -> &RuleMap;
    fn operating_systems(&self) -> &RuleMap;
    fn properties(&self) -> &PropertyMap;
}

/// One engine instance bound to one request.
///
/// Match bookkeeping (`matching_regex`, `matches_array`, the detection type
/// and the `is` memo) is updated through `&self`; instances are meant to be
/// owned by a single request and are not `Sync`.
pub trait DetectionEngine {
    type Catalog: EngineCatalog;

    fn catalog(&self) -> &Self::Catalog;

    fn http_headers(&self) -> &HttpHeaders;
    fn http_header(&self, name: &str) -> Option<&str>;
    fn mobile_headers(&self) -> &IndexMap<String, MobileHeaderRule>;
    fn ua_http_headers(&self) -> &[String];

    /// Capture the `HTTP_CLOUDFRONT_*` headers from `headers`, or from the
    /// request's own headers when `None`. Returns whether any were found.
    fn set_cf_headers(&mut self, headers: Option<&HttpHeaders>) -> bool;
    fn cf_headers(&self) -> &HttpHeaders;

    fn user_agent(&self) -> Option<&str>;

    /// Set the detection type (`None` resets to `Mobile`) and return it.
    fn set_detection_type(&self, detection_type: Option<DetectionType>) -> DetectionType;
    fn matching_regex(&self) -> Option<String>;
    fn matches_array(&self) -> Option<Vec<String>>;

    fn mobile_detection_rules_extended(&self) -> &RuleMap;
    /// Rules of the current detection type.
    fn rules(&self) -> &RuleMap;

    fn check_http_headers_for_mobile(&self) -> bool;
    fn is_mobile(&self) -> bool;
    fn is_tablet(&self) -> bool;

    /// Evaluate one named signature. Unknown keys are `false`.
    fn is(&self, key: &str) -> bool;

    /// Match an arbitrary pattern against the user-agent.
    fn match_regex(&self, regex: &str) -> Result<bool>;

    fn prepare_version_no(&self, ver: &str) -> f64;
    fn version(&self, property: &str, version_type: VersionType) -> Option<Version>;
    fn mobile_grade(&self) -> Result<MobileGrade>;
}
