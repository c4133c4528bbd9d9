//! Name-based calls into the classifier.
//!
//! Only the names listed in `Method` are callable. Anything else fails with
//! `Error::UnsupportedOperation`, so a caller holding a method name from
//! configuration or a template can never reach past the reviewed surface.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;

use crate::classifier::BrowserClassifier;
use crate::client_browser_data::ClientBrowserData;
use crate::engine::{DetectionEngine, EngineCatalog};
use crate::error::{Error, Result};
use crate::types::{DetectionType, HttpHeaders, VersionType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    // Engine instance methods.
    GetHttpHeaders,
    GetHttpHeader,
    GetMobileHeaders,
    GetUaHttpHeaders,
    SetCfHeaders,
    GetCfHeaders,
    GetUserAgent,
    SetDetectionType,
    GetMatchingRegex,
    GetMatchesArray,
    GetMobileDetectionRulesExtended,
    GetRules,
    CheckHttpHeadersForMobile,
    IsTablet,
    Match,
    PrepareVersionNo,
    Version,
    MobileGrade,
    // Rule database metadata.
    GetScriptVersion,
    GetPhoneDevices,
    GetTabletDevices,
    GetUserAgents,
    GetBrowsers,
    GetUtilities,
    GetMobileDetectionRules,
    GetOperatingSystems,
    GetProperties,
    // Classifier predicates.
    IsMobile,
    IsBot,
    IsAnyBot,
    Is,
}

impl Method {
    pub const ALL: [Method; 31] = [
        Self::GetHttpHeaders,
        Self::GetHttpHeader,
        Self::GetMobileHeaders,
        Self::GetUaHttpHeaders,
        Self::SetCfHeaders,
        Self::GetCfHeaders,
        Self::GetUserAgent,
        Self::SetDetectionType,
        Self::GetMatchingRegex,
        Self::GetMatchesArray,
        Self::GetMobileDetectionRulesExtended,
        Self::GetRules,
        Self::CheckHttpHeadersForMobile,
        Self::IsTablet,
        Self::Match,
        Self::PrepareVersionNo,
        Self::Version,
        Self::MobileGrade,
        Self::GetScriptVersion,
        Self::GetPhoneDevices,
        Self::GetTabletDevices,
        Self::GetUserAgents,
        Self::GetBrowsers,
        Self::GetUtilities,
        Self::GetMobileDetectionRules,
        Self::GetOperatingSystems,
        Self::GetProperties,
        Self::IsMobile,
        Self::IsBot,
        Self::IsAnyBot,
        Self::Is,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::GetHttpHeaders => "getHttpHeaders",
            Self::GetHttpHeader => "getHttpHeader",
            Self::GetMobileHeaders => "getMobileHeaders",
            Self::GetUaHttpHeaders => "getUaHttpHeaders",
            Self::SetCfHeaders => "setCfHeaders",
            Self::GetCfHeaders => "getCfHeaders",
            Self::GetUserAgent => "getUserAgent",
            Self::SetDetectionType => "setDetectionType",
            Self::GetMatchingRegex => "getMatchingRegex",
            Self::GetMatchesArray => "getMatchesArray",
            Self::GetMobileDetectionRulesExtended => "getMobileDetectionRulesExtended",
            Self::GetRules => "getRules",
            Self::CheckHttpHeadersForMobile => "checkHttpHeadersForMobile",
            Self::IsTablet => "isTablet",
            Self::Match => "match",
            Self::PrepareVersionNo => "prepareVersionNo",
            Self::Version => "version",
            Self::MobileGrade => "mobileGrade",
            Self::GetScriptVersion => "getScriptVersion",
            Self::GetPhoneDevices => "getPhoneDevices",
            Self::GetTabletDevices => "getTabletDevices",
            Self::GetUserAgents => "getUserAgents",
            Self::GetBrowsers => "getBrowsers",
            Self::GetUtilities => "getUtilities",
            Self::GetMobileDetectionRules => "getMobileDetectionRules",
            Self::GetOperatingSystems => "getOperatingSystems",
            Self::GetProperties => "getProperties",
            Self::IsMobile => "isMobile",
            Self::IsBot => "isBot",
            Self::IsAnyBot => "isAnyBot",
            Self::Is => "is",
        }
    }

    /// Positional arguments accepted. The engine is bound to one request,
    /// so no method takes a replacement user-agent or header set.
    pub fn max_args(self) -> usize {
        match self {
            Self::Version => 2,
            Self::GetHttpHeader
            | Self::SetCfHeaders
            | Self::SetDetectionType
            | Self::Match
            | Self::PrepareVersionNo
            | Self::Is => 1,
            _ => 0,
        }
    }

    /// Methods answered from the rule database alone, without a request.
    pub fn is_static(self) -> bool {
        matches!(
            self,
            Self::GetScriptVersion
                | Self::GetPhoneDevices
                | Self::GetTabletDevices
                | Self::GetUserAgents
                | Self::GetBrowsers
                | Self::GetUtilities
                | Self::GetMobileDetectionRules
                | Self::GetOperatingSystems
                | Self::GetProperties
        )
    }
}

impl FromStr for Method {
    type Err = Error;

    /// Exact, case-sensitive lookup.
    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|m| m.name() == s)
            .ok_or_else(|| Error::UnsupportedOperation {
                method: s.to_string(),
            })
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Positional arguments of one call.
struct Args<'a> {
    method: &'static str,
    values: &'a [Value],
}

impl<'a> Args<'a> {
    fn new(method: Method, values: &'a [Value]) -> Self {
        Self {
            method: method.name(),
            values,
        }
    }

    fn invalid(&self, reason: impl Into<String>) -> Error {
        Error::InvalidArgument {
            method: self.method,
            reason: reason.into(),
        }
    }

    fn at_most(&self, n: usize) -> Result<&Self> {
        if self.values.len() > n {
            return Err(self.invalid(format!(
                "expected at most {n} argument(s), got {}",
                self.values.len()
            )));
        }
        Ok(self)
    }

    /// Absent and `null` are both `None`.
    fn opt(&self, i: usize) -> Option<&'a Value> {
        self.values.get(i).filter(|v| !v.is_null())
    }

    fn opt_str(&self, i: usize) -> Result<Option<&'a str>> {
        match self.opt(i) {
            None => Ok(None),
            Some(Value::String(s)) => Ok(Some(s)),
            Some(other) => Err(self.invalid(format!("argument {} must be a string, got {other}", i + 1))),
        }
    }

    fn str(&self, i: usize) -> Result<&'a str> {
        self.opt_str(i)?
            .ok_or_else(|| self.invalid(format!("missing argument {}", i + 1)))
    }

    fn opt_headers(&self, i: usize) -> Result<Option<HttpHeaders>> {
        match self.opt(i) {
            None => Ok(None),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(k, v)| match v {
                    Value::String(s) => Ok((k.as_str(), s.clone())),
                    other => Err(self.invalid(format!("header {k} must be a string, got {other}"))),
                })
                .collect::<Result<HttpHeaders>>()
                .map(Some),
            Some(other) => Err(self.invalid(format!("argument {} must be an object, got {other}", i + 1))),
        }
    }
}

fn to_value<T: Serialize + ?Sized>(value: &T) -> Result<Value> {
    Ok(serde_json::to_value(value)?)
}

/// Answer a rule database method. `None` when `method` needs a request.
fn call_static<C: EngineCatalog>(catalog: &C, method: Method, args: &[Value]) -> Result<Option<Value>> {
    if !method.is_static() {
        return Ok(None);
    }
    Args::new(method, args).at_most(method.max_args())?;
    let value = match method {
        Method::GetScriptVersion => to_value(catalog.script_version())?,
        Method::GetPhoneDevices => to_value(catalog.phone_devices())?,
        Method::GetTabletDevices => to_value(catalog.tablet_devices())?,
        Method::GetUserAgents => to_value(catalog.user_agents())?,
        Method::GetBrowsers => to_value(catalog.browsers())?,
        Method::GetUtilities => to_value(catalog.utilities())?,
        Method::GetMobileDetectionRules => to_value(catalog.mobile_detection_rules())?,
        Method::GetOperatingSystems => to_value(catalog.operating_systems())?,
        Method::GetProperties => to_value(catalog.properties())?,
        _ => return Ok(None),
    };
    Ok(Some(value))
}

impl<E: DetectionEngine> BrowserClassifier<E> {
    /// Call an allow-listed method by name with JSON arguments.
    ///
    /// Absent results come back as `null`.
    pub fn invoke(&mut self, name: &str, args: &[Value]) -> Result<Value> {
        let method = name.parse::<Method>().inspect_err(|_| {
            tracing::debug!(method = name, "rejected call to unlisted method");
        })?;
        self.call(method, args)
    }

    pub fn call(&mut self, method: Method, args: &[Value]) -> Result<Value> {
        tracing::trace!(%method, args = args.len(), "dispatch");
        if let Some(value) = call_static(self.catalog(), method, args)? {
            return Ok(value);
        }

        let a = Args::new(method, args);
        a.at_most(method.max_args())?;
        match method {
            Method::GetHttpHeaders => to_value(self.http_headers()),
            Method::GetHttpHeader => to_value(&self.http_header(a.str(0)?)),
            Method::GetMobileHeaders => to_value(self.mobile_headers()),
            Method::GetUaHttpHeaders => to_value(self.ua_http_headers()),
            Method::SetCfHeaders => {
                let headers = a.opt_headers(0)?;
                to_value(&self.set_cf_headers(headers.as_ref()))
            }
            Method::GetCfHeaders => to_value(self.cf_headers()),
            Method::GetUserAgent => to_value(&self.user_agent()),
            Method::SetDetectionType => {
                // Unrecognised names fall back to mobile detection.
                let detection_type = a
                    .opt_str(0)?
                    .map(|s| DetectionType::from_str(s).unwrap_or_default());
                to_value(&self.set_detection_type(detection_type))
            }
            Method::GetMatchingRegex => to_value(&self.matching_regex()),
            Method::GetMatchesArray => to_value(&self.matches_array()),
            Method::GetMobileDetectionRulesExtended => {
                to_value(self.mobile_detection_rules_extended())
            }
            Method::GetRules => to_value(self.rules()),
            Method::CheckHttpHeadersForMobile => to_value(&self.check_http_headers_for_mobile()),
            Method::IsTablet => to_value(&self.is_tablet()),
            Method::Match => to_value(&self.match_regex(a.str(0)?)?),
            Method::PrepareVersionNo => to_value(&self.prepare_version_no(a.str(0)?)),
            Method::Version => {
                let property = a.str(0)?;
                let version_type = match a.opt_str(1)? {
                    None => VersionType::default(),
                    Some(s) => VersionType::from_str(s)
                        .ok_or_else(|| a.invalid(format!("unknown version type {s:?}")))?,
                };
                to_value(&self.version(property, version_type))
            }
            Method::MobileGrade => to_value(&self.mobile_grade()?),
            Method::IsMobile => to_value(&self.is_mobile()),
            Method::IsBot => to_value(&self.is_bot()),
            Method::IsAnyBot => to_value(&self.is_any_bot()),
            Method::Is => to_value(&self.is(a.str(0)?)),
            _ => Err(Error::UnsupportedOperation {
                method: method.name().to_string(),
            }),
        }
    }
}

impl ClientBrowserData {
    /// Call a rule database method by name, without a request.
    pub fn invoke_static(&self, name: &str, args: &[Value]) -> Result<Value> {
        let method: Method = name.parse()?;
        call_static(self.database().as_ref(), method, args)?.ok_or(Error::UnsupportedOperation {
            method: method.name().to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const IPHONE: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 5_1 like Mac OS X) AppleWebKit/534.46 (KHTML, like Gecko) Version/5.1 Mobile/9B179 Safari/7534.48.3";

    fn detector() -> ClientBrowserData {
        ClientBrowserData::new().unwrap()
    }

    #[test]
    fn every_method_rejects_one_argument_too_many() {
        let mut client = ClientBrowserData::new().unwrap().for_user_agent(IPHONE);
        for method in Method::ALL {
            let args = vec![json!("x"); method.max_args() + 1];
            assert!(
                matches!(client.call(method, &args), Err(Error::InvalidArgument { .. })),
                "{method}"
            );
        }
    }

    #[test]
    fn names_round_trip() {
        for method in Method::ALL {
            assert_eq!(method.name().parse::<Method>().unwrap(), method);
        }
        assert_eq!(Method::ALL.iter().filter(|m| m.is_static()).count(), 9);
    }

    #[test]
    fn unlisted_name_is_rejected() {
        let mut client = detector().for_user_agent(IPHONE);
        for name in ["deleteEverything", "GETUSERAGENT", "", "__construct", "getUserAgent "] {
            match client.invoke(name, &[]) {
                Err(Error::UnsupportedOperation { method }) => assert_eq!(method, name),
                other => panic!("{name:?}: unexpected {other:?}"),
            }
        }
        let err = client.invoke("deleteEverything", &[]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "call to undefined method ClientBrowserData::deleteEverything()"
        );
    }

    #[test]
    fn instance_methods() {
        let mut client = detector().for_user_agent(IPHONE);
        assert_eq!(client.invoke("getUserAgent", &[]).unwrap(), json!(IPHONE));
        assert_eq!(client.invoke("isTablet", &[]).unwrap(), json!(false));
        assert_eq!(client.invoke("isMobile", &[]).unwrap(), json!(true));
        assert_eq!(client.invoke("is", &[json!("iOS")]).unwrap(), json!(true));
        assert_eq!(client.invoke("is", &[json!("Bot")]).unwrap(), json!(false));
        assert_eq!(
            client.invoke("version", &[json!("iPhone")]).unwrap(),
            json!("5_1")
        );
        assert_eq!(
            client.invoke("version", &[json!("iPhone"), json!("float")]).unwrap(),
            json!(5.1)
        );
        assert_eq!(client.invoke("version", &[json!("Android")]).unwrap(), Value::Null);
        assert_eq!(client.invoke("prepareVersionNo", &[json!("5_1_1")]).unwrap(), json!(5.11));
        assert_eq!(client.invoke("mobileGrade", &[]).unwrap(), json!("A"));
        assert_eq!(client.invoke("match", &[json!("iphone os (\\d+)")]).unwrap(), json!(true));
        assert_eq!(
            client.invoke("getMatchesArray", &[]).unwrap(),
            json!(["iPhone OS 5", "5"])
        );
        assert_eq!(
            client.invoke("getHttpHeader", &[json!("User-Agent")]).unwrap(),
            Value::Null
        );
    }

    #[test]
    fn detection_type_and_rules() {
        let mut client = detector().for_user_agent(IPHONE);
        assert_eq!(
            client.invoke("setDetectionType", &[json!("extended")]).unwrap(),
            json!("extended")
        );
        let rules = client.invoke("getRules", &[]).unwrap();
        assert!(rules.get("Bot").is_some());
        assert_eq!(
            client.invoke("setDetectionType", &[json!("bogus")]).unwrap(),
            json!("mobile")
        );
        assert_eq!(client.invoke("setDetectionType", &[]).unwrap(), json!("mobile"));
        assert!(client.invoke("getRules", &[]).unwrap().get("Bot").is_none());
    }

    #[test]
    fn cf_headers_from_argument() {
        let mut client = detector().for_user_agent(IPHONE);
        let found = client
            .invoke(
                "setCfHeaders",
                &[json!({"HTTP_CLOUDFRONT_IS_MOBILE_VIEWER": "true", "HTTP_ACCEPT": "*/*"})],
            )
            .unwrap();
        assert_eq!(found, json!(true));
        assert_eq!(
            client.invoke("getCfHeaders", &[]).unwrap(),
            json!({"HTTP_CLOUDFRONT_IS_MOBILE_VIEWER": "true"})
        );
    }

    #[test]
    fn argument_errors() {
        let mut client = detector().for_user_agent(IPHONE);
        for (name, args) in [
            ("getHttpHeader", vec![]),
            ("getHttpHeader", vec![json!(1)]),
            ("match", vec![json!("a"), json!("b")]),
            ("version", vec![json!("iPhone"), json!("double")]),
            ("setCfHeaders", vec![json!("HTTP_CLOUDFRONT_X")]),
            ("setCfHeaders", vec![json!({"HTTP_CLOUDFRONT_X": 1})]),
            ("getScriptVersion", vec![json!(true)]),
            ("isTablet", vec![json!(IPHONE)]),
            ("getUserAgent", vec![json!(IPHONE)]),
            ("isBot", vec![json!("Googlebot/2.1")]),
            ("isMobile", vec![json!(IPHONE)]),
            ("isAnyBot", vec![json!(IPHONE)]),
            ("mobileGrade", vec![json!(IPHONE)]),
            ("getRules", vec![Value::Null]),
            ("getHttpHeaders", vec![json!({})]),
            ("checkHttpHeadersForMobile", vec![json!({})]),
            ("getMatchesArray", vec![json!(1)]),
            ("is", vec![json!("iOS"), json!(IPHONE)]),
            ("version", vec![json!("iPhone"), json!("text"), json!(IPHONE)]),
        ] {
            assert!(
                matches!(client.invoke(name, &args), Err(Error::InvalidArgument { .. })),
                "{name} {args:?}"
            );
        }
        assert!(matches!(
            client.invoke("match", &[json!("(unclosed")]),
            Err(Error::Regex(_))
        ));
    }

    #[test]
    fn static_methods() {
        let detector = detector();
        assert_eq!(detector.invoke_static("getScriptVersion", &[]).unwrap(), json!("2.8.41"));
        let browsers = detector.invoke_static("getBrowsers", &[]).unwrap();
        assert_eq!(detector.invoke_static("getUserAgents", &[]).unwrap(), browsers);
        assert!(detector.invoke_static("getPhoneDevices", &[]).unwrap().get("iPhone").is_some());
        assert!(matches!(
            detector.invoke_static("getUserAgent", &[]),
            Err(Error::UnsupportedOperation { .. })
        ));

        let mut client = detector.for_user_agent(IPHONE);
        assert_eq!(client.invoke("getScriptVersion", &[]).unwrap(), json!("2.8.41"));
        assert_eq!(
            client.invoke("getProperties", &[]).unwrap()["iPhone"],
            json!(["iPhone.*CPU[a-z ]+[VER]"])
        );
    }
}
