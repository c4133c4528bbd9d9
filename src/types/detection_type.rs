use serde::{Deserialize, Serialize};

/// Which rule tables a scan consults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectionType {
    /// Phones, tablets, operating systems and browsers.
    #[default]
    Mobile,
    /// Everything in `Mobile` plus the utility signatures (bots, TV, ...).
    Extended,
}

impl DetectionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "mobile" => Some(Self::Mobile),
            "extended" => Some(Self::Extended),
            _ => None,
        }
    }
}

/// Shape requested from `version()`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    #[default]
    Text,
    Float,
}

impl VersionType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "string" => Some(Self::Text),
            "float" => Some(Self::Float),
            _ => None,
        }
    }
}

/// A version number as captured from the user-agent, or parsed to a float.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Version {
    Text(String),
    Float(f64),
}

impl Version {
    pub fn as_f64(&self) -> f64 {
        match self {
            Self::Text(s) => crate::version::prepare_version_no(s),
            Self::Float(f) => *f,
        }
    }
}

/// Coarse capability grade of a mobile browser: `A` renders modern
/// layouts, `C` gets the basic experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum MobileGrade {
    A,
    B,
    C,
}

/// A header that marks a mobile client. With `matches` unset the header's
/// presence is enough; otherwise its value must contain one of the
/// substrings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileHeaderRule {
    #[serde(default)]
    pub matches: Option<Vec<String>>,
}
