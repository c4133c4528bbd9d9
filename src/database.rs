use std::path::Path;

use indexmap::IndexMap;

use crate::db;
use crate::engine::EngineCatalog;
use crate::error::Result;
use crate::rules::{RuleGroup, RuleTable};
use crate::types::{MobileHeaderRule, PropertyMap, RuleMap};

const EMBEDDED_META: &str = include_str!("../rules/meta.yml");
const EMBEDDED_PHONES: &str = include_str!("../rules/phone_devices.yml");
const EMBEDDED_TABLETS: &str = include_str!("../rules/tablet_devices.yml");
const EMBEDDED_OSES: &str = include_str!("../rules/operating_systems.yml");
const EMBEDDED_BROWSERS: &str = include_str!("../rules/browsers.yml");
const EMBEDDED_UTILITIES: &str = include_str!("../rules/utilities.yml");
const EMBEDDED_PROPERTIES: &str = include_str!("../rules/properties.yml");

/// Compiled signature tables plus the static metadata of a rule database.
///
/// Built once and shared between requests behind an `Arc`; engine instances
/// borrow it read-only.
pub struct RuleDatabase {
    script_version: String,
    ua_http_headers: Vec<String>,
    mobile_headers: IndexMap<String, MobileHeaderRule>,
    phone_devices: RuleMap,
    tablet_devices: RuleMap,
    operating_systems: RuleMap,
    browsers: RuleMap,
    utilities: RuleMap,
    properties: PropertyMap,
    /// Phones, tablets, operating systems and browsers, merged in that order.
    mobile_rules: RuleMap,
    /// `mobile_rules` followed by the utilities.
    extended_rules: RuleMap,
    table: RuleTable,
}

impl RuleDatabase {
    /// The rule database bundled with the crate.
    pub fn embedded() -> Result<Self> {
        let meta: db::MetaFile = serde_yaml::from_str(EMBEDDED_META)?;
        Self::build(db::RawDatabase {
            meta,
            phone_devices: serde_yaml::from_str(EMBEDDED_PHONES)?,
            tablet_devices: serde_yaml::from_str(EMBEDDED_TABLETS)?,
            operating_systems: serde_yaml::from_str(EMBEDDED_OSES)?,
            browsers: serde_yaml::from_str(EMBEDDED_BROWSERS)?,
            utilities: serde_yaml::from_str(EMBEDDED_UTILITIES)?,
            properties: serde_yaml::from_str(EMBEDDED_PROPERTIES)?,
        })
    }

    /// Load a database split into one YAML file per section (the layout of
    /// the crate's `rules/` directory).
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref();
        Self::build(db::RawDatabase {
            meta: load_yaml(&dir.join("meta.yml"))?,
            phone_devices: load_yaml(&dir.join("phone_devices.yml"))?,
            tablet_devices: load_yaml(&dir.join("tablet_devices.yml"))?,
            operating_systems: load_yaml(&dir.join("operating_systems.yml"))?,
            browsers: load_yaml(&dir.join("browsers.yml"))?,
            utilities: load_yaml(&dir.join("utilities.yml"))?,
            properties: load_yaml(&dir.join("properties.yml"))?,
        })
    }

    /// Load a single-file database with every section at the top level.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        Self::build(load_yaml(path.as_ref())?)
    }

    /// Parse a single-document database.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        Self::build(serde_yaml::from_str(yaml)?)
    }

    fn build(raw: db::RawDatabase) -> Result<Self> {
        let sections: [(&RuleMap, RuleGroup); 5] = [
            (&raw.phone_devices, RuleGroup::Phone),
            (&raw.tablet_devices, RuleGroup::Tablet),
            (&raw.operating_systems, RuleGroup::OperatingSystem),
            (&raw.browsers, RuleGroup::Browser),
            (&raw.utilities, RuleGroup::Utility),
        ];

        let mut mobile_rules = RuleMap::new();
        let mut extended_rules = RuleMap::new();
        let mut items: Vec<(String, RuleGroup, String)> = Vec::new();
        for (map, group) in sections {
            for (key, pattern) in map {
                if group.is_mobile_rule() {
                    mobile_rules.insert(key.clone(), pattern.clone());
                }
                extended_rules.insert(key.clone(), pattern.clone());
                items.push((key.clone(), group, pattern.clone()));
            }
        }

        let table = RuleTable::build(items)?;

        tracing::debug!(
            version = %raw.meta.script_version,
            phones = raw.phone_devices.len(),
            tablets = raw.tablet_devices.len(),
            oses = raw.operating_systems.len(),
            browsers = raw.browsers.len(),
            utilities = raw.utilities.len(),
            properties = raw.properties.len(),
            "rule database loaded"
        );

        Ok(Self {
            script_version: raw.meta.script_version,
            ua_http_headers: raw.meta.ua_http_headers,
            mobile_headers: raw.meta.mobile_headers,
            phone_devices: raw.phone_devices,
            tablet_devices: raw.tablet_devices,
            operating_systems: raw.operating_systems,
            browsers: raw.browsers,
            utilities: raw.utilities,
            properties: raw.properties,
            mobile_rules,
            extended_rules,
            table,
        })
    }

    pub fn ua_http_headers(&self) -> &[String] {
        &self.ua_http_headers
    }

    pub fn mobile_headers(&self) -> &IndexMap<String, MobileHeaderRule> {
        &self.mobile_headers
    }

    pub fn mobile_detection_rules_extended(&self) -> &RuleMap {
        &self.extended_rules
    }

    pub(crate) fn table(&self) -> &RuleTable {
        &self.table
    }
}

impl EngineCatalog for RuleDatabase {
    fn script_version(&self) -> &str {
        &self.script_version
    }

    fn phone_devices(&self) -> &RuleMap {
        &self.phone_devices
    }

    fn tablet_devices(&self) -> &RuleMap {
        &self.tablet_devices
    }

    fn browsers(&self) -> &RuleMap {
        &self.browsers
    }

    fn utilities(&self) -> &RuleMap {
        &self.utilities
    }

    fn mobile_detection_rules(&self) -> &RuleMap {
        &self.mobile_rules
    }

    fn operating_systems(&self) -> &RuleMap {
        &self.operating_systems
    }

    fn properties(&self) -> &PropertyMap {
        &self.properties
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load_yaml<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)?;
    Ok(serde_yaml::from_str(&content)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embedded_database_compiles() {
        let db = RuleDatabase::embedded().unwrap();
        assert_eq!(db.script_version(), "2.8.41");
        assert!(db.phone_devices().contains_key("iPhone"));
        assert!(db.tablet_devices().contains_key("iPad"));
        assert!(db.utilities().contains_key("MobileBot"));
        assert_eq!(db.user_agents(), db.browsers());
        assert_eq!(db.ua_http_headers()[0], "HTTP_USER_AGENT");
    }

    #[test]
    fn rule_sets_nest() {
        let db = RuleDatabase::embedded().unwrap();
        let mobile = db.mobile_detection_rules();
        let extended = db.mobile_detection_rules_extended();
        assert!(!mobile.contains_key("Bot"));
        assert!(extended.contains_key("Bot"));
        assert_eq!(extended.len(), mobile.len() + db.utilities().len());
        assert!(mobile.keys().zip(extended.keys()).all(|(a, b)| a == b));
    }

    #[test]
    fn embedded_matches_directory_layout() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("rules");
        let from_dir = RuleDatabase::from_dir(&dir).unwrap();
        let embedded = RuleDatabase::embedded().unwrap();
        assert_eq!(
            from_dir.mobile_detection_rules_extended(),
            embedded.mobile_detection_rules_extended()
        );
        assert_eq!(from_dir.properties(), embedded.properties());
    }

    #[test]
    fn single_file_sections_are_optional() {
        let db = RuleDatabase::from_yaml_str(
            r#"
script_version: "test"
utilities:
  Bot: 'Googlebot'
"#,
        )
        .unwrap();
        assert_eq!(db.script_version(), "test");
        assert!(db.phone_devices().is_empty());
        assert!(db.mobile_detection_rules().is_empty());
        assert_eq!(db.mobile_detection_rules_extended().len(), 1);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let err = RuleDatabase::from_yaml_str("browsers:\n  Broken: '(unclosed'\n");
        assert!(matches!(err, Err(crate::Error::Regex(_))));
    }
}
