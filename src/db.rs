use indexmap::IndexMap;
use serde::Deserialize;

use crate::types::{MobileHeaderRule, PropertyMap, RuleMap};

// ---------------------------------------------------------------------------
// Metadata  (rules/meta.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct MetaFile {
    #[serde(default)]
    pub script_version: String,
    #[serde(default)]
    pub ua_http_headers: Vec<String>,
    #[serde(default)]
    pub mobile_headers: IndexMap<String, MobileHeaderRule>,
}

// ---------------------------------------------------------------------------
// Whole database
//
// A single-file database carries every section at the top level; the
// directory layout splits them into one file per section:
//
//   meta.yml               → script_version, ua_http_headers, mobile_headers
//   phone_devices.yml      → RuleMap
//   tablet_devices.yml     → RuleMap
//   operating_systems.yml  → RuleMap
//   browsers.yml           → RuleMap
//   utilities.yml          → RuleMap
//   properties.yml         → PropertyMap
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct RawDatabase {
    #[serde(flatten)]
    pub meta: MetaFile,
    #[serde(default)]
    pub phone_devices: RuleMap,
    #[serde(default)]
    pub tablet_devices: RuleMap,
    #[serde(default)]
    pub operating_systems: RuleMap,
    #[serde(default)]
    pub browsers: RuleMap,
    #[serde(default)]
    pub utilities: RuleMap,
    #[serde(default)]
    pub properties: PropertyMap,
}
