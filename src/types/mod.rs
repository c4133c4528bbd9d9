mod detection_context;
mod detection_type;
mod http_headers;

pub use detection_context::*;
pub use detection_type::*;
pub use http_headers::*;

/// Signature name → regex, in first-match-wins order.
pub type RuleMap = indexmap::IndexMap<String, String>;

/// Property name → version patterns containing a `[VER]` placeholder.
pub type PropertyMap = indexmap::IndexMap<String, Vec<String>>;
