use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};

/// Normalise a header name to its CGI server-variable form:
/// `User-Agent` → `HTTP_USER_AGENT`. Names already carrying the `HTTP_`
/// prefix are only upper-cased.
pub fn normalize_header_name(name: &str) -> String {
    let upper = name.trim().replace('-', "_").to_ascii_uppercase();
    if upper.starts_with("HTTP_") {
        upper
    } else {
        format!("HTTP_{upper}")
    }
}

/// Request headers keyed by their `HTTP_*` server-variable names, in
/// insertion order. Names are normalised on every way in, deserialization
/// included.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct HttpHeaders(IndexMap<String, String>);

impl HttpHeaders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep only the `HTTP_*` entries of a server-variable style map
    /// (`HTTP_USER_AGENT`, `HTTP_ACCEPT`, ...). Other variables such as
    /// `REMOTE_ADDR` are dropped.
    pub fn from_server_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        vars.into_iter()
            .map(|(k, v)| (k.into(), v))
            .filter(|(k, _)| k.starts_with("HTTP_"))
            .collect()
    }

    /// Insert a header, normalising its name. A repeated name replaces the
    /// earlier value.
    pub fn insert(&mut self, name: &str, value: impl Into<String>) {
        self.0.insert(normalize_header_name(name), value.into());
    }

    /// Look a header up by wire name (`Accept`) or server-variable name
    /// (`HTTP_ACCEPT`).
    pub fn get(&self, name: &str) -> Option<&str> {
        if let Some(v) = self.0.get(name) {
            return Some(v.as_str());
        }
        self.0.get(&normalize_header_name(name)).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for HttpHeaders
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut headers = Self::new();
        for (k, v) in iter {
            headers.insert(k.as_ref(), v);
        }
        headers
    }
}

impl<'de> Deserialize<'de> for HttpHeaders {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = IndexMap::<String, String>::deserialize(deserializer)?;
        Ok(raw.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_are_normalised() {
        assert_eq!(normalize_header_name("User-Agent"), "HTTP_USER_AGENT");
        assert_eq!(normalize_header_name("x-wap-profile"), "HTTP_X_WAP_PROFILE");
        assert_eq!(normalize_header_name("HTTP_ACCEPT"), "HTTP_ACCEPT");
        assert_eq!(normalize_header_name("http_ua_cpu"), "HTTP_UA_CPU");
    }

    #[test]
    fn lookup_accepts_both_forms() {
        let headers: HttpHeaders = [("Accept", "text/html")].into_iter().collect();
        assert_eq!(headers.get("accept"), Some("text/html"));
        assert_eq!(headers.get("HTTP_ACCEPT"), Some("text/html"));
        assert_eq!(headers.get("Accept-Language"), None);
    }

    #[test]
    fn server_vars_keep_only_http_entries() {
        let headers = HttpHeaders::from_server_vars([
            ("HTTP_USER_AGENT", "curl/8.0"),
            ("REMOTE_ADDR", "127.0.0.1"),
            ("REQUEST_METHOD", "GET"),
        ]);
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get("User-Agent"), Some("curl/8.0"));
    }

    #[test]
    fn deserialized_names_are_normalised() {
        let headers: HttpHeaders =
            serde_yaml::from_str("User-Agent: curl/8.0\nHTTP_ACCEPT: '*/*'\nx-wap-profile: p\n").unwrap();
        let names: Vec<&str> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["HTTP_USER_AGENT", "HTTP_ACCEPT", "HTTP_X_WAP_PROFILE"]);
        assert_eq!(headers, [("user-agent", "curl/8.0"), ("Accept", "*/*"), ("X-Wap-Profile", "p")].into_iter().collect());
    }
}
