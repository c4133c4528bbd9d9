use super::HttpHeaders;

/// Per-request input to the engine: the request headers plus the
/// `User-Agent` value the host read from the request, if any.
///
/// Built once per request and never mutated; an engine instance owns its
/// context for the lifetime of that request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetectionContext {
    headers: HttpHeaders,
    user_agent: Option<String>,
}

impl DetectionContext {
    pub fn new(headers: HttpHeaders, user_agent: Option<String>) -> Self {
        Self {
            headers,
            user_agent,
        }
    }

    /// Context for a bare user-agent string with no other headers.
    pub fn from_user_agent(user_agent: impl Into<String>) -> Self {
        Self::new(HttpHeaders::new(), Some(user_agent.into()))
    }

    /// Context taking the user-agent from the `User-Agent` header itself,
    /// the way a request handler reads it.
    pub fn from_request_headers(headers: HttpHeaders) -> Self {
        let user_agent = headers.get("User-Agent").map(str::to_owned);
        Self::new(headers, user_agent)
    }

    pub fn headers(&self) -> &HttpHeaders {
        &self.headers
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.user_agent.as_deref()
    }
}
