#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A dispatch name outside the reviewed instance and static method lists.
    #[error("call to undefined method ClientBrowserData::{method}()")]
    UnsupportedOperation { method: String },
    #[error("invalid argument for {method}(): {reason}")]
    InvalidArgument { method: &'static str, reason: String },
    #[error(transparent)]
    IO(#[from] std::io::Error),
    #[error(transparent)]
    YAML(#[from] serde_yaml::Error),
    #[error(transparent)]
    JSON(#[from] serde_json::Error),
    #[error(transparent)]
    Regex(#[from] fancy_regex::Error),
    #[error(transparent)]
    AhoCorasick(#[from] aho_corasick::BuildError),
}

pub type Result<T> = std::result::Result<T, Error>;
