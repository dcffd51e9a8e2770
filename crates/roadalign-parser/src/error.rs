use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to parse JSON: {0}")]
    Json(String),

    #[error("YAML mapping keys must be strings")]
    NonStringKey,

    #[error("unsupported YAML value (tags are not supported)")]
    UnsupportedYamlValue,

    #[error("YAML number could not be represented as f64")]
    YamlNumber,

    #[error("{context}: expected an object")]
    ExpectedMap { context: String },

    #[error("{context}: \"{key}\" must be a number")]
    ExpectedNumber { context: String, key: String },

    #[error("{context}: \"{key}\" must be a point [x, y]")]
    ExpectedPoint { context: String, key: String },

    #[error("{context}: \"{key}\" must be a string")]
    ExpectedString { context: String, key: String },

    #[error("{context}: \"{key}\" must be a boolean")]
    ExpectedBool { context: String, key: String },

    #[error("{context}: \"{key}\" must be a list")]
    ExpectedSeq { context: String, key: String },
}
