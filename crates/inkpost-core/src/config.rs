use serde::de::DeserializeOwned;

/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize`; field `foo_bar` is read from
/// `FOO_BAR`. Use `#[serde(default = "...")]` for optional settings.
pub trait Config: Sized + DeserializeOwned {
    /// Load from the process environment.
    ///
    /// # Panics
    ///
    /// Panics if any required env var is missing or cannot be deserialized.
    fn from_env() -> Self {
        match envy::from_env() {
            Ok(config) => config,
            Err(e) => panic!("failed to load config from environment: {e}"),
        }
    }

    /// Load from an explicit list of `(KEY, value)` pairs.
    fn from_pairs<I>(pairs: I) -> Result<Self, envy::Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        envy::from_iter(pairs)
    }
}
