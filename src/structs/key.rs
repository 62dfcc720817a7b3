use serde_derive::{Deserialize, Serialize};
use std::fmt;

/// Identifier joining measured, simulated and covariance entries of one observable
///
/// The key is an ordered tuple of tags, conventionally
/// `(name, frequency, resolution, extra)`, e.g. `("sync", "23", "32", "I")`.
/// Tags are opaque: two keys are equal only if every tag matches exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObservableKey {
    tags: Vec<String>,
}

impl ObservableKey {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        ObservableKey {
            tags: tags.into_iter().map(Into::into).collect(),
        }
    }

    /// The conventional four-tag key
    pub fn quad(name: &str, frequency: &str, resolution: &str, extra: &str) -> Self {
        ObservableKey::new([name, frequency, resolution, extra])
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    /// First tag, if any
    pub fn name(&self) -> Option<&str> {
        self.tags.first().map(|s| s.as_str())
    }
}

impl fmt::Display for ObservableKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({})", self.tags.join(", "))
    }
}

impl From<(&str, &str, &str, &str)> for ObservableKey {
    fn from(t: (&str, &str, &str, &str)) -> Self {
        ObservableKey::quad(t.0, t.1, t.2, t.3)
    }
}

impl From<&str> for ObservableKey {
    fn from(name: &str) -> Self {
        ObservableKey::new([name])
    }
}
