use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Content returned by a language model call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOutput<T = String> {
    /// Generated text or structured value
    pub content: T,
    /// Wall-clock duration of the call
    #[serde(with = "duration_secs")]
    pub duration: Duration,
}

impl<T> GenerationOutput<T> {
    pub fn new(content: T, duration: Duration) -> Self {
        Self { content, duration }
    }

    pub fn into_content(self) -> T {
        self.content
    }
}

impl GenerationOutput<String> {
    /// Count lines in generated text
    pub fn lines(&self) -> usize {
        self.content.lines().count()
    }
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Ok(Duration::from_secs_f64(secs))
    }
}
