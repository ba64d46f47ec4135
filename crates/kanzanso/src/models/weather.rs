//! Activity suggestions per weather condition.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::storage::Document;
use crate::validate;

/// The mood a weather condition tends to bring and what to do about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherMood {
    /// Unique id.
    pub id: String,
    /// Condition name, e.g. `clear sky` or `default`.
    pub weather: String,
    /// Mood this weather tends to bring.
    pub mood: String,
    /// Suggested activities.
    pub activities: Vec<String>,
}

impl Document for WeatherMood {
    const COLLECTION: &'static str = "weather_moods";

    fn id(&self) -> &str {
        &self.id
    }
}

/// Payload for creating or replacing a [`WeatherMood`].
#[derive(Debug, Clone, Deserialize)]
pub struct WeatherMoodDraft {
    /// Condition name.
    pub weather: String,
    /// Mood this weather tends to bring.
    pub mood: String,
    /// Suggested activities.
    #[serde(default)]
    pub activities: Vec<String>,
}

impl WeatherMoodDraft {
    /// Check field constraints.
    ///
    /// # Errors
    ///
    /// Returns a validation error for the first offending field.
    pub fn validate(&self) -> Result<()> {
        validate::required("weather", &self.weather, 50)?;
        validate::required("mood", &self.mood, 50)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_validation() {
        let draft = WeatherMoodDraft {
            weather: "rain".to_string(),
            mood: "cozy".to_string(),
            activities: vec!["Read a book".to_string()],
        };
        assert!(draft.validate().is_ok());

        let missing = WeatherMoodDraft {
            weather: String::new(),
            ..draft
        };
        assert!(missing.validate().is_err());
    }
}
