//! Weather mood suggestions.

use tracing::{debug, info};

use super::existing;
use crate::error::{Error, Result};
use crate::models::{new_id, WeatherMood, WeatherMoodDraft};
use crate::storage::Storage;

const WHAT: &str = "weather mood";

/// Condition used when nothing more specific matches.
pub const DEFAULT_CONDITION: &str = "default";

/// All suggestions.
///
/// # Errors
///
/// Returns an error if storage fails.
pub fn list(storage: &Storage) -> Result<Vec<WeatherMood>> {
    storage.list::<WeatherMood>()
}

/// Suggestion by id.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such suggestion.
pub fn get(storage: &Storage, id: &str) -> Result<WeatherMood> {
    existing(storage, id, WHAT)
}

fn exact(storage: &Storage, weather: &str) -> Result<Option<WeatherMood>> {
    storage.find_one_by_field::<WeatherMood>(None, "weather", &weather)
}

/// Resolve a weather condition name to a suggestion.
///
/// Tries the name without a `_day`/`_night` suffix, then with underscores as
/// spaces, then the `default` entry.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if none of those exist.
pub fn for_weather(storage: &Storage, weather: &str) -> Result<WeatherMood> {
    let base = weather
        .strip_suffix("_day")
        .or_else(|| weather.strip_suffix("_night"))
        .unwrap_or(weather);
    let spaced = base.replace('_', " ");

    for candidate in [base, spaced.as_str(), DEFAULT_CONDITION] {
        if let Some(mood) = exact(storage, candidate)? {
            debug!(weather, matched = candidate, "resolved weather mood");
            return Ok(mood);
        }
    }
    Err(Error::not_found(WHAT, weather))
}

/// Store a suggestion.
///
/// # Errors
///
/// Returns a validation error for bad input or a storage error.
pub fn create(storage: &Storage, draft: WeatherMoodDraft) -> Result<WeatherMood> {
    draft.validate()?;
    let mood = WeatherMood {
        id: new_id(),
        weather: draft.weather,
        mood: draft.mood,
        activities: draft.activities,
    };
    storage.save(&mood)?;
    info!(weather = %mood.weather, "weather mood created");
    Ok(mood)
}

/// Replace a suggestion.
///
/// # Errors
///
/// Returns a validation error, [`Error::NotFound`], or a storage error.
pub fn update(storage: &Storage, id: &str, draft: WeatherMoodDraft) -> Result<WeatherMood> {
    draft.validate()?;
    let mut mood = get(storage, id)?;
    mood.weather = draft.weather;
    mood.mood = draft.mood;
    mood.activities = draft.activities;
    storage.save(&mood)?;
    debug!(weather_mood_id = %id, "weather mood updated");
    Ok(mood)
}

/// Delete a suggestion.
///
/// # Errors
///
/// Returns [`Error::NotFound`] if there is no such suggestion.
pub fn delete(storage: &Storage, id: &str) -> Result<()> {
    if !storage.delete::<WeatherMood>(id)? {
        return Err(Error::not_found(WHAT, id));
    }
    info!(weather_mood_id = %id, "weather mood deleted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(storage: &Storage, weather: &str, mood: &str) -> WeatherMood {
        create(
            storage,
            WeatherMoodDraft {
                weather: weather.to_string(),
                mood: mood.to_string(),
                activities: vec!["Take a walk".to_string()],
            },
        )
        .unwrap()
    }

    #[test]
    fn test_resolution_order() {
        let storage = Storage::open_in_memory().unwrap();
        add(&storage, "clear", "energized");
        add(&storage, "scattered clouds", "thoughtful");

        assert_eq!(for_weather(&storage, "clear_day").unwrap().mood, "energized");
        assert_eq!(for_weather(&storage, "clear_night").unwrap().mood, "energized");
        assert_eq!(
            for_weather(&storage, "scattered_clouds_day").unwrap().mood,
            "thoughtful"
        );
        assert!(for_weather(&storage, "snow").unwrap_err().is_not_found());

        add(&storage, DEFAULT_CONDITION, "balanced");
        assert_eq!(for_weather(&storage, "snow").unwrap().mood, "balanced");
    }

    #[test]
    fn test_update_and_delete() {
        let storage = Storage::open_in_memory().unwrap();
        let mood = add(&storage, "rain", "cozy");
        let draft = WeatherMoodDraft {
            weather: "rain".to_string(),
            mood: "reflective".to_string(),
            activities: vec![],
        };
        assert_eq!(update(&storage, &mood.id, draft).unwrap().mood, "reflective");
        delete(&storage, &mood.id).unwrap();
        assert!(list(&storage).unwrap().is_empty());
    }
}
