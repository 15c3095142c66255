use gymlog::models::{Modality, Set};
use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum ParseError {
    #[error("Invalid set '{notation}': expected {expected}")]
    InvalidSet {
        notation: String,
        expected: &'static str,
    },

    #[error("Invalid time '{0}': use mm:ss, h:mm:ss or a number with min/s/h")]
    InvalidTime(String),

    #[error("Invalid exercise entry '{0}': expected <exercise>=<set>[,<set>...]")]
    InvalidEntry(String),

    #[error("Failed to compile set pattern: {0}")]
    Pattern(String),
}

const REPETITION_HINT: &str = "<reps> or <reps>x<weight> (e.g. 5x185)";
const ENDURANCE_HINT: &str = "<distance> in <time> (e.g. 5km in 25:30)";

/// Parses the compact set notation used on the command line
///
/// - `5x185`, `5 x 185lbs`: reps with weight
/// - `5`: reps without weight
/// - `5km in 25:30`, `5 in 30min`: distance covered in a time
///
/// Distance units are accepted but not converted.
pub struct SetParser {
    repetition: Regex,
    endurance: Regex,
    clock_time: Regex,
    unit_time: Regex,
}

impl SetParser {
    pub fn new() -> Result<Self, ParseError> {
        let compile =
            |pattern: &str| Regex::new(pattern).map_err(|e| ParseError::Pattern(e.to_string()));

        Ok(Self {
            repetition: compile(r"(?i)^(\d+)(?:\s*x\s*(\d+(?:\.\d+)?)\s*(?:lbs?|kg)?)?$")?,
            endurance: compile(r"(?i)^(\d+(?:\.\d+)?)\s*(?:km|mi|miles?|m)?\s+in\s+(.+)$")?,
            clock_time: compile(r"^(?:(\d+):)?(\d{1,2}):(\d{2})$")?,
            unit_time: compile(
                r"(?i)^(\d+(?:\.\d+)?)\s*(s|secs?|seconds?|min|mins|minutes?|h|hrs?|hours?)$",
            )?,
        })
    }

    /// Parse one set for an exercise of the given modality
    pub fn parse_set(&self, notation: &str, modality: Modality) -> Result<Set, ParseError> {
        let notation = notation.trim();
        match modality {
            Modality::Repetition => self.parse_repetition(notation),
            Modality::Endurance => self.parse_endurance(notation),
        }
    }

    /// Parse a comma separated list of sets
    pub fn parse_sets(&self, notation: &str, modality: Modality) -> Result<Vec<Set>, ParseError> {
        notation
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(|part| self.parse_set(part, modality))
            .collect()
    }

    fn parse_repetition(&self, notation: &str) -> Result<Set, ParseError> {
        let invalid = || ParseError::InvalidSet {
            notation: notation.to_string(),
            expected: REPETITION_HINT,
        };

        let caps = self.repetition.captures(notation).ok_or_else(invalid)?;
        let reps: u32 = caps[1].parse().map_err(|_| invalid())?;
        let weight = match caps.get(2) {
            Some(m) => Some(m.as_str().parse::<f64>().map_err(|_| invalid())?),
            None => None,
        };

        Ok(Set::repetition(reps, weight))
    }

    fn parse_endurance(&self, notation: &str) -> Result<Set, ParseError> {
        let invalid = || ParseError::InvalidSet {
            notation: notation.to_string(),
            expected: ENDURANCE_HINT,
        };

        let caps = self.endurance.captures(notation).ok_or_else(invalid)?;
        let distance: f64 = caps[1].parse().map_err(|_| invalid())?;
        let seconds = self.parse_time(caps[2].trim())?;

        Ok(Set::endurance(distance, seconds))
    }

    /// Duration in seconds
    pub fn parse_time(&self, text: &str) -> Result<f64, ParseError> {
        let invalid = || ParseError::InvalidTime(text.to_string());

        if let Some(caps) = self.clock_time.captures(text) {
            let hours: f64 = match caps.get(1) {
                Some(m) => m.as_str().parse().map_err(|_| invalid())?,
                None => 0.0,
            };
            let minutes: f64 = caps[2].parse().map_err(|_| invalid())?;
            let seconds: f64 = caps[3].parse().map_err(|_| invalid())?;
            if seconds >= 60.0 || (caps.get(1).is_some() && minutes >= 60.0) {
                return Err(invalid());
            }
            return Ok(hours * 3600.0 + minutes * 60.0 + seconds);
        }

        if let Some(caps) = self.unit_time.captures(text) {
            let value: f64 = caps[1].parse().map_err(|_| invalid())?;
            let unit = caps[2].to_lowercase();
            let factor = if unit.starts_with('s') {
                1.0
            } else if unit.starts_with('m') {
                60.0
            } else {
                3600.0
            };
            return Ok(value * factor);
        }

        Err(invalid())
    }
}

/// Split `Bench Press=5x185,5x185` into the exercise name and its set list
pub fn split_entry(entry: &str) -> Result<(&str, &str), ParseError> {
    match entry.split_once('=') {
        Some((name, sets)) if !name.trim().is_empty() => Ok((name.trim(), sets.trim())),
        _ => Err(ParseError::InvalidEntry(entry.to_string())),
    }
}
