use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// Difficulty tier of a generated equation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Card title on the home screen
    pub fn label(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Sprout tier",
            Difficulty::Medium => "Tree tier",
            Difficulty::Hard => "Mountain tier",
        }
    }

    pub fn subtitle(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Basic term moving",
            Difficulty::Medium => "Parentheses and compound expressions",
            Difficulty::Hard => "Fractions and decimals",
        }
    }

    /// Equation shape the model is asked to produce for this tier
    pub fn shape_hint(&self) -> &'static str {
        match self {
            Difficulty::Easy => "x + a = b form (isolate a single linear term)",
            Difficulty::Medium => "ax + b = cx + d form, or an equation with parentheses",
            Difficulty::Hard => "a more complex form with fractional or decimal coefficients",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown difficulty '{0}' (expected easy, medium or hard)")]
pub struct UnknownDifficulty(pub String);

impl FromStr for Difficulty {
    type Err = UnknownDifficulty;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(UnknownDifficulty(s.to_string())),
        }
    }
}

// The model echoes the tier back as free text, so accept any casing
// but nothing outside the three tiers.
impl<'de> Deserialize<'de> for Difficulty {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct DifficultyVisitor;

        impl<'de> Visitor<'de> for DifficultyVisitor {
            type Value = Difficulty;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("one of \"easy\", \"medium\", \"hard\"")
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                value
                    .parse::<Difficulty>()
                    .map_err(|_| E::invalid_value(de::Unexpected::Str(value), &self))
            }
        }

        deserializer.deserialize_str(DifficultyVisitor)
    }
}

/// A generated practice problem, passed through from the model as-is.
/// `final_answer` is not checked against `equation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Problem {
    pub id: String,
    pub equation: String,
    pub steps: Vec<String>,
    pub final_answer: f64,
    pub difficulty: Difficulty,
    pub explanation: String,
}

impl Problem {
    /// Final answer as the student would type it (`5` rather than `5.0`)
    pub fn final_answer_display(&self) -> String {
        format_number(self.final_answer)
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{}", value)
    }
}
