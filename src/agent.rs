use std::fmt;

/// Backend handler that produced part of a response.
///
/// Only these identifiers are recognized on the wire; anything else is
/// filtered out during aggregation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Agent {
    Nutrition,
    Medical,
    Community,
    Quiz,
    General,
    Router,
}

impl Agent {
    /// Parses a wire identifier, returning `None` for unrecognized names.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "nutrition" => Some(Self::Nutrition),
            "medical" => Some(Self::Medical),
            "community" => Some(Self::Community),
            "quiz" => Some(Self::Quiz),
            "general" => Some(Self::General),
            "router" => Some(Self::Router),
            _ => None,
        }
    }

    /// Returns the wire identifier for this agent.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nutrition => "nutrition",
            Self::Medical => "medical",
            Self::Community => "community",
            Self::Quiz => "quiz",
            Self::General => "general",
            Self::Router => "router",
        }
    }

    /// Fixed many-to-one agent-to-intent mapping.
    ///
    /// `router` and `general` fall back to chit-chat.
    pub fn intent(&self) -> Intent {
        match self {
            Self::Nutrition => Intent::DietInfo,
            Self::Medical => Intent::MedicalInfo,
            Self::Community => Intent::Community,
            Self::Quiz => Intent::Quiz,
            Self::General | Self::Router => Intent::ChitChat,
        }
    }
}

impl fmt::Display for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse query category derived from which agents handled it.
///
/// Used by the UI for disclaimer decisions; serialized in the
/// screaming-snake style the frontend expects.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Intent {
    DietInfo,
    MedicalInfo,
    Community,
    Quiz,
    ChitChat,
    Emergency,
}

impl Intent {
    /// Returns the serialized intent name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DietInfo => "DIET_INFO",
            Self::MedicalInfo => "MEDICAL_INFO",
            Self::Community => "COMMUNITY",
            Self::Quiz => "QUIZ",
            Self::ChitChat => "CHIT_CHAT",
            Self::Emergency => "EMERGENCY",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
