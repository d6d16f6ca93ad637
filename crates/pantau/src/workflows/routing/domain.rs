use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Stable identifier of a government department row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DepartmentId(pub String);

impl DepartmentId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DepartmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Routing configuration for one department, loaded verbatim from the catalog store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepartmentProfile {
    pub id: DepartmentId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub category: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: Vec<String>,
    #[serde(
        default,
        alias = "priorityKeywords",
        deserialize_with = "null_as_empty"
    )]
    pub priority_keywords: Vec<String>,
    #[serde(default = "default_weight")]
    pub weight: f64,
}

impl DepartmentProfile {
    /// Weight used for scoring. Rows with a missing or nonsensical weight score at face value.
    pub fn effective_weight(&self) -> f64 {
        if self.weight.is_finite() && self.weight > 0.0 {
            self.weight
        } else {
            1.0
        }
    }
}

fn default_weight() -> f64 {
    1.0
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<Vec<String>>::deserialize(deserializer)?;
    Ok(opt.unwrap_or_default())
}

/// Reporter-declared urgency. Only `tinggi` ("high") changes scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    High,
    #[default]
    Normal,
}

impl Urgency {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "tinggi" | "high" => Self::High,
            _ => Self::Normal,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "tinggi",
            Self::Normal => "normal",
        }
    }
}

impl<'de> Deserialize<'de> for Urgency {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map(Urgency::parse).unwrap_or_default())
    }
}

/// Report payload as received from the submission form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSubmission {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub urgency: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
}

/// Validated report text presented to the classifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportInput {
    pub title: String,
    pub description: String,
    pub category: String,
    #[serde(default)]
    pub urgency: Urgency,
    #[serde(default)]
    pub location: Option<String>,
}

impl ReportInput {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            category: category.into(),
            urgency: Urgency::Normal,
            location: None,
        }
    }

    pub fn with_urgency(mut self, urgency: Urgency) -> Self {
        self.urgency = urgency;
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Lower-cased haystack the keyword rules search in.
    pub fn normalized_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.category).to_lowercase()
    }
}

impl From<ReportSubmission> for ReportInput {
    fn from(submission: ReportSubmission) -> Self {
        let ReportSubmission {
            title,
            description,
            category,
            urgency,
            location,
        } = submission;

        Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            category: category.trim().to_string(),
            urgency: urgency.as_deref().map(Urgency::parse).unwrap_or_default(),
            location: location
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),
        }
    }
}
