use serde::{Deserialize, Serialize};

use super::overrides::ScenarioOverride;
use crate::config::RoutingConfig;
use crate::workflows::routing::domain::DepartmentId;

/// Scoring constants and thresholds for department routing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifierConfig {
    /// Points for the first occurrence of a regular keyword.
    pub keyword_points: f64,
    /// Points for each repeated occurrence of the same keyword.
    pub repeat_points: f64,
    pub max_repeat_bonuses: usize,
    pub priority_keyword_points: f64,
    pub high_urgency_multiplier: f64,
    /// Raw score treated as a fully confident match.
    pub confidence_reference_score: f64,
    pub max_primary_confidence: u8,
    /// Minimum confidence (percent) for automatic assignment.
    pub acceptance_threshold: u8,
    /// Share of the top score (percent) a runner-up needs to be listed as related.
    pub related_score_percent: u8,
    pub max_related_confidence: u8,
    pub max_related_departments: usize,
    #[serde(default)]
    pub overrides: Vec<ScenarioOverride>,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            keyword_points: 10.0,
            repeat_points: 5.0,
            max_repeat_bonuses: 3,
            priority_keyword_points: 40.0,
            high_urgency_multiplier: 1.2,
            confidence_reference_score: 60.0,
            max_primary_confidence: 99,
            acceptance_threshold: 50,
            related_score_percent: 40,
            max_related_confidence: 90,
            max_related_departments: 3,
            overrides: Vec::new(),
        }
    }
}

impl ClassifierConfig {
    /// Default scoring with the overrides wired to the configured department ids.
    pub fn from_routing(routing: &RoutingConfig) -> Self {
        let fallen_tree = ScenarioOverride::fallen_tree(
            routing.fallen_tree_parks_id.clone().map(DepartmentId),
            routing.fallen_tree_transport_id.clone().map(DepartmentId),
        );

        Self {
            overrides: fallen_tree.into_iter().collect(),
            ..Self::default()
        }
    }

    pub(crate) fn confidence(&self, score: f64, cap: u8) -> u8 {
        let percent = (score / self.confidence_reference_score * 100.0).round();
        percent.clamp(0.0, f64::from(cap)) as u8
    }
}
