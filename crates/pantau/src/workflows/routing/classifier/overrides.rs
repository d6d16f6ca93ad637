use serde::{Deserialize, Serialize};

use super::policy::{ClassificationOutcome, Decision, DepartmentAssignment};
use crate::workflows::routing::domain::{DepartmentId, DepartmentProfile};

/// Compound incident that keyword scoring under-detects. When the report text
/// matches, the listed departments are attached at fixed confidences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScenarioOverride {
    pub label: String,
    /// Every term must appear in the report text.
    pub all_of: Vec<String>,
    /// At least one term must appear, unless the list is empty.
    pub any_of: Vec<String>,
    pub assignments: Vec<OverrideAssignment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideAssignment {
    pub department_id: DepartmentId,
    pub confidence: u8,
}

impl ScenarioOverride {
    pub const FALLEN_TREE_PARKS_CONFIDENCE: u8 = 80;
    pub const FALLEN_TREE_TRANSPORT_CONFIDENCE: u8 = 75;

    /// Fallen tree ("pohon tumbang"/"pohon roboh"): needs removal by parks and
    /// traffic control by transportation. `None` when neither id is configured.
    pub fn fallen_tree(
        parks: Option<DepartmentId>,
        transport: Option<DepartmentId>,
    ) -> Option<Self> {
        let assignments: Vec<OverrideAssignment> = [
            parks.map(|department_id| OverrideAssignment {
                department_id,
                confidence: Self::FALLEN_TREE_PARKS_CONFIDENCE,
            }),
            transport.map(|department_id| OverrideAssignment {
                department_id,
                confidence: Self::FALLEN_TREE_TRANSPORT_CONFIDENCE,
            }),
        ]
        .into_iter()
        .flatten()
        .collect();

        if assignments.is_empty() {
            return None;
        }

        Some(Self {
            label: "fallen tree".to_string(),
            all_of: vec!["pohon".to_string()],
            any_of: vec!["tumbang".to_string(), "roboh".to_string()],
            assignments,
        })
    }

    pub fn matches(&self, text: &str) -> bool {
        let contains = |term: &String| text.contains(term.to_lowercase().as_str());
        self.all_of.iter().all(contains)
            && (self.any_of.is_empty() || self.any_of.iter().any(contains))
    }
}

pub(crate) fn apply_overrides(
    overrides: &[ScenarioOverride],
    text: &str,
    departments: &[DepartmentProfile],
    decision: &mut Decision,
    reasoning: &mut Vec<String>,
) {
    for scenario in overrides.iter().filter(|scenario| scenario.matches(text)) {
        for assignment in &scenario.assignments {
            let Some(department) = departments
                .iter()
                .find(|department| department.id == assignment.department_id)
            else {
                reasoning.push(format!(
                    "Scenario \"{}\": department {} is not in the catalog, skipped",
                    scenario.label, assignment.department_id
                ));
                continue;
            };

            if already_assigned(decision, &department.id) {
                continue;
            }

            reasoning.push(format!(
                "Scenario \"{}\": added {} ({}% confidence)",
                scenario.label, department.name, assignment.confidence
            ));
            decision.department_ids.push(department.id.clone());
            decision.related.push(DepartmentAssignment {
                id: department.id.clone(),
                name: department.name.clone(),
                confidence: assignment.confidence,
            });
        }
    }
}

fn already_assigned(decision: &Decision, id: &DepartmentId) -> bool {
    let is_primary = matches!(
        &decision.outcome,
        ClassificationOutcome::Accepted { primary } if &primary.id == id
    );
    is_primary || decision.related.iter().any(|related| &related.id == id)
}
