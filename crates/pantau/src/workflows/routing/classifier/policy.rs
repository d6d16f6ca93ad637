use serde::{Deserialize, Serialize};

use super::config::ClassifierConfig;
use super::rules::DepartmentScore;
use crate::workflows::routing::domain::DepartmentId;

/// A department chosen for a report, with the confidence behind the choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepartmentAssignment {
    pub id: DepartmentId,
    pub name: String,
    pub confidence: u8,
}

/// How the routing decision came out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassificationOutcome {
    /// The top candidate cleared the acceptance threshold.
    Accepted { primary: DepartmentAssignment },
    /// A candidate exists but its confidence is too low for automatic assignment.
    Rejected { candidate: DepartmentAssignment },
    /// No department matched any keyword.
    NoMatch,
}

impl ClassificationOutcome {
    pub fn summary(&self) -> String {
        match self {
            ClassificationOutcome::Accepted { primary } => {
                format!("assigned to {} ({}%)", primary.name, primary.confidence)
            }
            ClassificationOutcome::Rejected { candidate } => format!(
                "needs review: {} only {}% confident",
                candidate.name, candidate.confidence
            ),
            ClassificationOutcome::NoMatch => "no matching department".to_string(),
        }
    }
}

pub(crate) struct Decision {
    pub outcome: ClassificationOutcome,
    pub related: Vec<DepartmentAssignment>,
    pub department_ids: Vec<DepartmentId>,
    pub matched_keywords: Vec<String>,
}

pub(crate) fn decide_outcome(
    ranked: &[DepartmentScore<'_>],
    config: &ClassifierConfig,
    reasoning: &mut Vec<String>,
) -> Decision {
    let Some(top) = ranked.first() else {
        reasoning.push("No relevant keywords found for any department".to_string());
        return Decision {
            outcome: ClassificationOutcome::NoMatch,
            related: Vec::new(),
            department_ids: Vec::new(),
            matched_keywords: Vec::new(),
        };
    };

    let confidence = config.confidence(top.score, config.max_primary_confidence);
    let assignment = DepartmentAssignment {
        id: top.department.id.clone(),
        name: top.department.name.clone(),
        confidence,
    };
    let matched_keywords = top.matched_keywords.clone();

    if confidence < config.acceptance_threshold {
        reasoning.push(format!(
            "Top candidate {} scored {:.1} ({}% confidence), below the {}% acceptance threshold; manual review required",
            assignment.name, top.score, confidence, config.acceptance_threshold
        ));
        reasoning.push(format!("Matched keywords: {}", matched_keywords.join(", ")));
        return Decision {
            outcome: ClassificationOutcome::Rejected {
                candidate: assignment,
            },
            related: Vec::new(),
            department_ids: Vec::new(),
            matched_keywords,
        };
    }

    reasoning.push(format!(
        "Primary department: {} (score {:.1}, {}% confidence)",
        assignment.name, top.score, confidence
    ));
    reasoning.push(format!("Matched keywords: {}", matched_keywords.join(", ")));

    let mut department_ids = vec![assignment.id.clone()];
    let mut related = Vec::new();
    let cutoff = top.score * f64::from(config.related_score_percent);

    for candidate in &ranked[1..] {
        if candidate.score * 100.0 < cutoff {
            continue;
        }
        let confidence = config.confidence(candidate.score, config.max_related_confidence);
        reasoning.push(format!(
            "Related department: {} (score {:.1}, {}% confidence)",
            candidate.department.name, candidate.score, confidence
        ));
        department_ids.push(candidate.department.id.clone());
        related.push(DepartmentAssignment {
            id: candidate.department.id.clone(),
            name: candidate.department.name.clone(),
            confidence,
        });
    }

    Decision {
        outcome: ClassificationOutcome::Accepted {
            primary: assignment,
        },
        related,
        department_ids,
        matched_keywords,
    }
}

/// Keeps the `limit` most confident related departments. Departments past the
/// limit stay in `department_ids` and are named in the reasoning.
pub(crate) fn cap_related(decision: &mut Decision, limit: usize, reasoning: &mut Vec<String>) {
    decision
        .related
        .sort_by(|left, right| right.confidence.cmp(&left.confidence));
    if decision.related.len() <= limit {
        return;
    }

    let unlisted: Vec<String> = decision
        .related
        .split_off(limit)
        .into_iter()
        .map(|department| department.name)
        .collect();
    reasoning.push(format!(
        "Related list capped at {limit}; not listed but still routed: {}",
        unlisted.join(", ")
    ));
}
