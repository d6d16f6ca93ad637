mod config;
mod overrides;
mod policy;
mod rules;

pub use config::ClassifierConfig;
pub use overrides::{OverrideAssignment, ScenarioOverride};
pub use policy::{ClassificationOutcome, DepartmentAssignment};

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{DepartmentId, DepartmentProfile, ReportInput};
use overrides::apply_overrides;
use policy::{cap_related, decide_outcome};
use rules::score_departments;

/// Stateless keyword router applying the scoring configuration to a catalog snapshot.
#[derive(Debug, Clone, Default)]
pub struct ClassificationEngine {
    config: ClassifierConfig,
}

impl ClassificationEngine {
    pub fn new(config: ClassifierConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    pub fn classify(
        &self,
        report: &ReportInput,
        departments: &[DepartmentProfile],
    ) -> ClassificationResult {
        let text = report.normalized_text();
        let mut reasoning = Vec::new();

        let ranked = score_departments(
            &text,
            departments,
            report.urgency,
            &self.config,
            &mut reasoning,
        );
        let mut decision = decide_outcome(&ranked, &self.config, &mut reasoning);
        apply_overrides(
            &self.config.overrides,
            &text,
            departments,
            &mut decision,
            &mut reasoning,
        );
        cap_related(
            &mut decision,
            self.config.max_related_departments,
            &mut reasoning,
        );

        let mut seen = HashSet::new();
        decision
            .department_ids
            .retain(|id| seen.insert(id.clone()));

        debug!(
            candidates = ranked.len(),
            outcome = %decision.outcome.summary(),
            "report classified"
        );

        ClassificationResult {
            outcome: decision.outcome,
            related_departments: decision.related,
            all_department_ids: decision.department_ids,
            reasoning,
            matched_keywords: decision.matched_keywords,
        }
    }
}

/// Routing decision for one report, with the audit trail that produced it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub outcome: ClassificationOutcome,
    pub related_departments: Vec<DepartmentAssignment>,
    pub all_department_ids: Vec<DepartmentId>,
    pub reasoning: Vec<String>,
    pub matched_keywords: Vec<String>,
}

impl ClassificationResult {
    /// Department the report is assigned to, present only when the outcome was accepted.
    pub fn primary_department(&self) -> Option<&DepartmentAssignment> {
        match &self.outcome {
            ClassificationOutcome::Accepted { primary } => Some(primary),
            ClassificationOutcome::Rejected { .. } | ClassificationOutcome::NoMatch => None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.primary_department().is_some()
    }
}
