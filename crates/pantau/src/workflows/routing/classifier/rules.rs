use super::config::ClassifierConfig;
use crate::workflows::routing::domain::{DepartmentProfile, Urgency};

pub(crate) const PRIORITY_MARKER: &str = " (priority)";

/// Keyword score for one department that matched at least once.
#[derive(Debug)]
pub(crate) struct DepartmentScore<'a> {
    pub department: &'a DepartmentProfile,
    pub score: f64,
    pub matched_keywords: Vec<String>,
}

/// Score every department against `text`, dropping those without a match, ranked
/// best first. Ties keep catalog order.
pub(crate) fn score_departments<'a>(
    text: &str,
    departments: &'a [DepartmentProfile],
    urgency: Urgency,
    config: &ClassifierConfig,
    reasoning: &mut Vec<String>,
) -> Vec<DepartmentScore<'a>> {
    let mut ranked = Vec::new();

    for department in departments {
        let mut raw_score = 0.0;
        let mut matched_keywords = Vec::new();

        for keyword in department.keywords.iter().map(|k| k.trim()) {
            let needle = keyword.to_lowercase();
            if needle.is_empty() {
                continue;
            }
            let occurrences = text.matches(needle.as_str()).count();
            if occurrences == 0 {
                continue;
            }
            let repeats = (occurrences - 1).min(config.max_repeat_bonuses);
            raw_score += config.keyword_points + config.repeat_points * repeats as f64;
            matched_keywords.push(keyword.to_string());
        }

        for keyword in department.priority_keywords.iter().map(|k| k.trim()) {
            let needle = keyword.to_lowercase();
            if needle.is_empty() || !text.contains(needle.as_str()) {
                continue;
            }
            raw_score += config.priority_keyword_points;
            matched_keywords.push(format!("{keyword}{PRIORITY_MARKER}"));
            reasoning.push(format!(
                "Emergency keyword \"{keyword}\" detected for {}",
                department.name
            ));
        }

        if raw_score == 0.0 {
            continue;
        }

        let mut score = raw_score * department.effective_weight();
        if urgency == Urgency::High {
            score *= config.high_urgency_multiplier;
        }

        reasoning.push(format!(
            "{}: {} keyword match(es), score {:.1}",
            department.name,
            matched_keywords.len(),
            score
        ));

        ranked.push(DepartmentScore {
            department,
            score,
            matched_keywords,
        });
    }

    if urgency == Urgency::High && !ranked.is_empty() {
        reasoning.push(format!(
            "High urgency report: scores multiplied by {}",
            config.high_urgency_multiplier
        ));
    }

    ranked.sort_by(|left, right| right.score.total_cmp(&left.score));
    ranked
}
