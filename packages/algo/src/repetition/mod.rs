//! Repetition Planner
//!
//! Expands each analyzed topic into a spaced-repetition cycle: one
//! `new-learning` session at day 0, revisions at forgetting-curve offsets, and
//! a closing `practice-test`.
//!
//! Offsets are `[1, 3, 7, 14]` stretched by `1 + (5 - difficulty) × 0.2`, so
//! easier topics are revisited later and harder ones sooner. The multiplier is
//! kept in integer tenths to make rounding exact.

use chrono::{Duration, NaiveDate};
use rayon::prelude::*;

use crate::types::{
    CycleEntry, RepetitionPlan, RevisionCycle, SessionKind, SessionRequest, TopicAnalysis,
    MAX_DIFFICULTY, MIN_DIFFICULTY,
};

// ==================== Constants ====================

/// Ebbinghaus-style review offsets (days)
pub const BASE_REVIEW_OFFSETS: [u32; 4] = [1, 3, 7, 14];

const MIN_INITIAL_MINUTES: u32 = 45;
const MIN_REVIEW_MINUTES: u32 = 25;

const REVIEW_LABELS: [&str; 4] = ["quick review", "reinforcement", "consolidation", "mastery test"];

// ==================== Intervals ====================

/// `(1 + (5 - difficulty) × 0.2) × 10`
pub fn difficulty_multiplier_tenths(difficulty: u8) -> u32 {
    let difficulty = difficulty.clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    10 + u32::from(MAX_DIFFICULTY - difficulty) * 2
}

pub fn adjusted_offsets(difficulty: u8) -> Vec<u32> {
    let tenths = difficulty_multiplier_tenths(difficulty);
    BASE_REVIEW_OFFSETS
        .iter()
        .map(|base| (base * tenths + 5) / 10)
        .collect()
}

fn rounded_div(numerator: u32, denominator: u32) -> u32 {
    (numerator * 2 + denominator) / (denominator * 2)
}

pub fn initial_minutes(required_hours: u32) -> u32 {
    rounded_div(required_hours * 60, 3).max(MIN_INITIAL_MINUTES)
}

/// Reinforcement sessions shrink as `hours × 60 / (4 + index)`.
pub fn review_minutes(required_hours: u32, index: usize) -> u32 {
    rounded_div(required_hours * 60, 4 + index as u32).max(MIN_REVIEW_MINUTES)
}

// ==================== Planning ====================

pub fn plan_cycle(analysis: &TopicAnalysis) -> RevisionCycle {
    let offsets = adjusted_offsets(analysis.estimated_difficulty);
    let last = offsets.len() - 1;

    let mut cycles = Vec::with_capacity(offsets.len() + 1);
    cycles.push(CycleEntry {
        day_offset: 0,
        kind: SessionKind::NewLearning,
        duration_minutes: initial_minutes(analysis.required_hours),
        interval_reasoning: "Initial learning session - comprehensive coverage".to_string(),
    });

    for (index, offset) in offsets.iter().enumerate() {
        let kind = if index == last {
            SessionKind::PracticeTest
        } else {
            SessionKind::Revision
        };
        cycles.push(CycleEntry {
            day_offset: *offset,
            kind,
            duration_minutes: review_minutes(analysis.required_hours, index),
            interval_reasoning: format!(
                "Spaced repetition interval {} days - {}",
                offset,
                REVIEW_LABELS[index.min(REVIEW_LABELS.len() - 1)]
            ),
        });
    }

    debug_assert!(cycles.windows(2).all(|pair| pair[0].day_offset < pair[1].day_offset));

    RevisionCycle {
        topic_id: analysis.topic_id.clone(),
        cycles,
    }
}

/// Plans every topic in parallel and reports the overall span (max offset + 1).
pub fn plan_cycles(analyses: &[TopicAnalysis]) -> RepetitionPlan {
    let revision_cycles: Vec<RevisionCycle> = analyses.par_iter().map(plan_cycle).collect();
    let max_offset = revision_cycles
        .iter()
        .flat_map(|cycle| cycle.cycles.iter().map(|entry| entry.day_offset))
        .max()
        .unwrap_or(0);

    RepetitionPlan {
        revision_cycles,
        total_schedule_span: max_offset + 1,
    }
}

/// Flattens cycles into dated requests in the resolver's processing order:
/// ascending target date, then ascending duration. The sort is stable, so
/// ties keep topic order, then cycle order.
pub fn expand_requests(
    analyses: &[TopicAnalysis],
    plan: &RepetitionPlan,
    start_date: NaiveDate,
) -> Vec<SessionRequest> {
    let mut requests: Vec<SessionRequest> = analyses
        .iter()
        .zip(&plan.revision_cycles)
        .flat_map(|(analysis, cycle)| {
            cycle
                .cycles
                .iter()
                .enumerate()
                .map(move |(index, entry)| SessionRequest {
                    id: format!("{}-{}", analysis.topic_id, index),
                    topic_id: analysis.topic_id.clone(),
                    subject: analysis.subject.clone(),
                    topic: analysis.topic_name.clone(),
                    kind: entry.kind,
                    duration_minutes: entry.duration_minutes,
                    difficulty: analysis.estimated_difficulty,
                    base_difficulty: analysis.base_difficulty,
                    day_offset: entry.day_offset,
                    target_date: start_date + Duration::days(i64::from(entry.day_offset)),
                })
        })
        .collect();

    requests.sort_by(|a, b| {
        a.target_date
            .cmp(&b.target_date)
            .then(a.duration_minutes.cmp(&b.duration_minutes))
    });
    requests
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SessionPattern;

    fn analysis(id: &str, difficulty: u8, hours: u32) -> TopicAnalysis {
        TopicAnalysis {
            topic_id: id.to_string(),
            subject: "History".to_string(),
            topic_name: format!("Topic {id}"),
            base_difficulty: difficulty,
            estimated_difficulty: difficulty,
            required_hours: hours,
            optimal_session_type: SessionPattern::Intensive,
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_offsets_per_difficulty() {
        assert_eq!(adjusted_offsets(5), vec![1, 3, 7, 14]);
        assert_eq!(adjusted_offsets(4), vec![1, 4, 8, 17]);
        assert_eq!(adjusted_offsets(3), vec![1, 4, 10, 20]);
        assert_eq!(adjusted_offsets(2), vec![2, 5, 11, 22]);
        assert_eq!(adjusted_offsets(1), vec![2, 5, 13, 25]);
    }

    #[test]
    fn test_session_durations() {
        assert_eq!(initial_minutes(2), 45);
        assert_eq!(initial_minutes(10), 200);
        assert_eq!(review_minutes(10, 0), 150);
        assert_eq!(review_minutes(10, 3), 86);
        assert_eq!(review_minutes(1, 3), 25);
        // 660 / 7 = 94.28
        assert_eq!(review_minutes(11, 3), 94);
    }

    #[test]
    fn test_cycle_shape() {
        let cycle = plan_cycle(&analysis("t1", 3, 7));
        let entries = &cycle.cycles;
        assert_eq!(entries.len(), 5);
        assert_eq!(entries[0].day_offset, 0);
        assert_eq!(entries[0].kind, SessionKind::NewLearning);
        assert_eq!(entries[4].kind, SessionKind::PracticeTest);
        assert!(entries[1..4].iter().all(|e| e.kind == SessionKind::Revision));
        assert!(entries.windows(2).all(|p| p[0].day_offset < p[1].day_offset));
        assert!(entries[4].interval_reasoning.contains("mastery test"));
    }

    #[test]
    fn test_span_is_max_offset_plus_one() {
        let plan = plan_cycles(&[analysis("hard", 5, 10), analysis("easy", 1, 2)]);
        assert_eq!(plan.revision_cycles.len(), 2);
        assert_eq!(plan.total_schedule_span, 26);
    }

    #[test]
    fn test_expanded_requests_are_sorted() {
        let analyses = vec![analysis("a", 5, 10), analysis("b", 5, 6)];
        let plan = plan_cycles(&analyses);
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let requests = expand_requests(&analyses, &plan, start);

        assert_eq!(requests.len(), 10);
        assert_eq!(requests[0].id, "b-0");
        assert_eq!(requests[1].id, "a-0");
        assert!(requests.windows(2).all(|p| {
            (p[0].target_date, p[0].duration_minutes) <= (p[1].target_date, p[1].duration_minutes)
        }));
        assert_eq!(
            requests.last().unwrap().target_date,
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
    }
}
