//! Break Inserter
//!
//! Walks the chronologically sorted session list and names the rest period
//! after each session from the gap to the next one:
//!
//! | condition                                         | kind  | minutes            |
//! |---------------------------------------------------|-------|--------------------|
//! | end hour in 12-13 or 17-19, gap ≥ 30              | meal  | min(60, gap)       |
//! | cognitive load ≥ 4 or duration ≥ 60, gap > 0      | long  | min(20, gap)       |
//! | gap ≥ preferred break length                      | short | min(break, gap)    |
//!
//! The last session never gets a break.

use chrono::Timelike;

use crate::types::{BreakKind, FinalSession, OptimizedSession};

const MEAL_BREAK_MIN_GAP: i64 = 30;
const MEAL_BREAK_MAX_MINUTES: i64 = 60;
const LONG_BREAK_MAX_MINUTES: i64 = 20;
const HIGH_LOAD_THRESHOLD: u8 = 4;
const LONG_SESSION_MINUTES: i64 = 60;

#[derive(Debug, Clone, Default)]
pub struct BreakPlan {
    pub sessions: Vec<FinalSession>,
    pub total_study_minutes: i64,
    pub total_break_minutes: i64,
    pub break_count: usize,
}

struct Break {
    kind: BreakKind,
    minutes: i64,
    reason: &'static str,
}

fn is_lunch(hour: u32) -> bool {
    (12..=13).contains(&hour)
}

fn is_dinner(hour: u32) -> bool {
    (17..=19).contains(&hour)
}

fn choose_break(current: &OptimizedSession, gap: i64, break_length: i64) -> Option<Break> {
    let end_hour = current.resolved.end_time.hour();
    if (is_lunch(end_hour) || is_dinner(end_hour)) && gap >= MEAL_BREAK_MIN_GAP {
        return Some(Break {
            kind: BreakKind::Meal,
            minutes: gap.min(MEAL_BREAK_MAX_MINUTES),
            reason: if is_dinner(end_hour) {
                "Meal break during dinner time"
            } else {
                "Meal break during lunch time"
            },
        });
    }

    let high_load = current.cognitive_load >= HIGH_LOAD_THRESHOLD;
    let long_session = current.resolved.duration_minutes() >= LONG_SESSION_MINUTES;
    if (high_load || long_session) && gap > 0 {
        return Some(Break {
            kind: BreakKind::Long,
            minutes: gap.min(LONG_BREAK_MAX_MINUTES),
            reason: if high_load {
                "Extended break after high cognitive load session"
            } else {
                "Extended break after long session"
            },
        });
    }

    if gap >= break_length {
        return Some(Break {
            kind: BreakKind::Short,
            minutes: gap.min(break_length),
            reason: "Standard inter-session break for mental reset",
        });
    }

    None
}

/// Sorts by start time (stable) and annotates breaks.
pub fn insert_breaks(mut sessions: Vec<OptimizedSession>, break_length_minutes: u32) -> BreakPlan {
    sessions.sort_by_key(|session| session.resolved.start_time);
    let break_length = i64::from(break_length_minutes);

    let next_starts: Vec<_> = sessions
        .iter()
        .skip(1)
        .map(|session| session.resolved.start_time)
        .collect();

    let mut plan = BreakPlan::default();
    for (index, session) in sessions.into_iter().enumerate() {
        plan.total_study_minutes += session.resolved.duration_minutes();

        let chosen = next_starts.get(index).and_then(|next_start| {
            let gap = (*next_start - session.resolved.end_time).num_minutes();
            choose_break(&session, gap, break_length)
        });

        let final_session = match chosen {
            Some(rest) => {
                plan.total_break_minutes += rest.minutes;
                plan.break_count += 1;
                FinalSession {
                    session,
                    has_break_after: true,
                    break_duration_minutes: u32::try_from(rest.minutes).ok(),
                    break_kind: Some(rest.kind),
                    break_reason: Some(rest.reason.to_string()),
                }
            }
            None => FinalSession {
                session,
                has_break_after: false,
                break_duration_minutes: None,
                break_kind: None,
                break_reason: None,
            },
        };
        plan.sessions.push(final_session);
    }

    plan
}
