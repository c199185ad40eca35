//! Load Balancer
//!
//! Per calendar date:
//! 1. over the daily cap, rank by `subject difficulty + kind bonus`
//!    (descending) and keep the top `max_sessions_per_day`; the rest come back
//!    as `DailyCapExceeded` conflicts
//! 2. sort the survivors by subject difficulty (descending) and alternate the
//!    harder half with the easier half: hard, easy, hard, easy...
//!
//! Both steps read the subject-table difficulty, so a caller override or a
//! keyword bump changes a session's cognitive load but not its rank.
//!
//! The interleaved order is a labeling only (`day_position`); resolved start
//! times never move. Dates are independent, so they are balanced in parallel.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rayon::prelude::*;

use crate::types::{
    ConflictReason, OptimizedSession, ResolvedSession, StudyStyle, UnresolvedConflict,
};

#[derive(Debug, Clone, Default)]
pub struct BalanceOutcome {
    pub sessions: Vec<OptimizedSession>,
    pub pruned: Vec<UnresolvedConflict>,
}

/// Ranking weight used when a day is over capacity
pub fn priority_weight(session: &ResolvedSession) -> u32 {
    u32::from(session.request.base_difficulty) + session.request.kind.priority_bonus()
}

/// Alternates the harder half of an already sorted list with the easier half:
/// `[5, 4, 3, 2, 1]` becomes `[5, 2, 4, 1, 3]`.
pub fn interleave<T>(mut sorted: Vec<T>) -> Vec<T> {
    let easy = sorted.split_off((sorted.len() + 1) / 2);
    let mut merged = Vec::with_capacity(sorted.len() + easy.len());
    let mut easy = easy.into_iter();
    for item in sorted {
        merged.push(item);
        if let Some(next) = easy.next() {
            merged.push(next);
        }
    }
    merged.extend(easy);
    merged
}

fn rationale(style: StudyStyle, position: usize, total: usize) -> String {
    format!(
        "Optimized for {} study style. Position {}/{} balances cognitive load. {} difficulty session for variety.",
        style.as_str(),
        position,
        total,
        if position % 2 == 1 { "Higher" } else { "Lower" },
    )
}

fn balance_day(
    mut sessions: Vec<ResolvedSession>,
    max_sessions_per_day: usize,
    style: StudyStyle,
) -> BalanceOutcome {
    let mut pruned = Vec::new();
    if sessions.len() > max_sessions_per_day {
        sessions.sort_by(|a, b| priority_weight(b).cmp(&priority_weight(a)));
        pruned = sessions
            .split_off(max_sessions_per_day)
            .iter()
            .map(|dropped| {
                UnresolvedConflict::new(
                    &dropped.request,
                    vec![ConflictReason::DailyCapExceeded {
                        max_sessions_per_day,
                    }],
                )
            })
            .collect();
    }

    sessions.sort_by(|a, b| b.request.base_difficulty.cmp(&a.request.base_difficulty));
    let ordered = interleave(sessions);
    let total = ordered.len();

    let sessions = ordered
        .into_iter()
        .enumerate()
        .map(|(index, resolved)| OptimizedSession {
            cognitive_load: resolved.request.difficulty,
            day_position: index + 1,
            optimization_reason: rationale(style, index + 1, total),
            resolved,
        })
        .collect();

    BalanceOutcome { sessions, pruned }
}

/// Balances every date group. Output is grouped by ascending date.
pub fn balance(
    resolved: Vec<ResolvedSession>,
    max_sessions_per_day: usize,
    style: StudyStyle,
) -> BalanceOutcome {
    let mut by_date: BTreeMap<NaiveDate, Vec<ResolvedSession>> = BTreeMap::new();
    for session in resolved {
        by_date.entry(session.date()).or_default().push(session);
    }

    let days: Vec<BalanceOutcome> = by_date
        .into_values()
        .collect::<Vec<_>>()
        .into_par_iter()
        .map(|day| balance_day(day, max_sessions_per_day, style))
        .collect();

    days.into_iter()
        .fold(BalanceOutcome::default(), |mut acc, mut day| {
            acc.sessions.append(&mut day.sessions);
            acc.pruned.append(&mut day.pruned);
            acc
        })
}

// ==================== Metrics ====================

/// Population variance of the loads halved, rounded to 2 decimals; 0 when empty.
pub fn cognitive_variety<I>(loads: I) -> f64
where
    I: IntoIterator<Item = u8>,
{
    let loads: Vec<f64> = loads.into_iter().map(f64::from).collect();
    if loads.is_empty() {
        return 0.0;
    }
    let count = loads.len() as f64;
    let mean = loads.iter().sum::<f64>() / count;
    let variance = loads.iter().map(|load| (load - mean).powi(2)).sum::<f64>() / count;
    (variance / 2.0 * 100.0).round() / 100.0
}

pub fn subject_balance<'a, I>(sessions: I) -> BTreeMap<String, usize>
where
    I: IntoIterator<Item = &'a OptimizedSession>,
{
    let mut counts = BTreeMap::new();
    for session in sessions {
        *counts
            .entry(session.resolved.request.subject.clone())
            .or_insert(0) += 1;
    }
    counts
}

/// Total cognitive load per `YYYY-MM-DD`
pub fn daily_load<'a, I>(sessions: I) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = &'a OptimizedSession>,
{
    let mut loads = BTreeMap::new();
    for session in sessions {
        *loads
            .entry(session.resolved.date().to_string())
            .or_insert(0) += u32::from(session.cognitive_load);
    }
    loads
}
