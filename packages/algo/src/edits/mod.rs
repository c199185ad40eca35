//! Structured Schedule Edits
//!
//! Applies `reschedule | extend | shorten | split | cancel | duplicate`
//! operations to a previously generated session list. Every session other
//! than the one being edited stays where it is and counts as occupied time.
//!
//! Failure modes:
//! - unknown session id or malformed parameters: `ScheduleError`, whole batch
//!   aborted
//! - edit that cannot be placed: `EditRejection`, that edit is skipped and the
//!   batch continues
//!
//! Breaks and the summary are recomputed over the whole list afterwards.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::breaks::insert_breaks;
use crate::error::{ScheduleError, ScheduleResult};
use crate::pipeline::{span_of, summarize};
use crate::resolver::SlotResolver;
use crate::sanitize::{validate_availability, validate_preferences};
use crate::types::{
    hhmm, minute_of_day, FinalSession, OptimizedSession, PipelineOptions, Preferences,
    ResolvedSession, ScheduleSummary, SessionRequest, WeeklyAvailability, MINUTES_PER_DAY,
    MIN_SESSION_MINUTES,
};

const MIN_SPLIT_PARTS: u32 = 2;
const MAX_SPLIT_PARTS: u32 = 6;

// ==================== Operations ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EditAction {
    /// Exact start when `start` is given, otherwise first fit on `date`
    Reschedule {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<NaiveDate>,
        #[serde(default, with = "hhmm::option", skip_serializing_if = "Option::is_none")]
        start: Option<chrono::NaiveTime>,
    },
    Extend {
        minutes: u32,
    },
    Shorten {
        minutes: u32,
    },
    Split {
        parts: u32,
    },
    Cancel,
    Duplicate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        date: Option<NaiveDate>,
    },
}

impl EditAction {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Reschedule { .. } => "reschedule",
            Self::Extend { .. } => "extend",
            Self::Shorten { .. } => "shorten",
            Self::Split { .. } => "split",
            Self::Cancel => "cancel",
            Self::Duplicate { .. } => "duplicate",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionEdit {
    pub session_id: String,
    pub action: EditAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditRejection {
    pub session_id: String,
    pub action: EditAction,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentOutcome {
    pub sessions: Vec<FinalSession>,
    pub rejected: Vec<EditRejection>,
    pub summary: ScheduleSummary,
}

// ==================== Editor ====================

struct Editor<'a> {
    sessions: Vec<FinalSession>,
    availability: &'a WeeklyAvailability,
    preferences: &'a Preferences,
    options: &'a PipelineOptions,
}

impl<'a> Editor<'a> {
    fn position(&self, session_id: &str) -> ScheduleResult<usize> {
        self.sessions
            .iter()
            .position(|s| s.id() == session_id)
            .ok_or_else(|| ScheduleError::UnknownSession(session_id.to_string()))
    }

    /// Resolver with every session except `skip` registered as occupied
    fn resolver(&self, skip: Option<usize>) -> SlotResolver<'a> {
        SlotResolver::new(
            self.availability,
            self.preferences.offset(),
            self.options.school_hours_policy,
        )
        .with_fixed(
            self.sessions
                .iter()
                .enumerate()
                .filter(|(index, _)| Some(*index) != skip)
                .map(|(_, session)| session.resolved()),
        )
    }

    fn sessions_on(&self, date: NaiveDate, skip: Option<usize>) -> usize {
        self.sessions
            .iter()
            .enumerate()
            .filter(|(index, s)| Some(*index) != skip && s.date() == date)
            .count()
    }

    fn check_daily_cap(&self, date: NaiveDate, skip: Option<usize>) -> Result<(), String> {
        let cap = self.preferences.max_sessions_per_day;
        if self.sessions_on(date, skip) >= cap {
            Err(format!("{date} already holds the daily maximum of {cap} sessions"))
        } else {
            Ok(())
        }
    }

    fn unused_id(&self, base: &str, separator: char) -> String {
        (1..)
            .map(|n| format!("{base}{separator}{n}"))
            .find(|candidate| self.sessions.iter().all(|s| s.id() != candidate))
            .unwrap_or_else(|| base.to_string())
    }

    fn apply(&mut self, edit: &SessionEdit) -> ScheduleResult<Result<(), String>> {
        let index = self.position(&edit.session_id)?;
        let invalid = |reason: &str| ScheduleError::InvalidEdit {
            session_id: edit.session_id.clone(),
            reason: reason.to_string(),
        };

        let current = &self.sessions[index];
        let request = current.request().clone();
        let start = current.resolved().start_minute();
        let duration = u32::try_from(current.resolved().duration_minutes()).unwrap_or(0);

        let outcome = match &edit.action {
            EditAction::Reschedule { date, start } => {
                let target = date.unwrap_or(request.target_date);
                if target != current.date() {
                    if let Err(reason) = self.check_daily_cap(target, Some(index)) {
                        return Ok(Err(reason));
                    }
                }
                let moved = SessionRequest {
                    target_date: target,
                    duration_minutes: duration,
                    ..request
                };
                let mut resolver = self.resolver(Some(index));
                let placed = match start {
                    Some(at) => resolver.place_at(moved, minute_of_day(*at)),
                    None => resolver.resolve(moved).map_err(|conflict| conflict.message),
                };
                placed.map(|resolved| self.replace(index, vec![resolved], edit))
            }
            EditAction::Extend { minutes } => {
                if *minutes == 0 || *minutes > MINUTES_PER_DAY {
                    return Err(invalid(&format!(
                        "extend needs between 1 and {MINUTES_PER_DAY} minutes"
                    )));
                }
                match duration.checked_add(*minutes) {
                    Some(extended) => self.resize(index, request, start, extended, edit),
                    None => Err("extended session would run past midnight".to_string()),
                }
            }
            EditAction::Shorten { minutes } => {
                if *minutes == 0 {
                    return Err(invalid("shorten needs a positive number of minutes"));
                }
                match duration.checked_sub(*minutes) {
                    Some(left) if left >= MIN_SESSION_MINUTES => {
                        self.resize(index, request, start, left, edit)
                    }
                    _ => Err(format!(
                        "a session must keep at least {MIN_SESSION_MINUTES} minutes"
                    )),
                }
            }
            EditAction::Split { parts } => {
                if !(MIN_SPLIT_PARTS..=MAX_SPLIT_PARTS).contains(parts) {
                    return Err(invalid(&format!(
                        "split needs between {MIN_SPLIT_PARTS} and {MAX_SPLIT_PARTS} parts"
                    )));
                }
                self.split(index, request, duration, *parts, edit)
            }
            EditAction::Cancel => {
                self.sessions.remove(index);
                Ok(())
            }
            EditAction::Duplicate { date } => {
                let target = date.unwrap_or(request.target_date);
                if let Err(reason) = self.check_daily_cap(target, None) {
                    return Ok(Err(reason));
                }
                let copy = SessionRequest {
                    id: self.unused_id(&request.id, '+'),
                    target_date: target,
                    duration_minutes: duration,
                    ..request
                };
                let template = self.sessions[index].clone();
                self.resolver(None)
                    .resolve(copy)
                    .map_err(|conflict| conflict.message)
                    .map(|resolved| {
                        let duplicate = rebuild(&template, resolved, edit.reason.as_deref());
                        self.sessions.push(duplicate);
                    })
            }
        };

        Ok(outcome)
    }

    fn resize(
        &mut self,
        index: usize,
        request: SessionRequest,
        start: u32,
        minutes: u32,
        edit: &SessionEdit,
    ) -> Result<(), String> {
        let resized = SessionRequest {
            duration_minutes: minutes,
            ..request
        };
        self.resolver(Some(index))
            .place_at(resized, start)
            .map(|resolved| self.replace(index, vec![resolved], edit))
    }

    fn split(
        &mut self,
        index: usize,
        request: SessionRequest,
        duration: u32,
        parts: u32,
        edit: &SessionEdit,
    ) -> Result<(), String> {
        let chunk = (duration + parts - 1) / parts;
        if chunk < MIN_SESSION_MINUTES {
            return Err(format!(
                "each part would be shorter than {MIN_SESSION_MINUTES} minutes"
            ));
        }

        let mut resolver = self.resolver(Some(index));
        let mut not_before = 0;
        let mut chunks = Vec::with_capacity(parts as usize);
        for part in 1..=parts {
            let piece = SessionRequest {
                id: format!("{}.{}", request.id, part),
                duration_minutes: chunk,
                ..request.clone()
            };
            let placed = resolver
                .resolve_after(piece, not_before)
                .map_err(|conflict| format!("part {part}/{parts}: {}", conflict.message))?;
            not_before = placed.end_minute() + self.preferences.break_length_minutes;
            chunks.push(placed);
        }

        self.replace(index, chunks, edit);
        Ok(())
    }

    fn replace(&mut self, index: usize, placed: Vec<ResolvedSession>, edit: &SessionEdit) {
        let template = self.sessions.remove(index);
        let tail = self.sessions.split_off(index);
        self.sessions.extend(
            placed
                .into_iter()
                .map(|resolved| rebuild(&template, resolved, edit.reason.as_deref())),
        );
        self.sessions.extend(tail);
    }
}

fn rebuild(template: &FinalSession, resolved: ResolvedSession, reason: Option<&str>) -> FinalSession {
    let optimization_reason = match reason {
        Some(reason) => format!("{} Adjusted: {}", template.session.optimization_reason, reason),
        None => template.session.optimization_reason.clone(),
    };
    FinalSession {
        session: OptimizedSession {
            resolved,
            cognitive_load: template.session.cognitive_load,
            day_position: template.session.day_position,
            optimization_reason,
        },
        has_break_after: false,
        break_duration_minutes: None,
        break_kind: None,
        break_reason: None,
    }
}

/// Applies `edits` in order to `sessions`.
pub fn apply_edits(
    sessions: Vec<FinalSession>,
    edits: &[SessionEdit],
    availability: &WeeklyAvailability,
    preferences: &Preferences,
    options: &PipelineOptions,
) -> ScheduleResult<AdjustmentOutcome> {
    validate_availability(availability)?;
    validate_preferences(preferences)?;

    let mut editor = Editor {
        sessions,
        availability,
        preferences,
        options,
    };

    let mut rejected = Vec::new();
    for edit in edits {
        if let Err(reason) = editor.apply(edit)? {
            tracing::debug!(session = %edit.session_id, action = edit.action.name(), %reason, "edit rejected");
            rejected.push(EditRejection {
                session_id: edit.session_id.clone(),
                action: edit.action.clone(),
                reason,
            });
        }
    }

    let optimized = editor
        .sessions
        .into_iter()
        .map(|final_session| final_session.session)
        .collect();
    let breaks = insert_breaks(optimized, preferences.break_length_minutes);
    let total = breaks.sessions.len();
    let span = span_of(&breaks.sessions);
    let summary = summarize(&breaks, total, 0, span, Vec::new());

    Ok(AdjustmentOutcome {
        sessions: breaks.sessions,
        rejected,
        summary,
    })
}
