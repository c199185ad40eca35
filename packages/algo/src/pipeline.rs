//! Scheduling Pipeline
//!
//! Runs the five stages in order:
//! validate → analyze → plan → resolve → balance → breaks → summary.
//!
//! Pure function of its inputs: no clock reads, no shared state.

use chrono::NaiveDate;

use crate::analyzer::analyze_topics;
use crate::balancer::{balance, cognitive_variety, daily_load, subject_balance};
use crate::breaks::{insert_breaks, BreakPlan};
use crate::error::{ScheduleError, ScheduleResult};
use crate::repetition::{expand_requests, plan_cycles};
use crate::resolver::SlotResolver;
use crate::sanitize::{validate_preferences, validate_request, validate_topics};
use crate::types::{
    FinalSession, PipelineOptions, Preferences, RepetitionPlan, Schedule, ScheduleRequest,
    ScheduleSummary, ScheduleWarning, Topic, TopicAnalysis,
};

/// Analyses and revision cycles without any placement
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudyPlan {
    pub analyses: Vec<TopicAnalysis>,
    pub plan: RepetitionPlan,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ScheduleWarning>,
}

fn span_warnings(span_days: u32, options: &PipelineOptions) -> Vec<ScheduleWarning> {
    if span_days > options.span_ceiling_days {
        tracing::warn!(
            span_days,
            ceiling_days = options.span_ceiling_days,
            "repetition span exceeds ceiling"
        );
        vec![ScheduleWarning::SpanExceedsCeiling {
            span_days,
            ceiling_days: options.span_ceiling_days,
        }]
    } else {
        Vec::new()
    }
}

/// Stages 1-2 only.
pub fn plan_study(
    topics: &[Topic],
    preferences: &Preferences,
    options: &PipelineOptions,
) -> ScheduleResult<StudyPlan> {
    validate_topics(topics)?;
    validate_preferences(preferences)?;

    let analyses = analyze_topics(topics);
    let plan = plan_cycles(&analyses);
    let warnings = span_warnings(plan.total_schedule_span, options);
    Ok(StudyPlan {
        analyses,
        plan,
        warnings,
    })
}

/// Full run from topics to the final session list.
pub fn generate_schedule(
    request: &ScheduleRequest,
    options: &PipelineOptions,
) -> ScheduleResult<Schedule> {
    validate_request(request)?;
    let preferences = &request.preferences;
    let start_date = preferences
        .schedule_start_date
        .ok_or(ScheduleError::MissingStartDate)?;

    let analyses = analyze_topics(&request.topics);
    let plan = plan_cycles(&analyses);
    tracing::debug!(
        topics = analyses.len(),
        span_days = plan.total_schedule_span,
        "planned revision cycles"
    );
    let warnings = span_warnings(plan.total_schedule_span, options);

    let requests = expand_requests(&analyses, &plan, start_date);
    let requested = requests.len();

    let resolution = SlotResolver::new(
        &request.availability,
        preferences.offset(),
        options.school_hours_policy,
    )
    .with_fixed(request.existing_sessions.iter().map(FinalSession::resolved))
    .resolve_all(requests);
    tracing::debug!(
        resolved = resolution.resolved.len(),
        unresolved = resolution.unresolved.len(),
        fixed = request.existing_sessions.len(),
        "resolved session slots"
    );

    let balanced = balance(
        resolution.resolved,
        preferences.max_sessions_per_day,
        preferences.study_style,
    );
    tracing::debug!(
        kept = balanced.sessions.len(),
        pruned = balanced.pruned.len(),
        "balanced daily load"
    );

    let mut unresolved = resolution.unresolved;
    unresolved.extend(balanced.pruned);
    unresolved.sort_by(|a, b| {
        a.target_date
            .cmp(&b.target_date)
            .then_with(|| a.session_id.cmp(&b.session_id))
    });

    let breaks = insert_breaks(balanced.sessions, preferences.break_length_minutes);
    let summary = summarize(
        &breaks,
        requested,
        unresolved.len(),
        plan.total_schedule_span,
        warnings,
    );

    Ok(Schedule {
        sessions: breaks.sessions,
        unresolved,
        summary,
    })
}

/// Calendar days covered by the sessions, first through last inclusive.
pub fn span_of(sessions: &[FinalSession]) -> u32 {
    let dates = sessions.iter().map(FinalSession::date);
    match (dates.clone().min(), dates.max()) {
        (Some(first), Some(last)) => days_between(first, last) + 1,
        _ => 0,
    }
}

fn days_between(first: NaiveDate, last: NaiveDate) -> u32 {
    u32::try_from((last - first).num_days()).unwrap_or(0)
}

pub fn summarize(
    breaks: &BreakPlan,
    requested_sessions: usize,
    unresolved_sessions: usize,
    schedule_span_days: u32,
    warnings: Vec<ScheduleWarning>,
) -> ScheduleSummary {
    let optimized = breaks.sessions.iter().map(|s| &s.session);
    ScheduleSummary {
        total_sessions: breaks.sessions.len(),
        requested_sessions,
        unresolved_sessions,
        total_study_minutes: breaks.total_study_minutes,
        total_break_minutes: breaks.total_break_minutes,
        break_count: breaks.break_count,
        subject_balance: subject_balance(optimized.clone()),
        daily_load: daily_load(optimized.clone()),
        cognitive_variety: cognitive_variety(optimized.map(|s| s.cognitive_load)),
        schedule_span_days,
        warnings,
    }
}
