//! Common Types and Constants
//!
//! Shared data structures used across all pipeline stages.

use std::fmt;

use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, NaiveTime, Offset, Timelike, Utc, Weekday};
use serde::{Deserialize, Serialize};

// ==================== Constants ====================

/// Lowest difficulty / cognitive load
pub const MIN_DIFFICULTY: u8 = 1;

/// Highest difficulty / cognitive load
pub const MAX_DIFFICULTY: u8 = 5;

/// Default preferred session length (minutes)
pub const DEFAULT_SESSION_LENGTH_MINUTES: u32 = 45;

/// Default break length (minutes)
pub const DEFAULT_BREAK_LENGTH_MINUTES: u32 = 10;

/// Default daily session cap
pub const DEFAULT_MAX_SESSIONS_PER_DAY: usize = 4;

/// Default sanity ceiling for the repetition span (days)
pub const DEFAULT_SPAN_CEILING_DAYS: u32 = 60;

/// Shortest session an edit may leave behind (minutes)
pub const MIN_SESSION_MINUTES: u32 = 15;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

// ==================== Clock Times ====================

/// `"HH:MM"` serde adapter for `NaiveTime`
pub mod hhmm {
    use chrono::NaiveTime;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format("%H:%M").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        crate::sanitize::parse_clock(&raw).map_err(D::Error::custom)
    }

    pub mod option {
        use chrono::NaiveTime;
        use serde::{de::Error, Deserialize, Deserializer, Serializer};

        pub fn serialize<S: Serializer>(
            time: &Option<NaiveTime>,
            serializer: S,
        ) -> Result<S::Ok, S::Error> {
            match time {
                Some(time) => serializer.serialize_some(&time.format("%H:%M").to_string()),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(
            deserializer: D,
        ) -> Result<Option<NaiveTime>, D::Error> {
            match Option::<String>::deserialize(deserializer)? {
                Some(raw) => crate::sanitize::parse_clock(&raw)
                    .map(Some)
                    .map_err(D::Error::custom),
                None => Ok(None),
            }
        }
    }
}

/// Minutes since midnight for a clock time
pub fn minute_of_day(time: NaiveTime) -> u32 {
    time.num_seconds_from_midnight() / 60
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

/// A `[start, end)` clock interval inside one day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    #[serde(with = "hhmm")]
    pub start: NaiveTime,
    #[serde(with = "hhmm")]
    pub end: NaiveTime,
}

impl TimeWindow {
    /// Builds a window from `"HH:MM"` strings.
    pub fn parse(start: &str, end: &str) -> crate::ScheduleResult<Self> {
        Ok(Self {
            start: crate::sanitize::parse_clock(start)?,
            end: crate::sanitize::parse_clock(end)?,
        })
    }

    pub fn start_minute(&self) -> u32 {
        minute_of_day(self.start)
    }

    pub fn end_minute(&self) -> u32 {
        minute_of_day(self.end)
    }

    pub fn length_minutes(&self) -> u32 {
        self.end_minute().saturating_sub(self.start_minute())
    }

    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Whether `[start, end)` in minutes lies entirely inside the window.
    pub fn contains(&self, start: u32, end: u32) -> bool {
        start >= self.start_minute() && end <= self.end_minute()
    }

    pub fn overlaps(&self, start: u32, end: u32) -> bool {
        start < self.end_minute() && end > self.start_minute()
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

fn default_school_hours() -> TimeWindow {
    TimeWindow {
        start: NaiveTime::from_hms_opt(8, 30, 0).unwrap_or_default(),
        end: NaiveTime::from_hms_opt(15, 30, 0).unwrap_or_default(),
    }
}

// ==================== Inputs ====================

/// A study topic supplied by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Topic {
    pub id: String,
    pub subject: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub difficulty: Option<u8>,
}

impl Topic {
    pub fn new(id: impl Into<String>, subject: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            subject: subject.into(),
            name: name.into(),
            difficulty: None,
        }
    }

    pub fn with_difficulty(mut self, difficulty: u8) -> Self {
        self.difficulty = Some(difficulty);
        self
    }
}

/// Weekly availability calendar plus the daily school-hours block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyAvailability {
    #[serde(default)]
    pub monday: Vec<TimeWindow>,
    #[serde(default)]
    pub tuesday: Vec<TimeWindow>,
    #[serde(default)]
    pub wednesday: Vec<TimeWindow>,
    #[serde(default)]
    pub thursday: Vec<TimeWindow>,
    #[serde(default)]
    pub friday: Vec<TimeWindow>,
    #[serde(default)]
    pub saturday: Vec<TimeWindow>,
    #[serde(default)]
    pub sunday: Vec<TimeWindow>,
    #[serde(default = "default_school_hours")]
    pub school_hours: TimeWindow,
}

impl Default for WeeklyAvailability {
    fn default() -> Self {
        Self {
            monday: Vec::new(),
            tuesday: Vec::new(),
            wednesday: Vec::new(),
            thursday: Vec::new(),
            friday: Vec::new(),
            saturday: Vec::new(),
            sunday: Vec::new(),
            school_hours: default_school_hours(),
        }
    }
}

impl WeeklyAvailability {
    pub fn windows(&self, day: Weekday) -> &[TimeWindow] {
        match day {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    pub fn windows_mut(&mut self, day: Weekday) -> &mut Vec<TimeWindow> {
        match day {
            Weekday::Mon => &mut self.monday,
            Weekday::Tue => &mut self.tuesday,
            Weekday::Wed => &mut self.wednesday,
            Weekday::Thu => &mut self.thursday,
            Weekday::Fri => &mut self.friday,
            Weekday::Sat => &mut self.saturday,
            Weekday::Sun => &mut self.sunday,
        }
    }

    /// Windows for the weekday of `date`
    pub fn windows_on(&self, date: NaiveDate) -> &[TimeWindow] {
        self.windows(date.weekday())
    }

    /// Window on `date` that fully contains `[start, end)` minutes.
    pub fn window_containing(&self, date: NaiveDate, start: u32, end: u32) -> Option<TimeWindow> {
        self.windows_on(date)
            .iter()
            .find(|window| window.contains(start, end))
            .copied()
    }

    pub fn all_days(&self) -> [(Weekday, &[TimeWindow]); 7] {
        [
            (Weekday::Mon, self.monday.as_slice()),
            (Weekday::Tue, self.tuesday.as_slice()),
            (Weekday::Wed, self.wednesday.as_slice()),
            (Weekday::Thu, self.thursday.as_slice()),
            (Weekday::Fri, self.friday.as_slice()),
            (Weekday::Sat, self.saturday.as_slice()),
            (Weekday::Sun, self.sunday.as_slice()),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StudyStyle {
    Intensive,
    Relaxed,
    #[default]
    Balanced,
}

impl StudyStyle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Intensive => "intensive",
            Self::Relaxed => "relaxed",
            Self::Balanced => "balanced",
        }
    }
}

fn default_session_length() -> u32 {
    DEFAULT_SESSION_LENGTH_MINUTES
}

fn default_break_length() -> u32 {
    DEFAULT_BREAK_LENGTH_MINUTES
}

fn default_max_sessions() -> usize {
    DEFAULT_MAX_SESSIONS_PER_DAY
}

/// Study preferences; every field has a default
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Preferences {
    #[serde(default = "default_session_length")]
    pub session_length_minutes: u32,
    #[serde(default = "default_break_length")]
    pub break_length_minutes: u32,
    #[serde(default = "default_max_sessions")]
    pub max_sessions_per_day: usize,
    #[serde(default)]
    pub study_style: StudyStyle,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_start_date: Option<NaiveDate>,
    #[serde(default)]
    pub utc_offset_minutes: i32,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            session_length_minutes: DEFAULT_SESSION_LENGTH_MINUTES,
            break_length_minutes: DEFAULT_BREAK_LENGTH_MINUTES,
            max_sessions_per_day: DEFAULT_MAX_SESSIONS_PER_DAY,
            study_style: StudyStyle::default(),
            schedule_start_date: None,
            utc_offset_minutes: 0,
        }
    }
}

impl Preferences {
    /// Fixed offset the availability clock times are expressed in
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }
}

/// How school hours affect placement
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SchoolHoursPolicy {
    /// Overlap is recorded as a conflict note only
    #[default]
    Annotate,
    /// School hours are treated as occupied on every date
    Block,
}

impl SchoolHoursPolicy {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "annotate" => Some(Self::Annotate),
            "block" => Some(Self::Block),
            _ => None,
        }
    }
}

/// Knobs owned by the hosting service rather than the end user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineOptions {
    pub span_ceiling_days: u32,
    pub school_hours_policy: SchoolHoursPolicy,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            span_ceiling_days: DEFAULT_SPAN_CEILING_DAYS,
            school_hours_policy: SchoolHoursPolicy::default(),
        }
    }
}

/// Complete input of one scheduling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleRequest {
    pub topics: Vec<Topic>,
    pub availability: WeeklyAvailability,
    #[serde(default)]
    pub preferences: Preferences,
    /// Previously generated sessions kept as fixed occupied intervals
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub existing_sessions: Vec<FinalSession>,
}

// ==================== Topic Analysis ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionPattern {
    Intensive,
    Distributed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TopicAnalysis {
    pub topic_id: String,
    pub subject: String,
    pub topic_name: String,
    pub base_difficulty: u8,
    pub estimated_difficulty: u8,
    pub required_hours: u32,
    pub optimal_session_type: SessionPattern,
    pub reasoning: String,
}

// ==================== Repetition ====================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SessionKind {
    NewLearning,
    Revision,
    PracticeTest,
}

impl SessionKind {
    /// Ranking bonus used when a day is over capacity
    pub fn priority_bonus(&self) -> u32 {
        match self {
            Self::NewLearning => 2,
            Self::PracticeTest => 1,
            Self::Revision => 0,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NewLearning => "new-learning",
            Self::Revision => "revision",
            Self::PracticeTest => "practice-test",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CycleEntry {
    pub day_offset: u32,
    #[serde(rename = "sessionType")]
    pub kind: SessionKind,
    pub duration_minutes: u32,
    pub interval_reasoning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevisionCycle {
    pub topic_id: String,
    pub cycles: Vec<CycleEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepetitionPlan {
    pub revision_cycles: Vec<RevisionCycle>,
    pub total_schedule_span: u32,
}

/// One cycle entry pinned to a calendar date
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRequest {
    pub id: String,
    pub topic_id: String,
    pub subject: String,
    pub topic: String,
    #[serde(rename = "sessionType")]
    pub kind: SessionKind,
    pub duration_minutes: u32,
    /// Estimated difficulty, used as the session's cognitive load
    pub difficulty: u8,
    /// Subject-table difficulty, used to rank sessions on a full day
    pub base_difficulty: u8,
    pub day_offset: u32,
    pub target_date: NaiveDate,
}

// ==================== Placement ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedSession {
    #[serde(flatten)]
    pub request: SessionRequest,
    pub start_time: DateTime<FixedOffset>,
    pub end_time: DateTime<FixedOffset>,
    pub conflicts: Vec<String>,
    pub window: TimeWindow,
}

impl ResolvedSession {
    /// Local calendar date of the session
    pub fn date(&self) -> NaiveDate {
        self.start_time.date_naive()
    }

    pub fn start_minute(&self) -> u32 {
        minute_of_day(self.start_time.time())
    }

    /// End minute on the start date; sessions never cross midnight.
    pub fn end_minute(&self) -> u32 {
        let minutes = (self.end_time - self.start_time).num_minutes().max(0) as u32;
        (self.start_minute() + minutes).min(MINUTES_PER_DAY)
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_time - self.start_time).num_minutes()
    }
}

/// Why a session could not be placed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConflictReason {
    NoAvailability,
    #[serde(rename_all = "camelCase")]
    WindowTooShort {
        window: TimeWindow,
        duration_minutes: u32,
    },
    WindowOccupied { window: TimeWindow },
    #[serde(rename_all = "camelCase")]
    DailyCapExceeded { max_sessions_per_day: usize },
}

impl fmt::Display for ConflictReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoAvailability => write!(f, "No availability declared for this weekday"),
            Self::WindowTooShort {
                window,
                duration_minutes,
            } => write!(f, "Session duration ({duration_minutes}min) exceeds slot {window}"),
            Self::WindowOccupied { window } => {
                write!(f, "Overlap with existing session in {window}")
            }
            Self::DailyCapExceeded {
                max_sessions_per_day,
            } => write!(
                f,
                "Dropped by daily cap of {max_sessions_per_day} sessions"
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnresolvedConflict {
    pub session_id: String,
    pub topic_id: String,
    pub subject: String,
    pub topic: String,
    #[serde(rename = "sessionType")]
    pub kind: SessionKind,
    pub duration_minutes: u32,
    pub target_date: NaiveDate,
    pub weekday: String,
    pub reasons: Vec<ConflictReason>,
    pub message: String,
}

impl UnresolvedConflict {
    pub fn new(request: &SessionRequest, reasons: Vec<ConflictReason>) -> Self {
        let weekday = weekday_name(request.target_date.weekday()).to_string();
        let rendered = reasons
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            session_id: request.id.clone(),
            topic_id: request.topic_id.clone(),
            subject: request.subject.clone(),
            topic: request.topic.clone(),
            kind: request.kind,
            duration_minutes: request.duration_minutes,
            target_date: request.target_date,
            message: format!(
                "Cannot schedule {} - {} on {} {}: {}",
                request.subject, request.topic, weekday, request.target_date, rendered
            ),
            weekday,
            reasons,
        }
    }
}

// ==================== Balancing & Breaks ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimizedSession {
    #[serde(flatten)]
    pub resolved: ResolvedSession,
    pub cognitive_load: u8,
    /// 1-based position in the day's balanced sequence
    pub day_position: usize,
    pub optimization_reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Short,
    Meal,
    Long,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalSession {
    #[serde(flatten)]
    pub session: OptimizedSession,
    pub has_break_after: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_duration_minutes: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_kind: Option<BreakKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub break_reason: Option<String>,
}

impl FinalSession {
    pub fn id(&self) -> &str {
        &self.session.resolved.request.id
    }

    pub fn request(&self) -> &SessionRequest {
        &self.session.resolved.request
    }

    pub fn resolved(&self) -> &ResolvedSession {
        &self.session.resolved
    }

    pub fn subject(&self) -> &str {
        &self.session.resolved.request.subject
    }

    pub fn kind(&self) -> SessionKind {
        self.session.resolved.request.kind
    }

    pub fn start_time(&self) -> DateTime<FixedOffset> {
        self.session.resolved.start_time
    }

    pub fn end_time(&self) -> DateTime<FixedOffset> {
        self.session.resolved.end_time
    }

    pub fn date(&self) -> NaiveDate {
        self.session.resolved.date()
    }

    pub fn cognitive_load(&self) -> u8 {
        self.session.cognitive_load
    }
}

// ==================== Output ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ScheduleWarning {
    /// ExhaustedScheduleSpan: reported, never fatal
    #[serde(rename_all = "camelCase")]
    SpanExceedsCeiling { span_days: u32, ceiling_days: u32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleSummary {
    pub total_sessions: usize,
    pub requested_sessions: usize,
    pub unresolved_sessions: usize,
    pub total_study_minutes: i64,
    pub total_break_minutes: i64,
    pub break_count: usize,
    pub subject_balance: std::collections::BTreeMap<String, usize>,
    pub daily_load: std::collections::BTreeMap<String, u32>,
    pub cognitive_variety: f64,
    pub schedule_span_days: u32,
    #[serde(default)]
    pub warnings: Vec<ScheduleWarning>,
}

/// Terminal output of a scheduling run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Schedule {
    pub sessions: Vec<FinalSession>,
    pub unresolved: Vec<UnresolvedConflict>,
    pub summary: ScheduleSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_serde_uses_clock_strings() {
        let window = TimeWindow::parse("16:00", "18:30").unwrap();
        let json = serde_json::to_string(&window).unwrap();
        assert_eq!(json, r#"{"start":"16:00","end":"18:30"}"#);

        let parsed: TimeWindow = serde_json::from_str(r#"{"start":"9:05","end":"10:00"}"#).unwrap();
        assert_eq!(parsed.start_minute(), 9 * 60 + 5);
        assert_eq!(parsed.length_minutes(), 55);
    }

    #[test]
    fn test_availability_defaults() {
        let availability: WeeklyAvailability =
            serde_json::from_str(r#"{"monday":[{"start":"16:00","end":"18:00"}]}"#).unwrap();
        assert_eq!(availability.monday.len(), 1);
        assert!(availability.sunday.is_empty());
        assert_eq!(availability.school_hours.to_string(), "08:30-15:30");
    }

    #[test]
    fn test_preferences_defaults() {
        let prefs: Preferences = serde_json::from_str("{}").unwrap();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.offset().local_minus_utc(), 0);
    }

    #[test]
    fn test_session_kind_wire_names() {
        assert_eq!(
            serde_json::to_string(&SessionKind::NewLearning).unwrap(),
            "\"new-learning\""
        );
        assert_eq!(
            serde_json::to_string(&SessionKind::PracticeTest).unwrap(),
            "\"practice-test\""
        );
        assert!(SessionKind::NewLearning.priority_bonus() > SessionKind::PracticeTest.priority_bonus());
        assert!(SessionKind::PracticeTest.priority_bonus() > SessionKind::Revision.priority_bonus());
    }

    #[test]
    fn test_school_hours_policy_parse() {
        assert_eq!(SchoolHoursPolicy::parse(" Block "), Some(SchoolHoursPolicy::Block));
        assert_eq!(SchoolHoursPolicy::parse("annotate"), Some(SchoolHoursPolicy::Annotate));
        assert_eq!(SchoolHoursPolicy::parse("maybe"), None);
    }
}
