//! Input Validation
//!
//! Every check here runs before the first pipeline stage. A failure aborts the
//! whole run with a single `ScheduleError`; nothing is partially computed.
//!
//! Functions:
//! - Clock string parsing
//! - Topic list validation
//! - Availability validation (window order, overlap, school hours)
//! - Preference range checks

use std::collections::HashSet;

use chrono::NaiveTime;

use crate::error::{ScheduleError, ScheduleResult};
use crate::types::{
    weekday_name, Preferences, ScheduleRequest, Topic, WeeklyAvailability, MAX_DIFFICULTY,
    MIN_DIFFICULTY,
};

pub const SESSION_LENGTH_RANGE: (i64, i64) = (15, 120);
pub const BREAK_LENGTH_RANGE: (i64, i64) = (5, 30);
pub const MAX_SESSIONS_RANGE: (i64, i64) = (1, 10);
pub const UTC_OFFSET_RANGE: (i64, i64) = (-720, 840);

/// 解析 `H:MM` / `HH:MM` 24 小时制时间
pub fn parse_clock(raw: &str) -> ScheduleResult<NaiveTime> {
    let invalid = || ScheduleError::InvalidClockTime(raw.to_string());
    let (hours, minutes) = raw.trim().split_once(':').ok_or_else(invalid)?;

    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    if !all_digits(hours) || hours.len() > 2 || !all_digits(minutes) || minutes.len() != 2 {
        return Err(invalid());
    }

    let hours: u32 = hours.parse().map_err(|_| invalid())?;
    let minutes: u32 = minutes.parse().map_err(|_| invalid())?;
    if hours > 23 || minutes > 59 {
        return Err(invalid());
    }

    NaiveTime::from_hms_opt(hours, minutes, 0).ok_or_else(invalid)
}

pub fn validate_topics(topics: &[Topic]) -> ScheduleResult<()> {
    if topics.is_empty() {
        return Err(ScheduleError::EmptyTopics);
    }

    let mut seen = HashSet::with_capacity(topics.len());
    for topic in topics {
        let invalid = |reason: &str| ScheduleError::InvalidTopic {
            id: topic.id.clone(),
            reason: reason.to_string(),
        };

        if topic.id.trim().is_empty() {
            return Err(invalid("id must not be blank"));
        }
        if topic.subject.trim().is_empty() {
            return Err(invalid("subject must not be blank"));
        }
        if topic.name.trim().is_empty() {
            return Err(invalid("name must not be blank"));
        }
        if let Some(difficulty) = topic.difficulty {
            if !(MIN_DIFFICULTY..=MAX_DIFFICULTY).contains(&difficulty) {
                return Err(invalid(&format!(
                    "difficulty must be between {MIN_DIFFICULTY} and {MAX_DIFFICULTY}, got {difficulty}"
                )));
            }
        }
        if !seen.insert(topic.id.as_str()) {
            return Err(ScheduleError::DuplicateTopicId(topic.id.clone()));
        }
    }

    Ok(())
}

pub fn validate_availability(availability: &WeeklyAvailability) -> ScheduleResult<()> {
    if !availability.school_hours.is_valid() {
        return Err(ScheduleError::InvalidSchoolHours(
            availability.school_hours.to_string(),
        ));
    }

    for (day, windows) in availability.all_days() {
        let day_name = weekday_name(day).to_string();

        for window in windows {
            if !window.is_valid() {
                return Err(ScheduleError::InvalidWindow {
                    day: day_name,
                    window: window.to_string(),
                });
            }
        }

        // Windows may be listed in any order; overlap is checked pairwise.
        for (i, first) in windows.iter().enumerate() {
            for second in &windows[i + 1..] {
                if first.overlaps(second.start_minute(), second.end_minute()) {
                    return Err(ScheduleError::OverlappingWindows {
                        day: day_name,
                        first: first.to_string(),
                        second: second.to_string(),
                    });
                }
            }
        }
    }

    Ok(())
}

fn check_range(field: &'static str, value: i64, (min, max): (i64, i64)) -> ScheduleResult<()> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ScheduleError::PreferenceOutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

pub fn validate_preferences(preferences: &Preferences) -> ScheduleResult<()> {
    check_range(
        "sessionLengthMinutes",
        i64::from(preferences.session_length_minutes),
        SESSION_LENGTH_RANGE,
    )?;
    check_range(
        "breakLengthMinutes",
        i64::from(preferences.break_length_minutes),
        BREAK_LENGTH_RANGE,
    )?;
    check_range(
        "maxSessionsPerDay",
        i64::try_from(preferences.max_sessions_per_day).unwrap_or(i64::MAX),
        MAX_SESSIONS_RANGE,
    )?;
    check_range(
        "utcOffsetMinutes",
        i64::from(preferences.utc_offset_minutes),
        UTC_OFFSET_RANGE,
    )?;
    Ok(())
}

pub fn validate_request(request: &ScheduleRequest) -> ScheduleResult<()> {
    validate_topics(&request.topics)?;
    validate_availability(&request.availability)?;
    validate_preferences(&request.preferences)?;
    if request.preferences.schedule_start_date.is_none() {
        return Err(ScheduleError::MissingStartDate);
    }
    Ok(())
}
