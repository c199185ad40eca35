//! Slot Resolver
//!
//! Maps dated session requests onto concrete, conflict-free start/end times
//! inside the weekly availability.
//!
//! Policy:
//! - requests are processed in the order given (callers pass date, then
//!   duration ascending); order decides who wins when time is scarce
//! - windows are scanned in listed order; inside a window the earliest start
//!   that clears every occupied interval wins (first-fit, not best-fit)
//! - a placed session is registered immediately, so later requests on the
//!   same date see it
//! - a request no window can take becomes an `UnresolvedConflict` carrying one
//!   reason per window tried; the run continues

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, NaiveTime};

use crate::types::{
    weekday_name, ConflictReason, ResolvedSession, SchoolHoursPolicy, SessionRequest, TimeWindow,
    UnresolvedConflict, WeeklyAvailability, MINUTES_PER_DAY,
};

// ==================== Occupancy ====================

/// Occupied `[start, end)` minute intervals per calendar date, sorted by start
#[derive(Debug, Clone, Default)]
pub struct Occupancy {
    by_date: BTreeMap<NaiveDate, Vec<(u32, u32)>>,
}

impl Occupancy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn occupy(&mut self, date: NaiveDate, start: u32, end: u32) {
        let intervals = self.by_date.entry(date).or_default();
        let pos = intervals.partition_point(|&(s, _)| s <= start);
        intervals.insert(pos, (start, end));
    }

    pub fn intervals(&self, date: NaiveDate) -> &[(u32, u32)] {
        self.by_date.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FitFailure {
    /// The window is shorter than the session
    TooShort,
    /// Long enough, but every candidate start collides with something
    Occupied,
}

/// Earliest start inside `window`, at or after `not_before`, that clears every
/// interval in `busy` (sorted by start).
pub fn earliest_start(
    busy: &[(u32, u32)],
    window: &TimeWindow,
    duration: u32,
    not_before: u32,
) -> Result<u32, FitFailure> {
    if window.length_minutes() < duration {
        return Err(FitFailure::TooShort);
    }

    let mut candidate = window.start_minute().max(not_before);
    for &(start, end) in busy {
        if end <= candidate {
            continue;
        }
        if start >= candidate + duration {
            break;
        }
        candidate = end;
    }

    if candidate + duration <= window.end_minute() {
        Ok(candidate)
    } else {
        Err(FitFailure::Occupied)
    }
}

/// Absolute timestamp for a local minute-of-day on `date`.
pub fn to_absolute(date: NaiveDate, minute: u32, offset: FixedOffset) -> DateTime<FixedOffset> {
    let local = date.and_time(NaiveTime::default()) + Duration::minutes(i64::from(minute));
    let utc = local - Duration::seconds(i64::from(offset.local_minus_utc()));
    DateTime::from_naive_utc_and_offset(utc, offset)
}

// ==================== Resolver ====================

#[derive(Debug, Clone, Default)]
pub struct Resolution {
    pub resolved: Vec<ResolvedSession>,
    pub unresolved: Vec<UnresolvedConflict>,
}

pub struct SlotResolver<'a> {
    availability: &'a WeeklyAvailability,
    offset: FixedOffset,
    policy: SchoolHoursPolicy,
    occupancy: Occupancy,
}

impl<'a> SlotResolver<'a> {
    pub fn new(
        availability: &'a WeeklyAvailability,
        offset: FixedOffset,
        policy: SchoolHoursPolicy,
    ) -> Self {
        Self {
            availability,
            offset,
            policy,
            occupancy: Occupancy::new(),
        }
    }

    /// Registers already-placed sessions as fixed occupied intervals.
    pub fn with_fixed<'s, I>(mut self, sessions: I) -> Self
    where
        I: IntoIterator<Item = &'s ResolvedSession>,
    {
        for session in sessions {
            self.occupancy
                .occupy(session.date(), session.start_minute(), session.end_minute());
        }
        self
    }

    fn busy(&self, date: NaiveDate) -> Vec<(u32, u32)> {
        let mut busy = self.occupancy.intervals(date).to_vec();
        if self.policy == SchoolHoursPolicy::Block {
            let school = self.availability.school_hours;
            let pos = busy.partition_point(|&(s, _)| s <= school.start_minute());
            busy.insert(pos, (school.start_minute(), school.end_minute()));
        }
        busy
    }

    pub fn resolve(&mut self, request: SessionRequest) -> Result<ResolvedSession, UnresolvedConflict> {
        self.resolve_after(request, 0)
    }

    /// First-fit placement on the request's target date, never starting
    /// before `not_before` (minute of day).
    pub fn resolve_after(
        &mut self,
        request: SessionRequest,
        not_before: u32,
    ) -> Result<ResolvedSession, UnresolvedConflict> {
        let date = request.target_date;
        let windows = self.availability.windows_on(date);
        if windows.is_empty() {
            return Err(UnresolvedConflict::new(
                &request,
                vec![ConflictReason::NoAvailability],
            ));
        }

        let busy = self.busy(date);
        let mut reasons = Vec::new();
        for window in windows {
            match earliest_start(&busy, window, request.duration_minutes, not_before) {
                Ok(start) => {
                    let end = start + request.duration_minutes;
                    let notes = reasons.iter().map(ToString::to_string).collect();
                    return Ok(self.commit(request, *window, start, end, notes));
                }
                Err(FitFailure::TooShort) => reasons.push(ConflictReason::WindowTooShort {
                    window: *window,
                    duration_minutes: request.duration_minutes,
                }),
                Err(FitFailure::Occupied) => {
                    reasons.push(ConflictReason::WindowOccupied { window: *window })
                }
            }
        }

        Err(UnresolvedConflict::new(&request, reasons))
    }

    /// Places the request at an exact start minute on its target date.
    pub fn place_at(
        &mut self,
        request: SessionRequest,
        start: u32,
    ) -> Result<ResolvedSession, String> {
        let date = request.target_date;
        let end = match start.checked_add(request.duration_minutes) {
            Some(end) if end <= MINUTES_PER_DAY => end,
            _ => return Err("session would run past midnight".to_string()),
        };

        let Some(window) = self.availability.window_containing(date, start, end) else {
            return Err(format!(
                "no {} availability window contains the requested time",
                weekday_name(date.weekday())
            ));
        };

        let free = self
            .busy(date)
            .iter()
            .all(|&(s, e)| !(start < e && end > s));
        if !free {
            return Err("requested time overlaps another session".to_string());
        }

        Ok(self.commit(request, window, start, end, Vec::new()))
    }

    fn commit(
        &mut self,
        request: SessionRequest,
        window: TimeWindow,
        start: u32,
        end: u32,
        mut conflicts: Vec<String>,
    ) -> ResolvedSession {
        let date = request.target_date;

        let school = self.availability.school_hours;
        if self.policy == SchoolHoursPolicy::Annotate && school.overlaps(start, end) {
            conflicts.push(format!("Overlaps school hours {school}"));
        }

        self.occupancy.occupy(date, start, end);
        tracing::trace!(session = %request.id, %date, %window, start, "session placed");

        ResolvedSession {
            start_time: to_absolute(date, start, self.offset),
            end_time: to_absolute(date, end, self.offset),
            conflicts,
            window,
            request,
        }
    }

    /// Resolves every request in order and returns the full partition.
    pub fn resolve_all(mut self, requests: Vec<SessionRequest>) -> Resolution {
        let mut resolution = Resolution::default();
        for request in requests {
            match self.resolve(request) {
                Ok(session) => resolution.resolved.push(session),
                Err(conflict) => resolution.unresolved.push(conflict),
            }
        }
        resolution
    }
}
