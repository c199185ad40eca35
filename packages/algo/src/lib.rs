//! # studyplan-algo - study timetable scheduling core
//!
//! Deterministic study-session scheduling pipeline:
//!
//! - **Topic Analyzer** - difficulty (1-5) and required hours per topic
//! - **Repetition Planner** - spaced-repetition cycles with difficulty-adjusted offsets
//! - **Slot Resolver** - first-fit placement into weekly availability windows
//! - **Load Balancer** - daily cap pruning and hard/easy interleaving
//! - **Break Inserter** - short, meal and long breaks between sessions
//!
//! ## Design
//!
//! - **Pure** - no clock reads, no I/O, identical inputs give identical output
//! - **Lossless** - every requested session ends up either placed or unresolved
//! - **Incremental** - structured edits re-run placement against fixed sessions
//!
//! ## Modules
//!
//! - [`analyzer`] - subject table lookup, keyword bump, hours estimate
//! - [`repetition`] - revision cycles and dated session requests
//! - [`resolver`] - occupancy model and first-fit slot search
//! - [`balancer`] - daily cap, interleaving, distribution metrics
//! - [`breaks`] - break classification and totals
//! - [`pipeline`] - end-to-end run and summary
//! - [`edits`] - reschedule / extend / shorten / split / cancel / duplicate
//! - [`sanitize`] - input validation
//! - [`types`] - shared types and constants
//!
//! ## Example
//!
//! ```rust
//! use chrono::NaiveDate;
//! use studyplan_algo::{generate_schedule, PipelineOptions, Preferences, ScheduleRequest, TimeWindow, Topic, WeeklyAvailability};
//!
//! let mut availability = WeeklyAvailability::default();
//! availability.monday.push(TimeWindow::parse("16:00", "20:00").unwrap());
//!
//! let request = ScheduleRequest {
//!     topics: vec![Topic::new("maths-1", "Mathematics", "Quadratics")],
//!     availability,
//!     preferences: Preferences {
//!         schedule_start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
//!         ..Preferences::default()
//!     },
//!     existing_sessions: Vec::new(),
//! };
//!
//! let schedule = generate_schedule(&request, &PipelineOptions::default()).unwrap();
//! assert_eq!(
//!     schedule.sessions.len() + schedule.unresolved.len(),
//!     schedule.summary.requested_sessions
//! );
//! ```

// ============================================================================
// 模块声明
// ============================================================================

pub mod error;
pub mod types;
pub mod sanitize;
pub mod analyzer;
pub mod repetition;
pub mod resolver;
pub mod balancer;
pub mod breaks;
pub mod pipeline;
pub mod edits;

// ============================================================================
// 重新导出
// ============================================================================

/// 重新导出所有公共类型
pub use types::*;

pub use error::{ScheduleError, ScheduleResult};

/// 重新导出流水线入口
pub use pipeline::{generate_schedule, plan_study, StudyPlan};

/// 重新导出结构化编辑接口
pub use edits::{apply_edits, AdjustmentOutcome, EditAction, EditRejection, SessionEdit};

pub use analyzer::{analyze_topic, analyze_topics};
pub use repetition::{expand_requests, plan_cycle, plan_cycles};
pub use resolver::{Resolution, SlotResolver};
pub use balancer::balance;
pub use breaks::insert_breaks;
