//! Topic Analyzer
//!
//! Estimates per-topic difficulty (1-5) and required study hours from a fixed
//! subject table and a list of "complex" keywords.
//!
//! Rules:
//! - base difficulty comes from the subject table (3 when unknown)
//! - a caller-supplied difficulty replaces the table value
//! - a complex keyword in the topic name adds 1, capped at 5
//! - required hours = difficulty × 2 + a 0-2 hour variability term
//!
//! The variability term is drawn from a ChaCha RNG seeded with the SHA-256 of
//! the topic id, so identical inputs always give identical hours.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use sha2::{Digest, Sha256};

use crate::types::{SessionPattern, Topic, TopicAnalysis, MAX_DIFFICULTY, MIN_DIFFICULTY};

// ==================== Constants ====================

const DEFAULT_SUBJECT_DIFFICULTY: u8 = 3;

/// Upper bound (inclusive) of the per-topic hours variability
const MAX_HOURS_JITTER: u32 = 2;

/// Difficulty at or above which sessions are spread out
const DISTRIBUTED_THRESHOLD: u8 = 4;

const SUBJECT_DIFFICULTY: &[(&str, u8)] = &[
    ("Mathematics", 4),
    ("Science (Physics)", 4),
    ("Science (Chemistry)", 4),
    ("Science (Biology)", 3),
    ("English Literature", 3),
    ("English Language", 3),
    ("Computer Science", 4),
    ("History", 3),
    ("Geography", 3),
    ("French", 3),
    ("Spanish", 3),
    ("Art & Design", 2),
    ("Music", 2),
    ("PE", 2),
    ("Religious Studies", 2),
];

const COMPLEX_TOPIC_KEYWORDS: &[&str] = &[
    "calculus",
    "algebra",
    "trigonometry",
    "quantum",
    "organic chemistry",
    "genetics",
    "shakespeare",
    "poetry",
    "essay",
    "programming",
    "algorithms",
];

// ==================== Lookups ====================

pub fn subject_difficulty(subject: &str) -> u8 {
    SUBJECT_DIFFICULTY
        .iter()
        .find(|(name, _)| *name == subject)
        .map(|(_, difficulty)| *difficulty)
        .unwrap_or(DEFAULT_SUBJECT_DIFFICULTY)
}

pub fn is_complex_topic(name: &str) -> bool {
    let lowered = name.to_lowercase();
    COMPLEX_TOPIC_KEYWORDS
        .iter()
        .any(|keyword| lowered.contains(keyword))
}

/// 基于 topic id 的确定性扰动 (0..=2 小时)
pub fn hours_jitter(topic_id: &str) -> u32 {
    let seed: [u8; 32] = Sha256::digest(topic_id.as_bytes()).into();
    let mut rng = ChaCha8Rng::from_seed(seed);
    rng.gen_range(0..=MAX_HOURS_JITTER)
}

// ==================== Analysis ====================

pub fn analyze_topic(topic: &Topic) -> TopicAnalysis {
    let base_difficulty = subject_difficulty(&topic.subject);
    let complex = is_complex_topic(&topic.name);

    let mut estimated = topic
        .difficulty
        .unwrap_or(base_difficulty)
        .clamp(MIN_DIFFICULTY, MAX_DIFFICULTY);
    if complex {
        estimated = (estimated + 1).min(MAX_DIFFICULTY);
    }

    let required_hours = u32::from(estimated) * 2 + hours_jitter(&topic.id);
    let optimal_session_type = if estimated >= DISTRIBUTED_THRESHOLD {
        SessionPattern::Distributed
    } else {
        SessionPattern::Intensive
    };

    let reasoning = format!(
        "Based on {} complexity (base: {}) and topic analysis. {}Estimated {} hours needed across {} sessions.",
        topic.subject,
        base_difficulty,
        if complex {
            "Complex topic detected, increased difficulty. "
        } else {
            ""
        },
        required_hours,
        match optimal_session_type {
            SessionPattern::Distributed => "distributed",
            SessionPattern::Intensive => "intensive",
        },
    );

    TopicAnalysis {
        topic_id: topic.id.clone(),
        subject: topic.subject.clone(),
        topic_name: topic.name.clone(),
        base_difficulty,
        estimated_difficulty: estimated,
        required_hours,
        optimal_session_type,
        reasoning,
    }
}

/// Analyzes every topic in parallel; output order matches input order.
pub fn analyze_topics(topics: &[Topic]) -> Vec<TopicAnalysis> {
    topics.par_iter().map(analyze_topic).collect()
}
