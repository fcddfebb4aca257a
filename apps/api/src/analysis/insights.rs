//! Local, LLM-free insights: a naive skill frequency table and statistics
//! over a session's match-percentage history.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;

pub const DEFAULT_TOP_SKILLS: usize = 15;

fn word_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\w{4,}").expect("word pattern is valid"))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkillFrequency {
    pub skill: String,
    pub frequency: u32,
}

/// Counts lowercase words of at least four word characters and returns the
/// `n` most frequent. Equal counts keep first-appearance order.
pub fn top_skills(text: &str, n: usize) -> Vec<SkillFrequency> {
    let lower = text.to_lowercase();
    // word -> (count, first position)
    let mut counts: HashMap<&str, (u32, usize)> = HashMap::new();

    for (position, m) in word_pattern().find_iter(&lower).enumerate() {
        counts
            .entry(m.as_str())
            .and_modify(|(count, _)| *count += 1)
            .or_insert((1, position));
    }

    let mut ranked: Vec<_> = counts.into_iter().collect();
    ranked.sort_by(|(_, (ca, pa)), (_, (cb, pb))| cb.cmp(ca).then(pa.cmp(pb)));

    ranked
        .into_iter()
        .take(n)
        .map(|(word, (frequency, _))| SkillFrequency {
            skill: word.to_string(),
            frequency,
        })
        .collect()
}

/// Append-only record of match percentages collected during one session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ScoreHistory(Vec<u8>);

impl ScoreHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Values above 100 are not percentages and are refused.
    pub fn push(&mut self, score: u8) -> bool {
        if score > 100 {
            return false;
        }
        self.0.push(score);
        true
    }

    pub fn scores(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `None` for an empty history.
    pub fn stats(&self) -> Option<ScoreStats> {
        if self.is_empty() {
            return None;
        }
        ScoreStats::from_scores(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreStats {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: u8,
    pub max: u8,
}

impl ScoreStats {
    pub fn from_scores(scores: &[u8]) -> Option<Self> {
        let min = *scores.iter().min()?;
        let max = *scores.iter().max()?;
        let count = scores.len();
        let n = count as f64;

        let mean = scores.iter().map(|&s| f64::from(s)).sum::<f64>() / n;
        let variance = scores
            .iter()
            .map(|&s| (f64::from(s) - mean).powi(2))
            .sum::<f64>()
            / n;

        let mut sorted = scores.to_vec();
        sorted.sort_unstable();
        let mid = count / 2;
        let median = if count % 2 == 0 {
            (f64::from(sorted[mid - 1]) + f64::from(sorted[mid])) / 2.0
        } else {
            f64::from(sorted[mid])
        };

        Some(Self {
            count,
            mean,
            median,
            std_dev: variance.sqrt(),
            min,
            max,
        })
    }
}
