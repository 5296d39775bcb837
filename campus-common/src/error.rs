//! Error types and utilities for the campus-route toolkit
//!
//! Provides the shared error type and fuzzy matching for location names typed
//! by users ("libary" → "Library").

use strsim::{jaro_winkler, normalized_levenshtein};
use thiserror::Error;

/// Find the best fuzzy match using hybrid semantic + character-based scoring
///
/// Combines character-based similarity (Jaro-Winkler 70% + Normalized Levenshtein 30%)
/// with semantic bonuses:
/// - Prefix matching: 20% bonus for strong prefix similarity (≥4 chars)
/// - Word matching: 12% bonus when the input matches one word of a
///   multi-word name ("stadium" → "East Stadium")
/// - Length similarity: 10% bonus for appropriate length matches
/// - Anti-bias penalty: -10% for inappropriate short matches
///
/// Minimum threshold: 0.65 similarity to balance precision vs recall
fn find_best_fuzzy_match(input: &str, candidates: &[String]) -> Option<String> {
    if candidates.is_empty() {
        return None;
    }

    let input_lower = input.trim().to_lowercase();
    let mut best_match = None;
    let mut best_score = 0.0f64;

    // 0.65 keeps "totally-invalid-place" unmatched while still catching
    // dropped letters such as "gymnasum".
    let min_threshold = 0.65;

    for candidate in candidates {
        let candidate_lower = candidate.to_lowercase();

        let jw_score = jaro_winkler(&input_lower, &candidate_lower);
        let lev_score = normalized_levenshtein(&input_lower, &candidate_lower);
        let combined_score = (jw_score * 0.7) + (lev_score * 0.3);

        let mut semantic_bonus = 0.0;

        // Prefix bonus (+20% max)
        let prefix_len = input_lower.chars().count().min(7);
        if prefix_len >= 4 {
            let input_prefix = input_lower.chars().take(prefix_len).collect::<String>();
            let candidate_prefix = candidate_lower.chars().take(prefix_len).collect::<String>();

            let prefix_similarity = normalized_levenshtein(&input_prefix, &candidate_prefix);
            if prefix_similarity > 0.7 {
                semantic_bonus += 0.2 * prefix_similarity;
            }
        }

        // Length bonus (+10% max)
        if input_lower.len() >= 8 && candidate_lower.len() >= 8 {
            let length_ratio = 1.0
                - ((input_lower.len() as f64 - candidate_lower.len() as f64).abs()
                    / input_lower.len().max(candidate_lower.len()) as f64);
            if length_ratio > 0.7 {
                semantic_bonus += 0.1 * length_ratio;
            }
        }

        // Word bonus (+12% max per word): only the strongest word counts so
        // long names do not win on word count alone.
        if candidate_lower.contains(' ') {
            let best_word = candidate_lower
                .split_whitespace()
                .filter(|word| word.len() >= 4)
                .map(|word| jaro_winkler(&input_lower, word))
                .fold(0.0f64, f64::max);
            if best_word > 0.85 {
                semantic_bonus += 0.12 * best_word;
            }
        }

        // Anti-bias penalty (-10%)
        if input_lower.len() >= 8 && candidate_lower.len() <= 7 && !candidate_lower.contains(' ') {
            semantic_bonus -= 0.1;
        }

        let final_score = combined_score + semantic_bonus;

        if final_score >= min_threshold && final_score > best_score {
            best_score = final_score;
            best_match = Some(candidate.clone());
        }
    }

    best_match
}

/// Suggest a correction for a potentially misspelled location name
///
/// Returns `None` when the input already names a candidate (ignoring case)
/// or when nothing is close enough.
pub fn suggest_correction(input: &str, candidates: &[String]) -> Option<String> {
    if candidates
        .iter()
        .any(|candidate| candidate.eq_ignore_ascii_case(input.trim()))
    {
        return None;
    }

    find_best_fuzzy_match(input, candidates)
}

fn suggestion_hint(suggestion: &Option<String>) -> String {
    match suggestion {
        Some(name) => format!(" (did you mean '{name}'?)"),
        None => String::new(),
    }
}

/// Main error type for location lookups and dataset handling
#[derive(Debug, Error)]
pub enum Error {
    /// Location query did not match any known location
    #[error("Location '{query}' not found{}", suggestion_hint(.suggestion))]
    LocationNotFound {
        query: String,
        suggestion: Option<String>,
    },

    /// Dataset could not be parsed or violates its own constraints
    #[error("Invalid dataset: {0}")]
    InvalidDataset(String),

    /// Invalid configuration or parameters
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `LocationNotFound` error, attaching the closest known name.
    pub fn location_not_found(query: &str, known_names: &[String]) -> Self {
        Error::LocationNotFound {
            query: query.to_string(),
            suggestion: suggest_correction(query, known_names),
        }
    }
}

/// Convenience result type for campus-route operations
pub type Result<T> = std::result::Result<T, Error>;
