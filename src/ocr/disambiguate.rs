//! Pick the on-screen row that holds a multi-word query.
//!
//! OCR often reports the same literal word in several unrelated places. A
//! match therefore needs every query word, above the confidence threshold,
//! inside one block; when several blocks qualify the one with the highest
//! mean confidence wins.

use crate::locator::{LocatorError, LocatorResult, WordDetection, validate_confidence};
use std::collections::{BTreeMap, BTreeSet};

/// Convert a [0, 1] threshold to the integer OCR scale.
pub fn ocr_confidence(confidence: f32) -> i32 {
    ((confidence * 100.0).round() as i32).min(100)
}

/// Resolve `query` against one frame's detections.
pub fn resolve(
    detections: &[WordDetection],
    query: &str,
    confidence: f32,
) -> LocatorResult<Vec<WordDetection>> {
    Disambiguator::new(query, confidence)?.resolve(detections)
}

#[derive(Debug, Clone)]
pub struct Disambiguator {
    query: String,
    words: Vec<String>,
    confidence: f32,
    min_confidence: i32,
}

impl Disambiguator {
    /// Fails with a configuration error on an empty query or a threshold
    /// outside [0, 1].
    pub fn new(query: &str, confidence: f32) -> LocatorResult<Self> {
        let confidence = validate_confidence(confidence)?;
        let words: Vec<String> = query.split_whitespace().map(str::to_string).collect();
        if words.is_empty() {
            return Err(LocatorError::config("word query must contain at least one word"));
        }

        Ok(Self {
            query: query.to_string(),
            words,
            confidence,
            min_confidence: ocr_confidence(confidence),
        })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn min_confidence(&self) -> i32 {
        self.min_confidence
    }

    /// Select the detections of the best row containing every query word.
    ///
    /// The result keeps the input order. Fails with `ElementNotFound` when a
    /// word is missing at the required confidence or when no single block
    /// holds the whole phrase.
    pub fn resolve(&self, detections: &[WordDetection]) -> LocatorResult<Vec<WordDetection>> {
        let per_word = self.qualifying(detections);
        if per_word.len() < self.words.len() {
            log::info!(
                "only {}/{} words of '{}' found with confidence >= {}",
                per_word.len(),
                self.words.len(),
                self.query,
                self.min_confidence
            );
            return Err(self.not_found());
        }

        let rows = same_row_blocks(&per_word, detections);
        if rows.is_empty() {
            log::info!("no single row holds every word of '{}'", self.query);
            return Err(self.not_found());
        }

        let candidates: BTreeSet<usize> = per_word
            .values()
            .flatten()
            .copied()
            .filter(|&idx| rows.contains(&detections[idx].block_num))
            .collect();

        let block = if rows.len() == 1 {
            *rows.iter().next().ok_or_else(|| self.not_found())?
        } else {
            top_row(&rows, &candidates, detections).ok_or_else(|| self.not_found())?
        };

        let selected: Vec<WordDetection> = candidates
            .into_iter()
            .map(|idx| &detections[idx])
            .filter(|d| d.block_num == block)
            .cloned()
            .collect();
        log::info!("matched '{}' in block {}: {:?}", self.query, block, selected);
        Ok(selected)
    }

    /// Map each query word (by position) to the indices of detections that
    /// match it at or above the threshold. A detection matches a word when it
    /// is exactly that word or contains the whole trimmed query. Words
    /// without any qualifying detection are absent from the map.
    fn qualifying(&self, detections: &[WordDetection]) -> BTreeMap<usize, Vec<usize>> {
        let phrase = self.query.trim();
        let mut per_word: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, detection) in detections.iter().enumerate() {
            for (word_idx, word) in self.words.iter().enumerate() {
                if detection.text != *word && !detection.text.contains(phrase) {
                    continue;
                }
                if detection.confidence >= self.min_confidence {
                    per_word.entry(word_idx).or_default().push(idx);
                } else {
                    log::warn!(
                        "'{}' in block {} below confidence: actual {} expected {}",
                        detection.text,
                        detection.block_num,
                        detection.confidence,
                        self.min_confidence
                    );
                }
            }
        }
        per_word
    }

    fn not_found(&self) -> LocatorError {
        LocatorError::not_found(self.query.clone(), self.confidence)
    }
}

/// Blocks in which every query word has at least one qualifying detection.
fn same_row_blocks(per_word: &BTreeMap<usize, Vec<usize>>, detections: &[WordDetection]) -> BTreeSet<u32> {
    let mut lists = per_word.values();
    let Some(first) = lists.next() else {
        return BTreeSet::new();
    };

    let mut blocks: BTreeSet<u32> = first.iter().map(|&idx| detections[idx].block_num).collect();
    for list in lists {
        let other: BTreeSet<u32> = list.iter().map(|&idx| detections[idx].block_num).collect();
        blocks = blocks.intersection(&other).copied().collect();
    }
    blocks
}

/// Block with the strictly greatest mean confidence; ties go to the lowest block id.
fn top_row(rows: &BTreeSet<u32>, candidates: &BTreeSet<usize>, detections: &[WordDetection]) -> Option<u32> {
    let mut best: Option<(u32, f64)> = None;
    for &block in rows {
        let confidences: Vec<f64> = candidates
            .iter()
            .map(|&idx| &detections[idx])
            .filter(|d| d.block_num == block)
            .map(|d| d.confidence as f64)
            .collect();
        if confidences.is_empty() {
            continue;
        }
        let mean = confidences.iter().sum::<f64>() / confidences.len() as f64;
        log::debug!("block {} mean confidence {:.2}", block, mean);
        if best.is_none_or(|(_, best_mean)| mean > best_mean) {
            best = Some((block, mean));
        }
    }
    best.map(|(block, _)| block)
}
