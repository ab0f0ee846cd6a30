//! Prefetcher statistics collection and reporting.
//!
//! This module tracks what the GHB prefetcher did with each access. It provides:
//! 1. **Learning:** How often PC- and page-keyed delta sequences were available.
//! 2. **Prediction:** Which cascade stage produced each prediction.
//! 3. **Emission:** Candidates issued and dropped by the page or range filters.
//! 4. **Table:** Pattern table occupancy and refused rows.

use serde::Serialize;

use crate::prefetch::predictor::PredictionSource;

/// Prefetcher statistics.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PrefetchStats {
    /// Accesses observed.
    pub accesses: u64,
    /// Accesses with a non-empty PC-keyed delta sequence.
    pub pc_patterns: u64,
    /// Accesses with a non-empty page-keyed delta sequence.
    pub page_patterns: u64,

    /// Predictions produced by stride detection.
    pub stride_predictions: u64,
    /// Predictions produced by the pattern table.
    pub table_predictions: u64,
    /// Predictions produced by the frequency/recency fallback.
    pub fallback_predictions: u64,
    /// Accesses that produced no prediction.
    pub no_prediction: u64,

    /// Prefetch candidates emitted.
    pub candidates_issued: u64,
    /// Candidates dropped for crossing into another page.
    pub dropped_cross_page: u64,
    /// Candidates dropped because the address would leave the 64-bit range.
    pub dropped_overflow: u64,

    /// Pattern table rows currently held.
    pub pattern_rows: u64,
    /// Observations refused because the pattern table was full.
    pub pattern_rows_refused: u64,
}

impl PrefetchStats {
    /// Counts one prediction from `source`.
    pub fn record_source(&mut self, source: PredictionSource) {
        match source {
            PredictionSource::Stride => self.stride_predictions += 1,
            PredictionSource::Table => self.table_predictions += 1,
            PredictionSource::Fallback => self.fallback_predictions += 1,
        }
    }

    /// Total accesses that produced a prediction.
    pub fn predictions(&self) -> u64 {
        self.stride_predictions + self.table_predictions + self.fallback_predictions
    }

    /// Fraction of accesses that produced a prediction.
    pub fn prediction_rate(&self) -> f64 {
        if self.accesses == 0 {
            0.0
        } else {
            self.predictions() as f64 / self.accesses as f64
        }
    }

    /// Resets every counter to zero.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Prints selected sections to stdout.
    ///
    /// Sections: `summary`, `sources`, `emission`, `table`. An empty slice
    /// prints everything.
    pub fn print_sections(&self, sections: &[String]) {
        let want = |s: &str| sections.is_empty() || sections.iter().any(|x| x == s);
        let acc = self.accesses.max(1) as f64;

        if want("summary") {
            println!("\n==========================================================");
            println!("GHB PREFETCHER STATISTICS");
            println!("==========================================================");
            println!("accesses                 {}", self.accesses);
            println!("pc_patterns              {}", self.pc_patterns);
            println!("page_patterns            {}", self.page_patterns);
            println!("prediction_rate          {:.4}", self.prediction_rate());
            println!("----------------------------------------------------------");
        }
        if want("sources") {
            println!("PREDICTION SOURCES");
            println!(
                "  source.stride          {} ({:.2}%)",
                self.stride_predictions,
                self.stride_predictions as f64 / acc * 100.0
            );
            println!(
                "  source.table           {} ({:.2}%)",
                self.table_predictions,
                self.table_predictions as f64 / acc * 100.0
            );
            println!(
                "  source.fallback        {} ({:.2}%)",
                self.fallback_predictions,
                self.fallback_predictions as f64 / acc * 100.0
            );
            println!(
                "  source.none            {} ({:.2}%)",
                self.no_prediction,
                self.no_prediction as f64 / acc * 100.0
            );
            println!("----------------------------------------------------------");
        }
        if want("emission") {
            println!("EMISSION");
            println!("  candidates.issued      {}", self.candidates_issued);
            println!("  dropped.cross_page     {}", self.dropped_cross_page);
            println!("  dropped.overflow       {}", self.dropped_overflow);
            println!("----------------------------------------------------------");
        }
        if want("table") {
            println!("PATTERN TABLE");
            println!("  rows                   {}", self.pattern_rows);
            println!("  rows.refused           {}", self.pattern_rows_refused);
            println!("==========================================================");
        }
    }

    /// Prints every section.
    pub fn print(&self) {
        self.print_sections(&[]);
    }
}
