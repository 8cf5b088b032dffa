//! Combined-rank blending of stored and engine relevance.
//!
//! Each hit carries two signals: an optional stored editorial rank
//! (`documents.fts_rank`) and the engine's BM25-derived rank. The blend is a
//! weighted sum; the 0.7/0.3 split is a heuristic carried over from the
//! original system, so the weights live in configuration rather than in the
//! formula.

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Stored/engine weight pair for combined-rank blending.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlendWeights {
    /// Weight for the stored editorial rank.
    pub stored: f64,
    /// Weight for the engine (BM25) rank.
    pub engine: f64,
}

impl Default for BlendWeights {
    fn default() -> Self {
        Self {
            stored: defaults::STORED_RANK_WEIGHT,
            engine: defaults::ENGINE_RANK_WEIGHT,
        }
    }
}

impl BlendWeights {
    /// Create a custom weight pair.
    pub fn new(stored: f64, engine: f64) -> Self {
        Self { stored, engine }
    }

    /// Weights that ignore the stored rank entirely.
    pub fn engine_only() -> Self {
        Self {
            stored: 0.0,
            engine: 1.0,
        }
    }

    /// Blend a hit's ranks into its combined rank.
    ///
    /// A row without a stored rank scores on the engine rank alone at full
    /// weight, not `engine * self.engine` — otherwise unranked rows would be
    /// penalized merely for lacking editorial curation.
    pub fn combine(&self, stored: Option<f64>, engine: f64) -> f64 {
        match stored {
            Some(stored) => stored * self.stored + engine * self.engine,
            None => engine,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights() {
        let w = BlendWeights::default();
        assert_eq!(w.stored, 0.7);
        assert_eq!(w.engine, 0.3);
    }

    #[test]
    fn test_combine_with_stored_rank() {
        let w = BlendWeights::default();
        let combined = w.combine(Some(10.0), 2.0);
        assert!((combined - (10.0 * 0.7 + 2.0 * 0.3)).abs() < f64::EPSILON);
    }

    #[test]
    fn test_combine_without_stored_rank() {
        let w = BlendWeights::default();
        assert_eq!(w.combine(None, 2.0), 2.0);
    }

    #[test]
    fn test_engine_only() {
        let w = BlendWeights::engine_only();
        assert_eq!(w.combine(Some(100.0), 2.0), 2.0);
        assert_eq!(w.combine(None, 2.0), 2.0);
    }

    #[test]
    fn test_custom_weights() {
        let w = BlendWeights::new(0.5, 0.5);
        assert_eq!(w.combine(Some(4.0), 2.0), 3.0);
    }

    #[test]
    fn test_weights_serialization() {
        let w = BlendWeights::new(0.6, 0.4);
        let json = serde_json::to_string(&w).unwrap();
        let back: BlendWeights = serde_json::from_str(&json).unwrap();
        assert_eq!(back.stored, 0.6);
        assert_eq!(back.engine, 0.4);
    }
}
