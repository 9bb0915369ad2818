//! Composite zone scoring and ranking.
//!
//! User count, event count, and average quality are min-max normalized
//! across regions so no metric dominates through its unit scale, then
//! combined into a weighted mean.

use std::cmp::Ordering;

use location_insights_analytics_models::{RegionSummary, ScoreWeights, ZoneRanking, ZoneScore};

use crate::AnalyticsError;

/// Size of the recommended set when none is configured.
pub const DEFAULT_TOP_K: usize = 5;

/// Min-max normalizes `values` into `[0, 1]`.
///
/// A zero range (single value, or all equal) maps every entry to `0.0`
/// rather than dividing by zero.
#[must_use]
pub fn normalize(values: &[f64]) -> Vec<f64> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let range = max - min;

    if !range.is_finite() || range <= 0.0 {
        return vec![0.0; values.len()];
    }

    values.iter().map(|v| (v - min) / range).collect()
}

fn validate_weights(weights: &ScoreWeights) -> Result<(), AnalyticsError> {
    for (name, value) in [
        ("users", weights.users),
        ("events", weights.events),
        ("quality", weights.quality),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(AnalyticsError::InvalidWeights {
                message: format!("{name} weight must be finite and non-negative, got {value}"),
            });
        }
    }
    let total = weights.total();
    if !total.is_finite() {
        return Err(AnalyticsError::InvalidWeights {
            message: format!("weights must have a finite sum, got {total}"),
        });
    }
    if total <= 0.0 {
        return Err(AnalyticsError::InvalidWeights {
            message: "at least one weight must be positive".to_string(),
        });
    }
    Ok(())
}

/// Ranks regions by a weighted combination of normalized metrics.
#[derive(Debug, Clone, Copy)]
pub struct ZoneScorer {
    weights: ScoreWeights,
    top_k: usize,
}

impl Default for ZoneScorer {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl ZoneScorer {
    /// # Errors
    ///
    /// * [`AnalyticsError::InvalidWeights`] if a weight is negative or not
    ///   finite, or all weights are zero
    /// * [`AnalyticsError::ZeroTopK`] if `top_k` is zero
    pub fn new(weights: ScoreWeights, top_k: usize) -> Result<Self, AnalyticsError> {
        validate_weights(&weights)?;
        if top_k == 0 {
            return Err(AnalyticsError::ZeroTopK);
        }
        Ok(Self { weights, top_k })
    }

    #[must_use]
    pub const fn weights(&self) -> ScoreWeights {
        self.weights
    }

    #[must_use]
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Scores and ranks every region in `summaries`.
    ///
    /// Ranking is descending by combined score with ties broken by region
    /// name ascending, independent of input order. Regions without users
    /// count as zero average quality.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn rank(&self, summaries: &[RegionSummary]) -> ZoneRanking {
        let users = normalize(
            &summaries
                .iter()
                .map(|s| s.user_count as f64)
                .collect::<Vec<_>>(),
        );
        let events = normalize(
            &summaries
                .iter()
                .map(|s| s.event_count as f64)
                .collect::<Vec<_>>(),
        );
        let quality = normalize(
            &summaries
                .iter()
                .map(RegionSummary::avg_quality_or_zero)
                .collect::<Vec<_>>(),
        );

        let w = self.weights;
        let total = w.total();

        let mut ranked: Vec<ZoneScore> = summaries
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let combined = (w.users * users[i] + w.events * events[i] + w.quality * quality[i])
                    / total;
                ZoneScore {
                    rank: 0,
                    region: s.region,
                    name: s.name.clone(),
                    user_count: s.user_count,
                    event_count: s.event_count,
                    avg_quality: s.avg_quality,
                    normalized_user_score: users[i],
                    normalized_event_score: events[i],
                    normalized_quality_score: quality[i],
                    combined_score: combined,
                }
            })
            .collect();

        ranked.sort_by(|a, b| match b.combined_score.total_cmp(&a.combined_score) {
            Ordering::Equal => a.name.cmp(&b.name),
            other => other,
        });
        for (i, score) in ranked.iter_mut().enumerate() {
            score.rank = i + 1;
        }

        if let Some(best) = ranked.first() {
            log::info!(
                "Ranked {} zones; best is {} ({:.3})",
                ranked.len(),
                best.name,
                best.combined_score
            );
        }

        ZoneRanking {
            weights: self.weights,
            top_k: self.top_k,
            ranked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{fixtures, regional};
    use location_insights_population_models::RegionId;

    fn summary(
        index: u32,
        name: &str,
        users: u64,
        events: u64,
        quality: Option<f64>,
    ) -> RegionSummary {
        RegionSummary {
            region: RegionId(index),
            name: name.to_string(),
            user_count: users,
            avg_quality: quality,
            event_count: events,
            mean_lat: None,
            mean_lon: None,
        }
    }

    #[test]
    fn normalize_spans_unit_interval() {
        let normalized = normalize(&[2.0, 4.0, 6.0]);
        assert_eq!(normalized, vec![0.0, 0.5, 1.0]);
    }

    #[test]
    fn normalize_zero_range_is_neutral() {
        assert_eq!(normalize(&[3.0, 3.0]), vec![0.0, 0.0]);
        assert_eq!(normalize(&[7.0]), vec![0.0]);
        assert!(normalize(&[]).is_empty());
    }

    #[test]
    fn dominant_region_ranks_first() {
        let scorer = ZoneScorer::default();
        let ranking = scorer.rank(&[
            summary(0, "B", 5, 20, Some(0.3)),
            summary(1, "A", 10, 80, Some(0.7)),
        ]);

        assert_eq!(ranking.ranked[0].name, "A");
        assert!(ranking.ranked[0].combined_score >= ranking.ranked[1].combined_score);
        assert!((ranking.ranked[0].combined_score - 1.0).abs() < 1e-12);
        assert!(ranking.ranked[1].combined_score.abs() < 1e-12);
        assert_eq!(ranking.ranked[0].rank, 1);
        assert_eq!(ranking.ranked[1].rank, 2);
    }

    #[test]
    fn single_region_scores_without_nan() {
        let ranking = ZoneScorer::default().rank(&[summary(0, "Solo", 3, 0, Some(0.5))]);
        let score = &ranking.ranked[0];
        assert!(score.combined_score.is_finite());
        assert!(score.normalized_user_score.abs() < f64::EPSILON);
        assert!(score.normalized_event_score.abs() < f64::EPSILON);
        assert!(score.normalized_quality_score.abs() < f64::EPSILON);
        assert!(!ranking.is_complete());
        assert_eq!(ranking.top().len(), 1);
    }

    #[test]
    fn region_without_users_or_events_is_finite() {
        let ranking = ZoneScorer::default().rank(&[
            summary(0, "Busy", 10, 50, Some(0.8)),
            summary(1, "Empty", 0, 0, None),
        ]);
        assert!(ranking.ranked.iter().all(|s| s.combined_score.is_finite()));
        assert_eq!(ranking.ranked[1].name, "Empty");
        assert!(ranking.ranked[1].combined_score.abs() < f64::EPSILON);
    }

    #[test]
    fn ties_break_by_name_regardless_of_input_order() {
        let forward = ZoneScorer::default().rank(&[
            summary(0, "Gamma", 4, 4, Some(0.5)),
            summary(1, "Alpha", 4, 4, Some(0.5)),
            summary(2, "Beta", 4, 4, Some(0.5)),
        ]);
        let names: Vec<&str> = forward.ranked.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Gamma"]);

        let reversed = ZoneScorer::default().rank(&[
            summary(2, "Beta", 4, 4, Some(0.5)),
            summary(1, "Alpha", 4, 4, Some(0.5)),
            summary(0, "Gamma", 4, 4, Some(0.5)),
        ]);
        assert_eq!(forward, reversed);
    }

    #[test]
    fn weights_shift_the_ranking() {
        let summaries = [
            summary(0, "Crowded", 100, 100, Some(0.1)),
            summary(1, "Premium", 10, 10, Some(0.9)),
        ];
        let quality_only = ZoneScorer::new(
            ScoreWeights {
                users: 0.0,
                events: 0.0,
                quality: 1.0,
            },
            1,
        )
        .unwrap();
        let ranking = quality_only.rank(&summaries);
        assert_eq!(ranking.top().len(), 1);
        assert_eq!(ranking.top()[0].name, "Premium");

        let ranking = ZoneScorer::default().rank(&summaries);
        assert_eq!(ranking.top()[0].name, "Crowded");
    }

    #[test]
    fn combined_score_stays_in_unit_interval() {
        let scorer = ZoneScorer::new(
            ScoreWeights {
                users: 0.4,
                events: 0.4,
                quality: 0.2,
            },
            DEFAULT_TOP_K,
        )
        .unwrap();
        let users = fixtures::users();
        let summaries =
            regional::summarize_regions(&fixtures::registry(), &users, &fixtures::events(&users))
                .unwrap();
        let ranking = scorer.rank(&summaries);

        assert_eq!(ranking.ranked.len(), 3);
        assert!(
            ranking
                .ranked
                .iter()
                .all(|s| (0.0..=1.0).contains(&s.combined_score))
        );
    }

    #[test]
    fn invalid_weights_and_top_k_rejected() {
        let negative = ScoreWeights {
            users: -1.0,
            ..ScoreWeights::default()
        };
        assert!(matches!(
            ZoneScorer::new(negative, 5),
            Err(AnalyticsError::InvalidWeights { .. })
        ));

        let zero = ScoreWeights {
            users: 0.0,
            events: 0.0,
            quality: 0.0,
        };
        assert!(matches!(
            ZoneScorer::new(zero, 5),
            Err(AnalyticsError::InvalidWeights { .. })
        ));

        let nan = ScoreWeights {
            events: f64::NAN,
            ..ScoreWeights::default()
        };
        assert!(ZoneScorer::new(nan, 5).is_err());

        let overflowing = ScoreWeights {
            users: 1e308,
            events: 1e308,
            quality: 0.0,
        };
        assert!(matches!(
            ZoneScorer::new(overflowing, 5),
            Err(AnalyticsError::InvalidWeights { .. })
        ));

        assert!(matches!(
            ZoneScorer::new(ScoreWeights::default(), 0),
            Err(AnalyticsError::ZeroTopK)
        ));
    }
}
