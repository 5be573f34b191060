//! # Photographer Ranking Scorer
//!
//! Aggregated photographer performance: a normalized, weighted composite
//! score for ranking, plus the KPI block the photographer list and detail
//! views render.
//!
//! ## Scoring Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │               Ranking Pipeline                                          │
//! │                                                                         │
//! │  grouped sums per photographer (SQL GROUP BY, optional event filter)    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ratios:  download_rate = downloads / photos     (0 if photos = 0)      │
//! │           reach         = unique / downloads     (0 if downloads = 0)   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  normalize each of the four metrics by its maximum across the set       │
//! │  (0 if the maximum is 0)                                                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  score = mean of the ENABLED normalized components                      │
//! │  order by score desc, then name asc                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Only photographers present in at least one matching assignment row are
//! ranked; the grouped input makes that property structural.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::PhotographerAssignment;

// =============================================================================
// Inputs
// =============================================================================

/// Per-photographer sums over the assignment rows that matched the filter.
/// Produced by the collaborator's grouped query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AssignmentStats {
    pub photographer_id: i64,
    pub name: String,
    pub photos_taken: i64,
    pub downloads: i64,
    pub unique_downloads: i64,
}

/// Which of the four score components participate in the composite.
/// Every component defaults to enabled; disabling all of them yields a
/// score of 0 for everyone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RankingComponents {
    pub volume: bool,
    pub downloads: bool,
    pub efficiency: bool,
    pub reach: bool,
}

impl Default for RankingComponents {
    fn default() -> Self {
        RankingComponents {
            volume: true,
            downloads: true,
            efficiency: true,
            reach: true,
        }
    }
}

// =============================================================================
// Outputs
// =============================================================================

/// One ranking row: raw totals, the two ratios, the four normalized
/// component scores and the composite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PhotographerRank {
    pub photographer_id: i64,
    pub name: String,
    pub photos_total: i64,
    pub downloads_total: i64,
    pub unique_downloads_total: i64,
    /// downloads / photos, 0 when no photos.
    pub download_rate: f64,
    /// unique downloads / downloads, 0 when no downloads.
    pub reach: f64,
    pub volume_score: f64,
    pub downloads_score: f64,
    pub efficiency_score: f64,
    pub reach_score: f64,
    /// Mean of the enabled component scores.
    pub score: f64,
}

/// KPI block for the photographer list and detail views.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PhotographerKpis {
    /// Number of events worked.
    pub events: i64,
    pub photos_total: i64,
    pub downloads_total: i64,
    pub unique_downloads_total: i64,
    pub cost_total_cents: i64,
    /// downloads / photos as a percentage; None when no photos.
    pub download_pct: Option<f64>,
    /// unique downloads / downloads as a percentage; None when no downloads.
    pub unique_download_pct: Option<f64>,
    /// Cost in whole currency units per download; None when no downloads.
    pub cost_per_download: Option<f64>,
}

// =============================================================================
// Scoring
// =============================================================================

/// Ranks photographers from their grouped assignment sums.
pub fn rank_photographers(
    stats: Vec<AssignmentStats>,
    components: RankingComponents,
) -> Vec<PhotographerRank> {
    struct Base {
        stats: AssignmentStats,
        download_rate: f64,
        reach: f64,
    }

    let base: Vec<Base> = stats
        .into_iter()
        .map(|s| {
            let download_rate = if s.photos_taken > 0 {
                s.downloads as f64 / s.photos_taken as f64
            } else {
                0.0
            };
            let reach = if s.downloads > 0 {
                s.unique_downloads as f64 / s.downloads as f64
            } else {
                0.0
            };
            Base {
                stats: s,
                download_rate,
                reach,
            }
        })
        .collect();

    let mut max_volume = 0.0f64;
    let mut max_downloads = 0.0f64;
    let mut max_rate = 0.0f64;
    let mut max_reach = 0.0f64;
    for b in &base {
        max_volume = max_volume.max(b.stats.photos_taken as f64);
        max_downloads = max_downloads.max(b.stats.downloads as f64);
        max_rate = max_rate.max(b.download_rate);
        max_reach = max_reach.max(b.reach);
    }

    let normalize = |value: f64, max: f64| if max > 0.0 { value / max } else { 0.0 };

    let mut out: Vec<PhotographerRank> = base
        .into_iter()
        .map(|b| {
            let volume_score = normalize(b.stats.photos_taken as f64, max_volume);
            let downloads_score = normalize(b.stats.downloads as f64, max_downloads);
            let efficiency_score = normalize(b.download_rate, max_rate);
            let reach_score = normalize(b.reach, max_reach);

            let mut enabled = Vec::with_capacity(4);
            if components.volume {
                enabled.push(volume_score);
            }
            if components.downloads {
                enabled.push(downloads_score);
            }
            if components.efficiency {
                enabled.push(efficiency_score);
            }
            if components.reach {
                enabled.push(reach_score);
            }

            let score = if enabled.is_empty() {
                0.0
            } else {
                enabled.iter().sum::<f64>() / enabled.len() as f64
            };

            PhotographerRank {
                photographer_id: b.stats.photographer_id,
                name: b.stats.name,
                photos_total: b.stats.photos_taken,
                downloads_total: b.stats.downloads,
                unique_downloads_total: b.stats.unique_downloads,
                download_rate: b.download_rate,
                reach: b.reach,
                volume_score,
                downloads_score,
                efficiency_score,
                reach_score,
                score,
            }
        })
        .collect();

    // Score descending; ties break on ascending case-sensitive name.
    out.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| a.name.cmp(&b.name))
    });

    out
}

// =============================================================================
// KPIs
// =============================================================================

/// Folds a photographer's assignment rows into the KPI block.
pub fn assignment_kpis(rows: &[PhotographerAssignment]) -> PhotographerKpis {
    let mut photos = 0i64;
    let mut downloads = 0i64;
    let mut unique = 0i64;
    let mut cost = 0i64;

    for row in rows {
        photos += row.photos_taken;
        downloads += row.downloads;
        unique += row.unique_downloads;
        cost += row.cost_cents;
    }

    let download_pct = if photos > 0 {
        Some(downloads as f64 / photos as f64 * 100.0)
    } else {
        None
    };
    let unique_download_pct = if downloads > 0 {
        Some(unique as f64 / downloads as f64 * 100.0)
    } else {
        None
    };
    let cost_per_download = if downloads > 0 {
        Some(cost as f64 / 100.0 / downloads as f64)
    } else {
        None
    };

    PhotographerKpis {
        events: rows.len() as i64,
        photos_total: photos,
        downloads_total: downloads,
        unique_downloads_total: unique,
        cost_total_cents: cost,
        download_pct,
        unique_download_pct,
        cost_per_download,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(id: i64, name: &str, photos: i64, downloads: i64, unique: i64) -> AssignmentStats {
        AssignmentStats {
            photographer_id: id,
            name: name.to_string(),
            photos_taken: photos,
            downloads,
            unique_downloads: unique,
        }
    }

    #[test]
    fn test_leader_scores_one_on_every_metric() {
        let rows = vec![
            stats(1, "Ana", 1000, 500, 400),
            stats(2, "Bruno", 500, 250, 200),
        ];
        let out = rank_photographers(rows, RankingComponents::default());

        assert_eq!(out[0].name, "Ana");
        assert_eq!(out[0].volume_score, 1.0);
        assert_eq!(out[0].downloads_score, 1.0);
        assert_eq!(out[0].efficiency_score, 1.0);
        assert_eq!(out[0].reach_score, 1.0);
        assert_eq!(out[0].score, 1.0);

        // Bruno has the same ratios, so efficiency and reach normalize to 1
        assert_eq!(out[1].volume_score, 0.5);
        assert_eq!(out[1].efficiency_score, 1.0);
        assert_eq!(out[1].score, (0.5 + 0.5 + 1.0 + 1.0) / 4.0);
    }

    #[test]
    fn test_zero_denominators_are_zero_not_nan() {
        let rows = vec![stats(1, "Ana", 0, 0, 0)];
        let out = rank_photographers(rows, RankingComponents::default());

        assert_eq!(out[0].download_rate, 0.0);
        assert_eq!(out[0].reach, 0.0);
        // every max is 0, so every normalized score is 0
        assert_eq!(out[0].score, 0.0);
    }

    #[test]
    fn test_ties_order_by_name_ascending() {
        // identical figures, so identical scores
        let rows = vec![
            stats(2, "Zoe", 100, 50, 25),
            stats(1, "Ana", 100, 50, 25),
            stats(3, "Mia", 100, 50, 25),
        ];
        let out = rank_photographers(rows, RankingComponents::default());

        let names: Vec<&str> = out.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Ana", "Mia", "Zoe"]);
    }

    #[test]
    fn test_tie_break_is_case_sensitive() {
        let rows = vec![
            stats(1, "ana", 100, 50, 25),
            stats(2, "Zoe", 100, 50, 25),
        ];
        let out = rank_photographers(rows, RankingComponents::default());

        // byte order: uppercase sorts before lowercase
        assert_eq!(out[0].name, "Zoe");
        assert_eq!(out[1].name, "ana");
    }

    #[test]
    fn test_component_toggles() {
        let rows = vec![
            stats(1, "Ana", 1000, 100, 100), // volume leader
            stats(2, "Bruno", 100, 100, 100), // ratio leader
        ];

        // volume only: Ana wins outright
        let out = rank_photographers(
            rows.clone(),
            RankingComponents {
                volume: true,
                downloads: false,
                efficiency: false,
                reach: false,
            },
        );
        assert_eq!(out[0].name, "Ana");
        assert_eq!(out[0].score, 1.0);
        assert_eq!(out[1].score, 0.1);

        // efficiency only: Bruno wins (1 download per photo)
        let out = rank_photographers(
            rows.clone(),
            RankingComponents {
                volume: false,
                downloads: false,
                efficiency: true,
                reach: false,
            },
        );
        assert_eq!(out[0].name, "Bruno");

        // everything disabled: all scores 0, name order decides
        let out = rank_photographers(
            rows,
            RankingComponents {
                volume: false,
                downloads: false,
                efficiency: false,
                reach: false,
            },
        );
        assert_eq!(out[0].score, 0.0);
        assert_eq!(out[1].score, 0.0);
        assert_eq!(out[0].name, "Ana");
    }

    #[test]
    fn test_empty_input_is_empty_output() {
        let out = rank_photographers(Vec::new(), RankingComponents::default());
        assert!(out.is_empty());
    }

    fn assignment(photos: i64, downloads: i64, unique: i64, cost_cents: i64) -> PhotographerAssignment {
        PhotographerAssignment {
            id: 0,
            event_id: 1,
            photographer_id: 1,
            name: "Ana".to_string(),
            cost_cents,
            photos_taken: photos,
            downloads,
            unique_downloads: unique,
            hours_worked: 0.0,
            invoiced: false,
            paid: false,
            role: None,
        }
    }

    #[test]
    fn test_assignment_kpis() {
        let rows = vec![
            assignment(1000, 400, 300, 50_000),
            assignment(500, 100, 50, 25_000),
        ];
        let kpis = assignment_kpis(&rows);

        assert_eq!(kpis.events, 2);
        assert_eq!(kpis.photos_total, 1500);
        assert_eq!(kpis.downloads_total, 500);
        assert_eq!(kpis.unique_downloads_total, 350);
        assert_eq!(kpis.cost_total_cents, 75_000);
        assert_eq!(kpis.download_pct, Some(500.0 / 1500.0 * 100.0));
        assert_eq!(kpis.unique_download_pct, Some(70.0));
        // 750 pesos over 500 downloads
        assert_eq!(kpis.cost_per_download, Some(1.5));
    }

    #[test]
    fn test_assignment_kpis_zero_denominators() {
        let kpis = assignment_kpis(&[assignment(0, 0, 0, 10_000)]);
        assert_eq!(kpis.download_pct, None);
        assert_eq!(kpis.unique_download_pct, None);
        assert_eq!(kpis.cost_per_download, None);
        assert_eq!(kpis.cost_total_cents, 10_000);
    }
}
