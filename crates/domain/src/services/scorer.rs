//! Weighted driver scoring used by the Dispatcher to rank candidates.

use uuid::Uuid;

use super::geomath::distance_km;

/// Default Earth-distance cutoff beyond which a candidate is skipped.
pub const DEFAULT_MAX_SEARCH_RADIUS_KM: f64 = 15.0;

const WEIGHT_DISTANCE: f64 = 0.50;
const WEIGHT_RATING: f64 = 0.25;
const WEIGHT_ACCEPTANCE: f64 = 0.15;
const WEIGHT_IDLE: f64 = 0.10;

const DEFAULT_RATING: f64 = 4.5;
const DEFAULT_ACCEPTANCE_RATE: f64 = 80.0;
const DEFAULT_IDLE_SCORE: f64 = 50.0;

const IDLE_CAP_MINUTES: f64 = 60.0;

/// Historical signals about a candidate driver, as known at scoring time.
/// `None` means "no history" and falls back to the documented default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DriverSignals {
    pub rating: Option<f64>,
    /// Percentage (0-100) of offers accepted in the trailing 7-day window.
    pub acceptance_rate: Option<f64>,
    /// Minutes since this driver's last completed booking.
    pub idle_minutes: Option<f64>,
}

/// A driver's score at the moment of dispatch, ready to compare against
/// siblings and to persist on the resulting offer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredCandidate {
    pub driver_id: Uuid,
    pub distance_km: f64,
    pub composite_score: f64,
}

/// Weighted composite scorer over distance, rating, acceptance, and idle
/// time, with a hard radius cutoff.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    pub max_search_radius_km: f64,
}

impl Default for Scorer {
    fn default() -> Self {
        Self {
            max_search_radius_km: DEFAULT_MAX_SEARCH_RADIUS_KM,
        }
    }
}

impl Scorer {
    pub fn new(max_search_radius_km: f64) -> Self {
        Self {
            max_search_radius_km,
        }
    }

    /// Score a single candidate. Returns `None` when the driver is beyond
    /// the search radius — the caller must skip it entirely, not just
    /// rank it last.
    pub fn score(
        &self,
        driver_id: Uuid,
        driver_lat: f64,
        driver_lon: f64,
        pickup_lat: f64,
        pickup_lon: f64,
        signals: DriverSignals,
    ) -> Option<ScoredCandidate> {
        let d = distance_km(driver_lat, driver_lon, pickup_lat, pickup_lon);
        if d > self.max_search_radius_km {
            return None;
        }

        let distance_score = (100.0 * (1.0 - d / self.max_search_radius_km)).max(0.0);
        let rating_score = 100.0 * (signals.rating.unwrap_or(DEFAULT_RATING) / 5.0);
        let acceptance_score = signals.acceptance_rate.unwrap_or(DEFAULT_ACCEPTANCE_RATE);
        let idle_score = match signals.idle_minutes {
            Some(minutes) => 100.0 * minutes.min(IDLE_CAP_MINUTES) / IDLE_CAP_MINUTES,
            None => DEFAULT_IDLE_SCORE,
        };

        let composite_score = WEIGHT_DISTANCE * distance_score
            + WEIGHT_RATING * rating_score
            + WEIGHT_ACCEPTANCE * acceptance_score
            + WEIGHT_IDLE * idle_score;

        Some(ScoredCandidate {
            driver_id,
            distance_km: d,
            composite_score,
        })
    }

    /// Rank already-scored candidates best-first. Ties are broken by
    /// smaller distance, then by smaller driver ID, for deterministic
    /// ordering in tests.
    pub fn rank(&self, mut candidates: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
        candidates.sort_by(|a, b| {
            b.composite_score
                .partial_cmp(&a.composite_score)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| {
                    a.distance_km
                        .partial_cmp(&b.distance_km)
                        .unwrap_or(std::cmp::Ordering::Equal)
                })
                .then_with(|| a.driver_id.cmp(&b.driver_id))
        });
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn driver_beyond_radius_is_skipped() {
        let scorer = Scorer::new(15.0);
        // roughly 20 km north of the pickup point.
        let result = scorer.score(
            Uuid::new_v4(),
            0.18,
            0.0,
            0.0,
            0.0,
            DriverSignals::default(),
        );
        assert!(result.is_none());
    }

    #[test]
    fn closer_driver_outranks_farther_one_given_equal_signals() {
        let scorer = Scorer::default();
        let near = scorer
            .score(Uuid::new_v4(), 0.01, 0.01, 0.0, 0.0, DriverSignals::default())
            .unwrap();
        let far = scorer
            .score(Uuid::new_v4(), 0.05, 0.05, 0.0, 0.0, DriverSignals::default())
            .unwrap();
        let ranked = scorer.rank(vec![far, near]);
        assert_eq!(ranked[0].driver_id, near.driver_id);
    }

    #[test]
    fn missing_signals_fall_back_to_documented_defaults() {
        let scorer = Scorer::default();
        let scored = scorer
            .score(Uuid::new_v4(), 0.0, 0.0, 0.0, 0.0, DriverSignals::default())
            .unwrap();
        // distance=0 -> distance_score=100; defaults: rating 4.5/5=90, acceptance 80, idle 50.
        let expected = 0.50 * 100.0 + 0.25 * 90.0 + 0.15 * 80.0 + 0.10 * 50.0;
        assert!((scored.composite_score - expected).abs() < 1e-9);
    }

    #[test]
    fn tie_break_prefers_smaller_distance_then_smaller_id() {
        let scorer = Scorer::default();
        let a_id = Uuid::from_u128(1);
        let b_id = Uuid::from_u128(2);
        let a = ScoredCandidate {
            driver_id: a_id,
            distance_km: 1.0,
            composite_score: 90.0,
        };
        let b = ScoredCandidate {
            driver_id: b_id,
            distance_km: 1.0,
            composite_score: 90.0,
        };
        let ranked = scorer.rank(vec![b, a]);
        assert_eq!(ranked[0].driver_id, a_id);
    }

    #[test]
    fn higher_rating_increases_composite_score() {
        let scorer = Scorer::default();
        let low = scorer
            .score(
                Uuid::new_v4(),
                0.0,
                0.0,
                0.0,
                0.0,
                DriverSignals {
                    rating: Some(3.0),
                    ..Default::default()
                },
            )
            .unwrap();
        let high = scorer
            .score(
                Uuid::new_v4(),
                0.0,
                0.0,
                0.0,
                0.0,
                DriverSignals {
                    rating: Some(5.0),
                    ..Default::default()
                },
            )
            .unwrap();
        assert!(high.composite_score > low.composite_score);
    }
}
