//! Splitting a route's length across the countries it passes through.

use crate::domain::{CountryCode, Route, RouteSegmentShare};

use super::classifier::GeoCountryClassifier;

/// Per-country shares for one route.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePartition {
    /// Ordered by first encounter along the route.
    pub shares: Vec<RouteSegmentShare>,
    pub total_km: f64,
    /// No sample was classified; the single share is the fallback country.
    pub fallback_used: bool,
}

impl RoutePartition {
    /// Countries in share order.
    pub fn countries(&self) -> Vec<CountryCode> {
        self.shares.iter().map(|s| s.country).collect()
    }
}

/// Divides route length evenly across detected countries.
#[derive(Debug, Clone, Copy)]
pub struct RoutePartitioner {
    classifier: GeoCountryClassifier,
    sample_budget: usize,
    fallback_country: CountryCode,
}

impl RoutePartitioner {
    pub fn new(
        classifier: GeoCountryClassifier,
        sample_budget: usize,
        fallback_country: CountryCode,
    ) -> Self {
        Self {
            classifier,
            sample_budget: sample_budget.max(2),
            fallback_country,
        }
    }

    /// Distinct countries of the sampled points, in first-encountered order.
    ///
    /// Empty when nothing matched.
    pub fn detect_countries(&self, route: &Route) -> Vec<CountryCode> {
        let points = route.points();
        let mut countries = Vec::new();
        for index in sample_indices(points.len(), self.sample_budget) {
            if let Some(country) = self.classifier.classify(&points[index]) {
                if !countries.contains(&country) {
                    countries.push(country);
                }
            }
        }
        countries
    }

    /// Classify and split in one step.
    pub fn partition(&self, route: &Route) -> RoutePartition {
        let countries = self.detect_countries(route);
        self.split(route, &countries)
    }

    /// Split the route length across an already-detected country list.
    ///
    /// An empty list yields a single fallback share.
    pub fn split(&self, route: &Route, countries: &[CountryCode]) -> RoutePartition {
        let total_km = route.length_km();
        let (countries, fallback_used) = if countries.is_empty() {
            (vec![self.fallback_country], true)
        } else {
            (countries.to_vec(), false)
        };

        let per_country = total_km / countries.len() as f64;
        let mut assigned = 0.0;
        let last = countries.len() - 1;
        let shares = countries
            .into_iter()
            .enumerate()
            .map(|(i, country)| {
                // Last share takes the remainder so the sum is exact.
                let distance_km = if i == last {
                    (total_km - assigned).max(0.0)
                } else {
                    per_country
                };
                assigned += distance_km;
                RouteSegmentShare {
                    country,
                    distance_km,
                }
            })
            .collect();

        RoutePartition {
            shares,
            total_km,
            fallback_used,
        }
    }
}

/// Evenly spaced indices into `len` points, at most `budget` of them,
/// always including the first and last.
pub fn sample_indices(len: usize, budget: usize) -> Vec<usize> {
    if len == 0 {
        return Vec::new();
    }
    let budget = budget.max(2);
    if len <= budget {
        return (0..len).collect();
    }

    let mut indices: Vec<usize> = (0..budget)
        .map(|i| i * (len - 1) / (budget - 1))
        .collect();
    indices.dedup();
    indices
}
