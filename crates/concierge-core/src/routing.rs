//! Intent → execution plan lookup.
//!
//! | Intent | Strategy | Sources | Merge |
//! |--------|----------|---------|-------|
//! | real-time availability | parallel | real-time hotels 0.7, directory 0.3 | combine |
//! | local hotels | sequential | directory 0.8 → general knowledge 0.2 | overlay |
//! | location guide | parallel | local content 0.7, general knowledge 0.3 | overlay |
//! | hybrid | parallel | real-time 0.4, directory 0.3, content 0.2, general 0.1 | combine |
//! | general info | single | general knowledge 1.0 | prioritize |

use crate::models::{
    ExecutionStrategy, Intent, MergeStrategy, RoutingDecision, SourceKind, SourcePlan,
};

fn plan(source: SourceKind, weight: f64, purpose: &'static str) -> SourcePlan {
    SourcePlan {
        source,
        weight,
        purpose,
    }
}

/// Map an intent to its fixed routing plan.
pub fn select_route(intent: Intent) -> RoutingDecision {
    use SourceKind::*;

    match intent {
        Intent::RealTimeAvailability => RoutingDecision {
            strategy: ExecutionStrategy::Parallel,
            sources: vec![
                plan(RealTimeHotels, 0.7, "live availability and prices"),
                plan(LocalHotelDirectory, 0.3, "curated local properties"),
            ],
            merging_strategy: MergeStrategy::Combine,
        },
        Intent::LocalSponsoredHotels => RoutingDecision {
            strategy: ExecutionStrategy::Sequential,
            sources: vec![
                plan(LocalHotelDirectory, 0.8, "featured local properties"),
                plan(GeneralKnowledge, 0.2, "describe the area and properties"),
            ],
            merging_strategy: MergeStrategy::Overlay,
        },
        Intent::LocationGuide => RoutingDecision {
            strategy: ExecutionStrategy::Parallel,
            sources: vec![
                plan(LocalContent, 0.7, "beaches, restaurants and activities"),
                plan(GeneralKnowledge, 0.3, "narrative guide"),
            ],
            merging_strategy: MergeStrategy::Overlay,
        },
        Intent::HybridRecommendation => RoutingDecision {
            strategy: ExecutionStrategy::Parallel,
            sources: vec![
                plan(RealTimeHotels, 0.4, "live availability and prices"),
                plan(LocalHotelDirectory, 0.3, "curated local properties"),
                plan(LocalContent, 0.2, "things to see and do"),
                plan(GeneralKnowledge, 0.1, "trip planning advice"),
            ],
            merging_strategy: MergeStrategy::Combine,
        },
        Intent::GeneralTravelInfo => RoutingDecision {
            strategy: ExecutionStrategy::Single,
            sources: vec![plan(GeneralKnowledge, 1.0, "general travel answer")],
            merging_strategy: MergeStrategy::Prioritize,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sources(d: &RoutingDecision) -> Vec<(SourceKind, f64)> {
        d.sources.iter().map(|p| (p.source, p.weight)).collect()
    }

    #[test]
    fn test_real_time_route() {
        let d = select_route(Intent::RealTimeAvailability);
        assert_eq!(d.strategy, ExecutionStrategy::Parallel);
        assert_eq!(d.merging_strategy, MergeStrategy::Combine);
        assert_eq!(
            sources(&d),
            vec![
                (SourceKind::RealTimeHotels, 0.7),
                (SourceKind::LocalHotelDirectory, 0.3)
            ]
        );
    }

    #[test]
    fn test_local_hotels_route_is_sequential() {
        let d = select_route(Intent::LocalSponsoredHotels);
        assert_eq!(d.strategy, ExecutionStrategy::Sequential);
        assert_eq!(d.merging_strategy, MergeStrategy::Overlay);
        assert_eq!(
            sources(&d),
            vec![
                (SourceKind::LocalHotelDirectory, 0.8),
                (SourceKind::GeneralKnowledge, 0.2)
            ]
        );
    }

    #[test]
    fn test_guide_and_general_routes() {
        let d = select_route(Intent::LocationGuide);
        assert_eq!(d.strategy, ExecutionStrategy::Parallel);
        assert_eq!(d.merging_strategy, MergeStrategy::Overlay);
        assert_eq!(
            sources(&d),
            vec![
                (SourceKind::LocalContent, 0.7),
                (SourceKind::GeneralKnowledge, 0.3)
            ]
        );

        let d = select_route(Intent::GeneralTravelInfo);
        assert_eq!(d.strategy, ExecutionStrategy::Single);
        assert_eq!(d.merging_strategy, MergeStrategy::Prioritize);
        assert_eq!(sources(&d), vec![(SourceKind::GeneralKnowledge, 1.0)]);
    }

    #[test]
    fn test_hybrid_route_uses_all_sources() {
        let d = select_route(Intent::HybridRecommendation);
        assert_eq!(d.strategy, ExecutionStrategy::Parallel);
        assert_eq!(d.merging_strategy, MergeStrategy::Combine);
        assert_eq!(
            sources(&d),
            vec![
                (SourceKind::RealTimeHotels, 0.4),
                (SourceKind::LocalHotelDirectory, 0.3),
                (SourceKind::LocalContent, 0.2),
                (SourceKind::GeneralKnowledge, 0.1)
            ]
        );
    }

    #[test]
    fn test_every_route_is_non_empty_and_weighted() {
        for intent in Intent::ALL {
            let d = select_route(intent);
            assert!(!d.sources.is_empty(), "{} has no sources", intent);
            let total: f64 = d.sources.iter().map(|p| p.weight).sum();
            assert!((total - 1.0).abs() < 1e-9, "{} weights sum to {}", intent, total);
            if d.sources.len() == 1 {
                assert_eq!(d.strategy, ExecutionStrategy::Single);
            }
        }
    }
}
