// src/services/planner.rs

//! Query planning.
//!
//! Expands coarse filters into a bounded list of search queries and infers
//! the region a query targets.

use std::sync::Arc;

use crate::models::{ALL, DiscoveryConfig, SearchFilters, Taxonomy};

/// Builds search queries from the sector/region taxonomy.
#[derive(Debug, Clone)]
pub struct QueryPlanner {
    taxonomy: Arc<Taxonomy>,
    max_queries: usize,
    terms_per_key: usize,
}

impl QueryPlanner {
    /// Create a planner with the default limits (10 queries, 2 terms per key).
    pub fn new(taxonomy: Arc<Taxonomy>) -> Self {
        Self::with_limits(taxonomy, &DiscoveryConfig::default())
    }

    pub fn with_limits(taxonomy: Arc<Taxonomy>, config: &DiscoveryConfig) -> Self {
        Self {
            taxonomy,
            max_queries: config.max_queries,
            terms_per_key: config.terms_per_key,
        }
    }

    /// Expand filters into at most `max_queries` query strings.
    ///
    /// Order is sector-major, region-minor, then term pairs. Only the first
    /// `terms_per_key` terms of each side are used, which bounds fan-out to
    /// the search provider.
    pub fn expand(&self, filters: &SearchFilters) -> Vec<String> {
        let sectors = Self::keys(&filters.sector, self.taxonomy.sector_keys());
        let regions = Self::keys(&filters.region, self.taxonomy.region_keys());
        let suffix = filters.free_text();

        let mut queries = Vec::new();
        for sector in &sectors {
            for region in &regions {
                let sector_terms = self.taxonomy.sector_terms(sector);
                let region_terms = self.taxonomy.region_terms(region);

                for sector_term in sector_terms.iter().take(self.terms_per_key) {
                    for region_term in region_terms.iter().take(self.terms_per_key) {
                        if queries.len() == self.max_queries {
                            return queries;
                        }
                        let mut query = format!("{sector_term} {region_term}");
                        if let Some(text) = suffix {
                            query.push(' ');
                            query.push_str(text);
                        }
                        queries.push(query);
                    }
                }
            }
        }
        queries
    }

    /// Resolve the region a query targets.
    ///
    /// A concrete region filter always wins. With "all", the first region
    /// whose term appears in the query is returned, else "all".
    pub fn infer_region(&self, query: &str, region_filter: &str) -> String {
        if region_filter != ALL {
            return region_filter.to_string();
        }

        self.taxonomy
            .regions
            .iter()
            .find(|set| set.terms.iter().any(|term| query.contains(term.as_str())))
            .map(|set| set.key.clone())
            .unwrap_or_else(|| ALL.to_string())
    }

    fn keys<'a>(selected: &'a str, all: impl Iterator<Item = &'a str>) -> Vec<&'a str> {
        if selected == ALL {
            all.collect()
        } else {
            vec![selected]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TermSet;

    fn planner() -> QueryPlanner {
        QueryPlanner::new(Arc::new(Taxonomy::default()))
    }

    #[test]
    fn test_single_sector_single_region() {
        let queries = planner().expand(&SearchFilters::new("restaurant", "ile-de-france"));
        assert_eq!(
            queries,
            vec![
                "restaurant Paris",
                "restaurant Boulogne-Billancourt",
                "bistrot Paris",
                "bistrot Boulogne-Billancourt",
            ]
        );
    }

    #[test]
    fn test_all_all_is_capped_and_deterministic() {
        let planner = planner();
        let filters = SearchFilters::default();
        let first = planner.expand(&filters);
        let second = planner.expand(&filters);

        assert_eq!(first.len(), 10);
        assert_eq!(first, second);
        assert_eq!(first[0], "association Paris");
        assert_eq!(first[4], "association Lyon");
    }

    #[test]
    fn test_never_more_than_max_queries() {
        let planner = planner();
        for sector in ["all", "restaurant", "inconnu"] {
            for region in ["all", "bretagne", "inconnue"] {
                let filters = SearchFilters::new(sector, region).with_query("site vitrine");
                assert!(planner.expand(&filters).len() <= 10);
            }
        }
    }

    #[test]
    fn test_free_text_appended() {
        let filters = SearchFilters::new("commerce", "corse").with_query("bio");
        let queries = planner().expand(&filters);
        assert_eq!(queries[0], "magasin Ajaccio bio");
        assert!(queries.iter().all(|q| q.ends_with(" bio")));
    }

    #[test]
    fn test_unknown_keys_expand_to_themselves() {
        let queries = planner().expand(&SearchFilters::new("boulangerie", "bruxelles"));
        assert_eq!(queries, vec!["boulangerie bruxelles"]);
    }

    #[test]
    fn test_custom_limits() {
        let config = DiscoveryConfig {
            max_queries: 3,
            terms_per_key: 1,
            ..DiscoveryConfig::default()
        };
        let planner = QueryPlanner::with_limits(Arc::new(Taxonomy::default()), &config);
        let queries = planner.expand(&SearchFilters::new("all", "bretagne"));
        assert_eq!(
            queries,
            vec!["association Rennes", "restaurant Rennes", "magasin Rennes"]
        );
    }

    #[test]
    fn test_infer_region_keeps_concrete_filter() {
        let planner = planner();
        for query in ["restaurant Lyon", "", "café Marseille", "école Rennes"] {
            assert_eq!(planner.infer_region(query, "bretagne"), "bretagne");
        }
    }

    #[test]
    fn test_infer_region_from_query() {
        let planner = planner();
        assert_eq!(planner.infer_region("restaurant Lyon", "all"), "auvergne-rhone-alpes");
        assert_eq!(planner.infer_region("bistrot Paris", "all"), "ile-de-france");
        assert_eq!(planner.infer_region("restaurant Bruxelles", "all"), "all");
    }

    #[test]
    fn test_infer_region_first_match_wins() {
        let taxonomy = Taxonomy {
            sectors: vec![TermSet {
                key: "s".into(),
                terms: vec!["s".into()],
            }],
            regions: vec![
                TermSet {
                    key: "first".into(),
                    terms: vec!["Saint-Denis".into()],
                },
                TermSet {
                    key: "second".into(),
                    terms: vec!["Saint-Denis".into()],
                },
            ],
        };
        let planner = QueryPlanner::new(Arc::new(taxonomy));
        assert_eq!(planner.infer_region("café Saint-Denis", "all"), "first");
    }
}
