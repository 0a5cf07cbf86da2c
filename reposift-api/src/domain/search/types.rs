//! Request, filter-plan and record types for indexed search.

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::Provider;

pub const MAX_PROVIDER_FILTERS: usize = 3;
pub const MAX_LANGUAGE_FILTERS: usize = 5;
pub const MAX_LABEL_FILTERS: usize = 5;
pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// Raw, untrusted filter payload as decoded from the query string.
/// List-valued fields are comma-separated.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSearchParams {
    pub providers: Option<String>,
    pub languages: Option<String>,
    pub primary_label: Option<String>,
    pub labels: Option<String>,
    #[serde(alias = "minStars")]
    pub min_stars: Option<i64>,
    #[serde(alias = "maxStars")]
    pub max_stars: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// A validated filter request. Doubles as the memoization cache key, so
/// value sets are deduplicated and field order is fixed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SearchQuery {
    pub providers: Option<Vec<Provider>>,
    pub languages: Option<Vec<String>>,
    pub primary_label: Option<String>,
    pub labels: Option<Vec<String>>,
    pub min_stars: Option<i64>,
    pub max_stars: Option<i64>,
    pub page: i64,
    pub per_page: i64,
}

impl SearchQuery {
    /// Validate and coerce a raw payload, collecting every violated
    /// constraint rather than stopping at the first.
    pub fn parse(raw: &RawSearchParams) -> Result<Self, Vec<String>> {
        let mut errors = Vec::new();

        let providers = raw
            .providers
            .as_deref()
            .and_then(|s| parse_values("providers", s, MAX_PROVIDER_FILTERS, &mut errors))
            .map(|values| {
                values
                    .iter()
                    .filter_map(|v| match v.parse::<Provider>() {
                        Ok(provider) => Some(provider),
                        Err(_) => {
                            errors.push(format!("providers: unknown provider '{v}'"));
                            None
                        }
                    })
                    .unique()
                    .collect::<Vec<_>>()
            });

        let languages = raw
            .languages
            .as_deref()
            .and_then(|s| parse_values("languages", s, MAX_LANGUAGE_FILTERS, &mut errors));

        let labels = raw
            .labels
            .as_deref()
            .and_then(|s| parse_values("labels", s, MAX_LABEL_FILTERS, &mut errors));

        let primary_label = match raw.primary_label.as_deref().map(str::trim) {
            Some("") => {
                errors.push("primary_label: must be non-empty".to_string());
                None
            }
            other => other.map(str::to_owned),
        };

        if raw.min_stars.is_some_and(|min| min < 0) {
            errors.push("min_stars: must be non-negative".to_string());
        }
        if raw.max_stars.is_some_and(|max| max < 0) {
            errors.push("max_stars: must be non-negative".to_string());
        }
        if let (Some(min), Some(max)) = (raw.min_stars, raw.max_stars) {
            if min >= 0 && max >= 0 && max <= min {
                errors.push("max_stars: must be greater than min_stars".to_string());
            }
        }

        let page = raw.page.unwrap_or(1);
        if page < 1 {
            errors.push("page: must be at least 1".to_string());
        }

        let per_page = raw.per_page.unwrap_or(DEFAULT_PAGE_SIZE);
        if per_page < 1 {
            errors.push("per_page: must be at least 1".to_string());
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(Self {
            providers,
            languages,
            primary_label,
            labels,
            min_stars: raw.min_stars,
            max_stars: raw.max_stars,
            page,
            per_page,
        })
    }
}

/// Split a comma-separated list, trim, reject blanks, dedup, cap size.
/// An entirely empty parameter counts as absent.
fn parse_values(
    field: &str,
    raw: &str,
    max: usize,
    errors: &mut Vec<String>,
) -> Option<Vec<String>> {
    if raw.trim().is_empty() {
        return None;
    }

    let values: Vec<String> = raw.split(',').map(|v| v.trim().to_owned()).collect();
    if values.iter().any(String::is_empty) {
        errors.push(format!("{field}: values must be non-empty"));
        return None;
    }

    let values: Vec<String> = values.into_iter().unique().collect();
    if values.len() > max {
        errors.push(format!("{field}: at most {max} values allowed"));
        return None;
    }

    Some(values)
}

/// Scalar predicates of a query: everything the main fetch can apply
/// without touching the join tables.
#[derive(Debug, Clone, Default)]
pub struct ScalarFilters {
    pub providers: Option<Vec<Provider>>,
    pub primary_label: Option<String>,
    pub min_stars: Option<i64>,
    pub max_stars: Option<i64>,
}

/// A query split into scalar predicates and the relational value sets
/// handed to the intersector.
#[derive(Debug, Clone)]
pub struct FilterPlan {
    pub scalars: ScalarFilters,
    pub languages: Option<Vec<String>>,
    pub labels: Option<Vec<String>>,
}

impl FilterPlan {
    pub fn from_query(query: &SearchQuery) -> Self {
        Self {
            scalars: ScalarFilters {
                providers: query.providers.clone(),
                primary_label: query.primary_label.clone(),
                min_stars: query.min_stars,
                max_stars: query.max_stars,
            },
            languages: query.languages.clone(),
            labels: query.labels.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LabelRef {
    pub name: String,
    pub display: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LanguageRef {
    pub name: String,
    pub display: String,
}

/// External shape of an indexed repository, associations included.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRepoRecord {
    pub id: String,
    pub provider: Provider,
    pub author: String,
    pub name: String,
    pub description: Option<String>,
    pub stars: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maintain_link: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub last_updated: OffsetDateTime,
    pub suggested_by: String,
    pub primary_label: LabelRef,
    pub labels: Vec<LabelRef>,
    pub languages: Vec<LanguageRef>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub items: Vec<IndexedRepoRecord>,
    pub curr_page: i64,
    pub has_next: bool,
}

impl SearchPage {
    pub fn empty(page: i64) -> Self {
        Self {
            items: Vec::new(),
            curr_page: page,
            has_next: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_payload_uses_defaults() {
        let query = SearchQuery::parse(&RawSearchParams::default()).unwrap();

        assert_eq!(query.page, 1);
        assert_eq!(query.per_page, DEFAULT_PAGE_SIZE);
        assert!(query.providers.is_none());
        assert!(query.languages.is_none());
        assert!(query.labels.is_none());
        assert!(query.primary_label.is_none());
    }

    #[test]
    fn rejects_too_many_languages() {
        let raw = RawSearchParams {
            languages: Some("rust,go,python,c,zig,haskell".to_string()),
            ..Default::default()
        };

        let errors = SearchQuery::parse(&raw).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].contains("languages"));
        assert!(errors[0].contains("at most 5"));
    }

    #[test]
    fn rejects_unknown_provider() {
        let raw = RawSearchParams {
            providers: Some("github,sourcehut".to_string()),
            ..Default::default()
        };

        let errors = SearchQuery::parse(&raw).unwrap_err();
        assert!(errors[0].contains("sourcehut"));
    }

    #[test]
    fn rejects_inverted_star_bounds() {
        let raw = RawSearchParams {
            min_stars: Some(100),
            max_stars: Some(100),
            ..Default::default()
        };

        let errors = SearchQuery::parse(&raw).unwrap_err();
        assert!(errors[0].contains("max_stars"));
        assert!(errors[0].contains("greater than"));
    }

    #[test]
    fn rejects_negative_star_bounds() {
        let raw = RawSearchParams {
            min_stars: Some(-1),
            ..Default::default()
        };

        let errors = SearchQuery::parse(&raw).unwrap_err();
        assert!(errors[0].contains("min_stars"));
    }

    #[test]
    fn collects_every_violation() {
        let raw = RawSearchParams {
            languages: Some("rust,go,python,c,zig,haskell".to_string()),
            labels: Some("a,b,c,d,e,f".to_string()),
            page: Some(0),
            per_page: Some(0),
            ..Default::default()
        };

        let errors = SearchQuery::parse(&raw).unwrap_err();
        assert_eq!(errors.len(), 4);
    }

    #[test]
    fn dedups_list_values() {
        let raw = RawSearchParams {
            languages: Some("rust,rust,go".to_string()),
            ..Default::default()
        };

        let query = SearchQuery::parse(&raw).unwrap();
        assert_eq!(query.languages, Some(vec!["rust".to_string(), "go".to_string()]));
    }

    #[test]
    fn dedup_keeps_six_with_duplicates_under_cap() {
        let raw = RawSearchParams {
            languages: Some("rust,go,rust,go,rust,go".to_string()),
            ..Default::default()
        };

        let query = SearchQuery::parse(&raw).unwrap();
        assert_eq!(query.languages.unwrap().len(), 2);
    }

    #[test]
    fn blank_list_parameter_counts_as_absent() {
        let raw = RawSearchParams {
            languages: Some("  ".to_string()),
            ..Default::default()
        };

        let query = SearchQuery::parse(&raw).unwrap();
        assert!(query.languages.is_none());
    }

    #[test]
    fn rejects_blank_list_values() {
        let raw = RawSearchParams {
            languages: Some("rust,,go".to_string()),
            ..Default::default()
        };

        let errors = SearchQuery::parse(&raw).unwrap_err();
        assert!(errors[0].contains("non-empty"));
    }

    #[test]
    fn providers_parse_case_insensitively() {
        let raw = RawSearchParams {
            providers: Some("GitHub,gitlab".to_string()),
            ..Default::default()
        };

        let query = SearchQuery::parse(&raw).unwrap();
        assert_eq!(
            query.providers,
            Some(vec![Provider::Github, Provider::Gitlab])
        );
    }

    #[test]
    fn filter_plan_splits_scalars_from_relations() {
        let raw = RawSearchParams {
            providers: Some("github".to_string()),
            languages: Some("rust".to_string()),
            labels: Some("cli".to_string()),
            min_stars: Some(10),
            ..Default::default()
        };

        let query = SearchQuery::parse(&raw).unwrap();
        let plan = FilterPlan::from_query(&query);

        assert_eq!(plan.scalars.providers, Some(vec![Provider::Github]));
        assert_eq!(plan.scalars.min_stars, Some(10));
        assert_eq!(plan.languages, Some(vec!["rust".to_string()]));
        assert_eq!(plan.labels, Some(vec!["cli".to_string()]));
    }
}
