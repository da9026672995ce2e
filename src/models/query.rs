//! Search parameters sent with every page request.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::config::ConfigError;

/// Sort order understood by the article search endpoint
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortMode {
    #[default]
    Relevance,
    Newest,
    Oldest,
}

impl SortMode {
    /// Value of the `sort` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            SortMode::Relevance => "relevance",
            SortMode::Newest => "newest",
            SortMode::Oldest => "oldest",
        }
    }
}

impl std::fmt::Display for SortMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Facet options passed through to the endpoint untouched
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FacetOptions {
    /// Whether facet counts are requested
    pub enabled: bool,

    /// Fields to compute facet counts over
    pub fields: Option<String>,

    /// Whether filters apply to the facet counts
    pub filter: Option<String>,
}

/// Search parameters for one harvest run.
///
/// A `QuerySpec` is only obtainable through [`QuerySpecBuilder::build`], which
/// guarantees a non-empty query string, a non-empty field list and well-formed
/// `YYYYMMDD` dates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySpec {
    query: String,
    fields: Vec<String>,
    begin_date: Option<String>,
    end_date: Option<String>,
    sort: SortMode,
    filter_query: Option<String>,
    facet: FacetOptions,
    start_page: u32,
}

impl QuerySpec {
    /// Start building a query from the two required parameters
    pub fn builder<I, S>(query: impl Into<String>, fields: I) -> QuerySpecBuilder
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QuerySpecBuilder {
            query: query.into(),
            fields: fields.into_iter().map(Into::into).collect(),
            begin_date: None,
            end_date: None,
            sort: SortMode::default(),
            filter_query: None,
            facet: FacetOptions::default(),
            start_page: 0,
        }
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn begin_date(&self) -> Option<&str> {
        self.begin_date.as_deref()
    }

    pub fn end_date(&self) -> Option<&str> {
        self.end_date.as_deref()
    }

    pub fn sort(&self) -> SortMode {
        self.sort
    }

    pub fn filter_query(&self) -> Option<&str> {
        self.filter_query.as_deref()
    }

    pub fn facet(&self) -> &FacetOptions {
        &self.facet
    }

    /// Page the first request is issued for
    pub fn start_page(&self) -> u32 {
        self.start_page
    }

    /// Render the query parameters for `page`, in the endpoint's documented order.
    ///
    /// The credential is not part of the query; the HTTP source prepends it.
    /// Unset optional parameters are omitted.
    pub fn query_params(&self, page: u32) -> Vec<(&'static str, String)> {
        let mut params = Vec::with_capacity(10);

        if let Some(begin) = &self.begin_date {
            params.push(("begin_date", begin.clone()));
        }
        if let Some(end) = &self.end_date {
            params.push(("end_date", end.clone()));
        }
        params.push(("facet", self.facet.enabled.to_string()));
        if let Some(fields) = &self.facet.fields {
            params.push(("facet_fields", fields.clone()));
        }
        if let Some(filter) = &self.facet.filter {
            params.push(("facet_filter", filter.clone()));
        }
        params.push(("fl", self.fields.join(",")));
        if let Some(fq) = &self.filter_query {
            params.push(("fq", fq.clone()));
        }
        params.push(("page", page.to_string()));
        params.push(("q", self.query.clone()));
        params.push(("sort", self.sort.as_str().to_string()));

        params
    }
}

/// Builder for [`QuerySpec`]
#[derive(Debug, Clone)]
pub struct QuerySpecBuilder {
    query: String,
    fields: Vec<String>,
    begin_date: Option<String>,
    end_date: Option<String>,
    sort: SortMode,
    filter_query: Option<String>,
    facet: FacetOptions,
    start_page: u32,
}

impl QuerySpecBuilder {
    /// Only return results published on or after this `YYYYMMDD` date
    pub fn begin_date(mut self, date: impl Into<String>) -> Self {
        self.begin_date = Some(date.into());
        self
    }

    /// Only return results published on or before this `YYYYMMDD` date
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = Some(date.into());
        self
    }

    pub fn sort(mut self, sort: SortMode) -> Self {
        self.sort = sort;
        self
    }

    /// Set the filter query (`fq`)
    pub fn filter_query(mut self, fq: impl Into<String>) -> Self {
        self.filter_query = Some(fq.into());
        self
    }

    pub fn facet(mut self, facet: FacetOptions) -> Self {
        self.facet = facet;
        self
    }

    pub fn start_page(mut self, page: u32) -> Self {
        self.start_page = page;
        self
    }

    /// Validate and build the query
    pub fn build(self) -> Result<QuerySpec, ConfigError> {
        let query = self.query.trim().to_string();
        if query.is_empty() {
            return Err(ConfigError::Missing("q"));
        }

        let fields: Vec<String> = self
            .fields
            .into_iter()
            .map(|f| f.trim().to_string())
            .filter(|f| !f.is_empty())
            .collect();
        if fields.is_empty() {
            return Err(ConfigError::Missing("fl"));
        }

        if let Some(date) = &self.begin_date {
            validate_date("begin_date", date)?;
        }
        if let Some(date) = &self.end_date {
            validate_date("end_date", date)?;
        }

        Ok(QuerySpec {
            query,
            fields,
            begin_date: self.begin_date,
            end_date: self.end_date,
            sort: self.sort,
            filter_query: self.filter_query,
            facet: self.facet,
            start_page: self.start_page,
        })
    }
}

fn validate_date(name: &'static str, value: &str) -> Result<(), ConfigError> {
    let well_formed = value.len() == 8 && value.bytes().all(|b| b.is_ascii_digit());
    if !well_formed || NaiveDate::parse_from_str(value, "%Y%m%d").is_err() {
        return Err(ConfigError::Invalid {
            name,
            reason: format!("expected a YYYYMMDD date, got {:?}", value),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_params_order() {
        let query = QuerySpec::builder("climate", ["headline", "snippet"])
            .begin_date("20170301")
            .end_date("20220201")
            .filter_query("section_name:Science")
            .start_page(3)
            .build()
            .unwrap();

        let names: Vec<&str> = query.query_params(4).iter().map(|(k, _)| *k).collect();
        assert_eq!(
            names,
            vec!["begin_date", "end_date", "facet", "fl", "fq", "page", "q", "sort"]
        );

        let params = query.query_params(4);
        assert!(params.contains(&("fl", "headline,snippet".to_string())));
        assert!(params.contains(&("page", "4".to_string())));
        assert!(params.contains(&("sort", "relevance".to_string())));
        assert!(params.contains(&("facet", "false".to_string())));
    }

    #[test]
    fn test_facet_params_included_when_set() {
        let query = QuerySpec::builder("election", ["snippet"])
            .facet(FacetOptions {
                enabled: true,
                fields: Some("section_name".to_string()),
                filter: Some("true".to_string()),
            })
            .build()
            .unwrap();

        let params = query.query_params(0);
        assert!(params.contains(&("facet", "true".to_string())));
        assert!(params.contains(&("facet_fields", "section_name".to_string())));
        assert!(params.contains(&("facet_filter", "true".to_string())));
    }

    #[test]
    fn test_required_parameters() {
        let err = QuerySpec::builder("  ", ["snippet"]).build().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("q")));

        let err = QuerySpec::builder("election", [" ", ""]).build().unwrap_err();
        assert!(matches!(err, ConfigError::Missing("fl")));
    }

    #[test]
    fn test_date_validation() {
        assert!(QuerySpec::builder("q", ["snippet"])
            .begin_date("20200229")
            .build()
            .is_ok());

        for bad in ["2020-02-01", "20200230", "2020021", "yyyymmdd"] {
            let err = QuerySpec::builder("q", ["snippet"])
                .end_date(bad)
                .build()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::Invalid { name: "end_date", .. }),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn test_fields_are_trimmed() {
        let query = QuerySpec::builder("q", [" headline ", "", "word_count"])
            .build()
            .unwrap();
        assert_eq!(query.fields(), ["headline", "word_count"]);
    }
}
