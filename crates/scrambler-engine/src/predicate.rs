use tracing::warn;

use scrambler_core::{ColumnName, Fragment, Predicate, Result, TableName, non_blank};

use crate::resolver::SchemaResolver;

/// Builds the run's selection predicate from the filter options.
///
/// Column names pass through the resolver before they reach a fragment;
/// values stay data and are bound by the store.
pub struct PredicateBuilder<'r, 'a> {
    resolver: &'r SchemaResolver<'a>,
}

impl<'r, 'a> PredicateBuilder<'r, 'a> {
    pub fn new(resolver: &'r SchemaResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Split a comma-separated option into trimmed, non-empty, distinct entries.
    pub fn split_list(option: Option<&str>) -> Vec<String> {
        let mut entries: Vec<String> = Vec::new();
        for entry in option.unwrap_or_default().split(',').map(str::trim) {
            if !entry.is_empty() && !entries.iter().any(|seen| seen == entry) {
                entries.push(entry.to_string());
            }
        }
        entries
    }

    /// Rows whose `field` contains none of `substrings`.
    pub fn exclusion_fragment(field: &ColumnName, substrings: &[String]) -> Predicate {
        Predicate::from_fragments(
            substrings
                .iter()
                .map(|needle| Fragment::NotContains {
                    column: field.clone(),
                    needle: needle.clone(),
                })
                .collect(),
        )
    }

    /// `where_field = where_value`, when both are given. The value is matched
    /// exactly as given, surrounding whitespace included.
    ///
    /// Only one of the pair yields the empty predicate. A `where_field` that is
    /// not a column of `table` is a schema error.
    pub async fn custom_fragment(
        &self,
        where_field: Option<&str>,
        where_value: Option<&str>,
        table: &TableName,
    ) -> Result<Predicate> {
        let (field, value) = match (non_blank(where_field), non_blank(where_value)) {
            (Some(field), Some(_)) => (field, where_value.unwrap_or_default()),
            (None, None) => return Ok(Predicate::all()),
            (field, value) => {
                warn!(
                    event = "custom_filter_ignored",
                    where_field = field.unwrap_or_default(),
                    has_value = value.is_some(),
                    "where-field and where-value must be given together"
                );
                return Ok(Predicate::all());
            }
        };

        let column = self.resolver.resolve_column(field, table).await?;
        Ok(Predicate::from_fragments(vec![Fragment::Equals {
            column,
            value: value.to_string(),
        }]))
    }

    /// AND-join every fragment; all empty selects every row.
    pub fn compose(fragments: impl IntoIterator<Item = Predicate>) -> Predicate {
        fragments
            .into_iter()
            .fold(Predicate::all(), |acc, fragment| acc.and(fragment))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_list_trims_and_drops_empties() {
        let entries = PredicateBuilder::split_list(Some(" example.com, ,test.org,example.com,"));
        assert_eq!(entries, vec!["example.com", "test.org"]);
        assert!(PredicateBuilder::split_list(None).is_empty());
        assert!(PredicateBuilder::split_list(Some("  ")).is_empty());
    }

    #[test]
    fn empty_exclusion_list_is_unrestricted() {
        let field = ColumnName::new("user_email");
        assert!(PredicateBuilder::exclusion_fragment(&field, &[]).is_empty());
    }

    #[test]
    fn compose_skips_empty_fragments() {
        let field = ColumnName::new("user_email");
        let needles = ["a.com".to_string(), "b.org".to_string()];
        let exclusion = PredicateBuilder::exclusion_fragment(&field, &needles);
        let composed = PredicateBuilder::compose([Predicate::all(), exclusion, Predicate::all()]);
        assert_eq!(composed.fragments().len(), 2);
        assert!(PredicateBuilder::compose([Predicate::all(), Predicate::all()]).is_empty());
    }
}
