//! Turns the dashboard's filter controls into a `/data` query string.

use std::collections::BTreeMap;

use insights_common::Facet;

/// What the user picked for one facet. The filter controls are multi-select,
/// but only the first pick is ever sent: the API filters on equality, one
/// value per facet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Single(String),
    Multi(Vec<String>),
}

impl Selection {
    /// The value that goes on the wire, if any.
    pub fn effective(&self) -> Option<&str> {
        let value = match self {
            Selection::Single(v) => v.as_str(),
            Selection::Multi(values) => values.first()?.as_str(),
        };
        (!value.is_empty()).then_some(value)
    }
}

impl From<&str> for Selection {
    fn from(value: &str) -> Self {
        Selection::Single(value.to_string())
    }
}

impl From<String> for Selection {
    fn from(value: String) -> Self {
        Selection::Single(value)
    }
}

impl From<Vec<String>> for Selection {
    fn from(values: Vec<String>) -> Self {
        Selection::Multi(values)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSelection {
    selections: BTreeMap<Facet, Selection>,
}

impl FilterSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn select(mut self, facet: Facet, selection: impl Into<Selection>) -> Self {
        self.set(facet, selection);
        self
    }

    pub fn set(&mut self, facet: Facet, selection: impl Into<Selection>) {
        self.selections.insert(facet, selection.into());
    }

    pub fn clear(&mut self, facet: Facet) {
        self.selections.remove(&facet);
    }

    pub fn get(&self, facet: Facet) -> Option<&Selection> {
        self.selections.get(&facet)
    }

    /// No facet contributes a value.
    pub fn is_empty(&self) -> bool {
        self.selections.values().all(|s| s.effective().is_none())
    }

    /// `(field, value)` pairs in facet order, skipping facets with nothing selected.
    pub fn to_query_pairs(&self) -> Vec<(&'static str, &str)> {
        self.selections
            .iter()
            .filter_map(|(facet, selection)| Some((facet.field(), selection.effective()?)))
            .collect()
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }

    /// Path of the record fetch for this selection, relative to the API root.
    pub fn data_path(&self) -> String {
        let query = self.to_query_string();
        if query.is_empty() {
            "/data".to_string()
        } else {
            format!("/data?{query}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_selection_fetches_everything() {
        let selection = FilterSelection::new();
        assert!(selection.is_empty());
        assert_eq!(selection.data_path(), "/data");
    }

    #[test]
    fn multi_select_sends_only_the_first_value() {
        let selection = FilterSelection::new().select(
            Facet::Region,
            vec!["Europe".to_string(), "Asia".to_string()],
        );
        assert_eq!(selection.to_query_pairs(), vec![("region", "Europe")]);
    }

    #[test]
    fn empty_values_are_never_sent() {
        let selection = FilterSelection::new()
            .select(Facet::Topic, "")
            .select(Facet::Sector, Vec::<String>::new())
            .select(Facet::City, vec![String::new(), "Paris".to_string()]);
        assert!(selection.is_empty());
        assert_eq!(selection.data_path(), "/data");
    }

    #[test]
    fn pairs_follow_facet_order_and_are_encoded() {
        let selection = FilterSelection::new()
            .select(Facet::Topic, "oil & gas")
            .select(Facet::EndYear, "2030")
            .select(Facet::Region, "Northern America");
        assert_eq!(
            selection.data_path(),
            "/data?end_year=2030&region=Northern+America&topic=oil+%26+gas"
        );
    }

    #[test]
    fn clearing_a_facet_removes_it() {
        let mut selection = FilterSelection::new().select(Facet::Topic, "oil");
        selection.clear(Facet::Topic);
        assert!(selection.get(Facet::Topic).is_none());
        assert!(selection.is_empty());
    }
}
