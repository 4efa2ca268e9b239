use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::Facet;

/// Distinct values per facet, as served by `/filters`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FacetLists {
    pub regions: Vec<String>,
    pub topics: Vec<String>,
    pub sectors: Vec<String>,
    pub pestles: Vec<String>,
    pub sources: Vec<String>,
    pub countries: Vec<String>,
    #[serde(rename = "endYears")]
    pub end_years: Vec<String>,
    pub swots: Vec<String>,
    pub cities: Vec<String>,
}

impl FacetLists {
    pub fn get(&self, facet: Facet) -> &[String] {
        match facet {
            Facet::EndYear => &self.end_years,
            Facet::Region => &self.regions,
            Facet::Topic => &self.topics,
            Facet::Sector => &self.sectors,
            Facet::Pestle => &self.pestles,
            Facet::Source => &self.sources,
            Facet::Swot => &self.swots,
            Facet::Country => &self.countries,
            Facet::City => &self.cities,
        }
    }

    pub fn set(&mut self, facet: Facet, values: Vec<String>) {
        let slot = match facet {
            Facet::EndYear => &mut self.end_years,
            Facet::Region => &mut self.regions,
            Facet::Topic => &mut self.topics,
            Facet::Sector => &mut self.sectors,
            Facet::Pestle => &mut self.pestles,
            Facet::Source => &mut self.sources,
            Facet::Swot => &mut self.swots,
            Facet::Country => &mut self.countries,
            Facet::City => &mut self.cities,
        };
        *slot = values;
    }

    pub fn is_empty(&self) -> bool {
        Facet::ALL.iter().all(|f| self.get(*f).is_empty())
    }
}

/// Turn raw distinct values into a dropdown list: nulls dropped, everything
/// stringified, blanks dropped, sorted ascending, duplicates removed.
///
/// Duplicates can only appear after stringifying (`2020` and `"2020"`).
pub fn sanitize_facet_values(values: Vec<Value>) -> Vec<String> {
    let mut out: Vec<String> = values
        .into_iter()
        .filter_map(|value| match value {
            Value::Null => None,
            Value::String(s) => Some(s),
            other => Some(other.to_string()),
        })
        .filter(|s| !s.trim().is_empty())
        .collect();
    out.sort();
    out.dedup();
    out
}
