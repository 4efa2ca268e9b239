//! Chart-ready series computed from the currently displayed records.
//!
//! Every function is pure and accepts an empty slice, returning an empty
//! series. Grouping keeps labels in first-seen order, so sorts that only
//! look at the value leave ties in that order.
//!
//! The two per-year charts order their years differently: intensity sorts
//! year labels as strings, the record count sorts them as numbers with
//! `"Unknown"` last. Each chart keeps its own ordering.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use serde::Serialize;

use insights_common::Record;

pub const UNKNOWN_LABEL: &str = "Unknown";

const TOP_N: usize = 10;
const MAX_LABEL_CHARS: usize = 15;
const TRUNCATED_LABEL_CHARS: usize = 12;
const RELEVANCE_BINS: usize = 11;

/// Parallel label and value vectors, one entry per bar or point.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Series<T> {
    pub labels: Vec<String>,
    pub values: Vec<T>,
}

impl<T> Default for Series<T> {
    fn default() -> Self {
        Self {
            labels: Vec::new(),
            values: Vec::new(),
        }
    }
}

impl<T> Series<T> {
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, label: &str) -> Option<&T> {
        let i = self.labels.iter().position(|l| l == label)?;
        self.values.get(i)
    }
}

impl<T> FromIterator<(String, T)> for Series<T> {
    fn from_iter<I: IntoIterator<Item = (String, T)>>(iter: I) -> Self {
        let (labels, values) = iter.into_iter().unzip();
        Self { labels, values }
    }
}

// --- Grouping helpers ---

fn count_by<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, usize)> = Vec::new();
    for label in labels {
        match index.get(label) {
            Some(&i) => groups[i].1 += 1,
            None => {
                index.insert(label, groups.len());
                groups.push((label.to_string(), 1));
            }
        }
    }
    groups
}

fn mean_by<'a>(samples: impl Iterator<Item = (&'a str, f64)>) -> Vec<(String, f64)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<(String, f64, usize)> = Vec::new();
    for (label, value) in samples {
        match index.get(label) {
            Some(&i) => {
                groups[i].1 += value;
                groups[i].2 += 1;
            }
            None => {
                index.insert(label, groups.len());
                groups.push((label.to_string(), value, 1));
            }
        }
    }
    groups
        .into_iter()
        .map(|(label, sum, n)| (label, sum / n as f64))
        .collect()
}

fn by_value_desc<T: PartialOrd>(a: &(String, T), b: &(String, T)) -> Ordering {
    b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal)
}

/// A zero (or NaN) measure means "not rated" and is left out of averages.
fn is_rated(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

fn non_blank(value: &str) -> bool {
    !value.trim().is_empty()
}

fn or_unknown(value: &str) -> &str {
    if value.is_empty() {
        UNKNOWN_LABEL
    } else {
        value
    }
}

fn truncate_label(label: String) -> String {
    if label.chars().count() > MAX_LABEL_CHARS {
        let head: String = label.chars().take(TRUNCATED_LABEL_CHARS).collect();
        format!("{head}...")
    } else {
        label
    }
}

// --- Charts ---

/// Ten most frequent cities. Long names are shortened for axis labels.
pub fn records_by_city(records: &[Record]) -> Series<usize> {
    let mut groups = count_by(records.iter().map(|r| or_unknown(&r.city)));
    groups.sort_by(by_value_desc);
    groups
        .into_iter()
        .take(TOP_N)
        .map(|(city, n)| (truncate_label(city), n))
        .collect()
}

/// Mean intensity per end year, years ordered as strings.
pub fn intensity_by_year(records: &[Record]) -> Series<f64> {
    let mut groups = mean_by(
        records
            .iter()
            .filter(|r| !r.end_year.is_empty() && is_rated(r.intensity))
            .map(|r| (r.end_year.as_str(), r.intensity)),
    );
    groups.sort_by(|a, b| a.0.cmp(&b.0));
    groups.into_iter().collect()
}

/// Ten sectors with the highest mean likelihood.
pub fn likelihood_by_sector(records: &[Record]) -> Series<f64> {
    let mut groups = mean_by(
        records
            .iter()
            .filter(|r| non_blank(&r.sector) && is_rated(r.likelihood))
            .map(|r| (r.sector.as_str(), r.likelihood)),
    );
    groups.sort_by(by_value_desc);
    groups.into_iter().take(TOP_N).collect()
}

/// Record count for every region, in first-seen order.
pub fn records_by_region(records: &[Record]) -> Series<usize> {
    count_by(
        records
            .iter()
            .filter(|r| non_blank(&r.region))
            .map(|r| r.region.as_str()),
    )
    .into_iter()
    .collect()
}

/// Records per whole-number relevance score, bins `0` through `10`.
/// Scores outside that range are not counted anywhere.
pub fn relevance_histogram(records: &[Record]) -> Series<usize> {
    if records.is_empty() {
        return Series::default();
    }

    let mut bins = [0usize; RELEVANCE_BINS];
    for record in records {
        let bin = record.relevance.floor();
        if (0.0..RELEVANCE_BINS as f64).contains(&bin) {
            bins[bin as usize] += 1;
        }
    }

    bins.into_iter()
        .enumerate()
        .map(|(i, n)| (i.to_string(), n))
        .collect()
}

/// Record count per end year, chronological. Labels that are not numbers
/// follow the numeric years alphabetically, and `"Unknown"` always comes last.
pub fn records_by_year(records: &[Record]) -> Series<usize> {
    let mut groups = count_by(records.iter().map(|r| or_unknown(&r.end_year)));
    groups.sort_by(|a, b| year_order(&a.0, &b.0));
    groups.into_iter().collect()
}

fn year_order(a: &str, b: &str) -> Ordering {
    fn rank(label: &str) -> (u8, Option<f64>) {
        if label == UNKNOWN_LABEL {
            (2, None)
        } else {
            match label.trim().parse::<f64>() {
                Ok(n) if n.is_finite() => (0, Some(n)),
                _ => (1, None),
            }
        }
    }

    match (rank(a), rank(b)) {
        ((0, Some(x)), (0, Some(y))) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
        ((ra, _), (rb, _)) if ra != rb => ra.cmp(&rb),
        _ => a.cmp(b),
    }
}

/// Ten most frequent topics.
pub fn top_topics(records: &[Record]) -> Series<usize> {
    let mut groups = count_by(
        records
            .iter()
            .filter(|r| non_blank(&r.topic))
            .map(|r| r.topic.as_str()),
    );
    groups.sort_by(by_value_desc);
    groups.into_iter().take(TOP_N).collect()
}

// --- KPI tiles ---

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct KpiSummary {
    pub total_records: usize,
    pub avg_intensity: f64,
    pub avg_likelihood: f64,
    pub avg_relevance: f64,
    pub regions: usize,
    pub countries: usize,
}

/// Headline numbers. Averages run over every record (unrated counts as zero);
/// distinct counts include the empty value when any record lacks one.
pub fn kpi_summary(records: &[Record]) -> KpiSummary {
    let denominator = records.len().max(1) as f64;
    let mean = |f: fn(&Record) -> f64| records.iter().map(f).sum::<f64>() / denominator;

    KpiSummary {
        total_records: records.len(),
        avg_intensity: mean(|r| r.intensity),
        avg_likelihood: mean(|r| r.likelihood),
        avg_relevance: mean(|r| r.relevance),
        regions: records.iter().map(|r| r.region.as_str()).collect::<HashSet<_>>().len(),
        countries: records.iter().map(|r| r.country.as_str()).collect::<HashSet<_>>().len(),
    }
}

/// Everything the dashboard renders for one record set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardCharts {
    pub kpis: KpiSummary,
    pub by_city: Series<usize>,
    pub intensity_by_year: Series<f64>,
    pub likelihood_by_sector: Series<f64>,
    pub by_region: Series<usize>,
    pub relevance: Series<usize>,
    pub by_year: Series<usize>,
    pub topics: Series<usize>,
}

impl DashboardCharts {
    pub fn from_records(records: &[Record]) -> Self {
        Self {
            kpis: kpi_summary(records),
            by_city: records_by_city(records),
            intensity_by_year: intensity_by_year(records),
            likelihood_by_sector: likelihood_by_sector(records),
            by_region: records_by_region(records),
            relevance: relevance_histogram(records),
            by_year: records_by_year(records),
            topics: top_topics(records),
        }
    }
}
