//! KPI aggregation over canonical items.
//!
//! [`aggregate`] is a pure function of the item sequence: totals, the
//! average ticket, category and status distributions in first-seen order,
//! and a monthly timeline. Distribution labels go through the Stage-B
//! status re-bucketing, so an item keeps its own label while the chart
//! groups it canonically; the two views are intentionally allowed to
//! disagree.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use fxb_adapter::CanonicalItem;
use fxb_normalize::{canonical_status_label, parse_date_text, FormatOrder, Parsed, NA_TEXT};

/// Fixed chart palette, assigned cyclically by group index.
pub const PALETTE: [&str; 5] = ["#F97316", "#14B8A6", "#3B82F6", "#EF4444", "#8B5CF6"];

/// Capitalized PT-BR month abbreviations for timeline labels.
const SHORT_MONTHS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Color for the distribution group at `index`. Pure function of the
/// index; no counter state.
pub fn palette_color(index: usize) -> &'static str {
    PALETTE[index % PALETTE.len()]
}

/// One status-distribution group, wire-compatible with the chart layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSlice {
    #[serde(rename = "name")]
    pub label: String,
    #[serde(rename = "value")]
    pub count: u64,
    pub color: String,
}

/// One category-distribution group: item count plus summed value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategorySlice {
    #[serde(rename = "name")]
    pub label: String,
    #[serde(rename = "value")]
    pub count: u64,
    pub total: f64,
}

/// One monthly bucket of summed value, labeled "Jan 24" style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelinePoint {
    #[serde(rename = "date")]
    pub label: String,
    pub value: f64,
}

/// Read-only aggregate over one batch of canonical items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiMetrics {
    pub total_value: f64,
    pub total_processes: u64,
    pub average_value: f64,
    pub top_category: String,
    pub status_distribution: Vec<StatusSlice>,
    pub category_distribution: Vec<CategorySlice>,
    #[serde(rename = "timelineData")]
    pub timeline: Vec<TimelinePoint>,
}

/// Computes the KPI bundle. Deterministic given input order; an empty batch
/// yields zeroed totals and empty distributions.
pub fn aggregate(items: &[CanonicalItem]) -> KpiMetrics {
    let total_value: f64 = items.iter().map(|item| item.value).sum();
    let total_processes = items.len() as u64;
    let average_value = if items.is_empty() {
        0.0
    } else {
        total_value / items.len() as f64
    };

    let category_distribution = category_distribution(items);
    let top_category = top_category(&category_distribution);
    let status_distribution = status_distribution(items);
    let timeline = timeline(items);

    KpiMetrics {
        total_value,
        total_processes,
        average_value,
        top_category,
        status_distribution,
        category_distribution,
        timeline,
    }
}

fn category_distribution(items: &[CanonicalItem]) -> Vec<CategorySlice> {
    let mut slices: Vec<CategorySlice> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    for item in items {
        let index = match index_by_label.get(item.category.as_str()) {
            Some(&index) => index,
            None => {
                index_by_label.insert(item.category.clone(), slices.len());
                slices.push(CategorySlice {
                    label: item.category.clone(),
                    count: 0,
                    total: 0.0,
                });
                slices.len() - 1
            }
        };
        slices[index].count += 1;
        slices[index].total += item.value;
    }
    slices
}

/// Highest item count wins; on ties the first-seen group stays.
fn top_category(slices: &[CategorySlice]) -> String {
    let mut top = NA_TEXT.to_string();
    let mut max_count = 0;
    for slice in slices {
        if slice.count > max_count {
            max_count = slice.count;
            top = slice.label.clone();
        }
    }
    top
}

fn status_distribution(items: &[CanonicalItem]) -> Vec<StatusSlice> {
    let mut slices: Vec<StatusSlice> = Vec::new();
    let mut index_by_label: HashMap<String, usize> = HashMap::new();

    for item in items {
        let label = canonical_status_label(&item.status);
        let index = match index_by_label.get(label.as_ref()) {
            Some(&index) => index,
            None => {
                let color = palette_color(slices.len()).to_string();
                index_by_label.insert(label.to_string(), slices.len());
                slices.push(StatusSlice {
                    label: label.to_string(),
                    count: 0,
                    color,
                });
                slices.len() - 1
            }
        };
        slices[index].count += 1;
    }
    slices
}

/// Buckets item values by calendar month of the parsed date, ascending.
/// Items whose date cannot be parsed are excluded here only.
fn timeline(items: &[CanonicalItem]) -> Vec<TimelinePoint> {
    let mut buckets: Vec<(NaiveDate, f64)> = Vec::new();
    let mut index_by_month: HashMap<NaiveDate, usize> = HashMap::new();

    for item in items {
        if item.date.is_empty() || item.date == NA_TEXT {
            continue;
        }
        // Items normally carry the already-normalized display form, so
        // dd/mm/yyyy is tried first on the re-parse.
        let date = match parse_date_text(&item.date, FormatOrder::DisplayFirst) {
            Parsed::Value(date) => date,
            Parsed::Fallback(_) => continue,
        };
        let month = date.with_day(1).unwrap_or(date);
        let index = match index_by_month.get(&month) {
            Some(&index) => index,
            None => {
                index_by_month.insert(month, buckets.len());
                buckets.push((month, 0.0));
                buckets.len() - 1
            }
        };
        buckets[index].1 += item.value;
    }

    buckets.sort_by_key(|(month, _)| *month);
    buckets
        .into_iter()
        .map(|(month, value)| TimelinePoint {
            label: month_label(month),
            value,
        })
        .collect()
}

fn month_label(month: NaiveDate) -> String {
    let abbr = SHORT_MONTHS[month.month0() as usize];
    format!("{} {:02}", abbr, month.year().rem_euclid(100))
}
