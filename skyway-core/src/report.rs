use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum ReportType {
    Upcoming,
    InProgress,
    Completed,
}

impl ReportType {
    pub const ALL: [ReportType; 3] = [
        ReportType::Upcoming,
        ReportType::InProgress,
        ReportType::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportType::Upcoming => "upcoming",
            ReportType::InProgress => "in_progress",
            ReportType::Completed => "completed",
        }
    }
}

impl fmt::Display for ReportType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| CoreError::UnknownVariant { kind: "report type", value: s.to_string() })
    }
}

/// Body of `POST reports/flights`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct GenerateReportRequest {
    pub report_types: Vec<ReportType>,
}

impl GenerateReportRequest {
    /// Duplicates are dropped, selection order is kept. An empty selection
    /// never reaches the server.
    pub fn new(report_types: &[ReportType]) -> CoreResult<Self> {
        let selected = distinct(report_types);
        if selected.is_empty() {
            return Err(CoreError::ValidationError(
                "Please select at least one report type".to_string(),
            ));
        }
        Ok(Self { report_types: selected })
    }
}

fn distinct(report_types: &[ReportType]) -> Vec<ReportType> {
    let mut selected = Vec::with_capacity(report_types.len());
    for t in report_types {
        if !selected.contains(t) {
            selected.push(*t);
        }
    }
    selected
}

/// `flight_report_upcoming_completed_2025-06-01.pdf`, naming each selected
/// type once.
pub fn report_filename(report_types: &[ReportType], date: NaiveDate) -> String {
    let types = distinct(report_types)
        .iter()
        .map(ReportType::as_str)
        .collect::<Vec<_>>()
        .join("_");
    format!("flight_report_{}_{}.pdf", types, date.format("%Y-%m-%d"))
}
