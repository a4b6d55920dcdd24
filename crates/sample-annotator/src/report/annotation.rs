//! Per-sample and batch annotation reports.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AnnotatorError, Result};
use crate::sample::Sample;

use super::message::{Category, Message, Severity};

/// One row of the tabular message projection.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MessageRow {
    pub description: String,
    pub severity: u8,
    pub field: String,
    pub repaired: String,
    pub category: String,
}

impl From<&Message> for MessageRow {
    fn from(msg: &Message) -> Self {
        Self {
            description: msg.description.clone(),
            severity: msg.severity.0,
            field: msg.field.clone().unwrap_or_default(),
            repaired: msg.repaired.label().to_string(),
            category: msg.category.name().to_string(),
        }
    }
}

/// A message row tagged with the sample it came from.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchMessageRow {
    pub sample: String,
    pub description: String,
    pub severity: u8,
    pub field: String,
    pub repaired: String,
    pub category: String,
}

/// Message counts by severity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub info: usize,
    pub low: usize,
    pub medium: usize,
    pub high: usize,
}

impl SeverityCounts {
    fn record(&mut self, severity: Severity) {
        match severity.0 {
            0 => self.info += 1,
            1 => self.low += 1,
            2 => self.medium += 1,
            _ => self.high += 1,
        }
    }
}

/// Findings for one annotated sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnnotationReport {
    /// Messages in the order they were logged.
    pub messages: Vec<Message>,
    /// Resolved environmental package.
    pub package: Option<String>,
    /// Resolved checklist.
    pub checklist: Option<String>,
    /// The sample as handed to the annotator.
    pub input: Sample,
    /// The tidied sample.
    pub output: Sample,
    /// Resolved sample identifier.
    pub identifier: Option<String>,
    /// Reserved for a downstream sufficiency metric; never computed here.
    pub sufficiency_score: Option<f64>,
    /// When annotation started.
    pub annotated_at: DateTime<Utc>,
}

impl AnnotationReport {
    /// Create an empty report for an input sample.
    pub fn new(input: Sample) -> Self {
        Self {
            messages: Vec::new(),
            package: None,
            checklist: None,
            input,
            output: Sample::new(),
            identifier: None,
            sufficiency_score: None,
            annotated_at: Utc::now(),
        }
    }

    /// Append a message.
    pub fn add_message(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// Highest severity across all messages; zero when there are none.
    pub fn max_severity(&self) -> Severity {
        self.messages
            .iter()
            .map(|m| m.severity)
            .max()
            .unwrap_or(Severity::INFO)
    }

    /// True when no message reports an issue.
    pub fn passes(&self) -> bool {
        !self.max_severity().is_issue()
    }

    /// Messages grouped by category.
    pub fn messages_by_category(&self) -> BTreeMap<Category, Vec<&Message>> {
        let mut groups: BTreeMap<Category, Vec<&Message>> = BTreeMap::new();
        for msg in &self.messages {
            groups.entry(msg.category).or_default().push(msg);
        }
        groups
    }

    /// Messages attached to a field.
    pub fn messages_for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a Message> {
        self.messages
            .iter()
            .filter(move |m| m.field.as_deref() == Some(field))
    }

    /// Messages in one category.
    pub fn messages_in(&self, category: Category) -> impl Iterator<Item = &Message> {
        self.messages.iter().filter(move |m| m.category == category)
    }

    /// Message counts by severity.
    pub fn summary(&self) -> SeverityCounts {
        let mut counts = SeverityCounts::default();
        for msg in &self.messages {
            counts.record(msg.severity);
        }
        counts
    }

    /// Tabular projection of the messages.
    pub fn rows(&self) -> Vec<MessageRow> {
        self.messages.iter().map(MessageRow::from).collect()
    }

    /// Write the tabular projection as delimited text with a header row.
    pub fn to_delimited(&self, delimiter: u8) -> Result<String> {
        write_rows(self.rows(), delimiter)
    }
}

/// Reports for a batch of samples.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnnotationMultiSampleReport {
    pub reports: Vec<AnnotationReport>,
}

impl AnnotationMultiSampleReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, report: AnnotationReport) {
        self.reports.push(report);
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &AnnotationReport> {
        self.reports.iter()
    }

    /// Tidied outputs, in input order.
    pub fn all_outputs(&self) -> Vec<&Sample> {
        self.reports.iter().map(|r| &r.output).collect()
    }

    /// Number of reports that pass.
    pub fn passing(&self) -> usize {
        self.reports.iter().filter(|r| r.passes()).count()
    }

    /// Combined tabular projection. Samples without a resolved identifier are
    /// labelled by their position in the batch.
    pub fn rows(&self) -> Vec<BatchMessageRow> {
        self.reports
            .iter()
            .enumerate()
            .flat_map(|(idx, report)| {
                let sample = report
                    .identifier
                    .clone()
                    .unwrap_or_else(|| format!("#{}", idx + 1));
                report.messages.iter().map(move |msg| {
                    let row = MessageRow::from(msg);
                    BatchMessageRow {
                        sample: sample.clone(),
                        description: row.description,
                        severity: row.severity,
                        field: row.field,
                        repaired: row.repaired,
                        category: row.category,
                    }
                })
            })
            .collect()
    }

    /// Write the combined projection as delimited text with a header row.
    pub fn to_delimited(&self, delimiter: u8) -> Result<String> {
        write_rows(self.rows(), delimiter)
    }
}

impl FromIterator<AnnotationReport> for AnnotationMultiSampleReport {
    fn from_iter<I: IntoIterator<Item = AnnotationReport>>(iter: I) -> Self {
        Self {
            reports: iter.into_iter().collect(),
        }
    }
}

fn write_rows<T: Serialize>(rows: Vec<T>, delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(Vec::new());
    for row in rows {
        writer.serialize(row)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| AnnotatorError::Config(format!("flushing table: {}", e)))?;
    String::from_utf8(bytes).map_err(|e| AnnotatorError::Config(format!("table encoding: {}", e)))
}
