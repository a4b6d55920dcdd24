//! Diagnostic report model.

mod annotation;
mod message;

pub use annotation::{
    AnnotationMultiSampleReport, AnnotationReport, BatchMessageRow, MessageRow, SeverityCounts,
};
pub use message::{Category, Message, RepairStatus, Severity};
