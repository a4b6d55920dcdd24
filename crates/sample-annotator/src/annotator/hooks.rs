//! Extension points for the text-mining and inference stages.

use crate::error::Result;
use crate::report::AnnotationReport;
use crate::sample::Sample;

/// A step plugged into the text-mining or inference stage.
///
/// Hooks see the working copy of the sample after the earlier stages have
/// run. Findings go on the report as messages; an `Err` is reported as a
/// stage failure and the pipeline carries on.
pub trait SampleHook: Send + Sync {
    /// Name used in logs and failure messages.
    fn name(&self) -> &str;

    fn apply(&self, sample: &mut Sample, report: &mut AnnotationReport) -> Result<()>;
}

impl<F> SampleHook for (&'static str, F)
where
    F: Fn(&mut Sample, &mut AnnotationReport) -> Result<()> + Send + Sync,
{
    fn name(&self) -> &str {
        self.0
    }

    fn apply(&self, sample: &mut Sample, report: &mut AnnotationReport) -> Result<()> {
        (self.1)(sample, report)
    }
}
