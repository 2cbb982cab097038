/*!
 * Detector Builder
 * Builder pattern for Detector construction
 */

use super::{Detector, DetectorOptions};
use crate::core::errors::DetectorResult;
use crate::report::{ReportSink, StackCapture, TracingSink};
use std::sync::Arc;

/// Builder for [`Detector`]
pub struct DetectorBuilder {
    options: DetectorOptions,
    sink: Option<Arc<dyn ReportSink>>,
    stack_capture: Option<Arc<dyn StackCapture>>,
}

impl DetectorBuilder {
    pub fn new() -> Self {
        Self {
            options: DetectorOptions::default(),
            sink: None,
            stack_capture: None,
        }
    }

    /// Replace all options
    pub fn with_options(mut self, options: DetectorOptions) -> Self {
        self.options = options;
        self
    }

    /// Enable sampling at `rate`
    pub fn with_sampling(mut self, rate: u64) -> Self {
        self.options = self.options.with_sampling(rate);
        self
    }

    /// Where race records go (default: [`TracingSink`])
    pub fn with_sink(mut self, sink: Arc<dyn ReportSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Install a stack source and turn stack capture on
    pub fn with_stack_capture(mut self, capture: Arc<dyn StackCapture>) -> Self {
        self.stack_capture = Some(capture);
        self.options.capture_stacks = true;
        self
    }

    /// Validate the options and build the detector
    pub fn build(self) -> DetectorResult<Detector> {
        self.options.validate()?;
        let sink = self.sink.unwrap_or_else(|| Arc::new(TracingSink));
        Ok(Detector::assemble(self.options, sink, self.stack_capture))
    }
}

impl Default for DetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
