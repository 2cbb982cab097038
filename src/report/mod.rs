/*!
 * Race Reporting
 * Record types and the sink interface for the reporting collaborator
 */

pub mod sink;
pub mod types;

pub use sink::{CollectingSink, JsonLinesSink, NullSink, ReportSink, StackCapture, TracingSink};
pub use types::{AccessInfo, AccessKind, RaceKey, RaceKind, RaceRecord, StackTrace};
