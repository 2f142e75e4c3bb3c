//! corpagent-review
//!
//! The document review pipeline built around a [`CitationSource`]:
//! extraction, type detection, red-flag scanning, checklist verification,
//! annotated copies and the JSON report.
//!
//! [`CitationSource`]: corpagent_core::traits::CitationSource

pub mod annotate;
pub mod checklist;
pub mod classify;
pub mod extract;
pub mod red_flags;
pub mod report;
pub mod session;

pub use classify::{detect_document_type, Detection, UNKNOWN_TYPE};
pub use extract::{PlainTextExtractor, TextExtractor};
pub use report::{assemble_report, ChecklistEntry, ComplianceStatus, FileDetection, Report};
pub use session::{FileReview, ReviewOutcome, ReviewSession};
