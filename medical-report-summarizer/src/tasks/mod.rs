pub mod lab_values;
pub mod pdf_extract;
pub mod summary;

pub use lab_values::{DEFAULT_LAB_PATTERNS, LabPattern, LabValueExtractor, extract_lab_values};
pub use pdf_extract::{extract_text_from_pdf, extract_text_from_pdf_bytes};
pub use summary::SummaryGenerator;
