pub mod catalog;
pub mod enrich;
pub mod renderer;

pub use catalog::{ReportDefinition, ReportType, REPORT_CATALOG};
pub use renderer::render;
