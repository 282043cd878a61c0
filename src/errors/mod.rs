pub mod types;
pub mod classification;

pub use types::CrmBotError;
pub use classification::ErrorClassification;
