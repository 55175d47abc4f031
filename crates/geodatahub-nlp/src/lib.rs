//! GeoDataHub NLP - Free-text request parsing
//!
//! Turns a plain-language request into a `DataRequest`: an optional LLM pass,
//! the rule-based extractor as fallback, caller overrides and geocoding of the
//! place name.

pub mod extract;
pub mod llm_schema;
pub mod parser;
pub mod prompt;

pub use extract::{extract, ExtractedFields};
pub use llm_schema::LlmParse;
pub use parser::{NlParser, Strategy};
pub use prompt::build_prompt;
