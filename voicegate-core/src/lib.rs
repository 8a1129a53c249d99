pub mod call;
pub mod config;
pub mod messages;
pub mod prompt;
pub mod rules;
pub mod tools;
pub mod types;

// Keep the public surface small and intentional.
pub use call::{ArgValue, ParsedCall, parse_function_call};
pub use config::*;
pub use prompt::{GenerationRequest, build_generation_request};
pub use rules::{ValidationOutcome, ValidationResult};
pub use tools::{ToolSchema, UnknownToolError};
pub use types::*;
