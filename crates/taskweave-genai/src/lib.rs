//! TaskWeave Generation Boundary
//!
//! Structured-output generation behind a trait, with every response
//! validated against the JSON schema of its target type.
//!
//! # Core Concepts
//!
//! - [`GenerationClient`]: Async collaborator that produces raw JSON
//! - [`GenerationRequest`]: Prompt, system instruction, schema and options
//! - [`generate_structured`]: Call-and-validate helper returning typed output
//! - [`SchemaValidationError`]: Carries the raw payload for audit trails
//!
//! # Example
//!
//! ```rust,ignore
//! use taskweave_genai::{generate_structured, GenerationOptions, GenerationRequest};
//!
//! let request = GenerationRequest::new(
//!     prompt,
//!     system_instruction,
//!     taskweave_genai::response_schema::<MyOutput>(),
//!     GenerationOptions::new("planner").with_temperature(0.2),
//! );
//! let output: MyOutput = generate_structured(&client, &request).await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
mod client;
mod schema;

// Re-exports
pub use client::{
    generate_structured, GenerationClient, GenerationError, GenerationOptions, GenerationRequest,
};
pub use schema::{parse_validated, response_schema, FieldError, SchemaValidationError};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
