//! sdkgen generates typed API client libraries from OpenAPI documents.
//!
//! The [`generation`] core turns a parsed document into a language-neutral
//! [`generation::ApiModel`]; the [`infrastructure`] layer loads documents and
//! renders the model as a Go package; the [`application`] layer wires both
//! into the `generate` use case.
#![deny(unsafe_code)]

pub mod application;
pub mod generation;
pub mod infrastructure;
