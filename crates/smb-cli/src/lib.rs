//! Library side of the beer-market pipeline CLI: configuration, logging
//! and the step orchestrator.

#![allow(missing_docs)]
#![allow(clippy::redundant_closure_for_method_calls)]

pub mod config;
pub mod logging;
pub mod pipeline;
pub mod types;
