//! Shared test utilities for the Strata workspace.
//!
//! This crate provides standardised fixtures so crate test suites do not
//! each hand-roll directory layouts. It is a dev-dependency only, never
//! published.
//!
//! # Modules
//!
//! - [`workspace`]: [`TestWorkspace`](workspace::TestWorkspace), a project
//!   directory paired with an isolated global directory
//! - [`fixtures`]: layer and descriptor snippets reused across suites

pub mod fixtures;
pub mod workspace;

pub use workspace::TestWorkspace;
