//! Check execution engine.
//!
//! Provides ignore-list policy, check orchestration and result aggregation.

pub mod ignore;
pub mod orchestrator;
pub mod result;
