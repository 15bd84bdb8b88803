// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod acknowledgment;
pub mod change;
pub mod gate;
pub mod metrics_job;
pub mod nutrition;
pub mod plan;
pub mod profile;

pub use acknowledgment::AcknowledgmentService;
pub use change::is_significant;
pub use gate::{GateDecision, MetricsGate};
pub use metrics_job::{JobOutcome, MetricsJob};
pub use nutrition::compute_targets;
pub use plan::PlanService;
pub use profile::ProfileService;
