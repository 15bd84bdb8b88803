// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! NutriPlan: nutrition plans gated on acknowledged health metrics
//!
//! This crate provides the backend API that computes daily calorie,
//! protein and water targets, plus the client-side plan cache and request
//! orchestrator that talk to it.

pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{AcknowledgmentService, MetricsGate, MetricsJob, PlanService, ProfileService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub gate: MetricsGate,
    pub metrics_job: MetricsJob,
    pub acknowledgments: AcknowledgmentService,
    pub plans: PlanService,
    pub profiles: ProfileService,
}

impl AppState {
    /// Wire up all services over one database handle.
    pub fn new(config: Config, db: Database) -> Self {
        let gate = MetricsGate::new(db.clone());
        let metrics_job = MetricsJob::new(db.clone());
        let plans = PlanService::new(
            db.clone(),
            gate.clone(),
            chrono::Duration::minutes(config.plan_reuse_minutes),
        );
        let profiles = ProfileService::new(db.clone(), metrics_job.clone(), plans.clone());

        Self {
            acknowledgments: AcknowledgmentService::new(db.clone()),
            config,
            db,
            gate,
            metrics_job,
            plans,
            profiles,
        }
    }
}
