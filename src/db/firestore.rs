// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Health profiles
//! - Health metrics snapshots (append-only)
//! - Metrics acknowledgments (keyed by the exact snapshot identity)
//! - Nutrition plans (last plan per user)

use crate::db::{collections, snapshot_key};
use crate::error::AppError;
use crate::models::{Acknowledgment, HealthMetricsSnapshot, HealthProfile, StoredPlan};
use firestore::errors::FirestoreError;

/// Firestore-backed store.
#[derive(Clone)]
pub struct FirestoreStore {
    client: firestore::FirestoreDb,
}

impl FirestoreStore {
    /// Connect to Firestore.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn connect(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::connect_emulator(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self { client })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn connect_emulator(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self { client })
    }

    // ─── Profile Operations ──────────────────────────────────────

    pub async fn get_profile(&self, user_id: &str) -> Result<Option<HealthProfile>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::HEALTH_PROFILES)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn upsert_profile(&self, profile: &HealthProfile) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::HEALTH_PROFILES)
            .document_id(&profile.user_id)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Metrics Snapshot Operations ─────────────────────────────

    /// All snapshots computed for a user on one UTC day.
    pub async fn get_snapshots_for_day(
        &self,
        user_id: &str,
        day: &str,
    ) -> Result<Vec<HealthMetricsSnapshot>, AppError> {
        let user_id = user_id.to_string();
        let day = day.to_string();

        self.client
            .fluent()
            .select()
            .from(collections::HEALTH_METRICS)
            .filter(move |q| {
                q.for_all([
                    q.field("userId").eq(user_id.clone()),
                    q.field("computedDay").eq(day.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Highest snapshot version ever issued to a user.
    pub async fn latest_snapshot_version(&self, user_id: &str) -> Result<Option<i64>, AppError> {
        let user_id = user_id.to_string();

        let latest: Vec<HealthMetricsSnapshot> = self
            .client
            .fluent()
            .select()
            .from(collections::HEALTH_METRICS)
            .filter(move |q| q.for_all([q.field("userId").eq(user_id.clone())]))
            .order_by([("version", firestore::FirestoreQueryDirection::Descending)])
            .limit(1)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(latest.first().map(|s| s.version))
    }

    /// Store a new snapshot. Snapshots are never updated in place.
    pub async fn insert_snapshot(&self, snapshot: &HealthMetricsSnapshot) -> Result<(), AppError> {
        let doc_id = snapshot_key(&snapshot.user_id, snapshot.version, snapshot.computed_at);

        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::HEALTH_METRICS)
            .document_id(&doc_id)
            .object(snapshot)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Acknowledgment Operations ───────────────────────────────

    pub async fn get_acknowledgment(
        &self,
        doc_id: &str,
    ) -> Result<Option<Acknowledgment>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::METRICS_ACKNOWLEDGMENTS)
            .obj()
            .one(doc_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Store an acknowledgment unless one already exists for the same key.
    ///
    /// The write is create-only, so when two acknowledgments of the same
    /// snapshot race exactly one is stored and both callers get it back.
    pub async fn record_acknowledgment(
        &self,
        doc_id: &str,
        ack: &Acknowledgment,
    ) -> Result<Acknowledgment, AppError> {
        let inserted: Result<Acknowledgment, FirestoreError> = self
            .client
            .fluent()
            .insert()
            .into(collections::METRICS_ACKNOWLEDGMENTS)
            .document_id(doc_id)
            .object(ack)
            .execute()
            .await;

        match inserted {
            Ok(_) => Ok(ack.clone()),
            Err(FirestoreError::DataConflictError(_)) => {
                tracing::debug!("Acknowledgment already recorded (idempotent skip)");
                self.get_acknowledgment(doc_id).await?.ok_or_else(|| {
                    AppError::Database(format!("Acknowledgment {} vanished after conflict", doc_id))
                })
            }
            Err(e) => Err(AppError::Database(format!(
                "Failed to store acknowledgment: {}",
                e
            ))),
        }
    }

    // ─── Plan Operations ─────────────────────────────────────────

    pub async fn get_plan(&self, user_id: &str) -> Result<Option<StoredPlan>, AppError> {
        self.client
            .fluent()
            .select()
            .by_id_in(collections::NUTRITION_PLANS)
            .obj()
            .one(user_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    pub async fn set_plan(&self, plan: &StoredPlan) -> Result<(), AppError> {
        let _: () = self
            .client
            .fluent()
            .update()
            .in_col(collections::NUTRITION_PLANS)
            .document_id(&plan.user_id)
            .object(plan)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
