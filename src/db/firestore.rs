// SPDX-License-Identifier: MIT
// Copyright 2026 The gym-roster authors

//! Firestore client wrapper with typed operations.
//!
//! Provides the [`MemberStore`] operations over three collections:
//! - Owners (profile and push delivery address)
//! - Members (one document per member, keyed by id)
//! - Trainers
//!
//! Dates are stored as native Firestore timestamps so range filters compare
//! chronologically.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use firestore::FirestoreTimestamp;
use serde::{Deserialize, Serialize};

use crate::db::{collections, MemberFilter, MemberStore};
use crate::error::AppError;
use crate::models::{Member, Owner, Trainer};

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
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

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create an offline client. Every operation returns a database error.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    async fn query_members_for_owner(&self, owner_id: &str) -> Result<Vec<Member>, AppError> {
        let docs: Vec<MemberDocument> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MEMBERS)
            .filter(|q| q.for_all([q.field("ownerId").eq(owner_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs.into_iter().map(Member::from).collect())
    }
}

#[async_trait]
impl MemberStore for FirestoreDb {
    // ─── Member Operations ───────────────────────────────────────

    async fn insert_member(&self, member: &Member) -> Result<(), AppError> {
        self.update_member(member).await
    }

    async fn get_member(&self, id: &str) -> Result<Option<Member>, AppError> {
        let doc: Option<MemberDocument> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::MEMBERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc.map(Member::from))
    }

    async fn update_member(&self, member: &Member) -> Result<(), AppError> {
        let doc = MemberDocument::from(member);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::MEMBERS)
            .document_id(&member.id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn delete_member(&self, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collections::MEMBERS)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn find_members(
        &self,
        owner_id: &str,
        filter: &MemberFilter,
    ) -> Result<Vec<Member>, AppError> {
        let query = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MEMBERS);

        let docs: Vec<MemberDocument> = match filter {
            // Firestore has no substring operator; filter the owner's members here.
            MemberFilter::All | MemberFilter::NameContains(_) => {
                let members = self.query_members_for_owner(owner_id).await?;
                return Ok(members.into_iter().filter(|m| filter.matches(m)).collect());
            }
            MemberFilter::EndsOnOrAfter(t) => {
                let t = FirestoreTimestamp(*t);
                query
                    .filter(move |q| {
                        q.for_all([
                            q.field("ownerId").eq(owner_id),
                            q.field("membershipEndDate")
                                .greater_than_or_equal(t.clone()),
                        ])
                    })
                    .obj()
                    .query()
                    .await
            }
            MemberFilter::EndsBefore(t) => {
                let t = FirestoreTimestamp(*t);
                query
                    .filter(move |q| {
                        q.for_all([
                            q.field("ownerId").eq(owner_id),
                            q.field("membershipEndDate").less_than(t.clone()),
                        ])
                    })
                    .obj()
                    .query()
                    .await
            }
            MemberFilter::Trainer(trainer_id) => {
                query
                    .filter(|q| {
                        q.for_all([
                            q.field("ownerId").eq(owner_id),
                            q.field("trainerId").eq(trainer_id.as_str()),
                        ])
                    })
                    .obj()
                    .query()
                    .await
            }
        }
        .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs.into_iter().map(Member::from).collect())
    }

    async fn count_members_overlapping(
        &self,
        owner_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<u64, AppError> {
        // One range field per query keeps this within the default index set;
        // the end-date half of the overlap test runs here.
        let upper = FirestoreTimestamp(to);
        let docs: Vec<MemberDocument> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MEMBERS)
            .filter(move |q| {
                q.for_all([
                    q.field("ownerId").eq(owner_id),
                    q.field("membershipStartDate")
                        .less_than_or_equal(upper.clone()),
                ])
            })
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        let count = docs
            .iter()
            .filter(|d| d.membership_end_date >= from)
            .count();
        Ok(count as u64)
    }

    async fn find_members_expiring_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Member>, AppError> {
        let (from, to) = (FirestoreTimestamp(from), FirestoreTimestamp(to));
        let docs: Vec<MemberDocument> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::MEMBERS)
            .filter(move |q| {
                q.for_all([
                    q.field("membershipEndDate")
                        .greater_than_or_equal(from.clone()),
                    q.field("membershipEndDate").less_than_or_equal(to.clone()),
                ])
            })
            .order_by([(
                "membershipEndDate",
                firestore::FirestoreQueryDirection::Ascending,
            )])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs.into_iter().map(Member::from).collect())
    }

    // ─── Trainer Operations ──────────────────────────────────────

    async fn insert_trainer(&self, trainer: &Trainer) -> Result<(), AppError> {
        let doc = TrainerDocument::from(trainer);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::TRAINERS)
            .document_id(&trainer.id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    async fn get_trainer(&self, id: &str) -> Result<Option<Trainer>, AppError> {
        let doc: Option<TrainerDocument> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::TRAINERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc.map(Trainer::from))
    }

    async fn list_trainers(&self, owner_id: &str) -> Result<Vec<Trainer>, AppError> {
        let docs: Vec<TrainerDocument> = self
            .get_client()?
            .fluent()
            .select()
            .from(collections::TRAINERS)
            .filter(|q| q.for_all([q.field("ownerId").eq(owner_id)]))
            .order_by([("name", firestore::FirestoreQueryDirection::Ascending)])
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(docs.into_iter().map(Trainer::from).collect())
    }

    // ─── Owner Operations ────────────────────────────────────────

    async fn get_owner(&self, id: &str) -> Result<Option<Owner>, AppError> {
        let doc: Option<OwnerDocument> = self
            .get_client()?
            .fluent()
            .select()
            .by_id_in(collections::OWNERS)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(doc.map(Owner::from))
    }

    async fn upsert_owner(&self, owner: &Owner) -> Result<(), AppError> {
        let doc = OwnerDocument::from(owner);
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::OWNERS)
            .document_id(&owner.id)
            .object(&doc)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}

// ─── Stored Document Shapes ──────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MemberDocument {
    id: String,
    owner_id: String,
    name: String,
    gender: String,
    dob: NaiveDate,
    height: Option<f64>,
    weight: Option<f64>,
    photo_url: Option<String>,
    trainer_id: Option<String>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    membership_start_date: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    membership_end_date: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    created_at: DateTime<Utc>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    updated_at: DateTime<Utc>,
}

impl From<&Member> for MemberDocument {
    fn from(m: &Member) -> Self {
        Self {
            id: m.id.clone(),
            owner_id: m.owner_id.clone(),
            name: m.name.clone(),
            gender: m.gender.clone(),
            dob: m.dob,
            height: m.height,
            weight: m.weight,
            photo_url: m.photo_url.clone(),
            trainer_id: m.trainer_id.clone(),
            membership_start_date: m.membership_start_date,
            membership_end_date: m.membership_end_date,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}

impl From<MemberDocument> for Member {
    fn from(d: MemberDocument) -> Self {
        Self {
            id: d.id,
            owner_id: d.owner_id,
            name: d.name,
            gender: d.gender,
            dob: d.dob,
            height: d.height,
            weight: d.weight,
            photo_url: d.photo_url,
            trainer_id: d.trainer_id,
            membership_start_date: d.membership_start_date,
            membership_end_date: d.membership_end_date,
            created_at: d.created_at,
            updated_at: d.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrainerDocument {
    id: String,
    owner_id: String,
    name: String,
    gender: String,
    #[serde(with = "firestore::serialize_as_timestamp")]
    created_at: DateTime<Utc>,
}

impl From<&Trainer> for TrainerDocument {
    fn from(t: &Trainer) -> Self {
        Self {
            id: t.id.clone(),
            owner_id: t.owner_id.clone(),
            name: t.name.clone(),
            gender: t.gender.clone(),
            created_at: t.created_at,
        }
    }
}

impl From<TrainerDocument> for Trainer {
    fn from(d: TrainerDocument) -> Self {
        Self {
            id: d.id,
            owner_id: d.owner_id,
            name: d.name,
            gender: d.gender,
            created_at: d.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OwnerDocument {
    id: String,
    name: Option<String>,
    email: Option<String>,
    fcm_token: Option<String>,
    #[serde(with = "firestore::serialize_as_timestamp")]
    updated_at: DateTime<Utc>,
}

impl From<&Owner> for OwnerDocument {
    fn from(o: &Owner) -> Self {
        Self {
            id: o.id.clone(),
            name: o.name.clone(),
            email: o.email.clone(),
            fcm_token: o.fcm_token.clone(),
            updated_at: o.updated_at,
        }
    }
}

impl From<OwnerDocument> for Owner {
    fn from(d: OwnerDocument) -> Self {
        Self {
            id: d.id,
            name: d.name,
            email: d.email,
            fcm_token: d.fcm_token,
            updated_at: d.updated_at,
        }
    }
}
