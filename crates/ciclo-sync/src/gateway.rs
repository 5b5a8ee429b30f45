use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use ciclo_core::confession::Confession;
use ciclo_core::goal::{Goal, GoalId, SubTask};
use ciclo_core::identity::Identity;
use ciclo_core::pilar::{PilarDefinition, PilarProgress};
use ciclo_core::spark::{DailySpark, InteractionLog};
use ciclo_core::stats::UserStats;
use ciclo_core::types::ConfessionKind;

use crate::config::BackendConfig;
use crate::error::{Result, SyncError};
use crate::session::Session;

// ---------------------------------------------------------------------------
// Wire rows
// ---------------------------------------------------------------------------

/// The user's profile row: identity fields and gamification counters in
/// one table, keyed by the auth user id.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileRow {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dob: Option<String>,
    #[serde(default)]
    pub profession: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub north_star: Option<String>,
    #[serde(default)]
    pub current_identity: Option<String>,
    #[serde(default)]
    pub new_identity: Option<String>,
    #[serde(default)]
    pub blocker_reason: Option<String>,
    #[serde(default)]
    pub is_verified: bool,
    #[serde(default)]
    pub current_streak: u32,
    #[serde(default)]
    pub best_streak: u32,
    #[serde(default)]
    pub last_active_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub total_milestones: u32,
    #[serde(default)]
    pub xp: u32,
}

impl ProfileRow {
    /// Split the row into the two local entities it feeds.
    pub fn split(self) -> (Identity, UserStats) {
        let identity = Identity {
            name: self.name,
            dob: self.dob,
            profession: self.profession,
            email: self.email,
            device_id: self.device_id,
            north_star: self.north_star.unwrap_or_default(),
            current_identity: self.current_identity.unwrap_or_default(),
            new_identity: self.new_identity.unwrap_or_default(),
            blocker_reason: self.blocker_reason,
            is_verified: self.is_verified,
        };
        let stats = UserStats {
            current_streak: self.current_streak,
            best_streak: self.best_streak,
            last_active_date: self.last_active_date,
            total_milestones: self.total_milestones,
            xp: self.xp,
        };
        (identity, stats)
    }
}

/// Partial profile update. Only populated fields are serialized, so a
/// patch never clobbers columns it does not mention.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dob: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub north_star: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_identity: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blocker_reason: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_streak: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_active_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_milestones: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<u32>,
}

impl ProfilePatch {
    pub fn from_stats(stats: &UserStats) -> Self {
        Self {
            current_streak: Some(stats.current_streak),
            best_streak: Some(stats.best_streak),
            last_active_date: stats.last_active_date,
            total_milestones: Some(stats.total_milestones),
            xp: Some(stats.xp),
            ..Self::default()
        }
    }

    pub fn from_identity(identity: &Identity) -> Self {
        Self {
            name: identity.name.clone(),
            dob: identity.dob.clone(),
            profession: identity.profession.clone(),
            email: identity.email.clone(),
            device_id: identity.device_id.clone(),
            north_star: Some(identity.north_star.clone()),
            current_identity: Some(identity.current_identity.clone()),
            new_identity: Some(identity.new_identity.clone()),
            blocker_reason: identity.blocker_reason.clone(),
            ..Self::default()
        }
    }

    pub fn verified() -> Self {
        Self {
            is_verified: Some(true),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct GoalRow {
    id: Uuid,
    goal_title: String,
    #[serde(default)]
    target_date: Option<NaiveDate>,
    #[serde(default)]
    sub_tasks: Vec<SubTask>,
    #[serde(default)]
    progress_percentage: u8,
}

impl From<GoalRow> for Goal {
    fn from(row: GoalRow) -> Self {
        Goal {
            id: GoalId::Remote(row.id),
            goal_title: row.goal_title,
            target_date: row.target_date,
            sub_tasks: row.sub_tasks,
            progress_percentage: row.progress_percentage,
        }
    }
}

#[derive(Debug, Serialize)]
struct GoalUpsert<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    id: Option<Uuid>,
    user_id: &'a str,
    goal_title: &'a str,
    target_date: Option<NaiveDate>,
    sub_tasks: &'a [SubTask],
    progress_percentage: u8,
}

#[derive(Debug, Deserialize)]
struct ConfessionRow {
    id: Uuid,
    content: String,
    #[serde(rename = "type")]
    kind: ConfessionKind,
    timestamp: String,
    date: String,
    pilar_id: u32,
    #[serde(default)]
    session_name: Option<String>,
    #[serde(default)]
    note: Option<String>,
}

impl From<ConfessionRow> for Confession {
    fn from(row: ConfessionRow) -> Self {
        Confession {
            id: row.id,
            content: row.content,
            kind: row.kind,
            timestamp: row.timestamp,
            date: row.date,
            pilar_id: row.pilar_id,
            session_name: row.session_name,
            note: row.note,
        }
    }
}

#[derive(Debug, Serialize)]
struct ConfessionInsert<'a> {
    user_id: &'a str,
    content: &'a str,
    #[serde(rename = "type")]
    kind: ConfessionKind,
    timestamp: &'a str,
    date: &'a str,
    pilar_id: u32,
    session_name: Option<&'a str>,
    note: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct PilarProgressUpsert<'a> {
    user_id: &'a str,
    pilar_id: u32,
    completed: bool,
    unlocked: bool,
}

// ---------------------------------------------------------------------------
// UserData
// ---------------------------------------------------------------------------

/// Everything the aggregate load produces. Partial availability is the
/// norm for a fresh profile: empty lists and a missing profile are data,
/// not errors.
#[derive(Debug, Default)]
pub struct UserData {
    pub profile: Option<ProfileRow>,
    pub goals: Vec<Goal>,
    pub confessions: Vec<Confession>,
    pub pillar_progress: Vec<PilarProgress>,
    pub pillars: Vec<PilarDefinition>,
    pub sparks: Vec<DailySpark>,
    pub interactions: Vec<InteractionLog>,
}

// ---------------------------------------------------------------------------
// SyncGateway
// ---------------------------------------------------------------------------

/// Typed client for the relational backend's REST surface.
///
/// One aggregate load, one save per entity kind. Loads degrade to
/// defaults; saves report errors to the caller (the save queue logs and
/// drops them — best-effort persistence is the contract).
#[derive(Debug, Clone)]
pub struct SyncGateway {
    http: reqwest::Client,
    cfg: BackendConfig,
}

impl SyncGateway {
    pub fn new(cfg: BackendConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            cfg,
        }
    }

    /// Fetch every entity for the signed-in user concurrently and join
    /// once. Individual failures are logged and replaced with defaults —
    /// the caller always receives a usable bundle.
    pub async fn fetch_all(&self, session: &Session) -> UserData {
        let uid = session.user_id.as_str();
        let (profile, goals, confessions, progress, pillars, sparks, interactions) = tokio::join!(
            self.fetch_profile(session),
            self.fetch_goals(session),
            self.fetch_confessions(session),
            self.fetch_pilar_progress(session),
            self.fetch_pilar_definitions(session),
            self.fetch_sparks(session),
            self.fetch_interactions(session),
        );

        UserData {
            profile: or_logged("profiles", uid, profile).flatten(),
            goals: or_logged("goals", uid, goals).unwrap_or_default(),
            confessions: or_logged("confessions", uid, confessions).unwrap_or_default(),
            pillar_progress: or_logged("pillar_progress", uid, progress).unwrap_or_default(),
            pillars: or_logged("pillars", uid, pillars).unwrap_or_default(),
            sparks: or_logged("daily_sparks", uid, sparks).unwrap_or_default(),
            interactions: or_logged("interactions", uid, interactions).unwrap_or_default(),
        }
    }

    async fn fetch_profile(&self, session: &Session) -> Result<Option<ProfileRow>> {
        let rows: Vec<ProfileRow> = self
            .get_rows(
                "profiles",
                session,
                &[("id", format!("eq.{}", session.user_id)), sel()],
            )
            .await?;
        Ok(rows.into_iter().next())
    }

    async fn fetch_goals(&self, session: &Session) -> Result<Vec<Goal>> {
        let rows: Vec<GoalRow> = self
            .get_rows(
                "goals",
                session,
                &[("user_id", format!("eq.{}", session.user_id)), sel()],
            )
            .await?;
        Ok(rows.into_iter().map(Goal::from).collect())
    }

    async fn fetch_confessions(&self, session: &Session) -> Result<Vec<Confession>> {
        let rows: Vec<ConfessionRow> = self
            .get_rows(
                "confessions",
                session,
                &[
                    ("user_id", format!("eq.{}", session.user_id)),
                    ("order", "created_at.desc".into()),
                    sel(),
                ],
            )
            .await?;
        Ok(rows.into_iter().map(Confession::from).collect())
    }

    async fn fetch_pilar_progress(&self, session: &Session) -> Result<Vec<PilarProgress>> {
        self.get_rows(
            "pillar_progress",
            session,
            &[("user_id", format!("eq.{}", session.user_id)), sel()],
        )
        .await
    }

    async fn fetch_pilar_definitions(&self, session: &Session) -> Result<Vec<PilarDefinition>> {
        self.get_rows("pillars", session, &[("order", "id.asc".into()), sel()])
            .await
    }

    async fn fetch_sparks(&self, session: &Session) -> Result<Vec<DailySpark>> {
        self.get_rows(
            "daily_sparks",
            session,
            &[
                ("order", "date.desc".into()),
                ("limit", "30".into()),
                sel(),
            ],
        )
        .await
    }

    async fn fetch_interactions(&self, session: &Session) -> Result<Vec<InteractionLog>> {
        let cutoff = Utc::now() - Duration::days(7);
        self.get_rows(
            "interactions",
            session,
            &[
                ("select", "created_at,action_type".into()),
                ("created_at", format!("gte.{}", cutoff.to_rfc3339())),
            ],
        )
        .await
    }

    // -----------------------------------------------------------------------
    // Saves
    // -----------------------------------------------------------------------

    /// Upsert the profile row. Idempotent on repeated calls: the row is
    /// keyed by the user id and merged on conflict.
    pub async fn save_profile(&self, session: &Session, patch: &ProfilePatch) -> Result<()> {
        let mut body = serde_json::to_value(patch)?;
        body["id"] = serde_json::Value::String(session.user_id.clone());
        let resp = self
            .http
            .post(self.cfg.rest_url("profiles"))
            .query(&[("on_conflict", "id")])
            .headers(self.rest_headers(session))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body)
            .send()
            .await?;
        check(resp).await
    }

    /// Save a goal. A `Remote` id upserts by primary key; a `Seed` id is
    /// a locally-created placeholder the backend has never seen, so the
    /// id is omitted and the backend issues one on insert.
    pub async fn save_goal(&self, session: &Session, goal: &Goal) -> Result<()> {
        let (id, prefer) = match &goal.id {
            GoalId::Remote(id) => (Some(*id), "resolution=merge-duplicates,return=minimal"),
            GoalId::Seed(_) => (None, "return=minimal"),
        };
        let body = GoalUpsert {
            id,
            user_id: &session.user_id,
            goal_title: &goal.goal_title,
            target_date: goal.target_date,
            sub_tasks: &goal.sub_tasks,
            progress_percentage: goal.progress_percentage,
        };
        let mut req = self
            .http
            .post(self.cfg.rest_url("goals"))
            .headers(self.rest_headers(session))
            .header("Prefer", prefer);
        if id.is_some() {
            req = req.query(&[("on_conflict", "id")]);
        }
        let resp = req.json(&body).send().await?;
        check(resp).await
    }

    /// Append a confession. Insert-only: entries are never edited.
    pub async fn save_confession(&self, session: &Session, confession: &Confession) -> Result<()> {
        let body = ConfessionInsert {
            user_id: &session.user_id,
            content: &confession.content,
            kind: confession.kind,
            timestamp: &confession.timestamp,
            date: &confession.date,
            pilar_id: confession.pilar_id,
            session_name: confession.session_name.as_deref(),
            note: confession.note.as_deref(),
        };
        let resp = self
            .http
            .post(self.cfg.rest_url("confessions"))
            .headers(self.rest_headers(session))
            .header("Prefer", "return=minimal")
            .json(&body)
            .send()
            .await?;
        check(resp).await
    }

    /// Upsert one pilar's progress, keyed by (user, pilar).
    pub async fn save_pilar_progress(
        &self,
        session: &Session,
        pilar_id: u32,
        completed: bool,
        unlocked: bool,
    ) -> Result<()> {
        let body = PilarProgressUpsert {
            user_id: &session.user_id,
            pilar_id,
            completed,
            unlocked,
        };
        let resp = self
            .http
            .post(self.cfg.rest_url("pillar_progress"))
            .query(&[("on_conflict", "user_id,pilar_id")])
            .headers(self.rest_headers(session))
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(&body)
            .send()
            .await?;
        check(resp).await
    }

    /// Append an interaction log row.
    pub async fn log_interaction(&self, session: &Session, action_type: &str) -> Result<()> {
        let resp = self
            .http
            .post(self.cfg.rest_url("interactions"))
            .headers(self.rest_headers(session))
            .header("Prefer", "return=minimal")
            .json(&serde_json::json!({
                "user_id": session.user_id,
                "action_type": action_type,
            }))
            .send()
            .await?;
        check(resp).await
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    async fn get_rows<T: serde::de::DeserializeOwned>(
        &self,
        table: &str,
        session: &Session,
        query: &[(&str, String)],
    ) -> Result<Vec<T>> {
        let resp = self
            .http
            .get(self.cfg.rest_url(table))
            .query(query)
            .headers(self.rest_headers(session))
            .send()
            .await?;
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(SyncError::Backend { status, message });
        }
        Ok(resp.json().await?)
    }

    fn rest_headers(&self, session: &Session) -> reqwest::header::HeaderMap {
        use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
        let mut headers = HeaderMap::new();
        if let Ok(v) = HeaderValue::from_str(&self.cfg.anon_key) {
            headers.insert("apikey", v);
        }
        if let Ok(v) = HeaderValue::from_str(&format!("Bearer {}", session.access_token)) {
            headers.insert(AUTHORIZATION, v);
        }
        headers
    }
}

fn sel() -> (&'static str, String) {
    ("select", "*".into())
}

fn or_logged<T>(table: &str, uid: &str, result: Result<T>) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            warn!(table, user = uid, error = %e, "fetch failed, using defaults");
            None
        }
    }
}

async fn check(resp: reqwest::Response) -> Result<()> {
    if resp.status().is_success() {
        return Ok(());
    }
    let status = resp.status().as_u16();
    let message = resp.text().await.unwrap_or_default();
    Err(SyncError::Backend { status, message })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
