use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Emotions {
    #[serde(default)]
    pub joy: f64,
    #[serde(default)]
    pub sadness: f64,
    #[serde(default)]
    pub neutral: f64,
    #[serde(default)]
    pub intensity: f64,
    #[serde(default)]
    pub polarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemoryPhoto {
    pub url: String,
    #[serde(alias = "storageId")]
    pub storage_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: Uuid,
    pub content: String,
    #[serde(default)]
    pub entities: Vec<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default)]
    pub emotions: Emotions,
    #[serde(default)]
    pub importance: f64,
    #[serde(deserialize_with = "deserialize_backend_timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(
        default,
        alias = "similarityScore",
        skip_serializing_if = "Option::is_none"
    )]
    pub similarity_score: Option<f64>,
    #[serde(default, deserialize_with = "deserialize_nullable_list")]
    pub photos: Vec<MemoryPhoto>,
}

impl Memory {
    pub fn has_category(&self, category: &str) -> bool {
        self.categories.iter().any(|candidate| candidate == category)
    }
}

/// Identity handed over by the external sign-in provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalIdentity {
    pub subject: String,
    pub email: String,
    pub name: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextAuthRequest {
    pub email: String,
    pub name: String,
    pub google_id: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl From<&ExternalIdentity> for NextAuthRequest {
    fn from(identity: &ExternalIdentity) -> Self {
        Self {
            email: identity.email.trim().to_string(),
            name: identity.name.trim().to_string(),
            google_id: identity.subject.trim().to_string(),
            avatar_url: identity.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BackendUser {
    pub id: Uuid,
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub google_id: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_backend_timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokenResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub user: BackendUser,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingStatus {
    pub completed: bool,
    #[serde(default)]
    pub pillar_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PillarPayload {
    pub name: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingPillarsRequest {
    pub people: Vec<PillarPayload>,
    pub interests: Vec<PillarPayload>,
    pub life_events: Vec<PillarPayload>,
}

impl OnboardingPillarsRequest {
    pub fn total(&self) -> usize {
        self.people.len() + self.interests.len() + self.life_events.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnboardingSubmitResponse {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredPillar {
    #[serde(default)]
    pub id: Option<Uuid>,
    pub category: String,
    pub name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupedPillars {
    #[serde(default)]
    pub people: Vec<StoredPillar>,
    #[serde(default)]
    pub interests: Vec<StoredPillar>,
    #[serde(default)]
    pub life_events: Vec<StoredPillar>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchMemoriesRequest {
    pub query: String,
    pub limit: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateMemoryJsonRequest {
    pub content: String,
}

/// The backend either echoes the stored memory or acknowledges with its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CreatedMemory {
    Stored(Memory),
    Acknowledged {
        id: String,
        #[serde(default)]
        message: Option<String>,
    },
}

impl CreatedMemory {
    pub fn id(&self) -> String {
        match self {
            Self::Stored(memory) => memory.id.to_string(),
            Self::Acknowledged { id, .. } => id.clone(),
        }
    }
}

pub type MemoryClusters = HashMap<String, Vec<Memory>>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

/// FastAPI reports failures as `{"detail": ...}`; the detail is a string or
/// a list of validation objects.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct BackendErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl BackendErrorBody {
    pub(crate) fn message(&self) -> Option<String> {
        match self.detail.as_ref()? {
            serde_json::Value::String(text) if !text.trim().is_empty() => {
                Some(text.trim().to_string())
            }
            serde_json::Value::Null => None,
            other => Some(other.to_string()),
        }
    }
}

fn deserialize_backend_timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_backend_timestamp(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!("unrecognized backend timestamp '{raw}'"))
    })
}

fn deserialize_optional_backend_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        Some(raw) => parse_backend_timestamp(&raw).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!("unrecognized backend timestamp '{raw}'"))
        }),
        None => Ok(None),
    }
}

fn deserialize_nullable_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts RFC 3339 and offset-less timestamps; the latter are read as UTC.
pub fn parse_backend_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let trimmed = raw.trim();
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
        .map(|naive| naive.and_utc())
}
