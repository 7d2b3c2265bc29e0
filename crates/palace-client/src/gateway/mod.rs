mod client;
mod contract;


use std::fmt;

use thiserror::Error;

pub use client::BackendGateway;
pub use contract::{
    MULTIPART_CONTENT_FIELD, MULTIPART_PHOTO_FIELD, PATH_AUTH_ME, PATH_AUTH_NEXTAUTH,
    PATH_HEALTH, PATH_MEMORIES, PATH_MEMORIES_CLUSTERS, PATH_MEMORIES_RECENT,
    PATH_MEMORIES_SEARCH, PATH_ONBOARDING_PILLARS, PATH_ONBOARDING_STATUS, PATH_PILLARS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GatewayOperation {
    ExchangeIdentity,
    CurrentUser,
    OnboardingStatus,
    SubmitOnboarding,
    FetchPillars,
    FetchRecent,
    SearchMemories,
    CreateMemory,
    FetchClusters,
    Health,
}

impl fmt::Display for GatewayOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExchangeIdentity => write!(f, "exchange_identity"),
            Self::CurrentUser => write!(f, "current_user"),
            Self::OnboardingStatus => write!(f, "onboarding_status"),
            Self::SubmitOnboarding => write!(f, "submit_onboarding"),
            Self::FetchPillars => write!(f, "fetch_pillars"),
            Self::FetchRecent => write!(f, "fetch_recent"),
            Self::SearchMemories => write!(f, "search_memories"),
            Self::CreateMemory => write!(f, "create_memory"),
            Self::FetchClusters => write!(f, "fetch_clusters"),
            Self::Health => write!(f, "health"),
        }
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("backend rejected the bearer token for {operation}")]
    Unauthorized { operation: GatewayOperation },
    #[error("backend unreachable for {operation}: {message}")]
    NetworkError {
        operation: GatewayOperation,
        message: String,
    },
    #[error("backend failed {operation}: status={status}")]
    ServerError {
        operation: GatewayOperation,
        status: u16,
        detail: Option<String>,
    },
    #[error("backend response invalid for {operation}: {message}")]
    InvalidResponse {
        operation: GatewayOperation,
        message: String,
    },
    #[error("request for {operation} could not be built: {message}")]
    InvalidRequest {
        operation: GatewayOperation,
        message: String,
    },
}

impl GatewayError {
    pub fn operation(&self) -> GatewayOperation {
        match self {
            Self::Unauthorized { operation }
            | Self::NetworkError { operation, .. }
            | Self::ServerError { operation, .. }
            | Self::InvalidResponse { operation, .. }
            | Self::InvalidRequest { operation, .. } => *operation,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }

    /// Message suitable for an inline error banner.
    pub fn user_message(&self) -> String {
        match self {
            Self::Unauthorized { .. } => "Your session has expired. Please sign in again.".to_string(),
            Self::NetworkError { .. } => {
                "Could not reach Memory Palace. Check your connection and try again.".to_string()
            }
            Self::ServerError {
                detail: Some(detail),
                ..
            } => detail.clone(),
            Self::ServerError { status, .. } => {
                format!("Memory Palace returned an error (status {status}).")
            }
            Self::InvalidResponse { .. } => {
                "Memory Palace sent a response this app could not read.".to_string()
            }
            Self::InvalidRequest { message, .. } => message.clone(),
        }
    }
}
