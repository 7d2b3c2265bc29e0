#![allow(dead_code)]

pub mod backend;

use std::sync::Once;

use chrono::{DateTime, Utc};
use palace_client::ClientConfig;
use serde_json::{Value, json};
use uuid::Uuid;

static TRACING: Once = Once::new();

/// Test output stays quiet unless `RUST_LOG` asks for more.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn client_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        api_base_url: base_url.to_string(),
        request_timeout_ms: 2_000,
        ..ClientConfig::default()
    }
}

pub fn memory_json(content: &str, created_at: DateTime<Utc>, categories: &[&str]) -> Value {
    json!({
        "id": Uuid::new_v4(),
        "content": content,
        "entities": [],
        "categories": categories,
        "emotions": { "joy": 0.4, "sadness": 0.1, "neutral": 0.5, "intensity": 0.5, "polarity": 0.3 },
        "importance": 0.5,
        "created_at": created_at.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
        "photos": null
    })
}

pub fn search_hit_json(id: Uuid, content: &str, score: f64) -> Value {
    json!({
        "id": id,
        "content": content,
        "entities": [],
        "categories": ["family"],
        "emotions": { "joy": 0.7, "sadness": 0.0, "neutral": 0.3, "intensity": 0.6, "polarity": 0.7 },
        "importance": 0.8,
        "created_at": "2026-01-10T08:30:00",
        "similarity_score": score,
        "photos": []
    })
}
