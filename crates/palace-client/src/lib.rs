//! Client core for the Memory Palace journal.
//!
//! The crate owns everything between a UI shell and the Memory Palace
//! backend: the session and its bearer token, a typed gateway for the
//! backend API, the fetched memory list with its derived views, the calendar
//! heat map, the onboarding wizard, and the view controllers that decide
//! which route to show next.

pub mod calendar;
pub mod config;
mod config_env;
pub mod direct_answer;
pub mod gateway;
pub mod memory_list;
pub mod models;
pub mod onboarding;
pub mod session;
pub mod timezone;
pub mod validation;
pub mod views;

pub use config::{ClientConfig, ConfigError};
pub use gateway::{BackendGateway, GatewayError, GatewayOperation};
pub use session::{
    AccessToken, Session, SessionContext, SessionError, SessionState, SessionStatus, SessionUser,
};
pub use views::{Route, ViewError};
