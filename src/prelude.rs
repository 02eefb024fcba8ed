pub use std::convert::Infallible;
pub use std::sync::Arc;
pub use std::time::Duration;

pub use anyhow::{Context as _, Result};
pub use axum::extract::{Query, Request, State};
pub use axum::http::{header, StatusCode};
pub use axum::middleware::Next;
pub use axum::response::{IntoResponse, Response};
pub use axum::routing::{get, post};
pub use axum::Json;
pub use chrono::{DateTime, Utc};

pub use crate::db::session::Session;
pub use crate::db::submission::{NewSubmission, Submission, SubmissionStats};
pub use crate::db::Db;
pub use crate::utils::config::Config;
pub use crate::utils::error::{AppError, AppResult};
pub use crate::utils::routing::{AppRouter, AxumRouter};
pub use crate::utils::types::SharedAppState;
