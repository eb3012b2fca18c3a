//! Application error type shared by the store, the repositories and the
//! HTTP handlers. Handlers return it directly; `IntoResponse` decides between
//! the 404 view and the 500 page.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use mongodb::bson;
use thiserror::Error;
use tracing::{debug, error};

use crate::views;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("record not found")]
    NotFound,

    #[error("malformed record id '{0}'")]
    MalformedId(String),

    #[error("store error: {0}")]
    Store(#[from] mongodb::error::Error),

    #[error("document encode error: {0}")]
    Encode(#[from] bson::ser::Error),

    #[error("document decode error: {0}")]
    Decode(#[from] bson::de::Error),

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound | AppError::MalformedId(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status == StatusCode::NOT_FOUND {
            debug!("not found: {self}");
            (status, Html(views::not_found())).into_response()
        } else {
            error!("request failed: {self}");
            (status, Html(views::server_error())).into_response()
        }
    }
}
