//! Extractors whose rejections answer with the usual `{"message"}` body and a 400.

use axum::{
    Json,
    extract::{Path, Query},
};
use axum_extra::extract::WithRejection;

use crate::ServerError;

pub type JsonBody<T> = WithRejection<Json<T>, ServerError>;
pub type PathParam<T> = WithRejection<Path<T>, ServerError>;
pub type QueryParams<T> = WithRejection<Query<T>, ServerError>;
