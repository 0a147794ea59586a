use actix_web::web;
use actix_web::ResponseError;

use crate::errors::AppError;

pub mod health;
pub mod orders;

/// Map body deserialization failures to the structured 422 shape instead of
/// actix's default 400.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        let response = AppError::Validation(err.to_string()).error_response();
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = AppError::Validation(err.to_string()).error_response();
        actix_web::error::InternalError::from_response(err, response).into()
    })
}

pub fn path_config() -> web::PathConfig {
    web::PathConfig::default().error_handler(|err, _req| {
        let response = AppError::Validation(err.to_string()).error_response();
        actix_web::error::InternalError::from_response(err, response).into()
    })
}
