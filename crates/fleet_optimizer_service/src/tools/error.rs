/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use actix_web::{
    http::{header::ContentType, StatusCode},
    HttpResponse, ResponseError,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    error_message: String,
    pub error_code: String,
}

#[derive(Debug, Serialize, thiserror::Error)]
pub enum AppError {
    #[error("INTERNAL_ERROR")]
    InternalError(String),
    #[error("INVALID_REQUEST")]
    InvalidRequest(String),
    #[error("INVALID_DATE")]
    InvalidDate(String),
    #[error("MISSING_JOBS")]
    MissingJobs,
    #[error("UNPROCESSIBLE_REQUEST")]
    UnprocessibleRequest(String),
    #[error("LARGE_PAYLOAD_SIZE")]
    LargePayloadSize(usize, usize),
    #[error("EXTERNAL_API_CALL_ERROR")]
    ExternalAPICallError(String),
    #[error("SERIALIZATION_ERROR")]
    SerializationError(String),
    #[error("DESERIALIZATION_ERROR")]
    DeserializationError(String),
    #[error("REQUEST_TIMEOUT")]
    RequestTimeout,
    #[error("KAFKA_PUSH_FAILED")]
    KafkaPushFailed(String),
    #[error("INGESTION_QUEUE_FAILED")]
    IngestionQueueFailed(String),
    #[error("VEHICLE_HEALTH_NOT_FOUND")]
    VehicleHealthNotFound(String),
}

impl AppError {
    fn error_message(&self) -> ErrorBody {
        ErrorBody {
            error_message: self.message(),
            error_code: self.code(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            AppError::InternalError(err) => err.to_string(),
            AppError::InvalidRequest(err) => err.to_string(),
            AppError::InvalidDate(date) => {
                format!("Invalid date : {date}, expected format YYYY-MM-DD")
            }
            AppError::MissingJobs => "Jobs must be a non-empty array".to_string(),
            AppError::UnprocessibleRequest(err) => err.to_string(),
            AppError::LargePayloadSize(length, limit) => {
                format!("Content length ({length} Bytes) greater than allowed maximum limit : ({limit} Bytes)")
            }
            AppError::ExternalAPICallError(err) => err.to_string(),
            AppError::SerializationError(err) => err.to_string(),
            AppError::DeserializationError(err) => err.to_string(),
            AppError::KafkaPushFailed(reason) => format!("Kafka Push Failed : {reason}"),
            AppError::IngestionQueueFailed(reason) => {
                format!("Sensor ingestion queue unavailable : {reason}")
            }
            AppError::VehicleHealthNotFound(vehicle_id) => {
                format!("No diagnostics received for vehicle : {vehicle_id}")
            }
            AppError::RequestTimeout => "Request timed out".to_string(),
        }
    }

    pub fn code(&self) -> String {
        self.to_string()
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(self.error_message())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            AppError::MissingJobs => StatusCode::BAD_REQUEST,
            AppError::UnprocessibleRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::LargePayloadSize(_, _) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::ExternalAPICallError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::SerializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::DeserializationError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::RequestTimeout => StatusCode::REQUEST_TIMEOUT,
            AppError::KafkaPushFailed(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::IngestionQueueFailed(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::VehicleHealthNotFound(_) => StatusCode::NOT_FOUND,
        }
    }
}
