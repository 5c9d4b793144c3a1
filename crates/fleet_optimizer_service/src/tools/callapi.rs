/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/

use crate::call_external_api;
use crate::tools::error::AppError;
use crate::tools::prometheus::CALL_EXTERNAL_API;
use once_cell::sync::Lazy;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Method, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;
use std::str::FromStr;
use tokio::time::Instant;
use tracing::{error, info};

static HTTP_CLIENT: Lazy<Client> = Lazy::new(Client::new);

fn header_map(headers: Vec<(&str, &str)>) -> Result<HeaderMap, AppError> {
    headers
        .into_iter()
        .map(|(key, value)| {
            let name = HeaderName::from_str(key)
                .map_err(|_| AppError::InvalidRequest(format!("Invalid Header Name : {key}")))?;
            let value = HeaderValue::from_str(value)
                .map_err(|_| AppError::InvalidRequest(format!("Invalid Header Value : {value}")))?;
            Ok((name, value))
        })
        .collect()
}

/// Sends a JSON request to a collaborator service and decodes the JSON reply.
///
/// Used by the weather provider, the jobs source and the maintenance store. Every call is
/// logged and observed in the `external_request_duration` histogram, labelled by host and path.
///
/// # Returns
///
/// * `Ok(T)` when the call succeeds and the reply decodes into `T`.
/// * `Err(AppError)` for invalid headers, transport failures, non-2xx replies or undecodable bodies.
pub async fn call_api<T, U>(
    method: Method,
    url: &Url,
    headers: Vec<(&str, &str)>,
    body: Option<U>,
) -> Result<T, AppError>
where
    T: DeserializeOwned,
    U: Serialize + Debug,
{
    let start_time = Instant::now();

    let mut request = HTTP_CLIENT
        .request(method.clone(), url.clone())
        .headers(header_map(headers)?);

    if let Some(body) = &body {
        let body = serde_json::to_string(body)
            .map_err(|err| AppError::SerializationError(err.to_string()))?;
        request = request.header(CONTENT_TYPE, "application/json").body(body);
    }

    let resp = request.send().await;

    let host = format!(
        "{}://{}:{}",
        url.scheme(),
        url.host_str().unwrap_or_default(),
        url.port_or_known_default().unwrap_or(80)
    );
    let status = match &resp {
        Ok(resp) => resp.status().as_str().to_string(),
        Err(err) => err
            .status()
            .map(|status| status.to_string())
            .unwrap_or_else(|| "UNKNOWN".to_string()),
    };

    call_external_api!(
        method.as_str(),
        host.as_str(),
        url.path(),
        status.as_str(),
        start_time
    );

    let latency = format!("{:?}ms", start_time.elapsed().as_millis());
    let failure = match resp {
        Ok(resp) if resp.status().is_success() => {
            info!(tag = "[OUTGOING API]", request_method = %method, request_body = ?body, request_url = %host, request_path = url.path(), response_status = %status, latency = latency);
            return resp
                .json::<T>()
                .await
                .map_err(|err| AppError::DeserializationError(err.to_string()));
        }
        Ok(resp) => resp.status().to_string(),
        Err(err) => err.to_string(),
    };

    error!(tag = "[OUTGOING API - ERROR]", request_method = %method, request_body = ?body, request_url = %host, request_path = url.path(), error = %failure, latency = latency);
    Err(AppError::ExternalAPICallError(failure))
}
