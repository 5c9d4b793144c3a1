/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use std::{rc::Rc, time::Duration};

use crate::incoming_api;
use crate::tools::prometheus::INCOMING_API;
use actix::fut::{ready, Ready};
use actix_http::{h1, header::CONTENT_LENGTH, StatusCode};
use actix_web::{
    body::{BoxBody, MessageBody},
    dev::{self, forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web::{self, Bytes, Data},
    Error, HttpRequest,
};
use futures::future::LocalBoxFuture;
use tokio::time::{timeout, Instant};
use tracing::Span;
use tracing::{error, info, warn};
use tracing_actix_web::{DefaultRootSpanBuilder, RootSpanBuilder};
use uuid::Uuid;

use crate::{environment::AppState, tools::error::AppError};

/// Implements `Transform` for unit middleware factories whose service wrapper holds the inner
/// service as `Rc<S>`.
macro_rules! rc_service_transform {
    ($($factory:ident => $middleware:ident),+ $(,)?) => {
        $(
            impl<S> Transform<S, ServiceRequest> for $factory
            where
                S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error>
                    + 'static,
                S::Future: 'static,
            {
                type Response = ServiceResponse<BoxBody>;
                type Error = Error;
                type InitError = ();
                type Transform = $middleware<S>;
                type Future = Ready<Result<Self::Transform, Self::InitError>>;

                fn new_transform(&self, service: S) -> Self::Future {
                    ready(Ok($middleware {
                        service: Rc::new(service),
                    }))
                }
            }
        )+
    };
}

rc_service_transform!(
    RequestTimeout => RequestTimeoutMiddleware,
    IncomingRequestMetrics => IncomingRequestMetricsMiddleware,
    LogIncomingRequestBody => LogIncomingRequestBodyMiddleware,
    CheckContentLength => CheckContentLengthMiddleware,
);

/// Fails a request with [`AppError::RequestTimeout`] once `request_timeout` milliseconds pass.
pub struct RequestTimeout;

pub struct RequestTimeoutMiddleware<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for RequestTimeoutMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let timeout_duration = req
            .app_data::<Data<AppState>>()
            .map(|data| Duration::from_millis(data.request_timeout));
        let fut = self.service.call(req);

        match timeout_duration {
            Some(timeout_duration) => Box::pin(async move {
                timeout(timeout_duration, fut)
                    .await
                    .map_err(|_| actix_web::Error::from(AppError::RequestTimeout))?
            }),
            None => Box::pin(fut),
        }
    }
}

/// Root span per request, keyed by `x-request-id` (or a fresh UUID) and the calling dashboard.
pub struct DomainRootSpanBuilder;

impl RootSpanBuilder for DomainRootSpanBuilder {
    fn on_request_start(request: &ServiceRequest) -> Span {
        let request_id = header_value(request, "x-request-id")
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let client_id = header_value(request, "x-client-id");

        tracing_actix_web::root_span!(request, request_id, client_id)
    }

    fn on_request_end<B: MessageBody>(span: Span, outcome: &Result<ServiceResponse<B>, Error>) {
        DefaultRootSpanBuilder::on_request_end(span, outcome);
    }
}

fn header_value(request: &ServiceRequest, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

/// Logs every request with its latency and feeds the incoming API histogram.
pub struct IncomingRequestMetrics;

pub struct IncomingRequestMetricsMiddleware<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for IncomingRequestMetricsMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let start_time = Instant::now();
        let request_info = RequestInfo::from(req.request());

        let fut = self.service.call(req);
        Box::pin(async move {
            match fut.await {
                Ok(response) => {
                    // Path params are only resolved after routing.
                    let request_info = RequestInfo::from(response.request());
                    record_request(
                        &request_info,
                        response.response().error(),
                        response.status(),
                        start_time,
                    );
                    Ok(response)
                }
                Err(err) => {
                    record_request(
                        &request_info,
                        Some(&err),
                        err.error_response().status(),
                        start_time,
                    );
                    Err(err)
                }
            }
        })
    }
}

struct RequestInfo {
    method: String,
    path: String,
    headers: String,
}

impl From<&HttpRequest> for RequestInfo {
    /// Path parameters are replaced with `:name` placeholders to keep metric labels bounded.
    fn from(request: &HttpRequest) -> Self {
        let path = request.match_info().iter().fold(
            request.path().to_string(),
            |path, (param_name, param_value)| {
                path.replace(param_value, format!(":{param_name}").as_str())
            },
        );
        Self {
            method: request.method().to_string(),
            path,
            headers: format!("{:?}", request.headers()),
        }
    }
}

fn record_request(
    request: &RequestInfo,
    err_resp: Option<&Error>,
    resp_status: StatusCode,
    start_time: Instant,
) {
    let latency = format!("{:?}ms", start_time.elapsed().as_millis());
    match err_resp {
        Some(err_resp) => {
            let err_resp_code = err_resp.to_string();
            error!(tag = "[INCOMING API - ERROR]", request_method = %request.method, request_path = %request.path, request_headers = request.headers, response_code = err_resp_code, response_status = resp_status.as_str(), latency = latency);
            incoming_api!(
                request.method.as_str(),
                request.path.as_str(),
                resp_status.as_str(),
                err_resp_code.as_str(),
                start_time
            );
        }
        None => {
            info!(tag = "[INCOMING API]", request_method = %request.method, request_path = %request.path, request_headers = request.headers, response_status = resp_status.as_str(), latency = latency);
            incoming_api!(
                request.method.as_str(),
                request.path.as_str(),
                resp_status.as_str(),
                "SUCCESS",
                start_time
            );
        }
    }
}

/// Logs the raw body of requests that failed with one of the `log_unprocessible_req_body` codes.
pub struct LogIncomingRequestBody;

pub struct LogIncomingRequestBodyMiddleware<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for LogIncomingRequestBodyMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let svc = self.service.clone();
        Box::pin(async move {
            let logged_codes = req
                .app_data::<Data<AppState>>()
                .map_or(vec![], |data| data.log_unprocessible_req_body.to_owned());

            if logged_codes.is_empty() {
                return svc.call(req).await;
            }

            let body = req.extract::<web::Bytes>().await?;
            req.set_payload(bytes_to_payload(body.clone()));

            let result = svc.call(req).await;
            let failure = match &result {
                Ok(response) => response.response().error(),
                Err(err) => Some(err),
            };
            if let Some(err) = failure {
                let code = err.to_string();
                if logged_codes.contains(&code) {
                    warn!(tag = "[Unprocessible Request Body]", error_code = %code, body = ?body);
                }
            }
            result
        })
    }
}

fn bytes_to_payload(buf: Bytes) -> dev::Payload {
    let (_, mut pl) = h1::Payload::create(true);
    pl.unread_data(buf);
    dev::Payload::from(pl)
}

/// Rejects requests whose `Content-Length` exceeds `max_allowed_req_size` with a 413.
pub struct CheckContentLength;

pub struct CheckContentLengthMiddleware<S> {
    service: Rc<S>,
}

impl<S> Service<ServiceRequest> for CheckContentLengthMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<BoxBody>, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = ServiceResponse<BoxBody>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let content_length = req
            .headers()
            .get(CONTENT_LENGTH)
            .and_then(|content_length| content_length.to_str().ok()?.parse::<usize>().ok());
        let limit = req
            .app_data::<Data<AppState>>()
            .map(|data| data.max_allowed_req_size);

        if let (Some(content_length), Some(limit)) = (content_length, limit) {
            if content_length > limit {
                return Box::pin(async move {
                    Err(actix_web::Error::from(AppError::LargePayloadSize(
                        content_length,
                        limit,
                    )))
                });
            }
        }

        let fut = self.service.call(req);
        Box::pin(fut)
    }
}
