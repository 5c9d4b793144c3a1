/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::weather::validate_date;
use crate::domain::types::ui::optimize::*;
use crate::environment::AppState;
use crate::tools::error::AppError;
use actix_web::web::Data;
use serde_json::Value;
use tracing::info;

pub async fn optimize_routes(
    data: Data<AppState>,
    request_body: OptimizeRoutesRequest,
    with_summary: bool,
) -> Result<OptimizeRoutesResponse, AppError> {
    let date = validate_date(request_body.date.as_deref())?;

    let jobs = match request_body.jobs {
        None | Some(Value::Null) => return Err(AppError::MissingJobs),
        Some(Value::Array(jobs)) if jobs.is_empty() => return Err(AppError::MissingJobs),
        Some(jobs) => jobs,
    };

    let report = data.weather.get_weather(date).await;
    let result = data.optimizer.optimize(&jobs, report.impact);
    let algorithm = request_body.algorithm.unwrap_or_default();

    info!(
        tag = "[Optimize Routes]",
        date = %date.0,
        algorithm = %algorithm,
        clusters = result.clusters.len(),
        fallback = result.fallback
    );

    Ok(OptimizeRoutesResponse {
        success: true,
        date,
        algorithm,
        vehicle_ids: request_body.vehicle_ids.unwrap_or_default(),
        summary: with_summary.then(|| OptimizationSummary::from(&result)),
        result,
    })
}
