/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use super::weather::validate_date;
use crate::environment::AppState;
use crate::outbound::jobs::sample_jobs;
use crate::tools::error::AppError;
use actix_web::web::Data;
use serde_json::Value;
use tracing::warn;

pub async fn get_jobs(data: Data<AppState>, date: Option<String>) -> Result<Vec<Value>, AppError> {
    let date = validate_date(date.as_deref())?;
    let jobs = data.jobs_source.jobs_for_date(date).await?;

    if jobs.is_empty() && data.sample_jobs_fallback {
        warn!(tag = "[Jobs - Serving Sample Data]", date = %date.0);
        return Ok(sample_jobs());
    }

    Ok(jobs)
}
