/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get,
    web::{Data, Json, Query},
};
use serde_json::Value;

use crate::{
    domain::{action::ui::jobs, types::ui::jobs::JobsQuery},
    environment::AppState,
    tools::error::AppError,
};

#[get("/api/jobs")]
pub async fn get_jobs(
    data: Data<AppState>,
    param_obj: Query<JobsQuery>,
) -> Result<Json<Vec<Value>>, AppError> {
    let JobsQuery { date } = param_obj.into_inner();

    Ok(Json(jobs::get_jobs(data, date).await?))
}
