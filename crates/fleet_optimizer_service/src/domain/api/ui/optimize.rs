/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    post,
    web::{Data, Json},
};

use crate::{
    domain::{action::ui::optimize, types::ui::optimize::*},
    environment::AppState,
    tools::error::AppError,
};

#[post("/api/optimize-routes")]
pub async fn optimize_routes(
    data: Data<AppState>,
    param_obj: Json<OptimizeRoutesRequest>,
) -> Result<Json<OptimizeRoutesResponse>, AppError> {
    let request_body = param_obj.into_inner();

    Ok(Json(
        optimize::optimize_routes(data, request_body, false).await?,
    ))
}

#[post("/api/optimize-routes-enhanced")]
pub async fn optimize_routes_enhanced(
    data: Data<AppState>,
    param_obj: Json<OptimizeRoutesRequest>,
) -> Result<Json<OptimizeRoutesResponse>, AppError> {
    let request_body = param_obj.into_inner();

    Ok(Json(
        optimize::optimize_routes(data, request_body, true).await?,
    ))
}
