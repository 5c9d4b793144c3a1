/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{
    get,
    web::{Data, Json, Path},
};

use crate::{
    common::{maintenance::diagnostics::VehicleHealth, types::*},
    domain::{action::internal::vehicles, types::internal::vehicles::*},
    environment::AppState,
    tools::error::AppError,
};

#[get("/api/vehicles/{vehicleId}/predictions")]
pub async fn vehicle_predictions(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<VehiclePredictionsResponse>, AppError> {
    let vehicle_id = VehicleId(path.into_inner());

    Ok(Json(vehicles::vehicle_predictions(data, vehicle_id).await?))
}

#[get("/api/vehicles/{vehicleId}/health")]
pub async fn vehicle_health(
    data: Data<AppState>,
    path: Path<String>,
) -> Result<Json<VehicleHealth>, AppError> {
    let vehicle_id = VehicleId(path.into_inner());

    Ok(Json(vehicles::vehicle_health(data, vehicle_id).await?))
}
