/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::{maintenance::diagnostics::VehicleHealth, types::*};
use crate::domain::types::internal::vehicles::*;
use crate::environment::AppState;
use crate::ingestion::IngestionCommand;
use crate::tools::error::AppError;
use actix_web::web::Data;
use tokio::sync::oneshot;

pub async fn vehicle_predictions(
    data: Data<AppState>,
    vehicle_id: VehicleId,
) -> Result<VehiclePredictionsResponse, AppError> {
    let (reply, response) = oneshot::channel();
    data.sender
        .send(IngestionCommand::Predictions {
            vehicle_id: vehicle_id.to_owned(),
            reply,
        })
        .await
        .map_err(|err| AppError::IngestionQueueFailed(err.to_string()))?;

    let predictions = response
        .await
        .map_err(|err| AppError::IngestionQueueFailed(err.to_string()))?;

    Ok(VehiclePredictionsResponse {
        vehicle_id,
        predictions,
    })
}

pub async fn vehicle_health(
    data: Data<AppState>,
    vehicle_id: VehicleId,
) -> Result<VehicleHealth, AppError> {
    let (reply, response) = oneshot::channel();
    data.sender
        .send(IngestionCommand::Health {
            vehicle_id: vehicle_id.to_owned(),
            reply,
        })
        .await
        .map_err(|err| AppError::IngestionQueueFailed(err.to_string()))?;

    response
        .await
        .map_err(|err| AppError::IngestionQueueFailed(err.to_string()))?
        .ok_or(AppError::VehicleHealthNotFound(vehicle_id.0))
}
