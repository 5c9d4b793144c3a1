/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use crate::common::{types::*, weather::WeatherReport};
use crate::environment::AppState;
use crate::tools::error::AppError;
use actix_web::web::Data;

pub fn validate_date(date: Option<&str>) -> Result<ScanDate, AppError> {
    let date = date
        .map(str::trim)
        .filter(|date| !date.is_empty())
        .ok_or_else(|| AppError::InvalidDate("<missing>".to_string()))?;
    ScanDate::parse(date).ok_or_else(|| AppError::InvalidDate(date.to_string()))
}

pub async fn get_weather(
    data: Data<AppState>,
    date: Option<String>,
) -> Result<WeatherReport, AppError> {
    let date = validate_date(date.as_deref())?;
    Ok(data.weather.get_weather(date).await)
}
