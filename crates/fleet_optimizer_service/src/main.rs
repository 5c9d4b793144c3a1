/*  Copyright 2022-23, Juspay India Pvt Ltd
    This program is free software: you can redistribute it and/or modify it under the terms of the GNU Affero General Public License
    as published by the Free Software Foundation, either version 3 of the License, or (at your option) any later version. This program
    is distributed in the hope that it will be useful, but WITHOUT ANY WARRANTY; without even the implied warranty of MERCHANTABILITY
    or FITNESS FOR A PARTICULAR PURPOSE. See the GNU Affero General Public License for more details. You should have received a copy of
    the GNU Affero General Public License along with this program. If not, see <https://www.gnu.org/licenses/>.
*/
use actix_web::{web, App, HttpServer};
use fleet_optimizer_service::{
    common::maintenance::risk::NoMaintenanceHistory,
    domain::api,
    environment::{create_sensor_consumer, read_dhall_config, AppState},
    ingestion::{run_ingestion_worker, run_sensor_consumer, IngestionCommand, SensorIngestion},
    middleware::*,
    tools::{
        error::AppError,
        logger::{error, info, setup_tracing},
        prometheus::prometheus_metrics,
    },
};
use std::{
    env::var,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};
use tokio::{
    signal::unix::{signal, SignalKind},
    sync::mpsc::{self, Receiver, Sender},
};
use tracing_actix_web::TracingLogger;

fn on_signal(kind: SignalKind, name: &'static str, graceful_termination_requested: Arc<AtomicBool>) {
    tokio::spawn(async move {
        match signal(kind) {
            Ok(mut stream) => {
                stream.recv().await;
                info!(tag = "[Shutdown Signal]", signal = name);
                graceful_termination_requested.store(true, Ordering::Relaxed);
            }
            Err(err) => {
                error!(tag = "[Shutdown Signal]", signal = name, "Failed to listen : {err}");
            }
        }
    });
}

#[actix_web::main]
async fn start_server() -> std::io::Result<()> {
    let dhall_config_path = var("DHALL_CONFIG")
        .unwrap_or_else(|_| "./dhall_config/fleet_optimizer_service.dhall".to_string());
    let app_config = read_dhall_config(&dhall_config_path).unwrap_or_else(|err| {
        println!("Dhall Config Reading Error : {}", err);
        std::process::exit(1);
    });

    let _guard = setup_tracing(app_config.logger_cfg);

    let port = app_config.port;
    let workers = app_config.workers;

    let (sender, receiver): (Sender<IngestionCommand>, Receiver<IngestionCommand>) =
        mpsc::channel(app_config.ingestion_queue_size);

    let consumer = create_sensor_consumer(&app_config);
    let app_state = AppState::new(app_config, sender.clone()).await;

    let graceful_termination_requested = Arc::new(AtomicBool::new(false));
    on_signal(
        SignalKind::terminate(),
        "SIGTERM",
        graceful_termination_requested.to_owned(),
    );
    on_signal(
        SignalKind::interrupt(),
        "SIGINT",
        graceful_termination_requested.to_owned(),
    );

    let ingestion = SensorIngestion::new(
        app_state.maintenance_store.clone(),
        app_state.producer.clone(),
        Arc::new(NoMaintenanceHistory),
        app_state.ingestion_settings(),
    );
    let ingestion_thread = tokio::spawn(run_ingestion_worker(
        receiver,
        ingestion,
        graceful_termination_requested.to_owned(),
    ));

    let consumer_thread = consumer.map(|consumer| {
        tokio::spawn(run_sensor_consumer(
            consumer,
            sender,
            graceful_termination_requested.to_owned(),
        ))
    });

    let data = web::Data::new(app_state);

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(
                web::JsonConfig::default()
                    .error_handler(|err, _| AppError::UnprocessibleRequest(err.to_string()).into()),
            )
            .wrap(LogIncomingRequestBody)
            .wrap(CheckContentLength)
            .wrap(RequestTimeout)
            .wrap(IncomingRequestMetrics)
            .wrap(TracingLogger::<DomainRootSpanBuilder>::new())
            .wrap(prometheus_metrics())
            .configure(api::handler)
    })
    .workers(workers)
    .bind(("0.0.0.0", port))?
    .run()
    .await?;

    graceful_termination_requested.store(true, Ordering::Relaxed);

    if let Some(consumer_thread) = consumer_thread {
        if let Err(err) = consumer_thread.await {
            error!(tag = "[Sensor Consumer]", "Consumer task panicked : {err}");
        }
    }
    if let Err(err) = ingestion_thread.await {
        error!(tag = "[Sensor Ingestion]", "Ingestion task panicked : {err}");
    }

    Ok(())
}

fn main() {
    if let Err(err) = start_server() {
        eprintln!("Failed to start the server : {err}");
        std::process::exit(1);
    }
}
