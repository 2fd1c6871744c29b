use std::net::TcpListener;

use actix_web::dev::Server;
use actix_web::http::StatusCode;
use actix_web::{get, HttpResponse, Responder, ResponseError};
use actix_web::{web, App, HttpServer};

use tracing_actix_web::TracingLogger;

use crate::client::{QueueSender, TemplateStore};
use crate::error::Error;
use crate::handler::{EventBatch, Notifier};

/// Largest event batch accepted in one invocation
const MAX_BATCH_BYTES: usize = 6 * 1024 * 1024;

/// Simple health-check endpoint
#[tracing::instrument(name = "Health check")]
#[get("/health_check")]
async fn health_check() -> impl Responder {
    HttpResponse::Ok().finish()
}

/// Run the notifier over one batch of events and report the dispatch summary
#[tracing::instrument(name = "Invoke the notifier", skip(notifier, batch))]
async fn invoke<S, Q>(
    notifier: web::Data<Notifier<S, Q>>,
    batch: web::Json<EventBatch>,
) -> Result<HttpResponse, Error>
where
    S: TemplateStore + 'static,
    Q: QueueSender + 'static,
{
    let summary = notifier.handle(batch.into_inner()).await?;

    Ok(HttpResponse::Ok().json(summary))
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        match self {
            // Fatal errors fail the invocation so the batch is redelivered
            error if error.is_fatal() => StatusCode::INTERNAL_SERVER_ERROR,
            Self::MalformedEnvelope(_) | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::BAD_GATEWAY,
        }
    }
}


/// Run the application on a specified TCP listener
pub fn run<S, Q>(listener: TcpListener, notifier: Notifier<S, Q>) -> anyhow::Result<Server>
where
    S: TemplateStore + 'static,
    Q: QueueSender + 'static,
{
    // Wrap application data
    let notifier = web::Data::new(notifier);

    // Start the server
    let server = HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(notifier.clone())
            .app_data(web::JsonConfig::default().limit(MAX_BATCH_BYTES))
            .service(health_check)
            .route("/invocations", web::post().to(invoke::<S, Q>))
    })
    .listen(listener)?
    .run();

    Ok(server)
}
