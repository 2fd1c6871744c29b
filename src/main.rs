use std::net::TcpListener;

use anyhow::Context;

use atf_notifier::app;
use atf_notifier::client::{QueueClient, TemplateStoreClient};
use atf_notifier::handler::Notifier;
use atf_notifier::settings::Settings;
use atf_notifier::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load settings")?;

    let subscriber = telemetry::create_subscriber(&settings.app, std::io::stdout);
    telemetry::set_subscriber(subscriber)?;

    let aws_config = settings.aws.sdk_config().await;
    let store = TemplateStoreClient::new(
        &aws_config,
        settings.templates.bucket(),
        settings.templates.timeout(),
    );
    let sender = QueueClient::new(&aws_config, settings.queue.url(), settings.queue.timeout());

    let notifier = Notifier::new(
        store,
        sender,
        settings.templates.names(),
        settings.message_options()?,
        settings.policy.partial_failure,
    );

    let listener = TcpListener::bind(settings.app.addr())?;
    tracing::info!("Listening for event batches on {:?}", listener.local_addr()?);

    app::run(listener, notifier)?.await.context("Failed to run app")
}
