use std::net::TcpListener;
use std::time::Duration;

use reqwest::{Client, Method, Response};

use serde_json::{json, Value};

use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region, SdkConfig};

use url::Url;

use wiremock::matchers::*;
use wiremock::{Mock, MockServer, ResponseTemplate};

use atf_notifier::app;
use atf_notifier::client::{QueueClient, TemplateStoreClient};
use atf_notifier::handler::{Notifier, PartialFailurePolicy, TemplateNames};
use atf_notifier::message::MessageOptions;

pub const ATF_ID: &str = "7db12eed-0c3f-4d27-8221-5699f4e3ea22";
pub const OTHER_ATF_ID: &str = "0b5c3a6e-4a1f-4e7b-9d65-2f3c1a9e8b71";

pub const QUEUE_PATH: &str = "/000000000000/atf-emails";
pub const TEMPLATE_BUCKET: &str = "templates";
pub const SEND_MESSAGE_TARGET: &str = "AmazonSQS.SendMessage";
pub const LINK_BASE_URL: &str = "http://localhost/availability/confirm";

pub struct TestApp {
    addr: String,

    pub client: Client,
    /// Stands in for both template storage and the queue
    pub aws_server: MockServer,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(PartialFailurePolicy::Tolerate).await
    }

    pub async fn spawn_with(partial_failure: PartialFailurePolicy) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to listen on random port");
        let port = listener.local_addr().unwrap().port();

        let addr = format!("http://127.0.0.1:{}", port);

        let aws_server = MockServer::start().await;

        let aws_config = sdk_config(&aws_server.uri()).await;
        let store = TemplateStoreClient::new(&aws_config, TEMPLATE_BUCKET, Duration::from_secs(2));
        let sender = QueueClient::new(
            &aws_config,
            format!("{}{}", aws_server.uri(), QUEUE_PATH),
            Duration::from_secs(2),
        );
        let message_options =
            MessageOptions::new(Url::parse(LINK_BASE_URL).expect("Failed to parse link base url"));

        let notifier = Notifier::new(
            store,
            sender,
            TemplateNames {
                available: "available.txt".into(),
                fully_booked: "fully-booked.txt".into(),
            },
            message_options,
            partial_failure,
        );

        let server = app::run(listener, notifier).expect("Failed to spawn app instance");
        let _ = tokio::spawn(server);

        let client = Client::new();

        Self {
            addr,
            client,
            aws_server,
        }
    }

    pub fn request(&self, method: Method, url: &str) -> reqwest::RequestBuilder {
        let url = format!("{}/{}", &self.addr, url);
        self.client.request(method, url)
    }

    pub async fn health_check(&self) -> reqwest::Result<Response> {
        self.request(Method::GET, "health_check").send().await
    }

    pub async fn invoke(&self, batch: &Value) -> reqwest::Result<Response> {
        self.request(Method::POST, "invocations")
            .json(batch)
            .send()
            .await
    }

    /// Serve both email templates from the mock bucket
    pub async fn mount_templates(&self) {
        for (name, body) in [
            ("available.txt", "Dear {{ atf_name }}, open {{ additional_open_date_start }} to {{ additional_open_date_end }}. Not right? {{ no_link }}"),
            ("fully-booked.txt", "Dear {{ atf_name }}, fully booked {{ additional_open_date_start }} to {{ additional_open_date_end }}. Not right? {{ no_link }}"),
        ] {
            Mock::given(method("GET"))
                .and(path(format!("/{}/{}", TEMPLATE_BUCKET, name)))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .mount(&self.aws_server)
                .await;
        }
    }

    /// Answer every `SendMessage` call with `status`, expecting `expected` calls
    pub async fn mount_queue(&self, status: u16, expected: u64) {
        let response = if status == 200 {
            ResponseTemplate::new(200).set_body_json(json!({ "MessageId": "some-message-id" }))
        } else {
            ResponseTemplate::new(status)
        };

        Mock::given(method("POST"))
            .and(header("x-amz-target", SEND_MESSAGE_TARGET))
            .respond_with(response)
            .expect(expected)
            .mount(&self.aws_server)
            .await;
    }

    /// Bodies of every `SendMessage` request the queue received
    pub async fn sent_messages(&self) -> Vec<Value> {
        self.aws_server
            .received_requests()
            .await
            .expect("Request recording is disabled")
            .into_iter()
            .filter_map(|req| serde_json::from_slice::<Value>(&req.body).ok())
            .filter(|body| body.get("QueueUrl").is_some())
            .collect()
    }
}

/// Static-credential config pointed at the mock server, with retries off
async fn sdk_config(endpoint: &str) -> SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .endpoint_url(endpoint)
        .region(Region::new("eu-west-2"))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            "test-access-key",
            "test-secret-key",
            None,
            None,
            "test",
        ))
        .retry_config(RetryConfig::disabled())
        .load()
        .await
}

fn image(id: &str, is_available: bool) -> Value {
    json!({
        "id": { "S": id },
        "name": { "S": "Derby Cars Ltd." },
        "email": { "S": "hello@email.com" },
        "tokens": { "M": { "yes": { "S": "some-yes-token" }, "no": { "S": "some-no-token" } } },
        "availability": {
            "M": {
                "isAvailable": { "BOOL": is_available },
                "lastUpdated": { "S": "2020-10-09T12:31:46.518Z" },
                "endDate": { "S": "2020-11-03T14:21:45.000Z" },
                "startDate": { "S": "2020-10-06T14:21:45.000Z" },
            }
        },
    })
}

/// A change-stream record for one facility
pub fn stream_record(event_name: &str, id: &str, old_available: bool, new_available: bool) -> Value {
    json!({
        "eventID": format!("{}-{}", event_name, id),
        "eventName": event_name,
        "eventSource": "aws:dynamodb",
        "dynamodb": {
            "OldImage": image(id, old_available),
            "NewImage": image(id, new_available),
        },
    })
}

pub fn batch(records: Vec<Value>) -> Value {
    json!({ "Records": records })
}
