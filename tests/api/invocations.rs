use reqwest::StatusCode;

use serde_json::{json, Value};

use wiremock::matchers::*;
use wiremock::{Mock, ResponseTemplate};

use atf_notifier::handler::PartialFailurePolicy;

use crate::helpers::{batch, stream_record, TestApp, ATF_ID, LINK_BASE_URL, OTHER_ATF_ID, QUEUE_PATH};

#[tokio::test]
async fn modified_record_is_enqueued_and_insert_is_discarded() {
    let app = TestApp::spawn().await;
    app.mount_templates().await;
    app.mount_queue(200, 1).await;

    let res = app
        .invoke(&batch(vec![
            stream_record("MODIFY", ATF_ID, true, false),
            stream_record("INSERT", OTHER_ATF_ID, true, false),
        ]))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let summary: Value = res.json().await.expect("Summary is not JSON");
    assert_eq!(
        json!({ "attempted": 1, "succeeded": 1, "failed": 0, "failedRecipientIds": [] }),
        summary
    );

    let sent = app.sent_messages().await;
    assert_eq!(1, sent.len());
    let message = &sent[0];
    assert_eq!(
        format!("{}{}", app.aws_server.uri(), QUEUE_PATH),
        message["QueueUrl"]
    );
    assert_eq!(
        format!(
            "Dear Derby Cars Ltd., fully booked 06/10/2020 to 03/11/2020. Not right? {}?jwt=some-no-token",
            LINK_BASE_URL
        ),
        message["MessageBody"]
    );
    assert_eq!(
        json!({
            "templateId": { "DataType": "String", "StringValue": "GOVNOTIFYTEMPLATE" },
            "messageType": { "DataType": "String", "StringValue": "Email" },
            "recipient": { "DataType": "String", "StringValue": "hello@email.com" },
            "subject": { "DataType": "String", "StringValue": "ATF Availability Confirmation" },
        }),
        message["MessageAttributes"]
    );
}

#[tokio::test]
async fn newly_available_facility_gets_available_email() {
    let app = TestApp::spawn().await;
    app.mount_templates().await;
    app.mount_queue(200, 1).await;

    let res = app
        .invoke(&batch(vec![stream_record("MODIFY", ATF_ID, false, true)]))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let sent = app.sent_messages().await;
    let body = sent[0]["MessageBody"].as_str().unwrap();
    assert!(body.starts_with("Dear Derby Cars Ltd., open 06/10/2020"));
}

#[tokio::test]
async fn unchanged_records_send_nothing() {
    let app = TestApp::spawn().await;
    app.mount_templates().await;
    app.mount_queue(200, 0).await;

    let res = app
        .invoke(&batch(vec![
            stream_record("MODIFY", ATF_ID, true, true),
            stream_record("REMOVE", OTHER_ATF_ID, true, false),
        ]))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let summary: Value = res.json().await.expect("Summary is not JSON");
    assert_eq!(json!(0), summary["attempted"]);
}

#[tokio::test]
async fn malformed_records_are_skipped() {
    let app = TestApp::spawn().await;
    app.mount_templates().await;
    app.mount_queue(200, 1).await;

    let res = app
        .invoke(&batch(vec![
            json!({ "eventSource": "aws:sqs", "messageId": "1", "body": "{not json" }),
            json!({ "eventSource": "aws:dynamodb", "eventName": "MODIFY" }),
            stream_record("MODIFY", "not-a-uuid", true, false),
            stream_record("MODIFY", ATF_ID, true, false),
        ]))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    assert_eq!(1, app.sent_messages().await.len());
}

#[tokio::test]
async fn missing_template_fails_the_invocation() {
    let app = TestApp::spawn().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&app.aws_server)
        .await;
    app.mount_queue(200, 0).await;

    let res = app
        .invoke(&batch(vec![stream_record("MODIFY", ATF_ID, true, false)]))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
}

#[tokio::test]
async fn queue_failures_are_reported_but_tolerated() {
    let app = TestApp::spawn().await;
    app.mount_templates().await;
    app.mount_queue(500, 2).await;

    let res = app
        .invoke(&batch(vec![
            stream_record("MODIFY", ATF_ID, true, false),
            stream_record("MODIFY", OTHER_ATF_ID, false, true),
        ]))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, res.status());
    let summary: Value = res.json().await.expect("Summary is not JSON");
    assert_eq!(json!(0), summary["succeeded"]);
    assert_eq!(json!(2), summary["failed"]);
    assert_eq!(json!([ATF_ID, OTHER_ATF_ID]), summary["failedRecipientIds"]);
}

#[tokio::test]
async fn queue_failures_can_fail_the_invocation() {
    let app = TestApp::spawn_with(PartialFailurePolicy::FailInvocation).await;
    app.mount_templates().await;
    app.mount_queue(500, 1).await;

    let res = app
        .invoke(&batch(vec![stream_record("MODIFY", ATF_ID, true, false)]))
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, res.status());
}

#[tokio::test]
async fn non_batch_bodies_are_rejected() {
    let app = TestApp::spawn().await;

    let test_cases = vec![
        ("Missing records", json!({})),
        ("Records not a list", json!({ "Records": "none" })),
    ];

    for (description, body) in test_cases {
        let res = app
            .invoke(&body)
            .await
            .expect("Failed to execute request");

        assert_eq!(
            StatusCode::BAD_REQUEST,
            res.status(),
            "The API did not fail with 400 Bad Request when the payload was {}",
            description
        );
    }
}
