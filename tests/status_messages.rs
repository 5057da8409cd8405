// tests/status_messages.rs

use serde_json::json;

use dagremote::progress::{ChannelStatusPublisher, LogStatusPublisher, StatusMessage, StatusPublisher};
use dagremote::types::{JobStatus, WorkflowStatus};

#[test]
fn status_codes_are_stable() {
    let expected = [
        (WorkflowStatus::Created, 0),
        (WorkflowStatus::Running, 1),
        (WorkflowStatus::Finished, 2),
        (WorkflowStatus::Failed, 3),
        (WorkflowStatus::Deleted, 4),
        (WorkflowStatus::Stopped, 5),
        (WorkflowStatus::Queued, 6),
        (WorkflowStatus::Pending, 7),
    ];

    for (status, code) in expected {
        assert_eq!(status.code(), code);
        assert_eq!(WorkflowStatus::from_code(code), Some(status));
    }
    assert_eq!(WorkflowStatus::from_code(8), None);
}

#[test]
fn job_status_parsing_is_lenient() {
    assert_eq!(JobStatus::from(" Finished\n"), JobStatus::Finished);
    assert_eq!("started".parse::<JobStatus>().unwrap(), JobStatus::Started);
    assert_eq!(JobStatus::from("queued").to_string(), "queued");
}

#[test]
fn message_wire_form_uses_integer_codes() {
    let message = StatusMessage::new("wf-9", WorkflowStatus::Failed)
        .with_logs("workflow failed: boom");

    assert_eq!(
        message.to_json(),
        json!({
            "workflow_uuid": "wf-9",
            "status": 3,
            "logs": "workflow failed: boom",
            "message": null,
        })
    );
}

#[tokio::test]
async fn channel_publisher_forwards_messages() {
    let (publisher, mut rx) = ChannelStatusPublisher::channel(4);
    let message = StatusMessage::new("wf-1", WorkflowStatus::Running)
        .with_message(json!({"progress": {}}));

    publisher.publish(&message).await.unwrap();

    assert_eq!(rx.recv().await, Some(message));
}

#[tokio::test]
async fn channel_publisher_fails_once_receiver_is_gone() {
    let (publisher, rx) = ChannelStatusPublisher::channel(1);
    drop(rx);

    let result = publisher
        .publish(&StatusMessage::new("wf-1", WorkflowStatus::Finished))
        .await;

    assert!(result.is_err());
}

#[tokio::test]
async fn log_publisher_always_succeeds() {
    let result = LogStatusPublisher
        .publish(&StatusMessage::new("wf-1", WorkflowStatus::Finished))
        .await;

    assert!(result.is_ok());
}
