// tests/job_status_cache.rs

use dagremote::exec::{JobController, JobStatusCache, JobSubmission, ResourceHints};
use dagremote::types::JobStatus;
use dagremote_test_utils::fake_controller::FakeJobController;
use dagremote_test_utils::init_tracing;

async fn submit(controller: &FakeJobController, name: &str) -> String {
    let submission = JobSubmission {
        workflow_uuid: "wf".to_string(),
        image: "busybox".to_string(),
        cmd: "true".to_string(),
        prettified_cmd: "true".to_string(),
        workflow_workspace: "/tmp/wf".to_string(),
        job_name: name.to_string(),
        cvmfs_mounts: "false".to_string(),
        resources: ResourceHints::default(),
    };
    controller.submit(&submission).await.unwrap()
}

#[tokio::test]
async fn terminal_status_is_never_queried_again() {
    init_tracing();

    let controller = FakeJobController::new().with_statuses("fit", &["started", "finished", "failed"]);
    let job_id = submit(&controller, "fit").await;
    let mut cache = JobStatusCache::new();

    assert_eq!(cache.get_or_fetch(&controller, &job_id).await.unwrap(), JobStatus::Started);
    assert_eq!(cache.get_or_fetch(&controller, &job_id).await.unwrap(), JobStatus::Finished);
    assert_eq!(controller.status_calls(&job_id), 2);

    for _ in 0..3 {
        assert_eq!(
            cache.get_or_fetch(&controller, &job_id).await.unwrap(),
            JobStatus::Finished
        );
    }
    assert_eq!(controller.status_calls(&job_id), 2);
    assert!(!cache.needs_refresh(&job_id));
}

#[tokio::test]
async fn started_status_is_refreshed_every_time() {
    let controller = FakeJobController::new().with_statuses("gen", &["started"]);
    let job_id = submit(&controller, "gen").await;
    let mut cache = JobStatusCache::new();

    for _ in 0..3 {
        let status = cache.get_or_fetch(&controller, &job_id).await.unwrap();
        assert!(!status.is_terminal());
    }

    assert_eq!(controller.status_calls(&job_id), 3);
    assert!(cache.needs_refresh(&job_id));
}

#[tokio::test]
async fn unrecognised_status_is_terminal_but_not_successful() {
    let controller = FakeJobController::new().with_statuses("gen", &["stopped"]);
    let job_id = submit(&controller, "gen").await;
    let mut cache = JobStatusCache::new();

    let status = cache.get_or_fetch(&controller, &job_id).await.unwrap();

    assert_eq!(status, JobStatus::Other("stopped".to_string()));
    assert!(status.is_terminal());
    assert!(!status.is_success());
}

#[tokio::test]
async fn query_failure_is_a_remote_call_error_and_not_cached() {
    let controller = FakeJobController::new();
    let mut cache = JobStatusCache::new();

    let err = cache
        .get_or_fetch(&controller, "job-404")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("check status of job job-404"));
    assert!(cache.is_empty());
}
