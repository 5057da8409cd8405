// tests/resource_hints.rs

use serde_json::json;

use dagremote::exec::ResourceHints;
use dagremote_test_utils::init_tracing;

#[test]
fn unknown_keys_and_null_values_are_dropped() {
    init_tracing();

    let entries = vec![
        json!({"compute_backend": "kubernetes"}),
        json!({"not_exists": "v"}),
        json!({"kubernetes_job_timeout": 20}),
        json!({"kubernetes_memory_limit": null}),
    ];

    let hints = ResourceHints::from_entries(&entries);

    assert_eq!(
        serde_json::to_value(&hints).unwrap(),
        json!({"compute_backend": "kubernetes", "kubernetes_job_timeout": 20})
    );
}

#[test]
fn later_entries_override_earlier_ones() {
    let entries = vec![
        json!({"kubernetes_job_timeout": 10}),
        json!({"kubernetes_job_timeout": 30}),
    ];

    let hints = ResourceHints::from_entries(&entries);

    assert_eq!(hints.kubernetes_job_timeout, Some(30));
    assert_eq!(
        serde_json::to_value(&hints).unwrap(),
        json!({"kubernetes_job_timeout": 30})
    );
}

#[test]
fn null_does_not_clear_an_earlier_value() {
    let entries = vec![
        json!({"voms_proxy": true}),
        json!({"voms_proxy": null}),
    ];

    let hints = ResourceHints::from_entries(&entries);

    assert_eq!(hints.voms_proxy, Some(true));
}

#[test]
fn non_object_entries_and_wrong_types_are_skipped() {
    init_tracing();

    let entries = vec![
        json!("kerberos"),
        json!(42),
        json!({"kerberos": "yes"}),
        json!({"unpacked_img": true, "htcondor_max_runtime": "espresso"}),
    ];

    let hints = ResourceHints::from_entries(&entries);

    assert_eq!(hints.kerberos, None);
    assert_eq!(hints.unpacked_img, Some(true));
    assert_eq!(hints.htcondor_max_runtime.as_deref(), Some("espresso"));
}

#[test]
fn empty_input_yields_empty_hints() {
    let hints = ResourceHints::from_entries(&[]);

    assert!(hints.is_empty());
    assert_eq!(serde_json::to_value(&hints).unwrap(), json!({}));
}
