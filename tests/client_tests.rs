mod common;

use common::*;
use ptsl_client::commands::{CreateMemoryLocationRequest, ExportMixRequest, RawCommand};
use ptsl_client::{CommandId, Permissions, PtslClient, TaskStatus};
use ptsl_protos::TaskStatus as WireStatus;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

fn client(transport: Arc<ScriptedTransport>, permissions: Permissions) -> PtslClient {
    PtslClient::with_transport(transport, permissions, None, Duration::from_millis(10))
}

#[tokio::test]
async fn test_start_registers_session() {
    init_logging();
    let transport = Arc::new(
        ScriptedTransport::new()
            .push_unary(reply(CommandId::HostReadyCheck, WireStatus::Completed, ""))
            .push_unary(reply(
                CommandId::RegisterConnection,
                WireStatus::Completed,
                r#"{"session_id":"abc-123"}"#,
            ))
            .push_unary(reply(
                CommandId::GetSessionName,
                WireStatus::Completed,
                r#"{"session_name":"Untitled"}"#,
            )),
    );
    let client = client(Arc::clone(&transport), Permissions::read_only());

    assert!(!client.is_host_ready());
    let session_id = client.start("PTSL", "ptsl-cli").await;
    assert_eq!(session_id.as_deref(), Some("abc-123"));
    assert!(client.is_host_ready());

    let name = client.get_session_name().await;
    assert_eq!(name.body.unwrap().session_name, "Untitled");

    let requests = transport.requests();
    assert_eq!(
        requests[1].request_body_json,
        r#"{"company_name":"PTSL","application_name":"ptsl-cli"}"#
    );
    assert_eq!(requests[0].header.as_ref().unwrap().session_id, "");
    assert_eq!(requests[2].header.as_ref().unwrap().session_id, "abc-123");
}

#[tokio::test]
async fn test_host_not_ready_blocks_commands() {
    init_logging();
    let transport = Arc::new(ScriptedTransport::new().push_unary(error_reply(
        CommandId::HostReadyCheck,
        r#"{"errors":[{"command_error_type":"PT_NotReady","command_error_message":"Pro Tools is loading","is_warning":false}]}"#,
    )));
    let client = client(Arc::clone(&transport), Permissions::all());

    let ready = client.host_ready_check().await;
    assert_eq!(ready.task_status(), Some(TaskStatus::Failed));
    assert!(!client.is_host_ready());

    let tracks = client.get_track_list().await;
    assert_eq!(tracks.task_status(), Some(TaskStatus::Failed));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_ready_check_reads_body() {
    init_logging();
    let transport = Arc::new(
        ScriptedTransport::new()
            .push_unary(reply(
                CommandId::HostReadyCheck,
                WireStatus::Completed,
                r#"{"is_host_ready":false}"#,
            ))
            .push_unary(reply(
                CommandId::HostReadyCheck,
                WireStatus::Completed,
                r#"{"is_host_ready":true}"#,
            )),
    );
    let client = client(Arc::clone(&transport), Permissions::all());

    let loading = client.host_ready_check().await;
    assert_eq!(loading.task_status(), Some(TaskStatus::Completed));
    assert!(!loading.body.unwrap().is_host_ready);
    assert!(!client.is_host_ready());

    let tracks = client.get_track_list().await;
    assert_eq!(tracks.task_status(), Some(TaskStatus::Failed));
    assert_eq!(transport.requests().len(), 1);

    assert_eq!(client.start("PTSL", "ptsl-cli").await, None);
    assert!(client.is_host_ready());
    assert_eq!(transport.requests().len(), 3);
}

#[tokio::test]
async fn test_register_without_session_id() {
    init_logging();
    let transport = Arc::new(ScriptedTransport::new().push_unary(reply(
        CommandId::RegisterConnection,
        WireStatus::Completed,
        "{}",
    )));
    let client = client(transport, Permissions::read_only());
    client.session().set_host_ready(true);

    let response = client.register_connection("PTSL", "ptsl-cli").await;
    assert_eq!(
        response.task_status(),
        Some(TaskStatus::CompletedWithBadResponse)
    );
    assert!(!client.session().is_registered());
}

#[tokio::test]
async fn test_export_to_temp_dir_needs_no_permission() {
    init_logging();
    let temp_dir = tempfile::tempdir().unwrap();
    let transport = Arc::new(ScriptedTransport::new().push_stream(vec![
        (
            Duration::ZERO,
            Ok(task_reply(CommandId::ExportMix, WireStatus::Queued, "T9", "\n")),
        ),
        (
            Duration::from_millis(40),
            Ok(task_reply(CommandId::ExportMix, WireStatus::Completed, "T9", "")),
        ),
    ]));
    let client = client(
        Arc::clone(&transport),
        Permissions::read_only().with_temp_dir(temp_dir.path()),
    );
    client.session().set_host_ready(true);

    let inside = ExportMixRequest::wav("bounce", "Main", &temp_dir.path().join("bounces"));
    let response = client.export_mix(inside).await;
    assert_eq!(response.task_status(), Some(TaskStatus::Completed));

    let outside = ExportMixRequest::wav("bounce", "Main", std::path::Path::new("/Users/me"));
    let denied = client.export_mix(outside).await;
    assert_eq!(denied.task_status(), Some(TaskStatus::Failed));
    assert!(denied.errors[0].message.contains("export"));
    assert_eq!(transport.command_requests().len(), 1);
}

#[tokio::test]
async fn test_write_commands_follow_groups() {
    init_logging();
    let transport = Arc::new(ScriptedTransport::new().push_unary(reply(
        CommandId::CreateMemoryLocation,
        WireStatus::Completed,
        "",
    )));
    let client = client(Arc::clone(&transport), Permissions::parse("memory"));
    client.session().set_host_ready(true);

    let created = client
        .create_memory_location(CreateMemoryLocationRequest::marker("Verse", "48000"))
        .await;
    assert!(created.is_success());

    let cut = client.cut().await;
    assert_eq!(cut.task_status(), Some(TaskStatus::Failed));
    assert!(cut.errors[0].message.contains("clipboard"));
    assert_eq!(transport.requests().len(), 1);
}

#[tokio::test]
async fn test_raw_command_passes_json_through() {
    init_logging();
    let transport = Arc::new(ScriptedTransport::new().push_unary(reply(
        CommandId::GetTrackList,
        WireStatus::Completed,
        r#"{"track_list":[{"name":"Vox"}]}"#,
    )));
    let client = client(Arc::clone(&transport), Permissions::read_only());
    client.session().set_host_ready(true);

    let raw = RawCommand::by_name("GetTrackList", json!({"page_limit": 10})).unwrap();
    let response = client.execute_raw(raw).await;

    assert!(response.is_success());
    assert_eq!(response.body.unwrap()["track_list"][0]["name"], "Vox");
    assert_eq!(
        transport.requests()[0].request_body_json,
        r#"{"page_limit":10}"#
    );
}
