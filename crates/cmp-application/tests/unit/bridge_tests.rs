//! Tests for the cross-frame bridge and the frame client

use std::sync::Arc;
use std::time::Duration;

use cmp_application::tcf::{
    CommandStub, CrossFrameBridge, LocatorInstall, StubIdentity, TcfFrameClient,
};
use cmp_domain::constants::TCF_LOCATOR_FRAME_NAME;
use cmp_domain::ports::{FrameRef, PageDocument};
use cmp_providers::document::VirtualDocument;
use cmp_providers::messaging::{ChannelMessenger, PostedMessage};
use serde_json::{Value, json};
use tokio::sync::mpsc;

use crate::support::settings;

fn bridge(
    doc: Arc<VirtualDocument>,
) -> (CrossFrameBridge, Arc<CommandStub>, mpsc::UnboundedReceiver<PostedMessage>) {
    let stub = Arc::new(CommandStub::new(StubIdentity::from(&settings())));
    let (messenger, replies) = ChannelMessenger::new();
    let bridge = CrossFrameBridge::new(Arc::clone(&stub), doc, Arc::new(messenger));
    (bridge, stub, replies)
}

#[test]
fn test_object_envelope_reply_echoes_call_id() {
    let (bridge, _, mut replies) = bridge(Arc::new(VirtualDocument::new()));
    let source = FrameRef::new("ad-frame");
    let call = json!({
        "__tcfapiCall": { "command": "ping", "version": 2, "callId": "abc-1" }
    });

    assert!(bridge.handle_message(&source, &call));

    let posted = replies.try_recv().expect("reply posted");
    assert_eq!(posted.target, source);
    let reply = &posted.message["__tcfapiReturn"];
    assert_eq!(reply["callId"], json!("abc-1"));
    assert_eq!(reply["success"], json!(true));
    assert_eq!(reply["returnValue"]["cmpLoaded"], json!(true));
}

#[test]
fn test_string_envelope_gets_string_reply() {
    let (bridge, _, mut replies) = bridge(Arc::new(VirtualDocument::new()));
    let call = Value::String(
        json!({ "__tcfapiCall": { "command": "ping", "callId": 42 } }).to_string(),
    );

    assert!(bridge.handle_message(&FrameRef::new("f"), &call));

    let posted = replies.try_recv().expect("reply posted");
    let text = posted.message.as_str().expect("string reply");
    let parsed: Value = serde_json::from_str(text).expect("json reply");
    assert_eq!(parsed["__tcfapiReturn"]["callId"], json!(42));
}

#[test]
fn test_malformed_envelope_answers_failure() {
    let (bridge, _, mut replies) = bridge(Arc::new(VirtualDocument::new()));
    let call = json!({ "__tcfapiCall": { "callId": 7 } });

    assert!(bridge.handle_message(&FrameRef::new("f"), &call));

    let posted = replies.try_recv().expect("reply posted");
    let reply = &posted.message["__tcfapiReturn"];
    assert_eq!(reply["success"], json!(false));
    assert_eq!(reply["callId"], json!(7));
}

#[test]
fn test_unrelated_messages_are_ignored() {
    let (bridge, _, mut replies) = bridge(Arc::new(VirtualDocument::new()));
    assert!(!bridge.handle_message(&FrameRef::new("f"), &json!({ "type": "resize" })));
    assert!(!bridge.handle_message(&FrameRef::new("f"), &json!("not json")));
    assert!(replies.try_recv().is_err());
}

#[test]
fn test_pending_get_tc_data_is_answered_later() {
    let (bridge, stub, mut replies) = bridge(Arc::new(VirtualDocument::new()));
    let call = json!({ "__tcfapiCall": { "command": "getTCData", "callId": "late" } });

    assert!(bridge.handle_message(&FrameRef::new("f"), &call));
    assert!(replies.try_recv().is_err());

    stub.mark_ui_shown();
    let posted = replies.try_recv().expect("deferred reply");
    let reply = &posted.message["__tcfapiReturn"];
    assert_eq!(reply["callId"], json!("late"));
    assert_eq!(reply["returnValue"]["eventStatus"], json!("cmpuishown"));
}

#[test]
fn test_locator_installation_targets() {
    let doc = Arc::new(VirtualDocument::new());
    let (body_bridge, _, _) = bridge(Arc::clone(&doc));
    assert_eq!(body_bridge.install_locator(), LocatorInstall::Body);
    assert_eq!(body_bridge.install_locator(), LocatorInstall::AlreadyPresent);
    assert!(doc.has_frame(TCF_LOCATOR_FRAME_NAME));

    let (head_bridge, _, _) = bridge(Arc::new(VirtualDocument::without_body()));
    assert_eq!(head_bridge.install_locator(), LocatorInstall::Head);

    let (deferred, _, _) = bridge(Arc::new(VirtualDocument::unparsed()));
    assert_eq!(deferred.install_locator(), LocatorInstall::Deferred);
}

#[tokio::test(start_paused = true)]
async fn test_locator_retry_waits_for_parsing() {
    let doc = Arc::new(VirtualDocument::unparsed());
    let (bridge, _, _) = bridge(Arc::clone(&doc));

    let parser = Arc::clone(&doc);
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(450)).await;
        parser.finish_parsing();
    });

    let outcome = bridge
        .install_locator_with_retry(10, Duration::from_millis(200))
        .await;
    assert_eq!(outcome, LocatorInstall::Body);
    assert!(doc.has_frame(TCF_LOCATOR_FRAME_NAME));
}

#[tokio::test]
async fn test_frame_client_round_trip() {
    let (bridge, stub, mut bridge_out) = bridge(Arc::new(VirtualDocument::new()));
    let (client_messenger, mut client_out) = ChannelMessenger::new();
    let client = Arc::new(TcfFrameClient::new(
        Arc::new(client_messenger),
        FrameRef::new("top"),
        "child",
    ));

    let caller = Arc::clone(&client);
    let call = tokio::spawn(async move { caller.call("ping", Some(2), None).await });

    let request = client_out.recv().await.expect("call posted");
    assert_eq!(request.target, FrameRef::new("top"));
    assert!(bridge.handle_message(&FrameRef::new("child-frame"), &request.message));

    let reply = bridge_out.recv().await.expect("reply posted");
    assert!(client.handle_reply(&reply.message));

    let result = call.await.expect("join").expect("reply");
    assert!(result.success);
    assert_eq!(result.call_id, json!("child-1"));
    assert_eq!(client.pending_calls(), 0);

    // Listener registrations keep their slot and receive every transition
    let mut events = client.subscribe(Some(2)).expect("subscribe");
    let request = client_out.recv().await.expect("subscription posted");
    bridge.handle_message(&FrameRef::new("child-frame"), &request.message);
    stub.mark_ui_shown();

    for _ in 0..2 {
        let reply = bridge_out.recv().await.expect("event posted");
        assert!(client.handle_reply(&reply.message));
    }
    let first = events.recv().await.expect("registration reply");
    let second = events.recv().await.expect("transition reply");
    assert!(first.success);
    assert_eq!(second.return_value["eventStatus"], json!("cmpuishown"));
    assert_eq!(client.pending_calls(), 1);
}
