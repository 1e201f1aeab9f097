//! Tests for TCF wire shapes

use cmp_domain::value_objects::{
    CmpStatus, DisplayStatus, EventStatus, ListenerId, PingReturn, TcfCallEnvelope, TcfCommand,
    TcfReturn, TcfReturnEnvelope,
};
use serde_json::json;

#[test]
fn test_command_names_round_trip() {
    for name in ["ping", "getTCData", "addEventListener", "removeEventListener"] {
        let command = TcfCommand::parse(name).expect("known command");
        assert_eq!(command.as_str(), name);
    }
    assert_eq!(TcfCommand::parse("getInAppTCData"), None);
}

#[test]
fn test_ping_field_names() {
    let ping = PingReturn {
        gdpr_applies: true,
        cmp_loaded: true,
        cmp_status: CmpStatus::Loaded,
        display_status: DisplayStatus::Visible,
        api_version: "2.2".to_string(),
        cmp_id: 300,
        cmp_version: 3,
        gvl_version: 64,
        tcf_policy_version: 2,
    };
    let json = serde_json::to_value(ping).unwrap();
    assert_eq!(
        json,
        json!({
            "gdprApplies": true,
            "cmpLoaded": true,
            "cmpStatus": "loaded",
            "displayStatus": "visible",
            "apiVersion": "2.2",
            "cmpId": 300,
            "cmpVersion": 3,
            "gvlVersion": 64,
            "tcfPolicyVersion": 2
        })
    );
}

#[test]
fn test_event_status_wire_values() {
    assert_eq!(serde_json::to_value(EventStatus::TcLoaded).unwrap(), "tcloaded");
    assert_eq!(serde_json::to_value(EventStatus::CmpUiShown).unwrap(), "cmpuishown");
    assert_eq!(
        serde_json::to_value(EventStatus::UserActionComplete).unwrap(),
        "useractioncomplete"
    );
}

#[test]
fn test_call_envelope_parses_with_any_call_id() {
    let envelope: TcfCallEnvelope = serde_json::from_value(json!({
        "__tcfapiCall": {
            "command": "ping",
            "version": 2,
            "callId": "abc-1"
        }
    }))
    .unwrap();
    assert_eq!(envelope.call.command, "ping");
    assert_eq!(envelope.call.call_id, json!("abc-1"));
    assert!(envelope.call.parameter.is_none());
}

#[test]
fn test_return_envelope_shape() {
    let envelope = TcfReturnEnvelope {
        reply: TcfReturn {
            return_value: json!(true),
            success: true,
            call_id: json!(7),
        },
    };
    assert_eq!(
        serde_json::to_value(envelope).unwrap(),
        json!({ "__tcfapiReturn": { "returnValue": true, "success": true, "callId": 7 } })
    );
}

#[test]
fn test_listener_id_from_parameter() {
    assert_eq!(ListenerId::from_parameter(Some(&json!(4))), Some(ListenerId(4)));
    assert_eq!(ListenerId::from_parameter(Some(&json!("4"))), None);
    assert_eq!(ListenerId::from_parameter(None), None);
}
