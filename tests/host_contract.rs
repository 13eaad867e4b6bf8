use echomind::host::contract::{
    CommandEnvelope, CommandName, ContractErrorKind, EVENT_VERSION, EventEnvelope, ResponseEnvelope,
};

#[test]
fn command_name_parse_known_and_unknown() {
    for command in CommandName::ALL {
        assert_eq!(CommandName::parse(command.as_str()), Some(command));
    }
    assert_eq!(CommandName::parse("chat.send"), Some(CommandName::ChatSend));
    assert_eq!(
        CommandName::parse("prefs.temperature"),
        Some(CommandName::PrefsTemperature)
    );
    assert!(CommandName::parse("runtime.start").is_none());
    assert!(CommandName::parse("").is_none());
}

#[test]
fn command_serde_name_matches_wire_name() {
    for command in CommandName::ALL {
        let json = serde_json::to_value(command).expect("serialize command");
        assert_eq!(json, serde_json::json!(command.as_str()));
    }
}

#[test]
fn command_envelope_json_shape() {
    let envelope = CommandEnvelope::new(
        "req-123",
        CommandName::ChatSend,
        serde_json::json!({"text": "I feel anxious today"}),
    );
    let json = serde_json::to_value(&envelope).expect("serialize envelope");
    assert_eq!(json["v"], EVENT_VERSION);
    assert_eq!(json["request_id"], "req-123");
    assert_eq!(json["command"], "chat.send");
    assert_eq!(json["payload"]["text"], "I feel anxious today");
}

#[test]
fn command_envelope_payload_defaults_to_null() {
    let envelope: CommandEnvelope =
        serde_json::from_str(r#"{"v":1,"request_id":"r","command":"host.ping"}"#)
            .expect("payload is optional");
    assert!(envelope.payload.is_null());
}

#[test]
fn unknown_command_fails_to_deserialize() {
    let result: Result<CommandEnvelope, _> =
        serde_json::from_str(r#"{"v":1,"request_id":"r","command":"orb.flash","payload":{}}"#);
    assert!(result.is_err());
}

#[test]
fn validate_rejects_wrong_version_and_blank_request_id() {
    let mut envelope = CommandEnvelope::new("r", CommandName::HostPing, serde_json::json!({}));
    envelope.v = 2;
    let err = envelope.validate().expect_err("version 2 is unsupported");
    assert_eq!(err.kind, ContractErrorKind::UnsupportedVersion);

    let envelope = CommandEnvelope::new("  ", CommandName::HostPing, serde_json::json!({}));
    let err = envelope.validate().expect_err("blank request id");
    assert_eq!(err.kind, ContractErrorKind::InvalidEnvelope);
}

#[test]
fn response_and_event_envelopes_have_version() {
    let ok = ResponseEnvelope::ok("r", serde_json::json!({"pong": true}));
    assert!(ok.ok);
    assert_eq!(ok.v, EVENT_VERSION);
    assert!(ok.error.is_none());

    let err = ResponseEnvelope::error("r", "boom");
    assert!(!err.ok);
    assert_eq!(err.error.as_deref(), Some("boom"));
    assert!(err.payload.is_null());

    let event = EventEnvelope::new("e", "tab.changed", serde_json::json!({"tab_id": "chat"}));
    assert_eq!(event.v, EVENT_VERSION);
}

#[test]
fn ui_events_map_to_wire_envelopes() {
    use echomind::controllers::tabs::Tab;
    use echomind::events::UiEvent;

    let envelope = EventEnvelope::from_ui_event(&UiEvent::TabChanged { tab: Tab::Resources });
    assert_eq!(envelope.event, "tab.changed");
    assert_eq!(envelope.payload["tab_id"], "resources");
    assert!(!envelope.event_id.is_empty());

    let envelope = EventEnvelope::from_ui_event(&UiEvent::BusyChanged { visible: true });
    assert_eq!(envelope.event, "busy.changed");
    assert_eq!(envelope.payload["visible"], true);
}
