use gemini_samples::v1beta::live::{
    ClientContent, ClientMessage, Content, Part, PartData, ResponseModality, Role, ServerMessage,
    Setup,
};

fn server_message(data: &str) -> ServerMessage {
    serde_json::from_str(data).unwrap()
}

#[test]
fn serializes_turn_messages() {
    let content = ClientContent::new(vec![Content::new(
        Role::User,
        vec![Part::new(PartData::Text("hi".into()))],
    )])
    .is_turn_completed(true);
    let json = serde_json::to_value(&content).expect("serialize");
    assert_eq!(json["turns"][0]["role"], "user");
    assert_eq!(json["turns"][0]["parts"][0]["text"], "hi");
    assert!(json["turnComplete"].as_bool().unwrap());
}

#[test]
fn user_turn_is_one_complete_client_content() {
    let json = serde_json::to_value(ClientMessage::user_turn("Hello? Gemini are you there?"))
        .expect("serialize");
    assert_eq!(
        json,
        serde_json::json!({
            "clientContent": {
                "turns": [{"role": "user", "parts": [{"text": "Hello? Gemini are you there?"}]}],
                "turnComplete": true
            }
        })
    );
}

#[test]
fn audio_setup_requests_output_transcription() {
    let setup = Setup::for_modalities("gemini-2.0-flash-exp", vec![ResponseModality::Audio]);
    let json = serde_json::to_value(ClientMessage::Setup(setup)).unwrap();
    assert_eq!(json["setup"]["model"], "models/gemini-2.0-flash-exp");
    assert_eq!(json["setup"]["outputAudioTranscription"], serde_json::json!({}));

    let text = Setup::for_modalities("gemini-2.0-flash-exp", vec![ResponseModality::Text]);
    let json = serde_json::to_value(ClientMessage::Setup(text)).unwrap();
    assert!(json["setup"].get("outputAudioTranscription").is_none());
}

#[test]
fn deserializes_setup_complete() {
    match server_message(r#"{"setupComplete": {}}"#) {
        ServerMessage::SetupComplete => {}
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn content_and_markers_arrive_together() {
    let msg = server_message(
        r#"{
            "serverContent": {
                "modelTurn": {"role": "model", "parts": [{"text": "Yes, I'm here."}]},
                "generationComplete": true,
                "turnComplete": true
            },
            "usageMetadata": {"promptTokenCount": 12, "responseTokenCount": 5, "totalTokenCount": 17}
        }"#,
    );
    assert!(msg.is_turn_complete());

    match msg {
        ServerMessage::ServerContent {
            server_content,
            usage_metadata,
        } => {
            assert!(server_content.generation_complete);
            assert!(!server_content.interrupted);
            let turn = server_content.model_turn.expect("model turn");
            assert_eq!(turn.parts[0].as_text(), Some("Yes, I'm here."));
            assert_eq!(usage_metadata.unwrap().total_token_count, Some(17));
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn bare_markers_carry_no_turn() {
    let msg = server_message(r#"{"serverContent": {"generationComplete": true, "turnComplete": true}}"#);
    assert!(msg.is_turn_complete());

    let msg = server_message(r#"{"serverContent": {"generationComplete": true}}"#);
    assert!(!msg.is_turn_complete());
    match msg {
        ServerMessage::ServerContent { server_content, .. } => {
            assert!(server_content.model_turn.is_none());
            assert!(server_content.generation_complete);
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn deserializes_audio_chunk() {
    let msg = server_message(
        r#"{"serverContent": {"modelTurn": {"parts": [
            {"inlineData": {"mimeType": "audio/pcm;rate=24000", "data": "AAAAAA=="}}
        ]}}}"#,
    );
    match msg {
        ServerMessage::ServerContent { server_content, .. } => {
            let turn = server_content.model_turn.expect("model turn");
            let audio = turn.parts[0].as_inline_data().expect("inline data");
            assert_eq!(audio.mime_type(), "audio/pcm;rate=24000");
            assert_eq!(audio.data(), [0, 0, 0, 0]);
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn deserializes_grounding_and_transcription() {
    let msg = server_message(
        r#"{
            "serverContent": {
                "groundingMetadata": {
                    "groundingChunks": [{"web": {"uri": "https://example.com", "title": "Example"}}],
                    "webSearchQueries": ["weather today"]
                },
                "outputTranscription": {"text": "It is sunny"}
            }
        }"#,
    );
    assert!(!msg.is_turn_complete());
    match msg {
        ServerMessage::ServerContent { server_content, .. } => {
            let grounding = server_content.grounding_metadata.expect("grounding");
            assert_eq!(grounding.web_search_queries, ["weather today"]);
            let source = grounding.grounding_chunks[0].source().unwrap();
            assert_eq!(source.title.as_deref(), Some("Example"));
            assert_eq!(server_content.output_transcription.unwrap().text, "It is sunny");
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn deserializes_trailing_usage() {
    match server_message(r#"{"usageMetadata": {"totalTokenCount": 40}}"#) {
        ServerMessage::ServerContent {
            server_content,
            usage_metadata,
        } => {
            assert!(!server_content.turn_complete);
            assert_eq!(usage_metadata.unwrap().total_token_count, Some(40));
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn deserializes_go_away() {
    match server_message(r#"{"goAway": {"timeLeft": "10s"}}"#) {
        ServerMessage::GoAway(go) => assert_eq!(go.time_left.as_deref(), Some("10s")),
        other => panic!("unexpected message: {:?}", other),
    }
}

#[test]
fn unsupported_message_is_an_error() {
    let result = serde_json::from_str::<ServerMessage>(r#"{"toolCall": {"functionCalls": []}}"#);
    assert!(result.is_err());
}
