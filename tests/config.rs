use base64::Engine;
use gemini_samples::v1beta::live::{Content, InlineData, ResponseModality, Role, Setup};
use gemini_samples::v1beta::request::GenerationConfig;

#[test]
fn inline_data_encodes_base64() {
    let data = vec![0x1, 0x2, 0x3];
    let inline = InlineData::new("image/png", data.clone());
    let json = serde_json::to_value(&inline).expect("serialize");
    let encoded = json["data"].as_str().unwrap();
    assert_eq!(
        encoded,
        base64::engine::general_purpose::STANDARD.encode(data)
    );
}

#[test]
fn inline_data_debug_hides_bytes() {
    let inline = InlineData::new("image/png", vec![0xAB; 32]);
    let debug = format!("{inline:?}");
    assert!(debug.contains("image/png"));
    assert!(debug.contains("32 bytes"));
    assert!(!debug.contains("171"));
}

#[test]
fn generation_config_serializes_optional() {
    let cfg = GenerationConfig::new()
        .with_max_output_tokens(10)
        .with_stop_sequences(vec!["END".to_string()]);
    let value = serde_json::to_value(&cfg).expect("serialize");
    assert_eq!(value["maxOutputTokens"], 10);
    assert_eq!(value["stopSequences"][0], "END");
    assert!(value.get("temperature").is_none());
}

#[test]
fn setup_system_instruction_serializes_content() {
    let instruction = Content {
        parts: vec![],
        role: Some(Role::Model),
    };
    let setup = Setup::new("models/test").with_system_instruction(instruction.clone());
    let json = serde_json::to_value(&setup).expect("serialize");
    assert_eq!(
        json["systemInstruction"],
        serde_json::to_value(instruction).unwrap()
    );
}

#[test]
fn setup_for_modalities_normalizes_model() {
    let setup = Setup::for_modalities("gemini-2.0-flash-exp", vec![ResponseModality::Audio]);
    let json = serde_json::to_value(&setup).expect("serialize");
    assert_eq!(json["model"], "models/gemini-2.0-flash-exp");
    assert_eq!(
        json["generationConfig"]["responseModalities"],
        serde_json::json!(["AUDIO"])
    );

    let already_prefixed = Setup::for_modalities("models/gemini-2.0-flash-exp", vec![]);
    assert_eq!(already_prefixed.model(), "models/gemini-2.0-flash-exp");
}
