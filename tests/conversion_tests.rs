use responses2chat::conversion::PayloadDefaults;
use responses2chat::inbound::InboundRequest;
use responses2chat::tools::{ToolDeclaration, ToolForm};
use responses2chat::{build_upstream_payload, extract_user_text, normalize_tools, Config, Provider};
use serde_json::{json, Value};

fn inbound(v: Value) -> InboundRequest {
    serde_json::from_value(v).expect("inbound request parses")
}

#[test]
fn godot_style_request_translates_to_groq_chat() {
    // Responses-style body with chat-style tools, as sent by editor plugins
    let body = inbound(json!({
        "model": "llama-3.1-8b-instant",
        "input": "Add a jump to the player",
        "tools": [{
            "type": "function",
            "function": {
                "name": "edit_script",
                "description": "Edit a GDScript file",
                "parameters": {"type": "object", "properties": {"path": {"type": "string"}}}
            }
        }],
        "max_output_tokens": 500
    }));

    let cfg = Config::for_provider(Provider::Groq);
    let text = extract_user_text(&body, None).expect("text");
    let candidates = cfg.candidate_models(body.requested_model());
    let payload = build_upstream_payload(&body, &text, &candidates[0], cfg.payload_defaults());

    let v = serde_json::to_value(&payload).unwrap();
    assert_eq!(v["model"], json!("llama-3.1-8b-instant"));
    assert_eq!(
        v["messages"],
        json!([
            {"role": "system", "content": "You are a helpful assistant."},
            {"role": "user", "content": "Add a jump to the player"}
        ])
    );
    assert_eq!(v["tools"][0]["function"]["name"], json!("edit_script"));
    assert_eq!(
        v["tools"][0]["function"]["parameters"]["properties"]["path"]["type"],
        json!("string")
    );
    assert_eq!(v["temperature"], json!(0.2));
    assert_eq!(v["max_tokens"], json!(500));
    assert!(v.get("tool_choice").is_none());
}

#[test]
fn chat_style_request_uses_last_message() {
    let body = inbound(json!({
        "messages": [
            {"role": "system", "content": "ignored, instructions win"},
            {"role": "user", "content": "first"},
            {"role": "assistant", "content": "reply"},
            {"role": "user", "content": "second"}
        ]
    }));
    assert_eq!(extract_user_text(&body, None).as_deref(), Some("second"));
}

#[test]
fn openai_defaults_differ_from_groq() {
    let body = inbound(json!({"input": "x"}));
    let cfg = Config::for_provider(Provider::OpenAi);
    let payload = build_upstream_payload(&body, "x", "gpt-4o-mini", cfg.payload_defaults());
    assert_eq!(payload.temperature, 0.7);
    assert_eq!(payload.max_tokens, 800);
}

#[test]
fn custom_defaults_apply() {
    let body = inbound(json!({"input": "x"}));
    let defaults = PayloadDefaults {
        system_prompt: "terse",
        temperature: 0.0,
        max_tokens: 1024,
    };
    let payload = build_upstream_payload(&body, "x", "m", defaults);
    assert_eq!(payload.messages[0].content, "terse");
    assert_eq!(payload.temperature, 0.0);
    assert_eq!(payload.max_tokens, 1024);
}

#[test]
fn tool_payload_survives_both_directions() {
    let raw = vec![
        json!({"type": "function", "name": "a", "description": "A", "parameters": {"type": "object", "required": ["q"]}}),
        json!({"type": "function", "function": {"name": "b"}}),
        json!({"type": "code_interpreter"}),
        json!(null),
    ];

    let flat = normalize_tools(&raw, ToolForm::Flat);
    let nested = normalize_tools(&raw, ToolForm::Nested);
    assert_eq!(flat.len(), 2);
    assert_eq!(nested.len(), 2);
    for (f, n) in flat.iter().zip(nested.iter()) {
        assert_eq!(f.spec(), n.spec());
    }

    let flat_wire = serde_json::to_value(&flat).unwrap();
    assert_eq!(flat_wire[0]["name"], json!("a"));
    assert_eq!(flat_wire[0]["parameters"]["required"], json!(["q"]));
    assert!(flat_wire[1].get("function").is_none());

    let parsed: Vec<ToolDeclaration> = serde_json::from_value(flat_wire).unwrap();
    assert_eq!(parsed, flat);
}
