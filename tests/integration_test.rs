use sequential_thinking_tools::*;
use serde_json::{json, Value};

fn config_with_bound(max_size: usize) -> ThinkingConfig {
    let mut config = ThinkingConfig::default();
    config.history.max_size = max_size;
    config
}

fn submit(server: &mut ThinkingServer, raw: Value) -> Value {
    let envelope = server.process_step(raw);
    assert!(!envelope.is_error(), "unexpected failure: {}", envelope.text());
    serde_json::from_str(envelope.text()).expect("acknowledgment is JSON")
}

fn thought(n: u32, total: u32) -> Value {
    json!({
        "thought": format!("thought #{n}"),
        "thought_number": n,
        "total_thoughts": total,
        "next_thought_needed": true
    })
}

#[test]
fn test_estimate_is_raised_when_exceeded() {
    let mut server = ThinkingServer::default();

    let ack = submit(&mut server, thought(1, 3));
    assert_eq!(ack["thought_number"], 1);
    assert_eq!(ack["total_thoughts"], 3);
    assert_eq!(ack["next_thought_needed"], true);
    assert_eq!(ack["thought_history_length"], 1);

    let ack = submit(&mut server, thought(5, 3));
    assert_eq!(ack["thought_number"], 5);
    assert_eq!(ack["total_thoughts"], 5);
    assert!(server
        .tracker()
        .history()
        .all(|t| t.total_thoughts >= t.thought_number));
}

#[test]
fn test_branch_collects_successive_thoughts() {
    let mut server = ThinkingServer::default();
    submit(&mut server, thought(1, 4));

    let mut ack = Value::Null;
    for n in [2, 3] {
        let mut raw = thought(n, 4);
        raw["branch_from_thought"] = json!(2);
        raw["branch_id"] = json!("b1");
        ack = submit(&mut server, raw);
    }

    assert_eq!(ack["branches"], json!(["b1"]));
    assert_eq!(server.tracker().branch("b1").map(<[_]>::len), Some(2));
}

#[test]
fn test_missing_thought_is_rejected_without_state_change() {
    let mut server = ThinkingServer::default();
    submit(&mut server, thought(1, 2));

    let envelope = server.process_step(json!({
        "thought_number": 2,
        "total_thoughts": 2,
        "next_thought_needed": false
    }));

    assert!(envelope.is_error());
    let payload: Value = serde_json::from_str(envelope.text()).unwrap();
    assert_eq!(payload["status"], "failed");
    assert_eq!(payload["error"], "Missing required field: thought");
    assert_eq!(server.tracker().history_len(), 1);

    // the server keeps working after a rejection
    let ack = submit(&mut server, thought(2, 2));
    assert_eq!(ack["thought_history_length"], 2);
}

#[test]
fn test_history_bound_evicts_oldest_first() {
    let mut server = ThinkingServer::new(&config_with_bound(1000));
    let mut last = Value::Null;
    for n in 1..=1001 {
        last = submit(&mut server, thought(n, 1001));
    }

    assert_eq!(last["thought_history_length"], 1000);
    let tracker = server.tracker();
    assert_eq!(tracker.history_len(), 1000);
    assert!(tracker.history().all(|t| t.thought != "thought #1"));
    assert_eq!(tracker.history().next().unwrap().thought, "thought #2");
    assert_eq!(tracker.latest().unwrap().thought, "thought #1001");
}

#[test]
fn test_evicted_branch_thought_remains_in_branch() {
    let mut server = ThinkingServer::new(&config_with_bound(2));

    let mut raw = thought(1, 5);
    raw["branch_from_thought"] = json!(1);
    raw["branch_id"] = json!("explore");
    submit(&mut server, raw);

    for n in 2..=4 {
        submit(&mut server, thought(n, 5));
    }

    let tracker = server.tracker();
    assert_eq!(tracker.history_len(), 2);
    assert!(tracker.history().all(|t| t.branch_id.is_none()));
    let branch = tracker.branch("explore").expect("branch kept");
    assert_eq!(branch[0].thought, "thought #1");
}

#[test]
fn test_recommendation_trail_accumulates_in_order() {
    let mut server = ThinkingServer::default();
    let mut previous = Value::Null;

    for n in 1..=4 {
        let mut raw = thought(n, 4);
        raw["current_step"] = json!({
            "step_description": format!("step {n}"),
            "recommended_tools": [{
                "tool_name": "search_code",
                "priority": n,
                "rationale": "narrow it down",
                "suggested_inputs": { "query": format!("q{n}"), "limit": 10 }
            }],
            "expected_outcome": "fewer candidates",
            "next_step_conditions": ["candidates < 5"]
        });
        raw["previous_steps"] = previous.clone();
        raw["remaining_steps"] = json!(["verify"]);

        let ack = submit(&mut server, raw);
        assert_eq!(ack["previous_steps"].as_array().unwrap().len(), n as usize);
        assert_eq!(ack["remaining_steps"], json!(["verify"]));
        previous = ack["previous_steps"].clone();
    }

    let descriptions: Vec<&str> = previous
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["step_description"].as_str().unwrap())
        .collect();
    assert_eq!(descriptions, vec!["step 1", "step 2", "step 3", "step 4"]);
    assert_eq!(previous[3]["recommended_tools"][0]["suggested_inputs"]["query"], "q4");
}

#[test]
fn test_revision_is_accepted_even_for_unknown_target() {
    let mut server = ThinkingServer::default();
    let mut raw = thought(2, 3);
    raw["is_revision"] = json!(true);
    raw["revises_thought"] = json!(42);

    let ack = submit(&mut server, raw);
    assert_eq!(ack["thought_history_length"], 1);
    assert_eq!(server.tracker().latest().unwrap().revises_thought, Some(42));
}

#[test]
fn test_configured_extra_tools_are_registered() {
    let mut config = ThinkingConfig::default();
    config.tools.push(Tool {
        name: "web_search".to_string(),
        description: "Search the web".to_string(),
        input_schema: Default::default(),
    });
    config.tools.push(Tool {
        name: SEQUENTIAL_THINKING_TOOL_NAME.to_string(),
        description: "shadow".to_string(),
        input_schema: Default::default(),
    });

    let server = ThinkingServer::new(&config);
    let names: Vec<&str> = server.available_tools().iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec![SEQUENTIAL_THINKING_TOOL_NAME, "web_search"]);
}

#[tokio::test]
async fn test_service_processes_raw_steps() {
    let service = SequentialThinkingService::new(config_with_bound(10));
    let envelope = service.process_step(thought(1, 2)).await;
    assert!(!envelope.is_error());

    let wire = serde_json::to_value(&envelope).unwrap();
    assert_eq!(wire["content"][0]["type"], "text");
    assert!(wire.get("isError").is_none());

    let failure = service.process_step(json!("not an object")).await;
    assert!(failure.is_error());
    assert_eq!(service.history_len().await, 1);
}

#[derive(Debug, Default)]
struct FlakyConsole {
    failed_once: std::cell::Cell<bool>,
}

impl ThoughtRenderer for FlakyConsole {
    fn render(&self, _thought: &ThoughtData) -> Result<()> {
        if self.failed_once.replace(true) {
            Ok(())
        } else {
            Err(ThinkingError::Internal("stderr unavailable".to_string()))
        }
    }

    fn error(&self, _message: &str) {}
}

#[test]
fn test_server_recovers_after_render_failure() {
    let mut server =
        ThinkingServer::with_renderer(&ThinkingConfig::default(), Box::new(FlakyConsole::default()));

    let envelope = server.process_step(thought(1, 2));
    assert!(envelope.is_error());
    let payload: Value = serde_json::from_str(envelope.text()).unwrap();
    assert_eq!(payload["status"], "failed");
    assert_eq!(payload["error"], "Internal error: stderr unavailable");
    assert_eq!(server.tracker().history_len(), 1);

    let ack = submit(&mut server, thought(2, 2));
    assert_eq!(ack["thought_history_length"], 2);
}
