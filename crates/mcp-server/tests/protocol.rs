//! End-to-end protocol tests over raw JSON payloads

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use mcp_server::protocol::{McpInputSchema, McpTool, RequestHandler, ServerInfo};
use mcp_server::tools::LookupMeasurementTool;
use mcp_server::{Collaborators, McpServer, ResourceRegistry, ToolRegistry};
use sensor_core::{
    Account, InMemoryAccountStore, InMemoryMeasurementStore, LoggingMailSender, Measurement,
    Sensor, Settings,
};
use serde_json::{json, Value};

async fn seeded_server(mailer: LoggingMailSender) -> McpServer {
    let accounts = InMemoryAccountStore::new();
    accounts
        .add_account(Account {
            id: "acc-1".to_string(),
            email: "owner@example.com".to_string(),
            name: "Owner".to_string(),
            enabled: true,
        })
        .await;
    accounts
        .add_sensor(Sensor {
            id: "s-1".to_string(),
            account_id: "acc-1".to_string(),
            device_id: "abc".to_string(),
            name: "North tank".to_string(),
            enabled: true,
        })
        .await
        .unwrap();
    accounts
        .add_sensor(Sensor {
            id: "s-off".to_string(),
            account_id: "acc-1".to_string(),
            device_id: "def".to_string(),
            name: "Old tank".to_string(),
            enabled: false,
        })
        .await
        .unwrap();

    let measurements = InMemoryMeasurementStore::new();
    measurements
        .record(Measurement {
            device_id: "abc".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap(),
            distance_mm: 1520,
            battery_volts: 3.58,
            rssi_dbm: -104,
        })
        .await;

    let collaborators = Collaborators {
        measurements: Arc::new(measurements),
        accounts: Arc::new(accounts),
        mailer: Arc::new(mailer),
    };

    McpServer::build(&Settings::new(), &collaborators)
        .await
        .unwrap()
}

async fn send(handler: &RequestHandler, payload: Value) -> Option<Value> {
    let bytes = serde_json::to_vec(&payload).unwrap();
    handler
        .handle_payload(&bytes)
        .await
        .map(|out| serde_json::from_slice(&out).unwrap())
}

fn assert_single_payload(response: &Value) {
    let has_result = response.get("result").is_some();
    let has_error = response.get("error").is_some();
    assert!(has_result ^ has_error, "exactly one of result/error: {}", response);
}

#[tokio::test]
async fn every_request_gets_one_response_with_its_id() {
    let server = seeded_server(LoggingMailSender::new("noreply@example.com")).await;
    let handler = server.handler();

    let requests = [
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        json!({"jsonrpc": "2.0", "id": "two", "method": "tools/list"}),
        json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"}),
        json!({"jsonrpc": "2.0", "id": 4, "method": "nope"}),
        json!({"jsonrpc": "2.0", "id": 5, "method": "tools/call", "params": {"name": "ghost"}}),
        json!({"jsonrpc": "2.0", "id": 6.5, "method": "ping"}),
    ];

    for request in requests {
        let response = send(&handler, request.clone()).await.unwrap();
        assert_eq!(response["id"], request["id"]);
        assert_eq!(response["jsonrpc"], "2.0");
        assert_single_payload(&response);
    }
}

#[tokio::test]
async fn lists_are_idempotent() {
    let server = seeded_server(LoggingMailSender::new("noreply@example.com")).await;
    let handler = server.handler();

    for method in ["tools/list", "resources/list"] {
        let first = send(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": method})).await;
        let second = send(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": method})).await;
        assert_eq!(first, second);
    }
}

#[tokio::test]
async fn reads_sensor_resource() {
    let server = seeded_server(LoggingMailSender::new("noreply@example.com")).await;

    let response = send(
        &server.handler(),
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "resources/read",
            "params": {"uri": "sensor://abc/last"}
        }),
    )
    .await
    .unwrap();

    let contents = response["result"]["contents"].as_array().unwrap();
    assert_eq!(contents.len(), 1);
    assert_eq!(contents[0]["uri"], "sensor://abc/last");
    assert_eq!(contents[0]["mimeType"], "application/json");
    let body: Value = serde_json::from_str(contents[0]["text"].as_str().unwrap()).unwrap();
    assert_eq!(body["measurement"]["distanceMm"], 1520);
}

#[tokio::test]
async fn unknown_resource_on_empty_registry() {
    let handler = RequestHandler::new(ServerInfo::new("empty"))
        .with_resources(Arc::new(ResourceRegistry::new()));

    let response = send(
        &handler,
        json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": "resources/read",
            "params": {"uri": "sensor://abc/last"}
        }),
    )
    .await
    .unwrap();

    assert_eq!(response["error"]["code"], -32602);
    assert!(response["error"]["message"]
        .as_str()
        .unwrap()
        .contains("sensor://abc/last"));
}

#[tokio::test]
async fn initialize_without_registries_advertises_nothing() {
    let handler = RequestHandler::new(ServerInfo::new("bare"));

    let response = send(
        &handler,
        json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
            "protocolVersion": "2024-11-05",
            "clientInfo": {"name": "cli", "version": "1.0"},
            "capabilities": {}
        }}),
    )
    .await
    .unwrap();

    assert_eq!(response["id"], 1);
    assert_eq!(response["result"]["capabilities"], json!({}));
}

#[tokio::test]
async fn single_tool_is_listed_with_its_schema() {
    let tools = Arc::new(ToolRegistry::new());
    tools
        .register(
            LookupMeasurementTool::definition(),
            LookupMeasurementTool::VALIDATION,
            Arc::new(LookupMeasurementTool::new(Arc::new(
                InMemoryMeasurementStore::new(),
            ))),
        )
        .await
        .unwrap();
    let handler = RequestHandler::new(ServerInfo::new("one-tool")).with_tools(tools);

    let response = send(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .await
        .unwrap();

    let listed = response["result"]["tools"].as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["name"], "lookup-measurement");
    assert_eq!(
        listed[0]["inputSchema"],
        serde_json::to_value(LookupMeasurementTool::definition().input_schema).unwrap()
    );
}

#[tokio::test]
async fn domain_failures_are_success_envelopes() {
    let server = seeded_server(LoggingMailSender::new("noreply@example.com")).await;
    let handler = server.handler();

    let calls = [
        json!({"name": "lookup-measurement", "arguments": {"deviceId": "def"}}),
        json!({"name": "get-sensor", "arguments": {"sensorId": "s-off"}}),
        json!({"name": "get-sensor", "arguments": {"sensorId": "s-404"}}),
        json!({"name": "list-sensor-alarms", "arguments": {"sensorId": "s-404"}}),
    ];

    for params in calls {
        let response = send(
            &handler,
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": params}),
        )
        .await
        .unwrap();

        assert!(response.get("error").is_none(), "{}", response);
        assert_eq!(response["result"]["isError"], true);
        assert!(!response["result"]["content"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn mail_failure_is_domain_error() {
    let server = seeded_server(
        LoggingMailSender::new("noreply@example.com").with_failing_delivery(true),
    )
    .await;

    let response = send(
        &server.handler(),
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {
            "name": "send-authentication-mail",
            "arguments": {"address": "owner@example.com", "url": "https://example.com/verify"}
        }}),
    )
    .await
    .unwrap();

    assert_eq!(response["result"]["isError"], true);
}

#[tokio::test]
async fn validation_placement_follows_tool_mode() {
    let server = seeded_server(LoggingMailSender::new("noreply@example.com")).await;
    let handler = server.handler();

    // Protocol-validated tool
    let response = send(
        &handler,
        json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {
            "name": "lookup-measurement", "arguments": {"deviceId": 12}
        }}),
    )
    .await
    .unwrap();
    assert_eq!(response["error"]["code"], -32602);

    // Domain-validated tool
    let response = send(
        &handler,
        json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {
            "name": "get-sensor", "arguments": {}
        }}),
    )
    .await
    .unwrap();
    assert_eq!(response["result"]["isError"], true);
}

#[tokio::test]
async fn notifications_and_invalid_envelopes() {
    let server = seeded_server(LoggingMailSender::new("noreply@example.com")).await;
    let handler = server.handler();

    assert!(send(
        &handler,
        json!({"jsonrpc": "2.0", "method": "notifications/initialized"})
    )
    .await
    .is_none());

    let response = send(&handler, json!({"jsonrpc": "2.0", "id": null, "method": "ping"}))
        .await
        .unwrap();
    assert_eq!(response["error"]["code"], -32600);
    assert!(response["id"].is_null());

    let response = send(&handler, json!({"jsonrpc": "1.0", "id": 9, "method": "ping"}))
        .await
        .unwrap();
    assert_eq!(response["error"]["code"], -32600);
    assert_eq!(response["id"], 9);
}

#[tokio::test]
async fn concurrent_requests_keep_their_ids() {
    let server = seeded_server(LoggingMailSender::new("noreply@example.com")).await;
    let handler = server.handler();

    let tasks: Vec<_> = (0..32)
        .map(|id| {
            let handler = handler.clone();
            tokio::spawn(async move {
                let payload = json!({"jsonrpc": "2.0", "id": id, "method": "tools/call", "params": {
                    "name": "lookup-measurement", "arguments": {"deviceId": "abc"}
                }});
                let response = send(&handler, payload).await.unwrap();
                (id, response)
            })
        })
        .collect();

    for task in tasks {
        let (id, response) = task.await.unwrap();
        assert_eq!(response["id"], id);
        assert!(response["result"]["isError"].is_null());
    }
}

#[tokio::test]
async fn custom_tool_registered_after_startup() {
    let tools = Arc::new(ToolRegistry::new());
    let handler = RequestHandler::new(ServerInfo::new("dynamic")).with_tools(tools.clone());

    let before = send(&handler, json!({"jsonrpc": "2.0", "id": 1, "method": "tools/list"}))
        .await
        .unwrap();
    assert_eq!(before["result"]["tools"], json!([]));

    tools
        .register(
            McpTool {
                name: "lookup-measurement".to_string(),
                description: "Latest measurement".to_string(),
                input_schema: McpInputSchema::required_strings(&[("deviceId", "Device")]),
            },
            mcp_server::ValidationMode::Protocol,
            Arc::new(LookupMeasurementTool::new(Arc::new(
                InMemoryMeasurementStore::new(),
            ))),
        )
        .await
        .unwrap();

    let after = send(&handler, json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}))
        .await
        .unwrap();
    assert_eq!(after["result"]["tools"].as_array().unwrap().len(), 1);
}
