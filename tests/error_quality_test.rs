//! Error message quality tests
//!
//! Tests that verify error messages are helpful and distinguishable.

use fnos_monitor::error::{FnosError, SetupError};
use std::error::Error;
use std::time::Duration;

#[test]
fn test_auth_error_message_clarity() {
    // Given: An authentication error
    let error = FnosError::Auth("login rejected for user 'admin'".to_string());

    // When: Converting to string
    let message = format!("{}", error);

    // Then: Message should clearly indicate authentication issue
    assert!(message.contains("Authentication failed"));
    assert!(message.contains("admin"));
}

#[test]
fn test_api_error_message_clarity() {
    // Given: An fnOS API error
    let error = FnosError::Api("stor.general failed: result=fail errno=131".to_string());

    // When: Converting to string
    let message = format!("{}", error);

    // Then: Message should clearly indicate API issue and keep context
    assert!(message.contains("fnOS API error"));
    assert!(message.contains("stor.general"));
    assert!(message.contains("131"));
}

#[test]
fn test_websocket_error_message_clarity() {
    // Given: A WebSocket error (needs a tungstenite::Error)
    use tungstenite::error::Error as WsError;
    use tungstenite::error::ProtocolError;

    let ws_err = WsError::Protocol(ProtocolError::ResetWithoutClosingHandshake);
    let error = FnosError::from(ws_err);

    // When: Converting to string
    let message = format!("{}", error);

    // Then: Message should clearly indicate WebSocket issue
    assert!(message.contains("WebSocket error"));
}

#[test]
fn test_json_error_message_clarity() {
    let json_err = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
    let error = FnosError::Json(json_err);

    assert!(format!("{}", error).contains("JSON error"));
}

#[test]
fn test_not_connected_is_detectable() {
    assert!(FnosError::NotConnected.is_not_connected());
    assert!(!FnosError::Api("x".to_string()).is_not_connected());
    assert_eq!(FnosError::NotConnected.to_string(), "Not connected to fnOS");
}

#[test]
fn test_not_ready_wraps_cause_once() {
    // Given: A cause wrapped twice
    let error = FnosError::not_ready(FnosError::not_ready(FnosError::NotConnected));

    // Then: Only one NotReady layer exists and the cause is reachable
    let FnosError::NotReady(inner) = &error else {
        panic!("expected NotReady, got {:?}", error);
    };
    assert!(inner.is_not_connected());
    assert!(error.source().is_some());
    assert!(error.to_string().contains("Not connected"));
}

#[test]
fn test_timeout_message_includes_duration() {
    let message = FnosError::Timeout(Duration::from_secs(10)).to_string();

    assert!(message.contains("timed out"));
    assert!(message.contains("10s"));
}

#[test]
fn test_error_messages_are_distinguishable() {
    // Given: Different error types
    let auth_err = format!("{}", FnosError::Auth("test".to_string()));
    let api_err = format!("{}", FnosError::Api("test".to_string()));
    let config_err = format!("{}", FnosError::Config("test".to_string()));
    let server_err = format!("{}", FnosError::Server("test".to_string()));

    // Then: Each should have a unique prefix
    assert!(auth_err.starts_with("Authentication failed"));
    assert!(api_err.starts_with("fnOS API error"));
    assert!(config_err.starts_with("Configuration error"));
    assert!(server_err.starts_with("HTTP server error"));

    assert_ne!(auth_err, api_err);
    assert_ne!(api_err, config_err);
    assert_ne!(config_err, server_err);
}

#[test]
fn test_setup_error_keys() {
    let cannot_connect = SetupError::CannotConnect("refused".to_string());
    let invalid_auth = SetupError::InvalidAuth("bad password".to_string());
    let invalid_input = SetupError::InvalidInput("host must not be empty".to_string());

    assert_eq!(cannot_connect.key(), "cannot_connect");
    assert_eq!(invalid_auth.key(), "invalid_auth");
    assert_eq!(invalid_input.key(), "invalid_input");
    assert!(cannot_connect.to_string().contains("Cannot connect"));
    assert!(invalid_auth.to_string().contains("Invalid authentication"));
}

#[test]
fn test_error_debug_format() {
    // Given: An error instance
    let error = FnosError::Auth("Invalid credentials".to_string());

    // When: Using debug format
    let debug_message = format!("{:?}", error);

    // Then: Should include variant name and details
    assert!(debug_message.contains("Auth"));
    assert!(debug_message.contains("Invalid credentials"));
}
