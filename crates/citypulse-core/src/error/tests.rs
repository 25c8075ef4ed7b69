use super::*;

#[test]
fn test_transport_error_message() {
    let error = Error::from(citypulse_remote::Error::Network("connection refused".to_string()));

    let msg = error.user_message();
    assert!(msg.contains("reach the backend"));

    let suggestion = error.suggestion().unwrap();
    assert!(suggestion.contains("CITYPULSE_API_URL"));
}

#[test]
fn test_api_error_message() {
    let error = Error::from(citypulse_remote::Error::Api {
        status: 503,
        message: "zone backend busy".to_string(),
    });

    let msg = error.user_message();
    assert!(msg.contains("503"));
    assert!(msg.contains("zone backend busy"));
    assert!(error.suggestion().is_none());
}

#[test]
fn test_timeout_display() {
    let error = Error::Timeout {
        operation: "live stream refresh",
        budget: Duration::from_secs(15),
    };

    assert_eq!(error.to_string(), "live stream refresh timed out after 15s");
    assert!(error.user_message().contains("15 seconds"));
}

#[test]
fn test_format_error_for_cli() {
    let error = Error::ConfirmationRequired("deleting scenario 'scn-1'".to_string());

    let output = format_error_for_cli(&error);
    assert!(output.contains("scn-1"));
    assert!(output.contains("--yes"));
}
