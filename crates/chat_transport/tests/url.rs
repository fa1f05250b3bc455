use assert_matches::assert_matches;
use chat_transport::{docs_url, file_url, ws_url, TransportError};

#[test]
fn ws_url_maps_http_to_ws() {
    assert_eq!(
        ws_url("http://localhost:8000", "session_abc").expect("valid").as_str(),
        "ws://localhost:8000/ws/session_abc"
    );
}

#[test]
fn ws_url_maps_https_to_wss_and_keeps_base_path() {
    assert_eq!(
        ws_url("https://chat.example.test/api/", "s1").expect("valid").as_str(),
        "wss://chat.example.test/api/ws/s1"
    );
}

#[test]
fn empty_base_uses_default_origin() {
    assert_eq!(
        ws_url("  ", "s1").expect("valid").as_str(),
        "ws://localhost:8000/ws/s1"
    );
}

#[test]
fn unsupported_scheme_is_rejected() {
    assert_matches!(
        ws_url("ftp://example.test", "s1"),
        Err(TransportError::InvalidBaseUrl(_))
    );
    assert_matches!(ws_url("not a url", "s1"), Err(TransportError::InvalidBaseUrl(_)));
}

#[test]
fn file_url_encodes_the_id_as_one_segment() {
    assert_eq!(
        file_url("http://localhost:8000", "q3 summary.pdf").expect("valid").as_str(),
        "http://localhost:8000/files/q3%20summary.pdf"
    );
}

#[test]
fn docs_url_targets_architecture_endpoint() {
    assert_eq!(
        docs_url("http://localhost:8000/?x=1").expect("valid").as_str(),
        "http://localhost:8000/demo-architecture"
    );
}
