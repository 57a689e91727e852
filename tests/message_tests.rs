use http::Method;
use std::sync::Arc;

use routewire::message::{
    setup, AppFactory, MemoryTransport, Message, MessageController, Registration, Transport,
    API_PATH, SPY_PATH,
};
use routewire::mux::HandlerRequest;

mod common;
use common::message_mux;

/// Transport whose operations always fail, for exercising the error paths.
struct FailingTransport;

impl Transport for FailingTransport {
    fn send(&self, _msg: Message) -> anyhow::Result<()> {
        Err(anyhow::anyhow!("store unavailable"))
    }

    fn list(&self) -> anyhow::Result<Vec<Message>> {
        Err(anyhow::anyhow!("store unavailable"))
    }
}

fn post_message(body: &str) -> HandlerRequest {
    HandlerRequest::new(Method::POST, API_PATH)
        .with_header("Content-Type", "application/json")
        .with_body(body)
}

fn error_message(body: &[u8]) -> String {
    let value: serde_json::Value = serde_json::from_slice(body).expect("error envelope");
    value["error"].as_str().expect("error string").to_string()
}

#[test]
fn test_send_then_list_round_trip() {
    let mux = message_mux(Arc::new(MemoryTransport::new()));

    let rw = mux.serve(&post_message(
        r#"{"From": "kkrs", "To": "world", "Message": "hello"}"#,
    ));
    assert_eq!(rw.status(), 200);
    assert!(rw.body().is_empty());

    let rw = mux.serve(&HandlerRequest::new(Method::GET, SPY_PATH));
    assert_eq!(rw.status(), 200);
    assert_eq!(rw.get_header("Content-Type"), Some("application/json"));
    let listed: Vec<Message> = serde_json::from_slice(rw.body()).expect("decode list");
    assert_eq!(
        listed,
        vec![Message {
            from: "kkrs".to_string(),
            to: "world".to_string(),
            message: "hello".to_string(),
        }]
    );
}

#[test]
fn test_wrong_verb_on_known_path_is_405() {
    let mux = message_mux(Arc::new(MemoryTransport::new()));
    let rw = mux.serve(&HandlerRequest::new(Method::GET, API_PATH));
    assert_eq!(rw.status(), 405);
    assert!(rw.body().is_empty());

    let rw = mux.serve(&HandlerRequest::new(Method::POST, SPY_PATH));
    assert_eq!(rw.status(), 405);
}

#[test]
fn test_unknown_path_is_404() {
    let mux = message_mux(Arc::new(MemoryTransport::new()));
    let rw = mux.serve(&HandlerRequest::new(Method::GET, "/unknown/path"));
    assert_eq!(rw.status(), 404);
    assert_eq!(rw.body(), b"404 page not found\n");
    assert_eq!(
        rw.get_header("Content-Type"),
        Some("text/plain; charset=utf-8")
    );
}

#[test]
fn test_malformed_body_is_500() {
    let transport = Arc::new(MemoryTransport::new());
    let mux = message_mux(Arc::clone(&transport) as Arc<dyn Transport>);

    let rw = mux.serve(&post_message("{not json"));
    assert_eq!(rw.status(), 500);
    assert!(error_message(rw.body()).starts_with("error reading request:"));
    assert_eq!(transport.stored().expect("stored"), 0);
}

#[test]
fn test_missing_body_is_500() {
    let mux = message_mux(Arc::new(MemoryTransport::new()));
    let rw = mux.serve(&HandlerRequest::new(Method::POST, API_PATH));
    assert_eq!(rw.status(), 500);
    assert_eq!(
        error_message(rw.body()),
        "error reading request: unexpected end of JSON input"
    );
}

#[test]
fn test_transport_failures_surface_as_500() {
    let mux = message_mux(Arc::new(FailingTransport));

    let rw = mux.serve(&post_message(
        r#"{"From": "a", "To": "b", "Message": "c"}"#,
    ));
    assert_eq!(rw.status(), 500);
    assert_eq!(
        error_message(rw.body()),
        "error sending message: store unavailable"
    );

    let rw = mux.serve(&HandlerRequest::new(Method::GET, SPY_PATH));
    assert_eq!(rw.status(), 500);
    assert_eq!(
        error_message(rw.body()),
        "error getting messages: store unavailable"
    );
}

#[test]
fn test_list_is_bounded_to_the_page_size() {
    let transport = Arc::new(MemoryTransport::new());
    let mux = message_mux(Arc::clone(&transport) as Arc<dyn Transport>);

    for n in 0..12 {
        let body = format!(r#"{{"From": "a", "To": "b", "Message": "m{n}"}}"#);
        assert_eq!(mux.serve(&post_message(&body)).status(), 200);
    }
    assert_eq!(transport.stored().expect("stored"), 12);

    let rw = mux.serve(&HandlerRequest::new(Method::GET, SPY_PATH));
    let listed: Vec<Message> = serde_json::from_slice(rw.body()).expect("decode list");
    assert_eq!(listed.len(), 10);
    assert_eq!(listed[0].message, "m0");
}

#[test]
fn test_concurrent_sends_all_land() {
    let transport = Arc::new(MemoryTransport::with_page_size(64));
    let mux = message_mux(Arc::clone(&transport) as Arc<dyn Transport>);

    let handles: Vec<_> = (0..8)
        .map(|t| {
            let mux = Arc::clone(&mux);
            std::thread::spawn(move || {
                for n in 0..4 {
                    let body = format!(r#"{{"From": "t{t}", "To": "b", "Message": "m{n}"}}"#);
                    let rw = mux.serve(&post_message(&body));
                    assert_eq!(rw.status(), 200);
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().expect("sender thread");
    }

    assert_eq!(transport.stored().expect("stored"), 32);
    let rw = mux.serve(&HandlerRequest::new(Method::GET, SPY_PATH));
    let listed: Vec<Message> = serde_json::from_slice(rw.body()).expect("decode list");
    assert_eq!(listed.len(), 32);
}

#[test]
#[should_panic(expected = "argument 'label' cannot be empty")]
fn test_setup_panics_on_bad_registration() {
    let transport: Arc<dyn Transport> = Arc::new(MemoryTransport::new());
    let _ = setup(
        Arc::new(AppFactory::new("test", Arc::clone(&transport))),
        vec![Registration::new(
            Box::new(MessageController { transport }),
            "",
        )],
    );
}
