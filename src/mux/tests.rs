use super::{HandlerRequest, Mux, ResponseWriter};
use http::Method;
use std::sync::Arc;

fn tag_handler(tag: &'static str) -> impl Fn(&HandlerRequest, &mut ResponseWriter) {
    move |_req, rw| rw.write(tag.as_bytes())
}

#[test]
fn exact_pattern_routes_to_handler() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "/zoo/animals", tag_handler("animals"));

    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/zoo/animals"));
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body(), b"animals");
}

#[test]
fn last_registration_wins_for_same_verb_and_pattern() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "/zoo", tag_handler("old"));
    mux.handle_fn(Method::GET, "/zoo", tag_handler("new"));

    assert_eq!(mux.len(), 1);
    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/zoo"));
    assert_eq!(resp.body(), b"new");
}

#[test]
fn verbs_multiplex_independently_under_one_pattern() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "/zoo", tag_handler("read"));
    mux.handle_fn(Method::POST, "/zoo", tag_handler("write"));

    assert_eq!(mux.len(), 2);
    let resp = mux.serve(&HandlerRequest::new(Method::POST, "/zoo"));
    assert_eq!(resp.body(), b"write");
}

#[test]
fn unmatched_path_is_not_found() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "/zoo", tag_handler("zoo"));

    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/aquarium"));
    assert_eq!(resp.status(), 404);
    assert_eq!(resp.body(), b"404 page not found\n");
}

#[test]
fn unmatched_verb_on_matched_pattern_is_method_not_allowed() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "/zoo", tag_handler("zoo"));

    let resp = mux.serve(&HandlerRequest::new(Method::DELETE, "/zoo"));
    assert_eq!(resp.status(), 405);
    assert!(resp.body().is_empty());
}

#[test]
fn trailing_slash_pattern_matches_by_prefix() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "/static/", tag_handler("static"));

    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/static/css/site.css"));
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.body(), b"static");
}

#[test]
fn longest_registered_prefix_wins() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "/", tag_handler("root"));
    mux.handle_fn(Method::GET, "/api/", tag_handler("api"));
    mux.handle_fn(Method::GET, "/api/messages/", tag_handler("messages"));

    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/api/messages/42"));
    assert_eq!(resp.body(), b"messages");

    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/api/other"));
    assert_eq!(resp.body(), b"api");

    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/elsewhere"));
    assert_eq!(resp.body(), b"root");
}

#[test]
fn exact_match_beats_prefix_match() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "/api/", tag_handler("prefix"));
    mux.handle_fn(Method::GET, "/api/messages", tag_handler("exact"));

    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/api/messages"));
    assert_eq!(resp.body(), b"exact");
}

#[test]
#[should_panic(expected = "mux: invalid pattern")]
fn empty_pattern_is_a_wiring_bug() {
    let mux = Mux::new();
    mux.handle_fn(Method::GET, "", tag_handler("nothing"));
}

#[test]
fn serving_and_registration_interleave_safely() {
    let mux = Arc::new(Mux::new());
    mux.handle_fn(Method::GET, "/stable", tag_handler("stable"));

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let mux = Arc::clone(&mux);
            std::thread::spawn(move || {
                for _ in 0..200 {
                    let resp = mux.serve(&HandlerRequest::new(Method::GET, "/stable"));
                    assert_eq!(resp.status(), 200);
                }
            })
        })
        .collect();

    let writer = {
        let mux = Arc::clone(&mux);
        std::thread::spawn(move || {
            for i in 0..50 {
                mux.handle_fn(Method::GET, &format!("/late/{i}"), tag_handler("late"));
            }
        })
    };

    for handle in readers {
        handle.join().expect("reader thread panicked");
    }
    writer.join().expect("writer thread panicked");
    assert_eq!(mux.len(), 51);
}

#[test]
fn response_writer_defaults_to_200_with_empty_body() {
    let rw = ResponseWriter::default();
    assert_eq!(rw.status(), 200);
    assert!(rw.body().is_empty());
    assert!(rw.headers().is_empty());
}

#[test]
fn response_writer_error_envelope() {
    let mut rw = ResponseWriter::new();
    rw.error(500, "boom");
    assert_eq!(rw.status(), 500);
    assert_eq!(
        rw.get_header("content-type"),
        Some("text/plain; charset=utf-8")
    );
    let body: serde_json::Value =
        serde_json::from_slice(rw.body()).expect("error body should be JSON");
    assert_eq!(body["error"], "boom");
}

#[test]
fn json_body_rejects_absent_and_malformed_payloads() {
    let req = HandlerRequest::new(Method::POST, "/x");
    assert!(req.json_body::<serde_json::Value>().is_err());

    let req = HandlerRequest::new(Method::POST, "/x").with_body("{not json");
    assert!(req.json_body::<serde_json::Value>().is_err());

    let req = HandlerRequest::new(Method::POST, "/x").with_body(r#"{"a": 1}"#);
    let v: serde_json::Value = req.json_body().expect("valid JSON body");
    assert_eq!(v["a"], 1);
}
