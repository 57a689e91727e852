use may_minihttp::Response;

use crate::mux::ResponseWriter;

fn status_reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        201 => "Created",
        400 => "Bad Request",
        401 => "Unauthorized",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        503 => "Service Unavailable",
        _ => "Unknown",
    }
}

/// Static header line for the headers this crate actually emits, so the
/// hot path never allocates. Unknown headers fall through to the leaking
/// dynamic path in [`write_response`].
fn static_header_line(name: &str, value: &str) -> Option<&'static str> {
    if name.eq_ignore_ascii_case("content-type") {
        match value {
            "application/json" => return Some("Content-Type: application/json"),
            "text/plain; charset=utf-8" => {
                return Some("Content-Type: text/plain; charset=utf-8")
            }
            _ => {}
        }
    }
    None
}

/// Serialize a finished [`ResponseWriter`] onto the wire.
pub fn write_response(res: &mut Response, rw: ResponseWriter) {
    res.status_code(rw.status() as usize, status_reason(rw.status()));
    for (name, value) in rw.headers() {
        match static_header_line(name, value) {
            Some(line) => {
                res.header(line);
            }
            // may_minihttp wants &'static str header lines; only headers a
            // handler invented at runtime pay the leak
            None => {
                let header = format!("{name}: {value}").into_boxed_str();
                res.header(Box::leak(header));
            }
        }
    }
    let body: Vec<u8> = rw.body().to_vec();
    if !body.is_empty() {
        res.body_vec(body);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_reason() {
        assert_eq!(status_reason(200), "OK");
        assert_eq!(status_reason(404), "Not Found");
        assert_eq!(status_reason(405), "Method Not Allowed");
        assert_eq!(status_reason(503), "Service Unavailable");
        assert_eq!(status_reason(418), "Unknown");
    }

    #[test]
    fn test_emitted_header_lines_are_static() {
        assert_eq!(
            static_header_line("Content-Type", "application/json"),
            Some("Content-Type: application/json")
        );
        assert_eq!(
            static_header_line("content-type", "text/plain; charset=utf-8"),
            Some("Content-Type: text/plain; charset=utf-8")
        );
        assert_eq!(static_header_line("Content-Type", "text/html"), None);
        assert_eq!(static_header_line("X-Custom", "value"), None);
    }
}
