use may_minihttp::{HttpService, Request, Response};
use std::io;
use std::sync::Arc;
use tracing::{info, warn};

use super::request::parse_request;
use super::response::write_response;
use crate::mux::Mux;

/// The HTTP service bridging the coroutine server and the mux.
///
/// One instance is cloned per connection by `may_minihttp`; all of them
/// share the same routing table through the `Arc`.
#[derive(Clone)]
pub struct AppService {
    pub mux: Arc<Mux>,
}

impl AppService {
    #[must_use]
    pub fn new(mux: Arc<Mux>) -> Self {
        Self { mux }
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let request = match parse_request(req) {
            Ok(request) => request,
            Err(err) => {
                warn!(error = %err, "Rejecting unparsable request");
                let mut rw = crate::mux::ResponseWriter::new();
                rw.error(400, &format!("error parsing request: {err}"));
                write_response(res, rw);
                return Ok(());
            }
        };

        let id = request.id;
        let method = request.method.clone();
        let path = request.path.clone();

        let rw = self.mux.serve(&request);

        info!(
            request_id = %id,
            method = %method,
            path = %path,
            status = rw.status(),
            "Request served"
        );
        write_response(res, rw);
        Ok(())
    }
}
