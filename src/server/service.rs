use http::header::{HeaderValue, SERVER};
use http::StatusCode;
use may_minihttp::{HttpService, Request, Response};
use std::any::Any;
use std::backtrace::Backtrace;
use std::io;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, warn};

use super::request::HttpRequest;
use super::response::{HttpResponse, SERVER_NAME};
use crate::dispatcher::Dispatcher;
use crate::middleware::Middleware;

/// Body of the response sent when a handler panics.
pub const PANIC_BODY: &str = "500 Internal Server Error";

/// `may_minihttp` service that runs middleware and dispatch for each request.
///
/// Cloned once per connection; clones share the dispatcher and middlewares.
#[derive(Clone)]
pub struct AppService {
    dispatcher: Arc<Dispatcher>,
    middlewares: Vec<Arc<dyn Middleware>>,
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "non-string panic payload"
    }
}

impl AppService {
    #[must_use]
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            middlewares: Vec::new(),
        }
    }

    pub fn add_middleware(&mut self, middleware: Arc<dyn Middleware>) {
        self.middlewares.push(middleware);
    }

    #[must_use]
    pub fn with_middleware(mut self, middleware: Arc<dyn Middleware>) -> Self {
        self.add_middleware(middleware);
        self
    }

    #[must_use]
    pub fn dispatcher(&self) -> &Arc<Dispatcher> {
        &self.dispatcher
    }

    /// Run one request through middlewares and the dispatcher.
    ///
    /// A panic inside dispatch is caught, logged with a backtrace and turned
    /// into a generic `500`; the service keeps serving.
    #[must_use]
    pub fn handle(&self, req: HttpRequest) -> HttpResponse {
        let head = req.head();
        let start = Instant::now();

        let mut early = None;
        for mw in &self.middlewares {
            let res = mw.before(&head);
            if early.is_none() {
                early = res;
            }
        }

        let (mut res, latency) = match early {
            Some(res) => (res, Duration::from_millis(0)),
            None => {
                let dispatcher = &self.dispatcher;
                let res = match catch_unwind(AssertUnwindSafe(|| dispatcher.dispatch(req))) {
                    Ok(res) => res,
                    Err(payload) => {
                        error!(
                            method = %head.method(),
                            path = %head.path(),
                            panic_message = panic_message(&*payload),
                            backtrace = %Backtrace::capture(),
                            "Handler panicked"
                        );
                        let mut res =
                            HttpResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, PANIC_BODY);
                        res.headers
                            .insert(SERVER, HeaderValue::from_static(SERVER_NAME));
                        res
                    }
                };
                (res, start.elapsed())
            }
        };

        for mw in &self.middlewares {
            mw.after(&head, &mut res, latency);
        }
        res
    }
}

impl HttpService for AppService {
    fn call(&mut self, req: Request, res: &mut Response) -> io::Result<()> {
        let response = match HttpRequest::from_minihttp(req) {
            Ok(req) => self.handle(req),
            Err(e) => {
                warn!(error = %e, "Rejecting unreadable request");
                HttpResponse::failure(StatusCode::BAD_REQUEST, "400 Bad Request")
            }
        };
        response.write_to(res);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_variants() {
        let owned: Box<dyn Any + Send> = Box::new(String::from("owned"));
        let borrowed: Box<dyn Any + Send> = Box::new("borrowed");
        let other: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(&*owned), "owned");
        assert_eq!(panic_message(&*borrowed), "borrowed");
        assert_eq!(panic_message(&*other), "non-string panic payload");
    }
}
