//! Dispatcher core module - hot path for request dispatch.

use http::header::{HeaderValue, SERVER};
use http::StatusCode;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};

use crate::context::Context;
use crate::handler::{Argument, Arguments, HandlerRecord, ReturnValue, Returns, StatusError};
use crate::hooks::{ContextInitHook, HookSet};
use crate::params::ParseError;
use crate::router::{RouteMatch, Router};
use crate::server::{HttpRequest, HttpResponse, SERVER_NAME};
use crate::signature::{ParamKind, ReturnShape};

/// Why a request left the pipeline before its result was rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AbortReason {
    NotFound,
    PreExecuteHook,
    ParamsParse,
    PostParseHook,
    Invocation,
}

/// Progress of one request through the dispatch pipeline.
///
/// `Matched -> PreHookRun -> ParamsParsed -> PostParseHookRun -> Invoked ->
/// ResultRendered`, with `Aborted` reachable from any state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Matched,
    PreHookRun,
    ParamsParsed,
    PostParseHookRun,
    Invoked,
    ResultRendered,
    Aborted(AbortReason),
}

/// Render a hook or handler error.
///
/// A [`StatusError`] keeps its status (and JSON payload when present), a
/// [`ParseError`] becomes `400`, anything else `500` with the error chain
/// as the body.
#[must_use]
pub fn error_response(err: &anyhow::Error) -> HttpResponse {
    if let Some(status) = err.downcast_ref::<StatusError>() {
        return match status.payload() {
            Some(payload) => HttpResponse::json(status.status(), payload),
            None => HttpResponse::failure(status.status(), status.message()),
        };
    }
    if err.downcast_ref::<ParseError>().is_some() {
        return HttpResponse::failure(StatusCode::BAD_REQUEST, &format!("{err:#}"));
    }
    HttpResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, &format!("{err:#}"))
}

fn data_response(data: Option<Value>) -> HttpResponse {
    match data {
        Some(Value::Null) | None => HttpResponse::empty_success(),
        Some(value) => HttpResponse::success(value),
    }
}

/// Render invocation results according to the declared return shape.
fn render(hooks: &HookSet, shape: ReturnShape, returns: Returns) -> HttpResponse {
    let mut error = None;
    let mut data = None;
    for value in returns {
        match value {
            ReturnValue::Error(e) => error = e,
            ReturnValue::Data(d) => data = d,
        }
    }

    match shape {
        ReturnShape::None => HttpResponse::empty_success(),
        ReturnShape::ErrorOnly | ReturnShape::DataOnly | ReturnShape::ErrorThenData => {
            match error {
                Some(e) => error_response(&e),
                None => data_response(data),
            }
        }
        ReturnShape::DataThenError => {
            if let Some(e) = error {
                return error_response(&e);
            }
            match data {
                Some(value) if hooks.has_post_execute() => match hooks.run_post_execute(value) {
                    Ok(value) => data_response(Some(value)),
                    Err(e) => {
                        warn!(error = %e, "Post-execute hook failed");
                        error_response(&e)
                    }
                },
                other => data_response(other),
            }
        }
    }
}

/// Drives matched requests through hooks, parameter population, the
/// handler call and rendering.
pub struct Dispatcher {
    router: Arc<Router>,
    context_init_hooks: Vec<ContextInitHook>,
    request_timeout: Option<Duration>,
}

impl fmt::Debug for Dispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("routes", &self.router.len())
            .field("context_init_hooks", &self.context_init_hooks.len())
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl Dispatcher {
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        Self {
            router,
            context_init_hooks: Vec::new(),
            request_timeout: None,
        }
    }

    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Register a callback run on every fresh [`Context`], before any
    /// handler hook.
    pub fn add_context_init_hook<F>(&mut self, hook: F)
    where
        F: Fn(&Context) + Send + Sync + 'static,
    {
        self.context_init_hooks.push(Arc::new(hook));
    }

    /// Give every request context a cooperative deadline.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Dispatch a request and return the rendered response.
    #[must_use]
    pub fn dispatch(&self, request: HttpRequest) -> HttpResponse {
        self.dispatch_with_state(request).0
    }

    /// Dispatch a request, also reporting the state the pipeline ended in.
    ///
    /// Panics raised by the handler propagate; the service layer catches them.
    #[must_use]
    pub fn dispatch_with_state(&self, request: HttpRequest) -> (HttpResponse, DispatchState) {
        let (mut response, state) = match self.router.route(request.method(), request.path()) {
            Some(route) => self.run(route, request),
            None => (
                HttpResponse::not_found(),
                DispatchState::Aborted(AbortReason::NotFound),
            ),
        };
        response
            .headers
            .insert(SERVER, HeaderValue::from_static(SERVER_NAME));
        (response, state)
    }

    fn run(&self, route: RouteMatch, request: HttpRequest) -> (HttpResponse, DispatchState) {
        let RouteMatch { record, args, .. } = route;
        let mut ctx = Context::new(request);
        if let Some(timeout) = self.request_timeout {
            ctx = ctx.with_deadline(timeout);
        }
        let _guard = ctx.span().enter();

        for hook in &self.context_init_hooks {
            hook(&ctx);
        }

        let mut state = DispatchState::Matched;
        let start = Instant::now();
        let mut response = self.drive(&record, &args, &ctx, &mut state);
        response.merge_headers(&ctx.take_response_headers());

        info!(
            request_id = %ctx.request_id(),
            handler = %record.name(),
            status = response.status.as_u16(),
            state = ?state,
            duration_ms = start.elapsed().as_millis() as u64,
            "Request dispatched"
        );
        (response, state)
    }

    fn drive(
        &self,
        record: &HandlerRecord,
        args: &[String],
        ctx: &Context,
        state: &mut DispatchState,
    ) -> HttpResponse {
        let hooks = record.hooks();
        let convention = record.convention();

        if let Err(e) = hooks.run_pre_execute(ctx) {
            warn!(handler = %record.name(), error = %e, "Pre-execute hook rejected request");
            *state = DispatchState::Aborted(AbortReason::PreExecuteHook);
            return error_response(&e);
        }
        *state = DispatchState::PreHookRun;

        let mut data = match convention.params.data_type() {
            Some(data_type) => match data_type.populate(ctx.request(), args) {
                Ok(data) => Some(data),
                Err(e) => {
                    warn!(
                        handler = %record.name(),
                        param_type = data_type.name(),
                        error = %e,
                        "Parameter population failed"
                    );
                    *state = DispatchState::Aborted(AbortReason::ParamsParse);
                    return HttpResponse::failure(StatusCode::BAD_REQUEST, &e.to_string());
                }
            },
            None => None,
        };
        *state = DispatchState::ParamsParsed;

        if let Some(param) = &data {
            if let Err(e) = hooks.run_post_parse(&**param) {
                warn!(handler = %record.name(), error = %e, "Post-parse hook rejected request");
                *state = DispatchState::Aborted(AbortReason::PostParseHook);
                return error_response(&e);
            }
        }
        *state = DispatchState::PostParseHookRun;

        let mut call_args = Arguments::new();
        for kind in &record.signature().params {
            match kind {
                ParamKind::Context => call_args.push(Argument::Context(ctx)),
                ParamKind::Data(_) => {
                    if let Some(param) = data.take() {
                        call_args.push(Argument::Data(param));
                    }
                }
            }
        }

        debug!(
            handler = %record.name(),
            convention = %convention,
            "Invoking handler"
        );
        let returns = match record.invoke(call_args) {
            Ok(returns) => returns,
            Err(e) => {
                error!(handler = %record.name(), error = %e, "Handler invocation failed");
                *state = DispatchState::Aborted(AbortReason::Invocation);
                return HttpResponse::failure(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string());
            }
        };
        *state = DispatchState::Invoked;

        let response = render(hooks, convention.returns, returns);
        *state = DispatchState::ResultRendered;
        response
    }
}
