//! Demo controller served by the `jetrouter` binary.
//!
//! | Endpoint        | Route                | Shape                  |
//! |-----------------|----------------------|------------------------|
//! | `GetPing`       | `GET /ping`          | `() -> data`           |
//! | `GetEcho`       | `GET /echo`          | `(ctx, data) -> (data, error)` |
//! | `PostEcho`      | `POST /echo`         | `(data) -> data`       |
//! | `GetUser_Info`  | `GET /user/{id}/info`| `(data) -> (error, data)` |
//! | `GetStats`      | `GET /stats`         | `(ctx) -> data`        |

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::context::Context;
use crate::handler::{Endpoint, ErrorFirst, StatusError};
use crate::hooks::{HookSet, Validate};
use crate::params::RequestParams;
use crate::registry::Controller;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize, RequestParams, Validate)]
#[serde(default)]
pub struct EchoParams {
    #[validate(length(max = 64, message = "must be at most 64 characters"))]
    pub name: String,
    #[validate(range(max = 150, message = "must be at most 150"))]
    pub age: u32,
}

#[derive(Debug, Default, Deserialize, RequestParams)]
pub struct UserPath {
    #[param(args)]
    pub args: Vec<String>,
}

/// Echoes request data back; counts the requests it served.
#[derive(Debug, Default)]
pub struct EchoController {
    served: AtomicU64,
}

impl EchoController {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn served(&self) -> u64 {
        self.served.load(Ordering::Relaxed)
    }

    fn get_ping(&self) -> String {
        self.served.fetch_add(1, Ordering::Relaxed);
        "pong".to_string()
    }

    fn get_echo(&self, ctx: &Context, params: EchoParams) -> anyhow::Result<EchoParams> {
        self.served.fetch_add(1, Ordering::Relaxed);
        let named = if params.name.is_empty() { "false" } else { "true" };
        ctx.set_header("x-echo-named", named)?;
        Ok(params)
    }

    fn post_echo(&self, body: Value) -> Value {
        self.served.fetch_add(1, Ordering::Relaxed);
        body
    }

    fn get_user_info(&self, path: UserPath) -> ErrorFirst<Value> {
        self.served.fetch_add(1, Ordering::Relaxed);
        match path.args.first() {
            Some(id) if !id.is_empty() => ErrorFirst::ok(json!({ "id": id })),
            _ => ErrorFirst::err(StatusError::bad_request("missing user id")),
        }
    }

    fn get_stats(&self, ctx: &Context) -> Value {
        json!({
            "served": self.served(),
            "request_id": ctx.request_id(),
        })
    }
}

impl Controller for EchoController {
    fn endpoints(&self) -> Vec<Endpoint<Self>> {
        vec![
            Endpoint::named("GetPing", EchoController::get_ping),
            Endpoint::named("GetEcho", EchoController::get_echo),
            Endpoint::named("PostEcho", EchoController::post_echo),
            Endpoint::named("GetUser_Info", EchoController::get_user_info),
            Endpoint::named("GetStats", EchoController::get_stats),
        ]
    }

    fn hooks(&self) -> HookSet {
        HookSet::new().post_parse(crate::hooks::validate::<EchoParams>())
    }
}
