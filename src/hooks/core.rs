use serde_json::Value;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

use crate::context::Context;

/// Runs before parameter population; an error aborts the request.
pub type PreExecuteHook = Arc<dyn Fn(&Context) -> anyhow::Result<()> + Send + Sync>;

/// Inspects the populated data parameter; an error aborts the request.
pub type PostParseHook = Arc<dyn Fn(&dyn Any) -> anyhow::Result<()> + Send + Sync>;

/// Transforms the data returned by a `(data, error)` handler.
pub type PostExecuteHook = Arc<dyn Fn(Value) -> anyhow::Result<Value> + Send + Sync>;

/// Runs once per request right after the context is built.
pub type ContextInitHook = Arc<dyn Fn(&Context) + Send + Sync>;

/// Ordered hook lists attached to a handler record.
///
/// Insertion order is invocation order. The first failing pre-execute or
/// post-parse hook stops the chain; post-execute hooks form a pipeline in
/// which each hook receives the previous hook's output.
#[derive(Clone, Default)]
pub struct HookSet {
    pre_execute: Vec<PreExecuteHook>,
    post_parse: Vec<PostParseHook>,
    post_execute: Vec<PostExecuteHook>,
}

impl fmt::Debug for HookSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HookSet")
            .field("pre_execute", &self.pre_execute.len())
            .field("post_parse", &self.post_parse.len())
            .field("post_execute", &self.post_execute.len())
            .finish()
    }
}

impl HookSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn pre_execute<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.pre_execute.push(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn post_parse<F>(mut self, hook: F) -> Self
    where
        F: Fn(&dyn Any) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_parse.push(Arc::new(hook));
        self
    }

    #[must_use]
    pub fn post_execute<F>(mut self, hook: F) -> Self
    where
        F: Fn(Value) -> anyhow::Result<Value> + Send + Sync + 'static,
    {
        self.post_execute.push(Arc::new(hook));
        self
    }

    /// Typed post-parse hook: runs `hook` when the parameter is a `P`, and
    /// passes every other parameter type through.
    #[must_use]
    pub fn post_parse_for<P, F>(self, hook: F) -> Self
    where
        P: 'static,
        F: Fn(&P) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.post_parse(move |param: &dyn Any| match param.downcast_ref::<P>() {
            Some(param) => hook(param),
            None => Ok(()),
        })
    }

    /// Append every hook of `other` after the hooks already present.
    pub fn extend(&mut self, other: &HookSet) {
        self.pre_execute.extend(other.pre_execute.iter().cloned());
        self.post_parse.extend(other.post_parse.iter().cloned());
        self.post_execute.extend(other.post_execute.iter().cloned());
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pre_execute.is_empty() && self.post_parse.is_empty() && self.post_execute.is_empty()
    }

    #[must_use]
    pub fn has_post_execute(&self) -> bool {
        !self.post_execute.is_empty()
    }

    /// # Errors
    ///
    /// Returns the first hook error.
    pub fn run_pre_execute(&self, ctx: &Context) -> anyhow::Result<()> {
        self.pre_execute.iter().try_for_each(|hook| hook(ctx))
    }

    /// # Errors
    ///
    /// Returns the first hook error.
    pub fn run_post_parse(&self, param: &dyn Any) -> anyhow::Result<()> {
        self.post_parse.iter().try_for_each(|hook| hook(param))
    }

    /// # Errors
    ///
    /// Returns the first hook error; later hooks do not run.
    pub fn run_post_execute(&self, data: Value) -> anyhow::Result<Value> {
        self.post_execute
            .iter()
            .try_fold(data, |data, hook| hook(data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_post_execute_is_a_pipeline() {
        let hooks = HookSet::new()
            .post_execute(|v| Ok(json!({ "wrapped": v })))
            .post_execute(|v| Ok(json!([v])));
        assert_eq!(
            hooks.run_post_execute(json!(1)).unwrap(),
            json!([{ "wrapped": 1 }])
        );
    }

    #[test]
    fn test_first_failure_stops_chain() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let hooks = HookSet::new()
            .post_parse(|_| Err(anyhow!("rejected")))
            .post_parse(move |_| {
                seen.fetch_add(1, Ordering::SeqCst);
                Ok(())
            });
        let err = hooks.run_post_parse(&5_u32).unwrap_err();
        assert_eq!(err.to_string(), "rejected");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_extend_appends_in_order() {
        let mut first = HookSet::new().post_execute(|v| Ok(json!(format!("{v}a"))));
        let second = HookSet::new().post_execute(|v| Ok(json!(format!("{}b", v.as_str().unwrap_or_default()))));
        first.extend(&second);
        assert_eq!(first.run_post_execute(json!(1)).unwrap(), json!("1ab"));
    }

    #[test]
    fn test_post_parse_for_ignores_other_types() {
        let hooks = HookSet::new().post_parse_for(|n: &u32| {
            if *n > 10 {
                Err(anyhow!("too big"))
            } else {
                Ok(())
            }
        });
        assert!(hooks.run_post_parse(&"text").is_ok());
        assert!(hooks.run_post_parse(&11_u32).is_err());
    }
}
