//! # Registry Module
//!
//! Registers controllers with a [`Router`].
//!
//! Every endpoint a [`Controller`] exposes is routed by name through the
//! configured [`NameStrategy`] (or by its explicit descriptor), classified,
//! bound to the shared controller and stored in the router. Bad endpoints
//! are skipped with a warning; registration itself never fails.
//!
//! ```rust
//! use jetrouter::handler::Endpoint;
//! use jetrouter::registry::{Controller, Registry};
//! use jetrouter::router::Router;
//! use std::sync::Arc;
//!
//! struct Health;
//!
//! impl Health {
//!     fn get_health(&self) -> String {
//!         "ok".to_string()
//!     }
//! }
//!
//! impl Controller for Health {
//!     fn endpoints(&self) -> Vec<Endpoint<Self>> {
//!         vec![Endpoint::named("GetHealth", Health::get_health)]
//!     }
//! }
//!
//! let router = Arc::new(Router::default());
//! let report = Registry::new(Arc::clone(&router)).register(Arc::new(Health));
//! assert_eq!(report.registered, vec!["get/health".to_string()]);
//! assert!(router.contains("get/health"));
//! ```

use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::handler::Endpoint;
use crate::hooks::HookSet;
use crate::router::{
    key_for, CamelCaseNames, NameStrategy, NamingError, Router, RouterError, DEFAULT_NAME_MARKER,
};
use crate::signature::SignatureError;

/// Endpoint names containing this marker are hooks, not routes.
pub const HOOK_MARKER: &str = "Hook";

/// A set of handlers sharing one receiver.
///
/// Handlers take `&self` and requests run concurrently, so any mutable
/// state on the controller needs interior synchronisation (atomics,
/// `Mutex`, `RwLock`).
pub trait Controller: Send + Sync + 'static {
    /// The handlers this controller exposes.
    fn endpoints(&self) -> Vec<Endpoint<Self>>
    where
        Self: Sized;

    /// Hooks applied to every endpoint of this controller, ahead of the
    /// registry's global hooks.
    fn hooks(&self) -> HookSet {
        HookSet::new()
    }
}

/// Why an endpoint was not registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// The name marks a hook method.
    HookName(String),
    /// The name could not be turned into a route.
    Naming(NamingError),
    /// The declared signature is not a supported calling convention.
    Signature {
        endpoint: String,
        source: SignatureError,
    },
    /// The derived key was rejected by the router.
    Router(RouterError),
}

impl fmt::Display for RegistrationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::HookName(name) => write!(f, "{name} is a hook, not a route"),
            RegistrationError::Naming(e) => write!(f, "naming: {e}"),
            RegistrationError::Signature { endpoint, source } => {
                write!(f, "signature of {endpoint}: {source}")
            }
            RegistrationError::Router(e) => write!(f, "router: {e}"),
        }
    }
}

impl std::error::Error for RegistrationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistrationError::HookName(_) => None,
            RegistrationError::Naming(e) => Some(e),
            RegistrationError::Signature { source, .. } => Some(source),
            RegistrationError::Router(e) => Some(e),
        }
    }
}

impl From<NamingError> for RegistrationError {
    fn from(e: NamingError) -> Self {
        RegistrationError::Naming(e)
    }
}

impl From<RouterError> for RegistrationError {
    fn from(e: RouterError) -> Self {
        RegistrationError::Router(e)
    }
}

/// Outcome of registering one controller.
#[derive(Debug, Default)]
pub struct RegistrationReport {
    /// Route keys that were added, in endpoint order.
    pub registered: Vec<String>,
    /// Endpoint names that were skipped, with the reason.
    pub skipped: Vec<(String, RegistrationError)>,
}

impl RegistrationReport {
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// Fills a shared [`Router`] from controllers.
pub struct Registry {
    router: Arc<Router>,
    naming: Box<dyn NameStrategy>,
    global_hooks: HookSet,
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("router", &self.router)
            .field("global_hooks", &self.global_hooks)
            .finish_non_exhaustive()
    }
}

impl Registry {
    /// Registry using camel-case naming with the router's wildcard token.
    #[must_use]
    pub fn new(router: Arc<Router>) -> Self {
        let naming = CamelCaseNames::new(DEFAULT_NAME_MARKER, router.wildcard());
        Self {
            router,
            naming: Box::new(naming),
            global_hooks: HookSet::new(),
        }
    }

    #[must_use]
    pub fn with_naming(mut self, naming: impl NameStrategy + 'static) -> Self {
        self.naming = Box::new(naming);
        self
    }

    /// Hooks appended to every endpoint registered from now on.
    #[must_use]
    pub fn with_global_hooks(mut self, hooks: HookSet) -> Self {
        self.global_hooks.extend(&hooks);
        self
    }

    #[must_use]
    pub fn router(&self) -> &Arc<Router> {
        &self.router
    }

    /// Register every endpoint of `controller`.
    pub fn register<C: Controller>(&self, controller: Arc<C>) -> RegistrationReport {
        let controller_name = std::any::type_name::<C>();
        let mut hooks = controller.hooks();
        hooks.extend(&self.global_hooks);

        let mut report = RegistrationReport::default();
        for endpoint in controller.endpoints() {
            let name = endpoint.name().to_string();
            match self.register_endpoint(&controller, endpoint, &hooks) {
                Ok(key) => report.registered.push(key),
                Err(RegistrationError::HookName(_)) => {
                    debug!(controller = controller_name, endpoint = %name, "Skipping hook method");
                    report
                        .skipped
                        .push((name.clone(), RegistrationError::HookName(name)));
                }
                Err(e) => {
                    warn!(
                        controller = controller_name,
                        endpoint = %name,
                        error = %e,
                        "Endpoint skipped"
                    );
                    report.skipped.push((name, e));
                }
            }
        }

        info!(
            controller = controller_name,
            registered = report.registered.len(),
            skipped = report.skipped.len(),
            "Controller registered"
        );
        report
    }

    /// Register a single endpoint bound to `controller` with `hooks`.
    ///
    /// Returns the route key the endpoint was stored under.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistrationError`] when the endpoint is a hook, cannot
    /// be named, has an unsupported signature or yields an invalid key.
    pub fn register_endpoint<C: Send + Sync + 'static>(
        &self,
        controller: &Arc<C>,
        endpoint: Endpoint<C>,
        hooks: &HookSet,
    ) -> Result<String, RegistrationError> {
        if endpoint.name().contains(HOOK_MARKER) {
            return Err(RegistrationError::HookName(endpoint.name().to_string()));
        }

        let key = match endpoint.descriptor() {
            Some(route) => key_for(&route.method, &route.path, self.router.wildcard()),
            None => self.naming.route_key(endpoint.name())?,
        };

        let name = endpoint.name().to_string();
        let record = endpoint
            .into_record(Arc::clone(controller), hooks.clone())
            .map_err(|source| RegistrationError::Signature {
                endpoint: name.clone(),
                source,
            })?;
        let convention = record.convention();

        if let Some(previous) = self.router.add(&key, Arc::new(record))? {
            warn!(
                key = %key,
                previous = %previous.name(),
                replacement = %name,
                "Route overwritten"
            );
        }
        debug!(key = %key, endpoint = %name, convention = %convention, "Endpoint registered");
        Ok(key)
    }
}
