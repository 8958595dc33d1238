//! Named dispatch for story events.
//!
//! Hooks are ordered multicast lists: every callback registered under a name
//! runs, in registration order. Methods are single handlers taking the
//! event's string arguments. Both are registered programmatically by the
//! host before playback and checked against a story when it is loaded.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::SequenceError;

/// Callback invoked by an `invoke_hooks` event.
pub type HookHandler = Arc<dyn Fn() + Send + Sync>;

/// Handler invoked by a `call_method` event.
pub type MethodHandler = Arc<dyn Fn(&[String]) + Send + Sync>;

/// Maps hook and method names to bound handlers.
#[derive(Clone, Default)]
pub struct DispatchRegistry {
    hooks: HashMap<String, Vec<HookHandler>>,
    methods: HashMap<String, MethodHandler>,
}

impl DispatchRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a callback to the hook list under `name`.
    pub fn register_hook<F>(&mut self, name: impl Into<String>, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.hooks
            .entry(name.into())
            .or_default()
            .push(Arc::new(callback));
    }

    /// Binds `handler` to `name`, returning `true` if it replaced an earlier
    /// binding.
    pub fn register_method<F>(&mut self, name: impl Into<String>, handler: F) -> bool
    where
        F: Fn(&[String]) + Send + Sync + 'static,
    {
        self.methods
            .insert(name.into(), Arc::new(handler))
            .is_some()
    }

    /// Whether any callback is registered under the hook `name`.
    #[must_use]
    pub fn has_hook(&self, name: &str) -> bool {
        self.hooks.get(name).is_some_and(|list| !list.is_empty())
    }

    /// Whether a method is bound to `name`.
    #[must_use]
    pub fn has_method(&self, name: &str) -> bool {
        self.methods.contains_key(name)
    }

    /// Runs every callback under `name` in registration order and returns how
    /// many ran.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::UnknownHandler` if nothing is registered.
    pub fn invoke_hooks(&self, name: &str) -> Result<usize, SequenceError> {
        let callbacks = self
            .hooks
            .get(name)
            .filter(|list| !list.is_empty())
            .ok_or_else(|| SequenceError::UnknownHandler {
                kind: "hook",
                key: name.to_owned(),
            })?;
        for callback in callbacks {
            callback();
        }
        Ok(callbacks.len())
    }

    /// Calls the method bound to `name` with `args`.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::UnknownHandler` if no method is bound.
    pub fn call_method(&self, name: &str, args: &[String]) -> Result<(), SequenceError> {
        let handler = self
            .methods
            .get(name)
            .ok_or_else(|| SequenceError::UnknownHandler {
                kind: "method",
                key: name.to_owned(),
            })?;
        handler(args);
        Ok(())
    }
}

impl fmt::Debug for DispatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut hooks: Vec<&str> = self.hooks.keys().map(String::as_str).collect();
        let mut methods: Vec<&str> = self.methods.keys().map(String::as_str).collect();
        hooks.sort_unstable();
        methods.sort_unstable();
        f.debug_struct("DispatchRegistry")
            .field("hooks", &hooks)
            .field("methods", &methods)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_invoke_hooks_runs_callbacks_in_registration_order() {
        // Arrange
        let order = Arc::new(Mutex::new(Vec::new()));
        let mut registry = DispatchRegistry::new();
        for label in ["first", "second", "third"] {
            let order = Arc::clone(&order);
            registry.register_hook("lights_on", move || order.lock().unwrap().push(label));
        }

        // Act
        let ran = registry.invoke_hooks("lights_on").unwrap();

        // Assert
        assert_eq!(ran, 3);
        assert_eq!(*order.lock().unwrap(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_invoke_hooks_reports_unknown_name() {
        let registry = DispatchRegistry::new();

        let result = registry.invoke_hooks("missing");

        match result {
            Err(SequenceError::UnknownHandler { kind, key }) => {
                assert_eq!(kind, "hook");
                assert_eq!(key, "missing");
            }
            other => panic!("expected UnknownHandler, got {other:?}"),
        }
    }

    #[test]
    fn test_call_method_passes_arguments_through() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = DispatchRegistry::new();
        let sink = Arc::clone(&seen);
        registry.register_method("ShowSubtitle", move |args| {
            sink.lock().unwrap().extend_from_slice(args);
        });

        registry
            .call_method("ShowSubtitle", &["line_04".to_owned()])
            .unwrap();

        assert_eq!(*seen.lock().unwrap(), vec!["line_04".to_owned()]);
        assert!(registry.has_method("ShowSubtitle"));
        assert!(!registry.has_hook("ShowSubtitle"));
    }

    #[test]
    fn test_register_method_reports_replacement() {
        let mut registry = DispatchRegistry::new();

        assert!(!registry.register_method("Ping", |_| {}));
        assert!(registry.register_method("Ping", |_| {}));
    }
}
