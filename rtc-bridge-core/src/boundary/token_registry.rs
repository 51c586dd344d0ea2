use std::any::Any;
use std::collections::HashMap;
use std::num::NonZeroU64;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

use crate::models::error::BridgeError;

/// Stable identifier handed to the native engine alongside a callback.
///
/// The engine passes it back verbatim; resolving it through the registry
/// recovers the host object without ever exposing a host address across
/// the boundary. Tokens are non-zero and never reused while live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WrapperToken(NonZeroU64);

impl WrapperToken {
    pub fn raw(self) -> u64 {
        self.0.get()
    }
}

/// Token-indexed table of host objects reachable from native callbacks.
///
/// Registering retains a strong reference, so the target cannot be dropped
/// while the native side might still call back into it. The map is the only
/// globally shared mutable state in the core and is internally synchronized:
/// a `resolve` racing an `unregister` either clones the `Arc` under the lock
/// and fully succeeds, or finds the entry gone and fails with
/// `InvalidToken` — it can never observe a half-torn-down target.
pub struct HandleRegistry {
    entries: Mutex<HashMap<u64, Arc<dyn Any + Send + Sync>>>,
    next_token: AtomicU64,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            next_token: AtomicU64::new(1),
        }
    }

    /// Register a target and mint a fresh token for it.
    pub fn register<T: Send + Sync + 'static>(&self, target: Arc<T>) -> WrapperToken {
        let raw = self.next_token.fetch_add(1, Ordering::Relaxed);
        let token = WrapperToken(NonZeroU64::new(raw).expect("token counter wrapped"));
        self.entries.lock().insert(raw, target);
        token
    }

    /// Resolve a token back to its target.
    ///
    /// Fails with `InvalidToken` if the token was never registered, was
    /// already unregistered, or maps to a different concrete type.
    pub fn resolve<T: Send + Sync + 'static>(&self, token: WrapperToken) -> Result<Arc<T>, BridgeError> {
        let entry = self
            .entries
            .lock()
            .get(&token.raw())
            .cloned()
            .ok_or(BridgeError::InvalidToken)?;
        entry.downcast::<T>().map_err(|_| BridgeError::InvalidToken)
    }

    /// Remove a mapping, releasing the retained reference.
    ///
    /// Returns whether the token was still registered. Safe to call
    /// concurrently with `resolve` from a native callback thread.
    pub fn unregister(&self, token: WrapperToken) -> bool {
        self.entries.lock().remove(&token.raw()).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for HandleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide registry used by track sinks and data channels.
pub fn global() -> &'static HandleRegistry {
    static REGISTRY: OnceLock<HandleRegistry> = OnceLock::new();
    REGISTRY.get_or_init(HandleRegistry::new)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[derive(Debug, PartialEq)]
    struct Target {
        value: u32,
    }

    #[test]
    fn register_resolve_roundtrip() {
        let registry = HandleRegistry::new();
        let token = registry.register(Arc::new(Target { value: 7 }));

        let resolved = registry.resolve::<Target>(token).unwrap();
        assert_eq!(resolved.value, 7);
    }

    #[test]
    fn tokens_are_unique_and_nonzero() {
        let registry = HandleRegistry::new();
        let a = registry.register(Arc::new(Target { value: 1 }));
        let b = registry.register(Arc::new(Target { value: 2 }));

        assert_ne!(a, b);
        assert_ne!(a.raw(), 0);
        assert_ne!(b.raw(), 0);
    }

    #[test]
    fn resolve_after_unregister_fails() {
        let registry = HandleRegistry::new();
        let token = registry.register(Arc::new(Target { value: 1 }));

        assert!(registry.unregister(token));
        assert_eq!(registry.resolve::<Target>(token), Err(BridgeError::InvalidToken));
        // Second unregister is a no-op.
        assert!(!registry.unregister(token));
    }

    #[test]
    fn resolve_with_wrong_type_fails() {
        let registry = HandleRegistry::new();
        let token = registry.register(Arc::new(Target { value: 1 }));

        assert_eq!(registry.resolve::<String>(token), Err(BridgeError::InvalidToken));
    }

    #[test]
    fn registry_keeps_target_alive() {
        let registry = HandleRegistry::new();
        let target = Arc::new(Target { value: 3 });
        let token = registry.register(Arc::clone(&target));
        drop(target);

        assert_eq!(registry.resolve::<Target>(token).unwrap().value, 3);
    }

    #[test]
    fn concurrent_resolve_and_unregister() {
        let registry = Arc::new(HandleRegistry::new());
        let tokens: Vec<_> = (0..64)
            .map(|i| registry.register(Arc::new(Target { value: i })))
            .collect();

        let resolver = {
            let registry = Arc::clone(&registry);
            let tokens = tokens.clone();
            thread::spawn(move || {
                for _ in 0..100 {
                    for &token in &tokens {
                        // Either a fully valid target or a clean failure.
                        match registry.resolve::<Target>(token) {
                            Ok(target) => {
                                let _ = target.value;
                            }
                            Err(e) => assert_eq!(e, BridgeError::InvalidToken),
                        }
                    }
                }
            })
        };

        for &token in &tokens {
            registry.unregister(token);
        }
        resolver.join().unwrap();

        for &token in &tokens {
            assert_eq!(registry.resolve::<Target>(token), Err(BridgeError::InvalidToken));
        }
    }
}
