//! Process-lifetime cache of loaded policy evaluators.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use tracing::debug;

use super::error::EngineError;
use super::traits::PolicyEvaluator;
use crate::types::EngineType;

type Slot = Arc<Mutex<Option<Arc<dyn PolicyEvaluator>>>>;

/// Evaluators keyed by engine type.
///
/// Each engine type has its own slot lock, so concurrent first uses of one
/// engine type load it once while other engine types load in parallel.
#[derive(Default)]
pub struct PolicyCache {
    slots: Mutex<HashMap<EngineType, Slot>>,
}

impl PolicyCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached evaluator, running `load` on first use.
    ///
    /// A failed load is not cached; the next call retries.
    pub fn get_or_load<F>(
        &self,
        engine: EngineType,
        load: F,
    ) -> Result<Arc<dyn PolicyEvaluator>, EngineError>
    where
        F: FnOnce() -> Result<Arc<dyn PolicyEvaluator>, EngineError>,
    {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(engine).or_default())
        };

        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(evaluator) = guard.as_ref() {
            return Ok(Arc::clone(evaluator));
        }

        debug!(engine = %engine, "Loading policy bundle");
        let evaluator = load()?;
        *guard = Some(Arc::clone(&evaluator));
        Ok(evaluator)
    }

    pub fn contains(&self, engine: EngineType) -> bool {
        let slot = {
            let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            slots.get(&engine).cloned()
        };
        slot.is_some_and(|slot| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        })
    }

    /// Drop every loaded evaluator.
    pub fn clear(&self) {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl std::fmt::Debug for PolicyCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        f.debug_struct("PolicyCache")
            .field("engines", &slots.keys().collect::<Vec<_>>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PolicyViolation;
    use serde_json::Value;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    struct Empty;

    impl PolicyEvaluator for Empty {
        fn evaluate(&self, _document: &Value) -> Result<Vec<PolicyViolation>, EngineError> {
            Ok(Vec::new())
        }
    }

    fn empty() -> Result<Arc<dyn PolicyEvaluator>, EngineError> {
        Ok(Arc::new(Empty))
    }

    #[test]
    fn test_loads_once_per_engine() {
        let cache = PolicyCache::new();
        let loads = AtomicUsize::new(0);
        for _ in 0..3 {
            cache
                .get_or_load(EngineType::Terraform, || {
                    loads.fetch_add(1, Ordering::SeqCst);
                    empty()
                })
                .unwrap();
        }
        cache
            .get_or_load(EngineType::Kubernetes, || {
                loads.fetch_add(1, Ordering::SeqCst);
                empty()
            })
            .unwrap();
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(cache.contains(EngineType::Terraform));
        assert!(!cache.contains(EngineType::Arm));
    }

    #[test]
    fn test_concurrent_first_use_is_single_flight() {
        let cache = Arc::new(PolicyCache::new());
        let loads = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let loads = Arc::clone(&loads);
                thread::spawn(move || {
                    cache
                        .get_or_load(EngineType::CloudFormation, || {
                            loads.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(std::time::Duration::from_millis(20));
                            empty()
                        })
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_failed_load_is_retried() {
        let cache = PolicyCache::new();
        let err = cache
            .get_or_load(EngineType::Arm, || {
                Err(EngineError::MissingArtifact("arm_policy.json".into()))
            })
            .err()
            .unwrap();
        assert!(matches!(err, EngineError::MissingArtifact(_)));
        assert!(!cache.contains(EngineType::Arm));

        cache.get_or_load(EngineType::Arm, empty).unwrap();
        assert!(cache.contains(EngineType::Arm));
    }

    #[test]
    fn test_clear() {
        let cache = PolicyCache::new();
        cache.get_or_load(EngineType::Terraform, empty).unwrap();
        cache.clear();
        assert!(!cache.contains(EngineType::Terraform));
    }
}
