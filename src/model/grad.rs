//! Thread-local gradient tracking switch.
//!
//! Frameworks that build a computation graph during forward passes check
//! [`is_grad_enabled`] to decide whether to record. Inference code wraps its
//! forward passes in [`no_grad`] so nothing is recorded.

use std::cell::Cell;
use std::marker::PhantomData;

thread_local! {
    static GRAD_ENABLED: Cell<bool> = const { Cell::new(true) };
}

/// Whether gradient tracking is enabled on this thread.
#[must_use]
pub fn is_grad_enabled() -> bool {
    GRAD_ENABLED.with(Cell::get)
}

/// Disable gradient tracking until the returned guard is dropped.
///
/// Guards nest: dropping one restores whatever state was active when it was
/// created.
#[must_use = "gradient tracking is re-enabled as soon as the guard is dropped"]
pub fn no_grad() -> NoGradGuard {
    let previous = GRAD_ENABLED.with(|flag| flag.replace(false));
    NoGradGuard {
        previous,
        _not_send: PhantomData,
    }
}

/// Scope in which gradient tracking is disabled. See [`no_grad`].
#[derive(Debug)]
pub struct NoGradGuard {
    previous: bool,
    // The flag is per thread, so the guard must stay on its thread.
    _not_send: PhantomData<*const ()>,
}

impl Drop for NoGradGuard {
    fn drop(&mut self) {
        GRAD_ENABLED.with(|flag| flag.set(self.previous));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_disables_and_restores() {
        assert!(is_grad_enabled());
        {
            let _guard = no_grad();
            assert!(!is_grad_enabled());
        }
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_nested_guards() {
        let outer = no_grad();
        {
            let _inner = no_grad();
            assert!(!is_grad_enabled());
        }
        assert!(!is_grad_enabled());
        drop(outer);
        assert!(is_grad_enabled());
    }

    #[test]
    fn test_restored_after_panic() {
        let result = std::panic::catch_unwind(|| {
            let _guard = no_grad();
            panic!("forward pass failed");
        });

        assert!(result.is_err());
        assert!(is_grad_enabled());
    }
}
