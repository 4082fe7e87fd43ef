//! Navigation side effect for terminated sessions

use std::sync::Arc;
use tracing::warn;

/// Sends the user to another location, typically the login entry point
pub trait Navigator: Send + Sync {
    fn redirect(&self, location: &str);
}

/// Navigator that only records the redirect in the log
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, location: &str) {
        warn!(location, "Session ended, redirect requested");
    }
}

/// Navigator delegating to a closure
#[derive(Clone)]
pub struct CallbackNavigator {
    callback: Arc<dyn Fn(&str) + Send + Sync>,
}

impl CallbackNavigator {
    pub fn new(callback: impl Fn(&str) + Send + Sync + 'static) -> Self {
        Self {
            callback: Arc::new(callback),
        }
    }
}

impl std::fmt::Debug for CallbackNavigator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CallbackNavigator").finish_non_exhaustive()
    }
}

impl Navigator for CallbackNavigator {
    fn redirect(&self, location: &str) {
        (self.callback)(location);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_callback_navigator_forwards_location() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let navigator = CallbackNavigator::new(move |location| {
            sink.lock().unwrap().push(location.to_string());
        });

        navigator.redirect("/login");
        assert_eq!(*seen.lock().unwrap(), vec!["/login".to_string()]);
    }
}
