//! The test-failure signal.
//!
//! Code under test calls [`TestFailure::raise`] when it detects that the
//! current case is wrong (for example a checker that validates its own
//! output). The handler catches exactly this payload and records the row as
//! failed; any other panic aborts the run.

use std::any::Any;
use std::fmt;
use std::panic;

/// A deliberate, per-row test failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestFailure {
    message: String,
    properties: Vec<(String, String)>,
}

impl TestFailure {
    /// Create a failure with a description of what went wrong.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            properties: Vec::new(),
        }
    }

    /// Attach a named detail, e.g. the index where a check failed.
    #[must_use]
    pub fn with_property(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.properties.push((name.into(), value.to_string()));
        self
    }

    /// The failure description.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Attached details, in insertion order.
    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    /// Abort the current invocation and mark the row as failed.
    pub fn raise(self) -> ! {
        panic::panic_any(self)
    }
}

impl fmt::Display for TestFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)?;
        for (name, value) in &self.properties {
            write!(f, "; {name}: {value}")?;
        }
        Ok(())
    }
}

impl std::error::Error for TestFailure {}

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else if let Some(failure) = payload.downcast_ref::<TestFailure>() {
        failure.to_string()
    } else {
        "unknown panic payload".to_string()
    }
}

/// Install a panic hook that stays quiet for [`TestFailure`] payloads.
///
/// Other panics are forwarded to the previously installed hook. Intended to
/// be called once by a driver binary before running any rows.
pub fn silence_failure_panics() {
    let previous = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        if info.payload().downcast_ref::<TestFailure>().is_none() {
            previous(info);
        }
    }));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_properties() {
        let failure = TestFailure::new("array is not sorted")
            .with_property("index", 3)
            .with_property("value", -1);
        assert_eq!(
            failure.to_string(),
            "array is not sorted; index: 3; value: -1"
        );
        assert_eq!(failure.properties().len(), 2);
    }

    #[test]
    fn test_raise_carries_payload() {
        let payload = panic::catch_unwind(|| {
            TestFailure::new("boom").raise();
        })
        .unwrap_err();
        let failure = payload.downcast_ref::<TestFailure>().unwrap();
        assert_eq!(failure.message(), "boom");
    }

    #[test]
    fn test_panic_message_variants() {
        let payload = panic::catch_unwind(|| {
            panic!("plain");
        })
        .unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "plain");

        let payload = panic::catch_unwind(|| {
            panic!("formatted {}", 7);
        })
        .unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "formatted 7");

        let payload = panic::catch_unwind(|| {
            panic::panic_any(42_u8);
        })
        .unwrap_err();
        assert_eq!(panic_message(payload.as_ref()), "unknown panic payload");
    }
}
