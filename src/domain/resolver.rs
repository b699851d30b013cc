//! Receiver type resolution for a single call site.

use crate::domain::declarations::Invocation;

/// Decide the recorded receiver type of an invocation.
///
/// First available wins: the receiver expression's type, then the declaring
/// class of the resolved target method, then the enclosing class itself.
/// The last rule is total, so the result is never empty as long as the
/// enclosing class name is not.
pub fn resolve_receiver(invocation: &Invocation, enclosing_class: &str) -> String {
    non_empty(invocation.receiver_type.as_deref())
        .or_else(|| non_empty(invocation.declaring_class.as_deref()))
        .unwrap_or(enclosing_class)
        .to_string()
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
