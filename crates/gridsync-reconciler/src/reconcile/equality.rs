//! Comparison of desired and observed subscription configuration.

use std::fmt::Debug;

use gridsync_client::SubscriptionProperties;

/// Whether `current` already satisfies `desired`.
///
/// Server-assigned fields (`topic`, `provisioning_state`) are ignored. Included
/// event types are compared as sets, and an empty or unset list on either side
/// matches anything: the remote API expands an unset filter to every available
/// type and reports the expansion back.
///
/// Differing fields are logged at debug level.
pub fn equal_subscription(desired: &SubscriptionProperties, current: &SubscriptionProperties) -> bool {
    let mut equal = field("destination", &desired.destination, &current.destination);
    equal &= field("retry_policy", &desired.retry_policy, &current.retry_policy);
    equal &= field("delivery_schema", &desired.delivery_schema, &current.delivery_schema);

    match (&desired.filter, &current.filter) {
        (Some(want), Some(got)) => {
            equal &= field(
                "filter.subject_begins_with",
                &want.subject_begins_with,
                &got.subject_begins_with,
            );
            equal &= field(
                "filter.subject_ends_with",
                &want.subject_ends_with,
                &got.subject_ends_with,
            );
            let want_types = want.included_event_types.as_deref().unwrap_or_default();
            let got_types = got.included_event_types.as_deref().unwrap_or_default();
            if !equal_event_types(want_types, got_types) {
                tracing::debug!(
                    field = "filter.included_event_types",
                    want = ?want_types,
                    got = ?got_types,
                    "subscription differs"
                );
                equal = false;
            }
        }
        (want, got) => equal &= field("filter", want, got),
    }

    equal
}

fn field<T: PartialEq + Debug>(name: &'static str, want: &T, got: &T) -> bool {
    let eq = want == got;
    if !eq {
        tracing::debug!(field = name, ?want, ?got, "subscription differs");
    }
    eq
}

/// Order-independent comparison that treats an empty side as a wildcard.
fn equal_event_types(x: &[String], y: &[String]) -> bool {
    if x.is_empty() || y.is_empty() {
        return true;
    }
    if x.len() != y.len() {
        return false;
    }

    let mut x = x.to_vec();
    let mut y = y.to_vec();
    x.sort_unstable();
    y.sort_unstable();
    x == y
}
