//! Business error-code catalog.
//!
//! Some platform subsystems return terse `errmsg` strings; this catalog maps
//! `(Subsystem, code)` to a descriptive message. Subsystems without a table
//! pass the platform message through unchanged.

use std::fmt;

/// Platform subsystem a request belongs to, used to pick a message table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Subsystem {
    #[default]
    General,
    /// Official-account customer service (kf) management.
    CustomerService,
}

impl fmt::Display for Subsystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::General => write!(f, "general"),
            Self::CustomerService => write!(f, "customer_service"),
        }
    }
}

const CUSTOMER_SERVICE: &[(i64, &str)] = &[
    (40005, "unsupported media type"),
    (40009, "invalid media file size"),
    (
        65400,
        "API unavailable: the new customer service feature is not enabled",
    ),
    (65401, "invalid customer service account"),
    (65403, "invalid customer service nickname"),
    (65404, "invalid customer service account name"),
    (
        65405,
        "customer service account limit reached, no more accounts can be added",
    ),
    (65406, "customer service account already exists"),
    (
        65407,
        "invitee is already a customer service agent of this account",
    ),
    (
        65408,
        "this account already has a pending invitation for that user",
    ),
    (65409, "invalid WeChat id"),
    (
        65410,
        "invitee is bound to the maximum number of customer service accounts (5)",
    ),
    (
        65411,
        "this account already has an invitation awaiting confirmation",
    ),
    (65412, "this account is already bound to a WeChat id"),
    (65413, "no session exists for this user"),
    (65414, "user is being served by another agent"),
    (65415, "the specified agent is offline"),
    (65416, "invalid query parameters"),
    (65417, "query time range exceeds the limit"),
];

fn table(subsystem: Subsystem) -> &'static [(i64, &'static str)] {
    match subsystem {
        Subsystem::General => &[],
        Subsystem::CustomerService => CUSTOMER_SERVICE,
    }
}

/// Looks up the descriptive message for `code` within `subsystem`.
#[must_use]
pub fn describe(subsystem: Subsystem, code: i64) -> Option<&'static str> {
    table(subsystem)
        .iter()
        .find(|(c, _)| *c == code)
        .map(|(_, msg)| *msg)
}

/// Resolves the message to surface for a business error: the catalog entry
/// when one exists, otherwise the platform's own `errmsg`.
#[must_use]
pub fn resolve_message(subsystem: Subsystem, code: i64, errmsg: &str) -> String {
    describe(subsystem, code).map_or_else(|| errmsg.to_string(), str::to_string)
}
