//! Failure policy for each upstream operation.
//!
//! | operation          | policy           |
//! |--------------------|------------------|
//! | list orders        | propagate        |
//! | get order          | default to null  |
//! | list transactions  | default to empty |
//! | get variant        | default to null  |
//! | GraphQL forward    | propagate        |
//!
//! A recovered failure is logged at `warn` and handed back alongside the
//! fallback value so callers can record a degraded outcome.

use tracing::warn;

use super::ShopifyError;

/// An upstream call the proxy makes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpstreamOp {
    ListOrders,
    GetOrder,
    ListTransactions,
    GetVariant,
    GraphqlForward,
}

/// What happens when an upstream call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailurePolicy {
    /// The error reaches the caller.
    Propagate,
    /// The call yields an empty collection.
    DefaultToEmpty,
    /// The call yields no value.
    DefaultToNull,
}

impl UpstreamOp {
    /// The declared policy for this operation.
    #[must_use]
    pub const fn policy(self) -> FailurePolicy {
        match self {
            Self::ListOrders | Self::GraphqlForward => FailurePolicy::Propagate,
            Self::GetOrder | Self::GetVariant => FailurePolicy::DefaultToNull,
            Self::ListTransactions => FailurePolicy::DefaultToEmpty,
        }
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ListOrders => "list_orders",
            Self::GetOrder => "get_order",
            Self::ListTransactions => "list_transactions",
            Self::GetVariant => "get_variant",
            Self::GraphqlForward => "graphql_forward",
        }
    }
}

/// A value obtained under a failure policy.
#[derive(Debug)]
pub struct Recovered<T> {
    pub value: T,
    /// The error replaced by the fallback, if any.
    pub swallowed: Option<ShopifyError>,
}

impl<T> Recovered<T> {
    /// Whether the value is a fallback.
    #[must_use]
    pub const fn is_degraded(&self) -> bool {
        self.swallowed.is_some()
    }
}

impl<T: Default> Recovered<T> {
    /// The fallback value standing in for a failed call.
    #[must_use]
    pub fn fallback(err: ShopifyError) -> Self {
        Self {
            value: T::default(),
            swallowed: Some(err),
        }
    }
}

/// Apply the operation's failure policy to a call result.
///
/// `T::default()` is the fallback: an empty `Vec` for collection calls,
/// `None` for optional lookups.
///
/// # Errors
///
/// Returns the original error when the operation's policy is
/// [`FailurePolicy::Propagate`].
pub fn recover<T: Default>(
    op: UpstreamOp,
    result: Result<T, ShopifyError>,
) -> Result<Recovered<T>, ShopifyError> {
    match result {
        Ok(value) => Ok(Recovered {
            value,
            swallowed: None,
        }),
        Err(err) => match op.policy() {
            FailurePolicy::Propagate => Err(err),
            FailurePolicy::DefaultToEmpty | FailurePolicy::DefaultToNull => {
                warn!(
                    operation = op.name(),
                    error = %err,
                    "Upstream call failed, using fallback"
                );
                Ok(Recovered::fallback(err))
            }
        },
    }
}
