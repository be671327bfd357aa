//! Status enums for platform records.

/// Order financial status.
///
/// Interprets Shopify's REST `financial_status` values. Orders keep the raw
/// string; values this proxy does not know about read as
/// [`FinancialStatus::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FinancialStatus {
    Pending,
    Authorized,
    PartiallyPaid,
    Paid,
    PartiallyRefunded,
    Refunded,
    Voided,
    Expired,
    Unknown,
}

impl FinancialStatus {
    /// Whether money has been captured for the order (fully or partially).
    #[must_use]
    pub const fn is_captured(self) -> bool {
        matches!(
            self,
            Self::Paid | Self::PartiallyPaid | Self::PartiallyRefunded | Self::Refunded
        )
    }
}

impl From<&str> for FinancialStatus {
    fn from(raw: &str) -> Self {
        match raw {
            "pending" => Self::Pending,
            "authorized" => Self::Authorized,
            "partially_paid" => Self::PartiallyPaid,
            "paid" => Self::Paid,
            "partially_refunded" => Self::PartiallyRefunded,
            "refunded" => Self::Refunded,
            "voided" => Self::Voided,
            "expired" => Self::Expired,
            _ => Self::Unknown,
        }
    }
}

impl std::fmt::Display for FinancialStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Authorized => "authorized",
            Self::PartiallyPaid => "partially_paid",
            Self::Paid => "paid",
            Self::PartiallyRefunded => "partially_refunded",
            Self::Refunded => "refunded",
            Self::Voided => "voided",
            Self::Expired => "expired",
            Self::Unknown => "unknown",
        };
        f.write_str(s)
    }
}
