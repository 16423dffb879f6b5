//! Command structs for engine write operations.

use crate::{ArgumentError, Money, ResultEngine, TransactionKind};

/// Apply one credit or debit to a wallet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplyCmd {
    pub wallet_id: String,
    pub amount: Money,
    pub kind: TransactionKind,
}

impl ApplyCmd {
    #[must_use]
    pub fn new(wallet_id: impl Into<String>, amount: Money, kind: TransactionKind) -> Self {
        Self {
            wallet_id: wallet_id.into(),
            amount,
            kind,
        }
    }

    #[must_use]
    pub fn credit(wallet_id: impl Into<String>, amount: Money) -> Self {
        Self::new(wallet_id, amount, TransactionKind::Credit)
    }

    #[must_use]
    pub fn debit(wallet_id: impl Into<String>, amount: Money) -> Self {
        Self::new(wallet_id, amount, TransactionKind::Debit)
    }

    /// Builds a command from raw request values.
    ///
    /// Checks run in a fixed order (wallet id, amount, type) so a request with
    /// several problems always reports the same one.
    pub fn parse(wallet_id: &str, amount: Money, kind: &str) -> ResultEngine<Self> {
        validate_wallet_id(wallet_id)?;
        validate_amount(amount)?;
        let kind = kind.parse::<TransactionKind>()?;
        Ok(Self::new(wallet_id, amount, kind))
    }

    pub(crate) fn validate(&self) -> ResultEngine<()> {
        validate_wallet_id(&self.wallet_id)?;
        validate_amount(self.amount)
    }
}

pub(crate) fn validate_wallet_id(wallet_id: &str) -> ResultEngine<()> {
    if wallet_id.trim().is_empty() {
        return Err(ArgumentError::WalletIdRequired.into());
    }
    Ok(())
}

fn validate_amount(amount: Money) -> ResultEngine<()> {
    if !amount.is_positive() {
        return Err(ArgumentError::AmountNotPositive.into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::EngineError;

    #[test]
    fn parse_accepts_valid_request() {
        let cmd = ApplyCmd::parse("w1", Money::new(100), "debit").unwrap();
        assert_eq!(cmd, ApplyCmd::debit("w1", Money::new(100)));
    }

    #[test]
    fn parse_reports_wallet_id_first() {
        let err = ApplyCmd::parse("  ", Money::ZERO, "nope").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidArgument(ArgumentError::WalletIdRequired)
        );
    }

    #[test]
    fn parse_reports_amount_before_type() {
        let err = ApplyCmd::parse("w1", Money::new(-5), "nope").unwrap_err();
        assert_eq!(
            err,
            EngineError::InvalidArgument(ArgumentError::AmountNotPositive)
        );
    }

    #[test]
    fn parse_rejects_unknown_type() {
        let err = ApplyCmd::parse("w1", Money::new(5), "refund").unwrap_err();
        assert_eq!(err, EngineError::InvalidArgument(ArgumentError::InvalidKind));
    }
}
