//! Submission validation for expense claims.

use chrono::NaiveDate;

use remit_shared::types::Money;

use crate::expense::error::ExpenseError;
use crate::expense::types::ExpenseCategory;

/// Stateless validation for expense submissions.
pub struct ExpenseService;

impl ExpenseService {
    /// Validate the monetary fact and date of a submission.
    ///
    /// # Errors
    ///
    /// * `ExpenseError::InvalidAmount` if the amount is not positive
    /// * `ExpenseError::InvalidDate` if the expense date is after `today`
    pub fn validate_submission(
        amount: &Money,
        expense_date: NaiveDate,
        today: NaiveDate,
    ) -> Result<(), ExpenseError> {
        if !amount.is_positive() {
            return Err(ExpenseError::InvalidAmount(amount.amount));
        }

        if expense_date > today {
            return Err(ExpenseError::InvalidDate(expense_date));
        }

        Ok(())
    }

    /// Parse a category string from a submission.
    ///
    /// # Errors
    ///
    /// Returns `ExpenseError::InvalidCategory` for unrecognized input.
    pub fn parse_category(s: &str) -> Result<ExpenseCategory, ExpenseError> {
        ExpenseCategory::parse(s).ok_or_else(|| ExpenseError::InvalidCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use remit_shared::types::Currency;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::Usd)
    }

    #[test]
    fn test_valid_submission() {
        let today = Utc::now().date_naive();
        let result = ExpenseService::validate_submission(&usd(dec!(100)), today, today);
        assert!(result.is_ok());
    }

    #[test]
    fn test_zero_amount_rejected() {
        let today = Utc::now().date_naive();
        let result = ExpenseService::validate_submission(&usd(dec!(0)), today, today);
        assert_eq!(result, Err(ExpenseError::InvalidAmount(dec!(0))));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let today = Utc::now().date_naive();
        let result = ExpenseService::validate_submission(&usd(dec!(-12.50)), today, today);
        assert!(matches!(result, Err(ExpenseError::InvalidAmount(_))));
    }

    #[test]
    fn test_future_date_rejected() {
        let today = Utc::now().date_naive();
        let tomorrow = today.succ_opt().unwrap();
        let result = ExpenseService::validate_submission(&usd(dec!(10)), tomorrow, today);
        assert_eq!(result, Err(ExpenseError::InvalidDate(tomorrow)));
    }

    #[test]
    fn test_past_date_accepted() {
        let today = Utc::now().date_naive();
        let yesterday = today.pred_opt().unwrap();
        assert!(ExpenseService::validate_submission(&usd(dec!(10)), yesterday, today).is_ok());
    }

    #[test]
    fn test_parse_category() {
        assert_eq!(
            ExpenseService::parse_category("travel"),
            Ok(ExpenseCategory::Travel)
        );
        assert_eq!(
            ExpenseService::parse_category("groceries"),
            Err(ExpenseError::InvalidCategory("groceries".to_string()))
        );
    }
}
