//! Take-profit and stop-loss price levels from pip distances.

use rust_decimal::Decimal;

use crate::models::TradeSide;

fn offset(pips: u32, pip_size: Decimal) -> Decimal {
    Decimal::from(pips) * pip_size
}

/// Price `pips` in the profitable direction from `entry_price`.
pub fn take_profit_price(
    side: TradeSide,
    entry_price: Decimal,
    pips: u32,
    pip_size: Decimal,
) -> Decimal {
    match side {
        TradeSide::Buy => entry_price + offset(pips, pip_size),
        TradeSide::Sell => entry_price - offset(pips, pip_size),
    }
}

/// Price `pips` in the losing direction from `entry_price`.
pub fn stop_loss_price(
    side: TradeSide,
    entry_price: Decimal,
    pips: u32,
    pip_size: Decimal,
) -> Decimal {
    match side {
        TradeSide::Buy => entry_price - offset(pips, pip_size),
        TradeSide::Sell => entry_price + offset(pips, pip_size),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    const PIP: Decimal = dec!(0.0001);

    #[test]
    fn test_buy_levels() {
        assert_eq!(take_profit_price(TradeSide::Buy, dec!(1.10000), 50, PIP), dec!(1.10500));
        assert_eq!(stop_loss_price(TradeSide::Buy, dec!(1.10000), 30, PIP), dec!(1.09700));
    }

    #[test]
    fn test_sell_levels() {
        assert_eq!(take_profit_price(TradeSide::Sell, dec!(1.10000), 50, PIP), dec!(1.09500));
        assert_eq!(stop_loss_price(TradeSide::Sell, dec!(1.10000), 30, PIP), dec!(1.10300));
    }

    #[test]
    fn test_zero_pips_is_entry() {
        assert_eq!(take_profit_price(TradeSide::Buy, dec!(1.2345), 0, PIP), dec!(1.2345));
        assert_eq!(stop_loss_price(TradeSide::Sell, dec!(1.2345), 0, PIP), dec!(1.2345));
    }

    #[test]
    fn test_jpy_pip_size() {
        assert_eq!(take_profit_price(TradeSide::Buy, dec!(150.000), 25, dec!(0.01)), dec!(150.25));
    }
}
