//! Position sizing: fixed-risk volume and the weighted two-leg split.

use rust_decimal::Decimal;
use tracing::warn;

use crate::models::AccountSnapshot;
use super::StrategyConfig;

/// Total volume and its split across the two legs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegVolumes {
    pub total: Decimal,
    pub leg1: Decimal,
    pub leg2: Decimal,
}

/// Volume (in units) such that hitting the stop-loss loses `risk_percent` of `balance`.
///
/// volume = (balance * risk% / 100) / (stop_loss_pips * pip_value)
///
/// A zero pip value or zero stop-loss cannot be sized. That case logs a
/// warning and yields zero volume instead of failing, as does a volume too
/// large to represent.
pub fn compute_volume(
    balance: Decimal,
    risk_percent: Decimal,
    stop_loss_pips: u32,
    pip_value: Decimal,
) -> Decimal {
    if pip_value.is_zero() || stop_loss_pips == 0 {
        warn!(
            pip_value = %pip_value,
            stop_loss_pips = stop_loss_pips,
            "PipValue or StopLossPips cannot be zero, sizing volume to 0"
        );
        return Decimal::ZERO;
    }

    let volume = balance
        .checked_mul(risk_percent)
        .and_then(|v| v.checked_div(Decimal::ONE_HUNDRED))
        .zip(Decimal::from(stop_loss_pips).checked_mul(pip_value))
        .and_then(|(risk_amount, pip_risk)| risk_amount.checked_div(pip_risk));

    match volume {
        Some(volume) => volume,
        None => {
            warn!(
                balance = %balance,
                pip_value = %pip_value,
                stop_loss_pips = stop_loss_pips,
                "Volume overflows the decimal range, sizing volume to 0"
            );
            Decimal::ZERO
        }
    }
}

/// Split `total` so leg 1 gets `weight_pct` percent and leg 2 the remainder.
/// No lot-step rounding happens here; that is the venue's job.
///
/// The weight is scaled to a fraction before multiplying, so any `total`
/// that fits still splits for weights in [0, 100]. If a leg overflows
/// anyway, both legs are zero.
pub fn split_volume(total: Decimal, weight_pct: Decimal) -> (Decimal, Decimal) {
    let legs = (weight_pct / Decimal::ONE_HUNDRED)
        .checked_mul(total)
        .zip(((Decimal::ONE_HUNDRED - weight_pct) / Decimal::ONE_HUNDRED).checked_mul(total));

    legs.unwrap_or_else(|| {
        warn!(
            total = %total,
            weight_pct = %weight_pct,
            "Leg volume overflows the decimal range, sizing legs to 0"
        );
        (Decimal::ZERO, Decimal::ZERO)
    })
}

/// Calculator for leg volumes from a strategy config.
pub struct PositionSizer {
    config: StrategyConfig,
}

impl PositionSizer {
    /// Create a new position sizer with given config.
    pub fn new(config: StrategyConfig) -> Self {
        Self { config }
    }

    /// Size both legs against the current account state.
    pub fn calculate(&self, account: &AccountSnapshot) -> LegVolumes {
        let total = compute_volume(
            account.balance,
            self.config.risk_percent,
            self.config.stop_loss_pips,
            account.pip_value,
        );
        let (leg1, leg2) = split_volume(total, self.config.tp1_weight_pct);

        LegVolumes { total, leg1, leg2 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_compute_volume_formula() {
        // $200 at risk over 30 pips worth 0.1 each => 66.67 units
        let volume = compute_volume(dec!(10000), dec!(2), 30, dec!(0.1));
        assert_eq!(volume.round_dp(6), dec!(66.666667));

        let volume = compute_volume(dec!(5000), dec!(1), 25, dec!(0.0001));
        assert_eq!(volume, dec!(20000));
    }

    #[test]
    fn test_compute_volume_zero_guards() {
        assert_eq!(compute_volume(dec!(10000), dec!(2), 0, dec!(0.1)), Decimal::ZERO);
        assert_eq!(compute_volume(dec!(10000), dec!(2), 30, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_split_volume() {
        assert_eq!(split_volume(dec!(10), dec!(60)), (dec!(6), dec!(4)));
        assert_eq!(split_volume(dec!(10), dec!(100)), (dec!(10), Decimal::ZERO));
        assert_eq!(split_volume(dec!(10), Decimal::ZERO), (Decimal::ZERO, dec!(10)));
    }

    #[test]
    fn test_split_legs_sum_to_total() {
        let total = dec!(200) / dec!(3);
        for weight in [dec!(0), dec!(12.5), dec!(33), dec!(60), dec!(99.9), dec!(100)] {
            let (leg1, leg2) = split_volume(total, weight);
            assert!((leg1 + leg2 - total).abs() < dec!(0.000001), "weight {}", weight);
        }
    }

    #[test]
    fn test_tiny_pip_value_does_not_overflow() {
        // 200 / (30 * 1e-28) is close to Decimal::MAX; the 60/40 split must still work
        let pip_value = Decimal::new(1, 28);
        let total = compute_volume(dec!(10000), dec!(2), 30, pip_value);
        assert!(total > Decimal::ZERO);

        let (leg1, leg2) = split_volume(total, dec!(60));
        assert!(leg1 > leg2 && leg2 > Decimal::ZERO);

        let sizer = PositionSizer::new(StrategyConfig::default());
        let account = AccountSnapshot::new("EURUSD", dec!(10000), pip_value, dec!(0.0001), dec!(1.1));
        let volumes = sizer.calculate(&account);
        assert_eq!(volumes.total, total);
        assert_eq!(volumes.leg1, leg1);
    }

    #[test]
    fn test_unrepresentable_volume_is_zero() {
        // 2e18 risked over 1 pip worth 1e-28 is 2e46 units
        let volume = compute_volume(dec!(100000000000000000000), dec!(2), 1, Decimal::new(1, 28));
        assert_eq!(volume, Decimal::ZERO);
    }

    #[test]
    fn test_sizer_uses_account_and_config() {
        let sizer = PositionSizer::new(StrategyConfig::default());
        let account =
            AccountSnapshot::new("EURUSD", dec!(10000), dec!(0.0001), dec!(0.0001), dec!(1.1));

        let volumes = sizer.calculate(&account);

        // 200 / (30 * 0.0001)
        assert_eq!(volumes.total.round_dp(2), dec!(66666.67));
        assert!((volumes.leg1 + volumes.leg2 - volumes.total).abs() < dec!(0.000001));
    }
}
