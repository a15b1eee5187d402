//! Position sizing under strict risk limits.
//!
//! A conviction tier sets the risk budget (fraction of portfolio value at
//! risk if the stop is hit) and a per-instrument concentration cap. The raw
//! risk-budget amount is then capped by concentration, usable cash, the
//! market regime multiplier, and the configured trade-size bounds. Breaches
//! come back as structured rejections, never as silently adjusted amounts.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::SwingtraderError;
use crate::domain::regime::MarketRegime;
use crate::domain::stops::{Direction, StopLevel};
use crate::ports::config_port::ConfigPort;

/// Cash kept out of reach of any single trade.
pub const CASH_BUFFER: f64 = 200.0;
/// Exposure level past which the cash buffer doubles.
pub const HIGH_EXPOSURE_THRESHOLD: f64 = 0.80;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conviction {
    Strong,
    Moderate,
    Weak,
}

impl Conviction {
    /// Fraction of portfolio value put at risk if the stop is hit.
    pub fn risk_pct(&self) -> f64 {
        match self {
            Conviction::Strong => 0.02,
            Conviction::Moderate => 0.015,
            Conviction::Weak => 0.01,
        }
    }

    /// Maximum fraction of portfolio value in a single instrument.
    pub fn concentration_pct(&self) -> f64 {
        match self {
            Conviction::Strong => 0.08,
            Conviction::Moderate => 0.05,
            Conviction::Weak => 0.03,
        }
    }
}

impl FromStr for Conviction {
    type Err = SwingtraderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strong" => Ok(Conviction::Strong),
            "moderate" => Ok(Conviction::Moderate),
            "weak" => Ok(Conviction::Weak),
            other => Err(SwingtraderError::InvalidInput {
                reason: format!("unknown conviction '{}'", other),
            }),
        }
    }
}

/// Risk-limit configuration. Two stock profiles plus INI override support.
#[derive(Debug, Clone, PartialEq)]
pub struct RiskLimits {
    pub min_trade: f64,
    pub max_trade: f64,
    pub max_concentration_pct: f64,
    pub max_exposure_pct: f64,
    pub max_leverage: f64,
    pub daily_loss_breaker_pct: f64,
}

impl RiskLimits {
    pub fn conservative() -> Self {
        RiskLimits {
            min_trade: 10.0,
            max_trade: 1000.0,
            max_concentration_pct: 0.10,
            max_exposure_pct: 0.90,
            max_leverage: 1.0,
            daily_loss_breaker_pct: 0.03,
        }
    }

    pub fn aggressive() -> Self {
        RiskLimits {
            min_trade: 50.0,
            max_trade: 5000.0,
            max_concentration_pct: 0.20,
            max_exposure_pct: 0.95,
            max_leverage: 1.0,
            daily_loss_breaker_pct: 0.05,
        }
    }

    /// Read a profile from a config section, falling back to the
    /// conservative defaults for missing keys.
    pub fn from_config(config: &dyn ConfigPort, section: &str) -> Self {
        let defaults = RiskLimits::conservative();
        RiskLimits {
            min_trade: config.get_f64(section, "min_trade", defaults.min_trade),
            max_trade: config.get_f64(section, "max_trade", defaults.max_trade),
            max_concentration_pct: config.get_f64(
                section,
                "max_concentration_pct",
                defaults.max_concentration_pct,
            ),
            max_exposure_pct: config.get_f64(
                section,
                "max_exposure_pct",
                defaults.max_exposure_pct,
            ),
            max_leverage: config.get_f64(section, "max_leverage", defaults.max_leverage),
            daily_loss_breaker_pct: config.get_f64(
                section,
                "daily_loss_breaker_pct",
                defaults.daily_loss_breaker_pct,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OpenPosition {
    pub symbol: String,
    pub amount: f64,
    pub direction: Direction,
    pub leverage: f64,
}

/// Caller-supplied portfolio snapshot. Never mutated by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioState {
    pub total_value: f64,
    pub cash_available: f64,
    pub total_invested: f64,
    pub positions: Vec<OpenPosition>,
    pub realized_pnl_today: f64,
}

impl PortfolioState {
    /// Invested fraction of portfolio value; 0 for an empty portfolio.
    pub fn exposure(&self) -> f64 {
        if self.total_value > 0.0 {
            self.total_invested / self.total_value
        } else {
            0.0
        }
    }

    pub fn invested_in(&self, symbol: &str) -> f64 {
        self.positions
            .iter()
            .filter(|p| p.symbol == symbol)
            .map(|p| p.amount)
            .sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingConstraint {
    RiskBudget,
    Concentration,
    Exposure,
    CashBuffer,
    MinSize,
    MaxTrade,
    CircuitBreaker,
    Leverage,
}

impl fmt::Display for BindingConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BindingConstraint::RiskBudget => "risk-budget",
            BindingConstraint::Concentration => "concentration",
            BindingConstraint::Exposure => "exposure",
            BindingConstraint::CashBuffer => "cash-buffer",
            BindingConstraint::MinSize => "min-size",
            BindingConstraint::MaxTrade => "max-trade",
            BindingConstraint::CircuitBreaker => "circuit-breaker",
            BindingConstraint::Leverage => "leverage",
        };
        write!(f, "{}", name)
    }
}

/// The sizing decision. `amount == 0` with a constraint code is a rejection,
/// not an error. `actual_risk_pct` is the fraction of portfolio value lost
/// if the stop is hit at this size.
#[derive(Debug, Clone, PartialEq)]
pub struct SizingResult {
    pub amount: f64,
    pub actual_risk_pct: f64,
    pub binding_constraint: BindingConstraint,
    pub trailing_allowed: bool,
}

impl SizingResult {
    pub fn is_rejected(&self) -> bool {
        self.amount == 0.0
    }

    fn rejected(constraint: BindingConstraint) -> Self {
        SizingResult {
            amount: 0.0,
            actual_risk_pct: 0.0,
            binding_constraint: constraint,
            trailing_allowed: false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SizingRequest {
    pub symbol: String,
    pub direction: Direction,
    pub conviction: Conviction,
    pub leverage: f64,
}

/// Size a new-exposure position.
///
/// The circuit breaker is checked before anything else: once the day's
/// realized P&L magnitude crosses the breaker threshold, every request is
/// vetoed regardless of conviction or setup quality.
pub fn size_position(
    request: &SizingRequest,
    stop: &StopLevel,
    regime: &MarketRegime,
    portfolio: &PortfolioState,
    limits: &RiskLimits,
) -> Result<SizingResult, SwingtraderError> {
    if portfolio.total_value > 0.0
        && portfolio.realized_pnl_today.abs() / portfolio.total_value
            >= limits.daily_loss_breaker_pct
    {
        return Ok(SizingResult::rejected(BindingConstraint::CircuitBreaker));
    }

    let sl_distance = stop.sl_distance();
    if sl_distance <= 0.0 || !sl_distance.is_finite() {
        return Err(SwingtraderError::InvalidInput {
            reason: format!("stop distance must be positive, got {}", sl_distance),
        });
    }

    let risk_dollars = portfolio.total_value * request.conviction.risk_pct();
    let mut amount = risk_dollars / sl_distance;
    let mut binding = BindingConstraint::RiskBudget;

    let concentration_cap = portfolio.total_value * request.conviction.concentration_pct();
    if concentration_cap < amount {
        amount = concentration_cap;
        binding = BindingConstraint::Concentration;
    }

    let buffer = if portfolio.exposure() > HIGH_EXPOSURE_THRESHOLD {
        CASH_BUFFER * 2.0
    } else {
        CASH_BUFFER
    };
    let usable_cash = (portfolio.cash_available - buffer).max(0.0);
    if usable_cash < amount {
        amount = usable_cash;
        binding = BindingConstraint::CashBuffer;
    }

    amount *= regime.sizing_adjustment;

    if amount > limits.max_trade {
        amount = limits.max_trade;
        binding = BindingConstraint::MaxTrade;
    }
    if amount < limits.min_trade {
        return Ok(SizingResult::rejected(BindingConstraint::MinSize));
    }

    if portfolio.total_value > 0.0 {
        let post_concentration =
            (portfolio.invested_in(&request.symbol) + amount) / portfolio.total_value;
        if post_concentration > limits.max_concentration_pct {
            return Ok(SizingResult::rejected(BindingConstraint::Concentration));
        }

        let post_exposure = (portfolio.total_invested + amount) / portfolio.total_value;
        if post_exposure > limits.max_exposure_pct {
            return Ok(SizingResult::rejected(BindingConstraint::Exposure));
        }
    }

    if request.leverage > limits.max_leverage || request.leverage < 1.0 {
        return Ok(SizingResult::rejected(BindingConstraint::Leverage));
    }

    let actual_risk_pct = if portfolio.total_value > 0.0 {
        amount * sl_distance / portfolio.total_value
    } else {
        0.0
    };

    Ok(SizingResult {
        amount,
        actual_risk_pct,
        binding_constraint: binding,
        trailing_allowed: stop.trailing_allowed(request.direction),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::regime::{MarketBias, MarketRegime, VolatilityRegime};
    use crate::domain::snapshot::TrendLabel;
    use crate::domain::stops::StopMethod;
    use approx::assert_relative_eq;

    fn chandelier_stop(sl_pct: f64, trend_up: bool) -> StopLevel {
        StopLevel {
            sl_rate: 100.0 * (1.0 - sl_pct / 100.0),
            sl_pct,
            tp_rate: None,
            trend_up,
            method: StopMethod::Chandelier,
        }
    }

    fn calm_regime() -> MarketRegime {
        MarketRegime {
            benchmark_trend: TrendLabel::Bullish,
            secondary_trend: TrendLabel::Bullish,
            volatility_value: 15.0,
            volatility_regime: VolatilityRegime::Normal,
            bias: MarketBias::RiskOn,
            sizing_adjustment: 1.0,
        }
    }

    fn high_vol_regime() -> MarketRegime {
        MarketRegime {
            benchmark_trend: TrendLabel::Neutral,
            secondary_trend: TrendLabel::Neutral,
            volatility_value: 27.0,
            volatility_regime: VolatilityRegime::High,
            bias: MarketBias::RiskOff,
            sizing_adjustment: 0.5,
        }
    }

    fn portfolio(total_value: f64, cash: f64, invested: f64) -> PortfolioState {
        PortfolioState {
            total_value,
            cash_available: cash,
            total_invested: invested,
            positions: Vec::new(),
            realized_pnl_today: 0.0,
        }
    }

    fn request(conviction: Conviction) -> SizingRequest {
        SizingRequest {
            symbol: "AAPL".into(),
            direction: Direction::Buy,
            conviction,
            leverage: 1.0,
        }
    }

    #[test]
    fn concentration_binds_the_standard_scenario() {
        // 10k portfolio, strong conviction, 5% stop distance:
        // risk = 200, raw = 4000, concentration cap = 800.
        let result = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 5_000.0, 0.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert_relative_eq!(result.amount, 800.0);
        assert_eq!(result.binding_constraint, BindingConstraint::Concentration);
        assert!(result.trailing_allowed);
        assert_relative_eq!(result.actual_risk_pct, 0.004);
    }

    #[test]
    fn high_volatility_regime_halves_the_amount() {
        let result = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, true),
            &high_vol_regime(),
            &portfolio(10_000.0, 5_000.0, 0.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert_relative_eq!(result.amount, 400.0);
        assert_eq!(result.binding_constraint, BindingConstraint::Concentration);
    }

    #[test]
    fn risk_budget_binds_with_wide_stop() {
        // Weak conviction, 50% stop distance: risk = 100, raw = 200,
        // concentration cap = 300 → risk budget wins.
        let result = size_position(
            &request(Conviction::Weak),
            &chandelier_stop(50.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 5_000.0, 0.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert_relative_eq!(result.amount, 200.0);
        assert_eq!(result.binding_constraint, BindingConstraint::RiskBudget);
    }

    #[test]
    fn conviction_tiers_are_monotonic() {
        let stop = chandelier_stop(5.0, true);
        let portfolio = portfolio(10_000.0, 9_000.0, 0.0);
        let limits = RiskLimits::aggressive();

        let amounts: Vec<f64> = [Conviction::Weak, Conviction::Moderate, Conviction::Strong]
            .iter()
            .map(|&conviction| {
                size_position(
                    &request(conviction),
                    &stop,
                    &calm_regime(),
                    &portfolio,
                    &limits,
                )
                .unwrap()
                .amount
            })
            .collect();

        assert!(amounts[0] <= amounts[1] && amounts[1] <= amounts[2]);
        assert!(
            Conviction::Weak.risk_pct() <= Conviction::Moderate.risk_pct()
                && Conviction::Moderate.risk_pct() <= Conviction::Strong.risk_pct()
        );
        assert!(
            Conviction::Weak.concentration_pct() <= Conviction::Moderate.concentration_pct()
                && Conviction::Moderate.concentration_pct()
                    <= Conviction::Strong.concentration_pct()
        );
    }

    #[test]
    fn cash_buffer_caps_the_amount() {
        // Usable cash = 250 - 200 = 50.
        let result = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 250.0, 0.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert_relative_eq!(result.amount, 50.0);
        assert_eq!(result.binding_constraint, BindingConstraint::CashBuffer);
    }

    #[test]
    fn cash_buffer_doubles_above_80pct_exposure() {
        // Exposure 85%: buffer 400, usable = 800 - 400 = 400 < cap 500.
        let result = size_position(
            &request(Conviction::Moderate),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 800.0, 8_500.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert_relative_eq!(result.amount, 400.0);
        assert_eq!(result.binding_constraint, BindingConstraint::CashBuffer);

        // Same cash at 50% exposure: buffer 200, usable 600 ≥ cap 500.
        let relaxed = size_position(
            &request(Conviction::Moderate),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 800.0, 5_000.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert_relative_eq!(relaxed.amount, 500.0);
        assert_eq!(relaxed.binding_constraint, BindingConstraint::Concentration);
    }

    #[test]
    fn below_minimum_rejects_instead_of_rounding_up() {
        // Usable cash = 210 - 200 = 10 < aggressive min_trade 50.
        let result = size_position(
            &request(Conviction::Weak),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 210.0, 0.0),
            &RiskLimits::aggressive(),
        )
        .unwrap();

        assert!(result.is_rejected());
        assert_eq!(result.binding_constraint, BindingConstraint::MinSize);
    }

    #[test]
    fn max_trade_caps_large_portfolios() {
        // 100k portfolio, strong: concentration cap 8000 > max_trade 5000.
        let result = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(100_000.0, 50_000.0, 0.0),
            &RiskLimits::aggressive(),
        )
        .unwrap();

        assert_relative_eq!(result.amount, 5_000.0);
        assert_eq!(result.binding_constraint, BindingConstraint::MaxTrade);
    }

    #[test]
    fn post_trade_concentration_rejects() {
        // Existing 600 in the symbol; adding 500 would be 11% of 10k.
        let mut state = portfolio(10_000.0, 5_000.0, 600.0);
        state.positions.push(OpenPosition {
            symbol: "AAPL".into(),
            amount: 600.0,
            direction: Direction::Buy,
            leverage: 1.0,
        });

        let result = size_position(
            &request(Conviction::Moderate),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &state,
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert!(result.is_rejected());
        assert_eq!(result.binding_constraint, BindingConstraint::Concentration);
    }

    #[test]
    fn post_trade_exposure_rejects() {
        // 8,700 invested; adding 500 crosses the 90% exposure cap.
        let result = size_position(
            &request(Conviction::Moderate),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 1_200.0, 8_700.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert!(result.is_rejected());
        assert_eq!(result.binding_constraint, BindingConstraint::Exposure);
    }

    #[test]
    fn leverage_rejects() {
        let mut req = request(Conviction::Moderate);
        req.leverage = 2.0;

        let result = size_position(
            &req,
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 5_000.0, 0.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert!(result.is_rejected());
        assert_eq!(result.binding_constraint, BindingConstraint::Leverage);
    }

    #[test]
    fn circuit_breaker_vetoes_everything() {
        let mut state = portfolio(10_000.0, 5_000.0, 0.0);
        state.realized_pnl_today = -350.0; // 3.5% ≥ 3% breaker

        for conviction in [Conviction::Weak, Conviction::Moderate, Conviction::Strong] {
            let result = size_position(
                &request(conviction),
                &chandelier_stop(5.0, true),
                &calm_regime(),
                &state,
                &RiskLimits::conservative(),
            )
            .unwrap();

            assert!(result.is_rejected());
            assert_eq!(result.binding_constraint, BindingConstraint::CircuitBreaker);
        }
    }

    #[test]
    fn circuit_breaker_trips_on_gains_too() {
        let mut state = portfolio(10_000.0, 5_000.0, 0.0);
        state.realized_pnl_today = 400.0;

        let result = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &state,
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert_eq!(result.binding_constraint, BindingConstraint::CircuitBreaker);
    }

    #[test]
    fn circuit_breaker_below_threshold_passes() {
        let mut state = portfolio(10_000.0, 5_000.0, 0.0);
        state.realized_pnl_today = -299.0; // 2.99% < 3%

        let result = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &state,
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert!(!result.is_rejected());
    }

    #[test]
    fn zero_portfolio_value_is_a_defined_rejection() {
        let result = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(0.0, 0.0, 0.0),
            &RiskLimits::conservative(),
        )
        .unwrap();

        assert!(result.is_rejected());
        assert_eq!(result.binding_constraint, BindingConstraint::MinSize);
    }

    #[test]
    fn trailing_follows_the_stop_gate() {
        let gated_off = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, false),
            &calm_regime(),
            &portfolio(10_000.0, 5_000.0, 0.0),
            &RiskLimits::conservative(),
        )
        .unwrap();
        assert!(!gated_off.trailing_allowed);

        let gated_on = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(5.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 5_000.0, 0.0),
            &RiskLimits::conservative(),
        )
        .unwrap();
        assert!(gated_on.trailing_allowed);
    }

    #[test]
    fn zero_stop_distance_is_invalid_input() {
        let result = size_position(
            &request(Conviction::Strong),
            &chandelier_stop(0.0, true),
            &calm_regime(),
            &portfolio(10_000.0, 5_000.0, 0.0),
            &RiskLimits::conservative(),
        );
        assert!(matches!(result, Err(SwingtraderError::InvalidInput { .. })));
    }

    #[test]
    fn conviction_parses_case_insensitively() {
        assert_eq!("Strong".parse::<Conviction>().unwrap(), Conviction::Strong);
        assert_eq!("weak".parse::<Conviction>().unwrap(), Conviction::Weak);
        assert!("yolo".parse::<Conviction>().is_err());
    }

    #[test]
    fn profiles_differ_as_configured() {
        let conservative = RiskLimits::conservative();
        let aggressive = RiskLimits::aggressive();

        assert!(aggressive.max_trade > conservative.max_trade);
        assert!(aggressive.max_concentration_pct > conservative.max_concentration_pct);
        assert!(aggressive.daily_loss_breaker_pct > conservative.daily_loss_breaker_pct);
        assert_eq!(aggressive.max_leverage, 1.0);
        assert_eq!(conservative.max_leverage, 1.0);
    }
}
