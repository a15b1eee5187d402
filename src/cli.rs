//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::load_candles;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::domain::candle::Candle;
use crate::domain::error::SwingtraderError;
use crate::domain::regime::{classify_regime, MarketBias, MarketRegime, VolatilityRegime};
use crate::domain::screen::screen;
use crate::domain::sizing::{
    size_position, Conviction, PortfolioState, RiskLimits, SizingRequest,
};
use crate::domain::snapshot::{compute_indicator_set, IndicatorSet, TrendLabel};
use crate::domain::stops::{
    atr_fallback_stops, chandelier_stops, Direction, StopLevel, CHANDELIER_PERIOD,
};

#[derive(Parser, Debug)]
#[command(name = "swingtrader", about = "Swing-trading decision support engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Score an instrument from a candle CSV
    Analyze {
        /// Candle file (date,open,high,low,close,volume)
        #[arg(short, long)]
        candles: PathBuf,
    },
    /// Classify the market regime from benchmark and volatility candle CSVs
    Regime {
        #[arg(long)]
        benchmark: PathBuf,
        #[arg(long)]
        secondary: PathBuf,
        #[arg(long)]
        volatility: PathBuf,
    },
    /// Size a candidate position under risk limits
    Size {
        #[arg(short, long)]
        candles: PathBuf,
        #[arg(long)]
        symbol: String,
        #[arg(long, default_value = "moderate")]
        conviction: Conviction,
        /// INI file with [risk.<profile>] sections
        #[arg(long)]
        config: Option<PathBuf>,
        /// Risk profile name (conservative or aggressive, or a config section)
        #[arg(long, default_value = "conservative")]
        profile: String,
        #[arg(long)]
        portfolio_value: f64,
        #[arg(long)]
        cash: f64,
        #[arg(long, default_value_t = 0.0)]
        invested: f64,
        #[arg(long, default_value_t = 0.0)]
        pnl_today: f64,
        /// Benchmark candle CSV for the regime check
        #[arg(long)]
        benchmark: Option<PathBuf>,
        #[arg(long)]
        secondary: Option<PathBuf>,
        #[arg(long)]
        volatility: Option<PathBuf>,
    },
}

impl clap::builder::ValueParserFactory for Conviction {
    type Parser = clap::builder::ValueParser;

    fn value_parser() -> Self::Parser {
        clap::builder::ValueParser::new(|s: &str| {
            s.parse::<Conviction>().map_err(|e| e.to_string())
        })
    }
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze { candles } => run_analyze(&candles),
        Command::Regime {
            benchmark,
            secondary,
            volatility,
        } => run_regime(&benchmark, &secondary, &volatility),
        Command::Size {
            candles,
            symbol,
            conviction,
            config,
            profile,
            portfolio_value,
            cash,
            invested,
            pnl_today,
            benchmark,
            secondary,
            volatility,
        } => run_size(SizeArgs {
            candles,
            symbol,
            conviction,
            config,
            profile,
            portfolio_value,
            cash,
            invested,
            pnl_today,
            benchmark,
            secondary,
            volatility,
        }),
    }
}

struct SizeArgs {
    candles: PathBuf,
    symbol: String,
    conviction: Conviction,
    config: Option<PathBuf>,
    profile: String,
    portfolio_value: f64,
    cash: f64,
    invested: f64,
    pnl_today: f64,
    benchmark: Option<PathBuf>,
    secondary: Option<PathBuf>,
    volatility: Option<PathBuf>,
}

fn fail(err: &SwingtraderError) -> ExitCode {
    eprintln!("error: {err}");
    err.into()
}

fn load_snapshot(path: &PathBuf) -> Result<(Vec<Candle>, IndicatorSet), SwingtraderError> {
    let candles = load_candles(path)?;
    let set = compute_indicator_set(&candles)?;
    Ok((candles, set))
}

/// Stop selection: Chandelier when a full OHLC window exists, ATR fallback
/// otherwise.
pub fn instrument_stop(candles: &[Candle], set: &IndicatorSet) -> Option<StopLevel> {
    if candles.len() >= CHANDELIER_PERIOD {
        chandelier_stops(candles, set.price, Direction::Buy).ok()
    } else {
        set.atr
            .and_then(|atr| atr_fallback_stops(set.price, atr, Direction::Buy).ok())
    }
}

fn trend_name(trend: TrendLabel) -> &'static str {
    match trend {
        TrendLabel::Bullish => "BULLISH",
        TrendLabel::Neutral => "NEUTRAL",
        TrendLabel::Bearish => "BEARISH",
    }
}

fn run_analyze(path: &PathBuf) -> ExitCode {
    eprintln!("Loading candles from {}", path.display());
    let (candles, set) = match load_snapshot(path) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };

    println!("price: {:.4}", set.price);
    println!("trend: {}", trend_name(set.trend));
    if let Some(rsi) = set.rsi {
        println!("rsi: {:.2}", rsi);
    }
    if let Some(macd) = &set.macd {
        println!(
            "macd: line {:.4} signal {:.4} histogram {:.4}",
            macd.line, macd.signal, macd.histogram
        );
    }
    if let Some(atr) = set.atr {
        println!("atr: {:.4}", atr);
    }
    if let Some(adx) = set.adx {
        println!("adx: {:.2}", adx);
    }
    if let Some(rvol) = set.rvol {
        println!("rvol: {:.2}", rvol);
    }
    println!("alignment: {:?}", set.ma_alignment);
    for signal in &set.signals {
        println!("signal: {} [{:?}]", signal.label, signal.bias);
    }

    let result = screen(&set);
    println!(
        "css: {:.1} (trend {:.0} momentum {:.0} volatility {:.0} signal {:.0})",
        result.css,
        result.trend_score,
        result.momentum_score,
        result.volatility_score,
        result.signal_score
    );
    println!("screen: {:?}", result.signal);

    if let Some(stop) = instrument_stop(&candles, &set) {
        println!(
            "stop: {:.4} ({:.2}% {:?} trend_up={})",
            stop.sl_rate, stop.sl_pct, stop.method, stop.trend_up
        );
    }

    ExitCode::SUCCESS
}

fn run_regime(benchmark: &PathBuf, secondary: &PathBuf, volatility: &PathBuf) -> ExitCode {
    let regime = match load_regime(benchmark, secondary, volatility) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    print_regime(&regime);
    ExitCode::SUCCESS
}

fn load_regime(
    benchmark: &PathBuf,
    secondary: &PathBuf,
    volatility: &PathBuf,
) -> Result<MarketRegime, SwingtraderError> {
    let (_, benchmark_set) = load_snapshot(benchmark)?;
    let (_, secondary_set) = load_snapshot(secondary)?;
    let (_, volatility_set) = load_snapshot(volatility)?;
    Ok(classify_regime(&benchmark_set, &secondary_set, &volatility_set))
}

fn print_regime(regime: &MarketRegime) {
    println!("benchmark trend: {}", trend_name(regime.benchmark_trend));
    println!("secondary trend: {}", trend_name(regime.secondary_trend));
    println!(
        "volatility: {:.2} ({:?})",
        regime.volatility_value, regime.volatility_regime
    );
    println!("bias: {:?}", regime.bias);
    println!("sizing adjustment: {}x", regime.sizing_adjustment);
}

fn run_size(args: SizeArgs) -> ExitCode {
    eprintln!("Loading candles from {}", args.candles.display());
    let (candles, set) = match load_snapshot(&args.candles) {
        Ok(v) => v,
        Err(e) => return fail(&e),
    };

    let result = screen(&set);
    println!("css: {:.1} screen: {:?}", result.css, result.signal);

    let stop = match instrument_stop(&candles, &set) {
        Some(stop) => stop,
        None => {
            return fail(&SwingtraderError::InsufficientData {
                have: candles.len(),
                need: CHANDELIER_PERIOD,
            })
        }
    };
    println!(
        "stop: {:.4} ({:.2}% {:?})",
        stop.sl_rate, stop.sl_pct, stop.method
    );

    let regime = match (&args.benchmark, &args.secondary, &args.volatility) {
        (Some(b), Some(s), Some(v)) => match load_regime(b, s, v) {
            Ok(r) => r,
            Err(e) => return fail(&e),
        },
        _ => {
            eprintln!("No regime inputs; assuming normal volatility");
            MarketRegime {
                benchmark_trend: TrendLabel::Neutral,
                secondary_trend: TrendLabel::Neutral,
                volatility_value: 0.0,
                volatility_regime: VolatilityRegime::Normal,
                bias: MarketBias::Cautious,
                sizing_adjustment: 1.0,
            }
        }
    };
    print_regime(&regime);

    let limits = match resolve_limits(args.config.as_ref(), &args.profile) {
        Ok(l) => l,
        Err(e) => return fail(&e),
    };

    let portfolio = PortfolioState {
        total_value: args.portfolio_value,
        cash_available: args.cash,
        total_invested: args.invested,
        positions: Vec::new(),
        realized_pnl_today: args.pnl_today,
    };
    let request = SizingRequest {
        symbol: args.symbol,
        direction: Direction::Buy,
        conviction: args.conviction,
        leverage: 1.0,
    };

    match size_position(&request, &stop, &regime, &portfolio, &limits) {
        Ok(sizing) if sizing.is_rejected() => {
            println!("sizing: REJECTED ({})", sizing.binding_constraint);
            ExitCode::SUCCESS
        }
        Ok(sizing) => {
            println!(
                "sizing: ${:.2} risk {:.2}% bound by {} trailing={}",
                sizing.amount,
                sizing.actual_risk_pct * 100.0,
                sizing.binding_constraint,
                sizing.trailing_allowed
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}

/// Resolve the active risk limits: a named stock profile, or a
/// `[risk.<profile>]` section when a config file is given.
pub fn resolve_limits(
    config: Option<&PathBuf>,
    profile: &str,
) -> Result<RiskLimits, SwingtraderError> {
    match config {
        Some(path) => {
            let adapter =
                FileConfigAdapter::from_file(path).map_err(|e| SwingtraderError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            Ok(RiskLimits::from_config(&adapter, &format!("risk.{}", profile)))
        }
        None => match profile {
            "aggressive" => Ok(RiskLimits::aggressive()),
            "conservative" => Ok(RiskLimits::conservative()),
            other => Err(SwingtraderError::ConfigInvalid {
                section: "risk".into(),
                key: "profile".into(),
                reason: format!("unknown profile '{}' without a config file", other),
            }),
        },
    }
}
