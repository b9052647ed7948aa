//! American odds arithmetic.
//!
//! Positive odds quote the profit on a 100 stake, negative odds quote the
//! stake needed to profit 100. `+100` and `-100` are both even money.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum OddsError {
    #[error("invalid american odds {0}: must be <= -100 or >= +100")]
    InvalidAmerican(i32),
    #[error("invalid decimal odds {0}: must be greater than 1.0")]
    InvalidDecimal(f64),
    #[error("invalid stake {0}: must be a positive finite amount")]
    InvalidStake(f64),
    #[error("invalid probability {0}: must be within (0, 1)")]
    InvalidProbability(f64),
    #[error("parlay needs at least one leg")]
    EmptyParlay,
}

pub fn validate_american(odds: i32) -> Result<(), OddsError> {
    if odds >= 100 || odds <= -100 {
        Ok(())
    } else {
        Err(OddsError::InvalidAmerican(odds))
    }
}

pub fn validate_stake(stake: f64) -> Result<(), OddsError> {
    if stake.is_finite() && stake > 0.0 {
        Ok(())
    } else {
        Err(OddsError::InvalidStake(stake))
    }
}

/// Profit (excluding the returned stake) when the bet wins.
pub fn profit_on_win(stake: f64, odds: i32) -> Result<f64, OddsError> {
    validate_american(odds)?;
    validate_stake(stake)?;
    Ok(profit_unchecked(stake, odds))
}

pub(crate) fn profit_unchecked(stake: f64, odds: i32) -> f64 {
    if odds > 0 {
        stake * f64::from(odds) / 100.0
    } else {
        stake * 100.0 / f64::from(odds).abs()
    }
}

/// Total returned on a win: stake plus profit.
pub fn payout(stake: f64, odds: i32) -> Result<f64, OddsError> {
    Ok(stake + profit_on_win(stake, odds)?)
}

pub fn american_to_decimal(odds: i32) -> Result<f64, OddsError> {
    validate_american(odds)?;
    Ok(decimal_unchecked(odds))
}

pub(crate) fn decimal_unchecked(odds: i32) -> f64 {
    1.0 + profit_unchecked(1.0, odds)
}

pub fn decimal_to_american(decimal: f64) -> Result<i32, OddsError> {
    if !decimal.is_finite() || decimal <= 1.0 {
        return Err(OddsError::InvalidDecimal(decimal));
    }
    let american = if decimal >= 2.0 {
        ((decimal - 1.0) * 100.0).round()
    } else {
        (-100.0 / (decimal - 1.0)).round()
    };
    Ok(american.clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

/// Break-even win probability implied by the price (vig included).
pub fn implied_probability(odds: i32) -> Result<f64, OddsError> {
    Ok(1.0 / american_to_decimal(odds)?)
}

pub fn probability_to_american(prob: f64) -> Result<i32, OddsError> {
    if !(prob > 0.0 && prob < 1.0) {
        return Err(OddsError::InvalidProbability(prob));
    }
    decimal_to_american(1.0 / prob)
}

/// Strips the bookmaker margin from a three-way decimal market.
pub fn no_vig(home: f64, draw: f64, away: f64) -> Option<(f64, f64, f64)> {
    if home <= 1.0 || draw <= 1.0 || away <= 1.0 {
        return None;
    }
    let ih = 1.0 / home;
    let id = 1.0 / draw;
    let ia = 1.0 / away;
    let sum = ih + id + ia;
    if sum <= 0.0 {
        return None;
    }
    Some((ih / sum, id / sum, ia / sum))
}

/// Bookmaker overround of a market, as a fraction (0.05 = 5%).
pub fn overround(decimals: &[f64]) -> Option<f64> {
    if decimals.is_empty() || decimals.iter().any(|d| *d <= 1.0) {
        return None;
    }
    Some(decimals.iter().map(|d| 1.0 / d).sum::<f64>() - 1.0)
}

/// Combined price of a parlay, back in American odds.
pub fn parlay_odds(legs: &[i32]) -> Result<i32, OddsError> {
    if legs.is_empty() {
        return Err(OddsError::EmptyParlay);
    }
    let mut combined = 1.0;
    for leg in legs {
        combined *= american_to_decimal(*leg)?;
    }
    decimal_to_american(combined)
}

/// Expected profit per unit staked.
pub fn expected_value(model_prob: f64, odds: i32) -> Result<f64, OddsError> {
    let win = profit_on_win(1.0, odds)?;
    Ok(model_prob * win - (1.0 - model_prob))
}

pub fn edge(model_prob: f64, implied_prob: f64) -> f64 {
    model_prob - implied_prob
}

/// Full Kelly fraction of bankroll; zero when the bet has no edge.
pub fn kelly_fraction(model_prob: f64, odds: i32) -> Result<f64, OddsError> {
    let b = profit_on_win(1.0, odds)?;
    let f = (b * model_prob - (1.0 - model_prob)) / b;
    Ok(f.max(0.0))
}

pub fn format_american(odds: i32) -> String {
    if odds > 0 {
        format!("+{odds}")
    } else {
        odds.to_string()
    }
}

pub fn parse_american(raw: &str) -> Result<i32, anyhow::Error> {
    let trimmed = raw.trim().trim_start_matches('+');
    let odds: i32 = trimmed
        .parse()
        .map_err(|_| anyhow::anyhow!("odds must be an integer like -150 or +200, got {raw:?}"))?;
    validate_american(odds)?;
    Ok(odds)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn positive_odds_profit_scales_from_hundred() {
        assert!(close(profit_on_win(100.0, 200).unwrap(), 200.0));
        assert!(close(profit_on_win(50.0, 150).unwrap(), 75.0));
        assert!(close(payout(50.0, 150).unwrap(), 125.0));
    }

    #[test]
    fn negative_odds_profit_scales_to_hundred() {
        assert!(close(profit_on_win(150.0, -150).unwrap(), 100.0));
        assert!(close(profit_on_win(20.0, -200).unwrap(), 10.0));
        assert!(close(payout(20.0, -200).unwrap(), 30.0));
    }

    #[test]
    fn even_money_both_signs() {
        assert!(close(profit_on_win(10.0, 100).unwrap(), 10.0));
        assert!(close(profit_on_win(10.0, -100).unwrap(), 10.0));
    }

    #[test]
    fn rejects_invalid_odds_and_stake() {
        assert_eq!(validate_american(0), Err(OddsError::InvalidAmerican(0)));
        assert_eq!(validate_american(-99), Err(OddsError::InvalidAmerican(-99)));
        assert_eq!(validate_american(99), Err(OddsError::InvalidAmerican(99)));
        assert!(profit_on_win(-5.0, 120).is_err());
        assert!(profit_on_win(f64::NAN, 120).is_err());
    }

    #[test]
    fn decimal_conversions() {
        assert!(close(american_to_decimal(200).unwrap(), 3.0));
        assert!(close(american_to_decimal(-200).unwrap(), 1.5));
        assert_eq!(decimal_to_american(3.0).unwrap(), 200);
        assert_eq!(decimal_to_american(1.5).unwrap(), -200);
        assert_eq!(decimal_to_american(2.0).unwrap(), 100);
        assert_eq!(decimal_to_american(1.91).unwrap(), -110);
        assert!(decimal_to_american(1.0).is_err());
    }

    #[test]
    fn implied_probability_matches_known_prices() {
        assert!(close(implied_probability(100).unwrap(), 0.5));
        assert!(close(implied_probability(-150).unwrap(), 0.6));
        assert!(close(implied_probability(300).unwrap(), 0.25));
        assert_eq!(probability_to_american(0.25).unwrap(), 300);
        assert!(probability_to_american(1.0).is_err());
    }

    #[test]
    fn no_vig_probs_sum_to_one() {
        let (h, d, a) = no_vig(2.10, 3.40, 3.60).expect("valid");
        assert!(close(h + d + a, 1.0));
        assert!(h > d && h > a);
        assert!(no_vig(1.0, 3.0, 3.0).is_none());
    }

    #[test]
    fn overround_of_fair_market_is_zero() {
        assert!(close(overround(&[2.0, 2.0]).unwrap(), 0.0));
        assert!(overround(&[1.91, 1.91]).unwrap() > 0.04);
    }

    #[test]
    fn parlay_multiplies_decimal_prices() {
        // 2.0 * 2.0 = 4.0 decimal
        assert_eq!(parlay_odds(&[100, 100]).unwrap(), 300);
        assert_eq!(parlay_odds(&[-200]).unwrap(), -200);
        assert_eq!(parlay_odds(&[]), Err(OddsError::EmptyParlay));
    }

    #[test]
    fn expected_value_and_kelly() {
        assert!(expected_value(0.6, 150).unwrap() > 0.0);
        assert!(expected_value(0.4, -150).unwrap() < 0.0);
        assert!(close(expected_value(0.5, 100).unwrap(), 0.0));
        // b = 1, p = 0.6 -> f = 0.2
        assert!(close(kelly_fraction(0.6, 100).unwrap(), 0.2));
        assert!(close(kelly_fraction(0.3, 100).unwrap(), 0.0));
    }

    #[test]
    fn american_text_round_trip() {
        assert_eq!(format_american(250), "+250");
        assert_eq!(format_american(-110), "-110");
        assert_eq!(parse_american("+250").unwrap(), 250);
        assert_eq!(parse_american(" -110 ").unwrap(), -110);
        assert!(parse_american("1.5").is_err());
        assert!(parse_american("50").is_err());
    }
}
