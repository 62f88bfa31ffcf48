//! Threshold alert rules and their evaluation.
//!
//! Rules are immutable once created and live in the session's ordered list;
//! events are produced transiently on each refresh for the caller to present
//! and are never stored.

use chrono::NaiveDate;

use crate::{metrics::MetricsTable, store::BarStore};

/// Opaque identifier for a rule within one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RuleId(pub u64);

/// A user-defined alert threshold rule.
///
/// At least one threshold is set; `anchor_date` records the day the rule was
/// created against and does not restrict the evaluated range.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRule {
    /// Session-scoped identifier.
    pub id: RuleId,
    /// Fires when a day's volatility is present and strictly above this.
    pub volatility_threshold: Option<f64>,
    /// Fires when `|performance_pct|` is strictly above this.
    pub performance_threshold: Option<f64>,
    /// The day the rule was anchored to when created.
    pub anchor_date: NaiveDate,
}

/// One firing of one rule on one date.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEvent {
    /// The day that crossed a threshold.
    pub date: NaiveDate,
    /// The rule that fired.
    pub rule: AlertRule,
    /// The day's volatility, when the volatility threshold was crossed.
    pub observed_volatility: Option<f64>,
    /// The day's performance percent, when the performance threshold was
    /// crossed.
    pub observed_performance_pct: Option<f64>,
}

/// Scans every date in the store against every rule.
///
/// Pure and reentrant: runs over the full loaded range on each refresh, so a
/// changed rule set retroactively re-evaluates history already loaded.
/// Each (rule, date) crossing is a distinct event; several rules may fire on
/// the same day.
pub fn evaluate(store: &BarStore, metrics: &MetricsTable, rules: &[AlertRule]) -> Vec<AlertEvent> {
    let mut events = Vec::new();

    for bar in store.bars() {
        let volatility = metrics.volatility(bar.date);
        let performance_pct = bar.performance_pct();

        for rule in rules {
            let observed_volatility = match (rule.volatility_threshold, volatility) {
                (Some(threshold), Some(value)) if value > threshold => Some(value),
                _ => None,
            };
            let observed_performance_pct = rule
                .performance_threshold
                .and_then(|threshold| (performance_pct.abs() > threshold).then_some(performance_pct));

            if observed_volatility.is_some() || observed_performance_pct.is_some() {
                events.push(AlertEvent {
                    date: bar.date,
                    rule: rule.clone(),
                    observed_volatility,
                    observed_performance_pct,
                });
            }
        }
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::DailyBar;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn store(opens: &[f64], closes: &[f64]) -> BarStore {
        let bars = opens
            .iter()
            .zip(closes)
            .enumerate()
            .map(|(i, (&open, &close))| DailyBar {
                date: date(i as u32 + 1),
                open,
                high: open.max(close),
                low: open.min(close),
                close,
                volume: 1.0,
            })
            .collect();
        BarStore::from_bars("BTCUSDT", date(1), date(opens.len() as u32), bars).unwrap()
    }

    fn rule(
        id: u64,
        volatility_threshold: Option<f64>,
        performance_threshold: Option<f64>,
    ) -> AlertRule {
        AlertRule {
            id: RuleId(id),
            volatility_threshold,
            performance_threshold,
            anchor_date: date(1),
        }
    }

    #[test]
    fn absent_volatility_never_fires() {
        // Four bars: the 5-bar volatility window never fills.
        let store = store(&[100.0; 4], &[150.0; 4]);
        let metrics = MetricsTable::compute(&store);
        let events = evaluate(&store, &metrics, &[rule(1, Some(0.0001), None)]);
        assert!(events.is_empty());
    }

    #[test]
    fn performance_threshold_uses_absolute_value() {
        // Day 2 drops 5%: |−5| > 4 fires.
        let store = store(&[100.0, 100.0], &[100.0, 95.0]);
        let metrics = MetricsTable::compute(&store);
        let events = evaluate(&store, &metrics, &[rule(1, None, Some(4.0))]);
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].date, date(2));
        assert_eq!(events[0].observed_performance_pct, Some(-5.0));
        assert_eq!(events[0].observed_volatility, None);
    }

    #[test]
    fn each_rule_fires_independently_on_the_same_date() {
        let store = store(&[100.0, 100.0], &[100.0, 110.0]);
        let metrics = MetricsTable::compute(&store);
        let rules = [rule(1, None, Some(5.0)), rule(2, None, Some(9.0))];
        let events = evaluate(&store, &metrics, &rules);
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].rule.id, RuleId(1));
        assert_eq!(events[1].rule.id, RuleId(2));
        assert_eq!(events[0].date, events[1].date);
    }

    #[test]
    fn threshold_is_strict() {
        // Exactly at the threshold does not fire.
        let store = store(&[100.0, 100.0], &[100.0, 104.0]);
        let metrics = MetricsTable::compute(&store);
        let events = evaluate(&store, &metrics, &[rule(1, None, Some(4.0))]);
        assert!(events.is_empty());
    }
}
