//! Derived figures for summary and chart views.
//!
//! Every series is bucketed in UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, TimeZone, Timelike, Utc};

use pigcoin_domain::{
    NamedTotal, SeriesPoint, StatsPeriod, Transaction, TransactionKind, TransactionSummary,
};

/// Entries kept in each top-by-name list.
pub const TOP_ENTRIES: usize = 5;

const MONTH_LABELS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Day-of-month ranges for the month view, inclusive on both ends.
const MONTH_BUCKETS: [(u32, u32); 6] = [(1, 5), (6, 10), (11, 15), (16, 20), (21, 25), (26, 31)];

pub struct StatisticsService;

impl StatisticsService {
    pub fn summarize(transactions: &[Transaction]) -> TransactionSummary {
        let total_income = sum_kind(transactions, TransactionKind::Income);
        let total_expense = sum_kind(transactions, TransactionKind::Expense);
        TransactionSummary {
            total_income,
            total_expense,
            balance: total_income - total_expense,
            top_incomes: top_by_name(transactions, TransactionKind::Income, TOP_ENTRIES),
            top_expenses: top_by_name(transactions, TransactionKind::Expense, TOP_ENTRIES),
        }
    }

    /// Expenses bucketed over the window ending at `now`.
    ///
    /// * `Day`: seven points at hours 0, 4, .., 24 since midnight, each summing
    ///   the hours in `(h - 4, h]`.
    /// * `Week`: one point per calendar day for the last seven days.
    /// * `Month`: five-day ranges by day of month over the last month.
    /// * `Year`: one point per calendar month over the last twelve months.
    pub fn expense_series(
        transactions: &[Transaction],
        period: StatsPeriod,
        now: DateTime<Utc>,
    ) -> Vec<SeriesPoint> {
        let start = period_start(period, now);
        let expenses: Vec<&Transaction> = transactions
            .iter()
            .filter(|txn| txn.is_expense() && txn.date >= start && txn.date <= now)
            .collect();

        match period {
            StatsPeriod::Day => (0..=6)
                .map(|step| {
                    let hour = step * 4;
                    let value = sum_where(&expenses, |txn| {
                        let h = txn.date.hour() as i32;
                        h <= hour && h > hour - 4
                    });
                    point(format!("{:02}h", hour), value)
                })
                .collect(),
            StatsPeriod::Week => (0..7)
                .rev()
                .map(|days_back| {
                    let day = now.date_naive() - Duration::days(days_back);
                    let value = sum_where(&expenses, |txn| txn.date.date_naive() == day);
                    point(day.format("%a").to_string(), value)
                })
                .collect(),
            StatsPeriod::Month => MONTH_BUCKETS
                .iter()
                .map(|&(first, last)| {
                    let value = sum_where(&expenses, |txn| {
                        let day = txn.date.day();
                        day >= first && day <= last
                    });
                    point(format!("{}-{}", first, last), value)
                })
                .collect(),
            StatsPeriod::Year => MONTH_LABELS
                .iter()
                .enumerate()
                .map(|(index, label)| {
                    let value = sum_where(&expenses, |txn| txn.date.month0() as usize == index);
                    point(label.to_string(), value)
                })
                .collect(),
        }
    }
}

fn period_start(period: StatsPeriod, now: DateTime<Utc>) -> DateTime<Utc> {
    let midnight = |date: chrono::NaiveDate| Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN));
    match period {
        StatsPeriod::Day => midnight(now.date_naive()),
        StatsPeriod::Week => midnight(now.date_naive() - Duration::days(6)),
        StatsPeriod::Month => now.checked_sub_months(Months::new(1)).unwrap_or(now),
        StatsPeriod::Year => now.checked_sub_months(Months::new(12)).unwrap_or(now),
    }
}

fn point(label: String, value: f64) -> SeriesPoint {
    SeriesPoint { label, value }
}

fn sum_where<F>(transactions: &[&Transaction], predicate: F) -> f64
where
    F: Fn(&Transaction) -> bool,
{
    transactions
        .iter()
        .filter(|txn| predicate(txn))
        .map(|txn| txn.value)
        .sum()
}

fn sum_kind(transactions: &[Transaction], kind: TransactionKind) -> f64 {
    transactions
        .iter()
        .filter(|txn| txn.kind == kind)
        .map(|txn| txn.value)
        .sum()
}

/// Groups by name, largest first; equal totals fall back to name order.
fn top_by_name(transactions: &[Transaction], kind: TransactionKind, limit: usize) -> Vec<NamedTotal> {
    let mut grouped: BTreeMap<&str, f64> = BTreeMap::new();
    for txn in transactions.iter().filter(|txn| txn.kind == kind) {
        *grouped.entry(txn.name.as_str()).or_insert(0.0) += txn.value;
    }
    let mut totals: Vec<NamedTotal> = grouped
        .into_iter()
        .map(|(name, value)| NamedTotal {
            name: name.to_string(),
            value,
        })
        .collect();
    totals.sort_by(|a, b| b.value.total_cmp(&a.value).then_with(|| a.name.cmp(&b.name)));
    totals.truncate(limit);
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn expense(name: &str, value: f64, date: DateTime<Utc>) -> Transaction {
        Transaction::with_date(name, value, TransactionKind::Expense, date)
    }

    fn income(name: &str, value: f64) -> Transaction {
        Transaction::with_date(name, value, TransactionKind::Income, at(2024, 5, 1, 9))
    }

    fn values(points: &[SeriesPoint]) -> Vec<f64> {
        points.iter().map(|point| point.value).collect()
    }

    #[test]
    fn summary_groups_and_ranks_by_name() {
        let when = at(2024, 5, 1, 12);
        let mut transactions = vec![
            income("Salary", 500.0),
            income("Salary", 250.0),
            income("Gift", 40.0),
            expense("Rent", 300.0, when),
            expense("Food", 50.0, when),
            expense("Food", 25.0, when),
            expense("Bus", 75.0, when),
        ];
        for (index, name) in ["A", "B", "C", "D"].iter().enumerate() {
            transactions.push(expense(name, 1.0 + index as f64, when));
        }

        let summary = StatisticsService::summarize(&transactions);
        assert_eq!(summary.total_income, 790.0);
        assert_eq!(summary.total_expense, 460.0);
        assert_eq!(summary.balance, 330.0);
        assert_eq!(summary.top_incomes[0].name, "Salary");
        assert_eq!(summary.top_incomes[0].value, 750.0);

        let names: Vec<&str> = summary.top_expenses.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Rent", "Bus", "Food", "D", "C"]);
    }

    #[test]
    fn empty_summary_is_zeroed() {
        let summary = StatisticsService::summarize(&[]);
        assert_eq!(summary, TransactionSummary::default());
    }

    #[test]
    fn day_series_uses_four_hour_buckets() {
        let now = at(2024, 5, 10, 23);
        let transactions = vec![
            expense("Coffee", 3.0, at(2024, 5, 10, 0)),
            expense("Lunch", 12.0, at(2024, 5, 10, 12)),
            expense("Snack", 2.0, at(2024, 5, 10, 9)),
            expense("Dinner", 20.0, at(2024, 5, 10, 21)),
            expense("Yesterday", 99.0, at(2024, 5, 9, 22)),
            income("Salary", 500.0),
        ];
        let series = StatisticsService::expense_series(&transactions, StatsPeriod::Day, now);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].label, "00h");
        assert_eq!(series[6].label, "24h");
        assert_eq!(values(&series), vec![3.0, 0.0, 0.0, 14.0, 0.0, 0.0, 20.0]);
    }

    #[test]
    fn week_series_covers_last_seven_days() {
        let now = at(2024, 5, 10, 18);
        let transactions = vec![
            expense("Today", 5.0, at(2024, 5, 10, 8)),
            expense("Oldest", 7.0, at(2024, 5, 4, 1)),
            expense("Too old", 100.0, at(2024, 5, 3, 23)),
        ];
        let series = StatisticsService::expense_series(&transactions, StatsPeriod::Week, now);
        assert_eq!(series.len(), 7);
        assert_eq!(series[6].label, "Fri");
        assert_eq!(values(&series), vec![7.0, 0.0, 0.0, 0.0, 0.0, 0.0, 5.0]);
    }

    #[test]
    fn month_series_buckets_by_day_of_month() {
        let now = at(2024, 5, 31, 12);
        let transactions = vec![
            expense("Start", 1.0, at(2024, 5, 1, 10)),
            expense("Fifth", 2.0, at(2024, 5, 5, 10)),
            expense("Sixth", 4.0, at(2024, 5, 6, 10)),
            expense("Last", 8.0, at(2024, 5, 31, 10)),
            expense("Too old", 50.0, at(2024, 4, 20, 10)),
        ];
        let series = StatisticsService::expense_series(&transactions, StatsPeriod::Month, now);
        assert_eq!(series.last().map(|p| p.label.as_str()), Some("26-31"));
        assert_eq!(values(&series), vec![3.0, 4.0, 0.0, 0.0, 0.0, 8.0]);
    }

    #[test]
    fn year_series_has_twelve_months() {
        let now = at(2024, 6, 15, 12);
        let transactions = vec![
            expense("Jan", 10.0, at(2024, 1, 3, 10)),
            expense("Dec", 6.0, at(2023, 12, 24, 10)),
            expense("Too old", 80.0, at(2023, 5, 1, 10)),
        ];
        let series = StatisticsService::expense_series(&transactions, StatsPeriod::Year, now);
        assert_eq!(series.len(), 12);
        assert_eq!(series[0].label, "Jan");
        assert_eq!(series[0].value, 10.0);
        assert_eq!(series[11].value, 6.0);
        assert_eq!(series[4].value, 0.0);
    }
}
