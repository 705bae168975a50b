use chrono::Utc;
use pigcoin_domain::{NamedTotal, StatsPeriod};

use crate::cli::commands::{subcommand, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::{bar, section as output_section};

const BAR_WIDTH: usize = 30;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "stats",
        "Summarize transactions or chart expenses over time",
        "stats [summary|chart [1d|7d|1m|1y]]",
        cmd_stats,
    )]
}

fn cmd_stats(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match subcommand(args) {
        (None, _) => summary(context),
        (Some(sub), rest) => match sub.as_str() {
            "summary" => summary(context),
            "chart" => chart(context, rest.first().copied()),
            other => Err(CommandError::InvalidArguments(format!(
                "unknown stats action `{}`; usage: stats [summary|chart [1d|7d|1m|1y]]",
                other
            ))),
        },
    }
}

fn summary(context: &mut ShellContext) -> CommandResult {
    let summary = context.store.summary();
    output_section("Summary");
    io::print_info(format!("  Income  : {}", context.money(summary.total_income)));
    io::print_info(format!("  Expenses: {}", context.money(summary.total_expense)));
    io::print_info(format!("  Balance : {}", context.money(summary.balance)));
    print_top(context, "Top income", &summary.top_incomes);
    print_top(context, "Top expenses", &summary.top_expenses);
    Ok(())
}

fn print_top(context: &ShellContext, title: &str, entries: &[NamedTotal]) {
    if entries.is_empty() {
        return;
    }
    io::print_info(format!("  {}:", title));
    for entry in entries {
        io::print_info(format!(
            "    {:<20} {:>14}",
            entry.name,
            context.money(entry.value)
        ));
    }
}

fn chart(context: &mut ShellContext, period: Option<&str>) -> CommandResult {
    let period = match period {
        Some(raw) => StatsPeriod::from_str(raw).ok_or_else(|| {
            CommandError::InvalidArguments(format!(
                "`{}` is not a period (1d, 7d, 1m, or 1y)",
                raw
            ))
        })?,
        None => StatsPeriod::default(),
    };
    let series = context.store.expense_series(period, Utc::now());
    let peak = series.iter().map(|point| point.value).fold(0.0, f64::max);

    output_section(format!("Expenses ({})", period));
    for point in &series {
        io::print_info(format!(
            "  {:>6} {:<width$} {}",
            point.label,
            bar(point.value, peak, BAR_WIDTH),
            context.money(point.value),
            width = BAR_WIDTH
        ));
    }
    Ok(())
}
