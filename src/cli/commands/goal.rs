use pigcoin_core::{parse_amount, parse_signed_amount, GoalUpdate};
use pigcoin_domain::ScheduleKind;

use crate::cli::commands::{subcommand, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;

const USAGE: &str = "goal [list|new <name> <total> <grid|fixed|free> [unit]|show <goal>|\
pay <goal> <number> [value]|progress <goal> <amount>|adjust <goal> <+/-amount>|\
delete <goal>|totals]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "goal",
        "Create savings goals and track their installments",
        USAGE,
        cmd_goal,
    )]
}

fn cmd_goal(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match subcommand(args) {
        (None, _) => list(context),
        (Some(sub), rest) => match sub.as_str() {
            "list" | "ls" => list(context),
            "new" | "add" => create(context, rest),
            "show" => show(context, rest),
            "pay" | "toggle" => toggle(context, rest),
            "progress" => progress(context, rest),
            "adjust" => adjust(context, rest),
            "delete" | "rm" => delete(context, rest),
            "totals" => totals(context),
            other => Err(CommandError::InvalidArguments(format!(
                "unknown goal action `{}`; usage: {}",
                other, USAGE
            ))),
        },
    }
}

fn usage(text: &str) -> CommandError {
    CommandError::InvalidArguments(format!("usage: {}", text))
}

fn create(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(usage("goal new <name> <total> <grid|fixed|free> [unit]"));
    }
    let total = parse_amount(args[1])?;
    let kind = ScheduleKind::from_str(args[2]).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "`{}` is not a goal type (grid, fixed, or free)",
            args[2]
        ))
    })?;
    let unit = match args.get(3) {
        Some(raw) => Some(parse_amount(raw)?),
        None => None,
    };
    let goal = context.store.create_goal(args[0], total, kind, unit)?;
    io::print_success(format!(
        "Goal created: {} ({}, {} installments, target {})",
        goal.name,
        goal.kind,
        goal.installments.len(),
        context.money(goal.total_value)
    ));
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    output_section("Goals");
    let goals = context.store.goals();
    if goals.is_empty() {
        io::print_info("No goals yet. Try `goal new Trip 500 grid`.");
        return Ok(());
    }
    for (index, goal) in goals.iter().enumerate() {
        let slots = if goal.kind.uses_installments() {
            format!("{}/{} paid", goal.paid_count(), goal.installments.len())
        } else {
            String::from("jar")
        };
        io::print_info(format!(
            "  {:>3}. {:<20} {:<6} {:>14} / {:<14} {:>5.1}%  {:<12} {}",
            index + 1,
            goal.name,
            goal.kind,
            context.money(goal.current_value),
            context.money(goal.total_value),
            goal.progress_percent(),
            slots,
            &goal.id.to_string()[..8]
        ));
    }
    Ok(())
}

fn show(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args.first().ok_or_else(|| usage("goal show <goal>"))?;
    let goal = context.resolve_goal(reference)?;
    output_section(format!("Goal: {}", goal.name));
    io::print_info(format!("  Type      : {}", goal.kind));
    io::print_info(format!("  Saved     : {}", context.money(goal.current_value)));
    io::print_info(format!("  Target    : {}", context.money(goal.total_value)));
    io::print_info(format!("  Remaining : {}", context.money(goal.remaining())));
    io::print_info(format!("  Created   : {}", goal.created_at.format("%Y-%m-%d")));
    if goal.installments.is_empty() {
        return Ok(());
    }
    io::print_info(format!(
        "  Installments ({} paid, {} scheduled):",
        goal.paid_count(),
        context.money(goal.scheduled_sum())
    ));
    for installment in &goal.installments {
        io::print_info(format!(
            "    [{}] #{:<4} {}",
            if installment.paid { "x" } else { " " },
            installment.number,
            context.money(installment.value)
        ));
    }
    Ok(())
}

fn toggle(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(usage("goal pay <goal> <number> [value]"));
    }
    let goal = context.resolve_goal(args[0])?;
    let number: u32 = args[1].parse().map_err(|_| {
        CommandError::InvalidArguments(format!("`{}` is not an installment number", args[1]))
    })?;
    let value = match args.get(2) {
        Some(raw) => Some(parse_amount(raw)?),
        None => None,
    };
    let update = context.store.toggle_installment(goal.id, number, value)?;
    let paid = update
        .goal
        .installment(number)
        .map(|installment| installment.paid)
        .unwrap_or(false);
    io::print_success(format!(
        "Installment #{} of {} marked {}.",
        number,
        update.goal.name,
        if paid { "paid" } else { "unpaid" }
    ));
    report_progress(context, &update);
    Ok(())
}

fn progress(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(usage("goal progress <goal> <amount>"));
    }
    let goal = context.resolve_goal(args[0])?;
    let amount = parse_amount(args[1])?;
    let update = context.store.add_progress(goal.id, amount)?;
    io::print_success(format!("Progress added to {}.", update.goal.name));
    report_progress(context, &update);
    Ok(())
}

fn adjust(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 2 {
        return Err(usage("goal adjust <goal> <+/-amount>"));
    }
    let goal = context.resolve_goal(args[0])?;
    let delta = parse_signed_amount(args[1])?;
    let update = context.store.update_goal_amount(goal.id, delta)?;
    io::print_success(format!("{} updated.", update.goal.name));
    report_progress(context, &update);
    Ok(())
}

fn delete(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args.first().ok_or_else(|| usage("goal delete <goal>"))?;
    let goal = context.resolve_goal(reference)?;
    if !context.confirm(&format!("Delete goal `{}`?", goal.name))? {
        io::print_info("Nothing deleted.");
        return Ok(());
    }
    if context.store.delete_goal(goal.id).is_some() {
        io::print_success(format!("Goal deleted: {}", goal.name));
    }
    Ok(())
}

fn totals(context: &mut ShellContext) -> CommandResult {
    let totals = context.store.goal_totals();
    output_section("Savings");
    io::print_info(format!(
        "  Saved {} of {}",
        context.money(totals.total_current),
        context.money(totals.total_target)
    ));
    for share in context.store.goal_allocation() {
        io::print_info(format!(
            "  {:<20} {:>14} {:>5.1}%",
            share.name,
            context.money(share.current_value),
            share.percent
        ));
    }
    Ok(())
}

fn report_progress(context: &ShellContext, update: &GoalUpdate) {
    io::print_info(format!(
        "  {} of {} ({:.1}%)",
        context.money(update.goal.current_value),
        context.money(update.goal.total_value),
        update.goal.progress_percent()
    ));
    if update.completed {
        io::print_success(format!("Goal reached: {}!", update.goal.name));
    }
}
