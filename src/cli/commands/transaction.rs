use pigcoin_core::parse_amount;
use pigcoin_domain::TransactionKind;

use crate::cli::commands::{subcommand, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;

const USAGE: &str = "transaction [list|add <income|expense> <amount> <name>|remove <#|id>]";

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "transaction",
            "Record, list, or remove income and expenses",
            USAGE,
            cmd_transaction,
        ),
        CommandDefinition::new(
            "balance",
            "Show income minus expenses",
            "balance",
            cmd_balance,
        ),
    ]
}

fn cmd_transaction(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match subcommand(args) {
        (None, _) => list(context),
        (Some(sub), rest) => match sub.as_str() {
            "list" | "ls" => list(context),
            "add" => add(context, rest),
            "remove" | "rm" => remove(context, rest),
            other => Err(CommandError::InvalidArguments(format!(
                "unknown transaction action `{}`; usage: {}",
                other, USAGE
            ))),
        },
    }
}

fn add(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if args.len() < 3 {
        return Err(CommandError::InvalidArguments(
            "usage: transaction add <income|expense> <amount> <name>".into(),
        ));
    }
    let kind = TransactionKind::from_str(args[0]).ok_or_else(|| {
        CommandError::InvalidArguments(format!(
            "`{}` is not a transaction type (income or expense)",
            args[0]
        ))
    })?;
    let value = parse_amount(args[1])?;
    let name = args[2..].join(" ");
    let txn = context.store.add_transaction(&name, value, kind)?;
    io::print_success(format!(
        "Transaction recorded: {} {} ({})",
        txn.name,
        context.money(txn.value),
        txn.kind
    ));
    Ok(())
}

fn remove(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let reference = args.first().ok_or_else(|| {
        CommandError::InvalidArguments("usage: transaction remove <#|id>".into())
    })?;
    let txn = context.resolve_transaction(reference)?;
    if !context.confirm(&format!("Remove transaction `{}`?", txn.name))? {
        io::print_info("Nothing removed.");
        return Ok(());
    }
    if context.store.remove_transaction(txn.id).is_some() {
        io::print_success(format!("Transaction removed: {}", txn.name));
    }
    Ok(())
}

fn list(context: &mut ShellContext) -> CommandResult {
    output_section("Transactions");
    let transactions = context.store.transactions();
    if transactions.is_empty() {
        io::print_info("No transactions yet.");
        return Ok(());
    }
    for (index, txn) in transactions.iter().enumerate() {
        io::print_info(format!(
            "  {:>3}. {}  {:<8} {:<24} {:>14}  {}",
            index + 1,
            txn.date.format("%Y-%m-%d %H:%M"),
            txn.kind,
            txn.name,
            context.money(txn.signed_value()),
            &txn.id.to_string()[..8]
        ));
    }
    Ok(())
}

fn cmd_balance(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    io::print_info(format!(
        "Balance: {}",
        context.money(context.store.total_balance())
    ));
    Ok(())
}
