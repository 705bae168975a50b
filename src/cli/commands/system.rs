use std::{fs, io as std_io, path::Path};

use chrono::{DateTime, Utc};
use serde::Serialize;

use pigcoin_domain::{Goal, Transaction};

use crate::cli::commands::CommandDefinition;
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::help;
use crate::cli::io;
use crate::cli::output::section as output_section;
use crate::utils::build_info;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![
        CommandDefinition::new(
            "help",
            "Show available commands",
            "help [command]",
            cmd_help,
        ),
        CommandDefinition::new("version", "Show build metadata", "version", cmd_version),
        CommandDefinition::new(
            "save",
            "Write all data to disk now",
            "save",
            cmd_save,
        ),
        CommandDefinition::new(
            "export",
            "Write transactions and goals to a single JSON file",
            "export <path>",
            cmd_export,
        ),
        CommandDefinition::new("exit", "Exit the shell", "exit", cmd_exit),
    ]
}

fn cmd_help(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    if let Some(name) = args.first().map(|name| name.to_lowercase()) {
        if let Some(command) = context.command(&name) {
            help::print_command(command);
        } else {
            context.suggest_command(args[0]);
        }
        return Ok(());
    }

    help::print_overview(&context.registry);
    Ok(())
}

fn cmd_version(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    let meta = build_info::current();
    output_section(format!("PigCoin {}", meta.version));
    io::print_info(format!(
        "  Build hash   : {} ({})",
        meta.git_hash, meta.git_status
    ));
    io::print_info(format!("  Built at     : {}", meta.timestamp));
    io::print_info(format!("  Target       : {}", meta.target));
    io::print_info(format!("  Profile      : {}", meta.profile));
    io::print_info(format!("  Rustc        : {}", meta.rustc));
    Ok(())
}

fn cmd_save(context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    context.store.flush()?;
    io::print_success("All data saved.");
    Ok(())
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ExportSnapshot<'a> {
    exported_at: DateTime<Utc>,
    balance: f64,
    transactions: &'a [Transaction],
    goals: &'a [Goal],
}

fn cmd_export(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    let path = args
        .first()
        .map(Path::new)
        .ok_or_else(|| CommandError::InvalidArguments("usage: export <path>".into()))?;
    let snapshot = ExportSnapshot {
        exported_at: Utc::now(),
        balance: context.store.total_balance(),
        transactions: context.store.transactions(),
        goals: context.store.goals(),
    };
    let json = serde_json::to_string_pretty(&snapshot).map_err(std_io::Error::from)?;
    fs::write(path, json)?;
    io::print_success(format!("Exported to {}", path.display()));
    Ok(())
}

fn cmd_exit(_context: &mut ShellContext, _args: &[&str]) -> CommandResult {
    Err(CommandError::ExitRequested)
}
