use pigcoin_config::Config;

use crate::cli::commands::{subcommand, CommandDefinition};
use crate::cli::core::{CommandError, CommandResult, ShellContext};
use crate::cli::io;
use crate::cli::output::section as output_section;

pub(crate) fn definitions() -> Vec<CommandDefinition> {
    vec![CommandDefinition::new(
        "config",
        "View and change preferences",
        "config [show|get <key>|set <key> <value>]",
        cmd_config,
    )]
}

fn cmd_config(context: &mut ShellContext, args: &[&str]) -> CommandResult {
    match subcommand(args) {
        (None, _) => show(context),
        (Some(sub), rest) => match sub.as_str() {
            "show" => show(context),
            "get" => {
                let key = rest.first().ok_or_else(|| {
                    CommandError::InvalidArguments("usage: config get <key>".into())
                })?;
                io::print_info(format!("{} = {}", key, context.config.get(key)?));
                Ok(())
            }
            "set" => {
                if rest.is_empty() {
                    return Err(CommandError::InvalidArguments(format!(
                        "usage: config set <{}> <value>",
                        Config::KEYS.join("|")
                    )));
                }
                let value = rest[1..].join(" ");
                context.config.set(rest[0], &value)?;
                context.save_config()?;
                io::print_success(format!("Setting `{}` saved.", rest[0]));
                if matches!(rest[0], "data_dir" | "transactions_key" | "goals_key") {
                    io::print_hint("Storage changes apply the next time PigCoin starts.");
                }
                Ok(())
            }
            other => Err(CommandError::InvalidArguments(format!(
                "unknown config action `{}`",
                other
            ))),
        },
    }
}

fn show(context: &mut ShellContext) -> CommandResult {
    output_section("Configuration");
    io::print_info(format!(
        "  {:<17}: {}",
        "file",
        context.config_manager.config_path().display()
    ));
    io::print_info(format!(
        "  {:<17}: {}",
        "data",
        context.config_manager.data_dir(&context.config).display()
    ));
    for key in Config::KEYS {
        let value = context.config.get(key)?;
        io::print_info(format!(
            "  {:<17}: {}",
            key,
            if value.is_empty() { "-" } else { value.as_str() }
        ));
    }
    Ok(())
}
