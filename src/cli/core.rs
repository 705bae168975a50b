use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};
use strsim::levenshtein;
use thiserror::Error;
use uuid::Uuid;

use pigcoin_config::{default_home, Config, ConfigError, ConfigManager};
use pigcoin_core::CoreError;
use pigcoin_domain::{Goal, Transaction};

use crate::cli::commands::{all_definitions, CommandDefinition, CommandRegistry};
use crate::cli::io as cli_io;
use crate::cli::output;
use crate::errors::CliError;
use crate::store::FinanceStore;

pub type CommandResult = Result<(), CommandError>;

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("{0}")]
    InvalidArguments(String),
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Dialoguer(#[from] dialoguer::Error),
    #[error("exit requested")]
    ExitRequested,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CliMode {
    Interactive,
    Script,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopControl {
    Continue,
    Exit,
}

pub struct ShellContext {
    pub(crate) mode: CliMode,
    pub(crate) registry: CommandRegistry,
    pub(crate) store: FinanceStore,
    pub(crate) config: Config,
    pub(crate) config_manager: ConfigManager,
    pub(crate) theme: ColorfulTheme,
}

impl ShellContext {
    /// Loads configuration and data from the PigCoin home directory.
    pub fn new(mode: CliMode) -> Result<Self, CliError> {
        let config_manager = ConfigManager::with_base_dir(default_home())?;
        let config = config_manager.load()?;
        crate::init_with_filter(config.log_filter.as_deref());
        let store = FinanceStore::from_config(&config_manager, &config)?;
        Ok(Self::with_parts(mode, store, config, config_manager))
    }

    pub fn with_parts(
        mode: CliMode,
        store: FinanceStore,
        config: Config,
        config_manager: ConfigManager,
    ) -> Self {
        let context = Self {
            mode,
            registry: CommandRegistry::new(all_definitions()),
            store,
            config,
            config_manager,
            theme: ColorfulTheme::default(),
        };
        context.apply_output_preferences();
        context
    }

    pub(crate) fn apply_output_preferences(&self) {
        output::set_color_enabled(self.config.ui_color_enabled && self.mode == CliMode::Interactive);
    }

    pub(crate) fn command_names(&self) -> Vec<&'static str> {
        self.registry.names().collect()
    }

    pub(crate) fn command(&self, name: &str) -> Option<&CommandDefinition> {
        self.registry.get(name)
    }

    pub(crate) fn prompt(&self) -> String {
        format!(
            "pigcoin [{}]> ",
            self.config.format_amount(self.store.total_balance())
        )
    }

    pub(crate) fn dispatch(
        &mut self,
        command: &str,
        raw: &str,
        args: &[&str],
    ) -> Result<LoopControl, CommandError> {
        let handler = self.registry.get(command).map(|definition| definition.handler);
        if let Some(handler) = handler {
            match handler(self, args) {
                Ok(()) => Ok(LoopControl::Continue),
                Err(CommandError::ExitRequested) => Ok(LoopControl::Exit),
                Err(err) => Err(err),
            }
        } else {
            self.suggest_command(raw);
            Ok(LoopControl::Continue)
        }
    }

    pub(crate) fn suggest_command(&self, input: &str) {
        cli_io::print_warning(format!(
            "Unknown command `{}`. Type `help` to see available commands.",
            input
        ));

        let best = self
            .registry
            .names()
            .map(|name| (levenshtein(name, input), name))
            .min_by_key(|(distance, _)| *distance);

        if let Some((distance, name)) = best {
            if distance <= 3 {
                cli_io::print_info(format!("Suggestion: `{}`?", name));
            }
        }
    }

    pub(crate) fn confirm_exit(&self) -> Result<bool, CliError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        Ok(Confirm::with_theme(&self.theme)
            .with_prompt("Exit PigCoin?")
            .default(true)
            .interact()?)
    }

    /// Asks before destructive actions; scripts always proceed.
    pub(crate) fn confirm(&self, prompt: &str) -> Result<bool, CommandError> {
        if self.mode == CliMode::Script {
            return Ok(true);
        }
        cli_io::confirm_action(&self.theme, prompt, false)
    }

    pub(crate) fn report_error(&self, err: CommandError) {
        match err {
            CommandError::ExitRequested => {}
            CommandError::InvalidArguments(message) => {
                cli_io::print_error(message);
                cli_io::print_hint("Use `help <command>` for usage details.");
            }
            CommandError::Core(CoreError::GoalAlreadyReached(_)) => {
                cli_io::print_warning("That goal has already reached its target.");
            }
            other => cli_io::print_error(other),
        }
    }

    /// Persists the in-memory configuration.
    pub(crate) fn save_config(&self) -> CommandResult {
        self.config_manager.save(&self.config)?;
        self.apply_output_preferences();
        Ok(())
    }

    pub(crate) fn money(&self, value: f64) -> String {
        self.config.format_amount(value)
    }

    /// Resolves a goal by list position (1-based) or id prefix.
    pub(crate) fn resolve_goal(&self, reference: &str) -> Result<Goal, CommandError> {
        resolve(self.store.goals(), reference, |goal| goal.id)
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!("no goal matches `{}`", reference))
            })
    }

    /// Resolves a transaction by list position (1-based) or id prefix.
    pub(crate) fn resolve_transaction(&self, reference: &str) -> Result<Transaction, CommandError> {
        resolve(self.store.transactions(), reference, |txn| txn.id)
            .cloned()
            .ok_or_else(|| {
                CommandError::InvalidArguments(format!("no transaction matches `{}`", reference))
            })
    }
}

fn resolve<'a, T>(items: &'a [T], reference: &str, id_of: impl Fn(&T) -> Uuid) -> Option<&'a T> {
    let reference = reference.trim();
    if let Ok(position) = reference.parse::<usize>() {
        return position.checked_sub(1).and_then(|index| items.get(index));
    }
    let needle = reference.to_ascii_lowercase();
    if needle.len() < 4 {
        return None;
    }
    let mut matches = items
        .iter()
        .filter(|item| id_of(item).to_string().starts_with(&needle));
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first)
}
