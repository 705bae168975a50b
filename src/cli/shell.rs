use std::io::{self, BufRead};

use rustyline::{
    completion::{Completer, Pair},
    error::ReadlineError,
    highlight::Highlighter,
    hint::Hinter,
    history::DefaultHistory,
    validate::Validator,
    Cmd, Context as ReadlineContext, Editor, Helper, KeyEvent,
};
use shell_words::split;

use pigcoin_config::Config;

use crate::cli::core::{CliMode, LoopControl, ShellContext};
use crate::cli::output::{info as output_info, warning as output_warning};
use crate::errors::CliError;

/// Set to any value to read commands from stdin without prompts.
pub const SCRIPT_ENV: &str = "PIGCOIN_CLI_SCRIPT";

const TRANSACTION_ACTIONS: &[&str] = &["list", "add", "remove"];
const TRANSACTION_KINDS: &[&str] = &["income", "expense"];
const GOAL_ACTIONS: &[&str] = &[
    "list", "new", "show", "pay", "progress", "adjust", "delete", "totals",
];
const GOAL_KINDS: &[&str] = &["grid", "fixed", "free"];
const STATS_ACTIONS: &[&str] = &["summary", "chart"];
const STATS_PERIODS: &[&str] = &["1d", "7d", "1m", "1y"];
const CONFIG_ACTIONS: &[&str] = &["show", "get", "set"];

pub fn run_cli() -> Result<(), CliError> {
    let mode = if std::env::var_os(SCRIPT_ENV).is_some() {
        CliMode::Script
    } else {
        CliMode::Interactive
    };

    let mut context = ShellContext::new(mode)?;
    let outcome = match mode {
        CliMode::Interactive => run_interactive(&mut context),
        CliMode::Script => run_script(&mut context),
    };
    if context.store.has_pending_changes() {
        context.store.flush()?;
    }
    outcome
}

fn run_interactive(context: &mut ShellContext) -> Result<(), CliError> {
    let mut editor = Editor::<CommandHelper, DefaultHistory>::new()?;
    editor.set_helper(Some(CommandHelper::new(context.command_names())));
    editor.bind_sequence(KeyEvent::from('?'), Cmd::Complete);

    loop {
        match editor.readline(&context.prompt()) {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                editor.add_history_entry(trimmed).ok();
                if handle_line(context, trimmed) == LoopControl::Exit {
                    break;
                }
            }
            Err(ReadlineError::Interrupted) => {
                if context.confirm_exit()? {
                    break;
                }
            }
            Err(ReadlineError::Eof) => {
                output_info("Goodbye.");
                break;
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}

/// Runs one command per stdin line. Blank lines and `#` comments are skipped.
fn run_script(context: &mut ShellContext) -> Result<(), CliError> {
    for line in io::stdin().lock().lines() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        if handle_line(context, trimmed) == LoopControl::Exit {
            break;
        }
    }
    Ok(())
}

/// Dispatches a single line, reporting failures without ending the session.
fn handle_line(context: &mut ShellContext, line: &str) -> LoopControl {
    let tokens = match split(line) {
        Ok(tokens) => tokens,
        Err(err) => {
            output_warning(format!("Could not read `{}`: {}", line, err));
            return LoopControl::Continue;
        }
    };
    let Some((raw, rest)) = tokens.split_first() else {
        return LoopControl::Continue;
    };

    let command = raw.to_lowercase();
    let args: Vec<&str> = rest.iter().map(String::as_str).collect();
    match context.dispatch(&command, raw, &args) {
        Ok(control) => control,
        Err(err) => {
            context.report_error(err);
            LoopControl::Continue
        }
    }
}

/// Completes command names, their actions, and the fixed-choice arguments
/// (transaction and goal kinds, chart periods, config keys).
struct CommandHelper {
    commands: Vec<String>,
}

impl CommandHelper {
    fn new(names: Vec<&'static str>) -> Self {
        let mut commands: Vec<String> = names
            .into_iter()
            .map(|name| name.to_ascii_lowercase())
            .collect();
        commands.sort();
        commands.dedup();
        Self { commands }
    }

    /// Start offset of the word under the cursor and the words that could
    /// replace it.
    fn suggestions(&self, prefix: &str) -> (usize, Vec<String>) {
        let start = prefix
            .rfind(char::is_whitespace)
            .map(|idx| idx + 1)
            .unwrap_or(0);
        let before = &prefix[..start];
        let typed: Vec<String> = split(before)
            .unwrap_or_else(|_| before.split_whitespace().map(str::to_string).collect())
            .into_iter()
            .map(|word| word.to_ascii_lowercase())
            .collect();
        let words: Vec<&str> = typed.iter().map(String::as_str).collect();

        let needle = prefix[start..].to_ascii_lowercase();
        let candidates = self
            .choices(&words)
            .into_iter()
            .filter(|choice| choice.starts_with(&needle))
            .collect();
        (start, candidates)
    }

    fn choices(&self, words: &[&str]) -> Vec<String> {
        let fixed: &[&str] = match words {
            [] | ["help"] => return self.commands.clone(),
            ["transaction"] => TRANSACTION_ACTIONS,
            ["transaction", "add"] => TRANSACTION_KINDS,
            ["goal"] => GOAL_ACTIONS,
            ["goal", "new" | "add", _, _] => GOAL_KINDS,
            ["stats"] => STATS_ACTIONS,
            ["stats", "chart"] => STATS_PERIODS,
            ["config"] => CONFIG_ACTIONS,
            ["config", "get" | "set"] => &Config::KEYS,
            _ => &[],
        };
        fixed.iter().map(|choice| choice.to_string()).collect()
    }
}

impl Helper for CommandHelper {}

impl Completer for CommandHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &ReadlineContext<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let (start, words) = self.suggestions(&line[..pos]);
        let candidates = words
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for CommandHelper {
    type Hint = String;
}

impl Highlighter for CommandHelper {}

impl Validator for CommandHelper {}

#[cfg(test)]
mod tests {
    use super::*;
    use pigcoin_config::ConfigManager;
    use tempfile::tempdir;

    use crate::store::FinanceStore;

    fn helper() -> CommandHelper {
        CommandHelper::new(vec!["goal", "GOAL", "transaction", "config", "stats", "help"])
    }

    #[test]
    fn helper_deduplicates_command_names() {
        assert_eq!(
            helper().commands,
            vec!["config", "goal", "help", "stats", "transaction"]
        );
    }

    #[test]
    fn completes_command_names_and_actions() {
        let helper = helper();
        assert_eq!(helper.suggestions("go"), (0, vec!["goal".to_string()]));
        assert_eq!(helper.suggestions("goal p").1, vec!["pay", "progress"]);
        assert_eq!(helper.suggestions("transaction ").1, vec!["list", "add", "remove"]);
        assert_eq!(helper.suggestions("help tr").1, vec!["transaction"]);
    }

    #[test]
    fn completes_fixed_choice_arguments() {
        let helper = helper();
        assert_eq!(helper.suggestions("transaction add i"), (16, vec!["income".to_string()]));
        assert_eq!(
            helper.suggestions("goal new \"Beach trip\" 300 f").1,
            vec!["fixed", "free"]
        );
        assert_eq!(helper.suggestions("stats chart 1").1, vec!["1d", "1m", "1y"]);
        assert_eq!(helper.suggestions("config set back").1, vec!["backup_retention"]);
        assert!(helper.suggestions("goal pay 1 ").1.is_empty());
    }

    #[test]
    fn unreadable_lines_keep_the_session_going() {
        let dir = tempdir().unwrap();
        let manager = ConfigManager::with_base_dir(dir.path().to_path_buf()).unwrap();
        let mut context = ShellContext::with_parts(
            CliMode::Script,
            FinanceStore::in_memory(),
            Config::default(),
            manager,
        );

        assert_eq!(
            handle_line(&mut context, "goal new \"Beach trip 300 grid"),
            LoopControl::Continue
        );
        assert!(context.store.goals().is_empty());

        assert_eq!(
            handle_line(&mut context, "goal new \"Beach trip\" 300 grid"),
            LoopControl::Continue
        );
        assert_eq!(context.store.goals()[0].name, "Beach trip");
        assert_eq!(handle_line(&mut context, "transaction add bonus 5 x"), LoopControl::Continue);
        assert_eq!(handle_line(&mut context, "EXIT"), LoopControl::Exit);
    }
}
