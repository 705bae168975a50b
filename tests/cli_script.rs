use assert_cmd::Command;
use predicates::str::contains;
use tempfile::tempdir;

fn pigcoin(home: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("pigcoin_cli").unwrap();
    cmd.env("PIGCOIN_CLI_SCRIPT", "1")
        .env("PIGCOIN_HOME", home)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn script_mode_records_and_persists() {
    let home = tempdir().unwrap();
    let input = "\
transaction add income 500 Salary
transaction add expense 120 Groceries
balance
goal new Trip 12 grid
goal pay 1 5
exit
";

    pigcoin(home.path())
        .write_stdin(input)
        .assert()
        .success()
        .stdout(contains("Transaction recorded: Salary"))
        .stdout(contains("Balance: R$ 380,00"))
        .stdout(contains("Goal created: Trip (Grid, 5 installments"))
        .stdout(contains("Installment #5 of Trip marked paid."));

    let goals = std::fs::read_to_string(home.path().join("data").join("pigcoin_goals.json")).unwrap();
    assert!(goals.contains("\"totalValue\":12.0"));
    assert!(goals.contains("\"currentValue\":2.0"));

    pigcoin(home.path())
        .write_stdin("balance\ngoal show 1\n")
        .assert()
        .success()
        .stdout(contains("Balance: R$ 380,00"))
        .stdout(contains("Installments (1 paid, R$ 12,00 scheduled):"))
        .stdout(contains("[x] #5"));
}

#[test]
fn completion_is_announced_once() {
    let home = tempdir().unwrap();
    pigcoin(home.path())
        .write_stdin("goal new Car 250 fixed 100\ngoal progress 1 300\ngoal progress 1 5\n")
        .assert()
        .success()
        .stdout(contains("Goal reached: Car!"))
        .stderr(contains("already reached its target"));
}

#[test]
fn unknown_commands_get_suggestions() {
    let home = tempdir().unwrap();
    pigcoin(home.path())
        .write_stdin("balanse\n")
        .assert()
        .success()
        .stdout(contains("Suggestion: `balance`?"))
        .stderr(contains("Unknown command `balanse`"));
}

#[test]
fn invalid_input_keeps_the_session_alive() {
    let home = tempdir().unwrap();
    pigcoin(home.path())
        .write_stdin("transaction add income abc Gift\ntransaction add income 10 Gift\n")
        .assert()
        .success()
        .stderr(contains("`abc` is not a valid amount"))
        .stdout(contains("Transaction recorded: Gift"));
}

#[test]
fn config_changes_apply_on_next_start() {
    let home = tempdir().unwrap();
    pigcoin(home.path())
        .write_stdin("config set locale en-US\nconfig set currency usd\n")
        .assert()
        .success()
        .stdout(contains("Setting `currency` saved."));

    pigcoin(home.path())
        .write_stdin("transaction add income 1234.5 Bonus\nbalance\n")
        .assert()
        .success()
        .stdout(contains("Balance: $ 1,234.50"));
}

#[test]
fn version_reports_package() {
    let home = tempdir().unwrap();
    pigcoin(home.path())
        .write_stdin("version\n")
        .assert()
        .success()
        .stdout(contains(format!("PigCoin {}", env!("CARGO_PKG_VERSION"))));
}
