use std::fs;

use chrono::{Duration, Utc};
use pigcoin::FinanceStore;
use pigcoin_config::{Config, ConfigManager};
use pigcoin_domain::{ScheduleKind, StatsPeriod, TransactionKind};
use tempfile::tempdir;

fn open(manager: &ConfigManager, config: &Config) -> FinanceStore {
    FinanceStore::from_config(manager, config).expect("open store")
}

#[test]
fn state_survives_restart() {
    let home = tempdir().unwrap();
    let manager = ConfigManager::with_base_dir(home.path().to_path_buf()).unwrap();
    let config = Config::default();

    let goal_id = {
        let mut store = open(&manager, &config);
        store
            .add_transaction("Salary", 500.0, TransactionKind::Income)
            .unwrap();
        store
            .add_transaction("Groceries", 120.0, TransactionKind::Expense)
            .unwrap();
        let goal = store
            .create_goal("Car", 250.0, ScheduleKind::Fixed, Some(100.0))
            .unwrap();
        store.toggle_installment(goal.id, 3, None).unwrap();
        store.close().unwrap();
        goal.id
    };

    let store = open(&manager, &config);
    assert_eq!(store.total_balance(), 380.0);
    let goal = store.goal(goal_id).expect("goal persisted");
    assert_eq!(goal.current_value, 50.0);
    assert_eq!(goal.installments.len(), 3);
    assert!(goal.installments[2].paid);
}

#[test]
fn corrupt_collection_starts_empty_without_touching_the_other() {
    let home = tempdir().unwrap();
    let manager = ConfigManager::with_base_dir(home.path().to_path_buf()).unwrap();
    let config = Config::default();
    {
        let mut store = open(&manager, &config);
        store
            .add_transaction("Gift", 40.0, TransactionKind::Income)
            .unwrap();
        store
            .create_goal("Trip", 10.0, ScheduleKind::Grid, None)
            .unwrap();
    }

    let data_dir = manager.data_dir(&config);
    fs::write(data_dir.join("pigcoin_goals.json"), "{{ broken").unwrap();

    let store = open(&manager, &config);
    assert!(store.goals().is_empty());
    assert_eq!(store.total_balance(), 40.0);
}

#[test]
fn configured_keys_and_directory_are_used() {
    let home = tempdir().unwrap();
    let elsewhere = tempdir().unwrap();
    let manager = ConfigManager::with_base_dir(home.path().to_path_buf()).unwrap();
    let mut config = Config::default();
    config
        .set("data_dir", &elsewhere.path().display().to_string())
        .unwrap();
    config.set("transactions_key", "household_txns").unwrap();

    let mut store = open(&manager, &config);
    store
        .add_transaction("Rent", 900.0, TransactionKind::Expense)
        .unwrap();

    assert!(elsewhere.path().join("household_txns.json").is_file());
    assert!(!home.path().join("data").join("household_txns.json").exists());
}

#[test]
fn overwrites_leave_backups() {
    let home = tempdir().unwrap();
    let manager = ConfigManager::with_base_dir(home.path().to_path_buf()).unwrap();
    let config = Config::default();
    let mut store = open(&manager, &config);
    for value in [1.0, 2.0, 3.0] {
        store
            .add_transaction("Coffee", value, TransactionKind::Expense)
            .unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
    }

    let backups = manager
        .data_dir(&config)
        .join("backups")
        .join("pigcoin_transactions");
    assert_eq!(fs::read_dir(backups).unwrap().count(), 2);
}

#[test]
fn week_chart_sees_recent_expenses() {
    let mut store = FinanceStore::in_memory();
    store
        .add_transaction("Lunch", 12.0, TransactionKind::Expense)
        .unwrap();
    store
        .add_transaction("Salary", 500.0, TransactionKind::Income)
        .unwrap();

    let series = store.expense_series(StatsPeriod::Week, Utc::now() + Duration::seconds(1));
    assert_eq!(series.len(), 7);
    assert_eq!(series.iter().map(|point| point.value).sum::<f64>(), 12.0);
    assert_eq!(store.summary().top_expenses[0].name, "Lunch");
}
