use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use pigcoin_core::{
    generate_schedule,
    storage::{load_ledger, save_ledger, MemoryStore, StorageKeys},
    GoalService, TransactionService,
};
use pigcoin_domain::{Ledger, ScheduleKind, TransactionKind};

fn build_sample_ledger(txn_count: usize, goal_count: usize) -> Ledger {
    let mut ledger = Ledger::new();
    for idx in 0..txn_count {
        let kind = if idx % 4 == 0 {
            TransactionKind::Income
        } else {
            TransactionKind::Expense
        };
        let name = format!("Entry {}", idx % 50);
        TransactionService::add(&mut ledger, &name, 10.0 + (idx % 90) as f64, kind)
            .expect("add transaction");
    }
    for idx in 0..goal_count {
        let name = format!("Goal {idx}");
        let goal = GoalService::create(&mut ledger, &name, 5_000.0, ScheduleKind::Grid, None)
            .expect("create goal");
        for number in (1..=goal.installments.len() as u32).step_by(2) {
            GoalService::toggle_installment(&mut ledger, goal.id, number, None).expect("toggle");
        }
    }
    ledger
}

fn bench_schedules(c: &mut Criterion) {
    c.bench_function("grid_schedule_50k", |b| {
        b.iter(|| generate_schedule(black_box(50_000.0), ScheduleKind::Grid, None).expect("grid"))
    });
    c.bench_function("fixed_schedule_9999_slots", |b| {
        b.iter(|| {
            generate_schedule(black_box(99_990.0), ScheduleKind::Fixed, Some(10.0)).expect("fixed")
        })
    });
}

fn bench_snapshot_codec(c: &mut Criterion) {
    let ledger = build_sample_ledger(10_000, 50);
    let keys = StorageKeys::default();

    c.bench_function("ledger_save_10k", |b| {
        b.iter_batched(
            MemoryStore::new,
            |store| save_ledger(&store, &keys, &ledger).expect("save"),
            BatchSize::SmallInput,
        )
    });

    let store = MemoryStore::new();
    save_ledger(&store, &keys, &ledger).expect("seed");
    c.bench_function("ledger_load_10k", |b| {
        b.iter(|| black_box(load_ledger(&store, &keys).expect("load")))
    });
}

criterion_group!(benches, bench_schedules, bench_snapshot_codec);
criterion_main!(benches);
