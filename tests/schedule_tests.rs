use class_calendar::{AssignOutcome, ClassCatalog, ClassType, DateKey, ScheduleStore};

fn key(year: i32, month: u32, day: u32) -> DateKey {
    DateKey::new(year, month, day).unwrap()
}

#[test]
fn september_scenario_totals() {
    let mut store = ScheduleStore::default();
    store.assign(key(2025, 8, 3), "pink");
    store.assign(key(2025, 8, 10), "blue");
    store.assign(key(2025, 8, 15), "purple");

    let summary = store.aggregate_fees_for_month(8, 2025);
    assert_eq!(summary.total_class_count, 3);
    assert_eq!(summary.total_fee, 3500);
    assert_eq!(summary.fees_per_type()["pink"], 1000);
    assert_eq!(summary.fees_per_type()["blue"], 1500);
    assert_eq!(summary.fees_per_type()["purple"], 1000);
    assert!((summary.total_hours - 4.5).abs() < 1e-9);
}

#[test]
fn february_does_not_leak_into_december() {
    let mut store = ScheduleStore::default();
    store.assign(key(2025, 1, 5), "blue");
    store.assign(key(2025, 1, 12), "pink");

    let december = store.aggregate_fees_for_month(11, 2025);
    assert_eq!(december.total_class_count, 0);
    assert_eq!(december.total_fee, 0);

    // Month 1 against months 10 and 11, and the same month in another year.
    assert_eq!(store.aggregate_fees_for_month(10, 2025).total_class_count, 0);
    assert_eq!(store.aggregate_fees_for_month(1, 2026).total_class_count, 0);
    assert_eq!(store.aggregate_fees_for_month(1, 2025).total_class_count, 2);
}

#[test]
fn assignments_in_one_month_leave_others_untouched() {
    let mut store = ScheduleStore::default();
    let before: Vec<_> = (0..12)
        .filter(|month| *month != 9)
        .map(|month| store.aggregate_fees_for_month(month, 2025))
        .collect();

    for day in 1..=31 {
        let class_type = ["pink", "blue", "purple", "next"][(day % 4) as usize];
        store.assign(key(2025, 9, day), class_type);
    }

    let after: Vec<_> = (0..12)
        .filter(|month| *month != 9)
        .map(|month| store.aggregate_fees_for_month(month, 2025))
        .collect();
    assert_eq!(before, after);
    assert!(store.aggregate_fees_for_month(9, 2025).total_class_count > 0);
}

#[test]
fn write_then_read_and_last_write_wins() {
    let mut store = ScheduleStore::default();
    let day = key(2025, 8, 3);
    assert_eq!(store.get(&day), None);

    assert_eq!(
        store.assign(day, "pink"),
        AssignOutcome::Assigned { previous: None }
    );
    assert_eq!(store.get(&day), Some("pink"));

    assert_eq!(
        store.assign(day, "blue"),
        AssignOutcome::Assigned {
            previous: Some("pink".into())
        }
    );
    assert_eq!(store.get(&day), Some("blue"));
    assert_eq!(store.len(), 1);
}

#[test]
fn unknown_class_type_is_a_no_op() {
    let mut store = ScheduleStore::default();
    let day = key(2025, 8, 3);
    store.assign(day, "pink");
    assert_eq!(store.assign(day, "gold"), AssignOutcome::UnknownClassType);
    assert_eq!(store.get(&day), Some("pink"));
    assert_eq!(store.aggregate_fees_for_month(8, 2025).total_fee, 1000);
}

#[test]
fn placeholder_is_stored_but_never_billed() {
    let mut store = ScheduleStore::default();
    store.assign(key(2025, 8, 1), "next");
    store.assign(key(2025, 8, 2), "next");
    store.assign(key(2025, 8, 3), "blue");

    let summary = store.aggregate_fees_for_month(8, 2025);
    assert_eq!(store.get(&key(2025, 8, 1)), Some("next"));
    assert_eq!(summary.total_class_count, 1);
    assert_eq!(summary.total_fee, 1500);
    assert!(summary.row("next").is_none());
}

#[test]
fn summary_rows_follow_catalog_and_stay_consistent() {
    let mut store = ScheduleStore::new(ClassCatalog::standard());
    for day in [1, 4, 9, 20, 22] {
        store.assign(key(2024, 1, day), "pink");
    }
    store.assign(key(2024, 1, 29), "blue");

    let summary = store.aggregate_fees_for_month(1, 2024);
    let ids: Vec<_> = summary.rows.iter().map(|row| row.class_type.as_str()).collect();
    assert_eq!(ids, ["pink", "blue", "purple"]);
    assert_eq!(summary.count("purple"), 0);

    let fee_sum: u64 = summary.fees_per_type().values().sum();
    let count_sum: u32 = summary.per_type().values().sum();
    assert_eq!(summary.total_fee, fee_sum);
    assert_eq!(summary.total_class_count, count_sum);
    for row in &summary.rows {
        assert_eq!(row.fee, u64::from(row.count) * row.unit_fee);
    }
    assert_eq!(summary.total_fee, 5 * 1000 + 1500);
}

#[test]
fn unassign_removes_the_key() {
    let mut store = ScheduleStore::default();
    let day = key(2025, 8, 3);
    store.assign(day, "purple");
    assert_eq!(store.unassign(&day), Some("purple".into()));
    assert_eq!(store.unassign(&day), None);
    assert!(store.is_empty());
    assert_eq!(store.aggregate_fees_for_month(8, 2025).total_class_count, 0);
}

#[test]
fn huge_fees_saturate_instead_of_overflowing() {
    let catalog = ClassCatalog::new(vec![
        ClassType::placeholder("next", "Next Class", "gray"),
        ClassType::new("vip", "VIP Class", 1.0, u64::MAX / 2 + 1, "gold"),
        ClassType::new("pink", "Math Class", 1.5, 1000, "pink"),
    ])
    .unwrap();
    let mut store = ScheduleStore::new(catalog);
    assert!(store.assign(key(2025, 8, 3), "vip").is_assigned());
    assert!(store.assign(key(2025, 8, 4), "vip").is_assigned());
    assert!(store.assign(key(2025, 8, 5), "pink").is_assigned());

    let summary = store.aggregate_fees_for_month(8, 2025);
    assert_eq!(summary.total_class_count, 3);
    assert_eq!(summary.row("vip").map(|row| row.fee), Some(u64::MAX));
    assert_eq!(summary.total_fee, u64::MAX);
}
