//! SQLite store: measurements, catalog, onboarding and progress round trips

mod common;

use common::*;
use tempfile::tempdir;

use ecochallenge::engine::{CancelFlag, Orchestrator};
use ecochallenge::messenger::DigestMessenger;
use ecochallenge::store::EcoStore;
use ecochallenge::{Catalog, CompletionStatus, NotificationStatus};

const CATALOG: &str = r#"
rewards:
  - id: commuter
    title: Green Commuter
    description: Leave the car at home
    challenges:
      - id: no-car-3
        description: Three days without driving
        rule: { category: Transport, subcategory: Car, restriction: Skip, time: 3 }
      - id: walk-10
        rule: { category: Transport, subcategory: Walking, restriction: Any, amount_to_consume: 10 }
  - id: veggie
    title: Veggie Days
    challenges:
      - id: plants-2
        rule: { category: Diet, subcategory: Plant_based, restriction: Only_This, time: 2 }
"#;

fn seeded_store() -> (tempfile::TempDir, EcoStore) {
    let dir = tempdir().unwrap();
    let store = EcoStore::open(&dir.path().join("data").join("eco.db")).unwrap();
    for reward in &Catalog::from_yaml_str(CATALOG).unwrap().rewards {
        store.save_catalog_reward(reward).unwrap();
    }
    (dir, store)
}

#[test]
fn test_measurement_upsert_replaces_same_day() {
    let (_dir, store) = seeded_store();

    let mut first = measurement(0);
    first.transport.car = 5.0;
    store.upsert_measurement("u1", &first).unwrap();
    store.upsert_measurement("u1", &measurement(2)).unwrap();

    let mut corrected = measurement(0);
    corrected.transport.bicycle = 5.0;
    store.upsert_measurement("u1", &corrected).unwrap();

    let user = store.load_user("u1").unwrap().unwrap();
    assert_eq!(user.measurements.len(), 2);
    assert_eq!(user.measurements[0].date_taken, days_ago(2));
    assert_eq!(user.measurements[1], corrected);
    assert!(user.rewards.is_none());
}

#[test]
fn test_catalog_roundtrip_keeps_order_and_descriptions() {
    let (_dir, store) = seeded_store();

    let catalog = store.load_catalog().unwrap();
    assert_eq!(catalog, Catalog::from_yaml_str(CATALOG).unwrap().rewards);
}

#[test]
fn test_onboarding_is_idempotent() {
    let (_dir, store) = seeded_store();
    let catalog = store.load_catalog().unwrap();

    assert_eq!(store.onboard_user("u1", &catalog).unwrap(), 2);
    assert_eq!(store.onboard_user("u1", &catalog).unwrap(), 0);

    let user = store.load_user("u1").unwrap().unwrap();
    let rewards = user.rewards.unwrap();
    assert_eq!(rewards.len(), 2);
    assert_eq!(rewards[0].id, "commuter");
    assert_eq!(rewards[0].challenges[1].id, "walk-10");
    assert!(rewards.iter().all(|r| r.status == CompletionStatus::Incomplete));
}

#[test]
fn test_progress_survives_reload_and_acknowledge() {
    let (dir, store) = seeded_store();
    seed_completable_user(&store);
    store.upsert_user("u2").unwrap();

    let mut users = store.load_users().unwrap();
    assert_eq!(users.len(), 2);
    let messenger = DigestMessenger::logging();
    let report = Orchestrator::new().run(&mut users, &messenger, now(), &CancelFlag::new());
    assert_eq!(report.users_skipped, 1);
    assert_eq!(report.rewards_completed, 2);
    for user in &users {
        store.save_progress(user).unwrap();
    }
    drop(store);

    let store = EcoStore::open(&dir.path().join("data").join("eco.db")).unwrap();
    let reloaded = store.load_user("u1").unwrap().unwrap();
    assert_eq!(Some(&reloaded), users.iter().find(|u| u.id == "u1"));
    assert!(store.load_user("u2").unwrap().unwrap().rewards.is_none());

    let rewards = reloaded.rewards.unwrap();
    assert_eq!(rewards[0].date_completed, Some(now()));
    assert_eq!(rewards[0].challenges[1].progress, 10.0);

    // 2 rewards + 3 challenges pending
    assert_eq!(store.acknowledge("u1", Some("veggie")).unwrap(), 2);
    assert_eq!(store.acknowledge("u1", None).unwrap(), 3);
    assert_eq!(store.acknowledge("u1", None).unwrap(), 0);

    let rewards = store.load_user("u1").unwrap().unwrap().rewards.unwrap();
    assert!(rewards
        .iter()
        .all(|r| r.notification_status == NotificationStatus::Acknowledged));
}

#[test]
fn test_retire_removes_reward_everywhere() {
    let (_dir, store) = seeded_store();
    let catalog = store.load_catalog().unwrap();
    store.onboard_user("u1", &catalog).unwrap();
    store.onboard_user("u2", &catalog).unwrap();

    assert_eq!(store.retire_reward("veggie").unwrap(), 2);

    let catalog = store.load_catalog().unwrap();
    assert_eq!(catalog.len(), 1);
    for id in ["u1", "u2"] {
        let rewards = store.load_user(id).unwrap().unwrap().rewards.unwrap();
        assert_eq!(rewards.len(), 1);
        assert_eq!(rewards[0].id, "commuter");
    }

    // Re-onboarding does not bring a retired reward back
    assert_eq!(store.onboard_user("u1", &catalog).unwrap(), 0);
}

fn seed_completable_user(store: &EcoStore) {
    for n in (0..3).rev() {
        let mut m = measurement(n);
        m.transport.walking = 4.0;
        m.diet.plant_based = 1.0;
        store.upsert_measurement("u1", &m).unwrap();
    }
    store.onboard_user("u1", &store.load_catalog().unwrap()).unwrap();
}

#[test]
fn test_retire_during_batch_is_not_undone_by_save() {
    let (_dir, store) = seeded_store();
    seed_completable_user(&store);

    let mut users = store.load_users().unwrap();
    store.retire_reward("veggie").unwrap();

    let messenger = DigestMessenger::logging();
    let report = Orchestrator::new().run(&mut users, &messenger, now(), &CancelFlag::new());
    assert_eq!(report.rewards_completed, 2);

    // commuter and its two challenges; nothing is left to update for veggie
    assert_eq!(store.save_progress(&users[0]).unwrap(), 3);

    let rewards = store.load_user("u1").unwrap().unwrap().rewards.unwrap();
    assert_eq!(rewards.len(), 1);
    assert_eq!(rewards[0].id, "commuter");
    assert_eq!(rewards[0].status, CompletionStatus::Complete);
}

#[test]
fn test_acknowledge_during_batch_is_not_reverted_by_save() {
    let (_dir, store) = seeded_store();
    seed_completable_user(&store);

    let messenger = DigestMessenger::logging();
    let mut users = store.load_users().unwrap();
    Orchestrator::new().run(&mut users, &messenger, now(), &CancelFlag::new());
    store.save_progress(&users[0]).unwrap();

    // A second batch loads the pending completions, then the user acknowledges them
    let stale = store.load_users().unwrap();
    assert_eq!(store.acknowledge("u1", None).unwrap(), 5);
    store.save_progress(&stale[0]).unwrap();

    let rewards = store.load_user("u1").unwrap().unwrap().rewards.unwrap();
    for reward in &rewards {
        assert_eq!(reward.notification_status, NotificationStatus::Acknowledged);
        assert!(reward
            .challenges
            .iter()
            .all(|c| c.notification_status == NotificationStatus::Acknowledged));
    }
    assert_eq!(store.acknowledge("u1", None).unwrap(), 0);
}

#[test]
fn test_save_progress_never_inserts_rows() {
    let (_dir, store) = seeded_store();
    store.upsert_user("u1").unwrap();

    let mut user = store.load_user("u1").unwrap().unwrap();
    ecochallenge::onboard(&mut user, &store.load_catalog().unwrap());
    assert_eq!(store.save_progress(&user).unwrap(), 0);

    assert!(store.load_user("u1").unwrap().unwrap().rewards.is_none());
}

#[test]
fn test_unknown_user_loads_as_none() {
    let store = EcoStore::open_in_memory().unwrap();
    assert!(store.load_user("ghost").unwrap().is_none());
    assert_eq!(store.user_count().unwrap(), 0);
}
