//! Sessions travelling between components over one relay.

use std::sync::Arc;

use trellis::Relay;
use trellis::net::{GateVerdict, GeoLocation, GeoLocator};
use trellis::session::{
    Counter, CounterBadge, LogDataManager, SessionGate, SessionLogView, SessionRecord,
    SessionService,
};
use trellis::settings::AppSettings;
use trellis::store::{LogStore, SqliteLogStore};

struct StaticLocator(&'static str);

impl GeoLocator for StaticLocator {
    async fn lookup(&self, _ip: &str, _key: &str) -> trellis::net::Result<GeoLocation> {
        Ok(GeoLocation {
            city: "Toronto".into(),
            region_name: "Ontario".into(),
            country_code: self.0.into(),
        })
    }
}

fn visitor(ip: &str) -> Arc<SessionService> {
    Arc::new(SessionService::with_session(SessionRecord::for_connection(
        ip,
        "integration-test",
    )))
}

#[tokio::test]
async fn test_admitted_sessions_reach_the_log_view() {
    let dir = tempfile::tempdir().unwrap();
    let relay = Relay::new();
    let store = SqliteLogStore::open(dir.path().join("LocalLog.sdb")).unwrap();
    let manager = LogDataManager::attach(store, &relay);

    let gate = SessionGate::from_settings(relay.clone(), StaticLocator("CA"), &AppSettings::default());
    let first = visitor("23.81.0.59");
    let second = visitor("81.2.69.142");
    assert_eq!(gate.admit(&first).await.unwrap().verdict, GateVerdict::Ok);
    assert_eq!(gate.admit(&second).await.unwrap().verdict, GateVerdict::Ok);
    assert_eq!(manager.store().fetch_all().unwrap().len(), 2);

    let view = SessionLogView::open(&relay, Arc::clone(&first)).unwrap();
    assert_eq!(view.row_count(), 2);
    assert_eq!(view.title(), "2 entries");
    view.with_grid(|grid| {
        assert!(grid.rows().iter().all(|r| r.ip_address.ends_with(":Ok")));
        assert!(grid.rows().iter().all(|r| r.country_code == "CA" && r.verified));
    });

    view.erase_log().unwrap();
    assert_eq!(view.row_count(), 0);
    assert!(manager.store().fetch_all().unwrap().is_empty());
}

#[tokio::test]
async fn test_denied_session_is_still_logged() {
    let relay = Relay::new();
    let manager = LogDataManager::attach(SqliteLogStore::open_in_memory().unwrap(), &relay);
    let gate = SessionGate::new(relay.clone(), StaticLocator("FR"), "key");

    let outcome = gate.admit(&visitor("81.2.69.142")).await.unwrap();
    assert_eq!(outcome.verdict, GateVerdict::Foreign);
    assert!(outcome.redirect.is_some());

    let logged = manager.store().fetch_all().unwrap();
    assert_eq!(logged.len(), 1);
    assert_eq!(logged[0].ip_address, "81.2.69.142:Foreign");
    assert_eq!(logged[0].country_code, "FR");
}

#[test]
fn test_counter_updates_only_its_own_session() {
    let relay = Relay::new();
    let alice = visitor("23.81.0.59");
    let bob = visitor("81.2.69.142");

    let alice_badge = CounterBadge::attach(&relay, Arc::clone(&alice));
    let bob_badge = CounterBadge::attach(&relay, Arc::clone(&bob));
    let counter = Counter::new(relay.clone(), Arc::clone(&alice));

    counter.increment().unwrap();
    counter.increment().unwrap();
    assert_eq!(alice_badge.count(), 2);
    assert_eq!(bob_badge.count(), 0);

    alice_badge.detach(&relay);
    counter.increment().unwrap();
    assert_eq!(alice_badge.count(), 2);
    assert_eq!(counter.count(), 3);
}

#[test]
fn test_views_survive_a_dropped_manager() {
    let relay = Relay::new();
    let session = visitor("23.81.0.59");
    let manager = LogDataManager::attach(SqliteLogStore::open_in_memory().unwrap(), &relay);
    drop(manager);

    let view = SessionLogView::open(&relay, session).unwrap();
    assert_eq!(view.row_count(), 0);
    assert_eq!(view.title(), "0 entries");
}
