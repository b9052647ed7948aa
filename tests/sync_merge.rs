use std::fs;
use std::path::PathBuf;

use maestro::model::{Bet, BetStatus, Market, RecordKind, Tombstone};
use maestro::pnl;
use maestro::store::{self, BetFilter};
use maestro::sync::{
    self, SNAPSHOT_VERSION, Snapshot, merge_snapshots, snapshot_digest,
};

fn bet(id: &str, status: BetStatus, updated_at: i64) -> Bet {
    Bet {
        id: id.to_string(),
        match_id: None,
        event: "Arsenal vs Chelsea".to_string(),
        league: Some("Premier League".to_string()),
        market: Market::MatchResult,
        selection: "Arsenal".to_string(),
        odds: -120,
        stake: 24.0,
        status,
        placed_at: 100,
        settled_at: status.is_settled().then_some(updated_at),
        notes: None,
        updated_at,
    }
}

fn snapshot(bets: Vec<Bet>, tombstones: Vec<Tombstone>) -> Snapshot {
    Snapshot {
        version: SNAPSHOT_VERSION,
        exported_at: 1_000,
        bets,
        tombstones,
        ..Snapshot::default()
    }
}

fn temp_path(name: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    path.push(format!("maestro-test-{}-{name}", std::process::id()));
    path
}

#[test]
fn newer_remote_copy_wins_and_new_records_arrive() {
    let local = snapshot(vec![bet("a", BetStatus::Pending, 10)], vec![]);
    let remote = snapshot(
        vec![bet("a", BetStatus::Won, 20), bet("b", BetStatus::Pending, 5)],
        vec![],
    );
    let (merged, stats) = merge_snapshots(&local, &remote);
    assert_eq!(stats.added, 1);
    assert_eq!(stats.updated, 1);
    assert_eq!(stats.removed, 0);
    assert_eq!(merged.bets.len(), 2);
    assert_eq!(merged.bets[0].status, BetStatus::Won);
}

#[test]
fn ties_and_older_remote_keep_local() {
    let mut local_bet = bet("a", BetStatus::Lost, 20);
    local_bet.notes = Some("local".to_string());
    let local = snapshot(vec![local_bet.clone()], vec![]);
    let remote = snapshot(vec![bet("a", BetStatus::Won, 20)], vec![]);
    let (merged, stats) = merge_snapshots(&local, &remote);
    assert!(stats.is_empty());
    assert_eq!(merged.bets, vec![local_bet]);
}

#[test]
fn remote_tombstone_removes_older_record() {
    let local = snapshot(vec![bet("a", BetStatus::Pending, 10)], vec![]);
    let remote = snapshot(
        vec![],
        vec![Tombstone {
            kind: RecordKind::Bet,
            id: "a".to_string(),
            deleted_at: 15,
        }],
    );
    let (merged, stats) = merge_snapshots(&local, &remote);
    assert_eq!(stats.removed, 1);
    assert!(merged.bets.is_empty());
    assert_eq!(merged.tombstones.len(), 1);
}

#[test]
fn edit_after_delete_resurrects_record() {
    let local = snapshot(vec![bet("a", BetStatus::Won, 30)], vec![]);
    let remote = snapshot(
        vec![],
        vec![Tombstone {
            kind: RecordKind::Bet,
            id: "a".to_string(),
            deleted_at: 15,
        }],
    );
    let (merged, stats) = merge_snapshots(&local, &remote);
    assert!(stats.is_empty());
    assert_eq!(merged.bets.len(), 1);
    assert!(merged.tombstones.is_empty());
}

#[test]
fn merge_is_idempotent() {
    let local = snapshot(vec![bet("a", BetStatus::Pending, 10)], vec![]);
    let remote = snapshot(vec![bet("b", BetStatus::Lost, 12)], vec![]);
    let (once, _) = merge_snapshots(&local, &remote);
    let (twice, stats) = merge_snapshots(&once, &remote);
    assert!(stats.is_empty());
    assert_eq!(once, twice);
}

#[test]
fn digest_ignores_export_time_and_order() {
    let mut a = snapshot(
        vec![bet("a", BetStatus::Pending, 10), bet("b", BetStatus::Won, 11)],
        vec![],
    );
    let mut b = snapshot(
        vec![bet("b", BetStatus::Won, 11), bet("a", BetStatus::Pending, 10)],
        vec![],
    );
    a.exported_at = 1;
    b.exported_at = 2;
    assert_eq!(snapshot_digest(&a).unwrap(), snapshot_digest(&b).unwrap());

    b.bets[0].stake = 25.0;
    assert_ne!(snapshot_digest(&a).unwrap(), snapshot_digest(&b).unwrap());
}

#[test]
fn store_applies_remote_snapshot() {
    let mut conn = store::open_in_memory().unwrap();
    store::upsert_bet(&conn, &bet("a", BetStatus::Pending, 10)).unwrap();
    store::upsert_bet(&conn, &bet("c", BetStatus::Pending, 10)).unwrap();

    let remote = snapshot(
        vec![bet("a", BetStatus::Won, 20), bet("b", BetStatus::Lost, 5)],
        vec![Tombstone {
            kind: RecordKind::Bet,
            id: "c".to_string(),
            deleted_at: 50,
        }],
    );
    let stats = store::apply_snapshot(&mut conn, &remote, 2_000).unwrap();
    assert_eq!((stats.added, stats.updated, stats.removed), (1, 1, 1));

    let ids = store::list_bets(&conn, &BetFilter::default())
        .unwrap()
        .into_iter()
        .map(|b| b.id)
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["a", "b"]);
    assert_eq!(store::get_bet(&conn, "a").unwrap().unwrap().status, BetStatus::Won);
    assert_eq!(store::list_tombstones(&conn).unwrap().len(), 1);

    let again = store::apply_snapshot(&mut conn, &remote, 3_000).unwrap();
    assert!(again.is_empty());
}

fn tombstone(id: &str, deleted_at: i64) -> Tombstone {
    Tombstone {
        kind: RecordKind::Bet,
        id: id.to_string(),
        deleted_at,
    }
}

#[test]
fn tombstone_at_same_time_as_record_removes_it() {
    let local = snapshot(vec![bet("a", BetStatus::Pending, 15)], vec![]);
    let remote = snapshot(vec![], vec![tombstone("a", 15)]);
    let (merged, stats) = merge_snapshots(&local, &remote);
    assert_eq!(stats.removed, 1);
    assert!(merged.bets.is_empty());
    assert_eq!(merged.tombstones, vec![tombstone("a", 15)]);

    let mut conn = store::open_in_memory().unwrap();
    store::upsert_bet(&conn, &bet("a", BetStatus::Pending, 15)).unwrap();
    store::apply_snapshot(&mut conn, &remote, 2_000).unwrap();
    assert!(store::get_bet(&conn, "a").unwrap().is_none());
}

#[test]
fn store_keeps_tombstone_for_record_it_never_had() {
    let mut conn = store::open_in_memory().unwrap();
    store::upsert_bet(&conn, &bet("y", BetStatus::Pending, 10)).unwrap();

    let remote = snapshot(vec![bet("y", BetStatus::Pending, 10)], vec![tombstone("x", 50)]);
    let stats = store::apply_snapshot(&mut conn, &remote, 2_000).unwrap();
    assert!(stats.is_empty());
    assert_eq!(store::list_tombstones(&conn).unwrap(), vec![tombstone("x", 50)]);

    // Local state now matches the remote, so sync has nothing to push.
    let local = store::export_snapshot(&conn, 3_000).unwrap();
    assert_eq!(snapshot_digest(&local).unwrap(), snapshot_digest(&remote).unwrap());
}

#[test]
fn store_adopts_newer_remote_tombstone() {
    let mut conn = store::open_in_memory().unwrap();
    store::delete_bet(&conn, "x", 40).unwrap();

    let remote = snapshot(vec![], vec![tombstone("x", 60)]);
    let stats = store::apply_snapshot(&mut conn, &remote, 2_000).unwrap();
    assert!(stats.is_empty());
    assert_eq!(store::list_tombstones(&conn).unwrap(), vec![tombstone("x", 60)]);
}

#[test]
fn invalid_remote_bets_never_reach_the_store() {
    let mut conn = store::open_in_memory().unwrap();
    let mut zero_odds = bet("bad-odds", BetStatus::Won, 20);
    zero_odds.odds = 0;
    let mut negative_stake = bet("bad-stake", BetStatus::Lost, 20);
    negative_stake.stake = -5.0;
    let remote = snapshot(
        vec![zero_odds.clone(), negative_stake, bet("ok", BetStatus::Won, 20)],
        vec![],
    );

    let stats = store::apply_snapshot(&mut conn, &remote, 2_000).unwrap();
    assert_eq!(stats.added, 1);
    let bets = store::list_bets(&conn, &BetFilter::default()).unwrap();
    assert_eq!(bets.iter().map(|b| b.id.as_str()).collect::<Vec<_>>(), vec!["ok"]);
    let summary = pnl::summarize(&bets);
    assert!(summary.net_profit.is_finite());
    assert!((summary.net_profit - 20.0).abs() < 1e-9);

    store::replace_all(&mut conn, &snapshot(vec![zero_odds], vec![])).unwrap();
    assert!(store::list_bets(&conn, &BetFilter::default()).unwrap().is_empty());
}

#[test]
fn backup_file_restores_into_empty_store() {
    let path = temp_path("backup.json");
    let source = store::open_in_memory().unwrap();
    store::upsert_bet(&source, &bet("a", BetStatus::Won, 20)).unwrap();
    store::upsert_bet(&source, &bet("b", BetStatus::Pending, 30)).unwrap();
    assert_eq!(sync::export_to_file(&source, &path, 1_000).unwrap(), 2);

    let raw = fs::read_to_string(&path).unwrap();
    let decoded = sync::decode_snapshot(&raw).unwrap();
    assert_eq!(decoded.exported_at, 1_000);

    let mut target = store::open_in_memory().unwrap();
    let stats = sync::import_from_file(&mut target, &path, 2_000).unwrap();
    assert_eq!(stats.added, 2);
    assert_eq!(
        store::export_snapshot(&target, 0).unwrap().bets,
        store::export_snapshot(&source, 0).unwrap().bets
    );
    fs::remove_file(&path).ok();
}
