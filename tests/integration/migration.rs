//! Migration Tests
//!
//! Several members of one unit, each with its own store, moving a record
//! across a gate while the cluster is mid-upgrade.

use crate::common::*;
use std::sync::Arc;

fn cluster(members: usize) -> (VersionRegistry<Key>, Arc<ActiveVersion>, Vec<Member>) {
    init_tracing();
    let registry = scenario_registry();
    let active = Arc::new(ActiveVersion::new(Version::new(1, 0)));
    let members = (0..members)
        .map(|_| Member::new(&registry, Arc::clone(&active)))
        .collect();
    (registry, active, members)
}

#[test]
fn switch_over_write_reaches_every_member() {
    let (registry, active, members) = cluster(3);
    let unit = UnitId(1);
    let mut replicas: Vec<Replica> = members
        .iter()
        .map(|m| m.protocol.bootstrap(unit, &watermark(10)).unwrap())
        .collect();

    registry.advance(&active, Version::new(1, 1)).unwrap();

    let proposal = members[0]
        .protocol
        .propose(&mut replicas[0], watermark(12))
        .unwrap();
    assert!(proposal.switch_over);

    for (member, replica) in members.iter().zip(replicas.iter_mut()) {
        let outcome = member.protocol.apply(replica, proposal.clone()).unwrap();
        assert!(outcome.is_applied());
        assert_eq!(replica.state(), MigrationState::Migrated);
        assert_eq!(member.keys(unit), vec![StoreKey::migrated(unit)]);
    }
}

#[test]
fn regressing_switch_over_is_rejected() {
    let (registry, active, members) = cluster(1);
    let member = &members[0];
    let unit = UnitId(1);
    let mut replica = member.protocol.bootstrap(unit, &watermark(50)).unwrap();
    registry.advance(&active, Version::new(1, 1)).unwrap();

    // M < N: dropped, nothing changes.
    let proposal = member.protocol.propose(&mut replica, watermark(40)).unwrap();
    let outcome = member.protocol.apply(&mut replica, proposal).unwrap();
    assert_eq!(
        outcome,
        ApplyOutcome::Stale {
            current: 50,
            proposed: 40
        }
    );
    assert_eq!(replica.state(), MigrationState::Legacy);
    assert_eq!(
        member.protocol.load(unit).unwrap(),
        Some((Representation::Legacy, watermark(50)))
    );

    // M >= N: proceeds, exactly one representation left.
    let proposal = member.protocol.propose(&mut replica, watermark(50)).unwrap();
    assert!(member.protocol.apply(&mut replica, proposal).unwrap().is_applied());
    assert_eq!(member.keys(unit), vec![StoreKey::migrated(unit)]);
}

#[test]
fn lagging_member_receives_snapshot_in_sender_representation() {
    let (registry, active, members) = cluster(2);
    let unit = UnitId(7);
    let mut leader = members[0].protocol.bootstrap(unit, &watermark(1)).unwrap();

    registry.advance(&active, Version::new(1, 1)).unwrap();
    let proposal = members[0].protocol.propose(&mut leader, watermark(2)).unwrap();
    members[0].protocol.apply(&mut leader, proposal).unwrap();

    let bytes = members[0].protocol.snapshot(&leader).unwrap().encode().unwrap();
    let payload = SnapshotPayload::<Watermark>::decode(&bytes).unwrap();

    let mut follower = Replica::new(unit);
    members[1]
        .protocol
        .install_snapshot(&mut follower, payload)
        .unwrap();
    assert_eq!(follower.state(), MigrationState::Migrated);
    assert_eq!(members[1].keys(unit), vec![StoreKey::migrated(unit)]);
}

#[test]
fn snapshot_taken_before_the_gate_stays_legacy() {
    let (registry, active, members) = cluster(2);
    let unit = UnitId(7);
    let sender = members[0].protocol.bootstrap(unit, &watermark(1)).unwrap();
    let payload = members[0].protocol.snapshot(&sender).unwrap();

    registry.advance(&active, Version::new(1, 1)).unwrap();

    let mut receiver = Replica::new(unit);
    members[1]
        .protocol
        .install_snapshot(&mut receiver, payload)
        .unwrap();
    assert_eq!(receiver.state(), MigrationState::Legacy);
    assert_eq!(members[1].keys(unit), vec![StoreKey::legacy(unit)]);
}

#[test]
fn split_siblings_start_identical() {
    let (registry, active, members) = cluster(1);
    let member = &members[0];
    let parent = member.protocol.bootstrap(UnitId(1), &watermark(5)).unwrap();
    registry.advance(&active, Version::new(1, 1)).unwrap();

    let child = member.protocol.split(&parent, UnitId(2), &watermark(5)).unwrap();
    assert_eq!(child.state(), parent.state());
    assert_eq!(member.keys(UnitId(2)), vec![StoreKey::legacy(UnitId(2))]);
}

#[test]
fn truncated_state_relocation_through_builtin_registry() {
    init_tracing();
    let registry = VersionRegistry::builtin().unwrap();
    let active = Arc::new(ActiveVersion::new(registry.minimum_supported_version()));
    let store = Arc::new(MemStore::new());
    let protocol = truncated_state_protocol(&registry, Arc::clone(&active), store.clone());

    let unit = UnitId(3);
    let mut replica = protocol.bootstrap(unit, &TruncatedState::new(100, 4)).unwrap();
    assert_eq!(store.keys_of(unit), vec![StoreKey::legacy(unit)]);

    registry.advance(&active, registry.binary_version()).unwrap();
    let proposal = protocol
        .propose(&mut replica, TruncatedState::new(120, 4))
        .unwrap();
    protocol.apply(&mut replica, proposal).unwrap();

    assert_eq!(store.keys_of(unit), vec![StoreKey::migrated(unit)]);
    assert_eq!(
        protocol.recover(unit).unwrap().state(),
        MigrationState::Migrated
    );
}
