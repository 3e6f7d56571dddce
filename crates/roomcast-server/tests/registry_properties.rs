//! Property-based invariants for the room registry.
//!
//! Drives arbitrary register/join/leave sequences and checks the
//! membership bijection afterwards: a client is in exactly one room, that
//! room's member set contains it, and no member set contains a departed
//! client.

use std::collections::HashSet;

use proptest::prelude::*;
use roomcast_server::{LOBBY_ROOM, RoomRegistry};

#[derive(Debug, Clone, Copy)]
enum Op {
    Register(u8),
    Join(u8, i8),
    Leave(u8),
}

fn arbitrary_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<u8>().prop_map(Op::Register),
        (any::<u8>(), -4i8..4).prop_map(|(client, room)| Op::Join(client, room)),
        any::<u8>().prop_map(Op::Leave),
    ]
}

#[test]
fn prop_membership_stays_a_bijection() {
    proptest!(|(ops in prop::collection::vec(arbitrary_op(), 0..64))| {
        let registry = RoomRegistry::new();
        let mut present: HashSet<u64> = HashSet::new();
        let mut rooms_touched: HashSet<i64> = HashSet::from([LOBBY_ROOM]);

        for op in ops {
            match op {
                Op::Register(client) => {
                    registry.register(u64::from(client));
                    present.insert(u64::from(client));
                },
                Op::Join(client, room) => {
                    registry.join(u64::from(client), i64::from(room));
                    present.insert(u64::from(client));
                    rooms_touched.insert(i64::from(room));
                },
                Op::Leave(client) => {
                    registry.leave(u64::from(client));
                    present.remove(&u64::from(client));
                },
            }
        }

        // Every present client is in exactly one room, and that room's
        // member set is the only one containing it.
        for &client in &present {
            let room = registry.room_of(client);
            prop_assert!(room.is_some(), "present client {client} has no room");
            let room = room.into_iter().collect::<Vec<_>>();

            let containing: Vec<i64> = rooms_touched
                .iter()
                .copied()
                .filter(|&r| registry.members(r).contains(&client))
                .collect();
            prop_assert_eq!(containing, room);
        }

        // No member set names a departed or never-seen client, and every
        // member's room pointer agrees with the set it sits in.
        for &room in &rooms_touched {
            let members = registry.members(room);
            let unique: HashSet<u64> = members.iter().copied().collect();
            prop_assert_eq!(unique.len(), members.len(), "duplicate member in room {}", room);

            for member in members {
                prop_assert!(present.contains(&member));
                prop_assert_eq!(registry.room_of(member), Some(room));
            }
        }

        prop_assert_eq!(registry.client_count(), present.len());
    });
}

#[test]
fn prop_join_is_idempotent() {
    proptest!(|(client in any::<u8>(), room in any::<i8>())| {
        let registry = RoomRegistry::new();

        registry.join(u64::from(client), i64::from(room));
        registry.join(u64::from(client), i64::from(room));

        prop_assert_eq!(registry.members(i64::from(room)), vec![u64::from(client)]);
    });
}

#[test]
fn prop_leave_always_clears_the_client() {
    proptest!(|(client in any::<u8>(), room in any::<i8>())| {
        let registry = RoomRegistry::new();

        registry.register(u64::from(client));
        registry.join(u64::from(client), i64::from(room));
        registry.leave(u64::from(client));

        prop_assert_eq!(registry.room_of(u64::from(client)), None);
        prop_assert!(!registry.members(i64::from(room)).contains(&u64::from(client)));
        prop_assert_eq!(registry.client_count(), 0);
    });
}
