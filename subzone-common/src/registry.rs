//! Replaying a domain's zonefile history into its authoritative subdomain
//! table.
//!
//! Replay is an explicit fold over the ordered history, oldest snapshot
//! first; each step consumes the previous table and produces the next one.
//! Rejected candidates are events, not errors: a domain's history may carry
//! entries from misbehaving or superseded publishers, and replay must never
//! abort or corrupt accepted state because of them.

use std::collections::{btree_map, BTreeMap};

use crate::record::{ParseError, SnapshotRecords, SubdomainRecord};

/// Why a candidate record was discarded during replay.
#[derive(Debug)]
pub enum Rejection<'a> {
    /// First sighting of a name with a non-zero sequence number. The chain
    /// can never be established retroactively; later snapshots for this
    /// name keep failing the transition check until a `sequence == 0`
    /// record appears.
    FirstSightNonZero {
        /// The discarded candidate.
        candidate: &'a SubdomainRecord,
    },
    /// Successor sequence is not exactly predecessor + 1.
    SequenceGap {
        /// The table's current record for the name.
        previous: &'a SubdomainRecord,
        /// The discarded candidate.
        candidate: &'a SubdomainRecord,
    },
    /// The candidate's signature did not verify against the predecessor's
    /// owner key (missing, malformed, or simply wrong).
    BadSignature {
        /// The table's current record for the name.
        previous: &'a SubdomainRecord,
        /// The discarded candidate.
        candidate: &'a SubdomainRecord,
    },
    /// The predecessor's owner key is of a type that cannot verify
    /// anything, so no successor can ever be authorized.
    UnsupportedOwnerKey {
        /// The table's current record for the name.
        previous: &'a SubdomainRecord,
        /// The discarded candidate.
        candidate: &'a SubdomainRecord,
    },
    /// A TXT entry looked like a subdomain record but failed to parse.
    MalformedRecord {
        /// TXT name of the offending entry.
        entry_name: &'a str,
        /// The wire error.
        error: &'a ParseError,
    },
}

/// Sink for replay rejection events.
///
/// Injected into the fold so embedders can audit discarded transitions
/// without a process-wide logger; tests typically collect events, servers
/// typically forward them to their tracing setup. `Send + Sync` so replay
/// can run inside spawnable futures.
pub trait ReplayObserver: Send + Sync {
    /// Called once per discarded candidate or malformed entry.
    fn rejected(&self, rejection: Rejection<'_>);
}

/// Default observer: forwards rejections to [tracing] at WARN level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl ReplayObserver for TracingObserver {
    fn rejected(&self, rejection: Rejection<'_>) {
        match rejection {
            Rejection::FirstSightNonZero { candidate } => tracing::warn!(
                name = %candidate.name(),
                sequence = candidate.sequence(),
                "first sight of subdomain with non-zero sequence"
            ),
            Rejection::SequenceGap {
                previous,
                candidate,
            } => tracing::warn!(
                name = %candidate.name(),
                from = previous.sequence(),
                to = candidate.sequence(),
                "failed subdomain transition because of sequence"
            ),
            Rejection::BadSignature { candidate, .. } => tracing::warn!(
                name = %candidate.name(),
                sequence = candidate.sequence(),
                "failed subdomain transition because of signature failure"
            ),
            Rejection::UnsupportedOwnerKey { candidate, .. } => tracing::warn!(
                name = %candidate.name(),
                "predecessor owner key type cannot authorize successors"
            ),
            Rejection::MalformedRecord { entry_name, error } => tracing::warn!(
                name = %entry_name,
                %error,
                "skipping malformed subdomain record"
            ),
        }
    }
}

/// Mapping from subdomain name to its current authoritative record.
///
/// Has no existence before replay; rebuilt from scratch on every
/// resolution. A plain immutable value for its caller, never mutated
/// outside the fold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubdomainTable {
    entries: BTreeMap<String, SubdomainRecord>,
}

impl SubdomainTable {
    /// The empty table replay starts from.
    pub fn new() -> Self {
        Self::default()
    }

    // === Getters ===

    /// The current authoritative record for `name`, if any.
    pub fn get(&self, name: &str) -> Option<&SubdomainRecord> {
        self.entries.get(name)
    }

    /// Whether `name` has an accepted record.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Number of subdomains in the table.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the table in name order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, SubdomainRecord> {
        self.entries.iter()
    }

    // === Public Methods ===

    /// Fold one snapshot's records into the table, producing the next
    /// table. Rejected candidates leave the table unchanged for their name.
    pub fn apply_snapshot(
        mut self,
        snapshot: &SnapshotRecords,
        observer: &dyn ReplayObserver,
    ) -> Self {
        for (entry_name, error) in &snapshot.skipped {
            observer.rejected(Rejection::MalformedRecord { entry_name, error });
        }

        for candidate in &snapshot.records {
            match self.entries.get(candidate.name()) {
                None => {
                    if candidate.sequence() != 0 {
                        observer.rejected(Rejection::FirstSightNonZero { candidate });
                        continue;
                    }
                }
                Some(previous) => {
                    if !transition_valid(previous, candidate, observer) {
                        continue;
                    }
                }
            }
            self.entries
                .insert(candidate.name().to_string(), candidate.clone());
        }

        self
    }

    /// Replay an ordered history (oldest snapshot first) into a table.
    ///
    /// Per-domain replay is strictly sequential; each step's validity
    /// depends on the previously accepted state. Distinct domains share
    /// nothing and may be replayed concurrently by the caller.
    pub fn replay<'a, I>(snapshots: I, observer: &dyn ReplayObserver) -> Self
    where
        I: IntoIterator<Item = &'a SnapshotRecords>,
    {
        snapshots
            .into_iter()
            .fold(Self::new(), |table, snapshot| {
                table.apply_snapshot(snapshot, observer)
            })
    }
}

/// May `candidate` legally replace `previous`? Reports the reason to
/// `observer` when it may not.
fn transition_valid(
    previous: &SubdomainRecord,
    candidate: &SubdomainRecord,
    observer: &dyn ReplayObserver,
) -> bool {
    if previous.sequence().checked_add(1) != Some(candidate.sequence()) {
        observer.rejected(Rejection::SequenceGap {
            previous,
            candidate,
        });
        return false;
    }

    let Some(owner_key) = previous.key().as_ec() else {
        observer.rejected(Rejection::UnsupportedOwnerKey {
            previous,
            candidate,
        });
        return false;
    };

    if !matches!(candidate.verify(owner_key), Ok(true)) {
        observer.rejected(Rejection::BadSignature {
            previous,
            candidate,
        });
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use crate::{crypto::Keypair, keys::KeyEntry, record::SubdomainRecord};

    use super::*;

    /// Collects a compact tag per rejection, for asserting on replay flow.
    #[derive(Default)]
    struct Collecting {
        events: Mutex<Vec<String>>,
    }

    impl Collecting {
        fn events(&self) -> Vec<String> {
            self.events.lock().unwrap().clone()
        }
    }

    impl ReplayObserver for Collecting {
        fn rejected(&self, rejection: Rejection<'_>) {
            let tag = match rejection {
                Rejection::FirstSightNonZero { .. } => "first-sight",
                Rejection::SequenceGap { .. } => "sequence-gap",
                Rejection::BadSignature { .. } => "bad-signature",
                Rejection::UnsupportedOwnerKey { .. } => "unsupported-key",
                Rejection::MalformedRecord { .. } => "malformed",
            };
            self.events.lock().unwrap().push(tag.to_string());
        }
    }

    fn keypair(seed: u8) -> Keypair {
        Keypair::from_secret_bytes(&[seed; 32]).unwrap()
    }

    fn genesis(name: &str, owner: &Keypair, payload: &[u8]) -> SubdomainRecord {
        SubdomainRecord::new(name, KeyEntry::Ec(owner.public_key()), 0, payload.to_vec())
    }

    fn successor(
        previous: &SubdomainRecord,
        signer: &Keypair,
        next_owner: &Keypair,
        payload: &[u8],
    ) -> SubdomainRecord {
        let mut record = SubdomainRecord::new(
            previous.name(),
            KeyEntry::Ec(next_owner.public_key()),
            previous.sequence() + 1,
            payload.to_vec(),
        );
        record.sign(signer).unwrap();
        record
    }

    fn snapshot(records: Vec<SubdomainRecord>) -> SnapshotRecords {
        SnapshotRecords {
            records,
            skipped: Vec::new(),
        }
    }

    #[test]
    fn accepts_a_signed_succession() {
        let alice = keypair(1);
        let rec0 = genesis("alice", &alice, b"v0");
        let rec1 = successor(&rec0, &alice, &alice, b"v1");

        let observer = Collecting::default();
        let table = SubdomainTable::replay(
            [snapshot(vec![rec0]), snapshot(vec![rec1])].iter(),
            &observer,
        );

        assert_eq!(table.get("alice").unwrap().payload(), b"v1");
        assert!(observer.events().is_empty());
    }

    #[test]
    fn accepts_an_ownership_transfer() {
        let alice = keypair(1);
        let bob = keypair(2);
        let rec0 = genesis("alice", &alice, b"v0");
        // Bob's key takes over, but Alice signs the hand-off.
        let rec1 = successor(&rec0, &alice, &bob, b"v1");
        let rec2 = successor(&rec1, &bob, &bob, b"v2");

        let table = SubdomainTable::replay(
            [
                snapshot(vec![rec0]),
                snapshot(vec![rec1]),
                snapshot(vec![rec2]),
            ]
            .iter(),
            &TracingObserver,
        );

        let current = table.get("alice").unwrap();
        assert_eq!(current.sequence(), 2);
        assert_eq!(current.key(), &KeyEntry::Ec(bob.public_key()));
    }

    #[test]
    fn rejects_a_sequence_gap() {
        let alice = keypair(1);
        let rec0 = genesis("alice", &alice, b"v0");
        let mut skip = SubdomainRecord::new(
            "alice",
            KeyEntry::Ec(alice.public_key()),
            2,
            b"v2".to_vec(),
        );
        skip.sign(&alice).unwrap();

        let observer = Collecting::default();
        let table = SubdomainTable::replay(
            [snapshot(vec![rec0]), snapshot(vec![skip])].iter(),
            &observer,
        );

        assert_eq!(table.get("alice").unwrap().sequence(), 0);
        assert_eq!(observer.events(), ["sequence-gap"]);
    }

    #[test]
    fn first_sight_must_be_sequence_zero() {
        let alice = keypair(1);
        let mut late = SubdomainRecord::new(
            "alice",
            KeyEntry::Ec(alice.public_key()),
            3,
            b"late".to_vec(),
        );
        late.sign(&alice).unwrap();

        let observer = Collecting::default();
        let table = SubdomainTable::replay([snapshot(vec![late])].iter(), &observer);

        assert!(table.is_empty());
        assert_eq!(observer.events(), ["first-sight"]);
    }

    #[test]
    fn rejects_a_successor_signed_by_the_wrong_key() {
        let alice = keypair(1);
        let mallory = keypair(9);
        let rec0 = genesis("alice", &alice, b"v0");
        let rec1 = successor(&rec0, &alice, &alice, b"v1");
        let forged = successor(&rec1, &mallory, &mallory, b"forged");

        let observer = Collecting::default();
        let table = SubdomainTable::replay(
            [
                snapshot(vec![rec0]),
                snapshot(vec![rec1]),
                snapshot(vec![forged]),
            ]
            .iter(),
            &observer,
        );

        assert_eq!(table.get("alice").unwrap().payload(), b"v1");
        assert_eq!(observer.events(), ["bad-signature"]);
    }

    #[test]
    fn rejects_an_unsigned_successor() {
        let alice = keypair(1);
        let rec0 = genesis("alice", &alice, b"v0");
        let unsigned = SubdomainRecord::new(
            "alice",
            KeyEntry::Ec(alice.public_key()),
            1,
            b"v1".to_vec(),
        );

        let observer = Collecting::default();
        let table = SubdomainTable::replay(
            [snapshot(vec![rec0]), snapshot(vec![unsigned])].iter(),
            &observer,
        );

        assert_eq!(table.get("alice").unwrap().sequence(), 0);
        assert_eq!(observer.events(), ["bad-signature"]);
    }

    #[test]
    fn unknown_owner_key_cannot_authorize_successors() {
        let alice = keypair(1);
        let rec0 = SubdomainRecord::new(
            "alice",
            KeyEntry::Unknown {
                scheme: "pq".to_string(),
                data: "aabb".to_string(),
            },
            0,
            b"v0".to_vec(),
        );
        let mut rec1 = SubdomainRecord::new(
            "alice",
            KeyEntry::Ec(alice.public_key()),
            1,
            b"v1".to_vec(),
        );
        rec1.sign(&alice).unwrap();

        let observer = Collecting::default();
        let table = SubdomainTable::replay(
            [snapshot(vec![rec0]), snapshot(vec![rec1])].iter(),
            &observer,
        );

        assert_eq!(table.get("alice").unwrap().sequence(), 0);
        assert_eq!(observer.events(), ["unsupported-key"]);
    }

    #[test]
    fn independent_names_replay_independently() {
        let alice = keypair(1);
        let bob = keypair(2);
        let a0 = genesis("alice", &alice, b"a0");
        let b0 = genesis("bob", &bob, b"b0");
        let a1 = successor(&a0, &alice, &alice, b"a1");

        let table = SubdomainTable::replay(
            [snapshot(vec![a0, b0]), snapshot(vec![a1])].iter(),
            &TracingObserver,
        );

        assert_eq!(table.len(), 2);
        assert_eq!(table.get("alice").unwrap().sequence(), 1);
        assert_eq!(table.get("bob").unwrap().sequence(), 0);
    }

    #[test]
    fn malformed_entries_are_reported_not_fatal() {
        let alice = keypair(1);
        let rec0 = genesis("alice", &alice, b"v0");
        let snapshot = SnapshotRecords {
            records: vec![rec0],
            skipped: vec![(
                "broken".to_string(),
                crate::record::ParseError::MissingChunk(0),
            )],
        };

        let observer = Collecting::default();
        let table = SubdomainTable::new().apply_snapshot(&snapshot, &observer);

        assert!(table.contains("alice"));
        assert_eq!(observer.events(), ["malformed"]);
    }
}
