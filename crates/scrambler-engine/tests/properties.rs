mod common;

use std::collections::HashSet;

use common::{users_store, users_table};
use scrambler_core::{ColumnName, KeyKind, Predicate, PrimaryKey, RecordId, TargetSpec};
use scrambler_engine::{PredicateBuilder, TOKEN_LEN, ValueGenerator, partition, sanitize_email};
use scrambler_store::Store;

#[test]
fn generated_values_are_valid_and_distinct() {
    let mut generator = ValueGenerator::seeded("example.test", 2024).expect("generator");
    let mut seen = HashSet::new();

    for _ in 0..5000 {
        let value = generator.generate();
        let (local, domain) = value.split_once('@').expect("email shape");
        assert_eq!(local.len(), TOKEN_LEN);
        assert!(local.chars().all(|ch| ch.is_ascii_alphanumeric()));
        assert_eq!(domain, "example.test");
        assert_eq!(sanitize_email(&value).as_deref(), Some(value.as_str()));
        assert!(seen.insert(value), "duplicate placeholder");
    }
}

#[test]
fn entropy_seeded_generator_uses_configured_domain() {
    let mut generator = ValueGenerator::new(" Scrubbed.Invalid ").expect("generator");
    assert_eq!(generator.domain(), "scrubbed.invalid");
    assert!(generator.generate().ends_with("@scrubbed.invalid"));
}

#[test]
fn partition_covers_every_candidate_exactly_once() {
    for n in [0usize, 1, 29, 30, 31, 59, 60, 61, 45, 1000] {
        let ids: Vec<RecordId> = (0..n as i64).map(RecordId::Int).collect();
        let chunks: Vec<&[RecordId]> = partition(&ids, 30).collect();

        assert_eq!(chunks.len(), n.div_ceil(30));
        assert!(chunks.iter().all(|chunk| !chunk.is_empty() && chunk.len() <= 30));
        let flattened: Vec<RecordId> = chunks.concat();
        assert_eq!(flattened, ids);
    }
}

#[tokio::test]
async fn exclusions_remove_exactly_the_matching_rows() {
    let store = users_store(60, |index| index % 3 == 0);
    let target = TargetSpec {
        table: users_table(),
        field: ColumnName::new("user_email"),
        primary_key: PrimaryKey {
            column: ColumnName::new("ID"),
            kind: KeyKind::Integer,
        },
    };
    let needles = vec!["example.com".to_string(), "test.org".to_string()];

    let all = store
        .select_ids(&target, &Predicate::all())
        .await
        .expect("select all");
    let kept = store
        .select_ids(
            &target,
            &PredicateBuilder::exclusion_fragment(&target.field, &needles),
        )
        .await
        .expect("select filtered");

    let emails = store.column_values(&users_table(), "user_email");
    let expected: Vec<RecordId> = all
        .iter()
        .zip(&emails)
        .filter(|(_, email)| {
            let email = email.as_deref().unwrap_or_default();
            !needles.iter().any(|needle| email.contains(needle.as_str()))
        })
        .map(|(id, _)| id.clone())
        .collect();

    assert_eq!(all.len(), 60);
    assert_eq!(kept.len(), 40);
    assert_eq!(kept, expected);
}
