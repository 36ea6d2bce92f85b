//! `Gene`/`EngineConfig` (de)serialisation, exercised only when the
//! `serde` feature is enabled. Run with `cargo test --features serde`.

#![cfg(feature = "serde")]

use chenard_engine::eval::gene::{self, Gene};
use chenard_engine::EngineConfig;

#[test]
fn gene_round_trips_through_json_with_a_tweaked_value() {
    let mut gene = Gene::defaults();
    gene.set(gene::CHECK_BONUS, 123);

    let json = serde_json::to_string(&gene).unwrap();
    let restored: Gene = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.get(gene::CHECK_BONUS), 123);
    assert_eq!(restored.get(gene::TEMPO_BONUS), gene.get(gene::TEMPO_BONUS));
}

#[test]
fn engine_config_round_trips_through_json() {
    let config = EngineConfig::default().with_tt_bytes(1 << 22).with_randomize(true).with_rng_seed(7);

    let json = serde_json::to_string(&config).unwrap();
    let restored: EngineConfig = serde_json::from_str(&json).unwrap();

    assert_eq!(restored.tt_bytes, 1 << 22);
    assert!(restored.randomize);
    assert_eq!(restored.rng_seed, Some(7));
}
