//! Card Logic Adapter
//!
//! Runs the trait engine over a card record and folds the result back
//! into a shallow copy of that record.

use crate::card::input::{CardRecord, CardTraitInput};
use crate::traits::{apply_trait_engine, TraitEngineResult};
use rayon::prelude::*;
use serde::Serialize;
use serde_json::{Number, Value};
use tracing::debug;

/// Largest integer an f64 holds exactly
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

/// Engine result plus the merged record
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardTraitsOutcome {
    pub result: TraitEngineResult,
    pub next_data: CardRecord,
}

/// Apply the trait engine to one card record.
///
/// Overwrites `baseTraits`, `derivedTraits`, `traitsAdvanced`, `baseAttack`,
/// `baseDefense`, `attack` and `defense`; every other key passes through.
pub fn apply_traits_to_data(data: &CardRecord) -> CardTraitsOutcome {
    let input = CardTraitInput::from_record(data);
    let base_attack = input.base_attack;
    let base_defense = input.base_defense;

    let result = apply_trait_engine(&input.into_params());

    let mut next_data = data.clone();
    next_data.insert("baseTraits".into(), id_array(result.base_traits.iter().map(|t| t.id())));
    next_data
        .insert("derivedTraits".into(), id_array(result.derived_traits.iter().map(|t| t.id())));
    next_data.insert("traitsAdvanced".into(), id_array(result.all_traits.iter().map(|t| t.id())));
    next_data.insert("baseAttack".into(), stat_value(base_attack));
    next_data.insert("baseDefense".into(), stat_value(base_defense));
    next_data.insert("attack".into(), Value::from(result.attack));
    next_data.insert("defense".into(), Value::from(result.defense));

    CardTraitsOutcome { result, next_data }
}

/// Apply the adapter to many records, in parallel once the batch reaches
/// `parallel_threshold`. Output order matches input order.
pub fn apply_traits_batch(
    records: &[CardRecord],
    parallel_threshold: usize,
) -> Vec<CardTraitsOutcome> {
    if records.len() >= parallel_threshold.max(1) {
        debug!(cards = records.len(), "applying traits in parallel");
        records.par_iter().map(apply_traits_to_data).collect()
    } else {
        debug!(cards = records.len(), "applying traits sequentially");
        records.iter().map(apply_traits_to_data).collect()
    }
}

fn id_array<'a>(ids: impl Iterator<Item = &'a str>) -> Value {
    Value::Array(ids.map(Value::from).collect())
}

/// Whole numbers become JSON integers so saved projects keep `4`, not `4.0`
fn stat_value(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() <= MAX_SAFE_INTEGER {
        Value::from(v as i64)
    } else {
        Number::from_f64(v).map(Value::Number).unwrap_or_else(|| Value::from(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;
    use proptest::prelude::*;
    use serde_json::json;

    fn record(value: Value) -> CardRecord {
        match value {
            Value::Object(map) => map,
            _ => panic!("test record must be an object"),
        }
    }

    #[test]
    fn test_legacy_base_trait_field() {
        let data = record(json!({ "baseTrait": "human", "attack": 4, "defense": 4 }));
        let outcome = apply_traits_to_data(&data);

        assert_eq!(outcome.next_data["attack"], json!(4));
        assert_eq!(outcome.next_data["defense"], json!(5));
        assert_eq!(outcome.next_data["traitsAdvanced"], json!(["human", "tactical"]));

        assert_json_snapshot!(outcome.next_data, @r###"
        {
          "attack": 4,
          "baseAttack": 4,
          "baseDefense": 4,
          "baseTrait": "human",
          "baseTraits": [
            "human"
          ],
          "defense": 5,
          "derivedTraits": [
            "tactical"
          ],
          "traitsAdvanced": [
            "human",
            "tactical"
          ]
        }
        "###);
    }

    #[test]
    fn test_unrelated_fields_pass_through() {
        let data = record(json!({
            "name": "Grey Warden",
            "frame": { "color": "#334455", "badges": [1, 2] },
            "baseTraits": "animal|swordsman",
            "baseAttack": 3,
            "baseDefense": 2,
        }));
        let outcome = apply_traits_to_data(&data);

        assert_eq!(outcome.next_data["name"], json!("Grey Warden"));
        assert_eq!(outcome.next_data["frame"], data["frame"]);
        assert_eq!(outcome.next_data["baseTraits"], json!(["animal", "swordsman"]));
        assert_eq!(outcome.next_data["derivedTraits"], json!(["ferocious", "swift"]));
        assert_eq!(outcome.next_data["attack"], json!(6));
        assert_eq!(outcome.next_data["defense"], json!(1));
        // input untouched
        assert_eq!(data["baseTraits"], json!("animal|swordsman"));
    }

    #[test]
    fn test_empty_record() {
        let outcome = apply_traits_to_data(&CardRecord::new());
        assert_eq!(outcome.next_data["baseTraits"], json!([]));
        assert_eq!(outcome.next_data["traitsAdvanced"], json!([]));
        assert_eq!(outcome.next_data["baseAttack"], json!(0));
        assert_eq!(outcome.next_data["attack"], json!(0));
    }

    #[test]
    fn test_fractional_base_stats_kept() {
        let data = record(json!({ "baseAttack": 2.5, "defense": "x" }));
        let outcome = apply_traits_to_data(&data);
        assert_eq!(outcome.next_data["baseAttack"], json!(2.5));
        assert_eq!(outcome.next_data["baseDefense"], json!(0));
        assert_eq!(outcome.next_data["attack"], json!(3));
    }

    #[test]
    fn test_batch_preserves_order() {
        let records: Vec<CardRecord> = (0..20)
            .map(|i| record(json!({ "id": i, "baseTraits": ["animal"], "attack": i })))
            .collect();

        let sequential = apply_traits_batch(&records, usize::MAX);
        let parallel = apply_traits_batch(&records, 1);
        assert_eq!(sequential, parallel);

        for (i, outcome) in parallel.iter().enumerate() {
            assert_eq!(outcome.next_data["id"], json!(i));
            assert_eq!(outcome.result.attack, i as u32 + 2);
        }
    }

    #[test]
    fn test_reapply_with_unknown_primary_trait_field() {
        let data = record(json!({
            "baseTraits": "elf",
            "traitsBase": "human",
            "attack": 4,
            "defense": 4,
        }));
        let first = apply_traits_to_data(&data);
        assert_eq!(first.next_data["traitsAdvanced"], json!(["human", "tactical"]));
        assert_eq!(first.next_data["defense"], json!(5));

        let second = apply_traits_to_data(&first.next_data);
        assert_eq!(first.next_data, second.next_data);
    }

    fn trait_value_strategy() -> impl Strategy<Value = Value> {
        let token = prop::sample::select(vec![
            "human", "Animal", " swordsman", "SWORDSMAN", "elf", "tactical", "", "  ",
        ]);
        let element = prop_oneof![
            token.clone().prop_map(Value::from),
            Just(Value::Null),
            (-3i64..3).prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            Just(json!(["human"])),
        ];
        prop_oneof![
            Just(Value::Null),
            token.prop_map(Value::from),
            "[a-z ,|]{0,20}".prop_map(Value::from),
            (-5i64..5).prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            Just(json!({ "human": true })),
            prop::collection::vec(element, 0..5).prop_map(Value::Array),
        ]
    }

    fn stat_value_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            (-20i64..20).prop_map(Value::from),
            (-20.0f64..20.0).prop_map(Value::from),
            (-20i64..20).prop_map(|n| Value::from(n.to_string())),
            Just(json!("lots")),
            Just(json!("NaN")),
            any::<bool>().prop_map(Value::from),
            Just(json!([3])),
        ]
    }

    /// Any subset of the trait fields and both stat field pairs
    fn card_strategy() -> impl Strategy<Value = CardRecord> {
        let traits = prop::collection::vec(prop::option::of(trait_value_strategy()), 3);
        let stats = prop::collection::vec(prop::option::of(stat_value_strategy()), 4);
        (traits, stats).prop_map(|(traits, stats)| {
            let mut data = CardRecord::new();
            let trait_fields = crate::card::input::TRAIT_FIELDS.iter();
            for (field, value) in trait_fields.zip(traits) {
                if let Some(value) = value {
                    data.insert(field.to_string(), value);
                }
            }
            let stat_fields = ["baseAttack", "attack", "baseDefense", "defense"];
            for (field, value) in stat_fields.iter().zip(stats) {
                if let Some(value) = value {
                    data.insert(field.to_string(), value);
                }
            }
            data
        })
    }

    proptest! {
        #[test]
        fn prop_adapter_is_a_fixed_point(data in card_strategy()) {
            let first = apply_traits_to_data(&data);
            let second = apply_traits_to_data(&first.next_data);
            prop_assert_eq!(&first.next_data, &second.next_data);
            prop_assert_eq!(first.result, second.result);
        }
    }
}
