use shiprate::rates::{
    compute_rate, read_line_items, CalcType, CartContext, Destination, Evaluation,
    MethodConfiguration, MethodRegistry, Package, SettingsError, WeightRounding, WeightUnit,
};

const METHODS: &str = r#"{
  "methods": [
    {
      "instance_id": "3",
      "title": "Road Freight",
      "free_shipping_threshold": "0",
      "handling_fee": "5",
      "calc_type": "sum",
      "weight_rounding": "ceil",
      "rules_json": "[{\"name\":\"base\",\"base\":\"20\"},{\"name\":\"per kilo\",\"per_kg\":\"4\",\"min_weight\":\"1\"},{\"name\":\"bulky\",\"shipping_class\":\"bulky\",\"base\":35}]"
    },
    {
      "instance_id": 8,
      "title": "Metro Same Day",
      "free_shipping_threshold": 1500,
      "calc_type": "cheapest",
      "rules": [
        {"name": "north", "states": ["DL", "HR"], "postcodes": ["^1[12]"], "base": 60},
        {"name": "metro fallback", "postcodes": ["^(11|40|56)"], "base": 90}
      ]
    }
  ]
}"#;

fn registry() -> MethodRegistry {
    MethodRegistry::from_reader(METHODS.as_bytes()).expect("methods load")
}

fn csv_package(csv: &str, state: &str, postcode: &str) -> Package {
    Package {
        contents: read_line_items(csv.as_bytes()).expect("csv parses"),
        destination: Destination {
            state: state.to_string(),
            postcode: postcode.to_string(),
        },
    }
}

#[test]
fn road_freight_sums_matching_tiers_with_rounded_weight() {
    let csv = "quantity,line_subtotal,weight,virtual,shipping_class\n\
2,80.00,650,,bulky\n\
1,15.00,200,1,\n";
    let package = csv_package(csv, "MH", "400001");
    let context = CartContext::from_package(&package, WeightUnit::G);
    assert_eq!(context.weight_kg, 1.3);
    assert_eq!(context.subtotal, 95.0);
    assert_eq!(context.item_qty, 3);

    let engine = registry().get(3).expect("road freight configured");
    let rate = engine.quote(&context).expect("rules match");

    // 20 + 4 * ceil(1.3) + 35, then handling.
    assert_eq!(rate.cost, 20.0 + 8.0 + 35.0 + 5.0);
    assert_eq!(rate.label, "Road Freight");
    assert_eq!(rate.id, "tiered_shipping:3");
}

#[test]
fn same_day_prefers_cheapest_destination_tier() {
    let engine = registry().get(8).expect("same day configured");

    let delhi = CartContext::new(0.8, 300.0, 1).with_destination("dl", "110017");
    assert_eq!(engine.quote(&delhi).expect("north tier").cost, 60.0);

    let mumbai = CartContext::new(0.8, 300.0, 1).with_destination("MH", "400050");
    assert_eq!(engine.quote(&mumbai).expect("metro fallback").cost, 90.0);

    let rural = CartContext::new(0.8, 300.0, 1).with_destination("RJ", "302001");
    assert!(engine.quote(&rural).is_none());

    let big_order = CartContext::new(0.8, 1500.0, 1).with_destination("RJ", "302001");
    assert!(matches!(
        engine.evaluate(&big_order),
        Evaluation::FreeShipping { .. }
    ));
}

#[test]
fn registry_summaries_follow_instance_order() {
    let summaries = registry().summaries();
    let ids: Vec<u32> = summaries.iter().map(|summary| summary.instance_id).collect();
    assert_eq!(ids, [3, 8]);
    assert_eq!(summaries[0].calc_type, CalcType::Sum);
    assert_eq!(summaries[0].weight_rounding, WeightRounding::Ceil);
    assert_eq!(summaries[1].rule_count, 2);
}

#[test]
fn duplicate_instances_are_rejected() {
    let doc = r#"[{"instance_id": 2}, {"instance_id": "2"}]"#;
    let err = MethodRegistry::from_reader(doc.as_bytes()).expect_err("duplicate ids");
    assert!(matches!(err, SettingsError::DuplicateInstance(2)));
}

#[test]
fn unreadable_settings_file_reports_path() {
    let err = MethodRegistry::from_path(std::path::Path::new("/nonexistent/methods.json"))
        .expect_err("file missing");
    assert!(err.to_string().contains("/nonexistent/methods.json"));
}

#[test]
fn ceil_rounding_keeps_unrounded_bounds() {
    let config = MethodConfiguration {
        weight_rounding: WeightRounding::Ceil,
        ..MethodConfiguration::default()
    };
    let blob = r#"[{"min_weight": 0.5, "max_weight": 1.5, "per_kg": 10}]"#;

    let rate = compute_rate(&config, blob, &CartContext::new(1.2, 0.0, 1)).expect("matches");
    assert_eq!(rate.cost, 20.0);
}

#[test]
fn sum_policy_is_not_capped() {
    let config = MethodConfiguration {
        calc_type: CalcType::Sum,
        ..MethodConfiguration::default()
    };
    let blob = serde_json::to_string(&vec![serde_json::json!({ "base": 100 }); 50])
        .expect("blob serializes");

    let rate = compute_rate(&config, &blob, &CartContext::new(1.0, 1.0, 1)).expect("matches");
    assert_eq!(rate.cost, 5_000.0);
}
