use clap::Args;
use shiprate::error::AppError;
use shiprate::rates::{CartContext, MethodRegistry};

const SAMPLE_METHODS: &str = r#"{
  "methods": [
    {
      "instance_id": 1,
      "title": "Standard Courier",
      "free_shipping_threshold": "999",
      "handling_fee": "10",
      "calc_type": "cheapest",
      "weight_rounding": "ceil",
      "rules": [
        {"name": "light parcel", "max_weight": 2, "base": 40},
        {"name": "heavy parcel", "min_weight": 2.0001, "base": 40, "per_kg": 15},
        {"name": "delhi ncr", "states": ["DL", "HR", "UP"], "postcodes": ["^1[12]", "^20[01]"], "base": 30}
      ]
    },
    {
      "instance_id": 2,
      "title": "Freight Stack",
      "calc_type": "sum",
      "rules_json": "[{\"name\":\"dock fee\",\"base\":\"25\"},{\"name\":\"per kilo\",\"per_kg\":\"6\",\"min_weight\":\"5\"},{\"name\":\"insurance\",\"percent\":\"1.5\",\"min_subtotal\":\"2000\"},{\"name\":\"fragile\",\"shipping_class\":\"fragile\",\"base\":50}]"
    },
    {
      "instance_id": 3,
      "title": "Premium Express",
      "calc_type": "highest",
      "tax_status": "none",
      "rules": [
        {"name": "metro", "postcodes": ["^(11|40|56|60)"], "base": 120},
        {"name": "bulk orders", "min_qty": 10, "base": 180},
        {"name": "everywhere else", "base": 95, "per_kg": 5}
      ]
    }
  ]
}"#;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Only run the sample method with this instance id
    #[arg(long)]
    pub(crate) instance: Option<u32>,
    /// Print the full evaluation for each cart instead of a one-line summary
    #[arg(long)]
    pub(crate) verbose: bool,
}

fn sample_carts() -> Vec<(&'static str, CartContext)> {
    vec![
        (
            "small order to Delhi",
            CartContext::new(1.2, 450.0, 2).with_destination("DL", "110017"),
        ),
        (
            "heavy fragile order to Mumbai",
            CartContext::new(7.35, 2_400.0, 3)
                .with_shipping_class("fragile")
                .with_destination("MH", "400050"),
        ),
        (
            "bulk order to Jaipur",
            CartContext::new(3.6, 880.0, 12).with_destination("RJ", "302001"),
        ),
        (
            "large basket",
            CartContext::new(0.4, 1_250.0, 1).with_destination("KA", "560001"),
        ),
    ]
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let registry = MethodRegistry::from_reader(SAMPLE_METHODS.as_bytes())?;
    let carts = sample_carts();

    for summary in registry.summaries() {
        if args
            .instance
            .is_some_and(|instance| instance != summary.instance_id)
        {
            continue;
        }
        let Some(engine) = registry.get(summary.instance_id) else {
            continue;
        };

        println!(
            "{} (instance {}, {:?}, {} rule(s))",
            summary.title, summary.instance_id, summary.calc_type, summary.rule_count
        );
        for (label, cart) in &carts {
            let evaluation = engine.evaluate(cart);
            if args.verbose {
                println!("  {label}:");
                println!("{}", serde_json::to_string_pretty(&evaluation)?);
            } else {
                println!("  {label}: {}", evaluation.summary());
            }
        }
        println!();
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_methods_load() {
        let registry = MethodRegistry::from_reader(SAMPLE_METHODS.as_bytes()).expect("loads");
        assert_eq!(registry.len(), 3);
        assert!(registry
            .summaries()
            .iter()
            .all(|summary| summary.rule_count > 0));
    }

    #[test]
    fn sample_carts_quote_as_documented() {
        let registry = MethodRegistry::from_reader(SAMPLE_METHODS.as_bytes()).expect("loads");
        let courier = registry.get(1).expect("courier");
        let carts = sample_carts();

        // delhi ncr tier (30) beats light parcel (40), plus handling.
        assert_eq!(courier.quote(&carts[0].1).expect("rated").cost, 40.0);
        // Threshold reached.
        assert_eq!(courier.quote(&carts[3].1).expect("free").cost, 0.0);

        let freight = registry.get(2).expect("freight");
        // 25 + 6 * 7.35 + 1.5% of 2400 + 50
        let cost = freight.quote(&carts[1].1).expect("rated").cost;
        assert!((cost - 155.1).abs() < 1e-9, "{cost}");
    }

    #[test]
    fn demo_runs_for_single_instance() {
        let args = DemoArgs {
            instance: Some(3),
            verbose: true,
        };
        run_demo(args).expect("demo runs");
    }
}
