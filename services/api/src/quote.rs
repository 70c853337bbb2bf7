use crate::infra::parse_weight_unit;
use clap::Args;
use serde_json::json;
use shiprate::config::AppConfig;
use shiprate::error::AppError;
use shiprate::rates::{
    read_line_items, CartContext, DecodeReport, Destination, MethodRegistry, Package, WeightUnit,
};
use std::fs::File;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub(crate) struct QuoteArgs {
    /// Method settings JSON document
    #[arg(long)]
    pub(crate) methods: PathBuf,
    /// Method instance to quote against
    #[arg(long)]
    pub(crate) instance: u32,
    /// Cart line items CSV (quantity,line_subtotal,weight,virtual,shipping_class)
    #[arg(long)]
    pub(crate) items: PathBuf,
    /// Destination state code
    #[arg(long, default_value = "")]
    pub(crate) state: String,
    /// Destination postcode
    #[arg(long, default_value = "")]
    pub(crate) postcode: String,
    /// Unit the item weights are recorded in; defaults to SHIPRATE_WEIGHT_UNIT
    #[arg(long, value_parser = parse_weight_unit)]
    pub(crate) weight_unit: Option<WeightUnit>,
}

#[derive(Args, Debug)]
pub(crate) struct LintArgs {
    /// File holding a stored rules document
    #[arg(long)]
    pub(crate) file: PathBuf,
}

pub(crate) fn run_quote(args: QuoteArgs) -> Result<(), AppError> {
    let QuoteArgs {
        methods,
        instance,
        items,
        state,
        postcode,
        weight_unit,
    } = args;

    let weight_unit = match weight_unit {
        Some(unit) => unit,
        None => AppConfig::load()?.shipping.weight_unit,
    };

    let registry = MethodRegistry::from_path(&methods)?;
    let engine = registry
        .get(instance)
        .ok_or(AppError::UnknownMethod(instance))?;

    let package = Package {
        contents: read_line_items(File::open(&items)?)?,
        destination: Destination { state, postcode },
    };
    let context = CartContext::from_package(&package, weight_unit);
    let evaluation = engine.evaluate(&context);

    let output = json!({
        "instance_id": instance,
        "weight_unit": weight_unit,
        "summary": evaluation.summary(),
        "rate": evaluation.rate(),
        "context": context,
        "evaluation": evaluation,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub(crate) fn run_lint(args: LintArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.file)?;
    let report = DecodeReport::from_text(&raw);

    println!("{}: {} rule(s) decoded", args.file.display(), report.rules.len());
    for (index, rule) in report.rules.iter().enumerate() {
        let scope = if rule.is_universal() {
            "matches every cart"
        } else {
            "filtered"
        };
        println!("  - {} ({scope})", rule.display_name(index));
    }

    if report.is_clean() {
        println!("no issues found");
        return Ok(());
    }

    println!("{} issue(s):", report.issues.len());
    for issue in &report.issues {
        println!("  - {issue}");
    }
    Err(AppError::RulesRejected {
        issues: report.issues.len(),
    })
}
