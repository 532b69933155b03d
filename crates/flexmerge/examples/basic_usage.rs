//! Walkthrough of the merge strategies on a layered configuration.
//!
//! Run with `cargo run -p flexmerge --example basic_usage`.

use flexmerge::{merge_shallow, merge_unique, MergeResult, Merger, Sequence};
use serde_json::{json, Value};

fn main() -> MergeResult<()> {
    let defaults = json!({
        "database": {"host": "localhost", "port": 5432, "options": ["ssl", "timeout"]},
        "features": ["auth", "logging"],
        "debug": false
    });
    let production = json!({
        "database": {"host": "prod.example.com", "options": ["ssl", "pooling"]},
        "features": ["auth", "monitoring"],
        "cache": {"redis": "redis.example.com"}
    });
    let user = json!({
        "database": {"timeout": 30},
        "features": ["auth", "custom_feature"],
        "debug": true
    });
    let layers = [defaults, production, user];

    for sequences in ["append", "prepend", "unique", "replace", "keep"] {
        let merger = Merger::new().sequences(sequences)?;
        show(&merger.describe(), merger.merge(&layers)?);
    }

    show("merge_unique", merge_unique(&layers)?);
    show("merge_shallow", merge_shallow(&layers)?);

    let mut merger = Merger::new();
    merger.register_sequence_strategy("sorted", |left: Sequence, right: Sequence| {
        let mut items: Vec<String> = left
            .iter()
            .chain(&right)
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect();
        items.sort();
        items.dedup();
        items.into_iter().map(Value::from).collect()
    });
    merger.set_sequence_strategy("sorted")?;
    show(&merger.describe(), merger.merge(&layers)?);

    Ok(())
}

fn show(label: &str, merged: flexmerge::Mapping) {
    let rendered = serde_json::to_string_pretty(&Value::Object(merged)).unwrap_or_default();
    println!("{label}:\n{rendered}\n");
}
