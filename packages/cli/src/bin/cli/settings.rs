// ABOUTME: CLI commands for reading and writing a settings table
// ABOUTME: list, get, set and validate against the store built from config and flags

use anyhow::{anyhow, Context};
use cairn_cli::{display_value, open_store, parse_assignments, StoreOptions};
use cairn_config::SettingsConfig;
use cairn_settings::{RuleValidator, SettingsError, SettingsStore};
use colored::*;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use std::collections::BTreeMap;

async fn store_for(options: &StoreOptions) -> anyhow::Result<SettingsStore<RuleValidator>> {
    let config = SettingsConfig::from_env().context("Failed to load settings config")?;
    let store = open_store(&config, options).await?;
    Ok(store)
}

pub async fn list(options: &StoreOptions, reload: bool) -> anyhow::Result<()> {
    let mut store = store_for(options).await?;
    let policies = store.policies().clone();
    let table_name = store.table().to_string();
    let settings = store.resolve(reload).await?;

    println!("{}", format!("Settings - {}", table_name).blue().bold());
    println!();

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);

    table.set_header(vec!["Key", "Value", "Policy"]);

    for (key, value) in settings.iter() {
        let mut flags = Vec::new();
        if policies.is_serialized(key) {
            flags.push("serialized");
        }
        if policies.is_encrypted(key) {
            flags.push("encrypted");
        }
        if policies.is_new_line(key) {
            flags.push("lines");
        }

        table.add_row(vec![
            key.clone(),
            display_value(key, value, &policies),
            flags.join(", "),
        ]);
    }

    println!("{}", table);
    println!("Total: {} settings", settings.len().to_string().cyan());

    Ok(())
}

pub async fn get(options: &StoreOptions, key: &str) -> anyhow::Result<()> {
    let mut store = store_for(options).await?;
    let policies = store.policies().clone();
    let settings = store.resolve(false).await?;

    let value = settings
        .get(key)
        .ok_or_else(|| anyhow!("Unknown setting '{}'", key))?;
    println!("{}", display_value(key, value, &policies));

    Ok(())
}

pub async fn set(options: &StoreOptions, assignments: &[String]) -> anyhow::Result<()> {
    let store = store_for(options).await?;
    let update = parse_assignments(assignments, &options.serialized)?;

    if let Err(e) = store.validate(&update, &BTreeMap::new()) {
        print_validation_failure(&e);
        return Err(e.into());
    }

    let summary = store.update(update).await?;

    for key in &summary.written {
        println!("{} {}", "✓".green().bold(), key);
    }
    for key in &summary.skipped {
        println!(
            "{} {} {}",
            "⚠".yellow().bold(),
            key,
            "(unknown setting, not written)".dimmed()
        );
    }

    Ok(())
}

pub async fn validate(options: &StoreOptions, assignments: &[String]) -> anyhow::Result<()> {
    let store = store_for(options).await?;
    let update = parse_assignments(assignments, &options.serialized)?;

    match store.validate(&update, &BTreeMap::new()) {
        Ok(()) => {
            println!(
                "{} {} values valid",
                "✓".green().bold(),
                update.values().len()
            );
            Ok(())
        }
        Err(e) => {
            print_validation_failure(&e);
            Err(e.into())
        }
    }
}

fn print_validation_failure(error: &SettingsError) {
    if let SettingsError::Validation(report) = error {
        for entry in &report.0 {
            eprintln!(
                "{} {}: {} {}",
                "✗".red().bold(),
                entry.key.bold(),
                entry.message,
                format!("({})", entry.detail).dimmed()
            );
        }
    }
}
