use anyhow::{Context, Result};
use colored::Colorize;
use gymlog::models::{Category, ExerciseTemplate};
use gymlog::services::seed_defaults;
use gymlog::storage::WorkoutStore;

use super::AppContext;

pub async fn init(ctx: &AppContext) -> Result<()> {
    let mut store = ctx.open_store()?;
    let report = seed_defaults(&mut store).context("Failed to seed exercise templates")?;

    if report.categories == 0 && report.templates == 0 {
        println!("Exercise templates are already up to date.");
    } else {
        println!(
            "{} Added {} categories and {} exercise templates",
            "✓".green(),
            report.categories,
            report.templates
        );
    }
    println!();
    println!("Log a workout with: gymlog workout log -e \"Bench Press=5x185\"");

    Ok(())
}

/// Templates to show, sorted by category then name
pub fn visible_templates(
    templates: Vec<ExerciseTemplate>,
    categories: &[Category],
    category: Option<&str>,
    show_hidden: bool,
) -> Vec<ExerciseTemplate> {
    let wanted = category.map(|name| {
        categories
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.id)
    });

    let category_name = |t: &ExerciseTemplate| {
        t.category_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map(|c| c.name.clone())
            .unwrap_or_default()
    };

    let mut templates: Vec<ExerciseTemplate> = templates
        .into_iter()
        .filter(|t| show_hidden || t.is_visible())
        .filter(|t| match wanted {
            Some(id) => id.is_some() && t.category_id == id,
            None => true,
        })
        .collect();

    templates.sort_by(|a, b| {
        category_name(a)
            .cmp(&category_name(b))
            .then_with(|| a.name.cmp(&b.name))
    });
    templates
}

pub async fn list_templates(
    ctx: &AppContext,
    category: Option<String>,
    show_hidden: bool,
) -> Result<()> {
    let store = ctx.open_store()?;
    let categories = store.fetch_categories()?;
    let templates = visible_templates(
        store.fetch_templates()?,
        &categories,
        category.as_deref(),
        show_hidden,
    );

    if templates.is_empty() {
        println!("No exercise templates found. Run `gymlog init` to add the standard set.");
        return Ok(());
    }

    println!("{}", "Exercise Templates".bold());
    println!();
    for template in &templates {
        let category = template
            .category_id
            .and_then(|id| categories.iter().find(|c| c.id == id))
            .map(|c| c.name.as_str())
            .unwrap_or("Uncategorized");
        let mut flags = Vec::new();
        if template.is_custom {
            flags.push("custom");
        }
        if template.is_hidden {
            flags.push("hidden");
        }

        println!(
            "{:<26} {:<12} {:<11} {}",
            template.name,
            category,
            template.modality,
            flags.join(", ").dimmed()
        );
    }

    Ok(())
}

pub async fn list_categories(ctx: &AppContext) -> Result<()> {
    let store = ctx.open_store()?;
    let mut categories = store.fetch_categories()?;
    categories.sort_by(|a, b| a.name.cmp(&b.name));

    if categories.is_empty() {
        println!("No categories found. Run `gymlog init` to add the standard set.");
        return Ok(());
    }

    let templates = store.fetch_templates()?;
    println!("{}", "Categories".bold());
    println!();
    for category in &categories {
        let count = templates
            .iter()
            .filter(|t| t.category_id == Some(category.id))
            .count();
        println!("{:<12} {:>3} exercise(s)", category.name, count);
    }

    Ok(())
}
