//! CLI-only commands: plan info, catalog listing, selection editing, favorites.
//!
//! These drive the library the way a host application would and produce plain text.

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use crate::core::app;
use crate::core::catalog::favorites::{LocalFavorites, spawn_favorite_toggle};
use crate::core::catalog::{AudioCategory, ModelDescriptor};
use crate::core::config::Config;
use crate::core::entitlement;
use crate::core::limits;
use crate::core::paths;
use crate::core::plan::{ContentType, ParsedPlan, PlanCache};
use crate::core::selection::{
    AudioSlots, SelectionSession, SelectionStore, Saved, Toggled, min_selection,
};

type CliResult = Result<(), Box<dyn Error>>;

/// How long `favorite` waits for the background toggle before giving up on the report.
const FAVORITE_REPORT_TIMEOUT: Duration = Duration::from_secs(10);

fn dash_if_empty(items: Vec<&str>) -> String {
    if items.is_empty() {
        "—".to_string()
    } else {
        items.join(", ")
    }
}

/// Run the `plan` command: decode a plan identifier and show what it grants.
pub fn run_plan(config: &Config, raw: Option<&str>, cache: &mut PlanCache) -> CliResult {
    let catalog = config.catalog()?;
    let raw = raw.unwrap_or(&config.plan_id);
    let plan = cache.get(raw);

    println!("Plan:     {}", plan.label());
    println!("Tier:     {}", plan.tier);
    println!(
        "Billing:  {}",
        plan.billing_cycle.map(|c| c.label()).unwrap_or("—")
    );
    println!(
        "Features: {}",
        dash_if_empty(plan.features.iter().map(|c| c.label()).collect())
    );
    println!();
    for ct in ContentType::ALL {
        println!(
            "  {:<6} access {:<9} up to {} selected (at least {}), {} of {} models available",
            ct.label(),
            entitlement::effective_tier(plan, ct).label(),
            limits::max_selectable(plan, ct),
            min_selection(ct),
            catalog.accessible(plan, ct).len(),
            catalog.for_content_type(ct).len()
        );
    }
    Ok(())
}

fn model_line(model: &ModelDescriptor, plan: &ParsedPlan) -> String {
    let status = if entitlement::is_accessible(model, plan) {
        "available".to_string()
    } else {
        format!("requires {}", model.required_tier)
    };
    format!(
        "{} {:<24} {:<26} {:<6} {:<4} {}",
        if model.favorite { "*" } else { " " },
        model.id,
        model.display_name(),
        model.category.label(),
        model.audio_category.map(|c| c.label()).unwrap_or(""),
        status
    )
}

/// Run the `models` command: list catalog models with access status for the plan.
pub fn run_models(
    config: &Config,
    cache: &mut PlanCache,
    content_type: Option<ContentType>,
    query: Option<&str>,
) -> CliResult {
    let plan = cache.get(&config.plan_id).clone();
    let mut catalog = Arc::unwrap_or_clone(config.catalog()?);

    match LocalFavorites::open_default().and_then(|f| f.load()) {
        Ok(favorites) => {
            for id in favorites {
                catalog.set_favorite(&id, true);
            }
        }
        Err(e) => log::warn!("Failed to load favorites: {}", e),
    }

    let models: Vec<&ModelDescriptor> = catalog
        .filter(query.unwrap_or(""))
        .into_iter()
        .filter(|m| content_type.is_none_or(|ct| m.category == ct))
        .collect();
    if models.is_empty() {
        println!("No models found.");
        return Ok(());
    }
    for model in models {
        println!("{}", model_line(model, &plan));
    }
    Ok(())
}

fn print_toggled(toggled: &Toggled) {
    match toggled {
        Toggled::Selected(id) => println!("+ {}", id),
        Toggled::Deselected(id) => println!("- {}", id),
        Toggled::Replaced { previous, current } => println!("~ {} -> {}", previous, current),
        Toggled::Denied(violation) => eprintln!("! {}", violation),
    }
}

/// Options for the `toggle` command.
pub struct ToggleRequest<'a> {
    pub content_type: ContentType,
    pub audio_category: Option<AudioCategory>,
    /// Start from an empty selection instead of the committed one.
    pub replace: bool,
    pub model_ids: &'a [String],
}

/// Run the `toggle` command: open a session, toggle each id, save.
pub fn run_toggle(
    config: &Config,
    cache: &mut PlanCache,
    request: ToggleRequest<'_>,
) -> CliResult {
    let plan = cache.get(&config.plan_id).clone();
    let mut session = SelectionSession::new(plan, config.catalog()?, config.store());

    session.open(request.content_type)?;
    if let Some(category) = request.audio_category {
        session.switch_audio_category(category)?;
    }
    if request.replace {
        session.remove_all()?;
    }
    for id in request.model_ids {
        let toggled = session.toggle(id)?;
        print_toggled(&toggled);
    }

    match session.save()? {
        Saved::Committed(ct) => {
            println!("Saved {} selection.", ct);
            Ok(())
        }
        Saved::Rejected(violation) => {
            session.cancel()?;
            Err(violation.to_string().into())
        }
    }
}

fn print_audio(slots: &AudioSlots) {
    for (category, model) in slots.iter() {
        println!("  {:<6} {}", category.label(), model.unwrap_or("—"));
    }
}

/// Run the `selection` command: print committed selections.
pub fn run_selection(config: &Config) -> CliResult {
    let store = config.store();
    for ct in [ContentType::Chat, ContentType::Image, ContentType::Video] {
        let models = store.load_models(ct)?;
        println!(
            "{:<6} {}",
            ct.label(),
            dash_if_empty(models.iter().map(String::as_str).collect())
        );
    }
    println!("{}", ContentType::Audio.label());
    print_audio(&store.load_audio()?);
    Ok(())
}

/// Run the `favorite` command: toggle a favorite in the background and report.
pub fn run_favorite(config: &Config, model_id: &str, favorite: bool) -> CliResult {
    let catalog = config.catalog()?;
    if catalog.find(model_id).is_none() {
        return Err(format!("Unknown model '{}'", model_id).into());
    }
    let service = Arc::new(LocalFavorites::open_default()?);
    let rx = spawn_favorite_toggle(service, model_id, favorite);
    let report = rx.recv_timeout(FAVORITE_REPORT_TIMEOUT)?;
    match report.result {
        Ok(()) if report.favorite => println!("Added {} to favorites.", report.model_id),
        Ok(()) => println!("Removed {} from favorites.", report.model_id),
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

/// Run the `config` command: display paths and plan status.
pub fn run_config(config: &Config) {
    let config_dir = paths::config_dir()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "—".to_string());
    let catalog = config
        .catalog_path
        .as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "built-in".to_string());

    println!("Version:   {} {}", app::NAME, app::VERSION);
    println!("Config:    {}", config_dir);
    println!("Store:     {}", config.store_path.display());
    println!("Catalog:   {}", catalog);
    println!("Plan:      {} ({})", config.plan_id, config.plan_source.label());
}
