//! rebind - inspect, edit and watch input bindings

use std::sync::Arc;
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use clap::Parser;

use rebind::cli::{CliArgs, CliCommand};
use rebind::config::RebindConfig;
use rebind::keymap::{
    gameplay_defaults, global_defaults, Action, DefaultBindingProvider, GameplayAction,
    GlobalAction, KeyCombination,
};
use rebind::store::{reset_to_defaults, seed_defaults, StoreWatcher};
use rebind::{BindingController, BindingResolver, KeyBindingStore, Resolution, Scope};

/// How often `watch` polls the store file watcher
const WATCH_POLL_INTERVAL: Duration = Duration::from_millis(100);

fn main() -> Result<()> {
    let args = CliArgs::parse();
    rebind::tracing::init();

    let config = match &args.config {
        Some(path) => RebindConfig::load_from(path),
        None => RebindConfig::load(),
    };
    let scope = args.scope()?;

    let store_path = args
        .store
        .clone()
        .or_else(|| config.resolved_store_path())
        .context("No binding store path available; pass --store")?;
    let store = Arc::new(
        KeyBindingStore::open(&store_path)
            .with_context(|| format!("Failed to open binding store {}", store_path.display()))?,
    );

    if scope.is_global() {
        run::<GlobalAction>(args.command, scope, store, Arc::new(global_defaults()), &config)
    } else {
        run::<GameplayAction>(args.command, scope, store, Arc::new(gameplay_defaults()), &config)
    }
}

fn run<A: Action>(
    command: CliCommand,
    scope: Scope,
    store: Arc<KeyBindingStore>,
    defaults: Arc<dyn DefaultBindingProvider<A>>,
    config: &RebindConfig,
) -> Result<()> {
    let resolver = Arc::new(BindingResolver::new(
        scope,
        Arc::clone(&store),
        defaults,
        config.matching_options(),
    )?);

    if config.seed_defaults && command != CliCommand::Reset {
        seed_defaults(&store, resolver.scope(), &resolver.default_bindings())
            .context("Failed to seed default bindings")?;
    }

    match command {
        CliCommand::Show { json } => {
            let resolution = resolver.recompute()?;
            if json {
                print_json(&resolver)?;
            } else {
                print_bindings(&resolver, matches!(resolution, Resolution::Defaults { .. }));
            }
        }
        CliCommand::Bind {
            combination,
            action,
        } => {
            let combination: KeyCombination = combination.parse()?;
            let action: A = action
                .parse()
                .map_err(|_| anyhow!("Unknown action '{}' for {}", action, resolver.scope()))?;
            let (ruleset_id, variant) = durable_key(resolver.scope())?;

            let mut tx = store.begin_write()?;
            tx.insert(ruleset_id, variant, combination.clone(), action);
            tx.commit()?;
            println!("Bound {} to {}", combination, action);
        }
        CliCommand::Unbind { combination } => {
            let combination: KeyCombination = combination.parse()?;
            let (ruleset_id, variant) = durable_key(resolver.scope())?;

            let mut tx = store.begin_write()?;
            let removed = tx.remove_where(|r| {
                r.belongs_to(ruleset_id, variant) && r.combination == combination
            });
            tx.commit()?;
            println!("Removed {} binding(s) for {}", removed, combination);
        }
        CliCommand::Reset => {
            durable_key(resolver.scope())?;
            reset_to_defaults(&store, resolver.scope(), &resolver.default_bindings())?;
            println!("Reset {} to defaults", resolver.scope());
        }
        CliCommand::Press { combination } => {
            let pressed: KeyCombination = combination.parse()?;
            resolver.recompute()?;
            let actions = resolver.actions_for(&pressed);
            if actions.is_empty() {
                println!("{}: no action", pressed);
            } else {
                let names: Vec<String> = actions.iter().map(|a| a.to_string()).collect();
                println!("{}: {}", pressed, names.join(", "));
            }
        }
        CliCommand::Watch => watch(&store, resolver, config)?,
    }

    Ok(())
}

/// The store key for a scope that can hold overrides
fn durable_key(scope: &Scope) -> Result<(Option<rebind::RulesetId>, Option<i32>)> {
    match scope.store_key() {
        Some(key) => Ok(key),
        None => bail!(
            "Ruleset of {} has no durable identity; pass --ruleset-id to edit its bindings",
            scope
        ),
    }
}

fn watch<A: Action>(
    store: &Arc<KeyBindingStore>,
    resolver: Arc<BindingResolver<A, KeyBindingStore>>,
    config: &RebindConfig,
) -> Result<()> {
    let path = store
        .path()
        .context("Watching requires a file-backed store")?
        .to_path_buf();
    let watcher = StoreWatcher::new(&path, config.watch_debounce())
        .with_context(|| format!("Failed to watch {}", path.display()))?;

    let controller = BindingController::new(Arc::clone(&resolver));
    controller.activate()?;

    println!("Watching {} (Ctrl+C to stop)", path.display());
    let fallback = resolver.scope().store_key().is_none();
    print_bindings(&resolver, fallback);

    let mut seen = resolver.generation();
    loop {
        std::thread::sleep(WATCH_POLL_INTERVAL);

        if let Err(e) = watcher.poll_and_reload(store) {
            tracing::warn!("Failed to reload binding store: {}", e);
            eprintln!("Failed to reload binding store: {}", e);
        }

        let generation = resolver.generation();
        if generation != seen {
            seen = generation;
            println!();
            print_bindings(&resolver, fallback);
        }
    }
}

fn print_bindings<A: Action>(resolver: &BindingResolver<A, KeyBindingStore>, fallback: bool) {
    let bindings = resolver.effective_bindings();

    if fallback {
        println!(
            "{} (defaults; ruleset has no durable identity)",
            resolver.scope()
        );
    } else {
        println!("{}", resolver.scope());
    }

    if bindings.is_empty() {
        println!("  (no bindings)");
        return;
    }

    let width = bindings
        .iter()
        .map(|b| b.combination.to_string().len())
        .max()
        .unwrap_or(0);
    for binding in bindings.iter() {
        println!(
            "  {:width$}  {}",
            binding.combination.to_string(),
            binding.action,
            width = width
        );
    }
}

fn print_json<A: Action>(resolver: &BindingResolver<A, KeyBindingStore>) -> Result<()> {
    let bindings: Vec<serde_json::Value> = resolver
        .effective_bindings()
        .iter()
        .map(|b| {
            serde_json::json!({
                "keys": b.combination.to_string(),
                "action": b.action.to_string(),
            })
        })
        .collect();
    let document = serde_json::json!({
        "scope": resolver.scope().to_string(),
        "bindings": bindings,
    });
    println!("{}", serde_json::to_string_pretty(&document)?);
    Ok(())
}
