//! CLI binary for pagetree: inspect pages, routes and config inheritance.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use pagetree_core::{LocationId, PagetreeSettings, filesystem_route_string};
use pagetree_resolve::{PageRoute, ResolvedConfig, ResolvedPage, Resolver};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pagetree", about = "Filesystem routing and config inheritance inspector")]
struct Cli {
    /// Project root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    project: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every page with its route
    Pages {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show where a page's config comes from
    Explain {
        /// Page location, e.g. /pages/admin
        page: String,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Show the location id and default route of a project file
    Locate {
        /// Project-relative file path, e.g. /pages/about/+Page.tsx
        file: String,
    },
}

fn get_project_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.project {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let project_root = get_project_root(&cli)?;

    match cli.command {
        Commands::Pages { json } => cmd_pages(&project_root, json),
        Commands::Explain { page, json } => cmd_explain(&project_root, &page, json),
        Commands::Locate { file } => cmd_locate(&file),
    }
}

/// Discover the project's config and build a resolver over it.
fn load_resolver(project_root: &Path) -> Result<Resolver> {
    use indicatif::{ProgressBar, ProgressStyle};

    let settings = PagetreeSettings::load(project_root)
        .with_context(|| format!("failed to load settings for {}", project_root.display()))?;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .expect("valid template"),
    );
    spinner.set_message("Discovering + files...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    let discovery = pagetree_resolve::discover(project_root, &settings);
    spinner.finish_and_clear();
    let discovery =
        discovery.with_context(|| format!("discovery failed in {}", project_root.display()))?;

    let resolver = Resolver::new(discovery, &settings);
    tracing::debug!(
        "{} pages, {} config values",
        resolver.pages().len(),
        resolver.sources().len()
    );
    Ok(resolver)
}

fn cmd_pages(project_root: &Path, json: bool) -> Result<()> {
    let resolver = load_resolver(project_root)?;
    let pages = resolver.resolve_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&pages)?);
        return Ok(());
    }

    if pages.is_empty() {
        eprintln!(
            "No pages found in {}. A page is a directory with a +Page file.",
            project_root.display()
        );
        return Ok(());
    }

    let width = pages
        .iter()
        .map(|p| p.location_id.as_str().len())
        .max()
        .unwrap_or(0);
    for page in &pages {
        println!(
            "{:<width$}  {}",
            page.location_id.as_str(),
            describe_route(&page.route),
            width = width
        );
    }
    eprintln!("{} pages", pages.len());
    Ok(())
}

fn describe_route(route: &PageRoute) -> String {
    match route {
        PageRoute::Filesystem {
            route_string,
            root_effect: Some(effect),
            ..
        } => format!(
            "{}  (filesystem, remounted {} -> {})",
            route_string, effect.before, effect.after
        ),
        PageRoute::Filesystem {
            route_string,
            defined_by,
            root_effect: None,
        } => format!("{}  (filesystem, defined by {})", route_string, defined_by),
        PageRoute::String {
            route_string,
            defined_at,
        } => format!("{}  (route string from {})", route_string, defined_at),
        PageRoute::Function { defined_at } => format!("<route function>  ({})", defined_at),
    }
}

fn cmd_explain(project_root: &Path, page: &str, json: bool) -> Result<()> {
    let page_id = LocationId::parse(page).with_context(|| format!("invalid page location {page:?}"))?;
    let resolver = load_resolver(project_root)?;

    if !resolver.pages().contains(&page_id) {
        let hint = suggest_page(&resolver, page)
            .map(|s| format!(" (did you mean {}?)", s))
            .unwrap_or_default();
        anyhow::bail!("unknown page {}{}", page_id, hint);
    }

    let resolved = resolver.resolve_page(&page_id)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&resolved)?);
        return Ok(());
    }
    print_explanation(&resolved);
    Ok(())
}

fn print_explanation(page: &ResolvedPage) {
    println!("Page {}", page.location_id);
    println!("  route: {}", describe_route(&page.route));
    println!();

    println!("Contributing locations (lowest precedence first):");
    let width = page
        .contributing
        .iter()
        .map(|c| c.location_id.as_str().len())
        .max()
        .unwrap_or(0);
    for location in &page.contributing {
        let global = if location.is_global { "global" } else { "" };
        let step = location
            .precedence
            .map(|p| format!("above previous by {}", p))
            .unwrap_or_default();
        println!(
            "  {:<width$}  {:<6}  {}",
            location.location_id.as_str(),
            global,
            step,
            width = width
        );
    }
    println!();

    println!("Effective config:");
    for (name, config) in &page.configs {
        match config {
            ResolvedConfig::Override { winner, overridden } => {
                let suffix = if overridden.is_empty() {
                    String::new()
                } else {
                    format!(" (overrides {})", overridden.len())
                };
                println!(
                    "  {}: {}  from {}{}",
                    name,
                    winner.display_value(),
                    winner.defined_at,
                    suffix
                );
            }
            ResolvedConfig::Cumulative { values } => {
                println!("  {} (cumulative):", name);
                for value in values {
                    println!("    {}  from {}", value.display_value(), value.defined_at);
                }
            }
        }
    }
}

/// Closest known page to an unknown location, by normalized Levenshtein.
fn suggest_page(resolver: &Resolver, page: &str) -> Option<String> {
    resolver
        .pages()
        .iter()
        .map(|candidate| {
            (
                strsim::normalized_levenshtein(page, candidate.as_str()),
                candidate,
            )
        })
        .filter(|(score, _)| *score >= 0.6)
        .max_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, candidate)| candidate.to_string())
}

fn cmd_locate(file: &str) -> Result<()> {
    let file = if file.starts_with('/') {
        file.to_string()
    } else {
        format!("/{}", file.trim_start_matches("./"))
    };
    let location =
        LocationId::try_from_file_path(&file).with_context(|| format!("cannot locate {file}"))?;
    println!("location:         {}", location);
    println!("inheritance root: {}", location.inheritance_root());
    println!("route:            {}", filesystem_route_string(&location));
    Ok(())
}
