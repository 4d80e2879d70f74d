//! CLI binary for modgraph: resolve, check, repair and compact project lists.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use modgraph_core::config::ModgraphConfig;
use modgraph_core::list;
use modgraph_core::minimize;
use modgraph_core::model::{self, IncludedProjectsModel};
use modgraph_core::path::ProjectPath;
use modgraph_core::rules::RuleSet;
use modgraph_parser::strategy::ExtractorRegistry;
use modgraph_resolve::accessor::AccessorMapping;
use modgraph_resolve::discovery::discover_projects;
use modgraph_resolve::repair::repair_list;
use modgraph_resolve::traversal::{ResolveOptions, Resolver};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "modgraph", about = "Static project-graph resolution for multi-project builds")]
struct Cli {
    /// Build root directory (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the projects that must be included for a set of seeds
    Resolve {
        /// Seed project paths (e.g. :app)
        seeds: Vec<String>,

        /// Read seeds from a project list file
        #[arg(short, long, conflicts_with = "seeds")]
        list: Option<PathBuf>,

        /// Seed from every project in the build
        #[arg(long, conflicts_with_all = ["seeds", "list"])]
        all: bool,

        /// Emit the included-projects model as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the direct dependencies of one project
    Deps {
        /// Project path (e.g. :libs:core)
        path: String,
    },

    /// Validate a project list (entries, build files, sort order)
    CheckList {
        file: PathBuf,
    },

    /// Drop stale entries, add missing dependencies and sort a project list
    FixList {
        file: PathBuf,
    },

    /// Compact a list of excluded projects into wildcard patterns
    Minimize {
        file: PathBuf,
    },

    /// Show the available dependency extractors
    Extractors,

    /// Show the generated accessor name of every project
    Accessors,

    /// Print JSON schemas of the tooling models
    Schema,
}

fn get_build_root(cli: &Cli) -> Result<PathBuf> {
    let root = match &cli.root {
        Some(p) => p.clone(),
        None => std::env::current_dir().context("failed to get current directory")?,
    };
    root.canonicalize()
        .with_context(|| format!("build root {} does not exist", root.display()))
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
    let build_root: Arc<Path> = Arc::from(get_build_root(&cli)?);
    let config = ModgraphConfig::load(&build_root)?;

    match cli.command {
        Commands::Resolve {
            seeds,
            list,
            all,
            json,
        } => cmd_resolve(&build_root, &config, &seeds, list.as_deref(), all, json),
        Commands::Deps { path } => cmd_deps(&build_root, &config, &path),
        Commands::CheckList { file } => cmd_check_list(&build_root, &file),
        Commands::FixList { file } => cmd_fix_list(&build_root, &config, &file),
        Commands::Minimize { file } => cmd_minimize(&build_root, &config, &file),
        Commands::Extractors => cmd_extractors(&config),
        Commands::Accessors => cmd_accessors(&build_root, &config),
        Commands::Schema => cmd_schema(),
    }
}

fn spinner(message: &'static str) -> Result<ProgressBar> {
    let style = ProgressStyle::default_spinner()
        .template("{spinner:.green} {msg}")
        .map_err(|e| anyhow::anyhow!("invalid spinner template: {e}"))?;
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(spinner)
}

fn build_resolver(build_root: &Arc<Path>, config: &ModgraphConfig) -> Resolver {
    Resolver::new(
        Arc::clone(build_root),
        ExtractorRegistry::builtin(config.extraction.syntax_tree),
        ResolveOptions::from_config(config),
    )
}

fn compile_rules(build_root: &Arc<Path>, config: &ModgraphConfig) -> Result<RuleSet> {
    RuleSet::compile(&config.rules, build_root).context("invalid [[rules]] in config")
}

/// Every project in the build: the all-projects list when present, otherwise
/// a scan of the tree.
fn all_projects(build_root: &Arc<Path>, config: &ModgraphConfig) -> Result<BTreeSet<ProjectPath>> {
    let file = ModgraphConfig::list_path(build_root, &config.lists.all_projects);
    if file.exists() {
        return Ok(list::read(&file, build_root)?);
    }
    let options = ResolveOptions::from_config(config).discovery;
    let pb = spinner("Scanning build tree...")?;
    let projects = discover_projects(build_root, &options);
    pb.finish_and_clear();
    Ok(projects?)
}

fn parse_seeds(build_root: &Arc<Path>, seeds: &[String]) -> Result<BTreeSet<ProjectPath>> {
    seeds
        .iter()
        .map(|s| ProjectPath::new(Arc::clone(build_root), s).map_err(anyhow::Error::from))
        .collect()
}

fn print_projects(projects: &BTreeSet<ProjectPath>, json: bool) -> Result<()> {
    if json {
        let model = IncludedProjectsModel::new(projects);
        println!("{}", serde_json::to_string_pretty(&model)?);
    } else {
        print!("{}", list::render(projects));
    }
    Ok(())
}

fn cmd_resolve(
    build_root: &Arc<Path>,
    config: &ModgraphConfig,
    seeds: &[String],
    list_file: Option<&Path>,
    all: bool,
    json: bool,
) -> Result<()> {
    if !config.enabled {
        eprintln!("modgraph is disabled; including every project");
        return print_projects(&all_projects(build_root, config)?, json);
    }

    let seeds = if !seeds.is_empty() {
        parse_seeds(build_root, seeds)?
    } else if let Some(file) = list_file {
        list::read(file, build_root)?
    } else if config.ide_sync && !all {
        let focus = ModgraphConfig::list_path(build_root, &config.lists.focus);
        eprintln!("IDE sync: seeding from {}", focus.display());
        list::read(&focus, build_root)?
    } else {
        all_projects(build_root, config)?
    };

    let rules = compile_rules(build_root, config)?;
    let mut resolver = build_resolver(build_root, config);
    let pb = spinner("Resolving project graph...")?;
    let closure = resolver.closure(&seeds, &rules);
    pb.finish_and_clear();

    let mut included = closure?;
    let required = included.len();
    included.extend(seeds.iter().cloned());
    eprintln!(
        "{} seeds, {} required projects, {} included",
        seeds.len(),
        required,
        included.len()
    );
    print_projects(&included, json)
}

fn cmd_deps(build_root: &Arc<Path>, config: &ModgraphConfig, path: &str) -> Result<()> {
    let project = ProjectPath::new(Arc::clone(build_root), path)?;
    let rules = compile_rules(build_root, config)?;
    let mut resolver = build_resolver(build_root, config);

    let build_file = project.build_file()?;
    if let Some(extractor) = resolver.registry().select(build_file.dialect) {
        eprintln!(
            "{} ({} via {})",
            build_file.path.display(),
            build_file.dialect,
            extractor.id()
        );
    }
    let successors = resolver.successors(&project, &rules)?;
    print!("{}", list::render(&successors));
    Ok(())
}

fn cmd_check_list(build_root: &Arc<Path>, file: &Path) -> Result<()> {
    let projects = list::read(file, build_root)?;
    list::check_sorted(file)?;
    eprintln!("{}: {} projects, sorted", file.display(), projects.len());
    Ok(())
}

fn cmd_fix_list(build_root: &Arc<Path>, config: &ModgraphConfig, file: &Path) -> Result<()> {
    let rules = compile_rules(build_root, config)?;
    let mut resolver = build_resolver(build_root, config);
    let pb = spinner("Repairing project list...")?;
    let report = repair_list(file, &mut resolver, &rules);
    pb.finish_and_clear();
    let report = report?;

    if report.is_unchanged() {
        eprintln!("{} is up to date ({} projects)", file.display(), report.projects.len());
        return Ok(());
    }
    for entry in &report.dropped {
        println!("- {entry}");
    }
    for project in &report.added {
        println!("+ {project}");
    }
    eprintln!(
        "Wrote {} projects to {}",
        report.projects.len(),
        file.display()
    );
    Ok(())
}

fn cmd_minimize(build_root: &Arc<Path>, config: &ModgraphConfig, file: &Path) -> Result<()> {
    let excluded = list::read(file, build_root)?;
    let all = all_projects(build_root, config)?;
    for stray in excluded.difference(&all) {
        tracing::warn!("{stray} is not a known project; kept as an exact entry");
    }
    let patterns = minimize::minimize(&all, &excluded);

    for pattern in &patterns {
        println!("{pattern}");
    }
    eprintln!(
        "{} excluded projects in {} patterns",
        excluded.len(),
        patterns.len()
    );
    Ok(())
}

fn cmd_extractors(config: &ModgraphConfig) -> Result<()> {
    let catalog = ExtractorRegistry::builtin(config.extraction.syntax_tree).catalog();
    println!("{}", serde_json::to_string_pretty(&catalog)?);
    Ok(())
}

fn cmd_accessors(build_root: &Arc<Path>, config: &ModgraphConfig) -> Result<()> {
    let options = ResolveOptions::from_config(config).discovery;
    let pb = spinner("Scanning build tree...")?;
    let mapping = AccessorMapping::scan(build_root, &options);
    pb.finish_and_clear();

    for (name, project) in mapping?.entries() {
        if project.is_root() {
            continue;
        }
        println!("projects.{name}\t{project}");
    }
    Ok(())
}

fn cmd_schema() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&model::json_schemas()?)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_resolve_seed_arguments() {
        let cli = Cli::parse_from(["modgraph", "--root", "/tmp", "resolve", ":app", "--json"]);
        match cli.command {
            Commands::Resolve { seeds, json, .. } => {
                assert_eq!(seeds, vec![":app"]);
                assert!(json);
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_spinner_builds() {
        let pb = spinner("Scanning build tree...").unwrap();
        assert_eq!(pb.message(), "Scanning build tree...");
        pb.finish_and_clear();
    }

    #[test]
    fn test_resolve_rejects_seeds_with_all() {
        assert!(Cli::try_parse_from(["modgraph", "resolve", ":app", "--all"]).is_err());
    }
}
