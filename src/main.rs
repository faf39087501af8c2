use clap::{Parser, Subcommand};
use serde::Serialize;
use skinmake::archive::GitArchive;
use skinmake::cache::MtimeCache;
use skinmake::output::{self, TargetState};
use skinmake::project::Project;
use skinmake::report::PhaseReport;
use skinmake::targets::BuildTarget;
use skinmake::tools::CommandBackend;
use skinmake::types::{LogicalTheme, Site};
use skinmake::{compile, config, snapshot};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("SKINMAKE_ON_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("SKINMAKE_GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "skinmake")]
#[command(about = "Incremental builder for a theme × site stylesheet matrix")]
#[command(long_about = "\
Incremental builder for a theme × site stylesheet matrix

Every theme variant is compiled against every site. Only combinations whose
inputs are newer than the compiled file are rebuilt.

Project structure:

  project/
  ├── skinmake.toml            # Optional overrides (see gen-config)
  ├── styl/                    # Shared includes, every artifact depends on
  │   ├── index.styl           #   index.styl and mixins.styl
  │   └── mixins.styl
  ├── themes/
  │   ├── dark/                # Two variants → themes dark-a, dark-b
  │   │   ├── a.styl
  │   │   ├── b.styl
  │   │   └── colors.styl      # Support file shared by the variants
  │   └── plain/
  │       └── plain.styl       # One variant → theme plain
  ├── sites/
  │   ├── github.com.styl
  │   ├── github.com.url       # Screenshot URL (first line); empty disables
  │   └── all-sites.styl       # Rebuilt when any site changes
  ├── css/                     # Output: css/<theme>/<theme>-<site>.css
  └── screenshots/             # Output: git worktree on branch `screenshots`

Run 'skinmake gen-config' to print a documented skinmake.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Project directory
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Rebuild stale artifacts (the default)
    Build,
    /// Rebuild, then refresh stale screenshots and amend the snapshot commit
    Screenshots,
    /// List themes, sites and targets with their stale state
    Targets {
        /// Print JSON instead of the text listing
        #[arg(long)]
        json: bool,
    },
    /// Print a stock skinmake.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run one command. `Ok(false)` means some target failed; `Err` that the
/// run was aborted.
fn run(cli: Cli) -> Result<bool, Box<dyn std::error::Error>> {
    let ok = match cli.command.unwrap_or(Command::Build) {
        Command::Build => {
            let project = Project::discover(&cli.project)?;
            init_thread_pool(&project.config.processing);
            let backend = CommandBackend::new(&project.config, &project.paths.root);
            run_compile(&project, &backend)?.is_success()
        }
        Command::Screenshots => {
            let project = Project::discover(&cli.project)?;
            init_thread_pool(&project.config.processing);
            let backend = CommandBackend::new(&project.config, &project.paths.root);
            let compiled = run_compile(&project, &backend)?;
            let snapshots = run_snapshots(&project, &backend)?;
            compiled.is_success() && snapshots.is_success()
        }
        Command::Targets { json } => {
            let project = Project::discover(&cli.project)?;
            let cache = MtimeCache::new();
            let states: Vec<TargetState> = project
                .targets
                .iter()
                .map(|target| TargetState {
                    target,
                    stale: target.is_stale(&cache),
                })
                .collect();
            if json {
                let listing = Listing::new(&project, &states);
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                output::print_target_list(
                    &project.themes,
                    &project.sites,
                    &states,
                    &project.paths.root,
                );
            }
            true
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            true
        }
    };

    Ok(ok)
}

fn run_compile(
    project: &Project,
    backend: &CommandBackend,
) -> Result<PhaseReport, Box<dyn std::error::Error>> {
    println!("==> Compiling {}", project.paths.css.display());
    let root = project.paths.root.clone();
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_compile_event(&event, &root) {
                println!("{}", line);
            }
        }
    });
    let result = compile::build_all(
        &project.targets,
        &project.include_dir(),
        backend,
        &MtimeCache::new(),
        Some(tx),
    );
    join_printer(printer);
    let report = result?;
    output::print_phase_summary("Compile", &report);
    Ok(report)
}

fn run_snapshots(
    project: &Project,
    backend: &CommandBackend,
) -> Result<PhaseReport, Box<dyn std::error::Error>> {
    println!("==> Snapshots {}", project.paths.screenshots.display());
    let archive = GitArchive::new(
        &project.paths.root,
        &project.paths.screenshots,
        &project.config.screenshots.branch,
        &project.config.screenshots.commit_message,
    );
    let root = project.paths.root.clone();
    let (tx, rx) = std::sync::mpsc::channel();
    let printer = std::thread::spawn(move || {
        for event in rx {
            for line in output::format_snapshot_event(&event, &root) {
                println!("{}", line);
            }
        }
    });
    // Fresh cache: artifacts written by the compile phase must be seen
    let result = snapshot::update_snapshots(
        &project.targets,
        &project.paths.screenshots,
        backend,
        &archive,
        &MtimeCache::new(),
        Some(tx),
    );
    join_printer(printer);
    let report = result?;
    output::print_phase_summary("Snapshots", &report);
    Ok(report)
}

/// Wait for a printer thread; its sender is dropped when the phase returns.
fn join_printer(printer: std::thread::JoinHandle<()>) {
    if printer.join().is_err() {
        eprintln!("progress printer panicked");
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores; the user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// JSON form of the `targets` listing.
#[derive(Serialize)]
struct Listing<'a> {
    root: &'a Path,
    themes: &'a [LogicalTheme],
    sites: &'a [Site],
    targets: Vec<ListedTarget<'a>>,
}

#[derive(Serialize)]
struct ListedTarget<'a> {
    name: String,
    stale: bool,
    #[serde(flatten)]
    target: &'a BuildTarget,
}

impl<'a> Listing<'a> {
    fn new(project: &'a Project, states: &[TargetState<'a>]) -> Self {
        Self {
            root: &project.paths.root,
            themes: &project.themes,
            sites: &project.sites,
            targets: states
                .iter()
                .map(|s| ListedTarget {
                    name: s.target.name(),
                    stale: s.stale,
                    target: s.target,
                })
                .collect(),
        }
    }
}
