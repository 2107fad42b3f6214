//! Command-line arguments and subcommand implementations

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use sharpdoc::config::Settings;
use sharpdoc::export::{self, ExportOptions, ProgressBarSink};
use sharpdoc::project::Project;
use sharpdoc::ui::{App, ExportTarget};
use std::io;
use std::path::PathBuf;
use tracing::{info, warn};

/// C# documentation generator
#[derive(Parser)]
#[command(name = "sharpdoc", version, about)]
#[command(long_about = "
Parse a directory of C# sources into an element tree and generate HTML
documentation from its XML doc comments.

Common Usage:

  # Print the element tree
  sharpdoc outline ./src --defines \"DEBUG;TRACE\"

  # Generate pages for public and protected members
  sharpdoc export ./src --out ./docs --visibility public,protected

  # Browse interactively
  sharpdoc browse ./src
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging for debugging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Settings file (defaults to <config dir>/sharpdoc/settings.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the element tree of a source directory
    Outline(OutlineArgs),
    /// Generate HTML documentation
    Export(ExportArgs),
    /// Browse the element tree in the terminal
    Browse(BrowseArgs),
}

#[derive(Args)]
pub struct SourceArgs {
    /// Directory containing the sources
    pub directory: PathBuf,

    /// `;`-separated preprocessor constants (defaults to the saved ones)
    #[arg(long)]
    pub defines: Option<String>,

    /// Source file extension
    #[arg(long)]
    pub extension: Option<String>,
}

#[derive(Args)]
pub struct OutlineArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Print JSON instead of an indented outline
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum VisibilityArg {
    Public,
    Internal,
    Protected,
    Private,
}

#[derive(Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output directory
    #[arg(short, long)]
    pub out: PathBuf,

    /// Visibilities to document (replaces the saved selection)
    #[arg(long, value_enum, value_delimiter = ',')]
    pub visibility: Option<Vec<VisibilityArg>>,

    /// Document enum members
    #[arg(long)]
    pub expand_enums: bool,

    /// Document struct members
    #[arg(long)]
    pub expand_structs: bool,

    /// Include attributes on pages
    #[arg(long)]
    pub attributes: bool,

    /// Write index.php redirects into generated directories
    #[arg(long)]
    pub php_fillers: bool,

    /// Extension of generated pages
    #[arg(long)]
    pub page_extension: Option<String>,

    /// Write into a non-empty output directory
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// Output directory used by the export key
    #[arg(short, long, default_value = "docs")]
    pub out: PathBuf,

    /// Let the export key write into a non-empty output directory
    #[arg(long)]
    pub force: bool,
}

/// Settings plus where they came from
pub struct Session {
    pub settings: Settings,
    pub settings_path: Option<PathBuf>,
}

impl Session {
    pub fn load(config: Option<PathBuf>) -> anyhow::Result<Self> {
        let settings_path = config.or_else(Settings::default_path);
        let settings = match &settings_path {
            Some(path) => Settings::load(path)?,
            None => Settings::default(),
        };
        Ok(Session {
            settings,
            settings_path,
        })
    }

    fn save(&self) {
        if let Some(path) = &self.settings_path {
            if let Err(e) = self.settings.save(path) {
                warn!("Could not save settings: {}", e);
            }
        }
    }

    /// Load the project and remember its directory in the recents
    fn load_project(&mut self, args: &SourceArgs) -> anyhow::Result<Project> {
        let defines = args
            .defines
            .clone()
            .unwrap_or_else(|| self.settings.define_constants.clone());
        let extension = args
            .extension
            .clone()
            .unwrap_or_else(|| self.settings.source_extension.clone());

        let project = Project::load(&args.directory, &extension, &defines)
            .with_context(|| format!("Failed to load {}", args.directory.display()))?;
        for error in project.errors() {
            eprintln!("warning: {}", error);
        }

        let directory = args
            .directory
            .canonicalize()
            .unwrap_or_else(|_| args.directory.clone());
        self.settings.add_recent(directory);
        if args.defines.is_some() {
            self.settings.define_constants = defines;
        }
        self.save();
        Ok(project)
    }
}

pub fn outline_command(session: &mut Session, args: OutlineArgs) -> anyhow::Result<()> {
    let project = session.load_project(&args.source)?;
    let tree = project.tree();

    if args.json {
        let json = serde_json::to_string_pretty(&tree.outline(tree.root()))?;
        println!("{}", json);
    } else {
        let mut text = String::new();
        tree.write_outline(&mut text, tree.root())?;
        print!("{}", text);
    }
    Ok(())
}

fn export_options(settings: &Settings, args: &ExportArgs) -> ExportOptions {
    let mut options = ExportOptions::from(settings);
    if let Some(visibilities) = &args.visibility {
        options.public = visibilities.contains(&VisibilityArg::Public);
        options.internal = visibilities.contains(&VisibilityArg::Internal);
        options.protected = visibilities.contains(&VisibilityArg::Protected);
        options.private = visibilities.contains(&VisibilityArg::Private);
    }
    options.expand_enums |= args.expand_enums;
    options.expand_structs |= args.expand_structs;
    options.export_attributes |= args.attributes;
    options.php_fillers |= args.php_fillers;
    if let Some(extension) = &args.page_extension {
        options.extension = extension.trim_start_matches('.').to_string();
    }
    options
}

pub fn export_command(session: &mut Session, args: ExportArgs) -> anyhow::Result<()> {
    let mut project = session.load_project(&args.source)?;
    let options = export_options(&session.settings, &args);

    let mut sink = ProgressBarSink::new();
    let report = export::export(
        project.tree_mut(),
        &args.out,
        &options,
        args.force,
        &mut sink,
    )?;
    sink.finish();

    info!("{} pages written", report.pages);
    println!("Exported {} pages to {}", report.pages, args.out.display());
    Ok(())
}

pub fn browse_command(session: &mut Session, args: BrowseArgs) -> anyhow::Result<()> {
    let project = session.load_project(&args.source)?;
    let target = ExportTarget {
        directory: args.out,
        force: args.force,
    };
    let mut app = App::new(
        project,
        session.settings.clone(),
        session.settings_path.clone(),
        target,
    );

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = app.run(&mut terminal);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res.context("Terminal UI failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visibility_list_replaces_saved_selection() {
        let cli = Cli::try_parse_from([
            "sharpdoc",
            "export",
            "src",
            "--out",
            "docs",
            "--visibility",
            "protected,private",
            "--expand-enums",
            "--page-extension",
            ".htm",
        ])
        .unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("Expected the export subcommand");
        };

        let options = export_options(&Settings::default(), &args);
        assert!(!options.public);
        assert!(options.protected);
        assert!(options.private);
        assert!(options.expand_enums);
        assert!(!options.expand_structs);
        assert_eq!(options.extension, "htm");
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sharpdoc",
            "outline",
            "src",
            "--json",
            "-v",
            "--config",
            "custom.toml",
            "--defines",
            "DEBUG",
        ])
        .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("custom.toml")));
        let Commands::Outline(args) = cli.command else {
            panic!("Expected the outline subcommand");
        };
        assert!(args.json);
        assert_eq!(args.source.defines.as_deref(), Some("DEBUG"));
    }
}
