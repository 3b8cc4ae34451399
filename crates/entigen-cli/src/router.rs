// Command routing and dispatch

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{
    commands::*,
    error::CliResult,
    logging::init_logging,
    project::ProjectOptions,
};

/// entigen - generate a Go service layer from one entity description
#[derive(Parser, Debug)]
#[command(name = "entigen")]
#[command(bin_name = "entigen")]
#[command(about = "Generate a consistent Go service layer from one entity description")]
#[command(
    long_about = "entigen turns one entity description (YAML or JSON) into a data model, storage contract and implementation, service, HTTP handlers, route fragment, migrations or init script, and API docs.\n\nQuick start:\n  • entigen config init --module-root github.com/acme/shop\n  • entigen validate invoice.yaml\n  • entigen plan invoice.yaml\n  • entigen generate invoice.yaml"
)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Minimize output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Project directory holding entigen.toml
    #[arg(short = 'C', long = "project", global = true, value_name = "DIR", default_value = ".")]
    pub project: PathBuf,
}

/// Flags that override configuration keys
#[derive(Args, Debug, Clone, Default)]
pub struct OverrideArgs {
    /// Storage backend (postgres, mysql, mongodb)
    #[arg(short, long)]
    pub backend: Option<String>,

    /// Go module path generated imports are rooted at
    #[arg(long, value_name = "MODULE")]
    pub module_root: Option<String>,

    /// Directory artifacts are written under
    #[arg(short, long, value_name = "DIR")]
    pub output: Option<PathBuf>,

    /// Directory of template overrides
    #[arg(long, value_name = "DIR")]
    pub templates: Option<PathBuf>,

    /// How text lists are stored (native, comma_joined)
    #[arg(long, value_name = "ENCODING")]
    pub list_encoding: Option<String>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Render and write every artifact for an entity
    #[command(about = "Generate all artifacts for an entity description")]
    Generate {
        /// Entity description file (.yaml, .yml or .json)
        #[arg(value_name = "ENTITY")]
        entity: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Preview paths without writing
        #[arg(long)]
        dry_run: bool,

        /// Replace existing files
        #[arg(short, long)]
        force: bool,

        /// Keep .bak copies of replaced files
        #[arg(long)]
        keep_backups: bool,

        /// Render artifacts one at a time
        #[arg(long)]
        sequential: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show planned artifacts and template sections
    #[command(about = "Show the artifacts and template sections a generation would use")]
    Plan {
        /// Entity description file
        #[arg(value_name = "ENTITY")]
        entity: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,

        /// Print the plan as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check an entity description
    #[command(about = "Check an entity description against the configured backend")]
    Validate {
        /// Entity description file
        #[arg(value_name = "ENTITY")]
        entity: PathBuf,

        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Print the type mapping table
    #[command(about = "Print how field types map onto a backend")]
    Types {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Print the table as JSON
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    #[command(about = "View and initialize entigen configuration")]
    Config {
        #[command(subcommand)]
        action: Option<ConfigSubcommand>,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    #[command(about = "Display the effective configuration as TOML")]
    Show {
        #[command(flatten)]
        overrides: OverrideArgs,
    },

    /// Create entigen.toml
    #[command(about = "Write entigen.toml for this project")]
    Init {
        #[command(flatten)]
        overrides: OverrideArgs,

        /// Replace an existing file
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Project options for a command's override flags
    pub fn project_options(&self, overrides: &OverrideArgs) -> ProjectOptions {
        ProjectOptions {
            project_dir: self.project.clone(),
            backend: overrides.backend.clone(),
            module_root: overrides.module_root.clone(),
            output_dir: overrides.output.clone(),
            templates_dir: overrides.templates.clone(),
            list_encoding: overrides.list_encoding.clone(),
            ..Default::default()
        }
    }
}

/// Route and execute commands
pub struct CommandRouter;

impl CommandRouter {
    /// Parse CLI arguments and route to appropriate handler
    pub async fn route() -> CliResult<()> {
        let cli = Cli::parse();

        // An unreadable config is reported by the command itself
        let configured = ProjectOptions::new(&cli.project)
            .load_config()
            .map(|config| config.log_level)
            .unwrap_or_else(|_| "info".to_string());
        init_logging(cli.verbose, cli.quiet, &configured);

        Self::execute(&cli).await
    }

    /// Build the handler for a parsed command line
    pub fn command(cli: &Cli) -> Box<dyn Command> {
        match &cli.command {
            Commands::Generate {
                entity,
                overrides,
                dry_run,
                force,
                keep_backups,
                sequential,
                json,
            } => {
                let options = ProjectOptions {
                    force: *force,
                    sequential: *sequential,
                    ..cli.project_options(overrides)
                };
                Box::new(
                    GenerateCommand::new(entity, options)
                        .with_dry_run(*dry_run)
                        .with_keep_backups(*keep_backups)
                        .with_json(*json),
                )
            }
            Commands::Plan {
                entity,
                overrides,
                json,
            } => Box::new(
                PlanCommand::new(entity, cli.project_options(overrides)).with_json(*json),
            ),
            Commands::Validate { entity, overrides } => {
                Box::new(ValidateCommand::new(entity, cli.project_options(overrides)))
            }
            Commands::Types { overrides, json } => {
                Box::new(TypesCommand::new(cli.project_options(overrides)).with_json(*json))
            }
            Commands::Config { action } => {
                let (action, options) = match action {
                    Some(ConfigSubcommand::Show { overrides }) => {
                        (ConfigAction::Show, cli.project_options(overrides))
                    }
                    None => (ConfigAction::Show, cli.project_options(&OverrideArgs::default())),
                    Some(ConfigSubcommand::Init { overrides, force }) => (
                        ConfigAction::Init { force: *force },
                        cli.project_options(overrides),
                    ),
                };
                Box::new(ConfigCommand::new(action, options))
            }
        }
    }

    /// Execute a command
    pub async fn execute(cli: &Cli) -> CliResult<()> {
        Self::command(cli).execute().await
    }
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
    fn test_config_defaults_to_show() {
        let cli = Cli::try_parse_from(["entigen", "config"]).unwrap();
        assert!(matches!(cli.command, Commands::Config { action: None }));
    }
}
