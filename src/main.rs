use anyhow::Result;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use std::path::PathBuf;
use textfunk::runner::{self, Invocation, Output};
use textfunk::{Config, LineRange, Registry};

#[derive(Parser)]
#[command(name = "textfunk", version, about = "Line-oriented text cleanup", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[arg(long, global = true, help = "Config file path")]
    config: Option<PathBuf>,

    #[arg(long, global = true, help = "Profile name")]
    profile: Option<String>,

    #[arg(short, long, global = true, action = clap::ArgAction::Count, help = "Verbose logging")]
    verbose: u8,
}

#[derive(Subcommand)]
enum Command {
    /// Run one command over FILE (or stdin)
    Run {
        #[arg(help = "Command id, e.g. join-lines")]
        command: String,
        file: Option<PathBuf>,
        #[arg(long, help = "Select lines START:END (1-based, inclusive)")]
        lines: Option<LineRange>,
        #[arg(long, help = "Write the result back to FILE")]
        in_place: bool,
    },
    /// List registered commands as JSON
    Commands {
        #[arg(long, help = "Pretty-print JSON output")]
        pretty: bool,
    },
    Config(ConfigCommand),
}

#[derive(Parser)]
struct ConfigCommand {
    #[command(subcommand)]
    subcommand: ConfigSubcommand,
}

#[derive(Subcommand)]
enum ConfigSubcommand {
    Init {
        #[arg(long)]
        global: bool,
    },
    Show,
    List,
    Edit {
        #[arg(long)]
        global: bool,
    },
    Path {
        #[arg(long)]
        global: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Command::Config(cmd) => handle_config(cmd, cli.config.as_ref(), cli.profile.as_ref()),
        Command::Commands { pretty } => {
            let config = Config::load(cli.config.as_ref(), cli.profile.as_ref())?;
            let registry = Registry::filtered(&config.commands.enabled)?;
            output_json(&commands_json(&registry), pretty)
        }
        Command::Run {
            command,
            file,
            lines,
            in_place,
        } => {
            let config = Config::load(cli.config.as_ref(), cli.profile.as_ref())?;
            let invocation = Invocation {
                command: &command,
                file: file.as_deref(),
                lines,
                in_place,
            };
            handle_run(&invocation, &config)
        }
    }
}

fn handle_run(invocation: &Invocation<'_>, config: &Config) -> Result<()> {
    match runner::execute(invocation, config, io::stdin().lock())? {
        Output::Text(text) => {
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Output::Written(path) => tracing::info!("Wrote {:?}", path),
        Output::Unchanged(path) => tracing::info!("Left {:?} unchanged", path),
    }

    Ok(())
}

fn commands_json(registry: &Registry) -> serde_json::Value {
    let commands: Vec<_> = registry
        .iter()
        .map(|cmd| {
            serde_json::json!({
                "id": cmd,
                "name": cmd.name(),
                "scope": cmd.scope(),
            })
        })
        .collect();

    serde_json::Value::Array(commands)
}

fn handle_config(
    cmd: ConfigCommand,
    config_path: Option<&PathBuf>,
    profile: Option<&String>,
) -> Result<()> {
    match cmd.subcommand {
        ConfigSubcommand::Init { global } => {
            let path = Config::init_config(global)?;
            println!("Created config file: {:?}", path);
            Ok(())
        }
        ConfigSubcommand::Show => {
            let config = Config::load(config_path, profile)?;
            print!("{}", toml::to_string_pretty(&config)?);
            Ok(())
        }
        ConfigSubcommand::List => {
            println!("Configuration files (in precedence order):\n");

            if let Some(global) = Config::global_config_path() {
                let status = if global.exists() { "✓" } else { "✗" };
                println!("Global:  {:?} {}", global, status);
            }

            if let Some(project) = Config::project_config_path() {
                println!("Project: {:?} ✓", project);
            } else {
                println!("Project: (none)");
            }

            println!("\nEnvironment variables:");
            for key in [
                "TEXTFUNK_COMMANDS",
                "TEXTFUNK_IN_PLACE",
                "TEXTFUNK_MAX_INPUT_BYTES",
            ] {
                println!(
                    "  {}: {}",
                    key,
                    std::env::var(key).unwrap_or_else(|_| "(not set)".to_string())
                );
            }

            Ok(())
        }
        ConfigSubcommand::Path { global } => {
            let path = config_file_path(global);

            if let Some(p) = path {
                println!("{}", p.display());
            } else {
                anyhow::bail!("Config file not found");
            }
            Ok(())
        }
        ConfigSubcommand::Edit { global } => {
            let path = config_file_path(global)
                .ok_or_else(|| anyhow::anyhow!("Config file not found"))?;

            if !path.exists() {
                anyhow::bail!(
                    "Config file does not exist: {:?}\nRun 'textfunk config init{}' to create it.",
                    path,
                    if global { " --global" } else { "" }
                );
            }

            let editor = std::env::var("EDITOR").unwrap_or_else(|_| {
                if cfg!(target_os = "macos") {
                    "open".to_string()
                } else if cfg!(target_os = "windows") {
                    "notepad".to_string()
                } else {
                    "vi".to_string()
                }
            });

            let status = std::process::Command::new(&editor).arg(&path).status()?;

            if !status.success() {
                anyhow::bail!("Failed to open editor");
            }

            println!("Config file edited: {:?}", path);
            Ok(())
        }
    }
}

fn config_file_path(global: bool) -> Option<PathBuf> {
    if global {
        Config::global_config_path()
    } else {
        // Try project config first, fall back to global
        Config::project_config_path().or_else(Config::global_config_path)
    }
}

fn output_json(value: &serde_json::Value, pretty: bool) -> Result<()> {
    let out = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", out);
    Ok(())
}
