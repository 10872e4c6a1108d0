//! smx - expand `name{args}` macro invocations in Markdown inline code

use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use simple_macros::{parse_template, ExpansionWarning, MacroSession, SettingsError};

#[derive(Parser)]
#[command(name = "smx")]
#[command(version)]
#[command(about = "Simple Macros - expand name{args} invocations written as inline code", long_about = None)]
struct Cli {
    /// Macro settings file (JSON; TOML/YAML with the data-loading feature)
    #[arg(short, long, global = true, env = "SMX_MACROS", default_value = "macros.json")]
    macros: PathBuf,

    /// Exit with status 2 when an expansion is missing arguments
    #[arg(long, global = true)]
    strict: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Expand every invocation in a Markdown document
    Expand {
        /// Input file path (reads from stdin if not provided)
        input: Option<PathBuf>,

        /// Output file path (writes to stdout if not provided)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Expand a single invocation such as 'greet{Alice, Bob}'
    Invoke {
        span: String,
    },

    /// List macro definitions in order
    List,

    /// Show the arity of a template body
    Parse {
        template: String,
    },

    /// Add a macro (a later macro with the same name takes precedence)
    Add {
        name: String,
        template: String,
    },

    /// Replace the template of an existing macro
    Edit {
        name: String,
        template: String,
    },

    /// Rename an existing macro
    Rename {
        name: String,
        new_name: String,
    },

    /// Remove every macro with this name
    Remove {
        name: String,
    },
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<ExitCode> {
    init_tracing();
    let cli = Cli::parse();
    run(cli)
}

fn run(cli: Cli) -> Result<ExitCode> {
    let path = cli.macros.as_path();

    match cli.command {
        Commands::Parse { template } => {
            println!("{}", parse_template(&template).arity);
            Ok(ExitCode::SUCCESS)
        }
        Commands::Expand { input, output } => {
            let session = load_session(path)?;
            let text = read_input(input.as_deref())?;
            let result = session.expand_document(&text);
            report_warnings(&result.warnings);
            tracing::info!(expanded = result.expanded, "document done");

            match output {
                Some(out) => fs::write(&out, &result.content)
                    .with_context(|| format!("writing {}", out.display()))?,
                None => io::stdout().lock().write_all(result.content.as_bytes())?,
            }
            Ok(exit_code(cli.strict, &result.warnings))
        }
        Commands::Invoke { span } => {
            let session = load_session(path)?;
            let snapshot = session.snapshot();
            match simple_macros::try_expand_with_report(&span, &snapshot) {
                Some(expansion) => {
                    report_warnings(&expansion.warnings);
                    println!("{}", expansion.content);
                    Ok(exit_code(cli.strict, &expansion.warnings))
                }
                None => {
                    eprintln!("No macro matches '{}'", span);
                    Ok(ExitCode::FAILURE)
                }
            }
        }
        Commands::List => {
            let session = load_session(path)?;
            for (index, def) in session.definitions().iter().enumerate() {
                let shadowed = session.position(&def.name) != Some(index);
                println!(
                    "{}\t{}\t{}{}",
                    def.name,
                    def.arity(),
                    def.template(),
                    if shadowed { "\t(shadowed)" } else { "" }
                );
            }
            Ok(ExitCode::SUCCESS)
        }
        Commands::Add { name, template } => {
            let mut session = load_session(path)?;
            if session.position(&name).is_some() {
                tracing::warn!(name = %name, "an earlier macro with this name is now shadowed");
            }
            let index = session.add_definition(name, &template);
            session.save(path)?;
            println!("{}", session.definitions()[index].arity());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Edit { name, template } => {
            let mut session = load_session(path)?;
            let index = find(&session, &name)?;
            session.on_template_text_changed(index, &template)?;
            session.save(path)?;
            println!("{}", session.definitions()[index].arity());
            Ok(ExitCode::SUCCESS)
        }
        Commands::Rename { name, new_name } => {
            let mut session = load_session(path)?;
            let index = find(&session, &name)?;
            session.rename(index, new_name)?;
            session.save(path)?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Remove { name } => {
            let mut session = load_session(path)?;
            let removed = session.remove_named(&name)?;
            session.save(path)?;
            println!("{}", removed);
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn load_session(path: &Path) -> Result<MacroSession> {
    MacroSession::load(path).with_context(|| format!("loading macros from {}", path.display()))
}

fn find(session: &MacroSession, name: &str) -> Result<usize, SettingsError> {
    session
        .position(name)
        .ok_or_else(|| SettingsError::UnknownMacro(name.to_string()))
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
        }
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            Ok(buffer)
        }
    }
}

fn report_warnings(warnings: &[ExpansionWarning]) {
    for warning in warnings {
        tracing::warn!("{}", warning);
    }
}

fn exit_code(strict: bool, warnings: &[ExpansionWarning]) -> ExitCode {
    if strict && !warnings.is_empty() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    }
}
