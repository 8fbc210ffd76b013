use clap::{Parser, Subcommand};
use colored::Colorize;
use miette::{IntoDiagnostic, WrapErr, miette};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::{fs, path::PathBuf};
use tracing_subscriber::EnvFilter;
use varc_lang::{CompileError, Engine, InnerError, Options};

use crate::config::Config;
use crate::host::{self, Request};

#[derive(Parser, Debug)]
#[command(name = "varc")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(after_help = "# Examples:\n\n\
    ## To check template syntax:\n\
    varc check '$host$uri' '${header.X-Trace}'\n\n\
    ## To render a template against a request:\n\
    echo '{\"host\": \"example.com\"}' | varc render 'Host: $host'\n\n\
    ## To render configured templates for every request:\n\
    varc run --config varc.toml --requests requests.jsonl")]
#[command(
    about = "varc compiles templates with embedded variables and renders them against requests.",
    long_about = None
)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Do not log variable handler failures
    #[arg(short, long, global = true, default_value_t = false)]
    quiet: bool,

    #[clap(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Check templates for syntax and name errors
    Check {
        /// Templates to check
        #[arg(required = true)]
        templates: Vec<String>,
    },
    /// Render one template against a JSON request
    Render {
        /// Template to render
        template: String,
        /// Path to the JSON request; read from stdin when omitted
        #[arg(short, long)]
        context: Option<PathBuf>,
    },
    /// Render all configured templates for every request
    Run {
        /// Path to the TOML configuration
        #[arg(short, long)]
        config: PathBuf,
        /// Path to JSON requests, one per line; read from stdin when omitted
        #[arg(short, long)]
        requests: Option<PathBuf>,
    },
    /// List the available variables
    Vars,
}

impl Cli {
    pub fn run(&self) -> miette::Result<()> {
        self.init_tracing();

        match &self.commands {
            Commands::Check { templates } => self.check(templates),
            Commands::Render { template, context } => self.render(template, context.as_ref()),
            Commands::Run { config, requests } => {
                self.run_config(&Config::load_from_file(config)?, requests.as_ref())
            }
            Commands::Vars => self.vars(),
        }
    }

    fn init_tracing(&self) {
        let default = match self.verbose {
            0 => "warn",
            1 => "debug",
            _ => "trace",
        };

        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)),
            )
            .with_writer(io::stderr)
            .try_init()
            .ok();
    }

    fn create_engine(&self, options: Options) -> miette::Result<Engine<Request>> {
        let registry = host::registry().map_err(|e| miette!("{e}"))?;
        let mut engine = Engine::with_options(registry, options);

        if self.quiet {
            engine.set_logging(false);
        }

        Ok(engine)
    }

    fn check(&self, templates: &[String]) -> miette::Result<()> {
        let mut engine = self.create_engine(Options::default())?;
        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());
        let mut has_error = false;

        for template in templates {
            let written = match engine.test(template) {
                Ok(()) => writeln!(handle, "{}: {}", "Ok".green().bold(), template),
                Err(err) => {
                    has_error = true;
                    let position = match &err.cause {
                        InnerError::Compile(cause) if !matches!(cause, CompileError::Syntax(_)) => {
                            let start = cause.range().start;
                            format!(" at line {}, column {}", start.line, start.column)
                        }
                        _ => String::new(),
                    };

                    writeln!(
                        handle,
                        "{}: {}\n  {}{}",
                        "Error".red().bold(),
                        template,
                        err,
                        position
                    )
                }
            };
            written.into_diagnostic()?;
        }

        handle.flush().into_diagnostic()?;

        if has_error {
            Err(miette!("Template check failed"))
        } else {
            Ok(())
        }
    }

    fn render(&self, template: &str, context: Option<&PathBuf>) -> miette::Result<()> {
        let input = match context {
            Some(path) => fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to read {}", path.display()))?,
            None => {
                let mut input = String::new();
                io::stdin().read_to_string(&mut input).into_diagnostic()?;
                input
            }
        };
        let request = parse_request(&input)?;

        let mut engine = self.create_engine(Options::default())?;
        let compiled = engine.compile(template)?;
        let rendered = engine.render(&mut engine.new_cache(), &compiled, &request)?;

        println!("{rendered}");
        Ok(())
    }

    fn run_config(&self, config: &Config, requests: Option<&PathBuf>) -> miette::Result<()> {
        let mut engine = self.create_engine((&config.options).into())?;
        let compiled = config
            .templates
            .iter()
            .map(|(name, template)| {
                engine
                    .compile(template)
                    .map(|compiled| (name.as_str(), compiled))
                    .wrap_err_with(|| format!("Invalid template \"{name}\""))
            })
            .collect::<miette::Result<Vec<_>>>()?;

        tracing::debug!(
            templates = compiled.len(),
            fields = engine.fields().len(),
            "configuration compiled"
        );

        let reader: Box<dyn BufRead> = match requests {
            Some(path) => Box::new(BufReader::new(
                fs::File::open(path)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Failed to open {}", path.display()))?,
            )),
            None => Box::new(BufReader::new(io::stdin())),
        };

        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());

        for (line_no, line) in reader.lines().enumerate() {
            let line = line.into_diagnostic()?;
            if line.trim().is_empty() {
                continue;
            }

            let request = parse_request(&line)
                .wrap_err_with(|| format!("Invalid request on line {}", line_no + 1))?;
            let mut cache = engine.new_cache();

            let output = compiled
                .iter()
                .map(|(name, compiled)| {
                    let value = engine
                        .render(&mut cache, compiled, &request)
                        .map_or(serde_json::Value::Null, serde_json::Value::String);
                    (name.to_string(), value)
                })
                .collect::<serde_json::Map<_, _>>();

            writeln!(handle, "{}", serde_json::Value::Object(output)).into_diagnostic()?;
        }

        handle.flush().into_diagnostic()
    }

    fn vars(&self) -> miette::Result<()> {
        let engine = self.create_engine(Options::default())?;
        let stdout = io::stdout();
        let mut handle = BufWriter::new(stdout.lock());

        for decl in engine.registry().iter() {
            let kind = if decl.is_fieldable() {
                "fieldable"
            } else if decl.is_cacheable() {
                "cacheable"
            } else {
                "plain"
            };
            writeln!(handle, "{}\t{}", decl.name().bold(), kind).into_diagnostic()?;
        }

        handle.flush().into_diagnostic()
    }
}

fn parse_request(input: &str) -> miette::Result<Request> {
    serde_json::from_str(input)
        .into_diagnostic()
        .wrap_err("Invalid request JSON")
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::check(vec!["varc", "check", "$host"])]
    #[case::render(vec!["varc", "render", "$host", "--context", "request.json"])]
    #[case::run(vec!["varc", "-v", "run", "-c", "varc.toml"])]
    #[case::vars(vec!["varc", "vars", "--quiet"])]
    fn test_parse_args(#[case] args: Vec<&str>) {
        assert!(Cli::try_parse_from(args).is_ok());
    }

    #[test]
    fn test_check_requires_templates() {
        assert!(Cli::try_parse_from(["varc", "check"]).is_err());
    }

    #[test]
    fn test_parse_request() {
        let request = parse_request(r#"{"method": "GET", "headers": {"Host": "a"}}"#).unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.header("host"), Some("a"));
        assert!(parse_request("not json").is_err());
    }
}
