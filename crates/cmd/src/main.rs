// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cmd::commands::{DateRequest, build_command, config_command, date_command};
use cmd::common::{ProjectContext, parse_variable};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "estuary")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProjectArgs {
    /// Path to the site configuration file
    #[arg(short, long, default_value = sitegen::CONFIG_FILE)]
    config: PathBuf,
    /// Template variable for config expansion (repeatable)
    #[arg(short = 'v', long = "var", value_name = "KEY=VALUE", value_parser = parse_variable)]
    vars: Vec<(String, String)>,
}

impl ProjectArgs {
    fn context(&self) -> ProjectContext {
        ProjectContext::new(Some(self.config.clone()), self.vars.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Build the site into the output directory
    Build {
        #[command(flatten)]
        project: ProjectArgs,
        /// Override dir.input
        #[arg(long)]
        input: Option<String>,
        /// Override dir.output
        #[arg(long)]
        output: Option<String>,
    },
    /// Format a date the way the `date` template filter does
    Date {
        /// Date text or epoch milliseconds (default: now)
        value: Option<String>,
        /// Locale tag, `auto`, or one of yyyy-LL-dd, yyyy-LL, LL/dd/yyyy
        #[arg(short, long)]
        locale: Option<String>,
        /// Style keyword: full, long, medium, short
        #[arg(short, long, conflicts_with = "options")]
        style: Option<String>,
        /// Formatting options as a JSON object
        #[arg(long)]
        options: Option<String>,
        /// IANA time zone to render in
        #[arg(long)]
        time_zone: Option<String>,
        #[command(flatten)]
        project: ProjectArgs,
    },
    /// Print the resolved configuration as YAML
    Config {
        #[command(flatten)]
        project: ProjectArgs,
    },
}

fn main() -> Result<()> {
    diagnostics::init();

    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Build {
            project,
            input,
            output,
        } => {
            build_command(&project.context(), input.as_deref(), output.as_deref(), &mut out)?;
        }
        Commands::Date {
            value,
            locale,
            style,
            options,
            time_zone,
            project,
        } => {
            let request = DateRequest {
                value,
                locale,
                style,
                options,
                time_zone,
            };
            date_command(&project.context(), &request, &mut out)?;
        }
        Commands::Config { project } => config_command(&project.context(), &mut out)?,
    }

    out.flush()?;
    Ok(())
}
