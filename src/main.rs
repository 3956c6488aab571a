// Copyright 2025 dentsusoken
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::io::IsTerminal;

use clap::{Parser, Subcommand};
use upkeep::commands::check::CheckCommand;
use upkeep::commands::compare::CompareCommand;
use upkeep::commands::install::InstallCommand;
use upkeep::commands::list::ListCommand;
use upkeep::commands::run::RunCommand;
use upkeep::config::new_upkeep_config;
use upkeep::error::{
    Result, UpkeepError, format_error_chain, format_error_with_color, get_exit_code,
};
use upkeep::logging;

#[derive(Parser)]
#[command(name = "upkeep")]
#[command(author, version, about = "Keep installed components up to date", long_about = None)]
struct Cli {
    /// Increase verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check for updates now and list what is available
    #[command(visible_alias = "c")]
    Check,

    /// List registered components
    #[command(visible_alias = "ls")]
    List,

    /// Download and install available updates
    #[command(visible_alias = "i")]
    Install {
        /// Components to update (e.g. "client", "ui")
        names: Vec<String>,

        /// Update every component with an available update
        #[arg(short, long, conflicts_with = "names")]
        all: bool,

        /// Disable progress indicators
        #[arg(long)]
        no_progress: bool,
    },

    /// Run periodic update checks until interrupted
    Run,

    /// Compare two version strings
    Compare {
        left: String,
        right: String,

        /// Reject strings that are not valid versions
        #[arg(long)]
        strict: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    logging::setup_logger(cli.verbose);

    let config = match new_upkeep_config() {
        Ok(config) => config,
        Err(e) => {
            report_error(&e);
        }
    };

    let result: Result<()> = (|| match cli.command {
        Commands::Check => CheckCommand::new(&config)?.execute(),
        Commands::List => ListCommand::new(&config)?.execute(),
        Commands::Install {
            names,
            all,
            no_progress,
        } => InstallCommand::new(&config, no_progress)?.execute(&names, all),
        Commands::Run => RunCommand::new(&config)?.execute(),
        Commands::Compare {
            left,
            right,
            strict,
        } => CompareCommand::new()?.execute(&left, &right, strict),
    })();

    if let Err(e) = result {
        report_error(&e);
    }
}

fn report_error(error: &UpkeepError) -> ! {
    let use_color = std::io::stderr().is_terminal()
        && colored::control::SHOULD_COLORIZE.should_colorize();
    if use_color {
        eprintln!("{}", format_error_with_color(error, true));
    } else {
        eprintln!("{}", format_error_chain(error));
    }
    std::process::exit(get_exit_code(error));
}
