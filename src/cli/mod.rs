//! CLI command handling
//!
//! Dispatches CLI commands and formats output.

use std::sync::Arc;

use crate::commands::Commands;
use crate::common::{Config, Error, Result};
use crate::fixture;
use crate::params::ParamParser;
use crate::testing;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands) -> Result<()> {
    match command {
        Commands::Run {
            fixture,
            sheet,
            config,
            jobs,
            strip_param_spaces,
        } => {
            let config = Arc::new(Config::load(config.as_deref()));
            let parser =
                ParamParser::strip_all_spaces(strip_param_spaces || config.strip_param_spaces());
            let concurrency = jobs.unwrap_or_else(|| config.concurrency());

            let summary = testing::run_file(
                &fixture,
                &sheet.read_options(),
                Arc::clone(&config),
                parser,
                concurrency,
            )
            .await?;

            if summary.all_passed() {
                Ok(())
            } else {
                Err(Error::TestAssertion(format!(
                    "{} of {} cases failed",
                    summary.failed(),
                    summary.total()
                )))
            }
        }

        Commands::Show { fixture, sheet } => {
            let rows = fixture::read(&fixture, &sheet.read_options())?;
            println!("{}", serde_json::to_string_pretty(&rows)?);
            Ok(())
        }

        Commands::Parse {
            expression,
            strip_param_spaces,
        } => {
            let value = ParamParser::strip_all_spaces(strip_param_spaces).parse(Some(&expression));
            println!("{}", serde_json::to_string_pretty(&value)?);
            Ok(())
        }
    }
}
