use std::{env, process::ExitCode};

use clap::{Parser, Subcommand};
use log::debug;
use serde::Serialize;

use ghactivity::config::{get_config, Config};
use ghactivity::gql_queries::contributions_collection::ContributionTotals;
use ghactivity::gql_queries::repositories::RepositoryOptions;
use ghactivity::temporal::parse_bound;
use ghactivity::{
    ActivityReport, ActivityService, Direction, GitHubClient, ListEntity, Outcome,
    RepositoryReport, TimeWindow,
};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// GitHub host, e.g. github.com or an Enterprise Server hostname
    #[arg(long, global = true)]
    host: Option<String>,
    /// Items requested per page
    #[arg(long, global = true)]
    page_size: Option<i64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List a user's items of one kind
    Activity {
        entity: ListEntity,
        login: String,
        /// Also count items created strictly before this instant
        #[arg(long)]
        before: Option<String>,
    },
    /// Repository and language totals for repositories created in a window
    Repos {
        login: String,
        #[arg(long, value_enum)]
        direction: Direction,
        #[arg(long)]
        start: String,
        /// Required when direction is between
        #[arg(long)]
        end: Option<String>,
        /// Count forked repositories too
        #[arg(long)]
        include_forks: bool,
    },
    /// Contribution totals from `--from` (inclusive) to `--to` (exclusive)
    Contributions {
        login: String,
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    /// Show who the configured token belongs to
    Whoami,
    /// Look up the canonical login of a user
    UserLogin { login: String },
    /// Print the query text for an entity without sending it
    Query { entity: ListEntity, login: String },
}

fn setup_logging(verbose: bool) {
    let mut log_builder = env_logger::builder();
    if verbose {
        log_builder.filter(None, log::LevelFilter::Debug);
    } else {
        // Only set default of info if not configured via env already
        if env::var("RUST_LOG").is_err() {
            log_builder.filter(None, log::LevelFilter::Info);
        }
        log_builder.format_timestamp(None);
    }
    log_builder.init();
}

/// Result of one subcommand, printed inside an `Outcome`.
#[derive(Serialize, Debug)]
#[serde(untagged)]
enum Report {
    Activity(ActivityReport),
    Repositories(RepositoryReport),
    Contributions(ContributionTotals),
    Text(String),
}

fn connect(
    config: &Config,
    host: &str,
    page_size: i64,
) -> ghactivity::Result<ActivityService<GitHubClient>> {
    let token = config.github_token(host)?;
    let client = GitHubClient::new(host, token, config.timeout())?;
    debug!("Using GraphQL endpoint {}", client.endpoint());
    Ok(ActivityService::new(
        client,
        page_size,
        config.page_size_ceiling,
    ))
}

fn run(command: Commands, config: &Config, host: &str, page_size: i64) -> ghactivity::Result<Report> {
    match command {
        Commands::Activity {
            entity,
            login,
            before,
        } => {
            let cutoff = before.as_deref().map(parse_bound).transpose()?;
            let service = connect(config, host, page_size)?;
            Ok(Report::Activity(service.activity(entity, &login, cutoff)?))
        }
        Commands::Repos {
            login,
            direction,
            start,
            end,
            include_forks,
        } => {
            let end = end.as_deref().map(parse_bound).transpose()?;
            let window = TimeWindow::new(direction, parse_bound(&start)?, end)?;
            let options = RepositoryOptions {
                is_fork: if include_forks { None } else { Some(false) },
                ..RepositoryOptions::default()
            };
            let service = connect(config, host, page_size)?;
            Ok(Report::Repositories(service.repositories(&login, window, &options)?))
        }
        Commands::Contributions { login, from, to } => {
            let (from, to) = (parse_bound(&from)?, parse_bound(&to)?);
            let service = connect(config, host, page_size)?;
            Ok(Report::Contributions(service.contributions(&login, from, to)?))
        }
        Commands::Whoami => Ok(Report::Text(
            connect(config, host, page_size)?.viewer_login()?,
        )),
        Commands::UserLogin { login } => Ok(Report::Text(
            connect(config, host, page_size)?.user_login(&login)?,
        )),
        Commands::Query { entity, login } => {
            let document = entity.query(&login, page_size, config.page_size_ceiling)?;
            Ok(Report::Text(document.serialize()))
        }
    }
}

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let config = get_config()?;
    let host = cli.host.unwrap_or_else(|| config.default_host.clone());
    let page_size = cli.page_size.unwrap_or(config.page_size);

    let outcome = Outcome::from(run(cli.command, &config, &host, page_size));
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(match outcome {
        Outcome::Ok(_) => ExitCode::SUCCESS,
        Outcome::Error(_) => ExitCode::FAILURE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ghactivity::Error;
    use serde_json::json;

    #[test]
    fn test_reports_print_without_variant_tags() {
        let outcome: Outcome<Report> = Ok(Report::Text("octocat".to_string())).into();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            json!({"ok": "octocat"})
        );

        let totals = ContributionTotals {
            commits: 30,
            ..ContributionTotals::default()
        };
        let outcome: Outcome<Report> = Ok(Report::Contributions(totals)).into();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap()["ok"]["commits"],
            json!(30)
        );
    }

    #[test]
    fn test_failures_keep_their_kind() {
        let outcome: Outcome<Report> =
            Err(Error::configuration("page size 0 must be between 1 and 100")).into();
        assert_eq!(
            serde_json::to_value(&outcome).unwrap()["error"]["kind"],
            json!("configuration")
        );
    }

    #[test]
    fn test_user_login_subcommand() {
        let cli = Cli::parse_from(["ghactivity", "user-login", "octocat"]);
        assert!(matches!(cli.command, Commands::UserLogin { login } if login == "octocat"));
    }
}
