mod cli;

use picturedb::{
    config::{self, Config},
    indexer::Indexer,
    photoprism::PhotoprismClient,
    sync::{group_by_album, AlbumSync, SyncOptions},
};
use picturedb_db::{
    pool::{init_pool, DbPool},
    queries::{
        grouping::{self, GroupingQuery},
        raw::{self, StatementOutput},
    },
};
use picturedb_exif::ExifTool;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};

/// Connection settings and grouping selected on the command line.
struct PhotoprismArgs {
    grouping: GroupingQuery,
    url: Option<String>,
    user: Option<String>,
    pass: Option<String>,
    delete: bool,
    member_limit: Option<usize>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = config::load_config_or_default(cli.config.as_deref())?;

    // Initialize logging
    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose || config.verbose {
            "picturedb=debug,picturedb_db=debug,picturedb_exif=debug,picturedb_common=debug"
                .to_string()
        } else {
            "picturedb=info,picturedb_db=info,picturedb_exif=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    for warning in config::config_warnings(&config) {
        tracing::warn!("{}", warning);
    }

    let db_path = cli.db_path.unwrap_or_else(|| config.db_path.clone());

    match cli.command {
        Commands::Index { dirs, reindex } => index(&config, &db_path, &dirs, reindex),
        Commands::Photoprism {
            query,
            tag_prefix,
            directory,
            url,
            user,
            pass,
            delete,
            member_limit,
        } => {
            let grouping = match (query, tag_prefix, directory) {
                (Some(sql), _, _) => GroupingQuery::Sql(sql),
                (None, Some(prefix), _) => GroupingQuery::TagPrefix(prefix),
                (None, None, Some(level)) => GroupingQuery::Directory(level),
                (None, None, None) => {
                    anyhow::bail!("A query, --tag-prefix or --directory is required")
                }
            };
            sync_photoprism(
                &config,
                &db_path,
                PhotoprismArgs {
                    grouping,
                    url,
                    user,
                    pass,
                    delete,
                    member_limit,
                },
            )
        }
        Commands::Sql { statement } => run_sql(&db_path, &statement),
        Commands::CheckTools => check_tools(),
    }
}

fn open_index(db_path: &Path) -> Result<DbPool> {
    tracing::debug!("Opening index at {:?}", db_path);
    init_pool(&db_path.to_string_lossy())
        .with_context(|| format!("Failed to open index {:?}", db_path))
}

fn index(config: &Config, db_path: &Path, dirs: &[PathBuf], force: bool) -> Result<()> {
    let pool = open_index(db_path)?;
    let exiftool = ExifTool::discover(config.exiftool.path.as_deref())?;
    let indexer = Indexer::new(pool, exiftool);

    for dir in dirs {
        let report = indexer
            .reindex(dir, force)
            .with_context(|| format!("Failed to index {:?}", dir))?;

        println!(
            "{}: {} pictures, {} indexed, {} unchanged, {} removed, {} failed",
            dir.display(),
            report.candidates,
            report.processed,
            report.skipped,
            report.removed,
            report.failures.len()
        );
    }

    Ok(())
}

fn sync_photoprism(config: &Config, db_path: &Path, args: PhotoprismArgs) -> Result<()> {
    let pool = open_index(db_path)?;
    let pairs = {
        let conn = pool.get()?;
        grouping::membership_pairs(&conn, &args.grouping)?
    };

    let groups = group_by_album(pairs);
    if groups.is_empty() {
        println!("No album memberships selected, nothing to sync");
        return Ok(());
    }

    // Command line flags override the config file
    let mut settings = config.photoprism.clone();
    if args.url.is_some() {
        settings.url = args.url;
    }
    if args.user.is_some() {
        settings.user = args.user;
    }
    if args.pass.is_some() {
        settings.pass = args.pass;
    }
    if let Some(limit) = args.member_limit {
        settings.member_limit = limit;
    }
    if settings.member_limit == 0 {
        anyhow::bail!("--member-limit must be greater than 0");
    }

    let options = SyncOptions {
        delete_extras: args.delete || settings.delete_extras,
        member_limit: settings.member_limit,
    };

    // Remote calls are awaited one at a time
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    let outcomes = rt.block_on(async {
        let client = PhotoprismClient::login(&settings).await?;
        AlbumSync::new(&client, options).reconcile(&groups).await
    })?;

    for outcome in &outcomes {
        println!(
            "{}: {}{} added, {} present, {} missing, {} removed, {} extra",
            outcome.title,
            if outcome.created { "created, " } else { "" },
            outcome.added.len(),
            outcome.already_present.len(),
            outcome.missing.len(),
            outcome.removed.len(),
            outcome.extras.len()
        );
    }

    Ok(())
}

fn run_sql(db_path: &Path, statement: &str) -> Result<()> {
    let pool = open_index(db_path)?;
    let conn = pool.get()?;

    for output in raw::run_statements(&conn, statement)? {
        match output {
            StatementOutput::Rows(table) => print!("{}", table),
            StatementOutput::Affected(count) => println!("{} rows affected", count),
        }
    }

    Ok(())
}

fn check_tools() -> Result<()> {
    println!("Checking external tools...\n");

    let tools = picturedb_exif::check_tools();
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install exiftool to index pictures.");
    }

    Ok(())
}
