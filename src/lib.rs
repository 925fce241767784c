pub mod cli;
pub mod filter;
pub mod model;
pub mod output;
pub mod projection;
pub mod query;
pub mod resolver;
pub mod snapshot;

use anyhow::Context;

pub use cli::{Cli, ColorMode, OutputFormat, cli_parse};
pub use filter::{Filter, FilterMode, FilterParseError, ObjectKind, parse_filters};
pub use model::{Application, Machine, Model, SchemaError, Unit};
pub use projection::{Projection, project};
pub use query::{EntityKind, QueryMatches, run_query};
pub use snapshot::{SnapshotProvider, StatusSnapshot, parse_snapshot};

use snapshot::{CacheProvider, FileProvider};

pub fn run() -> anyhow::Result<()> {
    let cli = cli_parse();

    // Set up color handling based on user preference
    match cli.color {
        ColorMode::Always => unsafe {
            std::env::set_var("CLICOLOR_FORCE", "1");
        },
        ColorMode::Never => unsafe {
            std::env::set_var("NO_COLOR", "1");
        },
        ColorMode::Auto => {}
    }

    // Everything about the request is validated before the snapshot is
    // touched: object kind, filter expressions, and only then the data.
    let kind: ObjectKind = cli.object.parse()?;
    let kind = EntityKind::try_from(kind)?;
    let filters = parse_filters(&cli.filters)?;

    if cli.verbose {
        eprintln!("querying {} with {} filter(s)", kind, filters.len());
        for filter in &filters {
            eprintln!(
                "  {} {} {}",
                filter.kind,
                filter.mode.token(),
                filter.pattern
            );
        }
    }

    let raw = if let Some(path) = &cli.file {
        FileProvider::new(path).fetch()?
    } else {
        let cache_file = match &cli.cache_file {
            Some(path) => path.clone(),
            None => snapshot::default_cache_file()?,
        };
        let provider = CacheProvider::new(cache_file, cli.max_age, cli.refresh);
        if cli.verbose {
            match provider.cache_age() {
                Some(age) => eprintln!(
                    "snapshot cache '{}' is {}m old",
                    provider.cache_file().display(),
                    age.num_minutes()
                ),
                None => eprintln!(
                    "no snapshot cache at '{}'",
                    provider.cache_file().display()
                ),
            }
        }
        provider.fetch()?
    };

    let status = parse_snapshot(&raw).context("failed to parse status snapshot")?;
    let model = Model::from_snapshot(&status)?;

    let matches = run_query(&model, kind, &filters)?;
    if cli.verbose {
        eprintln!("matched {} {}", matches.len(), kind);
    }

    let projection = project(&model, &matches, cli.columns.as_deref())?;

    match cli.format {
        OutputFormat::Text => println!("{}", output::render_table(&projection)),
        OutputFormat::Json => println!("{}", output::render_json(&projection)?),
    }

    Ok(())
}
