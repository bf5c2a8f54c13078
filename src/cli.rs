use std::{fs, path::PathBuf};

mod terminal;

use anyhow::Context;
use clap::ArgAction;
use reqif_export::{
    export::{RandomIds, StableIds, build_bundle},
    store::{Store, select_spec},
    xml,
};
use terminal::Colorize;
use tracing::instrument;

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,

    /// Path to the Spec-IR SQLite database
    #[arg(long, value_name = "FILE")]
    db: PathBuf,

    /// Path of the ReqIF document to write
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Identifier of the specification to export
    ///
    /// May be omitted when the database holds exactly one specification.
    #[arg(long, value_name = "ID")]
    spec_id: Option<String>,

    /// Assign fresh identifiers on every run instead of content-derived ones
    #[arg(long)]
    random_ids: bool,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);
        self.export()
    }

    #[instrument]
    fn export(self) -> anyhow::Result<()> {
        let store = Store::open(&self.db)
            .with_context(|| format!("failed to open database {}", self.db.display()))?;

        let spec_ids = store.spec_ids().context("failed to list specifications")?;
        let spec_id = select_spec(&spec_ids, self.spec_id.as_deref())?;

        let snapshot = store
            .snapshot(&spec_id)
            .with_context(|| format!("failed to load specification {spec_id}"))?;

        let bundle = if self.random_ids {
            build_bundle(&snapshot, &RandomIds)?
        } else {
            build_bundle(&snapshot, &StableIds)?
        };

        let document = xml::to_xml_string(&bundle).context("failed to serialize ReqIF")?;

        let parent = self.output.parent().filter(|p| !p.as_os_str().is_empty());
        if let Some(parent) = parent {
            fs::create_dir_all(parent).with_context(|| {
                format!("failed to create output directory {}", parent.display())
            })?;
        }
        fs::write(&self.output, document)
            .with_context(|| format!("failed to write {}", self.output.display()))?;

        println!(
            "{}",
            format!("Wrote ReqIF: {}", self.output.display()).success()
        );
        println!("{}", format!("SpecCompiler spec_id: {spec_id}").dim());

        Ok(())
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}
