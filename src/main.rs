use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use log::info;

use rf_survey::report::{render_summary, write_csv, write_json};
use rf_survey::wifi::DedupKey;
use rf_survey::{DetectionConfig, Survey};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DedupBy {
    Bssid,
    Ssid,
}

#[derive(Debug, Parser)]
#[clap(name = "rf-survey", version, about = "Carrier LTE/GSM presence per survey point")]
struct Cli {
    /// Folder holding one subfolder per survey point
    #[clap(default_value = "results")]
    results: PathBuf,

    /// Name of the surveyed site
    #[clap(long, default_value = "Site")]
    site: String,

    /// JSON file overriding thresholds, allow-list or band plan
    #[clap(long)]
    config: Option<PathBuf>,

    /// Write the per-point, per-carrier presence table as CSV
    #[clap(long)]
    export: Option<PathBuf>,

    /// Write all detected signals as JSON
    #[clap(long)]
    json: Option<PathBuf>,

    /// Write the deduplicated access-point list as CSV
    #[clap(long)]
    wifi_export: Option<PathBuf>,

    /// Column identifying duplicate access points
    #[clap(long, value_enum, default_value = "bssid")]
    dedup_by: DedupBy,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DetectionConfig::load(path)?,
        None => DetectionConfig::default(),
    };

    let mut survey = Survey::open(&cli.results, &cli.site, config)?;
    info!("Analyzing {} points of {}", survey.site.len(), cli.site);
    survey.analyze();

    let presence = survey.presence();
    println!("{}", render_summary(&presence));
    info!("{} signals detected", survey.signal_count());

    if let Some(path) = &cli.export {
        write_csv(path, &presence)?;
        info!("Presence table written to {}", path.display());
    }
    if let Some(path) = &cli.json {
        write_json(path, &survey.site)?;
        info!("Signals written to {}", path.display());
    }
    if let Some(path) = &cli.wifi_export {
        let key = match cli.dedup_by {
            DedupBy::Bssid => DedupKey::Bssid,
            DedupBy::Ssid => DedupKey::Ssid,
        };
        let rows = survey.access_points(key);
        write_csv(path, &rows)?;
        info!("{} access points written to {}", rows.len(), path.display());
    }

    Ok(())
}
