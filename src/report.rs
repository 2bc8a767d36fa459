use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::data::model::{Point, SignalKind, Site};

// ---------------------------------------------------------------------------
// Presence table: one row per point and carrier
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PresenceRow {
    pub point: String,
    pub carrier: String,
    pub gsm: bool,
    /// Distinct GSM channels in MHz, detection order, `;`-separated.
    pub gsm_channels: String,
    pub lte: bool,
    /// Distinct LTE channels as `centre/bandwidth` in MHz.
    pub lte_channels: String,
}

/// Tabulate the point's hoisted signals per carrier.
pub fn presence_for_point(point: &Point, carriers: &[String]) -> Vec<PresenceRow> {
    carriers
        .iter()
        .map(|carrier| {
            let mut gsm: Vec<String> = Vec::new();
            let mut lte: Vec<String> = Vec::new();
            for signal in &point.detected_signals {
                if signal.carrier.as_deref() != Some(carrier.as_str()) {
                    continue;
                }
                let label = match (signal.kind, signal.bandwidth_mhz) {
                    (SignalKind::Lte, Some(bw)) => format!("{}/{bw}", signal.frequency_mhz),
                    _ => signal.frequency_mhz.to_string(),
                };
                let list = match signal.kind {
                    SignalKind::Gsm => &mut gsm,
                    SignalKind::Lte => &mut lte,
                };
                if !list.contains(&label) {
                    list.push(label);
                }
            }
            PresenceRow {
                point: point.reference.clone(),
                carrier: carrier.clone(),
                gsm: !gsm.is_empty(),
                gsm_channels: gsm.join(";"),
                lte: !lte.is_empty(),
                lte_channels: lte.join(";"),
            }
        })
        .collect()
}

pub fn presence_table(site: &Site, carriers: &[String]) -> Vec<PresenceRow> {
    site.points
        .iter()
        .flat_map(|p| presence_for_point(p, carriers))
        .collect()
}

/// Human-readable summary for the terminal.
pub fn render_summary(rows: &[PresenceRow]) -> String {
    let mut out = String::new();
    let mut current: Option<&str> = None;
    for row in rows {
        if current != Some(row.point.as_str()) {
            out.push_str(&format!("\nPoint {}\n", row.point));
            current = Some(row.point.as_str());
        }
        let mark = |present: bool| if present { "yes" } else { "-" };
        out.push_str(&format!(
            "  {:<12} GSM {:<4} LTE {:<4} {}\n",
            row.carrier,
            mark(row.gsm),
            mark(row.lte),
            row.lte_channels
        ));
    }
    out
}

// ---------------------------------------------------------------------------
// File export
// ---------------------------------------------------------------------------

/// Write any serializable rows as CSV with a header line.
pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("creating {}", path.display()))?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

/// Dump the site's points with their detections as pretty JSON.
pub fn write_json(path: &Path, site: &Site) -> Result<()> {
    let file =
        std::fs::File::create(path).with_context(|| format!("creating {}", path.display()))?;
    serde_json::to_writer_pretty(std::io::BufWriter::new(file), &site.points)
        .context("writing JSON")?;
    Ok(())
}
