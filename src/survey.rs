use std::path::Path;

use anyhow::Result;

use crate::config::DetectionConfig;
use crate::data::loader::load_site;
use crate::data::model::Site;
use crate::detect::{PointSummary, analyze_site};
use crate::report::{PresenceRow, presence_table};
use crate::wifi::{AccessPointRow, DedupKey, access_point_rows, dedup_strongest};

// ---------------------------------------------------------------------------
// Survey state
// ---------------------------------------------------------------------------

/// A loaded site together with the configuration it is analyzed under.
#[derive(Debug, Clone)]
pub struct Survey {
    pub site: Site,
    pub config: DetectionConfig,
    /// Per-point outcome tallies, filled by [`Survey::analyze`].
    pub summaries: Vec<PointSummary>,
}

impl Survey {
    pub fn new(site: Site, config: DetectionConfig) -> Self {
        Survey {
            site,
            config,
            summaries: Vec::new(),
        }
    }

    /// Load every point below `results_dir`.
    pub fn open(results_dir: &Path, reference: &str, config: DetectionConfig) -> Result<Self> {
        let site = load_site(results_dir, reference)?;
        Ok(Survey::new(site, config))
    }

    /// Run detection over all points and hoist the results.
    pub fn analyze(&mut self) -> &[PointSummary] {
        self.summaries = analyze_site(&mut self.site, &self.config);
        &self.summaries
    }

    /// Per-point, per-carrier presence for every carrier in the tables.
    pub fn presence(&self) -> Vec<PresenceRow> {
        presence_table(&self.site, &self.config.tables.carriers())
    }

    /// Access points across the site, strongest per key only.
    pub fn access_points(&self, key: DedupKey) -> Vec<AccessPointRow> {
        dedup_strongest(access_point_rows(&self.site), key)
    }

    pub fn signal_count(&self) -> usize {
        self.site
            .points
            .iter()
            .map(|p| p.detected_signals.len())
            .sum()
    }
}
