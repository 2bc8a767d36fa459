//! Wi-Fi access-point rows reduced for export.

use std::collections::HashMap;

use serde::Serialize;

use crate::data::model::{Network, Site};

/// The exported subset of one scanned network.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccessPointRow {
    pub ssid: String,
    pub bssid: String,
    pub strength: String,
    pub channel: String,
    pub width: String,
    pub at_point: String,
}

impl AccessPointRow {
    pub fn from_network(network: &Network, at_point: &str) -> Self {
        let cell = |key: &str| network.get(key).cloned().unwrap_or_default();
        AccessPointRow {
            ssid: cell("SSID"),
            bssid: cell("BSSID"),
            strength: cell("Strength"),
            channel: cell("Center Channel"),
            width: cell("Width (Range)"),
            at_point: at_point.to_string(),
        }
    }

    /// Strength as a number; scanners write either dBm or a percentage.
    /// Unreadable values rank below everything else.
    pub fn strength_value(&self) -> f64 {
        self.strength
            .trim()
            .trim_end_matches('%')
            .trim_end_matches("dBm")
            .trim()
            .parse()
            .unwrap_or(f64::NEG_INFINITY)
    }
}

/// Which column identifies "the same" network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DedupKey {
    #[default]
    Bssid,
    Ssid,
}

/// Every network of every point, in point order.
pub fn access_point_rows(site: &Site) -> Vec<AccessPointRow> {
    site.points
        .iter()
        .flat_map(|point| {
            point
                .networks
                .iter()
                .map(|n| AccessPointRow::from_network(n, &point.reference))
        })
        .collect()
}

/// Keep only the strongest row per key. Rows stay in the order their key
/// was first seen; on equal strength the earlier row wins.
pub fn dedup_strongest(rows: Vec<AccessPointRow>, key: DedupKey) -> Vec<AccessPointRow> {
    let mut slot_of: HashMap<String, usize> = HashMap::new();
    let mut kept: Vec<AccessPointRow> = Vec::new();

    for row in rows {
        let id = match key {
            DedupKey::Bssid => row.bssid.clone(),
            DedupKey::Ssid => row.ssid.clone(),
        };
        match slot_of.get(&id) {
            Some(&slot) => {
                if row.strength_value() > kept[slot].strength_value() {
                    kept[slot] = row;
                }
            }
            None => {
                slot_of.insert(id, kept.len());
                kept.push(row);
            }
        }
    }
    kept
}
