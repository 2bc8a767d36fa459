use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{bail, Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use log::{debug, info, warn};

use super::model::{Network, ParamValue, Parameter, Point, Record, Site, Snapshot, Trace};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a whole survey: every subdirectory of `results_dir` is one point.
///
/// Points are ordered numerically where the folder name is an integer,
/// followed by the remaining names in lexical order.
pub fn load_site(results_dir: &Path, reference: &str) -> Result<Site> {
    let mut names = Vec::new();
    for entry in std::fs::read_dir(results_dir)
        .with_context(|| format!("reading results folder {}", results_dir.display()))?
    {
        let entry = entry.context("reading directory entry")?;
        if entry.file_type().context("reading file type")?.is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort_by(|a, b| point_order(a, b));
    info!("{} points found in {}", names.len(), results_dir.display());

    let mut points = Vec::with_capacity(names.len());
    for name in &names {
        match load_point(&results_dir.join(name), name) {
            Ok(point) => points.push(point),
            Err(err) => warn!("Skipping point {name}: {err:#}"),
        }
    }
    Ok(Site::new(reference, points))
}

/// Load one point folder: analyzer snapshots plus any access-point lists.
pub fn load_point(dir: &Path, reference: &str) -> Result<Point> {
    let mut files = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("reading point folder {}", dir.display()))?
    {
        let entry = entry.context("reading directory entry")?;
        if entry.file_type().context("reading file type")?.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();

    let mut point = Point::new(reference);
    for name in &files {
        let path = dir.join(name);
        if is_snapshot_name(name) {
            match load_snapshot(&path) {
                Ok(snapshot) => point.snapshots.push(snapshot),
                Err(err) => warn!("Skipping snapshot: {err:#}"),
            }
        } else if is_access_point_name(name) {
            match load_access_points(&path) {
                Ok(networks) => point.networks.extend(networks),
                Err(err) => warn!("Skipping access points: {err:#}"),
            }
        } else {
            debug!("ignoring {}", path.display());
        }
    }

    if point.snapshots.is_empty() {
        warn!("Folder for point {reference} contains no valid snapshots");
    }
    Ok(point)
}

/// Load one analyzer export file.
pub fn load_snapshot(path: &Path) -> Result<Snapshot> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let traces =
        parse_sweep_export(&text).with_context(|| format!("parsing {}", path.display()))?;
    let reference = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(Snapshot { reference, traces })
}

// ---------------------------------------------------------------------------
// File name patterns
// ---------------------------------------------------------------------------

/// Analyzer exports are named like `SPE0042.csv`: three word characters,
/// four digits.
pub fn is_snapshot_name(name: &str) -> bool {
    let Some(stem) = name.strip_suffix(".csv") else {
        return false;
    };
    let bytes = stem.as_bytes();
    bytes.len() == 7
        && bytes[..3]
            .iter()
            .all(|b| b.is_ascii_alphanumeric() || *b == b'_')
        && bytes[3..].iter().all(u8::is_ascii_digit)
}

pub fn is_access_point_name(name: &str) -> bool {
    name.contains("Access Points")
}

/// Integer names first, numerically; everything else after, lexically.
pub fn point_order(a: &str, b: &str) -> Ordering {
    match (a.parse::<i64>(), b.parse::<i64>()) {
        (Ok(x), Ok(y)) => x.cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

// ---------------------------------------------------------------------------
// Analyzer CSV export
// ---------------------------------------------------------------------------

const SWEEP_MARKER: &str = "Sweep";
const DATA_MARKER: &str = "Frequency [Hz]";

/// Parse an analyzer export holding one or more traces side by side.
///
/// Layout:
/// * Each trace owns a block of columns. On the first line the cell right of
///   the block's first column contains "Sweep".
/// * Header lines are `title,value,unit` per block.
/// * The line containing "Frequency [Hz]" starts the data; every line below
///   it is `frequency,amplitude` per block.
///
/// ```text
/// Type,Sweep 1,,,Type,Sweep 2,
/// Trace Mode,Max Hold,,,Trace Mode,Clear Write,
/// Span,40000000,Hz,,Span,40000000,Hz
/// Frequency [Hz],Amplitude [dBm],,,Frequency [Hz],Amplitude [dBm],
/// 919000000,-97.1,,,919000000,-99.3,
/// ```
pub fn parse_sweep_export(text: &str) -> Result<Vec<Trace>> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let rows = reader
        .records()
        .collect::<std::result::Result<Vec<StringRecord>, _>>()
        .context("reading CSV rows")?;

    let Some(first) = rows.first() else {
        bail!("empty export");
    };
    let blocks: Vec<usize> = first
        .iter()
        .enumerate()
        .filter(|(i, cell)| *i > 0 && cell.contains(SWEEP_MARKER))
        .map(|(i, _)| i - 1)
        .collect();
    if blocks.is_empty() {
        bail!("no '{SWEEP_MARKER}' column in first line");
    }

    let data_row = rows
        .iter()
        .position(|row| row.iter().any(|cell| cell.contains(DATA_MARKER)))
        .with_context(|| format!("no '{DATA_MARKER}' line"))?;

    blocks
        .iter()
        .map(|&col| {
            let parameters = parse_parameters(&rows[..data_row], col);
            let records = parse_records(&rows[data_row + 1..], col, data_row + 1)?;
            Ok(Trace::new(parameters, records))
        })
        .collect()
}

fn parse_parameters(rows: &[StringRecord], col: usize) -> Vec<Parameter> {
    rows.iter()
        .filter_map(|row| {
            let title = row.get(col).unwrap_or("");
            if title.is_empty() {
                return None;
            }
            Some(Parameter::new(
                title,
                ParamValue::guess(row.get(col + 1).unwrap_or("")),
                row.get(col + 2).unwrap_or(""),
            ))
        })
        .collect()
}

fn parse_records(rows: &[StringRecord], col: usize, first_line: usize) -> Result<Vec<Record>> {
    let mut records = Vec::with_capacity(rows.len());
    for (offset, row) in rows.iter().enumerate() {
        let line = first_line + offset + 1;
        let frequency = row.get(col).unwrap_or("");
        let amplitude = row.get(col + 1).unwrap_or("");
        if frequency.is_empty() && amplitude.is_empty() {
            continue;
        }

        let frequency: f64 = frequency
            .parse()
            .with_context(|| format!("line {line}: '{frequency}' is not a frequency"))?;
        if !frequency.is_finite() || frequency < 0.0 {
            bail!("line {line}: frequency {frequency} out of range");
        }
        let amplitude: f64 = amplitude
            .parse()
            .with_context(|| format!("line {line}: '{amplitude}' is not an amplitude"))?;
        if !amplitude.is_finite() {
            bail!("line {line}: amplitude {amplitude} out of range");
        }

        records.push(Record::new(frequency.round() as u64, amplitude));
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Access-point list
// ---------------------------------------------------------------------------

/// Parse a pipe-delimited Wi-Fi scan: header row, then one network per row.
pub fn parse_access_points(text: &str) -> Result<Vec<Network>> {
    let mut reader = ReaderBuilder::new()
        .delimiter(b'|')
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    let headers: Vec<String> = reader
        .headers()
        .context("reading access point header")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut networks = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let row = result.with_context(|| format!("access point row {row_no}"))?;
        let network: BTreeMap<String, String> = headers
            .iter()
            .zip(row.iter())
            .map(|(key, value)| (key.clone(), value.to_string()))
            .collect();
        networks.push(network);
    }
    Ok(networks)
}

pub fn load_access_points(path: &Path) -> Result<Vec<Network>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading access points {}", path.display()))?;
    parse_access_points(&text).with_context(|| format!("parsing {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXPORT: &str = "\
Type,Sweep 1,,,Type,Sweep 2,
Trace Mode,Max Hold,,,Trace Mode,Clear Write,
Center Frequency,939000000,Hz,,Center Frequency,939000000,Hz
Span,40000000,Hz,,Span,40000000,Hz
Data,,,,Data,,
Frequency [Hz],Amplitude [dBm],,,Frequency [Hz],Amplitude [dBm],
919000000,-97.1,,,919000000,-99.3,
919050000,-96.8,,,919050000,-98.0,
919100000,-60.5,,,,,
";

    #[test]
    fn test_two_traces_side_by_side() {
        let traces = parse_sweep_export(EXPORT).unwrap();
        assert_eq!(traces.len(), 2);

        let max_hold = &traces[0];
        assert_eq!(
            max_hold.parameter("Trace Mode").unwrap().value,
            ParamValue::Text("Max Hold".into())
        );
        assert_eq!(max_hold.numeric_parameter("Span").unwrap(), 40e6);
        assert_eq!(max_hold.parameter("Center Frequency").unwrap().unit, "Hz");
        assert_eq!(max_hold.records.len(), 3);
        assert_eq!(max_hold.records[2], Record::new(919_100_000, -60.5));

        let clear_write = &traces[1];
        assert_eq!(clear_write.records.len(), 2);
        assert_eq!(clear_write.records[1].amplitude, -98.0);
    }

    #[test]
    fn test_scientific_frequencies() {
        let text = "Type,Sweep\nSpan,1000,Hz\nFrequency [Hz],Amplitude [dBm]\n9.39E+08,-90\n";
        let traces = parse_sweep_export(text).unwrap();
        assert_eq!(traces[0].records, vec![Record::new(939_000_000, -90.0)]);
    }

    #[test]
    fn test_missing_markers() {
        assert!(parse_sweep_export("Span,100,Hz\n").is_err());
        assert!(parse_sweep_export("Type,Sweep\nSpan,100,Hz\n").is_err());
        assert!(parse_sweep_export("").is_err());
    }

    #[test]
    fn test_bad_amplitude_reports_line() {
        let text = "Type,Sweep\nFrequency [Hz],Amplitude [dBm]\n100,-90\n150,loud\n";
        let err = parse_sweep_export(text).unwrap_err();
        assert!(format!("{err:#}").contains("line 4"));
    }

    #[test]
    fn test_non_finite_amplitude_rejected() {
        for cell in ["NaN", "-inf", "inf"] {
            let text =
                format!("Type,Sweep\nFrequency [Hz],Amplitude [dBm]\n100,{cell}\n150,-90\n");
            let err = parse_sweep_export(&text).unwrap_err();
            assert!(format!("{err:#}").contains("line 3"), "{cell}: {err:#}");
        }
    }

    #[test]
    fn test_access_points() {
        let text = "SSID|BSSID|Strength|Center Channel|Width (Range)\n\
                    guest|aa:bb:cc:00:00:01|-61|36|80\n\
                    office|aa:bb:cc:00:00:02|-48|6|20\n";
        let networks = parse_access_points(text).unwrap();
        assert_eq!(networks.len(), 2);
        assert_eq!(networks[1]["SSID"], "office");
        assert_eq!(networks[0]["Width (Range)"], "80");
    }

    #[test]
    fn test_file_patterns() {
        assert!(is_snapshot_name("SPE0001.csv"));
        assert!(is_snapshot_name("ab_1234.csv"));
        assert!(!is_snapshot_name("SPE001.csv"));
        assert!(!is_snapshot_name("SPE0001.txt"));
        assert!(!is_snapshot_name("notes.csv"));
        assert!(is_access_point_name("Office Access Points.txt"));
        assert!(!is_access_point_name("SPE0001.csv"));
    }

    #[test]
    fn test_point_order() {
        let mut names = vec!["10", "lobby", "2", "1", "attic"];
        names.sort_by(|a, b| point_order(a, b));
        assert_eq!(names, vec!["1", "2", "10", "attic", "lobby"]);
    }

    #[test]
    fn test_load_site_from_folders() {
        let dir = tempfile::tempdir().unwrap();
        for point in ["2", "10"] {
            std::fs::create_dir(dir.path().join(point)).unwrap();
        }
        std::fs::write(dir.path().join("2").join("SPE0001.csv"), EXPORT).unwrap();
        std::fs::write(dir.path().join("2").join("readme.md"), "ignored").unwrap();
        std::fs::write(
            dir.path().join("10").join("Access Points.txt"),
            "SSID|BSSID|Strength\nguest|aa|-70\n",
        )
        .unwrap();

        let site = load_site(dir.path(), "Building X").unwrap();
        assert_eq!(site.len(), 2);
        assert_eq!(site.points[0].reference, "2");
        assert_eq!(site.points[0].trace_count(), 2);
        assert_eq!(site.points[0].snapshots[0].reference, "SPE0001.csv");
        assert!(site.points[1].snapshots.is_empty());
        assert_eq!(site.points[1].networks.len(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_spares_other_points() {
        let dir = tempfile::tempdir().unwrap();
        for point in ["1", "2"] {
            std::fs::create_dir(dir.path().join(point)).unwrap();
            std::fs::write(
                dir.path().join(point).join("Access Points.txt"),
                "SSID|BSSID|Strength\nguest|aa|-70\n",
            )
            .unwrap();
        }
        std::fs::write(dir.path().join("1").join("SPE0001.csv"), EXPORT).unwrap();
        let truncated = format!("{EXPORT}919150000,\n");
        std::fs::write(dir.path().join("2").join("SPE0001.csv"), truncated).unwrap();
        std::fs::write(dir.path().join("2").join("SPE0002.csv"), EXPORT).unwrap();

        let site = load_site(dir.path(), "Building X").unwrap();
        assert_eq!(site.len(), 2);
        assert_eq!(site.points[0].trace_count(), 2);
        let damaged = &site.points[1];
        assert_eq!(damaged.snapshots.len(), 1);
        assert_eq!(damaged.snapshots[0].reference, "SPE0002.csv");
        assert_eq!(damaged.networks.len(), 1);
    }
}
