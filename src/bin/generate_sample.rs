//! Writes a synthetic survey folder (`sample_results/`) for trying the
//! analyzer end to end.

use std::fs;
use std::path::Path;

/// A carrier as it appears in a max-hold sweep.
enum Emitter {
    /// Flat-topped LTE channel: centre MHz, bandwidth MHz, level dBm.
    Lte(f64, f64, f64),
    /// Narrow GSM carrier: centre MHz, level dBm.
    Gsm(f64, f64),
}

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

fn generate_sweep(
    start_hz: u64,
    step_hz: u64,
    count: usize,
    emitters: &[Emitter],
    floor_dbm: f64,
    noise: &mut Noise,
) -> Vec<(u64, f64)> {
    (0..count)
        .map(|i| {
            let f = start_hz + i as u64 * step_hz;
            let mhz = f as f64 / 1e6;
            let mut level = floor_dbm + noise.jitter(0.5);
            for emitter in emitters {
                let candidate = match *emitter {
                    Emitter::Lte(center, bw, dbm) if (mhz - center).abs() <= bw / 2.0 => {
                        dbm + noise.jitter(0.8)
                    }
                    Emitter::Gsm(center, dbm) => {
                        floor_dbm + gaussian(mhz, center, 0.06, dbm - floor_dbm)
                    }
                    _ => continue,
                };
                level = level.max(candidate);
            }
            (f, level)
        })
        .collect()
}

/// Seeded receiver noise: splitmix64 uniforms fed through Box-Muller.
struct Noise(u64);

impl Noise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        ((z ^ (z >> 31)) >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Zero-mean jitter in dB.
    fn jitter(&mut self, std_dev_db: f64) -> f64 {
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        std_dev_db * (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos()
    }
}

/// Write a two-trace export: a max-hold trace and a clear-write trace of the
/// same span.
fn write_export(
    path: &Path,
    center_hz: u64,
    span_hz: u64,
    max_hold: &[(u64, f64)],
    clear_write: &[(u64, f64)],
) {
    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(path)
        .expect("Failed to create export");

    let header = |title: &str, a: String, b: String, unit: &str| {
        vec![
            title.to_string(),
            a,
            unit.to_string(),
            String::new(),
            title.to_string(),
            b,
            unit.to_string(),
        ]
    };
    let rows = vec![
        header("Type", "Sweep 1".into(), "Sweep 2".into(), ""),
        header("Trace Mode", "Max Hold".into(), "Clear Write".into(), ""),
        header("Center Frequency", center_hz.to_string(), center_hz.to_string(), "Hz"),
        header("Span", span_hz.to_string(), span_hz.to_string(), "Hz"),
        header("Data", String::new(), String::new(), ""),
        vec![
            "Frequency [Hz]".into(),
            "Amplitude [dBm]".into(),
            String::new(),
            String::new(),
            "Frequency [Hz]".into(),
            "Amplitude [dBm]".into(),
        ],
    ];
    for row in rows {
        writer.write_record(&row).expect("Failed to write header");
    }
    for (a, b) in max_hold.iter().zip(clear_write) {
        writer
            .write_record([
                a.0.to_string(),
                format!("{:.2}", a.1),
                String::new(),
                String::new(),
                b.0.to_string(),
                format!("{:.2}", b.1),
            ])
            .expect("Failed to write record");
    }
    writer.flush().expect("Failed to flush export");
}

fn main() {
    let mut noise = Noise(42);
    let root = Path::new("sample_results");

    const SPAN: u64 = 40_000_000;
    const COUNT: usize = 800;
    let step = SPAN / COUNT as u64;

    // (centre Hz, emitters) per band, per point
    let points: Vec<(&str, Vec<(u64, Vec<Emitter>)>)> = vec![
        (
            "1",
            vec![
                (
                    939_000_000,
                    vec![
                        Emitter::Lte(940.0, 10.0, -62.0),
                        Emitter::Gsm(950.2, -58.0),
                        Emitter::Gsm(927.4, -66.0),
                    ],
                ),
                (
                    1_842_500_000,
                    vec![Emitter::Lte(1845.0, 20.0, -70.0), Emitter::Gsm(1826.4, -61.0)],
                ),
            ],
        ),
        (
            "2",
            vec![(
                939_000_000,
                vec![Emitter::Lte(930.0, 10.0, -75.0), Emitter::Gsm(941.6, -64.0)],
            )],
        ),
        ("3", vec![(1_842_500_000, vec![Emitter::Gsm(1858.6, -72.0)])]),
    ];

    for (idx, (name, bands)) in points.iter().enumerate() {
        let dir = root.join(name);
        fs::create_dir_all(&dir).expect("Failed to create point folder");

        for (n, (center, emitters)) in bands.iter().enumerate() {
            let start = center - SPAN / 2;
            let max_hold = generate_sweep(start, step, COUNT, emitters, -97.0, &mut noise);
            let clear_write = generate_sweep(start, step, COUNT, emitters, -101.0, &mut noise);
            let path = dir.join(format!("SPE{:04}.csv", n + 1));
            write_export(&path, *center, SPAN, &max_hold, &clear_write);
        }

        let access_points = format!(
            "SSID|BSSID|Strength|Center Channel|Width (Range)\n\
             guest|aa:bb:cc:00:00:01|-{}|36|80\n\
             office|aa:bb:cc:00:00:02|-{}|6|20\n",
            55 + idx * 7,
            48 + idx * 3,
        );
        fs::write(dir.join("Access Points.txt"), access_points)
            .expect("Failed to write access points");
    }

    println!(
        "Wrote {} points ({COUNT} records per trace) to {}",
        points.len(),
        root.display()
    );
}
