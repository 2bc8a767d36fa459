/// Data layer: survey types, loading, and the eligibility gate.
///
/// Architecture:
/// ```text
///  results/<point>/SPE0001.csv, results/<point>/*Access Points*
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse folders/files → Site
///   └──────────┘
///        │
///        ▼
///   ┌──────────────────────────────┐
///   │ Site → Point → Snapshot → Trace│  parameters + raw records
///   └──────────────────────────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  Max Hold + known sweep centre → eligible traces
///   └──────────┘
/// ```

pub mod filter;
pub mod loader;
pub mod model;
