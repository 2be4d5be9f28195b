/// Data layer: core types, loading, classification, filtering, statistics.
///
/// Architecture:
/// ```text
///   uploaded .csv bytes
///        │
///        ▼
///   ┌──────────┐
///   │  loader   │  parse + per-column type inference → Dataset
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ classify  │  Numeric / Categorical / Skipped per column
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │  filter   │  apply widget predicates → filtered row indices
///   └──────────┘
///        │
///        ▼
///   ┌──────────┐
///   │ summary   │  describe / value counts over the filtered view
///   └──────────┘
/// ```

pub mod classify;
pub mod filter;
pub mod loader;
pub mod model;
pub mod summary;
