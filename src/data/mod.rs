/// Data layer: file codecs, loading, and the figure inputs.
///
/// Architecture:
/// ```text
///  .mat                       .csv
///    │                          │
///    ▼                          │
///  ┌──────┐                     │
///  │ mat  │  Level-5 codec      │
///  └──────┘  → MatFile          │
///    │                          │
///    ▼                          ▼
///  ┌──────────────────────────────┐
///  │            loader            │
///  └──────────────────────────────┘
///    │                          │
///    ▼                          ▼
///  ModelResultBundle      TraversalTable
///    │ test_split()
///    ▼
///  TestSplit (targets, outputs)
/// ```

pub mod loader;
pub mod mat;
pub mod model;
