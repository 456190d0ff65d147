//! Data layer: spot records, table parsing, and z-expansion.
//!
//! Architecture:
//! ```text
//!  <key>.qcpass.csv / <key>.qcfail.csv
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  read file, sniff schema
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  parser   │  headed / headless rows → PointRecord
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  expand   │  one record → one point per z-slice
//!   └──────────┘
//! ```

pub mod expand;
pub mod loader;
pub mod model;
pub mod parser;
