//! Static reference data: regions and the solar systems they contain.
//!
//! Reference data is read-only from the mirror's point of view. It is expected
//! to be complete; a kill in an unknown system is an error, not a gap.

use std::future::Future;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolarSystem {
  pub solar_system_id: i64,
  pub name:            String,
  pub region_id:       i64,
}

/// Lookups against a static data export.
pub trait ReferenceData: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every region id, ascending.
  fn region_ids(&self) -> impl Future<Output = Result<Vec<i64>, Self::Error>> + Send + '_;

  /// Name and owning region of a solar system. `None` if unknown.
  fn solar_system(
    &self,
    solar_system_id: i64,
  ) -> impl Future<Output = Result<Option<SolarSystem>, Self::Error>> + Send + '_;

  /// Name of a region. `None` if unknown.
  fn region_name(
    &self,
    region_id: i64,
  ) -> impl Future<Output = Result<Option<String>, Self::Error>> + Send + '_;
}
