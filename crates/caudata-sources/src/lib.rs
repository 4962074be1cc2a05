//! Remote data sources: GBIF occurrence search and AWS terrain tiles.
//!
//! Both clients implement the ports from `caudata-core`, issue their requests
//! one after another through a [`Transport`], and can sit behind a
//! [`caudata_store::ResponseCache`].

pub mod error;
pub mod gbif;
pub mod terrain;
pub mod transport;

pub use error::{Result, SourceError};
pub use gbif::GbifClient;
pub use terrain::TerrainTileClient;
pub use transport::{HttpTransport, Transport};
