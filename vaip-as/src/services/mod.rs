//! Service modules for the airport service
//!
//! Airport resolution (AirportDB + local fallback + TTL cache) and the
//! live network status feeds shown next to the map.

pub mod airportdb_client;
pub mod fallback;
pub mod ivao_client;
pub mod live_cache;
pub mod normalizer;
pub mod openaip_client;
pub mod record_cache;
pub mod resolver;

pub use airportdb_client::{AirportDbClient, AirportSource, SourceError};
pub use fallback::FallbackTable;
pub use ivao_client::{AtcClient, ControllerStatus, IvaoClient, IvaoService, Whazzup, WhazzupSource};
pub use live_cache::{LiveFeedError, StaleOnErrorCache};
pub use normalizer::{normalize, RawAirport, RawAirportInput, RawSource};
pub use openaip_client::{Airspace, AirspaceService, AirspaceSource, OpenAipClient};
pub use record_cache::{AirportCache, CacheStats, TtlCache};
pub use resolver::{AirportResolver, BatchSettings};
