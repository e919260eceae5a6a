//! Persistence layer — gateway, remote store, and local cache behind
//! trait seams, mediated by [`ProfileStore`].

pub mod libsql_cache;
pub mod memory;
pub mod profile_store;
pub mod remote_http;
pub mod traits;

pub use libsql_cache::LibSqlCache;
pub use memory::{MemoryCache, MemoryGateway, MemoryRecordStore};
pub use profile_store::ProfileStore;
pub use remote_http::{HttpGateway, HttpRecordStore};
pub use traits::{AuthGateway, Identity, ProfileCache, RecordStore};
