pub mod file_cache;
pub mod http_source;

pub use file_cache::{FileTdsCache, EMPTY_TDS, TDS_CACHE_FILE_NAME};
pub use http_source::ReqwestTrackerDataSource;
