pub mod api_store;
pub mod caching;
pub mod util;
pub mod yahoo;
