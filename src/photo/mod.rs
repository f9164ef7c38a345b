//! 写真の取得・キャッシュ

pub mod cache;
pub mod fetcher;

pub use cache::{CacheInfo, PhotoCache};
pub use fetcher::{FetchOptions, PhotoFetcher};
