/// Memoizes an async computation in a [`Cache`](crate::cache::Cache).
///
/// If the key is present and not expired, the cached value is returned.
/// Otherwise the block runs, and its value is stored for `$ttl` seconds
/// and returned. Errors from the block propagate with `?` and are not
/// cached, so a failed upstream call is retried on the next request.
///
/// # Arguments
/// * `$cache`: cache exposing `get_from_cache` and `insert`.
/// * `$key`: the [`CacheKey`](crate::cache::CacheKey) to look up.
/// * `$ttl`: time-to-live in seconds.
/// * `$block`: future computing the value on a miss.
///
/// # Example
/// ```rust,ignore
/// async fn popular(&self, key: CacheKey) -> AppResult<Vec<TmdbItem>> {
///     cached!(self.cache, key, CONTENT_CACHE_TTL, async move {
///         self.fetch_page(&url, &params).await
///     })
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        if let Some(cached) = $cache.get_from_cache(&$key)? {
            Ok(cached)
        } else {
            let value = $block.await?;
            $cache.insert(&$key, &value, $ttl);
            Ok(value)
        }
    }};
}
