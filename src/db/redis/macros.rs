/// Read-through caching for async lookups.
///
/// Returns the cached value for `$key` if present; otherwise awaits `$block`,
/// queues the result for caching with a TTL of `$ttl` seconds and returns it.
/// Cache and lookup errors are propagated with `?`, so the enclosing function
/// must return `AppResult`.
///
/// ```rust,ignore
/// async fn genres(&self) -> AppResult<Vec<Genre>> {
///     cached!(self.cache, CacheKey::Genres, GENRES_TTL, async {
///         self.fetch_genres().await
///     })
/// }
/// ```
#[macro_export]
macro_rules! cached {
    ($cache:expr, $key:expr, $ttl:expr, $block:expr) => {{
        let key = $key;
        match $cache.get_from_cache(&key).await? {
            Some(hit) => {
                tracing::debug!(key = %key, "Cache hit");
                Ok(hit)
            }
            None => {
                let value = $block.await?;
                $cache.set_in_background(&key, &value, $ttl);
                Ok(value)
            }
        }
    }};
}
