use moka::future::Cache;
use std::time::Duration;

/// Remembers registered emails so repeated sign-ups can be refused without a
/// store round-trip. Only positive entries are kept; a miss means "ask the store".
#[derive(Clone)]
pub struct EmailCache {
    taken: Cache<String, ()>,
}

impl EmailCache {
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            taken: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    pub async fn mark_taken(&self, email: &str) {
        self.taken.insert(email.to_lowercase(), ()).await;
    }

    pub fn is_taken(&self, email: &str) -> bool {
        self.taken.contains_key(&email.to_lowercase())
    }
}

impl Default for EmailCache {
    fn default() -> Self {
        Self::new(100_000, Duration::from_secs(86400)) // 24h TTL
    }
}
