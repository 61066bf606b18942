use redis::RedisResult;

#[derive(Clone)]
pub struct RedisClient {
    client: redis::Client,
}

impl RedisClient {
    pub async fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    /// Fixed-window counter: true while `key` has seen at most `limit` hits in the current window.
    ///
    /// The window starts with the first hit; later hits never extend it. Needs Redis 7
    /// for `EXPIRE ... NX`.
    pub async fn check_rate_limit(&self, key: &str, limit: i64, window_seconds: i64) -> RedisResult<bool> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (count,): (i64,) = redis::pipe()
            .atomic()
            .incr(key, 1)
            .add_command(open_window(key, window_seconds))
            .ignore()
            .query_async(&mut conn)
            .await?;

        Ok(count <= limit)
    }
}

/// Redis key for the per-client rate limit bucket.
pub fn rate_limit_key(client_ip: &str) -> String {
    format!("ratelimit:{}", client_ip)
}

/// Sets the window TTL only when the key has none yet.
fn open_window(key: &str, window_seconds: i64) -> redis::Cmd {
    let mut cmd = redis::cmd("EXPIRE");
    cmd.arg(key).arg(window_seconds).arg("NX");
    cmd
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rate_limit_key() {
        assert_eq!(rate_limit_key("10.0.0.7"), "ratelimit:10.0.0.7");
    }

    #[test]
    fn test_window_ttl_is_set_once() {
        let packed = open_window("ratelimit:10.0.0.7", 60).get_packed_command();
        let expected = b"*4\r\n$6\r\nEXPIRE\r\n$18\r\nratelimit:10.0.0.7\r\n$2\r\n60\r\n$2\r\nNX\r\n";
        assert_eq!(packed, expected.to_vec());
    }

    #[tokio::test]
    async fn test_invalid_url_is_rejected() {
        assert!(RedisClient::new("not-a-redis-url").await.is_err());
    }
}
