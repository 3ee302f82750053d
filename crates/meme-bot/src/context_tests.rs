//! Unit tests for ContextBuffer

#[cfg(test)]
mod tests {
    use crate::context::{ContextBuffer, MAX_CONTEXT_MESSAGES};
    use chrono::{Duration, TimeZone, Utc};
    use meme_types::ContextMessage;

    fn contents(buffer: &[meme_types::ContextMessage]) -> Vec<String> {
        buffer.iter().map(|m| m.content.clone()).collect()
    }

    #[tokio::test]
    async fn test_unknown_channel_is_empty() {
        let buf = ContextBuffer::new();
        assert!(buf.recent(1, 10).await.is_empty());
    }

    #[tokio::test]
    async fn test_record_keeps_author_and_order() {
        let buf = ContextBuffer::new();
        buf.record(1, "alice", "first").await;
        buf.record(1, "bob", "second").await;
        buf.record(1, "alice", "third").await;

        let recent = buf.recent(1, 10).await;
        assert_eq!(contents(&recent), vec!["first", "second", "third"]);
        assert_eq!(recent[1].author, "bob");
        assert!(recent[0].timestamp <= recent[2].timestamp);
    }

    #[tokio::test]
    async fn test_recent_returns_tail() {
        let buf = ContextBuffer::new();
        for i in 0..7u32 {
            buf.record(1, "u", &format!("msg {}", i)).await;
        }
        let recent = buf.recent(1, 5).await;
        assert_eq!(
            contents(&recent),
            vec!["msg 2", "msg 3", "msg 4", "msg 5", "msg 6"]
        );
    }

    #[tokio::test]
    async fn test_recent_never_exceeds_capacity() {
        let buf = ContextBuffer::new();
        for i in 0..25u32 {
            buf.record(1, "u", &format!("msg {}", i)).await;
            let recent = buf.recent(1, 50).await;
            assert!(recent.len() <= MAX_CONTEXT_MESSAGES);
            assert_eq!(recent.last().unwrap().content, format!("msg {}", i));
        }
        let recent = buf.recent(1, 50).await;
        assert_eq!(recent.len(), 10);
        assert_eq!(recent[0].content, "msg 15");
        assert_eq!(recent[9].content, "msg 24");
    }

    #[tokio::test]
    async fn test_eleventh_record_evicts_first() {
        let buf = ContextBuffer::new();
        for i in 0..11u32 {
            buf.record(1, "u", &format!("msg {}", i)).await;
        }
        let recent = buf.recent(1, 10).await;
        assert_eq!(recent.len(), 10);
        assert!(recent.iter().all(|m| m.content != "msg 0"));
        assert_eq!(recent[0].content, "msg 1");
    }

    #[tokio::test]
    async fn test_recent_zero_is_empty() {
        let buf = ContextBuffer::new();
        buf.record(1, "u", "hello").await;
        assert!(buf.recent(1, 0).await.is_empty());
    }

    #[tokio::test]
    async fn test_channels_are_independent() {
        let buf = ContextBuffer::new();
        buf.record(1, "u", "from one").await;
        buf.record(2, "u", "from two").await;

        assert_eq!(contents(&buf.recent(1, 10).await), vec!["from one"]);
        assert_eq!(contents(&buf.recent(2, 10).await), vec!["from two"]);
        assert_eq!(buf.active_channels().await, 2);
    }

    #[tokio::test]
    async fn test_clear_populated_channel() {
        let buf = ContextBuffer::new();
        buf.record(1, "u", "hello").await;
        assert!(buf.clear(1).await);
        assert!(buf.recent(1, 10).await.is_empty());
        assert_eq!(buf.active_channels().await, 0);
    }

    #[tokio::test]
    async fn test_clear_absent_channel_is_noop() {
        let buf = ContextBuffer::new();
        buf.record(2, "u", "keep me").await;
        assert!(!buf.clear(1).await);
        // Clearing twice is fine too
        assert!(!buf.clear(1).await);
        assert_eq!(buf.recent(2, 10).await.len(), 1);
    }

    #[tokio::test]
    async fn test_record_after_clear_starts_fresh() {
        let buf = ContextBuffer::new();
        buf.record(1, "u", "old").await;
        buf.clear(1).await;
        buf.record(1, "u", "new").await;
        assert_eq!(contents(&buf.recent(1, 10).await), vec!["new"]);
    }

    #[tokio::test]
    async fn test_custom_capacity() {
        let buf = ContextBuffer::with_capacity(3);
        for i in 0..5u32 {
            buf.record(1, "u", &format!("msg {}", i)).await;
        }
        assert_eq!(
            contents(&buf.recent(1, 10).await),
            vec!["msg 2", "msg 3", "msg 4"]
        );
    }

    #[tokio::test]
    async fn test_zero_capacity_raised_to_one() {
        let buf = ContextBuffer::with_capacity(0);
        assert_eq!(buf.capacity(), 1);
        buf.record(1, "u", "a").await;
        buf.record(1, "u", "b").await;
        assert_eq!(contents(&buf.recent(1, 10).await), vec!["b"]);
    }

    #[tokio::test]
    async fn test_recent_is_a_snapshot() {
        let buf = ContextBuffer::new();
        buf.record(1, "u", "before").await;
        let snapshot = buf.recent(1, 10).await;
        buf.record(1, "u", "after").await;
        assert_eq!(contents(&snapshot), vec!["before"]);
    }

    #[tokio::test]
    async fn test_insert_out_of_order_stays_chronological() {
        let buf = ContextBuffer::new();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();

        buf.insert(1, ContextMessage::new("bob", "second", t0 + Duration::milliseconds(5)))
            .await;
        buf.insert(1, ContextMessage::new("alice", "first", t0)).await;
        buf.insert(1, ContextMessage::new("carol", "third", t0 + Duration::seconds(1)))
            .await;

        let recent = buf.recent(1, 10).await;
        assert_eq!(contents(&recent), vec!["first", "second", "third"]);
        assert!(recent.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));
    }

    #[tokio::test]
    async fn test_insert_equal_timestamps_keep_arrival_order() {
        let buf = ContextBuffer::new();
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        buf.insert(1, ContextMessage::new("u", "a", t0)).await;
        buf.insert(1, ContextMessage::new("u", "b", t0)).await;
        assert_eq!(contents(&buf.recent(1, 10).await), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_late_stale_message_is_evicted_first() {
        let buf = ContextBuffer::with_capacity(2);
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        buf.insert(1, ContextMessage::new("u", "new1", t0 + Duration::seconds(1)))
            .await;
        buf.insert(1, ContextMessage::new("u", "new2", t0 + Duration::seconds(2)))
            .await;
        buf.insert(1, ContextMessage::new("u", "stale", t0)).await;
        assert_eq!(contents(&buf.recent(1, 10).await), vec!["new1", "new2"]);
    }
}
