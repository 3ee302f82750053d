//! Unit tests for GifSelector

#[cfg(test)]
mod tests {
    use crate::config::MediaConfig;
    use crate::errors::GifLookupError;
    use crate::gif::GifSelector;
    use reqwest::Client as HttpClient;

    fn fallback_urls() -> Vec<String> {
        MediaConfig::default().fallback_gifs
    }

    fn selector_for(server: &httpmock::MockServer) -> GifSelector {
        let config = MediaConfig {
            tenor_api_key: Some("tenor-key".to_string()),
            tenor_base_url: format!("{}/v2/search", server.base_url()),
            ..MediaConfig::default()
        };
        GifSelector::new(HttpClient::new(), &config)
    }

    #[tokio::test]
    async fn test_no_credential_uses_fallback_list() {
        let selector = GifSelector::new(HttpClient::new(), &MediaConfig::default());
        assert!(!selector.has_backend());
        assert_eq!(fallback_urls().len(), 3);
        for _ in 0..20 {
            let url = selector.select("savage roast gif").await.unwrap();
            assert!(fallback_urls().contains(&url));
        }
    }

    #[tokio::test]
    async fn test_blank_credential_counts_as_missing() {
        let config = MediaConfig {
            tenor_api_key: Some("  ".to_string()),
            ..MediaConfig::default()
        };
        let selector = GifSelector::new(HttpClient::new(), &config);
        assert!(!selector.has_backend());
    }

    #[tokio::test]
    async fn test_search_sends_expected_params() {
        let server = httpmock::MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET)
                    .path("/v2/search")
                    .query_param("q", "savage burn gif")
                    .query_param("key", "tenor-key")
                    .query_param("limit", "10")
                    .query_param("media_filter", "gif");
                then.status(200).json_body(serde_json::json!({
                    "results": [
                        {"media_formats": {"gif": {"url": "https://media.tenor.com/burn.gif"}}}
                    ]
                }));
            })
            .await;

        let url = selector_for(&server).select("savage burn gif").await;
        assert_eq!(url.as_deref(), Some("https://media.tenor.com/burn.gif"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_picks_among_results() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/v2/search");
                then.status(200).json_body(serde_json::json!({
                    "results": [
                        {"media_formats": {"gif": {"url": "https://media.tenor.com/a.gif"}}},
                        {"media_formats": {"gif": {"url": "https://media.tenor.com/b.gif"}}}
                    ]
                }));
            })
            .await;

        let selector = selector_for(&server);
        for _ in 0..10 {
            let url = selector.select("party").await.unwrap();
            assert!(url == "https://media.tenor.com/a.gif" || url == "https://media.tenor.com/b.gif");
        }
    }

    #[tokio::test]
    async fn test_empty_results_fall_back() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/v2/search");
                then.status(200).json_body(serde_json::json!({"results": []}));
            })
            .await;

        let url = selector_for(&server).select("nothing").await.unwrap();
        assert!(fallback_urls().contains(&url));
    }

    #[tokio::test]
    async fn test_error_status_falls_back() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/v2/search");
                then.status(500).body("boom");
            })
            .await;

        let url = selector_for(&server).select("anything").await.unwrap();
        assert!(fallback_urls().contains(&url));
    }

    #[tokio::test]
    async fn test_malformed_body_falls_back() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/v2/search");
                then.status(200).body("not json at all");
            })
            .await;

        let url = selector_for(&server).select("anything").await.unwrap();
        assert!(fallback_urls().contains(&url));
    }

    #[tokio::test]
    async fn test_result_without_gif_format_falls_back() {
        let server = httpmock::MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(httpmock::Method::GET).path("/v2/search");
                then.status(200).json_body(serde_json::json!({
                    "results": [{"media_formats": {"mp4": {"url": "https://media.tenor.com/x.mp4"}}}]
                }));
            })
            .await;

        let url = selector_for(&server).select("anything").await.unwrap();
        assert!(fallback_urls().contains(&url));
    }

    #[tokio::test]
    async fn test_unreachable_service_falls_back() {
        let config = MediaConfig {
            tenor_api_key: Some("tenor-key".to_string()),
            tenor_base_url: "http://127.0.0.1:9/v2/search".to_string(),
            ..MediaConfig::default()
        };
        let selector = GifSelector::new(HttpClient::new(), &config);
        let url = selector.select("anything").await.unwrap();
        assert!(fallback_urls().contains(&url));
    }

    #[tokio::test]
    async fn test_transport_error_does_not_leak_key() {
        let config = MediaConfig {
            tenor_api_key: Some("SUPERSECRET".to_string()),
            tenor_base_url: "http://127.0.0.1:9/v2/search".to_string(),
            ..MediaConfig::default()
        };
        let selector = GifSelector::new(HttpClient::new(), &config);
        let err = selector.search("x").await.unwrap_err();
        assert!(matches!(err, GifLookupError::Http(_)));
        assert!(!err.to_string().contains("SUPERSECRET"));
    }

    #[tokio::test]
    async fn test_empty_fallback_list_yields_none() {
        let config = MediaConfig {
            fallback_gifs: vec![],
            ..MediaConfig::default()
        };
        let selector = GifSelector::new(HttpClient::new(), &config);
        assert!(selector.select("anything").await.is_none());
    }
}
