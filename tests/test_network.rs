#[cfg(feature = "http")]
#[cfg(test)]
mod test_network {
    use httpmock::prelude::*;
    use serde_json::json;
    use std::time::Duration;
    use strato_rest::chain::ChainInput;
    use strato_rest::debug::Breakpoint;
    use strato_rest::transactions::TxStatus;
    use strato_rest::{
        Address, CallArgs, Config, ContractDefinition, ContractRef, Error, Options, Outcome,
        StratoClient, TransferPayload, User,
    };

    const PREFIX: &str = "/bloc/v2.2";
    const ADDRESS: &str = "7567d83b7b8d80addcb281a71d54fc7b3364ffed";
    const OTHER: &str = "12e3582d7ca22234f39d2a7be12c98ea9c077e25";

    fn config_for(server: &MockServer) -> Config {
        Config::default().with_node(format!("{}{PREFIX}", server.base_url()).parse().unwrap())
    }

    fn options_for(server: &MockServer) -> Options {
        Options::new(config_for(server))
    }

    fn path(suffix: &str) -> String {
        format!("{PREFIX}{suffix}")
    }

    fn user() -> User {
        User::new("token")
    }

    fn counter_ref() -> ContractRef {
        ContractRef {
            name: "Counter".to_string(),
            address: ADDRESS.parse().unwrap(),
            chain_id: None,
        }
    }

    #[tokio::test]
    async fn test_create_user() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/users/alice"))
                    .query_param("resolve", "true")
                    .header("content-type", "application/x-www-form-urlencoded")
                    .body("password=s3cret");
                then.status(200).json_body(json!(ADDRESS));
            })
            .await;

        let address = StratoClient::new()
            .create_user("alice", "s3cret", &options_for(&server))
            .await
            .unwrap();
        assert_eq!(address, ADDRESS.parse::<Address>().unwrap());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_http_error_carries_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(path("/users/alice"));
                then.status(409).json_body(json!({"error": "user exists"}));
            })
            .await;

        let err = StratoClient::new()
            .create_user("alice", "s3cret", &options_for(&server))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(409));
        match err {
            Error::Http {
                status,
                status_text,
                data,
            } => {
                assert_eq!(status, 409);
                assert_eq!(status_text, "Conflict");
                assert_eq!(data, json!({"error": "user exists"}));
            }
            other => panic!("Unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_key_requests_are_authenticated() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(path("/key"))
                    .header("Authorization", "Bearer token");
                then.status(200).json_body(json!({"address": ADDRESS}));
            })
            .await;

        let address = StratoClient::new()
            .get_key(&user(), &options_for(&server))
            .await
            .unwrap();
        assert_eq!(address.to_string(), ADDRESS);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_fill_requires_username_and_address() {
        let options = Options::new(Config::default().with_node("http://127.0.0.1:1".parse().unwrap()));
        let err = StratoClient::new()
            .fill(&user(), &options)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest { .. }));
    }

    #[tokio::test]
    async fn test_create_contract_resolves_pending_result() {
        let server = MockServer::start_async().await;
        let submit = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/transaction"))
                    .query_param("resolve", "true")
                    .header("Authorization", "Bearer token")
                    .body_contains(r#""type":"CONTRACT""#)
                    .body_contains(r#""history":"Counter""#);
                then.status(200)
                    .json_body(json!([{"hash": "h1", "status": "Pending"}]));
            })
            .await;
        let results = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/transactions/results"))
                    .json_body(json!(["h1"]));
                then.status(200).json_body(json!([{
                    "hash": "h1",
                    "status": "Success",
                    "data": {"tag": "Upload", "contents": {"address": ADDRESS}},
                }]));
            })
            .await;

        let contract = ContractDefinition::new("Counter", "contract Counter {}");
        let created = StratoClient::new()
            .create_contract(&user(), &contract, &options_for(&server).enable_history())
            .await
            .unwrap();
        assert_eq!(created, Outcome::Done(counter_ref()));
        submit.assert_async().await;
        results.assert_async().await;
    }

    #[tokio::test]
    async fn test_async_call_returns_pending_result() {
        let server = MockServer::start_async().await;
        let submit = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/transaction"))
                    .query_param("resolve", "false");
                then.status(200)
                    .json_body(json!([{"hash": "h1", "status": "Pending"}]));
            })
            .await;
        let results = server
            .mock_async(|when, then| {
                when.method(POST).path(path("/transactions/results"));
                then.status(200)
                    .json_body(json!([{"hash": "h1", "status": "Pending"}]));
            })
            .await;

        let outcome = StratoClient::new()
            .call(
                &user(),
                &CallArgs::new(counter_ref(), "get"),
                &options_for(&server).asynchronous(),
            )
            .await
            .unwrap();
        assert!(outcome.is_pending());
        assert_eq!(outcome.pending().unwrap().hash, "h1");
        submit.assert_async().await;
        results.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_async_send_does_not_poll() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/transaction"))
                    .query_param("resolve", "false");
                then.status(200)
                    .json_body(json!([{"hash": "h1", "status": "Pending"}]));
            })
            .await;
        let results = server
            .mock_async(|when, then| {
                when.method(POST).path(path("/transactions/results"));
                then.status(200)
                    .json_body(json!([{"hash": "h1", "status": "Pending"}]));
            })
            .await;

        let options = Options::new(config_for(&server).with_timeout(1200)).asynchronous();
        let transfer = TransferPayload::new(OTHER.parse().unwrap(), 10u32);
        let result = StratoClient::new()
            .send(&user(), &transfer, &options)
            .await
            .unwrap();
        assert!(result.is_pending());
        assert_eq!(result.hash, "h1");
        results.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn test_async_upload_already_final() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/transaction"))
                    .query_param("resolve", "false");
                then.status(200).json_body(json!([{
                    "hash": "h1",
                    "status": "Success",
                    "data": {"tag": "Upload", "contents": {"address": ADDRESS}},
                }]));
            })
            .await;

        let contract = ContractDefinition::new("Counter", "contract Counter {}");
        let created = StratoClient::new()
            .create_contract(&user(), &contract, &options_for(&server).asynchronous())
            .await
            .unwrap();
        assert_eq!(created.into_done(), Some(counter_ref()));
    }

    #[tokio::test]
    async fn test_batch_results_keep_submission_order() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(path("/transaction"));
                then.status(200).json_body(json!([
                    {"hash": "h1", "status": "Pending"},
                    {"hash": "h2", "status": "Pending"},
                    {"hash": "h3", "status": "Pending"},
                ]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/transactions/results"))
                    .json_body(json!(["h1", "h2", "h3"]));
                then.status(200).json_body(json!([
                    {"hash": "h3", "status": "Success", "data": {"tag": "Call", "contents": [3]}},
                    {"hash": "h1", "status": "Success", "data": {"tag": "Call", "contents": [1]}},
                    {"hash": "h2", "status": "Success", "data": {"tag": "Call", "contents": [2]}},
                ]));
            })
            .await;

        let calls: Vec<CallArgs> = ["a", "b", "c"]
            .into_iter()
            .map(|method| CallArgs::new(counter_ref(), method))
            .collect();
        let outputs = StratoClient::new()
            .call_list(&user(), &calls, &options_for(&server))
            .await
            .unwrap();
        assert_eq!(
            outputs,
            vec![
                Outcome::Done(json!([1])),
                Outcome::Done(json!([2])),
                Outcome::Done(json!([3])),
            ]
        );
    }

    #[tokio::test]
    async fn test_detailed_call_returns_full_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(path("/transaction"));
                then.status(200).json_body(json!([{
                    "hash": "h1",
                    "status": "Success",
                    "data": {"tag": "Call", "contents": [7]},
                }]));
            })
            .await;

        let output = StratoClient::new()
            .call(
                &user(),
                &CallArgs::new(counter_ref(), "get"),
                &options_for(&server).detailed(),
            )
            .await
            .unwrap()
            .into_done()
            .unwrap();
        assert_eq!(output["hash"], "h1");
        assert_eq!(output["data"]["contents"], json!([7]));
    }

    #[tokio::test]
    async fn test_failed_transaction_is_reported() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(path("/transaction"));
                then.status(200).json_body(json!([{
                    "hash": "h1",
                    "status": "Failure",
                    "txResult": {"message": "revert: not owner"},
                }]));
            })
            .await;

        let err = StratoClient::new()
            .call(&user(), &CallArgs::new(counter_ref(), "kill"), &options_for(&server))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(400));
        match err {
            Error::TransactionFailed { hash, message, .. } => {
                assert_eq!(hash, "h1");
                assert_eq!(message, "revert: not owner");
            }
            other => panic!("Unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_pending_result_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(path("/transaction"));
                then.status(200)
                    .json_body(json!([{"hash": "h1", "status": "Pending"}]));
            })
            .await;
        let results = server
            .mock_async(|when, then| {
                when.method(POST).path(path("/transactions/results"));
                then.status(200)
                    .json_body(json!([{"hash": "h1", "status": "Pending"}]));
            })
            .await;

        let options = Options::new(config_for(&server).with_timeout(1200));
        let transfer = TransferPayload::new(OTHER.parse().unwrap(), 10u32);
        let err = StratoClient::new()
            .send(&user(), &transfer, &options)
            .await
            .unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "until: timeout 1200 ms exceeded");
        // Slept 500, 510 and 520 ms.
        results.assert_hits_async(3).await;
    }

    #[tokio::test]
    async fn test_cached_nonce_uses_parallel_endpoint() {
        let server = MockServer::start_async().await;
        let parallel = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/transaction/parallel"))
                    .body_contains(r#""type":"TRANSFER""#);
                then.status(200).json_body(json!([{"hash": "h1", "status": "Success"}]));
            })
            .await;

        let transfer = TransferPayload::new(OTHER.parse().unwrap(), 10u32);
        let result = StratoClient::new()
            .send(&user(), &transfer, &options_for(&server).cache_nonce())
            .await
            .unwrap();
        assert_eq!(result.status, TxStatus::Success);
        parallel.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_array_reads_pages() {
        let server = MockServer::start_async().await;
        let state_path = path(&format!("/contracts/Counter/{ADDRESS}/state"));
        let length = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(state_path.clone())
                    .query_param("name", "items")
                    .query_param("length", "true");
                then.status(200).json_body(json!({"items": 150}));
            })
            .await;
        let first = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(state_path.clone())
                    .query_param("offset", "0")
                    .query_param("count", "100");
                then.status(200)
                    .json_body(json!({"items": (0..100).collect::<Vec<u32>>()}));
            })
            .await;
        let second = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(state_path.clone())
                    .query_param("offset", "100")
                    .query_param("count", "50");
                then.status(200)
                    .json_body(json!({"items": (100..150).collect::<Vec<u32>>()}));
            })
            .await;

        let items = StratoClient::new()
            .get_array(&user(), &counter_ref(), "items", &options_for(&server))
            .await
            .unwrap();
        assert_eq!(items.len(), 150);
        assert_eq!(items[0], json!(0));
        assert_eq!(items[149], json!(149));
        length.assert_async().await;
        first.assert_async().await;
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_with_chain_filter() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(path("/cirrus/search/Counter"))
                    .query_param("owner", "eq.abc")
                    .query_param("chainId", "in.(c1,c2)");
                then.status(200).json_body(json!([{"address": ADDRESS}]));
            })
            .await;

        let options = options_for(&server)
            .with_query("owner", "eq.abc")
            .with_chain_id("c1")
            .with_chain_id("c2");
        let rows = StratoClient::new()
            .search(&user(), "Counter", &options)
            .await
            .unwrap();
        assert_eq!(rows, vec![json!({"address": ADDRESS})]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_search_with_content_range() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(path("/cirrus/search/Counter"))
                    .header("Prefer", "count=exact")
                    .header("Range-Unit", "items");
                then.status(206)
                    .header("content-range", "0-1/42")
                    .json_body(json!([{"n": 1}, {"n": 2}]));
            })
            .await;

        let page = StratoClient::new()
            .search_with_content_range(&user(), "Counter", &options_for(&server))
            .await
            .unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.content_range.start, Some(0));
        assert_eq!(page.content_range.end, Some(1));
        assert_eq!(page.content_range.count, Some(42));
    }

    #[tokio::test]
    async fn test_search_until_returns_first_accepted_rows() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path(path("/cirrus/search/Counter"));
                then.status(200).json_body(json!([{"address": ADDRESS}]));
            })
            .await;

        let rows = StratoClient::new()
            .search_until(
                &user(),
                "Counter",
                |rows: &Vec<serde_json::Value>| !rows.is_empty(),
                &options_for(&server),
            )
            .await
            .unwrap();
        assert_eq!(rows.len(), 1);
    }

    #[tokio::test]
    async fn test_search_until_retries_until_indexed() {
        let server = MockServer::start_async().await;
        let mut empty = server
            .mock_async(|when, then| {
                when.method(GET).path(path("/cirrus/search/Counter"));
                then.status(200).json_body(json!([]));
            })
            .await;

        let client = StratoClient::new();
        let user = user();
        let options = options_for(&server);
        let search = client.search_until(
            &user,
            "Counter",
            |rows: &Vec<serde_json::Value>| !rows.is_empty(),
            &options,
        );
        // Swap the empty answer for an indexed row once the first search
        // went through; the next attempt comes 500 ms later.
        let index = async {
            while empty.hits_async().await == 0 {
                tokio::time::sleep(Duration::from_millis(20)).await;
            }
            let empty_hits = empty.hits_async().await;
            empty.delete_async().await;
            let indexed = server
                .mock_async(|when, then| {
                    when.method(GET).path(path("/cirrus/search/Counter"));
                    then.status(200).json_body(json!([{"address": ADDRESS}]));
                })
                .await;
            (empty_hits, indexed)
        };
        let (rows, (empty_hits, indexed)) = tokio::join!(search, index);

        assert_eq!(rows.unwrap(), vec![json!({"address": ADDRESS})]);
        assert!(empty_hits >= 1);
        assert!(empty_hits + indexed.hits_async().await >= 2);
    }

    #[tokio::test]
    async fn test_get_chain() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path(path("/chain"))
                    .query_param("chainid", "c1");
                then.status(200)
                    .json_body(json!([{"id": "c1", "info": {"label": "test"}}]));
            })
            .await;

        let chain = StratoClient::new()
            .get_chain(&user(), "c1", &options_for(&server))
            .await
            .unwrap();
        assert_eq!(chain["id"], "c1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_chain() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(path("/chain"))
                    .body_contains(r#""label":"test""#)
                    .body_contains(r#""contract":"Governance""#);
                then.status(200).json_body(json!("c1"));
            })
            .await;

        let chain = ChainInput {
            label: "test".to_string(),
            ..ChainInput::default()
        };
        let governance = ContractDefinition::new("Governance", "contract Governance {}");
        let chain_id = StratoClient::new()
            .create_chain(&user(), &chain, &governance, &options_for(&server))
            .await
            .unwrap();
        assert_eq!(chain_id, "c1");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_debugger_breakpoints() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(PUT)
                    .path(path("/vm-debug/breakpoints"))
                    .json_body(json!([{"name": "Counter.sol", "line": 3}]));
                then.status(200).json_body(json!({}));
            })
            .await;

        StratoClient::new()
            .debug_add_breakpoints(
                &user(),
                &[Breakpoint::new("Counter.sol", 3)],
                &options_for(&server),
            )
            .await
            .unwrap();
        mock.assert_async().await;
    }
}
