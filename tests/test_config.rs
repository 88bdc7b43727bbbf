use strato_rest::config::*;
use strato_rest::transactions::TxParams;
use strato_rest::{Error, Options};

const YAML: &str = r#"
apiDebug: true
timeout: 600000
VM: SolidVM
txParams:
  gasLimit: 100000
nodes:
  - id: 0
    url: "http://localhost:8080/bloc/v2.2"
    oauth:
      openIdDiscoveryUrl: "https://keycloak.example/.well-known/openid-configuration"
      clientId: dapp
      clientSecret: secret
  - id: 1
    url: "http://localhost:8081/bloc/v2.2"
"#;

#[test]
fn test_yaml_config() {
    let config = Config::from_yaml_str(YAML).unwrap();
    assert!(config.api_debug);
    assert_eq!(config.timeout_ms(), 600_000);
    assert_eq!(config.vm.as_deref(), Some("SolidVM"));
    assert_eq!(
        config.tx_params,
        Some(TxParams {
            gas_limit: Some(100_000),
            ..TxParams::default()
        })
    );
    assert_eq!(config.nodes.len(), 2);
    let oauth = config.nodes[0].oauth.as_ref().unwrap();
    assert_eq!(oauth.client_id.as_deref(), Some("dapp"));
    assert_eq!(oauth.token_field, None);
    assert!(config.nodes[1].oauth.is_none());

    let options = Options::new(config).with_node(1);
    assert_eq!(
        options.node_url().unwrap().as_str(),
        "http://localhost:8081/bloc/v2.2"
    );
}

#[test]
fn test_json_config_and_defaults() {
    let config = Config::from_json_str(r#"{"nodes": [{"url": "http://node:8080"}]}"#).unwrap();
    assert!(!config.api_debug);
    assert_eq!(config.timeout_ms(), DEFAULT_TIMEOUT_MS);
    assert_eq!(config.nodes[0].id, None);
    assert_eq!(config.vm, None);
}

#[test]
fn test_invalid_url_is_rejected() {
    let err = Config::from_yaml_str("nodes:\n  - url: not a url\n").unwrap_err();
    assert!(matches!(err, Error::Config(_)));
}

#[test]
fn test_load_picks_format_by_extension() {
    let dir = std::env::temp_dir().join(format!("strato-rest-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    let yaml_path = dir.join("config.yaml");
    std::fs::write(&yaml_path, YAML).unwrap();
    assert_eq!(Config::load(&yaml_path).unwrap().nodes.len(), 2);

    let json_path = dir.join("config.json");
    std::fs::write(&json_path, r#"{"timeout": 1500, "nodes": []}"#).unwrap();
    assert_eq!(Config::load(&json_path).unwrap().timeout_ms(), 1500);

    assert!(matches!(
        Config::load(dir.join("missing.yaml")),
        Err(Error::Io(_))
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn test_builders() {
    let config = Config::default()
        .with_node("http://a:1".parse().unwrap())
        .with_node("http://b:2".parse().unwrap())
        .with_timeout(5000);
    assert_eq!(config.nodes[1].id, Some(1));
    assert_eq!(config.timeout_ms(), 5000);
    assert!(matches!(
        Options::new(config).with_node(2).node_url(),
        Err(Error::NodeLookup { index: 2, count: 2 })
    ));
}
