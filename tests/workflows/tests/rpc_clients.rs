use std::time::Duration;

use axum::http::StatusCode;
use ledger_testing_core::{
    nodes::{Status, UserPass},
    rpc::{RpcError, RpcErrorKind, cb58},
};
use serde_json::{Value, json};
use tests_workflows::{Reply, StubNode};

const TIMEOUT: Duration = Duration::from_secs(2);

fn user() -> UserPass {
    UserPass::new("alice", "a-long-keystore-password")
}

#[tokio::test]
async fn create_address_returns_the_decoded_address() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.createAddress",
        Reply::result(json!({ "address": "X-123" })),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    let address = node.platform().create_address(&user()).await?;

    assert_eq!(address, "X-123");
    let requests = stub.requests();
    assert_eq!(requests.len(), 1);
    let request = &requests[0];
    assert_eq!(request.path, "/ext/P");
    assert_eq!(request.body["jsonrpc"], "2.0");
    assert_eq!(request.method(), Some("platform.createAddress"));
    assert_eq!(
        request.params(),
        &json!({ "username": "alice", "password": "a-long-keystore-password" })
    );
    assert!(request.body["id"].is_u64());
    Ok(())
}

#[tokio::test]
async fn server_error_objects_surface_verbatim() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.createAddress",
        Reply::error(-32000, "problem creating address: user not found"),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    let err = node.platform().create_address(&user()).await.unwrap_err();

    assert_eq!(err.kind(), RpcErrorKind::Application);
    assert_eq!(err.method(), "platform.createAddress");
    match err.rpc_error() {
        RpcError::Application { code, message, .. } => {
            assert_eq!(*code, -32000);
            assert_eq!(message, "problem creating address: user not found");
        }
        other => panic!("expected an application error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn error_object_wins_over_a_failing_status() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.getHeight",
        Reply::Error {
            code: -32603,
            message: "internal error".to_owned(),
            status: StatusCode::INTERNAL_SERVER_ERROR,
        },
    );
    let node = stub.client("node-0", TIMEOUT)?;

    let err = node.platform().get_height().await.unwrap_err();

    assert_eq!(err.kind(), RpcErrorKind::Application);
    assert_eq!(err.rpc_error().application_code(), Some(-32603));
    Ok(())
}

#[tokio::test]
async fn unset_subnet_selector_is_omitted_from_params() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.getCurrentValidators",
        Reply::result(json!({ "validators": [] })),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    node.platform().get_current_validators(None).await?;
    node.platform()
        .get_current_validators(Some("2bRCr6B4MiEfSjidDwxDpdCyviwnfUVqB2HGwhm947w9YYqb7r"))
        .await?;

    let requests = stub.requests_for("platform.getCurrentValidators");
    assert_eq!(requests[0].params(), &json!({}));
    assert_eq!(
        requests[1].params(),
        &json!({ "subnetID": "2bRCr6B4MiEfSjidDwxDpdCyviwnfUVqB2HGwhm947w9YYqb7r" })
    );
    Ok(())
}

#[tokio::test]
async fn identical_reads_return_identical_ordered_results() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.getSubnets",
        Reply::result(json!({
            "subnets": [
                { "id": "subnet-b", "controlKeys": ["P-local1b"], "threshold": "1" },
                { "id": "subnet-a", "controlKeys": ["P-local1a", "P-local1c"], "threshold": 2 }
            ]
        })),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    let first = node.platform().get_subnets(None).await?;
    let second = node.platform().get_subnets(None).await?;

    assert_eq!(first, second);
    let ids: Vec<_> = first.iter().map(|subnet| subnet.id.as_str()).collect();
    assert_eq!(ids, ["subnet-b", "subnet-a"]);
    assert_eq!(first[1].threshold, 2);
    Ok(())
}

#[tokio::test]
async fn empty_collections_are_valid_results() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.listAddresses",
        Reply::result(json!({ "addresses": [] })),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    assert!(node.platform().list_addresses(&user()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn non_success_status_without_envelope_is_a_transport_error() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.getHeight",
        Reply::Status(StatusCode::BAD_GATEWAY, "upstream unavailable".to_owned()),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    let err = node.platform().get_height().await.unwrap_err();

    assert_eq!(err.kind(), RpcErrorKind::Transport);
    match err.rpc_error() {
        RpcError::HttpStatus { status, body } => {
            assert_eq!(*status, StatusCode::BAD_GATEWAY);
            assert!(body.contains("upstream unavailable"));
        }
        other => panic!("expected an HTTP status error, got {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn malformed_and_mismatched_payloads_are_decode_errors() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    let node = stub.client("node-0", TIMEOUT)?;
    let platform = node.platform();

    stub.on("platform.getHeight", Reply::Raw("<html>nope</html>".to_owned()));
    assert_eq!(
        platform.get_height().await.unwrap_err().kind(),
        RpcErrorKind::Decode
    );

    stub.on(
        "platform.getHeight",
        Reply::Raw(json!({ "jsonrpc": "2.0", "id": 1 }).to_string()),
    );
    assert_eq!(
        platform.get_height().await.unwrap_err().kind(),
        RpcErrorKind::Decode
    );

    stub.on(
        "platform.getHeight",
        Reply::result(json!({ "height": "not-a-number" })),
    );
    assert_eq!(
        platform.get_height().await.unwrap_err().kind(),
        RpcErrorKind::Decode
    );

    stub.on(
        "platform.createAddress",
        Reply::result(json!({ "address": "" })),
    );
    assert_eq!(
        platform.create_address(&user()).await.unwrap_err().kind(),
        RpcErrorKind::Decode
    );
    Ok(())
}

#[tokio::test]
async fn response_for_another_request_id_is_rejected() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.getHeight",
        Reply::Raw(
            json!({ "jsonrpc": "2.0", "result": { "height": "7" }, "id": "not-the-id" })
                .to_string(),
        ),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    let err = node.platform().get_height().await.unwrap_err();

    assert_eq!(err.kind(), RpcErrorKind::Decode);
    Ok(())
}

#[tokio::test]
async fn error_reply_for_another_request_id_is_rejected() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.getHeight",
        Reply::Raw(
            json!({
                "jsonrpc": "2.0",
                "error": { "code": -32000, "message": "x" },
                "id": "not-the-id"
            })
            .to_string(),
        ),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    let err = node.platform().get_height().await.unwrap_err();

    assert_eq!(err.kind(), RpcErrorKind::Decode);
    assert_eq!(err.method(), "platform.getHeight");
    Ok(())
}

#[tokio::test]
async fn slow_server_times_out()-> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.getHeight",
        Reply::result(json!({ "height": 1 })).delayed(Duration::from_secs(5)),
    );
    let node = stub.client("node-0", Duration::from_millis(200))?;

    let err = node.platform().get_height().await.unwrap_err();

    assert_eq!(err.kind(), RpcErrorKind::Timeout);
    assert!(err.kind().is_transport());
    Ok(())
}

#[tokio::test]
async fn unreachable_node_is_a_transport_error() -> anyhow::Result<()> {
    let url = {
        let stub = StubNode::start().await?;
        stub.url()
    };
    // Give the dropped server a moment to release the port.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let node = ledger_testing_core::nodes::NodeClient::new("gone", &url, TIMEOUT)?;

    let err = node.platform().get_height().await.unwrap_err();

    assert!(err.kind().is_transport());
    Ok(())
}

#[tokio::test]
async fn invalid_arguments_never_reach_the_network() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    let node = stub.client("node-0", TIMEOUT)?;

    let err = node.platform().get_balance("  ").await.unwrap_err();
    assert_eq!(err.kind(), RpcErrorKind::Validation);

    let err = node
        .platform()
        .import_key(&UserPass::new("", "secret"), "PrivateKey-abc")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), RpcErrorKind::Validation);

    let err = node.admin().alias("", "myAlias").await.unwrap_err();
    assert_eq!(err.kind(), RpcErrorKind::Validation);

    assert!(stub.requests().is_empty());
    Ok(())
}

#[tokio::test]
async fn lock_profile_dispatches_its_own_method() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on("admin.lockProfile", Reply::result(json!({ "success": true })));
    stub.on("admin.memoryProfile", Reply::result(json!({ "success": true })));
    let node = stub.client("node-0", TIMEOUT)?;

    assert!(node.admin().lock_profile().await?);
    assert!(node.admin().memory_profile().await?);

    let methods: Vec<_> = stub
        .requests()
        .iter()
        .map(|request| (request.path.clone(), request.method().map(str::to_owned)))
        .collect();
    assert_eq!(
        methods,
        vec![
            ("/ext/admin".to_owned(), Some("admin.lockProfile".to_owned())),
            ("/ext/admin".to_owned(), Some("admin.memoryProfile".to_owned())),
        ]
    );
    Ok(())
}

#[tokio::test]
async fn balances_accept_quoted_and_bare_numbers() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on(
        "platform.getBalance",
        Reply::result(json!({ "balance": "30000000000000000", "unlocked": 5 })),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    let balance = node.platform().get_balance("P-local1abc").await?;

    assert_eq!(balance.balance, 30_000_000_000_000_000);
    assert_eq!(balance.unlocked, Some(5));
    assert_eq!(balance.locked_stakeable, None);
    Ok(())
}

#[tokio::test]
async fn binary_payloads_arrive_as_bytes() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    let raw_tx = vec![0_u8, 0, 0, 0, 0, 12, 0xde, 0xad, 0xbe, 0xef];
    stub.on(
        "platform.getTx",
        Reply::result(json!({ "tx": cb58::encode(&raw_tx) })),
    );
    stub.on(
        "platform.getUTXOs",
        Reply::result(json!({ "utxos": [cb58::encode(b"first"), cb58::encode(b"second")] })),
    );
    let node = stub.client("node-0", TIMEOUT)?;

    assert_eq!(node.platform().get_tx("tx-1").await?, raw_tx);

    let utxos = node
        .platform()
        .get_utxos(&["P-local1abc".to_owned()], None)
        .await?;
    assert_eq!(utxos, vec![b"first".to_vec(), b"second".to_vec()]);
    let params = stub.requests_for("platform.getUTXOs")[0].params().clone();
    assert_eq!(params, json!({ "addresses": ["P-local1abc"] }));
    Ok(())
}

#[tokio::test]
async fn tx_status_accepts_bare_and_wrapped_replies() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on_sequence(
        "platform.getTxStatus",
        vec![
            Reply::result(Value::String("Processing".to_owned())),
            Reply::result(json!({ "status": "Committed" })),
        ],
    );
    let node = stub.client("node-0", TIMEOUT)?;

    assert_eq!(node.platform().get_tx_status("tx-1").await?, Status::Processing);
    assert_eq!(node.platform().get_tx_status("tx-1").await?, Status::Committed);
    Ok(())
}

#[tokio::test]
async fn staking_calls_send_numbers_as_strings() -> anyhow::Result<()> {
    let stub = StubNode::start().await?;
    stub.on("platform.addValidator", Reply::result(json!({ "txID": "tx-validator" })));
    let node = stub.client("node-0", TIMEOUT)?;
    let stake = ledger_testing_core::nodes::Stake {
        node_id: "NodeID-A".to_owned(),
        stake_amount: 2_000_000,
        start_time: 1_700_000_030,
        end_time: 1_700_259_230,
    };

    let tx_id = node
        .platform()
        .add_validator(
            &user(),
            &stake,
            "P-local1reward",
            2.0,
            &ledger_testing_core::nodes::SpendOptions::default().change_to("P-local1change"),
        )
        .await?;

    assert_eq!(tx_id, "tx-validator");
    let params = stub.requests_for("platform.addValidator")[0].params().clone();
    assert_eq!(params["stakeAmount"], "2000000");
    assert_eq!(params["startTime"], "1700000030");
    assert_eq!(params["endTime"], "1700259230");
    assert_eq!(params["delegationFeeRate"], "2");
    assert_eq!(params["changeAddr"], "P-local1change");
    assert!(params.get("from").is_none());
    Ok(())
}
