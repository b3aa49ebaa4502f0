//! Wire shape and decoding of every typed client method, one table row each.

use std::time::Duration;

use ledger_testing_core::{
    nodes::{NodeClient, SpendOptions, Stake, UserPass},
    rpc::{CallError, RpcError, RpcErrorKind, cb58},
};
use serde_json::{Value, json};
use tests_workflows::{Reply, StubNode};

const TIMEOUT: Duration = Duration::from_secs(2);
const GENESIS: &[u8] = b"{\"timestamp\":0}";

fn user() -> UserPass {
    UserPass::new("alice", "a-long-keystore-password")
}

fn stake() -> Stake {
    Stake {
        node_id: "NodeID-A".to_owned(),
        stake_amount: 100,
        start_time: 1_700_000_030,
        end_time: 1_700_259_230,
    }
}

#[derive(Clone, Copy, Debug)]
enum Call {
    ExportKey,
    SamplePrimaryValidators,
    SampleSubnetValidators,
    AddSubnetValidator,
    ExportAvax,
    ImportAvax,
    CreateBlockchain,
    GetBlockchainStatus,
    ValidatedBy,
    Validates,
    GetBlockchains,
    AliasChain,
    Stacktrace,
    StartCpuProfiler,
    StopCpuProfiler,
}

async fn invoke(node: &NodeClient, call: Call) -> Result<Value, CallError> {
    let platform = node.platform();
    let admin = node.admin();
    let none = SpendOptions::default();

    Ok(match call {
        Call::ExportKey => json!(platform.export_key(&user(), "P-local1abc").await?),
        Call::SamplePrimaryValidators => json!(platform.sample_validators(None, 2).await?),
        Call::SampleSubnetValidators => {
            json!(platform.sample_validators(Some("subnet-1"), 1).await?)
        }
        Call::AddSubnetValidator => json!(
            platform
                .add_subnet_validator(&user(), &stake(), "subnet-1", &none)
                .await?
        ),
        Call::ExportAvax => json!(
            platform
                .export_avax(
                    &user(),
                    "X-local1to",
                    5_000,
                    &SpendOptions::default().from_addresses(vec!["P-local1from".to_owned()]),
                )
                .await?
        ),
        Call::ImportAvax => json!(
            platform
                .import_avax(
                    &user(),
                    "P-local1to",
                    "X",
                    &SpendOptions::default().change_to("P-local1change"),
                )
                .await?
        ),
        Call::CreateBlockchain => json!(
            platform
                .create_blockchain(
                    &user(),
                    "subnet-1",
                    "timestampvm",
                    &["secp256k1fx".to_owned()],
                    "clock",
                    GENESIS,
                    &none,
                )
                .await?
        ),
        Call::GetBlockchainStatus => json!(platform.get_blockchain_status("chain-1").await?),
        Call::ValidatedBy => json!(platform.validated_by("chain-1").await?),
        Call::Validates => json!(platform.validates("subnet-1").await?),
        Call::GetBlockchains => json!(platform.get_blockchains().await?),
        Call::AliasChain => json!(admin.alias_chain("chain-1", "clock").await?),
        Call::Stacktrace => json!(admin.stacktrace().await?),
        Call::StartCpuProfiler => json!(admin.start_cpu_profiler().await?),
        Call::StopCpuProfiler => json!(admin.stop_cpu_profiler().await?),
    })
}

struct Case {
    call: Call,
    method: &'static str,
    path: &'static str,
    params: Value,
    result: Value,
    decoded: Value,
}

fn credentials() -> serde_json::Map<String, Value> {
    let mut params = serde_json::Map::new();
    params.insert("username".to_owned(), json!("alice"));
    params.insert("password".to_owned(), json!("a-long-keystore-password"));
    params
}

fn with_credentials(extra: Value) -> Value {
    let mut params = credentials();
    if let Value::Object(extra) = extra {
        params.extend(extra);
    }
    Value::Object(params)
}

fn cases() -> Vec<Case> {
    let chain = json!({
        "id": "chain-1",
        "name": "clock",
        "subnetID": "subnet-1",
        "vmID": "timestampvm"
    });

    vec![
        Case {
            call: Call::ExportKey,
            method: "platform.exportKey",
            path: "/ext/P",
            params: with_credentials(json!({ "address": "P-local1abc" })),
            result: json!({ "privateKey": "PrivateKey-xyz" }),
            decoded: json!("PrivateKey-xyz"),
        },
        Case {
            call: Call::SamplePrimaryValidators,
            method: "platform.sampleValidators",
            path: "/ext/P",
            params: json!({ "size": "2" }),
            result: json!({ "validators": ["NodeID-A", "NodeID-B"] }),
            decoded: json!(["NodeID-A", "NodeID-B"]),
        },
        Case {
            call: Call::SampleSubnetValidators,
            method: "platform.sampleValidators",
            path: "/ext/P",
            params: json!({ "subnetID": "subnet-1", "size": "1" }),
            result: json!({ "validators": ["NodeID-C"] }),
            decoded: json!(["NodeID-C"]),
        },
        Case {
            call: Call::AddSubnetValidator,
            method: "platform.addSubnetValidator",
            path: "/ext/P",
            params: with_credentials(json!({
                "nodeID": "NodeID-A",
                "stakeAmount": "100",
                "startTime": "1700000030",
                "endTime": "1700259230",
                "subnetID": "subnet-1"
            })),
            result: json!({ "txID": "tx-subnet-validator" }),
            decoded: json!("tx-subnet-validator"),
        },
        Case {
            call: Call::ExportAvax,
            method: "platform.exportAVAX",
            path: "/ext/P",
            params: with_credentials(json!({
                "from": ["P-local1from"],
                "to": "X-local1to",
                "amount": "5000"
            })),
            result: json!({ "txID": "tx-export" }),
            decoded: json!("tx-export"),
        },
        Case {
            call: Call::ImportAvax,
            method: "platform.importAVAX",
            path: "/ext/P",
            params: with_credentials(json!({
                "changeAddr": "P-local1change",
                "to": "P-local1to",
                "sourceChain": "X"
            })),
            result: json!({ "txID": "tx-import" }),
            decoded: json!("tx-import"),
        },
        Case {
            call: Call::CreateBlockchain,
            method: "platform.createBlockchain",
            path: "/ext/P",
            params: with_credentials(json!({
                "subnetID": "subnet-1",
                "vmID": "timestampvm",
                "fxIDs": ["secp256k1fx"],
                "name": "clock",
                "genesisData": cb58::encode(GENESIS)
            })),
            result: json!({ "txID": "tx-chain" }),
            decoded: json!("tx-chain"),
        },
        Case {
            call: Call::GetBlockchainStatus,
            method: "platform.getBlockchainStatus",
            path: "/ext/P",
            params: json!({ "blockchainID": "chain-1" }),
            result: json!({ "status": "Validating" }),
            decoded: json!("Validating"),
        },
        Case {
            call: Call::ValidatedBy,
            method: "platform.validatedBy",
            path: "/ext/P",
            params: json!({ "blockchainID": "chain-1" }),
            result: json!({ "subnetID": "subnet-1" }),
            decoded: json!("subnet-1"),
        },
        Case {
            call: Call::Validates,
            method: "platform.validates",
            path: "/ext/P",
            params: json!({ "subnetID": "subnet-1" }),
            result: json!({ "blockchainIDs": ["chain-1", "chain-2"] }),
            decoded: json!(["chain-1", "chain-2"]),
        },
        Case {
            call: Call::GetBlockchains,
            method: "platform.getBlockchains",
            path: "/ext/P",
            params: json!({}),
            result: json!({ "blockchains": [chain.clone()] }),
            decoded: json!([chain]),
        },
        Case {
            call: Call::AliasChain,
            method: "admin.aliasChain",
            path: "/ext/admin",
            params: json!({ "chain": "chain-1", "alias": "clock" }),
            result: json!({ "success": true }),
            decoded: json!(true),
        },
        Case {
            call: Call::Stacktrace,
            method: "admin.stacktrace",
            path: "/ext/admin",
            params: json!({}),
            result: json!({ "stacktrace": "goroutine 1 [running]:" }),
            decoded: json!("goroutine 1 [running]:"),
        },
        Case {
            call: Call::StartCpuProfiler,
            method: "admin.startCPUProfiler",
            path: "/ext/admin",
            params: json!({}),
            result: json!({ "success": true }),
            decoded: json!(true),
        },
        Case {
            call: Call::StopCpuProfiler,
            method: "admin.stopCPUProfiler",
            path: "/ext/admin",
            params: json!({}),
            result: json!({ "success": false }),
            decoded: json!(false),
        },
    ]
}

#[tokio::test]
async fn every_method_sends_its_params_and_decodes_its_result() -> anyhow::Result<()> {
    for case in cases() {
        let stub = StubNode::start().await?;
        stub.on(case.method, Reply::result(case.result.clone()));
        let node = stub.client("node-0", TIMEOUT)?;

        let decoded = invoke(&node, case.call).await;

        let decoded = decoded.map_err(|err| anyhow::anyhow!("{:?} failed: {err}", case.call))?;
        assert_eq!(decoded, case.decoded, "{:?} decoded", case.call);

        let requests = stub.requests();
        assert_eq!(requests.len(), 1, "{:?} sent one request", case.call);
        let request = &requests[0];
        assert_eq!(request.path, case.path, "{:?} path", case.call);
        assert_eq!(request.method(), Some(case.method), "{:?} method", case.call);
        assert_eq!(request.params(), &case.params, "{:?} params", case.call);
    }
    Ok(())
}

#[tokio::test]
async fn every_method_reports_server_errors_verbatim() -> anyhow::Result<()> {
    for case in cases() {
        let stub = StubNode::start().await?;
        let message = format!("{} rejected", case.method);
        stub.on(case.method, Reply::error(-32010, message.clone()));
        let node = stub.client("node-0", TIMEOUT)?;

        let Err(err) = invoke(&node, case.call).await else {
            panic!("{:?} accepted an error reply", case.call);
        };

        assert_eq!(err.kind(), RpcErrorKind::Application, "{:?}", case.call);
        assert_eq!(err.method(), case.method);
        match err.rpc_error() {
            RpcError::Application { code, message: got, .. } => {
                assert_eq!(*code, -32010);
                assert_eq!(got, &message);
            }
            other => panic!("{:?} returned {other:?}", case.call),
        }
    }
    Ok(())
}
