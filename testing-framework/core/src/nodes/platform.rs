use serde::{Deserialize, Serialize};
use serde_with::{DisplayFromStr, serde_as};

use super::{
    EndpointClient, NoParams, TxIdReply, non_empty_identifier,
    types::{
        Balance, Blockchain, Lenient, SpendOptions, Stake, StakerParams, Status, Subnet, UserPass,
        ValidatorSet,
    },
};
use crate::{
    constants::{PLATFORM_NAMESPACE, PLATFORM_PATH},
    rpc::{
        CallResult, RpcClient, RpcError,
        cb58::{self, Cb58Bytes},
        require_non_empty, require_non_empty_items,
    },
};

/// Client for the validator-chain (platform) API.
///
/// Methods that issue transactions return the transaction id as soon as the
/// contacted node accepts it; acceptance by the rest of the network has to be
/// observed separately.
#[derive(Clone, Debug)]
pub struct PlatformClient {
    rpc: RpcClient,
}

impl EndpointClient for PlatformClient {
    const PATH: &'static str = PLATFORM_PATH;
    const NAMESPACE: &'static str = PLATFORM_NAMESPACE;

    fn from_rpc(rpc: RpcClient) -> Self {
        Self { rpc }
    }

    fn rpc(&self) -> &RpcClient {
        &self.rpc
    }
}

#[derive(Serialize)]
struct UserParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportKeyParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    private_key: &'a str,
}

#[derive(Serialize)]
struct ExportKeyParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    address: &'a str,
}

#[derive(Serialize)]
struct AddressParams<'a> {
    address: &'a str,
}

#[serde_as]
#[derive(Serialize)]
struct UtxosParams<'a> {
    addresses: &'a [String],
    #[serde_as(as = "Option<DisplayFromStr>")]
    #[serde(skip_serializing_if = "Option::is_none")]
    limit: Option<u32>,
}

#[derive(Serialize)]
struct SubnetsParams<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    ids: Option<&'a [String]>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SubnetSelector<'a> {
    #[serde(rename = "subnetID", skip_serializing_if = "Option::is_none")]
    subnet_id: Option<&'a str>,
}

#[serde_as]
#[derive(Serialize)]
struct SampleParams<'a> {
    #[serde(rename = "subnetID", skip_serializing_if = "Option::is_none")]
    subnet_id: Option<&'a str>,
    #[serde_as(as = "DisplayFromStr")]
    size: u16,
}

#[serde_as]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddValidatorParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(flatten)]
    spend: &'a SpendOptions,
    #[serde(flatten)]
    staker: StakerParams<'a>,
    reward_address: &'a str,
    #[serde_as(as = "DisplayFromStr")]
    delegation_fee_rate: f32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AddDelegatorParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(flatten)]
    spend: &'a SpendOptions,
    #[serde(flatten)]
    staker: StakerParams<'a>,
    reward_address: &'a str,
}

#[derive(Serialize)]
struct AddSubnetValidatorParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(flatten)]
    spend: &'a SpendOptions,
    #[serde(flatten)]
    staker: StakerParams<'a>,
    #[serde(rename = "subnetID")]
    subnet_id: &'a str,
}

#[serde_as]
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateSubnetParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(flatten)]
    spend: &'a SpendOptions,
    control_keys: &'a [String],
    #[serde_as(as = "DisplayFromStr")]
    threshold: u32,
}

#[serde_as]
#[derive(Serialize)]
struct ExportParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(flatten)]
    spend: &'a SpendOptions,
    to: &'a str,
    #[serde_as(as = "DisplayFromStr")]
    amount: u64,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(flatten)]
    spend: &'a SpendOptions,
    to: &'a str,
    source_chain: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateBlockchainParams<'a> {
    #[serde(flatten)]
    user: &'a UserPass,
    #[serde(flatten)]
    spend: &'a SpendOptions,
    #[serde(rename = "subnetID")]
    subnet_id: &'a str,
    #[serde(rename = "vmID")]
    vm_id: &'a str,
    #[serde(rename = "fxIDs")]
    fx_ids: &'a [String],
    name: &'a str,
    genesis_data: String,
}

#[derive(Serialize)]
struct BlockchainParams<'a> {
    #[serde(rename = "blockchainID")]
    blockchain_id: &'a str,
}

#[derive(Serialize)]
struct SubnetParams<'a> {
    #[serde(rename = "subnetID")]
    subnet_id: &'a str,
}

#[derive(Serialize)]
struct TxParams<'a> {
    #[serde(rename = "txID")]
    tx_id: &'a str,
}

#[serde_as]
#[derive(Deserialize)]
struct HeightReply {
    #[serde_as(as = "Lenient")]
    height: u64,
}

#[derive(Deserialize)]
struct AddressReply {
    address: String,
}

#[derive(Deserialize)]
struct AddressesReply {
    #[serde(default)]
    addresses: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExportKeyReply {
    private_key: String,
}

#[derive(Deserialize)]
struct UtxosReply {
    #[serde(default)]
    utxos: Vec<Cb58Bytes>,
}

#[derive(Deserialize)]
struct SubnetsReply {
    #[serde(default)]
    subnets: Vec<Subnet>,
}

#[derive(Deserialize)]
struct SampleReply {
    #[serde(default)]
    validators: Vec<String>,
}

#[derive(Deserialize)]
struct StatusReply {
    status: Status,
}

/// Older nodes answer `getTxStatus` with a bare status string.
#[derive(Deserialize)]
#[serde(untagged)]
enum TxStatusReply {
    Bare(Status),
    Wrapped { status: Status },
}

#[derive(Deserialize)]
struct ValidatedByReply {
    #[serde(rename = "subnetID")]
    subnet_id: String,
}

#[derive(Deserialize)]
struct ValidatesReply {
    #[serde(rename = "blockchainIDs", default)]
    blockchain_ids: Vec<String>,
}

#[derive(Deserialize)]
struct BlockchainsReply {
    #[serde(default)]
    blockchains: Vec<Blockchain>,
}

#[derive(Deserialize)]
struct TxReply {
    tx: Cb58Bytes,
}

impl PlatformClient {
    /// Current height of the validator chain.
    pub async fn get_height(&self) -> CallResult<u64> {
        let reply: HeightReply = self.rpc.send("getHeight", &NoParams {}).await?;
        Ok(reply.height)
    }

    /// Create a new address controlled by `user`.
    pub async fn create_address(&self, user: &UserPass) -> CallResult<String> {
        const METHOD: &str = "createAddress";
        self.check(METHOD, user.validate())?;

        let reply: AddressReply = self.rpc.send(METHOD, &UserParams { user }).await?;
        non_empty_identifier(&self.rpc, METHOD, "address", reply.address)
    }

    /// Addresses controlled by `user`, in server order.
    pub async fn list_addresses(&self, user: &UserPass) -> CallResult<Vec<String>> {
        const METHOD: &str = "listAddresses";
        self.check(METHOD, user.validate())?;

        let reply: AddressesReply = self.rpc.send(METHOD, &UserParams { user }).await?;
        Ok(reply.addresses)
    }

    /// Import `private_key` into `user`'s keystore, returning its address.
    pub async fn import_key(&self, user: &UserPass, private_key: &str) -> CallResult<String> {
        const METHOD: &str = "importKey";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| require_non_empty("privateKey", private_key)),
        )?;

        let reply: AddressReply = self
            .rpc
            .send(METHOD, &ImportKeyParams { user, private_key })
            .await?;
        non_empty_identifier(&self.rpc, METHOD, "address", reply.address)
    }

    /// Private key of `address` held in `user`'s keystore.
    pub async fn export_key(&self, user: &UserPass, address: &str) -> CallResult<String> {
        const METHOD: &str = "exportKey";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| require_non_empty("address", address)),
        )?;

        let reply: ExportKeyReply = self
            .rpc
            .send(METHOD, &ExportKeyParams { user, address })
            .await?;
        non_empty_identifier(&self.rpc, METHOD, "privateKey", reply.private_key)
    }

    pub async fn get_balance(&self, address: &str) -> CallResult<Balance> {
        const METHOD: &str = "getBalance";
        self.check(METHOD, require_non_empty("address", address))?;

        self.rpc.send(METHOD, &AddressParams { address }).await
    }

    /// Raw UTXOs controlled by `addresses`. `limit` is sent only when set.
    pub async fn get_utxos(
        &self,
        addresses: &[String],
        limit: Option<u32>,
    ) -> CallResult<Vec<Vec<u8>>> {
        const METHOD: &str = "getUTXOs";
        self.check(METHOD, non_empty_list("addresses", addresses))?;

        let reply: UtxosReply = self
            .rpc
            .send(METHOD, &UtxosParams { addresses, limit })
            .await?;
        Ok(reply.utxos.into_iter().map(Cb58Bytes::into_inner).collect())
    }

    /// Subnets with the given ids, or every subnet when `ids` is `None`.
    pub async fn get_subnets(&self, ids: Option<&[String]>) -> CallResult<Vec<Subnet>> {
        const METHOD: &str = "getSubnets";
        if let Some(ids) = ids {
            self.check(METHOD, require_non_empty_items("ids", ids))?;
        }

        let reply: SubnetsReply = self.rpc.send(METHOD, &SubnetsParams { ids }).await?;
        Ok(reply.subnets)
    }

    /// Current validators and delegators. Without `subnet_id` the node
    /// answers for the primary network.
    pub async fn get_current_validators(&self, subnet_id: Option<&str>) -> CallResult<ValidatorSet> {
        self.validator_set("getCurrentValidators", subnet_id).await
    }

    /// Validators and delegators that have not started yet.
    pub async fn get_pending_validators(&self, subnet_id: Option<&str>) -> CallResult<ValidatorSet> {
        self.validator_set("getPendingValidators", subnet_id).await
    }

    /// Node ids of `size` validators sampled by stake weight.
    pub async fn sample_validators(
        &self,
        subnet_id: Option<&str>,
        size: u16,
    ) -> CallResult<Vec<String>> {
        const METHOD: &str = "sampleValidators";
        self.check(METHOD, optional_id("subnetID", subnet_id))?;

        let reply: SampleReply = self
            .rpc
            .send(METHOD, &SampleParams { subnet_id, size })
            .await?;
        Ok(reply.validators)
    }

    /// Issue a transaction adding `stake.node_id` as a primary network
    /// validator.
    pub async fn add_validator(
        &self,
        user: &UserPass,
        stake: &Stake,
        reward_address: &str,
        delegation_fee_rate: f32,
        spend: &SpendOptions,
    ) -> CallResult<String> {
        const METHOD: &str = "addValidator";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| stake.validate())
                .and_then(|()| require_non_empty("rewardAddress", reward_address))
                .and_then(|()| spend.validate())
                .and_then(|()| finite_rate(delegation_fee_rate)),
        )?;

        let params = AddValidatorParams {
            user,
            spend,
            staker: stake.into(),
            reward_address,
            delegation_fee_rate,
        };
        self.issue(METHOD, &params).await
    }

    /// Issue a transaction delegating stake to `stake.node_id`.
    pub async fn add_delegator(
        &self,
        user: &UserPass,
        stake: &Stake,
        reward_address: &str,
        spend: &SpendOptions,
    ) -> CallResult<String> {
        const METHOD: &str = "addDelegator";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| stake.validate())
                .and_then(|()| require_non_empty("rewardAddress", reward_address))
                .and_then(|()| spend.validate()),
        )?;

        let params = AddDelegatorParams {
            user,
            spend,
            staker: stake.into(),
            reward_address,
        };
        self.issue(METHOD, &params).await
    }

    /// Issue a transaction adding `stake.node_id` to the validators of
    /// `subnet_id`.
    pub async fn add_subnet_validator(
        &self,
        user: &UserPass,
        stake: &Stake,
        subnet_id: &str,
        spend: &SpendOptions,
    ) -> CallResult<String> {
        const METHOD: &str = "addSubnetValidator";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| stake.validate())
                .and_then(|()| require_non_empty("subnetID", subnet_id))
                .and_then(|()| spend.validate()),
        )?;

        let params = AddSubnetValidatorParams {
            user,
            spend,
            staker: stake.into(),
            subnet_id,
        };
        self.issue(METHOD, &params).await
    }

    /// Issue a transaction creating a subnet owned by `control_keys`.
    pub async fn create_subnet(
        &self,
        user: &UserPass,
        control_keys: &[String],
        threshold: u32,
        spend: &SpendOptions,
    ) -> CallResult<String> {
        const METHOD: &str = "createSubnet";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| require_non_empty_items("controlKeys", control_keys))
                .and_then(|()| spend.validate()),
        )?;

        let params = CreateSubnetParams {
            user,
            spend,
            control_keys,
            threshold,
        };
        self.issue(METHOD, &params).await
    }

    /// Issue a transaction exporting `amount` to the address `to` on another
    /// chain.
    pub async fn export_avax(
        &self,
        user: &UserPass,
        to: &str,
        amount: u64,
        spend: &SpendOptions,
    ) -> CallResult<String> {
        const METHOD: &str = "exportAVAX";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| require_non_empty("to", to))
                .and_then(|()| spend.validate()),
        )?;

        let params = ExportParams {
            user,
            spend,
            to,
            amount,
        };
        self.issue(METHOD, &params).await
    }

    /// Issue a transaction importing funds exported from `source_chain`.
    pub async fn import_avax(
        &self,
        user: &UserPass,
        to: &str,
        source_chain: &str,
        spend: &SpendOptions,
    ) -> CallResult<String> {
        const METHOD: &str = "importAVAX";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| require_non_empty("to", to))
                .and_then(|()| require_non_empty("sourceChain", source_chain))
                .and_then(|()| spend.validate()),
        )?;

        let params = ImportParams {
            user,
            spend,
            to,
            source_chain,
        };
        self.issue(METHOD, &params).await
    }

    /// Issue a transaction creating a blockchain on `subnet_id`. The genesis
    /// bytes are sent CB58-encoded.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_blockchain(
        &self,
        user: &UserPass,
        subnet_id: &str,
        vm_id: &str,
        fx_ids: &[String],
        name: &str,
        genesis_data: &[u8],
        spend: &SpendOptions,
    ) -> CallResult<String> {
        const METHOD: &str = "createBlockchain";
        self.check(
            METHOD,
            user.validate()
                .and_then(|()| require_non_empty("subnetID", subnet_id))
                .and_then(|()| require_non_empty("vmID", vm_id))
                .and_then(|()| require_non_empty_items("fxIDs", fx_ids))
                .and_then(|()| require_non_empty("name", name))
                .and_then(|()| spend.validate()),
        )?;

        let params = CreateBlockchainParams {
            user,
            spend,
            subnet_id,
            vm_id,
            fx_ids,
            name,
            genesis_data: cb58::encode(genesis_data),
        };
        self.issue(METHOD, &params).await
    }

    pub async fn get_blockchain_status(&self, blockchain_id: &str) -> CallResult<Status> {
        const METHOD: &str = "getBlockchainStatus";
        self.check(METHOD, require_non_empty("blockchainID", blockchain_id))?;

        let reply: StatusReply = self
            .rpc
            .send(METHOD, &BlockchainParams { blockchain_id })
            .await?;
        Ok(reply.status)
    }

    /// Subnet that validates `blockchain_id`.
    pub async fn validated_by(&self, blockchain_id: &str) -> CallResult<String> {
        const METHOD: &str = "validatedBy";
        self.check(METHOD, require_non_empty("blockchainID", blockchain_id))?;

        let reply: ValidatedByReply = self
            .rpc
            .send(METHOD, &BlockchainParams { blockchain_id })
            .await?;
        non_empty_identifier(&self.rpc, METHOD, "subnetID", reply.subnet_id)
    }

    /// Blockchains validated by `subnet_id`.
    pub async fn validates(&self, subnet_id: &str) -> CallResult<Vec<String>> {
        const METHOD: &str = "validates";
        self.check(METHOD, require_non_empty("subnetID", subnet_id))?;

        let reply: ValidatesReply = self.rpc.send(METHOD, &SubnetParams { subnet_id }).await?;
        Ok(reply.blockchain_ids)
    }

    pub async fn get_blockchains(&self) -> CallResult<Vec<Blockchain>> {
        let reply: BlockchainsReply = self.rpc.send("getBlockchains", &NoParams {}).await?;
        Ok(reply.blockchains)
    }

    /// Raw bytes of transaction `tx_id`.
    pub async fn get_tx(&self, tx_id: &str) -> CallResult<Vec<u8>> {
        const METHOD: &str = "getTx";
        self.check(METHOD, require_non_empty("txID", tx_id))?;

        let reply: TxReply = self.rpc.send(METHOD, &TxParams { tx_id }).await?;
        Ok(reply.tx.into_inner())
    }

    pub async fn get_tx_status(&self, tx_id: &str) -> CallResult<Status> {
        const METHOD: &str = "getTxStatus";
        self.check(METHOD, require_non_empty("txID", tx_id))?;

        let reply: TxStatusReply = self.rpc.send(METHOD, &TxParams { tx_id }).await?;
        Ok(match reply {
            TxStatusReply::Bare(status) | TxStatusReply::Wrapped { status } => status,
        })
    }

    async fn validator_set(&self, method: &str, subnet_id: Option<&str>) -> CallResult<ValidatorSet> {
        self.check(method, optional_id("subnetID", subnet_id))?;

        self.rpc.send(method, &SubnetSelector { subnet_id }).await
    }

    async fn issue<P: Serialize + Sync>(&self, method: &str, params: &P) -> CallResult<String> {
        let reply: TxIdReply = self.rpc.send(method, params).await?;
        non_empty_identifier(&self.rpc, method, "txID", reply.tx_id)
    }

    fn check(&self, method: &str, validation: Result<(), RpcError>) -> CallResult<()> {
        validation.map_err(|err| self.rpc.invalid(method, err))
    }
}

fn non_empty_list(argument: &'static str, values: &[String]) -> Result<(), RpcError> {
    if values.is_empty() {
        return Err(RpcError::Validation {
            argument,
            reason: "must contain at least one entry".to_owned(),
        });
    }
    require_non_empty_items(argument, values)
}

/// An explicitly supplied selector must be meaningful; leave it unset to ask
/// for the server default.
fn optional_id(argument: &'static str, value: Option<&str>) -> Result<(), RpcError> {
    value.map_or(Ok(()), |id| require_non_empty(argument, id))
}

fn finite_rate(rate: f32) -> Result<(), RpcError> {
    if rate.is_finite() && rate >= 0.0 {
        Ok(())
    } else {
        Err(RpcError::Validation {
            argument: "delegationFeeRate",
            reason: format!("{rate} is not a finite non-negative rate"),
        })
    }
}
