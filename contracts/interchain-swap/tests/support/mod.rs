//! Two-chain harness: each chain runs its own contract instance with mocked
//! storage and a small bank ledger, and a relay helper carries packets and
//! acknowledgements between them.

#![allow(dead_code)]

use std::collections::HashMap;

use common::Ack;
use cosmwasm_std::testing::{
    mock_dependencies, mock_env, mock_info, MockApi, MockQuerier, MockStorage,
};
use cosmwasm_std::{
    coin, from_json, Addr, BankMsg, Binary, Coin, CosmosMsg, Env, IbcAcknowledgement,
    IbcBasicResponse, IbcChannel, IbcChannelConnectMsg, IbcChannelOpenMsg, IbcEndpoint, IbcMsg,
    IbcOrder, IbcPacket, IbcPacketAckMsg, IbcPacketReceiveMsg, IbcPacketTimeoutMsg,
    IbcReceiveResponse, OwnedDeps, SubMsg,
};
use interchain_swap::contract::{execute, instantiate, query};
use interchain_swap::ibc::{
    ibc_channel_connect, ibc_channel_open, ibc_packet_ack, ibc_packet_receive, ibc_packet_timeout,
};
use interchain_swap::msg::{
    EscrowBalanceResponse, ExecuteMsg, InstantiateMsg, MakePoolMsg, QueryMsg, TakePoolMsg,
};
use interchain_swap::packet::generate_pool_id;
use interchain_swap::state::{InterchainLiquidityPool, PoolAsset, PoolSide, SWAP_VERSION};
use interchain_swap::ContractError;
use serde::de::DeserializeOwned;

pub const PORT_A: &str = "wasm.poola";
pub const CHANNEL_A: &str = "channel-0";
pub const PORT_B: &str = "wasm.poolb";
pub const CHANNEL_B: &str = "channel-1";

/// Makes pools on chain A
pub const ALICE: &str = "alice";
/// Takes pools on chain B
pub const BOB: &str = "bob";
/// Receives swap outputs and withdrawals
pub const CAROL: &str = "carol";

pub const PACKET_LIFETIME: u64 = 600;
pub const MAX_SWAP_FEE_BPS: u32 = 100;
pub const TOLERANCE_BPS: u32 = 100;

fn endpoint(port: &str, channel: &str) -> IbcEndpoint {
    IbcEndpoint {
        port_id: port.to_string(),
        channel_id: channel.to_string(),
    }
}

pub struct Chain {
    pub deps: OwnedDeps<MockStorage, MockApi, MockQuerier>,
    pub env: Env,
    pub endpoint: IbcEndpoint,
    pub counterparty: IbcEndpoint,
    bank: HashMap<(String, String), u128>,
    next_sequence: u64,
}

impl Chain {
    /// A chain whose bank knows `native_denom`.
    pub fn new(chain_id: &str, local: IbcEndpoint, remote: IbcEndpoint, native_denom: &str) -> Self {
        let mut deps = mock_dependencies();
        let mut env = mock_env();
        env.block.chain_id = chain_id.to_string();
        // Gives the denom a total supply for the bank supply query.
        deps.querier
            .update_balance("treasury", vec![coin(1_000_000_000, native_denom)]);

        instantiate(
            deps.as_mut(),
            env.clone(),
            mock_info("admin", &[]),
            InstantiateMsg {
                admin: "admin".to_string(),
                packet_lifetime: PACKET_LIFETIME,
                max_swap_fee_bps: MAX_SWAP_FEE_BPS,
                multi_deposit_tolerance_bps: TOLERANCE_BPS,
            },
        )
        .unwrap();

        let channel = IbcChannel::new(
            local.clone(),
            remote.clone(),
            IbcOrder::Unordered,
            SWAP_VERSION,
            "connection-0",
        );
        ibc_channel_open(deps.as_mut(), env.clone(), IbcChannelOpenMsg::new_init(channel.clone()))
            .unwrap();
        ibc_channel_connect(
            deps.as_mut(),
            env.clone(),
            IbcChannelConnectMsg::new_ack(channel, SWAP_VERSION),
        )
        .unwrap();

        Self {
            deps,
            env,
            endpoint: local,
            counterparty: remote,
            bank: HashMap::new(),
            next_sequence: 1,
        }
    }

    pub fn contract(&self) -> String {
        self.env.contract.address.to_string()
    }

    pub fn fund(&mut self, address: &str, coin: Coin) {
        *self
            .bank
            .entry((address.to_string(), coin.denom))
            .or_default() += coin.amount.u128();
    }

    pub fn balance(&self, address: &str, denom: &str) -> u128 {
        self.bank
            .get(&(address.to_string(), denom.to_string()))
            .copied()
            .unwrap_or_default()
    }

    fn transfer(&mut self, from: &str, to: &str, coin: &Coin) {
        let key = (from.to_string(), coin.denom.clone());
        let held = self.bank.get(&key).copied().unwrap_or_default();
        assert!(
            held >= coin.amount.u128(),
            "{} cannot pay {}, holds {}",
            from,
            coin,
            held
        );
        self.bank.insert(key, held - coin.amount.u128());
        self.fund(to, coin.clone());
    }

    /// Executes as `sender` with `funds` attached. On success the funds move
    /// to the contract, bank messages are applied and the outgoing packets
    /// are returned.
    pub fn execute(
        &mut self,
        sender: &str,
        funds: &[Coin],
        msg: ExecuteMsg,
    ) -> Result<Vec<IbcPacket>, ContractError> {
        let res = execute(
            self.deps.as_mut(),
            self.env.clone(),
            mock_info(sender, funds),
            msg,
        )?;
        let contract = self.contract();
        for coin in funds {
            self.transfer(sender, &contract, coin);
        }
        Ok(self.dispatch(&res.messages))
    }

    pub fn query<T: DeserializeOwned>(&self, msg: QueryMsg) -> T {
        from_json(query(self.deps.as_ref(), self.env.clone(), msg).unwrap()).unwrap()
    }

    pub fn try_query<T: DeserializeOwned>(&self, msg: QueryMsg) -> Option<T> {
        query(self.deps.as_ref(), self.env.clone(), msg)
            .ok()
            .map(|bin| from_json(bin).unwrap())
    }

    pub fn receive(&mut self, packet: &IbcPacket) -> IbcReceiveResponse {
        let res = ibc_packet_receive(
            self.deps.as_mut(),
            self.env.clone(),
            IbcPacketReceiveMsg::new(packet.clone(), Addr::unchecked("relayer")),
        )
        .unwrap();
        self.dispatch(&res.messages);
        res
    }

    pub fn acknowledge(
        &mut self,
        packet: &IbcPacket,
        ack: Binary,
    ) -> Result<IbcBasicResponse, ContractError> {
        let res = ibc_packet_ack(
            self.deps.as_mut(),
            self.env.clone(),
            IbcPacketAckMsg::new(
                IbcAcknowledgement::new(ack),
                packet.clone(),
                Addr::unchecked("relayer"),
            ),
        )?;
        self.dispatch(&res.messages);
        Ok(res)
    }

    pub fn timeout(&mut self, packet: &IbcPacket) -> Result<IbcBasicResponse, ContractError> {
        let res = ibc_packet_timeout(
            self.deps.as_mut(),
            self.env.clone(),
            IbcPacketTimeoutMsg::new(packet.clone(), Addr::unchecked("relayer")),
        )?;
        self.dispatch(&res.messages);
        Ok(res)
    }

    /// Applies bank sends from the contract and turns `SendPacket` into
    /// packets addressed to the counterparty.
    fn dispatch(&mut self, messages: &[SubMsg]) -> Vec<IbcPacket> {
        let contract = self.contract();
        let mut packets = vec![];
        for sub in messages {
            match &sub.msg {
                CosmosMsg::Bank(BankMsg::Send { to_address, amount }) => {
                    for coin in amount {
                        self.transfer(&contract, to_address, coin);
                    }
                }
                CosmosMsg::Ibc(IbcMsg::SendPacket {
                    channel_id,
                    data,
                    timeout,
                }) => {
                    assert_eq!(channel_id, &self.endpoint.channel_id);
                    packets.push(IbcPacket::new(
                        data.clone(),
                        self.endpoint.clone(),
                        self.counterparty.clone(),
                        self.next_sequence,
                        timeout.clone(),
                    ));
                    self.next_sequence += 1;
                }
                other => panic!("unexpected message {:?}", other),
            }
        }
        packets
    }
}

pub fn ack_of(res: &IbcReceiveResponse) -> Ack {
    from_json(&res.acknowledgement).unwrap()
}

/// Delivers packets from `src` to `dst` and the resulting acknowledgements
/// back to `src`.
pub fn relay(src: &mut Chain, dst: &mut Chain, packets: Vec<IbcPacket>) -> Vec<Ack> {
    packets
        .iter()
        .map(|packet| {
            let res = dst.receive(packet);
            src.acknowledge(packet, res.acknowledgement.clone()).unwrap();
            ack_of(&res)
        })
        .collect()
}

/// Chain A holds `atoma`, chain B holds `atomb`.
pub struct Harness {
    pub a: Chain,
    pub b: Chain,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            a: Chain::new(
                "chain-a",
                endpoint(PORT_A, CHANNEL_A),
                endpoint(PORT_B, CHANNEL_B),
                "atoma",
            ),
            b: Chain::new(
                "chain-b",
                endpoint(PORT_B, CHANNEL_B),
                endpoint(PORT_A, CHANNEL_A),
                "atomb",
            ),
        }
    }

    pub fn relay_a_to_b(&mut self, packets: Vec<IbcPacket>) -> Vec<Ack> {
        relay(&mut self.a, &mut self.b, packets)
    }

    pub fn relay_b_to_a(&mut self, packets: Vec<IbcPacket>) -> Vec<Ack> {
        relay(&mut self.b, &mut self.a, packets)
    }
}

pub fn pool_id() -> String {
    generate_pool_id("chain-a", &["atoma", "atomb"])
}

pub fn asset(side: PoolSide, amount: u128, denom: &str) -> PoolAsset {
    PoolAsset {
        side,
        balance: coin(amount, denom),
        weight: 50,
        decimals: 6,
    }
}

/// Alice offers 1000 atoma against 1000 atomb at a 0.3% fee.
pub fn make_pool_msg() -> MakePoolMsg {
    MakePoolMsg {
        source_port: PORT_A.to_string(),
        source_channel: CHANNEL_A.to_string(),
        creator: ALICE.to_string(),
        counterparty_creator: BOB.to_string(),
        liquidity: vec![
            asset(PoolSide::Source, 1_000, "atoma"),
            asset(PoolSide::Destination, 1_000, "atomb"),
        ],
        swap_fee_bps: 30,
    }
}

pub fn take_pool_msg() -> TakePoolMsg {
    TakePoolMsg {
        creator: BOB.to_string(),
        pool_id: pool_id(),
    }
}

pub fn pool(chain: &Chain) -> InterchainLiquidityPool {
    chain.query(QueryMsg::Pool { pool_id: pool_id() })
}

pub fn has_pool(chain: &Chain) -> bool {
    chain
        .try_query::<InterchainLiquidityPool>(QueryMsg::Pool { pool_id: pool_id() })
        .is_some()
}

pub fn lp_balance(chain: &Chain, address: &str) -> u128 {
    let res: cw20::BalanceResponse = chain.query(QueryMsg::LpBalance {
        pool_id: pool_id(),
        address: address.to_string(),
    });
    res.balance.u128()
}

pub fn escrow_balance(chain: &Chain, denom: &str) -> u128 {
    let res: EscrowBalanceResponse = chain.query(QueryMsg::EscrowBalance {
        port_id: chain.endpoint.port_id.clone(),
        channel_id: chain.endpoint.channel_id.clone(),
        denom: denom.to_string(),
    });
    res.balance.amount.u128()
}

/// Alice makes the pool on chain A and it reaches chain B, which now holds
/// an Initialized mirror.
pub fn setup_made_pool() -> Harness {
    let mut h = Harness::new();
    h.a.fund(ALICE, coin(10_000, "atoma"));
    h.b.fund(BOB, coin(10_000, "atomb"));

    let packets = h
        .a
        .execute(ALICE, &[coin(1_000, "atoma")], ExecuteMsg::MakePool(make_pool_msg()))
        .unwrap();
    let acks = h.relay_a_to_b(packets);
    assert!(acks[0].is_success(), "{:?}", acks[0]);
    h
}

/// Bob takes the pool on chain B. Both chains hold an Active pool with
/// 1000 atoma, 1000 atomb and 2000 pool tokens; Alice owns 1000 on A and
/// Bob 1000 on B.
pub fn setup_active_pool() -> Harness {
    let mut h = setup_made_pool();
    let packets = h
        .b
        .execute(BOB, &[coin(1_000, "atomb")], ExecuteMsg::TakePool(take_pool_msg()))
        .unwrap();
    let acks = h.relay_b_to_a(packets);
    assert!(acks[0].is_success(), "{:?}", acks[0]);
    h
}
