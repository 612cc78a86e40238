//! Two-chain harness: each chain runs its own contract instance with mocked
//! storage and a small bank ledger, and a relay helper carries packets and
//! acknowledgements between them.

#![allow(dead_code)]

use std::collections::HashMap;

use atomic_swap::contract::{execute, instantiate, query};
use atomic_swap::ibc::{
    ibc_channel_connect, ibc_channel_open, ibc_packet_ack, ibc_packet_receive, ibc_packet_timeout,
};
use atomic_swap::msg::{ExecuteMsg, InstantiateMsg, QueryMsg};
use atomic_swap::state::SWAP_VERSION;
use atomic_swap::ContractError;
use common::Ack;
use cosmwasm_std::testing::{
    mock_dependencies, mock_env, mock_info, MockApi, MockQuerier, MockStorage,
};
use cosmwasm_std::{
    from_json, Addr, BankMsg, Binary, Coin, CosmosMsg, Env, IbcAcknowledgement,
    IbcBasicResponse, IbcChannel, IbcChannelConnectMsg, IbcChannelOpenMsg, IbcEndpoint, IbcMsg,
    IbcOrder, IbcPacket, IbcPacketAckMsg, IbcPacketReceiveMsg, IbcPacketTimeoutMsg,
    IbcReceiveResponse, OwnedDeps, SubMsg,
};
use serde::de::DeserializeOwned;

pub const PORT_A: &str = "wasm.swapa";
pub const CHANNEL_A: &str = "channel-0";
pub const PORT_B: &str = "wasm.swapb";
pub const CHANNEL_B: &str = "channel-1";

pub const PACKET_LIFETIME: u64 = 600;

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
    pub fn new(chain_id: &str, local: IbcEndpoint, remote: IbcEndpoint, max_orders: u64) -> Self {
        let mut deps = mock_dependencies();
        let mut env = mock_env();
        env.block.chain_id = chain_id.to_string();

        instantiate(
            deps.as_mut(),
            env.clone(),
            mock_info("admin", &[]),
            InstantiateMsg {
                admin: "admin".to_string(),
                packet_lifetime: PACKET_LIFETIME,
                max_orders,
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

    pub fn advance_seconds(&mut self, seconds: u64) {
        self.env.block.time = self.env.block.time.plus_seconds(seconds);
        self.env.block.height += seconds / 5;
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

pub struct Harness {
    pub a: Chain,
    pub b: Chain,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_max_orders(100)
    }

    pub fn with_max_orders(max_orders: u64) -> Self {
        Self {
            a: Chain::new(
                "chain-a",
                endpoint(PORT_A, CHANNEL_A),
                endpoint(PORT_B, CHANNEL_B),
                max_orders,
            ),
            b: Chain::new(
                "chain-b",
                endpoint(PORT_B, CHANNEL_B),
                endpoint(PORT_A, CHANNEL_A),
                max_orders,
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
