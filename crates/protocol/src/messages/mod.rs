//! Record catalogue
//!
//! - [`kinds`]: the closed kind-byte table
//! - [`data`]: value objects embedded in records
//! - [`incoming`]: records the server sends, collected in [`ServerPacket`]
//! - [`outgoing`]: records the client sends

pub mod data;
pub mod incoming;
pub mod kinds;
pub mod outgoing;

use serde::{Deserialize, Serialize};

use crate::codec::PacketWriter;
use crate::envelope::Envelope;
use crate::error::CodecResult;
use crate::message_registry::{IncomingRecord, Record, RecordRegistry};

macro_rules! server_packets {
    ($($name:ident),* $(,)?) => {
        /// Any decoded server record
        #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
        #[serde(tag = "type", content = "data")]
        pub enum ServerPacket {
            $($name(incoming::$name),)*
        }

        impl ServerPacket {
            /// Kind byte of the wrapped record
            pub fn kind(&self) -> u8 {
                match self {
                    $(ServerPacket::$name(_) => <incoming::$name as Record>::KIND,)*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(ServerPacket::$name(_) => <incoming::$name as Record>::NAME,)*
                }
            }

            /// Encodes the wrapped record body
            pub fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
                match self {
                    $(ServerPacket::$name(record) => record.encode(writer),)*
                }
            }
        }

        $(
            impl IncomingRecord for incoming::$name {
                fn into_packet(self) -> ServerPacket {
                    ServerPacket::$name(self)
                }

                fn from_packet(packet: &ServerPacket) -> Option<&Self> {
                    match packet {
                        ServerPacket::$name(record) => Some(record),
                        _ => None,
                    }
                }
            }

            impl From<incoming::$name> for ServerPacket {
                fn from(record: incoming::$name) -> Self {
                    ServerPacket::$name(record)
                }
            }
        )*

        impl RecordRegistry {
            /// Registry holding a decoder for every server record
            pub fn with_server_records() -> Self {
                let mut registry = Self::new();
                $(registry.register::<incoming::$name>();)*
                registry
            }
        }
    };
}

server_packets! {
    Failure,
    DeletePet,
    QuestFetchResponse,
    Ping,
    NewTick,
    ShowEffect,
    ServerPlayerShoot,
    TradeAccepted,
    Goto,
    NameResult,
    BuyResult,
    HatchPet,
    GuildResult,
    TradeChanged,
    TradeDone,
    EnemyShoot,
    PlaySound,
    NewAbility,
    Update,
    Text,
    Reconnect,
    Death,
    AllyShoot,
    ResetDailyQuests,
    KeyInfoResponse,
    Aoe,
    Notification,
    ClientStat,
    Damage,
    ActivePet,
    InvitedToGuild,
    PetYardUpdate,
    PasswordPrompt,
    QuestObjectId,
    Pic,
    HeroLeft,
    TradeStart,
    EvolvedPet,
    TradeRequested,
    MapInfo,
    InventoryResult,
    QuestRedeemResponse,
    AccountList,
    CreateSuccess,
    File,
    UnlockCustomization,
    NewCharacterInformation,
    UnlockNewSlot,
    Queue,
    ExaltationBonusChanged,
    VaultContent,
    ForgeResult,
    ForgeUnlockedBlueprints,
    PlayersList,
    RefineResult,
    BuyItemResult,
    DrawDebugShape,
    DrawDebugArrow,
    SkinRecycleResponse,
    ClaimBpMilestoneResult,
    BoostBpMilestoneResult,
    MissionProgressUpdate,
    ClaimMissionResult,
    MultipleMissionsProgressUpdate,
    RealmScoreUpdate,
    CrucibleResult,
    PartyList,
    PartyJoinResponse,
    IncomingPartyMemberInfo,
    IncomingPartyInvite,
    PartyMemberAdded,
    PartyJoinRequestResponse,
    PartyAction,
}

impl ServerPacket {
    /// Wraps the encoded record in an envelope
    pub fn to_envelope(&self) -> CodecResult<Envelope> {
        let mut writer = PacketWriter::new();
        self.encode(&mut writer)?;
        Ok(Envelope::new(self.kind(), writer.into_bytes()))
    }

    /// Borrows the wrapped record as `R`
    pub fn as_record<R: IncomingRecord>(&self) -> Option<&R> {
        R::from_packet(self)
    }
}
