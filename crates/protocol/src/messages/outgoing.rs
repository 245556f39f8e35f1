//! Records sent by the client

use serde::{Deserialize, Serialize};

use super::data::*;
use super::kinds;
use crate::Record;

/// Game id of the nexus, the default `Hello` target
pub const GAME_ID_NEXUS: i32 = -2;

/// First record of every connection
///
/// The key bytes and key time come from the last `Reconnect` directive; a
/// fresh login sends an empty key and a key time of `-1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::HELLO)]
pub struct Hello {
    pub game_id: i32,
    pub build_version: String,
    pub access_token: String,
    pub key_time: i32,
    pub key: Vec<u8>,
    pub game_net: String,
    pub play_platform: String,
    pub platform_token: String,
    pub client_token: String,
    pub client_identification: String,
}

/// Movement report for one tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::MOVE)]
pub struct Move {
    pub tick_id: i32,
    pub time: i32,
    pub records: Vec<LocationRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PONG)]
pub struct Pong {
    pub serial: i32,
    pub time: i32,
}

/// Loads an existing character
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::LOAD)]
pub struct Load {
    pub character_id: i32,
    pub first_session: bool,
}

/// Creates a new character of `class_type`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CREATE)]
pub struct Create {
    pub class_type: u16,
    pub skin_type: u16,
    pub is_challenger: bool,
    pub is_seasonal: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::UPDATE_ACK)]
pub struct UpdateAck;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::SHOOT_ACK_COUNTER)]
pub struct ShootAckCounter {
    pub time: i32,
    pub amount: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::GOTO_ACK)]
pub struct GotoAck {
    pub time: i32,
    pub unknown: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::AOE_ACK)]
pub struct AoeAck {
    pub time: i32,
    pub position: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PLAYER_TEXT)]
pub struct PlayerText {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::PLAYER_SHOOT)]
pub struct PlayerShoot {
    pub time: i32,
    pub bullet_id: u8,
    pub container_type: i32,
    pub starting_pos: Location,
    pub angle: f32,
    pub speed_mult: f32,
    pub life_mult: f32,
    pub is_burst: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::ENEMY_HIT)]
pub struct EnemyHit {
    pub time: i32,
    pub bullet_id: u16,
    pub source_id: i32,
    pub target_id: i32,
    pub killed: bool,
    pub owner_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::OTHER_HIT)]
pub struct OtherHit {
    pub time: i32,
    pub bullet_id: u16,
    pub object_id: i32,
    pub target_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PLAYER_HIT)]
pub struct PlayerHit {
    pub bullet_id: i32,
    pub object_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::SQUARE_HIT)]
pub struct SquareHit {
    pub time: i32,
    pub bullet_id: u16,
    pub object_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::GROUND_DAMAGE)]
pub struct GroundDamage {
    pub time: i32,
    pub position: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::USE_PORTAL)]
pub struct UsePortal {
    pub object_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::TELEPORT)]
pub struct Teleport {
    pub object_id: i32,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::ESCAPE)]
pub struct Escape;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::GOTO_QUEST_ROOM)]
pub struct GotoQuestRoom;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CHECK_CREDITS)]
pub struct CheckCredits;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::QUEST_FETCH_ASK)]
pub struct QuestFetchAsk;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::QUEUE_CANCEL)]
pub struct QueueCancel;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CANCEL_TRADE)]
pub struct CancelTrade;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::UNSEASON_REQUEST)]
pub struct UnseasonRequest;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::USE_ITEM)]
pub struct UseItem {
    pub time: i32,
    pub slot_object: SlotObject,
    pub item_use_pos: Location,
    pub use_type: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::INVENTORY_SWAP)]
pub struct InventorySwap {
    pub time: i32,
    pub position: Location,
    pub slot_object1: SlotObject,
    pub slot_object2: SlotObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::INVENTORY_DROP)]
pub struct InventoryDrop {
    pub slot: SlotObject,
    pub unknown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::REQUEST_TRADE)]
pub struct RequestTrade {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CHANGE_TRADE)]
pub struct ChangeTrade {
    pub offers: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::ACCEPT_TRADE)]
pub struct AcceptTrade {
    pub my_offers: Vec<bool>,
    pub your_offers: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CHOOSE_NAME)]
pub struct ChooseName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CREATE_GUILD)]
pub struct CreateGuild {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::GUILD_REMOVE)]
pub struct GuildRemove {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::GUILD_INVITE)]
pub struct GuildInvite {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::JOIN_GUILD)]
pub struct JoinGuild {
    pub guild_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CHANGE_GUILD_RANK)]
pub struct ChangeGuildRank {
    pub name: String,
    pub guild_rank: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::EDIT_ACCOUNT_LIST)]
pub struct EditAccountList {
    pub account_list_id: i32,
    pub add: bool,
    pub object_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::BUY)]
pub struct Buy {
    pub object_id: i32,
    pub quantity: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::KEY_INFO_REQUEST)]
pub struct KeyInfoRequest {
    pub item_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CLAIM_DAILY_REWARD)]
pub struct ClaimDailyReward {
    pub claim_key: String,
    pub claim_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::QUEST_REDEEM)]
pub struct QuestRedeem {
    pub quest_id: String,
    pub slots: Vec<QuestRedeemSlot>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::SET_CONDITION)]
pub struct SetCondition {
    pub condition_effect: u8,
    pub condition_duration: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::RESKIN)]
pub struct Reskin {
    pub skin_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CHANGE_ALLY_SHOOT)]
pub struct ChangeAllyShoot {
    pub setting: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::FORGE_REQUEST)]
pub struct ForgeRequest {
    pub forge_target_item: i32,
    #[wire(len = i32)]
    pub dismantle_slots: Vec<SlotObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::ACTIVE_PET_UPDATE_REQUEST)]
pub struct ActivePetUpdateRequest {
    pub command_id: u8,
    pub pet_id: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PET_UPGRADE_REQUEST)]
pub struct PetUpgradeRequest {
    pub pet_trans_type: u8,
    pub pet_id1: i32,
    pub pet_id2: i32,
    pub object_id: i32,
    pub object_slot: i32,
    pub payment_trans_type: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CHANGE_PET_SKIN)]
pub struct ChangePetSkin {
    pub pet_id: i32,
    pub skin_type: i32,
    pub currency: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::FAVOR_PET)]
pub struct FavorPet {
    pub pet_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::REDEEM_EXALTATION_REWARD)]
pub struct RedeemExaltationReward {
    pub class_id: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::PLAYER_CALLOUT)]
pub struct PlayerCallout {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::BUY_REFINEMENT)]
pub struct BuyRefinement {
    pub slot: SlotObject,
    pub action: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::START_USE)]
pub struct StartUse {
    pub time: i32,
    pub start: Location,
    pub end: Location,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::END_USE)]
pub struct EndUse {
    pub time: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::BUY_ITEM)]
pub struct BuyItem {
    pub item_ids: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::SKIN_RECYCLE)]
pub struct SkinRecycle {
    pub item: SlotObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CLAIM_BP_MILESTONE)]
pub struct ClaimBpMilestone {
    pub reward_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::BOOST_BP_MILESTONE)]
pub struct BoostBpMilestone {
    pub milestone_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::RETITLE)]
pub struct Retitle {
    pub prefix: i32,
    pub suffix: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::SET_ABILITY)]
pub struct SetAbility {
    pub ability_id: i32,
    pub status: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::EMOTE)]
pub struct Emote {
    pub emote_id: i32,
    pub time: i32,
    pub unknown: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::BUY_EMOTE)]
pub struct BuyEmote {
    pub emote_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CLAIM_MISSION)]
pub struct ClaimMission {
    pub mission_id: i32,
    pub mission_type: u8,
    pub category: u8,
    pub sub_category: u16,
}

/// Opens a party listing; travels under the party-action alias
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_ACTION)]
pub struct PartyCreate {
    pub description: String,
    pub power_level_min: u16,
    pub party_size_max: u8,
    pub activity: u8,
    pub stats_maxed_min: u8,
    pub privacy: u8,
    pub server_index: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_JOIN_REQUEST)]
pub struct PartyJoinRequest {
    pub player_id: u32,
    pub unknown: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_INVITE_RESPONSE)]
pub struct PartyInviteResponse {
    pub party_id: u32,
    pub accept: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_ACTION_RESULT)]
pub struct PartyActionResult {
    pub player_id: u16,
    pub action_id: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::{PacketReader, PacketWriter};

    fn encode<R: Record>(record: &R) -> Vec<u8> {
        let mut writer = PacketWriter::new();
        record.encode(&mut writer).unwrap();
        writer.into_bytes().to_vec()
    }

    #[test]
    fn test_hello_layout() {
        let hello = Hello {
            game_id: GAME_ID_NEXUS,
            build_version: "1.0".into(),
            access_token: "tok".into(),
            key_time: -1,
            key: Vec::new(),
            game_net: "rotmg".into(),
            play_platform: "rotmg".into(),
            platform_token: String::new(),
            client_token: "ct".into(),
            client_identification: String::new(),
        };
        let bytes = encode(&hello);
        assert_eq!(&bytes[..4], &(-2i32).to_be_bytes());
        assert_eq!(&bytes[4..9], &[0, 3, b'1', b'.', b'0']);

        let decoded = Hello::decode(&mut PacketReader::new(&bytes)).unwrap();
        assert_eq!(decoded, hello);
    }

    #[test]
    fn test_move_layout() {
        let report = Move {
            tick_id: 3,
            time: 1500,
            records: vec![LocationRecord {
                time: 1450,
                position: Location::new(1.0, 2.0),
            }],
        };
        let bytes = encode(&report);
        // tick + time + i16 count + one 12-byte record
        assert_eq!(bytes.len(), 4 + 4 + 2 + 12);
        assert_eq!(&bytes[8..10], &[0, 1]);
    }

    #[test]
    fn test_forge_request_uses_i32_count() {
        let request = ForgeRequest {
            forge_target_item: 1,
            dismantle_slots: vec![SlotObject::default()],
        };
        let bytes = encode(&request);
        assert_eq!(&bytes[4..8], &[0, 0, 0, 1]);
    }

    #[test]
    fn test_party_records_use_aliased_kinds() {
        assert_eq!(PartyCreate::KIND, 251);
        assert_eq!(PartyJoinRequest::KIND, 252);
        assert_eq!(PartyInviteResponse::KIND, 253);
        assert_eq!(PartyActionResult::KIND, 254);
    }

    #[test]
    fn test_unit_records_are_empty() {
        assert!(encode(&UpdateAck).is_empty());
        assert!(encode(&Escape).is_empty());
        assert_eq!(UpdateAck::NAME, "UpdateAck");
    }
}
