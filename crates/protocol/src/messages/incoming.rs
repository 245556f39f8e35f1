//! Records sent by the server

use serde::{Deserialize, Serialize};

use super::data::*;
use super::kinds;
use crate::codec::{PacketReader, PacketWriter};
use crate::error::CodecResult;
use crate::{Record, Wire};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::FAILURE)]
pub struct Failure {
    pub error_id: i32,
    pub error_message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::DELETE_PET)]
pub struct DeletePet {
    pub pet_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::QUEST_FETCH_RESPONSE)]
pub struct QuestFetchResponse {
    pub quests: Vec<QuestData>,
    pub next_refresh_price: i16,
}

/// Time-sync request, answered with `Pong`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PING)]
pub struct Ping {
    pub serial: i32,
}

/// One server tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::NEW_TICK)]
pub struct NewTick {
    pub tick_id: i32,
    pub tick_time: i32,
    pub server_real_time_ms: i32,
    pub server_last_rtt_ms: u16,
    pub statuses: Vec<Status>,
}

/// Visual effect
///
/// Every field after the effect type is optional and announced by a bit in
/// `fields`; absent fields keep their defaults (duration 1.0, unknown 100,
/// opaque black).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShowEffect {
    pub effect_type: u8,
    pub fields: EffectFields,
    pub target_id: i32,
    pub pos1: Location,
    pub pos2: Location,
    pub color: Argb,
    pub duration: f32,
    pub unknown: u8,
}

impl Default for ShowEffect {
    fn default() -> Self {
        Self {
            effect_type: 0,
            fields: EffectFields::empty(),
            target_id: 0,
            pos1: Location::default(),
            pos2: Location::default(),
            color: Argb::OPAQUE,
            duration: 1.0,
            unknown: 100,
        }
    }
}

impl Record for ShowEffect {
    const KIND: u8 = kinds::SHOW_EFFECT;
    const NAME: &'static str = "ShowEffect";

    fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        let mut effect = ShowEffect {
            effect_type: reader.read_u8()?,
            fields: EffectFields::decode(reader)?,
            ..ShowEffect::default()
        };
        let fields = effect.fields;

        if fields.contains(EffectFields::TARGET_ID) {
            effect.target_id = reader.read_compressed_int()?;
        }
        if fields.contains(EffectFields::POS1_X) {
            effect.pos1.x = reader.read_f32()?;
        }
        if fields.contains(EffectFields::POS1_Y) {
            effect.pos1.y = reader.read_f32()?;
        }
        if fields.contains(EffectFields::POS2_X) {
            effect.pos2.x = reader.read_f32()?;
        }
        if fields.contains(EffectFields::POS2_Y) {
            effect.pos2.y = reader.read_f32()?;
        }
        if fields.contains(EffectFields::COLOR) {
            effect.color = Argb::decode(reader)?;
        }
        if fields.contains(EffectFields::DURATION) {
            effect.duration = reader.read_f32()?;
        }
        if fields.contains(EffectFields::UNKNOWN) {
            effect.unknown = reader.read_u8()?;
        }
        Ok(effect)
    }

    fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        let fields = self.fields;
        writer.write_u8(self.effect_type);
        fields.encode(writer)?;

        if fields.contains(EffectFields::TARGET_ID) {
            writer.write_compressed_int(self.target_id);
        }
        if fields.contains(EffectFields::POS1_X) {
            writer.write_f32(self.pos1.x);
        }
        if fields.contains(EffectFields::POS1_Y) {
            writer.write_f32(self.pos1.y);
        }
        if fields.contains(EffectFields::POS2_X) {
            writer.write_f32(self.pos2.x);
        }
        if fields.contains(EffectFields::POS2_Y) {
            writer.write_f32(self.pos2.y);
        }
        if fields.contains(EffectFields::COLOR) {
            self.color.encode(writer)?;
        }
        if fields.contains(EffectFields::DURATION) {
            writer.write_f32(self.duration);
        }
        if fields.contains(EffectFields::UNKNOWN) {
            writer.write_u8(self.unknown);
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::SERVER_PLAYER_SHOOT)]
pub struct ServerPlayerShoot {
    pub bullet_id: i32,
    pub owner_id: i32,
    pub container_type: i32,
    pub starting_pos: Location,
    pub angle: f32,
    pub damage: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::TRADE_ACCEPTED)]
pub struct TradeAccepted {
    pub my_offers: Vec<bool>,
    pub your_offers: Vec<bool>,
}

/// Server-driven position change, acknowledged with `GotoAck`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::GOTO)]
pub struct Goto {
    pub object_id: i32,
    pub location: Location,
    pub unknown: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::NAME_RESULT)]
pub struct NameResult {
    pub success: bool,
    pub error_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::BUY_RESULT)]
pub struct BuyResult {
    pub result: i32,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::HATCH_PET)]
pub struct HatchPet {
    pub pet_name: String,
    pub pet_skin_id: i32,
    pub item_type: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::GUILD_RESULT)]
pub struct GuildResult {
    pub success: bool,
    pub error_text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::TRADE_CHANGED)]
pub struct TradeChanged {
    pub offers: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::TRADE_DONE)]
pub struct TradeDone {
    pub code: i32,
    pub description: String,
}

/// Enemy projectile; older servers omit the burst fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::ENEMY_SHOOT)]
pub struct EnemyShoot {
    pub bullet_id: u16,
    pub owner_id: i32,
    pub bullet_type: u8,
    pub location: Location,
    pub angle: f32,
    pub damage: i16,
    #[wire(default = 1)]
    pub num_shots: u8,
    #[wire(default = 0.0)]
    pub angle_inc: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PLAY_SOUND)]
pub struct PlaySound {
    pub owner_id: i32,
    pub sound_id: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::NEW_ABILITY)]
pub struct NewAbility {
    pub ability_type: i32,
}

/// Visible world delta: tiles, new objects and objects that left view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::UPDATE)]
pub struct Update {
    pub player_position: Location,
    pub unknown: u8,
    pub tiles: Vec<Tile>,
    pub new_objects: Vec<Entity>,
    pub drops: Vec<i32>,
}

/// Chat line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::TEXT)]
pub struct Text {
    pub name: String,
    pub object_id: i32,
    pub num_stars: i16,
    pub bubble_time: u8,
    pub recipient: String,
    pub raw_text: String,
    pub clean_text: String,
    pub is_supporter: bool,
    pub star_bg: i32,
}

/// Directive to reconnect elsewhere with new key material
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::RECONNECT)]
pub struct Reconnect {
    pub name: String,
    pub host: String,
    pub port: u16,
    pub game_id: i32,
    pub key_time: i32,
    pub key: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::DEATH)]
pub struct Death {
    pub account_id: String,
    #[wire(compressed)]
    pub char_id: i32,
    pub killed_by: String,
    pub unknown1: i32,
    pub unknown2: i16,
    pub stats: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::ALLY_SHOOT)]
pub struct AllyShoot {
    pub bullet_id: i32,
    pub owner_id: i32,
    pub container_type: i32,
    pub starting_pos: Location,
    pub angle: f32,
    pub damage: i16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::RESET_DAILY_QUESTS)]
pub struct ResetDailyQuests;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::KEY_INFO_RESPONSE)]
pub struct KeyInfoResponse {
    #[wire(len = i32)]
    pub name: String,
    #[wire(len = i32)]
    pub description: String,
    #[wire(len = i32)]
    pub creator: String,
}

/// Area-of-effect hit, acknowledged with `AoeAck`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::AOE)]
pub struct Aoe {
    pub location: Location,
    pub radius: f32,
    pub damage: u16,
    pub effect: u8,
    pub effect_duration: f32,
    pub origin_type: u16,
    pub color: i32,
    pub armor_pierce: bool,
}

/// Notification type carrying an object-bound message
pub const NOTIFICATION_OBJECT: u8 = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct ObjectNotification {
    pub message: String,
    pub object_id: i32,
    pub color: i32,
}

/// On-screen notification; only the object type carries a body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub notification_type: u8,
    pub extra: u8,
    pub object: Option<ObjectNotification>,
}

impl Record for Notification {
    const KIND: u8 = kinds::NOTIFICATION;
    const NAME: &'static str = "Notification";

    fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        let notification_type = reader.read_u8()?;
        let extra = reader.read_u8()?;
        let object = if notification_type == NOTIFICATION_OBJECT {
            Some(ObjectNotification::decode(reader)?)
        } else {
            None
        };
        Ok(Self {
            notification_type,
            extra,
            object,
        })
    }

    fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_u8(self.notification_type);
        writer.write_u8(self.extra);
        if self.notification_type == NOTIFICATION_OBJECT {
            match &self.object {
                Some(object) => object.encode(writer)?,
                None => ObjectNotification::default().encode(writer)?,
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CLIENT_STAT)]
pub struct ClientStat {
    pub name: String,
    pub value: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::DAMAGE)]
pub struct Damage {
    pub target_id: i32,
    #[wire(len = u8)]
    pub effects: Vec<u8>,
    pub damage_amount: u16,
    pub flags: DamageFlags,
    pub bullet_id: u16,
    pub object_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::ACTIVE_PET)]
pub struct ActivePet {
    pub pet_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::INVITED_TO_GUILD)]
pub struct InvitedToGuild {
    pub name: String,
    pub guild_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PET_YARD_UPDATE)]
pub struct PetYardUpdate {
    pub type_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PASSWORD_PROMPT)]
pub struct PasswordPrompt {
    pub clean_password_status: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::QUEST_OBJECT_ID)]
pub struct QuestObjectId {
    pub object_id: i32,
    #[wire(len = compressed, compressed)]
    pub unknown_ints: Vec<i32>,
}

/// Raw image bytes, the rest of the payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PIC)]
pub struct Pic {
    #[wire(rest)]
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::HERO_LEFT)]
pub struct HeroLeft;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::TRADE_START)]
pub struct TradeStart {
    pub my_items: Vec<Item>,
    pub your_name: String,
    pub your_items: Vec<Item>,
    pub partner_object_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::EVOLVED_PET)]
pub struct EvolvedPet {
    pub pet_id: i32,
    pub initial_skin: i32,
    pub final_skin: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::TRADE_REQUESTED)]
pub struct TradeRequested {
    pub name: String,
}

/// Map description, sent once per connection after `Hello`
///
/// Everything after `server_version` was appended by later protocol
/// revisions and is read only when the payload still has room for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::MAP_INFO)]
pub struct MapInfo {
    pub width: i32,
    pub height: i32,
    pub name: String,
    pub display_name: String,
    pub realm_name: String,
    pub seed: i32,
    pub background: i32,
    pub difficulty: f32,
    pub allow_player_teleport: bool,
    pub no_save: bool,
    pub show_displays: bool,
    pub max_players: i16,
    pub game_opened_time: i32,
    pub server_version: String,
    #[wire(min_remaining = 4)]
    pub bg_color: Option<i32>,
    #[wire(trailing)]
    pub view_radius: Option<u8>,
    #[wire(trailing)]
    pub dungeon_modifiers: Option<String>,
    #[wire(trailing)]
    pub dungeon_modifiers2: Option<String>,
    #[wire(trailing)]
    pub dungeon_modifiers3: Option<String>,
    #[wire(trailing)]
    pub unknown: Option<i16>,
    #[wire(min_remaining = 8)]
    pub max_realm_score: Option<i32>,
    #[wire(min_remaining = 4)]
    pub current_realm_score: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::INVENTORY_RESULT)]
pub struct InventoryResult {
    pub result: bool,
    pub unknown: u8,
    pub slot_object1: CompactSlotObject,
    pub slot_object2: CompactSlotObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::QUEST_REDEEM_RESPONSE)]
pub struct QuestRedeemResponse {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::ACCOUNT_LIST)]
pub struct AccountList {
    pub account_list_id: i32,
    pub account_ids: Vec<String>,
    pub lock_action: i32,
}

/// Character is in the world; carries the player's object id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CREATE_SUCCESS)]
pub struct CreateSuccess {
    pub object_id: i32,
    pub char_id: i32,
    pub stats: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::FILE)]
pub struct File {
    pub name: String,
    #[wire(len = i32)]
    pub contents: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::UNLOCK_CUSTOMIZATION)]
pub struct UnlockCustomization {
    pub unlock_type: u8,
    pub skin_type: u8,
    pub item_type: i32,
    pub cost_type: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::NEW_CHARACTER_INFORMATION)]
pub struct NewCharacterInformation {
    pub character_xml: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::UNLOCK_NEW_SLOT)]
pub struct UnlockNewSlot {
    pub unlock_type: i32,
}

/// Login queue position
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::QUEUE)]
pub struct Queue {
    pub current_position: u16,
    pub max_position: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::EXALTATION_BONUS_CHANGED)]
pub struct ExaltationBonusChanged;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::VAULT_CONTENT)]
pub struct VaultContent {
    pub last_vault_update: bool,
    #[wire(compressed)]
    pub vault_chest_id: i32,
    #[wire(compressed)]
    pub material_chest_id: i32,
    #[wire(compressed)]
    pub gift_chest_id: i32,
    #[wire(compressed)]
    pub potion_storage_id: i32,
    #[wire(compressed)]
    pub seasonal_spoil_id: i32,
    #[wire(len = compressed, compressed)]
    pub vault_contents: Vec<i32>,
    #[wire(len = compressed, compressed)]
    pub material_contents: Vec<i32>,
    #[wire(len = compressed, compressed)]
    pub gift_contents: Vec<i32>,
    #[wire(len = compressed, compressed)]
    pub potion_contents: Vec<i32>,
    #[wire(len = compressed, compressed)]
    pub seasonal_spoil_contents: Vec<i32>,
    pub vault_upgrade_cost: i16,
    pub material_upgrade_cost: i16,
    pub potion_upgrade_cost: i16,
    pub current_potion_max: i16,
    pub next_potion_max: i16,
    pub vault_chest_enchants: String,
    pub gift_chest_enchants: String,
    pub spoils_chest_enchants: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::FORGE_RESULT)]
pub struct ForgeResult {
    pub success: bool,
    #[wire(len = u8)]
    pub dismantled_slots: Vec<CompactSlotObject>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::FORGE_UNLOCKED_BLUEPRINTS)]
pub struct ForgeUnlockedBlueprints {
    pub success: bool,
    #[wire(rest)]
    pub unknown: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PLAYERS_LIST)]
pub struct PlayersList {
    pub players: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::REFINE_RESULT)]
pub struct RefineResult {
    pub success: bool,
    pub slot: SlotObject,
    pub key_mods: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::BUY_ITEM_RESULT)]
pub struct BuyItemResult {
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::DRAW_DEBUG_SHAPE)]
pub struct DrawDebugShape {
    pub id: u32,
    pub location: Location,
    pub shape_type: u8,
    pub lifetime: f32,
    pub color: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Record)]
#[kind(kinds::DRAW_DEBUG_ARROW)]
pub struct DrawDebugArrow {
    pub id: u32,
    pub start: Location,
    pub end: Location,
    pub lifetime: f32,
    pub color: f32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::SKIN_RECYCLE_RESPONSE)]
pub struct SkinRecycleResponse {
    pub success: bool,
    pub item: SlotObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CLAIM_BP_MILESTONE_RESULT)]
pub struct ClaimBpMilestoneResult {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::BOOST_BP_MILESTONE_RESULT)]
pub struct BoostBpMilestoneResult {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::MISSION_PROGRESS_UPDATE)]
pub struct MissionProgressUpdate {
    pub mission_id: i32,
    pub progress: i32,
    pub objectives: Vec<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CLAIM_MISSION_RESULT)]
pub struct ClaimMissionResult {
    pub mission_type: u8,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::MULTIPLE_MISSIONS_PROGRESS_UPDATE)]
pub struct MultipleMissionsProgressUpdate {
    pub data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::REALM_SCORE_UPDATE)]
pub struct RealmScoreUpdate {
    pub score: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::CRUCIBLE_RESULT)]
pub struct CrucibleResult {
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_LIST_MESSAGE)]
pub struct PartyList {
    pub packet_number: u8,
    pub parties: Vec<PartyInfo>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_JOIN_RESPONSE)]
pub struct PartyJoinResponse {
    pub server_ip_host: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::INCOMING_PARTY_MEMBER_INFO)]
pub struct IncomingPartyMemberInfo {
    pub party_id: u32,
    pub unknown: u16,
    pub max_size: u8,
    pub players: Vec<PartyMember>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::INCOMING_PARTY_INVITE)]
pub struct IncomingPartyInvite {
    pub party_id: u32,
    pub inviter_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_MEMBER_ADDED)]
pub struct PartyMemberAdded {
    pub player_id: u16,
    pub name: String,
    pub class_id: u16,
    pub skin_id: u16,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_JOIN_REQUEST_RESPONSE)]
pub struct PartyJoinRequestResponse {
    pub name: String,
    pub class_id: u16,
    pub skin_id: u16,
    pub state: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Record)]
#[kind(kinds::PARTY_ACTION)]
pub struct PartyAction {
    pub player_id: u16,
    pub action_id: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode<R: Record>(record: &R) -> Vec<u8> {
        let mut writer = PacketWriter::new();
        record.encode(&mut writer).unwrap();
        writer.into_bytes().to_vec()
    }

    fn decode<R: Record>(bytes: &[u8]) -> (R, usize) {
        let mut reader = PacketReader::new(bytes);
        let record = R::decode(&mut reader).unwrap();
        (record, reader.remaining())
    }

    fn enemy_shoot_prefix() -> PacketWriter {
        let mut writer = PacketWriter::new();
        writer.write_u16(12);
        writer.write_i32(900);
        writer.write_u8(2);
        writer.write_f32(10.5);
        writer.write_f32(20.5);
        writer.write_f32(1.25);
        writer.write_i16(75);
        writer
    }

    #[test]
    fn test_enemy_shoot_without_burst_fields() {
        let bytes = enemy_shoot_prefix().into_bytes();
        let (shot, left): (EnemyShoot, _) = decode(&bytes);
        assert_eq!(shot.bullet_id, 12);
        assert_eq!(shot.location, Location::new(10.5, 20.5));
        assert_eq!(shot.num_shots, 1);
        assert_eq!(shot.angle_inc, 0.0);
        assert_eq!(left, 0);
    }

    #[test]
    fn test_enemy_shoot_with_burst_fields() {
        let mut writer = enemy_shoot_prefix();
        writer.write_u8(5);
        writer.write_f32(0.5);
        let bytes = writer.into_bytes();

        let (shot, left): (EnemyShoot, _) = decode(&bytes);
        assert_eq!(shot.num_shots, 5);
        assert_eq!(shot.angle_inc, 0.5);
        assert_eq!(left, 0);
        assert_eq!(encode(&shot), bytes.to_vec());
    }

    #[test]
    fn test_show_effect_defaults_and_flags() {
        let mut writer = PacketWriter::new();
        writer.write_u8(4);
        writer.write_u8((EffectFields::TARGET_ID | EffectFields::POS1_X).bits());
        writer.write_compressed_int(4001);
        writer.write_f32(3.5);
        let bytes = writer.into_bytes();

        let (effect, left): (ShowEffect, _) = decode(&bytes);
        assert_eq!(left, 0);
        assert_eq!(effect.effect_type, 4);
        assert_eq!(effect.target_id, 4001);
        assert_eq!(effect.pos1, Location::new(3.5, 0.0));
        assert_eq!(effect.duration, 1.0);
        assert_eq!(effect.unknown, 100);
        assert_eq!(effect.color, Argb::OPAQUE);
        assert_eq!(encode(&effect), bytes.to_vec());
    }

    #[test]
    fn test_notification_body_only_for_object_type() {
        let (plain, left): (Notification, _) = decode(&[1, 0, 0xAA]);
        assert_eq!(plain.object, None);
        assert_eq!(left, 1);

        let record = Notification {
            notification_type: NOTIFICATION_OBJECT,
            extra: 0,
            object: Some(ObjectNotification {
                message: "Level up!".into(),
                object_id: 3,
                color: 0x00FF00,
            }),
        };
        let bytes = encode(&record);
        let (decoded, left): (Notification, _) = decode(&bytes);
        assert_eq!(decoded, record);
        assert_eq!(left, 0);
    }

    fn map_info_base() -> MapInfo {
        MapInfo {
            width: 256,
            height: 256,
            name: "Nexus".into(),
            display_name: "{s.nexus}".into(),
            realm_name: String::new(),
            seed: 99,
            background: 0,
            difficulty: 0.0,
            allow_player_teleport: false,
            no_save: false,
            show_displays: true,
            max_players: 85,
            game_opened_time: 0,
            server_version: "X31.2.1".into(),
            bg_color: None,
            view_radius: None,
            dungeon_modifiers: None,
            dungeon_modifiers2: None,
            dungeon_modifiers3: None,
            unknown: None,
            max_realm_score: None,
            current_realm_score: None,
        }
    }

    #[test]
    fn test_map_info_old_layout() {
        let info = map_info_base();
        let bytes = encode(&info);
        let (decoded, left): (MapInfo, _) = decode(&bytes);
        assert_eq!(decoded, info);
        assert_eq!(left, 0);
    }

    #[test]
    fn test_map_info_full_layout() {
        let info = MapInfo {
            bg_color: Some(0x112233),
            view_radius: Some(15),
            dungeon_modifiers: Some("a".into()),
            dungeon_modifiers2: Some(String::new()),
            dungeon_modifiers3: Some(String::new()),
            unknown: Some(0),
            max_realm_score: Some(1000),
            current_realm_score: Some(250),
            ..map_info_base()
        };
        let (decoded, left): (MapInfo, _) = decode(&encode(&info));
        assert_eq!(decoded, info);
        assert_eq!(left, 0);
    }

    #[test]
    fn test_map_info_short_tail_is_not_read() {
        let mut bytes = encode(&map_info_base());
        // One trailing byte cannot hold the background colour
        bytes.push(1);
        let (decoded, _): (MapInfo, _) = decode(&bytes);
        assert_eq!(decoded.bg_color, None);
        assert_eq!(decoded.view_radius, Some(1));
        assert_eq!(decoded.dungeon_modifiers, None);
    }

    #[test]
    fn test_reconnect_key_bytes() {
        let reconnect = Reconnect {
            name: "Realm".into(),
            host: "10.0.0.2".into(),
            port: 2050,
            game_id: 7,
            key_time: 1234,
            key: vec![9, 8, 7],
        };
        let bytes = encode(&reconnect);
        assert_eq!(&bytes[bytes.len() - 5..], &[0, 3, 9, 8, 7]);
        assert_eq!(decode::<Reconnect>(&bytes).0, reconnect);
    }

    #[test]
    fn test_quest_object_id_compressed_list() {
        let record = QuestObjectId {
            object_id: 1,
            unknown_ints: vec![1, 200],
        };
        let bytes = encode(&record);
        // i32 + count(1) + 1(1) + 200(2)
        assert_eq!(bytes.len(), 4 + 1 + 1 + 2);
        assert_eq!(decode::<QuestObjectId>(&bytes).0, record);
    }

    #[test]
    fn test_pic_takes_remaining_bytes() {
        let (pic, left): (Pic, _) = decode(&[1, 2, 3, 4]);
        assert_eq!(pic.data, vec![1, 2, 3, 4]);
        assert_eq!(left, 0);
    }

    #[test]
    fn test_unit_record_reads_nothing() {
        let (_, left): (HeroLeft, _) = decode(&[7]);
        assert_eq!(left, 1);
        assert!(encode(&HeroLeft).is_empty());
    }
}
