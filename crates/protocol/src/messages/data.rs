//! Data objects embedded in records

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::codec::{PacketReader, PacketWriter};
use crate::error::CodecResult;
use crate::Wire;

/// World position in tiles
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Wire)]
pub struct Location {
    pub x: f32,
    pub y: f32,
}

impl Location {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance_squared_to(&self, other: &Location) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        dx * dx + dy * dy
    }

    pub fn distance_to(&self, other: &Location) -> f32 {
        self.distance_squared_to(other).sqrt()
    }

    /// Angle from `self` towards `other`, in radians
    pub fn angle_to(&self, other: &Location) -> f32 {
        (other.y - self.y).atan2(other.x - self.x)
    }

    /// Point `distance` tiles away along `angle`
    pub fn position_in_direction(&self, angle: f32, distance: f32) -> Location {
        Location::new(
            self.x + angle.cos() * distance,
            self.y + angle.sin() * distance,
        )
    }
}

/// Timestamped position sample carried by `Move`
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, Wire)]
pub struct LocationRecord {
    pub time: i32,
    pub position: Location,
}

/// Inventory slot reference
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct SlotObject {
    pub object_id: i32,
    pub slot_id: i32,
    pub object_type: i32,
}

/// Slot reference with a compressed slot id, used by forge and inventory results
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct CompactSlotObject {
    pub object_id: i32,
    #[wire(compressed)]
    pub slot_id: i32,
    pub object_type: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct Tile {
    pub x: i16,
    pub y: i16,
    pub tile_type: u16,
}

/// Item offered in a trade
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct Item {
    pub item: i32,
    pub slot_type: i32,
    pub tradable: bool,
    pub included: bool,
    pub item_data: String,
}

/// Colour packed as `0xAARRGGBB`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Argb {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Argb {
    /// Opaque black
    pub const OPAQUE: Argb = Argb::from_u32(0xFF00_0000);

    pub const fn from_u32(value: u32) -> Self {
        Self {
            a: (value >> 24) as u8,
            r: (value >> 16) as u8,
            g: (value >> 8) as u8,
            b: value as u8,
        }
    }

    pub const fn to_u32(self) -> u32 {
        (self.a as u32) << 24 | (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

impl Wire for Argb {
    fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        Ok(Argb::from_u32(reader.read_u32()?))
    }

    fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_u32(self.to_u32());
        Ok(())
    }
}

/// Stat ids
pub mod stat {
    pub const MAX_HP: u8 = 0;
    pub const HP: u8 = 1;
    pub const SIZE: u8 = 2;
    pub const MAX_MP: u8 = 3;
    pub const MP: u8 = 4;
    pub const NEXT_LEVEL_EXP: u8 = 5;
    pub const EXP: u8 = 6;
    pub const LEVEL: u8 = 7;
    pub const INVENTORY_0: u8 = 8;
    pub const INVENTORY_11: u8 = 19;
    pub const ATTACK: u8 = 20;
    pub const DEFENSE: u8 = 21;
    pub const SPEED: u8 = 22;
    pub const VITALITY: u8 = 26;
    pub const WISDOM: u8 = 27;
    pub const DEXTERITY: u8 = 28;
    pub const EFFECTS: u8 = 29;
    pub const STARS: u8 = 30;
    pub const NAME: u8 = 31;
    pub const TEXTURE_1: u8 = 32;
    pub const TEXTURE_2: u8 = 33;
    pub const CREDITS: u8 = 35;
    pub const ACCOUNT_ID: u8 = 38;
    pub const ACCOUNT_FAME: u8 = 39;
    pub const CHARACTER_FAME: u8 = 57;
    pub const GUILD_NAME: u8 = 62;
    pub const GUILD_RANK: u8 = 63;
    pub const HEALTH_POTION_COUNT: u8 = 69;
    pub const MAGIC_POTION_COUNT: u8 = 70;
    pub const PET_NAME: u8 = 82;
    pub const EFFECTS_2: u8 = 96;
    pub const GRAVE_ACCOUNT_ID: u8 = 115;
    pub const BACKPACK_SLOTS: u8 = 130;

    /// Stats carried as a string rather than a compressed integer
    pub fn is_text(id: u8) -> bool {
        matches!(
            id,
            EXP | NAME | ACCOUNT_ID | GUILD_NAME | PET_NAME | GRAVE_ACCOUNT_ID | 71 | 72 | 80 | 127
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatValue {
    Int(i32),
    Text(String),
}

/// One stat update; the value encoding depends on the stat id
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatData {
    pub stat_type: u8,
    pub value: StatValue,
    pub secondary: u8,
}

impl StatData {
    pub fn int(&self) -> Option<i32> {
        match self.value {
            StatValue::Int(value) => Some(value),
            StatValue::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.value {
            StatValue::Text(value) => Some(value),
            StatValue::Int(_) => None,
        }
    }
}

impl Wire for StatData {
    fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
        let stat_type = reader.read_u8()?;
        let value = if stat::is_text(stat_type) {
            StatValue::Text(reader.read_string()?)
        } else {
            StatValue::Int(reader.read_compressed_int()?)
        };
        let secondary = reader.read_u8()?;
        Ok(Self {
            stat_type,
            value,
            secondary,
        })
    }

    fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
        writer.write_u8(self.stat_type);
        match &self.value {
            StatValue::Text(value) => writer.write_string(value)?,
            StatValue::Int(value) => writer.write_compressed_int(*value),
        }
        writer.write_u8(self.secondary);
        Ok(())
    }
}

/// Object state snapshot: id, position and changed stats
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Wire)]
pub struct Status {
    pub object_id: i32,
    pub position: Location,
    pub stats: Vec<StatData>,
}

/// Newly visible object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Wire)]
pub struct Entity {
    pub object_type: u16,
    pub status: Status,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct PartyPlayer {
    pub name: String,
    pub object_id: i32,
    pub level: i16,
    pub class: i16,
}

/// Player listed in `IncomingPartyMemberInfo`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct PartyMember {
    pub name: String,
    pub object_id: i32,
    pub class_type: i32,
}

/// Party listing entry; `activity` is 0 dungeons, 1 realms, 2 other and
/// `privacy` is 0 public, 1 private
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct PartyInfo {
    pub id: i32,
    pub players: Vec<PartyPlayer>,
    pub leader: i32,
    pub activity: u8,
    pub privacy: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct QuestData {
    pub id: String,
    pub name: String,
    pub description: String,
    pub expiration: String,
    pub weight: i32,
    pub category: i32,
    pub requirements: Vec<i32>,
    pub rewards: Vec<i32>,
    pub completed: bool,
    pub item_of_choice: bool,
    pub repeatable: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Wire)]
pub struct QuestRedeemSlot {
    pub slot: i32,
    pub item: i32,
}

bitflags! {
    /// Flags byte of `Damage`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DamageFlags: u8 {
        const KILLED = 1;
        const ARMOR_PIERCE = 2;
        const LASER = 4;
    }
}

bitflags! {
    /// Which optional fields follow in `ShowEffect`
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct EffectFields: u8 {
        const COLOR = 1;
        const POS1_X = 2;
        const POS1_Y = 4;
        const POS2_X = 8;
        const POS2_Y = 16;
        const DURATION = 32;
        const TARGET_ID = 64;
        const UNKNOWN = 128;
    }
}

macro_rules! impl_wire_flags {
    ($($ty:ty),*) => {
        $(
            impl Wire for $ty {
                fn decode(reader: &mut PacketReader<'_>) -> CodecResult<Self> {
                    Ok(<$ty>::from_bits_retain(reader.read_u8()?))
                }

                fn encode(&self, writer: &mut PacketWriter) -> CodecResult<()> {
                    writer.write_u8(self.bits());
                    Ok(())
                }
            }
        )*
    };
}

impl_wire_flags!(DamageFlags, EffectFields);
