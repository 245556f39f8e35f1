//! Kind byte table
//!
//! The closed set of kind identifiers the protocol uses. The party family is
//! numbered with negative logical ids on the server; those travel as their
//! two's-complement byte (`-2` is `254`, `-9` is `247`).

macro_rules! kind_table {
    ($($name:ident = $value:expr, $display:literal;)*) => {
        $(pub const $name: u8 = $value;)*

        /// Every known kind, in table order
        pub const ALL: &[u8] = &[$($name),*];

        /// Human-readable name of a kind byte
        pub fn name(kind: u8) -> Option<&'static str> {
            match kind {
                $($name => Some($display),)*
                _ => None,
            }
        }
    };
}

/// Byte carrying a negative logical kind id
const fn alias(logical: i8) -> u8 {
    logical as u8
}

kind_table! {
    FAILURE = 0, "Failure";
    TELEPORT = 1, "Teleport";
    CLAIM_DAILY_REWARD = 3, "ClaimDailyReward";
    DELETE_PET = 4, "DeletePet";
    REQUEST_TRADE = 5, "RequestTrade";
    QUEST_FETCH_RESPONSE = 6, "QuestFetchResponse";
    JOIN_GUILD = 7, "JoinGuild";
    PING = 8, "Ping";
    PLAYER_TEXT = 9, "PlayerText";
    NEW_TICK = 10, "NewTick";
    SHOW_EFFECT = 11, "ShowEffect";
    SERVER_PLAYER_SHOOT = 12, "ServerPlayerShoot";
    USE_ITEM = 13, "UseItem";
    TRADE_ACCEPTED = 14, "TradeAccepted";
    GUILD_REMOVE = 15, "GuildRemove";
    PET_UPGRADE_REQUEST = 16, "PetUpgradeRequest";
    GOTO = 18, "Goto";
    INVENTORY_DROP = 19, "InventoryDrop";
    OTHER_HIT = 20, "OtherHit";
    NAME_RESULT = 21, "NameResult";
    BUY_RESULT = 22, "BuyResult";
    HATCH_PET = 23, "HatchPet";
    ACTIVE_PET_UPDATE_REQUEST = 24, "ActivePetUpdateRequest";
    ENEMY_HIT = 25, "EnemyHit";
    GUILD_RESULT = 26, "GuildResult";
    EDIT_ACCOUNT_LIST = 27, "EditAccountList";
    TRADE_CHANGED = 28, "TradeChanged";
    PLAYER_SHOOT = 30, "PlayerShoot";
    PONG = 31, "Pong";
    CHANGE_PET_SKIN = 33, "ChangePetSkin";
    TRADE_DONE = 34, "TradeDone";
    ENEMY_SHOOT = 35, "EnemyShoot";
    ACCEPT_TRADE = 36, "AcceptTrade";
    CHANGE_GUILD_RANK = 37, "ChangeGuildRank";
    PLAY_SOUND = 38, "PlaySound";
    SQUARE_HIT = 40, "SquareHit";
    NEW_ABILITY = 41, "NewAbility";
    UPDATE = 42, "Update";
    TEXT = 44, "Text";
    RECONNECT = 45, "Reconnect";
    DEATH = 46, "Death";
    USE_PORTAL = 47, "UsePortal";
    GOTO_QUEST_ROOM = 48, "GotoQuestRoom";
    ALLY_SHOOT = 49, "AllyShoot";
    RESKIN = 51, "Reskin";
    RESET_DAILY_QUESTS = 52, "ResetDailyQuests";
    INVENTORY_SWAP = 55, "InventorySwap";
    CHANGE_TRADE = 56, "ChangeTrade";
    CREATE = 57, "Create";
    QUEST_REDEEM = 58, "QuestRedeem";
    CREATE_GUILD = 59, "CreateGuild";
    SET_CONDITION = 60, "SetCondition";
    LOAD = 61, "Load";
    MOVE = 62, "Move";
    KEY_INFO_RESPONSE = 63, "KeyInfoResponse";
    AOE = 64, "Aoe";
    GOTO_ACK = 65, "GotoAck";
    NOTIFICATION = 67, "Notification";
    CLIENT_STAT = 69, "ClientStat";
    HELLO = 74, "Hello";
    DAMAGE = 75, "Damage";
    ACTIVE_PET = 76, "ActivePet";
    INVITED_TO_GUILD = 77, "InvitedToGuild";
    PET_YARD_UPDATE = 78, "PetYardUpdate";
    PASSWORD_PROMPT = 79, "PasswordPrompt";
    UPDATE_ACK = 81, "UpdateAck";
    QUEST_OBJECT_ID = 82, "QuestObjectId";
    PIC = 83, "Pic";
    HERO_LEFT = 84, "HeroLeft";
    BUY = 85, "Buy";
    TRADE_START = 86, "TradeStart";
    EVOLVED_PET = 87, "EvolvedPet";
    TRADE_REQUESTED = 88, "TradeRequested";
    AOE_ACK = 89, "AoeAck";
    PLAYER_HIT = 90, "PlayerHit";
    CANCEL_TRADE = 91, "CancelTrade";
    MAP_INFO = 92, "MapInfo";
    KEY_INFO_REQUEST = 94, "KeyInfoRequest";
    INVENTORY_RESULT = 95, "InventoryResult";
    QUEST_REDEEM_RESPONSE = 96, "QuestRedeemResponse";
    CHOOSE_NAME = 97, "ChooseName";
    QUEST_FETCH_ASK = 98, "QuestFetchAsk";
    ACCOUNT_LIST = 99, "AccountList";
    CREATE_SUCCESS = 101, "CreateSuccess";
    CHECK_CREDITS = 102, "CheckCredits";
    GROUND_DAMAGE = 103, "GroundDamage";
    GUILD_INVITE = 104, "GuildInvite";
    ESCAPE = 105, "Escape";
    FILE = 106, "File";
    UNLOCK_CUSTOMIZATION = 107, "UnlockCustomization";
    NEW_CHARACTER_INFORMATION = 108, "NewCharacterInformation";
    UNLOCK_NEW_SLOT = 109, "UnlockNewSlot";
    QUEUE = 112, "Queue";
    QUEUE_CANCEL = 113, "QueueCancel";
    EXALTATION_BONUS_CHANGED = 114, "ExaltationBonusChanged";
    REDEEM_EXALTATION_REWARD = 115, "RedeemExaltationReward";
    EXALTATION_REDEEM_INFO = 116, "ExaltationRedeemInfo";
    VAULT_CONTENT = 117, "VaultContent";
    FORGE_REQUEST = 118, "ForgeRequest";
    FORGE_RESULT = 119, "ForgeResult";
    FORGE_UNLOCKED_BLUEPRINTS = 120, "ForgeUnlockedBlueprints";
    SHOOT_ACK_COUNTER = 121, "ShootAckCounter";
    CHANGE_ALLY_SHOOT = 122, "ChangeAllyShoot";
    PLAYERS_LIST = 123, "PlayersList";
    MODERATOR_ACTION = 124, "ModeratorAction";
    GET_PLAYERS_LIST = 125, "GetPlayersList";
    CREEP_MOVE = 126, "CreepMove";
    CUSTOM_MAP_DELETE = 129, "CustomMapDelete";
    CUSTOM_MAP_DELETE_RESPONSE = 130, "CustomMapDeleteResponse";
    CUSTOM_MAP_LIST = 131, "CustomMapList";
    CUSTOM_MAP_LIST_RESPONSE = 132, "CustomMapListResponse";
    CREEP_HIT = 133, "CreepHit";
    PLAYER_CALLOUT = 134, "PlayerCallout";
    REFINE_RESULT = 135, "RefineResult";
    BUY_REFINEMENT = 136, "BuyRefinement";
    START_USE = 137, "StartUse";
    END_USE = 138, "EndUse";
    STACKS = 139, "Stacks";
    BUY_ITEM = 140, "BuyItem";
    BUY_ITEM_RESULT = 141, "BuyItemResult";
    DRAW_DEBUG_SHAPE = 142, "DrawDebugShape";
    DRAW_DEBUG_ARROW = 143, "DrawDebugArrow";
    DASH_RESET = 144, "DashReset";
    FAVOR_PET = 145, "FavorPet";
    SKIN_RECYCLE = 146, "SkinRecycle";
    SKIN_RECYCLE_RESPONSE = 147, "SkinRecycleResponse";
    DAMAGE_BOOST = 148, "DamageBoost";
    CLAIM_BP_MILESTONE = 149, "ClaimBpMilestone";
    CLAIM_BP_MILESTONE_RESULT = 150, "ClaimBpMilestoneResult";
    BOOST_BP_MILESTONE = 151, "BoostBpMilestone";
    BOOST_BP_MILESTONE_RESULT = 152, "BoostBpMilestoneResult";
    ACCELERATOR_ADDED = 153, "AcceleratorAdded";
    UNSEASON_REQUEST = 154, "UnseasonRequest";
    RETITLE = 155, "Retitle";
    SET_GRAVESTONE = 156, "SetGravestone";
    SET_ABILITY = 157, "SetAbility";
    MISSION_PROGRESS_UPDATE = 158, "MissionProgressUpdate";
    EMOTE = 159, "Emote";
    BUY_EMOTE = 160, "BuyEmote";
    SET_TRACKED_SEASON = 162, "SetTrackedSeason";
    CLAIM_MISSION = 163, "ClaimMission";
    CLAIM_MISSION_RESULT = 164, "ClaimMissionResult";
    MULTIPLE_MISSIONS_PROGRESS_UPDATE = 165, "MultipleMissionsProgressUpdate";
    DAMAGE_WITH_EFFECT = 166, "DamageWithEffect";
    SET_DISCOVERABLE = 167, "SetDiscoverable";
    REALM_SCORE_UPDATE = 169, "RealmScoreUpdate";
    CLAIM_REWARDS_INFO_PROMPT = 170, "ClaimRewardsInfoPrompt";
    CLAIM_CHEST_REWARD_SUBMIT = 171, "ClaimChestRewardSubmit";
    CHEST_REWARD_RESULT = 172, "ChestRewardResult";
    UNLOCK_ENCHANTMENT_SLOT = 173, "UnlockEnchantmentSlot";
    UNLOCK_ENCHANTMENT_SLOT_RESULT = 174, "UnlockEnchantmentSlotResult";
    UNLOCK_ENCHANTMENT = 175, "UnlockEnchantment";
    UNLOCK_ENCHANTMENT_RESULT = 176, "UnlockEnchantmentResult";
    APPLY_ENCHANTMENT = 177, "ApplyEnchantment";
    APPLY_ENCHANTMENT_RESULT = 178, "ApplyEnchantmentResult";
    ACCELERATOR_UPDATED = 179, "AcceleratorUpdated";
    ENABLE_CRUCIBLE = 180, "EnableCrucible";
    CRUCIBLE_RESULT = 181, "CrucibleResult";
    GET_DEFINITION = 182, "GetDefinition";
    RESULT_DEFINITION = 183, "ResultDefinition";
    TUTORIAL_STATE_CHANGED = 184, "TutorialStateChanged";
    UPGRADE_ENCHANTER = 185, "UpgradeEnchanter";
    UPGRADE_ENCHANTER_RESULT = 186, "UpgradeEnchanterResult";
    UPGRADE_ENCHANTMENT = 187, "UpgradeEnchantment";
    UPGRADE_ENCHANTMENT_RESULT = 188, "UpgradeEnchantmentResult";
    REROLL_ENCHANTMENTS = 189, "RerollEnchantments";
    REROLL_ENCHANTMENTS_RESULT = 190, "RerollEnchantmentsResult";
    RESET_ENCHANTMENTS_REROLL_COUNT = 191, "ResetEnchantmentsRerollCount";
    RESET_ENCHANTMENTS_REROLL_COUNT_RESULT = 192, "ResetEnchantmentsRerollCountResult";
    PURCHASE_PET_SHADER = 193, "PurchasePetShader";
    PET_SHADER_PURCHASE_RESULT = 194, "PetShaderPurchaseResult";
    DISMANTLE_ITEM = 195, "DismantleItem";
    CREATE_PARTY_MESSAGE = 200, "CreatePartyMessage";
    PARTY_ACTION_MESSAGE = 204, "PartyActionMessage";
    PARTY_ACTION_RESULT_MESSAGE = 207, "PartyActionResultMessage";
    INCOMING_PARTY_INVITATION = 208, "IncomingPartyInvitation";
    PARTY_INVITATION_RESPONSE = 209, "PartyInvitationResponse";
    INCOMING_PARTY_MEMBER_INFO_MESSAGE = 210, "IncomingPartyMemberInfoMessage";
    PARTY_MEMBER_ADDED_MESSAGE = 212, "PartyMemberAddedMessage";
    PARTY_LIST_MESSAGE = 214, "PartyList";
    PARTY_JOIN_REQUEST_MESSAGE = 215, "PartyJoinRequestMessage";
    PARTY_REQUEST_RESPONSE = 217, "PartyRequestResponse";
    PARTY_JOIN_RESPONSE = 218, "PartyJoinResponse";
    INCOMING_PARTY_MEMBER_INFO = alias(-9), "IncomingPartyMemberInfo";
    INCOMING_PARTY_INVITE = alias(-8), "IncomingPartyInvite";
    PARTY_MEMBER_ADDED = alias(-7), "PartyMemberAdded";
    PARTY_JOIN_REQUEST_RESPONSE = alias(-6), "PartyJoinRequestResponse";
    PARTY_ACTION = alias(-5), "PartyAction";
    PARTY_JOIN_REQUEST = alias(-4), "PartyJoinRequest";
    PARTY_INVITE_RESPONSE = alias(-3), "PartyInviteResponse";
    PARTY_ACTION_RESULT = alias(-2), "PartyActionResult";
    UNKNOWN = 255, "Unknown";
}

/// Name for logs, falling back to the numeric id
pub fn describe(kind: u8) -> String {
    match name(kind) {
        Some(name) => name.to_string(),
        None => format!("Kind({kind})"),
    }
}
