//! End-to-end desk scenarios
//!
//! Each test drives raw gateway dispatches through the decoder and the
//! service layer against the in-memory platform.
//!
//! Run with: cargo test -p integration-tests --test desk_scenarios

use desk_common::DeskSettings;
use desk_core::{ChannelType, PermissionOverwrite, Permissions, Snowflake};
use desk_service::services::resolver::find_user_desk;
use desk_service::{DeskEventService, DeskVisibility};
use integration_tests::{
    bot_member, desk, desk_overwrites, member, Call, GuildBuilder, TestBot, BOT, CATEGORY, GUILD,
    SYSTEM_CHANNEL,
};

const ADA: Snowflake = Snowflake::new(42);
const BOB: Snowflake = Snowflake::new(43);
const ADA_DESK: Snowflake = Snowflake::new(300);
const BOB_DESK: Snowflake = Snowflake::new(301);

/// Guild where Ada and Bob already own hidden desks
async fn office() -> TestBot {
    let bot = TestBot::new();
    bot.platform.add_member(member(ADA.get(), "ada"));
    bot.platform.add_member(member(BOB.get(), "bob"));

    let guild = GuildBuilder::new("desks")
        .channel(desk(ADA_DESK.get(), ADA, "ada"))
        .channel(desk(BOB_DESK.get(), BOB, "bob"))
        .build();
    bot.connect(&guild).await;
    bot.platform.clear_calls();
    bot
}

// ============================================================================
// Guild create and reconciliation
// ============================================================================

#[tokio::test]
async fn test_guild_create_creates_missing_desks() {
    let bot = TestBot::new();
    bot.platform.add_member(member(ADA.get(), "ada"));
    bot.platform.add_member(bot_member(77, "music"));

    bot.connect(&GuildBuilder::new("desks").build()).await;

    let creates = bot.platform.creates();
    assert_eq!(creates.len(), 1);
    let request = &creates[0];
    assert_eq!(request.name, "ada");
    assert_eq!(request.kind, ChannelType::GuildVoice);
    assert_eq!(request.parent_id, Some(CATEGORY));
    assert_eq!(request.permission_overwrites, desk_overwrites(ADA));

    // Reconciliation does not announce
    assert!(bot.platform.messages().is_empty());
}

#[tokio::test]
async fn test_second_reconciliation_makes_no_changes() {
    let bot = TestBot::new();
    bot.platform.add_member(member(ADA.get(), "ada"));
    bot.platform.add_member(member(BOB.get(), "bob"));

    // Bob's desk lost the bot grant
    let broken = desk(BOB_DESK.get(), BOB, "bob").with_overwrites(vec![
        PermissionOverwrite::member(BOB, Permissions::DESK_OWNER, Permissions::empty()),
        PermissionOverwrite::role(GUILD, Permissions::empty(), Permissions::VIEW_CHANNEL),
    ]);
    let guild = GuildBuilder::new("desks").channel(broken).build();

    bot.connect(&guild).await;
    assert_eq!(bot.platform.creates().len(), 1);
    assert_eq!(bot.platform.edits_of(BOB_DESK), 1);

    bot.platform.clear_calls();
    bot.resync(&guild).await;
    assert!(bot.platform.mutations().is_empty(), "{:?}", bot.platform.mutations());
}

#[tokio::test]
async fn test_members_are_paged() {
    let bot = TestBot::with_settings(DeskSettings {
        member_page_size: 2,
        ..DeskSettings::default()
    });
    for id in 50..55 {
        bot.platform.add_member(member(id, &format!("user{id}")));
    }

    bot.connect(&GuildBuilder::new("desks").build()).await;

    assert_eq!(bot.platform.creates().len(), 5);
    let pages: Vec<Option<Snowflake>> = bot
        .platform
        .calls()
        .into_iter()
        .filter_map(|call| match call {
            Call::ListMembers { limit, after, .. } => {
                assert_eq!(limit, 2);
                Some(after)
            }
            _ => None,
        })
        .collect();
    assert_eq!(
        pages,
        vec![None, Some(Snowflake::new(51)), Some(Snowflake::new(53))]
    );
}

#[tokio::test]
async fn test_one_failed_member_does_not_stop_the_pass() {
    let bot = TestBot::new();
    bot.platform.add_member(member(ADA.get(), "ada"));
    bot.platform.add_member(member(BOB.get(), "bob"));
    bot.platform.fail_creates_named("ada");

    bot.connect(&GuildBuilder::new("desks").build()).await;

    let desks: Vec<_> = bot
        .platform
        .channels()
        .into_iter()
        .filter(|c| c.is_in_category(CATEGORY))
        .collect();
    assert_eq!(desks.len(), 1);
    assert_eq!(desks[0].owner(BOT), Some(BOB));
}

#[tokio::test]
async fn test_guild_without_category_is_not_managed() {
    let bot = TestBot::new();
    bot.platform.add_member(member(ADA.get(), "ada"));
    bot.platform.insert_channel(desk(ADA_DESK.get(), ADA, "ada"));

    bot.connect(&GuildBuilder::without_category().build()).await;
    assert!(bot.ctx.registry().is_empty());
    assert!(bot.platform.creates().is_empty());

    bot.platform.clear_calls();
    bot.join_voice(ADA, ADA_DESK).await;
    bot.member_join(&member(BOB.get(), "bob")).await;
    assert!(bot.platform.calls().is_empty());
}

#[tokio::test]
async fn test_removed_category_unregisters_guild() {
    let bot = office().await;
    assert_eq!(bot.ctx.registry().lookup(GUILD).unwrap(), CATEGORY);

    bot.resync(&GuildBuilder::without_category().build()).await;
    assert!(bot.ctx.registry().lookup(GUILD).is_err());
}

// ============================================================================
// Member join
// ============================================================================

#[tokio::test]
async fn test_new_member_gets_one_desk_and_announcement() {
    let bot = TestBot::new();
    bot.connect(&GuildBuilder::new("Desks").build()).await;
    bot.platform.clear_calls();

    let mut ada = member(ADA.get(), "ada");
    ada.nick = Some("Ada".to_string());
    bot.member_join(&ada).await;

    let creates = bot.platform.creates();
    assert_eq!(creates.len(), 1);
    assert_eq!(creates[0].name, "Ada");
    assert_eq!(creates[0].parent_id, Some(CATEGORY));
    assert_eq!(creates[0].permission_overwrites, desk_overwrites(ADA));
    assert_eq!(
        bot.platform.messages(),
        vec![(SYSTEM_CHANNEL, "Created a desk for Ada".to_string())]
    );

    // Duplicate delivery
    bot.member_join(&ada).await;
    assert_eq!(bot.platform.creates().len(), 1);
}

#[tokio::test]
async fn test_announcements_can_be_disabled() {
    let bot = TestBot::with_settings(DeskSettings {
        announce_new_desks: false,
        ..DeskSettings::default()
    });
    bot.connect(&GuildBuilder::new("desks").build()).await;

    bot.member_join(&member(ADA.get(), "ada")).await;
    assert_eq!(bot.platform.creates().len(), 1);
    assert!(bot.platform.messages().is_empty());
}

#[tokio::test]
async fn test_bot_joining_gets_no_desk() {
    let bot = TestBot::new();
    bot.connect(&GuildBuilder::new("desks").build()).await;

    bot.member_join(&bot_member(77, "music")).await;
    assert!(bot.platform.creates().is_empty());
}

// ============================================================================
// Voice and visibility
// ============================================================================

#[tokio::test]
async fn test_connects_show_desk_once() {
    let bot = office().await;

    bot.join_voice(ADA, ADA_DESK).await;
    assert_eq!(bot.occupants(ADA_DESK), 1);
    assert_eq!(bot.platform.edits_of(ADA_DESK), 1);
    assert_eq!(bot.visibility(ADA_DESK), DeskVisibility::Visible);

    bot.join_voice(BOB, ADA_DESK).await;
    assert_eq!(bot.occupants(ADA_DESK), 2);
    assert_eq!(bot.platform.edits_of(ADA_DESK), 1);

    // Owner and bot grants survive the visibility change
    let desk = bot.desk(ADA_DESK);
    assert_eq!(desk.owner(BOT), Some(ADA));
    assert_eq!(desk.permission_overwrites.len(), 3);
}

#[tokio::test]
async fn test_desk_hides_when_last_member_leaves() {
    let bot = office().await;
    bot.join_voice(ADA, ADA_DESK).await;
    bot.join_voice(BOB, ADA_DESK).await;

    bot.leave_voice(ADA).await;
    assert_eq!(bot.occupants(ADA_DESK), 1);
    assert_eq!(bot.platform.edits_of(ADA_DESK), 1);
    assert_eq!(bot.visibility(ADA_DESK), DeskVisibility::Visible);

    bot.leave_voice(BOB).await;
    assert_eq!(bot.occupants(ADA_DESK), 0);
    assert_eq!(bot.platform.edits_of(ADA_DESK), 2);
    assert_eq!(bot.visibility(ADA_DESK), DeskVisibility::Hidden);
}

#[tokio::test]
async fn test_moving_between_desks() {
    let bot = office().await;
    bot.join_voice(ADA, ADA_DESK).await;

    bot.join_voice(ADA, BOB_DESK).await;
    assert_eq!(bot.occupants(ADA_DESK), 0);
    assert_eq!(bot.occupants(BOB_DESK), 1);
    assert_eq!(bot.visibility(ADA_DESK), DeskVisibility::Hidden);
    assert_eq!(bot.visibility(BOB_DESK), DeskVisibility::Visible);
}

#[tokio::test]
async fn test_leaving_a_desk_for_a_plain_channel() {
    let bot = office().await;
    let lounge = Snowflake::new(400);
    bot.platform
        .insert_channel(desk_core::Channel::new_voice(lounge, GUILD, "lounge"));

    bot.join_voice(ADA, ADA_DESK).await;
    bot.join_voice(ADA, lounge).await;

    assert_eq!(bot.visibility(ADA_DESK), DeskVisibility::Hidden);
    assert_eq!(bot.occupants(lounge), 0);
    assert_eq!(bot.platform.edits_of(lounge), 0);
}

#[tokio::test]
async fn test_hiding_a_hidden_desk_makes_no_request() {
    let bot = office().await;
    let service = DeskEventService::new(&bot.ctx);

    service
        .on_voice_state_update(GUILD, ADA, Some(ADA_DESK), None)
        .await
        .unwrap();
    service
        .on_voice_state_update(GUILD, ADA, Some(ADA_DESK), None)
        .await
        .unwrap();

    // Occupancy never goes negative and the hidden desk is left alone
    assert_eq!(bot.occupants(ADA_DESK), 0);
    assert_eq!(bot.platform.edits_of(ADA_DESK), 0);

    bot.join_voice(ADA, ADA_DESK).await;
    assert_eq!(bot.occupants(ADA_DESK), 1);
}

#[tokio::test]
async fn test_voice_states_survive_reconnect() {
    let bot = TestBot::new();
    bot.platform.add_member(member(ADA.get(), "ada"));
    let visible = desk(ADA_DESK.get(), ADA, "ada").with_overwrites(vec![
        PermissionOverwrite::member(ADA, Permissions::DESK_OWNER, Permissions::empty()),
        PermissionOverwrite::member(BOT, Permissions::DESK_BOT, Permissions::empty()),
        PermissionOverwrite::role(GUILD, Permissions::VIEW_CHANNEL, Permissions::empty()),
    ]);
    let guild = GuildBuilder::new("desks")
        .channel(visible)
        .voice_state(ADA, ADA_DESK)
        .build();

    bot.connect(&guild).await;
    assert_eq!(bot.occupants(ADA_DESK), 1);

    bot.leave_voice(ADA).await;
    assert_eq!(bot.occupants(ADA_DESK), 0);
    assert_eq!(bot.visibility(ADA_DESK), DeskVisibility::Hidden);
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
async fn test_find_user_desk_matches_only_the_owner() {
    let bot = office().await;
    let channels = bot.platform.channels();

    let found = find_user_desk(&channels, CATEGORY, ADA, BOT).unwrap();
    assert_eq!(found.id, ADA_DESK);
    assert_eq!(find_user_desk(&channels, CATEGORY, BOB, BOT).unwrap().id, BOB_DESK);
    assert!(find_user_desk(&channels, CATEGORY, Snowflake::new(44), BOT).is_none());
    assert!(find_user_desk(&channels, CATEGORY, BOT, BOT).is_none());
}
