use super::*;

use tableforge_domain::{ops, Character};
use tableforge_protocol::CharacterRequest;

pub(super) async fn handle_character_request(
    ctx: &RequestCtx<'_>,
    request: CharacterRequest,
) -> HandlerResult {
    match request {
        CharacterRequest::Create { data } => {
            // Players create characters bound to themselves; the DM creates
            // unowned ones.
            let mut character = Character::new(data.name, data.max_hp, data.max_mp, data.max_sp)
                .with_sp_regen(data.sp_regen_rate);
            character.description = data.description;
            if !ctx.conn.is_dm() {
                character.player_id = Some(ctx.conn.player_id);
            }
            let character_id = character.id;
            ctx.session
                .mutate(|s| ops::character::add_character(s, character, Utc::now()))
                .await?;
            Ok(ResponseResult::success(serde_json::json!({
                "characterId": character_id,
            })))
        }

        CharacterRequest::Update { character_id, data } => {
            authorize_actor(ctx, ActorKey::Character(character_id)).await?;
            let patch = ops::character::CharacterPatch {
                name: data.name,
                description: data.description,
                max_hp: data.max_hp,
                max_mp: data.max_mp,
                max_sp: data.max_sp,
                sp_regen_rate: data.sp_regen_rate,
            };
            ctx.session
                .mutate(|s| ops::character::update_character(s, character_id, patch, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CharacterRequest::Delete { character_id } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::character::delete_character(s, character_id, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CharacterRequest::Select { character_id } => {
            if ctx.conn.is_dm() {
                return Err(HandlerError::Forbidden(
                    "the DM does not bind characters",
                ));
            }
            let player_id = ctx.conn.player_id;
            ctx.session
                .mutate(|s| {
                    ops::character::select_character(s, character_id, player_id, Utc::now())
                })
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CharacterRequest::AdjustStat { actor, stat, delta } => {
            authorize_actor(ctx, actor).await?;
            ctx.session
                .mutate(|s| ops::character::adjust_stat(s, actor, stat, delta, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }
    }
}
