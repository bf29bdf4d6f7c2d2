use super::*;

use tableforge_domain::ops;
use tableforge_protocol::CombatRequest;

pub(super) async fn handle_combat_request(
    ctx: &RequestCtx<'_>,
    request: CombatRequest,
) -> HandlerResult {
    match request {
        // Turn navigation is open to every joined peer; the table shares
        // one turn tracker.
        CombatRequest::Start => {
            ctx.session
                .mutate(|s| ops::combat::start_combat(s, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CombatRequest::End => {
            ctx.session
                .mutate(|s| ops::combat::end_combat(s, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CombatRequest::NextTurn => {
            ctx.session
                .mutate(|s| ops::combat::next_turn(s, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CombatRequest::PreviousTurn => {
            ctx.session
                .mutate(|s| ops::combat::previous_turn(s, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CombatRequest::RequestMove { actor, to } => {
            authorize_actor(ctx, actor).await?;
            ctx.session
                .mutate(|s| ops::combat::move_actor(s, actor, to, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CombatRequest::PlacePiece { actor, at, side } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::combat::place_piece(s, actor, at, side, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CombatRequest::MovePiece { actor, to } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::combat::move_actor(s, actor, to, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        CombatRequest::ClearPositions => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::combat::clear_positions(s, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }
    }
}
