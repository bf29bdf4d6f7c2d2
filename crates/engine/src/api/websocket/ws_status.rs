use super::*;

use tableforge_domain::{ops, StatusEffect};
use tableforge_protocol::{StatusEffectData, StatusRequest};

fn effect_from_data(data: StatusEffectData) -> StatusEffect {
    let mut effect = StatusEffect::new(data.name);
    effect.description = data.description;
    effect
}

pub(super) async fn handle_status_request(
    ctx: &RequestCtx<'_>,
    request: StatusRequest,
) -> HandlerResult {
    match request {
        StatusRequest::Create { data } => {
            require_dm(ctx.conn)?;
            let effect = effect_from_data(data);
            let effect_id = effect.id;
            ctx.session
                .mutate(|s| ops::catalog::create_status_effect(s, effect, Utc::now()))
                .await?;
            Ok(ResponseResult::success(serde_json::json!({
                "effectId": effect_id,
            })))
        }

        StatusRequest::Update { effect_id, data } => {
            require_dm(ctx.conn)?;
            let effect = effect_from_data(data);
            ctx.session
                .mutate(|s| ops::catalog::update_status_effect(s, effect_id, effect, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        StatusRequest::Delete { effect_id } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::catalog::delete_status_effect(s, effect_id, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        StatusRequest::Apply { actor, effect_id } => {
            authorize_actor(ctx, actor).await?;
            ctx.session
                .mutate(|s| ops::character::apply_status_effect(s, actor, effect_id, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        StatusRequest::Remove { actor, effect_id } => {
            authorize_actor(ctx, actor).await?;
            ctx.session
                .mutate(|s| {
                    ops::character::remove_status_effect(s, actor, effect_id, Utc::now())
                })
                .await?;
            Ok(ResponseResult::success_empty())
        }
    }
}
