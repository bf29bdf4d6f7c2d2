use super::*;

use tableforge_domain::ops;
use tableforge_protocol::EquipmentRequest;

pub(super) async fn handle_equipment_request(
    ctx: &RequestCtx<'_>,
    request: EquipmentRequest,
) -> HandlerResult {
    match request {
        EquipmentRequest::Equip {
            character_id,
            slot_index,
        } => {
            authorize_actor(ctx, ActorKey::Character(character_id)).await?;
            ctx.session
                .mutate(|s| ops::equipment::equip(s, character_id, slot_index, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        EquipmentRequest::Unequip {
            character_id,
            equipment_index,
        } => {
            authorize_actor(ctx, ActorKey::Character(character_id)).await?;
            ctx.session
                .mutate(|s| {
                    ops::equipment::unequip(s, character_id, equipment_index, Utc::now())
                })
                .await?;
            Ok(ResponseResult::success_empty())
        }

        EquipmentRequest::Discard {
            character_id,
            equipment_index,
        } => {
            authorize_actor(ctx, ActorKey::Character(character_id)).await?;
            ctx.session
                .mutate(|s| {
                    ops::equipment::discard_equipment(s, character_id, equipment_index, Utc::now())
                })
                .await?;
            Ok(ResponseResult::success_empty())
        }
    }
}
