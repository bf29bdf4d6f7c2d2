use super::*;

use tableforge_domain::{ops, Item};
use tableforge_protocol::{ItemData, ItemRequest};

fn item_from_data(data: ItemData) -> Item {
    let mut item = Item::new(data.name);
    item.description = data.description;
    item.uses = data.uses;
    item.is_equippable = data.is_equippable;
    item.tags = data.tags.into_iter().collect();
    item
}

pub(super) async fn handle_item_request(
    ctx: &RequestCtx<'_>,
    request: ItemRequest,
) -> HandlerResult {
    match request {
        ItemRequest::Use { actor, slot_index } => {
            authorize_actor(ctx, actor).await?;
            ctx.session
                .mutate(|s| ops::items::use_item(s, actor, slot_index, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        ItemRequest::Discard { actor, slot_index } => {
            authorize_actor(ctx, actor).await?;
            ctx.session
                .mutate(|s| ops::items::discard_item(s, actor, slot_index, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        ItemRequest::Give {
            actor,
            item_id,
            count,
        } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::items::give_item(s, actor, item_id, count, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        ItemRequest::RestoreUses { actor, slot_index } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::items::restore_uses(s, actor, slot_index, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        ItemRequest::Create { data } => {
            require_dm(ctx.conn)?;
            let item = item_from_data(data);
            let item_id = item.id;
            ctx.session
                .mutate(|s| ops::items::create_item(s, item, Utc::now()))
                .await?;
            Ok(ResponseResult::success(serde_json::json!({
                "itemId": item_id,
            })))
        }

        ItemRequest::Update { item_id, data } => {
            require_dm(ctx.conn)?;
            let item = item_from_data(data);
            ctx.session
                .mutate(|s| ops::items::update_item(s, item_id, item, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        ItemRequest::Delete { item_id } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::items::delete_item(s, item_id, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }
    }
}
