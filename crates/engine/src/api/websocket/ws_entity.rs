use super::*;

use tableforge_domain::{ops, EntityTemplate};
use tableforge_protocol::{EntityData, EntityRequest};

fn template_from_data(data: EntityData) -> EntityTemplate {
    let mut template =
        EntityTemplate::new(data.name, data.max_hp, data.max_sp).with_sp_regen(data.sp_regen_rate);
    template.description = data.description;
    template
}

pub(super) async fn handle_entity_request(
    ctx: &RequestCtx<'_>,
    request: EntityRequest,
) -> HandlerResult {
    // Entity templates and the field are DM territory throughout.
    require_dm(ctx.conn)?;
    match request {
        EntityRequest::Create { data } => {
            let template = template_from_data(data);
            let entity_id = template.id;
            ctx.session
                .mutate(|s| ops::catalog::create_entity(s, template, Utc::now()))
                .await?;
            Ok(ResponseResult::success(serde_json::json!({
                "entityId": entity_id,
            })))
        }

        EntityRequest::Update { entity_id, data } => {
            let template = template_from_data(data);
            ctx.session
                .mutate(|s| ops::catalog::update_entity(s, entity_id, template, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        EntityRequest::Delete { entity_id } => {
            ctx.session
                .mutate(|s| ops::catalog::delete_entity(s, entity_id, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        EntityRequest::Spawn { entity_id } => {
            let state = ctx
                .session
                .mutate(|s| ops::character::spawn_field_entity(s, entity_id, Utc::now()))
                .await?;
            let instance_id = state.field.last().map(|e| e.instance_id);
            Ok(ResponseResult::success(serde_json::json!({
                "instanceId": instance_id,
            })))
        }

        EntityRequest::Despawn { instance_id } => {
            ctx.session
                .mutate(|s| ops::character::remove_field_entity(s, instance_id, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }
    }
}
