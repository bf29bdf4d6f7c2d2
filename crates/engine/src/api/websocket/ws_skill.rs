use super::*;

use tableforge_domain::{ops, Skill};
use tableforge_protocol::{SkillData, SkillRequest};

fn skill_from_data(data: SkillData) -> Skill {
    let mut skill = Skill::new(data.name, data.damage, data.sp_cost);
    skill.description = data.description;
    skill.uses = data.uses;
    skill
}

pub(super) async fn handle_skill_request(
    ctx: &RequestCtx<'_>,
    request: SkillRequest,
) -> HandlerResult {
    match request {
        SkillRequest::Use { actor, skill_index } => {
            authorize_actor(ctx, actor).await?;
            ctx.session
                .mutate(|s| ops::skills::use_skill(s, actor, skill_index, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        SkillRequest::Learn { actor, skill_id } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::skills::learn_skill(s, actor, skill_id, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        SkillRequest::Remove { actor, skill_index } => {
            authorize_actor(ctx, actor).await?;
            ctx.session
                .mutate(|s| ops::skills::remove_skill(s, actor, skill_index, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        SkillRequest::Create { data } => {
            require_dm(ctx.conn)?;
            let skill = skill_from_data(data);
            let skill_id = skill.id;
            ctx.session
                .mutate(|s| ops::skills::create_skill(s, skill, Utc::now()))
                .await?;
            Ok(ResponseResult::success(serde_json::json!({
                "skillId": skill_id,
            })))
        }

        SkillRequest::Update { skill_id, data } => {
            require_dm(ctx.conn)?;
            let skill = skill_from_data(data);
            ctx.session
                .mutate(|s| ops::skills::update_skill(s, skill_id, skill, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        SkillRequest::Delete { skill_id } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::skills::delete_skill(s, skill_id, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }
    }
}
