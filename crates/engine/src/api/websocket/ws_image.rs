use super::*;

use tableforge_domain::{ops, ImageMeta};
use tableforge_protocol::ImageRequest;

pub(super) async fn handle_image_request(
    ctx: &RequestCtx<'_>,
    request: ImageRequest,
) -> HandlerResult {
    match request {
        ImageRequest::Register {
            name,
            mime_type,
            size,
        } => {
            require_dm(ctx.conn)?;
            let image_id = ctx.state.images.register(name, mime_type, size);
            Ok(ResponseResult::success(serde_json::json!({
                "imageId": image_id,
            })))
        }

        ImageRequest::UploadChunk {
            image_id,
            index,
            data,
        } => {
            require_dm(ctx.conn)?;
            ctx.state.images.add_chunk(image_id, index, &data)?;
            Ok(ResponseResult::success_empty())
        }

        ImageRequest::Commit { image_id } => {
            require_dm(ctx.conn)?;
            let stored = ctx.state.images.commit(image_id)?;
            let meta = ImageMeta {
                id: image_id,
                name: stored.name.clone(),
                mime_type: stored.mime_type.clone(),
                size: stored.bytes.len() as u64,
            };
            ctx.session
                .mutate(|s| ops::catalog::register_image(s, meta, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        ImageRequest::Fetch { image_id, index } => {
            let chunk = ctx.state.images.chunk(image_id, index)?;
            Ok(ResponseResult::success(chunk))
        }
    }
}
