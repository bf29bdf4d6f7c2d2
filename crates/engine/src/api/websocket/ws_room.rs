use super::*;

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;

use tableforge_domain::ops;
use tableforge_protocol::{BundledImage, RoomRequest, SaveData};

use crate::images::StoredImage;

pub(super) async fn handle_room_request(
    ctx: &RequestCtx<'_>,
    request: RoomRequest,
) -> HandlerResult {
    match request {
        RoomRequest::GetState => {
            let state = ctx.session.snapshot().await;
            Ok(ResponseResult::success(state))
        }

        RoomRequest::SetDisplay { display } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::room::set_display(s, display, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        RoomRequest::SetAudio { audio } => {
            require_dm(ctx.conn)?;
            ctx.session
                .mutate(|s| ops::room::set_audio(s, audio, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }

        RoomRequest::Export => {
            require_dm(ctx.conn)?;
            let mut state = ctx.session.snapshot().await;
            state.strip_player_ownership();

            let mut images = std::collections::BTreeMap::new();
            for (image_id, meta) in &state.catalog.images {
                match ctx.state.images.get(*image_id) {
                    Some(stored) => {
                        images.insert(
                            *image_id,
                            BundledImage {
                                name: meta.name.clone(),
                                mime_type: meta.mime_type.clone(),
                                data: BASE64.encode(&stored.bytes),
                            },
                        );
                    }
                    None => {
                        tracing::warn!(image_id = %image_id, "Catalog image has no stored bytes; skipping from export");
                    }
                }
            }
            Ok(ResponseResult::success(SaveData { state, images }))
        }

        RoomRequest::Import { data } => {
            require_dm(ctx.conn)?;
            for (image_id, bundled) in &data.images {
                let bytes = BASE64
                    .decode(&bundled.data)
                    .map_err(crate::images::ImageError::Decode)?;
                ctx.state.images.insert(
                    *image_id,
                    StoredImage {
                        name: bundled.name.clone(),
                        mime_type: bundled.mime_type.clone(),
                        bytes,
                    },
                );
            }
            let imported = data.state;
            ctx.session
                .mutate(move |s| ops::room::import_snapshot(s, imported, Utc::now()))
                .await?;
            Ok(ResponseResult::success_empty())
        }
    }
}
