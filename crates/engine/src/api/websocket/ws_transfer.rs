use super::*;

use tableforge_protocol::{TransferOutcome, TransferRequest};

use crate::session::TransferFlow;

pub(super) async fn handle_transfer_request(
    ctx: &RequestCtx<'_>,
    request: TransferRequest,
) -> HandlerResult {
    let room_id = ctx.session.room_id();
    match request {
        TransferRequest::Offer {
            from,
            to,
            slot_index,
        } => {
            authorize_actor(ctx, from).await?;
            match ctx.session.offer_transfer(from, to, slot_index).await? {
                TransferFlow::Executed(_) => Ok(ResponseResult::success(serde_json::json!({
                    "executed": true,
                }))),
                TransferFlow::Pending(intent) => {
                    // Prompt only the recipient's owning peer; the rest of
                    // the room learns nothing until the transfer settles.
                    let snapshot = ctx.session.snapshot().await;
                    if let Some(owner) = snapshot.actor_owner(intent.to)? {
                        ctx.state
                            .connections
                            .send_to_player(
                                room_id,
                                owner,
                                ServerMessage::TransferOffered {
                                    transfer_id: intent.id,
                                    item_id: intent.item_id,
                                    from: intent.from,
                                    to: intent.to,
                                    slot_index: intent.slot_index,
                                },
                            )
                            .await;
                    }
                    Ok(ResponseResult::success(serde_json::json!({
                        "executed": false,
                        "transferId": intent.id,
                    })))
                }
            }
        }

        TransferRequest::Respond {
            transfer_id,
            accept,
        } => {
            let intent = ctx
                .session
                .pending_transfer(transfer_id)
                .await
                .ok_or_else(|| {
                    HandlerError::Domain(DomainError::not_found("TransferIntent", transfer_id))
                })?;
            // Only the recipient's owning peer (or the DM) may answer.
            if !ctx.conn.is_dm() {
                let snapshot = ctx.session.snapshot().await;
                if snapshot.actor_owner(intent.to)? != Some(ctx.conn.player_id) {
                    return Err(HandlerError::Forbidden(
                        "only the recipient may answer this transfer",
                    ));
                }
            }

            let (intent, _state) = ctx.session.respond_transfer(transfer_id, accept).await?;
            let outcome = if accept {
                TransferOutcome::Accepted
            } else {
                TransferOutcome::Rejected
            };
            notify_settled(ctx, room_id, &intent, outcome).await;
            Ok(ResponseResult::success_empty())
        }

        TransferRequest::Cancel { transfer_id } => {
            let intent = ctx
                .session
                .pending_transfer(transfer_id)
                .await
                .ok_or_else(|| {
                    HandlerError::Domain(DomainError::not_found("TransferIntent", transfer_id))
                })?;
            // Only the sender's owning peer (or the DM) may withdraw.
            if !ctx.conn.is_dm() {
                let snapshot = ctx.session.snapshot().await;
                if snapshot.actor_owner(intent.from)? != Some(ctx.conn.player_id) {
                    return Err(HandlerError::Forbidden(
                        "only the sender may cancel this transfer",
                    ));
                }
            }

            let intent = ctx.session.cancel_transfer(transfer_id).await?;
            // The recipient's prompt is dismissed explicitly.
            notify_settled(ctx, room_id, &intent, TransferOutcome::Cancelled).await;
            Ok(ResponseResult::success_empty())
        }
    }
}

/// Tell both involved peers how a pending transfer ended.
async fn notify_settled(
    ctx: &RequestCtx<'_>,
    room_id: tableforge_domain::RoomId,
    intent: &tableforge_domain::TransferIntent,
    outcome: TransferOutcome,
) {
    let snapshot = ctx.session.snapshot().await;
    let message = ServerMessage::TransferResolved {
        transfer_id: intent.id,
        outcome,
    };
    for actor in [intent.from, intent.to] {
        if let Ok(Some(owner)) = snapshot.actor_owner(actor) {
            ctx.state
                .connections
                .send_to_player(room_id, owner, message.clone())
                .await;
        }
    }
}
