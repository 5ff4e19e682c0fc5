//! Deferred tasks: `scheduleTask`, `getScheduledTasks`, `deleteScheduledTask`.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::json;

use super::{call, minutes_after, BuiltinContext};
use crate::capabilities::ScheduledTask;
use crate::command::{boxed_command_future, CommandTable, FnCommand, Payload, PayloadShape};
use crate::error::{CommandError, DispatchError};
use crate::protocol::{kinds, CommandResult};
use crate::utils::time::now_millis;

pub fn register(table: &mut CommandTable, context: &BuiltinContext) -> Result<(), DispatchError> {
    table.register(schedule_task(context.clone()))?;
    table.register(get_scheduled_tasks(context.clone()))?;
    table.register(delete_scheduled_task(context.clone()))?;
    Ok(())
}

fn schedule_task(context: BuiltinContext) -> FnCommand {
    FnCommand::new("scheduleTask", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let message = payload.required_str("message")?.to_string();
            let timestamp = trigger_timestamp(&payload, now_millis())?;
            let task = call(
                context.timeout,
                context.capabilities.scheduler.create(ScheduledTask { timestamp, message }),
            )
            .await?;
            Ok(CommandResult::new(
                kinds::TASK_SCHEDULED,
                json!({
                    "timestamp": task.timestamp,
                    "message": task.message,
                    "scheduledFor": rfc3339(task.timestamp),
                }),
            ))
        })
    })
    .with_icon("clock")
}

/// `delayMinutes` from now, or an absolute RFC 3339 `time` in the future.
fn trigger_timestamp(payload: &Payload, now: u64) -> Result<u64, CommandError> {
    if let Some(minutes) = payload.u64_field("delayMinutes") {
        return minutes_after(now, minutes, "delayMinutes");
    }
    let Some(time) = payload.str_field("time") else {
        return Err(CommandError::InvalidPayload(
            "one of 'delayMinutes' or 'time' is required".to_string(),
        ));
    };
    let parsed = DateTime::parse_from_rfc3339(time.trim())
        .map_err(|e| CommandError::InvalidPayload(format!("invalid 'time': {e}")))?;
    let millis = u64::try_from(parsed.timestamp_millis())
        .map_err(|_| CommandError::InvalidPayload("'time' is before the epoch".to_string()))?;
    if millis <= now {
        return Err(CommandError::InvalidPayload("'time' must be in the future".to_string()));
    }
    Ok(millis)
}

fn rfc3339(timestamp: u64) -> Option<String> {
    let millis = i64::try_from(timestamp).ok()?;
    Utc.timestamp_millis_opt(millis).single().map(|time| time.to_rfc3339())
}

fn get_scheduled_tasks(context: BuiltinContext) -> FnCommand {
    FnCommand::new("getScheduledTasks", PayloadShape::SelfClosing, move |_payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let tasks = call(context.timeout, context.capabilities.scheduler.list()).await?;
            Ok(CommandResult::new(
                kinds::SCHEDULED_TASKS,
                json!({ "count": tasks.len(), "tasks": tasks }),
            ))
        })
    })
    .with_icon("calendar")
}

fn delete_scheduled_task(context: BuiltinContext) -> FnCommand {
    FnCommand::new("deleteScheduledTask", PayloadShape::Paired, move |payload| {
        let context = context.clone();
        boxed_command_future(async move {
            let timestamp = payload
                .u64_field("timestamp")
                .or_else(|| match &payload {
                    Payload::Json(value) => value.as_u64(),
                    Payload::Raw(text) => text.parse().ok(),
                    Payload::Empty => None,
                })
                .ok_or_else(|| CommandError::InvalidPayload("missing 'timestamp'".to_string()))?;
            let deleted = call(context.timeout, context.capabilities.scheduler.delete(timestamp)).await?;
            Ok(CommandResult::new(
                kinds::TASK_DELETED,
                json!({ "timestamp": timestamp, "deleted": deleted }),
            ))
        })
    })
    .with_icon("trash")
}
