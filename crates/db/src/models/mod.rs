mod agent_log;
mod execution;
mod task;
mod tool_usage;

pub use agent_log::AgentLogRow;
pub use execution::ExecutionRow;
pub use task::TaskRow;
pub use tool_usage::ToolUsageRow;

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;

use crate::error::DbError;

pub(crate) fn millis_to_datetime(ms: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(ms).single().unwrap_or_default()
}

pub(crate) fn datetime_to_millis(dt: DateTime<Utc>) -> i64 {
    dt.timestamp_millis()
}

pub(crate) fn json_to_text(value: &Option<Value>) -> Option<String> {
    value.as_ref().map(Value::to_string)
}

pub(crate) fn text_to_json(text: Option<String>) -> Result<Option<Value>, DbError> {
    text.map(|t| serde_json::from_str(&t))
        .transpose()
        .map_err(DbError::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_millis_keep_sub_second_precision() {
        let ms = 1_700_000_000_123;
        assert_eq!(datetime_to_millis(millis_to_datetime(ms)), ms);
    }

    #[test]
    fn test_json_text_round_trip() {
        let value = Some(json!({"findings": ["a", "b"]}));
        let text = json_to_text(&value);
        assert_eq!(text_to_json(text).unwrap(), value);
        assert_eq!(text_to_json(None).unwrap(), None);
    }

    #[test]
    fn test_corrupt_json_is_an_error() {
        let err = text_to_json(Some("{not json".to_string())).unwrap_err();
        assert!(matches!(err, DbError::Serialization(_)));
    }
}
