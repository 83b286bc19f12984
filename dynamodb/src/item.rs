//! Mapping between [`Todo`] and DynamoDB items.
//!
//! One item per Todo, keyed by `id`:
//!
//! | Attribute | Type | Source |
//! |---|---|---|
//! | `id` | S | [`Todo::id`] (partition key) |
//! | `title` | S | [`Todo::title`] |
//! | `done` | BOOL | [`Todo::done`] |
//! | `createdAt` | S | ISO-8601, millisecond precision |
//! | `updatedAt` | S | ISO-8601, millisecond precision |

use aws_sdk_dynamodb::types::AttributeValue;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use todo_api_core::todo::timestamp;
use todo_api_core::{StoreError, StoreResult, Title, Todo, TodoId, TodoUpdate};

/// Partition key attribute.
pub const ID: &str = "id";
/// Title attribute.
pub const TITLE: &str = "title";
/// Completion flag attribute.
pub const DONE: &str = "done";
/// Creation timestamp attribute.
pub const CREATED_AT: &str = "createdAt";
/// Last-update timestamp attribute.
pub const UPDATED_AT: &str = "updatedAt";

/// A raw DynamoDB item.
pub type Item = HashMap<String, AttributeValue>;

/// Encodes a Todo as a full item, suitable for `PutItem`.
#[must_use]
pub fn to_item(todo: &Todo) -> Item {
    HashMap::from([
        (ID.to_string(), AttributeValue::S(todo.id.to_string())),
        (TITLE.to_string(), AttributeValue::S(todo.title.to_string())),
        (DONE.to_string(), AttributeValue::Bool(todo.done)),
        (
            CREATED_AT.to_string(),
            AttributeValue::S(timestamp::format(&todo.created_at)),
        ),
        (
            UPDATED_AT.to_string(),
            AttributeValue::S(timestamp::format(&todo.updated_at)),
        ),
    ])
}

/// Decodes an item read back from the table.
///
/// # Errors
///
/// [`StoreError::InvalidRecord`] if an attribute is missing, has the wrong
/// type, or holds an invalid value.
pub fn from_item(item: &Item) -> StoreResult<Todo> {
    let id = string_attr(item, ID, "<unknown>")?;
    let title = string_attr(item, TITLE, &id)?;
    let title = Title::parse(&title)
        .map_err(|e| StoreError::invalid_record(id.clone(), format!("{TITLE}: {e}")))?;

    let done = match item.get(DONE) {
        Some(AttributeValue::Bool(done)) => *done,
        Some(_) => {
            return Err(StoreError::invalid_record(id, format!("{DONE} is not a BOOL")));
        }
        None => return Err(StoreError::invalid_record(id, format!("missing {DONE}"))),
    };

    let created_at = timestamp_attr(item, CREATED_AT, &id)?;
    let updated_at = timestamp_attr(item, UPDATED_AT, &id)?;

    Ok(Todo {
        id: TodoId::from(id),
        title,
        done,
        created_at,
        updated_at,
    })
}

fn string_attr(item: &Item, name: &str, id: &str) -> StoreResult<String> {
    match item.get(name) {
        Some(AttributeValue::S(value)) => Ok(value.clone()),
        Some(_) => Err(StoreError::invalid_record(id, format!("{name} is not a string"))),
        None => Err(StoreError::invalid_record(id, format!("missing {name}"))),
    }
}

fn timestamp_attr(item: &Item, name: &str, id: &str) -> StoreResult<DateTime<Utc>> {
    let raw = string_attr(item, name, id)?;
    timestamp::parse(&raw).map_err(|e| StoreError::invalid_record(id, format!("{name}: {e}")))
}

/// An `UpdateItem` expression built from the fields present in a [`TodoUpdate`].
///
/// Only provided fields appear in the `SET` clause, so omitted fields are
/// never overwritten. `updatedAt` is always set. The condition rejects ids
/// that do not exist instead of letting `UpdateItem` create a partial item.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateExpression {
    /// The `SET ...` clause.
    pub update: String,
    /// Guard evaluated against the existing item.
    pub condition: String,
    /// `#placeholder` → attribute name.
    pub names: HashMap<String, String>,
    /// `:placeholder` → attribute value.
    pub values: Item,
}

impl UpdateExpression {
    /// Builds the expression for `update`, stamping `updatedAt` with `now`.
    #[must_use]
    pub fn build(update: &TodoUpdate, now: DateTime<Utc>) -> Self {
        let mut assignments = Vec::with_capacity(3);
        let mut names = HashMap::from([(format!("#{ID}"), ID.to_string())]);
        let mut values = HashMap::new();

        let mut set = |attr: &str, value: AttributeValue| {
            assignments.push(format!("#{attr} = :{attr}"));
            names.insert(format!("#{attr}"), attr.to_string());
            values.insert(format!(":{attr}"), value);
        };

        if let Some(title) = &update.title {
            set(TITLE, AttributeValue::S(title.to_string()));
        }
        if let Some(done) = update.done {
            set(DONE, AttributeValue::Bool(done));
        }
        set(UPDATED_AT, AttributeValue::S(timestamp::format(&now)));

        Self {
            update: format!("SET {}", assignments.join(", ")),
            condition: format!("attribute_exists(#{ID})"),
            names,
            values,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Todo {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        Todo::new(TodoId::from("id-1"), Title::parse("ship it").unwrap(), now)
    }

    #[test]
    fn item_layout_matches_table_schema() {
        let item = to_item(&sample());

        assert_eq!(item.len(), 5);
        assert_eq!(item[ID], AttributeValue::S("id-1".into()));
        assert_eq!(item[TITLE], AttributeValue::S("ship it".into()));
        assert_eq!(item[DONE], AttributeValue::Bool(false));
        assert_eq!(
            item[CREATED_AT],
            AttributeValue::S("2024-03-01T12:00:00.000Z".into())
        );
    }

    #[test]
    fn decode_reverses_encode() {
        let todo = sample();
        assert_eq!(from_item(&to_item(&todo)).unwrap(), todo);
    }

    #[test]
    fn decode_reports_missing_attribute() {
        let mut item = to_item(&sample());
        item.remove(DONE);

        let err = from_item(&item).unwrap_err();
        assert_eq!(err, StoreError::invalid_record("id-1", "missing done"));
    }

    #[test]
    fn decode_reports_wrong_type() {
        let mut item = to_item(&sample());
        item.insert(DONE.into(), AttributeValue::Null(true));

        assert!(matches!(
            from_item(&item),
            Err(StoreError::InvalidRecord { ref reason, .. }) if reason == "done is not a BOOL"
        ));
    }

    #[test]
    fn decode_rejects_bad_timestamp() {
        let mut item = to_item(&sample());
        item.insert(UPDATED_AT.into(), AttributeValue::S("yesterday".into()));
        assert!(from_item(&item).is_err());
    }

    #[test]
    fn decode_without_id_uses_placeholder() {
        let mut item = to_item(&sample());
        item.remove(ID);
        assert_eq!(
            from_item(&item).unwrap_err(),
            StoreError::invalid_record("<unknown>", "missing id")
        );
    }

    #[test]
    fn update_expression_sets_only_provided_fields() {
        let now = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        let expr = UpdateExpression::build(&TodoUpdate::done(true), now);

        assert_eq!(expr.update, "SET #done = :done, #updatedAt = :updatedAt");
        assert_eq!(expr.condition, "attribute_exists(#id)");
        assert!(!expr.values.contains_key(":title"));
        assert!(!expr.names.contains_key("#title"));
        assert_eq!(expr.values[":done"], AttributeValue::Bool(true));
        assert_eq!(
            expr.values[":updatedAt"],
            AttributeValue::S("2024-03-02T00:00:00.000Z".into())
        );
        assert_eq!(expr.names["#id"], "id");
    }

    #[test]
    fn update_expression_with_all_fields() {
        let update = TodoUpdate {
            title: Some(Title::parse("new").unwrap()),
            done: Some(false),
        };
        let expr = UpdateExpression::build(&update, Utc::now());

        assert_eq!(
            expr.update,
            "SET #title = :title, #done = :done, #updatedAt = :updatedAt"
        );
        assert_eq!(expr.values.len(), 3);
        assert_eq!(expr.names.len(), 4);
    }

    #[test]
    fn empty_update_still_refreshes_timestamp() {
        let expr = UpdateExpression::build(&TodoUpdate::default(), Utc::now());
        assert_eq!(expr.update, "SET #updatedAt = :updatedAt");
    }
}
