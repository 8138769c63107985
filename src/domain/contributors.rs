use tracing::{debug, info};

use crate::db::errors::Result;
use crate::db::store::RecordStore;
use crate::db::table::TableDef;
use crate::db::value::{Record, Value};
use crate::domain::roles::classify_roles;
use crate::models::MemberProfile;

pub const CONTRIBUTOR_KEY: &str = "discord_id";

fn insert(record: &mut Record, column: &str, value: impl Into<Value>) {
    record.insert(column.to_string(), value.into());
}

/// Full attribute set written when a single member is synced
pub fn contributor_attributes(member: &MemberProfile) -> Record {
    let classification = classify_roles(&member.roles);

    let mut record = Record::new();
    insert(&mut record, CONTRIBUTOR_KEY, member.discord_id);
    insert(&mut record, "discord_username", member.username.as_str());
    insert(&mut record, "field_name", member.display_name.as_str());
    insert(&mut record, "chapter", classification.primary_chapter());
    insert(&mut record, "gender", classification.gender);
    insert(&mut record, "email", member.email.clone().unwrap_or_default());
    insert(&mut record, "is_active", member.is_active);
    insert(&mut record, "joined_at", member.joined_at_naive());
    record
}

/// Attribute set written by a roster-wide sync. Email, activity and display
/// name are left alone so a guild refresh does not clobber them.
pub fn roster_attributes(member: &MemberProfile) -> Record {
    let classification = classify_roles(&member.roles);

    let mut record = Record::new();
    insert(&mut record, CONTRIBUTOR_KEY, member.discord_id);
    insert(&mut record, "discord_username", member.username.as_str());
    insert(&mut record, "chapter", classification.primary_chapter());
    insert(&mut record, "gender", classification.gender);
    insert(&mut record, "joined_at", member.joined_at_naive());
    record
}

/// Classify a member's roles and upsert their contributor row
pub async fn sync_contributor<S>(store: &S, table: &TableDef, member: &MemberProfile) -> Result<Record>
where
    S: RecordStore + ?Sized,
{
    let attributes = contributor_attributes(member);
    debug!(discord_id = member.discord_id, table = table.name, "Syncing contributor");

    let record = store
        .upsert_by_key(table, CONTRIBUTOR_KEY, &Value::from(member.discord_id), &attributes)
        .await?;

    info!(discord_id = member.discord_id, "Contributor synced");
    Ok(record)
}

/// Sync a whole roster in one transaction; any failure aborts every row
pub async fn bulk_sync_contributors<S>(store: &S, table: &TableDef, members: &[MemberProfile]) -> Result<u64>
where
    S: RecordStore + ?Sized,
{
    let rows: Vec<(Value, Record)> = members
        .iter()
        .map(|member| (Value::from(member.discord_id), roster_attributes(member)))
        .collect();

    let synced = store.upsert_many_by_key(table, CONTRIBUTOR_KEY, &rows).await?;
    info!(synced, table = table.name, "Contributor roster synced");
    Ok(synced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::errors::DatabaseError;
    use crate::db::store::MockRecordStore;
    use crate::models::tables::CONTRIBUTORS_DISCORD;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn member(discord_id: i64, roles: &[&str]) -> MemberProfile {
        MemberProfile {
            discord_id,
            username: format!("user{}", discord_id),
            display_name: format!("User {}", discord_id),
            roles: roles.iter().map(|r| r.to_string()).collect(),
            email: None,
            is_active: true,
            joined_at: DateTime::parse_from_rfc3339("2023-11-20T18:00:00-04:00").unwrap(),
        }
    }

    #[test]
    fn test_contributor_attributes() {
        let mut ada = member(7, &["Corporate: Acme", "College: IIT", "F", "Pune"]);
        ada.email = Some("ada@example.com".to_string());
        let attributes = contributor_attributes(&ada);

        assert_eq!(attributes.get("discord_id"), Some(&Value::Int(7)));
        assert_eq!(attributes.get("chapter"), Some(&Value::from("Acme")));
        assert_eq!(attributes.get("gender"), Some(&Value::from("F")));
        assert_eq!(attributes.get("email"), Some(&Value::from("ada@example.com")));
        assert_eq!(attributes.get("field_name"), Some(&Value::from("User 7")));
        assert_eq!(
            attributes.get("joined_at"),
            Some(&Value::Timestamp(ada.joined_at.naive_local()))
        );
        assert!(attributes.keys().all(|c| CONTRIBUTORS_DISCORD.has_column(c)));
    }

    #[test]
    fn test_missing_fields_default() {
        let attributes = contributor_attributes(&member(8, &["@everyone"]));
        assert_eq!(attributes.get("email"), Some(&Value::from("")));
        assert_eq!(attributes.get("chapter"), Some(&Value::Null));
        assert_eq!(attributes.get("gender"), Some(&Value::Null));
        assert_eq!(attributes.get("is_active"), Some(&Value::Bool(true)));
    }

    #[test]
    fn test_roster_attributes_leave_profile_fields_alone() {
        let attributes = roster_attributes(&member(9, &["M"]));
        let columns: Vec<&str> = attributes.keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["chapter", "discord_id", "discord_username", "gender", "joined_at"]);
    }

    #[tokio::test]
    async fn test_sync_contributor_upserts_by_discord_id() {
        let mut store = MockRecordStore::new();
        store
            .expect_upsert_by_key()
            .withf(|table, key, value, values| {
                table.name == "contributors_discord"
                    && key == "discord_id"
                    && *value == Value::Int(42)
                    && values.get("chapter") == Some(&Value::from("ABC"))
            })
            .times(1)
            .returning(|_, _, _, values| Ok(values.clone()));

        let record = sync_contributor(&store, &CONTRIBUTORS_DISCORD, &member(42, &["College: ABC"]))
            .await
            .unwrap();
        assert_eq!(record.get("discord_id"), Some(&Value::Int(42)));
    }

    #[tokio::test]
    async fn test_sync_contributor_propagates_failure() {
        let mut store = MockRecordStore::new();
        store
            .expect_upsert_by_key()
            .returning(|_, _, _, _| Err(DatabaseError::TransactionError("boom".to_string())));

        let result = sync_contributor(&store, &CONTRIBUTORS_DISCORD, &member(1, &[])).await;
        assert!(matches!(result, Err(DatabaseError::TransactionError(_))));
    }

    #[tokio::test]
    async fn test_bulk_sync_sends_one_batch() {
        let mut store = MockRecordStore::new();
        store
            .expect_upsert_many_by_key()
            .withf(|_, key, rows| {
                key == "discord_id"
                    && rows.len() == 2
                    && rows[0].0 == Value::Int(1)
                    && rows[1].1.get("gender") == Some(&Value::from("NB"))
            })
            .times(1)
            .returning(|_, _, rows| Ok(rows.len() as u64));

        let members = vec![member(1, &[]), member(2, &["NB"])];
        let synced = bulk_sync_contributors(&store, &CONTRIBUTORS_DISCORD, &members).await.unwrap();
        assert_eq!(synced, 2);
    }
}
