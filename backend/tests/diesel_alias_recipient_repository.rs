//! Integration tests for `DieselAliasRecipientRepository` against embedded PostgreSQL.
//!
//! Covers the owner-scoped lookups, the locked apply transaction and the
//! cascades declared by the migrations.

#[path = "support/embedded_postgres.rs"]
mod embedded_postgres;

use std::collections::BTreeSet;

use alias_relay::domain::ports::{AliasRecipientRepository, AliasRecipientRepositoryError};
use alias_relay::domain::{
    AliasId, RecipientChangeSet, RecipientId, RecipientLimit, RecipientSelection, UserId,
};
use alias_relay::outbound::persistence::{DbPool, DieselAliasRecipientRepository, PoolConfig};
use chrono::{DateTime, Utc};
use embedded_postgres::{format_postgres_error, handle_cluster_setup_failure, provision_database};
use pg_embedded_setup_unpriv::TemporaryDatabase;
use postgres::{Client, NoTls};
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use uuid::Uuid;

struct TestContext {
    runtime: Runtime,
    repository: DieselAliasRecipientRepository,
    client: Client,
    owner: UserId,
    alias_id: AliasId,
    _database: TemporaryDatabase,
}

impl TestContext {
    fn add_user(&mut self) -> UserId {
        let user_id = UserId::random();
        self.client
            .execute("INSERT INTO users (id) VALUES ($1)", &[user_id.as_uuid()])
            .map_err(|err| format_postgres_error(&err))
            .expect("insert user");
        user_id
    }

    fn add_alias(&mut self, owner: &UserId, email: &str) -> AliasId {
        let alias_id = AliasId::random();
        self.client
            .execute(
                "INSERT INTO aliases (id, user_id, email) VALUES ($1, $2, $3)",
                &[alias_id.as_uuid(), owner.as_uuid(), &email],
            )
            .map_err(|err| format_postgres_error(&err))
            .expect("insert alias");
        alias_id
    }

    fn add_recipient(&mut self, owner: &UserId, email: &str, verified: bool) -> RecipientId {
        let recipient_id = RecipientId::random();
        let verified_at: Option<DateTime<Utc>> = verified.then(Utc::now);
        self.client
            .execute(
                "INSERT INTO recipients (id, user_id, email, verified_at) VALUES ($1, $2, $3, $4)",
                &[recipient_id.as_uuid(), owner.as_uuid(), &email, &verified_at],
            )
            .map_err(|err| format_postgres_error(&err))
            .expect("insert recipient");
        recipient_id
    }

    fn verified(&mut self, count: usize) -> Vec<RecipientId> {
        let owner = self.owner.clone();
        (0..count)
            .map(|n| self.add_recipient(&owner, &format!("r{n}@mail.example"), true))
            .collect()
    }

    fn linked(&self, alias_id: &AliasId) -> BTreeSet<RecipientId> {
        self.runtime
            .block_on(self.repository.linked_recipient_ids(alias_id))
            .expect("read links")
            .into_iter()
            .collect()
    }

    fn link_created_at(&mut self, recipient_id: &RecipientId) -> DateTime<Utc> {
        self.client
            .query_one(
                "SELECT created_at FROM alias_recipients WHERE alias_id = $1 AND recipient_id = $2",
                &[self.alias_id.as_uuid(), recipient_id.as_uuid()],
            )
            .map_err(|err| format_postgres_error(&err))
            .expect("link exists")
            .get(0)
    }

    /// Plan against the stored links, then apply as `owner`.
    fn replace(
        &self,
        owner: &UserId,
        ids: &[RecipientId],
    ) -> Result<(), AliasRecipientRepositoryError> {
        let existing = self.linked(&self.alias_id);
        let changes = plan(self.alias_id, existing, ids);
        self.runtime
            .block_on(self.repository.apply_changes(owner, &changes))
    }

    fn apply(&self, changes: &RecipientChangeSet) -> Result<(), AliasRecipientRepositoryError> {
        self.runtime
            .block_on(self.repository.apply_changes(&self.owner, changes))
    }
}

fn plan(
    alias_id: AliasId,
    existing: impl IntoIterator<Item = RecipientId>,
    ids: &[RecipientId],
) -> RecipientChangeSet {
    let selection = RecipientSelection::new(ids.iter().copied(), RecipientLimit::default())
        .expect("within limit");
    RecipientChangeSet::between(alias_id, existing, &selection)
}

fn setup_context() -> Result<TestContext, String> {
    let runtime = Runtime::new().map_err(|err| err.to_string())?;
    let database = provision_database()?;
    let database_url = database.url().to_owned();
    let client =
        Client::connect(&database_url, NoTls).map_err(|err| format_postgres_error(&err))?;

    let config = PoolConfig::new(database_url.as_str())
        .with_max_size(2)
        .with_min_idle(Some(1));
    let pool = runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())?;

    let mut context = TestContext {
        runtime,
        repository: DieselAliasRecipientRepository::new(pool),
        client,
        owner: UserId::random(),
        alias_id: AliasId::random(),
        _database: database,
    };
    let owner = context.add_user();
    context.alias_id = context.add_alias(&owner, "shop@relay.example");
    context.owner = owner;
    Ok(context)
}

#[fixture]
fn repo_context() -> Option<TestContext> {
    match setup_context() {
        Ok(ctx) => Some(ctx),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
fn replaces_the_linked_set(repo_context: Option<TestContext>) {
    let Some(mut context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: replaces_the_linked_set skipped");
        return;
    };
    let ids = context.verified(3);
    let owner = context.owner.clone();

    context
        .replace(&owner, &[ids[0], ids[1]])
        .expect("first assignment");
    context.replace(&owner, &[ids[2]]).expect("replacement");

    assert_eq!(context.linked(&context.alias_id), BTreeSet::from([ids[2]]));
}

#[rstest]
fn lists_recipients_ordered_by_email(repo_context: Option<TestContext>) {
    let Some(mut context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: lists_recipients_ordered_by_email skipped");
        return;
    };
    let owner = context.owner.clone();
    let zed = context.add_recipient(&owner, "zed@mail.example", true);
    let amy = context.add_recipient(&owner, "amy@mail.example", true);
    context.replace(&owner, &[zed, amy]).expect("assignment");

    let listed = context
        .runtime
        .block_on(context.repository.list_alias_recipients(&context.alias_id))
        .expect("list links");

    let emails: Vec<&str> = listed.iter().map(|r| r.email.as_str()).collect();
    assert_eq!(emails, vec!["amy@mail.example", "zed@mail.example"]);
    assert!(listed.iter().all(|r| r.user_id == owner));
}

#[rstest]
fn kept_links_keep_their_creation_time(repo_context: Option<TestContext>) {
    let Some(mut context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: kept_links_keep_their_creation_time skipped");
        return;
    };
    let ids = context.verified(2);
    let owner = context.owner.clone();
    context.replace(&owner, &[ids[0]]).expect("first assignment");
    let before = context.link_created_at(&ids[0]);

    context
        .replace(&owner, &[ids[0], ids[1]])
        .expect("extend assignment");

    assert_eq!(context.link_created_at(&ids[0]), before);
    assert_eq!(context.linked(&context.alias_id), BTreeSet::from([ids[0], ids[1]]));
}

#[rstest]
fn rejects_a_plan_made_against_other_links(repo_context: Option<TestContext>) {
    let Some(mut context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: rejects_a_plan_made_against_other_links skipped");
        return;
    };
    let ids = context.verified(2);
    let owner = context.owner.clone();
    let outdated = plan(context.alias_id, Vec::new(), &[ids[1]]);
    context.replace(&owner, &[ids[0]]).expect("concurrent write");

    let error = context.apply(&outdated).expect_err("stale plan rejected");

    assert_eq!(error, AliasRecipientRepositoryError::StaleLinks);
    assert_eq!(context.linked(&context.alias_id), BTreeSet::from([ids[0]]));
}

#[rstest]
#[case::unverified(false)]
#[case::revoked(true)]
fn rejects_recipients_no_longer_verified(
    repo_context: Option<TestContext>,
    #[case] verified_when_planned: bool,
) {
    let Some(mut context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: rejects_recipients_no_longer_verified skipped");
        return;
    };
    let owner = context.owner.clone();
    let recipient = context.add_recipient(&owner, "late@mail.example", verified_when_planned);
    let changes = plan(context.alias_id, Vec::new(), &[recipient]);
    context
        .client
        .execute(
            "UPDATE recipients SET verified_at = NULL WHERE id = $1",
            &[recipient.as_uuid()],
        )
        .map_err(|err| format_postgres_error(&err))
        .expect("revoke verification");

    let error = context.apply(&changes).expect_err("unverified recipient refused");

    assert_eq!(error, AliasRecipientRepositoryError::StaleLinks);
    assert!(context.linked(&context.alias_id).is_empty());
}

#[rstest]
fn refuses_other_owners(repo_context: Option<TestContext>) {
    let Some(mut context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: refuses_other_owners skipped");
        return;
    };
    let mine = context.verified(1)[0];
    let stranger = context.add_user();
    let theirs = context.add_recipient(&stranger, "them@mail.example", true);

    let alias = context
        .runtime
        .block_on(context.repository.find_alias(&stranger, &context.alias_id))
        .expect("lookup alias");
    assert!(alias.is_none());

    let found = context
        .runtime
        .block_on(context.repository.find_recipients(&context.owner, &[mine, theirs]))
        .expect("lookup recipients");
    let found_ids: Vec<RecipientId> = found.iter().map(|r| r.id).collect();
    assert_eq!(found_ids, vec![mine]);

    let as_stranger = context.replace(&stranger, &[theirs]).expect_err("foreign alias");
    assert_eq!(as_stranger, AliasRecipientRepositoryError::AliasMissing);

    let foreign_recipient = context
        .apply(&plan(context.alias_id, Vec::new(), &[theirs]))
        .expect_err("foreign recipient");
    assert_eq!(foreign_recipient, AliasRecipientRepositoryError::StaleLinks);
    assert!(context.linked(&context.alias_id).is_empty());
}

#[rstest]
fn accepts_an_owner_id_spelled_differently(repo_context: Option<TestContext>) {
    let Some(mut context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: accepts_an_owner_id_spelled_differently skipped");
        return;
    };
    let ids = context.verified(1);
    let spelled = UserId::new(context.owner.as_ref().to_uppercase()).expect("valid id");

    context.replace(&spelled, &ids).expect("owner recognised");

    let alias = context
        .runtime
        .block_on(context.repository.find_alias(&spelled, &context.alias_id))
        .expect("lookup alias")
        .expect("alias found");
    assert_eq!(alias.user_id, context.owner);
}

#[rstest]
#[case::alias("DELETE FROM aliases WHERE id = $1", true)]
#[case::recipient("DELETE FROM recipients WHERE id = $1", false)]
fn deleting_either_side_removes_links(
    repo_context: Option<TestContext>,
    #[case] statement: &str,
    #[case] delete_alias: bool,
) {
    let Some(mut context) = repo_context else {
        eprintln!("SKIP-TEST-CLUSTER: deleting_either_side_removes_links skipped");
        return;
    };
    let ids = context.verified(1);
    let owner = context.owner.clone();
    context.replace(&owner, &ids).expect("assignment");
    let target: Uuid = if delete_alias {
        *context.alias_id.as_uuid()
    } else {
        *ids[0].as_uuid()
    };

    context
        .client
        .execute(statement, &[&target])
        .map_err(|err| format_postgres_error(&err))
        .expect("delete row");

    let remaining: i64 = context
        .client
        .query_one("SELECT COUNT(*) FROM alias_recipients", &[])
        .map_err(|err| format_postgres_error(&err))
        .expect("count links")
        .get(0);
    assert_eq!(remaining, 0);
}
