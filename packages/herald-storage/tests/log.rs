use time::{Duration, OffsetDateTime};
use uuid::Uuid;

use herald_domain::Channel;
use herald_storage::{db::Db, log, log::NewEntry};

async fn connect(test_db: &herald_testkit::TestDatabase) -> Db {
	let cfg = herald_config::Postgres { dsn: test_db.dsn().to_string(), pool_max_conns: 2 };
	let db = Db::connect(&cfg).await.expect("Failed to connect to Postgres.");

	db.ensure_schema().await.expect("Failed to ensure schema.");

	db
}

fn entry<'a>(account_id: Uuid, reminder_id: Uuid, subject: &'a str) -> NewEntry<'a> {
	NewEntry { account_id, reminder_id, channel: Channel::Email, subject, body: None }
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HERALD_PG_DSN to run."]
async fn pending_entry_blocks_a_duplicate() {
	let Some(base_dsn) = herald_testkit::env_dsn() else {
		eprintln!("Skipping pending_entry_blocks_a_duplicate; set HERALD_PG_DSN to run this test.");
		return;
	};
	let test_db = herald_testkit::TestDatabase::new(&base_dsn)
		.await
		.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let account_id = Uuid::new_v4();
	let reminder_id = Uuid::new_v4();
	let now = OffsetDateTime::now_utc();
	let occurrence_start = now - Duration::hours(24);

	let inserted = log::insert_reminder_entry(
		&db,
		&entry(account_id, reminder_id, "Reminder: annual review"),
		occurrence_start,
	)
	.await
	.expect("Failed to insert log entry.");

	assert!(inserted);

	let inserted = log::insert_reminder_entry(
		&db,
		&entry(account_id, reminder_id, "Reminder: annual review"),
		occurrence_start,
	)
	.await
	.expect("Failed to re-insert log entry.");

	assert!(!inserted, "Duplicate PENDING entry must be rejected.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HERALD_PG_DSN to run."]
async fn failed_entry_does_not_block_a_retry() {
	let Some(base_dsn) = herald_testkit::env_dsn() else {
		eprintln!(
			"Skipping failed_entry_does_not_block_a_retry; set HERALD_PG_DSN to run this test."
		);
		return;
	};
	let test_db = herald_testkit::TestDatabase::new(&base_dsn)
		.await
		.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let account_id = Uuid::new_v4();
	let reminder_id = Uuid::new_v4();
	let now = OffsetDateTime::now_utc();
	let occurrence_start = now - Duration::hours(24);

	log::insert_reminder_entry(&db, &entry(account_id, reminder_id, "Reminder"), occurrence_start)
		.await
		.expect("Failed to insert log entry.");

	// Claim slightly ahead so the freshly inserted row's `available_at`
	// (server-side now()) is inside the window.
	let claim_now = now + Duration::minutes(1);
	let claimed = log::claim_batch(&db, claim_now, Duration::seconds(30), 10)
		.await
		.expect("Failed to claim batch.");

	assert_eq!(claimed.len(), 1);

	let resolved = log::mark_failed(&db, claimed[0].entry_id, "smtp_connect", now)
		.await
		.expect("Failed to mark entry failed.");

	assert!(resolved);

	let inserted =
		log::insert_reminder_entry(&db, &entry(account_id, reminder_id, "Reminder"), occurrence_start)
			.await
			.expect("Failed to insert retry entry.");

	assert!(inserted, "FAILED entry must not block a new attempt.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HERALD_PG_DSN to run."]
async fn claimed_entries_are_invisible_until_the_lease_expires() {
	let Some(base_dsn) = herald_testkit::env_dsn() else {
		eprintln!(
			"Skipping claimed_entries_are_invisible_until_the_lease_expires; set HERALD_PG_DSN to run this test."
		);
		return;
	};
	let test_db = herald_testkit::TestDatabase::new(&base_dsn)
		.await
		.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let now = OffsetDateTime::now_utc();
	let occurrence_start = now - Duration::hours(24);

	log::insert_reminder_entry(
		&db,
		&entry(Uuid::new_v4(), Uuid::new_v4(), "Reminder"),
		occurrence_start,
	)
	.await
	.expect("Failed to insert log entry.");

	let claim_now = now + Duration::minutes(1);
	let first = log::claim_batch(&db, claim_now, Duration::seconds(30), 10)
		.await
		.expect("Failed to claim batch.");

	assert_eq!(first.len(), 1);

	let second = log::claim_batch(&db, claim_now, Duration::seconds(30), 10)
		.await
		.expect("Failed to claim batch again.");

	assert!(second.is_empty(), "Leased entry must not be claimable twice.");

	let after_lease = claim_now + Duration::seconds(31);
	let third = log::claim_batch(&db, after_lease, Duration::seconds(30), 10)
		.await
		.expect("Failed to claim batch after lease.");

	assert_eq!(third.len(), 1, "Expired lease must release the entry.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HERALD_PG_DSN to run."]
async fn terminal_transitions_happen_once() {
	let Some(base_dsn) = herald_testkit::env_dsn() else {
		eprintln!("Skipping terminal_transitions_happen_once; set HERALD_PG_DSN to run this test.");
		return;
	};
	let test_db = herald_testkit::TestDatabase::new(&base_dsn)
		.await
		.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let account_id = Uuid::new_v4();
	let now = OffsetDateTime::now_utc();
	let occurrence_start = now - Duration::hours(24);

	log::insert_reminder_entry(&db, &entry(account_id, Uuid::new_v4(), "Reminder"), occurrence_start)
		.await
		.expect("Failed to insert log entry.");

	let claimed = log::claim_batch(&db, now + Duration::minutes(1), Duration::seconds(30), 10)
		.await
		.expect("Failed to claim batch.");
	let entry_id = claimed[0].entry_id;

	assert!(log::mark_sent(&db, entry_id, now).await.expect("Failed to mark entry sent."));
	assert!(
		!log::mark_sent(&db, entry_id, now).await.expect("Failed to re-mark entry sent."),
		"A resolved entry must not be resolved again."
	);
	assert!(
		!log::mark_failed(&db, entry_id, "late", now).await.expect("Failed to re-mark entry."),
		"A SENT entry must never become FAILED."
	);

	let entries = log::recent_for_account(&db, account_id, 10)
		.await
		.expect("Failed to list log entries.");

	assert_eq!(entries.len(), 1);
	assert_eq!(entries[0].status, "SENT");
	assert!(entries[0].resolved_at.is_some());

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}

#[tokio::test]
#[ignore = "Requires external Postgres. Set HERALD_PG_DSN to run."]
async fn one_pending_digest_per_account() {
	let Some(base_dsn) = herald_testkit::env_dsn() else {
		eprintln!("Skipping one_pending_digest_per_account; set HERALD_PG_DSN to run this test.");
		return;
	};
	let test_db = herald_testkit::TestDatabase::new(&base_dsn)
		.await
		.expect("Failed to create test database.");
	let db = connect(&test_db).await;
	let account_id = Uuid::new_v4();
	let now = OffsetDateTime::now_utc();

	let inserted = log::insert_digest_entry(&db, account_id, "Weekly reminder summary (2 items)", "…")
		.await
		.expect("Failed to insert digest entry.");

	assert!(inserted);

	let inserted = log::insert_digest_entry(&db, account_id, "Weekly reminder summary (2 items)", "…")
		.await
		.expect("Failed to re-insert digest entry.");

	assert!(!inserted, "A second PENDING digest must be rejected.");

	let claimed = log::claim_batch(&db, now + Duration::minutes(1), Duration::seconds(30), 10)
		.await
		.expect("Failed to claim batch.");

	assert_eq!(claimed.len(), 1);
	assert!(log::mark_sent(&db, claimed[0].entry_id, now).await.expect("Failed to mark sent."));

	let inserted = log::insert_digest_entry(&db, account_id, "Weekly reminder summary (1 item)", "…")
		.await
		.expect("Failed to insert next digest entry.");

	assert!(inserted, "A resolved digest must not block the next cycle.");

	test_db.cleanup().await.expect("Failed to cleanup test database.");
}
