//! Guards on the migrations themselves: lookup seeds, column types, indexes.

use gigboard_core::status::{
    BudgetType, ContractStatus, DisputeStatus, EstimatedDuration, JobStatus, ProjectStatus,
    ProposalStatus, TransactionStatus, TransactionType,
};
use sqlx::PgPool;

async fn seeded(pool: &PgPool, table: &str) -> Vec<(i16, String)> {
    sqlx::query_as(&format!("SELECT id, name FROM {table} ORDER BY id"))
        .fetch_all(pool)
        .await
        .unwrap_or_else(|e| panic!("{table} query failed: {e}"))
}

macro_rules! assert_seeded {
    ($pool:expr, $table:literal, $enum:ty) => {{
        let expected: Vec<(i16, String)> = <$enum>::ALL
            .iter()
            .map(|v| (v.id(), v.as_str().to_string()))
            .collect();
        assert_eq!(seeded($pool, $table).await, expected, "{} seed order", $table);
    }};
}

#[sqlx::test(migrations = "./migrations")]
async fn test_lookup_seed_matches_enums(pool: PgPool) {
    assert_seeded!(&pool, "project_statuses", ProjectStatus);
    assert_seeded!(&pool, "proposal_statuses", ProposalStatus);
    assert_seeded!(&pool, "contract_statuses", ContractStatus);
    assert_seeded!(&pool, "dispute_statuses", DisputeStatus);
    assert_seeded!(&pool, "transaction_types", TransactionType);
    assert_seeded!(&pool, "transaction_statuses", TransactionStatus);
    assert_seeded!(&pool, "job_statuses", JobStatus);
    assert_seeded!(&pool, "budget_types", BudgetType);
    assert_seeded!(&pool, "estimated_durations", EstimatedDuration);
}

/// Amounts are integer cents; a float or numeric column here would break
/// exact ledger arithmetic.
#[sqlx::test(migrations = "./migrations")]
async fn test_money_columns_are_bigint(pool: PgPool) {
    let money = [
        ("users", "balance"),
        ("freelancer_profiles", "total_earnings"),
        ("projects", "budget_min"),
        ("projects", "budget_max"),
        ("proposals", "bid_amount"),
        ("contracts", "total_amount"),
        ("wallet_transactions", "amount"),
    ];
    for (table, column) in money {
        let data_type: String = sqlx::query_scalar(
            "SELECT data_type::TEXT FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 AND column_name = $2",
        )
        .bind(table)
        .bind(column)
        .fetch_one(&pool)
        .await
        .unwrap_or_else(|e| panic!("{table}.{column} missing: {e}"));
        assert_eq!(data_type, "bigint", "{table}.{column}");
    }

    let milestones: String = sqlx::query_scalar(
        "SELECT data_type::TEXT FROM information_schema.columns \
         WHERE table_name = 'contracts' AND column_name = 'milestones'",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(milestones, "jsonb");
}

/// Entity keys are BIGINT, lookup keys SMALLINT, and every table carries
/// `created_at`/`updated_at` as timestamptz.
#[sqlx::test(migrations = "./migrations")]
async fn test_keys_and_timestamps(pool: PgPool) {
    let tables: Vec<String> = sqlx::query_scalar(
        "SELECT table_name::TEXT FROM information_schema.tables \
         WHERE table_schema = 'public' AND table_type = 'BASE TABLE' \
           AND table_name <> '_sqlx_migrations' \
         ORDER BY 1",
    )
    .fetch_all(&pool)
    .await
    .unwrap();
    assert!(!tables.is_empty());

    for table in &tables {
        let columns: Vec<(String, String)> = sqlx::query_as(
            "SELECT column_name::TEXT, data_type::TEXT FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 \
               AND column_name IN ('id', 'created_at', 'updated_at') \
             ORDER BY column_name",
        )
        .bind(table)
        .fetch_all(&pool)
        .await
        .unwrap();

        let type_of = |name: &str| {
            columns
                .iter()
                .find(|(c, _)| c == name)
                .map(|(_, t)| t.as_str())
                .unwrap_or_else(|| panic!("{table} has no {name} column"))
        };
        assert!(
            matches!(type_of("id"), "bigint" | "smallint"),
            "{table}.id is {}",
            type_of("id")
        );
        assert_eq!(type_of("created_at"), "timestamp with time zone", "{table}");
        assert_eq!(type_of("updated_at"), "timestamp with time zone", "{table}");
    }
}

/// Every foreign key column leads at least one index.
#[sqlx::test(migrations = "./migrations")]
async fn test_all_fks_have_indexes(pool: PgPool) {
    let unindexed: Vec<(String, String)> = sqlx::query_as(
        "SELECT c.conrelid::regclass::TEXT, a.attname::TEXT \
         FROM pg_constraint c \
         JOIN pg_attribute a ON a.attrelid = c.conrelid AND a.attnum = c.conkey[1] \
         WHERE c.contype = 'f' \
           AND c.connamespace = 'public'::regnamespace \
           AND NOT EXISTS ( \
               SELECT 1 FROM pg_index i \
               WHERE i.indrelid = c.conrelid AND i.indkey[0] = c.conkey[1] \
           ) \
         ORDER BY 1, 2",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(unindexed.is_empty(), "FK columns without an index: {unindexed:?}");
}
